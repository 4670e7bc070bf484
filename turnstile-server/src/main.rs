use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, anyhow};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turnstile_config::{Config, ConfigLoad, ConfigLoader};
use turnstile_core::clock::SystemClock;
use turnstile_server::{
    create_app,
    infra::startup::{Stores, build_state, connect_postgres, migrate},
};
use uuid::Uuid;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "turnstile-server")]
#[command(about = "PIN-based subscription access for media server clients")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to the TOML configuration file
    #[arg(long, env = "TURNSTILE_CONFIG")]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
    #[command(subcommand)]
    ApiKey(ApiKeyCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(Debug, Subcommand)]
enum ApiKeyCommand {
    /// Issue a new API key and print it once
    Create {
        #[arg(long)]
        name: String,
    },
    /// Revoke an API key by id
    Revoke { id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_runtime_config(&cli.serve)?;

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&config).await,
        Some(Command::ApiKey(command)) => run_api_key(config, command).await,
        None => run_server(config).await,
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "loaded configuration file");
    }
    warnings.log();

    Ok(Arc::new(config))
}

fn require_database_url(config: &Config) -> anyhow::Result<&str> {
    config
        .database
        .primary_url
        .as_deref()
        .ok_or_else(|| anyhow!("DATABASE_URL must be provided for this command"))
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = connect_postgres(require_database_url(config)?).await?;
    migrate(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_api_key(
    config: Arc<Config>,
    command: ApiKeyCommand,
) -> anyhow::Result<()> {
    let pool = connect_postgres(require_database_url(&config)?).await?;
    migrate(&pool).await?;
    let state =
        build_state(config, Stores::postgres(pool), Arc::new(SystemClock))?;

    match command {
        ApiKeyCommand::Create { name } => {
            let issued = state.access_tokens().issue_api_key(&name).await?;
            println!("id:    {}", issued.id);
            println!("token: {}", issued.token.as_str());
            println!("Store this token now; it cannot be shown again.");
        }
        ApiKeyCommand::Revoke { id } => {
            if state.access_tokens().revoke(id).await? {
                println!("revoked {id}");
            } else {
                return Err(anyhow!("no active API key with id {id}"));
            }
        }
    }

    Ok(())
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    let stores = Stores::from_config(&config).await?;
    let state = build_state(config.clone(), stores, Arc::new(SystemClock))?;
    let app = create_app(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, dev_mode = config.dev_mode, "Turnstile server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
