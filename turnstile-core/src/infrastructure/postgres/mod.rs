//! Postgres adapters for the repository ports.

mod access_tokens;
mod pin_users;

pub use access_tokens::PostgresAccessTokenRepository;
pub use pin_users::PostgresPinUserRepository;
