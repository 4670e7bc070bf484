use anyhow::Result;
use axum::http::StatusCode;
use serde_json::Value;
use turnstile_model::routes::v1;

mod common;
use common::{build_test_app, header};

#[tokio::test]
async fn api_key_is_administrator_in_every_form() -> Result<()> {
    let app = build_test_app()?;
    let api_key = app.api_key().await?;

    let bearer = app
        .server
        .get(v1::users::CURRENT)
        .authorization_bearer(&api_key)
        .await;
    let (name, value) = header("x-emby-token", &api_key);
    let emby = app
        .server
        .get(v1::users::CURRENT)
        .add_header(name, value)
        .await;
    let query = app
        .server
        .get(v1::users::CURRENT)
        .add_query_param("api_key", &api_key)
        .await;

    for response in [bearer, emby, query] {
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["Role"], "Administrator");
        assert_eq!(body["data"]["IsApiKey"], true);
        assert_eq!(body["data"]["IsPinSession"], false);
        assert!(body["data"].get("Id").is_none());
    }
    Ok(())
}

#[tokio::test]
async fn media_browser_header_resolves_user_token() -> Result<()> {
    let app = build_test_app()?;
    let (_, token) = app.account_token("viewer", false).await?;

    let authorization = format!(
        r#"MediaBrowser Client="Web", Device="Firefox", DeviceId="abc", Version="1.0", Token="{token}""#
    );
    let (name, value) = header("authorization", &authorization);
    let response = app
        .server
        .get(v1::users::CURRENT)
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["Name"], "viewer");
    assert_eq!(body["data"]["Role"], "User");
    assert!(body["data"]["Id"].is_string());
    Ok(())
}

#[tokio::test]
async fn revoked_and_unknown_tokens_continue_anonymously() -> Result<()> {
    let app = build_test_app()?;
    let (token_id, token) = app.account_token("viewer", false).await?;
    assert!(app.state.access_tokens().revoke(token_id).await?);

    let revoked = app
        .server
        .get(v1::users::CURRENT)
        .authorization_bearer(&token)
        .await;
    revoked.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = revoked.json();
    assert_eq!(body["error"]["message"], "Authentication required");

    let unknown = app
        .server
        .get(v1::users::CURRENT)
        .authorization_bearer("0123456789abcdef0123456789abcdef")
        .await;
    unknown.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn malformed_credentials_fail_hard() -> Result<()> {
    let app = build_test_app()?;

    let (name, value) = header("authorization", r#"MediaBrowser Token="abc"#);
    let response = app
        .server
        .get(v1::users::CURRENT)
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "Invalid credentials.");
    Ok(())
}
