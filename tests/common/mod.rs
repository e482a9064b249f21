//! Shared fixtures for the mocked-gateway tests.

#![allow(dead_code)]

use mockito::{Mock, ServerGuard};
use syncplicity_sample::models::Token;
use syncplicity_sample::{Config, Gateway, Session};

/// `Basic base64("app-key:app-secret")`.
pub const BASIC_AUTH: &str = "Basic YXBwLWtleTphcHAtc2VjcmV0";

pub fn config_for(server: &ServerGuard) -> Config {
    Config {
        app_key: "app-key".to_string(),
        app_secret: "app-secret".to_string(),
        admin_token: "admin-token".to_string(),
        owner_email: "owner@example.com".to_string(),
        base_api_endpoint: format!("{}/", server.url()),
        ..Config::default()
    }
}

pub fn machine_config_for(server: &ServerGuard) -> Config {
    Config {
        machine_token_auth_enabled: true,
        machine_token: "machine-secret".to_string(),
        storage_token: "storage-secret".to_string(),
        ..config_for(server)
    }
}

pub fn token(access_token: &str) -> Token {
    Token {
        access_token: access_token.to_string(),
        refresh_token: "refresh".to_string(),
        user_company_id: "company-1".to_string(),
        expires_in: Some(3600),
    }
}

/// Gateway whose session already holds `access_token`.
pub async fn gateway_with_token(config: Config, access_token: &str) -> Gateway {
    let session = Session::new();
    session.set_token(Some(token(access_token))).await;
    Gateway::with_session(config, session).unwrap()
}

/// Token endpoint answering user grants with `access_token`.
pub async fn mock_user_token(server: &mut ServerGuard, access_token: &str) -> Mock {
    server
        .mock("POST", "/oauth/token")
        .match_header("authorization", BASIC_AUTH)
        .match_header("sync-app-token", "admin-token")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body("grant_type=client_credentials")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"access_token":"{}","refresh_token":"refresh","user_company_id":"company-1","expires_in":3599}}"#,
            access_token
        ))
        .create_async()
        .await
}
