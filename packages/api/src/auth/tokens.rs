//! Token exchange with the hosted auth service.
//!
//! | Function | Endpoint |
//! |----------|----------|
//! | [`password_grant`] | `POST /auth/v1/token?grant_type=password` |
//! | [`refresh`] | `POST /auth/v1/token?grant_type=refresh_token` |
//! | [`sign_up`] | `POST /auth/v1/signup` |
//! | [`sign_out`] | `POST /auth/v1/logout` |

use serde::Deserialize;
use serde_json::json;

use crate::backend::rest::auth_url;
use crate::backend::{BackendConfig, BackendError};

/// A user as the auth service reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A session issued by the auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: i64,
    pub user: AuthUser,
}

async fn post_token(
    config: &BackendConfig,
    endpoint: &str,
    body: serde_json::Value,
) -> Result<reqwest::Response, BackendError> {
    let response = crate::backend::http_client()
        .post(auth_url(&config.url, endpoint))
        .header("apikey", &config.anon_key)
        .json(&body)
        .send()
        .await?;
    crate::backend::check_response(response).await
}

pub async fn password_grant(
    config: &BackendConfig,
    email: &str,
    password: &str,
) -> Result<TokenResponse, BackendError> {
    let response = post_token(
        config,
        "token?grant_type=password",
        json!({ "email": email, "password": password }),
    )
    .await?;
    Ok(response.json().await?)
}

pub async fn refresh(
    config: &BackendConfig,
    refresh_token: &str,
) -> Result<TokenResponse, BackendError> {
    let response = post_token(
        config,
        "token?grant_type=refresh_token",
        json!({ "refresh_token": refresh_token }),
    )
    .await?;
    Ok(response.json().await?)
}

/// Create an account. Returns `None` when the service requires the
/// address to be confirmed before a session is issued.
pub async fn sign_up(
    config: &BackendConfig,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<Option<TokenResponse>, BackendError> {
    let response = post_token(
        config,
        "signup",
        json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        }),
    )
    .await?;
    let body: serde_json::Value = response.json().await?;
    if body.get("access_token").is_some() {
        serde_json::from_value(body)
            .map(Some)
            .map_err(|e| BackendError::Response(e.to_string()))
    } else {
        Ok(None)
    }
}

pub async fn sign_out(config: &BackendConfig, access_token: &str) -> Result<(), BackendError> {
    let response = crate::backend::http_client()
        .post(auth_url(&config.url, "logout"))
        .header("apikey", &config.anon_key)
        .bearer_auth(access_token)
        .send()
        .await?;
    crate::backend::check_response(response).await?;
    Ok(())
}
