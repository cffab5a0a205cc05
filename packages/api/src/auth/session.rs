//! Session data stored in the server-side session store.
//!
//! The hosted auth tokens live in the `tower-sessions` record under
//! [`SESSION_AUTH_KEY`]. The refresh token never leaves the server; the
//! client sees the [`UserInfo`] projection and, for the realtime socket,
//! the short-lived access token.

use dioxus::prelude::ServerFnError;
use serde::{Deserialize, Serialize};
use store::{Actor, Profile};
use tower_sessions::Session;

use super::tokens::{self, TokenResponse};
use crate::backend::BackendConfig;
use crate::models::UserInfo;

/// Key for storing [`SessionData`] in the session.
pub const SESSION_AUTH_KEY: &str = "auth";

/// Seconds before expiry at which the access token is refreshed.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Session data stored in the session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix time at which `access_token` expires.
    pub expires_at: i64,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
}

impl SessionData {
    pub fn from_tokens(tokens: TokenResponse, profile: Option<Profile>, now: i64) -> Self {
        let profile = profile.unwrap_or_default();
        Self {
            email: tokens
                .user
                .email
                .or(profile.email)
                .unwrap_or_default(),
            user_id: tokens.user.id,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: now + tokens.expires_in,
            full_name: profile.full_name,
            avatar_url: profile.avatar_url,
            role: profile.role,
        }
    }

    pub fn needs_refresh(&self, now: i64) -> bool {
        self.expires_at - REFRESH_MARGIN_SECS <= now
    }

    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.user_id.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            avatar_url: self.avatar_url.clone(),
            role: self.role.clone(),
        }
    }

    pub fn actor(&self) -> Actor {
        Actor::new(&self.user_id, self.role.as_deref() == Some("admin"))
    }
}

pub async fn save_session(session: &Session, data: &SessionData) -> Result<(), ServerFnError> {
    session
        .insert(SESSION_AUTH_KEY, data)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

/// Stored session data as-is, without refreshing.
pub async fn load_session(session: &Session) -> Result<Option<SessionData>, ServerFnError> {
    session
        .get(SESSION_AUTH_KEY)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

/// Session data with a usable access token. An expired token is refreshed;
/// when the refresh is refused the session is flushed and `None` returned.
pub async fn current_session(session: &Session) -> Result<Option<SessionData>, ServerFnError> {
    let Some(mut data) = load_session(session).await? else {
        return Ok(None);
    };

    let now = chrono::Utc::now().timestamp();
    if !data.needs_refresh(now) {
        return Ok(Some(data));
    }

    let config = BackendConfig::from_env().map_err(|e| ServerFnError::new(e.to_string()))?;
    match tokens::refresh(&config, &data.refresh_token).await {
        Ok(fresh) => {
            data.access_token = fresh.access_token;
            data.refresh_token = fresh.refresh_token;
            data.expires_at = now + fresh.expires_in;
            save_session(session, &data).await?;
            Ok(Some(data))
        }
        Err(e) => {
            tracing::warn!("Token refresh failed for {}: {}", data.user_id, e);
            session
                .flush()
                .await
                .map_err(|e| ServerFnError::new(e.to_string()))?;
            Ok(None)
        }
    }
}

/// Like [`current_session`], but signed-out callers get an error.
pub async fn require_session(session: &Session) -> Result<SessionData, ServerFnError> {
    current_session(session)
        .await?
        .ok_or_else(|| ServerFnError::new("Not authenticated"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::tokens::AuthUser;

    fn tokens() -> TokenResponse {
        TokenResponse {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expires_in: 3600,
            user: AuthUser {
                id: "u1".into(),
                email: Some("meera@alumni.org".into()),
            },
        }
    }

    #[test]
    fn builds_from_tokens_and_profile() {
        let profile = Profile {
            id: "u1".into(),
            full_name: Some("Meera Das".into()),
            role: Some("admin".into()),
            ..Default::default()
        };
        let data = SessionData::from_tokens(tokens(), Some(profile), 1_000);
        assert_eq!(data.expires_at, 4_600);
        assert!(!data.needs_refresh(4_000));
        assert!(data.needs_refresh(4_540));

        let info = data.to_info();
        assert_eq!(info.display_name(), "Meera Das");
        assert!(info.is_admin());
        assert!(data.actor().is_admin);
    }

    #[test]
    fn missing_profile_is_plain_member() {
        let data = SessionData::from_tokens(tokens(), None, 0);
        assert_eq!(data.email, "meera@alumni.org");
        assert!(data.role.is_none());
        assert!(!data.actor().is_admin);
    }
}
