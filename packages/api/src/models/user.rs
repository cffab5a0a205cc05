//! # Signed-in user
//!
//! [`UserInfo`] is the client-safe view of the current user. It is built on
//! the server from the hosted auth response plus the user's `profiles` row
//! and crosses the server/client boundary via Dioxus server functions. It
//! never carries tokens; those stay in the server-side session.

use serde::{Deserialize, Serialize};

/// User information safe to send to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
}

impl UserInfo {
    /// Get display name, falling back to email if name is not set.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_and_role() {
        let mut user = UserInfo {
            id: "u1".into(),
            email: "kavya@alumni.org".into(),
            full_name: Some(" ".into()),
            avatar_url: None,
            role: Some("alumni".into()),
        };
        assert_eq!(user.display_name(), "kavya@alumni.org");
        assert!(!user.is_admin());

        user.full_name = Some("Kavya Iyer".into());
        user.role = Some("admin".into());
        assert_eq!(user.display_name(), "Kavya Iyer");
        assert!(user.is_admin());
    }
}
