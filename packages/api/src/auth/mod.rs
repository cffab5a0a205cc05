//! Authentication against the hosted auth service and server-side session state.

#[cfg(feature = "server")]
mod session;
#[cfg(feature = "server")]
pub mod tokens;

#[cfg(feature = "server")]
pub use session::{
    current_session, load_session, require_session, save_session, SessionData, SESSION_AUTH_KEY,
};

/// Shortest accepted password, counted in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Reject passwords shorter than [`MIN_PASSWORD_CHARS`] characters.
pub fn check_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_length_counts_characters() {
        assert!(check_password("short").is_err());
        assert!(check_password("long enough").is_ok());
        // Seven characters, but more than eight bytes.
        assert_eq!(
            check_password("pässwö€"),
            Err("Password must be at least 8 characters")
        );
        assert!(check_password("pässwört").is_ok());
    }
}
