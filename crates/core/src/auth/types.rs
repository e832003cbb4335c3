use std::fmt;

/// An authenticated identity session.
///
/// Passed explicitly into every operation that talks to the store; a missing
/// session is an input condition, not a transport error.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
}

impl Session {
    /// Wrap an access token. Blank tokens do not make a session.
    pub fn new(access_token: impl Into<String>) -> Option<Self> {
        let access_token = access_token.into().trim().to_string();
        if access_token.is_empty() {
            None
        } else {
            Some(Self { access_token })
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_bearer() {
        let session = Session::new("abc.def.ghi").unwrap();
        assert_eq!(session.bearer(), "Bearer abc.def.ghi");
        assert_eq!(session.access_token(), "abc.def.ghi");
    }

    #[test]
    fn test_blank_token_is_no_session() {
        assert!(Session::new("").is_none());
        assert!(Session::new("   \n").is_none());
    }

    #[test]
    fn test_token_is_trimmed() {
        let session = Session::new("  token\n").unwrap();
        assert_eq!(session.access_token(), "token");
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("super-secret").unwrap();
        let debug = format!("{:?}", session);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }
}
