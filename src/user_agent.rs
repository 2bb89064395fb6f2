//! User-Agent sent with every download request.
//!
//! Image hosts commonly reject requests without a browser-like User-Agent,
//! so all transfers identify as a desktop Chrome build. The value is fixed;
//! no other request header varies per item.

/// Browser User-Agent attached to every transfer.
pub const CLIENT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_identifies_as_browser() {
        assert!(
            CLIENT_USER_AGENT.starts_with("Mozilla/5.0"),
            "UA must look like a browser: {CLIENT_USER_AGENT}"
        );
        assert!(
            CLIENT_USER_AGENT.contains("Chrome/115.0.0.0"),
            "UA must pin the Chrome build: {CLIENT_USER_AGENT}"
        );
    }

    #[test]
    fn test_user_agent_is_single_line() {
        assert!(!CLIENT_USER_AGENT.contains('\n'));
        assert!(
            !CLIENT_USER_AGENT.contains("  "),
            "line continuation must not leave double spaces"
        );
    }
}
