//! API key gate for the authenticated endpoints.

use axum::http::Method;

use crate::config::KeyMatch;
use crate::error::ErrorCode;

/// Decides whether a request may reach a runtime query.
///
/// The gate only decides; the handler writes the response and the log line.
#[derive(Debug, Clone)]
pub struct ApiKeyGate {
    key: String,
    mode: KeyMatch,
}

impl ApiKeyGate {
    /// Gate for `key` compared according to `mode`.
    pub fn new(key: impl Into<String>, mode: KeyMatch) -> Self {
        Self {
            key: key.into(),
            mode,
        }
    }

    /// Check method and key of a request with the given raw query string.
    pub fn check(&self, method: &Method, query: Option<&str>) -> Result<(), ErrorCode> {
        if method != Method::GET {
            return Err(ErrorCode::MethodNotAllowed);
        }

        let supplied = first_key(query)
            .filter(|key| !key.is_empty())
            .ok_or(ErrorCode::ApiKeyNotFound)?;

        if self.matches(&supplied) {
            Ok(())
        } else {
            Err(ErrorCode::ApiKeyInvalid)
        }
    }

    fn matches(&self, supplied: &str) -> bool {
        match self.mode {
            // Only the leading character is significant.
            KeyMatch::Legacy => {
                supplied.chars().next().map(String::from).as_deref() == Some(self.key.as_str())
            }
            KeyMatch::Strict => supplied == self.key,
        }
    }
}

/// First value of the `key` parameter, percent-decoded.
fn first_key(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(name, _)| name == "key")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy() -> ApiKeyGate {
        ApiKeyGate::new("a", KeyMatch::Legacy)
    }

    #[test]
    fn rejects_non_get_before_looking_at_key() {
        assert_eq!(
            legacy().check(&Method::POST, Some("key=a")),
            Err(ErrorCode::MethodNotAllowed)
        );
        assert_eq!(
            legacy().check(&Method::DELETE, None),
            Err(ErrorCode::MethodNotAllowed)
        );
    }

    #[test]
    fn missing_or_empty_key_is_not_found() {
        assert_eq!(legacy().check(&Method::GET, None), Err(ErrorCode::ApiKeyNotFound));
        assert_eq!(
            legacy().check(&Method::GET, Some("other=1")),
            Err(ErrorCode::ApiKeyNotFound)
        );
        assert_eq!(
            legacy().check(&Method::GET, Some("key=")),
            Err(ErrorCode::ApiKeyNotFound)
        );
    }

    #[test]
    fn legacy_mode_compares_first_character_only() {
        assert_eq!(legacy().check(&Method::GET, Some("key=a")), Ok(()));
        assert_eq!(legacy().check(&Method::GET, Some("key=abc")), Ok(()));
        assert_eq!(
            legacy().check(&Method::GET, Some("key=xyz")),
            Err(ErrorCode::ApiKeyInvalid)
        );
    }

    #[test]
    fn legacy_mode_never_matches_multi_character_keys() {
        let gate = ApiKeyGate::new("secret", KeyMatch::Legacy);
        assert_eq!(
            gate.check(&Method::GET, Some("key=secret")),
            Err(ErrorCode::ApiKeyInvalid)
        );
    }

    #[test]
    fn strict_mode_compares_whole_key() {
        let gate = ApiKeyGate::new("secret", KeyMatch::Strict);
        assert_eq!(gate.check(&Method::GET, Some("key=secret")), Ok(()));
        assert_eq!(
            gate.check(&Method::GET, Some("key=s")),
            Err(ErrorCode::ApiKeyInvalid)
        );
    }

    #[test]
    fn only_first_key_value_counts() {
        assert_eq!(legacy().check(&Method::GET, Some("key=x&key=a")), Err(ErrorCode::ApiKeyInvalid));
        assert_eq!(legacy().check(&Method::GET, Some("key=a&key=x")), Ok(()));
    }

    #[test]
    fn key_is_percent_decoded() {
        let gate = ApiKeyGate::new("s p", KeyMatch::Strict);
        assert_eq!(gate.check(&Method::GET, Some("key=s%20p")), Ok(()));
    }
}
