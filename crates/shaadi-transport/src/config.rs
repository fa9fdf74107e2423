//! Where the backend lives and how long we're willing to wait for it.

use std::time::Duration;

use url::Url;

use crate::TransportError;

/// Configuration for reaching the backend's auth endpoints.
///
/// Paths are joined onto `base_url`; the defaults match the marketplace
/// backend's Express routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Scheme + host (+ optional prefix), e.g. `https://api.shaadisetgo.in`.
    pub base_url: String,

    /// Identity verification (`GET`, bearer token).
    pub me_path: String,

    /// Login (`POST` credentials).
    pub login_path: String,

    /// Registration (`POST` profile).
    pub register_path: String,

    /// Per-request timeout applied by the HTTP client. `None` waits
    /// forever; the session store itself never times out.
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            me_path: "/api/auth/me".to_string(),
            login_path: "/api/auth/login".to_string(),
            register_path: "/api/auth/register".to_string(),
            timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl ApiConfig {
    /// Default endpoints on a different host.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parses `base_url`, normalised so that endpoint paths join under it
    /// (any path prefix is kept).
    ///
    /// # Errors
    /// [`TransportError::InvalidConfig`] if it doesn't parse, the scheme
    /// isn't http(s), or there's no host.
    pub fn base(&self) -> Result<Url, TransportError> {
        let invalid = |reason: String| {
            TransportError::InvalidConfig(format!("base_url {:?}: {reason}", self.base_url))
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("no host".into()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Joins `path` onto the base URL.
    ///
    /// # Errors
    /// [`TransportError::InvalidConfig`] if the base URL is unusable or
    /// `path` can't be joined onto it.
    pub fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base()?
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidConfig(format!("endpoint {path:?}: {e}")))
    }

    /// Checks that the base URL is something an HTTP client can use.
    ///
    /// # Errors
    /// See [`base`](Self::base).
    pub fn validate(&self) -> Result<(), TransportError> {
        self.base().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(base: &str, path: &str) -> String {
        ApiConfig::with_base_url(base)
            .endpoint(path)
            .unwrap()
            .to_string()
    }

    fn assert_invalid(base: &str) {
        assert!(
            matches!(
                ApiConfig::with_base_url(base).validate(),
                Err(TransportError::InvalidConfig(_))
            ),
            "{base:?} should be rejected"
        );
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("https://api.example.com/", "/api/auth/me"),
            "https://api.example.com/api/auth/me"
        );
        assert_eq!(
            endpoint("https://api.example.com", "api/auth/login"),
            "https://api.example.com/api/auth/login"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        assert_eq!(
            endpoint("https://example.com/shaadi", "/api/auth/me"),
            "https://example.com/shaadi/api/auth/me"
        );
        assert_eq!(
            endpoint("https://example.com/shaadi/", "/api/auth/me"),
            "https://example.com/shaadi/api/auth/me"
        );
    }

    #[test]
    fn test_endpoint_fails_for_invalid_base() {
        assert!(matches!(
            ApiConfig::with_base_url("not a url").endpoint("/api/auth/me"),
            Err(TransportError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_accepts_http_and_https() {
        assert!(ApiConfig::default().validate().is_ok());
        assert!(ApiConfig::with_base_url("https://x.in").validate().is_ok());
        assert!(ApiConfig::with_base_url("http://127.0.0.1:5000").validate().is_ok());
    }

    #[test]
    fn test_validate_scheme_is_case_insensitive() {
        assert!(ApiConfig::with_base_url("HTTP://example.com").validate().is_ok());
        assert_eq!(
            endpoint("HTTPS://Example.com", "/api/auth/me"),
            "https://example.com/api/auth/me"
        );
    }

    #[test]
    fn test_validate_rejects_missing_scheme_or_host() {
        assert_invalid("localhost:5000");
        assert_invalid("http://");
        assert_invalid("http://   ");
        assert_invalid("ftp://files.example.com");
    }

    #[test]
    fn test_validate_rejects_malformed_host() {
        assert_invalid("http://exa mple.com");
        assert_invalid("https://[::1");
    }

    #[test]
    fn test_default_paths_and_timeout() {
        let config = ApiConfig::default();
        assert_eq!(config.me_path, "/api/auth/me");
        assert_eq!(config.login_path, "/api/auth/login");
        assert_eq!(config.register_path, "/api/auth/register");
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    }
}
