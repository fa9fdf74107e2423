//! Client configuration, with environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use shaadi_transport::ApiConfig;

use crate::ShaadiError;

/// Backend base URL, e.g. `https://api.shaadisetgo.in`.
pub const ENV_API_URL: &str = "SHAADI_API_URL";
/// Where the credential token is persisted.
pub const ENV_TOKEN_PATH: &str = "SHAADI_TOKEN_PATH";
/// Per-request timeout in whole seconds; `0` disables it.
pub const ENV_HTTP_TIMEOUT_SECS: &str = "SHAADI_HTTP_TIMEOUT_SECS";
/// Optional JSON route table replacing the built-in one.
pub const ENV_ROUTES_FILE: &str = "SHAADI_ROUTES_FILE";

/// Everything needed to build a client that talks HTTP and keeps its
/// token in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api: ApiConfig,

    /// Token record location. Relative paths resolve against the working
    /// directory.
    pub token_path: PathBuf,

    /// JSON route table to load instead of the marketplace defaults.
    pub routes_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            token_path: PathBuf::from(".shaadisetgo/session.json"),
            routes_file: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `SHAADI_*` environment variables. Unset or
    /// empty variables keep the default.
    ///
    /// # Errors
    /// [`ShaadiError::Config`] if the timeout isn't a number,
    /// [`ShaadiError::Transport`] if the resulting base URL is unusable.
    pub fn from_env() -> Result<Self, ShaadiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup`.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ShaadiError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(url) = var(ENV_API_URL) {
            config.api.base_url = url;
        }
        if let Some(path) = var(ENV_TOKEN_PATH) {
            config.token_path = PathBuf::from(path);
        }
        if let Some(secs) = var(ENV_HTTP_TIMEOUT_SECS) {
            let secs: u64 = secs.parse().map_err(|_| {
                ShaadiError::Config(format!(
                    "{ENV_HTTP_TIMEOUT_SECS} must be whole seconds, got {secs:?}"
                ))
            })?;
            config.api.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(path) = var(ENV_ROUTES_FILE) {
            config.routes_file = Some(PathBuf::from(path));
        }

        config.api.validate()?;
        Ok(config)
    }
}
