use std::path::PathBuf;
use std::time::Duration;

/// Default backend base URL (the upload endpoint is `{base}/upload/`).
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default location of the persisted session, relative to the working directory.
pub const DEFAULT_SESSION_FILE: &str = ".chemviz-session.json";

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a backend running locally.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the backend API, without a trailing slash.
    pub api_url: String,
    pub request_timeout: Duration,
    /// Where the CLI keeps the session between invocations.
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                      |
    /// |--------------------------------|------------------------------|
    /// | `CHEMVIZ_API_URL`              | `http://127.0.0.1:8000/api`  |
    /// | `CHEMVIZ_REQUEST_TIMEOUT_SECS` | `30`                         |
    /// | `CHEMVIZ_SESSION_FILE`         | `.chemviz-session.json`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("CHEMVIZ_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = normalize_base_url(&url);
        }

        if let Some(raw) = lookup("CHEMVIZ_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Invalid {
                    var: "CHEMVIZ_REQUEST_TIMEOUT_SECS",
                    expected: "a positive whole number of seconds",
                    value: raw.clone(),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(path) = lookup("CHEMVIZ_SESSION_FILE").filter(|v| !v.trim().is_empty()) {
            config.session_file = PathBuf::from(path);
        }

        Ok(config)
    }
}

/// Strip whitespace and trailing slashes so paths can be appended as `/upload/`.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "http://127.0.0.1:8000/api");
    }

    #[test]
    fn overrides_are_applied() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("CHEMVIZ_API_URL", "https://plant.example.com/api/"),
            ("CHEMVIZ_REQUEST_TIMEOUT_SECS", "5"),
            ("CHEMVIZ_SESSION_FILE", "/tmp/s.json"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://plant.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.session_file, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn rejects_bad_timeout() {
        assert_matches!(
            ClientConfig::from_lookup(lookup(&[("CHEMVIZ_REQUEST_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::Invalid { var: "CHEMVIZ_REQUEST_TIMEOUT_SECS", .. })
        );
        assert!(
            ClientConfig::from_lookup(lookup(&[("CHEMVIZ_REQUEST_TIMEOUT_SECS", "0")])).is_err()
        );
    }
}
