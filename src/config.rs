//! Client configuration.
//!
//! A [`Config`] is resolved once, from CLI flags, environment variables and
//! an optional YAML file, and then handed to [`KonduktoClient::new`]. Nothing
//! in the request path reads ambient settings.
//!
//! [`KonduktoClient::new`]: crate::KonduktoClient::new

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{KdtError, Result};

/// File name of the per-user config file, looked up in the home directory.
pub const DEFAULT_CONFIG_FILE: &str = ".kdt.yaml";

/// Environment variable holding the Kondukto base URL.
pub const HOST_ENV: &str = "KONDUKTO_HOST";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "KONDUKTO_TOKEN";

/// Environment variable that enables insecure TLS.
pub const INSECURE_ENV: &str = "KONDUKTO_INSECURE";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Values read from the YAML config file.
///
/// ```yaml
/// host: https://kondukto.example.com
/// token: 9f8e...
/// insecure: false
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub insecure: Option<bool>,
}

impl FileConfig {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| KdtError::Config(format!("{}: {e}", path.display())))
    }

    /// Load the config file if there is one.
    ///
    /// An explicitly requested file must exist. The default file in the home
    /// directory is optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<Self>> {
        match explicit {
            Some(path) => Self::load(path).map(Some),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::load(&path).map(Some),
                _ => Ok(None),
            },
        }
    }
}

/// Location of the default config file (`~/.kdt.yaml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_FILE))
}

/// Values supplied on the command line (or through the environment by clap).
///
/// These take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub token: Option<String>,
    pub insecure: Option<bool>,
}

/// Resolved client configuration.
#[derive(Clone)]
pub struct Config {
    host: Url,
    token: String,
    insecure: bool,
    timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host.as_str())
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Create a configuration for `host` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the host is not a valid URL.
    pub fn new(host: &str, token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(KdtError::ConfigMissing(format!(
                "API token is empty (set --token or {TOKEN_ENV})"
            )));
        }

        // Ensure base URL ends with /
        let host_str = if host.ends_with('/') {
            host.to_string()
        } else {
            format!("{host}/")
        };
        let host = Url::parse(&host_str)
            .map_err(|e| KdtError::Config(format!("invalid host '{host}': {e}")))?;

        Ok(Self {
            host,
            token: token.to_string(),
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Skip TLS certificate verification.
    #[must_use]
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Merge overrides on top of the config file.
    ///
    /// # Errors
    ///
    /// Returns [`KdtError::ConfigMissing`] when host or token is set nowhere.
    pub fn resolve(overrides: ConfigOverrides, file: Option<FileConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let host = overrides.host.or(file.host).ok_or_else(|| {
            KdtError::ConfigMissing(format!("host not set (use --host or {HOST_ENV})"))
        })?;
        let token = overrides.token.or(file.token).ok_or_else(|| {
            KdtError::ConfigMissing(format!("token not set (use --token or {TOKEN_ENV})"))
        })?;
        let insecure = overrides.insecure.or(file.insecure).unwrap_or(false);

        Ok(Self::new(&host, &token)?.with_insecure(insecure))
    }

    /// Base URL of the Kondukto instance.
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// API token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether TLS verification is disabled.
    pub fn insecure(&self) -> bool {
        self.insecure
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file(host: Option<&str>, token: Option<&str>, insecure: Option<bool>) -> FileConfig {
        FileConfig {
            host: host.map(str::to_string),
            token: token.map(str::to_string),
            insecure,
        }
    }

    #[test]
    fn test_overrides_take_precedence_over_file() {
        let overrides = ConfigOverrides {
            host: Some("https://flag.example.com".to_string()),
            token: None,
            insecure: None,
        };
        let config = Config::resolve(
            overrides,
            Some(file(Some("https://file.example.com"), Some("file-token"), None)),
        )
        .unwrap();

        assert_eq!(config.host().as_str(), "https://flag.example.com/");
        assert_eq!(config.token(), "file-token");
        assert!(!config.insecure());
    }

    #[test]
    fn test_insecure_from_file() {
        let config = Config::resolve(
            ConfigOverrides::default(),
            Some(file(Some("https://k.example.com"), Some("t"), Some(true))),
        )
        .unwrap();
        assert!(config.insecure());
    }

    #[test]
    fn test_insecure_override_false_beats_file() {
        let overrides = ConfigOverrides {
            insecure: Some(false),
            ..Default::default()
        };
        let config = Config::resolve(
            overrides,
            Some(file(Some("https://k.example.com"), Some("t"), Some(true))),
        )
        .unwrap();
        assert!(!config.insecure());
    }

    #[test]
    fn test_missing_token_is_reported() {
        let overrides = ConfigOverrides {
            host: Some("https://k.example.com".to_string()),
            ..Default::default()
        };
        let err = Config::resolve(overrides, None).unwrap_err();
        assert!(matches!(err, KdtError::ConfigMissing(_)));
    }

    #[test]
    fn test_invalid_host_is_config_error() {
        let err = Config::new("not a url", "token").unwrap_err();
        assert!(matches!(err, KdtError::Config(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = Config::new("https://k.example.com", "super-secret").unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("k.example.com"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_load_yaml_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "host: https://kondukto.example.com\ntoken: abc123\ninsecure: true"
        )
        .unwrap();

        let loaded = FileConfig::discover(Some(tmp.path())).unwrap().unwrap();
        assert_eq!(loaded.host.as_deref(), Some("https://kondukto.example.com"));
        assert_eq!(loaded.token.as_deref(), Some("abc123"));
        assert_eq!(loaded.insecure, Some(true));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileConfig::discover(Some(&dir.path().join("missing.yaml")));
        assert!(matches!(result, Err(KdtError::Io(_))));
    }
}
