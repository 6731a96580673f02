//! Configuration loading.
//!
//! Settings come from an optional TOML file, then `DONOR_MATCH_*`
//! environment variables, then command-line flags (applied by the CLI).
//! Every section is optional:
//!
//! ```toml
//! [directory]
//! path = "directory.json"
//!
//! [matching]
//! result_cap = 10
//!
//! [text_service]
//! endpoint = "https://text.example.org/v1"
//! api_key = "..."
//! timeout_secs = 30
//!
//! [server]
//! address = "127.0.0.1"
//! port = 8080
//!
//! [identity]
//! allow_anonymous = false
//!
//! [[identity.users]]
//! token = "..."
//! id = "coordinator-1"
//! display_name = "Dhaka Coordinator"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::directory::{DirectoryError, JsonDirectory};
use crate::identity::StaticUser;
use crate::matching::MatchingConfig;
use crate::narrative::client::DEFAULT_TIMEOUT_SECS;
use crate::narrative::{HttpTextService, TextServiceError};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "DONOR_MATCH_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {var}")]
    InvalidEnv { var: String, value: String },

    #[error("Configuration validation failed: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub directory: DirectoryConfig,
    pub matching: MatchingConfig,
    pub text_service: TextServiceConfig,
    pub server: ServerConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Backing JSON file. Without one the embedded seed is used in memory.
    pub path: Option<PathBuf>,
}

impl DirectoryConfig {
    /// Open the configured directory
    pub fn open(&self) -> Result<JsonDirectory, DirectoryError> {
        match &self.path {
            Some(path) => JsonDirectory::open(path),
            None => JsonDirectory::load_embedded(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextServiceConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TextServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl TextServiceConfig {
    /// Build the HTTP client, or `None` when no endpoint is configured
    pub fn build(&self) -> Result<Option<HttpTextService>, TextServiceError> {
        self.endpoint
            .as_deref()
            .map(|endpoint| {
                HttpTextService::new(
                    endpoint,
                    self.api_key.clone(),
                    Duration::from_secs(self.timeout_secs),
                )
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// Accept submissions without a bearer token
    pub allow_anonymous: bool,
    pub users: Vec<StaticUser>,
}

impl Config {
    /// Load configuration from `path` (if any) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |var| std::env::var(var).ok())
    }

    /// Load configuration with an explicit environment lookup
    pub fn load_with(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(env)?;
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(toml::from_str(&contents)?)
    }

    /// Apply `DONOR_MATCH_*` overrides
    pub fn apply_env_overrides(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let lookup = |key: &str| {
            let var = format!("{ENV_PREFIX}{key}");
            env(&var).map(|value| (var, value))
        };

        if let Some((_, value)) = lookup("DIRECTORY_PATH") {
            self.directory.path = Some(PathBuf::from(value));
        }
        if let Some((var, value)) = lookup("RESULT_CAP") {
            let cap = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var, value })?;
            self.matching.result_cap = Some(cap);
        }
        if let Some((_, value)) = lookup("TEXT_SERVICE_ENDPOINT") {
            self.text_service.endpoint = Some(value);
        }
        if let Some((_, value)) = lookup("TEXT_SERVICE_API_KEY") {
            self.text_service.api_key = Some(value);
        }
        if let Some((var, value)) = lookup("SERVER_PORT") {
            self.server.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var, value })?;
        }

        Ok(())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.matching.result_cap == Some(0) {
            return Err(ConfigError::Invalid(
                "matching.result_cap must be at least 1".to_string(),
            ));
        }

        if self.text_service.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "text_service.timeout_secs must be at least 1".to_string(),
            ));
        }

        if let Some(endpoint) = &self.text_service.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "text_service.endpoint must be an http(s) URL, got '{endpoint}'"
                )));
            }
        }

        let mut tokens = HashSet::new();
        for user in &self.identity.users {
            if user.token.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "identity user '{}' has an empty token",
                    user.id
                )));
            }
            if !tokens.insert(user.token.trim()) {
                return Err(ConfigError::Invalid(format!(
                    "identity user '{}' reuses another user's token",
                    user.id
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::load_with(None, no_env).unwrap();
        assert!(config.directory.path.is_none());
        assert!(config.matching.result_cap.is_none());
        assert_eq!(config.text_service.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.server.port, 8080);
        assert!(!config.identity.allow_anonymous);
    }

    #[test]
    fn test_load_file() {
        let file = write_config(
            r#"
            [directory]
            path = "/var/lib/donor-match/directory.json"

            [matching]
            result_cap = 5

            [text_service]
            endpoint = "https://text.example.org/v1"
            timeout_secs = 10

            [[identity.users]]
            token = "abc"
            id = "coordinator-1"
            display_name = "Dhaka Coordinator"
            "#,
        );

        let config = Config::load_with(Some(file.path()), no_env).unwrap();
        assert_eq!(config.matching.result_cap, Some(5));
        assert_eq!(config.text_service.timeout_secs, 10);
        assert_eq!(config.identity.users.len(), 1);
        assert_eq!(config.server.address, "127.0.0.1");
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[matching]\nresult_cap = 5\n");
        let env = env_from(&[
            ("DONOR_MATCH_RESULT_CAP", "3"),
            ("DONOR_MATCH_SERVER_PORT", "9090"),
            ("DONOR_MATCH_TEXT_SERVICE_ENDPOINT", "http://localhost:7000"),
        ]);

        let config = Config::load_with(Some(file.path()), env).unwrap();
        assert_eq!(config.matching.result_cap, Some(3));
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.text_service.endpoint.as_deref(),
            Some("http://localhost:7000")
        );
    }

    #[test]
    fn test_invalid_env_value() {
        let env = env_from(&[("DONOR_MATCH_SERVER_PORT", "eighty")]);
        assert!(matches!(
            Config::load_with(None, env),
            Err(ConfigError::InvalidEnv { .. })
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let file = write_config("[matching]\nmax_results = 5\n");
        assert!(matches!(
            Config::load_with(Some(file.path()), no_env),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validation() {
        let file = write_config("[matching]\nresult_cap = 0\n");
        assert!(matches!(
            Config::load_with(Some(file.path()), no_env),
            Err(ConfigError::Invalid(_))
        ));

        let env = env_from(&[("DONOR_MATCH_TEXT_SERVICE_ENDPOINT", "ftp://example.org")]);
        assert!(Config::load_with(None, env).is_err());

        let file = write_config(
            r#"
            [[identity.users]]
            token = "same"
            id = "a"
            display_name = "A"

            [[identity.users]]
            token = "same"
            id = "b"
            display_name = "B"
            "#,
        );
        assert!(Config::load_with(Some(file.path()), no_env).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load_with(Some(Path::new("/nonexistent/donor-match.toml")), no_env);
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_text_service_not_built_without_endpoint() {
        let config = Config::default();
        assert!(config.text_service.build().unwrap().is_none());
    }
}
