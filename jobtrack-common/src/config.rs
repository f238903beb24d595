//! Bootstrap configuration loading and resolution
//!
//! Configuration sources, highest priority first:
//! 1. Command-line argument (`--config PATH`)
//! 2. Environment variable (`JOBTRACK_CONFIG`)
//! 3. User TOML config file (`<config_dir>/jobtrack/config.toml`)
//! 4. Compiled defaults (the production source registry)
//!
//! A missing file at tier 3 is not an error: the compiled defaults are used
//! and reported as [`ConfigOrigin::CompiledDefaults`]. A file named
//! explicitly at tier 1 or 2 must exist and parse.
//!
//! Resolution runs before logging is set up, so it does not log; callers
//! report the returned origin.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "JOBTRACK_CONFIG";

const DEFAULT_BASE_URL: &str = "https://app.herofashion.com";
const DEFAULT_USER_AGENT: &str = "jobtrack/0.1";

/// Complete bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Registered data sources (exactly one must be primary)
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,

    /// HTTP client settings for the fetch cycle
    #[serde(default)]
    pub http: HttpConfig,

    /// Visible window sizing
    #[serde(default)]
    pub window: WindowConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One registered data source
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// Source name, used as the linked-report label
    pub name: String,
    /// Endpoint returning a JSON record list (or a bare record)
    pub url: String,
    /// Field holding the job identifier in this source's records
    pub join_key: String,
    /// Whether this is the order-header source that defines the job set
    #[serde(default)]
    pub primary: bool,
}

impl SourceConfig {
    fn production(name: &str, join_key: &str, primary: bool) -> Self {
        Self {
            name: name.to_string(),
            url: format!("{}/{}/", DEFAULT_BASE_URL, name),
            join_key: join_key.to_string(),
            primary,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Visible window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WindowConfig {
    /// Items visible after every new query
    #[serde(default = "default_window_size")]
    pub initial: usize,

    /// Items added per grow signal
    #[serde(default = "default_window_size")]
    pub step: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            initial: default_window_size(),
            step: default_window_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::production("order_panda", "jobno_oms", true),
        SourceConfig::production("ordmatpen", "orderno", false),
        SourceConfig::production("accessory", "orderno", false),
        SourceConfig::production("Allotpen", "jobno_oms", false),
        SourceConfig::production("knitst", "orderno", false),
        SourceConfig::production("Fabst", "jobno_fabric_status", false),
        SourceConfig::production("Fabyarn", "orderno", false),
    ]
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_window_size() -> usize {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            http: HttpConfig::default(),
            window: WindowConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(message) => Error::Config(format!("{}: {}", path.display(), message)),
            other => other,
        })
    }

    /// Check the invariants every consumer relies on
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(Error::Config("At least one source is required".to_string()));
        }

        let primaries = self.sources.iter().filter(|s| s.primary).count();
        if primaries != 1 {
            return Err(Error::Config(format!(
                "Exactly one primary source is required, found {}",
                primaries
            )));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(Error::Config("Source name must not be empty".to_string()));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(Error::Config(format!("Duplicate source name '{}'", source.name)));
            }
            if source.url.trim().is_empty() {
                return Err(Error::Config(format!("Source '{}' has no url", source.name)));
            }
            if source.join_key.trim().is_empty() {
                return Err(Error::Config(format!("Source '{}' has no join_key", source.name)));
            }
        }

        if self.window.initial == 0 || self.window.step == 0 {
            return Err(Error::Config("Window initial and step must be at least 1".to_string()));
        }

        Ok(())
    }

    /// The primary (order-header) source
    pub fn primary_source(&self) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.primary)
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserFile(PathBuf),
    CompiledDefaults,
}

/// Resolves the effective configuration following the priority order above
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
    user_config_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create a resolver; `cli_path` is the `--config` argument, if given
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self {
            cli_path,
            user_config_path: default_user_config_path(),
        }
    }

    /// Override the tier-3 user config location
    pub fn with_user_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.user_config_path = path;
        self
    }

    /// Determine which tier supplies the configuration
    pub fn origin(&self) -> ConfigOrigin {
        if let Some(path) = &self.cli_path {
            return ConfigOrigin::CommandLine(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigOrigin::Environment(PathBuf::from(path));
            }
        }

        match &self.user_config_path {
            Some(path) if path.exists() => ConfigOrigin::UserFile(path.clone()),
            _ => ConfigOrigin::CompiledDefaults,
        }
    }

    /// Load the configuration from the highest-priority tier available
    pub fn resolve(&self) -> Result<(TomlConfig, ConfigOrigin)> {
        let origin = self.origin();
        let config = match &origin {
            ConfigOrigin::CommandLine(path) | ConfigOrigin::Environment(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                TomlConfig::load(path)?
            }
            ConfigOrigin::UserFile(path) => TomlConfig::load(path)?,
            ConfigOrigin::CompiledDefaults => TomlConfig::default(),
        };

        Ok((config, origin))
    }
}

/// Platform config location: `<config_dir>/jobtrack/config.toml`
fn default_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("jobtrack").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TomlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sources.len(), 7);
        assert_eq!(config.primary_source().unwrap().name, "order_panda");
        assert_eq!(config.window, WindowConfig { initial: 20, step: 20 });
    }

    #[test]
    fn test_default_production_urls() {
        let config = TomlConfig::default();
        let fabst = config.sources.iter().find(|s| s.name == "Fabst").unwrap();
        assert_eq!(fabst.url, "https://app.herofashion.com/Fabst/");
        assert_eq!(fabst.join_key, "jobno_fabric_status");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.sources.len(), 7);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_two_primaries_rejected() {
        let toml = r#"
            [[sources]]
            name = "a"
            url = "http://localhost/a"
            join_key = "id"
            primary = true

            [[sources]]
            name = "b"
            url = "http://localhost/b"
            join_key = "id"
            primary = true
        "#;
        let err = TomlConfig::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("Exactly one primary"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let toml = r#"
            [[sources]]
            name = "a"
            url = "http://localhost/a"
            join_key = "id"
            primary = true

            [[sources]]
            name = "a"
            url = "http://localhost/b"
            join_key = "id"
        "#;
        let err = TomlConfig::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("Duplicate source name"));
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = TomlConfig::from_toml_str("[window]\nstep = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
