use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

const CONFIG_FILE: &str = ".feature-sync.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing {0}: set it on the command line, in .feature-sync.toml or in the environment")]
    Missing(&'static str),
}

/// Top-level configuration loaded from .feature-sync.toml.
/// Every field is optional; command-line flags override the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// GitHub settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Jira settings
    #[serde(default)]
    pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// If None, falls back to the GITHUB_USER env var.
    pub user: Option<String>,
    /// If None, falls back to the GITHUB_PASSWORD env var.
    pub password: Option<String>,
    /// Suffix identifying specification files
    pub extension: String,
    pub accept_invalid_certs: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            user: None,
            password: None,
            extension: ".feature".to_string(),
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Jira base URL (e.g., "https://jira.example.com")
    pub server: Option<String>,
    /// If None, falls back to the JIRA_USER env var.
    pub user: Option<String>,
    /// If None, falls back to the JIRA_PASS env var.
    pub password: Option<String>,
    /// Skip certificate validation (on by default for the tracker)
    pub accept_invalid_certs: bool,
    #[serde(flatten)]
    pub settings: TrackerSettings,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            server: None,
            user: None,
            password: None,
            accept_invalid_certs: true,
            settings: TrackerSettings::default(),
        }
    }
}

/// Fixed values written on every test case the synchronizer creates, plus the
/// custom field ids they go into.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Project key (e.g., "PROJ"); the `--project` flag overrides it
    pub project_key: String,
    pub project_id: String,
    pub issue_type: String,
    pub execution_mode: String,
    pub automation_candidate: String,
    pub priority: String,
    pub reviewed: String,
    /// Link type connecting a requirement to its test cases
    pub link_type: String,
    pub fields: FieldIds,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            project_key: String::new(),
            project_id: "10500".to_string(),
            issue_type: "Test Case".to_string(),
            execution_mode: "Automatic".to_string(),
            automation_candidate: "Unknown".to_string(),
            priority: "High".to_string(),
            reviewed: "Yes".to_string(),
            link_type: "is tested by".to_string(),
            fields: FieldIds::default(),
        }
    }
}

/// Jira custom field ids of the test case issue type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldIds {
    pub pre_requisite: String,
    pub procedure: String,
    pub expected: String,
    pub dataset: String,
    pub execution_mode: String,
    pub automation_candidate: String,
    pub priority: String,
    pub reviewed: String,
}

impl Default for FieldIds {
    fn default() -> Self {
        Self {
            pre_requisite: "customfield_10070".to_string(),
            procedure: "customfield_10071".to_string(),
            expected: "customfield_10072".to_string(),
            dataset: "customfield_10153".to_string(),
            execution_mode: "customfield_10150".to_string(),
            automation_candidate: "customfield_10161".to_string(),
            priority: "customfield_10152".to_string(),
            reviewed: "customfield_10162".to_string(),
        }
    }
}

/// Basic-auth user and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from .feature-sync.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    /// Credentials missing from the file are taken from the environment.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        fill_from_env(&mut config.source.user, "GITHUB_USER");
        fill_from_env(&mut config.source.password, "GITHUB_PASSWORD");
        fill_from_env(&mut config.tracker.user, "JIRA_USER");
        fill_from_env(&mut config.tracker.password, "JIRA_PASS");

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn source_credentials(&self) -> Result<Credentials, ConfigError> {
        Ok(Credentials {
            user: self.source.user.clone().ok_or(ConfigError::Missing("GitHub user"))?,
            password: self
                .source
                .password
                .clone()
                .ok_or(ConfigError::Missing("GitHub password"))?,
        })
    }

    pub fn tracker_credentials(&self) -> Result<Credentials, ConfigError> {
        Ok(Credentials {
            user: self.tracker.user.clone().ok_or(ConfigError::Missing("Jira user"))?,
            password: self
                .tracker
                .password
                .clone()
                .ok_or(ConfigError::Missing("Jira password"))?,
        })
    }

    pub fn tracker_server(&self) -> Result<&str, ConfigError> {
        self.tracker
            .server
            .as_deref()
            .ok_or(ConfigError::Missing("Jira server URL"))
    }
}

fn fill_from_env(slot: &mut Option<String>, var: &str) {
    if slot.is_none() {
        if let Ok(value) = std::env::var(var) {
            *slot = Some(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.tracker.server.is_none());
        assert!(config.tracker.accept_invalid_certs);
        assert!(!config.source.accept_invalid_certs);
        assert_eq!(config.source.extension, ".feature");
        assert_eq!(config.tracker.settings.link_type, "is tested by");
        assert_eq!(config.tracker.settings.fields.dataset, "customfield_10153");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[source]
user = "bot"

[tracker]
server = "https://jira.example.com"
project_id = "20000"
priority = "Low"

[tracker.fields]
procedure = "customfield_1"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source.user.as_deref(), Some("bot"));
        assert_eq!(config.source.extension, ".feature");
        assert_eq!(config.tracker_server().unwrap(), "https://jira.example.com");
        assert_eq!(config.tracker.settings.project_id, "20000");
        assert_eq!(config.tracker.settings.priority, "Low");
        assert_eq!(config.tracker.settings.issue_type, "Test Case");
        assert_eq!(config.tracker.settings.fields.procedure, "customfield_1");
        assert_eq!(config.tracker.settings.fields.expected, "customfield_10072");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("feature-sync-test-config.toml");
        std::fs::write(&path, "[tracker]\nlink_type = \"tests\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.tracker.settings.link_type, "tests");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_credentials() {
        let config = Config::default();
        assert!(matches!(
            config.tracker_credentials(),
            Err(ConfigError::Missing("Jira user"))
        ));
        assert!(matches!(config.tracker_server(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials {
            user: "bot".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }
}
