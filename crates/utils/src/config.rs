use std::{fmt::Display, fs, path::Path};

use serde::{de, Deserialize, Deserializer};

/// Top-level configuration for Maileon transactional delivery.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub maileon: MaileonConfig,
}

/// Settings of the Maileon transaction delivery method.
#[derive(Debug, Clone, Deserialize)]
pub struct MaileonConfig {
    /// API key used to authenticate against the Maileon REST API.
    pub api_key: String,

    /// Logs request and response bodies at debug level.
    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds, at least 1.
    #[serde(default = "default_timeout", deserialize_with = "deserialize_timeout")]
    pub timeout: u64,

    /// Permission given to contacts imported with each transaction.
    #[serde(default)]
    pub permission: Permission,
}

impl MaileonConfig {
    /// Creates a configuration with the given API key and every other
    /// setting at its default.
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            debug: false,
            base_url: default_base_url(),
            timeout: default_timeout(),
            permission: Permission::default(),
        }
    }
}

/// Contact permission levels understood by Maileon.
///
/// Serialized as the numeric code Maileon expects (1 to 6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum Permission {
    None,
    SingleOptIn,
    ConfirmedOptIn,
    DoubleOptIn,
    /// Double opt-in with single user tracking. Used until the permission
    /// can be resolved per contact.
    #[default]
    DoubleOptInPlus,
    Other,
}

impl Permission {
    /// Returns the numeric code of this permission in the Maileon API.
    pub fn code(self) -> u8 {
        match self {
            Permission::None => 1,
            Permission::SingleOptIn => 2,
            Permission::ConfirmedOptIn => 3,
            Permission::DoubleOptIn => 4,
            Permission::DoubleOptInPlus => 5,
            Permission::Other => 6,
        }
    }
}

impl TryFrom<u8> for Permission {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Permission::None),
            2 => Ok(Permission::SingleOptIn),
            3 => Ok(Permission::ConfirmedOptIn),
            4 => Ok(Permission::DoubleOptIn),
            5 => Ok(Permission::DoubleOptInPlus),
            6 => Ok(Permission::Other),
            _ => Err(format!("invalid permission code {code}, expected 1 to 6")),
        }
    }
}

/// Loads configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Errors that can occur while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred reading the file.
    Io(std::io::Error),
    /// A parse error occurred deserializing TOML.
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "Config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_base_url() -> String {
    "https://api.maileon.com/1.0".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn deserialize_timeout<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let timeout = u64::deserialize(deserializer)?;
    if timeout == 0 {
        return Err(de::Error::custom("timeout must be at least 1 second"));
    }
    Ok(timeout)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[maileon]
api_key = "xxxxxx-yyy-xxx-yyyyyy"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.maileon.api_key, "xxxxxx-yyy-xxx-yyyyyy");
        assert!(!config.maileon.debug);
        assert_eq!(config.maileon.base_url, "https://api.maileon.com/1.0");
        assert_eq!(config.maileon.timeout, 30);
        assert_eq!(config.maileon.permission, Permission::DoubleOptInPlus);
        assert_eq!(config.maileon.permission.code(), 5);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[maileon]
api_key = "key"
debug = true
base_url = "http://localhost:8080/1.0"
timeout = 5
permission = 4
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.maileon.debug);
        assert_eq!(config.maileon.base_url, "http://localhost:8080/1.0");
        assert_eq!(config.maileon.timeout, 5);
        assert_eq!(config.maileon.permission, Permission::DoubleOptIn);
    }

    #[test]
    fn test_parse_missing_api_key() {
        let toml = r#"
[maileon]
debug = true
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_parse_invalid_permission() {
        let toml = r#"
[maileon]
api_key = "key"
permission = 9
"#;
        let result = toml::from_str::<Config>(toml);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("invalid permission code 9"));
    }

    #[test]
    fn test_parse_zero_timeout() {
        let toml = r#"
[maileon]
api_key = "key"
timeout = 0
"#;
        let result = toml::from_str::<Config>(toml);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("timeout must be at least 1 second"));
    }

    #[test]
    fn test_load_config_zero_timeout() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[maileon]\napi_key = \"key\"\ntimeout = 0").unwrap();

        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_permission_codes() {
        for code in 1..=6u8 {
            let permission = Permission::try_from(code).unwrap();
            assert_eq!(permission.code(), code);
        }
        assert!(Permission::try_from(0).is_err());
        assert!(Permission::try_from(7).is_err());
    }

    #[test]
    fn test_maileon_config_new() {
        let config = MaileonConfig::new("key");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.timeout, 30);
        assert_eq!(config.permission, Permission::DoubleOptInPlus);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[maileon]\napi_key = \"from-file\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.maileon.api_key, "from-file");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[maileon").unwrap();

        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
