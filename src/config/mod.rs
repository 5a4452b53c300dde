use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Log output format
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
    /// Log level, default is "info"
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// One logical table served under `/<name>/...`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub name: String,
    /// "set" or "map"
    pub kind: String,
    /// Backing file
    pub path: PathBuf,
}

impl TableConfig {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            path: path.into(),
        }
    }
}

/// LineDB configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// HTTP listening address
    #[serde(default = "default_server_addr")]
    pub server_addr: String,

    /// Save every table when the server shuts down gracefully
    #[serde(default = "default_save_on_shutdown")]
    pub save_on_shutdown: bool,

    /// Request body limit for add/del
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Log configuration
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default = "default_tables")]
    pub tables: Vec<TableConfig>,
}

fn default_server_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_save_on_shutdown() -> bool {
    true
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_tables() -> Vec<TableConfig> {
    vec![
        TableConfig::new("src.acl", "set", "src.acl"),
        TableConfig::new("path.map", "map", "path.map"),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: default_server_addr(),
            save_on_shutdown: default_save_on_shutdown(),
            max_body_bytes: default_max_body_bytes(),
            log: LogConfig::default(),
            tables: default_tables(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)?;
        let config = Self::from_toml(&config_str).map_err(|e| match e {
            Error::InvalidConfig(msg) => {
                Error::InvalidConfig(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        Ok(config)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(config_str).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check table names; store kinds are checked when the stores are built
    pub fn validate(&self) -> Result<()> {
        if self.tables.is_empty() {
            return Err(Error::InvalidConfig("no tables configured".to_string()));
        }
        let mut seen = HashSet::new();
        for table in &self.tables {
            if !is_valid_table_name(&table.name) {
                return Err(Error::InvalidConfig(format!(
                    "invalid table name '{}'",
                    table.name
                )));
            }
            if !seen.insert(table.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate table name '{}'",
                    table.name
                )));
            }
        }
        Ok(())
    }
}

/// Table names become the first path segment of their routes, so only
/// ASCII letters, digits, `.`, `-` and `_` are allowed.
pub fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:8080");
        assert!(config.save_on_shutdown);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Compact);
        assert_eq!(config.tables.len(), 2);
        assert_eq!(config.tables[0], TableConfig::new("src.acl", "set", "src.acl"));
        assert_eq!(config.tables[1], TableConfig::new("path.map", "map", "path.map"));
    }

    #[test]
    fn test_full_config() {
        let config_str = r#"
server_addr = "127.0.0.1:9000"
save_on_shutdown = false
max_body_bytes = 1024

[log]
level = "debug"
format = "json"

[[tables]]
name = "acl"
kind = "set"
path = "/var/lib/linedb/acl.txt"

[[tables]]
name = "routes"
kind = "map"
path = "/var/lib/linedb/routes.txt"
"#;

        let config = Config::from_toml(config_str).unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:9000");
        assert!(!config.save_on_shutdown);
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.tables[1].name, "routes");
        assert_eq!(config.tables[1].path, PathBuf::from("/var/lib/linedb/routes.txt"));
    }

    #[test]
    fn test_sample_config_parses() {
        let config = Config::from_toml(include_str!("../../linedb.toml")).unwrap();
        assert_eq!(config.tables, default_tables());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let config_str = r#"
[[tables]]
name = "t"
kind = "set"
path = "a"

[[tables]]
name = "t"
kind = "map"
path = "b"
"#;
        let err = Config::from_toml(config_str).unwrap_err();
        assert!(err.to_string().contains("duplicate table name"));
    }

    #[test]
    fn test_rejects_slash_in_name() {
        let config_str = r#"
[[tables]]
name = "a/b"
kind = "set"
path = "a"
"#;
        assert!(matches!(
            Config::from_toml(config_str),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_route_syntax_in_name() {
        for name in ["*x", ":id", "{t}", "a b", "a?b", ""] {
            let config_str = format!(
                "[[tables]]\nname = \"{}\"\nkind = \"set\"\npath = \"a\"\n",
                name
            );
            let err = Config::from_toml(&config_str).unwrap_err();
            assert!(err.to_string().contains("invalid table name"), "{}", name);
        }
    }

    #[test]
    fn test_table_name_charset() {
        assert!(is_valid_table_name("path.map"));
        assert!(is_valid_table_name("src-acl_2"));
        assert!(!is_valid_table_name("*x"));
        assert!(!is_valid_table_name(":id"));
        assert!(!is_valid_table_name("{t}"));
    }

    #[test]
    fn test_rejects_empty_table_list() {
        assert!(Config::from_toml("tables = []").is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            Config::from_toml("server_addr = "),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/linedb.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
