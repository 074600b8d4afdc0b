//! Process configuration.
//!
//! Loaded once at startup from an optional YAML file, then overridden by
//! environment variables:
//!
//! ```yaml
//! server:
//!   addr: "0.0.0.0:8080"
//! log:
//!   level: info        # any EnvFilter directive, e.g. "gatehouse=debug,info"
//!   format: text       # text | json
//! ```
//!
//! | Variable | Overrides |
//! |---|---|
//! | `GATEHOUSE_ADDR` | `server.addr` |
//! | `GATEHOUSE_LOG_LEVEL` | `log.level` |
//! | `GATEHOUSE_LOG_FORMAT` | `log.format` |

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::logging::LogFormat;

const ENV_PREFIX: &str = "GATEHOUSE";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: SocketAddr::from(([0, 0, 0, 0], 8080)) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::Text }
    }
}

impl Config {
    /// Loads `path` when given, defaults otherwise, then applies the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), Error> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));

        if let Some(addr) = var("ADDR") {
            self.server.addr = addr
                .parse()
                .map_err(|e| Error::config(format!("{ENV_PREFIX}_ADDR `{addr}`: {e}")))?;
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.log.format = format.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.log.level.trim().is_empty() {
            return Err(Error::config("log.level must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_listen_on_8080_with_text_logs() {
        let config = Config::default();
        assert_eq!(config.server.addr.port(), 8080);
        assert_eq!(config.log.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = Config::from_yaml("log:\n  format: json\n").unwrap();
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  addr: \"127.0.0.1:9000\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_yaml("server:\n  port: 80\n"),
            Err(Error::ConfigParse(_)),
        ));
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("GATEHOUSE_ADDR", "127.0.0.1:3000"),
            ("GATEHOUSE_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::from_yaml("log:\n  level: warn\n").unwrap();
        config.apply_env(|k| env.get(k).map(|v| (*v).to_owned())).unwrap();

        assert_eq!(config.server.addr.port(), 3000);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn bad_env_addr_is_a_config_error() {
        let mut config = Config::default();
        let err = config
            .apply_env(|k| (k == "GATEHOUSE_ADDR").then(|| "not-an-addr".to_owned()))
            .unwrap_err();
        assert!(err.to_string().contains("GATEHOUSE_ADDR"));
    }

    #[test]
    fn blank_level_fails_validation() {
        let mut config = Config::default();
        config.log.level = "  ".to_owned();
        assert!(config.validate().is_err());
    }
}
