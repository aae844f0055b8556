//! Configuration management

pub mod file;

use std::path::PathBuf;

use crate::{Error, Result};

/// Environment variable overriding the schema directory
pub const SCHEMA_DIR_ENV: &str = "EVENTSOURCE_SCHEMA_DIR";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "EVENTSOURCE_LOG";

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of `.yang` sources served by the resolver
    pub schema_dir: PathBuf,

    /// Log filter directive, `None` to derive it from verbosity
    pub log_filter: Option<String>,
}

impl Config {
    /// Load configuration (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if the schema directory exists but is not a directory
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::resolve(
            std::env::var(SCHEMA_DIR_ENV).ok(),
            std::env::var(LOG_FILTER_ENV).ok(),
            fc,
        )
    }

    /// Merge environment values over a parsed config file
    ///
    /// # Errors
    ///
    /// Returns error if the schema directory exists but is not a directory
    pub fn resolve(
        env_schema_dir: Option<String>,
        env_log_filter: Option<String>,
        fc: file::EventSourceConfigFile,
    ) -> Result<Self> {
        let schema_dir = env_schema_dir
            .or(fc.schemas.dir)
            .map_or_else(default_schema_dir, PathBuf::from);

        if schema_dir.exists() && !schema_dir.is_dir() {
            return Err(Error::Config(format!(
                "schema path {} is not a directory",
                schema_dir.display()
            )));
        }

        Ok(Self {
            schema_dir,
            log_filter: env_log_filter.or(fc.log.filter),
        })
    }
}

/// Default schema directory: `~/.local/share/netconf-eventsource/schemas/`
fn default_schema_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".local/share/netconf-eventsource/schemas"),
        |d| d.data_dir().join("netconf-eventsource").join("schemas"),
    )
}

#[cfg(test)]
mod tests {
    use super::file::{EventSourceConfigFile, LogFileConfig, SchemasFileConfig};
    use super::*;

    fn file_config(dir: Option<&str>, filter: Option<&str>) -> EventSourceConfigFile {
        EventSourceConfigFile {
            schemas: SchemasFileConfig {
                dir: dir.map(ToString::to_string),
            },
            log: LogFileConfig {
                filter: filter.map(ToString::to_string),
            },
        }
    }

    #[test]
    fn env_overrides_file() {
        let config = Config::resolve(
            Some("/env/yang".to_string()),
            None,
            file_config(Some("/file/yang"), Some("debug")),
        )
        .unwrap();

        assert_eq!(config.schema_dir, PathBuf::from("/env/yang"));
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn file_used_when_env_absent() {
        let config = Config::resolve(None, None, file_config(Some("/file/yang"), None)).unwrap();
        assert_eq!(config.schema_dir, PathBuf::from("/file/yang"));
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = Config::resolve(None, None, EventSourceConfigFile::default()).unwrap();
        assert!(config.schema_dir.ends_with("schemas"));
    }

    #[test]
    fn rejects_file_as_schema_dir() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = Config::resolve(
            Some(file.path().display().to_string()),
            None,
            EventSourceConfigFile::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
