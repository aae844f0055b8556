//! TOML configuration file loading
//!
//! Supports `~/.config/netconf-eventsource/config.toml` as a persistent config
//! source. All fields are optional: the file is a partial overlay on top of
//! defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct EventSourceConfigFile {
    /// Schema repository settings
    #[serde(default)]
    pub schemas: SchemasFileConfig,

    /// Logging settings
    #[serde(default)]
    pub log: LogFileConfig,
}

/// Schema repository configuration
#[derive(Debug, Default, Deserialize)]
pub struct SchemasFileConfig {
    /// Directory of `.yang` sources
    pub dir: Option<String>,
}

/// Logging configuration
#[derive(Debug, Default, Deserialize)]
pub struct LogFileConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. "info,netconf_eventsource=debug"
    pub filter: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `EventSourceConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> EventSourceConfigFile {
    config_file_path().map_or_else(EventSourceConfigFile::default, |p| load_from(&p))
}

/// Load a config file from `path`, falling back to defaults
pub fn load_from(path: &Path) -> EventSourceConfigFile {
    if !path.exists() {
        return EventSourceConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                EventSourceConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            EventSourceConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/netconf-eventsource/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("netconf-eventsource")
            .join("config.toml")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[schemas]\ndir = \"/srv/yang\"\n").unwrap();

        let config = load_from(&path);
        assert_eq!(config.schemas.dir.as_deref(), Some("/srv/yang"));
        assert!(config.log.filter.is_none());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[schemas\ndir = ").unwrap();

        assert!(load_from(&path).schemas.dir.is_none());
    }

    #[test]
    fn malformed_file_is_reported() {
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[log\nfilter = ").unwrap();

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || load_from(&path));

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("failed to parse config file"), "{output}");
    }

    #[test]
    fn missing_file_is_default() {
        let config = load_from(Path::new("/nonexistent/config.toml"));
        assert!(config.schemas.dir.is_none());
    }
}
