use cortex_core::ApiConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const DEFAULT_PANEL_WIDTH_PERCENT: u16 = 25;
const MAX_PANEL_WIDTH_PERCENT: u16 = 45;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("panel_width_percent must be between 1 and {max}, got {0}", max = MAX_PANEL_WIDTH_PERCENT)]
    PanelWidth(u16),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserConfig {
    #[serde(flatten)]
    pub api: ApiConfig,
    pub panel_width_percent: u16,
    /// Clear the displayed snapshot when a different user is opened.
    pub clear_snapshot_on_user_change: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            panel_width_percent: DEFAULT_PANEL_WIDTH_PERCENT,
            clear_snapshot_on_user_change: false,
        }
    }
}

impl BrowserConfig {
    pub fn with_overrides(mut self, api_host: Option<String>, api_port: Option<u16>) -> Self {
        if let Some(host) = api_host {
            self.api.api_host = host;
        }
        if let Some(port) = api_port {
            self.api.api_port = port;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.panel_width_percent == 0 || self.panel_width_percent > MAX_PANEL_WIDTH_PERCENT {
            return Err(ConfigError::PanelWidth(self.panel_width_percent));
        }
        Ok(())
    }
}

/// A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<BrowserConfig, ConfigError> {
    if !path.exists() {
        return Ok(BrowserConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: BrowserConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cortex/browser.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = load_config(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config, BrowserConfig::default());
        assert_eq!(config.api.base_url(), "http://127.0.0.1:5000");
    }

    #[test]
    fn file_values_are_read_flat() {
        let file = write_config(
            "api_host = \"10.0.0.5\"\napi_port = 8000\npanel_width_percent = 30\nclear_snapshot_on_user_change = true\n",
        );
        let config = load_config(file.path()).expect("config");
        assert_eq!(config.api.base_url(), "http://10.0.0.5:8000");
        assert_eq!(config.panel_width_percent, 30);
        assert!(config.clear_snapshot_on_user_change);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_config("api_port = 5001\n");
        let config = load_config(file.path()).expect("config");
        assert_eq!(config.api.api_host, "127.0.0.1");
        assert_eq!(config.api.api_port, 5001);
        assert_eq!(config.panel_width_percent, DEFAULT_PANEL_WIDTH_PERCENT);
    }

    #[test]
    fn invalid_width_is_rejected() {
        let file = write_config("panel_width_percent = 80\n");
        let err = load_config(file.path()).expect_err("width too large");
        assert!(matches!(err, ConfigError::PanelWidth(80)));
        assert!(err
            .to_string()
            .contains(&format!("between 1 and {MAX_PANEL_WIDTH_PERCENT}")));
    }

    #[test]
    fn malformed_file_reports_path() {
        let file = write_config("api_port = \"not a port\"\n");
        let err = load_config(file.path()).expect_err("parse error");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = BrowserConfig::default().with_overrides(Some("api.local".to_string()), None);
        assert_eq!(config.api.api_host, "api.local");
        assert_eq!(config.api.api_port, 5000);
    }
}
