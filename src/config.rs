//! Dashboard settings.
//!
//! Read from the JSON file named by `HOUSE_DASH_CONFIG`, else from
//! `house-dash.json` in the working directory when it exists. Every key is
//! optional.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "HOUSE_DASH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "house-dash.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset opened at startup when no path is given on the command line.
    pub data_path: Option<PathBuf>,
    /// Bins of the "properties built per year" histogram.
    pub histogram_bins: usize,
    pub window_width: f32,
    pub window_height: f32,
    /// Height of each chart in the central panel.
    pub chart_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            histogram_bins: 30,
            window_width: 1280.0,
            window_height: 900.0,
            chart_height: 320.0,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Resolve the config file from the environment, falling back to defaults
    /// when none is present.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::from_file(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn sanitized(mut self) -> Self {
        if self.histogram_bins == 0 {
            log::warn!("histogram_bins must be positive, using default");
            self.histogram_bins = Self::default().histogram_bins;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"histogram_bins": 12, "data_path": "train.csv"}}"#).unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.histogram_bins, 12);
        assert_eq!(config.data_path, Some(PathBuf::from("train.csv")));
        assert_eq!(config.chart_height, DashboardConfig::default().chart_height);
    }

    #[test]
    fn zero_bins_fall_back_to_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"histogram_bins": 0}}"#).unwrap();
        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.histogram_bins, 30);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = DashboardConfig::from_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}
