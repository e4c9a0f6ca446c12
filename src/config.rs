use crate::error::ConfigError;
use crate::model::{Granularity, MarginPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub margin_policy: MarginPolicy,
    pub default_granularity: Granularity,
    /// Font with CJK glyphs, installed ahead of egui's defaults.
    pub font_path: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/total_summary.csv"),
            margin_policy: MarginPolicy::Omit,
            default_granularity: Granularity::Daily,
            font_path: None,
        }
    }
}

/// Reads `dashboard.toml` from the working directory, or the defaults when absent.
pub fn load_config() -> Result<DashboardConfig, ConfigError> {
    load_config_from(Path::new(CONFIG_FILE))
}

pub fn load_config_from(path: &Path) -> Result<DashboardConfig, ConfigError> {
    if !path.exists() {
        tracing::info!("{} not found, using defaults", path.display());
        return Ok(DashboardConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: DashboardConfig = toml::from_str(&contents)?;
    tracing::info!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.data_path, PathBuf::from("data/total_summary.csv"));
        assert_eq!(config.margin_policy, MarginPolicy::Omit);
        assert_eq!(config.default_granularity, Granularity::Daily);
        assert!(config.font_path.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "margin_policy = \"zero\"\ndefault_granularity = \"monthly\"").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.margin_policy, MarginPolicy::Zero);
        assert_eq!(config.default_granularity, Granularity::Monthly);
        assert_eq!(config.data_path, PathBuf::from("data/total_summary.csv"));
    }

    #[test]
    fn full_file() {
        let config: DashboardConfig = toml::from_str(
            r#"
data_path = "/srv/exports/summary.csv"
margin_policy = "omit"
default_granularity = "daily"
font_path = "fonts/NotoSansJP-Regular.ttf"
"#,
        )
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/srv/exports/summary.csv"));
        assert_eq!(config.font_path, Some(PathBuf::from("fonts/NotoSansJP-Regular.ttf")));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "margin_policy = \"nan\"").unwrap();
        assert!(matches!(load_config_from(file.path()), Err(ConfigError::Parse(_))));
    }
}
