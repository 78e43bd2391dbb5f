use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Output encoding of a computed chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "json")]
    #[default]
    Json,
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub render: RenderOptions,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("cleaned_hotel_bookings.csv")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
data_path = "cleaned_hotel_bookings.csv"
log_level = "info"

[render]
width = 800
height = 600
type = "json"
"#;

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            log_level: default_log_level(),
            render: RenderOptions::default(),
        }
    }
}

impl Config {
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("Failed to parse configuration")
    }

    /// Load `path` if given, otherwise the embedded default.
    ///
    /// Runs before logging is initialised, so nothing is logged here.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_toml(&contents)
                    .with_context(|| format!("Invalid config file {}", path.display()))
            }
            None => Self::from_toml(DEFAULT_CONFIG),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_loads() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.render.format, OutputFormat::Json);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_path = \"/data/bookings.csv\"\n[render]\ntype = \"svg\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/data/bookings.csv"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.render.format, OutputFormat::Svg);
        assert_eq!((config.render.width, config.render.height), (800, 600));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Config::from_toml("[render]\ntype = \"gif\"").is_err());
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = Config::load(Some(Path::new("/nonexistent/hotelviz.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/hotelviz.toml"));
    }
}
