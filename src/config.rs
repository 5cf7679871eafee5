use clap::ValueEnum;
use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::GazetteError;
use crate::parser::{ExtractMode, ExtractOptions, DEFAULT_LOOKAHEAD};

pub const CONFIG_FILE: &str = "gazette";
pub const ENV_PREFIX: &str = "GAZETTE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: ExtractMode,
    pub lookahead_lines: usize,
    pub include_tier: bool,
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mode: ExtractMode::default(),
            lookahead_lines: DEFAULT_LOOKAHEAD,
            include_tier: false,
            format: OutputFormat::default(),
        }
    }
}

impl Settings {
    /// Defaults, then `gazette.toml` if present, then `GAZETTE_*` variables.
    pub fn load() -> Result<Self, GazetteError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
                .build()?,
        )
    }

    fn from_config(cfg: Config) -> Result<Self, GazetteError> {
        Ok(cfg.try_deserialize()?)
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            mode: self.mode,
            lookahead_lines: self.lookahead_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::FileFormat;

    fn from_toml(src: &str) -> Settings {
        let cfg = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()
            .unwrap();
        Settings::from_config(cfg).unwrap()
    }

    #[test]
    fn empty_source_gives_defaults() {
        let s = from_toml("");
        assert_eq!(s, Settings::default());
        assert_eq!(s.extract_options(), ExtractOptions::default());
    }

    #[test]
    fn overrides_from_toml() {
        let s = from_toml("mode = \"line-scan\"\nlookahead_lines = 3\ninclude_tier = true\nformat = \"json\"\n");
        assert_eq!(s.mode, ExtractMode::LineScan);
        assert_eq!(s.lookahead_lines, 3);
        assert!(s.include_tier);
        assert_eq!(s.format, OutputFormat::Json);
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let cfg = Config::builder()
            .add_source(File::from_str("mode = \"regex\"", FileFormat::Toml))
            .build()
            .unwrap();
        assert!(matches!(Settings::from_config(cfg), Err(GazetteError::Config(_))));
    }
}
