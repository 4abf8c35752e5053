//! Optional TOML configuration.
//!
//! ```toml
//! max_diagnostics = 20
//!
//! [renames]
//! qty = "quantity"
//! ```

use std::path::Path;

use cellex_core::{ParseOptions, Renames, DEFAULT_MAX_DIAGNOSTICS};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub max_diagnostics: usize,
    pub renames: Renames,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
            renames: Renames::new(),
        }
    }
}

impl Config {
    /// Read `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Config, String> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        Config::from_toml(&text).map_err(|e| format!("invalid config {}: {}", path.display(), e))
    }

    fn from_toml(text: &str) -> Result<Config, toml::de::Error> {
        let config: Config = toml::from_str(text)?;
        tracing::debug!(
            max_diagnostics = config.max_diagnostics,
            renames = !config.renames.is_empty(),
            "loaded config"
        );
        Ok(config)
    }

    pub fn options(&self) -> ParseOptions {
        ParseOptions {
            max_diagnostics: self.max_diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.max_diagnostics, DEFAULT_MAX_DIAGNOSTICS);
        assert!(config.renames.is_empty());
    }

    #[test]
    fn renames_table_is_read() {
        let config = Config::from_toml("max_diagnostics = 3\n[renames]\nqty = \"quantity\"\n").unwrap();
        assert_eq!(config.options().max_diagnostics, 3);
        assert_eq!(config.renames.apply("qty"), "quantity");
        assert_eq!(config.renames.apply("price"), "price");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("max_diagnostic = 3").is_err());
    }
}
