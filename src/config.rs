//! Configuration for turning discovered module keys into route patterns.
//!
//! ```toml
//! routes_dir = "./routes"
//! api_suffix = ".api.rs"
//! page_suffix = ".page.rs"
//! ```
//!
//! Every field is optional and falls back to the values above.
use crate::error::Error;

use std::fs;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Prefix shared by every module key, stripped to form the pattern.
    pub routes_dir: String,
    /// File-type suffix of API modules.
    pub api_suffix: String,
    /// File-type suffix of page modules.
    pub page_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routes_dir: "./routes".to_owned(),
            api_suffix: ".api.rs".to_owned(),
            page_suffix: ".page.rs".to_owned(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
