//! Generator configuration, loadable from `rowforge.toml`

use crate::error::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Native integer width of the target platform.
///
/// Resolved once at generation configuration time; width-aware numeric
/// narrowing picks its concrete type from this instead of emitting
/// conditional compilation into the output.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NativeWidth {
    W32,
    #[default]
    W64,
}

impl NativeWidth {
    pub const fn bits(self) -> u32 {
        match self {
            NativeWidth::W32 => 32,
            NativeWidth::W64 => 64,
        }
    }
}

/// Settings consumed by the generation pass.
///
/// The binding mode is not configured here: it travels with the database
/// model, which is the generator's sole input besides these settings.
#[derive(Deserialize, Clone, Debug)]
pub struct GeneratorConfig {
    /// Target platform's native integer width
    #[serde(default)]
    pub width: NativeWidth,
    /// Directory receiving one generated unit per database
    #[serde(default = "default_out")]
    pub out: PathBuf,
}

fn default_out() -> PathBuf {
    PathBuf::from(".")
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: NativeWidth::default(),
            out: default_out(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
