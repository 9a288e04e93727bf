use std::path::{Path, PathBuf};

use graph_lens_core::{HopLimit, Mode, DEFAULT_MAX_HOPS};
use serde::{Deserialize, Serialize};

pub const MIN_MAX_HOPS: u32 = 1;
pub const MAX_MAX_HOPS: u32 = 1000;

pub const MIN_SOURCE_BYTES: usize = 1024;
pub const MAX_SOURCE_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Session configuration, read from a TOML file.
///
/// Integer settings carry a min/max range; out-of-range values are
/// clamped with a warning rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Hop limit for new selections and for unusable hop input.
    pub default_max_hops: u32,
    /// Traversal mode selected at startup.
    pub default_mode: Mode,
    /// Sources larger than this are refused before scanning.
    pub max_source_bytes: usize,
    /// Auto-apply state used when no preference has been stored yet.
    pub auto_apply_default: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_max_hops: DEFAULT_MAX_HOPS,
            default_mode: Mode::Downstream,
            max_source_bytes: 4 * 1024 * 1024,
            auto_apply_default: true,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text. Missing keys take defaults.
    pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(text)?;
        Ok(settings.clamped())
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&text)?;
        tracing::info!("graph_lens: settings loaded from {}", path.display());
        Ok(settings)
    }

    fn clamped(mut self) -> Self {
        self.default_max_hops = clamp(
            "default_max_hops",
            self.default_max_hops,
            MIN_MAX_HOPS,
            MAX_MAX_HOPS,
        );
        self.max_source_bytes = clamp(
            "max_source_bytes",
            self.max_source_bytes,
            MIN_SOURCE_BYTES,
            MAX_SOURCE_BYTES,
        );
        self
    }

    pub fn default_hop_limit(&self) -> HopLimit {
        HopLimit::new(self.default_max_hops).unwrap_or_default()
    }
}

fn clamp<T: PartialOrd + Copy + std::fmt::Display>(name: &str, value: T, min: T, max: T) -> T {
    let clamped = if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    };
    if clamped != value {
        tracing::warn!(
            "graph_lens: {} = {} out of range [{}, {}], using {}",
            name,
            value,
            min,
            max,
            clamped
        );
    }
    clamped
}
