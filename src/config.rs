/*!
 * Configuration
 * Sizing parameters for the monitored spaces, fixed at runtime start
 */

use crate::core::errors::ConfigError;
use crate::core::limits::{
    DEFAULT_LOS_THRESHOLD, DEFAULT_SPACE_END, DEFAULT_SPACE_START, DEFAULT_TILE_SIZE, PAGE_SIZE,
};
use crate::core::serialization::json;
use crate::core::types::{Address, Size};
use crate::gcspy::TreadmillParams;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SpyConfig {
    pub server_name: String,
    pub tile_size: Size,
    pub page_size: Size,
    pub los_threshold: Size,
    pub space_start: Address,
    pub space_end: Address,
    pub main_space: bool,
    pub trace_json: bool,
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            server_name: "heapspy".to_string(),
            tile_size: DEFAULT_TILE_SIZE,
            page_size: PAGE_SIZE,
            los_threshold: DEFAULT_LOS_THRESHOLD,
            space_start: DEFAULT_SPACE_START,
            space_end: DEFAULT_SPACE_END,
            main_space: true,
            trace_json: false,
        }
    }
}

impl SpyConfig {
    /// Defaults overridden by `HEAPSPY_*` environment variables
    ///
    /// Variables: HEAPSPY_SERVER_NAME, HEAPSPY_TILE_SIZE, HEAPSPY_PAGE_SIZE,
    /// HEAPSPY_LOS_THRESHOLD, HEAPSPY_SPACE_START, HEAPSPY_SPACE_END,
    /// HEAPSPY_MAIN_SPACE, HEAPSPY_TRACE_JSON. Sizes and addresses accept
    /// decimal or `0x` hex.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`SpyConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("HEAPSPY_SERVER_NAME") {
            config.server_name = name;
        }
        let sizes: [(&str, &mut usize); 5] = [
            ("HEAPSPY_TILE_SIZE", &mut config.tile_size),
            ("HEAPSPY_PAGE_SIZE", &mut config.page_size),
            ("HEAPSPY_LOS_THRESHOLD", &mut config.los_threshold),
            ("HEAPSPY_SPACE_START", &mut config.space_start),
            ("HEAPSPY_SPACE_END", &mut config.space_end),
        ];
        for (key, slot) in sizes {
            if let Some(raw) = lookup(key) {
                *slot = parse_size(key, &raw)?;
            }
        }
        if let Some(raw) = lookup("HEAPSPY_MAIN_SPACE") {
            config.main_space = parse_flag(&raw);
        }
        if let Some(raw) = lookup("HEAPSPY_TRACE_JSON") {
            config.trace_json = parse_flag(&raw);
        }

        debug!(?config, "Configuration loaded from environment");
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string().into()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        if self.page_size == 0 || self.tile_size % self.page_size != 0 {
            return Err(ConfigError::TileSizeNotPageMultiple {
                tile_size: self.tile_size,
                page_size: self.page_size,
            });
        }
        if self.los_threshold == 0 {
            return Err(ConfigError::InvalidThreshold(self.los_threshold));
        }
        if self.space_end <= self.space_start {
            return Err(ConfigError::InvalidRange {
                start: self.space_start,
                end: self.space_end,
            });
        }
        Ok(())
    }

    /// Driver parameters for the large object space
    pub fn treadmill_params(&self) -> TreadmillParams {
        TreadmillParams {
            server_name: self.server_name.clone(),
            tile_size: self.tile_size,
            start: self.space_start,
            end: self.space_end,
            threshold: self.los_threshold,
            main_space: self.main_space,
        }
    }
}

fn parse_size(key: &str, raw: &str) -> Result<usize, ConfigError> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| ConfigError::Parse(format!("{}={}: {}", key, raw, e).into()))
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "1" | "true" | "yes")
}
