//! # Application configuration: `alumni.toml`
//!
//! Settings that shape how the portal presents and stores data. Connection
//! secrets (backend URL and keys) come from the environment instead; see the
//! `api` crate.
//!
//! ## Structure
//!
//! ```toml
//! [display]
//! utc_offset_minutes = 330        # display timezone (IST)
//! description_preview_chars = 200
//!
//! [storage]
//! event_images_bucket = "events"
//! resumes_bucket = "resumes"
//!
//! [realtime]
//! heartbeat_secs = 30
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`AlumniConfig`] | Top-level config with TOML (de)serialisation and the canonical filename. |
//! | [`DisplayConfig`] | Display timezone and list preview length. |
//! | [`StorageConfig`] | Object-storage bucket names. |
//! | [`RealtimeConfig`] | Change-notification heartbeat interval. |
//!
//! Every field has a default, so a missing or empty file is equivalent to
//! the default configuration.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `alumni.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlumniConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
}

/// Presentation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Offset of the display timezone from UTC, in minutes.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    /// Description length shown on list cards before truncation.
    #[serde(default = "default_preview_chars")]
    pub description_preview_chars: usize,
}

fn default_utc_offset_minutes() -> i32 {
    330
}

fn default_preview_chars() -> usize {
    200
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            description_preview_chars: default_preview_chars(),
        }
    }
}

/// Object-storage buckets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_event_images_bucket")]
    pub event_images_bucket: String,
    #[serde(default = "default_resumes_bucket")]
    pub resumes_bucket: String,
}

fn default_event_images_bucket() -> String {
    "events".to_string()
}

fn default_resumes_bucket() -> String {
    "resumes".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            event_images_bucket: default_event_images_bucket(),
            resumes_bucket: default_resumes_bucket(),
        }
    }
}

/// Change-notification settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u32,
}

fn default_heartbeat_secs() -> u32 {
    30
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            heartbeat_secs: default_heartbeat_secs(),
        }
    }
}

impl AlumniConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "alumni.toml"
    }

    /// Display timezone. Out-of-range offsets fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.display.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let config = AlumniConfig::from_toml("").unwrap();
        assert_eq!(config, AlumniConfig::default());
        assert_eq!(config.offset().local_minus_utc(), 330 * 60);
        assert_eq!(config.storage.resumes_bucket, "resumes");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AlumniConfig::from_toml(
            "[display]\nutc_offset_minutes = -300\n\n[realtime]\nheartbeat_secs = 15\n",
        )
        .unwrap();
        assert_eq!(config.display.utc_offset_minutes, -300);
        assert_eq!(config.display.description_preview_chars, 200);
        assert_eq!(config.realtime.heartbeat_secs, 15);
        assert_eq!(config.storage.event_images_bucket, "events");

        let back = AlumniConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn absurd_offset_falls_back_to_utc() {
        let mut config = AlumniConfig::default();
        config.display.utc_offset_minutes = 100_000;
        assert_eq!(config.offset().local_minus_utc(), 0);
    }
}
