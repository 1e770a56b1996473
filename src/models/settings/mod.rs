// Settings module
// App-local preferences, persisted outside the schedule document.

use serde::{Deserialize, Serialize};

/// Process-wide clock label format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
    #[serde(rename = "12h")]
    TwelveHour,
}

/// Preferences stored in the app settings file (TOML).
///
/// These live beside, not inside, the schedule document: they describe the
/// local installation, not the shared data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub time_format: TimeFormat,
    /// Base URL of the remote share backend; empty when sharing is unset.
    pub share_endpoint: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::TwentyFourHour,
            share_endpoint: String::new(),
        }
    }
}
