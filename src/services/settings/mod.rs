// App settings service
// TOML-backed load/save for local preferences (time format, share
// endpoint). Any failure on load falls back to defaults; the schedule
// document itself is never stored here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::models::settings::AppSettings;

pub const SETTINGS_FILE_NAME: &str = "settings.toml";

pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings file in the platform config directory.
    pub fn default_location() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "schedule-grid")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;
        Ok(Self::new(dirs.config_dir().join(SETTINGS_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load(&self) -> AppSettings {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return AppSettings::default(),
        };
        match toml::from_str(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!(
                    "Settings file {} is invalid ({}), using defaults",
                    self.path.display(),
                    err
                );
                AppSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &AppSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create dir {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(settings).context("failed to serialize settings")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write settings to {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::TimeFormat;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let service = SettingsService::new(dir.path().join(SETTINGS_FILE_NAME));
        assert_eq!(service.load(), AppSettings::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let service = SettingsService::new(dir.path().join(SETTINGS_FILE_NAME));

        let settings = AppSettings {
            time_format: TimeFormat::TwelveHour,
            share_endpoint: "https://sched.example".to_string(),
        };
        service.save(&settings).unwrap();
        assert_eq!(service.load(), settings);
    }

    #[test]
    fn test_invalid_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "time_format = 17").unwrap();
        assert_eq!(SettingsService::new(&path).load(), AppSettings::default());
    }
}
