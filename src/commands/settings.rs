//! Application settings.
//!
//! Settings are persisted as a JSON file (`settings.json` in the data
//! directory unless a path is given). Missing files and missing keys fall
//! back to defaults.

use crate::error::AppError;
use crate::models::Instructor;
use crate::services::review_console::TransitionPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings filename inside the data directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Default port for the console page server.
pub const DEFAULT_PORT: u16 = 4780;

/// Page server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Review behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewSettings {
    /// Whether decided requests may be decided again.
    pub transition_policy: TransitionPolicy,
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    /// SQLite database path. Defaults to `review-console.db` in the data
    /// directory.
    pub database_path: Option<PathBuf>,
    pub server: ServerSettings,
    pub review: ReviewSettings,
    pub instructor: Instructor,
}

impl AppSettings {
    /// Resolve the database path against `data_dir`.
    pub fn database_path_in(&self, data_dir: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| crate::db::get_db_path(data_dir))
    }
}

/// Default data directory: `$REVIEW_CONSOLE_DATA_DIR`, else the current
/// directory.
pub fn default_data_dir() -> PathBuf {
    std::env::var_os("REVIEW_CONSOLE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load settings from `path`, using defaults if the file does not exist.
///
/// A file that exists but cannot be parsed is an error rather than being
/// silently replaced by defaults.
pub async fn load_settings(path: &Path) -> Result<AppSettings, AppError> {
    let settings = match tokio::fs::read_to_string(path).await {
        Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
            AppError::invalid_input_field(
                format!("Failed to parse {}: {}", path.display(), e),
                "settings",
            )
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("[settings] {} not found, using defaults", path.display());
            AppSettings::default()
        }
        Err(e) => return Err(e.into()),
    };

    Ok(settings)
}

/// Save settings to `path`, creating its directory if needed.
pub async fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let json = serde_json::to_string_pretty(settings)?;
    tokio::fs::write(path, json).await?;
    log::info!("[settings] Saved {}", path.display());
    Ok(())
}

/// Changes requested by `review-console config`. `None` keeps the stored
/// value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub database_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub transition_policy: Option<TransitionPolicy>,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.database_path.is_none()
            && self.bind_address.is_none()
            && self.port.is_none()
            && self.transition_policy.is_none()
            && self.username.is_none()
            && self.display_name.is_none()
    }

    fn apply(self, settings: &mut AppSettings) {
        if let Some(path) = self.database_path {
            settings.database_path = Some(path);
        }
        if let Some(bind_address) = self.bind_address {
            settings.server.bind_address = bind_address;
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(policy) = self.transition_policy {
            settings.review.transition_policy = policy;
        }
        if let Some(username) = self.username {
            settings.instructor.username = username;
        }
        if let Some(display_name) = self.display_name {
            settings.instructor.display_name = display_name;
        }
    }
}

/// Load the settings at `path`, apply `update` and write them back.
///
/// An empty update only reads; the file is not created.
pub async fn update_settings(path: &Path, update: SettingsUpdate) -> Result<AppSettings, AppError> {
    let mut settings = load_settings(path).await?;
    if update.is_empty() {
        return Ok(settings);
    }

    update.apply(&mut settings);
    save_settings(path, &settings).await?;
    Ok(settings)
}
