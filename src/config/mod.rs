use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};
use crate::models::identity::{EmployeeIdentity, EmployeeRole};
use crate::models::location::PermissionState;
use crate::utils::path::expand_tilde;

pub mod migrate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

/// Device location as the CLI reports it. A desktop has no GPS, so the
/// coordinates come from configuration and the permission state decides
/// whether the gate lets actions through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_permission")]
    pub permission: PermissionState,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_fix_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default)]
    pub employee_id: String,
    #[serde(default = "default_role")]
    pub role: EmployeeRole,
    pub backend: BackendConfig,
    #[serde(default = "default_location")]
    pub location: LocationConfig,
    #[serde(default = "default_sync_on_start")]
    pub sync_on_start: bool,
}

fn default_request_timeout() -> u64 {
    30
}
fn default_fix_timeout() -> u64 {
    10
}
fn default_permission() -> PermissionState {
    PermissionState::Prompt
}
fn default_role() -> EmployeeRole {
    EmployeeRole::FieldEmployee
}
fn default_sync_on_start() -> bool {
    true
}
fn default_location() -> LocationConfig {
    LocationConfig {
        permission: default_permission(),
        latitude: None,
        longitude: None,
        address: None,
        timeout_secs: default_fix_timeout(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            employee_id: String::new(),
            role: default_role(),
            backend: BackendConfig {
                base_url: "http://localhost:8000/api".to_string(),
                token: None,
                timeout_secs: default_request_timeout(),
            },
            location: default_location(),
            sync_on_start: default_sync_on_start(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform.
    /// `FIELDTRACK_HOME` overrides it.
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var("FIELDTRACK_HOME") {
            return PathBuf::from(dir);
        }
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("fieldtrack")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".fieldtrack")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("fieldtrack.conf")
    }

    /// Return the full path of the local SQLite cache
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("fieldtrack.sqlite")
    }

    /// Load configuration from `path`, or return defaults if it does not exist.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        let mut cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        cfg.database = expand_tilde(&cfg.database).to_string_lossy().to_string();
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))?;
        let mut file = fs::File::create(path)?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }

    pub fn identity(&self) -> AppResult<EmployeeIdentity> {
        if self.employee_id.trim().is_empty() {
            return Err(AppError::Config(
                "employee_id is not set; run `fieldtrack login --employee <ID>` first".into(),
            ));
        }
        Ok(EmployeeIdentity::new(self.employee_id.trim(), self.role))
    }
}
