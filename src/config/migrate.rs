//! Configuration file upgrades: report and fill keys added by newer releases.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};

fn read_yaml(path: &Path) -> AppResult<Value> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    serde_yaml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
}

fn defaults_yaml() -> AppResult<Value> {
    serde_yaml::to_value(Config::default()).map_err(|e| AppError::Config(e.to_string()))
}

/// Collect dotted paths present in `defaults` but missing from `current`.
fn collect_missing(current: &Mapping, defaults: &Mapping, prefix: &str, out: &mut Vec<String>) {
    for (key, default_value) in defaults {
        let Some(name) = key.as_str() else { continue };
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", prefix, name)
        };

        match (current.get(key), default_value) {
            (None, _) => out.push(path),
            (Some(Value::Mapping(cur)), Value::Mapping(def)) => {
                collect_missing(cur, def, &path, out)
            }
            _ => {}
        }
    }
}

/// Insert default values for every missing key, recursing into sections.
fn fill_missing(current: &mut Mapping, defaults: &Mapping) {
    for (key, default_value) in defaults {
        match current.get_mut(key) {
            None => {
                current.insert(key.clone(), default_value.clone());
            }
            Some(Value::Mapping(cur)) => {
                if let Value::Mapping(def) = default_value {
                    fill_missing(cur, def);
                }
            }
            Some(_) => {}
        }
    }
}

/// Keys the file at `path` lacks compared to the current defaults.
pub fn missing_keys(path: &Path) -> AppResult<Vec<String>> {
    let current = read_yaml(path)?;
    let defaults = defaults_yaml()?;

    let mut out = Vec::new();
    if let (Value::Mapping(cur), Value::Mapping(def)) = (&current, &defaults) {
        collect_missing(cur, def, "", &mut out);
    }
    Ok(out)
}

/// Add missing keys with their default values. Existing values are never
/// overwritten. Returns the keys that were added.
pub fn run_config_migration(path: &Path) -> AppResult<Vec<String>> {
    let added = missing_keys(path)?;
    if added.is_empty() {
        info("Configuration is up to date.");
        return Ok(added);
    }

    let mut current = read_yaml(path)?;
    let defaults = defaults_yaml()?;
    if let (Value::Mapping(cur), Value::Mapping(def)) = (&mut current, &defaults) {
        fill_missing(cur, def);
    }

    let yaml = serde_yaml::to_string(&current).map_err(|e| AppError::Config(e.to_string()))?;
    fs::write(path, yaml)?;

    success(format!("Configuration migrated: added {}", added.join(", ")));
    Ok(added)
}
