use std::path::Path;
use std::process::Command;

use crate::cli::parser::Commands;
use crate::config::Config;
use crate::config::migrate::{missing_keys, run_config_migration};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, success, warning};

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config, path: &Path) -> AppResult<()> {
    let Commands::Config {
        print_config,
        check,
        migrate,
        edit_config,
        editor,
    } = cmd
    else {
        return Ok(());
    };

    // ---- PRINT CONFIG ----
    if *print_config {
        println!("📄 Current configuration ({}):\n", path.display());
        let yaml = serde_yaml::to_string(cfg).map_err(|e| AppError::Config(e.to_string()))?;
        println!("{}", yaml);
    }

    // ---- CHECK ----
    if *check {
        if !path.exists() {
            warning(format!(
                "Configuration file {} does not exist; run `fieldtrack init`.",
                path.display()
            ));
        } else {
            let missing = missing_keys(path)?;
            if missing.is_empty() {
                success("Configuration file is complete.");
            } else {
                warning(format!(
                    "Missing keys: {} (run `fieldtrack config --migrate`)",
                    missing.join(", ")
                ));
            }
        }
    }

    // ---- MIGRATE ----
    if *migrate {
        if !path.exists() {
            return Err(AppError::Config(format!(
                "{} does not exist; run `fieldtrack init` first",
                path.display()
            )));
        }
        run_config_migration(path)?;
    }

    // ---- EDIT CONFIG ----
    if *edit_config {
        let default_editor = std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            });

        let editor_to_use = editor.clone().unwrap_or_else(|| default_editor.clone());

        match Command::new(&editor_to_use).arg(path).status() {
            Ok(s) if s.success() => {
                success(format!(
                    "Configuration file edited successfully using '{}'",
                    editor_to_use
                ));
            }
            _ => {
                warning(format!(
                    "Editor '{}' not available, falling back to '{}'",
                    editor_to_use, default_editor
                ));

                match Command::new(&default_editor).arg(path).status() {
                    Ok(s) if s.success() => success(format!(
                        "Configuration file edited successfully using fallback '{}'",
                        default_editor
                    )),
                    _ => error(format!(
                        "Failed to edit configuration file using fallback '{}'",
                        default_editor
                    )),
                }
            }
        }
    }

    Ok(())
}
