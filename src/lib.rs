//! fieldtrack library root.
//! Exposes the tracking core (engines, store, backend client), the local
//! cache and the CLI composition root used by main.rs.

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use cli::app::App;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Commands that run without an employee session.
fn dispatch_local(cli: &Cli, cfg: &Config, config_path: &Path) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli, config_path),
        Commands::Login { .. } => cli::commands::login::handle_login(&cli.command, cfg, config_path),
        Commands::Logout => cli::commands::login::handle_logout(cfg, config_path),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg, config_path),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        _ => Ok(()),
    }
}

/// Commands that act for the logged-in employee through the engines.
async fn dispatch_session(cmd: &Commands, app: &App) -> AppResult<()> {
    match cmd {
        Commands::Status => cli::commands::status::handle(app),
        Commands::PunchIn | Commands::BreakIn | Commands::BreakOut | Commands::PunchOut { .. } => {
            cli::commands::punch::handle(cmd, app).await
        }
        Commands::VisitIn { .. } | Commands::VisitOut { .. } | Commands::Leads { .. } => {
            cli::commands::visit::handle(cmd, app).await
        }
        Commands::Followup { .. } => cli::commands::followup::handle(cmd, app).await,
        Commands::Report { .. } => cli::commands::report::handle(cmd, app).await,
        _ => Ok(()),
    }
}

/// Central command dispatcher
pub async fn dispatch(cli: &Cli, cfg: &Config, config_path: &Path) -> AppResult<()> {
    if !cli.command.needs_session() {
        return dispatch_local(cli, cfg, config_path);
    }

    let interactive = !cli.test && std::io::stdin().is_terminal();
    let app = App::start(cfg, interactive, cli.command.is_tracked()).await?;

    let outcome = dispatch_session(&cli.command, &app).await;

    // Rejections change the store too (day lock-out, half-finished
    // checkout), so the snapshot is saved whatever the outcome.
    let saved = app.persist();
    outcome.and(saved)
}

/// Entry point used by main.rs
pub async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let config_path: PathBuf = cli.config.clone().unwrap_or_else(Config::config_file);
    let mut cfg = Config::load_from(&config_path)?;

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    dispatch(&cli, &cfg, &config_path).await
}
