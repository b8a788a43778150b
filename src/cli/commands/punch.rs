use crate::cli::app::App;
use crate::cli::parser::Commands;
use crate::core::punch::{PunchOutDialog, PunchOutWarning};
use crate::errors::{AppError, AppResult, TransitionKind};
use crate::ui::messages::{info, success};
use crate::utils::time::hhmm_or_placeholder;

fn confirm(prompt: &str) -> AppResult<bool> {
    let answer = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact_opt()
        .map_err(|e| AppError::Other(format!("prompt failed: {}", e)))?;
    Ok(answer.unwrap_or(false))
}

/// Handle `punch-in`, `break-in`, `break-out` and `punch-out`.
pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    match cmd {
        Commands::PunchIn => {
            let session = app.punch.punch_in().await?;
            let id = session.attendance_id.unwrap_or_default();
            let at = hhmm_or_placeholder(session.punch_in_at.as_ref());
            app.audit("punch_in", &id, &format!("Punched in at {}", at));
            success(format!("Punched in at {} (attendance {})", at, id));
        }

        Commands::BreakIn => {
            let session = app.punch.break_in().await?;
            let id = session.break_id.unwrap_or_default();
            app.audit("break_in", &id, "Break started");
            success(format!("Break started (break {})", id));
        }

        Commands::BreakOut => {
            let before = app.ctx.store.session();
            app.punch.break_out().await?;
            let id = before.break_id.unwrap_or_default();
            app.audit("break_out", &id, "Break ended");
            success("Break ended");
        }

        Commands::PunchOut { yes } => {
            if !yes && !app.interactive {
                return Err(AppError::TransitionNotAllowed {
                    kind: TransitionKind::PunchOut,
                    reason: "confirmation required; pass --yes when no terminal is attached",
                });
            }

            let dialog = PunchOutDialog::open();
            if !yes && !confirm(PunchOutDialog::PROMPT)? {
                info("Punch-out cancelled.");
                return Ok(());
            }

            let warning = dialog.confirm();
            if !yes && !confirm(PunchOutWarning::PROMPT)? {
                info("Punch-out cancelled.");
                return Ok(());
            }

            let attendance_id = app.ctx.store.session().attendance_id.unwrap_or_default();
            let session = app
                .punch
                .punch_out(warning.acknowledge_irreversible())
                .await?;
            let at = hhmm_or_placeholder(session.punch_out_at.as_ref());
            app.audit("punch_out", &attendance_id, &format!("Punched out at {}", at));
            success(format!("Punched out at {}. See you tomorrow!", at));
        }

        _ => {}
    }

    Ok(())
}
