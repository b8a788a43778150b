use crate::cli::app::App;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::models::visit::VisitControl;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREY, RESET, YELLOW, colorize_flag};
use crate::utils::table::{Column, Table};

/// Handle `visit-in`, `visit-out` and `leads`.
pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    match cmd {
        Commands::VisitIn { lead } => {
            let record = app.visits.visit_in(lead).await?;
            app.audit(
                "visit_in",
                lead,
                &format!("Visit opened (ev_id {})", record.visit_event_id),
            );
            success(format!(
                "Visit started on lead {} (ev_id {})",
                lead, record.visit_event_id
            ));
        }

        Commands::VisitOut {
            lead,
            resume,
            followup,
        } => {
            let ev_id = app
                .visits
                .open_visit()
                .map(|v| v.visit_event_id)
                .unwrap_or_default();

            if *resume {
                app.visits.resume_checkout(lead).await?;
                app.audit("visit_out", lead, &format!("Checkout resumed (ev_id {})", ev_id));
                success(format!("Visit on lead {} closed", lead));
                return Ok(());
            }

            let draft = app.visits.request_checkout(lead)?;
            info(format!("Recording followup for lead {}…", lead));
            let form = followup.fill(draft, app.ctx.clock.now())?;

            app.visits.complete_checkout(form).await?;
            app.audit("visit_out", lead, &format!("Visit closed (ev_id {})", ev_id));
            success(format!("Followup saved and visit on lead {} closed", lead));
        }

        Commands::Leads { leads } => {
            let mut table = Table::new(vec![Column::new("LEAD", 12), Column::new("CONTROL", 16)]);
            for lead in leads {
                let control = app.visits.visit_control(lead);
                let label = match control {
                    VisitControl::ResumeCheckout => format!("{YELLOW}{}{RESET}", control.label()),
                    VisitControl::Disabled => format!("{GREY}{}{RESET}", control.label()),
                    _ => colorize_flag(control.label(), control.is_enabled()),
                };
                table.add_row(vec![lead.clone(), label]);
            }
            print!("{}", table.render());
        }

        _ => {}
    }

    Ok(())
}
