use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::cli::app::App;
use crate::cli::parser::{Commands, FollowupArgs};
use crate::errors::{AppError, AppResult};
use crate::models::followup::{Attachment, FollowupDraft, FollowupForm};
use crate::ui::messages::success;
use crate::utils::time::parse_cli_datetime;

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

fn read_attachment(path: &Path) -> AppResult<Attachment> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::InvalidFollowup(format!("bad attachment path {}", path.display())))?
        .to_string();

    Ok(Attachment {
        file_name,
        mime_type: mime_for(path).to_string(),
        bytes,
    })
}

impl FollowupArgs {
    /// Fill a draft from the command line. `now` is the default for the
    /// followup time.
    pub fn fill(&self, draft: FollowupDraft, now: NaiveDateTime) -> AppResult<FollowupForm> {
        let today = now.date();

        let taken_at = match &self.taken_at {
            Some(s) => parse_cli_datetime(s, today)?,
            None => now,
        };
        let next_action_at = match &self.next_action {
            Some(s) => parse_cli_datetime(s, today)?,
            None => {
                return Err(AppError::InvalidFollowup(
                    "next action date is required (--next-action)".into(),
                ));
            }
        };
        let attachment = match &self.attachment {
            Some(p) => Some(read_attachment(p)?),
            None => None,
        };

        let form = draft.fill(
            self.outcome.clone().unwrap_or_default(),
            self.followup_type.clone().unwrap_or_default(),
            self.remarks.clone().unwrap_or_default(),
            taken_at,
            next_action_at,
            attachment,
        );
        form.validate()?;
        Ok(form)
    }
}

/// Handle `followup`: a followup on its own, the visit slot is untouched.
pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    let Commands::Followup { lead, followup } = cmd else {
        return Ok(());
    };

    let form = followup.fill(FollowupDraft::standalone(lead.as_str()), app.ctx.clock.now())?;

    let followup_id = app.visits.submit_followup(form).await?;
    let id = followup_id.unwrap_or_default();
    app.audit("followup", lead, &format!("Followup {} recorded", id));
    success(format!("Followup recorded for lead {}", lead));
    Ok(())
}
