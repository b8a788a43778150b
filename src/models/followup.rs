use chrono::NaiveDateTime;
use serde::Serialize;

use crate::errors::{AppError, AppResult};

/// Single file attached to a followup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// A followup ready to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowupForm {
    pub lead_id: String,
    pub outcome_id: String,
    pub followup_type_id: String,
    pub description: String,
    pub followup_taken_at: NaiveDateTime,
    pub next_action_at: NaiveDateTime,
    pub attachment: Option<Attachment>,
}

impl FollowupForm {
    /// Minimal shape checks; field-level form rules live in the UI.
    pub fn validate(&self) -> AppResult<()> {
        if self.lead_id.trim().is_empty() {
            return Err(AppError::InvalidFollowup("lead id is required".into()));
        }
        if self.outcome_id.trim().is_empty() {
            return Err(AppError::InvalidFollowup("outcome is required".into()));
        }
        if self.followup_type_id.trim().is_empty() {
            return Err(AppError::InvalidFollowup("followup type is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::InvalidFollowup("remarks are required".into()));
        }
        Ok(())
    }
}

/// Followup form pre-bound to a lead. A checkout request binds it to the
/// visit being closed as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowupDraft {
    pub lead_id: String,
    pub visit_event_id: Option<String>,
}

impl FollowupDraft {
    /// Draft for ordinary followup logging, outside any visit.
    pub fn standalone(lead_id: impl Into<String>) -> Self {
        Self {
            lead_id: lead_id.into(),
            visit_event_id: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn fill(
        self,
        outcome_id: impl Into<String>,
        followup_type_id: impl Into<String>,
        description: impl Into<String>,
        followup_taken_at: NaiveDateTime,
        next_action_at: NaiveDateTime,
        attachment: Option<Attachment>,
    ) -> FollowupForm {
        FollowupForm {
            lead_id: self.lead_id,
            outcome_id: outcome_id.into(),
            followup_type_id: followup_type_id.into(),
            description: description.into(),
            followup_taken_at,
            next_action_at,
            attachment,
        }
    }
}
