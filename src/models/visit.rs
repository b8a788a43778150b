use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Entity kind sent as `reference_type` for every visit.
pub const REFERENCE_TYPE_LEAD: &str = "lead";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitPhase {
    /// Visit-in recorded; checkout is the next valid action.
    Open,
    /// Checkout saga stopped between the followup and the visit-out call.
    FollowupRecorded,
}

impl VisitPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitPhase::Open => "open",
            VisitPhase::FollowupRecorded => "followup_recorded",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(VisitPhase::Open),
            "followup_recorded" => Some(VisitPhase::FollowupRecorded),
            _ => None,
        }
    }
}

/// The employee's single open visit. An empty slot means `Closed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    /// `ev_id` returned by visit-in; required by visit-out.
    pub visit_event_id: String,
    /// Lead being visited.
    pub reference_id: String,
    pub reference_type: String,
    pub opened_at: Option<NaiveDateTime>,
    pub phase: VisitPhase,
}

impl VisitRecord {
    pub fn open(
        visit_event_id: String,
        lead_id: &str,
        opened_at: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            visit_event_id,
            reference_id: lead_id.to_string(),
            reference_type: REFERENCE_TYPE_LEAD.to_string(),
            opened_at,
            phase: VisitPhase::Open,
        }
    }

    pub fn is_for(&self, lead_id: &str) -> bool {
        self.reference_id == lead_id
    }
}

/// What a lead row's visit button should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VisitControl {
    VisitIn,
    VisitOut,
    ResumeCheckout,
    /// Another lead holds the slot, or the role cannot visit.
    Disabled,
}

impl VisitControl {
    pub fn label(&self) -> &'static str {
        match self {
            VisitControl::VisitIn => "Visit In",
            VisitControl::VisitOut => "Visit Out",
            VisitControl::ResumeCheckout => "Resume Checkout",
            VisitControl::Disabled => "Disabled",
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, VisitControl::Disabled)
    }
}
