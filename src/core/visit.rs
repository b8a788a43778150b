//! Lead-scoped field visits with the one-open-visit-per-employee slot.
//!
//! Checkout is a two-call saga: followup first, then visit-out. The store
//! records the intermediate `FollowupRecorded` phase so a failed visit-out
//! is visible and resumable instead of being silently dropped.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::Transport;
use crate::core::context::TrackingContext;
use crate::core::geo::LocationProvider;
use crate::core::single_flight::SingleFlight;
use crate::errors::{AppError, AppResult, TransitionKind};
use crate::models::direction::Direction;
use crate::models::followup::{FollowupDraft, FollowupForm};
use crate::models::location::LocationFix;
use crate::models::visit::{REFERENCE_TYPE_LEAD, VisitControl, VisitPhase, VisitRecord};

pub struct VisitTrackingEngine<T: Transport, P: LocationProvider> {
    ctx: Arc<TrackingContext<T, P>>,
    flights: SingleFlight,
}

impl<T: Transport, P: LocationProvider> VisitTrackingEngine<T, P> {
    pub fn new(ctx: Arc<TrackingContext<T, P>>) -> Self {
        Self {
            ctx,
            flights: SingleFlight::new(),
        }
    }

    pub fn is_busy(&self, kind: TransitionKind) -> bool {
        self.flights.is_busy(kind)
    }

    pub fn open_visit(&self) -> Option<VisitRecord> {
        self.ctx.store.visit()
    }

    /// Button state for a lead row.
    pub fn visit_control(&self, lead_id: &str) -> VisitControl {
        if !self.ctx.identity.role.can_visit() {
            return VisitControl::Disabled;
        }
        match self.ctx.store.visit() {
            None => VisitControl::VisitIn,
            Some(v) if !v.is_for(lead_id) => VisitControl::Disabled,
            Some(v) => match v.phase {
                VisitPhase::Open => VisitControl::VisitOut,
                VisitPhase::FollowupRecorded => VisitControl::ResumeCheckout,
            },
        }
    }

    pub async fn visit_in(&self, lead_id: &str) -> AppResult<VisitRecord> {
        let kind = TransitionKind::VisitIn;
        let role = self.ctx.identity.role;
        if !role.can_visit() {
            return Err(AppError::RoleNotAllowed(role.as_str().to_string()));
        }
        if let Some(open) = self.ctx.store.visit() {
            if open.is_for(lead_id) {
                return Err(AppError::VisitAlreadyOpen(lead_id.to_string()));
            }
            return Err(AppError::VisitSlotOccupied {
                open_lead: open.reference_id,
                requested: lead_id.to_string(),
            });
        }

        let _flight = self.flights.enter(kind)?;
        self.ctx.gate.acquire_location(kind.label()).await?;

        let visit_event_id = self
            .ctx
            .client
            .visit(
                Direction::In,
                self.ctx.employee_id(),
                lead_id,
                REFERENCE_TYPE_LEAD,
                None,
            )
            .await?
            .into_result(kind)?
            .ok_or_else(|| AppError::Other("visit-in accepted without an ev_id".into()))?;

        let record = VisitRecord::open(visit_event_id, lead_id, Some(self.ctx.clock.now()));
        self.ctx.store.open_visit(record.clone())?;
        info!(lead_id, ev_id = %record.visit_event_id, "visit opened");
        Ok(record)
    }

    /// First half of checkout: no backend call, only a followup form bound to
    /// the open visit.
    pub fn request_checkout(&self, lead_id: &str) -> AppResult<FollowupDraft> {
        let open = self.open_visit_for(lead_id, VisitPhase::Open)?;
        Ok(FollowupDraft {
            lead_id: open.reference_id,
            visit_event_id: Some(open.visit_event_id),
        })
    }

    /// Followup, then visit-out. Visit-out is never attempted unless the
    /// followup was accepted.
    pub async fn complete_checkout(&self, form: FollowupForm) -> AppResult<()> {
        let kind = TransitionKind::Checkout;
        form.validate()?;
        let open = self.open_visit_for(&form.lead_id, VisitPhase::Open)?;

        let _flight = self.flights.enter(kind)?;
        let fix = self.ctx.gate.acquire_location(kind.label()).await?;

        self.ctx
            .client
            .submit_followup(self.ctx.employee_id(), &form, Some(&fix))
            .await?
            .into_result(TransitionKind::Followup)?;

        self.ctx
            .store
            .set_visit_phase(&open.visit_event_id, VisitPhase::FollowupRecorded);
        info!(lead_id = %open.reference_id, ev_id = %open.visit_event_id, "checkout followup recorded");

        self.finish_visit_out(&open).await
    }

    /// Retry only the visit-out of a checkout whose followup already landed.
    pub async fn resume_checkout(&self, lead_id: &str) -> AppResult<()> {
        let kind = TransitionKind::Checkout;
        let open = self.open_visit_for(lead_id, VisitPhase::FollowupRecorded)?;

        let _flight = self.flights.enter(kind)?;
        self.ctx.gate.acquire_location(kind.label()).await?;

        self.finish_visit_out(&open).await
    }

    /// Stand-alone followup logging, unrelated to the visit slot.
    /// Returns the server's followup id when it sends one.
    pub async fn submit_followup(&self, form: FollowupForm) -> AppResult<Option<String>> {
        let kind = TransitionKind::Followup;
        form.validate()?;

        let _flight = self.flights.enter(kind)?;
        let fix: LocationFix = self.ctx.gate.acquire_location(kind.label()).await?;

        let followup_id = self
            .ctx
            .client
            .submit_followup(self.ctx.employee_id(), &form, Some(&fix))
            .await?
            .into_result(kind)?;

        info!(lead_id = %form.lead_id, followup_id = ?followup_id, "followup recorded");
        Ok(followup_id)
    }

    async fn finish_visit_out(&self, open: &VisitRecord) -> AppResult<()> {
        let outcome = self
            .ctx
            .client
            .visit(
                Direction::Out,
                self.ctx.employee_id(),
                &open.reference_id,
                &open.reference_type,
                Some(&open.visit_event_id),
            )
            .await
            .and_then(|ack| ack.into_result(TransitionKind::Checkout));

        match outcome {
            Ok(_) => {
                self.ctx.store.close_visit(&open.visit_event_id);
                info!(lead_id = %open.reference_id, ev_id = %open.visit_event_id, "visit closed");
                Ok(())
            }
            Err(source) => {
                error!(
                    lead_id = %open.reference_id,
                    ev_id = %open.visit_event_id,
                    %source,
                    "visit-out failed after followup was recorded"
                );
                Err(AppError::InconsistentState {
                    lead_id: open.reference_id.clone(),
                    visit_event_id: open.visit_event_id.clone(),
                    source: Box::new(source),
                })
            }
        }
    }

    fn open_visit_for(&self, lead_id: &str, phase: VisitPhase) -> AppResult<VisitRecord> {
        match self.ctx.store.visit() {
            Some(v) if v.is_for(lead_id) && v.phase == phase => Ok(v),
            Some(v) if v.is_for(lead_id) => {
                warn!(lead_id, phase = v.phase.as_str(), "checkout in wrong phase");
                Err(AppError::TransitionNotAllowed {
                    kind: TransitionKind::Checkout,
                    reason: match v.phase {
                        VisitPhase::FollowupRecorded => {
                            "followup already recorded; resume the checkout instead"
                        }
                        VisitPhase::Open => "no followup has been recorded for this visit yet",
                    },
                })
            }
            _ => Err(AppError::NoOpenVisit(lead_id.to_string())),
        }
    }
}
