use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use super::transport::{ApiRequest, Endpoint, MultipartPayload, Transport};
use super::wire::{
    self, Ack, BreakRequest, PunchInReply, PunchInRequest, PunchOutRequest, ServerAttendanceStatus,
    VisitRequest,
};
use crate::errors::AppResult;
use crate::models::direction::Direction;
use crate::models::followup::FollowupForm;
use crate::models::history::AttendanceHistoryRecord;
use crate::models::location::LocationFix;
use crate::utils::time::{format_attendance_ts, format_followup_ts};

/// Typed calls against the tracking backend.
///
/// Every method encodes its payload in the exact wire shape, sends it through
/// the transport and decodes the reply into a tagged outcome.
pub struct TrackerClient<T: Transport> {
    transport: T,
}

impl<T: Transport> TrackerClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn post(&self, endpoint: Endpoint, body: serde_json::Value) -> AppResult<serde_json::Value> {
        debug!(endpoint = endpoint.path(), "sending request");
        Ok(self.transport.send(ApiRequest::json(endpoint, body)).await?)
    }

    pub async fn punch_in(&self, employee_id: &str, at: &NaiveDateTime) -> AppResult<PunchInReply> {
        let req = PunchInRequest {
            employee_id,
            datetime: format_attendance_ts(at),
        };
        let body = self.post(Endpoint::PunchIn, serde_json::to_value(&req)?).await?;
        wire::decode_punch_in(body)
    }

    /// `break_id` is only sent when closing a break.
    pub async fn toggle_break(
        &self,
        attendance_id: &str,
        direction: Direction,
        break_id: Option<&str>,
        at: &NaiveDateTime,
    ) -> AppResult<Ack<Option<String>>> {
        let req = BreakRequest {
            att_id: attendance_id,
            break_type: direction.as_wire(),
            datetime: format_attendance_ts(at),
            id: break_id,
        };
        let body = self.post(Endpoint::Break, serde_json::to_value(&req)?).await?;
        wire::decode_break(body, direction)
    }

    pub async fn punch_out(
        &self,
        employee_id: &str,
        attendance_id: &str,
        at: &NaiveDateTime,
    ) -> AppResult<Ack<()>> {
        let req = PunchOutRequest {
            employee_id,
            datetime: format_attendance_ts(at),
            id: attendance_id,
        };
        let body = self.post(Endpoint::PunchOut, serde_json::to_value(&req)?).await?;
        wire::decode_punch_out(body)
    }

    pub async fn visit(
        &self,
        direction: Direction,
        employee_id: &str,
        lead_id: &str,
        reference_type: &str,
        visit_event_id: Option<&str>,
    ) -> AppResult<Ack<Option<String>>> {
        let req = VisitRequest {
            visitor_type: direction.as_wire(),
            employee_id,
            reference_id: lead_id,
            reference_type,
            ev_id: visit_event_id,
        };
        let body = self.post(Endpoint::Visit, serde_json::to_value(&req)?).await?;
        wire::decode_visit(body, direction)
    }

    /// Multipart followup; location fields ride along when a fix is known.
    pub async fn submit_followup(
        &self,
        employee_id: &str,
        form: &FollowupForm,
        fix: Option<&LocationFix>,
    ) -> AppResult<Ack<Option<String>>> {
        let mut payload = MultipartPayload::default()
            .text("lead_id", form.lead_id.as_str())
            .text("created_by", employee_id)
            .text("outcome_id", form.outcome_id.as_str())
            .text("followup_type_id", form.followup_type_id.as_str())
            .text("remarks", form.description.as_str())
            .text("followup_date", format_followup_ts(&form.followup_taken_at))
            .text("next_action_date", format_followup_ts(&form.next_action_at));

        if let Some(file) = &form.attachment {
            payload = payload.file("file", &file.file_name, &file.mime_type, file.bytes.clone());
        }

        if let Some(fix) = fix {
            payload = payload
                .text("gmapurl", fix.map_link.as_str())
                .text("gmapAddress", fix.address.as_str());
        }

        debug!(lead_id = %form.lead_id, "submitting followup");
        let body = self
            .transport
            .send(ApiRequest::multipart(Endpoint::Followup, payload))
            .await?;
        wire::decode_followup(body)
    }

    pub async fn attendance_status(&self, employee_id: &str) -> AppResult<ServerAttendanceStatus> {
        let req = ApiRequest::query(
            Endpoint::AttendanceStatus,
            vec![("employee_id".to_string(), employee_id.to_string())],
        );
        let body = self.transport.send(req).await?;
        wire::decode_status(body)
    }

    pub async fn attendance_report(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<AttendanceHistoryRecord>> {
        let req = ApiRequest::query(
            Endpoint::AttendanceReport,
            vec![
                ("employee_id".to_string(), employee_id.to_string()),
                ("from".to_string(), from.format("%Y-%m-%d").to_string()),
                ("to".to_string(), to.format("%Y-%m-%d").to_string()),
            ],
        );
        let body = self.transport.send(req).await?;
        wire::decode_report(body)
    }
}

