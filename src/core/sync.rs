use std::sync::Arc;

use tracing::{info, warn};

use crate::api::Transport;
use crate::core::context::TrackingContext;
use crate::core::geo::LocationProvider;
use crate::core::store::StoreSnapshot;
use crate::errors::AppResult;

/// Session-start reconciliation with the server's view of today.
///
/// The server is the only durable source: a successful sync overwrites the
/// session and the visit slot. A failed sync leaves the store exactly as it
/// was and hands the error back; nothing is retried.
pub struct AttendanceStatusSync<T: Transport, P: LocationProvider> {
    ctx: Arc<TrackingContext<T, P>>,
}

impl<T: Transport, P: LocationProvider> AttendanceStatusSync<T, P> {
    pub fn new(ctx: Arc<TrackingContext<T, P>>) -> Self {
        Self { ctx }
    }

    pub async fn sync(&self) -> AppResult<StoreSnapshot> {
        let employee_id = self.ctx.employee_id();
        let status = match self.ctx.client.attendance_status(employee_id).await {
            Ok(s) => s,
            Err(e) => {
                warn!(employee = employee_id, error = %e, "attendance status sync failed");
                return Err(e);
            }
        };

        self.ctx.store.apply_server_status(status);
        let snapshot = self.ctx.store.snapshot();
        info!(
            employee = employee_id,
            punched_in = snapshot.session.is_punched_in(),
            on_break = snapshot.session.is_on_break(),
            open_visit = snapshot.visit.is_some(),
            "attendance status synced"
        );
        Ok(snapshot)
    }
}
