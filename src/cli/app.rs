//! Composition root for commands that act on behalf of the employee.
//!
//! Builds the store from the local cache, wires the HTTP transport and the
//! configured location provider into a shared context, runs the session-start
//! status sync and hands the engines to the command handlers.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::api::TrackerClient;
use crate::api::http::HttpTransport;
use crate::config::Config;
use crate::core::{
    AttendanceReportProjector, AttendanceStatusSync, AttendanceStore, Clock, ConfiguredLocationProvider,
    GeoPermissionGate, PunchTransitionEngine, SystemClock, TrackingContext, VisitTrackingEngine,
};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{load_snapshot, save_snapshot};
use crate::errors::AppResult;
use crate::ui::messages::warning;

pub type LiveContext = TrackingContext<HttpTransport, ConfiguredLocationProvider>;

pub struct App {
    pub pool: DbPool,
    pub ctx: Arc<LiveContext>,
    pub punch: PunchTransitionEngine<HttpTransport, ConfiguredLocationProvider>,
    pub visits: VisitTrackingEngine<HttpTransport, ConfiguredLocationProvider>,
    pub reports: AttendanceReportProjector<HttpTransport, ConfiguredLocationProvider>,
    /// A terminal is attached and prompts may be shown.
    pub interactive: bool,
}

impl App {
    /// Open the cache, build the context and reconcile with the server.
    ///
    /// A failed sync is reported and the cached state is kept.
    pub async fn start(cfg: &Config, interactive: bool, tracked: bool) -> AppResult<Self> {
        let identity = cfg.identity()?;
        let pool = DbPool::open_initialized(&cfg.database)?;

        let clock = SystemClock;
        let cached =
            load_snapshot(&pool.conn, &identity.employee_id, clock.now().date())?.unwrap_or_default();
        let store = Arc::new(AttendanceStore::from_snapshot(cached));

        let client = TrackerClient::new(HttpTransport::new(&cfg.backend)?);
        let provider = ConfiguredLocationProvider::new(cfg.location.clone(), interactive);
        let gate = GeoPermissionGate::new(provider, Duration::from_secs(cfg.location.timeout_secs));

        let ctx = Arc::new(TrackingContext::new(
            identity,
            store,
            client,
            gate,
            Box::new(clock),
        ));

        if cfg.sync_on_start
            && let Err(e) = AttendanceStatusSync::new(ctx.clone()).sync().await
        {
            warning(format!(
                "Could not sync today's attendance ({}); using the last known state.",
                e
            ));
        }

        if tracked {
            ctx.gate.initialize().await;
        }

        debug!(employee = ctx.employee_id(), "session ready");

        Ok(Self {
            pool,
            punch: PunchTransitionEngine::new(ctx.clone()),
            visits: VisitTrackingEngine::new(ctx.clone()),
            reports: AttendanceReportProjector::new(ctx.clone()),
            ctx,
            interactive,
        })
    }

    /// Write the current store back to the local cache.
    pub fn persist(&self) -> AppResult<()> {
        save_snapshot(
            &self.pool.conn,
            self.ctx.employee_id(),
            &self.ctx.store.snapshot(),
        )
    }

    /// Audit line for a completed action. Never fails the command.
    pub fn audit(&self, operation: &str, target: &str, message: &str) {
        if let Err(e) = ttlog(&self.pool.conn, operation, target, message) {
            warning(format!("Failed to write internal log: {}", e));
        }
    }
}
