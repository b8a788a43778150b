use std::sync::Arc;

use crate::api::{TrackerClient, Transport};
use crate::core::clock::Clock;
use crate::core::geo::{GeoPermissionGate, LocationProvider};
use crate::core::store::AttendanceStore;
use crate::models::identity::EmployeeIdentity;

/// Everything the engines share: who is acting, the store they write, the
/// backend they talk to, the location gate and the clock.
///
/// Built once by the composition root (or by a test) and handed to every
/// engine as an `Arc`.
pub struct TrackingContext<T: Transport, P: LocationProvider> {
    pub identity: EmployeeIdentity,
    pub store: Arc<AttendanceStore>,
    pub client: TrackerClient<T>,
    pub gate: GeoPermissionGate<P>,
    pub clock: Box<dyn Clock>,
}

impl<T: Transport, P: LocationProvider> TrackingContext<T, P> {
    pub fn new(
        identity: EmployeeIdentity,
        store: Arc<AttendanceStore>,
        client: TrackerClient<T>,
        gate: GeoPermissionGate<P>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            store,
            client,
            gate,
            clock,
        }
    }

    pub fn employee_id(&self) -> &str {
        &self.identity.employee_id
    }
}
