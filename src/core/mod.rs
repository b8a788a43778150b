//! Tracking core: location gate, attendance store, transition engines,
//! status sync and report projection.

pub mod clock;
pub mod context;
pub mod geo;
pub mod punch;
pub mod report;
pub mod single_flight;
pub mod store;
pub mod sync;
pub mod visit;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::TrackingContext;
pub use geo::{ConfiguredLocationProvider, GeoPermissionGate, LocationProvider};
pub use punch::{PunchOutConfirmation, PunchOutDialog, PunchOutWarning, PunchTransitionEngine};
pub use report::AttendanceReportProjector;
pub use store::{AttendanceStore, StoreSnapshot};
pub use sync::AttendanceStatusSync;
pub use visit::VisitTrackingEngine;
