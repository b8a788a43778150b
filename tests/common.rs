#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use fieldtrack::api::{ApiRequest, Endpoint, TrackerClient, Transport};
use fieldtrack::core::{
    AttendanceStore, FixedClock, GeoPermissionGate, LocationProvider, StoreSnapshot,
    TrackingContext,
};
use fieldtrack::errors::TransportError;
use fieldtrack::models::identity::{EmployeeIdentity, EmployeeRole};
use fieldtrack::models::location::{Coordinates, LocationErrorKind, PermissionState};

pub fn ft() -> Command {
    cargo_bin_cmd!("fieldtrack")
}

/// Fresh temp directory for one CLI test: config file and database inside.
pub fn setup_test_home(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_fieldtrack", name));
    fs::remove_dir_all(&path).ok();
    fs::create_dir_all(&path).expect("create test home");
    path
}

/// Write a complete configuration that never reaches the network on start.
pub fn write_config(home: &PathBuf, employee_id: &str, permission: &str) -> (String, String) {
    let cfg_path = home.join("fieldtrack.conf");
    let db_path = home.join("fieldtrack.sqlite");
    let yaml = format!(
        "database: {db}\nemployee_id: '{emp}'\nrole: field_employee\nbackend:\n  base_url: http://127.0.0.1:9/api\n  token: null\n  timeout_secs: 2\nlocation:\n  permission: {perm}\n  latitude: 45.4642\n  longitude: 9.19\n  address: Piazza del Duomo\n  timeout_secs: 1\nsync_on_start: false\n",
        db = db_path.display(),
        emp = employee_id,
        perm = permission,
    );
    fs::write(&cfg_path, yaml).expect("write config");
    (
        cfg_path.to_string_lossy().to_string(),
        db_path.to_string_lossy().to_string(),
    )
}

// ---------------------------------------------------------------------------
// Scripted backend
// ---------------------------------------------------------------------------

type Scripted = (Option<Endpoint>, Result<Value, TransportError>);

/// In-memory backend: replies are queued up front, every request is recorded.
/// A reply bound to an endpoint is only handed to a request for that endpoint.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first request waits on `hold` before it is answered.
    pub fn held(hold: Arc<Notify>) -> Self {
        Self {
            hold: Mutex::new(Some(hold)),
            ..Self::default()
        }
    }

    pub fn reply(self, body: Value) -> Self {
        self.replies.lock().unwrap().push_back((None, Ok(body)));
        self
    }

    pub fn reply_for(self, endpoint: Endpoint, body: Value) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back((Some(endpoint), Ok(body)));
        self
    }

    pub fn fail(self, err: TransportError) -> Self {
        self.replies.lock().unwrap().push_back((None, Err(err)));
        self
    }

    fn next_reply(&self, endpoint: Endpoint) -> Result<Value, TransportError> {
        let mut replies = self.replies.lock().unwrap();
        let pos = replies
            .iter()
            .position(|(bound, _)| bound.is_none_or(|e| e == endpoint));
        match pos.and_then(|i| replies.remove(i)) {
            Some((_, reply)) => reply,
            None => Err(TransportError::Network("no scripted reply".into())),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.requests().iter().map(|r| r.endpoint).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let endpoint = request.endpoint;
        self.requests.lock().unwrap().push(request);
        let hold = self.hold.lock().unwrap().take();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        self.next_reply(endpoint)
    }
}

// ---------------------------------------------------------------------------
// Scripted location
// ---------------------------------------------------------------------------

pub struct ScriptedLocation {
    pub state: PermissionState,
    pub position: Result<Coordinates, LocationErrorKind>,
    pub delay: Option<Duration>,
    reads: AtomicUsize,
}

impl ScriptedLocation {
    pub fn granted() -> Self {
        Self {
            state: PermissionState::Granted,
            position: Ok(Coordinates {
                latitude: 45.4642,
                longitude: 9.19,
                address: Some("Piazza del Duomo".into()),
            }),
            delay: None,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn denied() -> Self {
        Self {
            state: PermissionState::Denied,
            ..Self::granted()
        }
    }

    pub fn prompt() -> Self {
        Self {
            state: PermissionState::Prompt,
            ..Self::granted()
        }
    }

    /// Answers only after `delay`.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self, kind: LocationErrorKind) -> Self {
        self.position = Err(kind);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for ScriptedLocation {
    async fn permission_state(&self) -> PermissionState {
        self.state
    }

    async fn current_position(&self) -> Result<Coordinates, LocationErrorKind> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.position.clone()
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

pub type TestContext = TrackingContext<ScriptedTransport, ScriptedLocation>;

pub const EMPLOYEE: &str = "E42";

pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 5)
        .and_then(|d| d.and_hms_opt(9, 7, 0))
        .expect("valid timestamp")
}

pub fn context_with(
    transport: ScriptedTransport,
    location: ScriptedLocation,
    role: EmployeeRole,
    snapshot: StoreSnapshot,
) -> Arc<TestContext> {
    Arc::new(TrackingContext::new(
        EmployeeIdentity::new(EMPLOYEE, role),
        Arc::new(AttendanceStore::from_snapshot(snapshot)),
        TrackerClient::new(transport),
        GeoPermissionGate::new(location, Duration::from_secs(1)),
        Box::new(FixedClock(fixed_now())),
    ))
}

pub fn context(transport: ScriptedTransport, location: ScriptedLocation) -> Arc<TestContext> {
    context_with(
        transport,
        location,
        EmployeeRole::FieldEmployee,
        StoreSnapshot::default(),
    )
}

pub fn transport(ctx: &TestContext) -> &ScriptedTransport {
    ctx.client.transport()
}

// ---------------------------------------------------------------------------
// Canned replies
// ---------------------------------------------------------------------------

pub fn punch_in_ok(id: &str) -> Value {
    json!([{ "STATUS": "success", "MSG": "Punch in Successfully", "Id": id }])
}

pub fn break_in_ok(id: &str) -> Value {
    json!([{ "STATUS": "success", "MSG": "successfully Break in", "id_break": id }])
}

pub fn break_out_ok() -> Value {
    json!([{ "STATUS": "success", "MSG": "successfully Break out" }])
}

pub fn punch_out_ok() -> Value {
    json!([{ "STATUS": "success", "MSG": "Punch out Successfully" }])
}

pub fn visit_in_ok(ev_id: &str) -> Value {
    json!([{ "STATUS": "SUCCESS", "MSG": "Visit in recorded", "ev_id": ev_id }])
}

pub fn visit_out_ok() -> Value {
    json!([{ "STATUS": "SUCCESS", "MSG": "Visit out recorded" }])
}

pub fn followup_ok(id: &str) -> Value {
    json!([{ "STATUS": "Success", "MSG": "Followup saved", "followup_id": id }])
}
