mod common;

use common::*;
use fieldtrack::api::Endpoint;
use fieldtrack::core::{PunchOutDialog, PunchTransitionEngine, StoreSnapshot};
use fieldtrack::errors::{AppError, BusinessRejection, TransitionKind, TransportError};
use fieldtrack::models::identity::EmployeeRole;
use fieldtrack::models::location::LocationErrorKind;
use fieldtrack::models::session::AttendanceSession;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn punched_in(attendance_id: &str) -> StoreSnapshot {
    StoreSnapshot {
        session: AttendanceSession {
            attendance_id: Some(attendance_id.to_string()),
            punch_in_at: Some(fixed_now()),
            punch_out_at: None,
            break_id: None,
        },
        punch_in_locked: false,
        visit: None,
    }
}

fn confirmed() -> fieldtrack::core::PunchOutConfirmation {
    PunchOutDialog::open().confirm().acknowledge_irreversible()
}

#[tokio::test]
async fn punch_in_success_sets_attendance_id_and_flags() {
    let ctx = context(
        ScriptedTransport::new().reply(punch_in_ok("123")),
        ScriptedLocation::granted(),
    );
    let engine = PunchTransitionEngine::new(ctx.clone());

    let session = engine.punch_in().await.expect("punch-in");

    assert_eq!(session.attendance_id.as_deref(), Some("123"));
    assert_eq!(session.punch_in_at, Some(fixed_now()));
    let flags = engine.flags();
    assert!(flags.can_break_in);
    assert!(flags.can_punch_out);
    assert!(!flags.can_punch_in);
    assert!(!flags.can_break_out);

    let sent = transport(&ctx).requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].json_body(),
        Some(&json!({ "employee_id": EMPLOYEE, "datetime": "05-03-25 9:07 AM" }))
    );
}

#[tokio::test]
async fn punch_in_with_other_message_is_already_punched_out() {
    let ctx = context(
        ScriptedTransport::new().reply(json!([{ "STATUS": "success", "MSG": "some other message" }])),
        ScriptedLocation::granted(),
    );
    let engine = PunchTransitionEngine::new(ctx.clone());

    let err = engine.punch_in().await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Rejected(BusinessRejection::AlreadyPunchedOut { .. })
    ));
    assert!(err.to_string().contains("already punched out"));

    // Session untouched, punch-in stays disabled.
    assert!(ctx.store.session().is_empty());
    assert!(!engine.flags().can_punch_in);

    // A second attempt is refused locally.
    let again = engine.punch_in().await.unwrap_err();
    assert!(matches!(again, AppError::Rejected(_)));
    assert_eq!(transport(&ctx).calls(), 1);
}

#[tokio::test]
async fn denied_location_blocks_break_in_without_network() {
    let ctx = context_with(
        ScriptedTransport::new().reply(break_in_ok("B1")),
        ScriptedLocation::denied(),
        EmployeeRole::FieldEmployee,
        punched_in("A1"),
    );
    let engine = PunchTransitionEngine::new(ctx.clone());

    let err = engine.break_in().await.unwrap_err();
    match err {
        AppError::Location(e) => {
            assert_eq!(e.kind, LocationErrorKind::PermissionDenied);
            assert_eq!(e.action, "Break-In");
            assert!(e.message.contains("Break-In"));
        }
        other => panic!("expected location error, got {other:?}"),
    }

    assert_eq!(transport(&ctx).calls(), 0);
    assert_eq!(ctx.gate.provider().reads(), 0);
    assert_eq!(ctx.store.session().break_id, None);
}

fn location_kind(err: AppError) -> LocationErrorKind {
    match err {
        AppError::Location(e) => e.kind,
        other => panic!("expected a location error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_granted_fix_times_out_as_unavailable() {
    // The test gate waits one second for a granted fix.
    let ctx = context(
        ScriptedTransport::new().reply(punch_in_ok("1")),
        ScriptedLocation::granted().slow(Duration::from_secs(3)),
    );

    let err = PunchTransitionEngine::new(ctx.clone())
        .punch_in()
        .await
        .expect_err("timed out");

    assert_eq!(location_kind(err), LocationErrorKind::Unavailable);
    assert_eq!(transport(&ctx).calls(), 0);
    assert!(ctx.store.session().is_empty());
    assert!(ctx.store.flags().can_punch_in);
}

#[tokio::test]
async fn failed_position_read_blocks_without_network() {
    let ctx = context_with(
        ScriptedTransport::new().reply(break_in_ok("B1")),
        ScriptedLocation::granted().failing(LocationErrorKind::Unavailable),
        EmployeeRole::FieldEmployee,
        punched_in("A1"),
    );

    let err = PunchTransitionEngine::new(ctx.clone())
        .break_in()
        .await
        .expect_err("no fix");

    assert_eq!(location_kind(err), LocationErrorKind::Unavailable);
    assert_eq!(ctx.gate.provider().reads(), 1);
    assert_eq!(transport(&ctx).calls(), 0);
    assert_eq!(ctx.store.session(), punched_in("A1").session);
}

#[tokio::test]
async fn pending_prompt_read_is_not_time_bounded() {
    let ctx = context(
        ScriptedTransport::new().reply(punch_in_ok("321")),
        ScriptedLocation::prompt().slow(Duration::from_millis(1500)),
    );

    let session = PunchTransitionEngine::new(ctx.clone())
        .punch_in()
        .await
        .expect("answered prompt");

    assert_eq!(session.attendance_id.as_deref(), Some("321"));
    assert_eq!(transport(&ctx).calls(), 1);
}

#[tokio::test]
async fn dismissed_prompt_blocks_without_network() {
    let ctx = context(
        ScriptedTransport::new().reply(punch_in_ok("1")),
        ScriptedLocation::prompt().failing(LocationErrorKind::PermissionPrompt),
    );

    let err = PunchTransitionEngine::new(ctx.clone())
        .punch_in()
        .await
        .expect_err("dismissed");

    assert_eq!(location_kind(err), LocationErrorKind::PermissionPrompt);
    assert_eq!(transport(&ctx).calls(), 0);
    assert!(ctx.store.session().is_empty());
}

#[tokio::test]
async fn precondition_failure_skips_gate_and_network() {
    let ctx = context(ScriptedTransport::new(), ScriptedLocation::granted());
    let engine = PunchTransitionEngine::new(ctx.clone());

    for err in [
        engine.break_in().await.unwrap_err(),
        engine.break_out().await.unwrap_err(),
        engine.punch_out(confirmed()).await.unwrap_err(),
    ] {
        assert!(matches!(err, AppError::TransitionNotAllowed { .. }), "{err:?}");
        assert!(err.is_local());
    }

    assert_eq!(transport(&ctx).calls(), 0);
    assert_eq!(ctx.gate.provider().reads(), 0);
}

#[tokio::test]
async fn break_cycle_sends_ids_and_clears_break() {
    let ctx = context_with(
        ScriptedTransport::new()
            .reply(break_in_ok("B7"))
            .reply(break_out_ok()),
        ScriptedLocation::granted(),
        EmployeeRole::FieldEmployee,
        punched_in("A1"),
    );
    let engine = PunchTransitionEngine::new(ctx.clone());

    let on_break = engine.break_in().await.expect("break-in");
    assert_eq!(on_break.break_id.as_deref(), Some("B7"));
    assert!(engine.flags().can_break_out);
    assert!(!engine.flags().can_break_in);

    let back = engine.break_out().await.expect("break-out");
    assert_eq!(back.break_id, None);
    assert!(engine.flags().can_break_in);

    let sent = transport(&ctx).requests();
    assert_eq!(
        sent[0].json_body(),
        Some(&json!({ "att_id": "A1", "break_type": "in", "datetime": "05-03-25 9:07 AM" }))
    );
    assert_eq!(
        sent[1].json_body(),
        Some(&json!({ "att_id": "A1", "break_type": "out", "datetime": "05-03-25 9:07 AM", "id": "B7" }))
    );
}

#[tokio::test]
async fn declined_break_leaves_session_unchanged() {
    let ctx = context_with(
        ScriptedTransport::new()
            .reply(json!([{ "STATUS": "success", "MSG": "Break already running" }])),
        ScriptedLocation::granted(),
        EmployeeRole::FieldEmployee,
        punched_in("A1"),
    );
    let engine = PunchTransitionEngine::new(ctx.clone());
    let before = ctx.store.snapshot();

    let err = engine.break_in().await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Rejected(BusinessRejection::Declined {
            action: TransitionKind::BreakIn,
            ..
        })
    ));
    assert_eq!(ctx.store.snapshot(), before);
}

#[tokio::test]
async fn transport_failure_rolls_nothing_forward() {
    let ctx = context(
        ScriptedTransport::new().fail(TransportError::Timeout),
        ScriptedLocation::granted(),
    );
    let engine = PunchTransitionEngine::new(ctx.clone());

    let err = engine.punch_in().await.unwrap_err();
    assert!(matches!(err, AppError::Transport(TransportError::Timeout)));
    assert!(!err.is_local());
    assert!(ctx.store.session().is_empty());
    assert!(engine.flags().can_punch_in);
    assert!(!engine.is_busy(TransitionKind::PunchIn));
}

#[tokio::test]
async fn malformed_reply_is_a_transport_error() {
    let ctx = context(
        ScriptedTransport::new().reply(json!([])),
        ScriptedLocation::granted(),
    );
    let engine = PunchTransitionEngine::new(ctx.clone());

    let err = engine.punch_in().await.unwrap_err();
    assert!(matches!(err, AppError::Transport(TransportError::Malformed(_))));
    assert!(engine.flags().can_punch_in);
}

#[tokio::test]
async fn punch_out_is_terminal_for_the_day() {
    let ctx = context_with(
        ScriptedTransport::new().reply(punch_out_ok()),
        ScriptedLocation::granted(),
        EmployeeRole::FieldEmployee,
        punched_in("A1"),
    );
    let engine = PunchTransitionEngine::new(ctx.clone());

    let session = engine.punch_out(confirmed()).await.expect("punch-out");
    assert_eq!(session.attendance_id, None);
    assert_eq!(session.break_id, None);
    assert!(session.punch_out_at.is_some());

    let flags = engine.flags();
    assert!(!flags.can_punch_in);
    assert!(!flags.can_break_in);
    assert!(!flags.can_break_out);
    assert!(!flags.can_punch_out);

    assert!(matches!(
        engine.punch_in().await.unwrap_err(),
        AppError::TransitionNotAllowed { .. }
    ));
    assert!(matches!(
        engine.break_in().await.unwrap_err(),
        AppError::TransitionNotAllowed { .. }
    ));

    let sent = transport(&ctx).requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].json_body(),
        Some(&json!({ "employee_id": EMPLOYEE, "datetime": "05-03-25 9:07 AM", "id": "A1" }))
    );

    // Logout resets the store and punch-in becomes possible again.
    ctx.store.reset();
    assert!(engine.flags().can_punch_in);
}

#[tokio::test]
async fn second_punch_in_while_in_flight_is_busy() {
    let hold = Arc::new(Notify::new());
    let ctx = context(
        ScriptedTransport::held(hold.clone()).reply(punch_in_ok("123")),
        ScriptedLocation::granted(),
    );
    let engine = PunchTransitionEngine::new(ctx.clone());

    let (first, second) = tokio::join!(engine.punch_in(), async {
        tokio::task::yield_now().await;
        assert!(engine.is_busy(TransitionKind::PunchIn));
        let r = engine.punch_in().await;
        hold.notify_one();
        r
    });

    assert_eq!(first.expect("first punch-in").attendance_id.as_deref(), Some("123"));
    assert!(matches!(second, Err(AppError::Busy(TransitionKind::PunchIn))));
    assert_eq!(transport(&ctx).calls(), 1);
    assert!(!engine.is_busy(TransitionKind::PunchIn));
}

#[tokio::test]
async fn break_landing_after_punch_out_is_refused_by_the_store() {
    let hold = Arc::new(Notify::new());
    let ctx = context_with(
        ScriptedTransport::held(hold.clone())
            .reply_for(Endpoint::Break, break_in_ok("B1"))
            .reply_for(Endpoint::PunchOut, punch_out_ok()),
        ScriptedLocation::granted(),
        EmployeeRole::FieldEmployee,
        punched_in("A1"),
    );
    let engine = PunchTransitionEngine::new(ctx.clone());

    let (brk, out) = tokio::join!(engine.break_in(), async {
        tokio::task::yield_now().await;
        // Different kind: not refused as busy while break-in is in flight.
        assert!(engine.is_busy(TransitionKind::BreakIn));
        let r = engine.punch_out(confirmed()).await;
        hold.notify_one();
        r
    });

    assert!(out.is_ok(), "{out:?}");
    assert!(matches!(
        brk,
        Err(AppError::TransitionNotAllowed {
            kind: TransitionKind::BreakIn,
            ..
        })
    ));
    let session = ctx.store.session();
    assert!(session.is_consistent());
    assert_eq!(session.break_id, None);
    assert_eq!(transport(&ctx).calls(), 2);
}
