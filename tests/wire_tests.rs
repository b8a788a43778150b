use chrono::{NaiveDate, NaiveDateTime};
use fieldtrack::api::wire::{
    Ack, PunchInReply, decode_break, decode_followup, decode_punch_in, decode_punch_out,
    decode_report, decode_status, decode_visit,
};
use fieldtrack::errors::{AppError, TransportError};
use fieldtrack::models::direction::Direction;
use fieldtrack::utils::time::{format_attendance_ts, format_followup_ts, parse_server_ts};
use serde_json::json;

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 5)
        .and_then(|d| d.and_hms_opt(h, m, 0))
        .expect("valid timestamp")
}

fn is_malformed<T: std::fmt::Debug>(r: Result<T, AppError>) -> bool {
    matches!(r, Err(AppError::Transport(TransportError::Malformed(_))))
}

#[test]
fn attendance_timestamps_use_short_year_and_unpadded_hour() {
    assert_eq!(format_attendance_ts(&at(9, 7)), "05-03-25 9:07 AM");
    assert_eq!(format_attendance_ts(&at(17, 45)), "05-03-25 5:45 PM");
    assert_eq!(format_attendance_ts(&at(0, 5)), "05-03-25 12:05 AM");
}

#[test]
fn followup_timestamps_use_full_year_and_padded_hour() {
    assert_eq!(format_followup_ts(&at(9, 7)), "05-03-2025 09:07 AM");
    assert_eq!(format_followup_ts(&at(13, 30)), "05-03-2025 01:30 PM");
}

#[test]
fn server_timestamps_accept_wire_and_iso_forms() {
    assert_eq!(parse_server_ts("05-03-25 9:07 AM"), Some(at(9, 7)));
    assert_eq!(parse_server_ts("05-03-2025 09:07 AM"), Some(at(9, 7)));
    assert_eq!(parse_server_ts("2025-03-05 17:45:00"), Some(at(17, 45)));
    assert_eq!(parse_server_ts("2025-03-05T17:45:00"), Some(at(17, 45)));
    assert_eq!(parse_server_ts(""), None);
    assert_eq!(parse_server_ts("yesterday"), None);
}

#[test]
fn punch_in_decoding() {
    let cases = [
        (
            json!([{ "STATUS": "success", "MSG": "Punch in Successfully", "Id": "123" }]),
            PunchInReply::Accepted { attendance_id: "123".into() },
        ),
        (
            json!([{ "STATUS": "success", "MSG": "Punch in Successfully", "Id": 77 }]),
            PunchInReply::Accepted { attendance_id: "77".into() },
        ),
        (
            json!([{ "STATUS": "success", "MSG": "You already punched out" }]),
            PunchInReply::AlreadyPunchedOut { message: "You already punched out".into() },
        ),
        (
            json!({ "STATUS": "failed" }),
            PunchInReply::AlreadyPunchedOut { message: "failed".into() },
        ),
        // The success message must match letter for letter.
        (
            json!([{ "STATUS": "success", "MSG": "PUNCH IN SUCCESSFULLY", "Id": "1" }]),
            PunchInReply::AlreadyPunchedOut { message: "PUNCH IN SUCCESSFULLY".into() },
        ),
        (
            json!([{ "STATUS": "success", "MSG": "punch in successfully", "Id": "1" }]),
            PunchInReply::AlreadyPunchedOut { message: "punch in successfully".into() },
        ),
    ];

    for (body, expected) in cases {
        assert_eq!(decode_punch_in(body).expect("decodes"), expected);
    }
}

#[test]
fn punch_in_accepted_without_id_is_malformed() {
    assert!(is_malformed(decode_punch_in(json!([
        { "STATUS": "success", "MSG": "Punch in Successfully" }
    ]))));
}

#[test]
fn replies_without_status_or_rows_are_malformed() {
    assert!(is_malformed(decode_punch_in(json!([]))));
    assert!(is_malformed(decode_punch_out(json!([{ "MSG": "Punch out Successfully" }]))));
    assert!(is_malformed(decode_followup(json!("ok"))));
}

#[test]
fn break_decoding_checks_message_per_direction() {
    assert_eq!(
        decode_break(
            json!([{ "STATUS": "success", "MSG": "successfully Break in", "id_break": 9 }]),
            Direction::In
        )
        .expect("decodes"),
        Ack::Accepted(Some("9".into()))
    );
    assert_eq!(
        decode_break(
            json!([{ "STATUS": "success", "MSG": "successfully Break out" }]),
            Direction::Out
        )
        .expect("decodes"),
        Ack::Accepted(None)
    );
    // Right status, wrong message for the direction.
    assert_eq!(
        decode_break(
            json!([{ "STATUS": "success", "MSG": "successfully Break in" }]),
            Direction::Out
        )
        .expect("decodes"),
        Ack::Declined { message: "successfully Break in".into() }
    );
    assert!(is_malformed(decode_break(
        json!([{ "STATUS": "success", "MSG": "successfully Break in" }]),
        Direction::In
    )));
}

#[test]
fn punch_out_decoding() {
    assert_eq!(
        decode_punch_out(json!([{ "STATUS": "success", "MSG": "Punch out Successfully" }]))
            .expect("decodes"),
        Ack::Accepted(())
    );
    assert_eq!(
        decode_punch_out(json!([{ "STATUS": "success", "MSG": "Attendance not found" }]))
            .expect("decodes"),
        Ack::Declined { message: "Attendance not found".into() }
    );
    assert_eq!(
        decode_punch_out(json!([{ "STATUS": "success", "MSG": "punch OUT successfully" }]))
            .expect("decodes"),
        Ack::Declined { message: "punch OUT successfully".into() }
    );
}

#[test]
fn visit_status_is_upper_case_only() {
    assert_eq!(
        decode_visit(json!([{ "STATUS": "SUCCESS", "ev_id": "E1" }]), Direction::In)
            .expect("decodes"),
        Ack::Accepted(Some("E1".into()))
    );
    assert_eq!(
        decode_visit(json!([{ "STATUS": "SUCCESS" }]), Direction::Out).expect("decodes"),
        Ack::Accepted(None)
    );
    assert!(matches!(
        decode_visit(json!([{ "STATUS": "success", "ev_id": "E1" }]), Direction::In)
            .expect("decodes"),
        Ack::Declined { .. }
    ));
    assert!(is_malformed(decode_visit(
        json!([{ "STATUS": "SUCCESS" }]),
        Direction::In
    )));
}

#[test]
fn followup_status_ignores_case() {
    for status in ["success", "Success", "SUCCESS"] {
        assert_eq!(
            decode_followup(json!([{ "STATUS": status, "followup_id": "F1" }])).expect("decodes"),
            Ack::Accepted(Some("F1".into()))
        );
    }
    assert_eq!(
        decode_followup(json!([{ "STATUS": "Success", "Id": 4 }])).expect("decodes"),
        Ack::Accepted(Some("4".into()))
    );
    assert_eq!(
        decode_followup(json!([{ "STATUS": "error", "MSG": "lead closed" }])).expect("decodes"),
        Ack::Declined { message: "lead closed".into() }
    );
}

#[test]
fn status_drops_break_outside_open_window() {
    let status = decode_status(json!([{
        "Id": "A1",
        "id_break": "B1"
    }]))
    .expect("decodes");
    assert_eq!(status.session.break_id, None);
    assert!(status.session.is_consistent());
}

#[test]
fn status_visit_needs_both_ids() {
    let status = decode_status(json!([{ "ev_id": "E1" }])).expect("decodes");
    assert_eq!(status.open_visit, None);
}

#[test]
fn report_decoding_keeps_open_intervals() {
    let records = decode_report(json!([{
        "date": "2025-03-05",
        "login": "2025-03-05 09:00:00",
        "logout": null,
        "breaks": [
            { "start": "2025-03-05 12:00:00", "end": "2025-03-05 12:30:00" },
            { "start": "2025-03-05 15:00:00" }
        ],
        "visits": [
            { "lead_id": 42, "start": "05-03-25 10:00 AM", "end": "05-03-25 11:15 AM" }
        ]
    }]))
    .expect("decodes");

    assert_eq!(records.len(), 1);
    let day = &records[0];
    assert_eq!(day.date, NaiveDate::from_ymd_opt(2025, 3, 5).expect("date"));
    assert_eq!(day.login, Some(at(9, 0)));
    assert_eq!(day.logout, None);
    assert_eq!(day.breaks.len(), 2);
    assert!(day.breaks[1].is_open());
    assert_eq!(day.visits[0].lead_id, "42");
    assert_eq!(day.visits[0].interval.minutes(), 75);
}

#[test]
fn report_with_bad_date_is_malformed() {
    assert!(is_malformed(decode_report(json!([{ "date": "05/03/2025" }]))));
}
