mod common;

use std::fs;

use chrono::Duration;
use common::*;
use fieldtrack::cli::parser::FollowupArgs;
use fieldtrack::errors::AppError;
use fieldtrack::models::followup::FollowupDraft;
use predicates::str::contains;

#[test]
fn init_creates_config_and_database() {
    let home = setup_test_home("cli_init");
    let cfg_path = home.join("fieldtrack.conf");
    let db_path = home.join("data").join("cache.sqlite");

    ft().args([
        "--config",
        cfg_path.to_str().unwrap(),
        "--db",
        db_path.to_str().unwrap(),
        "init",
    ])
    .assert()
    .success()
    .stdout(contains("Database initialized"))
    .stdout(contains("initialization completed"));

    assert!(cfg_path.exists());
    assert!(db_path.exists());
    let saved = fs::read_to_string(&cfg_path).unwrap();
    assert!(saved.contains("cache.sqlite"));
}

#[test]
fn config_print_and_check() {
    let home = setup_test_home("cli_config");
    let (cfg, _) = write_config(&home, "E42", "granted");

    ft().args(["--config", cfg.as_str(), "config", "--print"])
        .assert()
        .success()
        .stdout(contains("E42"))
        .stdout(contains("127.0.0.1:9/api"));

    ft().args(["--config", cfg.as_str(), "config", "--check"])
        .assert()
        .success()
        .stdout(contains("Configuration file is complete"));
}

#[test]
fn config_check_reports_missing_keys() {
    let home = setup_test_home("cli_config_missing");
    let cfg_path = home.join("fieldtrack.conf");
    let db_path = home.join("fieldtrack.sqlite");
    fs::write(
        &cfg_path,
        format!(
            "database: {}\nbackend:\n  base_url: http://127.0.0.1:9/api\n",
            db_path.display()
        ),
    )
    .unwrap();

    ft().args(["--config", cfg_path.to_str().unwrap(), "config", "--check"])
        .assert()
        .success()
        .stdout(contains("Missing keys"));
}

#[test]
fn session_commands_need_a_login() {
    let home = setup_test_home("cli_no_login");
    let (cfg, _) = write_config(&home, "", "granted");

    ft().args(["--config", cfg.as_str(), "--test", "status"])
        .assert()
        .failure()
        .stderr(contains("fieldtrack login"));
}

#[test]
fn login_then_status_shows_an_empty_day() {
    let home = setup_test_home("cli_login_status");
    let (cfg, _) = write_config(&home, "", "granted");

    ft().args(["--config", cfg.as_str(), "login", "--employee", "E7", "--role", "field-employee"])
        .assert()
        .success()
        .stdout(contains("Logged in as E7"));

    ft().args(["--config", cfg.as_str(), "--test", "status"])
        .assert()
        .success()
        .stdout(contains("Attendance for"))
        .stdout(contains("E7"))
        .stdout(contains("[punch-in]"));

    ft().args(["--config", cfg.as_str(), "log", "--print", "--operation", "login"])
        .assert()
        .success()
        .stdout(contains("Logged in as E7"));
}

#[test]
fn login_rejects_unknown_role() {
    let home = setup_test_home("cli_bad_role");
    let (cfg, _) = write_config(&home, "", "granted");

    ft().args(["--config", cfg.as_str(), "login", "--employee", "E7", "--role", "boss"])
        .assert()
        .failure()
        .stderr(contains("unknown role"));
}

#[test]
fn denied_location_blocks_punch_in() {
    let home = setup_test_home("cli_denied");
    let (cfg, _) = write_config(&home, "E42", "denied");

    ft().args(["--config", cfg.as_str(), "--test", "punch-in"])
        .assert()
        .failure()
        .stderr(contains("Punch-In is blocked"));

    ft().args(["--config", cfg.as_str(), "log", "--print", "--operation", "punch_in"])
        .assert()
        .success()
        .stdout(contains("The internal log is empty"));
}

#[test]
fn pending_permission_without_terminal_blocks_visit_in() {
    let home = setup_test_home("cli_prompt");
    let (cfg, _) = write_config(&home, "E42", "prompt");

    ft().args(["--config", cfg.as_str(), "--test", "visit-in", "L1"])
        .assert()
        .failure()
        .stderr(contains("Visit-In needs your location"));
}

#[test]
fn break_in_before_punch_in_is_refused_locally() {
    let home = setup_test_home("cli_break_first");
    let (cfg, _) = write_config(&home, "E42", "granted");

    ft().args(["--config", cfg.as_str(), "--test", "break-in"])
        .assert()
        .failure()
        .stderr(contains("Break-In is not allowed right now"));
}

#[test]
fn punch_out_without_terminal_needs_yes() {
    let home = setup_test_home("cli_punch_out");
    let (cfg, _) = write_config(&home, "E42", "granted");

    ft().args(["--config", cfg.as_str(), "--test", "punch-out"])
        .assert()
        .failure()
        .stderr(contains("--yes"));
}

#[test]
fn followup_without_next_action_fails_before_sending() {
    let home = setup_test_home("cli_followup");
    let (cfg, _) = write_config(&home, "E42", "granted");

    ft().args([
        "--config", cfg.as_str(), "--test", "followup", "L1", "--outcome", "1", "--type", "2", "--remarks",
        "Called back",
    ])
    .assert()
    .failure()
    .stderr(contains("--next-action"));
}

#[test]
fn report_range_must_be_ordered() {
    let home = setup_test_home("cli_report_range");
    let (cfg, _) = write_config(&home, "E42", "granted");

    ft().args(["--config", cfg.as_str(), "--test", "report", "--range", "2025-03:2025-01"])
        .assert()
        .failure()
        .stderr(contains("Range end precedes start"));
}

#[test]
fn leads_table_offers_visit_in_on_an_empty_slot() {
    let home = setup_test_home("cli_leads");
    let (cfg, _) = write_config(&home, "E42", "granted");

    ft().args(["--config", cfg.as_str(), "--test", "leads", "L1", "L2"])
        .assert()
        .success()
        .stdout(contains("L1"))
        .stdout(contains("Visit In"));
}

#[test]
fn db_info_and_check() {
    let home = setup_test_home("cli_db");
    let (cfg, _) = write_config(&home, "E42", "granted");

    ft().args(["--config", cfg.as_str(), "db", "--migrate"])
        .assert()
        .success()
        .stdout(contains("Migration completed"));
    ft().args(["--config", cfg.as_str(), "db", "--check", "--info"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"))
        .stdout(contains("Audit lines"));
}

#[test]
fn db_check_warns_about_an_outdated_schema() {
    let home = setup_test_home("cli_db_behind");
    let (cfg, _) = write_config(&home, "E42", "granted");

    ft().args(["--config", cfg.as_str(), "db", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"))
        .stdout(contains("Cache schema is behind"));

    ft().args(["--config", cfg.as_str(), "db", "--migrate"])
        .assert()
        .success()
        .stdout(contains("Applying 3 migration(s)"));
    ft().args(["--config", cfg.as_str(), "db", "--migrate"])
        .assert()
        .success()
        .stdout(contains("Cache schema is up to date"));
}

// ---------------------------------------------------------------------------
// Followup arguments
// ---------------------------------------------------------------------------

fn args(next_action: Option<&str>) -> FollowupArgs {
    FollowupArgs {
        outcome: Some("3".into()),
        followup_type: Some("1".into()),
        remarks: Some("Demo booked".into()),
        taken_at: None,
        next_action: next_action.map(str::to_string),
        attachment: None,
    }
}

#[test]
fn followup_args_default_taken_at_to_now() {
    let form = args(Some("2025-03-12 10:30"))
        .fill(FollowupDraft::standalone("L1"), fixed_now())
        .expect("form");
    assert_eq!(form.followup_taken_at, fixed_now());
    assert_eq!(
        form.next_action_at,
        fixed_now().date().and_hms_opt(10, 30, 0).unwrap() + Duration::days(7)
    );
    assert_eq!(form.lead_id, "L1");
}

#[test]
fn followup_args_accept_time_only_for_today() {
    let form = args(Some("16:00"))
        .fill(FollowupDraft::standalone("L1"), fixed_now())
        .expect("form");
    assert_eq!(form.next_action_at, fixed_now().date().and_hms_opt(16, 0, 0).unwrap());
}

#[test]
fn followup_args_require_next_action_and_fields() {
    assert!(matches!(
        args(None).fill(FollowupDraft::standalone("L1"), fixed_now()),
        Err(AppError::InvalidFollowup(_))
    ));

    let mut missing_remarks = args(Some("16:00"));
    missing_remarks.remarks = None;
    assert!(matches!(
        missing_remarks.fill(FollowupDraft::standalone("L1"), fixed_now()),
        Err(AppError::InvalidFollowup(_))
    ));

    assert!(matches!(
        args(Some("tomorrow")).fill(FollowupDraft::standalone("L1"), fixed_now()),
        Err(AppError::InvalidTime(_))
    ));
}

#[test]
fn followup_args_read_the_attachment() {
    let home = setup_test_home("cli_attachment");
    let file = home.join("photo.JPG");
    fs::write(&file, b"jpeg-bytes").unwrap();

    let mut with_file = args(Some("16:00"));
    with_file.attachment = Some(file);
    let form = with_file
        .fill(FollowupDraft::standalone("L1"), fixed_now())
        .expect("form");

    let attachment = form.attachment.expect("attachment");
    assert_eq!(attachment.file_name, "photo.JPG");
    assert_eq!(attachment.mime_type, "image/jpeg");
    assert_eq!(attachment.bytes, b"jpeg-bytes".to_vec());
}
