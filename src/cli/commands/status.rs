use crate::cli::app::App;
use crate::errors::AppResult;
use crate::ui::messages::header;
use crate::utils::colors::{CYAN, GREY, RESET, colorize_flag, colorize_optional};
use crate::utils::formatting::bold;
use crate::utils::time::hhmm_or_placeholder;

/// Handle the `status` command: the punch widget, as text.
pub fn handle(app: &App) -> AppResult<()> {
    let snap = app.ctx.store.snapshot();
    let session = &snap.session;
    let flags = snap.flags();

    header(format!("Attendance for {}", bold(app.ctx.employee_id())));

    println!(
        "{CYAN}• Attendance id:{RESET} {}",
        colorize_optional(session.attendance_id.as_deref().unwrap_or("--:--"))
    );
    println!(
        "{CYAN}• Punch in:{RESET}      {}",
        colorize_optional(&hhmm_or_placeholder(session.punch_in_at.as_ref()))
    );
    println!(
        "{CYAN}• Punch out:{RESET}     {}",
        colorize_optional(&hhmm_or_placeholder(session.punch_out_at.as_ref()))
    );
    println!(
        "{CYAN}• On break:{RESET}      {}",
        match &session.break_id {
            Some(id) => format!("yes (break {})", id),
            None => "no".to_string(),
        }
    );
    if snap.punch_in_locked {
        println!("{CYAN}• Day closed:{RESET}    punch-in is disabled until tomorrow");
    }

    println!();
    println!(
        "  {}  {}  {}  {}",
        colorize_flag("[punch-in]", flags.can_punch_in),
        colorize_flag("[break-in]", flags.can_break_in),
        colorize_flag("[break-out]", flags.can_break_out),
        colorize_flag("[punch-out]", flags.can_punch_out),
    );
    println!();

    match &snap.visit {
        Some(v) => println!(
            "{CYAN}• Open visit:{RESET}    lead {} (ev_id {}, {})",
            v.reference_id,
            v.visit_event_id,
            v.phase.as_str()
        ),
        None => println!("{CYAN}• Open visit:{RESET}    {GREY}--{RESET}"),
    }

    Ok(())
}
