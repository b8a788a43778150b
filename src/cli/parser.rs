use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for fieldtrack
/// Attendance and field-visit tracking against the sales backend
#[derive(Parser)]
#[command(
    name = "fieldtrack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track attendance (punch/break) and lead visits with geolocation, backed by a REST API",
    long_about = None
)]
pub struct Cli {
    /// Override the local cache path (useful for tests or a custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the configuration file path
    #[arg(global = true, long = "config")]
    pub config: Option<PathBuf>,

    /// Run in test mode (never prompt)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Followup fields shared by `visit-out` and `followup`.
#[derive(Args, Debug, Clone, Default)]
pub struct FollowupArgs {
    #[arg(long, help = "Outcome id")]
    pub outcome: Option<String>,

    #[arg(long = "type", help = "Followup type id")]
    pub followup_type: Option<String>,

    #[arg(long, help = "Free-text remarks")]
    pub remarks: Option<String>,

    #[arg(
        long = "taken-at",
        help = "When the followup happened (YYYY-MM-DD HH:MM or HH:MM, default: now)"
    )]
    pub taken_at: Option<String>,

    #[arg(
        long = "next-action",
        help = "Next action date (YYYY-MM-DD HH:MM or HH:MM)"
    )]
    pub next_action: Option<String>,

    #[arg(long, value_name = "FILE", help = "Attach a single file")]
    pub attachment: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the local cache and configuration
    Init,

    /// Set the acting employee
    Login {
        #[arg(long = "employee", help = "Employee id")]
        employee: String,

        #[arg(
            long = "role",
            help = "field_employee, office_employee, contact or admin"
        )]
        role: Option<String>,
    },

    /// Forget the acting employee and the cached day
    Logout,

    /// Show today's attendance, enabled controls and the open visit
    Status,

    /// Start today's attendance window
    PunchIn,

    /// Start a break
    BreakIn,

    /// End the open break
    BreakOut,

    /// Close today's attendance (irreversible for the day)
    PunchOut {
        #[arg(long, short = 'y', help = "Skip both confirmation prompts")]
        yes: bool,
    },

    /// Open a visit on a lead
    VisitIn { lead: String },

    /// Close the open visit on a lead: followup first, then visit-out
    VisitOut {
        lead: String,

        #[arg(
            long = "resume",
            help = "Finish a checkout whose followup was already saved"
        )]
        resume: bool,

        #[command(flatten)]
        followup: FollowupArgs,
    },

    /// Record a followup on a lead without touching the visit
    Followup {
        lead: String,

        #[command(flatten)]
        followup: FollowupArgs,
    },

    /// Show which visit control each lead offers
    Leads {
        #[arg(required = true)]
        leads: Vec<String>,
    },

    /// Attendance history report
    Report {
        #[arg(long, short, help = "Period: YYYY, YYYY-MM or YYYY-MM-DD")]
        period: Option<String>,

        #[arg(
            long,
            conflicts_with = "period",
            value_name = "RANGE",
            help = "Range: <start>:<end>, each side a period"
        )]
        range: Option<String>,

        #[arg(long, help = "Print rows and totals as JSON")]
        json: bool,
    },

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Run configuration file migrations if needed")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the local cache (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "operation", help = "Only rows for this operation")]
        operation: Option<String>,
    },
}

impl Commands {
    /// Commands that talk to the backend on behalf of the employee.
    pub fn needs_session(&self) -> bool {
        !matches!(
            self,
            Commands::Init
                | Commands::Login { .. }
                | Commands::Logout
                | Commands::Config { .. }
                | Commands::Db { .. }
                | Commands::Log { .. }
        )
    }

    /// Commands that mutate state and must pass the location gate.
    pub fn is_tracked(&self) -> bool {
        matches!(
            self,
            Commands::PunchIn
                | Commands::BreakIn
                | Commands::BreakOut
                | Commands::PunchOut { .. }
                | Commands::VisitIn { .. }
                | Commands::VisitOut { .. }
                | Commands::Followup { .. }
        )
    }
}
