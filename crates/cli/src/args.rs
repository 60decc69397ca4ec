use std::path::PathBuf;

use chemviz_client::models::{MaintenancePriority, MaintenanceStatus, ReportFrequency};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chemviz")]
#[command(about = "Inspect and upload chemical equipment readings", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Backend base URL (overrides CHEMVIZ_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file (overrides CHEMVIZ_SESSION_FILE).
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Use this bearer token instead of the saved session.
    #[arg(long, env = "CHEMVIZ_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Print responses as JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Parse a CSV locally and show health status and score per record")]
    Inspect {
        file: PathBuf,

        /// Write the per-record preview table here.
        #[arg(long)]
        export: Option<PathBuf>,

        /// Write the batch summary (metric,value) here.
        #[arg(long)]
        summary_out: Option<PathBuf>,
    },

    #[command(about = "Upload a CSV and show the backend summary")]
    Upload { file: PathBuf },

    #[command(about = "Log in and save the session")]
    Login {
        #[arg(long, env = "CHEMVIZ_USERNAME")]
        username: String,
        #[arg(long, env = "CHEMVIZ_PASSWORD", hide_env_values = true)]
        password: String,
    },

    #[command(about = "Create an account and save the session")]
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, env = "CHEMVIZ_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "")]
        email: String,
    },

    #[command(about = "Forget the saved session")]
    Logout,

    #[command(about = "Show the logged-in user")]
    Whoami,

    #[command(about = "List recent uploads")]
    History,

    #[command(about = "List upload trends")]
    Trends,

    #[command(about = "List equipment alerts")]
    Alerts,

    #[command(about = "Mark an alert as resolved")]
    ResolveAlert { id: i64 },

    #[command(about = "Compare equipment side by side")]
    Compare {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },

    #[command(about = "List equipment rankings")]
    Rankings,

    #[command(about = "Maintenance schedules")]
    Maintenance {
        #[command(subcommand)]
        action: MaintenanceCommand,
    },

    #[command(about = "Scheduled email reports")]
    EmailReports {
        #[command(subcommand)]
        action: EmailCommand,
    },

    #[command(about = "Download the PDF report")]
    Report {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    #[command(about = "Download the Excel export")]
    ExportExcel {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MaintenanceCommand {
    List,
    Create {
        #[arg(long)]
        equipment: String,
        #[arg(long = "type")]
        equipment_type: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "medium")]
        priority: MaintenancePriority,
        #[arg(long)]
        hours: f64,
        #[arg(long)]
        description: String,
        #[arg(long = "part")]
        parts: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Update {
        id: i64,
        /// scheduled, in-progress, completed, cancelled
        #[arg(long)]
        status: MaintenanceStatus,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum EmailCommand {
    List,
    Schedule {
        email: String,
        #[arg(long, default_value = "weekly")]
        frequency: ReportFrequency,
    },
    Update {
        id: i64,
        #[arg(long)]
        frequency: Option<ReportFrequency>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, action = ArgAction::Set)]
        active: Option<bool>,
    },
    Delete { id: i64 },
}
