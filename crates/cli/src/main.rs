//! `chemviz` -- command-line dashboard for chemical equipment readings.
//!
//! Inspects CSV files locally (health status and score per record) and
//! talks to the analytics backend for uploads, history, alerts and reports.
//!
//! # Environment variables
//!
//! | Variable                       | Required | Default                      | Description                    |
//! |--------------------------------|----------|------------------------------|--------------------------------|
//! | `CHEMVIZ_API_URL`              | no       | `http://127.0.0.1:8000/api`  | Backend base URL               |
//! | `CHEMVIZ_REQUEST_TIMEOUT_SECS` | no       | `30`                         | Per-request timeout            |
//! | `CHEMVIZ_SESSION_FILE`         | no       | `.chemviz-session.json`      | Where the login is persisted   |
//! | `CHEMVIZ_TOKEN`                | no       | --                           | Bearer token overriding the saved session |
//! | `RUST_LOG`                     | no       | `chemviz=info,...`           | Log filter (logs go to stderr) |

mod args;
mod commands;
mod render;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chemviz=info,chemviz_client=info,chemviz_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
