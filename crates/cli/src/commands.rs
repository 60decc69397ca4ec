//! Subcommand handlers. Each performs at most one backend action.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use chemviz_client::api::ApiClient;
use chemviz_client::config::{normalize_base_url, ClientConfig};
use chemviz_client::dashboard::{Dashboard, LocalPreview};
use chemviz_client::models::{
    Download, EmailScheduleUpdate, NewEmailSchedule, NewMaintenanceSchedule,
};
use chemviz_client::session::Session;
use chemviz_core::summary::{export_records_csv, export_summary_csv};

use crate::args::{Cli, Commands, EmailCommand, MaintenanceCommand};
use crate::render;

/// Everything a handler needs: the client, the session it acts as, and
/// output preferences.
struct Context {
    api: ApiClient,
    session: Session,
    session_file: PathBuf,
    json: bool,
}

impl Context {
    fn build(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = &cli.api_url {
            config.api_url = normalize_base_url(url);
        }
        if let Some(path) = &cli.session_file {
            config.session_file = path.clone();
        }

        let session = match &cli.token {
            Some(token) => Session::with_token(token.clone()),
            None => Session::load(&config.session_file)?,
        };

        tracing::debug!(
            api_url = %config.api_url,
            session_file = %config.session_file.display(),
            authenticated = session.is_authenticated(),
            "Client configured",
        );

        Ok(Self {
            api: ApiClient::new(&config)?,
            session,
            session_file: config.session_file,
            json: cli.json,
        })
    }
}

fn read_file(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    let bytes = std::fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());
    Ok((name, bytes))
}

fn write_download(download: &Download, out: Option<PathBuf>) -> anyhow::Result<()> {
    let path = out.unwrap_or_else(|| PathBuf::from(&download.file_name));
    std::fs::write(&path, &download.bytes)
        .with_context(|| format!("Cannot write {}", path.display()))?;
    println!("Saved {} ({} bytes)", path.display(), download.bytes.len());
    Ok(())
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    // Local inspection needs no configuration or session.
    if let Commands::Inspect {
        file,
        export,
        summary_out,
    } = &cli.command
    {
        return inspect(file, export.as_deref(), summary_out.as_deref(), cli.json);
    }

    let mut ctx = Context::build(&cli)?;

    match cli.command {
        Commands::Inspect { .. } => Ok(()),
        Commands::Upload { file } => upload(&ctx, &file).await,
        Commands::Login { username, password } => {
            let auth = ctx.api.login(&username, &password).await?;
            ctx.session = Session::from_auth(auth);
            ctx.session.save(&ctx.session_file)?;
            tracing::info!(username = %username, "Logged in");
            render::user(ctx.session.user(), true);
            Ok(())
        }
        Commands::Register {
            username,
            password,
            email,
        } => {
            let auth = ctx.api.register(&username, &password, &email).await?;
            ctx.session = Session::from_auth(auth);
            ctx.session.save(&ctx.session_file)?;
            tracing::info!(username = %username, "Registered");
            render::user(ctx.session.user(), true);
            Ok(())
        }
        Commands::Logout => {
            ctx.session.logout();
            Session::clear(&ctx.session_file)?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => {
            if ctx.json {
                return render::print_json(&ctx.session.user());
            }
            render::user(ctx.session.user(), ctx.session.is_authenticated());
            Ok(())
        }
        Commands::History => {
            let rows = ctx.api.history(&ctx.session).await?;
            show(ctx.json, &rows, render::history)
        }
        Commands::Trends => {
            let rows = ctx.api.trends(&ctx.session).await?;
            show(ctx.json, &rows, render::history)
        }
        Commands::Alerts => {
            let rows = ctx.api.alerts(&ctx.session).await?;
            show(ctx.json, &rows, render::alerts)
        }
        Commands::ResolveAlert { id } => {
            let alert = ctx.api.resolve_alert(&ctx.session, id).await?;
            show(ctx.json, std::slice::from_ref(&alert), render::alerts)
        }
        Commands::Compare { names } => {
            let rows = ctx.api.compare_equipment(&ctx.session, &names).await?;
            show(ctx.json, &rows, render::comparison)
        }
        Commands::Rankings => {
            let rows = ctx.api.rankings(&ctx.session).await?;
            show(ctx.json, &rows, render::rankings)
        }
        Commands::Maintenance { action } => maintenance(&ctx, action).await,
        Commands::EmailReports { action } => email_reports(&ctx, action).await,
        Commands::Report { out } => {
            let download = ctx.api.download_report(&ctx.session).await?;
            write_download(&download, out)
        }
        Commands::ExportExcel { out } => {
            let download = ctx.api.export_excel(&ctx.session).await?;
            write_download(&download, out)
        }
    }
}

fn show<T: serde::Serialize>(json: bool, rows: &[T], table: fn(&[T])) -> anyhow::Result<()> {
    if json {
        render::print_json(rows)
    } else {
        table(rows);
        Ok(())
    }
}

fn inspect(
    file: &Path,
    export: Option<&Path>,
    summary_out: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let (name, bytes) = read_file(file)?;
    let preview = LocalPreview::from_bytes(&name, &bytes)?;

    if json {
        render::print_json(&serde_json::json!({
            "records": preview.records,
            "summary": preview.summary,
        }))?;
    } else {
        render::preview(&preview);
    }

    if let Some(path) = export {
        std::fs::write(path, export_records_csv(&preview.records)?)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Wrote preview table");
    }
    if let Some(path) = summary_out {
        std::fs::write(path, export_summary_csv(&preview.summary)?)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Wrote summary table");
    }
    Ok(())
}

async fn upload(ctx: &Context, file: &Path) -> anyhow::Result<()> {
    let (name, bytes) = read_file(file)?;
    let mut dashboard = Dashboard::new();

    let preview = dashboard.stage(&name, &bytes)?;
    if !ctx.json {
        render::preview(preview);
        println!();
    }

    let summary = dashboard.submit(&ctx.api, &ctx.session, &name, bytes).await?;
    if ctx.json {
        render::print_json(summary)
    } else {
        render::upload_summary(summary);
        Ok(())
    }
}

async fn maintenance(ctx: &Context, action: MaintenanceCommand) -> anyhow::Result<()> {
    match action {
        MaintenanceCommand::List => {
            let rows = ctx.api.maintenance(&ctx.session).await?;
            show(ctx.json, &rows, render::maintenance)
        }
        MaintenanceCommand::Create {
            equipment,
            equipment_type,
            date,
            priority,
            hours,
            description,
            parts,
            notes,
        } => {
            let new = NewMaintenanceSchedule {
                equipment_name: equipment,
                equipment_type,
                scheduled_date: date,
                priority,
                estimated_hours: hours,
                parts_needed: parts,
                description,
                notes,
            };
            let created = ctx.api.create_maintenance(&ctx.session, &new).await?;
            show(ctx.json, std::slice::from_ref(&created), render::maintenance)
        }
        MaintenanceCommand::Update { id, status, notes } => {
            let updated = ctx
                .api
                .update_maintenance_status(&ctx.session, id, status, notes)
                .await?;
            show(ctx.json, std::slice::from_ref(&updated), render::maintenance)
        }
    }
}

async fn email_reports(ctx: &Context, action: EmailCommand) -> anyhow::Result<()> {
    match action {
        EmailCommand::List => {
            let rows = ctx.api.email_schedules(&ctx.session).await?;
            show(ctx.json, &rows, render::email_schedules)
        }
        EmailCommand::Schedule { email, frequency } => {
            let new = NewEmailSchedule::full(frequency, email);
            let created = ctx.api.schedule_email_report(&ctx.session, &new).await?;
            show(ctx.json, std::slice::from_ref(&created), render::email_schedules)
        }
        EmailCommand::Update {
            id,
            frequency,
            email,
            active,
        } => {
            let update = EmailScheduleUpdate {
                frequency,
                email,
                active,
            };
            let updated = ctx
                .api
                .update_email_schedule(&ctx.session, id, &update)
                .await?;
            show(ctx.json, std::slice::from_ref(&updated), render::email_schedules)
        }
        EmailCommand::Delete { id } => {
            ctx.api.delete_email_schedule(&ctx.session, id).await?;
            println!("Deleted email report schedule #{id}");
            Ok(())
        }
    }
}
