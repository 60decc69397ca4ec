//! Plain-text rendering of local previews and backend responses.

use serde::Serialize;

use chemviz_client::dashboard::LocalPreview;
use chemviz_client::models::{
    DatasetSnapshot, EmailReportSchedule, EquipmentAlert, EquipmentComparison, EquipmentRanking,
    MaintenanceSchedule, UploadSummary, User,
};
use chemviz_core::summary::BatchSummary;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn opt_score(v: Option<f64>) -> String {
    v.map(|s| format!("{s:.1}")).unwrap_or_else(|| "-".to_string())
}

pub fn preview(preview: &LocalPreview) {
    println!("Local preview: {}", preview.file_name);
    println!(
        "{:<20} {:<16} {:>10} {:>10} {:>12} {:<7} {:>5}",
        "NAME", "TYPE", "FLOWRATE", "PRESSURE", "TEMPERATURE", "STATUS", "SCORE"
    );
    for a in &preview.records {
        let r = &a.record;
        println!(
            "{:<20} {:<16} {:>10.2} {:>10.2} {:>12.2} {:<7} {:>5}",
            r.name, r.equipment_type, r.flowrate, r.pressure, r.temperature, a.status, a.score
        );
    }
    println!();
    batch_summary(&preview.summary);
}

pub fn batch_summary(s: &BatchSummary) {
    println!("Total Records:       {}", s.total_records);
    println!("Average Flowrate:    {:.2}", s.avg_flowrate);
    println!("Average Pressure:    {:.2}", s.avg_pressure);
    println!("Average Temperature: {:.2}", s.avg_temperature);
    distribution(s.type_distribution.iter().map(|(k, v)| (k.as_str(), *v)));
}

fn distribution<'a>(counts: impl Iterator<Item = (&'a str, u64)>) {
    println!("Equipment Distribution:");
    for (kind, count) in counts {
        println!("  {kind:<16} {count:>4} {}", "#".repeat(count.min(50) as usize));
    }
}

pub fn upload_summary(s: &UploadSummary) {
    println!("Server summary");
    println!("Total Records:       {}", s.total_records);
    println!("Average Flowrate:    {:.2}", s.avg_flowrate);
    println!("Average Pressure:    {:.2}", s.avg_pressure);
    println!("Average Temperature: {:.2}", s.avg_temperature);
    distribution(s.type_distribution.iter().map(|(k, v)| (k.as_str(), *v)));

    if let Some(analytics) = &s.advanced_analytics {
        println!("Analytics:");
        if let Some(avg) = analytics.average_health_score {
            println!("  Average health score: {avg:.1}");
        }
        for h in &analytics.equipment_health {
            println!(
                "  {:<20} {:<16} health {:>5.1} efficiency {}",
                h.equipment_name,
                h.equipment_type,
                h.health_score,
                opt_score(h.efficiency_index)
            );
        }
    }

    if !s.alerts.is_empty() {
        println!("Alerts:");
        for a in &s.alerts {
            println!(
                "  [{}] {} {} = {:.2} (threshold {:.2}): {}",
                a.alert_type.as_str(),
                a.equipment_name,
                a.parameter,
                a.value,
                a.threshold,
                a.message
            );
        }
    }
}

pub fn history(rows: &[DatasetSnapshot]) {
    println!(
        "{:>5} {:<20} {:>8} {:>10} {:>10} {:>12}  FILE",
        "ID", "UPLOADED", "RECORDS", "FLOWRATE", "PRESSURE", "TEMPERATURE"
    );
    for d in rows {
        println!(
            "{:>5} {:<20} {:>8} {:>10.2} {:>10.2} {:>12.2}  {}",
            d.id,
            d.uploaded_at.format("%Y-%m-%d %H:%M").to_string(),
            d.total_records,
            d.avg_flowrate,
            d.avg_pressure,
            d.avg_temperature,
            d.file_name.as_deref().unwrap_or("-")
        );
    }
}

pub fn alerts(rows: &[EquipmentAlert]) {
    if rows.is_empty() {
        println!("No alerts.");
        return;
    }
    for a in rows {
        let state = if a.resolved { "resolved" } else { "open" };
        println!(
            "#{} [{}] {} {} = {:.2} (threshold {:.2}) {}: {}",
            a.id,
            a.alert_type.as_str(),
            a.equipment_name,
            a.parameter,
            a.value,
            a.threshold,
            state,
            a.message
        );
        if let Some(rec) = &a.recommendation {
            println!("    -> {rec}");
        }
        if let Some(date) = a.predicted_failure_date {
            println!(
                "    predicted failure {date} (confidence {})",
                opt_score(a.confidence_score.map(|c| c * 100.0))
            );
        }
    }
}

pub fn rankings(rows: &[EquipmentRanking]) {
    println!(
        "{:<20} {:<16} {:>7} {:>5} {:>5} {:>5}",
        "NAME", "TYPE", "SCORE", "EFF", "REL", "PERF"
    );
    for r in rows {
        println!(
            "{:<20} {:<16} {:>7.1} {:>5} {:>5} {:>5}",
            r.equipment_name,
            r.equipment_type,
            r.overall_score,
            r.efficiency_rank,
            r.reliability_rank,
            r.performance_rank
        );
    }
}

pub fn comparison(rows: &[EquipmentComparison]) {
    println!(
        "{:<20} {:<16} {:>10} {:>10} {:>12} {:>7}",
        "NAME", "TYPE", "FLOWRATE", "PRESSURE", "TEMPERATURE", "HEALTH"
    );
    for c in rows {
        println!(
            "{:<20} {:<16} {:>10.2} {:>10.2} {:>12.2} {:>7}",
            c.equipment_name,
            c.equipment_type,
            c.flowrate,
            c.pressure,
            c.temperature,
            opt_score(c.health_score)
        );
    }
}

pub fn maintenance(rows: &[MaintenanceSchedule]) {
    if rows.is_empty() {
        println!("No maintenance scheduled.");
        return;
    }
    for m in rows {
        maintenance_one(m);
    }
}

pub fn maintenance_one(m: &MaintenanceSchedule) {
    println!(
        "#{} {} {} ({}) {} {} {:.1}h: {}",
        m.id,
        m.scheduled_date,
        m.equipment_name,
        m.equipment_type,
        m.priority.as_str(),
        m.status.as_str(),
        m.estimated_hours,
        m.description
    );
    if !m.parts_needed.is_empty() {
        println!("    parts: {}", m.parts_needed.join(", "));
    }
}

pub fn email_schedules(rows: &[EmailReportSchedule]) {
    if rows.is_empty() {
        println!("No email reports scheduled.");
        return;
    }
    for s in rows {
        email_schedule_one(s);
    }
}

pub fn email_schedule_one(s: &EmailReportSchedule) {
    let sent = s
        .last_sent
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());
    println!(
        "#{} {} {} {} (last sent {sent})",
        s.id,
        s.frequency.as_str(),
        s.email,
        if s.active { "active" } else { "paused" },
    );
}

pub fn user(user: Option<&User>, authenticated: bool) {
    match (user, authenticated) {
        (Some(u), _) => println!("{} <{}> (id {})", u.username, u.email, u.id),
        (None, true) => println!("Authenticated with a bearer token"),
        (None, false) => println!("Not logged in"),
    }
}
