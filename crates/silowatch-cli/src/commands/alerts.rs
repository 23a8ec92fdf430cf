//! Alert command handlers.

use std::sync::Arc;

use chrono::Utc;
use strum::IntoEnumIterator;
use tabled::Tabled;

use silowatch_core::{
    Alert, AlertFilter, AlertSeverity, AlertStats, AlertType, Command as CoreCommand,
    CommandResult, Controller, ControllerConfig, EntityId,
};

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Type")]
    alert_type: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Farm")]
    farm: String,
    #[tabled(rename = "Age")]
    age: String,
}

impl From<&Arc<Alert>> for AlertRow {
    fn from(a: &Arc<Alert>) -> Self {
        Self {
            id: a.id.to_string(),
            severity: a.severity.to_string(),
            status: a.status.to_string(),
            alert_type: a.alert_type.to_string(),
            title: a.title.clone(),
            farm: a.farm_name.clone().unwrap_or_default(),
            age: util::format_age(a.created_at, Utc::now()),
        }
    }
}

fn detail(a: &Arc<Alert>, color: bool) -> String {
    let mut lines = vec![
        format!("ID:        {}", a.id),
        format!("Title:     {}", a.title),
        format!("Message:   {}", a.message),
        format!("Type:      {}", a.alert_type),
        format!("Severity:  {}", output::paint_severity(a.severity, color)),
        format!("Status:    {}", output::paint_alert_status(a.status, color)),
        format!("Farm:      {}", a.farm_name.as_deref().unwrap_or("-")),
        format!("Device:    {}", a.device_name.as_deref().unwrap_or("-")),
    ];
    if let Some(value) = a.value {
        let unit = a.unit.as_deref().unwrap_or("");
        let threshold = a
            .threshold
            .map_or_else(|| "-".into(), |t| format!("{t}{unit}"));
        lines.push(format!("Reading:   {value}{unit} (threshold {threshold})"));
    }
    lines.push(format!(
        "Created:   {} ({})",
        util::format_timestamp(Some(a.created_at)),
        util::format_age(a.created_at, Utc::now())
    ));
    if let Some(at) = a.acknowledged_at {
        lines.push(format!(
            "Acked:     {} by {}",
            util::format_timestamp(Some(at)),
            a.acknowledged_by.as_deref().unwrap_or("-")
        ));
    }
    if let Some(at) = a.resolved_at {
        lines.push(format!(
            "Resolved:  {} by {}",
            util::format_timestamp(Some(at)),
            a.resolved_by.as_deref().unwrap_or("-")
        ));
    }
    lines.join("\n")
}

fn stats_detail(s: &AlertStats) -> String {
    let mut lines = vec![
        format!("Total:         {}", s.total),
        format!("Active:        {}", s.active),
        format!("Acknowledged:  {}", s.acknowledged),
        format!("Resolved:      {}", s.resolved),
        String::new(),
        "By severity:".to_owned(),
    ];
    for severity in AlertSeverity::iter().rev() {
        lines.push(format!("  {:<14} {}", severity.to_string(), s.severity(severity)));
    }
    lines.push(String::new());
    lines.push("By type:".to_owned());
    for alert_type in AlertType::iter() {
        lines.push(format!("  {:<18} {}", alert_type.to_string(), s.of_type(alert_type)));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: ControllerConfig,
    args: AlertsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        AlertsCommand::List {
            tab,
            severity,
            status,
        } => {
            let filter = AlertFilter {
                tab,
                severity,
                status,
            };
            if filter.status_conflict() && !global.quiet {
                eprintln!("warning: --tab {tab} and --status conflict; no alert can match both");
            }
            let alerts =
                Controller::oneshot(config, |ctrl| async move { Ok(ctrl.filtered_alerts(&filter)) })
                    .await?;
            let out = output::render_list(
                &global.output,
                &alerts,
                |a| AlertRow::from(a),
                |a| a.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Get { id } => {
            let id = EntityId::from(id);
            let found = Controller::oneshot(config, |ctrl| {
                let id = id.clone();
                async move { Ok(ctrl.store().alert_by_id(&id)) }
            })
            .await?;
            let alert = found.ok_or_else(|| CliError::NotFound {
                resource_type: "alert".into(),
                identifier: id.to_string(),
                list_command: "alerts list".into(),
            })?;
            let out = output::render_single(
                &global.output,
                &alert,
                |a| detail(a, color),
                |a| a.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Stats => {
            let stats =
                Controller::oneshot(config, |ctrl| async move { Ok(ctrl.alert_stats()) }).await?;
            let out = output::render_single(&global.output, &stats, stats_detail, |s| {
                s.total.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Acknowledge { id } => {
            let alert = transition(config, CoreCommand::AcknowledgeAlert { id: id.into() }).await?;
            if !global.quiet {
                eprintln!(
                    "Alert {} acknowledged by {}",
                    alert.id,
                    alert.acknowledged_by.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }

        AlertsCommand::Resolve { id } => {
            let alert = transition(config, CoreCommand::ResolveAlert { id: id.into() }).await?;
            if !global.quiet {
                eprintln!(
                    "Alert {} resolved by {}",
                    alert.id,
                    alert.resolved_by.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }

        AlertsCommand::Delete { id } => {
            if !util::confirm("alerts delete", &format!("Delete alert {id}?"), global.yes)? {
                return Ok(());
            }
            let cmd = CoreCommand::DeleteAlert { id: id.clone().into() };
            Controller::oneshot(config, |ctrl| async move { ctrl.execute(cmd).await }).await?;
            if !global.quiet {
                eprintln!("Alert {id} deleted");
            }
            Ok(())
        }
    }
}

async fn transition(config: ControllerConfig, cmd: CoreCommand) -> Result<Alert, CliError> {
    let result = Controller::oneshot(config, |ctrl| async move { ctrl.execute(cmd).await }).await?;
    match result {
        CommandResult::Alert(alert) => Ok(alert),
        other => Err(CliError::ApiError {
            code: "unexpected_result".into(),
            message: format!("expected an alert, got {other:?}"),
        }),
    }
}
