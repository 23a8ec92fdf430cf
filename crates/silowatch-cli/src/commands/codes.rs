//! Registration code command handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tabled::Tabled;

use silowatch_core::{
    CodeSummary, Command as CoreCommand, CommandResult, Controller, ControllerConfig,
    GeneratedCode, Location, ProvisioningRequest, RegistrationCode,
};

use crate::cli::{CodesArgs, CodesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CodeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Farm")]
    farm: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl CodeRow {
    fn new(c: &RegistrationCode, now: DateTime<Utc>, color: bool) -> Self {
        Self {
            id: c.id.to_string(),
            code: c.code.clone(),
            device: c.device_name.clone(),
            farm: c.farm_name.clone().unwrap_or_else(|| c.farm_id.to_string()),
            location: c.location_or_default().name,
            status: output::paint_code_status(c.status(now), color),
            expires: util::format_time_remaining(c.time_remaining(now)),
        }
    }
}

fn generated_detail(g: &GeneratedCode) -> String {
    [
        format!("Code:     {}", g.code),
        format!("Device:   {}", g.device_name),
        format!("Farm:     {}", g.farm_name.as_deref().unwrap_or("-")),
        format!(
            "Expires:  {} ({})",
            util::format_timestamp(Some(g.expires_at)),
            util::format_time_remaining(g.time_remaining(Utc::now()))
        ),
    ]
    .join("\n")
}

fn summary_detail(s: &CodeSummary) -> String {
    [
        format!("Active:   {}", s.active),
        format!("Expired:  {}", s.expired),
        format!("Used:     {}", s.used),
        format!("Revoked:  {}", s.revoked),
        format!("Total:    {}", s.total),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: ControllerConfig,
    args: CodesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        CodesCommand::List { all } => {
            let codes: Vec<Arc<RegistrationCode>> = Controller::oneshot(config, |ctrl| async move {
                if all {
                    Ok(Vec::clone(&ctrl.registration_codes_snapshot()))
                } else {
                    let active = ctrl.active_registration_codes().await?;
                    Ok(active.into_iter().map(Arc::new).collect())
                }
            })
            .await?;

            let now = Utc::now();
            let out = output::render_list(
                &global.output,
                &codes,
                |c| CodeRow::new(c, now, color),
                |c| c.code.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CodesCommand::Summary => {
            let summary =
                Controller::oneshot(config, |ctrl| async move { Ok(ctrl.code_partition().summary()) })
                    .await?;
            let out = output::render_single(&global.output, &summary, summary_detail, |s| {
                s.total.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CodesCommand::Generate {
            farm,
            device_name,
            location,
        } => {
            let mut request = ProvisioningRequest::new(farm, device_name);
            if let Some(name) = location {
                request = request.with_location(Location::named(name));
            }
            // Fail fast on bad input before touching the network.
            let cmd = CoreCommand::GenerateRegistrationCode(request.validate()?);
            let result =
                Controller::oneshot(config, |ctrl| async move { ctrl.execute(cmd).await }).await?;
            let CommandResult::GeneratedCode(generated) = result else {
                return Err(CliError::ApiError {
                    code: "unexpected_result".into(),
                    message: format!("expected a generated code, got {result:?}"),
                });
            };

            let out = output::render_single(&global.output, &generated, generated_detail, |g| {
                g.code.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CodesCommand::Revoke { id } => {
            if !util::confirm(
                "codes revoke",
                &format!("Revoke registration code {id}?"),
                global.yes,
            )? {
                return Ok(());
            }
            let cmd = CoreCommand::RevokeRegistrationCode { id: id.clone().into() };
            Controller::oneshot(config, |ctrl| async move { ctrl.execute(cmd).await }).await?;
            if !global.quiet {
                eprintln!("Registration code {id} revoked");
            }
            Ok(())
        }
    }
}
