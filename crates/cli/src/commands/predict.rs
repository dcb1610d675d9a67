//! Remote prediction and server status

use super::{prediction_rows, InputArgs};
use crate::client::{ApiClient, PredictReply, ServerStatus};
use crate::output::{self, Notice, OutputFormat, ValueRow};
use anyhow::{bail, Result};
use predictor_lib::ComponentStatus;
use serde_json::json;

pub async fn remote_predict(
    client: &ApiClient,
    inputs: &InputArgs,
    format: OutputFormat,
) -> Result<()> {
    let fields = inputs.form_fields()?;
    let reply = client.predict(&fields).await?;
    render_reply(&reply, format)
}

fn render_reply(reply: &PredictReply, format: OutputFormat) -> Result<()> {
    let (Some(properties), Some(ratio), true) = (reply.properties, reply.ratio, reply.success)
    else {
        let message = reply.error.as_deref().unwrap_or("Prediction failed");
        output::notice(Notice::Error, message);
        bail!("{}", message);
    };

    match format {
        OutputFormat::Json => output::print_json(&json!({
            "properties": properties,
            "ratio": ratio,
        }))?,
        OutputFormat::Table => {
            output::print_table(&prediction_rows(Some(&properties), Some(ratio)));
            output::notice(Notice::Success, "Prediction complete");
        }
    }
    Ok(())
}

pub async fn show_status(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let status = client.status().await?;

    match format {
        OutputFormat::Json => output::print_json(&json!({
            "health": status.health,
            "readiness": status.readiness,
        }))?,
        OutputFormat::Table => render_status_table(&status),
    }
    Ok(())
}

fn render_status_table(status: &ServerStatus) {
    output::notice(
        Notice::Info,
        &format!(
            "Server: {}",
            output::paint_status(status_label(status.health.status))
        ),
    );

    let rows: Vec<ValueRow> = status
        .health
        .components
        .iter()
        .map(|(name, health)| {
            let state = output::paint_status(status_label(health.status));
            let value = match &health.message {
                Some(message) => format!("{} ({})", state, message),
                None => state,
            };
            ValueRow::new(name.as_str(), value)
        })
        .collect();
    output::print_table(&rows);

    if status.readiness.ready {
        output::notice(Notice::Success, &output::paint_status("ready"));
    } else {
        let reason = status.readiness.reason.as_deref().unwrap_or("unknown reason");
        output::notice(
            Notice::Error,
            &format!("{}: {}", output::paint_status("not ready"), reason),
        );
    }
}

fn status_label(status: ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "healthy",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "unhealthy",
    }
}
