//! Run reporting: the plain-text summary printed after a pass and the
//! best-effort notification posted to the mail relay.

use std::time::Duration;

use concall_core::{AppConfig, RunSummary};
use concall_drive::folder_url;

/// Renders the run summary as plain text, one line per swallowed failure,
/// ending with a link to the archive root.
pub(crate) fn render_summary(summary: &RunSummary, root_folder_id: &str, dry_run: bool) -> String {
    let mut lines = Vec::new();
    if dry_run {
        lines.push(format!(
            "transcript sync (dry run): {} to upload, {} already archived, {} failed",
            summary.uploaded, summary.skipped, summary.failed
        ));
    } else {
        lines.push(format!(
            "transcript sync: {} uploaded, {} skipped, {} failed ({} total)",
            summary.uploaded,
            summary.skipped,
            summary.failed,
            summary.total()
        ));
    }
    for failure in &summary.failures {
        let period = match (failure.fiscal_year, failure.quarter) {
            (Some(year), Some(quarter)) => format!("FY{year} {quarter}"),
            _ => "no period".to_string(),
        };
        lines.push(format!(
            "  failed: {} [{period}]: {}",
            failure.entity_name, failure.reason
        ));
    }
    lines.push(format!("archive: {}", folder_url(root_folder_id)));
    lines.join("\n")
}

/// Posts the run report to the configured mail relay.
///
/// Notification is strictly best effort: a missing relay configuration means
/// silence, and a relay failure is logged and swallowed so it can never mask
/// the outcome of the run itself.
pub(crate) async fn notify_best_effort(config: &AppConfig, subject_suffix: &str, body: &str) {
    let Some(notify) = &config.notify else {
        return;
    };
    let subject = format!("{} {subject_suffix}", notify.subject_prefix);
    let payload = serde_json::json!({
        "from": notify.from,
        "to": notify.to,
        "subject": subject,
        "text": body,
    });

    let result = async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        client
            .post(&notify.relay_url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok::<(), reqwest::Error>(())
    }
    .await;

    match result {
        Ok(()) => tracing::info!("run notification sent"),
        Err(err) => tracing::warn!(error = %err, "run notification failed, continuing"),
    }
}
