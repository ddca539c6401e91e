//! One sync pass: authenticate to the portal, snapshot the archive, discover
//! transcripts for every watched entity, and transfer the ones the archive
//! does not already hold.

use std::time::Duration;

use futures::stream::{self, StreamExt};

use concall_core::{
    load_watchlist, path, AppConfig, DestinationPath, FailureDetail, RunSummary, SyncOutcome,
    TranscriptRecord, WatchedEntity,
};
use concall_drive::{build_remote_index, DriveClient, FolderCache, RemoteIndex, ServiceAccountKey};
use concall_portal::{list_for_entity, PortalClient, Session};

/// Shared read-only state threaded through concurrent record transfers.
struct TransferContext<'a> {
    portal: &'a PortalClient,
    session: &'a Session,
    drive: &'a DriveClient,
    index: &'a RemoteIndex,
    folders: &'a FolderCache,
    root_folder_id: &'a str,
    inter_request_delay_ms: u64,
}

/// Runs one full sync pass and returns the aggregated summary.
///
/// Per-entity and per-record failures are recorded in the summary rather
/// than propagated; the error return is reserved for setup problems
/// (watchlist, login, credentials, store root) that make the whole run
/// pointless. In a dry run the `uploaded` and `skipped` counters hold the
/// planned actions instead of performed ones.
pub(crate) async fn run_sync(
    config: &AppConfig,
    dry_run: bool,
    entity_filter: Option<&str>,
) -> anyhow::Result<RunSummary> {
    let watchlist = load_watchlist(&config.watchlist_path)?;
    let mut entities = watchlist.entities;
    if let Some(slug) = entity_filter {
        entities.retain(|entity| entity.slug.eq_ignore_ascii_case(slug));
        if entities.is_empty() {
            anyhow::bail!("entity '{slug}' is not in the watchlist");
        }
    }
    tracing::info!(entities = entities.len(), dry_run, "starting transcript sync");

    let portal = PortalClient::new(
        &config.portal_base_url,
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_ms,
    )?;
    let session = portal
        .authenticate(&config.source_username, &config.source_password)
        .await?;
    tracing::info!(user = session.username(), "portal login succeeded");

    let key = ServiceAccountKey::parse(&config.store_credentials)?;
    let drive = DriveClient::new(
        &key,
        config.request_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_ms,
        &config.drive_api_base_url,
        &config.drive_upload_base_url,
    )?;
    // Syncing against a partial view of the archive would re-upload files
    // that already exist, so an unreachable root is fatal.
    let (index, folders) = build_remote_index(&drive, &config.store_root_folder_id).await?;

    let mut summary = RunSummary::default();
    let records = discover_records(
        &portal,
        &session,
        &entities,
        config.inter_request_delay_ms,
        &mut summary,
    )
    .await;

    if dry_run {
        for record in &records {
            let destination = path::resolve(record);
            if index.contains(&destination) {
                println!("dry-run: skip {} (already archived)", destination.relative());
                summary.record(SyncOutcome::Skipped);
            } else {
                println!("dry-run: upload {}", destination.relative());
                summary.record(SyncOutcome::Uploaded);
            }
        }
        return Ok(summary);
    }

    let ctx = TransferContext {
        portal: &portal,
        session: &session,
        drive: &drive,
        index: &index,
        folders: &folders,
        root_folder_id: &config.store_root_folder_id,
        inter_request_delay_ms: config.inter_request_delay_ms,
    };
    let outcomes: Vec<SyncOutcome> =
        stream::iter(records.into_iter().map(|record| transfer_one(&ctx, record)))
            .buffer_unordered(config.max_concurrent_transfers.max(1))
            .collect()
            .await;
    for outcome in outcomes {
        summary.record(outcome);
    }

    tracing::info!(
        uploaded = summary.uploaded,
        skipped = summary.skipped,
        failed = summary.failed,
        "sync complete"
    );
    Ok(summary)
}

/// Lists transcripts for every entity in turn. A listing failure is recorded
/// against the entity and the remaining entities still run.
async fn discover_records(
    portal: &PortalClient,
    session: &Session,
    entities: &[WatchedEntity],
    inter_request_delay_ms: u64,
    summary: &mut RunSummary,
) -> Vec<TranscriptRecord> {
    let mut records = Vec::new();
    for entity in entities {
        match list_for_entity(portal, session, entity, inter_request_delay_ms).await {
            Ok(found) => {
                tracing::info!(entity = %entity.name, transcripts = found.len(), "discovery complete");
                records.extend(found);
            }
            Err(err) => {
                tracing::warn!(
                    entity = %entity.name,
                    error = %err,
                    "listing failed, continuing with the remaining entities"
                );
                summary.record(SyncOutcome::Failed(FailureDetail::for_entity(
                    &entity.name,
                    err.to_string(),
                )));
            }
        }
    }
    records
}

/// Transfers a single record, mapping any failure into an outcome so one bad
/// document never aborts the run.
async fn transfer_one(ctx: &TransferContext<'_>, record: TranscriptRecord) -> SyncOutcome {
    let destination = path::resolve(&record);
    if ctx.index.contains(&destination) {
        tracing::debug!(path = %destination.relative(), "already archived, skipping");
        return SyncOutcome::Skipped;
    }

    match transfer_document(ctx, &record, &destination).await {
        Ok(()) => SyncOutcome::Uploaded,
        Err(err) => {
            tracing::warn!(
                entity = %record.entity_name,
                path = %destination.relative(),
                error = %format!("{err:#}"),
                "transfer failed"
            );
            SyncOutcome::Failed(FailureDetail::for_record(
                &record.entity_name,
                record.fiscal_year,
                record.quarter,
                format!("{err:#}"),
            ))
        }
    }
}

async fn transfer_document(
    ctx: &TransferContext<'_>,
    record: &TranscriptRecord,
    destination: &DestinationPath,
) -> anyhow::Result<()> {
    if ctx.inter_request_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(ctx.inter_request_delay_ms)).await;
    }
    let content = ctx.portal.fetch_document(ctx.session, &record.source_url).await?;
    let folder_id = ctx
        .folders
        .ensure_folder(ctx.drive, ctx.root_folder_id, destination)
        .await?;
    ctx.drive
        .upload_file(&folder_id, &destination.file_name, "application/pdf", content)
        .await?;
    tracing::info!(path = %destination.relative(), "archived transcript");
    Ok(())
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
