//! Transcript discovery: turns an entity's listing pages into typed records.

use std::collections::HashSet;
use std::time::Duration;

use concall_core::watchlist::WatchedEntity;
use concall_core::{Quarter, TranscriptRecord};

use crate::client::{PortalClient, Session};
use crate::error::{ListingRowError, PortalError};
use crate::labels;
use crate::parse;
use crate::parse::CandidateRow;

/// Maximum number of listing pages to walk per entity. Prevents infinite
/// loops on cycling next-links.
const MAX_PAGES: usize = 50;

/// Discovers every transcript an entity's listing advertises, newest first,
/// de-duplicated by fiscal period (first occurrence wins).
///
/// Rows that cannot be parsed into a record are logged at `warn` and
/// skipped; they never fail the entity. An entity with no transcripts
/// yields an empty `Vec`, which is not an error.
///
/// `inter_request_delay_ms` is the politeness delay between listing pages
/// (applied after every page except the first).
///
/// # Errors
///
/// Propagates [`PortalError`] from the listing fetch, and
/// [`PortalError::PaginationLimit`] if the listing pages more than
/// [`MAX_PAGES`] times.
pub async fn list_for_entity(
    client: &PortalClient,
    session: &Session,
    entity: &WatchedEntity,
    inter_request_delay_ms: u64,
) -> Result<Vec<TranscriptRecord>, PortalError> {
    let mut records: Vec<TranscriptRecord> = Vec::new();
    let mut seen_periods: HashSet<(i32, Quarter)> = HashSet::new();
    let mut page = 1u32;
    let mut is_first_page = true;

    loop {
        if page as usize > MAX_PAGES {
            return Err(PortalError::PaginationLimit {
                slug: entity.slug.clone(),
                max_pages: MAX_PAGES,
            });
        }

        if !is_first_page && inter_request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
        }
        is_first_page = false;

        let html = client
            .fetch_listing_page(session, &entity.slug, entity.consolidated, page)
            .await?;

        for row in parse::extract_candidate_rows(&html) {
            match record_from_row(&row, entity, client.base_url()) {
                Ok(record) => {
                    if seen_periods.insert(record.period()) {
                        records.push(record);
                    } else {
                        tracing::debug!(
                            entity = %entity.name,
                            fiscal_year = record.fiscal_year,
                            quarter = %record.quarter,
                            "duplicate period in listing, keeping first occurrence"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        entity = %entity.name,
                        page,
                        error = %e,
                        "skipping listing row"
                    );
                }
            }
        }

        match parse::find_next_page(&html) {
            Some(next) if next > page => page = next,
            _ => break,
        }
    }

    tracing::info!(
        entity = %entity.name,
        count = records.len(),
        "discovered transcripts"
    );
    Ok(records)
}

/// Builds a [`TranscriptRecord`] from one candidate row: resolve the
/// document URL, then attribute the row to a fiscal period from its labels
/// or, failing that, its date.
fn record_from_row(
    row: &CandidateRow,
    entity: &WatchedEntity,
    base_url: &str,
) -> Result<TranscriptRecord, ListingRowError> {
    let source_url = parse::resolve_document_url(&row.href, base_url).ok_or_else(|| {
        ListingRowError::UnresolvableUrl {
            href: row.href.clone(),
        }
    })?;

    let date_token = parse::extract_date_token(&row.row_text);
    let (fiscal_year, quarter) = labels::resolve_period(&row.row_text, date_token.as_deref())
        .ok_or_else(|| ListingRowError::UnlabeledPeriod {
            excerpt: excerpt(&row.row_text),
        })?;

    Ok(TranscriptRecord {
        entity_name: entity.name.clone(),
        fiscal_year,
        quarter,
        source_url,
    })
}

/// First few words of row text, for log context when a row is skipped.
fn excerpt(text: &str) -> String {
    const MAX_LEN: usize = 80;
    if text.len() <= MAX_LEN {
        return text.to_string();
    }
    let mut cut = MAX_LEN;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &text[..cut])
}
