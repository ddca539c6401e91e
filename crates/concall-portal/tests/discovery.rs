//! Integration tests for transcript discovery against a mock portal.
//!
//! Uses `wiremock` to stand up a local HTTP server per test: login flow
//! first (discovery requires a session), then listing pages with markup
//! shaped like the real portal's documents section.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use concall_core::watchlist::WatchedEntity;
use concall_core::Quarter;
use concall_portal::{list_for_entity, PortalClient, PortalError, Session};

const LOGIN_FORM: &str = r#"
<form method="post" action="/login/">
  <input type="hidden" name="csrfmiddlewaretoken" value="tok-discovery">
</form>
"#;

async fn login(server: &MockServer) -> (PortalClient, Session) {
    Mock::given(method("GET"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_FORM))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/dash/"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dash/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(server)
        .await;

    let client = PortalClient::new(&server.uri(), 5, "concall-test/0.1", 0, 0)
        .expect("failed to build test PortalClient");
    let session = client
        .authenticate("analyst", "hunter2")
        .await
        .expect("login should succeed");
    (client, session)
}

fn acme() -> WatchedEntity {
    WatchedEntity {
        name: "Acme Corp".to_string(),
        slug: "ACME".to_string(),
        consolidated: false,
        notes: None,
    }
}

/// Documents section shaped like the portal's concall listing.
fn listing_page(rows: &str, next_page: Option<u32>) -> String {
    let pager = next_page.map_or(String::new(), |n| {
        format!(r#"<div class="pager"><a href="?page={n}" rel="next">Older</a></div>"#)
    });
    format!(
        r#"<html><body>
        <section id="documents">
          <h3>Concalls</h3>
          <ul class="list-links">{rows}</ul>
          {pager}
        </section>
        </body></html>"#
    )
}

fn transcript_row(label: &str, href: &str) -> String {
    format!(
        r#"<li class="flex flex-gap-8">
             <div class="ink-600">{label}</div>
             <a class="concall-link" href="{href}" target="_blank">Transcript</a>
             <a class="concall-link" href="/company/ACME/notes/">Notes</a>
           </li>"#
    )
}

#[tokio::test]
async fn discovers_records_across_pages() {
    let server = MockServer::start().await;
    let (client, session) = login(&server).await;

    let page1 = listing_page(
        &format!(
            "{}{}",
            transcript_row("Q4 FY25", "/documents/acme-q4fy25.pdf"),
            transcript_row("Q3 FY25", "/documents/acme-q3fy25.pdf"),
        ),
        Some(2),
    );
    let page2 = listing_page(&transcript_row("Q2 FY25", "/documents/acme-q2fy25.pdf"), None);

    Mock::given(method("GET"))
        .and(path("/company/ACME/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page2))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/company/ACME/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page1))
        .expect(1)
        .mount(&server)
        .await;

    let result = list_for_entity(&client, &session, &acme(), 0).await;
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let records = result.unwrap();
    assert_eq!(records.len(), 3, "expected 3 records, got: {records:?}");

    assert_eq!(records[0].entity_name, "Acme Corp");
    assert_eq!(records[0].fiscal_year, 2025);
    assert_eq!(records[0].quarter, Quarter::Q4);
    assert_eq!(
        records[0].source_url,
        format!("{}/documents/acme-q4fy25.pdf", server.uri())
    );
    assert_eq!(records[2].quarter, Quarter::Q2);
}

#[tokio::test]
async fn duplicate_periods_keep_first_occurrence() {
    let server = MockServer::start().await;
    let (client, session) = login(&server).await;

    let page = listing_page(
        &format!(
            "{}{}",
            transcript_row("Q3 FY25", "/documents/first.pdf"),
            transcript_row("Q3 FY25 (revised)", "/documents/second.pdf"),
        ),
        None,
    );
    Mock::given(method("GET"))
        .and(path("/company/ACME/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let records = list_for_entity(&client, &session, &acme(), 0)
        .await
        .expect("discovery should succeed");
    assert_eq!(records.len(), 1, "expected 1 record, got: {records:?}");
    assert!(
        records[0].source_url.ends_with("/documents/first.pdf"),
        "first occurrence should win, got: {}",
        records[0].source_url
    );
}

#[tokio::test]
async fn unlabeled_rows_are_skipped_not_fatal() {
    let server = MockServer::start().await;
    let (client, session) = login(&server).await;

    // "May 2025" is not a date format the labeler understands, and the row
    // carries no Q/FY labels, so it cannot be attributed to a period.
    let page = listing_page(
        &format!(
            "{}{}",
            transcript_row("May 2025", "/documents/mystery.pdf"),
            transcript_row("Q1 FY26 15-05-2025", "/documents/q1fy26.pdf"),
        ),
        None,
    );
    Mock::given(method("GET"))
        .and(path("/company/ACME/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let records = list_for_entity(&client, &session, &acme(), 0)
        .await
        .expect("discovery should succeed");
    assert_eq!(records.len(), 1, "expected 1 record, got: {records:?}");
    assert_eq!(records[0].fiscal_year, 2026);
    assert_eq!(records[0].quarter, Quarter::Q1);
}

#[tokio::test]
async fn date_only_rows_resolve_via_fiscal_calendar() {
    let server = MockServer::start().await;
    let (client, session) = login(&server).await;

    let page = listing_page(
        &transcript_row("Earnings call 20-11-2024", "/documents/nov.pdf"),
        None,
    );
    Mock::given(method("GET"))
        .and(path("/company/ACME/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let records = list_for_entity(&client, &session, &acme(), 0)
        .await
        .expect("discovery should succeed");
    assert_eq!(records.len(), 1);
    // November 2024 falls in Q3 of FY2025.
    assert_eq!(records[0].fiscal_year, 2025);
    assert_eq!(records[0].quarter, Quarter::Q3);
}

#[tokio::test]
async fn entity_with_no_transcripts_yields_empty_vec() {
    let server = MockServer::start().await;
    let (client, session) = login(&server).await;

    let page = listing_page("<li><a href=\"/company/ACME/ratios/\">Ratios</a></li>", None);
    Mock::given(method("GET"))
        .and(path("/company/ACME/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let result = list_for_entity(&client, &session, &acme(), 0).await;
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    assert!(result.unwrap().is_empty());
}

#[tokio::test]
async fn listing_fetch_failure_propagates() {
    let server = MockServer::start().await;
    let (client, session) = login(&server).await;

    Mock::given(method("GET"))
        .and(path("/company/ACME/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = list_for_entity(&client, &session, &acme(), 0).await;
    assert!(
        matches!(result, Err(PortalError::UnexpectedStatus { status: 500, .. })),
        "expected UnexpectedStatus(500), got: {result:?}"
    );
}

#[tokio::test]
async fn runaway_pagination_hits_the_guard() {
    let server = MockServer::start().await;
    let (client, session) = login(&server).await;

    // A next-link far past the page cap: the walk stops at the guard
    // instead of chasing it.
    let page = listing_page(
        &transcript_row("Q4 FY25", "/documents/acme.pdf"),
        Some(999),
    );
    Mock::given(method("GET"))
        .and(path("/company/ACME/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(1)
        .mount(&server)
        .await;

    let result = list_for_entity(&client, &session, &acme(), 0).await;
    assert!(
        matches!(result, Err(PortalError::PaginationLimit { .. })),
        "expected PaginationLimit, got: {result:?}"
    );
}

#[tokio::test]
async fn self_referencing_next_link_terminates() {
    let server = MockServer::start().await;
    let (client, session) = login(&server).await;

    // rel="next" pointing back at the current page must not loop.
    let page = listing_page(&transcript_row("Q4 FY25", "/documents/acme.pdf"), Some(1));
    Mock::given(method("GET"))
        .and(path("/company/ACME/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(1)
        .mount(&server)
        .await;

    let records = list_for_entity(&client, &session, &acme(), 0)
        .await
        .expect("discovery should terminate");
    assert_eq!(records.len(), 1);
}
