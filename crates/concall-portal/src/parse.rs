//! Markup extraction for portal listing pages.
//!
//! The portal serves server-rendered HTML; the document listing is a run of
//! `<li>`/`<tr>` rows, each holding a date, a period label, and one or more
//! anchors. Everything here is plain-string extraction so a markup change
//! breaks one module only.

use regex::Regex;

/// One listing row that carries a document anchor. Rows without a document
/// anchor are not transcript candidates and are dropped during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CandidateRow {
    /// The anchor's href, as written in the markup (possibly relative).
    pub href: String,
    /// Anchor text with tags stripped and whitespace collapsed.
    pub anchor_text: String,
    /// Full row text with tags stripped and whitespace collapsed.
    pub row_text: String,
}

/// Extracts candidate transcript rows from a listing page.
pub(crate) fn extract_candidate_rows(html: &str) -> Vec<CandidateRow> {
    let row_re = Regex::new(r"(?is)<(li|tr)[^>]*>(.*?)</(?:li|tr)>").expect("valid row regex");
    let anchor_re =
        Regex::new(r#"(?is)<a[^>]+href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#)
            .expect("valid anchor regex");

    let mut rows = Vec::new();

    for row_cap in row_re.captures_iter(html) {
        let block = row_cap.get(2).map_or("", |m| m.as_str());

        for anchor_cap in anchor_re.captures_iter(block) {
            let href = anchor_cap.get(1).map_or("", |m| m.as_str()).trim();
            let anchor_text = clean_text(anchor_cap.get(2).map_or("", |m| m.as_str()));

            if is_document_anchor(href, &anchor_text) {
                rows.push(CandidateRow {
                    href: href.to_string(),
                    anchor_text,
                    row_text: clean_text(block),
                });
                break;
            }
        }
    }

    rows
}

/// An anchor counts as a transcript document when either its target or its
/// text says so.
fn is_document_anchor(href: &str, text: &str) -> bool {
    let href_lower = href.to_lowercase();
    let text_lower = text.to_lowercase();
    href_lower.contains(".pdf") || href_lower.contains("transcript") || text_lower.contains("transcript")
}

/// Extracts the CSRF token from the login form markup. Handles both
/// attribute orders the portal has been seen to emit.
pub(crate) fn extract_csrf_token(html: &str) -> Option<String> {
    let re = Regex::new(
        r#"(?is)<input[^>]+name\s*=\s*["']csrfmiddlewaretoken["'][^>]+value\s*=\s*["']([^"']+)["'][^>]*>"#,
    )
    .expect("valid csrf regex");

    if let Some(cap) = re.captures(html) {
        return cap.get(1).map(|m| m.as_str().to_string());
    }

    let re_swapped = Regex::new(
        r#"(?is)<input[^>]+value\s*=\s*["']([^"']+)["'][^>]+name\s*=\s*["']csrfmiddlewaretoken["'][^>]*>"#,
    )
    .expect("valid csrf fallback regex");

    re_swapped
        .captures(html)
        .and_then(|cap| cap.get(1).map(|m| m.as_str().to_string()))
}

/// Finds the page number of the `rel="next"` link, if the listing has one.
pub(crate) fn find_next_page(html: &str) -> Option<u32> {
    let re = Regex::new(r#"(?is)<a[^>]+rel\s*=\s*["']next["'][^>]*>"#).expect("valid next regex");
    let tag = re.find(html)?.as_str();

    let page_re = Regex::new(r"[?&]page=(\d+)").expect("valid page param regex");
    page_re
        .captures(tag)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Picks the first date-shaped token out of row text, for period derivation
/// when the row carries no explicit labels.
pub(crate) fn extract_date_token(text: &str) -> Option<String> {
    let re = Regex::new(r"\b(\d{4}-\d{2}-\d{2}|\d{1,2}[-/]\d{1,2}[-/]\d{2,4})\b")
        .expect("valid date token regex");
    re.captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolves a listing href to an absolute document URL. Protocol-relative
/// and path-relative hrefs other than root-relative are rejected; the
/// portal does not emit them.
pub(crate) fn resolve_document_url(href: &str, base_url: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    if let Some(rest) = href.strip_prefix('/') {
        return Some(format!("{}/{}", base_url.trim_end_matches('/'), rest));
    }
    None
}

/// Strips tags and collapses whitespace runs to single spaces.
pub(crate) fn clean_text(input: &str) -> String {
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tags regex");
    let no_tags = tags.replace_all(input, " ");
    no_tags
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
