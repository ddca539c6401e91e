//! Fiscal period labeling for listing rows.
//!
//! Rows usually carry explicit labels ("Q3 FY25 Earnings Call Transcript");
//! older rows sometimes carry only a call date. Explicit labels win per
//! field, a parseable date fills whichever field is missing, and a row that
//! still has an unknown field is skipped by discovery; periods are never
//! guessed from the current date.

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use concall_core::Quarter;

/// Date formats seen on portal listings. Two-digit-year variants come
/// first: chrono's `%Y` also accepts two digits and would read "25" as the
/// year 25.
const DATE_FORMATS: &[&str] = &["%d-%m-%y", "%d/%m/%y", "%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parses a quarter label anywhere in `text`: "Q3", "q3", "Q 3", "Q-3",
/// "Quarter 3", and run-together forms like "Q3FY25".
#[must_use]
pub fn parse_quarter(text: &str) -> Option<Quarter> {
    // No trailing boundary: the digit may butt up against "FY25".
    let re = Regex::new(r"(?i)\bq(?:uarter)?\s*-?\s*([1-4])").expect("valid quarter regex");
    re.captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .and_then(Quarter::from_number)
}

/// Parses a fiscal-year label anywhere in `text`: "FY25", "FY 2025",
/// "FY-26". Two-digit years are 2000-based.
#[must_use]
pub fn parse_fiscal_year(text: &str) -> Option<i32> {
    let re = Regex::new(r"(?i)\bfy\s*-?\s*(\d{2,4})").expect("valid fiscal year regex");
    let digits = re.captures(text)?.get(1)?.as_str();
    let n: i32 = digits.parse().ok()?;
    Some(if digits.len() == 2 { 2000 + n } else { n })
}

/// Derives the fiscal period from a call date using the April-March fiscal
/// calendar: Apr-Jun is Q1 of the NEXT calendar year's FY, Jan-Mar is Q4 of
/// the current one.
#[must_use]
pub fn derive_period_from_date(raw: &str) -> Option<(i32, Quarter)> {
    let raw = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(period_for_date(date));
        }
    }
    None
}

fn period_for_date(date: NaiveDate) -> (i32, Quarter) {
    let year = date.year();
    match date.month() {
        4..=6 => (year + 1, Quarter::Q1),
        7..=9 => (year + 1, Quarter::Q2),
        10..=12 => (year + 1, Quarter::Q3),
        _ => (year, Quarter::Q4),
    }
}

/// Resolves the full fiscal period for a row: labels from `text` first,
/// then the date fills any missing field. `None` means the row cannot be
/// attributed to a period and must be skipped.
#[must_use]
pub fn resolve_period(text: &str, date_text: Option<&str>) -> Option<(i32, Quarter)> {
    let quarter = parse_quarter(text);
    let fiscal_year = parse_fiscal_year(text);

    if let (Some(fy), Some(q)) = (fiscal_year, quarter) {
        return Some((fy, q));
    }

    let derived = date_text.and_then(derive_period_from_date);
    match (fiscal_year, quarter, derived) {
        (Some(fy), None, Some((_, dq))) => Some((fy, dq)),
        (None, Some(q), Some((dfy, _))) => Some((dfy, q)),
        (None, None, Some(period)) => Some(period),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quarter_plain_forms() {
        assert_eq!(parse_quarter("Q3"), Some(Quarter::Q3));
        assert_eq!(parse_quarter("q1 results"), Some(Quarter::Q1));
        assert_eq!(parse_quarter("Quarter 3 FY2025"), Some(Quarter::Q3));
        assert_eq!(parse_quarter("Q 2"), Some(Quarter::Q2));
        assert_eq!(parse_quarter("Q-4"), Some(Quarter::Q4));
    }

    #[test]
    fn parse_quarter_run_together_with_fiscal_year() {
        assert_eq!(parse_quarter("Q3FY25 Earnings Call"), Some(Quarter::Q3));
    }

    #[test]
    fn parse_quarter_rejects_out_of_range_and_embedded() {
        assert_eq!(parse_quarter("Q5"), None);
        assert_eq!(parse_quarter("Q0"), None);
        // No word boundary before the q.
        assert_eq!(parse_quarter("FAQ3"), None);
        assert_eq!(parse_quarter("no label at all"), None);
    }

    #[test]
    fn parse_fiscal_year_two_digit_is_2000_based() {
        assert_eq!(parse_fiscal_year("Q3 FY25"), Some(2025));
        assert_eq!(parse_fiscal_year("fy 26 concall"), Some(2026));
    }

    #[test]
    fn parse_fiscal_year_four_digit_verbatim() {
        assert_eq!(parse_fiscal_year("FY2025 Q3"), Some(2025));
        assert_eq!(parse_fiscal_year("FY-2031"), Some(2031));
    }

    #[test]
    fn parse_fiscal_year_missing() {
        assert_eq!(parse_fiscal_year("Q3 results call"), None);
    }

    #[test]
    fn derive_period_fiscal_year_boundaries() {
        // April 1st starts Q1 of the next FY.
        assert_eq!(
            derive_period_from_date("2025-04-01"),
            Some((2026, Quarter::Q1))
        );
        // March 31st is still Q4 of the current FY.
        assert_eq!(
            derive_period_from_date("2025-03-31"),
            Some((2025, Quarter::Q4))
        );
    }

    #[test]
    fn derive_period_each_quarter() {
        assert_eq!(
            derive_period_from_date("15-05-2025"),
            Some((2026, Quarter::Q1))
        );
        assert_eq!(
            derive_period_from_date("01/08/2025"),
            Some((2026, Quarter::Q2))
        );
        assert_eq!(
            derive_period_from_date("2024-11-20"),
            Some((2025, Quarter::Q3))
        );
        assert_eq!(
            derive_period_from_date("15/01/2025"),
            Some((2025, Quarter::Q4))
        );
    }

    #[test]
    fn derive_period_two_digit_year() {
        assert_eq!(
            derive_period_from_date("15-05-25"),
            Some((2026, Quarter::Q1))
        );
    }

    #[test]
    fn derive_period_unparseable() {
        assert_eq!(derive_period_from_date("May 2025"), None);
        assert_eq!(derive_period_from_date(""), None);
    }

    #[test]
    fn resolve_period_prefers_explicit_labels() {
        // Labels say Q3 FY25; the date (May 2025) would say Q1 FY26.
        assert_eq!(
            resolve_period("Q3 FY25 Earnings Call", Some("15-05-2025")),
            Some((2025, Quarter::Q3))
        );
    }

    #[test]
    fn resolve_period_date_fills_missing_fiscal_year() {
        assert_eq!(
            resolve_period("Q4 results", Some("2025-01-15")),
            Some((2025, Quarter::Q4))
        );
    }

    #[test]
    fn resolve_period_date_fills_missing_quarter() {
        assert_eq!(
            resolve_period("FY2025 concall", Some("20-11-2024")),
            Some((2025, Quarter::Q3))
        );
    }

    #[test]
    fn resolve_period_date_only() {
        assert_eq!(
            resolve_period("Earnings call transcript", Some("01/08/2025")),
            Some((2026, Quarter::Q2))
        );
    }

    #[test]
    fn resolve_period_unresolvable_is_none() {
        assert_eq!(resolve_period("Earnings call transcript", None), None);
        assert_eq!(resolve_period("Q3 call", None), None);
        assert_eq!(resolve_period("FY25 call", Some("garbage")), None);
    }
}
