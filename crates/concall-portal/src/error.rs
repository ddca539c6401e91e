use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("login rejected for {username}: portal returned the login page")]
    AuthRejected { username: String },

    #[error("unrecognized login page structure: {reason}")]
    LoginPage { reason: String },

    #[error("rate limited by portal (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("document not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("pagination limit reached for {slug}: exceeded {max_pages} pages")]
    PaginationLimit { slug: String, max_pages: usize },

    #[error("invalid portal URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Why one listing row could not be turned into a transcript record.
///
/// These are per-row conditions: discovery logs them and moves on, they
/// never abort an entity listing.
#[derive(Debug, Error)]
pub enum ListingRowError {
    #[error("cannot resolve document URL from href \"{href}\"")]
    UnresolvableUrl { href: String },

    #[error("no quarter/fiscal-year labels and no usable date in \"{excerpt}\"")]
    UnlabeledPeriod { excerpt: String },
}
