use thiserror::Error;

/// Errors returned by the Drive client and the service-account token flow.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Drive API answered with a non-2xx status.
    #[error("Drive API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The service-account credentials could not be decoded or parsed.
    #[error("invalid service account credentials: {reason}")]
    Credentials { reason: String },

    /// Signing the service-account assertion failed.
    #[error("failed to sign service account assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The OAuth token endpoint rejected the signed assertion.
    #[error("token exchange failed: {reason}")]
    Auth { reason: String },

    /// A configured base URL could not be parsed.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A folder listing kept producing page tokens past the sanity limit.
    #[error("gave up listing folder {folder_id} after {max_pages} pages")]
    PaginationLimit { folder_id: String, max_pages: u32 },
}
