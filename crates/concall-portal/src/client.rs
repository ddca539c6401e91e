//! Session-based HTTP client for the portal.

use std::time::Duration;

use reqwest::Client;

use crate::error::PortalError;
use crate::parse;
use crate::rate_limit::retry_with_backoff;

/// Proof of a completed login. All listing and document fetches require one,
/// which keeps "forgot to authenticate" a compile error rather than a
/// runtime surprise. The cookie jar inside [`PortalClient`] carries the
/// actual session cookies.
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
}

impl Session {
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// HTTP client for the portal's login form, company listing pages, and
/// document downloads.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx responses
/// as typed errors. Transient errors (429, 5xx, network failures) are
/// automatically retried with exponential backoff; the login flow is never
/// retried, a rejected login is final.
pub struct PortalClient {
    client: Client,
    base_url: String,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    backoff_base_ms: u64,
}

impl PortalClient {
    /// Creates a `PortalClient` with a cookie store, configured timeout,
    /// `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, PortalError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            backoff_base_ms,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Logs in through the portal's HTML form and returns a [`Session`].
    ///
    /// The flow mirrors what a browser does: GET the login page, lift the
    /// CSRF token out of the form, POST credentials with the token and a
    /// `Referer` header, follow the redirect. The portal re-renders the
    /// login page on bad credentials, so success is decided by the final
    /// URL no longer being the login page.
    ///
    /// # Errors
    ///
    /// - [`PortalError::LoginPage`]: the login page has no CSRF field;
    ///   the markup is not what this client understands.
    /// - [`PortalError::AuthRejected`]: credentials were not accepted.
    /// - [`PortalError::UnexpectedStatus`] / [`PortalError::Http`]: the
    ///   portal or the network failed outright.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Session, PortalError> {
        let login_url = format!("{}/login/", self.base_url);

        let response = self.client.get(&login_url).send().await?;
        if let Some(err) = error_for_status(login_url.clone(), &response) {
            return Err(err);
        }
        let body = response.text().await?;

        let csrf_token = parse::extract_csrf_token(&body).ok_or_else(|| PortalError::LoginPage {
            reason: "no csrfmiddlewaretoken field on the login form".to_string(),
        })?;

        let params = [
            ("username", username),
            ("password", password),
            ("csrfmiddlewaretoken", csrf_token.as_str()),
        ];
        let response = self
            .client
            .post(&login_url)
            .header(reqwest::header::REFERER, &login_url)
            .form(&params)
            .send()
            .await?;
        if let Some(err) = error_for_status(login_url.clone(), &response) {
            return Err(err);
        }

        // A rejected login re-renders the form; a successful one redirects
        // away from it.
        let final_url = response.url().to_string();
        if final_url.to_lowercase().contains("login") {
            return Err(PortalError::AuthRejected {
                username: username.to_string(),
            });
        }

        tracing::info!(user = %username, "portal login successful");
        Ok(Session {
            username: username.to_string(),
        })
    }

    /// Fetches one page of an entity's document listing, with automatic
    /// retry on transient errors.
    ///
    /// # Errors
    ///
    /// - [`PortalError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`PortalError::NotFound`]: HTTP 404, unknown entity slug (not retried).
    /// - [`PortalError::UnexpectedStatus`]: any other non-2xx status (5xx retried, 4xx not).
    /// - [`PortalError::Http`]: network failure after all retries exhausted.
    pub async fn fetch_listing_page(
        &self,
        session: &Session,
        slug: &str,
        consolidated: bool,
        page: u32,
    ) -> Result<String, PortalError> {
        let url = self.listing_url(slug, consolidated, page)?;
        tracing::debug!(user = %session.username, %url, "fetching listing page");

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
                    )
                    .send()
                    .await?;
                if let Some(err) = error_for_status(url, &response) {
                    return Err(err);
                }
                Ok(response.text().await?)
            }
        })
        .await
    }

    /// Downloads a transcript document and returns its raw bytes, with
    /// automatic retry on transient errors.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::fetch_listing_page`]; a 404 here means the
    /// listing advertised a document the portal no longer serves.
    pub async fn fetch_document(
        &self,
        session: &Session,
        url: &str,
    ) -> Result<Vec<u8>, PortalError> {
        tracing::debug!(user = %session.username, %url, "fetching document");

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.to_string();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(
                        reqwest::header::ACCEPT,
                        "application/pdf,application/octet-stream;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::REFERER, &self.base_url)
                    .send()
                    .await?;
                if let Some(err) = error_for_status(url, &response) {
                    return Err(err);
                }
                Ok(response.bytes().await?.to_vec())
            }
        })
        .await
    }

    /// Builds the listing URL for an entity page: the consolidated variant
    /// when the watchlist asks for it, with `?page=N` from the second page on.
    fn listing_url(&self, slug: &str, consolidated: bool, page: u32) -> Result<String, PortalError> {
        let variant = if consolidated { "consolidated/" } else { "" };
        let raw = format!("{}/company/{slug}/{variant}", self.base_url);
        let mut url = reqwest::Url::parse(&raw).map_err(|e| PortalError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        if page > 1 {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }

        Ok(url.to_string())
    }
}

/// Maps a non-success response to the matching typed error, `None` for 2xx.
fn error_for_status(url: String, response: &reqwest::Response) -> Option<PortalError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Some(PortalError::RateLimited { retry_after_secs });
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Some(PortalError::NotFound { url });
    }

    if !status.is_success() {
        return Some(PortalError::UnexpectedStatus {
            status: status.as_u16(),
            url,
        });
    }

    None
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
