//! HTTP client for the Drive v3 REST API.
//!
//! Covers the three calls the archive needs: listing the children of a
//! folder, creating a folder, and uploading a file via a multipart/related
//! request. All calls carry a bearer token and retry transient failures.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::Deserialize;

use crate::auth::{ServiceAccountKey, TokenProvider};
use crate::error::DriveError;
use crate::retry::retry_with_backoff;

/// MIME type that marks an entry as a folder rather than a file.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Pagination sanity limit. At 1000 entries per page this is far beyond any
/// real archive folder.
const MAX_PAGES: u32 = 50;

/// One entry from a folder listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

impl DriveFile {
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Response shape shared by folder creation and file upload.
#[derive(Deserialize)]
struct FileResource {
    id: String,
}

enum AuthMode {
    ServiceAccount(TokenProvider),
    Static(String),
}

/// Client for the Drive v3 API.
///
/// Holds the HTTP client, the `files` endpoints for the metadata and upload
/// hosts, and the auth mode. Use [`DriveClient::new`] in production and
/// [`DriveClient::with_static_token`] in tests.
pub struct DriveClient {
    client: Client,
    files_url: Url,
    upload_files_url: Url,
    auth: AuthMode,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl DriveClient {
    /// Creates a client that authenticates with a service-account key.
    ///
    /// `api_base_url` and `upload_base_url` point at the production hosts in
    /// normal use and at a mock server in integration tests.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Credentials`] if the key's RSA PEM is unusable,
    /// [`DriveError::InvalidBaseUrl`] if either base URL does not parse, or
    /// [`DriveError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        key: &ServiceAccountKey,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        api_base_url: &str,
        upload_base_url: &str,
    ) -> Result<Self, DriveError> {
        let provider = TokenProvider::new(key, timeout_secs)?;
        Self::build(
            AuthMode::ServiceAccount(provider),
            timeout_secs,
            max_retries,
            backoff_base_ms,
            api_base_url,
            upload_base_url,
        )
    }

    /// Creates a client that sends a fixed bearer token instead of running
    /// the service-account flow (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::InvalidBaseUrl`] if either base URL does not
    /// parse, or [`DriveError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn with_static_token(
        token: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        api_base_url: &str,
        upload_base_url: &str,
    ) -> Result<Self, DriveError> {
        Self::build(
            AuthMode::Static(token.to_owned()),
            timeout_secs,
            max_retries,
            backoff_base_ms,
            api_base_url,
            upload_base_url,
        )
    }

    fn build(
        auth: AuthMode,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        api_base_url: &str,
        upload_base_url: &str,
    ) -> Result<Self, DriveError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("concall/0.1 (transcript-archiver)")
            .build()?;
        Ok(Self {
            client,
            files_url: files_endpoint(api_base_url)?,
            upload_files_url: files_endpoint(upload_base_url)?,
            auth,
            max_retries,
            backoff_base_ms,
        })
    }

    async fn access_token(&self) -> Result<String, DriveError> {
        match &self.auth {
            AuthMode::ServiceAccount(provider) => provider.access_token().await,
            AuthMode::Static(token) => Ok(token.clone()),
        }
    }

    /// Lists every non-trashed child of a folder, following page tokens.
    ///
    /// # Errors
    ///
    /// - [`DriveError::Api`] if the API answers with a non-2xx status after
    ///   retries are exhausted.
    /// - [`DriveError::Http`] on network failure.
    /// - [`DriveError::Deserialize`] if a page does not match the expected
    ///   shape.
    /// - [`DriveError::PaginationLimit`] if the API keeps producing page
    ///   tokens past the sanity limit.
    pub async fn list_children(&self, parent_id: &str) -> Result<Vec<DriveFile>, DriveError> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page_count = 0u32;
        loop {
            if page_count >= MAX_PAGES {
                return Err(DriveError::PaginationLimit {
                    folder_id: parent_id.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }
            page_count += 1;

            let url = self.list_url(parent_id, page_token.as_deref());
            let page: FileList =
                retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                    let url = url.clone();
                    async move {
                        let token = self.access_token().await?;
                        let response =
                            self.client.get(url).bearer_auth(&token).send().await?;
                        let response = check_status(response).await?;
                        let body = response.text().await?;
                        serde_json::from_str(&body).map_err(|e| DriveError::Deserialize {
                            context: format!("files.list(parent={parent_id})"),
                            source: e,
                        })
                    }
                })
                .await?;

            entries.extend(page.files);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        tracing::debug!(parent = parent_id, entries = entries.len(), "listed folder");
        Ok(entries)
    }

    /// Creates a folder under `parent_id` and returns its ID.
    ///
    /// Does not check for an existing folder with the same name; callers go
    /// through [`crate::index::FolderCache`], which knows what already
    /// exists.
    ///
    /// # Errors
    ///
    /// - [`DriveError::Api`] if the API answers with a non-2xx status after
    ///   retries are exhausted.
    /// - [`DriveError::Http`] on network failure.
    /// - [`DriveError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn create_folder(&self, parent_id: &str, name: &str) -> Result<String, DriveError> {
        let metadata = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });
        let created: FileResource =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                let metadata = metadata.clone();
                async move {
                    let token = self.access_token().await?;
                    let response = self
                        .client
                        .post(self.files_url.clone())
                        .bearer_auth(&token)
                        .json(&metadata)
                        .send()
                        .await?;
                    let response = check_status(response).await?;
                    let body = response.text().await?;
                    serde_json::from_str(&body).map_err(|e| DriveError::Deserialize {
                        context: format!("files.create(name={name})"),
                        source: e,
                    })
                }
            })
            .await?;
        tracing::info!(folder = name, parent = parent_id, id = %created.id, "created folder");
        Ok(created.id)
    }

    /// Uploads a file into `parent_id` with a single multipart/related
    /// request (metadata part plus content part) and returns the new file's
    /// ID.
    ///
    /// # Errors
    ///
    /// - [`DriveError::Api`] if the API answers with a non-2xx status after
    ///   retries are exhausted.
    /// - [`DriveError::Http`] on network failure.
    /// - [`DriveError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn upload_file(
        &self,
        parent_id: &str,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<String, DriveError> {
        let metadata = serde_json::json!({
            "name": name,
            "parents": [parent_id],
        });
        let mut url = self.upload_files_url.clone();
        url.query_pairs_mut().append_pair("uploadType", "multipart");

        let created: FileResource =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                let url = url.clone();
                let metadata = metadata.clone();
                let content = content.clone();
                async move {
                    let boundary = format!("concall{:032x}", rand::random::<u128>());
                    let body = multipart_related_body(&metadata, mime_type, &content, &boundary);
                    let token = self.access_token().await?;
                    let response = self
                        .client
                        .post(url)
                        .bearer_auth(&token)
                        .header(
                            reqwest::header::CONTENT_TYPE,
                            format!("multipart/related; boundary={boundary}"),
                        )
                        .body(body)
                        .send()
                        .await?;
                    let response = check_status(response).await?;
                    let text = response.text().await?;
                    serde_json::from_str(&text).map_err(|e| DriveError::Deserialize {
                        context: format!("files.upload(name={name})"),
                        source: e,
                    })
                }
            })
            .await?;
        tracing::info!(file = name, id = %created.id, bytes = content.len(), "uploaded file");
        Ok(created.id)
    }

    /// Builds the `files.list` URL for one page of a folder's children.
    fn list_url(&self, parent_id: &str, page_token: Option<&str>) -> Url {
        let mut url = self.files_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &format!("'{parent_id}' in parents and trashed=false"));
            pairs.append_pair("fields", "nextPageToken, files(id, name, mimeType)");
            pairs.append_pair("pageSize", "1000");
            if let Some(token) = page_token {
                pairs.append_pair("pageToken", token);
            }
        }
        url
    }
}

/// Browser URL for a folder, used in run summaries.
#[must_use]
pub fn folder_url(folder_id: &str) -> String {
    format!("https://drive.google.com/drive/folders/{folder_id}")
}

/// Passes 2xx responses through and maps everything else to
/// [`DriveError::Api`] with the response body attached.
async fn check_status(response: Response) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DriveError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Joins the `files` collection path onto a base URL.
fn files_endpoint(base_url: &str) -> Result<Url, DriveError> {
    // Normalise to exactly one trailing slash so `join` appends a segment
    // instead of replacing the last one.
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let base = Url::parse(&normalised).map_err(|e| DriveError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    base.join("files").map_err(|e| DriveError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// Builds a two-part multipart/related body: a JSON metadata part followed by
/// the raw content part.
fn multipart_related_body(
    metadata: &serde_json::Value,
    mime_type: &str,
    content: &[u8],
    boundary: &str,
) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(
        format!("\r\n--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
