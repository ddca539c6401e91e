use std::path::PathBuf;

/// Outbound notification settings, present only when a relay is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifySettings {
    pub relay_url: String,
    pub from: String,
    pub to: String,
    pub subject_prefix: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub source_username: String,
    pub source_password: String,
    pub store_credentials: String,
    pub store_root_folder_id: String,
    pub portal_base_url: String,
    pub watchlist_path: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub inter_request_delay_ms: u64,
    pub max_concurrent_transfers: usize,
    pub drive_api_base_url: String,
    pub drive_upload_base_url: String,
    pub notify: Option<NotifySettings>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("source_username", &self.source_username)
            .field("source_password", &"[redacted]")
            .field("store_credentials", &"[redacted]")
            .field("store_root_folder_id", &self.store_root_folder_id)
            .field("portal_base_url", &self.portal_base_url)
            .field("watchlist_path", &self.watchlist_path)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field(
                "max_concurrent_transfers",
                &self.max_concurrent_transfers,
            )
            .field("drive_api_base_url", &self.drive_api_base_url)
            .field("drive_upload_base_url", &self.drive_upload_base_url)
            .field("notify", &self.notify)
            .finish()
    }
}
