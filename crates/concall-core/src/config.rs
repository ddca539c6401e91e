use std::path::PathBuf;

use crate::app_config::{AppConfig, NotifySettings};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, which is useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let source_username = require("SOURCE_USERNAME")?;
    let source_password = require("SOURCE_PASSWORD")?;
    let store_credentials = require("STORE_CREDENTIALS")?;
    let store_root_folder_id = require("STORE_ROOT_FOLDER_ID")?;

    let portal_base_url = or_default("CONCALL_PORTAL_BASE_URL", "https://www.screener.in");
    let watchlist_path = PathBuf::from(or_default(
        "CONCALL_WATCHLIST_PATH",
        "./config/watchlist.yaml",
    ));
    let log_level = or_default("CONCALL_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("CONCALL_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CONCALL_USER_AGENT", "concall/0.1 (transcript-archiver)");
    let max_retries = parse_u32("CONCALL_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("CONCALL_RETRY_BACKOFF_BASE_MS", "1000")?;
    let inter_request_delay_ms = parse_u64("CONCALL_INTER_REQUEST_DELAY_MS", "500")?;
    let max_concurrent_transfers = parse_usize("CONCALL_MAX_CONCURRENT_TRANSFERS", "1")?;

    let drive_api_base_url = or_default(
        "CONCALL_DRIVE_API_BASE_URL",
        "https://www.googleapis.com/drive/v3",
    );
    let drive_upload_base_url = or_default(
        "CONCALL_DRIVE_UPLOAD_BASE_URL",
        "https://www.googleapis.com/upload/drive/v3",
    );

    // Notification is opt-in: the relay URL enables it, the recipient is
    // then required, sender defaults to the recipient.
    let notify = match lookup("NOTIFY_RELAY_URL") {
        Ok(relay_url) => {
            let to = lookup("NOTIFY_TO")
                .map_err(|_| ConfigError::MissingEnvVar("NOTIFY_TO".to_string()))?;
            let from = lookup("NOTIFY_FROM").unwrap_or_else(|_| to.clone());
            let subject_prefix =
                lookup("NOTIFY_SUBJECT_PREFIX").unwrap_or_else(|_| "[concall]".to_string());
            Some(NotifySettings {
                relay_url,
                from,
                to,
                subject_prefix,
            })
        }
        Err(_) => None,
    };

    Ok(AppConfig {
        source_username,
        source_password,
        store_credentials,
        store_root_folder_id,
        portal_base_url,
        watchlist_path,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        inter_request_delay_ms,
        max_concurrent_transfers,
        drive_api_base_url,
        drive_upload_base_url,
        notify,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
