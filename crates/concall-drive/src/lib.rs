//! Client for the Drive-backed archive: service-account authentication,
//! folder management, multipart uploads, and the remote index that drives
//! deduplication.

pub mod auth;
pub mod client;
pub mod error;
pub mod index;
mod retry;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::{folder_url, DriveClient, DriveFile, FOLDER_MIME_TYPE};
pub use error::DriveError;
pub use index::{build_remote_index, FolderCache, RemoteIndex};
