//! Snapshot of what the archive already holds.
//!
//! One walk of the store at startup replaces a per-file existence check
//! during the run: [`RemoteIndex`] answers "is this transcript already
//! archived?" and [`FolderCache`] answers "which folder do I upload into?"
//! without any further listing calls.

use std::collections::{HashMap, HashSet};

use concall_core::DestinationPath;
use tokio::sync::Mutex;

use crate::client::DriveClient;
use crate::error::DriveError;

/// Relative paths (`FY2025/Q3/file.pdf`) of every file below the store root.
///
/// Files that do not follow the canonical layout are indexed at whatever
/// depth they sit; they can never collide with a canonical destination, so
/// they are simply inert entries.
#[derive(Debug, Default)]
pub struct RemoteIndex {
    paths: HashSet<String>,
}

impl RemoteIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the destination already exists in the store.
    #[must_use]
    pub fn contains(&self, destination: &DestinationPath) -> bool {
        self.paths.contains(&destination.relative())
    }

    /// Records a path, returning `false` when it was already present.
    pub fn insert(&mut self, relative: String) -> bool {
        self.paths.insert(relative)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Folder IDs keyed by relative folder path (`FY2025`, `FY2025/Q3`).
///
/// Seeded from the index walk, so a cache miss means the folder genuinely
/// does not exist yet and must be created.
#[derive(Debug, Default)]
pub struct FolderCache {
    inner: Mutex<HashMap<String, String>>,
}

impl FolderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn seeded(folders: HashMap<String, String>) -> Self {
        Self {
            inner: Mutex::new(folders),
        }
    }

    /// Returns the folder ID for a destination's quarter folder, creating
    /// the fiscal-year and quarter folders as needed.
    ///
    /// The cache lock is held across the create calls so concurrent uploads
    /// into the same quarter cannot race duplicate folders into existence.
    ///
    /// # Errors
    ///
    /// Propagates any [`DriveError`] from folder creation.
    pub async fn ensure_folder(
        &self,
        client: &DriveClient,
        root_folder_id: &str,
        destination: &DestinationPath,
    ) -> Result<String, DriveError> {
        let mut cache = self.inner.lock().await;

        let year_key = destination.fiscal_year_folder.clone();
        let year_id = match cache.get(&year_key) {
            Some(id) => id.clone(),
            None => {
                let id = client
                    .create_folder(root_folder_id, &destination.fiscal_year_folder)
                    .await?;
                cache.insert(year_key.clone(), id.clone());
                id
            }
        };

        let quarter_key = format!("{year_key}/{}", destination.quarter_folder);
        let quarter_id = match cache.get(&quarter_key) {
            Some(id) => id.clone(),
            None => {
                let id = client
                    .create_folder(&year_id, &destination.quarter_folder)
                    .await?;
                cache.insert(quarter_key, id.clone());
                id
            }
        };

        Ok(quarter_id)
    }
}

/// Walks the store root two folder levels deep and returns the file index
/// plus the folder cache seeded with every folder seen.
///
/// The walk is fatal on any listing error: syncing against a partial index
/// would re-upload files that already exist.
///
/// # Errors
///
/// Propagates any [`DriveError`] from the listing calls.
pub async fn build_remote_index(
    client: &DriveClient,
    root_folder_id: &str,
) -> Result<(RemoteIndex, FolderCache), DriveError> {
    let mut paths = HashSet::new();
    let mut folders = HashMap::new();

    for entry in client.list_children(root_folder_id).await? {
        if !entry.is_folder() {
            paths.insert(entry.name);
            continue;
        }
        let year_path = entry.name;
        folders.insert(year_path.clone(), entry.id.clone());

        for child in client.list_children(&entry.id).await? {
            if !child.is_folder() {
                paths.insert(format!("{year_path}/{}", child.name));
                continue;
            }
            let quarter_path = format!("{year_path}/{}", child.name);
            folders.insert(quarter_path.clone(), child.id.clone());

            for leaf in client.list_children(&child.id).await? {
                if leaf.is_folder() {
                    // Nothing canonical lives below the quarter level.
                    tracing::debug!(folder = %leaf.name, parent = %quarter_path, "ignoring nested folder");
                } else {
                    paths.insert(format!("{quarter_path}/{}", leaf.name));
                }
            }
        }
    }

    tracing::info!(
        files = paths.len(),
        folders = folders.len(),
        "indexed remote store"
    );
    Ok((RemoteIndex { paths }, FolderCache::seeded(folders)))
}
