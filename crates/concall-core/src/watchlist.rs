use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One tracked entity from the watchlist file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchedEntity {
    /// Display name, used verbatim (after sanitization) in destination
    /// file names.
    pub name: String,
    /// Portal identifier of the entity, as it appears in company page URLs.
    pub slug: String,
    /// Use the consolidated-figures listing variant of the company page.
    #[serde(default)]
    pub consolidated: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WatchlistFile {
    pub entities: Vec<WatchedEntity>,
}

/// Load and validate the watchlist from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_watchlist(path: &Path) -> Result<WatchlistFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::WatchlistIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let watchlist: WatchlistFile =
        serde_yaml::from_str(&content).map_err(ConfigError::WatchlistParse)?;

    validate_watchlist(&watchlist)?;

    Ok(watchlist)
}

fn validate_watchlist(watchlist: &WatchlistFile) -> Result<(), ConfigError> {
    if watchlist.entities.is_empty() {
        return Err(ConfigError::Validation(
            "watchlist must contain at least one entity".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for entity in &watchlist.entities {
        if entity.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "entity name must be non-empty".to_string(),
            ));
        }

        if entity.slug.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "entity '{}' has an empty slug",
                entity.name
            )));
        }

        let lower_name = entity.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate entity name: '{}'",
                entity.name
            )));
        }

        let lower_slug = entity.slug.to_lowercase();
        if !seen_slugs.insert(lower_slug) {
            return Err(ConfigError::Validation(format!(
                "duplicate entity slug: '{}' (from entity '{}')",
                entity.slug, entity.name
            )));
        }
    }

    Ok(())
}
