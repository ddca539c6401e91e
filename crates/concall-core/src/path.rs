use crate::record::TranscriptRecord;

/// Canonical location of a transcript inside the remote store, relative to
/// the configured root folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPath {
    /// First-level folder, e.g. `FY2025`.
    pub fiscal_year_folder: String,
    /// Second-level folder, e.g. `Q3`.
    pub quarter_folder: String,
    /// Leaf file name, e.g. `Acme Corp - FY2025 Q3 Transcript.pdf`.
    pub file_name: String,
}

impl DestinationPath {
    /// Slash-joined form relative to the store root. This string is the key
    /// the remote index stores, so it must be byte-identical across runs.
    #[must_use]
    pub fn relative(&self) -> String {
        format!(
            "{}/{}/{}",
            self.fiscal_year_folder, self.quarter_folder, self.file_name
        )
    }
}

/// Map a discovered transcript to its canonical destination.
///
/// Pure and deterministic: equal records always resolve to the same path,
/// which is what makes skip-if-exists comparisons reliable across runs.
#[must_use]
pub fn resolve(record: &TranscriptRecord) -> DestinationPath {
    let entity = sanitize_component(&record.entity_name);
    DestinationPath {
        fiscal_year_folder: format!("FY{}", record.fiscal_year),
        quarter_folder: record.quarter.to_string(),
        file_name: format!(
            "{entity} - FY{} {} Transcript.pdf",
            record.fiscal_year, record.quarter
        ),
    }
}

/// Strip characters that are unsafe in file names and collapse whitespace
/// runs to single spaces.
#[must_use]
pub fn sanitize_component(raw: &str) -> String {
    const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
    let stripped: String = raw.chars().filter(|c| !FORBIDDEN.contains(c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
