use crate::record::Quarter;

/// Terminal state of one transcript after a sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Uploaded,
    Skipped,
    Failed(FailureDetail),
}

/// Context for one swallowed failure, carried into the run report.
///
/// Entity-level failures (a listing fetch that never yielded records) have
/// no fiscal period attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    pub entity_name: String,
    pub fiscal_year: Option<i32>,
    pub quarter: Option<Quarter>,
    pub reason: String,
}

impl FailureDetail {
    #[must_use]
    pub fn for_record(entity_name: &str, fiscal_year: i32, quarter: Quarter, reason: String) -> Self {
        FailureDetail {
            entity_name: entity_name.to_string(),
            fiscal_year: Some(fiscal_year),
            quarter: Some(quarter),
            reason,
        }
    }

    #[must_use]
    pub fn for_entity(entity_name: &str, reason: String) -> Self {
        FailureDetail {
            entity_name: entity_name.to_string(),
            fiscal_year: None,
            quarter: None,
            reason,
        }
    }
}

/// Aggregated result of a single sync run, built fresh per run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub uploaded: u64,
    pub skipped: u64,
    pub failed: u64,
    pub failures: Vec<FailureDetail>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Uploaded => self.uploaded = self.uploaded.saturating_add(1),
            SyncOutcome::Skipped => self.skipped = self.skipped.saturating_add(1),
            SyncOutcome::Failed(detail) => {
                self.failed = self.failed.saturating_add(1);
                self.failures.push(detail);
            }
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.uploaded
            .saturating_add(self.skipped)
            .saturating_add(self.failed)
    }
}
