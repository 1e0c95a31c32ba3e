use crate::models::{Field, ListingRecord, PartialRecord};
use tracing::{info, warn};

/// Result of folding one attempt into the accumulated record.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub record: ListingRecord,
    /// No further attempt should be made.
    pub done: bool,
}

/// Folds per-attempt extractions into one record. Values only ever fill in:
/// a field that was found once is never reset by a later, worse attempt.
#[derive(Debug, Clone, Copy)]
pub struct AttemptMerger {
    max_attempts: u32,
}

impl AttemptMerger {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `attempt` is 1-based.
    pub fn merge(
        &self,
        accumulated: &ListingRecord,
        partial: &PartialRecord,
        attempt: u32,
    ) -> MergeOutcome {
        let record = Field::ALL
            .into_iter()
            .fold(accumulated.clone(), |record, field| match partial.value(field) {
                Some(value) => record.with(field, value),
                None => record,
            });

        let missing = record.missing();
        let done = if missing.is_empty() {
            true
        } else if attempt >= self.max_attempts {
            warn!(
                "Reached {} attempts, still missing: {}",
                self.max_attempts,
                join_fields(&missing)
            );
            true
        } else {
            info!(
                "Attempt {} incomplete (missing {}), reloading",
                attempt,
                join_fields(&missing)
            );
            false
        };

        MergeOutcome { record, done }
    }
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}
