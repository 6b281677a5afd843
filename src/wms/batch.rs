//! Batch submission with the no-duplicate invariant: presence is re-checked
//! immediately before each submission, and the run also tracks what it has
//! itself submitted so a container appearing twice in the input is only
//! entered once.

use crate::domain::model::{
    BatchSummary, Direction, RecordResult, SubmissionOutcome, TransactionRecord,
};
use crate::domain::ports::WmsPortal;
use crate::utils::error::Result;
use crate::utils::validation::{
    normalize_container_number, validate_non_empty_string, validate_positive_number,
};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Read transaction records from a CSV file with headers
/// `container,direction,date,product,pallets`.
pub fn read_records(path: &Path) -> Result<Vec<TransactionRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let mut record: TransactionRecord = row?;
        record.container = normalize_container_number(&record.container);
        validate_non_empty_string("container", &record.container)?;
        validate_positive_number("pallets", record.pallets as u64, 1)?;
        records.push(record);
    }
    Ok(records)
}

pub struct SubmissionBatch<'a, P: WmsPortal> {
    portal: &'a P,
}

impl<'a, P: WmsPortal> SubmissionBatch<'a, P> {
    pub fn new(portal: &'a P) -> Self {
        Self { portal }
    }

    pub async fn run(&self, records: &[TransactionRecord]) -> (Vec<RecordResult>, BatchSummary) {
        let mut results = Vec::with_capacity(records.len());
        let mut summary = BatchSummary::default();
        let mut submitted_this_run: HashSet<String> = HashSet::new();

        for record in records {
            let container = normalize_container_number(&record.container);
            let outcome = self
                .submit_one(record, &container, &submitted_this_run)
                .await;

            match &outcome {
                SubmissionOutcome::Submitted => {
                    submitted_this_run.insert(container.clone());
                    summary.submitted += 1;
                    info!(container, direction = %record.direction, "record submitted");
                }
                SubmissionOutcome::SkippedDuplicate => {
                    summary.skipped += 1;
                    info!(container, "already present, skipped");
                }
                SubmissionOutcome::Failed(reason) => {
                    summary.failed += 1;
                    warn!(container, reason, "submission failed, continuing batch");
                }
            }

            results.push(RecordResult {
                container,
                direction: record.direction,
                outcome,
            });
        }

        (results, summary)
    }

    async fn submit_one(
        &self,
        record: &TransactionRecord,
        container: &str,
        submitted_this_run: &HashSet<String>,
    ) -> SubmissionOutcome {
        if submitted_this_run.contains(container) {
            return SubmissionOutcome::SkippedDuplicate;
        }

        // check right before submitting, not just at batch start: another
        // user may have entered this container since
        match self.portal.lookup(container).await {
            Ok(true) => return SubmissionOutcome::SkippedDuplicate,
            Ok(false) => {}
            Err(e) => return SubmissionOutcome::Failed(format!("presence check failed: {e}")),
        }

        let result = match record.direction {
            Direction::Inbound => self.portal.create_inbound(record).await,
            Direction::Outbound => self.portal.create_outbound(record).await,
        };

        match result {
            Ok(()) => SubmissionOutcome::Submitted,
            Err(e) => SubmissionOutcome::Failed(e.to_string()),
        }
    }
}
