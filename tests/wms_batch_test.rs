use async_trait::async_trait;
use portside::domain::model::{SubmissionOutcome, TransactionRecord};
use portside::domain::ports::WmsPortal;
use portside::utils::error::Result;
use portside::wms::{read_records, SubmissionBatch};
use std::collections::HashSet;
use std::io::Write;
use std::sync::Mutex;

/// Records every submission; everything succeeds.
struct RecordingPortal {
    existing: Mutex<HashSet<String>>,
    inbound: Mutex<Vec<TransactionRecord>>,
    outbound: Mutex<Vec<TransactionRecord>>,
}

impl RecordingPortal {
    fn new() -> Self {
        Self {
            existing: Mutex::new(HashSet::new()),
            inbound: Mutex::new(Vec::new()),
            outbound: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WmsPortal for RecordingPortal {
    async fn login(&self) -> Result<()> {
        Ok(())
    }

    async fn existing_refs(&self) -> Result<HashSet<String>> {
        Ok(self.existing.lock().unwrap().clone())
    }

    async fn lookup(&self, container: &str) -> Result<bool> {
        Ok(self.existing.lock().unwrap().contains(container))
    }

    async fn create_inbound(&self, record: &TransactionRecord) -> Result<()> {
        self.existing.lock().unwrap().insert(record.container.clone());
        self.inbound.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn create_outbound(&self, record: &TransactionRecord) -> Result<()> {
        self.existing.lock().unwrap().insert(record.container.clone());
        self.outbound.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn export_inventory(&self) -> Result<String> {
        Ok("inbound.xls".to_string())
    }
}

#[tokio::test]
async fn csv_batch_flows_through_to_the_portal() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "container,direction,date,product,pallets").unwrap();
    writeln!(file, "abcd1234567,inbound,,PN-100,22").unwrap();
    writeln!(file, "EFGH7654321,outbound,01-Sep-26,PN-200,10").unwrap();
    writeln!(file, "ABCD1234567,inbound,,PN-100,22").unwrap();

    let records = read_records(file.path()).unwrap();
    assert_eq!(records.len(), 3);
    // Container numbers are normalized at the CSV boundary.
    assert_eq!(records[0].container, "ABCD1234567");

    let portal = RecordingPortal::new();
    let batch = SubmissionBatch::new(&portal);
    let (results, summary) = batch.run(&records).await;

    assert_eq!(summary.submitted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(results[2].outcome, SubmissionOutcome::SkippedDuplicate);

    let inbound = portal.inbound.lock().unwrap();
    assert_eq!(inbound.len(), 1);
    assert_eq!(inbound[0].total_units(), 22 * 60);

    let outbound = portal.outbound.lock().unwrap();
    assert_eq!(outbound.len(), 1);
    assert_eq!(outbound[0].date, "01-Sep-26");
}
