use crate::domain::model::{ContainerStatus, Terminal, TransactionRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;

/// One port terminal's lookup workflow: authenticate if needed, submit a
/// batch of container numbers, and return one record per container. Drivers
/// must emit a not-found record for containers the portal does not know.
#[async_trait]
pub trait TerminalChecker: Send + Sync {
    fn terminal(&self) -> Terminal;

    async fn check(&self, containers: &[String]) -> Result<Vec<ContainerStatus>>;
}

/// The WMS web UI, reduced to the operations the batch runner needs. The
/// duplicate invariant lives above this trait: `lookup` is called immediately
/// before each submission.
#[async_trait]
pub trait WmsPortal: Send + Sync {
    async fn login(&self) -> Result<()>;

    /// Container references already present in the WMS search grid.
    async fn existing_refs(&self) -> Result<HashSet<String>>;

    /// Fresh presence check for a single reference.
    async fn lookup(&self, container: &str) -> Result<bool>;

    async fn create_inbound(&self, record: &TransactionRecord) -> Result<()>;

    async fn create_outbound(&self, record: &TransactionRecord) -> Result<()>;

    /// Trigger the search grid's spreadsheet export; returns the saved path.
    async fn export_inventory(&self) -> Result<String>;
}
