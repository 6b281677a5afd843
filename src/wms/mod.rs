pub mod batch;
pub mod session;

pub use batch::{read_records, SubmissionBatch};
pub use session::{WmsConfig, WmsSession};
