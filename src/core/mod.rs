pub mod aggregate;
pub mod engine;
pub mod report;

pub use crate::domain::model::{ContainerStatus, Terminal, TerminalReport};
pub use crate::domain::ports::{TerminalChecker, WmsPortal};
pub use crate::utils::error::Result;
pub use aggregate::{aggregate, AggregatedReport};
pub use engine::StatusEngine;
pub use report::OutputFormat;
