//! Portside drives the Oakland terminal portals and a warehouse management
//! system through a real browser: the portals offer no API, so the crate
//! automates the pages a clerk would otherwise click through.
//!
//! Two binaries sit on top of the library: `container-status` queries the
//! Trapac, STE and OICT portals and merges their answers into one report,
//! and `wms` keys inbound receipts and outbound orders into the WMS.

pub mod browser;
pub mod config;
pub mod core;
pub mod domain;
pub mod terminals;
pub mod utils;
pub mod wms;

pub use domain::model::{Availability, ContainerStatus, Terminal, TerminalReport};
pub use domain::ports::{TerminalChecker, WmsPortal};
pub use utils::error::{CheckerError, ErrorSeverity, Result};
