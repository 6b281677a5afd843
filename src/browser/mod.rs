pub mod detect;
pub mod session;
pub mod wait;

pub use session::{BrowserSession, SessionConfig};
pub use wait::poll_until;
