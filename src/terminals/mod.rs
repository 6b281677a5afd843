pub mod tideworks;
pub mod trapac;

use crate::domain::model::Terminal;
use crate::domain::ports::TerminalChecker;
use crate::utils::error::Result;
use crate::utils::validation::credentials_from_env;
use std::time::Duration;

pub use tideworks::TideworksChecker;
pub use trapac::TrapacChecker;

/// Build the driver for one terminal. Tideworks portals need credentials
/// from the environment; a missing pair fails here, before any browser
/// launches, and is reported as that terminal's failure.
pub fn build_checker(
    terminal: Terminal,
    headless: bool,
    chrome_path: Option<String>,
    captcha_timeout: Duration,
) -> Result<Box<dyn TerminalChecker>> {
    match terminal {
        Terminal::Trapac => Ok(Box::new(TrapacChecker::new(chrome_path, captcha_timeout))),
        Terminal::Ste => {
            let (user, pass) = credentials_from_env("STO_USERNAME", "STO_PASSWORD")?;
            Ok(Box::new(TideworksChecker::new(
                Terminal::Ste,
                user,
                pass,
                headless,
                chrome_path,
            )))
        }
        Terminal::Oict => {
            let (user, pass) = credentials_from_env("OICT_USERNAME", "OICT_PASSWORD")?;
            Ok(Box::new(TideworksChecker::new(
                Terminal::Oict,
                user,
                pass,
                headless,
                chrome_path,
            )))
        }
    }
}
