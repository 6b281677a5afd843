use crate::domain::model::TerminalReport;
use crate::domain::ports::TerminalChecker;
use tracing::{error, info};

/// Runs the configured terminal drivers one at a time, each with its own
/// browser session. A driver's failure is captured in its report; the
/// remaining terminals still run.
pub struct StatusEngine {
    checkers: Vec<Box<dyn TerminalChecker>>,
}

impl StatusEngine {
    pub fn new(checkers: Vec<Box<dyn TerminalChecker>>) -> Self {
        Self { checkers }
    }

    pub async fn run(&self, containers: &[String]) -> Vec<TerminalReport> {
        let mut reports = Vec::with_capacity(self.checkers.len());

        for checker in &self.checkers {
            let terminal = checker.terminal();
            info!(%terminal, containers = containers.len(), "checking containers");

            let outcome = checker.check(containers).await;
            match &outcome {
                Ok(records) => {
                    info!(%terminal, records = records.len(), "completed terminal check")
                }
                Err(e) => error!(%terminal, error = %e, "terminal check failed, continuing"),
            }

            reports.push(TerminalReport { terminal, outcome });
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ContainerStatus, Terminal};
    use crate::utils::error::{CheckerError, Result};
    use async_trait::async_trait;

    struct FixedChecker {
        terminal: Terminal,
        fail: bool,
    }

    #[async_trait]
    impl TerminalChecker for FixedChecker {
        fn terminal(&self) -> Terminal {
            self.terminal
        }

        async fn check(&self, containers: &[String]) -> Result<Vec<ContainerStatus>> {
            if self.fail {
                return Err(CheckerError::PortalTimeout {
                    terminal: self.terminal.display_name().to_string(),
                    seconds: 10,
                });
            }
            Ok(containers
                .iter()
                .map(|c| ContainerStatus::not_found(c.clone(), self.terminal))
                .collect())
        }
    }

    #[tokio::test]
    async fn one_failing_terminal_does_not_stop_the_others() {
        let engine = StatusEngine::new(vec![
            Box::new(FixedChecker {
                terminal: Terminal::Trapac,
                fail: true,
            }),
            Box::new(FixedChecker {
                terminal: Terminal::Ste,
                fail: false,
            }),
        ]);

        let reports = engine.run(&["ABCD1234567".to_string()]).await;
        assert_eq!(reports.len(), 2);
        assert!(reports[0].outcome.is_err());
        assert_eq!(reports[1].outcome.as_ref().unwrap().len(), 1);
    }
}
