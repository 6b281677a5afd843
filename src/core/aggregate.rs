use crate::domain::model::{ContainerStatus, Terminal, TerminalReport};

/// The merged view across terminals: every (container, terminal) record that
/// was produced, plus the terminals that failed outright.
#[derive(Debug)]
pub struct AggregatedReport {
    pub records: Vec<ContainerStatus>,
    pub failures: Vec<(Terminal, String)>,
}

impl AggregatedReport {
    /// No terminal produced anything; the run as a whole failed.
    pub fn is_total_failure(&self) -> bool {
        self.records.is_empty() && !self.failures.is_empty()
    }
}

/// Merge per-terminal reports, keeping the per-terminal breakdown. A
/// container legitimately appears at only one terminal; the other terminals'
/// not-found records stay in the output rather than being collapsed away.
pub fn aggregate(reports: Vec<TerminalReport>) -> AggregatedReport {
    let mut records = Vec::new();
    let mut failures = Vec::new();

    for report in reports {
        match report.outcome {
            Ok(mut terminal_records) => records.append(&mut terminal_records),
            Err(e) => failures.push((report.terminal, e.to_string())),
        }
    }

    records.sort_by(|a, b| {
        a.container_number
            .cmp(&b.container_number)
            .then(a.terminal.cmp(&b.terminal))
    });

    AggregatedReport { records, failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CheckerError;

    fn found(container: &str, terminal: Terminal) -> ContainerStatus {
        ContainerStatus {
            found: true,
            ..ContainerStatus::not_found(container, terminal)
        }
    }

    #[test]
    fn keeps_per_terminal_breakdown() {
        let reports = vec![
            TerminalReport {
                terminal: Terminal::Oict,
                outcome: Ok(vec![found("ABCD1234567", Terminal::Oict)]),
            },
            TerminalReport {
                terminal: Terminal::Ste,
                outcome: Ok(vec![ContainerStatus::not_found(
                    "ABCD1234567",
                    Terminal::Ste,
                )]),
            },
        ];

        let aggregated = aggregate(reports);
        assert_eq!(aggregated.records.len(), 2);
        assert!(aggregated.failures.is_empty());
        // the not-found record is not collapsed into the found one
        assert_eq!(
            aggregated
                .records
                .iter()
                .filter(|r| r.container_number == "ABCD1234567")
                .count(),
            2
        );
    }

    #[test]
    fn failed_terminals_are_listed_not_fatal() {
        let reports = vec![
            TerminalReport {
                terminal: Terminal::Trapac,
                outcome: Err(CheckerError::CaptchaUnresolved { seconds: 300 }),
            },
            TerminalReport {
                terminal: Terminal::Oict,
                outcome: Ok(vec![found("ABCD1234567", Terminal::Oict)]),
            },
        ];

        let aggregated = aggregate(reports);
        assert_eq!(aggregated.records.len(), 1);
        assert_eq!(aggregated.failures.len(), 1);
        assert!(!aggregated.is_total_failure());
    }

    #[test]
    fn all_terminals_failing_is_total_failure() {
        let reports = vec![TerminalReport {
            terminal: Terminal::Ste,
            outcome: Err(CheckerError::PortalTimeout {
                terminal: "Shippers Transport".into(),
                seconds: 10,
            }),
        }];
        assert!(aggregate(reports).is_total_failure());
    }

    #[test]
    fn records_sort_by_container_then_terminal() {
        let reports = vec![TerminalReport {
            terminal: Terminal::Ste,
            outcome: Ok(vec![
                ContainerStatus::not_found("EFGH7654321", Terminal::Ste),
                ContainerStatus::not_found("ABCD1234567", Terminal::Ste),
            ]),
        }];
        let aggregated = aggregate(reports);
        assert_eq!(aggregated.records[0].container_number, "ABCD1234567");
    }
}
