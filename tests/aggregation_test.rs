use async_trait::async_trait;
use portside::core::{aggregate, report, StatusEngine};
use portside::domain::model::{Availability, ContainerStatus, Terminal};
use portside::domain::ports::TerminalChecker;
use portside::utils::error::{CheckerError, Result};
use std::collections::HashMap;

/// A checker that answers from a fixed table, or fails outright.
struct ScriptedChecker {
    terminal: Terminal,
    found: HashMap<String, ContainerStatus>,
    failure: Option<String>,
}

impl ScriptedChecker {
    fn new(terminal: Terminal) -> Self {
        Self {
            terminal,
            found: HashMap::new(),
            failure: None,
        }
    }

    fn with_container(mut self, status: ContainerStatus) -> Self {
        self.found.insert(status.container_number.clone(), status);
        self
    }

    fn failing(terminal: Terminal, reason: &str) -> Self {
        Self {
            terminal,
            found: HashMap::new(),
            failure: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl TerminalChecker for ScriptedChecker {
    fn terminal(&self) -> Terminal {
        self.terminal
    }

    async fn check(&self, containers: &[String]) -> Result<Vec<ContainerStatus>> {
        if self.failure.is_some() {
            return Err(CheckerError::PortalTimeout {
                terminal: self.terminal.to_string(),
                seconds: 10,
            });
        }
        Ok(containers
            .iter()
            .map(|c| {
                self.found
                    .get(c)
                    .cloned()
                    .unwrap_or_else(|| ContainerStatus::not_found(c, self.terminal))
            })
            .collect())
    }
}

fn oict_hit(container: &str) -> ContainerStatus {
    ContainerStatus {
        container_number: container.to_string(),
        terminal: Terminal::Oict,
        found: true,
        available: Availability::Available,
        line_operator: "ONE".to_string(),
        dimensions: "40HC".to_string(),
        customs_hold: "Released".to_string(),
        line_hold: "Released".to_string(),
        cbpa_hold: "".to_string(),
        terminal_hold: "None".to_string(),
        location: "Yard B4".to_string(),
    }
}

fn checkers_for_two_containers() -> Vec<Box<dyn TerminalChecker>> {
    vec![
        Box::new(ScriptedChecker::new(Terminal::Trapac)),
        Box::new(ScriptedChecker::new(Terminal::Ste)),
        Box::new(ScriptedChecker::new(Terminal::Oict).with_container(oict_hit("ABCD1234567"))),
    ]
}

#[tokio::test]
async fn one_record_per_container_per_terminal() {
    let containers = vec!["ABCD1234567".to_string(), "EFGH7654321".to_string()];
    let engine = StatusEngine::new(checkers_for_two_containers());
    let reports = engine.run(&containers).await;
    let aggregated = aggregate(reports);

    assert_eq!(aggregated.records.len(), 6);
    assert!(aggregated.failures.is_empty());

    let found: Vec<_> = aggregated.records.iter().filter(|r| r.found).collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].container_number, "ABCD1234567");
    assert_eq!(found[0].terminal, Terminal::Oict);

    // The terminals that do not know a container still contribute a row.
    let misses = aggregated
        .records
        .iter()
        .filter(|r| r.container_number == "EFGH7654321")
        .count();
    assert_eq!(misses, 3);
}

#[tokio::test]
async fn found_records_survive_json_rendering() {
    let containers = vec!["ABCD1234567".to_string(), "EFGH7654321".to_string()];
    let engine = StatusEngine::new(checkers_for_two_containers());
    let aggregated = aggregate(engine.run(&containers).await);

    let json = report::render_json(&aggregated.records).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 6);

    let hit = rows
        .iter()
        .find(|r| r["found"] == true)
        .expect("one found record");
    assert_eq!(hit["container_number"], "ABCD1234567");
    assert_eq!(hit["available"], "available");
}

#[tokio::test]
async fn one_failing_terminal_does_not_poison_the_rest() {
    let containers = vec!["ABCD1234567".to_string()];
    let engine = StatusEngine::new(vec![
        Box::new(ScriptedChecker::failing(Terminal::Ste, "gateway timeout"))
            as Box<dyn TerminalChecker>,
        Box::new(ScriptedChecker::new(Terminal::Oict).with_container(oict_hit("ABCD1234567"))),
    ]);
    let aggregated = aggregate(engine.run(&containers).await);

    assert_eq!(aggregated.records.len(), 1);
    assert_eq!(aggregated.failures.len(), 1);
    assert_eq!(aggregated.failures[0].0, Terminal::Ste);
    assert!(!aggregated.is_total_failure());
}

#[tokio::test]
async fn all_terminals_failing_is_a_total_failure() {
    let containers = vec!["ABCD1234567".to_string()];
    let engine = StatusEngine::new(vec![
        Box::new(ScriptedChecker::failing(Terminal::Trapac, "down")) as Box<dyn TerminalChecker>,
        Box::new(ScriptedChecker::failing(Terminal::Ste, "down")),
        Box::new(ScriptedChecker::failing(Terminal::Oict, "down")),
    ]);
    let aggregated = aggregate(engine.run(&containers).await);

    assert!(aggregated.records.is_empty());
    assert!(aggregated.is_total_failure());
}
