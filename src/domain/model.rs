use serde::{Deserialize, Serialize};

/// Units stocked per pallet in the warehouse; WMS totals derive from this.
pub const UNITS_PER_PALLET: u32 = 60;

/// Containers per submission on the Trapac quick-check form.
pub const TRAPAC_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terminal {
    Trapac,
    Oict,
    Ste,
}

impl Terminal {
    pub const ALL: [Terminal; 3] = [Terminal::Trapac, Terminal::Ste, Terminal::Oict];

    pub fn display_name(&self) -> &'static str {
        match self {
            Terminal::Trapac => "Trapac",
            Terminal::Oict => "Oakland International",
            Terminal::Ste => "Shippers Transport",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Terminal::Trapac => {
                "https://oakland.trapac.com/quick-check/?terminal=OAK&transaction=availability"
            }
            Terminal::Oict => "https://b58.tideworks.com/",
            Terminal::Ste => "https://sto.tideworks.com",
        }
    }
}

impl std::fmt::Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Terminal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trapac" => Ok(Terminal::Trapac),
            "oict" => Ok(Terminal::Oict),
            "ste" | "sto" => Ok(Terminal::Ste),
            other => Err(format!("unknown terminal: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Delivered,
    NotAvailable,
    Unknown,
}

impl Availability {
    /// Derive availability from the hold columns and location, the way the
    /// terminal portals present it: delivered wins, otherwise available only
    /// when every hold is released (or absent) and the terminal hold is none.
    pub fn derive(
        location: &str,
        customs_hold: &str,
        line_hold: &str,
        cbpa_hold: &str,
        terminal_hold: &str,
    ) -> Availability {
        if location.contains("Delivered") {
            return Availability::Delivered;
        }
        let released = |hold: &str| hold.is_empty() || hold.eq_ignore_ascii_case("released");
        let none = |hold: &str| hold.is_empty() || hold.eq_ignore_ascii_case("none");
        if released(customs_hold) && released(line_hold) && released(cbpa_hold) && none(terminal_hold)
        {
            Availability::Available
        } else {
            Availability::NotAvailable
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Availability::Available => "Available",
            Availability::Delivered => "Delivered",
            Availability::NotAvailable => "Not Available",
            Availability::Unknown => "",
        };
        f.write_str(s)
    }
}

/// Result of querying one container at one terminal. Identity is
/// (container_number, terminal); not-found lookups still produce a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub container_number: String,
    pub terminal: Terminal,
    pub found: bool,
    pub available: Availability,
    pub line_operator: String,
    pub dimensions: String,
    pub customs_hold: String,
    pub line_hold: String,
    pub cbpa_hold: String,
    pub terminal_hold: String,
    pub location: String,
}

impl ContainerStatus {
    pub fn not_found(container_number: impl Into<String>, terminal: Terminal) -> Self {
        ContainerStatus {
            container_number: container_number.into(),
            terminal,
            found: false,
            available: Availability::Unknown,
            line_operator: String::new(),
            dimensions: String::new(),
            customs_hold: String::new(),
            line_hold: String::new(),
            cbpa_hold: String::new(),
            terminal_hold: String::new(),
            location: String::new(),
        }
    }
}

/// One terminal's outcome for a run. A failed terminal carries its error so
/// the aggregate can report it without suppressing the other terminals.
#[derive(Debug)]
pub struct TerminalReport {
    pub terminal: Terminal,
    pub outcome: crate::utils::error::Result<Vec<ContainerStatus>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inbound" | "in" => Ok(Direction::Inbound),
            "outbound" | "out" => Ok(Direction::Outbound),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// One container movement to transcribe into the WMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub container: String,
    pub direction: Direction,
    /// Required-by date for outbound orders, `DD-MMM-YY`. Inbound receipts
    /// use today's date and may leave this empty.
    #[serde(default)]
    pub date: String,
    pub product: String,
    pub pallets: u32,
}

impl TransactionRecord {
    pub fn total_units(&self) -> u32 {
        self.pallets * UNITS_PER_PALLET
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Submitted,
    SkippedDuplicate,
    Failed(String),
}

impl std::fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionOutcome::Submitted => f.write_str("submitted"),
            SubmissionOutcome::SkippedDuplicate => f.write_str("skipped-duplicate"),
            SubmissionOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug)]
pub struct RecordResult {
    pub container: String,
    pub direction: Direction,
    pub outcome: SubmissionOutcome,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub submitted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.submitted + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_prefers_delivered() {
        let a = Availability::derive("Delivered 01/02", "Released", "", "", "None");
        assert_eq!(a, Availability::Delivered);
    }

    #[test]
    fn availability_requires_all_holds_clear() {
        assert_eq!(
            Availability::derive("Yard B4", "Released", "released", "", "None"),
            Availability::Available
        );
        assert_eq!(
            Availability::derive("Yard B4", "HOLD", "released", "", "None"),
            Availability::NotAvailable
        );
        assert_eq!(
            Availability::derive("Yard B4", "", "", "", "Demurrage"),
            Availability::NotAvailable
        );
    }

    #[test]
    fn units_derive_from_pallets() {
        let record = TransactionRecord {
            container: "ABCD1234567".into(),
            direction: Direction::Inbound,
            date: String::new(),
            product: "PN-100".into(),
            pallets: 22,
        };
        assert_eq!(record.total_units(), 1320);
    }

    #[test]
    fn terminal_parses_short_names() {
        assert_eq!("trapac".parse::<Terminal>().unwrap(), Terminal::Trapac);
        assert_eq!("STE".parse::<Terminal>().unwrap(), Terminal::Ste);
        assert!("lbct".parse::<Terminal>().is_err());
    }
}
