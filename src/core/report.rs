use crate::core::aggregate::AggregatedReport;
use crate::domain::model::ContainerStatus;
use crate::utils::error::Result;
use std::io::Write;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Csv,
    Json,
    #[default]
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            other => Err(format!("unknown output format: {} (csv|json|table)", other)),
        }
    }
}

pub fn render_csv(records: &[ContainerStatus]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn parse_csv(data: &str) -> Result<Vec<ContainerStatus>> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

pub fn render_json(records: &[ContainerStatus]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

const TABLE_HEADERS: [&str; 11] = [
    "Container", "Terminal", "Found", "Available", "Line Operator", "Dimensions", "Location",
    "Customs", "Line", "CBPA", "Terminal Hold",
];

pub fn render_table(records: &[ContainerStatus]) -> String {
    let rows: Vec<[String; 11]> = records
        .iter()
        .map(|r| {
            [
                r.container_number.clone(),
                r.terminal.display_name().to_string(),
                if r.found { "yes" } else { "NOT FOUND" }.to_string(),
                r.available.to_string(),
                r.line_operator.clone(),
                r.dimensions.clone(),
                r.location.clone(),
                r.customs_hold.clone(),
                r.line_hold.clone(),
                r.cbpa_hold.clone(),
                r.terminal_hold.clone(),
            ]
        })
        .collect();

    let mut widths: [usize; 11] = TABLE_HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    let format_row = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| format!("{:<width$}", cell, width = w))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let header: Vec<String> = TABLE_HEADERS.iter().map(|h| h.to_string()).collect();
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut lines = vec![format_row(&header), format_row(&separator)];
    lines.extend(rows.iter().map(|r| format_row(r)));
    lines.join("\n")
}

/// Render the aggregated report and write it to `output_file` or stdout.
/// Terminal failures go to stderr so they never corrupt machine-readable
/// output.
pub fn write_report(
    report: &AggregatedReport,
    format: OutputFormat,
    output_file: Option<&Path>,
) -> Result<()> {
    let rendered = match format {
        OutputFormat::Csv => render_csv(&report.records)?,
        OutputFormat::Json => render_json(&report.records)?,
        OutputFormat::Table => render_table(&report.records),
    };

    match output_file {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            file.write_all(rendered.as_bytes())?;
            writeln!(file)?;
            info!(path = %path.display(), "results exported");
            println!("\nResults exported to {}", path.display());
        }
        None => println!("\n{}", rendered),
    }

    for (terminal, reason) in &report.failures {
        eprintln!("warning: {} failed: {}", terminal, reason);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Availability, Terminal};

    fn sample() -> ContainerStatus {
        ContainerStatus {
            container_number: "ABCD1234567".into(),
            terminal: Terminal::Oict,
            found: true,
            available: Availability::Available,
            line_operator: "MSC".into(),
            dimensions: "40HC".into(),
            customs_hold: "Released".into(),
            line_hold: "Released".into(),
            cbpa_hold: String::new(),
            terminal_hold: "None".into(),
            location: "Yard B4".into(),
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let csv = render_csv(&[sample(), sample()]).unwrap();
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("container_number"));
        assert!(lines[1].contains("ABCD1234567"));
    }

    #[test]
    fn csv_round_trips_field_values() {
        let original = vec![
            sample(),
            ContainerStatus::not_found("EFGH7654321", Terminal::Ste),
        ];
        let csv = render_csv(&original).unwrap();
        let parsed = parse_csv(&csv).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn json_is_an_array_of_records() {
        let json = render_json(&[sample()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["container_number"], "ABCD1234567");
        assert_eq!(value[0]["available"], "available");
    }

    #[test]
    fn table_aligns_columns() {
        let table = render_table(&[sample()]);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("Container"));
        assert!(lines[1].starts_with("---------"));
        assert!(lines[2].contains("ABCD1234567"));
        // header and separator line up
        assert_eq!(
            lines[0].find("Terminal").unwrap(),
            lines[2].find("Oakland International").unwrap()
        );
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
