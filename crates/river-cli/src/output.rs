use river_core::Envelope;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Record columns shown by the table format, in display order.
const RECORD_COLUMNS: &[&str] = &[
    "date",
    "close_price",
    "per",
    "pbr",
    "eps",
    "pe_mean",
    "pe_std",
    "river_low_2sd",
    "river_low_1sd",
    "river_mean",
    "river_high_1sd",
    "river_high_2sd",
];

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Ndjson => {
            let payload = serde_json::to_string(envelope)?;
            println!("{payload}");
        }
        OutputFormat::Table => render_table(envelope)?,
    }

    Ok(())
}

fn render_table(envelope: &Envelope<Value>) -> Result<(), CliError> {
    println!("request_id  : {}", envelope.meta.request_id);
    println!("schema      : {}", envelope.meta.schema_version);
    let generated_at = envelope
        .meta
        .generated_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| envelope.meta.generated_at.to_string());
    println!("generated_at: {generated_at}");
    println!("source      : {}", envelope.meta.source);
    println!("latency_ms  : {}", envelope.meta.latency_ms);

    if !envelope.meta.warnings.is_empty() {
        println!("warnings:");
        for warning in &envelope.meta.warnings {
            println!("  - {warning}");
        }
    }

    if let Some(records) = envelope.data.get("records").and_then(Value::as_array) {
        for line in record_table(records) {
            println!("{line}");
        }
    } else {
        println!("data:");
        let pretty_data = serde_json::to_string_pretty(&envelope.data)?;
        for line in pretty_data.lines() {
            println!("  {line}");
        }
    }

    if !envelope.errors.is_empty() {
        println!("errors:");
        for error in &envelope.errors {
            println!("  - {}: {}", error.code, error.message);
        }
    }

    Ok(())
}

/// Right-aligned column layout over the known record fields present in the data.
fn record_table(records: &[Value]) -> Vec<String> {
    let Some(first) = records.first() else {
        return vec![String::from("(no records)")];
    };
    let columns: Vec<&str> = RECORD_COLUMNS
        .iter()
        .copied()
        .filter(|column| first.get(column).is_some())
        .collect();

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| format_cell(record.get(column)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .map(|row| row[index].len())
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let join = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:>width$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(join(columns.iter().map(|c| c.to_string()).collect()));
    lines.extend(rows.into_iter().map(join));
    lines
}

fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::from("-"),
        Some(Value::Number(number)) => match number.as_f64() {
            Some(value) => format!("{value:.2}"),
            None => number.to_string(),
        },
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cells_render_nulls_as_dash_and_numbers_with_two_decimals() {
        assert_eq!(format_cell(None), "-");
        assert_eq!(format_cell(Some(&Value::Null)), "-");
        assert_eq!(format_cell(Some(&json!(10.5))), "10.50");
        assert_eq!(format_cell(Some(&json!("2024-01-02"))), "2024-01-02");
    }

    #[test]
    fn table_uses_only_columns_present_in_records() {
        let records = vec![
            json!({"date": "2024-01-02", "close_price": 100.0, "per": 10.0, "pbr": 1.0, "eps": 10.0}),
            json!({"date": "2024-01-03", "close_price": 1100.0, "per": 11.0, "pbr": 1.0, "eps": 100.0}),
        ];
        let lines = record_table(&records);

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("close_price"));
        assert!(!lines[0].contains("river_mean"));
        assert!(lines[2].contains("1100.00"));
        assert!(lines.iter().all(|line| line.len() == lines[0].len()));
    }

    #[test]
    fn empty_records_have_a_placeholder() {
        assert_eq!(record_table(&[]), vec![String::from("(no records)")]);
    }
}
