//! CSV rendering of decision history.

use csv::{QuoteStyle, WriterBuilder};
use intelliclaim_core::HistoryEntry;

use crate::error::StoreError;

const HEADER: [&str; 6] = [
    "Timestamp",
    "Query",
    "Decision",
    "Amount",
    "Confidence",
    "Justification",
];

/// Render history as CSV: one header row, then one row per entry in order.
///
/// Every field is quoted, so commas, quotes and newlines inside queries or
/// justifications never change the row or column count.
pub fn history_to_csv(entries: &[HistoryEntry]) -> Result<String, StoreError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for entry in entries {
        let amount = format_amount(entry.amount);
        let confidence = format!("{:.1}%", entry.confidence * 100.0);
        writer.write_record([
            entry.timestamp.as_str(),
            entry.query.as_str(),
            entry.decision.as_str(),
            amount.as_str(),
            confidence.as_str(),
            entry.justification.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::Other(format!("csv flush failed: {}", e.error())))?;
    Ok(String::from_utf8(bytes)?)
}

/// Whole amounts print without a fractional part.
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        amount.to_string()
    }
}
