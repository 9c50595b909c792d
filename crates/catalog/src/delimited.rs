use csv::ReaderBuilder;

use crate::record::{RawRecord, RawValue};

/// Parses comma-separated text with a header row into raw records.
///
/// Rows shorter than two cells or with every cell empty are skipped. Header
/// names are matched case-insensitively.
pub fn parse_delimited(text: &str) -> csv::Result<Vec<RawRecord>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let mut out = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.len() < 2 || row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let mut record = RawRecord::new();
        for (name, cell) in headers.iter().zip(row.iter()) {
            if name.is_empty() {
                continue;
            }
            record.insert(name, RawValue::Text(cell.to_string()));
        }
        out.push(record);
    }
    Ok(out)
}
