use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;

use super::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
    Pipe,
    AutoDetected,
}

pub const CANDIDATE_DELIMITERS: [Delimiter; 4] = [
    Delimiter::Comma,
    Delimiter::Semicolon,
    Delimiter::Tab,
    Delimiter::Pipe,
];

impl Delimiter {
    fn byte(&self) -> u8 {
        match self {
            Delimiter::Comma | Delimiter::AutoDetected => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
            Delimiter::Pipe => b'|',
        }
    }

    /// Reported back to the caller as `delimiter_used`.
    pub fn label(&self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Semicolon => ";",
            Delimiter::Tab => "\t",
            Delimiter::Pipe => "|",
            Delimiter::AutoDetected => "auto-detected",
        }
    }
}

/// Header plus string cells. Every row has exactly `headers.len()` cells;
/// an empty cell is a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[idx].as_str())
    }
}

/// Tries each candidate delimiter and keeps the first parse with more than
/// one column and at least one row. Falls back to the default comma dialect
/// with strict row widths.
pub fn read_table(text: &str) -> Result<(RawTable, Delimiter), IngestError> {
    for delimiter in CANDIDATE_DELIMITERS {
        match parse_delimited(text, delimiter.byte(), true) {
            Ok(table) if table.column_count() > 1 && table.row_count() > 0 => {
                log::debug!("Parsed CSV with delimiter {:?}", delimiter.label());
                return Ok((table, delimiter));
            }
            Ok(table) => log::debug!(
                "Delimiter {:?} gave {} columns and {} rows",
                delimiter.label(),
                table.column_count(),
                table.row_count()
            ),
            Err(e) => log::debug!("Failed with delimiter {:?}: {}", delimiter.label(), e),
        }
    }

    let table = parse_delimited(text, Delimiter::AutoDetected.byte(), false)?;
    log::debug!("Parsed CSV with auto-detection");
    Ok((table, Delimiter::AutoDetected))
}

/// In lenient mode short rows are padded with missing cells; rows longer than
/// the header are always an error.
fn parse_delimited(text: &str, delimiter: u8, lenient: bool) -> Result<RawTable, IngestError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(lenient)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = normalize_headers(
        reader
            .headers()
            .map_err(|e| IngestError::Unparsable(e.to_string()))?,
    );
    let width = headers.len();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::Unparsable(e.to_string()))?;
        // Whitespace-only lines survive the reader's blank-line skip as empty cells.
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(IngestError::Unparsable(format!(
                "Expected {} fields in line {}, saw {}",
                width,
                line,
                record.len()
            )));
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Blank header cells become `Unnamed: <index>`. Repeated names get `.1`,
/// `.2`, ... suffixes, skipping any suffix already taken by a literal header.
fn normalize_headers(raw: &StringRecord) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    raw.iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = name.trim();
            let mut name = if name.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name.to_string()
            };
            let mut count = counts.get(&name).copied().unwrap_or_default();
            while count > 0 {
                counts.insert(name.clone(), count + 1);
                name = format!("{name}.{count}");
                count = counts.get(&name).copied().unwrap_or_default();
            }
            counts.insert(name.clone(), 1);
            name
        })
        .collect()
}
