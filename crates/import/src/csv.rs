use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The fixed logical columns the rest of the pipeline operates on, regardless
/// of what the uploaded file calls them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    Date,
    Name,
    AmountCad,
    AmountUsd,
    CategoryId,
    Notes,
    Type,
}

impl CanonicalField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "date" => Some(CanonicalField::Date),
            "name" => Some(CanonicalField::Name),
            "amountcad" => Some(CanonicalField::AmountCad),
            "amountusd" => Some(CanonicalField::AmountUsd),
            "categoryid" | "category" => Some(CanonicalField::CategoryId),
            "notes" => Some(CanonicalField::Notes),
            "type" => Some(CanonicalField::Type),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::Date => "date",
            CanonicalField::Name => "name",
            CanonicalField::AmountCad => "amountCAD",
            CanonicalField::AmountUsd => "amountUSD",
            CanonicalField::CategoryId => "categoryId",
            CanonicalField::Notes => "notes",
            CanonicalField::Type => "type",
        }
    }
}

/// User-supplied translation from the file's header text to canonical field
/// names, e.g. `{"Transaction Date": "date", "Desc": "name"}`. Lookup is
/// case-insensitive on both sides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderMapping(pub HashMap<String, String>);

impl HeaderMapping {
    pub fn resolve(&self, header: &str) -> Option<CanonicalField> {
        let wanted = header.trim().to_lowercase();
        self.0
            .iter()
            .find(|(from, _)| from.trim().to_lowercase() == wanted)
            .and_then(|(_, to)| CanonicalField::from_name(to))
    }
}

/// One data line of the CSV, still as raw strings. `row` is the 1-based data
/// row number (header excluded), used for error reporting downstream.
#[derive(Debug, Clone)]
pub struct ImportRow {
    pub row: usize,
    fields: HashMap<CanonicalField, String>,
}

impl ImportRow {
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }
}

#[derive(Debug, Error)]
pub enum MalformedCsvError {
    #[error("CSV file is empty or has no header row")]
    MissingHeader,
    #[error("CSV header contains no recognizable columns")]
    NoRecognizedColumns,
    #[error("CSV read error: {0}")]
    Read(#[from] csv::Error),
}

/// Split raw CSV text into `ImportRow`s.
///
/// The first non-blank line is always the header; its cells are translated
/// through `mapping` first, then matched against the canonical names.
/// Unrecognized columns are carried nowhere. A data row that fails to parse as
/// CSV (e.g. a broken quote) still yields an `ImportRow` with no fields so the
/// validator can report the right row number instead of the whole upload
/// failing.
pub fn parse_rows(
    text: &str,
    mapping: Option<&HeaderMapping>,
) -> Result<Vec<ImportRow>, MalformedCsvError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    // First non-blank record is the header.
    let header = loop {
        match records.next() {
            Some(Ok(rec)) if is_blank(&rec) => continue,
            Some(Ok(rec)) => break rec,
            Some(Err(e)) => return Err(MalformedCsvError::Read(e)),
            None => return Err(MalformedCsvError::MissingHeader),
        }
    };

    let columns: Vec<Option<CanonicalField>> = header
        .iter()
        .map(|h| {
            mapping
                .and_then(|m| m.resolve(h))
                .or_else(|| CanonicalField::from_name(h))
        })
        .collect();

    if columns.iter().all(Option::is_none) {
        return Err(MalformedCsvError::NoRecognizedColumns);
    }

    let mut rows = Vec::new();
    let mut row_number = 0usize;

    for result in records {
        match result {
            Ok(record) => {
                if is_blank(&record) {
                    continue;
                }
                row_number += 1;
                let mut fields = HashMap::new();
                for (idx, field) in columns.iter().enumerate() {
                    if let (Some(canonical), Some(value)) = (field, record.get(idx)) {
                        fields.insert(*canonical, value.to_string());
                    }
                }
                rows.push(ImportRow {
                    row: row_number,
                    fields,
                });
            }
            Err(_) => {
                // Defer to the validator: an empty row fails its first check
                // with the correct row number attached.
                row_number += 1;
                rows.push(ImportRow {
                    row: row_number,
                    fields: HashMap::new(),
                });
            }
        }
    }

    Ok(rows)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}
