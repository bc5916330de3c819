//! Catalog loading from a JSON export of the library spreadsheet
//!
//! Accepts either an array of row arrays (raw sheet, possibly with
//! decorative rows above the real header) or an array of objects keyed by
//! column name.

use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

use super::{fields, Catalog, RecordIndexer};
use crate::context::normalize;
use crate::errors::{AppError, Result};

/// Header cells that identify the real header row of the sheet.
const HEADER_MARKERS: &[&str] = &["título", "titulo", "autor", "title", "author"];

/// Read and index the catalog at `path`.
pub fn load_catalog(
    path: impl AsRef<Path>,
    indexer: &RecordIndexer,
    header_scan_rows: usize,
) -> Result<Catalog> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let raw = std::fs::read_to_string(path).map_err(|e| AppError::CatalogLoad {
        path: shown.clone(),
        message: e.to_string(),
    })?;

    let catalog = parse_catalog(&raw, indexer, header_scan_rows).map_err(|e| match e {
        AppError::InvalidFormat { message } | AppError::Internal { message } => {
            AppError::CatalogLoad {
                path: shown.clone(),
                message,
            }
        }
        AppError::Serialization(err) => AppError::CatalogLoad {
            path: shown.clone(),
            message: err.to_string(),
        },
        other => other,
    })?;

    info!(path = %shown, records = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

/// Parse and index a catalog from JSON text.
pub fn parse_catalog(raw: &str, indexer: &RecordIndexer, header_scan_rows: usize) -> Result<Catalog> {
    let value: Value = serde_json::from_str(raw)?;

    let Value::Array(rows) = value else {
        return Err(AppError::InvalidFormat {
            message: "catalog must be a JSON array of rows or objects".to_string(),
        });
    };

    let table = match rows.first() {
        None => Vec::new(),
        Some(Value::Array(_)) => rows_from_grid(&rows, header_scan_rows)?,
        Some(Value::Object(_)) => rows_from_objects(&rows)?,
        Some(other) => {
            return Err(AppError::InvalidFormat {
                message: format!("unexpected row type: {}", kind_of(other)),
            })
        }
    };

    Ok(Catalog::from_rows(table, indexer))
}

/// Map a spreadsheet column header to a canonical field name.
pub fn canonical_field(header: &str) -> String {
    let folded = normalize(header);
    let words: Vec<&str> = folded.split_whitespace().collect();
    let has = |needle: &str| words.iter().any(|w| w.starts_with(needle));

    let canonical = if has("titulo") || has("title") {
        fields::TITLE
    } else if has("autor") || has("author") {
        fields::AUTHOR
    } else if has("resumo") || has("summary") || has("sinopse") {
        fields::SUMMARY
    } else if has("categoria") || has("category") {
        fields::CATEGORY
    } else if has("editora") || has("publisher") {
        fields::PUBLISHER
    } else if words == ["ano"] || has("year") {
        fields::YEAR
    } else if words == ["cdd"] || words == ["ddc"] {
        fields::DDC
    } else if has("chamada") || has("cutter") || (has("call") && has("number")) {
        fields::CALL_NUMBER
    } else if has("palavras") || has("keyword") || has("assunto") {
        fields::KEYWORDS
    } else {
        return words.join("_");
    };

    canonical.to_string()
}

fn rows_from_grid(rows: &[Value], header_scan_rows: usize) -> Result<Vec<Vec<(String, String)>>> {
    let grid: Vec<Vec<String>> = rows
        .iter()
        .map(|row| match row {
            Value::Array(cells) => Ok(cells.iter().map(cell_to_string).collect()),
            other => Err(AppError::InvalidFormat {
                message: format!("mixed row types: expected array, found {}", kind_of(other)),
            }),
        })
        .collect::<Result<_>>()?;

    let header_idx = find_header_row(&grid, header_scan_rows);
    debug!(header_row = header_idx, "Located catalog header row");

    let headers = &grid[header_idx];
    let columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| keep_column(header))
        .map(|(idx, header)| (idx, canonical_field(header)))
        .collect();

    if columns.is_empty() {
        return Err(AppError::InvalidFormat {
            message: "catalog header row has no usable columns".to_string(),
        });
    }

    let table: Vec<Vec<(String, String)>> = grid[header_idx + 1..]
        .iter()
        .map(|cells| {
            columns
                .iter()
                .map(|(idx, name)| {
                    let value = cells.get(*idx).cloned().unwrap_or_default();
                    (name.clone(), value)
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !is_blank_row(row))
        .collect();

    Ok(table)
}

fn rows_from_objects(rows: &[Value]) -> Result<Vec<Vec<(String, String)>>> {
    let mut table = Vec::with_capacity(rows.len());

    for row in rows {
        let Value::Object(map) = row else {
            return Err(AppError::InvalidFormat {
                message: format!("mixed row types: expected object, found {}", kind_of(row)),
            });
        };

        let fields = object_fields(map);
        if !is_blank_row(&fields) {
            table.push(fields);
        }
    }

    Ok(table)
}

fn object_fields(map: &Map<String, Value>) -> Vec<(String, String)> {
    map.iter()
        .filter(|(header, _)| keep_column(header))
        .map(|(header, value)| (canonical_field(header), cell_to_string(value)))
        .collect()
}

/// First row among the leading `scan` rows that carries a header marker,
/// or row 0 when none does.
fn find_header_row(grid: &[Vec<String>], scan: usize) -> usize {
    grid.iter()
        .take(scan.max(1))
        .position(|row| {
            row.iter().any(|cell| {
                let cell = cell.trim().to_lowercase();
                HEADER_MARKERS.contains(&cell.as_str())
            })
        })
        .unwrap_or_else(|| {
            warn!(scanned = scan, "No header marker found, using first row");
            0
        })
}

fn keep_column(header: &str) -> bool {
    let header = header.trim();
    !header.is_empty() && !header.starts_with("Unnamed")
}

fn is_blank_row(row: &[(String, String)]) -> bool {
    row.iter().all(|(_, value)| value.trim().is_empty())
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
