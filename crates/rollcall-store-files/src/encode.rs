//! Record ⇄ file-format encoding.
//!
//! The tabular column order and the structured field order are the same;
//! the two files must round-trip to the same logical record set.

use chrono::{DateTime, Utc};
use rollcall_core::{ElectionRecord, RecordSet};

use crate::{csv, Error, Result};

/// Tabular column order. Matches the serde field order of
/// [`ElectionRecord`].
pub const HEADER: [&str; 10] = [
  "location",
  "region",
  "office",
  "district",
  "period",
  "partisan_lean",
  "contested",
  "incumbent",
  "source_reference",
  "last_updated",
];

fn encode_row(record: &ElectionRecord) -> Vec<String> {
  vec![
    record.location.clone(),
    record.region.to_string(),
    record.office.to_string(),
    record.district.clone(),
    record.period.to_string(),
    record
      .partisan_lean
      .map(|v| v.to_string())
      .unwrap_or_default(),
    record.contested.to_string(),
    record.incumbent.clone().unwrap_or_default(),
    record.source_reference.clone(),
    record.last_updated.to_rfc3339(),
  ]
}

fn decode_row(row: &[String], line: usize) -> Result<ElectionRecord> {
  let cell_err = |message: String| Error::Csv { line, message };

  if row.len() != HEADER.len() {
    return Err(cell_err(format!(
      "expected {} columns, found {}",
      HEADER.len(),
      row.len()
    )));
  }

  Ok(ElectionRecord {
    location:         row[0].clone(),
    region:           row[1].parse().map_err(|e| cell_err(format!("{e}")))?,
    office:           row[2].parse().expect("office parsing is infallible"),
    district:         row[3].clone(),
    period:           row[4].parse().map_err(|e| cell_err(format!("{e}")))?,
    partisan_lean:    if row[5].is_empty() {
      None
    } else {
      Some(
        row[5]
          .parse::<f64>()
          .map_err(|e| cell_err(format!("bad partisan_lean: {e}")))?,
      )
    },
    contested:        row[6]
      .parse::<bool>()
      .map_err(|e| cell_err(format!("bad contested flag: {e}")))?,
    incumbent:        (!row[7].is_empty()).then(|| row[7].clone()),
    source_reference: row[8].clone(),
    last_updated:     DateTime::parse_from_rfc3339(&row[9])
      .map_err(|e| cell_err(format!("bad last_updated: {e}")))?
      .with_timezone(&Utc),
  })
}

/// Render the full tabular file, header included, rows in set order.
pub fn to_csv(records: &RecordSet) -> String {
  let mut out = String::new();
  csv::write_row(
    &mut out,
    &HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
  );
  for record in records.iter() {
    csv::write_row(&mut out, &encode_row(record));
  }
  out
}

/// Parse the full tabular file. The header row is validated, not trusted.
pub fn from_csv(text: &str) -> Result<Vec<ElectionRecord>> {
  let rows = csv::parse_rows(text);
  let Some((header, body)) = rows.split_first() else {
    return Ok(Vec::new());
  };

  if header != &HEADER {
    return Err(Error::Csv {
      line:    1,
      message: format!("unexpected header: {header:?}"),
    });
  }

  body
    .iter()
    .enumerate()
    .map(|(i, row)| decode_row(row, i + 2))
    .collect()
}

/// Render the full structured file: a pretty-printed array of objects,
/// nulls explicit, rows in set order, trailing newline.
pub fn to_json(records: &RecordSet) -> Result<String> {
  let all: Vec<&ElectionRecord> = records.iter().collect();
  let mut out = serde_json::to_string_pretty(&all)?;
  out.push('\n');
  Ok(out)
}

pub fn from_json(text: &str) -> Result<Vec<ElectionRecord>> {
  Ok(serde_json::from_str(text)?)
}
