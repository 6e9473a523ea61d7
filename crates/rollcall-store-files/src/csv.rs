//! Minimal RFC-4180 row codec (quotes + CRLF tolerant).

/// Parse CSV text into rows of cells. Blank lines are skipped.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
  let mut rows = Vec::new();
  let mut row: Vec<String> = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut chars = text.chars().peekable();

  while let Some(ch) = chars.next() {
    match ch {
      '"' => {
        if in_quotes {
          if matches!(chars.peek(), Some('"')) {
            chars.next(); // double-quote escape
            field.push('"');
          } else {
            in_quotes = false;
          }
        } else {
          in_quotes = true;
        }
      }
      ',' if !in_quotes => {
        row.push(std::mem::take(&mut field));
      }
      '\n' | '\r' if !in_quotes => {
        if ch == '\r' && matches!(chars.peek(), Some('\n')) {
          chars.next();
        }
        row.push(std::mem::take(&mut field));
        if !(row.len() == 1 && row[0].is_empty()) {
          rows.push(std::mem::take(&mut row));
        } else {
          row.clear();
        }
      }
      _ => field.push(ch),
    }
  }

  // Flush a trailing row without a final newline.
  if !field.is_empty() || !row.is_empty() {
    row.push(field);
    rows.push(row);
  }

  rows
}

fn needs_quotes(cell: &str) -> bool {
  cell.contains(',')
    || cell.contains('"')
    || cell.contains('\n')
    || cell.contains('\r')
}

/// Append one encoded row (with trailing newline) to `out`.
pub fn write_row(out: &mut String, row: &[String]) {
  let mut first = true;
  for cell in row {
    if !first {
      out.push(',');
    }
    first = false;
    if needs_quotes(cell) {
      out.push('"');
      out.push_str(&cell.replace('"', "\"\""));
      out.push('"');
    } else {
      out.push_str(cell);
    }
  }
  out.push('\n');
}
