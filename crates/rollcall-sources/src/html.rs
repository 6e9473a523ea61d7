//! Just-enough HTML helpers for listing pages.
//!
//! Listing tables are regular enough that a tag scanner beats a full DOM:
//! find the marked tables, walk their rows, strip tags from the cells.

fn to_lower(s: &str) -> String {
  s.chars()
    .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
    .collect()
}

/// Extract the inner HTML of every `<table>` whose class attribute
/// contains one of `markers`.
pub fn tables_with_class<'a>(html: &'a str, markers: &[&str]) -> Vec<&'a str> {
  let lower = to_lower(html);
  let mut out = Vec::new();
  let mut from = 0usize;

  while let Some(rel) = lower[from..].find("<table") {
    let start = from + rel;
    let Some(tag_end) = lower[start..].find('>').map(|i| start + i + 1) else {
      break;
    };
    let Some(close_rel) = lower[tag_end..].find("</table") else {
      break;
    };
    let end = tag_end + close_rel;

    let open_tag = &lower[start..tag_end];
    if markers.iter().any(|m| open_tag.contains(m)) {
      out.push(&html[tag_end..end]);
    }
    from = end;
  }
  out
}

/// Split table HTML into row bodies (`<tr>` inner HTML).
pub fn rows(table: &str) -> Vec<&str> {
  blocks(table, "<tr", "</tr")
}

/// Split row HTML into tag-stripped cell texts (`<td>` and `<th>`).
pub fn cells(row: &str) -> Vec<String> {
  let mut out: Vec<(usize, String)> = blocks(row, "<td", "</td")
    .into_iter()
    .map(|b| (offset_in(row, b), strip_tags(b)))
    .collect();
  out.extend(
    blocks(row, "<th", "</th")
      .into_iter()
      .map(|b| (offset_in(row, b), strip_tags(b))),
  );
  out.sort_by_key(|(pos, _)| *pos);
  out.into_iter().map(|(_, text)| text).collect()
}

fn offset_in(outer: &str, inner: &str) -> usize {
  inner.as_ptr() as usize - outer.as_ptr() as usize
}

/// Inner HTML of every `open…close` block, case-insensitive.
fn blocks<'a>(html: &'a str, open: &str, close: &str) -> Vec<&'a str> {
  let lower = to_lower(html);
  let mut out = Vec::new();
  let mut from = 0usize;

  while let Some(rel) = lower[from..].find(open) {
    let start = from + rel;
    // Reject prefix matches like `<thead` for `<th`.
    let after = lower.as_bytes().get(start + open.len()).copied();
    if !matches!(after, Some(b'>') | Some(b' ') | Some(b'\n') | Some(b'\t')) {
      from = start + open.len();
      continue;
    }
    let Some(tag_end) = lower[start..].find('>').map(|i| start + i + 1) else {
      break;
    };
    let Some(close_rel) = lower[tag_end..].find(close) else {
      break;
    };
    let end = tag_end + close_rel;
    out.push(&html[tag_end..end]);
    from = end;
  }
  out
}

/// Drop tags, decode the common entities, collapse whitespace.
pub fn strip_tags(s: &str) -> String {
  let mut text = String::with_capacity(s.len());
  let mut in_tag = false;
  for ch in s.chars() {
    match ch {
      '<' => in_tag = true,
      '>' => in_tag = false,
      _ if !in_tag => text.push(ch),
      _ => {}
    }
  }

  let text = text
    .replace("&amp;", "&")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&nbsp;", " ");

  normalize_ws(&text)
}

fn normalize_ws(s: &str) -> String {
  s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE: &str = r#"
    <html><body>
    <table class="infobox"><tr><td>ignore me</td></tr></table>
    <table class="wikitable sortable">
      <tr><th>District</th><th>Incumbent</th><th>Candidates</th></tr>
      <tr>
        <td>District 1</td>
        <td>A.&nbsp;Smith</td>
        <td>A. Smith (R) vs. B. Jones (D)</td>
      </tr>
      <tr><td>District 2</td><td>Vacant</td><td>C. Lee (unopposed)</td></tr>
    </table>
    </body></html>"#;

  #[test]
  fn only_marked_tables_are_extracted() {
    let tables = tables_with_class(PAGE, &["wikitable", "bptable"]);
    assert_eq!(tables.len(), 1);
    assert!(tables[0].contains("District 1"));
  }

  #[test]
  fn rows_and_cells_come_back_in_order() {
    let tables = tables_with_class(PAGE, &["wikitable"]);
    let rows = rows(tables[0]);
    assert_eq!(rows.len(), 3);

    let header = cells(rows[0]);
    assert_eq!(header, vec!["District", "Incumbent", "Candidates"]);

    let first = cells(rows[1]);
    assert_eq!(first[0], "District 1");
    assert_eq!(first[1], "A. Smith");
    assert_eq!(first[2], "A. Smith (R) vs. B. Jones (D)");
  }

  #[test]
  fn strip_tags_decodes_entities_and_collapses_whitespace() {
    assert_eq!(
      strip_tags("<a href=\"x\">Smith&nbsp;&amp;\n  Jones</a>"),
      "Smith & Jones"
    );
  }
}
