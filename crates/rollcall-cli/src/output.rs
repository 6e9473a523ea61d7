//! Human-readable terminal output.

use rollcall_core::{ElectionRecord, QueryStats, RunSummary};

const RULE: &str =
  "============================================================";

pub fn print_summary(summary: &RunSummary) {
  println!();
  println!("Scrape finished{}", if summary.cancelled { " (cancelled)" } else { "" });
  println!("  Rows fetched:   {}", summary.fetched);
  println!("  Rejected rows:  {}", summary.rejected);
  println!("  Inserted:       {}", summary.inserted);
  println!("  Updated:        {}", summary.updated);
  println!("  Unchanged:      {}", summary.unchanged);

  if !summary.faults.is_empty() {
    println!("  Fetch faults:");
    for fault in &summary.faults {
      println!("    - {fault}");
    }
  }
}

pub fn print_stats(stats: &QueryStats) {
  println!();
  println!("{RULE}");
  println!("ELECTION TRACKER STATISTICS");
  println!("{RULE}");
  println!("Total elections tracked: {}", stats.total);
  println!("Contested races:         {}", stats.contested);
  println!("Uncontested races:       {}", stats.uncontested);
  println!("Regions covered:         {}", stats.by_region.len());
  println!("Office types tracked:    {}", stats.offices);
  if let Some(mean) = stats.mean_lean {
    println!("Average partisan lean:   {mean:+.2}");
  }
  println!("{RULE}");
}

/// Print the first `limit` matches the way the query subcommand reports
/// them.
pub fn print_matches(matches: &[ElectionRecord], limit: usize) {
  println!();
  println!("Found {} matching elections:", matches.len());
  println!();

  for (i, record) in matches.iter().take(limit).enumerate() {
    println!("{}. {}", i + 1, record.location);
    println!("   Date: {}", record.period.approx_date());
    match record.partisan_lean {
      Some(lean) => println!("   Lean: {lean:+.1}"),
      None => println!("   Lean: N/A"),
    }
    println!(
      "   Contested: {}",
      if record.contested { "Yes" } else { "No" }
    );
    if let Some(incumbent) = &record.incumbent {
      println!("   Incumbent: {incumbent}");
    }
    println!();
  }

  if matches.len() > limit {
    println!("... and {} more results", matches.len() - limit);
  }
}
