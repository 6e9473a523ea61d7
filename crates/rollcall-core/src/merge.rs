//! Identity & merge engine.
//!
//! Reconciles newly normalized records with the existing store under the
//! overwrite-only-on-non-null rule: a later scrape can refine a record but
//! can never erase a previously known optional field by supplying an
//! absent one. Merging an identical incoming set twice is a no-op on the
//! second pass.

use chrono::{DateTime, Utc};

use crate::record::{ElectionRecord, NewRecord, RecordSet};

/// Counts returned by [`merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
  pub inserted:  usize,
  pub updated:   usize,
  pub unchanged: usize,
}

/// Merge `incoming` into `set` in processing order.
///
/// Two incoming records with the same identity key within one call are not
/// an error: the later one wins, deterministically. `last_updated` is
/// stamped here, once per call, on every inserted or updated record.
pub fn merge(
  set: &mut RecordSet,
  incoming: impl IntoIterator<Item = NewRecord>,
) -> MergeStats {
  let now = Utc::now();
  let mut stats = MergeStats::default();

  for new in incoming {
    let key = new.identity_key();
    match set.get_mut(&key) {
      None => {
        set.insert(ElectionRecord::from_new(new, now));
        stats.inserted += 1;
      }
      Some(existing) => {
        if apply(existing, new, now) {
          stats.updated += 1;
        } else {
          stats.unchanged += 1;
        }
      }
    }
  }

  stats
}

/// Field-by-field overwrite. Returns true if anything changed.
///
/// Optional fields only move non-null → value; the period only moves when
/// the incoming precision is at least as good as the stored one, so a
/// year-only re-scrape never degrades a known calendar date.
fn apply(
  existing: &mut ElectionRecord,
  incoming: NewRecord,
  now: DateTime<Utc>,
) -> bool {
  let mut changed = false;

  if existing.location != incoming.location {
    existing.location = incoming.location;
    changed = true;
  }

  if existing.period != incoming.period
    && !(existing.period.is_day_precision()
      && !incoming.period.is_day_precision())
  {
    existing.period = incoming.period;
    changed = true;
  }

  if existing.contested != incoming.contested {
    existing.contested = incoming.contested;
    changed = true;
  }

  if let Some(lean) = incoming.partisan_lean {
    if existing.partisan_lean != Some(lean) {
      existing.partisan_lean = Some(lean);
      changed = true;
    }
  }

  if let Some(incumbent) = incoming.incumbent {
    if existing.incumbent.as_deref() != Some(incumbent.as_str()) {
      existing.incumbent = Some(incumbent);
      changed = true;
    }
  }

  if existing.source_reference != incoming.source_reference {
    existing.source_reference = incoming.source_reference;
    changed = true;
  }

  if changed {
    existing.last_updated = now;
  }
  changed
}
