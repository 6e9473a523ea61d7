//! Integration tests for `FileStore` against temporary directories.

use chrono::{TimeZone, Utc};
use rollcall_core::{
  record::{display_location, Office, Period},
  ElectionRecord, ElectionStore, RecordSet, Region,
};
use tempfile::tempdir;

use crate::{encode, Error, FileStore};

fn record(region: &str, district: &str, hour: u32) -> ElectionRecord {
  let region: Region = region.parse().unwrap();
  let office = Office::StateSenate;
  ElectionRecord {
    location:         display_location(&region, &office, district),
    district:         district.to_string(),
    period:           Period::Year(2026),
    partisan_lean:    None,
    contested:        true,
    incumbent:        None,
    source_reference: "https://example.org".to_string(),
    last_updated:     Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap(),
    region,
    office,
  }
}

fn sample_set() -> RecordSet {
  let mut dated = record("VA", "1", 0);
  dated.period = "2025-11-04".parse().unwrap();
  dated.partisan_lean = Some(-2.5);
  dated.incumbent = Some("Jane Doe".to_string());

  [dated, record("TX", "7", 0), record("CA", "12", 0)]
    .into_iter()
    .collect()
}

#[tokio::test]
async fn missing_files_load_as_empty_set() {
  let dir = tempdir().unwrap();
  let store = FileStore::new(dir.path());
  assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn save_then_load_roundtrips_both_precisions_and_nulls() {
  let dir = tempdir().unwrap();
  let store = FileStore::new(dir.path());

  let set = sample_set();
  store.save(&set).await.unwrap();

  let loaded = store.load().await.unwrap();
  assert_eq!(loaded, set);
}

#[tokio::test]
async fn save_load_save_is_byte_stable() {
  let dir = tempdir().unwrap();
  let store = FileStore::new(dir.path());

  store.save(&sample_set()).await.unwrap();
  let csv_before = std::fs::read_to_string(store.csv_path()).unwrap();
  let json_before = std::fs::read_to_string(store.json_path()).unwrap();

  let loaded = store.load().await.unwrap();
  store.save(&loaded).await.unwrap();

  assert_eq!(std::fs::read_to_string(store.csv_path()).unwrap(), csv_before);
  assert_eq!(
    std::fs::read_to_string(store.json_path()).unwrap(),
    json_before
  );
}

#[tokio::test]
async fn duplicate_rows_keep_the_later_last_updated() {
  let dir = tempdir().unwrap();
  let store = FileStore::new(dir.path());

  let older = record("VA", "1", 1);
  let mut newer = record("VA", "1", 9);
  newer.incumbent = Some("A. Smith".to_string());

  // Hand-write both files with the duplicate pair, as an external edit
  // would leave them.
  let mut csv = encode::to_csv(&[older.clone()].into_iter().collect());
  let dup_only = encode::to_csv(&[newer.clone()].into_iter().collect());
  csv.push_str(dup_only.lines().nth(1).unwrap());
  csv.push('\n');
  std::fs::write(store.csv_path(), &csv).unwrap();

  let json =
    serde_json::to_string_pretty(&vec![older.clone(), newer.clone()]).unwrap();
  std::fs::write(store.json_path(), json).unwrap();

  let loaded = store.load().await.unwrap();
  assert_eq!(loaded.len(), 1);
  let kept = loaded.iter().next().unwrap();
  assert_eq!(kept.incumbent.as_deref(), Some("A. Smith"));
  assert_eq!(kept.last_updated, newer.last_updated);
}

#[tokio::test]
async fn one_file_missing_is_fatal() {
  let dir = tempdir().unwrap();
  let store = FileStore::new(dir.path());

  store.save(&sample_set()).await.unwrap();
  std::fs::remove_file(store.json_path()).unwrap();

  assert!(matches!(store.load().await, Err(Error::Inconsistent(_))));
}

#[tokio::test]
async fn record_present_in_one_file_only_is_fatal() {
  let dir = tempdir().unwrap();
  let store = FileStore::new(dir.path());

  store.save(&sample_set()).await.unwrap();

  // Append an extra record to the structured file only.
  let mut with_extra: Vec<ElectionRecord> =
    sample_set().into_iter().collect();
  with_extra.push(record("OH", "3", 0));
  let json = serde_json::to_string_pretty(&with_extra).unwrap();
  std::fs::write(store.json_path(), json).unwrap();

  assert!(matches!(store.load().await, Err(Error::Inconsistent(_))));
}

#[tokio::test]
async fn cross_file_divergence_resolves_by_later_timestamp() {
  let dir = tempdir().unwrap();
  let store = FileStore::new(dir.path());

  let in_csv = record("VA", "1", 1);
  let mut in_json = record("VA", "1", 5);
  in_json.incumbent = Some("B. West".to_string());

  std::fs::write(
    store.csv_path(),
    encode::to_csv(&[in_csv].into_iter().collect()),
  )
  .unwrap();
  std::fs::write(
    store.json_path(),
    serde_json::to_string_pretty(&vec![in_json.clone()]).unwrap(),
  )
  .unwrap();

  let loaded = store.load().await.unwrap();
  assert_eq!(loaded.iter().next().unwrap().incumbent.as_deref(), Some("B. West"));
}

#[tokio::test]
async fn equal_timestamps_with_differing_fields_are_fatal() {
  let dir = tempdir().unwrap();
  let store = FileStore::new(dir.path());

  let in_csv = record("VA", "1", 1);
  let mut in_json = in_csv.clone();
  in_json.incumbent = Some("B. West".to_string());

  std::fs::write(
    store.csv_path(),
    encode::to_csv(&[in_csv].into_iter().collect()),
  )
  .unwrap();
  std::fs::write(
    store.json_path(),
    serde_json::to_string_pretty(&vec![in_json]).unwrap(),
  )
  .unwrap();

  assert!(matches!(store.load().await, Err(Error::Inconsistent(_))));
}

#[tokio::test]
async fn save_replaces_rather_than_appends() {
  let dir = tempdir().unwrap();
  let store = FileStore::new(dir.path());

  store.save(&sample_set()).await.unwrap();
  let smaller: RecordSet = [record("TX", "7", 2)].into_iter().collect();
  store.save(&smaller).await.unwrap();

  let loaded = store.load().await.unwrap();
  assert_eq!(loaded.len(), 1);
  assert_eq!(loaded.iter().next().unwrap().region.as_str(), "TX");
}
