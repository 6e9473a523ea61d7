//! [`FileStore`] — load/save of the full record set across both files.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use rollcall_core::{ElectionRecord, ElectionStore, RecordSet};
use tokio::{fs, sync::RwLock};

use crate::{encode, Error, Result};

const CSV_FILE: &str = "elections.csv";
const JSON_FILE: &str = "elections.json";

/// An election store backed by one directory holding the tabular and the
/// structured representation of the same record set.
///
/// Cloning is cheap — clones share the same reader/writer lock, so within
/// one process a load never interleaves with the two renames of a save
/// and always observes a complete pre- or post-save state. Writers must
/// still serialize their load→merge→save cycles themselves.
#[derive(Debug, Clone)]
pub struct FileStore {
  csv_path:  PathBuf,
  json_path: PathBuf,
  sync:      Arc<RwLock<()>>,
}

impl FileStore {
  pub fn new(data_dir: impl AsRef<Path>) -> Self {
    let dir = data_dir.as_ref();
    Self {
      csv_path:  dir.join(CSV_FILE),
      json_path: dir.join(JSON_FILE),
      sync:      Arc::new(RwLock::new(())),
    }
  }

  pub fn csv_path(&self) -> &Path { &self.csv_path }

  pub fn json_path(&self) -> &Path { &self.json_path }

  /// Collapse duplicate identity keys within one representation, keeping
  /// the record with the later `last_updated`.
  fn dedup(records: Vec<ElectionRecord>, file: &str) -> RecordSet {
    let mut set = RecordSet::new();
    for record in records {
      let key = record.identity_key();
      let keep_existing = set
        .get(&key)
        .is_some_and(|kept| kept.last_updated >= record.last_updated);
      if keep_existing {
        tracing::warn!(%key, file, "discarding duplicate row");
      } else if set.insert(record).is_some() {
        tracing::warn!(%key, file, "discarding older duplicate row");
      }
    }
    set
  }

  /// Cross-check the two representations, resolving same-key divergence by
  /// the later `last_updated` where possible.
  fn reconcile(tabular: RecordSet, structured: RecordSet) -> Result<RecordSet> {
    for record in tabular.iter() {
      let key = record.identity_key();
      if structured.get(&key).is_none() {
        return Err(Error::Inconsistent(format!(
          "record {key} present in {CSV_FILE} only"
        )));
      }
    }
    for record in structured.iter() {
      let key = record.identity_key();
      if tabular.get(&key).is_none() {
        return Err(Error::Inconsistent(format!(
          "record {key} present in {JSON_FILE} only"
        )));
      }
    }

    let mut merged = RecordSet::new();
    for from_json in structured {
      let key = from_json.identity_key();
      let from_csv = tabular.get(&key).expect("key sets verified equal");

      if *from_csv == from_json {
        merged.insert(from_json);
      } else if from_csv.last_updated > from_json.last_updated {
        tracing::warn!(%key, "representations diverge; keeping later {CSV_FILE} row");
        merged.insert(from_csv.clone());
      } else if from_json.last_updated > from_csv.last_updated {
        tracing::warn!(%key, "representations diverge; keeping later {JSON_FILE} row");
        merged.insert(from_json);
      } else {
        return Err(Error::Inconsistent(format!(
          "record {key} differs between representations with equal last_updated"
        )));
      }
    }
    Ok(merged)
  }

  /// Stage a file next to its final path and atomically swap it in.
  async fn replace(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
  }
}

impl ElectionStore for FileStore {
  type Error = Error;

  async fn load(&self) -> Result<RecordSet> {
    let _shared = self.sync.read().await;

    let have_csv = fs::try_exists(&self.csv_path).await?;
    let have_json = fs::try_exists(&self.json_path).await?;

    match (have_csv, have_json) {
      (false, false) => return Ok(RecordSet::new()),
      (true, false) => {
        return Err(Error::Inconsistent(format!(
          "{CSV_FILE} exists but {JSON_FILE} is missing"
        )));
      }
      (false, true) => {
        return Err(Error::Inconsistent(format!(
          "{JSON_FILE} exists but {CSV_FILE} is missing"
        )));
      }
      (true, true) => {}
    }

    let csv_text = fs::read_to_string(&self.csv_path).await?;
    let json_text = fs::read_to_string(&self.json_path).await?;

    let tabular = Self::dedup(encode::from_csv(&csv_text)?, CSV_FILE);
    let structured = Self::dedup(encode::from_json(&json_text)?, JSON_FILE);

    Self::reconcile(tabular, structured)
  }

  async fn save(&self, records: &RecordSet) -> Result<()> {
    let _exclusive = self.sync.write().await;

    if let Some(dir) = self.csv_path.parent() {
      fs::create_dir_all(dir).await?;
    }

    let csv_text = encode::to_csv(records);
    let json_text = encode::to_json(records)?;

    Self::replace(&self.csv_path, &csv_text).await?;

    // The tabular file is already swapped in; a failure here leaves the
    // representations diverged, which load() treats as fatal. Surface it
    // as the inconsistency it is rather than a plain io error.
    if let Err(e) = Self::replace(&self.json_path, &json_text).await {
      return Err(Error::Inconsistent(format!(
        "{CSV_FILE} was replaced but writing {JSON_FILE} failed: {e}"
      )));
    }

    tracing::debug!(
      records = records.len(),
      csv = %self.csv_path.display(),
      json = %self.json_path.display(),
      "saved record set"
    );
    Ok(())
  }
}
