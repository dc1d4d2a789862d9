// Copyright 2025 Stone Ridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Record store loading.
//!
//! A record store is a directory holding one JSON document per test run. The
//! store is read in full on every [`RecordSource::load`] call; nothing is
//! cached between loads.
//!
//! # Load order
//!
//! Files are loaded in file-name order regardless of the order the platform
//! lists them in. Series construction keeps the first record seen for each
//! date, so this order decides which of two same-day runs is charted.
//!
//! # Document layout
//!
//! ```text
//! test_machine.os                 -> platform
//! test_build.version              -> version
//! test_build.branch               -> netconfig
//! test_build.original_buildid     -> build date (first 8 characters)
//! testrun.suite                   -> suite
//! results_aux.totals[0]           -> value
//! ```

use crate::record::{BuildDate, Record, RecordSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Number of leading build-id characters holding the `YYYYMMDD` date.
const BUILD_DATE_LEN: usize = 8;

/// File extension of record documents.
const RECORD_EXTENSION: &str = "json";

/// Errors that can occur while loading a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store directory itself could not be listed.
    #[error("Record store unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A record file could not be read.
    #[error("Failed to read record {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A record file is not valid JSON.
    #[error("Failed to parse record {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required field is missing or has the wrong type.
    #[error("Malformed record {path}: {source}")]
    Field {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The build id does not start with an integer date.
    #[error("Invalid build id in {path}: {buildid:?}")]
    BuildId { path: PathBuf, buildid: String },

    /// `results_aux.totals` is empty.
    #[error("Record {path} has no result totals")]
    MissingTotal { path: PathBuf },

    /// The first entry of `results_aux.totals` is not a number.
    #[error("Record {path} has a non-numeric first total: {total}")]
    InvalidTotal { path: PathBuf, total: Value },
}

impl StoreError {
    /// Whether this error concerns the store as a whole rather than one record.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// What to do with a record file that cannot be turned into a [`Record`].
///
/// Files whose top-level JSON value is not an object are always skipped; this
/// policy covers every other per-file failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Fail the whole load.
    #[default]
    Fail,
    /// Log a warning and leave the record out.
    Skip,
}

/// A source of performance-run records.
///
/// Implementations must return records in a stable order; see the module
/// docs for why.
pub trait RecordSource: Send + Sync {
    /// Load every record plus the metadata derived from them.
    fn load(&self) -> Result<RecordSet>;
}

/// A record store backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    policy: MalformedPolicy,
}

impl DirectoryStore {
    /// Create a store reading from `root` that fails on malformed records.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            policy: MalformedPolicy::Fail,
        }
    }

    /// Set the policy for malformed record files.
    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// List record files sorted by file name.
    fn record_paths(&self) -> Result<Vec<PathBuf>> {
        let unavailable = |source| StoreError::Unavailable {
            path: self.root.clone(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(unavailable)? {
            let entry = entry.map_err(unavailable)?;
            let path = entry.path();
            let is_record = path
                .extension()
                .is_some_and(|ext| ext == RECORD_EXTENSION);
            if is_record && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }
}

impl RecordSource for DirectoryStore {
    fn load(&self) -> Result<RecordSet> {
        let paths = self.record_paths()?;
        let mut records = Vec::with_capacity(paths.len());
        let mut skipped = 0usize;

        for path in &paths {
            match read_record(path) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    debug!(path = %path.display(), "Skipping non-object record file");
                    skipped += 1;
                }
                Err(err) => match self.policy {
                    MalformedPolicy::Fail => return Err(err),
                    MalformedPolicy::Skip => {
                        warn!(path = %path.display(), error = %err, "Skipping malformed record");
                        skipped += 1;
                    }
                },
            }
        }

        info!(
            root = %self.root.display(),
            files = paths.len(),
            records = records.len(),
            skipped,
            "Record store loaded"
        );

        Ok(RecordSet::new(records))
    }
}

#[derive(Debug, Deserialize)]
struct RunDocument {
    test_machine: TestMachine,
    test_build: TestBuild,
    testrun: TestRun,
    results_aux: ResultsAux,
}

#[derive(Debug, Deserialize)]
struct TestMachine {
    os: String,
}

#[derive(Debug, Deserialize)]
struct TestBuild {
    version: String,
    branch: String,
    original_buildid: String,
}

#[derive(Debug, Deserialize)]
struct TestRun {
    suite: String,
}

#[derive(Debug, Deserialize)]
struct ResultsAux {
    // Only the first entry is read; the rest may hold anything.
    totals: Vec<Value>,
}

/// Read one record file; `Ok(None)` means the file is not a JSON object.
fn read_record(path: &Path) -> Result<Option<Record>> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    parse_record(path, value)
}

/// Turn a parsed JSON document into a record.
pub fn parse_record(path: &Path, value: Value) -> Result<Option<Record>> {
    if !value.is_object() {
        return Ok(None);
    }

    let doc: RunDocument = serde_json::from_value(value).map_err(|source| StoreError::Field {
        path: path.to_path_buf(),
        source,
    })?;

    let build_date = parse_build_date(&doc.test_build.original_buildid).ok_or_else(|| {
        StoreError::BuildId {
            path: path.to_path_buf(),
            buildid: doc.test_build.original_buildid.clone(),
        }
    })?;

    let total = doc
        .results_aux
        .totals
        .first()
        .ok_or_else(|| StoreError::MissingTotal {
            path: path.to_path_buf(),
        })?;
    let value = total.as_f64().ok_or_else(|| StoreError::InvalidTotal {
        path: path.to_path_buf(),
        total: total.clone(),
    })?;

    Ok(Some(Record {
        platform: doc.test_machine.os,
        version: doc.test_build.version,
        suite: doc.testrun.suite,
        netconfig: doc.test_build.branch,
        build_date,
        value,
    }))
}

/// Parse the leading `YYYYMMDD` of a build id such as `"20230101030204"`.
///
/// Ids shorter than eight characters are parsed whole.
pub fn parse_build_date(buildid: &str) -> Option<BuildDate> {
    let end = buildid
        .char_indices()
        .nth(BUILD_DATE_LEN)
        .map_or(buildid.len(), |(idx, _)| idx);
    buildid[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn run_json(os: &str, buildid: &str, total: f64) -> Value {
        json!({
            "test_machine": { "os": os, "platform": "x86_64" },
            "test_build": {
                "version": "10",
                "branch": "central",
                "original_buildid": buildid,
            },
            "testrun": { "suite": "perf" },
            "results_aux": { "totals": [total, 1.5] },
        })
    }

    fn write(dir: &TempDir, name: &str, value: &Value) {
        fs::write(dir.path().join(name), value.to_string()).unwrap();
    }

    #[test]
    fn test_parse_build_date_takes_first_eight_chars() {
        assert_eq!(parse_build_date("20230101030204"), Some(20230101));
        assert_eq!(parse_build_date("20230101"), Some(20230101));
        assert_eq!(parse_build_date("2023"), Some(2023));
        assert_eq!(parse_build_date("2023-01-01"), None);
        assert_eq!(parse_build_date(""), None);
        assert_eq!(parse_build_date("+2023010"), Some(2023010));
        assert_eq!(parse_build_date("-2023010"), None);
    }

    #[test]
    fn test_load_extracts_nested_fields() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", &run_json("linux", "20230101030204", 5.0));

        let set = DirectoryStore::new(dir.path()).load().unwrap();
        assert_eq!(set.records.len(), 1);
        let record = &set.records[0];
        assert_eq!(record.platform, "linux");
        assert_eq!(record.version, "10");
        assert_eq!(record.netconfig, "central");
        assert_eq!(record.suite, "perf");
        assert_eq!(record.build_date, 20230101);
        assert_eq!(record.value, 5.0);
    }

    #[test]
    fn test_load_orders_by_file_name() {
        let dir = TempDir::new().unwrap();
        write(&dir, "c.json", &run_json("c", "20230103", 3.0));
        write(&dir, "a.json", &run_json("a", "20230101", 1.0));
        write(&dir, "b.json", &run_json("b", "20230102", 2.0));

        let set = DirectoryStore::new(dir.path()).load().unwrap();
        let platforms: Vec<_> = set.records.iter().map(|r| r.platform.as_str()).collect();
        assert_eq!(platforms, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_load_skips_non_object_documents() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", &run_json("linux", "20230101", 1.0));
        write(&dir, "b.json", &json!(0));
        write(&dir, "c.json", &json!([1, 2, 3]));

        let set = DirectoryStore::new(dir.path()).load().unwrap();
        assert_eq!(set.records.len(), 1);
    }

    #[test]
    fn test_load_ignores_other_extensions() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", &run_json("linux", "20230101", 1.0));
        fs::write(dir.path().join("notes.txt"), "not a record").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let set = DirectoryStore::new(dir.path()).load().unwrap();
        assert_eq!(set.records.len(), 1);
    }

    #[test]
    fn test_load_derives_metadata() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", &run_json("linux", "20230101", 1.0));
        write(&dir, "b.json", &run_json("windows", "20230101", 1.0));

        let set = DirectoryStore::new(dir.path()).load().unwrap();
        assert_eq!(set.metadata.platforms.len(), 2);
        assert!(set.metadata.suites.contains("perf"));
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = DirectoryStore::new(dir.path().join("missing"))
            .load()
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_malformed_field_fails_load_by_default() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", &run_json("linux", "20230101", 1.0));
        write(&dir, "b.json", &json!({ "test_machine": { "os": "linux" } }));

        let err = DirectoryStore::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, StoreError::Field { .. }));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_invalid_json_fails_load_by_default() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), "{ not json").unwrap();

        let err = DirectoryStore::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn test_bad_build_id_and_empty_totals_are_errors() {
        let path = Path::new("x.json");
        let err = parse_record(path, run_json("linux", "build-1", 1.0)).unwrap_err();
        assert!(matches!(err, StoreError::BuildId { .. }));

        let mut doc = run_json("linux", "20230101", 1.0);
        doc["results_aux"]["totals"] = json!([]);
        let err = parse_record(path, doc).unwrap_err();
        assert!(matches!(err, StoreError::MissingTotal { .. }));

        let mut doc = run_json("linux", "20230101", 1.0);
        doc["results_aux"]["totals"] = json!(["n/a", 2.0]);
        let err = parse_record(path, doc).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTotal { .. }));
    }

    #[test]
    fn test_only_first_total_must_be_numeric() {
        let mut doc = run_json("linux", "20230101", 5.0);
        doc["results_aux"]["totals"] = json!([5.0, null, "n/a", { "mean": 1 }]);

        let record = parse_record(Path::new("x.json"), doc).unwrap().unwrap();
        assert_eq!(record.value, 5.0);
    }

    #[test]
    fn test_skip_policy_drops_malformed_records() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", &run_json("linux", "20230101", 1.0));
        write(&dir, "b.json", &json!({ "testrun": {} }));
        fs::write(dir.path().join("c.json"), "{ not json").unwrap();
        write(&dir, "d.json", &run_json("linux", "20230102", 2.0));

        let store = DirectoryStore::new(dir.path()).with_policy(MalformedPolicy::Skip);
        let set = store.load().unwrap();
        assert_eq!(set.records.len(), 2);
        assert_eq!(set.records[1].build_date, 20230102);
    }

    #[test]
    fn test_skip_policy_still_fails_on_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store =
            DirectoryStore::new(dir.path().join("missing")).with_policy(MalformedPolicy::Skip);
        assert!(store.load().unwrap_err().is_unavailable());
    }
}
