// Copyright 2025 Stone Ridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Loaded performance-run records and the filter metadata derived from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Build date encoded as an integer `YYYYMMDD`.
pub type BuildDate = u32;

/// One performance-test run, as read from a single result file.
///
/// Records are immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Operating system identifier of the test machine.
    pub platform: String,
    /// Browser version under test.
    pub version: String,
    /// Test suite name.
    pub suite: String,
    /// Network configuration (the build branch).
    pub netconfig: String,
    /// Build date, taken from the leading 8 characters of the build id.
    pub build_date: BuildDate,
    /// Primary measured total.
    pub value: f64,
}

/// Distinct values available for each filterable dimension.
///
/// Derived from a set of records on every load; never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Known browser versions.
    pub versions: BTreeSet<String>,
    /// Known platforms.
    pub platforms: BTreeSet<String>,
    /// Known test suites.
    #[serde(rename = "tests")]
    pub suites: BTreeSet<String>,
    /// Known network configurations.
    pub netconfigs: BTreeSet<String>,
}

impl Metadata {
    /// Collect the distinct dimension values of `records`.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut metadata = Self::default();
        for record in records {
            metadata.observe(record);
        }
        metadata
    }

    /// Add the dimension values of one record.
    pub fn observe(&mut self, record: &Record) {
        self.platforms.insert(record.platform.clone());
        self.versions.insert(record.version.clone());
        self.suites.insert(record.suite.clone());
        self.netconfigs.insert(record.netconfig.clone());
    }
}

/// The outcome of one store load: records in load order plus their metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Distinct values per dimension.
    pub metadata: Metadata,
    /// Records in load order (file-name order for directory stores).
    pub records: Vec<Record>,
}

impl RecordSet {
    /// Build a record set, deriving metadata from `records`.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            metadata: Metadata::from_records(&records),
            records,
        }
    }

    /// Number of loaded records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        platform: &str,
        version: &str,
        netconfig: &str,
        suite: &str,
        build_date: BuildDate,
        value: f64,
    ) -> Record {
        Record {
            platform: platform.to_string(),
            version: version.to_string(),
            suite: suite.to_string(),
            netconfig: netconfig.to_string(),
            build_date,
            value,
        }
    }

    #[test]
    fn test_metadata_is_sorted_and_distinct() {
        let records = vec![
            record("windows", "10", "central", "perf", 20230101, 1.0),
            record("linux", "9", "central", "perf", 20230101, 2.0),
            record("linux", "10", "beta", "tp5", 20230102, 3.0),
        ];

        let metadata = Metadata::from_records(&records);
        let platforms: Vec<_> = metadata.platforms.iter().cloned().collect();
        assert_eq!(platforms, vec!["linux", "windows"]);
        let versions: Vec<_> = metadata.versions.iter().cloned().collect();
        assert_eq!(versions, vec!["10", "9"]);
        assert_eq!(metadata.suites.len(), 2);
        assert_eq!(metadata.netconfigs.len(), 2);
    }

    #[test]
    fn test_record_set_derives_metadata() {
        let set = RecordSet::new(vec![record("linux", "10", "central", "perf", 20230101, 5.0)]);
        assert_eq!(set.len(), 1);
        assert!(set.metadata.platforms.contains("linux"));
        assert!(!set.is_empty());
    }

    #[test]
    fn test_metadata_serializes_suites_as_tests() {
        let metadata = Metadata::from_records(&[record("linux", "10", "central", "perf", 1, 1.0)]);
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["tests"], serde_json::json!(["perf"]));
    }
}
