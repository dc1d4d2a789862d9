// Copyright 2025 Stone Ridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Filter validation.
//!
//! Turns the raw values an operator picked into a [`Selection`] after
//! checking each one against the store [`Metadata`].

use crate::record::Metadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// A filterable record dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Browser version.
    Version,
    /// Platform (operating system).
    Platform,
    /// Network configuration.
    Netconfig,
    /// Test suite.
    Test,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Dimension::Version => "Version",
            Dimension::Platform => "Platform",
            Dimension::Netconfig => "Network Config",
            Dimension::Test => "Test",
        };
        f.write_str(label)
    }
}

/// Errors reported back to the operator when a filter request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A requested value is not among the known values of its dimension.
    #[error("Invalid {dimension}: {value}")]
    InvalidValue { dimension: Dimension, value: String },

    /// At least one dimension has no selected value.
    #[error("Missing Input")]
    MissingInput,
}

/// Raw filter values as decoded from a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRequest {
    /// Requested browser versions.
    #[serde(default)]
    pub versions: Vec<String>,
    /// Requested platforms.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Requested network configurations.
    #[serde(default)]
    pub netconfigs: Vec<String>,
    /// Requested test suite.
    #[serde(default)]
    pub test: Option<String>,
}

impl GraphRequest {
    /// Decode the comma-separated encoding, one string per dimension.
    ///
    /// Empty fragments are dropped, so `""` and `"a,,b"` are both accepted.
    pub fn from_comma_separated(
        versions: &str,
        platforms: &str,
        netconfigs: &str,
        test: Option<&str>,
    ) -> Self {
        Self {
            versions: split_list(versions),
            platforms: split_list(platforms),
            netconfigs: split_list(netconfigs),
            test: test
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }
}

/// Split a comma-separated list, trimming whitespace and dropping empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// A validated filter selection; every value is known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Selected browser versions (non-empty).
    pub versions: BTreeSet<String>,
    /// Selected platforms (non-empty).
    pub platforms: BTreeSet<String>,
    /// Selected network configurations (non-empty).
    pub netconfigs: BTreeSet<String>,
    /// Selected test suite.
    pub suite: String,
}

/// Which known values are marked as selected, per dimension.
///
/// Built once per request and handed back to the presentation layer so the
/// filter form can be re-rendered with the operator's choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checked {
    /// Checked browser versions.
    pub versions: BTreeSet<String>,
    /// Checked platforms.
    pub platforms: BTreeSet<String>,
    /// Checked network configurations.
    pub netconfigs: BTreeSet<String>,
    /// Checked test suite.
    pub test: Option<String>,
}

impl Checked {
    /// Mark every requested value that `metadata` knows about.
    ///
    /// Unknown values are left unmarked, so this is usable on the error path.
    pub fn from_request(metadata: &Metadata, request: &GraphRequest) -> Self {
        Self {
            versions: mark_known(&request.versions, &metadata.versions),
            platforms: mark_known(&request.platforms, &metadata.platforms),
            netconfigs: mark_known(&request.netconfigs, &metadata.netconfigs),
            test: request
                .test
                .clone()
                .filter(|test| metadata.suites.contains(test)),
        }
    }
}

/// A successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    /// The selection to aggregate.
    pub selection: Selection,
    /// UI state for the presentation layer only.
    pub checked: Checked,
}

/// Validate `request` against `metadata`.
///
/// Versions, platforms and network configs are checked in that order and
/// the first unknown value is reported. The suite is checked next; only then
/// are empty dimensions reported as [`ValidationError::MissingInput`].
pub fn validate(
    metadata: &Metadata,
    request: &GraphRequest,
) -> Result<Validated, ValidationError> {
    let versions = known_values(Dimension::Version, &request.versions, &metadata.versions)?;
    let platforms = known_values(Dimension::Platform, &request.platforms, &metadata.platforms)?;
    let netconfigs = known_values(
        Dimension::Netconfig,
        &request.netconfigs,
        &metadata.netconfigs,
    )?;

    let suite = request.test.as_deref().filter(|test| !test.is_empty());
    if let Some(suite) = suite {
        if !metadata.suites.contains(suite) {
            return Err(ValidationError::InvalidValue {
                dimension: Dimension::Test,
                value: suite.to_string(),
            });
        }
    }

    let suite = match suite {
        Some(suite) if !versions.is_empty() && !platforms.is_empty() && !netconfigs.is_empty() => {
            suite.to_string()
        }
        _ => return Err(ValidationError::MissingInput),
    };

    Ok(Validated {
        checked: Checked::from_request(metadata, request),
        selection: Selection {
            versions,
            platforms,
            netconfigs,
            suite,
        },
    })
}

fn mark_known(requested: &[String], valid: &BTreeSet<String>) -> BTreeSet<String> {
    requested
        .iter()
        .filter(|value| valid.contains(*value))
        .cloned()
        .collect()
}

fn known_values(
    dimension: Dimension,
    requested: &[String],
    valid: &BTreeSet<String>,
) -> Result<BTreeSet<String>, ValidationError> {
    let mut selected = BTreeSet::new();
    for value in requested {
        if !valid.contains(value) {
            return Err(ValidationError::InvalidValue {
                dimension,
                value: value.clone(),
            });
        }
        selected.insert(value.clone());
    }
    Ok(selected)
}
