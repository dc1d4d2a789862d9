// Copyright 2025 Stone Ridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Series aggregation.
//!
//! Groups records into one bucket per (platform, version, netconfig) of a
//! [`Selection`], keeps one point per build date in each bucket, and aligns
//! every bucket onto a shared [`DateAxis`].
//!
//! # Invariants
//!
//! - The axis is strictly increasing and is the union of all bucket dates.
//! - Every series has exactly one point per axis date.
//! - Within a bucket the first record seen for a date wins; later records
//!   for the same date, or for an earlier date, are dropped. Records are
//!   seen in load order.

use crate::filter::Selection;
use crate::record::{BuildDate, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifies one line of the chart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BucketKey {
    /// Platform.
    pub platform: String,
    /// Browser version.
    pub version: String,
    /// Network configuration.
    pub netconfig: String,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} version {} ({})",
            self.platform, self.version, self.netconfig
        )
    }
}

/// One dated value inside a bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    date: BuildDate,
    value: f64,
}

/// The dates shared by every series of one aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateAxis(Vec<BuildDate>);

impl DateAxis {
    /// The dates in increasing order.
    pub fn dates(&self) -> &[BuildDate] {
        &self.0
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the axis has no dates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short `MMDD` labels, the last four digits of each date.
    pub fn labels(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|date| {
                let date = date.to_string();
                let start = date.len().saturating_sub(4);
                date[start..].to_string()
            })
            .collect()
    }
}

/// A named line aligned to the [`DateAxis`]; `None` marks a date with no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Display name, e.g. `linux version 10 (central)`.
    pub name: String,
    /// One entry per axis date.
    pub points: Vec<Option<f64>>,
}

impl Series {
    /// Number of dates that carry a value.
    pub fn present(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }
}

/// The output of [`aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Shared date axis.
    pub dates: DateAxis,
    /// One series per selected (platform, version, netconfig).
    pub series: Vec<Series>,
}

/// Build one aligned series per selected combination from `records`.
///
/// Never fails: a selection that matches no record yields an empty axis and
/// series with no points.
pub fn aggregate(records: &[Record], selection: &Selection) -> Aggregation {
    let buckets = fill_buckets(records, selection);
    let dates = date_axis(&buckets);
    let series = buckets
        .iter()
        .map(|(key, points)| Series {
            name: key.to_string(),
            points: align(&dates, points),
        })
        .collect();

    Aggregation { dates, series }
}

fn fill_buckets(records: &[Record], selection: &Selection) -> BTreeMap<BucketKey, Vec<Point>> {
    let mut buckets = BTreeMap::new();
    for platform in &selection.platforms {
        for version in &selection.versions {
            for netconfig in &selection.netconfigs {
                let key = BucketKey {
                    platform: platform.clone(),
                    version: version.clone(),
                    netconfig: netconfig.clone(),
                };
                buckets.insert(key, Vec::new());
            }
        }
    }

    for record in records {
        if record.suite != selection.suite {
            continue;
        }

        let key = BucketKey {
            platform: record.platform.clone(),
            version: record.version.clone(),
            netconfig: record.netconfig.clone(),
        };
        // Only keys from the selection's cross product exist.
        let Some(points) = buckets.get_mut(&key) else {
            continue;
        };

        let accepts = points
            .last()
            .map_or(true, |last: &Point| record.build_date > last.date);
        if accepts {
            points.push(Point {
                date: record.build_date,
                value: record.value,
            });
        }
    }

    buckets
}

fn date_axis(buckets: &BTreeMap<BucketKey, Vec<Point>>) -> DateAxis {
    let dates: BTreeSet<BuildDate> = buckets
        .values()
        .flat_map(|points| points.iter().map(|p| p.date))
        .collect();
    DateAxis(dates.into_iter().collect())
}

/// Merge-join a bucket's sorted points onto the axis.
fn align(axis: &DateAxis, points: &[Point]) -> Vec<Option<f64>> {
    let mut remaining = points.iter().peekable();
    axis.dates()
        .iter()
        .map(|&date| match remaining.peek() {
            Some(point) if point.date <= date => remaining.next().map(|p| p.value),
            _ => None,
        })
        .collect()
}
