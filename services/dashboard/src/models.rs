// Copyright 2025 Stone Ridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared state and response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use srgraph_core::{
    report::chart_title, Aggregation, Checked, DateAxis, DirectoryStore, Metadata, RecordSource,
    Selection, Series, Validated,
};
use std::sync::Arc;

use crate::config::DashboardConfig;

/// State shared by all routes.
///
/// Only the record source is shared; every request loads its own records.
pub struct AppState {
    pub source: Arc<dyn RecordSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    /// State reading records from the configured data directory.
    pub fn from_config(config: &DashboardConfig) -> Self {
        let store = DirectoryStore::new(&config.data_dir).with_policy(config.malformed_policy());
        Self::new(Arc::new(store))
    }
}

/// Available filter options.
#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub records: usize,
}

/// A chart ready for the presentation layer.
#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub title: String,
    /// `MMDD` label per axis date.
    pub x_labels: Vec<String>,
    pub dates: DateAxis,
    pub series: Vec<Series>,
    pub selection: Selection,
    pub checked: Checked,
    pub generated_at: DateTime<Utc>,
}

impl ChartResponse {
    pub fn new(validated: Validated, aggregation: Aggregation) -> Self {
        Self {
            title: chart_title(&validated.selection.suite),
            x_labels: aggregation.dates.labels(),
            dates: aggregation.dates,
            series: aggregation.series,
            selection: validated.selection,
            checked: validated.checked,
            generated_at: Utc::now(),
        }
    }
}
