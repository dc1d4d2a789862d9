// Copyright 2025 Stone Ridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core of srgraph: turns a directory of performance-run records into
//! date-aligned series for charting.
//!
//! # Flow
//!
//! ```text
//! RecordSource::load  ->  filter::validate  ->  aggregate::aggregate
//!   (records, metadata)     (selection, checked)   (date axis, series)
//! ```
//!
//! Every step works on request-scoped values; nothing is cached between
//! loads.
//!
//! # Modules
//!
//! - [`record`] - Loaded records and derived metadata
//! - [`store`] - Directory-backed record loading
//! - [`filter`] - Filter validation
//! - [`aggregate`] - Bucketing, deduplication and date alignment
//! - [`report`] - Markdown and terminal table output

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod filter;
pub mod record;
pub mod report;
pub mod store;

pub use aggregate::{aggregate, Aggregation, BucketKey, DateAxis, Series};
pub use filter::{validate, Checked, Dimension, GraphRequest, Selection, Validated, ValidationError};
pub use record::{BuildDate, Metadata, Record, RecordSet};
pub use store::{DirectoryStore, MalformedPolicy, RecordSource, StoreError};
