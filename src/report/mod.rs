//! Report renderers for classification results.
//!
//! - [`terminal`]: colored table with a summary line; respects `--quiet`.
//! - [`json`]: pretty-printed [`Classification`](crate::models::Classification) records.

pub mod json;
pub mod terminal;
