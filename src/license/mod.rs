//! License text identification.
//!
//! - [`normalize`]: whitespace normalization and the per-call [`Candidate`].
//! - [`template`]: SPDX-style template markup, rendered to canonical text and
//!   compiled to [`StructuralPattern`](template::StructuralPattern)s.
//! - [`catalog`]: the immutable registry of [`LicenseEntry`](catalog::LicenseEntry) rows.
//! - [`spdx`]: the catalog embedded in the binary.
//! - [`exact`], [`fuzzy`], [`pattern`]: the three matching strategies.
//! - [`classifier`]: the [`Matcher`] trait and the strategy chain.

pub mod catalog;
pub mod classifier;
pub mod exact;
pub mod fuzzy;
pub mod normalize;
pub mod pattern;
pub mod spdx;
pub mod template;

pub use classifier::{Classifier, Identification, Matcher};
pub use normalize::Candidate;
