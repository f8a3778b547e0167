//! `license_matcher`: identify free-form license text against a catalog of
//! known SPDX licenses.
//!
//! # Flow
//! 1. Build a [`license::catalog::LicenseCatalog`] once (the embedded one from
//!    [`license::spdx::bundled_catalog`], custom entries, or both).
//! 2. Derive strategies from it: [`license::exact::ExactMatcher`],
//!    [`license::fuzzy::FuzzyMatcher`], [`license::pattern::PatternMatcher`].
//! 3. Chain them in a [`license::classifier::Classifier`] and call
//!    [`license::classifier::Classifier::classify`] per text.
//!
//! Every fallible step happens during construction. Matching never fails; an
//! unrecognised text is simply `None`.

pub mod error;
pub mod license;
