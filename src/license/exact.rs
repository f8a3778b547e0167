use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::license::classifier::Matcher;
use crate::license::normalize::{collapse_whitespace, Candidate};

/// Where a reference text lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    Inline(String),
    /// Read at match time through the matcher's [`FileAccess`]. A missing
    /// file is skipped rather than reported.
    File(PathBuf),
}

/// File capability used for [`ReferenceSource::File`] references.
pub trait FileAccess: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`FileAccess`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileAccess;

impl FileAccess for OsFileAccess {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

#[derive(Debug)]
enum Reference {
    /// Already whitespace-collapsed.
    Inline(String),
    File(PathBuf),
}

/// Whitespace-insensitive, case-sensitive equality against known texts.
///
/// References are tried in declaration order and the first equal one wins.
pub struct ExactMatcher {
    references: Vec<(Reference, String)>,
    files: Arc<dyn FileAccess>,
}

impl ExactMatcher {
    /// Build an exact matcher over `(source, identifier)` pairs, reading file
    /// references from the real filesystem.
    pub fn new<I, S>(references: I) -> Self
    where
        I: IntoIterator<Item = (ReferenceSource, S)>,
        S: Into<String>,
    {
        Self::with_file_access(references, Arc::new(OsFileAccess))
    }

    pub fn with_file_access<I, S>(references: I, files: Arc<dyn FileAccess>) -> Self
    where
        I: IntoIterator<Item = (ReferenceSource, S)>,
        S: Into<String>,
    {
        let references = references
            .into_iter()
            .map(|(source, id)| {
                let reference = match source {
                    ReferenceSource::Inline(text) => Reference::Inline(collapse_whitespace(&text)),
                    ReferenceSource::File(path) => Reference::File(path),
                };
                (reference, id.into())
            })
            .collect();
        Self { references, files }
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    fn matches(&self, reference: &Reference, candidate: &str) -> bool {
        match reference {
            Reference::Inline(text) => text == candidate,
            Reference::File(path) => {
                if !self.files.exists(path) {
                    return false;
                }
                match self.files.read_to_string(path) {
                    Ok(content) => collapse_whitespace(&content) == candidate,
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "skipping unreadable license reference");
                        false
                    }
                }
            }
        }
    }
}

impl Matcher for ExactMatcher {
    fn name(&self) -> &str {
        "exact"
    }

    fn identify<'a>(&'a self, candidate: &Candidate<'_>) -> Option<&'a str> {
        if candidate.is_blank() {
            return None;
        }
        self.references
            .iter()
            .find(|(reference, _)| self.matches(reference, candidate.collapsed()))
            .map(|(_, id)| id.as_str())
    }
}

impl std::fmt::Debug for ExactMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExactMatcher")
            .field("references", &self.references)
            .finish_non_exhaustive()
    }
}
