use crate::error::Result;
use crate::license::catalog::LicenseCatalog;
use crate::license::classifier::Matcher;
use crate::license::normalize::Candidate;
use crate::license::template::{PatternSource, StructuralPattern};

/// First-match structural matching over an ordered pattern list.
///
/// There is no scoring: patterns are tried in order and the first one that
/// matches the whole collapsed text decides.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    patterns: Vec<(String, StructuralPattern)>,
}

impl PatternMatcher {
    /// Compile `(identifier, source)` pairs. Any invalid source fails here.
    pub fn new<I, S>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, PatternSource)>,
        S: Into<String>,
    {
        let patterns = sources
            .into_iter()
            .map(|(id, source)| {
                let id: String = id.into();
                let pattern = StructuralPattern::compile(&id, &source)?;
                Ok((id, pattern))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Reuse the patterns the catalog already compiled.
    pub fn from_catalog(catalog: &LicenseCatalog) -> Self {
        let patterns = catalog
            .patterns()
            .map(|(id, pattern)| (id.to_string(), pattern.clone()))
            .collect();
        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Matcher for PatternMatcher {
    fn name(&self) -> &str {
        "pattern"
    }

    fn identify<'a>(&'a self, candidate: &Candidate<'_>) -> Option<&'a str> {
        if candidate.is_blank() {
            return None;
        }
        let text = candidate.collapsed();
        self.patterns
            .iter()
            .find(|(_, pattern)| pattern.is_match(text))
            .map(|(id, _)| id.as_str())
    }
}
