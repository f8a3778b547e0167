use tracing::debug;

use crate::error::Result;
use crate::license::catalog::LicenseCatalog;
use crate::license::exact::ExactMatcher;
use crate::license::fuzzy::{FuzzyMatcher, Scoring, DEFAULT_THRESHOLD};
use crate::license::normalize::Candidate;
use crate::license::pattern::PatternMatcher;

/// A license identification strategy.
///
/// Implementations hold only immutable, pre-built state, so one instance can
/// be shared across threads and called concurrently.
pub trait Matcher: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Identify `candidate`, or `None` when no license matches.
    fn identify<'a>(&'a self, candidate: &Candidate<'_>) -> Option<&'a str>;

    fn identify_text(&self, text: &str) -> Option<&str> {
        self.identify(&Candidate::new(text))
    }
}

/// A successful classification, naming the strategy that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identification<'a> {
    pub identifier: &'a str,
    pub strategy: &'a str,
}

/// Ordered chain of strategies; the first identifier wins.
///
/// The chain normalizes each input once and hands the same [`Candidate`] to
/// every strategy. Later strategies are not called once one has matched.
#[derive(Default)]
pub struct Classifier {
    strategies: Vec<Box<dyn Matcher>>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default policy over one catalog: exact text, then token-difference
    /// fuzzy scoring at [`DEFAULT_THRESHOLD`], then structural patterns.
    pub fn standard(catalog: &LicenseCatalog) -> Result<Self> {
        let fuzzy = FuzzyMatcher::new(
            catalog.fuzzy_templates(),
            Scoring::TokenDifference,
            DEFAULT_THRESHOLD,
        )?;
        Ok(Self::new()
            .with(ExactMatcher::new(catalog.exact_references()))
            .with(fuzzy)
            .with(PatternMatcher::from_catalog(catalog)))
    }

    /// Append a strategy to the end of the chain.
    pub fn with(mut self, strategy: impl Matcher + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn push(&mut self, strategy: Box<dyn Matcher>) {
        self.strategies.push(strategy);
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn strategy_names(&self) -> impl Iterator<Item = &str> {
        self.strategies.iter().map(|s| s.name())
    }

    /// Classify raw text.
    pub fn classify(&self, text: &str) -> Option<Identification<'_>> {
        self.classify_candidate(&Candidate::new(text))
    }

    pub fn classify_candidate(&self, candidate: &Candidate<'_>) -> Option<Identification<'_>> {
        self.strategies.iter().find_map(|strategy| {
            let identifier = strategy.identify(candidate)?;
            debug!(strategy = strategy.name(), identifier, "license identified");
            Some(Identification {
                identifier,
                strategy: strategy.name(),
            })
        })
    }
}

impl Matcher for Classifier {
    fn name(&self) -> &str {
        "chain"
    }

    fn identify<'a>(&'a self, candidate: &Candidate<'_>) -> Option<&'a str> {
        self.classify_candidate(candidate).map(|i| i.identifier)
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.strategy_names()).finish()
    }
}
