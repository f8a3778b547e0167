use serde::Deserialize;
use tracing::trace;

use crate::error::{CatalogError, Result};
use crate::license::classifier::Matcher;
use crate::license::normalize::{Candidate, TokenBag};

/// Default minimum score for a fuzzy match.
pub const DEFAULT_THRESHOLD: u8 = 90;

/// Token similarity formula.
///
/// Both compare lowercase word bags (see [`TokenBag`]), so word order and
/// punctuation do not matter. They are deliberately not interchangeable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scoring {
    /// Dice coefficient over word multisets:
    /// `100 * 2 * common / (|a| + |b|)`. Every extra or missing word,
    /// repeats included, costs score.
    #[default]
    TokenDifference,
    /// Over distinct words, `100 * 2i / (2i + min(da, db))` where `i` is the
    /// shared count and `da`, `db` the words unique to each side. Extra
    /// boilerplate on one side is free.
    TokenSet,
}

impl Scoring {
    /// Similarity in `0..=100`, rounded half up.
    pub fn score(self, a: &TokenBag, b: &TokenBag) -> u8 {
        match self {
            Scoring::TokenDifference => percent(2 * a.common(b), a.total() + b.total()),
            Scoring::TokenSet => {
                let shared = a.shared_distinct(b);
                if shared == 0 {
                    return 0;
                }
                let only_a = a.distinct() - shared;
                let only_b = b.distinct() - shared;
                percent(2 * shared, 2 * shared + only_a.min(only_b))
            }
        }
    }
}

impl std::fmt::Display for Scoring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scoring::TokenDifference => write!(f, "token-difference"),
            Scoring::TokenSet => write!(f, "token-set"),
        }
    }
}

/// `round(100 * num / den)` in integer arithmetic; zero when `den` is zero.
fn percent(num: u32, den: u32) -> u8 {
    if den == 0 {
        return 0;
    }
    let num = u64::from(num);
    let den = u64::from(den);
    ((200 * num + den) / (2 * den)).min(100) as u8
}

#[derive(Debug)]
struct FuzzyTemplate {
    identifier: String,
    words: TokenBag,
}

/// Best-scoring template for one call.
#[derive(Debug, Clone, Copy)]
struct MatchCandidate<'a> {
    identifier: &'a str,
    score: u8,
}

/// Threshold-gated best-match over canonical texts.
#[derive(Debug)]
pub struct FuzzyMatcher {
    templates: Vec<FuzzyTemplate>,
    scoring: Scoring,
    threshold: u8,
    name: String,
}

impl FuzzyMatcher {
    /// Build a fuzzy matcher over `(identifier, canonical text)` pairs.
    /// Template word bags are computed here, once.
    pub fn new<I, S, T>(templates: I, scoring: Scoring, threshold: u8) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: AsRef<str>,
    {
        check_threshold(threshold)?;
        let templates = templates
            .into_iter()
            .map(|(id, text)| FuzzyTemplate {
                identifier: id.into(),
                words: TokenBag::from_text(text.as_ref()),
            })
            .collect();
        Ok(Self {
            templates,
            scoring,
            threshold,
            name: format!("fuzzy:{scoring}"),
        })
    }

    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Identify with a per-call threshold instead of the configured one.
    /// Thresholds above 100 never match.
    pub fn identify_with_threshold<'a>(
        &'a self,
        candidate: &Candidate<'_>,
        threshold: u8,
    ) -> Option<&'a str> {
        if candidate.is_blank() {
            return None;
        }
        let best = self.best_match(candidate.words())?;
        trace!(
            scoring = %self.scoring,
            identifier = best.identifier,
            score = best.score,
            threshold,
            "best fuzzy candidate"
        );
        (best.score >= threshold).then_some(best.identifier)
    }

    /// Highest score; the earliest template wins ties.
    fn best_match(&self, words: &TokenBag) -> Option<MatchCandidate<'_>> {
        let mut best: Option<MatchCandidate<'_>> = None;
        for template in &self.templates {
            let score = self.scoring.score(words, &template.words);
            match best {
                Some(b) if score <= b.score => {}
                _ => {
                    best = Some(MatchCandidate {
                        identifier: &template.identifier,
                        score,
                    })
                }
            }
        }
        best
    }
}

impl Matcher for FuzzyMatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify<'a>(&'a self, candidate: &Candidate<'_>) -> Option<&'a str> {
        self.identify_with_threshold(candidate, self.threshold)
    }
}

fn check_threshold(threshold: u8) -> Result<()> {
    if threshold > 100 {
        return Err(CatalogError::InvalidThreshold { threshold });
    }
    Ok(())
}
