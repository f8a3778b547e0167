use std::collections::HashMap;
use std::sync::OnceLock;

/// Split on any whitespace run and drop empty tokens.
pub fn normalize_tokens(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Collapse every whitespace run to a single space and trim both ends.
///
/// The result is a single line and equals `normalize_tokens(text).join(" ")`.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for token in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

/// One piece of text to classify, normalized once and shared by every
/// strategy of a chain.
#[derive(Debug)]
pub struct Candidate<'a> {
    raw: &'a str,
    collapsed: String,
    words: OnceLock<TokenBag>,
}

impl<'a> Candidate<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            collapsed: collapse_whitespace(raw),
            words: OnceLock::new(),
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Whitespace-collapsed single-line form.
    pub fn collapsed(&self) -> &str {
        &self.collapsed
    }

    /// True for empty or whitespace-only input.
    pub fn is_blank(&self) -> bool {
        self.collapsed.is_empty()
    }

    /// Word bag used by fuzzy scoring, computed on first use.
    pub fn words(&self) -> &TokenBag {
        self.words.get_or_init(|| TokenBag::from_text(&self.collapsed))
    }
}

/// Multiset of lowercase alphanumeric words.
///
/// Punctuation separates words and is otherwise ignored, so `"AS IS",` and
/// `AS IS` produce the same bag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBag {
    counts: HashMap<String, u32>,
    total: u32,
}

impl TokenBag {
    pub fn from_text(text: &str) -> Self {
        let mut bag = TokenBag::default();
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            *bag.counts.entry(word.to_lowercase()).or_insert(0) += 1;
            bag.total += 1;
        }
        bag
    }

    /// Number of words, counting repeats.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Number of distinct words.
    pub fn distinct(&self) -> u32 {
        self.counts.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Sum over shared words of the smaller count.
    pub fn common(&self, other: &TokenBag) -> u32 {
        let (small, large) = self.smaller_first(other);
        small
            .counts
            .iter()
            .filter_map(|(word, &n)| large.counts.get(word).map(|&m| n.min(m)))
            .sum()
    }

    /// Number of distinct words present in both bags.
    pub fn shared_distinct(&self, other: &TokenBag) -> u32 {
        let (small, large) = self.smaller_first(other);
        small
            .counts
            .keys()
            .filter(|word| large.counts.contains_key(*word))
            .count() as u32
    }

    fn smaller_first<'s>(&'s self, other: &'s TokenBag) -> (&'s TokenBag, &'s TokenBag) {
        if self.counts.len() <= other.counts.len() {
            (self, other)
        } else {
            (other, self)
        }
    }
}
