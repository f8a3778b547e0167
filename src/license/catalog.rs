use std::collections::HashMap;

use crate::error::{CatalogError, Result};
use crate::license::exact::ReferenceSource;
use crate::license::template::{PatternSource, StructuralPattern, Template};

/// One row of the catalog.
#[derive(Debug, Clone)]
pub struct LicenseEntry {
    identifier: String,
    canonical_text: Option<String>,
    patterns: Vec<StructuralPattern>,
}

impl LicenseEntry {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Reference text for exact and fuzzy comparison. Pattern-only entries
    /// have none.
    pub fn canonical_text(&self) -> Option<&str> {
        self.canonical_text.as_deref()
    }

    pub fn patterns(&self) -> &[StructuralPattern] {
        &self.patterns
    }
}

/// Immutable, ordered registry of licenses.
///
/// Built once through [`CatalogBuilder`]; nothing mutates it afterwards.
/// Iteration order is declaration order, which is also the tie-break order
/// for every strategy derived from it.
#[derive(Debug, Clone, Default)]
pub struct LicenseCatalog {
    entries: Vec<LicenseEntry>,
    index: HashMap<String, usize>,
}

impl LicenseCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn entries(&self) -> &[LicenseEntry] {
        &self.entries
    }

    pub fn get(&self, identifier: &str) -> Option<&LicenseEntry> {
        self.index.get(identifier).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.identifier.as_str())
    }

    /// Exact-match sub-catalog: every canonical text as an inline reference.
    pub fn exact_references(&self) -> Vec<(ReferenceSource, String)> {
        self.fuzzy_templates()
            .map(|(id, text)| (ReferenceSource::Inline(text.to_string()), id.to_string()))
            .collect()
    }

    /// Fuzzy sub-catalog: `(identifier, canonical text)` in catalog order.
    pub fn fuzzy_templates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|e| e.canonical_text().map(|text| (e.identifier(), text)))
    }

    /// Pattern sub-catalog: every compiled pattern, entry order then pattern order.
    pub fn patterns(&self) -> impl Iterator<Item = (&str, &StructuralPattern)> {
        self.entries
            .iter()
            .flat_map(|e| e.patterns.iter().map(move |p| (e.identifier(), p)))
    }
}

/// Collects and validates catalog entries.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: Vec<LicenseEntry>,
    index: HashMap<String, usize>,
}

impl CatalogBuilder {
    /// Add an entry with canonical text only (no structural pattern).
    pub fn text(&mut self, identifier: &str, canonical_text: &str) -> Result<&mut Self> {
        self.insert(identifier, Some(canonical_text.to_string()), Vec::new())?;
        Ok(self)
    }

    /// Add an entry from template markup: the rendered template becomes the
    /// canonical text and the compiled template its first pattern.
    pub fn template(&mut self, identifier: &str, markup: &str) -> Result<&mut Self> {
        check_identifier(identifier)?;
        let template = Template::parse(identifier, markup)?;
        let pattern = template.compile()?;
        self.insert(identifier, Some(template.render()), vec![pattern])?;
        Ok(self)
    }

    /// Attach another pattern to `identifier`, creating a pattern-only entry
    /// when the identifier is new.
    pub fn pattern(&mut self, identifier: &str, source: &PatternSource) -> Result<&mut Self> {
        check_identifier(identifier)?;
        let pattern = StructuralPattern::compile(identifier, source)?;
        let existing = self.index.get(identifier).copied();
        match existing {
            Some(i) => self.entries[i].patterns.push(pattern),
            None => self.insert(identifier, None, vec![pattern])?,
        }
        Ok(self)
    }

    /// Append every entry of an already-built catalog.
    pub fn extend(&mut self, catalog: LicenseCatalog) -> Result<&mut Self> {
        for entry in catalog.entries {
            self.insert(&entry.identifier, entry.canonical_text, entry.patterns)?;
        }
        Ok(self)
    }

    pub fn build(self) -> LicenseCatalog {
        LicenseCatalog {
            entries: self.entries,
            index: self.index,
        }
    }

    fn insert(
        &mut self,
        identifier: &str,
        canonical_text: Option<String>,
        patterns: Vec<StructuralPattern>,
    ) -> Result<()> {
        check_identifier(identifier)?;
        if self.index.contains_key(identifier) {
            return Err(CatalogError::DuplicateIdentifier {
                identifier: identifier.to_string(),
            });
        }
        self.index.insert(identifier.to_string(), self.entries.len());
        self.entries.push(LicenseEntry {
            identifier: identifier.to_string(),
            canonical_text,
            patterns,
        });
        Ok(())
    }
}

fn check_identifier(identifier: &str) -> Result<()> {
    if identifier.trim().is_empty() {
        return Err(CatalogError::EmptyIdentifier);
    }
    Ok(())
}
