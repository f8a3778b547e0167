use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use license_matcher::license::catalog::LicenseCatalog;
use license_matcher::license::exact::{ExactMatcher, FileAccess, ReferenceSource};
use license_matcher::license::fuzzy::{FuzzyMatcher, Scoring, DEFAULT_THRESHOLD};
use license_matcher::license::pattern::PatternMatcher;
use license_matcher::license::spdx::bundled_catalog;
use license_matcher::license::template::PatternSource;
use license_matcher::license::Classifier;

/// Root configuration structure, deserialized from `.license-matcher/config.toml`.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Include the embedded SPDX catalog. Defaults to `true`.
    #[serde(default = "default_bundled")]
    pub bundled: bool,
    /// Strategies in evaluation order.
    #[serde(default = "default_strategies", rename = "strategy")]
    pub strategies: Vec<StrategyConfig>,
    /// Extra exact-match references, tried before the catalog texts.
    #[serde(default, rename = "reference")]
    pub references: Vec<ReferenceConfig>,
    /// Extra catalog entries, appended after the embedded ones.
    #[serde(default, rename = "license")]
    pub licenses: Vec<LicenseConfig>,
}

fn default_bundled() -> bool {
    true
}

fn default_strategies() -> Vec<StrategyConfig> {
    vec![
        StrategyConfig::Exact,
        StrategyConfig::Fuzzy {
            scoring: Scoring::TokenDifference,
            threshold: DEFAULT_THRESHOLD,
        },
        StrategyConfig::Pattern,
    ]
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

/// One `[[strategy]]` table.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StrategyConfig {
    Exact,
    Fuzzy {
        #[serde(default)]
        scoring: Scoring,
        #[serde(default = "default_threshold")]
        threshold: u8,
    },
    Pattern,
}

/// One `[[reference]]` table: an identifier and exactly one of `path`/`text`.
#[derive(Debug, Deserialize, Clone)]
pub struct ReferenceConfig {
    pub identifier: String,
    pub path: Option<PathBuf>,
    pub text: Option<String>,
}

impl ReferenceConfig {
    fn source(&self) -> Result<ReferenceSource> {
        match (&self.path, &self.text) {
            (Some(path), None) => Ok(ReferenceSource::File(path.clone())),
            (None, Some(text)) => Ok(ReferenceSource::Inline(text.clone())),
            _ => bail!(
                "reference `{}` must set exactly one of `path` or `text`",
                self.identifier
            ),
        }
    }
}

/// One `[[license]]` table.
///
/// With a template the entry is new. With only `pattern` it may also name an
/// existing entry, which then gains that pattern.
#[derive(Debug, Deserialize, Clone)]
pub struct LicenseConfig {
    pub identifier: String,
    pub template: Option<String>,
    pub template_file: Option<PathBuf>,
    /// Raw regex, matched case-insensitively against the whole collapsed text.
    pub pattern: Option<String>,
}

impl LicenseConfig {
    fn markup(&self) -> Result<Option<String>> {
        match (&self.template, &self.template_file) {
            (Some(_), Some(_)) => bail!(
                "license `{}` sets both `template` and `template_file`",
                self.identifier
            ),
            (Some(markup), None) => Ok(Some(markup.clone())),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map(Some)
                .with_context(|| format!("failed to read template file {}", path.display())),
            (None, None) => Ok(None),
        }
    }
}

impl Default for Config {
    /// Embedded catalog with exact, token-difference fuzzy and pattern matching.
    fn default() -> Self {
        Config {
            bundled: true,
            strategies: default_strategies(),
            references: Vec::new(),
            licenses: Vec::new(),
        }
    }
}

impl Config {
    /// Make relative `path` and `template_file` entries relative to `base`.
    fn resolve_paths(&mut self, base: &Path) {
        for reference in &mut self.references {
            if let Some(path) = &mut reference.path {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
        for license in &mut self.licenses {
            if let Some(path) = &mut license.template_file {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }

    /// Build the catalog: embedded entries first (when enabled), then
    /// `[[license]]` tables in file order.
    pub fn catalog(&self) -> Result<LicenseCatalog> {
        let mut builder = LicenseCatalog::builder();
        if self.bundled {
            builder.extend(bundled_catalog().context("embedded catalog is invalid")?)?;
        }

        for license in &self.licenses {
            let markup = license.markup()?;
            if markup.is_none() && license.pattern.is_none() {
                bail!(
                    "license `{}` needs a `template`, `template_file` or `pattern`",
                    license.identifier
                );
            }
            if let Some(markup) = &markup {
                builder
                    .template(&license.identifier, markup)
                    .with_context(|| format!("invalid license `{}`", license.identifier))?;
            }
            if let Some(pattern) = &license.pattern {
                builder
                    .pattern(&license.identifier, &PatternSource::Regex(pattern.clone()))
                    .with_context(|| format!("invalid license `{}`", license.identifier))?;
            }
        }

        Ok(builder.build())
    }

    /// Build the strategy chain over `catalog`.
    ///
    /// `threshold` replaces the threshold of every fuzzy strategy.
    pub fn classifier(
        &self,
        catalog: &LicenseCatalog,
        threshold: Option<u8>,
        files: Arc<dyn FileAccess>,
    ) -> Result<Classifier> {
        if self.strategies.is_empty() {
            bail!("config lists no strategies");
        }

        let mut classifier = Classifier::new();
        for strategy in &self.strategies {
            match strategy {
                StrategyConfig::Exact => {
                    let mut references = self
                        .references
                        .iter()
                        .map(|r| Ok((r.source()?, r.identifier.clone())))
                        .collect::<Result<Vec<_>>>()?;
                    references.extend(catalog.exact_references());
                    classifier.push(Box::new(ExactMatcher::with_file_access(
                        references,
                        Arc::clone(&files),
                    )));
                }
                StrategyConfig::Fuzzy {
                    scoring,
                    threshold: configured,
                } => {
                    let threshold = threshold.unwrap_or(*configured);
                    let fuzzy = FuzzyMatcher::new(catalog.fuzzy_templates(), *scoring, threshold)
                        .with_context(|| format!("invalid fuzzy strategy ({scoring})"))?;
                    classifier.push(Box::new(fuzzy));
                }
                StrategyConfig::Pattern => {
                    classifier.push(Box::new(PatternMatcher::from_catalog(catalog)));
                }
            }
        }

        Ok(classifier)
    }
}

/// Load the matcher configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `<project_path>/.license-matcher/config.toml`
/// 3. `~/.config/license-matcher/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".license-matcher").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-matcher")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}
