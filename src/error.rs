/// Errors raised while building a catalog or a matching strategy.
///
/// Classification itself never fails: once a matcher is constructed, every
/// call returns an identifier or `None`.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("license identifier must not be empty")]
    EmptyIdentifier,

    #[error("duplicate license identifier: {identifier}")]
    DuplicateIdentifier { identifier: String },

    #[error("invalid template for {identifier}: {message}")]
    InvalidTemplate { identifier: String, message: String },

    #[error("invalid pattern for {identifier}: {source}")]
    InvalidPattern {
        identifier: String,
        #[source]
        source: regex::Error,
    },

    #[error("fuzzy threshold {threshold} is outside 0..=100")]
    InvalidThreshold { threshold: u8 },
}

impl CatalogError {
    pub(crate) fn template(identifier: &str, message: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            identifier: identifier.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
