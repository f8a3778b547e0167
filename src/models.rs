use std::path::{Path, PathBuf};

use serde::Serialize;

use license_matcher::license::Identification;

/// Where a classified text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
}

impl InputSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            InputSource::File(path) => Some(path),
            InputSource::Stdin => None,
        }
    }
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputSource::File(path) => write!(f, "{}", path.display()),
            InputSource::Stdin => write!(f, "<stdin>"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Identified,
    Unknown,
    Unreadable,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Identified => write!(f, "identified"),
            Status::Unknown => write!(f, "unknown"),
            Status::Unreadable => write!(f, "unreadable"),
        }
    }
}

/// One report row.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub source: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Classification {
    pub fn identified(source: &InputSource, found: Identification<'_>) -> Self {
        Self {
            source: source.to_string(),
            status: Status::Identified,
            license: Some(found.identifier.to_string()),
            strategy: Some(found.strategy.to_string()),
            error: None,
        }
    }

    pub fn unknown(source: &InputSource) -> Self {
        Self {
            source: source.to_string(),
            status: Status::Unknown,
            license: None,
            strategy: None,
            error: None,
        }
    }

    pub fn unreadable(source: &InputSource, error: impl std::fmt::Display) -> Self {
        Self {
            source: source.to_string(),
            status: Status::Unreadable,
            license: None,
            strategy: None,
            error: Some(error.to_string()),
        }
    }
}
