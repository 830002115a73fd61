//! # Loot Error Types
//!
//! All errors that can occur while loading loot content.
//!
//! Generation itself never fails; every variant here is raised at load time
//! and carries enough context to find the offending authored value.

use std::fmt;

use thiserror::Error;

/// Where an authored value lives: the asset name plus a JSON path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// Asset (file or table) name.
    pub asset: String,
    /// JSON path inside the asset, e.g. `$.loot.components[1].chance`.
    pub path: String,
}

impl Location {
    /// The root of an asset.
    #[must_use]
    pub fn root(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            path: "$".to_string(),
        }
    }

    /// Location of an object key below this one.
    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        Self {
            asset: self.asset.clone(),
            path: format!("{}.{key}", self.path),
        }
    }

    /// Location of an array element below this one.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self {
            asset: self.asset.clone(),
            path: format!("{}[{index}]", self.path),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.asset, self.path)
    }
}

/// Errors that can occur while loading loot content.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LootError {
    /// The document is not valid JSON, or repeats a key.
    #[error("{asset}: {message}")]
    Syntax {
        /// Asset name.
        asset: String,
        /// Parser message, including line and column.
        message: String,
    },

    /// A required field is absent.
    #[error("{at}: missing required field `{field}`")]
    MissingField {
        /// Where the field was expected.
        at: Location,
        /// Field name.
        field: &'static str,
    },

    /// A value has the wrong JSON type.
    #[error("{at}: expected {expected}")]
    WrongType {
        /// The offending value.
        at: Location,
        /// Human-readable expected type.
        expected: &'static str,
    },

    /// A node `type` is not one of `item`, `collection`, `selection`.
    #[error("{at}: unknown node type `{found}`")]
    UnknownNodeType {
        /// The `type` value.
        at: Location,
        /// What was authored.
        found: String,
    },

    /// `chance` is outside `(0, 100]`.
    #[error("{at}: chance {value} is outside (0, 100]")]
    ChanceOutOfBounds {
        /// The `chance` value.
        at: Location,
        /// What was authored.
        value: f64,
    },

    /// A range has `min > max`.
    #[error("{at}: inverted range {min}..={max}")]
    InvertedRange {
        /// The range value.
        at: Location,
        /// Authored lower bound.
        min: u32,
        /// Authored upper bound.
        max: u32,
    },

    /// A count bound is not a non-negative integer.
    #[error("{at}: count bounds must be non-negative integers")]
    InvalidCount {
        /// The offending bound.
        at: Location,
    },

    /// A pool child `limit` is neither `-1` nor a positive integer.
    #[error("{at}: limit {value} must be -1 (unlimited) or at least 1")]
    InvalidLimit {
        /// The `limit` value.
        at: Location,
        /// What was authored.
        value: i64,
    },

    /// Two nodes in one tree share a `componentId`.
    #[error("{at}: duplicate componentId `{id}`")]
    DuplicateComponentId {
        /// The second occurrence.
        at: Location,
        /// The repeated id.
        id: String,
    },

    /// A field appears where it is not allowed.
    #[error("{at}: field `{field}` is not allowed here")]
    UnexpectedField {
        /// The field location.
        at: Location,
        /// Field name.
        field: String,
    },

    /// The compiled tree violates the parent-before-child ordering.
    #[error("{asset}: malformed loot tree: {reason}")]
    MalformedTree {
        /// Asset name.
        asset: String,
        /// What is wrong.
        reason: String,
    },

    /// Invalid runtime configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A file could not be read.
    #[error("failed to read {path}: {message}")]
    Io {
        /// File path.
        path: String,
        /// OS error text.
        message: String,
    },
}

impl LootError {
    /// Name of the asset the error belongs to, if it came from one.
    #[must_use]
    pub fn asset(&self) -> Option<&str> {
        match self {
            Self::Syntax { asset, .. } | Self::MalformedTree { asset, .. } => Some(asset.as_str()),
            Self::MissingField { at, .. }
            | Self::WrongType { at, .. }
            | Self::UnknownNodeType { at, .. }
            | Self::ChanceOutOfBounds { at, .. }
            | Self::InvertedRange { at, .. }
            | Self::InvalidCount { at }
            | Self::InvalidLimit { at, .. }
            | Self::DuplicateComponentId { at, .. }
            | Self::UnexpectedField { at, .. } => Some(at.asset.as_str()),
            Self::InvalidConfig(_) | Self::Io { .. } => None,
        }
    }
}

/// Result type for loot loading operations.
pub type LootResult<T> = Result<T, LootError>;
