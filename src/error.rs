//! Error types for the aggregation engine.

use std::fmt;

use thiserror::Error;

/// Which side of the aggregation an offending record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Tract,
    Target,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Tract => write!(f, "tract"),
            UnitKind::Target => write!(f, "target unit"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AggregationError {
    /// Ring with fewer than 3 vertices (a closing vertex is not counted)
    #[error("{kind} {id}: ring has {vertices} vertices, at least 3 are required")]
    InvalidRing {
        kind: UnitKind,
        id: String,
        vertices: usize,
    },

    /// Coordinate with a missing or non-finite component
    #[error("{kind} {id}: coordinate {index} is missing a longitude or latitude")]
    InvalidCoordinate {
        kind: UnitKind,
        id: String,
        index: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed GeoJSON: {0}")]
    GeoJson(String),
}

pub type Result<T> = std::result::Result<T, AggregationError>;
