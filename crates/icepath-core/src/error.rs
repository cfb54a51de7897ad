//! Error types for route planning.

use crate::models::GridIndex;
use thiserror::Error;

/// Every core-stage failure aborts the run; nothing here is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("unmapped terrain class label: {0:?}")]
    UnmappedClass(String),

    #[error("terrain and grid do not align: {0}")]
    ShapeMismatch(String),

    #[error("no viable route: {walkable} traversable cell(s), need at least 2")]
    InsufficientWalkableCells { walkable: usize },

    #[error("no path from {start} to {end}")]
    NoPath { start: GridIndex, end: GridIndex },

    #[error("invalid endpoint {index}: {reason}")]
    InvalidEndpoint { index: GridIndex, reason: String },

    #[error("search gave up after expanding {0} cells")]
    SearchLimitExceeded(usize),

    #[error("weather fetch failed: {0}")]
    WeatherFetch(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RouteError>;
