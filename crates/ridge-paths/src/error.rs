use ridge_core::Point;
use thiserror::Error;

/// Conditions that abort construction or a search.
///
/// "No path" is not an error; see [`SearchOutcome`](crate::SearchOutcome).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// The field or the search interval is not 2-dimensional.
    #[error("tracing only works on 2D fields, got {0} dimensions")]
    InvalidDimensionality(usize),

    /// The search interval covers no cells.
    #[error("search region is empty")]
    EmptyRegion,

    /// The search interval does not fit the 16-bit node coordinates.
    #[error("search region {width}x{height} exceeds the {max}x{max} limit")]
    RegionTooLarge { width: i64, height: i64, max: u32 },

    /// The search interval reaches outside the field's extent.
    #[error("search region extends outside the field")]
    IntervalOutsideField,

    /// A start or target position lies outside the search grid.
    #[error("position {0} is outside the search grid")]
    OutOfBounds(Point),

    /// Too many cells were open at once.
    #[error("too many open nodes (max {max})")]
    CapacityExceeded { max: usize },

    /// An accumulated or estimated cost no longer fits the node encoding.
    #[error("path cost {cost} overflows the node encoding (max {max})")]
    CostOverflow { cost: u64, max: u32 },

    /// A configuration value is out of its allowed range.
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The search was stopped through its run-state before finishing.
    #[error("search cancelled")]
    Cancelled,
}

/// Result alias for tracing operations.
pub type Result<T> = std::result::Result<T, SearchError>;
