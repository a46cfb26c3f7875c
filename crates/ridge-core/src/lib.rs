//! **ridge-core**: foundational types for intensity-guided tracing.
//!
//! This crate provides the geometry primitives and the read-only scalar
//! field abstraction consumed by `ridge-paths`: integer points and
//! rectangles, n-dimensional intervals as handed out by image pipelines,
//! and an owned raster field.

pub mod field;
pub mod geom;

pub use field::{Field, ScalarField};
pub use geom::{Interval, Point, Range, RangeIter};
