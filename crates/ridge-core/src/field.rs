//! Read-only scalar fields.
//!
//! [`ScalarField`] is the seam between the upstream image pipeline (slicing,
//! ridge filtering) and the tracer: anything that can report a value at an
//! integer position can be searched. [`Field`] is an owned `f64` raster for
//! the common case and for tests.

use crate::geom::{Point, Range};

/// A scalar value reader over a fixed, finite extent.
pub trait ScalarField {
    /// Number of axes the field is defined over.
    fn num_dimensions(&self) -> usize {
        2
    }

    /// The points at which [`value`](Self::value) is defined, when known.
    ///
    /// Fields that cannot describe their extent return `None` and the caller
    /// trusts the search region it was given.
    fn extent(&self) -> Option<Range> {
        None
    }

    /// The value at `p`.
    fn value(&self, p: Point) -> f64;
}

impl<T: ScalarField + ?Sized> ScalarField for &T {
    fn num_dimensions(&self) -> usize {
        (**self).num_dimensions()
    }

    fn extent(&self) -> Option<Range> {
        (**self).extent()
    }

    fn value(&self, p: Point) -> f64 {
        (**self).value(p)
    }
}

/// An owned, row-major 2D raster of `f64` values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    bounds: Range,
    values: Vec<f64>,
}

impl Field {
    /// Create a `width × height` field anchored at the origin, filled with
    /// `fill`.
    pub fn new(width: i32, height: i32, fill: f64) -> Self {
        let bounds = Range::sized(width.max(0), height.max(0));
        Self {
            bounds,
            values: vec![fill; bounds.len()],
        }
    }

    /// Create a field over `bounds` by evaluating `f` at every point.
    pub fn from_fn(bounds: Range, mut f: impl FnMut(Point) -> f64) -> Self {
        let values = bounds.iter().map(&mut f).collect();
        Self { bounds, values }
    }

    /// Wrap row-major `values` as a `width × height` field anchored at the
    /// origin. Returns `None` if the length does not match.
    pub fn from_vec(width: i32, height: i32, values: Vec<f64>) -> Option<Self> {
        let bounds = Range::sized(width.max(0), height.max(0));
        if values.len() != bounds.len() {
            return None;
        }
        Some(Self { bounds, values })
    }

    /// Parse a field from rows of whitespace-separated numbers.
    ///
    /// Blank lines are ignored. Returns `None` on a malformed number or
    /// ragged rows.
    pub fn parse(text: &str) -> Option<Self> {
        let mut values = Vec::new();
        let mut width = None;
        let mut height = 0;
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let before = values.len();
            for tok in line.split_whitespace() {
                values.push(tok.parse::<f64>().ok()?);
            }
            let w = values.len() - before;
            match width {
                None => width = Some(w),
                Some(prev) if prev != w => return None,
                Some(_) => {}
            }
            height += 1;
        }
        Self::from_vec(width.unwrap_or(0) as i32, height, values)
    }

    /// The points covered by the field.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Value at `p`, or `0.0` outside the field.
    #[inline]
    pub fn at(&self, p: Point) -> f64 {
        self.index(p).map_or(0.0, |i| self.values[i])
    }

    /// Set the value at `p`. Points outside the field are ignored.
    #[inline]
    pub fn set(&mut self, p: Point, v: f64) {
        if let Some(i) = self.index(p) {
            self.values[i] = v;
        }
    }

    /// Set every point of `r` (clipped to the field) to `v`.
    pub fn fill_range(&mut self, r: Range, v: f64) {
        let bounds = self.bounds;
        for p in r.iter().filter(|&p| bounds.contains(p)) {
            self.set(p, v);
        }
    }

    /// Row-major view of the raw values.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        let x = (p.x - self.bounds.min.x) as usize;
        let y = (p.y - self.bounds.min.y) as usize;
        Some(y * self.bounds.width() as usize + x)
    }
}

impl ScalarField for Field {
    fn extent(&self) -> Option<Range> {
        Some(self.bounds)
    }

    fn value(&self, p: Point) -> f64 {
        self.at(p)
    }
}
