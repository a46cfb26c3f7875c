//! Geometry primitives: [`Point`], [`Range`] and the n-dimensional
//! [`Interval`] used to describe search regions.

use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D integer point. X grows right, Y grows down (image coordinates).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self::new(0, 0);

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, o: Point) -> Point {
        Point::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, o: Point) -> Point {
        Point::new(self.x - o.x, self.y - o.y)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open rectangle: `min` is inside, `max` is one past the last
/// column and row.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// The rectangle spanned by two corners, in any order.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// `width × height` cells starting at the origin.
    #[inline]
    pub fn sized(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Width and height as a point.
    #[inline]
    pub fn size(self) -> Point {
        self.max - self.min
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.size().x
    }

    #[inline]
    pub fn height(self) -> i32 {
        self.size().y
    }

    /// Number of cells.
    #[inline]
    pub fn len(self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width() as usize * self.height() as usize
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    #[inline]
    pub fn contains(self, p: Point) -> bool {
        (self.min.x..self.max.x).contains(&p.x) && (self.min.y..self.max.y).contains(&p.y)
    }

    /// Whether every cell of `self` is also a cell of `outer`. An empty
    /// range lies within anything.
    #[inline]
    pub fn is_within(self, outer: Range) -> bool {
        self.is_empty()
            || (self.min.x >= outer.min.x
                && self.min.y >= outer.min.y
                && self.max.x <= outer.max.x
                && self.max.y <= outer.max.y)
    }

    /// Every cell, row by row.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            origin: self.min,
            width: self.width().max(0) as usize,
            next: 0,
            end: self.len(),
        }
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;

    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{} x {}..{}]",
            self.min.x, self.max.x, self.min.y, self.max.y
        )
    }
}

/// Row-major iterator over the cells of a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    origin: Point,
    width: usize,
    next: usize,
    end: usize,
}

impl Iterator for RangeIter {
    type Item = Point;

    #[inline]
    fn next(&mut self) -> Option<Point> {
        if self.next >= self.end {
            return None;
        }
        let i = self.next;
        self.next += 1;
        let (dx, dy) = (i % self.width, i / self.width);
        Some(Point::new(self.origin.x + dx as i32, self.origin.y + dy as i32))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for RangeIter {}

// ---------------------------------------------------------------------------
// Interval
// ---------------------------------------------------------------------------

/// An axis-aligned box of any dimensionality with **inclusive** bounds on
/// every axis.
///
/// Upstream image pipelines hand out regions of arbitrary dimensionality;
/// consumers that only work in 2D validate with [`Interval::to_range`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    min: Vec<i64>,
    max: Vec<i64>,
}

impl Interval {
    /// Create an interval from per-axis inclusive bounds.
    ///
    /// Returns `None` if the two slices differ in length or if `min > max`
    /// on any axis.
    pub fn new(min: &[i64], max: &[i64]) -> Option<Self> {
        if min.len() != max.len() || min.iter().zip(max).any(|(lo, hi)| lo > hi) {
            return None;
        }
        Some(Self {
            min: min.to_vec(),
            max: max.to_vec(),
        })
    }

    /// Number of axes.
    #[inline]
    pub fn num_dimensions(&self) -> usize {
        self.min.len()
    }

    /// Inclusive lower bound on axis `d`.
    #[inline]
    pub fn min(&self, d: usize) -> i64 {
        self.min[d]
    }

    /// Inclusive upper bound on axis `d`.
    #[inline]
    pub fn max(&self, d: usize) -> i64 {
        self.max[d]
    }

    /// Number of cells along axis `d`, or `None` if it does not fit an `i64`.
    #[inline]
    pub fn dimension(&self, d: usize) -> Option<i64> {
        self.max[d].checked_sub(self.min[d])?.checked_add(1)
    }

    /// The equivalent half-open 2D [`Range`], or `None` when the interval is
    /// not 2-dimensional or does not fit `i32` coordinates.
    pub fn to_range(&self) -> Option<Range> {
        if self.num_dimensions() != 2 {
            return None;
        }
        let x0 = i32::try_from(self.min[0]).ok()?;
        let y0 = i32::try_from(self.min[1]).ok()?;
        let x1 = i32::try_from(self.max[0].checked_add(1)?).ok()?;
        let y1 = i32::try_from(self.max[1].checked_add(1)?).ok()?;
        Some(Range::new(x0, y0, x1, y1))
    }
}

impl From<Range> for Interval {
    fn from(r: Range) -> Self {
        Self {
            min: vec![r.min.x as i64, r.min.y as i64],
            max: vec![r.max.x as i64 - 1, r.max.y as i64 - 1],
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for d in 0..self.num_dimensions() {
            if d > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}..={}", self.min[d], self.max[d])?;
        }
        write!(f, "]")
    }
}
