use std::iter::{Copied, Map};
use std::slice;

use ridge_core::Point;

const INITIAL_CAPACITY: usize = 8;

/// A traced polyline: the turning points of a grid path, in travel order
/// from start to target.
///
/// Vertices are packed as `x:32 | y:32`. A path with fewer than two
/// vertices does not traverse anything and reports
/// [`is_empty`](Self::is_empty).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    points: Vec<u64>,
}

impl Path {
    pub fn new() -> Self {
        Self {
            points: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Append a vertex at the target end.
    pub fn push(&mut self, p: Point) {
        if self.points.len() == self.points.capacity() {
            self.grow(self.points.len() + 1);
        }
        self.points.push(pack(p));
    }

    /// Drop the vertex at the target end, if any.
    pub fn remove_last(&mut self) -> Option<Point> {
        self.points.pop().map(unpack)
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the path traverses nothing (fewer than two vertices).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.len() < 2
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<Point> {
        self.points.get(i).copied().map(unpack)
    }

    #[inline]
    pub fn first(&self) -> Option<Point> {
        self.points.first().copied().map(unpack)
    }

    #[inline]
    pub fn last(&self) -> Option<Point> {
        self.points.last().copied().map(unpack)
    }

    /// Vertices from start to target.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Point> + DoubleEndedIterator + '_ {
        self.points.iter().copied().map(unpack)
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.iter().collect()
    }

    /// Expand the polyline into every grid cell it passes through.
    ///
    /// Consecutive vertices of a traced path always lie on a common row,
    /// column or diagonal, so each segment is walked one unit step at a time.
    pub fn cells(&self) -> Vec<Point> {
        let mut out = Vec::new();
        let mut it = self.iter();
        let Some(mut cur) = it.next() else {
            return out;
        };
        out.push(cur);
        for next in it {
            let step = Point::new((next.x - cur.x).signum(), (next.y - cur.y).signum());
            while cur != next {
                cur = cur + step;
                out.push(cur);
            }
        }
        out
    }

    pub(crate) fn reverse(&mut self) {
        self.points.reverse();
    }

    fn grow(&mut self, min_capacity: usize) {
        let old = self.points.capacity();
        let step = if old < 64 { old + 2 } else { old >> 1 };
        let new = (old + step).max(min_capacity);
        self.points.reserve_exact(new - self.points.len());
    }
}

impl FromIterator<Point> for Path {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut path = Path::new();
        for p in iter {
            path.push(p);
        }
        path
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = Point;
    type IntoIter = Map<Copied<slice::Iter<'a, u64>>, fn(u64) -> Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter().copied().map(unpack as fn(u64) -> Point)
    }
}

#[inline]
fn pack(p: Point) -> u64 {
    (p.x as u32 as u64) << 32 | p.y as u32 as u64
}

#[inline]
fn unpack(v: u64) -> Point {
    Point::new((v >> 32) as u32 as i32, v as u32 as i32)
}

#[cfg(feature = "serde")]
impl serde::Serialize for Path {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Path {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let points = Vec::<Point>::deserialize(deserializer)?;
        Ok(points.into_iter().collect())
    }
}
