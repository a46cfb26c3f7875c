use ridge_core::Point;

use crate::directions::{COST_DIAGONAL, COST_ORTHOGONAL};

/// Estimate of the remaining cost from `current` to `target`, in step-cost
/// units.
///
/// Implementations must never overestimate the cheapest path (admissible)
/// and must not drop by more than the cost of a step between neighbours
/// (consistent); the search never reopens a closed cell.
pub trait Heuristic {
    fn cost(&self, current: Point, target: Point) -> u32;
}

impl<F: Fn(Point, Point) -> u32> Heuristic for F {
    fn cost(&self, current: Point, target: Point) -> u32 {
        self(current, target)
    }
}

/// The built-in distance estimators.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heuristics {
    /// Largest axis distance times the orthogonal step cost.
    #[default]
    Chebyshev,
    /// Straight-line distance, scaled so that a pure diagonal run costs
    /// exactly [`COST_DIAGONAL`] per step.
    Euclidean,
}

impl Heuristic for Heuristics {
    fn cost(&self, current: Point, target: Point) -> u32 {
        match self {
            Heuristics::Chebyshev => chebyshev(current, target) * COST_ORTHOGONAL,
            Heuristics::Euclidean => {
                // floor(d × 7 / √2) computed exactly as isqrt(49 d² / 2).
                let dx = current.x.abs_diff(target.x) as u64;
                let dy = current.y.abs_diff(target.y) as u64;
                let d2 = dx * dx + dy * dy;
                let c2 = (COST_DIAGONAL * COST_DIAGONAL) as u64;
                (c2 * d2 / 2).isqrt() as u32
            }
        }
    }
}

/// Chebyshev (L∞) distance between two points.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> u32 {
    a.x.abs_diff(b.x).max(a.y.abs_diff(b.y))
}

/// Euclidean (L2) distance between two points.
#[inline]
pub fn euclidean(a: Point, b: Point) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx.hypot(dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::Direction;

    #[test]
    fn distances() {
        let a = Point::new(1, 2);
        let b = Point::new(4, -2);
        assert_eq!(chebyshev(a, b), 4);
        assert_eq!(euclidean(a, b), 5.0);
    }

    #[test]
    fn chebyshev_scaled_by_orthogonal_step() {
        let h = Heuristics::Chebyshev;
        assert_eq!(h.cost(Point::new(0, 0), Point::new(4, 4)), 20);
        assert_eq!(h.cost(Point::new(3, 0), Point::new(0, 1)), 15);
        assert_eq!(h.cost(Point::new(2, 2), Point::new(2, 2)), 0);
    }

    #[test]
    fn euclidean_matches_step_costs_on_axes_and_diagonals() {
        let h = Heuristics::Euclidean;
        for n in 1..200 {
            let diag = h.cost(Point::ZERO, Point::new(n, n));
            assert_eq!(diag, COST_DIAGONAL * n as u32);
            let straight = h.cost(Point::ZERO, Point::new(n, 0));
            assert!(straight <= COST_ORTHOGONAL * n as u32);
        }
    }

    #[test]
    fn builtins_are_consistent() {
        // h(a) <= step(a, b) + h(b) for every neighbour b of a.
        let target = Point::new(7, -3);
        for h in [Heuristics::Chebyshev, Heuristics::Euclidean] {
            for a in ridge_core::Range::new(-10, -10, 10, 10) {
                for d in Direction::ALL {
                    let b = a + d.offset();
                    assert!(
                        h.cost(a, target) <= d.base_cost() + h.cost(b, target),
                        "{h:?} inconsistent between {a} and {b}"
                    );
                }
            }
        }
    }

    #[test]
    fn closures_are_heuristics() {
        let zero = |_: Point, _: Point| -> u32 { 0 };
        assert_eq!(zero.cost(Point::ZERO, Point::new(9, 9)), 0);
    }
}
