use std::fmt;

use ridge_core::{Interval, Point, Range, ScalarField};

use crate::directions::{Direction, Directions};
use crate::error::{Result, SearchError};
use crate::grid::{CellStatus, Grid};
use crate::heuristics::{Heuristic, Heuristics};
use crate::node::MAX_COST;
use crate::nodes::Nodes;
use crate::params::{TracingParameters, check_penalty, check_threshold};
use crate::path::Path;

/// Result of a search that ran to completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A least-cost path was found. `cost` is the accumulated cost at the
    /// target.
    Found { path: Path, cost: u32 },
    /// The open set ran dry before the target was reached.
    Unreachable,
    /// Start and target are the same cell.
    Trivial,
}

impl SearchOutcome {
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }

    /// Cost at the target; zero for [`Trivial`](Self::Trivial).
    pub fn cost(&self) -> Option<u32> {
        match self {
            SearchOutcome::Found { cost, .. } => Some(*cost),
            SearchOutcome::Trivial => Some(0),
            SearchOutcome::Unreachable => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchOutcome::Found { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The traced path, empty unless [`Found`](Self::Found).
    pub fn into_path(self) -> Path {
        match self {
            SearchOutcome::Found { path, .. } => path,
            _ => Path::new(),
        }
    }
}

/// Snapshot handed to a search's control hook before every expansion.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    /// Cells closed so far.
    pub expanded: usize,
    /// Cells currently on the open list.
    pub open: usize,
}

/// Whether a running search should go on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Control {
    Continue,
    Stop,
}

/// Intensity-guided A* over a 2D scalar field.
///
/// The search region is fixed at construction; start, target and returned
/// vertices are grid-local, with `(0, 0)` at the region's min corner.
/// Bright cells are cheap, cells below the threshold are impassable.
///
/// The instance owns its scratch state ([`Grid`] and open list) and reuses
/// it for every call, so searches on one instance are serialized through
/// `&mut self`. Every call leaves the scratch state clean, whatever its
/// outcome. Concurrent tracing needs one instance per thread.
pub struct AStar2D<F> {
    field: F,
    region: Range,
    grid: Grid,
    nodes: Nodes,
    min: f64,
    max: f64,
    threshold: f64,
    intensity_penalty: f64,
    heuristic: Box<dyn Heuristic + Send>,
    directions: Directions,
}

impl<F: ScalarField> AStar2D<F> {
    /// Prepare a search over `interval` of `field`.
    ///
    /// Scans the region once for its minimum and maximum value. Fails if the
    /// field or the interval is not 2D, or if the region does not fit the
    /// grid encoding or the field.
    pub fn new(field: F, interval: &Interval) -> Result<Self> {
        if field.num_dimensions() != 2 {
            return Err(SearchError::InvalidDimensionality(field.num_dimensions()));
        }
        if interval.num_dimensions() != 2 {
            return Err(SearchError::InvalidDimensionality(interval.num_dimensions()));
        }
        // A side too long for an i64 is reported as i64::MAX.
        let side = |d: usize| interval.dimension(d).unwrap_or(i64::MAX);
        let (width, height) = (side(0), side(1));
        let max_side = crate::node::MAX_COORD as i64 + 1;
        if width > max_side || height > max_side {
            return Err(SearchError::RegionTooLarge {
                width,
                height,
                max: max_side as u32,
            });
        }
        let region = interval.to_range().ok_or(SearchError::RegionTooLarge {
            width,
            height,
            max: max_side as u32,
        })?;
        if let Some(extent) = field.extent() {
            if !region.is_within(extent) {
                return Err(SearchError::IntervalOutsideField);
            }
        }
        let grid = Grid::new(width as usize, height as usize)?;

        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in region {
            let v = field.value(p);
            if v > max {
                max = v;
            }
            if v < min {
                min = v;
            }
        }
        log::trace!("tracing region {region}: intensity range [{min}, {max}]");

        let defaults = TracingParameters::default();
        Ok(Self {
            field,
            region,
            grid,
            nodes: Nodes::new(),
            min,
            max,
            threshold: defaults.threshold,
            intensity_penalty: defaults.penalty,
            heuristic: Box::new(Heuristics::default()),
            directions: Directions::default(),
        })
    }

    /// Prepare a search over a half-open 2D range of `field`.
    pub fn with_range(field: F, range: Range) -> Result<Self> {
        if range.is_empty() {
            return Err(SearchError::EmptyRegion);
        }
        Self::new(field, &Interval::from(range))
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Set the fraction of the `[min, max]` range below which cells are
    /// impassable.
    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        check_threshold(threshold)?;
        self.threshold = threshold;
        Ok(())
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Set the extra cost applied to dim but passable cells.
    pub fn set_intensity_penalty(&mut self, penalty: f64) -> Result<()> {
        check_penalty(penalty)?;
        self.intensity_penalty = penalty;
        Ok(())
    }

    #[inline]
    pub fn intensity_penalty(&self) -> f64 {
        self.intensity_penalty
    }

    /// Apply threshold and penalty in one go. Nothing changes on error.
    pub fn configure(&mut self, params: &TracingParameters) -> Result<()> {
        params.validate()?;
        self.threshold = params.threshold;
        self.intensity_penalty = params.penalty;
        Ok(())
    }

    pub fn parameters(&self) -> TracingParameters {
        TracingParameters {
            threshold: self.threshold,
            penalty: self.intensity_penalty,
        }
    }

    pub fn set_heuristic(&mut self, heuristic: impl Heuristic + Send + 'static) {
        self.heuristic = Box::new(heuristic);
    }

    pub fn set_directions(&mut self, directions: Directions) {
        self.directions = directions;
    }

    #[inline]
    pub fn directions(&self) -> &Directions {
        &self.directions
    }

    /// Permanently forbid (or allow again) entering the grid-local cell `p`.
    pub fn set_walkable(&mut self, p: Point, walkable: bool) -> Result<()> {
        let (x, y) = self.local(p)?;
        self.grid.set_walkable(x, y, walkable);
        Ok(())
    }

    pub fn is_walkable(&self, p: Point) -> Result<bool> {
        let (x, y) = self.local(p)?;
        Ok(self.grid.is_walkable(x, y))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The searched region in field coordinates.
    #[inline]
    pub fn region(&self) -> Range {
        self.region
    }

    /// Size of the grid: width and height of the region.
    #[inline]
    pub fn size(&self) -> Point {
        self.region.size()
    }

    /// Smallest value found in the region at construction.
    #[inline]
    pub fn min_intensity(&self) -> f64 {
        self.min
    }

    /// Largest value found in the region at construction.
    #[inline]
    pub fn max_intensity(&self) -> f64 {
        self.max
    }

    /// Field value below which cells are impassable with the current
    /// threshold.
    #[inline]
    pub fn cutoff(&self) -> f64 {
        self.cost_model().cutoff
    }

    #[inline]
    pub fn field(&self) -> &F {
        &self.field
    }

    /// Whether the scratch state carries nothing from a previous search.
    pub fn is_clean(&self) -> bool {
        self.nodes.is_empty() && self.grid.is_clean()
    }

    // -----------------------------------------------------------------------
    // Searching
    // -----------------------------------------------------------------------

    /// Least-cost path from `start` to `target`, as turning points.
    ///
    /// The path is empty when `start == target` or when no passable route
    /// exists; use [`trace`](Self::trace) to tell the two apart.
    pub fn search(&mut self, start: Point, target: Point) -> Result<Path> {
        Ok(self.trace(start, target, false)?.into_path())
    }

    /// Like [`search`](Self::search), but keep only a straight segment
    /// between `start` and `target` for live preview.
    pub fn search_smooth(&mut self, start: Point, target: Point) -> Result<Path> {
        Ok(self.trace(start, target, true)?.into_path())
    }

    /// Search into a caller-owned buffer, which is cleared first.
    ///
    /// Returns the cost at the target when a path was found. The buffer is
    /// left empty on every other outcome, including errors.
    pub fn search_into(
        &mut self,
        start: Point,
        target: Point,
        path: &mut Path,
        smooth: bool,
    ) -> Result<Option<u32>> {
        self.run(start, target, path, smooth, &mut |_| Control::Continue)
    }

    /// Search and report how it ended.
    pub fn trace(&mut self, start: Point, target: Point, smooth: bool) -> Result<SearchOutcome> {
        self.trace_with(start, target, smooth, &mut |_| Control::Continue)
    }

    pub(crate) fn trace_with(
        &mut self,
        start: Point,
        target: Point,
        smooth: bool,
        control: &mut dyn FnMut(Progress) -> Control,
    ) -> Result<SearchOutcome> {
        if start == target {
            // Still reject positions outside the grid.
            self.local(start)?;
            return Ok(SearchOutcome::Trivial);
        }
        let mut path = Path::new();
        let found = self.run(start, target, &mut path, smooth, control)?;
        Ok(match found {
            Some(cost) => SearchOutcome::Found { path, cost },
            None => SearchOutcome::Unreachable,
        })
    }

    /// The search loop, calling `control` before every expansion.
    pub(crate) fn run(
        &mut self,
        start: Point,
        target: Point,
        path: &mut Path,
        smooth: bool,
        control: &mut dyn FnMut(Progress) -> Control,
    ) -> Result<Option<u32>> {
        debug_assert!(self.is_clean());
        path.clear();
        let (sx, sy) = self.local(start)?;
        let (tx, ty) = self.local(target)?;
        if start == target {
            return Ok(None);
        }

        let model = self.cost_model();
        let mut search = Search {
            field: &self.field,
            origin: self.region.min,
            width: self.grid.width() as i32,
            height: self.grid.height() as i32,
            grid: &mut self.grid,
            nodes: &mut self.nodes,
            heuristic: self.heuristic.as_ref(),
            directions: &self.directions,
            model,
            target,
            expanded: 0,
        };
        let result = search.run(control, (sx, sy), (tx, ty), path, smooth);
        let expanded = search.expanded;
        drop(search);
        debug_assert!(self.is_clean());

        match &result {
            Ok(Some(cost)) => log::debug!(
                "traced {start} -> {target}: cost {cost}, {} vertices, {expanded} cells expanded",
                path.len()
            ),
            Ok(None) => log::debug!(
                "no path {start} -> {target} above cutoff {:.3} ({expanded} cells expanded)",
                model.cutoff
            ),
            Err(SearchError::Cancelled) => {
                path.clear();
                log::debug!("search {start} -> {target} cancelled after {expanded} cells");
            }
            Err(e) => {
                path.clear();
                log::warn!("search {start} -> {target} aborted after {expanded} cells: {e}");
            }
        }
        result
    }

    fn cost_model(&self) -> CostModel {
        let cutoff = self.min + self.threshold * (self.max - self.min);
        CostModel {
            cutoff,
            max: self.max,
            span: self.max - cutoff,
            penalty: self.intensity_penalty,
        }
    }

    fn local(&self, p: Point) -> Result<(u16, u16)> {
        let size = self.region.size();
        if p.x < 0 || p.y < 0 || p.x >= size.x || p.y >= size.y {
            return Err(SearchError::OutOfBounds(p));
        }
        Ok((p.x as u16, p.y as u16))
    }
}

impl<F> fmt::Debug for AStar2D<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AStar2D")
            .field("region", &self.region)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("threshold", &self.threshold)
            .field("intensity_penalty", &self.intensity_penalty)
            .field("directions", &self.directions)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Cost model
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug)]
struct CostModel {
    cutoff: f64,
    max: f64,
    /// `max - cutoff`; the penalty term vanishes when this is not positive.
    span: f64,
    penalty: f64,
}

impl CostModel {
    /// Step-cost multiplier for entering a cell of value `v`, or `None` if
    /// the cell is impassable.
    #[inline]
    fn weight(&self, v: f64) -> Option<u32> {
        if !(v >= self.cutoff) {
            return None;
        }
        let extra = if self.span > 0.0 {
            self.penalty * (self.max - v) / self.span
        } else {
            0.0
        };
        Some((1.0 + extra) as u32)
    }
}

// ---------------------------------------------------------------------------
// A single search over borrowed scratch state
// ---------------------------------------------------------------------------

struct Search<'a, F> {
    field: &'a F,
    origin: Point,
    width: i32,
    height: i32,
    grid: &'a mut Grid,
    nodes: &'a mut Nodes,
    heuristic: &'a (dyn Heuristic + Send),
    directions: &'a Directions,
    model: CostModel,
    target: Point,
    expanded: usize,
}

impl<F> Drop for Search<'_, F> {
    fn drop(&mut self) {
        self.nodes.clear(self.grid);
    }
}

impl<F: ScalarField> Search<'_, F> {
    fn run(
        &mut self,
        control: &mut dyn FnMut(Progress) -> Control,
        (sx, sy): (u16, u16),
        (tx, ty): (u16, u16),
        path: &mut Path,
        smooth: bool,
    ) -> Result<Option<u32>> {
        let start = Point::new(sx as i32, sy as i32);
        let h = self.heuristic.cost(start, self.target);
        self.nodes.open(self.grid, sx, sy, 0, h, Direction::Up)?;

        loop {
            let progress = Progress {
                expanded: self.expanded,
                open: self.nodes.len(),
            };
            if control(progress) == Control::Stop {
                return Err(SearchError::Cancelled);
            }

            let Some(n) = self.nodes.close(self.grid) else {
                return Ok(None);
            };
            self.expanded += 1;

            let (x, y) = (n.x(), n.y());
            if (x, y) == (tx, ty) {
                self.fill_path(start, path, smooth);
                return Ok(Some(n.g()));
            }

            let directions = self.directions;
            for dir in directions {
                self.relax(x, y, dir, n.g())?;
            }
        }
    }

    /// Open or improve the neighbour of (x0, y0) in direction `dir`.
    fn relax(&mut self, x0: u16, y0: u16, dir: Direction, pg: u32) -> Result<()> {
        let p = Point::new(x0 as i32, y0 as i32) + dir.offset();
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return Ok(());
        }
        let (x, y) = (p.x as u16, p.y as u16);
        let status = self.grid.status(x, y);
        if status == CellStatus::Closed || !self.grid.is_walkable(x, y) {
            return Ok(());
        }
        let Some(weight) = self.model.weight(self.field.value(self.origin + p)) else {
            return Ok(());
        };
        let g = pg as u64 + dir.base_cost() as u64 * weight as u64;

        match status {
            CellStatus::Null => {
                let g = fit_cost(g)?;
                let h = self.heuristic.cost(p, self.target);
                self.nodes.open(self.grid, x, y, g, h, dir)
            }
            CellStatus::Open(slot) => {
                let slot = slot as usize;
                let n = self.nodes.get_open(slot);
                if g >= n.g() as u64 {
                    return Ok(());
                }
                let g = fit_cost(g)?;
                let n = n.with_cost(g, n.f() - n.g() + g)?;
                self.nodes.reprioritize(self.grid, n, slot, dir);
                Ok(())
            }
            CellStatus::Closed => Ok(()),
        }
    }

    /// Walk parent directions back from the target, emitting turning points.
    fn fill_path(&self, start: Point, path: &mut Path, smooth: bool) {
        let mut cur = self.target;
        emit(path, cur, smooth);
        let mut dir = self.parent(cur);
        // A parent chain never revisits a cell.
        let mut budget = self.width as usize * self.height as usize;
        loop {
            cur = cur + dir.opposite().offset();
            if cur == start || budget == 0 {
                debug_assert!(cur == start, "parent chain does not reach the start");
                emit(path, cur, smooth);
                break;
            }
            budget -= 1;
            let pd = self.parent(cur);
            if pd != dir {
                emit(path, cur, smooth);
                dir = pd;
            }
        }
        path.reverse();
    }

    #[inline]
    fn parent(&self, p: Point) -> Direction {
        self.grid.parent_direction(p.x as u16, p.y as u16)
    }
}

#[inline]
fn emit(path: &mut Path, p: Point, smooth: bool) {
    if smooth {
        while path.len() >= 2 {
            path.remove_last();
        }
    }
    path.push(p);
}

#[inline]
fn fit_cost(g: u64) -> Result<u32> {
    if g > MAX_COST as u64 {
        return Err(SearchError::CostOverflow {
            cost: g,
            max: MAX_COST,
        });
    }
    Ok(g as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridge_core::Field;

    struct Volume;

    impl ScalarField for Volume {
        fn num_dimensions(&self) -> usize {
            3
        }

        fn value(&self, _: Point) -> f64 {
            1.0
        }
    }

    struct Unbounded;

    impl ScalarField for Unbounded {
        fn value(&self, p: Point) -> f64 {
            (p.x + p.y) as f64
        }
    }

    fn uniform(w: i32, h: i32) -> AStar2D<Field> {
        AStar2D::with_range(Field::new(w, h, 1.0), Range::sized(w, h)).unwrap()
    }

    #[test]
    fn rejects_non_2d_inputs() {
        let iv = Interval::new(&[0, 0], &[3, 3]).unwrap();
        let err = AStar2D::new(Volume, &iv).unwrap_err();
        assert_eq!(err, SearchError::InvalidDimensionality(3));

        let iv3 = Interval::new(&[0, 0, 0], &[3, 3, 3]).unwrap();
        let err = AStar2D::new(Field::new(4, 4, 1.0), &iv3).unwrap_err();
        assert_eq!(err, SearchError::InvalidDimensionality(3));
    }

    #[test]
    fn rejects_regions_outside_field_or_too_large() {
        let iv = Interval::new(&[2, 2], &[6, 6]).unwrap();
        let err = AStar2D::new(Field::new(5, 5, 1.0), &iv).unwrap_err();
        assert_eq!(err, SearchError::IntervalOutsideField);

        let huge = Interval::new(&[0, 0], &[70_000, 10]).unwrap();
        let err = AStar2D::new(Unbounded, &huge).unwrap_err();
        assert!(matches!(err, SearchError::RegionTooLarge { width: 70_001, height: 11, .. }));

        let unbounded = Interval::new(&[i64::MIN, 0], &[i64::MAX, 3]).unwrap();
        let err = AStar2D::new(Unbounded, &unbounded).unwrap_err();
        assert!(matches!(err, SearchError::RegionTooLarge { width: i64::MAX, height: 4, .. }));

        let err = AStar2D::with_range(Field::new(5, 5, 1.0), Range::sized(0, 5)).unwrap_err();
        assert_eq!(err, SearchError::EmptyRegion);
    }

    #[test]
    fn scans_region_min_and_max() {
        let iv = Interval::new(&[2, 1], &[4, 3]).unwrap();
        let astar = AStar2D::new(Unbounded, &iv).unwrap();
        assert_eq!(astar.min_intensity(), 3.0);
        assert_eq!(astar.max_intensity(), 7.0);
        assert_eq!(astar.cutoff(), 5.0);
        assert_eq!(astar.size(), Point::new(3, 3));
    }

    #[test]
    fn weights() {
        let m = CostModel {
            cutoff: 0.5,
            max: 1.0,
            span: 0.5,
            penalty: 10.0,
        };
        assert_eq!(m.weight(1.0), Some(1));
        assert_eq!(m.weight(0.75), Some(6));
        assert_eq!(m.weight(0.5), Some(11));
        assert_eq!(m.weight(0.4), None);
        assert_eq!(m.weight(f64::NAN), None);

        let flat = CostModel {
            cutoff: 2.0,
            max: 2.0,
            span: 0.0,
            penalty: 10.0,
        };
        assert_eq!(flat.weight(2.0), Some(1));
    }

    #[test]
    fn region_offset_is_applied_to_field_reads() {
        // A bright column at field x = 7, which is grid-local x = 2.
        let mut field = Field::new(10, 5, 0.0);
        field.fill_range(Range::new(7, 0, 8, 5), 1.0);
        let mut astar = AStar2D::with_range(field, Range::new(5, 0, 10, 5)).unwrap();
        let path = astar.search(Point::new(2, 0), Point::new(2, 4)).unwrap();
        assert_eq!(path.to_vec(), vec![Point::new(2, 0), Point::new(2, 4)]);
    }

    #[test]
    fn out_of_bounds_positions() {
        let mut astar = uniform(4, 4);
        let err = astar.search(Point::new(0, 0), Point::new(4, 0)).unwrap_err();
        assert_eq!(err, SearchError::OutOfBounds(Point::new(4, 0)));
        let err = astar.trace(Point::new(-1, 2), Point::new(-1, 2), false).unwrap_err();
        assert_eq!(err, SearchError::OutOfBounds(Point::new(-1, 2)));
        assert!(astar.set_walkable(Point::new(0, 9), false).is_err());
        assert!(astar.is_clean());
    }

    #[test]
    fn invalid_parameters_leave_configuration_unchanged() {
        let mut astar = uniform(3, 3);
        assert!(astar.set_threshold(1.2).is_err());
        assert_eq!(astar.threshold(), 0.5);
        assert!(astar.set_intensity_penalty(-1.0).is_err());
        assert_eq!(astar.intensity_penalty(), 10.0);

        let bad = TracingParameters {
            threshold: 0.1,
            penalty: f64::NAN,
        };
        assert!(astar.configure(&bad).is_err());
        assert_eq!(astar.parameters(), TracingParameters::default());

        let good = TracingParameters::new(0.2, 3.0).unwrap();
        astar.configure(&good).unwrap();
        assert_eq!(astar.parameters(), good);
    }

    #[test]
    fn search_into_reuses_buffer() {
        let mut astar = uniform(6, 6);
        let mut path = Path::new();
        let cost = astar
            .search_into(Point::new(0, 0), Point::new(5, 0), &mut path, false)
            .unwrap();
        assert_eq!(cost, Some(25));
        assert_eq!(path.to_vec(), vec![Point::new(0, 0), Point::new(5, 0)]);

        astar.set_walkable(Point::new(5, 5), false).unwrap();
        let cost = astar
            .search_into(Point::new(0, 0), Point::new(5, 5), &mut path, false)
            .unwrap();
        assert_eq!(cost, None);
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
    }

    #[test]
    fn outcome_accessors() {
        let mut astar = uniform(5, 5);
        let found = astar.trace(Point::new(0, 0), Point::new(4, 4), false).unwrap();
        assert!(found.is_found());
        assert_eq!(found.cost(), Some(28));
        assert_eq!(found.path().map(Path::len), Some(2));

        let trivial = astar.trace(Point::new(2, 2), Point::new(2, 2), false).unwrap();
        assert_eq!(trivial, SearchOutcome::Trivial);
        assert_eq!(trivial.cost(), Some(0));
        assert!(trivial.into_path().is_empty());
    }
}
