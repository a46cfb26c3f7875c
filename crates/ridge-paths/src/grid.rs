//! Per-cell search state, packed into one `u16` per cell.
//!
//! Layout (least- to most-significant):
//!
//! | bits | meaning |
//! |---|---|
//! | 0..12 | `0` unvisited, `0xFFF` closed, otherwise heap slot + 1 |
//! | 12..15 | parent direction code |
//! | 15 | blocked (persistent, survives [`Grid::clear`]) |

use crate::directions::Direction;
use crate::error::{Result, SearchError};
use crate::node::MAX_COORD;

const NODE_BITS: u32 = 12;
const NODE_MASK: u16 = (1 << NODE_BITS) - 1;
const NODE_NULL: u16 = 0;
const NODE_CLOSED: u16 = NODE_MASK;

const DIRECTION_SHIFT: u32 = NODE_BITS;
const DIRECTION_MASK: u16 = 0b111 << DIRECTION_SHIFT;

const BLOCKED_SHIFT: u32 = DIRECTION_SHIFT + 3;
const BLOCKED_MASK: u16 = 1 << BLOCKED_SHIFT;

/// Maximum number of simultaneously open cells.
///
/// Slot `0xFFF` is reserved for the closed tag and `0` for unvisited, which
/// leaves 4094 addressable heap slots. This bounds the frontier, not the
/// field: long, low-threshold searches over wide regions can hit it.
pub const MAX_OPEN_NODES: usize = NODE_MASK as usize - 1;

/// Search status of one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellStatus {
    /// Never visited in the current search.
    Null,
    /// On the open list at the given heap slot.
    Open(u16),
    /// Cost finalized.
    Closed,
}

/// Search status and parent direction for every cell of a search region.
#[derive(Clone, Debug)]
pub struct Grid {
    cells: Vec<u16>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Create a grid of `width × height` unvisited, walkable cells.
    ///
    /// Both sides must be in `1..=65536`, the coordinate range of a packed
    /// node.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SearchError::EmptyRegion);
        }
        let max = MAX_COORD as usize + 1;
        if width > max || height > max {
            return Err(SearchError::RegionTooLarge {
                width: width as i64,
                height: height as i64,
                max: max as u32,
            });
        }
        Ok(Self {
            cells: vec![0; width * height],
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn idx(&self, x: u16, y: u16) -> usize {
        debug_assert!((x as usize) < self.width && (y as usize) < self.height);
        y as usize * self.width + x as usize
    }

    /// Search status of the cell at (x, y).
    #[inline]
    pub fn status(&self, x: u16, y: u16) -> CellStatus {
        match self.cells[self.idx(x, y)] & NODE_MASK {
            NODE_NULL => CellStatus::Null,
            NODE_CLOSED => CellStatus::Closed,
            slot => CellStatus::Open(slot - 1),
        }
    }

    #[inline]
    pub fn is_walkable(&self, x: u16, y: u16) -> bool {
        self.cells[self.idx(x, y)] & BLOCKED_MASK == 0
    }

    /// Permanently allow or forbid entering the cell at (x, y).
    ///
    /// Unlike the search state this flag is kept by [`clear`](Self::clear).
    pub fn set_walkable(&mut self, x: u16, y: u16, walkable: bool) {
        let i = self.idx(x, y);
        if walkable {
            self.cells[i] &= !BLOCKED_MASK;
        } else {
            self.cells[i] |= BLOCKED_MASK;
        }
    }

    #[inline]
    pub fn mark_closed(&mut self, x: u16, y: u16) {
        let i = self.idx(x, y);
        self.cells[i] |= NODE_CLOSED;
    }

    /// Record that the cell's heap entry now lives at `slot`.
    #[inline]
    pub fn set_open_index(&mut self, x: u16, y: u16, slot: usize) {
        debug_assert!(slot < MAX_OPEN_NODES);
        let i = self.idx(x, y);
        self.cells[i] = self.cells[i] & !NODE_MASK | (slot as u16 + 1);
    }

    #[inline]
    pub fn set_parent_direction(&mut self, x: u16, y: u16, dir: Direction) {
        let i = self.idx(x, y);
        self.cells[i] =
            self.cells[i] & !DIRECTION_MASK | (dir.code() as u16) << DIRECTION_SHIFT;
    }

    /// The move that entered the cell at (x, y).
    #[inline]
    pub fn parent_direction(&self, x: u16, y: u16) -> Direction {
        let bits = (self.cells[self.idx(x, y)] & DIRECTION_MASK) >> DIRECTION_SHIFT;
        Direction::from_code(bits as u8)
    }

    /// Reset every cell to unvisited with no direction. Walkability is kept.
    pub fn clear(&mut self) {
        for c in self.cells.iter_mut() {
            *c &= BLOCKED_MASK;
        }
    }

    /// Whether no cell carries search state.
    pub fn is_clean(&self) -> bool {
        self.cells.iter().all(|&c| c & !BLOCKED_MASK == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_clean() {
        let g = Grid::new(4, 3).unwrap();
        assert!(g.is_clean());
        assert_eq!(g.status(3, 2), CellStatus::Null);
        assert!(g.is_walkable(0, 0));
    }

    #[test]
    fn rejects_bad_sizes() {
        assert_eq!(Grid::new(0, 3).unwrap_err(), SearchError::EmptyRegion);
        assert!(matches!(
            Grid::new(65_537, 1),
            Err(SearchError::RegionTooLarge { max: 65_536, .. })
        ));
    }

    #[test]
    fn status_transitions() {
        let mut g = Grid::new(4, 4).unwrap();
        g.set_open_index(1, 2, 0);
        assert_eq!(g.status(1, 2), CellStatus::Open(0));
        g.set_open_index(1, 2, MAX_OPEN_NODES - 1);
        assert_eq!(g.status(1, 2), CellStatus::Open(MAX_OPEN_NODES as u16 - 1));
        g.mark_closed(1, 2);
        assert_eq!(g.status(1, 2), CellStatus::Closed);
        assert!(!g.is_clean());
        g.clear();
        assert!(g.is_clean());
    }

    #[test]
    fn parent_direction_is_independent_of_status() {
        let mut g = Grid::new(2, 2).unwrap();
        g.set_open_index(0, 1, 17);
        for d in Direction::ALL {
            g.set_parent_direction(0, 1, d);
            assert_eq!(g.parent_direction(0, 1), d);
            assert_eq!(g.status(0, 1), CellStatus::Open(17));
        }
        // Direction bits alone make the grid dirty.
        g.clear();
        g.set_parent_direction(1, 1, Direction::Down);
        assert!(!g.is_clean());
    }

    #[test]
    fn walkable_survives_clear() {
        let mut g = Grid::new(3, 3).unwrap();
        g.set_walkable(1, 1, false);
        g.set_open_index(1, 1, 4);
        g.set_parent_direction(1, 1, Direction::RightDown);
        g.clear();
        assert!(g.is_clean());
        assert!(!g.is_walkable(1, 1));
        assert_eq!(g.status(1, 1), CellStatus::Null);
        g.set_walkable(1, 1, true);
        assert!(g.is_walkable(1, 1));
    }

    #[test]
    fn capacity_matches_slot_bits() {
        assert_eq!(MAX_OPEN_NODES, 4094);
    }
}
