//! The open list: a 4-ary min-heap of packed nodes ordered by `f`.
//!
//! Every time an entry moves, its new slot is written back into the
//! [`Grid`], so an open cell can be found and re-prioritised in O(log n)
//! without scanning the heap.

use crate::directions::Direction;
use crate::error::{Result, SearchError};
use crate::grid::{Grid, MAX_OPEN_NODES};
use crate::node::Node;

const HEAP_SHIFT: u32 = 2;
const INITIAL_CAPACITY: usize = 16;

/// Open-list storage. The backing array is kept across searches.
#[derive(Debug, Clone)]
pub struct Nodes {
    heap: Vec<Node>,
}

impl Default for Nodes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nodes {
    pub fn new() -> Self {
        Self {
            heap: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Number of open nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Current size of the backing array.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }

    /// Add an unvisited cell to the open list.
    ///
    /// `h` is the heuristic estimate to the target, `dir` the move that
    /// reached the cell.
    pub fn open(
        &mut self,
        grid: &mut Grid,
        x: u16,
        y: u16,
        g: u32,
        h: u32,
        dir: Direction,
    ) -> Result<()> {
        if self.heap.len() >= MAX_OPEN_NODES {
            return Err(SearchError::CapacityExceeded {
                max: MAX_OPEN_NODES,
            });
        }
        let node = Node::pack(x, y, g, g.saturating_add(h))?;
        if self.heap.len() == self.heap.capacity() {
            self.grow(self.heap.len() + 1);
        }
        grid.set_parent_direction(x, y, dir);
        let slot = self.heap.len();
        self.heap.push(node);
        self.sift_up(grid, slot, node);
        Ok(())
    }

    /// Remove the node with the lowest `f` and mark its cell closed.
    pub fn close(&mut self, grid: &mut Grid) -> Option<Node> {
        let last = self.heap.pop()?;
        let top = if self.heap.is_empty() {
            last
        } else {
            let top = self.heap[0];
            self.sift_down(grid, 0, last);
            top
        };
        grid.mark_closed(top.x(), top.y());
        Some(top)
    }

    /// The open node at heap slot `slot`.
    #[inline]
    pub fn get_open(&self, slot: usize) -> Node {
        debug_assert!(slot < self.heap.len());
        self.heap[slot]
    }

    /// Replace the open node at `slot` by `node`, which must have a lower or
    /// equal `f`, and record its new parent direction.
    pub fn reprioritize(&mut self, grid: &mut Grid, node: Node, slot: usize, dir: Direction) {
        debug_assert!(node.f() <= self.heap[slot].f());
        self.sift_up(grid, slot, node);
        grid.set_parent_direction(node.x(), node.y(), dir);
    }

    /// Empty the open list and reset `grid`. The backing array is kept.
    pub fn clear(&mut self, grid: &mut Grid) {
        self.heap.clear();
        grid.clear();
    }

    /// Iterate the open nodes in heap order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Node)> + '_ {
        self.heap.iter().copied().enumerate()
    }

    fn sift_up(&mut self, grid: &mut Grid, mut i: usize, node: Node) {
        let nf = node.f();
        while i > 0 {
            let pi = (i - 1) >> HEAP_SHIFT;
            let p = self.heap[pi];
            if nf >= p.f() {
                break;
            }
            self.set(grid, i, p);
            i = pi;
        }
        self.set(grid, i, node);
    }

    fn sift_down(&mut self, grid: &mut Grid, mut i: usize, node: Node) {
        let nf = node.f();
        let size = self.heap.len();
        loop {
            let first = (i << HEAP_SHIFT) + 1;
            if first >= size {
                break;
            }
            let end = (first + (1 << HEAP_SHIFT)).min(size);
            let mut ci = first;
            for j in first + 1..end {
                if self.heap[j].f() < self.heap[ci].f() {
                    ci = j;
                }
            }
            let c = self.heap[ci];
            if nf <= c.f() {
                break;
            }
            self.set(grid, i, c);
            i = ci;
        }
        self.set(grid, i, node);
    }

    #[inline]
    fn set(&mut self, grid: &mut Grid, slot: usize, node: Node) {
        self.heap[slot] = node;
        grid.set_open_index(node.x(), node.y(), slot);
    }

    fn grow(&mut self, min_capacity: usize) {
        let old = self.heap.capacity();
        let step = if old < 64 { old + 2 } else { old >> 1 };
        let new = (old + step).max(min_capacity);
        self.heap.reserve_exact(new - self.heap.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellStatus;

    fn assert_index_synced(nodes: &Nodes, grid: &Grid) {
        for (slot, n) in nodes.iter() {
            assert_eq!(grid.status(n.x(), n.y()), CellStatus::Open(slot as u16));
        }
    }

    fn assert_heap_ordered(nodes: &Nodes) {
        let v: Vec<Node> = nodes.iter().map(|(_, n)| n).collect();
        for i in 1..v.len() {
            let parent = (i - 1) >> HEAP_SHIFT;
            assert!(v[parent].f() <= v[i].f(), "heap order broken at {i}");
        }
    }

    #[test]
    fn close_returns_in_f_order() {
        let mut grid = Grid::new(16, 16).unwrap();
        let mut nodes = Nodes::new();
        let hs = [9, 3, 14, 1, 7, 7, 0, 12, 5, 2, 11];
        for (i, &h) in hs.iter().enumerate() {
            nodes.open(&mut grid, i as u16, 0, 0, h, Direction::Up).unwrap();
            assert_index_synced(&nodes, &grid);
            assert_heap_ordered(&nodes);
        }
        let mut fs = Vec::new();
        while let Some(n) = nodes.close(&mut grid) {
            assert_eq!(grid.status(n.x(), n.y()), CellStatus::Closed);
            assert_index_synced(&nodes, &grid);
            assert_heap_ordered(&nodes);
            fs.push(n.f());
        }
        let mut sorted = hs.to_vec();
        sorted.sort_unstable();
        assert_eq!(fs, sorted);
    }

    #[test]
    fn close_on_empty_is_none() {
        let mut grid = Grid::new(2, 2).unwrap();
        let mut nodes = Nodes::new();
        assert!(nodes.close(&mut grid).is_none());
        assert!(grid.is_clean());
    }

    #[test]
    fn reprioritize_moves_node_to_top() {
        let mut grid = Grid::new(8, 8).unwrap();
        let mut nodes = Nodes::new();
        for x in 0..8u16 {
            nodes.open(&mut grid, x, 3, 10, 10 + x as u32, Direction::Right).unwrap();
        }
        let CellStatus::Open(slot) = grid.status(7, 3) else {
            panic!("expected (7, 3) to be open");
        };
        let n = nodes.get_open(slot as usize);
        assert_eq!(n.f(), 27);
        let better = n.with_cost(1, n.f() - n.g() + 1).unwrap();
        nodes.reprioritize(&mut grid, better, slot as usize, Direction::LeftDown);
        assert_index_synced(&nodes, &grid);
        assert_heap_ordered(&nodes);
        assert_eq!(grid.parent_direction(7, 3), Direction::LeftDown);

        let top = nodes.close(&mut grid).unwrap();
        assert_eq!((top.x(), top.y(), top.g(), top.f()), (7, 3, 1, 18));
    }

    #[test]
    fn open_records_parent_direction() {
        let mut grid = Grid::new(4, 4).unwrap();
        let mut nodes = Nodes::new();
        nodes.open(&mut grid, 2, 2, 0, 5, Direction::LeftUp).unwrap();
        assert_eq!(grid.parent_direction(2, 2), Direction::LeftUp);
    }

    #[test]
    fn clear_resets_grid_and_keeps_storage() {
        let mut grid = Grid::new(64, 64).unwrap();
        let mut nodes = Nodes::new();
        for i in 0..200u16 {
            nodes.open(&mut grid, i % 64, i / 64, i as u32, 1, Direction::Down).unwrap();
        }
        let cap = nodes.capacity();
        assert!(cap >= 200);
        nodes.clear(&mut grid);
        assert!(nodes.is_empty());
        assert!(grid.is_clean());
        assert_eq!(nodes.capacity(), cap);
    }

    #[test]
    fn grow_policy() {
        let mut nodes = Nodes::new();
        let start = nodes.capacity();
        nodes.grow(start + 1);
        // Small arrays grow by old + 2.
        assert!(nodes.capacity() >= 2 * start + 2);
    }

    #[test]
    fn capacity_exceeded() {
        let mut grid = Grid::new(128, 64).unwrap();
        let mut nodes = Nodes::new();
        for i in 0..MAX_OPEN_NODES {
            let (x, y) = ((i % 128) as u16, (i / 128) as u16);
            nodes.open(&mut grid, x, y, 0, 1, Direction::Up).unwrap();
        }
        let err = nodes.open(&mut grid, 127, 63, 0, 1, Direction::Up).unwrap_err();
        assert_eq!(err, SearchError::CapacityExceeded { max: MAX_OPEN_NODES });
        assert_eq!(grid.status(127, 63), CellStatus::Null);
        nodes.clear(&mut grid);
        assert!(grid.is_clean());
    }

    #[test]
    fn overflowing_estimate_is_rejected_without_side_effects() {
        let mut grid = Grid::new(4, 4).unwrap();
        let mut nodes = Nodes::new();
        let err = nodes.open(&mut grid, 1, 1, 60_000, 10_000, Direction::Up).unwrap_err();
        assert!(matches!(err, SearchError::CostOverflow { .. }));
        assert!(nodes.is_empty());
        assert!(grid.is_clean());
    }
}
