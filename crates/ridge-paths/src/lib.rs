//! Intensity-guided A* tracing through 2D scalar fields.
//!
//! Given a field where bright cells mark the structure of interest (a
//! neurite or vessel after ridge filtering), [`AStar2D`] finds the cheapest
//! 8-connected path between two cells. Cells below a threshold are walls and
//! dimmer passable cells cost more to enter. Paths come back as
//! [`Path`] polylines holding only their turning points.
//!
//! The search keeps all of its scratch state in flat arrays reused across
//! calls:
//!
//! - [`Grid`]: one `u16` per cell holding open-list slot, parent direction
//!   and a persistent walkable bit
//! - [`Nodes`]: a 4-ary min-heap of [`Node`]s, packed into `u64`s
//!
//! Long searches can run on a worker thread with pause and cancel through
//! [`SearchTask`].

mod astar;
mod directions;
mod error;
mod grid;
mod heuristics;
mod node;
mod nodes;
mod params;
mod path;
mod task;

pub use astar::{AStar2D, Progress, SearchOutcome};
pub use directions::{COST_DIAGONAL, COST_ORTHOGONAL, Direction, Directions, DirectionsBuilder};
pub use error::{Result, SearchError};
pub use grid::{CellStatus, Grid, MAX_OPEN_NODES};
pub use heuristics::{Heuristic, Heuristics, chebyshev, euclidean};
pub use node::{MAX_COORD, MAX_COST, Node};
pub use nodes::Nodes;
pub use params::TracingParameters;
pub use path::Path;
pub use task::{RunState, SearchTask, TaskControl, TaskOptions};
