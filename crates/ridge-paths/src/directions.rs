use std::fmt;

use ridge_core::Point;

/// Cost of one orthogonal step.
pub const COST_ORTHOGONAL: u32 = 5;

/// Cost of one diagonal step, `COST_ORTHOGONAL × √2` rounded.
pub const COST_DIAGONAL: u32 = 7;

/// One of the eight compass moves on the grid. Y grows downward, so `Up`
/// decreases `y`.
///
/// The discriminant is the 3-bit code stored in a [`Grid`](crate::Grid)
/// cell as its parent direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    LeftUp = 4,
    LeftDown = 5,
    RightUp = 6,
    RightDown = 7,
}

impl Direction {
    /// All eight moves, in code order.
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::LeftUp,
        Direction::LeftDown,
        Direction::RightUp,
        Direction::RightDown,
    ];

    /// The 3-bit code of this direction.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a 3-bit code; only the low three bits are read.
    #[inline]
    pub const fn from_code(code: u8) -> Self {
        Self::ALL[(code & 0b111) as usize]
    }

    /// The (Δx, Δy) of one step.
    #[inline]
    pub const fn offset(self) -> Point {
        match self {
            Direction::Up => Point::new(0, -1),
            Direction::Down => Point::new(0, 1),
            Direction::Left => Point::new(-1, 0),
            Direction::Right => Point::new(1, 0),
            Direction::LeftUp => Point::new(-1, -1),
            Direction::LeftDown => Point::new(-1, 1),
            Direction::RightUp => Point::new(1, -1),
            Direction::RightDown => Point::new(1, 1),
        }
    }

    #[inline]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::LeftUp | Direction::LeftDown | Direction::RightUp | Direction::RightDown
        )
    }

    /// Cost of one step in this direction on a field with no penalty.
    #[inline]
    pub const fn base_cost(self) -> u32 {
        if self.is_diagonal() {
            COST_DIAGONAL
        } else {
            COST_ORTHOGONAL
        }
    }

    /// The move that undoes this one.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::LeftUp => Direction::RightDown,
            Direction::LeftDown => Direction::RightUp,
            Direction::RightUp => Direction::LeftDown,
            Direction::RightDown => Direction::LeftUp,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::LeftUp => "left-up",
            Direction::LeftDown => "left-down",
            Direction::RightUp => "right-up",
            Direction::RightDown => "right-down",
        };
        f.write_str(name)
    }
}

/// An ordered, de-duplicated set of allowed moves.
///
/// Neighbours are expanded in insertion order, which makes tie-breaking
/// between equally good paths reproducible for a given set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Directions {
    dirs: Vec<Direction>,
}

impl Default for Directions {
    fn default() -> Self {
        Self::all()
    }
}

impl Directions {
    /// Start building a set from scratch.
    pub fn builder() -> DirectionsBuilder {
        DirectionsBuilder::default()
    }

    /// All eight moves (8-connectivity).
    pub fn all() -> Self {
        Self {
            dirs: Direction::ALL.to_vec(),
        }
    }

    /// The four orthogonal moves (4-connectivity).
    pub fn cardinal() -> Self {
        Self::builder()
            .add(Direction::Up)
            .add(Direction::Down)
            .add(Direction::Left)
            .add(Direction::Right)
            .build()
    }

    /// Every move without an upward component.
    ///
    /// On a kymograph (time running down the y axis) this forbids tracing
    /// backward in time.
    pub fn forward() -> Self {
        Self::builder()
            .add(Direction::Left)
            .add(Direction::LeftDown)
            .add(Direction::Down)
            .add(Direction::RightDown)
            .add(Direction::Right)
            .build()
    }

    /// A copy of this set without `dir`.
    pub fn without(&self, dir: Direction) -> Self {
        Self {
            dirs: self.dirs.iter().copied().filter(|&d| d != dir).collect(),
        }
    }

    #[inline]
    pub fn contains(&self, dir: Direction) -> bool {
        self.dirs.contains(&dir)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, Direction>> {
        self.dirs.iter().copied()
    }
}

impl<'a> IntoIterator for &'a Directions {
    type Item = Direction;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Direction>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Direction> for Directions {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::builder(), DirectionsBuilder::add)
            .build()
    }
}

/// Builder for [`Directions`]. Adding a move twice keeps the first position.
#[derive(Clone, Debug, Default)]
pub struct DirectionsBuilder {
    dirs: Vec<Direction>,
}

impl DirectionsBuilder {
    pub fn add(mut self, dir: Direction) -> Self {
        if !self.dirs.contains(&dir) {
            self.dirs.push(dir);
        }
        self
    }

    pub fn build(self) -> Directions {
        Directions { dirs: self.dirs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_code(d.code()), d);
        }
        assert_eq!(Direction::RightDown.code(), 7);
    }

    #[test]
    fn opposite_cancels_offset() {
        for d in Direction::ALL {
            assert_eq!(d.offset() + d.opposite().offset(), Point::ZERO);
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn base_costs() {
        assert_eq!(Direction::Up.base_cost(), COST_ORTHOGONAL);
        assert_eq!(Direction::LeftDown.base_cost(), COST_DIAGONAL);
        let diagonals = Direction::ALL.iter().filter(|d| d.is_diagonal()).count();
        assert_eq!(diagonals, 4);
    }

    #[test]
    fn builder_deduplicates_in_order() {
        let d = Directions::builder()
            .add(Direction::Right)
            .add(Direction::Down)
            .add(Direction::Right)
            .build();
        assert_eq!(d.iter().collect::<Vec<_>>(), vec![Direction::Right, Direction::Down]);
    }

    #[test]
    fn presets() {
        assert_eq!(Directions::all().len(), 8);
        assert_eq!(Directions::default(), Directions::all());
        assert_eq!(Directions::cardinal().len(), 4);
        let fwd = Directions::forward();
        assert_eq!(fwd.len(), 5);
        assert!(fwd.iter().all(|d| d.offset().y >= 0));
        assert!(!Directions::all().without(Direction::Up).contains(Direction::Up));
    }

    #[test]
    fn collect_deduplicates() {
        let d: Directions = [Direction::Up, Direction::Up, Direction::Left]
            .into_iter()
            .collect();
        assert_eq!(d.len(), 2);
    }
}
