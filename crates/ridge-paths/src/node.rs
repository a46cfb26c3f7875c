//! Packed search node: `x`, `y`, `g` and `f` in one `u64`.
//!
//! Layout (most- to least-significant): `x:16 | y:16 | g:16 | f:16`.

use crate::error::{Result, SearchError};

const FIELD_BITS: u32 = 16;
const FIELD_MASK: u64 = (1 << FIELD_BITS) - 1;

const F_SHIFT: u32 = 0;
const G_SHIFT: u32 = F_SHIFT + FIELD_BITS;
const Y_SHIFT: u32 = G_SHIFT + FIELD_BITS;
const X_SHIFT: u32 = Y_SHIFT + FIELD_BITS;

const COST_MASK: u64 = FIELD_MASK << G_SHIFT | FIELD_MASK << F_SHIFT;

/// Largest value a packed cost field can hold.
pub const MAX_COST: u32 = FIELD_MASK as u32;

/// Largest grid coordinate a packed node can hold.
pub const MAX_COORD: u32 = FIELD_MASK as u32;

/// A search node packed into a single word.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Node(u64);

impl Node {
    /// Pack a node. `g` is the cost from the start, `f` the estimated total.
    ///
    /// Fails with [`SearchError::CostOverflow`] if either cost does not fit
    /// 16 bits.
    #[inline]
    pub fn pack(x: u16, y: u16, g: u32, f: u32) -> Result<Self> {
        check_cost(g)?;
        check_cost(f)?;
        Ok(Self(
            (x as u64) << X_SHIFT | (y as u64) << Y_SHIFT | (g as u64) << G_SHIFT | f as u64,
        ))
    }

    #[inline]
    pub fn x(self) -> u16 {
        (self.0 >> X_SHIFT & FIELD_MASK) as u16
    }

    #[inline]
    pub fn y(self) -> u16 {
        (self.0 >> Y_SHIFT & FIELD_MASK) as u16
    }

    /// Cost of the best known path from the start to this node.
    #[inline]
    pub fn g(self) -> u32 {
        (self.0 >> G_SHIFT & FIELD_MASK) as u32
    }

    /// Estimated total cost of a path through this node.
    #[inline]
    pub fn f(self) -> u32 {
        (self.0 >> F_SHIFT & FIELD_MASK) as u32
    }

    /// The same position with new costs.
    #[inline]
    pub fn with_cost(self, g: u32, f: u32) -> Result<Self> {
        check_cost(g)?;
        check_cost(f)?;
        Ok(Self(
            self.0 & !COST_MASK | (g as u64) << G_SHIFT | (f as u64) << F_SHIFT,
        ))
    }

    /// The raw packed word.
    #[inline]
    pub fn to_bits(self) -> u64 {
        self.0
    }
}

#[inline]
fn check_cost(cost: u32) -> Result<()> {
    if cost > MAX_COST {
        return Err(SearchError::CostOverflow {
            cost: cost as u64,
            max: MAX_COST,
        });
    }
    Ok(())
}
