//! Cell codes: classification of 2x2 raster windows.
//!
//! The cell at `(i, j)` covers the four pixels `(i, j)`, `(i+1, j)`,
//! `(i, j+1)` and `(i+1, j+1)`; its 4-bit code concatenates their values
//! as `b3 b2 b1 b0`:
//!
//! - `b0` = raster(i,   j+1)
//! - `b1` = raster(i+1, j+1)
//! - `b2` = raster(i+1, j)
//! - `b3` = raster(i,   j)
//!
//! Codes `0b0101` and `0b1010` are saddles: the boundary topology inside
//! the cell is not determined by the code alone, so a [`SaddleOracle`]
//! decides whether the two set corners connect through the cell center.

use serde::{Deserialize, Serialize};

use crate::raster::BinaryRaster;
use crate::types::LatticePoint;

/// Compute the cell code for the cell anchored at pixel `(i, j)`.
///
/// Out-of-raster corners read as background, so the same classification
/// serves border cells at `i = -1`, `i = W-1`, `j = -1`, `j = H-1`.
pub(crate) fn cell_code<R: BinaryRaster>(raster: &R, i: i32, j: i32) -> u8 {
    u8::from(raster.get(i, j + 1))
        | u8::from(raster.get(i + 1, j + 1)) << 1
        | u8::from(raster.get(i + 1, j)) << 2
        | u8::from(raster.get(i, j)) << 3
}

/// Returns `true` for the two ambiguous codes.
#[must_use]
pub const fn is_saddle(code: u8) -> bool {
    code == 0b0101 || code == 0b1010
}

/// Bitwise complement within the 4-bit code space.
#[must_use]
pub const fn complement(code: u8) -> u8 {
    !code & 0b1111
}

/// Decides the topology of a saddle cell.
///
/// `resolve` receives the cell's lattice anchor `(2i, 2j)` and its code,
/// and returns either the same code (the set diagonal connects through
/// the cell) or its complement (the set corners split apart). Any other
/// return value is treated as keeping the code. Use [`OracleFn`] to
/// supply a closure.
pub trait SaddleOracle {
    /// Resolve one saddle cell.
    fn resolve(&mut self, at: LatticePoint, code: u8) -> u8;
}

/// Adapter turning a closure into a [`SaddleOracle`].
pub struct OracleFn<F>(pub F);

impl<F: FnMut(LatticePoint, u8) -> u8> SaddleOracle for OracleFn<F> {
    fn resolve(&mut self, at: LatticePoint, code: u8) -> u8 {
        (self.0)(at, code)
    }
}

/// The two canned saddle policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaddlePolicy {
    /// Interpret every saddle as-is: the set corners connect diagonally.
    #[default]
    Keep,
    /// Invert every saddle: the set corners split into two corner cuts.
    Flip,
}

impl SaddleOracle for SaddlePolicy {
    fn resolve(&mut self, _at: LatticePoint, code: u8) -> u8 {
        match self {
            Self::Keep => code,
            Self::Flip => complement(code),
        }
    }
}
