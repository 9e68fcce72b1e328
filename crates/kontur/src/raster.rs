//! Raster access: the [`BinaryRaster`] trait and the [`BitGrid`] bitmap.
//!
//! The extraction sweep reads its input exclusively through
//! [`BinaryRaster`], whose out-of-bounds reads are defined to be
//! background. That single rule is what lets the border cell table close
//! rings along the raster perimeter without any special-casing at the
//! call sites.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::types::Dimensions;

/// A read-only binary raster.
///
/// Implementations must return `false` for any coordinate outside
/// `[0, W) x [0, H)`; the extraction sweep deliberately samples one cell
/// past every edge.
pub trait BinaryRaster {
    /// Raster dimensions in pixels.
    fn dimensions(&self) -> Dimensions;

    /// Value at `(x, y)`; `false` outside the raster bounds.
    fn get(&self, x: i32, y: i32) -> bool;
}

/// A grayscale image is foreground wherever its luma is non-zero.
impl BinaryRaster for GrayImage {
    fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    fn get(&self, x: i32, y: i32) -> bool {
        let Ok(x) = u32::try_from(x) else {
            return false;
        };
        let Ok(y) = u32::try_from(y) else {
            return false;
        };
        if x >= self.width() || y >= self.height() {
            return false;
        }
        self.get_pixel(x, y).0[0] != 0
    }
}

/// A bit-packed boolean raster.
///
/// Doubles as the engine's input type and its border-mask output, the
/// same double duty the mask type serves in bitfield-based raster
/// pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitGrid {
    width: u32,
    height: u32,
    bits: Vec<u64>,
}

impl BitGrid {
    /// Create an all-background grid.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let cells = (width as usize * height as usize).div_ceil(64);
        Self {
            width,
            height,
            bits: vec![0; cells],
        }
    }

    /// Build a grid by evaluating `f` at every pixel.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut grid = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    grid.set(x, y, true);
                }
            }
        }
        grid
    }

    /// Grid dimensions in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Value at `(x, y)`; `false` outside the grid.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.bits[index / 64] >> (index % 64) & 1 == 1
    }

    /// Set the value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the grid.
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        assert!(
            x < self.width && y < self.height,
            "({x}, {y}) outside {}x{} grid",
            self.width,
            self.height,
        );
        let index = y as usize * self.width as usize + x as usize;
        let mask = 1 << (index % 64);
        if value {
            self.bits[index / 64] |= mask;
        } else {
            self.bits[index / 64] &= !mask;
        }
    }

    /// Number of foreground pixels.
    #[must_use]
    pub fn count_set(&self) -> usize {
        self.bits.iter().map(|block| block.count_ones() as usize).sum()
    }
}

impl BinaryRaster for BitGrid {
    fn dimensions(&self) -> Dimensions {
        self.dimensions()
    }

    fn get(&self, x: i32, y: i32) -> bool {
        let Ok(x) = u32::try_from(x) else {
            return false;
        };
        let Ok(y) = u32::try_from(y) else {
            return false;
        };
        self.get(x, y)
    }
}
