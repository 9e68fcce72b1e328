//! kontur: binary raster contouring.
//!
//! Traces the boundary between the foreground and background pixel
//! populations of a binary raster into closed polygonal rings -- a
//! marching-squares variant on a doubled-resolution lattice whose
//! segments are stitched into rings on the fly -- and simplifies rings
//! with an area-priority vertex-removal pass that keeps junctions
//! shared between contours in place.
//!
//! This crate is sans-IO: input arrives through the [`BinaryRaster`]
//! trait (implemented for [`BitGrid`] and [`image::GrayImage`]) and
//! results are plain data. Decoding image files into rasters is the
//! caller's business.
//!
//! ```
//! use kontur::{find_contour, BitGrid, ContourConfig};
//!
//! let raster = BitGrid::from_fn(5, 5, |x, y| (1..4).contains(&x) && (1..4).contains(&y));
//! let contour = find_contour(&raster, &ContourConfig::default())?;
//! assert_eq!(contour.rings.len(), 1);
//! # Ok::<(), kontur::ContourError>(())
//! ```
//!
//! For repeated extractions over different regions of one input, use
//! [`FindContour`] directly: it memoizes saddle resolutions so shared
//! region boundaries stay stable.

pub mod cell;
pub mod raster;
mod segment;
pub mod simplify;
pub mod trace;
pub mod types;

pub use cell::{OracleFn, SaddleOracle, SaddlePolicy};
pub use raster::{BinaryRaster, BitGrid};
pub use segment::Direction;
pub use simplify::{simplify, DEFAULT_SIMPLIFY_TOLERANCE};
pub use trace::{find_contour, FindContour};
pub use types::{
    Contour, ContourConfig, ContourError, Dimensions, LatticePoint, PixelOrigin, Point, Ring,
};
