//! Shared types for the kontur contouring engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::raster::BitGrid;
use crate::segment::Direction;

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from the left edge).
    pub x: f64,
    /// Vertical position (pixels from the top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 2D integer point on the doubled lattice.
///
/// Pixel `(i, j)` maps to lattice point `(2i, 2j)`; cell edge midpoints
/// land on odd coordinates, so every segment endpoint -- including
/// diagonal midpoints -- has integer coordinates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LatticePoint {
    /// Horizontal lattice coordinate (half-pixel units).
    pub x: i32,
    /// Vertical lattice coordinate (half-pixel units).
    pub y: i32,
}

impl LatticePoint {
    /// Create a new lattice point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert to a pixel-space point with the given per-axis offset.
    #[must_use]
    pub fn to_pixel(self, offset: f64) -> Point {
        Point::new(
            f64::from(self.x) / 2.0 + offset,
            f64::from(self.y) / 2.0 + offset,
        )
    }
}

impl fmt::Display for LatticePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A closed ring of vertices.
///
/// The ring is implicitly closed: the edge from the last vertex back to
/// the first is part of the boundary and is not repeated in the vertex
/// list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring(Vec<Point>);

impl Ring {
    /// Create a ring from a vector of vertices.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the ring has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all vertices.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the ring and returns the underlying vertex vector.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// Raster dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Returns `true` if either dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Where pixel `(0, 0)` sits in the output coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelOrigin {
    /// Coordinates name pixel centers: the raster spans
    /// `[-0.5, W - 0.5] x [-0.5, H - 0.5]`.
    #[default]
    Center,
    /// Coordinates name pixel corners: the raster spans `[0, W] x [0, H]`.
    Corner,
}

impl PixelOrigin {
    /// Per-axis offset added when mapping lattice vertices to pixel space.
    #[must_use]
    pub const fn offset(self) -> f64 {
        match self {
            Self::Center => 0.0,
            Self::Corner => 0.5,
        }
    }
}

/// Configuration for contour extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContourConfig {
    /// Interpretation of output coordinates relative to the pixel grid.
    pub pixel_origin: PixelOrigin,

    /// Merge consecutive ring segments that share a direction into a
    /// single polyline edge, dropping the intermediate vertices.
    pub join_straight_segments: bool,
}

impl ContourConfig {
    /// Default pixel origin (pixel centers).
    pub const DEFAULT_PIXEL_ORIGIN: PixelOrigin = PixelOrigin::Center;
    /// Default collinear-segment joining state.
    pub const DEFAULT_JOIN_STRAIGHT_SEGMENTS: bool = true;
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            pixel_origin: Self::DEFAULT_PIXEL_ORIGIN,
            join_straight_segments: Self::DEFAULT_JOIN_STRAIGHT_SEGMENTS,
        }
    }
}

/// Contour of one region of a binary raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// The closed boundary rings, in the order they closed during the
    /// row-major sweep.
    pub rings: Vec<Ring>,
    /// Pixels that participated in a boundary cell, as a raster-sized
    /// bitmap.
    pub border: BitGrid,
}

impl Contour {
    /// Create an empty contour with a zeroed border mask of the given size.
    #[must_use]
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            rings: Vec::new(),
            border: BitGrid::new(dimensions.width, dimensions.height),
        }
    }

    /// A contour is empty iff it has no rings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

/// Errors reported by contour extraction.
///
/// Both variants indicate a corrupted segment store; neither occurs for
/// any well-formed rectangular raster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContourError {
    /// The ring walk visited a segment whose ring-leader disagrees with
    /// the head it started from.
    #[error(
        "segment [{cell_code:04b}/{code:04b}] <{start} -> {end}> ({direction}) \
         declares ring-leader {declared:?}, expected {expected}"
    )]
    ForeignSegment {
        /// Cell code of the cell that emitted the segment.
        cell_code: u8,
        /// Resolved sub-code of the segment itself.
        code: u8,
        /// Segment start on the doubled lattice.
        start: LatticePoint,
        /// Segment end on the doubled lattice.
        end: LatticePoint,
        /// Segment orientation.
        direction: Direction,
        /// The leader recorded on the segment, if any.
        declared: Option<usize>,
        /// The leader the walk started from.
        expected: usize,
    },

    /// The ring walk reached a segment with no successor before closing.
    #[error(
        "segment [{cell_code:04b}/{code:04b}] <{start} -> {end}> ({direction}) \
         in ring {ring} has no next segment"
    )]
    OpenRing {
        /// Cell code of the cell that emitted the segment.
        cell_code: u8,
        /// Resolved sub-code of the segment itself.
        code: u8,
        /// Segment start on the doubled lattice.
        start: LatticePoint,
        /// Segment end on the doubled lattice.
        end: LatticePoint,
        /// Segment orientation.
        direction: Direction,
        /// The ring-leader of the walk.
        ring: usize,
    },
}
