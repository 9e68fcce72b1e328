//! Contour extraction: the row-major cell sweep and the emission tables.
//!
//! The sweep classifies every cell of the virtual grid
//! `[-1, W-1] x [-1, H-1]`. Cells whose window lies fully inside the
//! raster use the interior emission table; cells touching the raster
//! edge use the border table, whose extra half-step segments run along
//! the perimeter so that every ring still closes. Segments stream into a
//! [`SegmentStore`](crate::segment::SegmentStore) and each ring is
//! emitted the moment it closes, so output order is the closure order of
//! the sweep and two identical runs produce identical contours.

use std::collections::HashMap;

use crate::cell::{self, SaddleOracle, SaddlePolicy};
use crate::raster::BinaryRaster;
use crate::segment::SegmentStore;
use crate::types::{Contour, ContourConfig, ContourError, LatticePoint, Ring};

/// Contour finder with internal state.
///
/// Saddle resolutions are memoized per cell, keyed by the cell's lattice
/// anchor, so repeated extractions over different regions of a common
/// input resolve each ambiguous cell identically and the shared
/// boundaries between regions stay stable. A revisiting region that
/// presents the complementary code gets the complementary answer for
/// free: the memo returns the first resolution verbatim.
#[derive(Debug)]
pub struct FindContour<O = SaddlePolicy> {
    config: ContourConfig,
    oracle: O,
    resolved: HashMap<LatticePoint, u8>,
}

impl FindContour<SaddlePolicy> {
    /// Create a finder with the default saddle policy
    /// ([`SaddlePolicy::Keep`]).
    #[must_use]
    pub fn new(config: ContourConfig) -> Self {
        Self::with_oracle(config, SaddlePolicy::Keep)
    }
}

impl<O: SaddleOracle> FindContour<O> {
    /// Create a finder with a custom saddle oracle.
    #[must_use]
    pub fn with_oracle(config: ContourConfig, oracle: O) -> Self {
        Self {
            config,
            oracle,
            resolved: HashMap::new(),
        }
    }

    /// Extract the contour of the raster's foreground region.
    ///
    /// A zero-dimensional raster yields an empty contour.
    ///
    /// # Errors
    ///
    /// Propagates [`ContourError`] from the ring walk; this indicates a
    /// corrupted segment store and does not occur for any well-formed
    /// rectangular raster.
    #[allow(clippy::cast_possible_wrap)]
    pub fn find<R: BinaryRaster>(&mut self, raster: &R) -> Result<Contour, ContourError> {
        let dims = raster.dimensions();
        let mut contour = Contour::new(dims);
        if dims.is_empty() {
            return Ok(contour);
        }

        let mut sweep = Sweep {
            raster,
            config: self.config,
            oracle: &mut self.oracle,
            resolved: &mut self.resolved,
            store: SegmentStore::new(),
            contour: &mut contour,
        };

        let xend = dims.width as i32 - 1;
        let yend = dims.height as i32 - 1;

        for i in -1..=xend {
            sweep.border_cell(i, -1)?;
        }
        for j in 0..yend {
            sweep.border_cell(-1, j)?;
            for i in 0..xend {
                sweep.inner_cell(i, j)?;
            }
            sweep.border_cell(xend, j)?;
        }
        for i in -1..=xend {
            sweep.border_cell(i, yend)?;
        }

        Ok(contour)
    }
}

/// Extract the contour of a raster's foreground region in one shot.
///
/// Convenience wrapper over a fresh [`FindContour`] with the default
/// saddle policy; use the finder directly to supply an oracle or to keep
/// saddle resolutions stable across multiple regions of one input.
///
/// # Errors
///
/// See [`FindContour::find`].
pub fn find_contour<R: BinaryRaster>(
    raster: &R,
    config: &ContourConfig,
) -> Result<Contour, ContourError> {
    FindContour::new(*config).find(raster)
}

/// One extraction pass over one raster.
struct Sweep<'a, R, O> {
    raster: &'a R,
    config: ContourConfig,
    oracle: &'a mut O,
    resolved: &'a mut HashMap<LatticePoint, u8>,
    store: SegmentStore,
    contour: &'a mut Contour,
}

impl<R: BinaryRaster, O: SaddleOracle> Sweep<'_, R, O> {
    /// Insert one segment; when it closes a ring, walk the ring out and
    /// append it to the contour.
    fn emit(
        &mut self,
        cell_code: u8,
        code: u8,
        start: LatticePoint,
        end: LatticePoint,
    ) -> Result<(), ContourError> {
        if let Some(leader) = self.store.add(cell_code, code, start, end) {
            let vertices = self
                .store
                .ring_vertices(leader, self.config.join_straight_segments)?;
            let offset = self.config.pixel_origin.offset();
            self.contour.rings.push(Ring::new(
                vertices.into_iter().map(|v| v.to_pixel(offset)).collect(),
            ));
        }
        Ok(())
    }

    /// Mark the border-mask pixels for one visited cell.
    ///
    /// Each set corner bit marks the pixel under that corner; saddles
    /// mark all four corners and uniform cells mark none. Corners
    /// outside the raster are dropped.
    fn mark(&mut self, i: i32, j: i32, code: u8) {
        let marks = match code {
            0b0000 | 0b1111 => 0,
            0b0101 | 0b1010 => 0b1111,
            c => c,
        };
        // Corner offsets in bit order b0..b3.
        const CORNERS: [(i32, i32); 4] = [(0, 1), (1, 1), (1, 0), (0, 0)];
        let dims = self.contour.border.dimensions();
        for (bit, (dx, dy)) in CORNERS.into_iter().enumerate() {
            if marks >> bit & 1 == 1 {
                if let (Ok(x), Ok(y)) = (u32::try_from(i + dx), u32::try_from(j + dy)) {
                    if x < dims.width && y < dims.height {
                        self.contour.border.set(x, y, true);
                    }
                }
            }
        }
    }

    /// Resolve a saddle, consulting the memo before the oracle.
    fn resolve(&mut self, at: LatticePoint, code: u8) -> u8 {
        if let Some(&resolved) = self.resolved.get(&at) {
            return resolved;
        }
        let answer = self.oracle.resolve(at, code);
        let resolved = if answer == cell::complement(code) {
            answer
        } else {
            code
        };
        self.resolved.insert(at, resolved);
        resolved
    }

    /// Emit the segments of a cell lying fully inside the raster.
    fn inner_cell(&mut self, i: i32, j: i32) -> Result<(), ContourError> {
        let code = cell::cell_code(self.raster, i, j);
        self.mark(i, j, code);
        let (x, y) = (2 * i, 2 * j);
        let v = |dx: i32, dy: i32| LatticePoint::new(x + dx, y + dy);
        match code {
            0b0001 => self.emit(code, 0b0001, v(0, 1), v(1, 2)),
            0b0010 => self.emit(code, 0b0010, v(1, 2), v(2, 1)),
            0b0011 => self.emit(code, 0b0011, v(0, 1), v(2, 1)),
            0b0100 => self.emit(code, 0b0100, v(2, 1), v(1, 0)),
            0b0110 => self.emit(code, 0b0110, v(1, 2), v(1, 0)),
            0b0111 => self.emit(code, 0b0111, v(0, 1), v(1, 0)),
            0b1000 => self.emit(code, 0b1000, v(1, 0), v(0, 1)),
            0b1001 => self.emit(code, 0b1001, v(1, 0), v(1, 2)),
            0b1011 => self.emit(code, 0b1011, v(1, 0), v(2, 1)),
            0b1100 => self.emit(code, 0b1100, v(2, 1), v(0, 1)),
            0b1101 => self.emit(code, 0b1101, v(2, 1), v(1, 2)),
            0b1110 => self.emit(code, 0b1110, v(1, 2), v(0, 1)),
            0b0101 | 0b1010 => self.inner_saddle(code, v(0, 0)),
            _ => Ok(()), // 0b0000 and 0b1111 trace nothing
        }
    }

    /// Emit the two segments of an interior saddle cell.
    ///
    /// Keeping the code joins the set diagonal through the cell center;
    /// flipping splits the two set corners into separate corner cuts.
    fn inner_saddle(&mut self, code: u8, anchor: LatticePoint) -> Result<(), ContourError> {
        let v = |dx: i32, dy: i32| LatticePoint::new(anchor.x + dx, anchor.y + dy);
        let kept = self.resolve(anchor, code) == code;
        match (code, kept) {
            (0b0101, true) => {
                self.emit(code, 0b0111, v(0, 1), v(1, 0))?;
                self.emit(code, 0b1101, v(2, 1), v(1, 2))
            }
            (0b0101, false) => {
                self.emit(code, 0b0001, v(0, 1), v(1, 2))?;
                self.emit(code, 0b0100, v(2, 1), v(1, 0))
            }
            (_, true) => {
                self.emit(code, 0b1011, v(1, 0), v(2, 1))?;
                self.emit(code, 0b1110, v(1, 2), v(0, 1))
            }
            (_, false) => {
                self.emit(code, 0b1000, v(1, 0), v(0, 1))?;
                self.emit(code, 0b0010, v(1, 2), v(2, 1))
            }
        }
    }

    /// Emit the segments of a cell touching the raster edge.
    ///
    /// Corner cases route through the cell midpoint `(1, 1)` or a cell
    /// corner in two half steps instead of one diagonal, so the ring
    /// follows the raster perimeter. Saddles emit four fixed segments
    /// forming two corner turns; no oracle is consulted here.
    fn border_cell(&mut self, i: i32, j: i32) -> Result<(), ContourError> {
        let code = cell::cell_code(self.raster, i, j);
        self.mark(i, j, code);
        let (x, y) = (2 * i, 2 * j);
        let v = |dx: i32, dy: i32| LatticePoint::new(x + dx, y + dy);
        match code {
            0b0001 => {
                self.emit(code, 0b0011, v(0, 1), v(1, 1))?;
                self.emit(code, 0b1001, v(1, 1), v(1, 2))
            }
            0b0010 => {
                self.emit(code, 0b0110, v(1, 2), v(1, 1))?;
                self.emit(code, 0b0011, v(1, 1), v(2, 1))
            }
            0b0011 => self.emit(code, 0b0011, v(0, 1), v(2, 1)),
            0b0100 => {
                self.emit(code, 0b1100, v(2, 1), v(1, 1))?;
                self.emit(code, 0b0110, v(1, 1), v(1, 0))
            }
            0b0101 => {
                self.emit(code, 0b0110, v(0, 1), v(0, 0))?;
                self.emit(code, 0b0011, v(0, 0), v(1, 0))?;
                self.emit(code, 0b1001, v(2, 1), v(2, 2))?;
                self.emit(code, 0b1100, v(2, 2), v(1, 2))
            }
            0b0110 => self.emit(code, 0b0110, v(1, 2), v(1, 0)),
            0b0111 => {
                self.emit(code, 0b0110, v(0, 1), v(0, 0))?;
                self.emit(code, 0b0011, v(0, 0), v(1, 0))
            }
            0b1000 => {
                self.emit(code, 0b1001, v(1, 0), v(1, 1))?;
                self.emit(code, 0b1100, v(1, 1), v(0, 1))
            }
            0b1001 => self.emit(code, 0b1001, v(1, 0), v(1, 2)),
            0b1010 => {
                self.emit(code, 0b0011, v(1, 0), v(2, 0))?;
                self.emit(code, 0b1001, v(2, 0), v(2, 1))?;
                self.emit(code, 0b1100, v(1, 2), v(0, 2))?;
                self.emit(code, 0b0110, v(0, 2), v(0, 1))
            }
            0b1011 => {
                self.emit(code, 0b0011, v(1, 0), v(2, 0))?;
                self.emit(code, 0b1001, v(2, 0), v(2, 1))
            }
            0b1100 => self.emit(code, 0b1100, v(2, 1), v(0, 1)),
            0b1101 => {
                self.emit(code, 0b1001, v(2, 1), v(2, 2))?;
                self.emit(code, 0b1100, v(2, 2), v(1, 2))
            }
            0b1110 => {
                self.emit(code, 0b1100, v(1, 2), v(0, 2))?;
                self.emit(code, 0b0110, v(0, 2), v(0, 1))
            }
            _ => Ok(()), // 0b0000 and 0b1111 trace nothing
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::raster::BitGrid;
    use crate::types::PixelOrigin;

    /// Parse a raster from rows of `#` (foreground) and `.`.
    fn grid(rows: &[&str]) -> BitGrid {
        let height = u32::try_from(rows.len()).unwrap();
        let width = u32::try_from(rows[0].len()).unwrap();
        BitGrid::from_fn(width, height, |x, y| {
            rows[y as usize].as_bytes()[x as usize] == b'#'
        })
    }

    fn unjoined() -> ContourConfig {
        ContourConfig {
            join_straight_segments: false,
            ..ContourConfig::default()
        }
    }

    fn ring_points(contour: &Contour, index: usize) -> Vec<(f64, f64)> {
        contour.rings[index].points().iter().map(|p| (p.x, p.y)).collect()
    }

    fn sorted_points(contour: &Contour, index: usize) -> Vec<(f64, f64)> {
        let mut points = ring_points(contour, index);
        points.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        points
    }

    // --- Literal scenarios ---

    #[test]
    fn single_pixel_traces_a_centered_unit_square() {
        let contour = find_contour(&grid(&["#"]), &ContourConfig::default()).unwrap();
        assert_eq!(contour.rings.len(), 1);
        assert_eq!(
            ring_points(&contour, 0),
            vec![(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)],
        );
        assert_eq!(contour.border.count_set(), 1);
        assert!(contour.border.get(0, 0));
    }

    #[test]
    fn single_pixel_with_corner_origin_shifts_by_half() {
        let config = ContourConfig {
            pixel_origin: PixelOrigin::Corner,
            ..ContourConfig::default()
        };
        let contour = find_contour(&grid(&["#"]), &config).unwrap();
        assert_eq!(
            ring_points(&contour, 0),
            vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
        );
    }

    /// Pins the border table's corner cells to exactly two half-step
    /// segments each: a third emission would change the vertex count of
    /// the unit ring.
    #[test]
    fn border_corner_cell_emits_exactly_two_segments() {
        let contour = find_contour(&grid(&["#"]), &unjoined()).unwrap();
        assert_eq!(contour.rings.len(), 1);
        assert_eq!(
            ring_points(&contour, 0),
            vec![
                (-0.5, -0.5),
                (0.0, -0.5),
                (0.5, -0.5),
                (0.5, 0.0),
                (0.5, 0.5),
                (0.0, 0.5),
                (-0.5, 0.5),
                (-0.5, 0.0),
            ],
        );
    }

    #[test]
    fn lone_interior_pixel_traces_a_diamond() {
        let raster = grid(&["...", ".#.", "..."]);
        let joined = find_contour(&raster, &ContourConfig::default()).unwrap();
        assert_eq!(joined.rings.len(), 1);
        assert_eq!(
            ring_points(&joined, 0),
            vec![(1.0, 0.5), (1.5, 1.0), (1.0, 1.5), (0.5, 1.0)],
        );

        // The diamond has no collinear pair, so joining changes nothing.
        let plain = find_contour(&raster, &unjoined()).unwrap();
        assert_eq!(ring_points(&plain, 0), ring_points(&joined, 0));

        // Only the pixel itself touches the boundary.
        assert_eq!(joined.border.count_set(), 1);
        assert!(joined.border.get(1, 1));
    }

    #[test]
    fn centered_block_traces_an_octagon() {
        let raster = grid(&[".....", ".###.", ".###.", ".###.", "....."]);

        let plain = find_contour(&raster, &unjoined()).unwrap();
        assert_eq!(plain.rings.len(), 1);
        assert_eq!(plain.rings[0].len(), 12);

        let joined = find_contour(&raster, &ContourConfig::default()).unwrap();
        assert_eq!(
            ring_points(&joined, 0),
            vec![
                (1.0, 0.5),
                (3.0, 0.5),
                (3.5, 1.0),
                (3.5, 3.0),
                (3.0, 3.5),
                (1.0, 3.5),
                (0.5, 3.0),
                (0.5, 1.0),
            ],
        );
    }

    #[test]
    fn horizontal_strip_joins_to_a_rectangle() {
        let raster = BitGrid::from_fn(100, 1, |_, _| true);
        let contour = find_contour(&raster, &ContourConfig::default()).unwrap();
        assert_eq!(contour.rings.len(), 1);
        assert_eq!(
            ring_points(&contour, 0),
            vec![(-0.5, -0.5), (99.5, -0.5), (99.5, 0.5), (-0.5, 0.5)],
        );
        assert_eq!(contour.border.count_set(), 100);
    }

    // --- Saddles ---

    #[test]
    fn kept_saddle_connects_the_set_diagonal() {
        let contour = find_contour(&grid(&["#.", ".#"]), &ContourConfig::default()).unwrap();
        assert_eq!(contour.rings.len(), 1);
        assert_eq!(contour.rings[0].len(), 10);

        let plain = find_contour(&grid(&["#.", ".#"]), &unjoined()).unwrap();
        assert_eq!(plain.rings[0].len(), 14);

        // Saddle cells mark all four corners.
        assert_eq!(contour.border.count_set(), 4);
    }

    #[test]
    fn flipped_saddle_splits_into_two_rings() {
        let mut finder = FindContour::with_oracle(ContourConfig::default(), SaddlePolicy::Flip);
        let contour = finder.find(&grid(&["#.", ".#"])).unwrap();
        assert_eq!(contour.rings.len(), 2);
        assert_eq!(
            ring_points(&contour, 0),
            vec![(-0.5, -0.5), (0.5, -0.5), (0.5, 0.0), (0.0, 0.5), (-0.5, 0.5)],
        );
        assert_eq!(contour.rings[1].len(), 5);
    }

    #[test]
    fn saddle_resolutions_stay_stable_across_regions() {
        let region = grid(&["#.", ".#"]);
        let complement = grid(&[".#", "#."]);

        // A fresh finder keeps the complement's saddle too: one ring.
        let fresh = find_contour(&complement, &ContourConfig::default()).unwrap();
        assert_eq!(fresh.rings.len(), 1);

        // After visiting the first region, the memoized resolution makes
        // the complementary region flip, so the shared boundary agrees.
        let mut finder = FindContour::new(ContourConfig::default());
        let first = finder.find(&region).unwrap();
        assert_eq!(first.rings.len(), 1);
        let second = finder.find(&complement).unwrap();
        assert_eq!(second.rings.len(), 2);
    }

    // --- Properties ---

    #[test]
    fn extraction_is_deterministic() {
        let raster = grid(&["##...", "##.#.", "...#.", ".####"]);
        let a = find_contour(&raster, &ContourConfig::default()).unwrap();
        let b = find_contour(&raster, &ContourConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_dimension_rasters_yield_empty_contours() {
        for (w, h) in [(0, 0), (0, 5), (5, 0)] {
            let contour = find_contour(&BitGrid::new(w, h), &ContourConfig::default()).unwrap();
            assert!(contour.is_empty(), "{w}x{h}");
            assert_eq!(contour.border.count_set(), 0, "{w}x{h}");
        }
    }

    #[test]
    fn all_background_raster_yields_no_rings() {
        let contour = find_contour(&BitGrid::new(4, 4), &ContourConfig::default()).unwrap();
        assert!(contour.is_empty());
        assert_eq!(contour.border.count_set(), 0);
    }

    #[test]
    fn filled_raster_marks_only_edge_pixels() {
        let raster = BitGrid::from_fn(4, 3, |_, _| true);
        let contour = find_contour(&raster, &ContourConfig::default()).unwrap();
        assert_eq!(contour.rings.len(), 1);
        assert_eq!(
            ring_points(&contour, 0),
            vec![(-0.5, -0.5), (3.5, -0.5), (3.5, 2.5), (-0.5, 2.5)],
        );
        // The two interior pixels sit in uniform cells only.
        assert!(!contour.border.get(1, 1));
        assert!(!contour.border.get(2, 1));
        assert_eq!(contour.border.count_set(), 10);
    }

    #[test]
    fn border_mask_matches_the_cell_code_rule() {
        let raster = grid(&["##...", "##.#.", "...#.", ".####"]);
        let contour = find_contour(&raster, &ContourConfig::default()).unwrap();

        let mut expected = BitGrid::new(5, 4);
        for j in -1..4 {
            for i in -1..5 {
                let code = cell::cell_code(&raster, i, j);
                let marks = match code {
                    0b0000 | 0b1111 => 0,
                    0b0101 | 0b1010 => 0b1111,
                    c => c,
                };
                for (bit, (dx, dy)) in [(0, 1), (1, 1), (1, 0), (0, 0)].into_iter().enumerate() {
                    if marks >> bit & 1 == 1 {
                        if let (Ok(x), Ok(y)) = (u32::try_from(i + dx), u32::try_from(j + dy)) {
                            if x < 5 && y < 4 {
                                expected.set(x, y, true);
                            }
                        }
                    }
                }
            }
        }
        assert_eq!(contour.border, expected);
    }

    #[test]
    fn complementing_the_raster_preserves_interior_rings() {
        let raster = grid(&["...", ".#.", "..."]);
        let inverse = BitGrid::from_fn(3, 3, |x, y| !raster.get(x, y));

        let original = find_contour(&raster, &ContourConfig::default()).unwrap();
        let complement = find_contour(&inverse, &ContourConfig::default()).unwrap();

        // The complement grows an outer perimeter ring in addition to the
        // hole around the center; the hole traces the same diamond with
        // opposite orientation.
        assert_eq!(original.rings.len(), 1);
        assert_eq!(complement.rings.len(), 2);
        let diamond = sorted_points(&original, 0);
        assert!(
            (0..complement.rings.len()).any(|i| sorted_points(&complement, i) == diamond),
            "no complement ring matches {diamond:?}",
        );
    }
}
