//! Ring simplification: area-priority vertex removal on closed rings.
//!
//! A Visvalingam-Whyatt variant. Each vertex is scored by the
//! parallelogram area it spans with its two ring neighbors (twice the
//! triangle area); vertices are deleted cheapest-first until the
//! cheapest remaining vertex exceeds the tolerance. Vertices shared by
//! more than two rings across the whole input are junctions and are
//! never removed, so adjacent regions keep meeting at the same points.
//!
//! Collinear vertices have zero cost and are deleted first at any
//! tolerance, so a zero tolerance is a pure collinear cleanup.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::types::{Contour, Point, Ring};

/// Default simplification tolerance in triangle-area units.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 10.0;

/// Simplify every ring of every contour, preserving shared junctions.
///
/// `tolerance` is in triangle-area units: a vertex survives when the
/// triangle it spans with its neighbors exceeds this area. Rings with
/// four or fewer vertices are returned unchanged, as are empty
/// contours; border masks pass through untouched.
#[must_use = "returns the simplified contours"]
pub fn simplify(contours: &[Contour], tolerance: f64) -> Vec<Contour> {
    let locked = locked_vertices(contours);
    contours
        .iter()
        .map(|contour| Contour {
            rings: contour
                .rings
                .iter()
                .map(|ring| simplify_ring(ring, &locked, tolerance))
                .collect(),
            border: contour.border.clone(),
        })
        .collect()
}

/// Bit-exact vertex identity.
///
/// Ring coordinates are halves of lattice integers, so bit equality is
/// exact equality and junction counting cannot be confused by rounding.
type VertexKey = (u64, u64);

fn vertex_key(p: Point) -> VertexKey {
    (p.x.to_bits(), p.y.to_bits())
}

/// Vertices appearing in more than two rings across all contours.
///
/// Two occurrences is the normal case for a boundary shared by two
/// adjacent regions; more marks a junction.
fn locked_vertices(contours: &[Contour]) -> HashSet<VertexKey> {
    let mut multiplicity: HashMap<VertexKey, u32> = HashMap::new();
    for contour in contours {
        for ring in &contour.rings {
            for &point in ring.points() {
                *multiplicity.entry(vertex_key(point)).or_insert(0) += 1;
            }
        }
    }
    multiplicity
        .into_iter()
        .filter(|&(_, count)| count > 2)
        .map(|(key, _)| key)
        .collect()
}

/// One vertex of the cyclic working list.
struct Slot {
    point: Point,
    prev: usize,
    next: usize,
    cost: f64,
    alive: bool,
    locked: bool,
}

/// Heap entry ordered by (cost, x, y, slot); the slot index is a final
/// tie-break so duplicate coordinates still order deterministically.
struct Candidate {
    cost: f64,
    x: f64,
    y: f64,
    slot: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.x.total_cmp(&other.x))
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.slot.cmp(&other.slot))
    }
}

/// Parallelogram area spanned by slot `i` and its live neighbors.
fn vertex_cost(slots: &[Slot], i: usize) -> f64 {
    let a = slots[slots[i].prev].point;
    let p = slots[i].point;
    let c = slots[slots[i].next].point;
    ((p.x - a.x) * (c.y - a.y) - (c.x - a.x) * (p.y - a.y)).abs()
}

fn simplify_ring(ring: &Ring, locked: &HashSet<VertexKey>, tolerance: f64) -> Ring {
    let points = ring.points();
    let n = points.len();
    if n <= 4 {
        return ring.clone();
    }

    let mut slots: Vec<Slot> = points
        .iter()
        .enumerate()
        .map(|(i, &point)| Slot {
            point,
            prev: (i + n - 1) % n,
            next: (i + 1) % n,
            cost: f64::INFINITY,
            alive: true,
            locked: locked.contains(&vertex_key(point)),
        })
        .collect();

    // Locked slots keep an infinite cost and never enter the work set;
    // they still act as triangle neighbors for everyone else.
    let mut heap = BinaryHeap::new();
    for i in 0..n {
        if !slots[i].locked {
            let cost = vertex_cost(&slots, i);
            slots[i].cost = cost;
            heap.push(Reverse(Candidate {
                cost,
                x: slots[i].point.x,
                y: slots[i].point.y,
                slot: i,
            }));
        }
    }

    // Costs are parallelogram areas; the caller's tolerance is in
    // triangle-area units.
    let threshold = 2.0 * tolerance;
    let mut live = n;
    while live > 3 {
        let Some(Reverse(candidate)) = heap.pop() else {
            break;
        };
        let i = candidate.slot;
        if !slots[i].alive || slots[i].cost.to_bits() != candidate.cost.to_bits() {
            continue; // superseded by a neighbor recomputation
        }
        if candidate.cost > threshold {
            break;
        }

        slots[i].alive = false;
        live -= 1;
        let (prev, next) = (slots[i].prev, slots[i].next);
        slots[prev].next = next;
        slots[next].prev = prev;

        for neighbor in [prev, next] {
            if !slots[neighbor].locked {
                let cost = vertex_cost(&slots, neighbor);
                slots[neighbor].cost = cost;
                heap.push(Reverse(Candidate {
                    cost,
                    x: slots[neighbor].point.x,
                    y: slots[neighbor].point.y,
                    slot: neighbor,
                }));
            }
        }
    }

    let Some(first) = slots.iter().position(|slot| slot.alive) else {
        return Ring::new(Vec::new());
    };
    let mut out = Vec::with_capacity(live);
    let mut cursor = first;
    loop {
        out.push(slots[cursor].point);
        cursor = slots[cursor].next;
        if cursor == first {
            break;
        }
    }
    Ring::new(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::raster::BitGrid;
    use crate::types::Dimensions;

    fn ring(points: &[(f64, f64)]) -> Ring {
        Ring::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn contour_with(rings: Vec<Ring>) -> Contour {
        let mut contour = Contour::new(Dimensions {
            width: 1,
            height: 1,
        });
        contour.rings = rings;
        contour
    }

    fn points(ring: &Ring) -> Vec<(f64, f64)> {
        ring.points().iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn short_rings_are_untouched() {
        let square = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let input = vec![contour_with(vec![square.clone()])];
        let output = simplify(&input, f64::INFINITY);
        assert_eq!(output[0].rings[0], square);
    }

    #[test]
    fn empty_contours_pass_through() {
        let input = vec![contour_with(Vec::new())];
        let output = simplify(&input, DEFAULT_SIMPLIFY_TOLERANCE);
        assert!(output[0].is_empty());
    }

    #[test]
    fn zero_tolerance_removes_only_collinear_vertices() {
        // A 2x2 square with edge midpoints: the midpoints span zero area
        // and vanish, the corners span area 2 and stay.
        let input = vec![contour_with(vec![ring(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (2.0, 2.0),
            (1.0, 2.0),
            (0.0, 2.0),
            (0.0, 1.0),
        ])])];
        let output = simplify(&input, 0.0);
        assert_eq!(
            points(&output[0].rings[0]),
            vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
        );
    }

    #[test]
    fn zero_tolerance_is_identity_without_collinear_vertices() {
        let hexagon = ring(&[
            (0.0, 0.0),
            (2.0, -1.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (2.0, 3.0),
            (0.0, 2.0),
        ]);
        let input = vec![contour_with(vec![hexagon.clone()])];
        let output = simplify(&input, 0.0);
        assert_eq!(output[0].rings[0], hexagon);
    }

    #[test]
    fn unbounded_tolerance_collapses_to_three_vertices() {
        let input = vec![contour_with(vec![ring(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (2.0, 2.0),
            (1.0, 2.0),
            (0.0, 2.0),
            (0.0, 1.0),
        ])])];
        let output = simplify(&input, f64::INFINITY);
        assert_eq!(output[0].rings[0].len(), 3);
    }

    #[test]
    fn vertex_in_two_rings_is_not_locked() {
        // (1, 1) is collinear inside ring A and also appears in ring B;
        // two occurrences is the ordinary shared-boundary case, so it is
        // still removable.
        let a = ring(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (4.0, 0.0), (0.0, 4.0)]);
        let b = ring(&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0), (0.5, 2.0)]);
        let input = vec![contour_with(vec![a]), contour_with(vec![b])];
        let output = simplify(&input, 0.0);
        assert_eq!(
            points(&output[0].rings[0]),
            vec![(0.0, 0.0), (2.0, 2.0), (0.0, 4.0)],
        );
    }

    #[test]
    fn junction_vertices_survive_any_tolerance() {
        // (1, 1) appears in three rings, so it is a junction and must
        // survive even though it is collinear inside ring A.
        let a = ring(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (4.0, 0.0), (0.0, 4.0)]);
        let b = ring(&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0), (0.5, 2.0)]);
        let c = ring(&[(1.0, 1.0), (5.0, 1.0), (5.0, 5.0), (1.0, 5.0), (0.5, 3.0)]);
        let input = vec![
            contour_with(vec![a]),
            contour_with(vec![b]),
            contour_with(vec![c]),
        ];
        let output = simplify(&input, 100.0);
        for (index, contour) in output.iter().enumerate() {
            assert!(
                points(&contour.rings[0]).contains(&(1.0, 1.0)),
                "junction dropped from ring {index}",
            );
        }
    }

    #[test]
    fn ties_break_on_x_then_y() {
        // Both midpoints cost zero; (0, 1) goes first (smaller x), which
        // is observable because removing it re-prices its neighbors
        // before (2, 1) is considered. The end state is the same either
        // way; this pins the ordering by checking determinism across
        // repeated runs on a ring engineered with equal costs.
        let input = vec![contour_with(vec![ring(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (2.0, 2.0),
            (0.0, 2.0),
            (0.0, 1.0),
        ])])];
        let first = simplify(&input, 0.0);
        let second = simplify(&input, 0.0);
        assert_eq!(first, second);
        assert_eq!(
            points(&first[0].rings[0]),
            vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
        );
    }

    #[test]
    fn border_masks_pass_through_unchanged() {
        let mut contour = contour_with(vec![ring(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 2.0),
            (0.0, 2.0),
        ])]);
        contour.border = BitGrid::from_fn(1, 1, |_, _| true);
        let output = simplify(&[contour.clone()], 0.0);
        assert_eq!(output[0].border, contour.border);
    }
}
