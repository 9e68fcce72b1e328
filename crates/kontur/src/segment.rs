//! Segment stitching: oriented lattice edges, endpoint indices, and
//! on-the-fly ring assembly.
//!
//! Every visited cell emits one or more oriented segments on the doubled
//! lattice. The [`SegmentStore`] keeps two hash indices over the live
//! segments -- one by start vertex, one by end vertex -- so each new
//! segment links to its neighbors in constant expected time. Chains of
//! linked segments carry a *ring-leader* tag (the id of a canonical
//! member); when a new segment bridges two chain ends that already share
//! a leader, the ring has closed and can be walked out immediately.
//!
//! Segments live in an arena (`Vec` indexed by [`SegmentId`]) and all
//! links are indices, so leader propagation is plain index chasing with
//! no aliasing concerns.

use std::collections::HashMap;
use std::fmt;

use crate::types::{ContourError, LatticePoint};

/// Orientation of a segment, named from the reader's viewpoint with `y`
/// growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `+x`
    Right,
    /// `-x`
    Left,
    /// `-y`
    Up,
    /// `+y`
    Down,
    /// `+x, -y`
    RightUp,
    /// `+x, +y`
    RightDown,
    /// `-x, -y`
    LeftUp,
    /// `-x, +y`
    LeftDown,
}

impl Direction {
    /// Orientation of the step from `start` to `end`.
    ///
    /// Segment endpoints are always distinct, and both full steps and
    /// the half steps of border cells reduce to the same eight
    /// orientations.
    fn between(start: LatticePoint, end: LatticePoint) -> Self {
        match ((end.x - start.x).signum(), (end.y - start.y).signum()) {
            (1, 0) => Self::Right,
            (-1, 0) => Self::Left,
            (0, -1) => Self::Up,
            (0, 1) => Self::Down,
            (1, -1) => Self::RightUp,
            (1, 1) => Self::RightDown,
            (-1, -1) => Self::LeftUp,
            (-1, 1) => Self::LeftDown,
            _ => unreachable!("degenerate segment {start} -> {end}"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Right => "r",
            Self::Left => "l",
            Self::Up => "u",
            Self::Down => "d",
            Self::RightUp => "ru",
            Self::RightDown => "rd",
            Self::LeftUp => "lu",
            Self::LeftDown => "ld",
        })
    }
}

/// Index of a segment within its store.
pub(crate) type SegmentId = usize;

/// One oriented lattice edge together with its ring links.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    /// Code of the cell that emitted this segment.
    pub cell_code: u8,
    /// Resolved sub-code; saddles and border cells emit segments under
    /// the plain code that matches their geometry.
    pub code: u8,
    pub direction: Direction,
    pub start: LatticePoint,
    pub end: LatticePoint,
    pub prev: Option<SegmentId>,
    pub next: Option<SegmentId>,
    /// Canonical segment of the chain this one belongs to; `None` only
    /// while stranded.
    pub leader: Option<SegmentId>,
}

/// Arena of segments plus the two endpoint indices.
#[derive(Debug, Default)]
pub(crate) struct SegmentStore {
    segments: Vec<Segment>,
    by_start: HashMap<LatticePoint, SegmentId>,
    by_end: HashMap<LatticePoint, SegmentId>,
}

impl SegmentStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn segment_mut(&mut self, id: SegmentId) -> &mut Segment {
        &mut self.segments[id]
    }

    /// Insert a segment, link it to its neighbors, and unify ring-leader
    /// tags.
    ///
    /// Returns the ring-leader id when this insertion closed a ring; the
    /// caller walks the ring out with [`Self::ring_vertices`].
    pub(crate) fn add(
        &mut self,
        cell_code: u8,
        code: u8,
        start: LatticePoint,
        end: LatticePoint,
    ) -> Option<SegmentId> {
        let id = self.segments.len();
        let prev = self.by_end.get(&start).copied();
        let next = self.by_start.get(&end).copied();

        self.segments.push(Segment {
            cell_code,
            code,
            direction: Direction::between(start, end),
            start,
            end,
            prev,
            next,
            leader: None,
        });
        self.by_start.insert(start, id);
        self.by_end.insert(end, id);

        if prev.is_none() && next.is_none() {
            // Stranded; a later neighbor will pick it up.
            return None;
        }

        if let Some(p) = prev {
            self.segments[p].next = Some(id);
        }
        if let Some(n) = next {
            self.segments[n].prev = Some(id);
        }

        let prev_leader = prev.and_then(|p| self.segments[p].leader);
        let next_leader = next.and_then(|n| self.segments[n].leader);

        match (prev_leader, next_leader) {
            (None, None) => {
                // A leaderless neighbor is necessarily stranded, so the
                // new chain has at most three members.
                self.segments[id].leader = Some(id);
                if let Some(p) = prev {
                    self.segments[p].leader = Some(id);
                }
                if let Some(n) = next {
                    self.segments[n].leader = Some(id);
                }
                None
            }
            (Some(_), None) => {
                if let Some(p) = prev {
                    self.spread_forward(p);
                }
                None
            }
            (None, Some(_)) => {
                if let Some(n) = next {
                    self.spread_backward(n);
                }
                None
            }
            (Some(a), Some(b)) if a != b => {
                // Two chains merge; the predecessor's leader wins.
                if let Some(p) = prev {
                    self.spread_forward(p);
                }
                None
            }
            (Some(leader), Some(_)) => {
                // Both ends of the same chain: the ring just closed.
                self.segments[id].leader = Some(leader);
                Some(leader)
            }
        }
    }

    /// Copy `from`'s leader onto every segment reachable through `next`.
    fn spread_forward(&mut self, from: SegmentId) {
        let leader = self.segments[from].leader;
        let mut cursor = self.segments[from].next;
        while let Some(s) = cursor {
            self.segments[s].leader = leader;
            cursor = self.segments[s].next;
        }
    }

    /// Copy `from`'s leader onto every segment reachable through `prev`.
    fn spread_backward(&mut self, from: SegmentId) {
        let leader = self.segments[from].leader;
        let mut cursor = self.segments[from].prev;
        while let Some(s) = cursor {
            self.segments[s].leader = leader;
            cursor = self.segments[s].prev;
        }
    }

    /// Walk a closed ring from its leader and collect its lattice
    /// vertices.
    ///
    /// The walk terminates at the head when the head starts a fresh
    /// cell-code run, and one segment earlier when the head continues
    /// its predecessor's run; without that adjustment the walk would
    /// revisit the head's vertex on degenerate code transitions.
    ///
    /// With `join_straight` set, a vertex is only kept where the
    /// direction changes, merging runs of collinear segments into single
    /// edges.
    ///
    /// # Errors
    ///
    /// [`ContourError::ForeignSegment`] when a visited segment carries a
    /// different leader, [`ContourError::OpenRing`] when a `next` link is
    /// missing. Neither occurs for rings produced by a well-formed sweep.
    pub(crate) fn ring_vertices(
        &self,
        leader: SegmentId,
        join_straight: bool,
    ) -> Result<Vec<LatticePoint>, ContourError> {
        let head = &self.segments[leader];
        let mut vertices = vec![head.start];

        let head_prev = head.prev.ok_or_else(|| self.open_ring(leader, leader))?;
        let terminal = if head.code == self.segments[head_prev].code {
            head_prev
        } else {
            leader
        };

        let mut previous_direction = head.direction;
        let mut current = head.next.ok_or_else(|| self.open_ring(leader, leader))?;
        while current != terminal {
            let segment = &self.segments[current];
            if segment.leader != Some(leader) {
                return Err(self.foreign_segment(current, leader));
            }
            if !join_straight || segment.direction != previous_direction {
                vertices.push(segment.start);
            }
            previous_direction = segment.direction;
            current = segment.next.ok_or_else(|| self.open_ring(current, leader))?;
        }

        Ok(vertices)
    }

    fn foreign_segment(&self, id: SegmentId, expected: SegmentId) -> ContourError {
        let s = &self.segments[id];
        ContourError::ForeignSegment {
            cell_code: s.cell_code,
            code: s.code,
            start: s.start,
            end: s.end,
            direction: s.direction,
            declared: s.leader,
            expected,
        }
    }

    fn open_ring(&self, id: SegmentId, ring: SegmentId) -> ContourError {
        let s = &self.segments[id];
        ContourError::OpenRing {
            cell_code: s.cell_code,
            code: s.code,
            start: s.start,
            end: s.end,
            direction: s.direction,
            ring,
        }
    }
}
