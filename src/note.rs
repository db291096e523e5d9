//! # Note Types
//!
//! A note is a single gameplay event on one of the three lane groups.
//!
//! ## Geometry
//! Positions are stored **center-based**: the constructor takes the left edge
//! and stores `left_edge + width / 2`. Everything downstream (clipping,
//! sorting) works on the center; only export converts back to the left edge.
//!
//! ## Timing
//! `start` and `end` are in bar units. Normal and Chain notes have zero length
//! (`end == start`); a Hold spans `start..=end` with `end >= start`.

use std::cmp::Ordering;

/// Gameplay note type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    Normal,
    Chain,
    Hold,
}

impl NoteKind {
    /// Fixed rank used by the canonical note order (Normal < Chain < Hold)
    pub fn rank(self) -> u8 {
        match self {
            NoteKind::Normal => 0,
            NoteKind::Chain => 1,
            NoteKind::Hold => 2,
        }
    }
}

/// Lane group a note belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Front,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub kind: NoteKind,
    pub side: Side,
    /// Center lane coordinate
    pub position: f64,
    pub width: f64,
    /// Start time in bars
    pub start: f64,
    /// End time in bars (equal to `start` unless this is a hold)
    pub end: f64,
}

impl Note {
    /// Build a note from its left edge.
    ///
    /// `end` is ignored for Normal and Chain notes and clamped to `start` for
    /// holds, so a freshly built note always satisfies `end >= start`.
    pub fn new(
        kind: NoteKind,
        side: Side,
        left_edge: f64,
        width: f64,
        start: f64,
        end: f64,
    ) -> Self {
        let end = match kind {
            NoteKind::Hold => start.max(end),
            NoteKind::Normal | NoteKind::Chain => start,
        };
        Self {
            kind,
            side,
            position: left_edge + width / 2.0,
            width,
            start,
            end,
        }
    }

    pub fn normal(side: Side, left_edge: f64, width: f64, time: f64) -> Self {
        Self::new(NoteKind::Normal, side, left_edge, width, time, time)
    }

    pub fn chain(side: Side, left_edge: f64, width: f64, time: f64) -> Self {
        Self::new(NoteKind::Chain, side, left_edge, width, time, time)
    }

    pub fn hold(side: Side, left_edge: f64, width: f64, start: f64, end: f64) -> Self {
        Self::new(NoteKind::Hold, side, left_edge, width, start, end)
    }

    /// Left edge, the coordinate the chart document stores
    pub fn left_edge(&self) -> f64 {
        self.position - self.width / 2.0
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_hold(&self) -> bool {
        self.kind == NoteKind::Hold
    }

    pub fn is_well_formed(&self) -> bool {
        self.end >= self.start
    }

    /// Translate both endpoints by `bars`
    pub fn shift(&mut self, bars: f64) {
        self.start += bars;
        self.end += bars;
    }

    /// Canonical total order: start, kind rank, end (holds only), position, width.
    ///
    /// Floats are compared with `total_cmp`, so sorting is reproducible even
    /// for values `partial_cmp` cannot order.
    pub fn cmp_canonical(&self, other: &Note) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then_with(|| self.kind.rank().cmp(&other.kind.rank()))
            .then_with(|| {
                if self.is_hold() && other.is_hold() {
                    self.end.total_cmp(&other.end)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| self.position.total_cmp(&other.position))
            .then_with(|| self.width.total_cmp(&other.width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_is_stored_center_based() {
        let note = Note::normal(Side::Front, 1.0, 2.0, 0.5);
        assert_eq!(note.position, 2.0);
        assert_eq!(note.left_edge(), 1.0);
    }

    #[test]
    fn test_non_hold_end_equals_start() {
        let note = Note::new(NoteKind::Chain, Side::Left, 0.0, 1.0, 3.0, 9.0);
        assert_eq!(note.end, 3.0);
        assert_eq!(note.duration(), 0.0);
    }

    #[test]
    fn test_hold_end_clamped_to_start() {
        let note = Note::hold(Side::Right, 0.0, 1.0, 4.0, 2.0);
        assert_eq!(note.start, 4.0);
        assert_eq!(note.end, 4.0);
        assert!(note.is_well_formed());

        let note = Note::hold(Side::Right, 0.0, 1.0, 2.0, 5.0);
        assert_eq!(note.end, 5.0);
        assert_eq!(note.duration(), 3.0);
    }

    #[test]
    fn test_is_hold() {
        assert!(Note::hold(Side::Front, 0.0, 1.0, 0.0, 1.0).is_hold());
        assert!(!Note::chain(Side::Front, 0.0, 1.0, 0.0).is_hold());
        assert!(!Note::normal(Side::Front, 0.0, 1.0, 0.0).is_hold());
    }

    #[test]
    fn test_clone_is_bit_exact() {
        let note = Note::hold(Side::Front, 0.1, 0.7, 1.0 / 3.0, 2.0 / 3.0);
        let copy = note.clone();
        assert_eq!(copy.position.to_bits(), note.position.to_bits());
        assert_eq!(copy.width.to_bits(), note.width.to_bits());
        assert_eq!(copy.start.to_bits(), note.start.to_bits());
        assert_eq!(copy.end.to_bits(), note.end.to_bits());
        assert_eq!(copy, note);
    }

    #[test]
    fn test_canonical_order() {
        let mut notes = vec![
            Note::hold(Side::Front, 0.0, 1.0, 1.0, 4.0),
            Note::hold(Side::Front, 0.0, 1.0, 1.0, 3.0),
            Note::chain(Side::Front, 0.0, 1.0, 1.0),
            Note::normal(Side::Front, 2.0, 1.0, 1.0),
            Note::normal(Side::Front, 0.0, 1.0, 1.0),
            Note::normal(Side::Front, 0.0, 3.0, 0.0),
        ];
        notes.sort_by(Note::cmp_canonical);

        assert_eq!(notes[0].start, 0.0);
        assert_eq!((notes[1].kind, notes[1].position), (NoteKind::Normal, 0.5));
        assert_eq!((notes[2].kind, notes[2].position), (NoteKind::Normal, 2.5));
        assert_eq!(notes[3].kind, NoteKind::Chain);
        assert_eq!((notes[4].kind, notes[4].end), (NoteKind::Hold, 3.0));
        assert_eq!((notes[5].kind, notes[5].end), (NoteKind::Hold, 4.0));
    }

    #[test]
    fn test_canonical_order_ties_on_width() {
        let narrow = Note::normal(Side::Front, 0.5, 1.0, 0.0);
        let wide = Note::normal(Side::Front, 0.0, 2.0, 0.0);
        assert_eq!(narrow.position, wide.position);
        assert_eq!(narrow.cmp_canonical(&wide), Ordering::Less);
        assert_eq!(wide.cmp_canonical(&wide.clone()), Ordering::Equal);
    }
}
