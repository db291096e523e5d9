//! # Chart Algebra
//!
//! A [`Chart`] owns its notes plus the tempo data that maps bar units onto
//! wall-clock time (`seconds = bars * 60 / tempo`).
//!
//! ## Operations
//! - [`Chart::shift`] - translate every note (consumes and returns the chart)
//! - [`Chart::clip`] - cut out a bar range and re-base it to zero
//! - [`Chart::change_bpm`] - re-express note times under a new tempo
//! - [`Chart::change_speed`] - redefine tempo and offset for a playback speed
//! - [`Chart::concat`] - append a second chart after a song of given length
//! - [`Chart::concatenate`] - the same, leaving both inputs untouched
//!
//! Every fallible operation validates first and fails without touching any
//! note, so callers never see a partially transformed chart.
//!
//! ## Hold Clipping
//! ```text
//! window:        [start ............ end]
//! inside:              |==hold==|              kept
//! ends at head:                     |==hold==  -> Normal at end
//! ends inside:                   |==hold====   -> Hold cut at end
//! starts at tail:  ==hold==|                   -> Chain at start
//! starts inside:     ==hold====|               -> Hold cut at start
//! ```

use crate::error::MergeError;
use crate::note::{Note, NoteKind};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub name: String,
    pub map_id: String,
    pub notes: Vec<Note>,
    /// Duration in bars
    pub total_time: f64,
    pub left_slide: bool,
    pub right_slide: bool,
    /// Bars per minute
    pub tempo: f64,
    pub time_offset: f64,
}

impl Chart {
    /// Empty chart at the given tempo
    pub fn new(tempo: f64) -> Self {
        Self {
            name: String::new(),
            map_id: String::new(),
            notes: Vec::new(),
            total_time: 0.0,
            left_slide: false,
            right_slide: false,
            tempo,
            time_offset: 0.0,
        }
    }

    /// Append a note, extending `total_time` when it ends later
    pub fn push_note(&mut self, note: Note) {
        self.total_time = self.total_time.max(note.end);
        self.notes.push(note);
    }

    /// Latest note end, or 0 for an empty chart
    pub fn end_time(&self) -> f64 {
        self.notes.iter().map(|n| n.end).fold(0.0, f64::max)
    }

    /// Stable sort by the canonical note order
    pub fn sort_notes(&mut self) {
        self.notes.sort_by(Note::cmp_canonical);
    }

    /// Bars to seconds at this chart's tempo
    pub fn bars_to_seconds(&self, bars: f64) -> f64 {
        bars * 60.0 / self.tempo
    }

    /// Seconds to bars at this chart's tempo
    pub fn seconds_to_bars(&self, seconds: f64) -> f64 {
        self.tempo * seconds / 60.0
    }

    /// Translate every note and the chart end by `bar_offset`
    pub fn shift(mut self, bar_offset: f64) -> Chart {
        for note in &mut self.notes {
            note.shift(bar_offset);
        }
        self.total_time += bar_offset;
        self
    }

    /// Cut the chart down to `[start, end]`, re-based so `start` becomes 0.
    ///
    /// Zero-length notes survive when `start <= note.start <= end`. Holds that
    /// straddle a boundary are truncated, or degraded to a Normal (window ends
    /// on the head) or a Chain (window starts on the tail). The result's
    /// `total_time` is the window length regardless of which notes survive.
    ///
    /// # Errors
    /// - [`MergeError::ClipRangeInvalid`] if `end < start`
    /// - [`MergeError::MalformedHold`] if any note ends before it starts
    pub fn clip(&self, start: f64, end: f64) -> Result<Chart, MergeError> {
        if end < start {
            return Err(MergeError::ClipRangeInvalid { start, end });
        }
        self.check_notes()?;

        let mut notes = Vec::with_capacity(self.notes.len());
        for note in &self.notes {
            if let Some(mut kept) = clip_note(note, start, end) {
                kept.shift(-start);
                notes.push(kept);
            }
        }

        debug!(
            start,
            end,
            kept = notes.len(),
            dropped = self.notes.len() - notes.len(),
            "clipped chart"
        );

        Ok(Chart {
            notes,
            total_time: end - start,
            ..self.without_notes()
        })
    }

    /// Copy of this chart whose note times follow `new_tempo`.
    ///
    /// Each `start`/`end` is scaled by `new_tempo / tempo`, so every note stays
    /// at the same wall-clock instant. `time_offset` and `total_time` are
    /// carried over unchanged.
    ///
    /// # Errors
    /// - [`MergeError::InvalidTempo`] if either tempo is not a positive number
    /// - [`MergeError::MalformedHold`] if a note ends before it starts
    pub fn change_bpm(&self, new_tempo: f64) -> Result<Chart, MergeError> {
        self.check_notes()?;
        self.clone().rescaled(new_tempo)
    }

    /// Copy of this chart played at `factor` times the speed.
    ///
    /// Tempo scales up with the speed and the offset scales down; note times
    /// are left alone because they are counts of the (now shorter) bar.
    ///
    /// # Errors
    /// [`MergeError::InvalidSpeed`] if `factor` is not a positive number.
    pub fn change_speed(&self, factor: f64) -> Result<Chart, MergeError> {
        if !is_positive(factor) {
            return Err(MergeError::InvalidSpeed(factor));
        }
        let mut chart = self.clone();
        chart.tempo *= factor;
        chart.time_offset /= factor;
        Ok(chart)
    }

    /// Append `other` so that it starts once a song of `song_length_sec`
    /// seconds has played, consuming both charts.
    ///
    /// `other` is first re-timed to this chart's tempo. Its time zero lands at
    /// `song_length_sec + self.time_offset - other.time_offset` on this chart's
    /// clock, converted to bars at the shared tempo. A slide lane stays enabled
    /// only when both charts enable it. Either chart may be empty.
    ///
    /// # Errors
    /// - [`MergeError::InvalidSongLength`] if the length is negative
    /// - [`MergeError::InvalidTempo`] if either tempo is not positive
    /// - [`MergeError::MalformedHold`] if either chart has a note ending before it starts
    pub fn concat(mut self, other: Chart, song_length_sec: f64) -> Result<Chart, MergeError> {
        if !(song_length_sec >= 0.0 && song_length_sec.is_finite()) {
            return Err(MergeError::InvalidSongLength(song_length_sec));
        }
        check_tempo(self.tempo)?;
        self.check_notes()?;
        other.check_notes()?;

        let other = other.rescaled(self.tempo)?;
        let time_offset = song_length_sec + self.time_offset - other.time_offset;
        let bar_offset = self.seconds_to_bars(time_offset);

        debug!(
            former_notes = self.notes.len(),
            latter_notes = other.notes.len(),
            bar_offset,
            "concatenating charts"
        );

        self.notes.reserve(other.notes.len());
        for mut note in other.notes {
            note.shift(bar_offset);
            self.push_note(note);
        }
        self.left_slide = self.left_slide && other.left_slide;
        self.right_slide = self.right_slide && other.right_slide;
        Ok(self)
    }

    /// Merge two charts without touching either input.
    ///
    /// # Example
    /// ```rust
    /// use dymerge::{Chart, Note, Side};
    ///
    /// let mut first = Chart::new(120.0);
    /// first.push_note(Note::normal(Side::Front, 0.0, 1.0, 0.0));
    /// let mut second = Chart::new(120.0);
    /// second.push_note(Note::normal(Side::Front, 0.0, 1.0, 0.0));
    ///
    /// let merged = Chart::concatenate(&first, &second, 2.0)?;
    /// assert_eq!(merged.notes.len(), 2);
    /// assert_eq!(merged.notes[1].start, 4.0);
    /// assert_eq!(first.notes.len(), 1);
    /// # Ok::<(), dymerge::MergeError>(())
    /// ```
    pub fn concatenate(
        former: &Chart,
        latter: &Chart,
        song_length_sec: f64,
    ) -> Result<Chart, MergeError> {
        former.clone().concat(latter.clone(), song_length_sec)
    }

    /// Reject any note that ends before it starts
    pub fn check_notes(&self) -> Result<(), MergeError> {
        match self.notes.iter().position(|n| !n.is_well_formed()) {
            Some(index) => {
                let note = &self.notes[index];
                Err(MergeError::MalformedHold {
                    index,
                    start: note.start,
                    end: note.end,
                })
            }
            None => Ok(()),
        }
    }

    fn rescaled(mut self, new_tempo: f64) -> Result<Chart, MergeError> {
        check_tempo(self.tempo)?;
        check_tempo(new_tempo)?;
        let ratio = new_tempo / self.tempo;
        for note in &mut self.notes {
            note.start *= ratio;
            note.end *= ratio;
        }
        self.tempo = new_tempo;
        Ok(self)
    }

    fn without_notes(&self) -> Chart {
        Chart {
            name: self.name.clone(),
            map_id: self.map_id.clone(),
            notes: Vec::new(),
            ..*self
        }
    }
}

/// Apply the clip policy to one note. Times are returned un-rebased.
fn clip_note(note: &Note, start: f64, end: f64) -> Option<Note> {
    if !note.is_hold() {
        return (start <= note.start && note.start <= end).then(|| note.clone());
    }

    let mut note = note.clone();
    if start <= note.start {
        if end >= note.end {
            Some(note)
        } else if end == note.start {
            note.kind = NoteKind::Normal;
            note.end = end;
            Some(note)
        } else if end > note.start {
            note.end = end;
            Some(note)
        } else {
            None
        }
    } else if start == note.end {
        note.kind = NoteKind::Chain;
        note.start = start;
        Some(note)
    } else if start < note.end {
        note.start = start;
        note.end = end.min(note.end);
        Some(note)
    } else {
        None
    }
}

fn is_positive(value: f64) -> bool {
    value > 0.0 && value.is_finite()
}

fn check_tempo(tempo: f64) -> Result<(), MergeError> {
    if is_positive(tempo) {
        Ok(())
    } else {
        Err(MergeError::InvalidTempo(tempo))
    }
}
