//! # Chart Document Mapping
//!
//! Converts a [`Chart`] to and from the game's `CMap` document layout.
//!
//! ## Layout
//! ```text
//! m_Name, m_mapID, m_barPerMin, m_timeOffset, m_leftRegion, m_rightRegion
//! m_notes      { m_notes: [entry, ...] }   front side
//! m_notesLeft  { m_notes: [entry, ...] }
//! m_notesRight { m_notes: [entry, ...] }
//!
//! entry: m_id, m_type, m_time, m_position, m_width, m_subId
//! ```
//!
//! ## Holds
//! A hold becomes two entries in its side list: a head (`m_type = 2`) whose
//! `m_subId` is the id of the tail entry (`m_type = 3`) written right after it.
//! Ids are handed out in traversal order across all sides, so a hold consumes
//! two ids and any other note consumes one.
//!
//! ## Regions
//! The document stores slide lanes inverted: `1` means enabled, `2` disabled.
//! See [`region_code`].

use crate::chart::Chart;
use crate::document::{Map, Value};
use crate::error::MergeError;
use crate::note::{Note, NoteKind, Side};
use std::collections::HashMap;
use tracing::warn;

const KEY_NAME: &str = "m_Name";
const KEY_MAP_ID: &str = "m_mapID";
const KEY_TEMPO: &str = "m_barPerMin";
const KEY_TIME_OFFSET: &str = "m_timeOffset";
const KEY_LEFT_REGION: &str = "m_leftRegion";
const KEY_RIGHT_REGION: &str = "m_rightRegion";
const KEY_FRONT_NOTES: &str = "m_notes";
const KEY_LEFT_NOTES: &str = "m_notesLeft";
const KEY_RIGHT_NOTES: &str = "m_notesRight";
const KEY_NOTE_LIST: &str = "m_notes";

const KEY_ID: &str = "m_id";
const KEY_TYPE: &str = "m_type";
const KEY_TIME: &str = "m_time";
const KEY_POSITION: &str = "m_position";
const KEY_WIDTH: &str = "m_width";
const KEY_SUB_ID: &str = "m_subId";

/// `m_subId` of every entry that is not a hold head
const NO_SUB_ID: i64 = -1;

/// Note type as written to the document. `HoldTail` only exists there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Normal,
    Chain,
    Hold,
    HoldTail,
}

impl EntryType {
    pub fn code(self) -> i64 {
        match self {
            EntryType::Normal => 0,
            EntryType::Chain => 1,
            EntryType::Hold => 2,
            EntryType::HoldTail => 3,
        }
    }

    /// Parse an integer code or the game's type name
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(code) = value.as_i64() {
            return match code {
                0 => Some(EntryType::Normal),
                1 => Some(EntryType::Chain),
                2 => Some(EntryType::Hold),
                3 => Some(EntryType::HoldTail),
                _ => None,
            };
        }
        match value.as_text()?.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Some(EntryType::Normal),
            "CHAIN" => Some(EntryType::Chain),
            "HOLD" => Some(EntryType::Hold),
            "SUB" => Some(EntryType::HoldTail),
            _ => None,
        }
    }
}

impl From<NoteKind> for EntryType {
    fn from(kind: NoteKind) -> Self {
        match kind {
            NoteKind::Normal => EntryType::Normal,
            NoteKind::Chain => EntryType::Chain,
            NoteKind::Hold => EntryType::Hold,
        }
    }
}

/// Region code for a slide flag. The schema inverts the usual convention.
pub fn region_code(slide_enabled: bool) -> i64 {
    if slide_enabled {
        1
    } else {
        2
    }
}

/// Slide flag for a region value: code `1` or the name `MIXER` enable sliding
pub fn region_enabled(value: &Value) -> Option<bool> {
    if let Some(code) = value.as_i64() {
        return Some(code == region_code(true));
    }
    match value.as_text()?.trim().to_ascii_uppercase().as_str() {
        "MIXER" => Some(true),
        "PAD" | "MULTI" | "" => Some(false),
        _ => None,
    }
}

#[derive(Default)]
struct SideLists {
    front: Vec<Value>,
    left: Vec<Value>,
    right: Vec<Value>,
}

impl SideLists {
    fn push(&mut self, side: Side, entry: Map) {
        let list = match side {
            Side::Front => &mut self.front,
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        list.push(Value::Map(entry));
    }
}

fn note_entry(id: i64, entry_type: EntryType, time: f64, note: &Note, sub_id: i64) -> Map {
    Map::new()
        .with(KEY_ID, id)
        .with(KEY_TYPE, entry_type.code())
        .with(KEY_TIME, time)
        .with(KEY_POSITION, note.left_edge())
        .with(KEY_WIDTH, note.width)
        .with(KEY_SUB_ID, sub_id)
}

fn note_list(entries: Vec<Value>) -> Map {
    Map::new().with(KEY_NOTE_LIST, entries)
}

impl Chart {
    /// Build the `CMap` document for this chart.
    ///
    /// Notes are written in chart order; call [`Chart::sort_notes`] first for
    /// canonical output.
    pub fn to_document(&self) -> Value {
        let mut lists = SideLists::default();
        let mut next_id: i64 = 0;

        for note in &self.notes {
            let id = next_id;
            if note.is_hold() {
                let tail_id = id + 1;
                let head = note_entry(id, EntryType::Hold, note.start, note, tail_id);
                let tail = note_entry(tail_id, EntryType::HoldTail, note.end, note, NO_SUB_ID);
                lists.push(note.side, head);
                lists.push(note.side, tail);
                next_id += 2;
            } else {
                let entry = note_entry(id, note.kind.into(), note.start, note, NO_SUB_ID);
                lists.push(note.side, entry);
                next_id += 1;
            }
        }

        Map::new()
            .with(KEY_NAME, self.name.as_str())
            .with(KEY_MAP_ID, self.map_id.as_str())
            .with(KEY_TEMPO, self.tempo)
            .with(KEY_TIME_OFFSET, self.time_offset)
            .with(KEY_LEFT_REGION, region_code(self.left_slide))
            .with(KEY_RIGHT_REGION, region_code(self.right_slide))
            .with(KEY_FRONT_NOTES, note_list(lists.front))
            .with(KEY_LEFT_NOTES, note_list(lists.left))
            .with(KEY_RIGHT_NOTES, note_list(lists.right))
            .into()
    }

    /// Read a chart back from a `CMap` document.
    ///
    /// Entries from all three sides are taken in `m_id` order, which restores
    /// the note order [`Chart::to_document`] wrote. Each hold head takes its
    /// end time from the tail its `m_subId` names.
    ///
    /// # Errors
    /// - [`MergeError::MissingField`] if the tempo or a note field is absent
    /// - [`MergeError::InvalidValue`] if a field has the wrong shape
    /// - [`MergeError::MissingHoldTail`] if a hold head has no tail
    pub fn from_document(document: &Value) -> Result<Chart, MergeError> {
        let root = document.as_map().ok_or_else(|| MergeError::InvalidValue {
            field: "document".to_string(),
            value: document.describe(),
        })?;

        let mut chart = Chart::new(required_f64(root, KEY_TEMPO)?);
        chart.name = optional_text(root, KEY_NAME)?;
        chart.map_id = optional_text(root, KEY_MAP_ID)?;
        chart.time_offset = optional_f64(root, KEY_TIME_OFFSET)?.unwrap_or(0.0);
        chart.left_slide = optional_region(root, KEY_LEFT_REGION)?;
        chart.right_slide = optional_region(root, KEY_RIGHT_REGION)?;

        let mut entries = Vec::new();
        for (key, side) in [
            (KEY_FRONT_NOTES, Side::Front),
            (KEY_LEFT_NOTES, Side::Left),
            (KEY_RIGHT_NOTES, Side::Right),
        ] {
            for item in side_entries(root, key)? {
                entries.push(RawEntry::parse(item, side)?);
            }
        }
        entries.sort_by_key(|e| e.id);

        let tails: HashMap<i64, f64> = entries
            .iter()
            .filter(|e| e.entry_type == EntryType::HoldTail)
            .map(|e| (e.id, e.time))
            .collect();

        for entry in &entries {
            let note = match entry.entry_type {
                EntryType::Normal => {
                    Note::normal(entry.side, entry.position, entry.width, entry.time)
                }
                EntryType::Chain => {
                    Note::chain(entry.side, entry.position, entry.width, entry.time)
                }
                EntryType::Hold => {
                    let end = tails.get(&entry.sub_id).copied().ok_or(MergeError::MissingHoldTail {
                        id: entry.id,
                        sub_id: entry.sub_id,
                    })?;
                    if end < entry.time {
                        warn!(
                            id = entry.id,
                            start = entry.time,
                            end,
                            "hold tail precedes head, clamping"
                        );
                    }
                    Note::hold(entry.side, entry.position, entry.width, entry.time, end)
                }
                EntryType::HoldTail => continue,
            };
            chart.push_note(note);
        }

        let heads: Vec<i64> = entries
            .iter()
            .filter(|e| e.entry_type == EntryType::Hold)
            .map(|e| e.sub_id)
            .collect();
        for tail in tails.keys().filter(|id| !heads.contains(id)) {
            warn!(id = *tail, "ignoring hold tail with no head");
        }

        Ok(chart)
    }
}

/// One note entry as read from the document
struct RawEntry {
    id: i64,
    entry_type: EntryType,
    side: Side,
    time: f64,
    position: f64,
    width: f64,
    sub_id: i64,
}

impl RawEntry {
    fn parse(item: &Value, side: Side) -> Result<Self, MergeError> {
        let map = item.as_map().ok_or_else(|| MergeError::InvalidValue {
            field: "note".to_string(),
            value: item.describe(),
        })?;
        let type_value = map
            .get(KEY_TYPE)
            .ok_or_else(|| MergeError::MissingField(KEY_TYPE.to_string()))?;
        let entry_type = EntryType::from_value(type_value).ok_or_else(|| MergeError::InvalidValue {
            field: KEY_TYPE.to_string(),
            value: type_value.describe(),
        })?;

        Ok(Self {
            id: required_i64(map, KEY_ID)?,
            entry_type,
            side,
            time: required_f64(map, KEY_TIME)?,
            position: required_f64(map, KEY_POSITION)?,
            width: optional_f64(map, KEY_WIDTH)?.unwrap_or(1.0),
            sub_id: optional_i64(map, KEY_SUB_ID)?.unwrap_or(NO_SUB_ID),
        })
    }
}

fn invalid(field: &str, value: &Value) -> MergeError {
    MergeError::InvalidValue {
        field: field.to_string(),
        value: value.describe(),
    }
}

fn optional_f64(map: &Map, key: &str) -> Result<Option<f64>, MergeError> {
    map.get(key)
        .map(|v| v.as_f64().ok_or_else(|| invalid(key, v)))
        .transpose()
}

fn required_f64(map: &Map, key: &str) -> Result<f64, MergeError> {
    optional_f64(map, key)?.ok_or_else(|| MergeError::MissingField(key.to_string()))
}

fn optional_i64(map: &Map, key: &str) -> Result<Option<i64>, MergeError> {
    map.get(key)
        .map(|v| v.as_i64().ok_or_else(|| invalid(key, v)))
        .transpose()
}

fn required_i64(map: &Map, key: &str) -> Result<i64, MergeError> {
    optional_i64(map, key)?.ok_or_else(|| MergeError::MissingField(key.to_string()))
}

fn optional_text(map: &Map, key: &str) -> Result<String, MergeError> {
    match map.get(key) {
        Some(v) => v.as_text().ok_or_else(|| invalid(key, v)),
        None => Ok(String::new()),
    }
}

fn optional_region(map: &Map, key: &str) -> Result<bool, MergeError> {
    match map.get(key) {
        Some(v) => region_enabled(v).ok_or_else(|| invalid(key, v)),
        None => Ok(false),
    }
}

/// Entries of one side list. An empty element (read back as empty text) is an
/// empty list.
fn side_entries<'a>(root: &'a Map, key: &str) -> Result<&'a [Value], MergeError> {
    let Some(side) = root.get(key) else {
        return Ok(&[]);
    };
    let list = match side {
        Value::Map(map) => match map.get(KEY_NOTE_LIST) {
            Some(list) => list,
            None => return Ok(&[]),
        },
        Value::Text(text) if text.trim().is_empty() => return Ok(&[]),
        other => return Err(invalid(key, other)),
    };
    match list {
        Value::List(items) => Ok(items),
        Value::Text(text) if text.trim().is_empty() => Ok(&[]),
        other => Err(invalid(KEY_NOTE_LIST, other)),
    }
}
