//! # dymerge
//!
//! Concatenates two rhythm-game charts into one continuous chart that follows
//! a first song and then a second song appended after it.
//!
//! ## Pipeline
//! 1. Decode each chart document (XML or JSON) into a [`Chart`]
//! 2. Re-time the second chart to the first chart's tempo
//! 3. Shift it past the first song and append its notes
//! 4. Export the merged chart to a document tree and encode it
//!
//! ```rust
//! use dymerge::{Chart, Note, Side};
//!
//! let mut intro = Chart::new(120.0);
//! intro.push_note(Note::hold(Side::Front, 0.0, 1.0, 0.0, 2.0));
//! let outro = intro.change_speed(1.5)?;
//!
//! let merged = Chart::concatenate(&intro, &outro, 30.0)?;
//! let xml = dymerge::to_xml(&merged.to_document());
//! assert!(xml.contains("<m_subId>1</m_subId>"));
//! # Ok::<(), dymerge::MergeError>(())
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod json;
pub mod note;
pub mod xml;

pub use api::{decode_chart, encode, load_chart, merge, merge_charts, run_plan};
pub use chart::Chart;
pub use config::{MergePlan, OutputFormat};
pub use document::{Map, Value};
pub use error::MergeError;
pub use export::{region_code, region_enabled, EntryType};
pub use json::{parse_json, to_json};
pub use note::{Note, NoteKind, Side};
pub use xml::{parse_xml, to_xml};
