//! # Public API
//!
//! Entry points that tie decoding, the chart algebra and encoding together.
//!
//! ## Functions
//!
//! - [`decode_chart()`] - XML or JSON chart text to a [`Chart`]
//! - [`load_chart()`] - the same, from a file
//! - [`encode()`] - document tree to XML or JSON text
//! - [`merge_charts()`] - concatenate two charts into a document tree
//! - [`merge()`] - chart text in, merged chart XML out
//! - [`run_plan()`] - execute a [`MergePlan`]
//!
//! ## Typical Usage
//!
//! ```rust
//! use dymerge::merge;
//!
//! let first = r#"<CMap><m_barPerMin>120</m_barPerMin><m_notes><m_notes>
//!   <CMapNoteAsset><m_id>0</m_id><m_type>0</m_type><m_time>0</m_time>
//!     <m_position>0</m_position><m_width>1</m_width><m_subId>-1</m_subId></CMapNoteAsset>
//! </m_notes></m_notes></CMap>"#;
//! let second = r#"{"m_barPerMin": 120, "m_notes": {"m_notes": [
//!   {"m_id": 0, "m_type": 0, "m_time": 0, "m_position": 0, "m_width": 1, "m_subId": -1}
//! ]}}"#;
//!
//! // the second chart starts after a 2 second song: 4 bars at 120 bars/min
//! let xml = merge(first, second, 2.0)?;
//! assert!(xml.contains("<m_time>4</m_time>"));
//! # Ok::<(), dymerge::MergeError>(())
//! ```

use crate::chart::Chart;
use crate::config::{MergePlan, OutputFormat};
use crate::document::Value;
use crate::error::MergeError;
use crate::json::{parse_json, to_json};
use crate::xml::{parse_xml, to_xml};
use std::fs;
use std::path::Path;
use tracing::info;

/// Decode chart text. Text starting with `<` is read as XML, anything else as
/// JSON.
pub fn decode_chart(source: &str) -> Result<Chart, MergeError> {
    let source = source.trim_start_matches('\u{feff}').trim_start();
    let document = if source.starts_with('<') {
        parse_xml(source)?
    } else {
        parse_json(source)?
    };
    Chart::from_document(&document)
}

/// Read and decode a chart file
pub fn load_chart(path: &Path) -> Result<Chart, MergeError> {
    let source = fs::read_to_string(path).map_err(|e| MergeError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let chart = decode_chart(&source)?;
    info!(
        path = %path.display(),
        notes = chart.notes.len(),
        tempo = chart.tempo,
        "loaded chart"
    );
    Ok(chart)
}

pub fn encode(document: &Value, format: OutputFormat) -> Result<String, MergeError> {
    match format {
        OutputFormat::Xml => Ok(to_xml(document)),
        OutputFormat::Json => to_json(document),
    }
}

/// Append `latter` after a first song of `song_length_sec` seconds and export
/// the result. Neither input is modified.
///
/// # Errors
/// Any precondition failure of [`Chart::concat`].
pub fn merge_charts(
    former: &Chart,
    latter: &Chart,
    song_length_sec: f64,
) -> Result<Value, MergeError> {
    let merged = Chart::concatenate(former, latter, song_length_sec)?;
    info!(
        notes = merged.notes.len(),
        total_time = merged.total_time,
        "merged charts"
    );
    Ok(merged.to_document())
}

/// Merge two chart texts (XML or JSON) into chart XML.
pub fn merge(
    former_src: &str,
    latter_src: &str,
    song_length_sec: f64,
) -> Result<String, MergeError> {
    let former = decode_chart(former_src)?;
    let latter = decode_chart(latter_src)?;
    Ok(to_xml(&merge_charts(&former, &latter, song_length_sec)?))
}

/// Execute a merge plan and return the encoded merged chart.
///
/// The plan's `output` is not written here; that is left to the caller.
pub fn run_plan(plan: &MergePlan) -> Result<String, MergeError> {
    let former = load_chart(&plan.former)?;
    let latter = load_chart(&plan.latter)?;
    let mut merged = Chart::concatenate(&former, &latter, plan.song_length)?;
    if plan.sort {
        merged.sort_notes();
    }
    info!(notes = merged.notes.len(), format = ?plan.format, "merged charts");
    encode(&merged.to_document(), plan.format)
}
