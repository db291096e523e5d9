//! # Merge Plans
//!
//! A merge plan is a small YAML file naming the two charts and the length of
//! the first song, so a merge can be repeated without retyping arguments.
//!
//! ```yaml
//! former: first.xml
//! latter: second.json
//! song-length: 93.5
//! output: merged.xml   # optional, stdout when absent
//! format: xml          # xml | json
//! sort: true           # optional, canonical note order
//! ```
//!
//! Relative paths in a plan loaded from disk resolve against the plan's own
//! directory.

use crate::error::MergeError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Markup used for an output document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MergePlan {
    pub former: PathBuf,
    pub latter: PathBuf,
    /// Duration of the first song in seconds
    pub song_length: f64,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub sort: bool,
}

impl MergePlan {
    /// Parse a plan from YAML text. Paths are kept as written.
    pub fn from_yaml(content: &str) -> Result<Self, MergeError> {
        let plan: MergePlan =
            serde_yaml::from_str(content).map_err(|e| MergeError::Config(e.to_string()))?;
        if !(plan.song_length >= 0.0 && plan.song_length.is_finite()) {
            return Err(MergeError::InvalidSongLength(plan.song_length));
        }
        Ok(plan)
    }

    /// Read a plan file and resolve its paths against the file's directory
    pub fn load(path: &Path) -> Result<Self, MergeError> {
        let content = fs::read_to_string(path).map_err(|e| MergeError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut plan = Self::from_yaml(&content)?;
        if let Some(base) = path.parent() {
            plan.former = base.join(&plan.former);
            plan.latter = base.join(&plan.latter);
            plan.output = plan.output.map(|out| base.join(out));
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_plan() {
        let plan =
            MergePlan::from_yaml("former: a.xml\nlatter: b.json\nsong-length: 93.5\n").unwrap();
        assert_eq!(plan.former, PathBuf::from("a.xml"));
        assert_eq!(plan.latter, PathBuf::from("b.json"));
        assert_eq!(plan.song_length, 93.5);
        assert_eq!(plan.output, None);
        assert_eq!(plan.format, OutputFormat::Xml);
        assert!(!plan.sort);
    }

    #[test]
    fn test_parse_full_plan() {
        let yaml = r#"
former: a.xml
latter: b.xml
song-length: 120
output: out/merged.json
format: json
sort: true
"#;
        let plan = MergePlan::from_yaml(yaml).unwrap();
        assert_eq!(plan.output, Some(PathBuf::from("out/merged.json")));
        assert_eq!(plan.format, OutputFormat::Json);
        assert!(plan.sort);
    }

    #[test]
    fn test_rejects_unknown_keys_and_missing_fields() {
        assert!(matches!(
            MergePlan::from_yaml("former: a\nlatter: b\nsong-length: 1\nspeed: 2\n"),
            Err(MergeError::Config(_))
        ));
        assert!(matches!(
            MergePlan::from_yaml("former: a\nlatter: b\n"),
            Err(MergeError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_negative_song_length() {
        assert_eq!(
            MergePlan::from_yaml("former: a\nlatter: b\nsong-length: -3\n").unwrap_err(),
            MergeError::InvalidSongLength(-3.0)
        );
    }
}
