use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Caller-supplied pipeline parameters. Every field has a default matching
/// the classroom the export tool was built for, so a config file only needs
/// to name what it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Posts whose author contains this token are the instructor's own and
    /// are dropped before extraction.
    pub instructor_exclusion_token: String,
    /// Honorific prefixes stripped from names, tried in order. Longer forms
    /// must precede their shorter stems ("นางสาว" before "นาง").
    pub honorific_prefixes: Vec<String>,
    /// Roll number assigned when none can be parsed; sorts after real rolls.
    pub unresolved_roll_sentinel: u32,
    /// When true, records with an unidentified name are routed to the review
    /// table instead of appearing at the bottom of the matrix.
    pub quarantine_unidentified_names: bool,
    /// Header labels to look up in the uploaded file.
    pub columns: ColumnLabels,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnLabels {
    pub subject: String,
    pub body: String,
    pub author: String,
    pub section: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            instructor_exclusion_token: "ตระกูล บุญชิต".to_string(),
            honorific_prefixes: [
                "เด็กชาย", "เด็กหญิง", "นางสาว", "นาย", "นาง", "ด.ช.", "ด.ญ.", "น.ส.",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            unresolved_roll_sentinel: 999,
            quarantine_unidentified_names: false,
            columns: ColumnLabels::default(),
        }
    }
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            subject: "subject".to_string(),
            body: "body".to_string(),
            author: "author".to_string(),
            section: "section".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_fields() {
        let config = PipelineConfig::default();
        assert_eq!(config.unresolved_roll_sentinel, 999);
        assert!(!config.quarantine_unidentified_names);
        assert!(config.honorific_prefixes.contains(&"นางสาว".to_string()));
        assert_eq!(config.columns.subject, "subject");
    }

    #[test]
    fn partial_config_fills_missing_fields() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"unresolved_roll_sentinel": 99}"#).unwrap();
        assert_eq!(config.unresolved_roll_sentinel, 99);
        assert_eq!(config.instructor_exclusion_token, "ตระกูล บุญชิต");
    }

    #[test]
    fn longer_prefixes_precede_their_stems() {
        let prefixes = PipelineConfig::default().honorific_prefixes;
        let full = prefixes.iter().position(|p| p == "นางสาว").unwrap();
        let stem = prefixes.iter().position(|p| p == "นาง").unwrap();
        assert!(full < stem);
    }
}
