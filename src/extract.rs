use std::sync::LazyLock;

use regex::Regex;

use crate::config::PipelineConfig;
use crate::models::{NormalizedRecord, RawRecord, MISSING_NAME};

static ROLL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"เลขที่\s*(\d+)").expect("valid roll number regex"));
static ACTIVITY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"กิจกรรมที่\s*(\d+(?:\.\d+)?)").expect("valid activity regex"));
static GROUP_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"กลุ่มที่\s*(\d+)").expect("valid group number regex"));

/// Turns one raw wall post into a `NormalizedRecord`.
///
/// The roll-number, activity and group patterns are fixed; the full-name
/// pattern is compiled from the configured honorific prefixes, tried in the
/// order given.
pub struct Extractor<'a> {
    config: &'a PipelineConfig,
    exclusion_token: String,
    name_pattern: Regex,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        let honorifics: Vec<String> = config
            .honorific_prefixes
            .iter()
            .map(|p| regex::escape(p))
            .collect();
        let pattern = format!(r"(?:{})\s*[^\s\d]+\s+[^\s\d]+", honorifics.join("|"));
        Self {
            config,
            exclusion_token: config.instructor_exclusion_token.to_lowercase(),
            name_pattern: Regex::new(&pattern).expect("valid full name regex"),
        }
    }

    /// Extraction never fails: every miss degrades to a sentinel. The only
    /// way a record is dropped is the instructor filter.
    pub fn extract(&self, record: &RawRecord) -> Option<NormalizedRecord> {
        if !self.exclusion_token.is_empty()
            && record.author.to_lowercase().contains(&self.exclusion_token)
        {
            return None;
        }

        let text = format!("{} {}", record.subject, record.body);

        // First match wins when a post mentions several roll numbers.
        let roll_number = ROLL_NUMBER
            .captures(&text)
            .or_else(|| ROLL_NUMBER.captures(&record.author))
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(self.config.unresolved_roll_sentinel);

        let (first_name, last_name, is_unidentified) = match self.name_pattern.find(&text) {
            Some(m) => self.normalize_name(m.as_str()),
            None => self.normalize_name(strip_parenthetical(&record.author)),
        };

        let activity_id = ACTIVITY_ID.captures(&text).map(|caps| caps[1].to_string());

        Some(NormalizedRecord {
            roll_number,
            first_name,
            last_name,
            is_unidentified,
            group_label: group_label(&record.section),
            activity_id,
        })
    }

    /// Strips the first matching honorific and splits into first/last.
    /// The unidentified flag marks names without a last part or without any
    /// Thai-script character.
    pub fn normalize_name(&self, raw: &str) -> (String, String, bool) {
        let mut rest = raw.trim();
        for prefix in &self.config.honorific_prefixes {
            if let Some(stripped) = rest.strip_prefix(prefix.as_str()) {
                rest = stripped.trim_start();
                break;
            }
        }

        let (first_name, last_name) = match rest.split_once(char::is_whitespace) {
            Some((first, last)) => (first.to_string(), last.trim_start().to_string()),
            None if rest.is_empty() => (MISSING_NAME.to_string(), MISSING_NAME.to_string()),
            None => (rest.to_string(), MISSING_NAME.to_string()),
        };
        let is_unidentified = last_name == MISSING_NAME || !contains_thai(rest);
        (first_name, last_name, is_unidentified)
    }
}

/// Combines the group number and the free-text group name from a section
/// label. Punctuation in source data is inconsistent, so both halves are
/// optional and the raw text is the last resort.
pub fn group_label(section: &str) -> String {
    let number = GROUP_NUMBER
        .captures(section)
        .map(|caps| format!("กลุ่มที่ {}", &caps[1]));
    let name = section
        .split_once(')')
        .map(|(_, tail)| tail.trim())
        .filter(|tail| !tail.is_empty());

    match (number, name) {
        (Some(number), Some(name)) => format!("{number} {name}"),
        (Some(number), None) => number,
        (None, Some(name)) => name.to_string(),
        (None, None) => section.trim().to_string(),
    }
}

/// Author labels carry trailing metadata in parentheses; only the part
/// before the first "(" is the name.
fn strip_parenthetical(author: &str) -> &str {
    match author.split_once('(') {
        Some((head, _)) => head.trim(),
        None => author.trim(),
    }
}

fn contains_thai(text: &str) -> bool {
    text.chars().any(|c| ('\u{0E00}'..='\u{0E7F}').contains(&c))
}
