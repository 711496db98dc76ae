/// Cell marker for an activity a student submitted.
pub const SUBMITTED: &str = "submitted";
/// Cell marker for an activity column with no submission.
pub const NOT_SUBMITTED: &str = "-";
/// Placeholder used when a name part could not be resolved.
pub const MISSING_NAME: &str = "-";

#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub subject: String,
    pub body: String,
    pub author: String,
    pub section: String,
}

#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    /// Parsed roll number, or the configured sentinel when unresolved.
    pub roll_number: u32,
    pub first_name: String,
    pub last_name: String,
    /// Name could not be split into first+last, or is not in Thai script.
    pub is_unidentified: bool,
    pub group_label: String,
    /// None when the post names no activity; such records are quarantined.
    pub activity_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RosterRow {
    pub roll_number: u32,
    pub first_name: String,
    pub last_name: String,
    pub group_label: String,
    pub is_unidentified: bool,
    /// One status per matrix activity column, `SUBMITTED` or `NOT_SUBMITTED`.
    pub statuses: Vec<&'static str>,
    pub completed_count: usize,
}

/// The wide student x activity submission table.
#[derive(Debug, Clone, Default)]
pub struct RosterMatrix {
    /// Distinct activity ids in column order.
    pub activities: Vec<String>,
    pub rows: Vec<RosterRow>,
}

/// A student whose posts could not be attributed to a numbered activity,
/// with how many such posts they made.
#[derive(Debug, Clone)]
pub struct UnidentifiedEntry {
    pub roll_number: u32,
    pub first_name: String,
    pub last_name: String,
    pub group_label: String,
    pub is_unidentified: bool,
    pub submission_count: usize,
}
