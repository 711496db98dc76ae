use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::config::PipelineConfig;
use crate::models::{
    NormalizedRecord, RosterMatrix, RosterRow, UnidentifiedEntry, NOT_SUBMITTED, SUBMITTED,
};

type StudentKey = (u32, String, String, String);

/// Reconciles one dataset's records into the wide submission matrix plus the
/// review table of posts that name no activity. Pure and idempotent: the same
/// records always produce the same tables.
pub fn reconcile(
    records: &[NormalizedRecord],
    config: &PipelineConfig,
) -> (RosterMatrix, Vec<UnidentifiedEntry>) {
    let mut identified = Vec::new();
    let mut unmatched = Vec::new();

    for record in records {
        let quarantined = record.activity_id.is_none()
            || (config.quarantine_unidentified_names && record.is_unidentified);
        if quarantined {
            unmatched.push(record);
        } else {
            identified.push(record);
        }
    }

    (pivot(&identified), count_unmatched(&unmatched))
}

fn pivot(records: &[&NormalizedRecord]) -> RosterMatrix {
    let mut activities = Vec::new();
    let mut seen = HashSet::new();
    for record in records {
        if let Some(id) = &record.activity_id {
            if seen.insert(id.clone()) {
                activities.push(id.clone());
            }
        }
    }
    activities.sort_by(|a, b| compare_activity_ids(a, b));

    // A student gets one mark per activity no matter how often they posted it.
    let mut credited: HashSet<StudentKey> = HashSet::new();
    let mut marks: HashMap<StudentKey, (bool, HashSet<String>)> = HashMap::new();

    for record in records {
        let Some(activity) = &record.activity_id else {
            continue;
        };
        let credit_key = (
            record.roll_number,
            record.first_name.clone(),
            record.last_name.clone(),
            activity.clone(),
        );
        if !credited.insert(credit_key) {
            continue;
        }
        let row_key = (
            record.roll_number,
            record.first_name.clone(),
            record.last_name.clone(),
            record.group_label.clone(),
        );
        marks
            .entry(row_key)
            .or_insert_with(|| (record.is_unidentified, HashSet::new()))
            .1
            .insert(activity.clone());
    }

    let mut rows: Vec<RosterRow> = marks
        .into_iter()
        .map(|((roll_number, first_name, last_name, group_label), (is_unidentified, done))| {
            let statuses: Vec<&'static str> = activities
                .iter()
                .map(|id| if done.contains(id) { SUBMITTED } else { NOT_SUBMITTED })
                .collect();
            RosterRow {
                roll_number,
                first_name,
                last_name,
                group_label,
                is_unidentified,
                completed_count: done.len(),
                statuses,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        student_order(
            (a.is_unidentified, a.roll_number, &a.first_name, &a.last_name, &a.group_label),
            (b.is_unidentified, b.roll_number, &b.first_name, &b.last_name, &b.group_label),
        )
    });

    RosterMatrix { activities, rows }
}

fn count_unmatched(records: &[&NormalizedRecord]) -> Vec<UnidentifiedEntry> {
    let mut counts: HashMap<StudentKey, (bool, usize)> = HashMap::new();
    for record in records {
        let key = (
            record.roll_number,
            record.first_name.clone(),
            record.last_name.clone(),
            record.group_label.clone(),
        );
        counts.entry(key).or_insert((record.is_unidentified, 0)).1 += 1;
    }

    let mut entries: Vec<UnidentifiedEntry> = counts
        .into_iter()
        .map(|((roll_number, first_name, last_name, group_label), (is_unidentified, count))| {
            UnidentifiedEntry {
                roll_number,
                first_name,
                last_name,
                group_label,
                is_unidentified,
                submission_count: count,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        student_order(
            (a.is_unidentified, a.roll_number, &a.first_name, &a.last_name, &a.group_label),
            (b.is_unidentified, b.roll_number, &b.first_name, &b.last_name, &b.group_label),
        )
    });
    entries
}

/// Identified names first, then roll number (sentinel last), then name.
/// The group label is only a determinism tie-break.
fn student_order(
    a: (bool, u32, &String, &String, &String),
    b: (bool, u32, &String, &String, &String),
) -> Ordering {
    a.cmp(&b)
}

/// Orders "1.2" before "1.10": dotted segments compare numerically, ids that
/// are not dotted numbers go last.
pub fn compare_activity_ids(a: &str, b: &str) -> Ordering {
    match (numeric_segments(a), numeric_segments(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn numeric_segments(id: &str) -> Option<Vec<u64>> {
    id.split('.').map(|part| part.parse().ok()).collect()
}
