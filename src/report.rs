use std::fmt::Write;
use std::io;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;

use crate::models::{RosterMatrix, UnidentifiedEntry, SUBMITTED};

const FIXED_HEADERS: [&str; 4] = ["เลขที่", "ชื่อ", "นามสกุล", "กลุ่ม"];
const TOTAL_HEADER: &str = "รวม";
const COUNT_HEADER: &str = "จำนวนโพสต์";

pub fn build_summary(matrix: &RosterMatrix, unmatched: &[UnidentifiedEntry]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Submission Roster");
    let _ = writeln!(output, "Generated on {}", Utc::now().date_naive());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Activity Totals");

    if matrix.rows.is_empty() {
        let _ = writeln!(output, "No activity-identified submissions in this dataset.");
    } else {
        for (column, id) in matrix.activities.iter().enumerate() {
            let submitted = matrix
                .rows
                .iter()
                .filter(|row| row.statuses[column] == SUBMITTED)
                .count();
            let _ = writeln!(
                output,
                "- กิจกรรมที่ {}: {} of {} students",
                id,
                submitted,
                matrix.rows.len()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students");

    for row in &matrix.rows {
        let flag = if row.is_unidentified { " [check name]" } else { "" };
        let _ = writeln!(
            output,
            "- เลขที่ {} {} {} ({}) completed {}/{}{}",
            row.roll_number,
            row.first_name,
            row.last_name,
            row.group_label,
            row.completed_count,
            matrix.activities.len(),
            flag
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Unmatched Posts");

    if unmatched.is_empty() {
        let _ = writeln!(output, "Every post names an activity.");
    } else {
        for entry in unmatched {
            let _ = writeln!(
                output,
                "- {} {} ({}): {} post(s) without an activity number",
                entry.first_name, entry.last_name, entry.group_label, entry.submission_count
            );
        }
    }

    output
}

pub fn write_matrix_csv(matrix: &RosterMatrix, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_matrix(matrix, file).with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_unidentified_csv(entries: &[UnidentifiedEntry], path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_unidentified(entries, file)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn write_matrix<W: io::Write>(matrix: &RosterMatrix, writer: W) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = FIXED_HEADERS.iter().map(|h| h.to_string()).collect();
    header.extend(matrix.activities.iter().cloned());
    header.push(TOTAL_HEADER.to_string());
    csv_writer.write_record(&header)?;

    for row in &matrix.rows {
        let mut cells = vec![
            row.roll_number.to_string(),
            row.first_name.clone(),
            row.last_name.clone(),
            row.group_label.clone(),
        ];
        cells.extend(row.statuses.iter().map(|s| s.to_string()));
        cells.push(row.completed_count.to_string());
        csv_writer.write_record(&cells)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn write_unidentified<W: io::Write>(entries: &[UnidentifiedEntry], writer: W) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = FIXED_HEADERS.iter().map(|h| h.to_string()).collect();
    header.push(COUNT_HEADER.to_string());
    csv_writer.write_record(&header)?;

    for entry in entries {
        csv_writer.write_record(&[
            entry.roll_number.to_string(),
            entry.first_name.clone(),
            entry.last_name.clone(),
            entry.group_label.clone(),
            entry.submission_count.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RosterRow, NOT_SUBMITTED};

    fn sample_matrix() -> RosterMatrix {
        RosterMatrix {
            activities: vec!["1.1".to_string(), "1.2".to_string()],
            rows: vec![RosterRow {
                roll_number: 7,
                first_name: "สมชาย".to_string(),
                last_name: "ใจดี".to_string(),
                group_label: "กลุ่มที่ 1 ดาวเรือง".to_string(),
                is_unidentified: false,
                statuses: vec![SUBMITTED, NOT_SUBMITTED],
                completed_count: 1,
            }],
        }
    }

    fn sample_unmatched() -> Vec<UnidentifiedEntry> {
        vec![UnidentifiedEntry {
            roll_number: 999,
            first_name: "mixky".to_string(),
            last_name: "gamer".to_string(),
            group_label: "กลุ่มที่ 2".to_string(),
            is_unidentified: true,
            submission_count: 3,
        }]
    }

    #[test]
    fn summary_lists_totals_and_students() {
        let summary = build_summary(&sample_matrix(), &sample_unmatched());
        assert!(summary.contains("- กิจกรรมที่ 1.1: 1 of 1 students"));
        assert!(summary.contains("- เลขที่ 7 สมชาย ใจดี (กลุ่มที่ 1 ดาวเรือง) completed 1/2"));
        assert!(summary.contains("- mixky gamer (กลุ่มที่ 2): 3 post(s)"));
    }

    #[test]
    fn summary_surfaces_the_empty_matrix_condition() {
        let summary = build_summary(&RosterMatrix::default(), &[]);
        assert!(summary.contains("No activity-identified submissions in this dataset."));
        assert!(summary.contains("Every post names an activity."));
    }

    #[test]
    fn matrix_csv_has_fixed_activity_and_total_columns() {
        let mut buffer = Vec::new();
        write_matrix(&sample_matrix(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), "เลขที่,ชื่อ,นามสกุล,กลุ่ม,1.1,1.2,รวม");
        assert_eq!(
            lines.next().unwrap(),
            "7,สมชาย,ใจดี,กลุ่มที่ 1 ดาวเรือง,submitted,-,1"
        );
    }

    #[test]
    fn unidentified_csv_carries_the_post_count() {
        let mut buffer = Vec::new();
        write_unidentified(&sample_unmatched(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), "เลขที่,ชื่อ,นามสกุล,กลุ่ม,จำนวนโพสต์");
        assert_eq!(lines.next().unwrap(), "999,mixky,gamer,กลุ่มที่ 2,3");
    }
}
