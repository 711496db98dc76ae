use std::io::Read;
use std::path::Path;

use anyhow::Context;
use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::config::ColumnLabels;
use crate::models::RawRecord;

/// Reads an uploaded export file into raw records. The format is picked by
/// extension: `.xlsx`/`.xlsm` via calamine, `.tsv` as tab-delimited text,
/// anything else as comma-delimited text.
pub fn read_records(path: &Path, columns: &ColumnLabels) -> anyhow::Result<Vec<RawRecord>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "xlsx" | "xlsm" => read_spreadsheet(path, columns),
        "tsv" => read_delimited(path, columns, b'\t'),
        _ => read_delimited(path, columns, b','),
    }
}

fn read_delimited(path: &Path, columns: &ColumnLabels, delimiter: u8) -> anyhow::Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    parse_delimited(file, columns, delimiter)
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_delimited<R: Read>(
    input: R,
    columns: &ColumnLabels,
    delimiter: u8,
) -> anyhow::Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .context("failed to read the header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let fields = FieldIndexes::resolve(&headers, columns);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("failed to read a data row")?;
        let cells: Vec<&str> = row.iter().collect();
        records.push(fields.raw_record(&cells));
    }
    Ok(records)
}

fn read_spreadsheet(path: &Path, columns: &ColumnLabels) -> anyhow::Result<Vec<RawRecord>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .with_context(|| format!("{} contains no worksheets", path.display()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("failed to read worksheet {sheet}"))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(|c| cell_text(c).trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };
    let fields = FieldIndexes::resolve(&headers, columns);

    Ok(rows
        .map(|row| {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            let refs: Vec<&str> = cells.iter().map(String::as_str).collect();
            fields.raw_record(&refs)
        })
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Whole numbers come back as floats; "7.0" would break roll parsing.
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// Typed column lookup. A header label that is absent from the file maps
/// every row's field to an empty string rather than an error.
struct FieldIndexes {
    subject: Option<usize>,
    body: Option<usize>,
    author: Option<usize>,
    section: Option<usize>,
}

impl FieldIndexes {
    fn resolve(headers: &[String], columns: &ColumnLabels) -> Self {
        let find = |label: &str| headers.iter().position(|h| h == label.trim());
        Self {
            subject: find(&columns.subject),
            body: find(&columns.body),
            author: find(&columns.author),
            section: find(&columns.section),
        }
    }

    fn field(&self, cells: &[&str], index: Option<usize>) -> String {
        index
            .and_then(|i| cells.get(i))
            .map(|c| c.trim().to_string())
            .unwrap_or_default()
    }

    fn raw_record(&self, cells: &[&str]) -> RawRecord {
        RawRecord {
            subject: self.field(cells, self.subject),
            body: self.field(cells, self.body),
            author: self.field(cells, self.author),
            section: self.field(cells, self.section),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_trimmed_headers() {
        let columns = ColumnLabels::default();
        let csv = " subject ,body,author,section\nเลขที่ 1,กิจกรรมที่ 2,สมชาย ใจดี,กลุ่มที่ 1\n";
        let records = parse_delimited(csv.as_bytes(), &columns, b',').unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject, "เลขที่ 1");
        assert_eq!(records[0].section, "กลุ่มที่ 1");
    }

    #[test]
    fn missing_column_defaults_to_empty() {
        let columns = ColumnLabels::default();
        let csv = "subject,author\nเลขที่ 1,สมชาย ใจดี\n";
        let records = parse_delimited(csv.as_bytes(), &columns, b',').unwrap();

        assert_eq!(records[0].body, "");
        assert_eq!(records[0].section, "");
        assert_eq!(records[0].author, "สมชาย ใจดี");
    }

    #[test]
    fn short_rows_default_missing_cells_to_empty() {
        let columns = ColumnLabels::default();
        let csv = "subject,body,author,section\nเลขที่ 1\n";
        let records = parse_delimited(csv.as_bytes(), &columns, b',').unwrap();

        assert_eq!(records[0].subject, "เลขที่ 1");
        assert_eq!(records[0].author, "");
    }

    #[test]
    fn localized_headers_resolve_via_config() {
        let columns = ColumnLabels {
            subject: "เรื่อง".to_string(),
            body: "เนื้อหา".to_string(),
            author: "ผู้เขียน".to_string(),
            section: "หมวด".to_string(),
        };
        let csv = "เรื่อง,เนื้อหา,ผู้เขียน,หมวด\nส่งงาน,กิจกรรมที่ 1,สมชาย ใจดี,กลุ่มที่ 2\n";
        let records = parse_delimited(csv.as_bytes(), &columns, b',').unwrap();

        assert_eq!(records[0].body, "กิจกรรมที่ 1");
        assert_eq!(records[0].section, "กลุ่มที่ 2");
    }

    #[test]
    fn tab_delimited_input_parses() {
        let columns = ColumnLabels::default();
        let tsv = "subject\tbody\tauthor\tsection\nเลขที่ 3\tกิจกรรมที่ 1\tสมศรี งามยิ่ง\t\n";
        let records = parse_delimited(tsv.as_bytes(), &columns, b'\t').unwrap();

        assert_eq!(records[0].subject, "เลขที่ 3");
        assert_eq!(records[0].author, "สมศรี งามยิ่ง");
    }

    #[test]
    fn whole_number_cells_render_without_decimal_point() {
        assert_eq!(cell_text(&Data::Float(7.0)), "7");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
