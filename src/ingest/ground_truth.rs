//! Ground-truth CSV reader.
//!
//! The table must have a header row. The query id column and the relevant-ids
//! column are located by name; any other columns are ignored. Fields may be
//! quoted with `"` (doubled quotes escape, embedded commas and newlines are
//! allowed).

use crate::error::{ParseError, QueryId, RankevalError, RecordLocation, Result};
use std::path::Path;

/// Column names used to locate the two fields the evaluator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruthColumns {
    pub query_id: String,
    pub relevant_ids: String,
}

impl Default for GroundTruthColumns {
    fn default() -> Self {
        Self {
            query_id: "qid".to_string(),
            relevant_ids: "cid".to_string(),
        }
    }
}

/// One ground-truth record: a query id and its still-serialized relevant ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruthRecord {
    /// 1-based line of the file where the record starts (the header is line 1).
    /// Blank lines and newlines inside quoted fields are counted.
    pub line: usize,
    pub query_id: QueryId,
    /// Raw relevant-ids cell, e.g. `[73560 85057]`.
    pub relevant_ids: String,
}

/// Read ground-truth records from a CSV file.
pub fn read_ground_truth(
    path: &Path,
    columns: &GroundTruthColumns,
) -> Result<Vec<GroundTruthRecord>> {
    let content = std::fs::read_to_string(path)?;
    let records = parse_ground_truth(&content, columns)?;
    log::info!(
        "Loaded {} ground-truth records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Parse ground-truth records from CSV text.
///
/// A record too short to hold the query id or relevant-ids column is a parse
/// error; a present but empty relevant-ids cell is an empty list.
pub fn parse_ground_truth(
    content: &str,
    columns: &GroundTruthColumns,
) -> Result<Vec<GroundTruthRecord>> {
    let mut rows = split_csv_records(content)?.into_iter();

    let header = rows
        .next()
        .ok_or_else(|| RankevalError::InvalidInput("ground truth CSV is empty".to_string()))?;
    let qid_idx = column_index(&header.fields, &columns.query_id)?;
    let ids_idx = column_index(&header.fields, &columns.relevant_ids)?;

    let mut records = Vec::new();
    for csv_record in rows {
        let line = csv_record.line;
        let fields = &csv_record.fields;

        let raw_qid = fields.get(qid_idx).ok_or_else(|| ParseError {
            location: RecordLocation::GroundTruthRow { line, query_id: None },
            raw: fields.join(","),
            reason: format!("missing {:?} field", columns.query_id),
        })?;
        let query_id = raw_qid.trim().parse::<QueryId>().map_err(|_| ParseError {
            location: RecordLocation::GroundTruthRow { line, query_id: None },
            raw: raw_qid.clone(),
            reason: format!("invalid query id in column {:?}", columns.query_id),
        })?;
        let relevant_ids = fields.get(ids_idx).cloned().ok_or_else(|| ParseError {
            location: RecordLocation::GroundTruthRow {
                line,
                query_id: Some(query_id),
            },
            raw: fields.join(","),
            reason: format!("missing {:?} field", columns.relevant_ids),
        })?;

        records.push(GroundTruthRecord {
            line,
            query_id,
            relevant_ids,
        });
    }

    Ok(records)
}

fn column_index(header: &[String], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        .ok_or_else(|| {
            RankevalError::InvalidInput(format!(
                "ground truth CSV has no {:?} column (found: {})",
                name,
                header.join(", ")
            ))
        })
}

/// Fields of one CSV record and the line it starts on.
struct CsvRecord {
    line: usize,
    fields: Vec<String>,
}

/// Split CSV text into records of fields. Blank lines are skipped.
fn split_csv_records(content: &str) -> Result<Vec<CsvRecord>> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_start = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, record_start, std::mem::take(&mut fields));
                line += 1;
                record_start = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(RankevalError::InvalidInput(format!(
            "ground truth CSV ends inside a quoted field opened on line {}",
            record_start
        )));
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_record(&mut records, record_start, fields);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<CsvRecord>, line: usize, fields: Vec<String>) {
    // A blank line shows up as a single empty field
    if fields.len() == 1 && fields[0].trim().is_empty() {
        return;
    }
    records.push(CsvRecord { line, fields });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_basic_table() {
        let csv = "qid,cid\n1,[100 200]\n2,[999]\n";
        let records = parse_ground_truth(csv, &GroundTruthColumns::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[1].line, 3);
        assert_eq!(records[0].query_id, 1);
        assert_eq!(records[0].relevant_ids, "[100 200]");
        assert_eq!(records[1].query_id, 2);
    }

    #[test]
    fn test_columns_located_by_name() {
        // pandas-style leading index column and an extra text column
        let csv = ",query,cid,qid\n0,\"what, where\",[5 6],17\n";
        let records = parse_ground_truth(csv, &GroundTruthColumns::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].query_id, 17);
        assert_eq!(records[0].relevant_ids, "[5 6]");
    }

    #[test]
    fn test_quoted_fields_with_escapes_and_newlines() {
        let csv = "qid,text,cid\r\n3,\"say \"\"hi\"\"\nthere\",\"[1 2]\"\r\n";
        let records = parse_ground_truth(csv, &GroundTruthColumns::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].query_id, 3);
        assert_eq!(records[0].relevant_ids, "[1 2]");
    }

    #[test]
    fn test_line_numbers_count_quoted_newlines() {
        let csv = "qid,text,cid\n1,\"two\nlines\",[1]\n2,x,[2]\n";
        let records = parse_ground_truth(csv, &GroundTruthColumns::default()).unwrap();
        assert_eq!(records[0].line, 2);
        assert_eq!(records[1].line, 4);
    }

    #[test]
    fn test_blank_lines_and_missing_trailing_newline() {
        let csv = "qid,cid\n\n1,[1]\n\n2,[2]";
        let records = parse_ground_truth(csv, &GroundTruthColumns::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 3);
        assert_eq!(records[1].line, 5);
        assert_eq!(records[1].relevant_ids, "[2]");
    }

    #[test]
    fn test_header_with_byte_order_mark() {
        let csv = "\u{feff}qid,cid\n1,[1]\n";
        let records = parse_ground_truth(csv, &GroundTruthColumns::default()).unwrap();
        assert_eq!(records[0].query_id, 1);
    }

    #[test]
    fn test_custom_column_names() {
        let csv = "query_id,positives\n9,[1 2 3]\n";
        let columns = GroundTruthColumns {
            query_id: "query_id".to_string(),
            relevant_ids: "positives".to_string(),
        };
        let records = parse_ground_truth(csv, &columns).unwrap();
        assert_eq!(records[0].query_id, 9);
    }

    #[test]
    fn test_missing_column_is_invalid_input() {
        let columns = GroundTruthColumns::default();
        let err = parse_ground_truth("qid,docs\n1,[1]\n", &columns).unwrap_err();
        assert!(matches!(err, RankevalError::InvalidInput(_)));
        assert!(err.to_string().contains("\"cid\""));
    }

    #[test]
    fn test_empty_file_is_invalid_input() {
        let err = parse_ground_truth("", &GroundTruthColumns::default()).unwrap_err();
        assert!(matches!(err, RankevalError::InvalidInput(_)));
    }

    #[test]
    fn test_bad_query_id_reports_line() {
        let csv = "qid,cid\n1,[1]\nabc,[2]\n";
        let err = parse_ground_truth(csv, &GroundTruthColumns::default()).unwrap_err();
        match err {
            RankevalError::Parse(e) => {
                assert_eq!(e.location, RecordLocation::GroundTruthRow { line: 3, query_id: None });
                assert_eq!(e.raw, "abc");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_row_is_parse_error() {
        let csv = "qid,cid\n1,[5]\n2\n";
        let err = parse_ground_truth(csv, &GroundTruthColumns::default()).unwrap_err();
        match err {
            RankevalError::Parse(e) => {
                assert_eq!(
                    e.location,
                    RecordLocation::GroundTruthRow {
                        line: 3,
                        query_id: Some(2)
                    }
                );
                assert_eq!(e.raw, "2");
                assert!(e.reason.contains("missing \"cid\" field"), "{}", e.reason);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_row_missing_query_id_is_parse_error() {
        let columns = GroundTruthColumns::default();
        let err = parse_ground_truth("cid,qid\n[1],1\n[2]\n", &columns).unwrap_err();
        match err {
            RankevalError::Parse(e) => {
                assert_eq!(e.location, RecordLocation::GroundTruthRow { line: 3, query_id: None });
                assert!(e.reason.contains("missing \"qid\" field"), "{}", e.reason);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_relevant_cell_is_kept() {
        let records = parse_ground_truth("qid,cid\n4,\n", &GroundTruthColumns::default()).unwrap();
        assert_eq!(records[0].query_id, 4);
        assert_eq!(records[0].relevant_ids, "");
    }

    #[test]
    fn test_unterminated_quote_rejected() {
        let columns = GroundTruthColumns::default();
        let err = parse_ground_truth("qid,cid\n1,\"[1 2]\n", &columns).unwrap_err();
        assert!(matches!(err, RankevalError::InvalidInput(_)));
    }

    #[test]
    fn test_read_ground_truth_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("val.csv");
        fs::write(&path, "qid,cid\n1,[100 200]\n").unwrap();
        let records = read_ground_truth(&path, &GroundTruthColumns::default()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_read_ground_truth_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope.csv");
        let err = read_ground_truth(&path, &GroundTruthColumns::default()).unwrap_err();
        assert!(matches!(err, RankevalError::Io(_)));
    }
}
