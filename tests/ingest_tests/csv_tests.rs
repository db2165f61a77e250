//! Tests for CSV ingest
//!
//! These tests verify:
//! - Header handling and field parsing
//! - Malformed rows are skipped and reported, never fatal
//! - Missing sources are usage errors

use std::fs;
use std::io::Cursor;

use scoredb::error::ScoreDbError;
use scoredb::ingest::{load_csv, parse_csv, parse_row};
use scoredb::record::Record;
use tempfile::TempDir;

const SCENARIO_CSV: &str = "\
id,score_a,score_b,score_c,score_d
1,90.0,80,70,85
2,90.0,60,70,75
3,95.5,88,90,92
";

#[test]
fn test_parse_scenario() {
    let report = parse_csv(Cursor::new(SCENARIO_CSV)).unwrap();

    assert!(report.skipped.is_empty());
    assert_eq!(
        report.records,
        vec![
            Record::new(1, 90.0, 80.0, 70.0, 85.0),
            Record::new(2, 90.0, 60.0, 70.0, 75.0),
            Record::new(3, 95.5, 88.0, 90.0, 92.0),
        ]
    );
}

#[test]
fn test_header_is_always_discarded() {
    // Even a header that looks like data
    let report = parse_csv(Cursor::new("7,1,2,3,4\n8,5,6,7,8\n")).unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].id, 8);
}

#[test]
fn test_whitespace_and_crlf() {
    let report = parse_csv(Cursor::new("h\r\n 5 , 1.5 ,2, 3 ,4 \r\n\r\n")).unwrap();

    assert_eq!(report.records, vec![Record::new(5, 1.5, 2.0, 3.0, 4.0)]);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_malformed_rows_are_skipped_with_line_numbers() {
    let csv = "\
id,a,b,c,d
1,10,0,0,0
2,abc,0,0,0
3,10,0,0
x,10,0,0,0
4,inf,0,0,0
5,20,0,0,0
";
    let report = parse_csv(Cursor::new(csv)).unwrap();

    assert_eq!(
        report.records.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![1, 5]
    );
    assert_eq!(
        report.skipped.iter().map(|s| s.line).collect::<Vec<_>>(),
        vec![3, 4, 5, 6]
    );
}

#[test]
fn test_parse_row_errors_carry_line() {
    match parse_row("1,2", 42) {
        Err(ScoreDbError::MalformedRow { line, reason }) => {
            assert_eq!(line, 42);
            assert!(reason.contains("at least 5"));
        }
        other => panic!("expected MalformedRow, got {:?}", other),
    }
}

#[test]
fn test_negative_and_extra_fields() {
    let record = parse_row("-3,-0.5,1e2,0,0,comment", 2).unwrap();
    assert_eq!(record, Record::new(-3, -0.5, 100.0, 0.0, 0.0));
}

#[test]
fn test_load_csv_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data.csv");
    fs::write(&path, SCENARIO_CSV).unwrap();

    let report = load_csv(&path).unwrap();
    assert_eq!(report.records.len(), 3);
}

#[test]
fn test_missing_csv_is_usage_error() {
    let temp = TempDir::new().unwrap();
    let result = load_csv(&temp.path().join("absent.csv"));

    assert!(matches!(result, Err(ScoreDbError::Usage(_))));
}

#[test]
fn test_header_only_file() {
    let report = parse_csv(Cursor::new("id,score_a,score_b,score_c,score_d\n")).unwrap();
    assert!(report.records.is_empty());
    assert!(report.skipped.is_empty());
}
