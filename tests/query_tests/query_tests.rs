//! Tests for range and point queries
//!
//! These tests verify:
//! - The reference scenario answers
//! - Range queries equal a brute-force filter over the score file
//! - Point queries equal a brute-force search over the id file
//! - Input validation and missing/stale file errors

use std::fs;
use std::path::PathBuf;

use scoredb::error::{Producer, ScoreDbError};
use scoredb::index::build_index;
use scoredb::query::{key_bounds, query_point, query_range, validate_range};
use scoredb::record::{Record, RECORD_SIZE};
use scoredb::sort::write_sorted_files;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

struct Store {
    _temp: TempDir,
    primary: PathBuf,
    score: PathBuf,
    index: PathBuf,
    meta: PathBuf,
    records: Vec<Record>,
}

fn store(records: Vec<Record>) -> Store {
    let temp = TempDir::new().unwrap();
    let primary = temp.path().join("records.by_id.dat");
    let score = temp.path().join("records.by_score.dat");
    let index = temp.path().join("records.by_score.idx");
    let meta = temp.path().join("records.by_score.idx.meta");

    write_sorted_files(records.clone(), &primary, &score).unwrap();
    build_index(&score, &index, Some(&meta)).unwrap();

    Store {
        _temp: temp,
        primary,
        score,
        index,
        meta,
        records,
    }
}

fn scenario_records() -> Vec<Record> {
    vec![
        Record::new(1, 90.0, 80.0, 70.0, 85.0),
        Record::new(2, 90.0, 60.0, 70.0, 75.0),
        Record::new(3, 95.5, 88.0, 90.0, 92.0),
    ]
}

/// Scores with fractional parts, clustered so many buckets hold several records
fn generated_records(count: i32) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let id = (i * 7919) % 10_007;
            let score = ((i * 131) % 1_000) as f32 / 8.0;
            Record::new(id, score, i as f32, 0.5, -1.0)
        })
        .collect()
}

fn brute_force_range(records: &[Record], min: f32, max: f32) -> Vec<i32> {
    let mut matches: Vec<Record> = records
        .iter()
        .copied()
        .filter(|r| r.score_a >= min && r.score_a <= max)
        .collect();
    matches.sort_by(|a, b| b.score_a.total_cmp(&a.score_a).then(a.id.cmp(&b.id)));
    matches.iter().map(|r| r.id).collect()
}

fn range_ids(s: &Store, min: f32, max: f32) -> Vec<i32> {
    query_range(&s.index, &s.score, Some(&s.meta), min, max)
        .unwrap()
        .records
        .iter()
        .map(|r| r.id)
        .collect()
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_scenario_full_range() {
    let s = store(scenario_records());

    let result = query_range(&s.index, &s.score, Some(&s.meta), 90.0, 95.5).unwrap();

    assert_eq!(result.count(), 3);
    assert_eq!(result.records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 1, 2]);
    assert!((result.average() - 91.833_333).abs() < 1e-4);
}

#[test]
fn test_scenario_upper_range() {
    let s = store(scenario_records());

    let result = query_range(&s.index, &s.score, Some(&s.meta), 91.0, 100.0).unwrap();

    assert_eq!(result.count(), 1);
    assert_eq!(result.records[0].id, 3);
    assert_eq!(result.average(), 95.5);
}

#[test]
fn test_scenario_point_queries() {
    let s = store(scenario_records());

    let found = query_point(&s.primary, 2).unwrap();
    assert!(found.found());
    assert_eq!(found.record.unwrap().score_a, 90.0);

    let missing = query_point(&s.primary, 99).unwrap();
    assert!(!missing.found());
    assert!(missing.record.is_none());
}

#[test]
fn test_empty_range_result() {
    let s = store(scenario_records());

    let result = query_range(&s.index, &s.score, Some(&s.meta), 91.0, 94.0).unwrap();

    assert_eq!(result.count(), 0);
    assert_eq!(result.average(), 0.0);
    assert_eq!(result.window, None);
    assert_eq!(result.scanned, 0);
}

#[test]
fn test_fractional_bounds_filter_exactly() {
    let s = store(vec![
        Record::new(1, 89.4, 0.0, 0.0, 0.0),
        Record::new(2, 89.6, 0.0, 0.0, 0.0),
        Record::new(3, 90.0, 0.0, 0.0, 0.0),
        Record::new(4, 90.5, 0.0, 0.0, 0.0),
        Record::new(5, 90.6, 0.0, 0.0, 0.0),
    ]);

    // Window covers buckets 89..=91; the filter trims both ends
    assert_eq!(range_ids(&s, 89.5, 90.5), vec![4, 3, 2]);
}

// =============================================================================
// Brute-Force Equivalence Tests
// =============================================================================

#[test]
fn test_range_matches_brute_force() {
    let records = generated_records(3_000);
    let s = store(records.clone());

    let bounds = [
        (0.0, 125.0),
        (10.0, 10.0),
        (10.1, 10.2),
        (33.3, 47.9),
        (62.5, 62.5),
        (-5.0, 0.5),
        (120.0, 500.0),
        (200.0, 300.0),
        (-10.0, -1.0),
        (0.125, 0.125),
    ];
    for (min, max) in bounds {
        assert_eq!(
            range_ids(&s, min, max),
            brute_force_range(&records, min, max),
            "range [{}, {}]",
            min,
            max
        );
    }
}

#[test]
fn test_range_scans_only_the_window() {
    let records = generated_records(3_000);
    let s = store(records);

    let result = query_range(&s.index, &s.score, Some(&s.meta), 60.0, 61.0).unwrap();
    let total = fs::metadata(&s.score).unwrap().len() / RECORD_SIZE as u64;

    assert!(result.count() > 0);
    assert!(result.scanned < total / 4, "scanned {} of {}", result.scanned, total);
}

#[test]
fn test_point_matches_brute_force() {
    let records = generated_records(1_000);
    let s = store(records.clone());

    for probe in [0, 7919, 3, 10_006, -1, 5_000, records[500].id, records[999].id] {
        let expected = records.iter().find(|r| r.id == probe).copied();
        let actual = query_point(&s.primary, probe).unwrap().record;
        assert_eq!(actual, expected, "id {}", probe);
    }
}

#[test]
fn test_point_query_stops_early() {
    let s = store((0..100).map(|id| Record::new(id * 2, 1.0, 0.0, 0.0, 0.0)).collect());

    // 11 lies between 10 and 12: scan stops at 12
    let result = query_point(&s.primary, 11).unwrap();
    assert!(!result.found());
    assert_eq!(result.scanned, 7);
}

// =============================================================================
// Validation and Error Tests
// =============================================================================

#[test]
fn test_key_bounds() {
    assert_eq!(key_bounds(89.5, 92.0), (89, 92));
    assert_eq!(key_bounds(89.5, 92.1), (89, 93));
    assert_eq!(key_bounds(90.0, 90.0), (90, 90));
}

#[test]
fn test_inverted_range_is_usage_error() {
    assert!(matches!(validate_range(5.0, 1.0), Err(ScoreDbError::Usage(_))));
    assert!(matches!(validate_range(f32::NAN, 1.0), Err(ScoreDbError::Usage(_))));
    assert!(validate_range(1.0, 1.0).is_ok());

    // Rejected before any file is touched
    let temp = TempDir::new().unwrap();
    let result = query_range(
        &temp.path().join("absent.idx"),
        &temp.path().join("absent.dat"),
        None,
        5.0,
        1.0,
    );
    assert!(matches!(result, Err(ScoreDbError::Usage(_))));
}

#[test]
fn test_missing_index_is_reported() {
    let s = store(scenario_records());
    fs::remove_file(&s.index).unwrap();

    let result = query_range(&s.index, &s.score, Some(&s.meta), 0.0, 100.0);
    assert!(matches!(
        result,
        Err(ScoreDbError::MissingFile {
            producer: Producer::IndexBuilder,
            ..
        })
    ));
}

#[test]
fn test_missing_primary_file_is_reported() {
    let s = store(scenario_records());
    fs::remove_file(&s.primary).unwrap();

    let result = query_point(&s.primary, 1);
    assert!(matches!(
        result,
        Err(ScoreDbError::MissingFile {
            producer: Producer::Sorter,
            ..
        })
    ));
}

#[test]
fn test_stale_index_is_detected() {
    let s = store(scenario_records());

    let mut records = s.records.clone();
    records.push(Record::new(4, 99.0, 0.0, 0.0, 0.0));
    write_sorted_files(records, &s.primary, &s.score).unwrap();

    let result = query_range(&s.index, &s.score, Some(&s.meta), 0.0, 100.0);
    assert!(matches!(result, Err(ScoreDbError::StaleIndex(_))));

    // Without the sidecar check the query runs against the old offsets
    assert!(query_range(&s.index, &s.score, None, 0.0, 100.0).is_ok());
}

#[test]
fn test_same_length_rewrite_is_stale() {
    let s = store(scenario_records());

    let records: Vec<Record> = s
        .records
        .iter()
        .map(|r| Record::new(r.id, 100.0 - r.score_a, r.score_b, r.score_c, r.score_d))
        .collect();
    write_sorted_files(records, &s.primary, &s.score).unwrap();
    assert_eq!(
        fs::metadata(&s.score).unwrap().len(),
        (s.records.len() * RECORD_SIZE) as u64
    );

    let result = query_range(&s.index, &s.score, Some(&s.meta), 0.0, 100.0);
    assert!(matches!(result, Err(ScoreDbError::StaleIndex(_))));
}

#[test]
fn test_truncated_score_file_is_corrupt() {
    let s = store(scenario_records());
    let mut data = fs::read(&s.score).unwrap();
    data.truncate(50);
    fs::write(&s.score, data).unwrap();

    let result = query_range(&s.index, &s.score, None, 0.0, 100.0);
    assert!(matches!(result, Err(ScoreDbError::CorruptData { offset: 40, .. })));
}
