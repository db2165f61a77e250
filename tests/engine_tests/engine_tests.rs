//! Tests for Engine
//!
//! These tests verify:
//! - Engine lifecycle (open creates the data directory)
//! - The load → build-index → query pipeline
//! - Command execution and error responses
//! - Concurrent readers sharing one engine

use std::fs;
use std::sync::Arc;
use std::thread;

use scoredb::config::Config;
use scoredb::engine::Engine;
use scoredb::error::ScoreDbError;
use scoredb::protocol::{Command, Status};
use scoredb::record::Record;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const SCENARIO_CSV: &str = "\
id,score_a,score_b,score_c,score_d
1,90.0,80,70,85
2,90.0,60,70,75
3,95.5,88,90,92
";

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder().data_dir(temp_dir.path()).build();
    let engine = Engine::open(config).unwrap();
    (temp_dir, engine)
}

fn setup_loaded_engine() -> (TempDir, Engine) {
    let (temp_dir, engine) = setup_temp_engine();
    let csv = temp_dir.path().join("input.csv");
    fs::write(&csv, SCENARIO_CSV).unwrap();
    engine.load_csv(&csv).unwrap();
    engine.build_index().unwrap();
    (temp_dir, engine)
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_engine_open_creates_directories() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("mydb");

    let config = Config::builder().data_dir(&data_dir).build();
    let engine = Engine::open(config).unwrap();

    assert!(data_dir.exists());
    assert_eq!(engine.data_dir(), data_dir.as_path());
    assert_eq!(engine.score_path(), data_dir.join("records.by_score.dat"));
    assert_eq!(engine.index_path(), data_dir.join("records.by_score.idx"));
}

#[test]
fn test_open_path() {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open_path(temp_dir.path()).unwrap();
    assert!(engine.config().verify_on_query);
}

// =============================================================================
// Pipeline Tests
// =============================================================================

#[test]
fn test_load_writes_both_files() {
    let (_temp, engine) = setup_loaded_engine();

    assert_eq!(fs::metadata(engine.primary_path()).unwrap().len(), 60);
    assert_eq!(fs::metadata(engine.score_path()).unwrap().len(), 60);
    assert!(engine.index_path().exists());
    assert!(engine.index_meta_path().exists());
}

#[test]
fn test_load_reports_skipped_rows() {
    let (temp_dir, engine) = setup_temp_engine();
    let csv = temp_dir.path().join("input.csv");
    fs::write(&csv, "id,a,b,c,d\n1,1,1,1,1\nbroken\n2,2,2,2,2\n").unwrap();

    let report = engine.load_csv(&csv).unwrap();

    assert_eq!(report.record_count, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].line, 3);
}

#[test]
fn test_scenario_queries() {
    let (_temp, engine) = setup_loaded_engine();

    let result = engine.query_range(90.0, 95.5).unwrap();
    assert_eq!(result.count(), 3);
    assert!((result.average() - 91.833_333).abs() < 1e-4);

    let result = engine.query_range(91.0, 100.0).unwrap();
    assert_eq!(result.records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3]);

    assert_eq!(engine.query_point(2).unwrap().record.unwrap().score_a, 90.0);
    assert!(!engine.query_point(99).unwrap().found());
}

#[test]
fn test_query_before_build_names_producer() {
    let (_temp, engine) = setup_temp_engine();

    let err = engine.query_point(1).unwrap_err();
    assert!(err.to_string().contains("scoredb-cli load"), "{}", err);

    engine
        .load_records(vec![Record::new(1, 1.0, 1.0, 1.0, 1.0)])
        .unwrap();
    let err = engine.query_range(0.0, 10.0).unwrap_err();
    assert!(err.to_string().contains("scoredb-cli build-index"), "{}", err);
}

#[test]
fn test_reload_without_rebuild_is_stale() {
    let (_temp, engine) = setup_loaded_engine();

    engine
        .load_records(vec![Record::new(10, 50.0, 0.0, 0.0, 0.0)])
        .unwrap();

    assert!(matches!(
        engine.query_range(0.0, 100.0),
        Err(ScoreDbError::StaleIndex(_))
    ));

    engine.build_index().unwrap();
    assert_eq!(engine.query_range(0.0, 100.0).unwrap().count(), 1);
}

#[test]
fn test_same_size_reload_without_rebuild_is_stale() {
    let (_temp, engine) = setup_temp_engine();
    engine
        .load_records(vec![
            Record::new(1, 90.0, 0.0, 0.0, 0.0),
            Record::new(2, 50.0, 0.0, 0.0, 0.0),
            Record::new(3, 10.0, 0.0, 0.0, 0.0),
        ])
        .unwrap();
    engine.build_index().unwrap();

    // Same record count, so the score file keeps its length
    engine
        .load_records(vec![
            Record::new(1, 10.0, 0.0, 0.0, 0.0),
            Record::new(2, 20.0, 0.0, 0.0, 0.0),
            Record::new(3, 95.0, 0.0, 0.0, 0.0),
        ])
        .unwrap();

    assert!(matches!(
        engine.query_range(15.0, 25.0),
        Err(ScoreDbError::StaleIndex(_))
    ));

    engine.build_index().unwrap();
    let result = engine.query_range(15.0, 25.0).unwrap();
    let ids: Vec<i32> = result.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn test_verify_on_query_can_be_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .verify_on_query(false)
        .build();
    let engine = Engine::open(config).unwrap();
    engine
        .load_records(vec![Record::new(1, 10.0, 0.0, 0.0, 0.0)])
        .unwrap();
    engine.build_index().unwrap();
    engine
        .load_records(vec![
            Record::new(1, 10.0, 0.0, 0.0, 0.0),
            Record::new(2, 5.0, 0.0, 0.0, 0.0),
        ])
        .unwrap();

    // The old index still bounds the scan; no staleness error is raised
    assert!(engine.query_range(0.0, 100.0).is_ok());
}

#[test]
fn test_verify_index_after_build() {
    let (_temp, engine) = setup_loaded_engine();

    let report = engine.verify_index().unwrap();

    assert!(report.is_ok(), "{:?}", report.problems);
    assert_eq!(report.entries_checked, 2);
    assert_eq!(report.meta_matches, Some(true));
}

// =============================================================================
// Command Execution Tests
// =============================================================================

#[test]
fn test_execute_point_query() {
    let (_temp, engine) = setup_loaded_engine();

    let response = engine.execute(Command::PointQuery { id: 3 });
    assert_eq!(response.status, Status::Ok);
    assert!(response.lines[0].contains("score_a: 95.5"));

    let response = engine.execute(Command::PointQuery { id: 99 });
    assert_eq!(response.status, Status::NotFound);
}

#[test]
fn test_execute_range_query() {
    let (_temp, engine) = setup_loaded_engine();

    let response = engine.execute(Command::RangeQuery {
        min_score: 90.0,
        max_score: 95.5,
    });

    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.field("count"), Some("3"));
    assert_eq!(response.field("average"), Some("91.83"));
}

#[test]
fn test_execute_errors_become_responses() {
    let (_temp, engine) = setup_temp_engine();

    let response = engine.execute(Command::RangeQuery {
        min_score: 0.0,
        max_score: 1.0,
    });
    assert_eq!(response.status, Status::Error);
    assert!(response.lines[0].contains("Missing file"));
}

#[test]
fn test_execute_ping_and_echo() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(engine.execute(Command::Ping).lines, vec!["PONG".to_string()]);
    assert_eq!(
        engine.execute(Command::Echo("hello".to_string())).lines,
        vec!["Server received: hello".to_string()]
    );
    assert_eq!(engine.execute(Command::Quit).status, Status::Bye);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_queries() {
    let (_temp, engine) = setup_temp_engine();
    let records: Vec<Record> = (0..2_000)
        .map(|id| Record::new(id, (id % 500) as f32 / 5.0, 0.0, 0.0, 0.0))
        .collect();
    engine.load_records(records).unwrap();
    engine.build_index().unwrap();
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..20 {
                    let low = ((t * 20 + i) % 90) as f32;
                    let result = engine.query_range(low, low + 5.0).unwrap();
                    assert!(result
                        .records
                        .iter()
                        .all(|r| r.score_a >= low && r.score_a <= low + 5.0));
                    assert!(engine.query_point(t * 100 + i).unwrap().found());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
