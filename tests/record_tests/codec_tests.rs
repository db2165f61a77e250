//! Tests for the record codec and record files
//!
//! These tests verify:
//! - The exact big-endian byte layout
//! - Bit-exact round trips, including signed zero and NaN payloads
//! - Reader behavior at boundaries, at offsets, and on truncated files

use std::fs;
use std::io::Write;

use scoredb::error::{Producer, ScoreDbError};
use scoredb::record::{truncate_score, write_records, Record, RecordReader, RECORD_SIZE};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_records() -> Vec<Record> {
    vec![
        Record::new(1, 90.0, 80.0, 70.0, 85.0),
        Record::new(2, 90.0, 60.0, 70.0, 75.0),
        Record::new(3, 95.5, 88.0, 90.0, 92.0),
    ]
}

// =============================================================================
// Codec Tests
// =============================================================================

#[test]
fn test_record_size_is_twenty_bytes() {
    assert_eq!(RECORD_SIZE, 20);
    assert_eq!(Record::new(0, 0.0, 0.0, 0.0, 0.0).to_bytes().len(), 20);
}

#[test]
fn test_encode_layout_is_big_endian() {
    let record = Record::new(1, 90.0, 80.0, 70.0, 85.0);
    let bytes = record.to_bytes();

    assert_eq!(&bytes[0..4], &[0, 0, 0, 1]);
    assert_eq!(&bytes[4..8], &90.0f32.to_be_bytes());
    assert_eq!(&bytes[8..12], &80.0f32.to_be_bytes());
    assert_eq!(&bytes[12..16], &70.0f32.to_be_bytes());
    assert_eq!(&bytes[16..20], &85.0f32.to_be_bytes());
}

#[test]
fn test_negative_id_is_twos_complement() {
    let bytes = Record::new(-2, 0.0, 0.0, 0.0, 0.0).to_bytes();
    assert_eq!(&bytes[0..4], &[0xFF, 0xFF, 0xFF, 0xFE]);
}

#[test]
fn test_round_trip_is_bit_exact_for_special_values() {
    let nan = f32::from_bits(0x7FC0_1234);
    let record = Record::new(i32::MIN, -0.0, nan, f32::INFINITY, f32::MIN_POSITIVE / 2.0);

    let decoded = Record::decode(&record.to_bytes());

    assert!(decoded.bit_eq(&record));
    assert_eq!(decoded.score_a.to_bits(), (-0.0f32).to_bits());
    assert_eq!(decoded.score_b.to_bits(), 0x7FC0_1234);
}

#[test]
fn test_from_slice_requires_exact_length() {
    let bytes = Record::new(7, 1.0, 2.0, 3.0, 4.0).to_bytes();

    assert!(Record::from_slice(&bytes).is_some());
    assert!(Record::from_slice(&bytes[..19]).is_none());
    assert!(Record::from_slice(&[0u8; 21]).is_none());
}

#[test]
fn test_decode_accepts_any_twenty_bytes() {
    let record = Record::decode(&[0xFF; 20]);

    assert_eq!(record.id, -1);
    assert!(record.score_a.is_nan());
    assert_eq!(record.score_d.to_bits(), u32::MAX);
}

#[test]
fn test_truncate_score_rounds_toward_zero() {
    assert_eq!(truncate_score(95.5), 95);
    assert_eq!(truncate_score(89.999), 89);
    assert_eq!(truncate_score(0.4), 0);
    assert_eq!(truncate_score(-0.4), 0);
    assert_eq!(truncate_score(-3.9), -3);
}

#[test]
fn test_display_uses_one_decimal() {
    let record = Record::new(3, 95.5, 88.0, 90.0, 92.0);
    assert_eq!(
        record.to_string(),
        "id: 3, score_a: 95.5, score_b: 88.0, score_c: 90.0, score_d: 92.0"
    );
}

// =============================================================================
// Record File Tests
// =============================================================================

#[test]
fn test_write_then_read_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.dat");

    let written = write_records(&path, &sample_records()).unwrap();
    assert_eq!(written, 3);
    assert_eq!(fs::metadata(&path).unwrap().len(), 60);

    let read: Vec<(u64, Record)> = RecordReader::open(&path, Producer::Sorter)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(read.len(), 3);
    for (i, ((offset, record), expected)) in read.iter().zip(sample_records()).enumerate() {
        assert_eq!(*offset, (i * RECORD_SIZE) as u64);
        assert!(record.bit_eq(&expected));
    }
}

#[test]
fn test_empty_file_yields_no_records() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.dat");

    write_records(&path, &[]).unwrap();

    let mut reader = RecordReader::open(&path, Producer::Sorter).unwrap();
    assert!(reader.is_empty());
    assert!(reader.next_record().unwrap().is_none());
}

#[test]
fn test_open_at_offset() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.dat");
    write_records(&path, &sample_records()).unwrap();

    let mut reader = RecordReader::open_at(&path, 20, Producer::Sorter).unwrap();
    assert_eq!(reader.next_record().unwrap().unwrap().id, 2);
    assert_eq!(reader.offset(), 40);

    // End of file is a valid (empty) position
    let mut reader = RecordReader::open_at(&path, 60, Producer::Sorter).unwrap();
    assert!(reader.next_record().unwrap().is_none());
}

#[test]
fn test_open_at_misaligned_offset_is_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.dat");
    write_records(&path, &sample_records()).unwrap();

    let result = RecordReader::open_at(&path, 7, Producer::Sorter);
    assert!(matches!(result, Err(ScoreDbError::CorruptData { offset: 7, .. })));

    let result = RecordReader::open_at(&path, 80, Producer::Sorter);
    assert!(matches!(result, Err(ScoreDbError::CorruptData { offset: 80, .. })));
}

#[test]
fn test_missing_file_names_producer() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.dat");

    match RecordReader::open(&path, Producer::Sorter) {
        Err(ScoreDbError::MissingFile { path: p, producer }) => {
            assert_eq!(p, path);
            assert_eq!(producer, Producer::Sorter);
        }
        other => panic!("expected MissingFile, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_trailing_partial_record_is_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.dat");
    write_records(&path, &sample_records()).unwrap();

    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[1, 2, 3, 4, 5]).unwrap();
    drop(file);

    let mut reader = RecordReader::open(&path, Producer::Sorter).unwrap();
    for _ in 0..3 {
        assert!(reader.next_record().unwrap().is_some());
    }
    let err = reader.next_record().unwrap_err();
    assert!(matches!(err, ScoreDbError::CorruptData { offset: 60, .. }));
}

#[test]
fn test_iterator_stops_after_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("short.dat");
    fs::write(&path, [0u8; 30]).unwrap();

    let items: Vec<_> = RecordReader::open(&path, Producer::Sorter).unwrap().collect();

    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(items[1].is_err());
}
