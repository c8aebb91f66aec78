//! Update engine integration tests: history bounds, undo/redo, reset and
//! live feeds.

mod common;

use std::time::{Duration, Instant};

use chitra_map::core::{SENTINEL, UNKNOWN};
use chitra_map::engine::{MAX_UNDO_HISTORY, UpdateEngine, UpdateOutcome};
use chitra_map::error::Error;
use chitra_map::grid::GridStore;
use chitra_map::source::{ChannelDevice, DataSource, LiveFeed, RangeDevice};

use common::{GRID_SIZE, record, straight_run, write_log};

fn engine() -> UpdateEngine {
    UpdateEngine::new(GridStore::new(GRID_SIZE), MAX_UNDO_HISTORY)
}

// ============================================================================
// History
// ============================================================================

#[test]
fn test_undo_history_is_bounded() {
    let mut engine = engine();
    for text in straight_run(200) {
        assert!(matches!(engine.update_record(&text), UpdateOutcome::Applied(_)));
    }
    assert_eq!(engine.undo_depth(), MAX_UNDO_HISTORY);

    for _ in 0..MAX_UNDO_HISTORY {
        assert!(engine.undo().is_some());
    }
    assert!(engine.undo().is_none());
    assert_eq!(engine.redo_depth(), MAX_UNDO_HISTORY);
}

#[test]
fn test_undo_redo_round_trip() {
    let mut engine = engine();
    for text in straight_run(12) {
        engine.update_record(&text);
    }
    let before: Vec<f32> = engine.grid().row(47).unwrap().to_vec();
    let stats = engine.grid_stats();

    for _ in 0..5 {
        engine.undo();
    }
    assert_ne!(engine.grid_stats(), stats);

    // update() replays redo before touching the (absent) source
    for _ in 0..5 {
        assert!(matches!(engine.update().unwrap(), UpdateOutcome::Applied(_)));
    }
    assert_eq!(engine.grid().row(47).unwrap(), before.as_slice());
    assert_eq!(engine.grid_stats(), stats);
    assert_eq!(engine.redo_depth(), 0);
}

#[test]
fn test_undo_everything_restores_unknown_grid() {
    let mut engine = engine();
    for text in straight_run(30) {
        engine.update_record(&text);
    }
    while engine.undo().is_some() {}
    assert_eq!(engine.grid_stats().known(), 0);
}

#[test]
fn test_path_cells_survive_later_fills() {
    let mut engine = engine();
    // robot at device (2, 0) leaves a path cell at array (52, 50)
    engine.update_record(&record(2, 0, 0, &[]));
    assert_eq!(engine.cell_value(52, 50).unwrap(), SENTINEL);

    // a later sonar reading marks that cell occupied
    engine.update_record(&record(0, 0, 1, &[(2, 0, 0.95)]));
    assert_eq!(engine.cell_value(52, 50).unwrap(), SENTINEL);

    engine.undo();
    engine.undo();
    assert_eq!(engine.cell_value(52, 50).unwrap(), UNKNOWN);
}

// ============================================================================
// Clear and reset
// ============================================================================

#[test]
fn test_clear_keeps_read_position_reset_rewinds() {
    let dir = tempfile::tempdir().unwrap();
    let records = straight_run(3);
    let path = write_log(&dir, "run.cd", &records);

    let mut engine = engine();
    engine.open_file(&path, None).unwrap();
    assert_eq!(engine.data_source(), DataSource::Recorded);
    assert_eq!(engine.range_device(), RangeDevice::Log);

    let first = engine.update().unwrap();
    engine.update().unwrap();

    engine.clear();
    assert_eq!(engine.grid_stats().known(), 0);
    assert_eq!(engine.undo_depth(), 0);
    // third record follows the cleared ones
    let third = engine.update().unwrap();
    assert_eq!(third.reading().map(|r| r.device_id), Some(2));
    assert_eq!(engine.update().unwrap(), UpdateOutcome::Exhausted);

    engine.reset().unwrap();
    assert_eq!(engine.undo_depth(), 0);
    assert_eq!(engine.update().unwrap(), first);
}

#[test]
fn test_malformed_entries_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![
        record(0, 0, 0, &[(1, 1, 0.3)]),
        "0 0 zero 1 100\n".to_string(),
        record(1, 0, 2, &[]),
    ];
    let path = write_log(&dir, "bad.cd", &records);

    let mut engine = engine();
    engine.open_file(&path, None).unwrap();
    assert!(matches!(engine.update().unwrap(), UpdateOutcome::Applied(_)));
    assert_eq!(engine.update().unwrap(), UpdateOutcome::Skipped);
    assert!(matches!(engine.update().unwrap(), UpdateOutcome::Applied(_)));
    assert_eq!(engine.update().unwrap(), UpdateOutcome::Exhausted);
    assert_eq!(engine.undo_depth(), 2);
}

#[test]
fn test_extreme_coordinates_do_not_touch_grid() {
    let mut engine = engine();

    let far_pose = engine.update_record("2147483647 0 0 1 100\n1 1 0.7");
    assert!(matches!(far_pose, UpdateOutcome::Applied(ref r) if r.boundary.is_none()));
    assert_eq!(engine.grid_stats().known(), 0);

    let outcome = engine.update_record("0 0 0 1 100\n0 -2147483648 0.5;-2147483648 1 0.9");
    let UpdateOutcome::Applied(reading) = outcome else {
        panic!("expected an applied reading, got {:?}", outcome);
    };
    assert!(reading.ordinary_fills().is_empty());
    // only the path cell at the origin
    assert_eq!(engine.grid_stats().known(), 1);
    assert_eq!(engine.cell_value(50, 50).unwrap(), SENTINEL);
    assert_eq!(engine.undo_depth(), 2);
}

#[test]
fn test_sonar_data_requires_mapper() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(&dir, "raw.sd", "1 2 3\n");
    let mut engine = engine();
    assert!(matches!(
        engine.open_file(&path, None),
        Err(Error::SourceUnavailable(_))
    ));
    assert!(matches!(
        engine.open_file(dir.path().join("missing.sd"), None),
        Err(Error::SourceUnavailable(_))
    ));
}

#[test]
fn test_saved_log_replays_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.cd");

    let mut engine = UpdateEngine::new(GridStore::new(GRID_SIZE), 8);
    for text in straight_run(20) {
        engine.update_record(&text);
    }
    engine.save_log(&path).unwrap();

    // only the last 8 readings are kept
    let mut replay = UpdateEngine::new(GridStore::new(GRID_SIZE), 8);
    replay.open_file(&path, None).unwrap();
    let mut poses = Vec::new();
    while let UpdateOutcome::Applied(reading) = replay.update().unwrap() {
        poses.push(reading.pose.x);
    }
    assert_eq!(poses, (12..20).collect::<Vec<i32>>());
    assert_eq!(replay.cell_value(69, 47).unwrap(), 0.9);
    assert_eq!(replay.cell_value(61, 47).unwrap(), UNKNOWN);
}

// ============================================================================
// Live feed
// ============================================================================

fn wait_for(mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(Instant::now() < deadline, "timed out");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_live_feed_applies_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("session.cd");

    let mut engine = engine();
    engine.open_file(&log_path, None).unwrap();
    assert_eq!(engine.data_source(), DataSource::Live);
    assert!(matches!(engine.reset(), Err(Error::UnsupportedOperation(_))));

    let engine = engine.into_shared();
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut feed = LiveFeed::start(engine.clone(), Box::new(ChannelDevice::new(rx))).unwrap();

    let records = straight_run(4);
    for text in &records {
        tx.send(text.clone()).unwrap();
    }
    wait_for(|| engine.lock().undo_depth() == 4);
    drop(tx);
    wait_for(|| !feed.is_running());
    feed.stop();
    feed.stop();

    // the recording replays to the same grid
    let live_stats = engine.lock().grid_stats();
    let mut replay = UpdateEngine::new(GridStore::new(GRID_SIZE), MAX_UNDO_HISTORY);
    replay.open_file(&log_path, None).unwrap();
    assert_eq!(replay.data_source(), DataSource::Recorded);
    while replay.update().unwrap() != UpdateOutcome::Exhausted {}
    assert_eq!(replay.grid_stats(), live_stats);
    assert_eq!(replay.undo_depth(), 4);
}

#[test]
fn test_live_feed_needs_live_source() {
    let engine = engine().into_shared();
    let (_tx, rx) = crossbeam_channel::unbounded();
    assert!(matches!(
        LiveFeed::start(engine, Box::new(ChannelDevice::new(rx))),
        Err(Error::UnsupportedOperation(_))
    ));
}
