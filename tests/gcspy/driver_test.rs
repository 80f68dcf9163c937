/*!
 * Driver Accounting Tests
 * Tile attribution, totals, growth and the pass state machine
 */

use super::common::{params, small_driver};
use heapspy::gcspy::{DriverState, Frame, SpaceDriver, TileStatistics, TreadmillDriver};
use pretty_assertions::assert_eq;

fn tile(driver: &TreadmillDriver, index: usize) -> TileStatistics {
    *driver.accumulator().tile(index).expect("tile in array")
}

#[test]
fn test_object_spanning_two_tiles() {
    let mut driver = small_driver();
    driver.reset();
    driver.record_object(10, 200);

    assert_eq!(tile(&driver, 0), TileStatistics { objects: 1, used_bytes: 118 });
    assert_eq!(tile(&driver, 1), TileStatistics { objects: 0, used_bytes: 82 });
    assert_eq!(driver.accumulator().total_used_bytes(), 200);
    assert_eq!(driver.accumulator().total_objects(), 1);
}

#[test]
fn test_two_objects_in_one_tile() {
    let mut driver = small_driver();
    driver.reset();
    driver.record_object(5, 50);
    driver.record_object(60, 40);

    assert_eq!(tile(&driver, 0), TileStatistics { objects: 2, used_bytes: 90 });
    assert_eq!(driver.accumulator().total_used_bytes(), 90);
    assert_eq!(driver.accumulator().total_objects(), 2);
    assert_eq!(driver.diagnostics().accounting.clamped_tiles, 0);
}

#[test]
fn test_boundary_aligned_object_fills_whole_tiles() {
    let mut driver = small_driver();
    driver.reset();
    // 3 full tiles plus 20 bytes, starting on tile 1
    driver.record_object(128, 3 * 128 + 20);

    assert_eq!(tile(&driver, 0).used_bytes, 0);
    for i in 1..=3 {
        assert_eq!(tile(&driver, i).used_bytes, 128);
    }
    assert_eq!(tile(&driver, 4).used_bytes, 20);
    assert_eq!(tile(&driver, 5).used_bytes, 0);
    assert_eq!(tile(&driver, 1).objects, 1);
    assert_eq!(tile(&driver, 2).objects, 0);
}

#[test]
fn test_reset_zeroes_everything() {
    let mut driver = small_driver();
    driver.reset();
    driver.record_object(0, 300);
    driver.record_object(500, 10);
    driver.reset();

    assert!(driver.accumulator().tiles().iter().all(TileStatistics::is_zero));
    assert_eq!(driver.accumulator().total_objects(), 0);
    assert_eq!(driver.accumulator().total_used_bytes(), 0);
    assert_eq!(driver.state(), DriverState::Idle);
}

#[test]
fn test_overflowing_tile_is_clamped_and_counted() {
    let mut driver = small_driver();
    driver.reset();
    driver.record_object(0, 100);
    driver.record_object(50, 60);

    // 100 + 60 exceeds the 128 byte maximum of tile 0
    assert_eq!(tile(&driver, 0).used_bytes, 128);
    assert_eq!(driver.accumulator().total_used_bytes(), 160);
    assert_eq!(driver.diagnostics().accounting.clamped_tiles, 1);
}

#[test]
fn test_object_past_tile_array_keeps_totals() {
    let mut driver = small_driver();
    driver.reset();
    driver.record_object(2048, 64);

    assert!(driver.accumulator().tiles().iter().all(TileStatistics::is_zero));
    assert_eq!(driver.accumulator().total_objects(), 1);
    assert_eq!(driver.accumulator().total_used_bytes(), 64);
    assert_eq!(driver.accumulator().highest_observed(), Some(2048));
    assert_eq!(driver.diagnostics().accounting.out_of_range_tiles, 1);
}

#[test]
fn test_object_running_off_the_end() {
    let mut driver = small_driver();
    driver.reset();
    // Starts in the last tile and runs 3 tiles past it
    driver.record_object(7 * 128, 4 * 128);

    assert_eq!(tile(&driver, 7).used_bytes, 128);
    assert_eq!(driver.accumulator().total_used_bytes(), 512);
    assert_eq!(driver.diagnostics().accounting.out_of_range_tiles, 3);
}

#[test]
fn test_detached_finish_leaves_driver_untouched() {
    let mut driver = small_driver();
    driver.reset();
    driver.record_object(10, 200);
    driver.record_object(600, 30);

    let before = format!("{:?}", driver);
    let mut frames: Vec<Frame> = Vec::new();
    let outcome = driver.finish(&false, 1, &mut frames);

    assert_eq!(outcome, heapspy::TransmissionOutcome::Skipped);
    assert!(frames.is_empty());
    assert_eq!(format!("{:?}", driver), before);
    assert_eq!(driver.state(), DriverState::Accumulating);
}

#[test]
fn test_growth_covers_highest_object() {
    let mut driver = small_driver();
    let mut frames: Vec<Frame> = Vec::new();

    driver.reset();
    driver.record_object(0, 10);
    driver.finish(&true, 1, &mut frames);
    assert_eq!(driver.subspace().tile_count(), 1);
    assert_eq!(driver.subspace().end(), 128);

    driver.reset();
    driver.record_object(0, 50);
    driver.record_object(300, 10);
    let tile0 = tile(&driver, 0);
    driver.finish(&true, 1, &mut frames);

    assert_eq!(driver.subspace().tile_count(), 3);
    assert_eq!(driver.subspace().end(), 384);
    assert_eq!(driver.server_space().tile_count(), 3);
    assert_eq!(driver.server_space().tile_name(2), Some("0x100-0x180"));
    // Accumulated tiles are not disturbed by growth
    assert_eq!(tile(&driver, 0), tile0);
    assert_eq!(tile(&driver, 2).used_bytes, 10);
    assert_eq!(driver.diagnostics().resizes, 2);
}

#[test]
fn test_bounds_never_shrink() {
    let mut driver = small_driver();
    let mut frames: Vec<Frame> = Vec::new();

    driver.reset();
    driver.record_object(600, 10);
    driver.finish(&true, 1, &mut frames);
    assert_eq!(driver.subspace().tile_count(), 5);

    driver.reset();
    driver.record_object(0, 10);
    driver.finish(&true, 1, &mut frames);
    assert_eq!(driver.subspace().tile_count(), 5);
    assert_eq!(driver.diagnostics().resizes, 1);
}

#[test]
fn test_growth_capped_at_tile_array() {
    let mut driver = small_driver();
    let mut frames: Vec<Frame> = Vec::new();

    driver.reset();
    driver.record_object(4096, 10);
    assert!(driver.finish(&true, 1, &mut frames).is_sent());
    assert_eq!(driver.subspace().tile_count(), 8);
}

#[test]
fn test_empty_pass_sends_no_tiles() {
    let mut driver = small_driver();
    let mut frames: Vec<Frame> = Vec::new();

    driver.reset();
    assert!(driver.finish(&true, 1, &mut frames).is_sent());
    assert_eq!(driver.subspace().tile_count(), 0);
    assert_eq!(frames.last(), Some(&Frame::End { space_size: 0 }));
}

#[test]
fn test_pass_state_machine() {
    let mut driver = small_driver();
    let mut frames: Vec<Frame> = Vec::new();

    driver.reset();
    assert_eq!(driver.state(), DriverState::Idle);
    driver.record_object(10, 10);
    assert_eq!(driver.state(), DriverState::Accumulating);
    driver.finish(&true, 1, &mut frames);
    assert_eq!(driver.state(), DriverState::ReadyToSend);
    driver.reset();
    assert_eq!(driver.state(), DriverState::Idle);
    assert_eq!(driver.diagnostics().passes, 2);
}

#[test]
fn test_objects_stream_bound_from_threshold() {
    // 128 / 64 allows two objects per tile
    let mut driver = TreadmillDriver::new(params(128, 1024, 64), 0).unwrap();
    let mut frames: Vec<Frame> = Vec::new();

    driver.reset();
    for addr in [0, 10, 20] {
        driver.record_object(addr, 1);
    }
    driver.finish(&true, 1, &mut frames);

    let objects = frames.iter().find_map(|f| match f {
        Frame::Stream { stream_id: 1, values } => Some(values.clone()),
        _ => None,
    });
    assert_eq!(objects, Some(vec![2]));
    assert_eq!(driver.diagnostics().emit_clamps, 1);
    assert_eq!(tile(&driver, 0).objects, 3);
}

#[test]
fn test_merge_partial_accumulators() {
    let mut driver = small_driver();
    driver.reset();

    let subspace = driver.subspace().clone();
    let mut left = driver.accumulator().partial();
    let mut right = driver.accumulator().partial();
    left.record(&subspace, 5, 50);
    right.record(&subspace, 60, 40);
    right.record(&subspace, 700, 8);

    driver.merge(&left);
    driver.merge(&right);

    assert_eq!(tile(&driver, 0), TileStatistics { objects: 2, used_bytes: 90 });
    assert_eq!(tile(&driver, 5).used_bytes, 8);
    assert_eq!(driver.accumulator().total_objects(), 3);
    assert_eq!(driver.accumulator().highest_observed(), Some(700));
    assert_eq!(driver.state(), DriverState::Accumulating);
}
