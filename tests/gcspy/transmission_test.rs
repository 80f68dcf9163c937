/*!
 * Transmission Tests
 * Frame order, stream contents and transport failure handling
 */

use super::common::{small_driver, FailingTransport};
use heapspy::gcspy::{
    control, ChannelTransport, Frame, FrameReader, FramedWriter, JsonLinesWriter, SpaceDriver,
};
use heapspy::{SpyError, TransmissionOutcome, TransportError};
use pretty_assertions::assert_eq;

#[test]
fn test_frame_sequence() {
    let mut driver = small_driver();
    let mut frames: Vec<Frame> = Vec::new();

    driver.reset();
    driver.record_object(10, 200);
    driver.record_object(140, 20);
    let outcome = driver.finish(&true, 1, &mut frames);

    assert_eq!(outcome, TransmissionOutcome::Sent { frames: 8 });
    assert_eq!(frames.len(), 8);
    assert_eq!(
        frames[0],
        Frame::Start {
            space_id: 0,
            event: 1,
            tile_count: 2
        }
    );
    assert!(matches!(frames[1], Frame::Metadata(_)));
    assert_eq!(
        frames[2..],
        [
            Frame::Stream {
                stream_id: 0,
                values: vec![118, 102]
            },
            Frame::Summary {
                stream_id: 0,
                values: vec![220, 256]
            },
            Frame::Stream {
                stream_id: 1,
                values: vec![1, 1]
            },
            Frame::Summary {
                stream_id: 1,
                values: vec![2]
            },
            Frame::Control {
                first_index: 0,
                flags: vec![control::USED; 2]
            },
            Frame::End { space_size: 256 },
        ]
    );
}

#[test]
fn test_metadata_describes_space() {
    let mut driver = small_driver();
    let mut frames: Vec<Frame> = Vec::new();

    driver.reset();
    driver.record_object(130, 10);
    driver.finish(&true, 1, &mut frames);

    let Frame::Metadata(metadata) = &frames[1] else {
        panic!("expected metadata, got {:?}", frames[1]);
    };
    assert_eq!(metadata.driver_name.as_str(), "Treadmill Space");
    assert_eq!(metadata.title.as_str(), "Block ");
    assert_eq!(metadata.block_info.as_str(), "Block Size: 128 bytes\n");
    assert_eq!(metadata.unused_label.as_str(), "UNUSED");
    assert_eq!(metadata.tile_count, 2);
    assert_eq!(metadata.tile_names[0].as_str(), "0x0-0x80");
    assert_eq!(metadata.tile_names[1].as_str(), "0x80-0x100");

    let names: Vec<&str> = metadata.streams.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["Used Space stream", "Objects stream"]);
    assert_eq!(metadata.streams[0].max(), 128);
    assert_eq!(metadata.streams[0].prefix(), "Space used: ");
    assert_eq!(metadata.streams[1].max(), 8);
    assert_eq!(metadata.streams[1].suffix(), " objects");
}

#[test]
fn test_summary_is_not_clamped() {
    let mut driver = small_driver();
    let mut frames: Vec<Frame> = Vec::new();

    driver.reset();
    driver.record_object(0, 100);
    driver.record_object(20, 100);
    driver.finish(&true, 1, &mut frames);

    assert_eq!(
        frames[2],
        Frame::Stream {
            stream_id: 0,
            values: vec![128]
        }
    );
    assert_eq!(
        frames[3],
        Frame::Summary {
            stream_id: 0,
            values: vec![200, 128]
        }
    );
}

#[test]
fn test_failing_transport_aborts_without_touching_counters() {
    let mut driver = small_driver();
    driver.reset();
    driver.record_object(10, 200);
    let tiles_before = driver.accumulator().clone();

    let mut transport = FailingTransport::after(3);
    let outcome = driver.finish(&true, 1, &mut transport);

    assert_eq!(
        outcome,
        TransmissionOutcome::Aborted {
            frames_sent: 3,
            error: SpyError::Transport(TransportError::Disconnected),
        }
    );
    assert_eq!(transport.frames.len(), 3);
    assert_eq!(driver.accumulator(), &tiles_before);
    assert_eq!(driver.diagnostics().transmissions_aborted, 1);
    assert_eq!(driver.diagnostics().transmissions_sent, 0);

    // The next pass transmits normally
    driver.reset();
    driver.record_object(10, 200);
    let mut frames: Vec<Frame> = Vec::new();
    assert!(driver.finish(&true, 1, &mut frames).is_sent());
    assert_eq!(driver.diagnostics().transmissions_sent, 1);
}

#[test]
fn test_failure_on_start_frame() {
    let mut driver = small_driver();
    driver.reset();
    let mut transport = FailingTransport::after(0);

    let outcome = driver.finish(&true, 1, &mut transport);
    assert!(matches!(
        outcome,
        TransmissionOutcome::Aborted { frames_sent: 0, .. }
    ));
}

#[test]
fn test_framed_writer_stream_decodes() {
    let mut driver = small_driver();
    let mut expected: Vec<Frame> = Vec::new();
    let mut writer = FramedWriter::new(Vec::new());

    driver.reset();
    driver.record_object(10, 200);
    driver.finish(&true, 1, &mut expected);
    driver.finish(&true, 1, &mut writer);

    let bytes = writer.into_inner();
    let decoded: Vec<Frame> = FrameReader::new(bytes.as_slice())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(decoded, expected);
}

#[test]
fn test_metadata_json_uses_plain_strings() {
    let mut driver = small_driver();
    let mut frames: Vec<Frame> = Vec::new();

    driver.reset();
    driver.record_object(130, 10);
    driver.finish(&true, 1, &mut frames);

    let json = serde_json::to_value(&frames[1]).unwrap();
    let metadata = &json["metadata"];
    assert_eq!(metadata["driver_name"], serde_json::json!("Treadmill Space"));
    assert_eq!(metadata["unused_label"], serde_json::json!("UNUSED"));
    assert_eq!(
        metadata["tile_names"],
        serde_json::json!(["0x0-0x80", "0x80-0x100"])
    );
    assert_eq!(metadata["streams"][0]["name"], serde_json::json!("Used Space stream"));
    assert_eq!(metadata["streams"][1]["name"], serde_json::json!("Objects stream"));

    let text = serde_json::to_string(&frames[1]).unwrap();
    assert!(text.contains(r#""tile_names":["0x0-0x80","0x80-0x100"]"#));
    assert!(!text.contains("inner"));
}

#[test]
fn test_json_lines_one_frame_per_line() {
    let mut driver = small_driver();
    let mut writer = JsonLinesWriter::new(Vec::new());

    driver.reset();
    driver.record_object(10, 20);
    driver.finish(&true, 1, &mut writer);

    let text = String::from_utf8(writer.into_inner()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 8);
    assert!(lines[0].starts_with("{\"start\""));
    assert_eq!(lines[7], "{\"end\":{\"space_size\":128}}");
}

#[test]
fn test_channel_transport() {
    let mut driver = small_driver();
    let (mut transport, rx) = ChannelTransport::bounded(16);

    driver.reset();
    driver.record_object(10, 20);
    assert!(driver.finish(&true, 1, &mut transport).is_sent());
    let frames: Vec<Frame> = rx.drain().collect();
    assert_eq!(frames.len(), 8);

    drop(rx);
    let outcome = driver.finish(&true, 1, &mut transport);
    assert_eq!(
        outcome,
        TransmissionOutcome::Aborted {
            frames_sent: 0,
            error: SpyError::Transport(TransportError::Disconnected),
        }
    );
}
