use super::*;

fn frame(w: u32, h: u32, fill: u8) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: vec![fill; (w * h * 4) as usize],
        premultiplied: true,
    }
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        fps: Fps(60),
    }
}

#[test]
fn format_parses_and_names_files() {
    assert_eq!("MP4".parse::<VideoFormat>().unwrap(), VideoFormat::Mp4);
    assert_eq!("webm".parse::<VideoFormat>().unwrap(), VideoFormat::Webm);
    assert!(matches!(
        "gif".parse::<VideoFormat>(),
        Err(RsvpError::ExportUnavailable(_))
    ));
    assert_eq!(VideoFormat::Webm.extension(), "webm");
    assert_eq!(VideoFormat::Mp4.mime_type(), "video/mp4");
}

#[test]
fn collecting_sink_counts_and_dedups_frames() {
    let mut sink = CollectingSink::new().keeping_frames();
    sink.begin(&cfg()).unwrap();
    for fill in [0, 0, 0, 9, 9, 0] {
        sink.push_frame(&frame(4, 2, fill)).unwrap();
    }
    assert_eq!(sink.frames_pushed(), 6);
    assert_eq!(sink.frames().len(), 3);

    let bytes = sink.finish().unwrap();
    let summary: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(summary["frames"], 6);
    assert_eq!(summary["fps"], 60);
    assert!(sink.was_finished());
}

#[test]
fn collecting_sink_rejects_frames_before_begin_and_wrong_size() {
    let mut sink = CollectingSink::new();
    assert!(matches!(
        sink.push_frame(&frame(4, 2, 0)),
        Err(RsvpError::SinkFailure(_))
    ));
    sink.begin(&cfg()).unwrap();
    assert!(matches!(
        sink.push_frame(&frame(2, 2, 0)),
        Err(RsvpError::SinkFailure(_))
    ));
}

#[test]
fn abort_discards_capture() {
    let mut sink = CollectingSink::new().live();
    assert!(sink.is_live());
    sink.begin(&cfg()).unwrap();
    sink.abort();
    assert!(sink.was_aborted());
    assert!(sink.finish().is_err());
}
