use super::*;

fn cfg() -> CaptureConfig {
    CaptureConfig {
        fps: Fps::new(30, 1).unwrap(),
        total_frames: 300,
        width: 2,
        height: 2,
        quality: 0.95,
        bitrate_kbps: 15_000,
    }
}

fn frame(w: u32, h: u32) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: vec![0; (w * h * 4) as usize],
        premultiplied: true,
    }
}

#[test]
fn duration_is_ten_seconds_for_default_recording() {
    assert!((cfg().duration_secs() - 10.0).abs() < 1e-12);
}

#[test]
fn check_frame_rejects_mismatched_sizes() {
    let c = cfg();
    assert!(c.check_frame(&frame(2, 2)).is_ok());
    assert!(c.check_frame(&frame(4, 2)).is_err());
    let mut short = frame(2, 2);
    short.data.pop();
    assert!(c.check_frame(&short).is_err());
}

#[test]
fn in_memory_sink_collects_frames_in_order() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2)).is_err());

    sink.begin(cfg()).unwrap();
    for i in 0..3 {
        sink.push_frame(FrameIndex(i), &frame(2, 2)).unwrap();
    }
    sink.end().unwrap();

    assert!(sink.is_ended());
    assert_eq!(sink.config(), Some(cfg()));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2]);
}

#[test]
fn begin_resets_previous_capture() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2)).unwrap();
    sink.end().unwrap();
    sink.begin(cfg()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_ended());
}

#[test]
fn shared_handle_forwards_to_inner_sink() {
    let shared = Arc::new(Mutex::new(InMemorySink::new()));
    let mut handle: Box<dyn FrameSink> = Box::new(Arc::clone(&shared));
    handle.begin(cfg()).unwrap();
    handle.push_frame(FrameIndex(7), &frame(2, 2)).unwrap();
    handle.end().unwrap();

    let inner = shared.lock().unwrap();
    assert_eq!(inner.frames().len(), 1);
    assert_eq!(inner.frames()[0].0, FrameIndex(7));
    assert!(inner.is_ended());
}
