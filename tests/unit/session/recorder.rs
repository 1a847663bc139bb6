use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::compose::random::SeededRandom;
use crate::model::params::ShapeMode;

#[derive(Debug, Default)]
struct Log {
    began: Option<CaptureConfig>,
    frames: Vec<(u64, u32, u32)>,
    ended: u32,
}

#[derive(Default)]
struct ScriptedSink {
    log: Arc<Mutex<Log>>,
    fail_begin: bool,
    fail_push_at: Option<u64>,
    fail_end: bool,
}

impl FrameSink for ScriptedSink {
    fn begin(&mut self, cfg: CaptureConfig) -> GridtileResult<()> {
        if self.fail_begin {
            return Err(GridtileError::validation("encoder unavailable"));
        }
        self.log.lock().unwrap().began = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GridtileResult<()> {
        if self.fail_push_at == Some(idx.0) {
            return Err(GridtileError::capture("disk full"));
        }
        self.log
            .lock()
            .unwrap()
            .frames
            .push((idx.0, frame.width, frame.height));
        Ok(())
    }

    fn end(&mut self) -> GridtileResult<()> {
        self.log.lock().unwrap().ended += 1;
        if self.fail_end {
            return Err(GridtileError::capture("muxer failed"));
        }
        Ok(())
    }
}

const SMALL: Canvas = Canvas {
    width: 16,
    height: 12,
};

fn edited_params() -> ParameterSet {
    let mut p = ParameterSet::default();
    p.set_columns(7.0).unwrap();
    p.set_rows(3.0).unwrap();
    p.set_padding_percent(1.5).unwrap();
    p.set_empty_probability(0.9).unwrap();
    p.set_shape_mode(ShapeMode::Triangle);
    p
}

fn sink() -> (ScriptedSink, Arc<Mutex<Log>>) {
    let s = ScriptedSink::default();
    let log = Arc::clone(&s.log);
    (s, log)
}

#[test]
fn full_recording_pushes_every_frame_and_restores() {
    let mut params = edited_params();
    let before = params.clone();
    let (s, log) = sink();
    let mut rec = Recorder::new();
    let mut rng = SeededRandom::new(1);
    let mut seeds = StdRng::seed_from_u64(2);

    assert!(rec.start_at(SMALL, &params, Box::new(s)).unwrap());
    let mut last = None;
    while rec.is_recording() {
        let f = rec
            .tick(&mut params, None, &mut rng, &mut seeds)
            .unwrap()
            .unwrap();
        if !f.finished {
            assert_eq!(params.shape_mode(), ShapeMode::Any);
        }
        last = Some(f);
    }

    let last = last.unwrap();
    assert_eq!(last.index, FrameIndex(TOTAL_FRAMES - 1));
    assert!(last.finished);
    assert!((last.progress_percent - 299.0 / 3.0).abs() < 1e-9);

    let log = log.lock().unwrap();
    assert_eq!(log.frames.len() as u64, TOTAL_FRAMES);
    assert!(log.frames.iter().enumerate().all(|(i, f)| f.0 == i as u64));
    assert!(log.frames.iter().all(|f| (f.1, f.2) == (16, 12)));
    assert_eq!(log.ended, 1);
    let cfg = log.began.unwrap();
    assert_eq!(cfg.fps.as_f64(), 30.0);
    assert_eq!(cfg.bitrate_kbps, 15_000);

    assert_eq!(params, before);
    assert_eq!(rec.progress_percent(), 0.0);
    assert!(rec.tick(&mut params, None, &mut rng, &mut seeds).unwrap().is_none());
}

#[test]
fn external_stop_restores_mid_recording() {
    let mut params = edited_params();
    let before = params.clone();
    let (s, log) = sink();
    let mut rec = Recorder::new();
    let mut rng = SeededRandom::new(1);
    let mut seeds = StdRng::seed_from_u64(2);

    rec.start_at(SMALL, &params, Box::new(s)).unwrap();
    for _ in 0..45 {
        rec.tick(&mut params, None, &mut rng, &mut seeds).unwrap();
    }
    assert_eq!(rec.frames_recorded(), Some(45));
    assert!((rec.progress_percent() - 44.0 / 3.0).abs() < 1e-9);
    assert_ne!(params, before);

    assert!(rec.stop(&mut params).unwrap());
    assert_eq!(params, before);
    assert!(!rec.is_recording());
    assert_eq!(log.lock().unwrap().ended, 1);

    // Stopping again is a no-op.
    assert!(!rec.stop(&mut params).unwrap());
    assert_eq!(log.lock().unwrap().ended, 1);
}

#[test]
fn failed_start_stays_idle_with_params_untouched() {
    let params = edited_params();
    let before = params.clone();
    let mut rec = Recorder::new();
    let s = ScriptedSink {
        fail_begin: true,
        ..Default::default()
    };
    let err = rec.start_at(SMALL, &params, Box::new(s)).unwrap_err();
    assert!(matches!(err, GridtileError::Capture(_)));
    assert!(!rec.is_recording());
    assert_eq!(params, before);
}

#[test]
fn second_start_is_ignored() {
    let params = edited_params();
    let (first, _) = sink();
    let (second, second_log) = sink();
    let mut rec = Recorder::new();
    assert!(rec.start_at(SMALL, &params, Box::new(first)).unwrap());
    assert!(!rec.start_at(SMALL, &params, Box::new(second)).unwrap());
    assert!(second_log.lock().unwrap().began.is_none());
}

#[test]
fn push_failure_aborts_and_restores() {
    let mut params = edited_params();
    let before = params.clone();
    let s = ScriptedSink {
        fail_push_at: Some(3),
        ..Default::default()
    };
    let log = Arc::clone(&s.log);
    let mut rec = Recorder::new();
    let mut rng = SeededRandom::new(1);
    let mut seeds = StdRng::seed_from_u64(2);
    rec.start_at(SMALL, &params, Box::new(s)).unwrap();
    for _ in 0..3 {
        rec.tick(&mut params, None, &mut rng, &mut seeds).unwrap();
    }
    assert!(rec.tick(&mut params, None, &mut rng, &mut seeds).is_err());
    assert!(!rec.is_recording());
    assert_eq!(params, before);
    assert_eq!(log.lock().unwrap().ended, 1);
}

#[test]
fn end_failure_still_restores() {
    let mut params = edited_params();
    let before = params.clone();
    let s = ScriptedSink {
        fail_end: true,
        ..Default::default()
    };
    let mut rec = Recorder::new();
    let mut rng = SeededRandom::new(1);
    let mut seeds = StdRng::seed_from_u64(2);
    rec.start_at(SMALL, &params, Box::new(s)).unwrap();
    rec.tick(&mut params, None, &mut rng, &mut seeds).unwrap();
    assert!(rec.stop(&mut params).is_err());
    assert_eq!(params, before);
    assert!(!rec.is_recording());
}

#[test]
fn reseeds_every_twenty_ticks() {
    let mut params = edited_params();
    let (s, _) = sink();
    let mut rec = Recorder::new();
    let mut rng = SeededRandom::new(0);
    let mut seeds = StdRng::seed_from_u64(9);
    let mut expected = StdRng::seed_from_u64(9);

    rec.start_at(SMALL, &params, Box::new(s)).unwrap();
    for tick in 0..41u64 {
        rec.tick(&mut params, None, &mut rng, &mut seeds).unwrap();
        if tick % 20 == 0 {
            assert_eq!(rng.seed(), expected.next_u64(), "tick {tick}");
        }
    }
    rec.stop(&mut params).unwrap();
}

#[test]
fn start_uses_selected_canvas_size() {
    let mut params = edited_params();
    params.set_canvas_size(2).unwrap();
    let (s, log) = sink();
    let mut rec = Recorder::new();
    rec.start(&params, Box::new(s)).unwrap();
    assert_eq!(
        rec.canvas(),
        Some(Canvas {
            width: 1080,
            height: 1080
        })
    );
    let cfg = log.lock().unwrap().began.unwrap();
    assert_eq!((cfg.width, cfg.height, cfg.total_frames), (1080, 1080, 300));
    rec.stop(&mut params).unwrap();
}
