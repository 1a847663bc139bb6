use std::sync::Mutex;

use chrono::TimeZone;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::model::color::Rgb8;
use crate::model::params::ShapeMode;
use crate::model::presets::CANVAS_SIZES;

struct StubLoader;

impl ImageLoader for StubLoader {
    fn load(&self, source: &ImageRef) -> GridtileResult<PreparedImage> {
        match source {
            ImageRef::Asset(rel) if rel.starts_with("presets/") => {
                PreparedImage::from_rgba8(2, 2, vec![0, 0, 255, 255].repeat(4))
            }
            other => Err(GridtileError::image_load(format!("no image {other}"))),
        }
    }
}

#[derive(Clone, Default)]
struct EventLog(Arc<Mutex<Vec<String>>>);

impl StudioObserver for EventLog {
    fn recording_started(&mut self, canvas: Canvas) {
        self.0
            .lock()
            .unwrap()
            .push(format!("started {}x{}", canvas.width, canvas.height));
    }

    fn recording_stopped(&mut self, frames: u64) {
        self.0.lock().unwrap().push(format!("stopped {frames}"));
    }
}

const SMALL: Canvas = Canvas {
    width: 20,
    height: 10,
};

fn studio(seed: u64) -> Studio {
    let mut s = Studio::new(Arc::new(StubLoader), Some(seed)).unwrap();
    s.set_viewport(SMALL).unwrap();
    s.wait_for_background(Duration::from_secs(5));
    s
}

#[test]
fn starts_with_the_first_preset_and_its_background() {
    let mut s = Studio::new(Arc::new(StubLoader), Some(1)).unwrap();
    let p = s.params();
    assert_eq!(p.active_preset(), Some(0));
    assert!(!p.cycles_palette());
    assert_eq!(p.shape_mode(), ShapeMode::Circle);
    assert_eq!(p.padding_percent(), 9.0);
    assert_eq!(p.empty_probability(), 0.32);
    assert_eq!(p.palette().colors(), &[Rgb8::new(0x63, 0xc8, 0xff)]);
    assert!(s.render_requested());

    assert!(s.wait_for_background(Duration::from_secs(5)));
    assert_eq!(s.background_image().unwrap().width, 2);
}

#[test]
fn renders_only_when_requested() {
    let mut s = studio(1);
    assert!(s.render_requested());
    assert!(matches!(s.tick().unwrap(), TickOutcome::Rendered(_)));
    assert_eq!(s.tick().unwrap(), TickOutcome::Idle);
    let f = s.frame().unwrap();
    assert_eq!((f.width, f.height), (20, 10));

    s.regenerate();
    assert!(matches!(s.tick().unwrap(), TickOutcome::Rendered(_)));
}

#[test]
fn failed_edit_leaves_params_untouched() {
    let mut s = studio(1);
    s.tick().unwrap();
    let before = s.params().clone();
    let err = s
        .edit(|p| {
            p.set_columns(40.0)?;
            p.set_rows(f64::NAN)
        })
        .unwrap_err();
    assert!(matches!(err, GridtileError::Validation(_)));
    assert_eq!(s.params(), &before);
    assert!(!s.render_requested());

    s.edit(|p| p.set_columns(40.0)).unwrap();
    assert_eq!(s.params().grid_columns(), 40);
    assert!(s.render_requested());
}

#[test]
fn preset_with_background_loads_it() {
    let mut s = studio(1);
    let preset = s.apply_preset(0).unwrap();
    assert_eq!(preset.name, "The worm");
    assert_eq!(s.params().shape_mode(), ShapeMode::Circle);
    assert!(s.wait_for_background(Duration::from_secs(5)));
    assert_eq!(s.background_image().unwrap().width, 2);

    s.apply_preset(3).unwrap();
    assert!(s.background_image().is_none());
    assert!(s.apply_preset(9).is_err());
}

#[test]
fn canvas_size_selection_is_validated() {
    let mut s = studio(1);
    assert_eq!(s.select_canvas_size(3).unwrap().name, "4:5");
    assert_eq!(s.params().canvas_size_index(), 3);
    assert!(s.select_canvas_size(4).is_err());
    assert_eq!(s.params().canvas_size_index(), 3);
}

#[test]
fn file_names_use_slug_and_dashed_stamp() {
    let now = Utc
        .with_ymd_and_hms(2026, 10, 18, 12, 0, 0)
        .unwrap()
        .checked_add_signed(chrono::Duration::milliseconds(42))
        .unwrap();
    assert_eq!(
        output_file_name(&CANVAS_SIZES[0], now, "png"),
        "composition-hd-landscape-2026-10-18T12-00-00-042Z.png"
    );
    assert_eq!(
        output_file_name(&CANVAS_SIZES[3], now, "mp4"),
        "composition-4-5-2026-10-18T12-00-00-042Z.mp4"
    );
}

#[test]
fn export_renders_at_selected_size() {
    let mut s = studio(1);
    s.set_background_image(None);
    s.select_canvas_size(2).unwrap();
    s.edit(|p| {
        p.set_background_color(Rgb8::new(1, 2, 3));
        p.set_empty_probability(1.0)
    })
    .unwrap();
    let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let still = s.export_still_at(now).unwrap();
    assert_eq!(
        still.file_name,
        "composition-square-2026-01-02T03-04-05-000Z.png"
    );
    assert_eq!((still.width, still.height), (1080, 1080));

    let img = image::load_from_memory(&still.png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (1080, 1080));
    assert_eq!(img.get_pixel(500, 500).0, [1, 2, 3, 255]);
}

#[test]
fn recording_runs_to_completion_and_restores() {
    let events = EventLog::default();
    let mut s = studio(5).with_observer(Box::new(events.clone()));
    s.edit(|p| {
        p.set_columns(3.0)?;
        p.set_shape_mode(ShapeMode::Square);
        Ok(())
    })
    .unwrap();
    s.tick().unwrap();
    let before = s.params().clone();

    let sink = Arc::new(Mutex::new(InMemorySink::new()));
    assert!(s.start_recording_at(SMALL, Box::new(Arc::clone(&sink))).unwrap());
    assert!(s.edit(|p| p.set_rows(2.0)).is_err());
    assert!(s.apply_preset(1).is_err());
    assert!(!s.start_recording_at(SMALL, Box::new(InMemorySink::new())).unwrap());

    let mut recorded = 0;
    loop {
        match s.tick().unwrap() {
            TickOutcome::Recorded { finished, .. } => {
                recorded += 1;
                if finished {
                    break;
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(recorded, 300);
    assert!(!s.is_recording());
    assert_eq!(s.params(), &before);
    assert_eq!(s.recording_progress(), 0.0);
    assert_eq!(sink.lock().unwrap().frames().len(), 300);
    assert!(sink.lock().unwrap().is_ended());
    assert_eq!(
        s.frame().unwrap(),
        &sink.lock().unwrap().frames()[299].1
    );

    // Restored params are drawn on the next tick.
    assert!(matches!(s.tick().unwrap(), TickOutcome::Rendered(_)));
    assert_eq!(
        *events.0.lock().unwrap(),
        vec!["started 20x10".to_owned(), "stopped 300".to_owned()]
    );
}

#[test]
fn external_stop_notifies_and_restores() {
    let events = EventLog::default();
    let mut s = studio(5).with_observer(Box::new(events.clone()));
    let before = s.params().clone();
    s.start_recording_at(SMALL, Box::new(InMemorySink::new()))
        .unwrap();
    for _ in 0..10 {
        s.tick().unwrap();
    }
    assert!(s.recording_progress() > 0.0);
    assert!(s.stop_recording().unwrap());
    assert!(!s.stop_recording().unwrap());
    assert_eq!(s.params(), &before);
    assert_eq!(
        *events.0.lock().unwrap(),
        vec!["started 20x10".to_owned(), "stopped 10".to_owned()]
    );
}

#[test]
fn same_seed_same_frames() {
    let mut a = studio(77);
    let mut b = studio(77);
    a.tick().unwrap();
    b.tick().unwrap();
    assert_eq!(a.frame(), b.frame());
}
