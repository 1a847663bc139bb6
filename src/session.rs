//! The interactive host: parameter ownership, live rendering, export and recording.

pub mod animate;
pub mod config;
pub mod recorder;
pub mod studio;

pub use animate::AnimatedParams;
pub use config::StudioConfig;
pub use recorder::{RecordedFrame, Recorder};
pub use studio::{
    ExportedStill, LogObserver, Studio, StudioObserver, TickOutcome, output_file_name,
};
