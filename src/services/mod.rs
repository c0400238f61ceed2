//! Services keeping I/O and progress reporting out of the editing core

pub mod io;
pub mod progress;

pub use io::ImageIOService;
pub use progress::{
    NoOpProgressReporter, ProcessingStage, ProgressReporter, ProgressUpdate,
    TracingProgressReporter,
};
