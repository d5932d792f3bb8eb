//! Processing step segmentation
//!
//! Answers streamed from agent teams carry progress lines prefixed with
//! emoji or markdown step markers. [`ProcessingSteps`] pulls those lines out
//! and reveals them one tick at a time before the full answer is shown.

mod steps;

pub use steps::{extract_steps, ProcessingSteps, STEP_INTERVAL};
