//! Tracing-backed [`lattice_core::ProgressSink`]: turns kernel progress
//! updates into structured log events instead of the WebSocket broadcast
//! the reference server uses — this binary has no persistent client to
//! push to, so the natural sink for a CLI is the log stream.

use lattice_core::{ProcessType, ProgressSink};

#[derive(Debug, Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn update(&self, process: ProcessType, percent: u8, message: &str, error: Option<&str>) {
        if let Some(err) = error {
            tracing::error!(process = process.as_str(), percent, message, error = err);
        } else {
            tracing::info!(process = process.as_str(), percent, message);
        }
    }
}
