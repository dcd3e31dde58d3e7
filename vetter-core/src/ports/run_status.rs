// vetter-core/src/ports/run_status.rs

use serde::Serialize;
use std::path::PathBuf;

use crate::domain::ledger::RunStatus;
use crate::error::VetterError;

/// An artifact produced by a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputDescriptor {
    pub kind: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Start/end bookkeeping of check runs.
pub trait RunStatusRecorder: Send + Sync {
    fn mark_started(&self, run_name: &str) -> Result<(), VetterError>;

    fn mark_ended(&self, status: RunStatus, outputs: &[OutputDescriptor]) -> Result<(), VetterError>;
}
