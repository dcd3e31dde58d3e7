// vetter-core/src/infrastructure/run_status.rs
//
// Run bookkeeping persisted as `<target>/run_status.json`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::domain::ledger::RunStatus;
use crate::error::VetterError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::{OutputDescriptor, RunStatusRecorder};

pub const RUN_STATUS_FILE: &str = "run_status.json";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Finished(RunStatus),
}

#[derive(Debug, Clone, Serialize)]
pub struct RunStatusDocument {
    pub run_name: String,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub outputs: Vec<OutputDescriptor>,
}

pub struct JsonRunStatusRecorder {
    path: PathBuf,
    current: Mutex<Option<RunStatusDocument>>,
}

impl JsonRunStatusRecorder {
    pub fn new(target_dir: &Path) -> Self {
        Self {
            path: target_dir.join(RUN_STATUS_FILE),
            current: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, document: &RunStatusDocument) -> Result<(), VetterError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(document)
            .map_err(crate::infrastructure::error::InfrastructureError::from)?;
        atomic_write(&self.path, json)?;
        debug!(path = ?self.path, "Run status saved");
        Ok(())
    }
}

impl RunStatusRecorder for JsonRunStatusRecorder {
    fn mark_started(&self, run_name: &str) -> Result<(), VetterError> {
        let document = RunStatusDocument {
            run_name: run_name.to_string(),
            state: RunState::Running,
            started_at: Utc::now(),
            ended_at: None,
            outputs: Vec::new(),
        };
        self.save(&document)?;

        let mut current = self
            .current
            .lock()
            .map_err(|_| VetterError::InternalError("run status lock poisoned".into()))?;
        *current = Some(document);
        Ok(())
    }

    fn mark_ended(&self, status: RunStatus, outputs: &[OutputDescriptor]) -> Result<(), VetterError> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| VetterError::InternalError("run status lock poisoned".into()))?;
        let mut document = current.take().ok_or_else(|| {
            VetterError::InternalError("run ended before it was started".into())
        })?;

        document.state = RunState::Finished(status);
        document.ended_at = Some(Utc::now());
        document.outputs = outputs.to_vec();
        self.save(&document)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_start_then_end_writes_final_status() -> Result<()> {
        let dir = tempdir()?;
        let recorder = JsonRunStatusRecorder::new(&dir.path().join("target"));

        recorder.mark_started("survey")?;
        let running: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(recorder.path())?)?;
        assert_eq!(running["state"], "running");
        assert!(running["ended_at"].is_null());

        let outputs = vec![OutputDescriptor {
            kind: "report".into(),
            path: dir.path().join("target/survey_violations.csv"),
            rows: 2,
        }];
        recorder.mark_ended(RunStatus::CompletedWithViolations, &outputs)?;

        let done: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(recorder.path())?)?;
        assert_eq!(done["run_name"], "survey");
        assert_eq!(done["state"]["finished"], "completed_with_violations");
        assert_eq!(done["outputs"][0]["rows"], 2);
        assert!(done["ended_at"].is_string());
        Ok(())
    }

    #[test]
    fn test_end_without_start_is_an_error() {
        let dir = tempdir().unwrap();
        let recorder = JsonRunStatusRecorder::new(dir.path());
        assert!(recorder.mark_ended(RunStatus::Completed, &[]).is_err());
    }
}
