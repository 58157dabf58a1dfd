//! Run state and reporting.
//!
//! A run is the transient aggregate of one verification pass: the stage
//! records, the transcript, and the lifecycle flags. Exactly one run is
//! live at a time; a new `start()` supersedes the previous run entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stage::{StageSpec, StageStatus};
use crate::transcript::{transcript_digest, TranscriptLine};

/// Terminal outcome of a verification run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every stage verified.
    Verified,

    /// The named stage failed; later stages were not attempted.
    Failed { stage: String },

    /// The run was cancelled between steps.
    Cancelled,
}

/// A stage together with its status in the current run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage configuration.
    pub spec: StageSpec,

    /// Status within the current run.
    pub status: StageStatus,
}

/// Observable state of the live (or most recent) verification run.
///
/// Observers receive clones of this; live state stays behind the
/// sequencer's lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Unique run identifier, regenerated on every start.
    pub run_id: Uuid,

    /// Stages in verification order.
    pub stages: Vec<StageRecord>,

    /// Append-only transcript, cleared when a new run starts.
    pub transcript: Vec<TranscriptLine>,

    /// Whether a run is currently in flight.
    pub is_running: bool,

    /// True iff every stage verified.
    pub is_complete: bool,

    /// Terminal outcome; `None` while running or before the first run.
    pub outcome: Option<RunOutcome>,

    /// When the current run started.
    pub started_at: Option<DateTime<Utc>>,

    /// When the current run reached a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunState {
    /// Idle state: all stages pending, empty transcript, nothing running.
    pub fn new(specs: Vec<StageSpec>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            stages: specs
                .into_iter()
                .map(|spec| StageRecord {
                    spec,
                    status: StageStatus::Pending,
                })
                .collect(),
            transcript: Vec::new(),
            is_running: false,
            is_complete: false,
            outcome: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Reset for a fresh run: new id, all stages pending, transcript
    /// cleared, running flag raised.
    pub(crate) fn reset(&mut self) {
        self.run_id = Uuid::new_v4();
        for record in &mut self.stages {
            record.status = StageStatus::Pending;
        }
        self.transcript.clear();
        self.is_running = true;
        self.is_complete = false;
        self.outcome = None;
        self.started_at = Some(Utc::now());
        self.finished_at = None;
    }

    /// Number of stages that verified.
    pub fn verified_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|r| r.status == StageStatus::Verified)
            .count()
    }

    /// Name of the failed stage, if any.
    pub fn failed_stage(&self) -> Option<&str> {
        self.stages
            .iter()
            .find(|r| r.status == StageStatus::Failed)
            .map(|r| r.spec.name.as_str())
    }

    /// Verified stages as a percentage of the chain.
    pub fn progress_percent(&self) -> f64 {
        if self.stages.is_empty() {
            return 0.0;
        }
        self.verified_count() as f64 / self.stages.len() as f64 * 100.0
    }

    /// Build the presentation report for this state.
    pub fn report(&self) -> RunReport {
        let duration_ms = match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => finished
                .signed_duration_since(started)
                .num_milliseconds()
                .max(0) as u64,
            _ => 0,
        };

        RunReport {
            run_id: self.run_id,
            stages: self
                .stages
                .iter()
                .map(|r| StageReportEntry {
                    name: r.spec.name.clone(),
                    label: r.spec.label.clone(),
                    status: r.status,
                })
                .collect(),
            verified_count: self.verified_count(),
            stage_count: self.stages.len(),
            progress_percent: self.progress_percent(),
            outcome: self.outcome.clone(),
            line_count: self.transcript.len(),
            transcript_digest: transcript_digest(&self.transcript),
            duration_ms,
        }
    }
}

/// One stage's row in a [`RunReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReportEntry {
    /// Stage identifier.
    pub name: String,

    /// Display label.
    pub label: String,

    /// Final status.
    pub status: StageStatus,
}

/// Summary of a run for presentation and JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier.
    pub run_id: Uuid,

    /// Per-stage statuses.
    pub stages: Vec<StageReportEntry>,

    /// Number of stages that verified.
    pub verified_count: usize,

    /// Total number of stages in the chain.
    pub stage_count: usize,

    /// Verified stages as a percentage of the chain.
    pub progress_percent: f64,

    /// Terminal outcome; `None` if still running.
    pub outcome: Option<RunOutcome>,

    /// Number of transcript lines appended.
    pub line_count: usize,

    /// SHA-256 digest over the transcript line texts.
    pub transcript_digest: String,

    /// Wall-clock duration in milliseconds (0 while running).
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::LineKind;

    fn idle_state() -> RunState {
        RunState::new(StageSpec::builtin_chain())
    }

    #[test]
    fn test_new_state_is_idle() {
        let state = idle_state();
        assert!(!state.is_running);
        assert!(!state.is_complete);
        assert!(state.outcome.is_none());
        assert!(state.transcript.is_empty());
        assert!(state
            .stages
            .iter()
            .all(|r| r.status == StageStatus::Pending));
    }

    #[test]
    fn test_reset_clears_prior_run() {
        let mut state = idle_state();
        state.stages[0].status = StageStatus::Verified;
        state.stages[1].status = StageStatus::Failed;
        state
            .transcript
            .push(TranscriptLine::new("leftover", LineKind::Info));
        state.outcome = Some(RunOutcome::Failed {
            stage: "bundle".to_string(),
        });
        let old_id = state.run_id;

        state.reset();

        assert_ne!(state.run_id, old_id);
        assert!(state.is_running);
        assert!(!state.is_complete);
        assert!(state.outcome.is_none());
        assert!(state.transcript.is_empty());
        assert!(state
            .stages
            .iter()
            .all(|r| r.status == StageStatus::Pending));
        assert!(state.started_at.is_some());
        assert!(state.finished_at.is_none());
    }

    #[test]
    fn test_progress_counts() {
        let mut state = idle_state();
        state.stages[0].status = StageStatus::Verified;
        state.stages[1].status = StageStatus::Verified;
        state.stages[2].status = StageStatus::Failed;

        assert_eq!(state.verified_count(), 2);
        assert_eq!(state.failed_stage(), Some("bridge"));
        assert!((state.progress_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_reflects_state() {
        let mut state = idle_state();
        state.stages.iter_mut().for_each(|r| {
            r.status = StageStatus::Verified;
        });
        state.is_complete = true;
        state.outcome = Some(RunOutcome::Verified);
        state
            .transcript
            .push(TranscriptLine::new("done", LineKind::Success));

        let report = state.report();
        assert_eq!(report.verified_count, 4);
        assert_eq!(report.stage_count, 4);
        assert_eq!(report.line_count, 1);
        assert_eq!(report.outcome, Some(RunOutcome::Verified));
        assert_eq!(
            report.transcript_digest,
            transcript_digest(&state.transcript)
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = RunOutcome::Failed {
            stage: "bridge".to_string(),
        };
        let json = serde_json::to_string(&outcome).expect("should serialize");
        assert!(json.contains("\"failed\""));
        assert!(json.contains("\"bridge\""));
    }
}
