//! Chain-of-trust verification sequencer.
//!
//! Owns the run state and advances the trust stages one at a time on a
//! single cooperative task. Observers read snapshots and subscribe to the
//! event stream; nothing hands out references to live state.
//!
//! Lifecycle per run: `Idle → Running(stage 0..N-1) → Verified | Failed |
//! Cancelled`. Terminal states persist until the next `start()`, which
//! fully resets the state. A failed stage halts the run; there is no
//! partial resume.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::run::{RunOutcome, RunState};
use crate::stage::{StageSpec, StageStatus};
use crate::transcript::{LineKind, TranscriptLine};
use crate::verify::{SimulatedVerifier, StageVerifier};

/// Capacity of the event channel; a full run emits well under 100 events.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Delays at the sequencer's suspension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Delay after `start()` before the first stage begins.
    pub start_delay: Duration,

    /// Delay before each script line is appended.
    pub line_delay: Duration,

    /// Delay between the last script line and the pass/fail decision.
    pub decision_delay: Duration,
}

impl Pacing {
    /// Zero pacing for deterministic tests.
    pub fn zero() -> Self {
        Self {
            start_delay: Duration::ZERO,
            line_delay: Duration::ZERO,
            decision_delay: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(500),
            line_delay: Duration::from_millis(300),
            decision_delay: Duration::from_millis(500),
        }
    }
}

/// State-change events published while a run advances.
#[derive(Debug, Clone)]
pub enum SequencerEvent {
    /// A transcript line was appended.
    Line(TranscriptLine),

    /// A stage changed status.
    Stage { name: String, status: StageStatus },

    /// The run reached a terminal state.
    Finished(RunOutcome),
}

struct SequencerInner {
    stages: Vec<StageSpec>,
    pacing: Pacing,
    verifier: Arc<dyn StageVerifier>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<RunState>,
    running: AtomicBool,
    cancel_requested: AtomicBool,
    events: broadcast::Sender<SequencerEvent>,
}

/// The verification sequencer. Cheap to clone; clones share one run.
#[derive(Clone)]
pub struct TrustSequencer {
    inner: Arc<SequencerInner>,
}

impl TrustSequencer {
    /// Sequencer over the builtin trust chain with default pacing, the
    /// simulated verifier, and the tracing notifier.
    pub fn new() -> Self {
        Self::with_parts(
            StageSpec::builtin_chain(),
            Pacing::default(),
            Arc::new(SimulatedVerifier::default()),
            Arc::new(TracingNotifier),
        )
    }

    /// Fully-injected constructor.
    pub fn with_parts(
        stages: Vec<StageSpec>,
        pacing: Pacing,
        verifier: Arc<dyn StageVerifier>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let state = RunState::new(stages.clone());
        Self {
            inner: Arc::new(SequencerInner {
                stages,
                pacing,
                verifier,
                notifier,
                state: Mutex::new(state),
                running: AtomicBool::new(false),
                cancel_requested: AtomicBool::new(false),
                events,
            }),
        }
    }

    /// Start a verification run.
    ///
    /// No-op while a run is in flight (the run-in-progress guard is
    /// checked atomically). Otherwise resets the state synchronously,
    /// then spawns the stage task; completion is observed through
    /// [`snapshot`](Self::snapshot) and [`subscribe`](Self::subscribe),
    /// not a return value.
    pub fn start(&self) {
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("verification already in progress; start ignored");
            return;
        }

        self.inner.cancel_requested.store(false, Ordering::SeqCst);
        self.inner.lock_state().reset();

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            SequencerInner::run(inner).await;
        });
    }

    /// Request cancellation of the in-flight run.
    ///
    /// Checked at every suspension point; no-op when nothing is running.
    pub fn cancel(&self) {
        if self.inner.running.load(Ordering::SeqCst) {
            self.inner.cancel_requested.store(true, Ordering::SeqCst);
            info!("verification cancellation requested");
        }
    }

    /// Whether a run is currently in flight.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Clone of the current run state.
    pub fn snapshot(&self) -> RunState {
        self.inner.lock_state().clone()
    }

    /// Subscribe to state-change events. Subscribe before `start()` to
    /// observe a run from its first line.
    pub fn subscribe(&self) -> broadcast::Receiver<SequencerEvent> {
        self.inner.events.subscribe()
    }
}

impl Default for TrustSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl SequencerInner {
    fn lock_state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().expect("run state lock poisoned")
    }

    fn cancelled(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    /// Suspension point: sleep, then report whether the run may continue.
    async fn pause(&self, delay: Duration) -> bool {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        !self.cancelled()
    }

    fn append(&self, line: TranscriptLine) {
        self.lock_state().transcript.push(line.clone());
        let _ = self.events.send(SequencerEvent::Line(line));
    }

    fn set_status(&self, index: usize, status: StageStatus) {
        let name = {
            let mut state = self.lock_state();
            state.stages[index].status = status;
            state.stages[index].spec.name.clone()
        };
        let _ = self.events.send(SequencerEvent::Stage { name, status });
    }

    async fn run(inner: Arc<Self>) {
        let run_id = inner.lock_state().run_id;
        info!(
            run_id = %run_id,
            verifier = inner.verifier.name(),
            "starting chain-of-trust verification"
        );

        if !inner.pause(inner.pacing.start_delay).await {
            inner.finish_cancelled(None);
            return;
        }

        for index in 0..inner.stages.len() {
            let spec = inner.stages[index].clone();
            let tag = spec.label.to_uppercase();

            inner.set_status(index, StageStatus::Verifying);
            inner.append(TranscriptLine::new(
                format!("[{tag}] Starting verification..."),
                LineKind::Info,
            ));
            info!(stage = %spec.name, "verifying stage");

            for line in &spec.script {
                if !inner.pause(inner.pacing.line_delay).await {
                    inner.finish_cancelled(Some(index));
                    return;
                }
                inner.append(TranscriptLine::from_script(line));
            }

            if !inner.pause(inner.pacing.decision_delay).await {
                inner.finish_cancelled(Some(index));
                return;
            }

            match inner.verifier.verify(&spec).await {
                Ok(()) => {
                    inner.set_status(index, StageStatus::Verified);
                    inner.append(TranscriptLine::new(
                        format!("[{tag}] ✓ Verification successful"),
                        LineKind::Success,
                    ));
                }
                Err(err) => {
                    warn!(stage = %spec.name, error = %err, "stage verification failed");
                    inner.fail_stage(index, &spec, &tag);
                    return;
                }
            }
        }

        inner.append(TranscriptLine::new(
            "All verification steps completed successfully!",
            LineKind::Success,
        ));
        inner.append(TranscriptLine::new(
            "Bundle is ready for deployment.",
            LineKind::Success,
        ));
        info!(run_id = %run_id, "chain-of-trust verification complete");

        inner.finish(RunOutcome::Verified, true);
        inner.notifier.notify(Notification::info(
            "Verification Complete",
            "Chain of trust verification completed successfully.",
        ));
    }

    /// Terminal failure: status flip, error line, and flag drop happen
    /// under one lock so no snapshot observes a failed stage while the
    /// run still claims to be running.
    fn fail_stage(&self, index: usize, spec: &StageSpec, tag: &str) {
        let line = TranscriptLine::new(
            format!("[{tag}] ✗ Verification failed"),
            LineKind::Error,
        );
        let outcome = RunOutcome::Failed {
            stage: spec.name.clone(),
        };
        {
            let mut state = self.lock_state();
            state.stages[index].status = StageStatus::Failed;
            state.transcript.push(line.clone());
            state.is_running = false;
            state.is_complete = false;
            state.outcome = Some(outcome.clone());
            state.finished_at = Some(Utc::now());
        }
        let _ = self.events.send(SequencerEvent::Stage {
            name: spec.name.clone(),
            status: StageStatus::Failed,
        });
        let _ = self.events.send(SequencerEvent::Line(line));
        self.running.store(false, Ordering::SeqCst);
        let _ = self.events.send(SequencerEvent::Finished(outcome));
        self.notifier.notify(Notification::error(
            "Verification Failed",
            format!(
                "{} verification failed. Check the transcript for details.",
                spec.label
            ),
        ));
    }

    fn finish(&self, outcome: RunOutcome, complete: bool) {
        {
            let mut state = self.lock_state();
            state.is_running = false;
            state.is_complete = complete;
            state.outcome = Some(outcome.clone());
            state.finished_at = Some(Utc::now());
        }
        self.running.store(false, Ordering::SeqCst);
        let _ = self.events.send(SequencerEvent::Finished(outcome));
    }

    fn finish_cancelled(&self, in_flight: Option<usize>) {
        if let Some(index) = in_flight {
            self.set_status(index, StageStatus::Pending);
        }
        self.append(TranscriptLine::new("Verification cancelled", LineKind::Info));
        info!("verification run cancelled");
        self.finish(RunOutcome::Cancelled, false);
    }
}
