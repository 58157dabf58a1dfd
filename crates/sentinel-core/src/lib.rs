//! Sentinel Core - Air-Gap Chain-of-Trust Verification
//!
//! Provides the verification sequencer that:
//! - Advances the trust stages (Build → Bundle → Bridge → Bootstrap) one
//!   at a time on a single cooperative task
//! - Emits a timestamped, append-only transcript and per-stage status
//! - Halts terminally on the first failed stage
//! - Decides pass/fail through an injected [`verify::StageVerifier`]

pub mod error;
pub mod fakes;
pub mod notify;
pub mod run;
pub mod sequencer;
pub mod stage;
pub mod telemetry;
pub mod transcript;
pub mod verify;

// Re-export key types
pub use error::{Result, VerifyError};
pub use notify::{Notification, Notifier, NotifySeverity, TracingNotifier};
pub use run::{RunOutcome, RunReport, RunState, StageRecord, StageReportEntry};
pub use sequencer::{Pacing, SequencerEvent, TrustSequencer};
pub use stage::{StageSpec, StageStatus, TrustStage};
pub use telemetry::init_tracing;
pub use transcript::{transcript_digest, LineKind, TranscriptLine};
pub use verify::{SimulatedVerifier, StageVerifier, DEFAULT_SUCCESS_RATE};

/// Sentinel version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
