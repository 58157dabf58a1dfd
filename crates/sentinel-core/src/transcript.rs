//! Append-only verification transcript.
//!
//! The transcript is the ground truth of a run as the operator sees it:
//! timestamped lines, appended strictly in order, never mutated or removed
//! within a run, cleared only when a new run starts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Shell-prompt marker that classifies a script line as a command.
const PROMPT_MARKER: char = '$';

/// Classification of a transcript line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Sequencer progress (stage start, cancellation).
    Info,

    /// Positive outcome (stage pass, run summary).
    Success,

    /// Stage failure.
    Error,

    /// Replayed shell command.
    Command,

    /// Replayed command output.
    Output,
}

/// A single timestamped line of verification output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptLine {
    /// Line text as rendered in the terminal pane.
    pub text: String,

    /// Line classification (drives presentation).
    pub kind: LineKind,

    /// Wall-clock time the line was appended.
    pub timestamp: DateTime<Utc>,
}

impl TranscriptLine {
    /// Create a line stamped with the current wall-clock time.
    pub fn new(text: impl Into<String>, kind: LineKind) -> Self {
        Self {
            text: text.into(),
            kind,
            timestamp: Utc::now(),
        }
    }

    /// Classify a replayed script line: `$`-prefixed lines are commands,
    /// everything else is output.
    pub fn from_script(text: &str) -> Self {
        let kind = if text.starts_with(PROMPT_MARKER) {
            LineKind::Command
        } else {
            LineKind::Output
        };
        Self::new(text, kind)
    }

    /// Timestamp at second precision, as shown in the terminal pane.
    pub fn clock(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// SHA-256 digest over the transcript line texts.
///
/// Depends only on the texts and their order, not on timestamps, so two
/// runs that replayed the same lines hash identically.
pub fn transcript_digest(lines: &[TranscriptLine]) -> String {
    let mut hasher = Sha256::new();
    for line in lines {
        hasher.update(line.text.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_line_classification() {
        let command = TranscriptLine::from_script("$ zarf package verify bundle.tar.zst");
        assert_eq!(command.kind, LineKind::Command);

        let output = TranscriptLine::from_script("Validating SBOM integrity...");
        assert_eq!(output.kind, LineKind::Output);
    }

    #[test]
    fn test_clock_is_second_precision() {
        let line = TranscriptLine::new("hello", LineKind::Info);
        let clock = line.clock();
        assert_eq!(clock.len(), 8);
        assert_eq!(clock.matches(':').count(), 2);
    }

    #[test]
    fn test_digest_deterministic() {
        let a = vec![
            TranscriptLine::new("one", LineKind::Info),
            TranscriptLine::new("two", LineKind::Output),
        ];
        let b = vec![
            TranscriptLine::new("one", LineKind::Success),
            TranscriptLine::new("two", LineKind::Error),
        ];
        // Kinds and timestamps differ, texts match.
        assert_eq!(transcript_digest(&a), transcript_digest(&b));
    }

    #[test]
    fn test_digest_sensitive_to_order() {
        let a = vec![
            TranscriptLine::new("one", LineKind::Info),
            TranscriptLine::new("two", LineKind::Info),
        ];
        let b = vec![
            TranscriptLine::new("two", LineKind::Info),
            TranscriptLine::new("one", LineKind::Info),
        ];
        assert_ne!(transcript_digest(&a), transcript_digest(&b));
    }

    #[test]
    fn test_line_serialization() {
        let line = TranscriptLine::new("Checking cosign signatures...", LineKind::Output);
        let json = serde_json::to_string(&line).expect("should serialize");
        let back: TranscriptLine = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back, line);
    }
}
