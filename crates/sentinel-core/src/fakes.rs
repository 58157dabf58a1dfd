//! In-memory fakes for the verifier and notifier traits (testing only)
//!
//! Provides `PassingVerifier`, `ScriptedVerifier` and `RecordingNotifier`
//! that satisfy the trait contracts without randomness or a subscriber.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, VerifyError};
use crate::notify::{Notification, Notifier};
use crate::stage::StageSpec;
use crate::verify::StageVerifier;

// ---------------------------------------------------------------------------
// PassingVerifier
// ---------------------------------------------------------------------------

/// Verifier that passes every stage.
#[derive(Debug, Default)]
pub struct PassingVerifier;

impl PassingVerifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StageVerifier for PassingVerifier {
    async fn verify(&self, _stage: &StageSpec) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "passing"
    }
}

// ---------------------------------------------------------------------------
// ScriptedVerifier
// ---------------------------------------------------------------------------

/// Verifier that fails the named stages and passes the rest.
#[derive(Debug, Default)]
pub struct ScriptedVerifier {
    failures: HashSet<String>,
}

impl ScriptedVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a stage as failing.
    pub fn fail_stage(mut self, name: &str) -> Self {
        self.failures.insert(name.to_string());
        self
    }
}

#[async_trait]
impl StageVerifier for ScriptedVerifier {
    async fn verify(&self, stage: &StageSpec) -> Result<()> {
        if self.failures.contains(&stage.name) {
            Err(VerifyError::StageVerificationFailed {
                stage: stage.name.clone(),
            })
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

/// Notifier that records every notification it is handed.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications delivered so far, in order.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::TrustStage;

    #[tokio::test]
    async fn test_scripted_verifier_fails_only_named_stages() {
        let verifier = ScriptedVerifier::new().fail_stage("bridge");

        let bridge = StageSpec::from_builtin(TrustStage::Bridge);
        assert!(verifier.verify(&bridge).await.is_err());

        let build = StageSpec::from_builtin(TrustStage::Build);
        assert!(verifier.verify(&build).await.is_ok());
    }

    #[test]
    fn test_recording_notifier_preserves_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::info("first", "a"));
        notifier.notify(Notification::error("second", "b"));

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].title, "first");
        assert_eq!(sent[1].title, "second");
    }
}
