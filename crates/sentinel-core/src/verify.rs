//! Stage verification strategies.
//!
//! The sequencer never decides pass/fail itself; it asks a [`StageVerifier`].
//! The default [`SimulatedVerifier`] stands in for a real signature or
//! checksum check and is heavily biased toward success. Swapping in a real
//! verifier (cosign, slsa-verifier) only requires implementing the trait and
//! mapping underlying failures onto [`VerifyError::StageVerificationFailed`].

use async_trait::async_trait;
use rand::Rng;

use crate::error::{Result, VerifyError};
use crate::stage::StageSpec;

/// Default pass probability of the simulated verifier.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.95;

/// Pass/fail decision for a single stage.
#[async_trait]
pub trait StageVerifier: Send + Sync {
    /// Decide the outcome for `stage`.
    ///
    /// An `Err` is terminal for the run; later stages are not attempted.
    async fn verify(&self, stage: &StageSpec) -> Result<()>;

    /// Get the verifier name (for logs).
    fn name(&self) -> &str;
}

/// Simulated verifier: a weighted coin flip.
#[derive(Debug, Clone)]
pub struct SimulatedVerifier {
    success_rate: f64,
}

impl SimulatedVerifier {
    /// Create a verifier with the given pass probability, clamped to [0, 1].
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }
}

impl Default for SimulatedVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_RATE)
    }
}

#[async_trait]
impl StageVerifier for SimulatedVerifier {
    async fn verify(&self, stage: &StageSpec) -> Result<()> {
        let passed = rand::thread_rng().gen_bool(self.success_rate);
        if passed {
            Ok(())
        } else {
            Err(VerifyError::StageVerificationFailed {
                stage: stage.name.clone(),
            })
        }
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::TrustStage;

    #[tokio::test]
    async fn test_certain_success() {
        let verifier = SimulatedVerifier::new(1.0);
        let spec = StageSpec::from_builtin(TrustStage::Build);
        for _ in 0..32 {
            assert!(verifier.verify(&spec).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_certain_failure() {
        let verifier = SimulatedVerifier::new(0.0);
        let spec = StageSpec::from_builtin(TrustStage::Bundle);
        let err = verifier.verify(&spec).await.expect_err("should fail");
        assert_eq!(
            err,
            VerifyError::StageVerificationFailed {
                stage: "bundle".to_string()
            }
        );
    }

    #[test]
    fn test_success_rate_clamped() {
        // Out-of-range probabilities must not panic gen_bool.
        let verifier = SimulatedVerifier::new(3.5);
        assert_eq!(verifier.success_rate, 1.0);

        let verifier = SimulatedVerifier::new(-0.5);
        assert_eq!(verifier.success_rate, 0.0);
    }
}
