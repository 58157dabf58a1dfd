//! Error types for chain-of-trust verification.

use thiserror::Error;

/// Errors produced by stage verification.
///
/// Failure is caught at the sequencer and transitions the run to its
/// terminal `Failed` state; it is never escalated past the sequencer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Stage '{stage}' failed verification")]
    StageVerificationFailed { stage: String },
}

/// Result type for verification operations.
pub type Result<T> = std::result::Result<T, VerifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_stage() {
        let err = VerifyError::StageVerificationFailed {
            stage: "bridge".to_string(),
        };
        assert_eq!(err.to_string(), "Stage 'bridge' failed verification");
    }
}
