//! Trust stage definitions and configuration.

use serde::{Deserialize, Serialize};

/// Builtin chain-of-trust stages, in verification order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrustStage {
    /// CI pipeline provenance and build signature.
    Build,

    /// Zarf package manifest, SBOM and image signatures.
    Bundle,

    /// Air-gap transfer checksums.
    Bridge,

    /// Cluster init package and agent deployment.
    Bootstrap,
}

impl TrustStage {
    /// All builtin stages, in the order they are verified.
    pub const ORDER: [TrustStage; 4] = [
        TrustStage::Build,
        TrustStage::Bundle,
        TrustStage::Bridge,
        TrustStage::Bootstrap,
    ];

    /// Get the stage identifier as a string.
    pub fn name(&self) -> &'static str {
        match self {
            TrustStage::Build => "build",
            TrustStage::Bundle => "bundle",
            TrustStage::Bridge => "bridge",
            TrustStage::Bootstrap => "bootstrap",
        }
    }

    /// Get the display label shown on the progress rail.
    pub fn label(&self) -> &'static str {
        match self {
            TrustStage::Build => "Build",
            TrustStage::Bundle => "Bundle",
            TrustStage::Bridge => "Bridge",
            TrustStage::Bootstrap => "Bootstrap",
        }
    }

    /// Get the short stage description.
    pub fn description(&self) -> &'static str {
        match self {
            TrustStage::Build => "CI Pipeline",
            TrustStage::Bundle => "Zarf Package",
            TrustStage::Bridge => "Air-Gap Transfer",
            TrustStage::Bootstrap => "Cluster Init",
        }
    }

    /// Get the transcript script replayed while the stage is checked.
    ///
    /// Lines beginning with `$` render as shell commands.
    pub fn script(&self) -> &'static [&'static str] {
        match self {
            TrustStage::Build => &[
                "$ zarf package inspect build-artifacts.tar.zst",
                "Checking build signature...",
                "Verifying CI pipeline attestation...",
                "Build hash: sha256:a3f8e2d1c4b5...",
                "Signature verified against keyring",
                "Build provenance: GitHub Actions",
                "Build step verified successfully",
            ],
            TrustStage::Bundle => &[
                "$ zarf package verify bundle.tar.zst",
                "Extracting package manifest...",
                "Validating SBOM integrity...",
                "Components found: 12",
                "Checking cosign signatures...",
                "All images signed and verified",
                "Bundle integrity confirmed",
            ],
            TrustStage::Bridge => &[
                "$ zarf package verify-transfer",
                "Calculating transfer checksums...",
                "Source hash: sha256:b4c7d8e9f0a1...",
                "Target hash: sha256:b4c7d8e9f0a1...",
                "Checksums match - no tampering detected",
                "Transfer chain validated",
                "Air-gap bridge verified",
            ],
            TrustStage::Bootstrap => &[
                "$ zarf init --verify",
                "Connecting to cluster...",
                "Verifying init package signatures...",
                "Deploying Zarf agent...",
                "Configuring image registry...",
                "All components deployed successfully",
                "Cluster bootstrap complete",
            ],
        }
    }
}

/// Status of a stage within a verification run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Not yet reached in this run.
    Pending,

    /// Currently being checked (at most one stage at a time).
    Verifying,

    /// Passed verification.
    Verified,

    /// Failed verification; the run halts here.
    Failed,
}

/// Configuration for a verification stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSpec {
    /// Stage identifier (snake_case).
    pub name: String,

    /// Human-readable display label.
    pub label: String,

    /// Short description shown on the progress rail.
    pub description: String,

    /// Transcript lines replayed while the stage is checked.
    pub script: Vec<String>,
}

impl StageSpec {
    /// Create a stage specification from a builtin trust stage.
    pub fn from_builtin(stage: TrustStage) -> Self {
        Self {
            name: stage.name().to_string(),
            label: stage.label().to_string(),
            description: stage.description().to_string(),
            script: stage.script().iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a custom stage specification.
    pub fn custom(name: String, label: String, description: String, script: Vec<String>) -> Self {
        Self {
            name,
            label,
            description,
            script,
        }
    }

    /// The full builtin chain, in verification order.
    pub fn builtin_chain() -> Vec<StageSpec> {
        TrustStage::ORDER.iter().map(|s| Self::from_builtin(*s)).collect()
    }
}
