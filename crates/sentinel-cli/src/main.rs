//! Sentinel - Air-Gap Chain-of-Trust Inspector
//!
//! The `sentinel` command drives the chain-of-trust verification sequencer
//! against an air-gapped deployment bundle.
//!
//! ## Commands
//!
//! - `verify`: run the Build → Bundle → Bridge → Bootstrap trust chain
//! - `stages`: list the builtin trust stages

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use sentinel_core::{
    init_tracing, Pacing, RunOutcome, SequencerEvent, SimulatedVerifier, StageSpec, StageStatus,
    TracingNotifier, TrustSequencer, DEFAULT_SUCCESS_RATE,
};

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Air-gap chain-of-trust inspector", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify bundle integrity across the trust chain
    Verify {
        /// Pass probability of the simulated verifier (0.0 - 1.0)
        #[arg(long, default_value_t = DEFAULT_SUCCESS_RATE)]
        success_rate: f64,

        /// Delay between transcript lines, in milliseconds
        #[arg(long, default_value_t = 300)]
        line_delay_ms: u64,

        /// Disable pacing entirely (all delays at zero)
        #[arg(long)]
        fast: bool,

        /// Output format for the run report
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// List the builtin trust stages
    Stages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Verify {
            success_rate,
            line_delay_ms,
            fast,
            format,
        } => cmd_verify(success_rate, line_delay_ms, fast, format).await,
        Commands::Stages => cmd_stages(),
    }
}

fn build_pacing(fast: bool, line_delay_ms: u64) -> Pacing {
    if fast {
        Pacing::zero()
    } else {
        Pacing {
            line_delay: Duration::from_millis(line_delay_ms),
            ..Pacing::default()
        }
    }
}

fn status_symbol(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Verified => "✓",
        StageStatus::Failed => "✗",
        StageStatus::Verifying => "…",
        StageStatus::Pending => "·",
    }
}

/// Run the trust chain and render the transcript live.
async fn cmd_verify(
    success_rate: f64,
    line_delay_ms: u64,
    fast: bool,
    format: ReportFormat,
) -> Result<()> {
    let sequencer = TrustSequencer::with_parts(
        StageSpec::builtin_chain(),
        build_pacing(fast, line_delay_ms),
        Arc::new(SimulatedVerifier::new(success_rate)),
        Arc::new(TracingNotifier),
    );

    let mut events = sequencer.subscribe();
    sequencer.start();

    let outcome = loop {
        match events.recv().await? {
            SequencerEvent::Line(line) => println!("{}  {}", line.clock(), line.text),
            SequencerEvent::Stage { .. } => {}
            SequencerEvent::Finished(outcome) => break outcome,
        }
    };

    let state = sequencer.snapshot();
    let report = state.report();

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => {
            println!();
            for record in &state.stages {
                println!(
                    "  {} {:<10} {}",
                    status_symbol(record.status),
                    record.spec.label,
                    record.spec.description
                );
            }
            println!();
            println!(
                "Summary: {}/{} stages verified ({}ms)",
                report.verified_count, report.stage_count, report.duration_ms
            );
            if state.is_complete {
                println!("✓ Ready for deploy");
            }
            if let Some(stage) = state.failed_stage() {
                println!("✗ Verification failed at stage '{stage}'");
            }
            println!("Transcript digest: {}", report.transcript_digest);
        }
    }

    match outcome {
        RunOutcome::Verified => Ok(()),
        RunOutcome::Failed { stage } => {
            anyhow::bail!("verification failed at stage '{}'", stage)
        }
        RunOutcome::Cancelled => anyhow::bail!("verification cancelled"),
    }
}

/// List the builtin trust stages.
fn cmd_stages() -> Result<()> {
    for spec in StageSpec::builtin_chain() {
        println!(
            "{:<10} {:<10} {:<18} {} steps",
            spec.name,
            spec.label,
            spec.description,
            spec.script.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_pacing_fast_overrides_delay() {
        assert_eq!(build_pacing(true, 300), Pacing::zero());

        let paced = build_pacing(false, 50);
        assert_eq!(paced.line_delay, Duration::from_millis(50));
        assert_eq!(paced.start_delay, Pacing::default().start_delay);
    }

    #[test]
    fn test_status_symbols() {
        assert_eq!(status_symbol(StageStatus::Verified), "✓");
        assert_eq!(status_symbol(StageStatus::Failed), "✗");
        assert_eq!(status_symbol(StageStatus::Pending), "·");
    }

    #[tokio::test]
    async fn test_cmd_verify_success_path() {
        // Certain success, zero pacing: must exit cleanly.
        let result = cmd_verify(1.0, 0, true, ReportFormat::Text).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_cmd_verify_failure_path() {
        // Certain failure at the first stage: must exit with an error.
        let result = cmd_verify(0.0, 0, true, ReportFormat::Json).await;
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("build"));
    }

    #[test]
    fn test_cmd_stages_lists_chain() {
        assert!(cmd_stages().is_ok());
    }
}
