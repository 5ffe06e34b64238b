//! Output rendering for decode outcomes
//!
//! - text: human-readable, framed by confidence
//! - json: the serialized outcomes
//! - csv: one row per decoded argument

mod csv_export;
mod json_export;
mod text;

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;

use crate::domain::{DecodeOutcome, FailureReason};

pub use csv_export::write_outcomes as write_csv;
pub use json_export::write_outcomes as write_json;
pub use text::{render_outcome, write_outcomes as write_text};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Write outcomes in the requested format
pub fn write_outcomes<W: Write>(
    out: W,
    format: OutputFormat,
    outcomes: &[DecodeOutcome],
) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(out, outcomes),
        OutputFormat::Json => write_json(out, outcomes),
        OutputFormat::Csv => write_csv(out, outcomes).map(|_| ()),
    }
}

/// Short status label used by the tabular formats
pub(crate) fn status_label(outcome: &DecodeOutcome) -> &'static str {
    match outcome {
        DecodeOutcome::Decoded(_) => "decoded",
        DecodeOutcome::Unverified { .. } => "unverified",
        DecodeOutcome::Failed {
            reason: FailureReason::NoTarget,
        } => "failed:no_target",
        DecodeOutcome::Failed {
            reason: FailureReason::CouldNotDecode,
        } => "failed:could_not_decode",
    }
}
