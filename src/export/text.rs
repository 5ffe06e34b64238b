//! Human-readable rendering
//!
//! Verified decodes are shown as fact, candidate decodes as a best guess.

use std::io::Write;

use anyhow::Result;

use crate::domain::{DecodeOutcome, DecodedLog, FailureReason};

/// Values longer than this many characters are cut short on screen
const MAX_DISPLAY_CHARS: usize = 66;

/// Render one outcome as a block of text, trailing newline included
pub fn render_outcome(outcome: &DecodeOutcome) -> String {
    let mut out = String::new();
    match outcome {
        DecodeOutcome::Decoded(decoded) => render_decoded(&mut out, decoded),
        DecodeOutcome::Unverified { candidates } => match candidates.first() {
            Some(decoded) => {
                out.push_str("unverified, best guess:\n");
                render_decoded(&mut out, decoded);
            }
            None => out.push_str("unverified, no candidate matched this log\n"),
        },
        DecodeOutcome::Failed { reason } => {
            out.push_str("could not decode this log");
            if *reason == FailureReason::NoTarget {
                out.push_str(" (transaction has no contract target)");
            }
            out.push('\n');
        }
    }
    out
}

fn render_decoded(out: &mut String, decoded: &DecodedLog) {
    out.push_str(&decoded.signature_text);
    out.push('\n');
    let width = decoded
        .mapping
        .iter()
        .map(|arg| arg.name.len())
        .max()
        .unwrap_or(0);
    for arg in &decoded.mapping {
        out.push_str(&format!(
            "  {:width$}  {}\n",
            arg.name,
            shorten(&arg.value),
            width = width
        ));
    }
}

/// Shorten a long value for the terminal, noting its full length
fn shorten(value: &str) -> String {
    let chars = value.chars().count();
    if chars <= MAX_DISPLAY_CHARS {
        return value.to_string();
    }
    let head: String = value.chars().take(MAX_DISPLAY_CHARS).collect();
    format!("{}… ({} chars)", head, chars)
}

pub fn write_outcomes<W: Write>(mut out: W, outcomes: &[DecodeOutcome]) -> Result<()> {
    for (index, outcome) in outcomes.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        out.write_all(render_outcome(outcome).as_bytes())?;
    }
    Ok(())
}
