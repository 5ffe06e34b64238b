//! JSON Export
//!
//! Writes outcomes as a pretty-printed JSON array.

use std::io::Write;

use anyhow::Result;

use crate::domain::DecodeOutcome;

pub fn write_outcomes<W: Write>(mut out: W, outcomes: &[DecodeOutcome]) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, outcomes)?;
    writeln!(out)?;
    Ok(())
}
