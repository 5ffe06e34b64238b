//! CSV Export
//!
//! One row per decoded argument; outcomes with nothing decoded get a single
//! row with empty argument columns.

use std::io::Write;

use anyhow::Result;

use super::status_label;
use crate::domain::DecodeOutcome;

/// Write outcomes as CSV, returning the number of data rows
pub fn write_outcomes<W: Write>(out: W, outcomes: &[DecodeOutcome]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(out);

    // Write header
    wtr.write_record([
        "status",
        "identifier",
        "signature",
        "name",
        "type",
        "indexed",
        "value",
    ])?;

    let mut rows = 0;
    for outcome in outcomes {
        let status = status_label(outcome);
        let Some(decoded) = outcome.best() else {
            wtr.write_record([status, "", "", "", "", "", ""])?;
            rows += 1;
            continue;
        };

        if decoded.mapping.is_empty() {
            wtr.write_record([
                status,
                decoded.identifier_hex.as_str(),
                decoded.signature_text.as_str(),
                "",
                "",
                "",
                "",
            ])?;
            rows += 1;
            continue;
        }

        for arg in &decoded.mapping {
            wtr.write_record([
                status,
                decoded.identifier_hex.as_str(),
                decoded.signature_text.as_str(),
                arg.name.as_str(),
                arg.kind.as_str(),
                if arg.indexed { "true" } else { "false" },
                arg.value.as_str(),
            ])?;
            rows += 1;
        }
    }

    wtr.flush()?;
    Ok(rows)
}
