// src/codec/csv.rs

//! Semicolon-separated export of the per-iteration counters.

use std::io::Write;

use crate::morphology::CounterSet;
use crate::utils::error::Result;

const HEADER_COLUMNS: [&str; 6] = [
    "determinate border comparison counter",
    "insert new candidate comparison counter",
    "insert new candidate memory access counter",
    "remove candidate comparison counter",
    "remove candidate memory access counter",
    "number of elements in border",
];

/// Writes one header line and one row per recorded iteration, iteration 0
/// being the preparation row.
pub fn write_counters<W: Write>(out: &mut W, counters: &CounterSet) -> Result<()> {
    write!(out, "iteration")?;
    for column in HEADER_COLUMNS {
        write!(out, "; {}", column)?;
    }
    writeln!(out)?;
    for iteration in 0..counters.iterations() {
        writeln!(
            out,
            "{};{};{};{};{};{};{}",
            iteration,
            counters.detect_comparisons[iteration],
            counters.insert_comparisons[iteration],
            counters.insert_accesses[iteration],
            counters.remove_comparisons[iteration],
            counters.remove_accesses[iteration],
            counters.border_elements[iteration],
        )?;
    }
    Ok(())
}
