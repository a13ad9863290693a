/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains the test campaigns selectable through the run mode.

--*/

mod bulk;
mod burnout;
mod demo;
mod selftest;
mod sweep;

pub use bulk::{generate_bits, run_trng, BulkBits, Checkpoint};
pub use burnout::{
    burn_out, burn_out_cells, is_burnt_out, run_burnout, BURNT_CELLS, PROBE_WRITES, SANE_CELLS,
};
pub use demo::{run_demo, DEMO_INTERVAL_MS};
pub use selftest::{run_selftest, test_address};
pub use sweep::{run_sweep, sweep, SweepPlan, SweepSummary, VALUE_PAIRS};

use alloc::vec::Vec;
use reram_drivers::printer::HexBytes;
use reram_drivers::{cprintln, LogSink, MemoryConfig, ReramError};

pub(crate) fn log_error(log: &mut dyn LogSink, what: &str, err: ReramError) {
    cprintln!(
        log,
        "{} (0x{})",
        what,
        HexBytes(&u32::from(err).to_be_bytes())
    );
}

/// Cells of `cells` the part has, logging the ones it does not.
pub(crate) fn cells_in_range(
    log: &mut dyn LogSink,
    config: &MemoryConfig,
    cells: &[u32],
) -> Vec<u32> {
    let mut kept = Vec::with_capacity(cells.len());
    for &cell in cells {
        if config.contains(cell) {
            kept.push(cell);
        } else {
            cprintln!(
                log,
                "Cell {} outside of {} byte part, skipped",
                cell,
                config.capacity
            );
        }
    }
    kept
}
