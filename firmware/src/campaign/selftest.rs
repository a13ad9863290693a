/*++

Licensed under the Apache-2.0 license.

File Name:

    selftest.rs

Abstract:

    File contains the write/read-back self-test over the memory cells.

--*/

use reram_drivers::printer::HexBytes;
use reram_drivers::{
    cprintln, Clock, LogSink, OutputPin, PollLimit, ReramError, ReramResult, SpiBus, SpiMemory,
};
use reram_entropy::SeedSource;

use super::log_error;
use crate::{FwEnv, RunStatus};

/// Write a random value to `address`, wait for the write to finish and read
/// it back. Logs the cell and returns `false` on a mismatch.
pub fn test_address<S: SpiBus, P: OutputPin, C: Clock>(
    mem: &mut SpiMemory<S, P, C>,
    rng: &mut dyn SeedSource,
    address: u32,
    limit: PollLimit,
    log: &mut dyn LogSink,
) -> ReramResult<bool> {
    let expected = rng.range(0, 256)? as u8;
    mem.write_and_poll(address, expected, limit)?;
    let actual = mem.read_byte(address)?;
    if actual != expected {
        cprintln!(
            log,
            "[selftest] {}: 0x{} -> 0x{}",
            address,
            HexBytes(&[expected]),
            HexBytes(&[actual])
        );
        return Ok(false);
    }
    Ok(true)
}

/// Self-test every cell of the part once.
pub fn run_selftest<S: SpiBus, P: OutputPin, C: Clock>(env: &mut FwEnv<S, P, C>) -> RunStatus {
    let limit = env.run.poll_limit;
    let capacity = env.mem.config().capacity;
    let mut failed = 0u32;
    for address in 0..capacity {
        if address % 1000 == 0 {
            cprintln!(env.log, "[selftest] {}", address);
        }
        match test_address(&mut env.mem, &mut env.seed, address, limit, env.log) {
            Ok(true) => {}
            Ok(false) => failed += 1,
            Err(e) => {
                log_error(env.log, "[selftest] Stopped", e);
                return RunStatus::from_error(e);
            }
        }
    }

    if failed == 0 {
        cprintln!(env.log, "[selftest] All {} cells passed", capacity);
        RunStatus::Okay
    } else {
        cprintln!(env.log, "[selftest] {} of {} cells failed", failed, capacity);
        log_error(
            env.log,
            "[selftest] Mismatches found",
            ReramError::FW_CAMPAIGN_SELFTEST_MISMATCH,
        );
        RunStatus::FailedPartially
    }
}
