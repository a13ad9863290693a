/*++

Licensed under the Apache-2.0 license.

File Name:

    burnout.rs

Abstract:

    File contains the burn-out probe, the burn-out driver and the campaign
    wearing out the reference cells.

--*/

use reram_drivers::{
    cprintln, Clock, OutputPin, PollLimit, ReramError, ReramResult, SpiBus, SpiMemory,
};
use reram_entropy::SeedSource;

use super::{cells_in_range, log_error};
use crate::{FwEnv, RunStatus};

/// Probe writes used to decide whether a cell is burnt out.
pub const PROBE_WRITES: u32 = 10;

/// Reference cells expected to still work.
pub const SANE_CELLS: [u32; 10] = [
    3609, 17625, 29463, 48071, 58244, 7541, 24251, 36203, 49382, 60456,
];

/// Reference cells to wear out.
pub const BURNT_CELLS: [u32; 10] = [1, 9022, 26978, 44054, 60772, 6, 10990, 31987, 54833, 64198];

/// Write `writes` random values to `address`, reading each back.
///
/// Returns `true` on the first value that does not read back.
pub fn is_burnt_out<S: SpiBus, P: OutputPin, C: Clock>(
    mem: &mut SpiMemory<S, P, C>,
    rng: &mut dyn SeedSource,
    address: u32,
    writes: u32,
    limit: PollLimit,
) -> ReramResult<bool> {
    for _ in 0..writes {
        let expected = rng.next_u8();
        mem.write_and_poll(address, expected, limit)?;
        if mem.read_byte(address)? != expected {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Write random values to `address` until it is burnt out, probing on the
/// first write and every `check_interval` writes after it.
///
/// Does not give up on its own; only a measurement error ends it early.
/// Returns the number of driver writes issued.
pub fn burn_out<S: SpiBus, P: OutputPin, C: Clock>(
    mem: &mut SpiMemory<S, P, C>,
    rng: &mut dyn SeedSource,
    address: u32,
    check_interval: u32,
    limit: PollLimit,
) -> ReramResult<u64> {
    let interval = u64::from(check_interval.max(1));
    let mut writes = 0u64;
    loop {
        let value = rng.next_u8();
        mem.write_and_poll(address, value, limit)?;
        let probe = writes % interval == 0;
        writes += 1;
        if probe && is_burnt_out(mem, rng, address, PROBE_WRITES, limit)? {
            return Ok(writes);
        }
    }
}

/// Report the state of every `sane` cell, then burn out every `burnt` cell
/// that is not already.
pub fn burn_out_cells<S: SpiBus, P: OutputPin, C: Clock>(
    env: &mut FwEnv<S, P, C>,
    sane: &[u32],
    burnt: &[u32],
) -> ReramResult<()> {
    let limit = env.run.poll_limit;
    let config = *env.mem.config();

    for cell in cells_in_range(env.log, &config, sane) {
        if is_burnt_out(&mut env.mem, env.hw_rng, cell, PROBE_WRITES, limit)? {
            cprintln!(env.log, "[burnout] Cell {} burnt out, not good!", cell);
        } else {
            cprintln!(env.log, "[burnout] Cell {} sane", cell);
        }
    }

    for cell in cells_in_range(env.log, &config, burnt) {
        if !is_burnt_out(&mut env.mem, env.hw_rng, cell, PROBE_WRITES, limit)? {
            let writes = burn_out(
                &mut env.mem,
                env.hw_rng,
                cell,
                env.run.check_interval,
                limit,
            )?;
            cprintln!(env.log, "[burnout] Cell {} took {} writes", cell, writes);
        }
        cprintln!(env.log, "[burnout] Cell {} burnt out", cell);
    }

    cprintln!(env.log, "[burnout] Burn out process complete");
    Ok(())
}

/// Burn-out campaign over the reference cells.
pub fn run_burnout<S: SpiBus, P: OutputPin, C: Clock>(env: &mut FwEnv<S, P, C>) -> RunStatus {
    if !env.mem.config().can_burn_out {
        log_error(
            env.log,
            "[burnout] Part cannot be burnt out",
            ReramError::FW_CAMPAIGN_CANNOT_BURN_OUT,
        );
        return RunStatus::FailedTotally;
    }
    match burn_out_cells(env, &SANE_CELLS, &BURNT_CELLS) {
        Ok(()) => RunStatus::Okay,
        Err(e) => {
            log_error(env.log, "[burnout] Stopped", e);
            RunStatus::from_error(e)
        }
    }
}
