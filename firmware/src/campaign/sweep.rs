/*++

Licensed under the Apache-2.0 license.

File Name:

    sweep.rs

Abstract:

    File contains the latency sweep campaign recording raw write latencies
    of the reference cells for offline analysis.

--*/

use alloc::vec::Vec;

use reram_drivers::{
    cprintln, Clock, OutputPin, PollLimit, ReramError, ReramResult, SpiBus, SpiMemory,
};
use reram_entropy::measure_write_latency;

use super::{
    burn_out, cells_in_range, is_burnt_out, log_error, BURNT_CELLS, PROBE_WRITES, SANE_CELLS,
};
use crate::{free_artifact_name, ArtifactWriter, FwEnv, RunStatus};

/// Value pairs of the first sweep phase.
pub const VALUE_PAIRS: [(u8, u8); 10] = [
    (0x00, 0xff),
    (0xff, 0x00),
    (0xaa, 0x55),
    (0x55, 0xaa),
    (0x73, 0x73),
    (0xfc, 0x36),
    (0xc5, 0x29),
    (0x1c, 0x9f),
    (0x9d, 0x1b),
    (0x4c, 0xd8),
];

/// Repetitions of the two sweep phases.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SweepPlan {
    /// Samples per cell and entry of [`VALUE_PAIRS`].
    pub pair_tries: u32,

    /// Values per side of the full sweep, which covers every pair in
    /// `0..full_values` squared. At most 256.
    pub full_values: u32,

    /// Samples per cell and pair of the full sweep.
    pub full_tries: u32,
}

impl SweepPlan {
    pub const DEFAULT: SweepPlan = SweepPlan {
        pair_tries: 20,
        full_values: 256,
        full_tries: 8,
    };
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Counters of a finished sweep.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct SweepSummary {
    /// Samples written to the artifact.
    pub samples: u64,

    /// Samples dropped because the poll limit ran out.
    pub timeouts: u64,
}

struct Phase<'c> {
    /// `B` for burnt cells, `S` for sane ones.
    tag: &'static str,
    cells: &'c [u32],
    tries: u32,
    full: bool,
    done: &'static str,
}

fn sweep_phase<S: SpiBus, P: OutputPin, C: Clock>(
    mem: &mut SpiMemory<S, P, C>,
    out: &mut ArtifactWriter,
    phase: &Phase,
    pairs: impl Iterator<Item = (u8, u8)> + Clone,
    limit: PollLimit,
    summary: &mut SweepSummary,
) -> ReramResult<()> {
    for &cell in phase.cells {
        for (first, second) in pairs.clone() {
            for _ in 0..phase.tries {
                match measure_write_latency(mem, cell, first, second, limit) {
                    Ok(cycles) => {
                        let _ = ufmt::uwriteln!(
                            out,
                            "{},{},{},{},{}",
                            phase.tag,
                            cell,
                            first,
                            second,
                            cycles
                        );
                        summary.samples += 1;
                    }
                    Err(e) if e.is_timeout() => summary.timeouts += 1,
                    Err(e) => return Err(e),
                }
            }
        }
    }
    Ok(())
}

/// Record `plan` into a new `<device>_<n>_measure.log`.
///
/// Burnt cells are worn out first and swept only on parts that can burn out.
/// Timed out samples are counted and left out of the artifact.
pub fn sweep<S: SpiBus, P: OutputPin, C: Clock>(
    env: &mut FwEnv<S, P, C>,
    plan: &SweepPlan,
) -> ReramResult<SweepSummary> {
    let config = *env.mem.config();
    let limit = env.run.poll_limit;
    let name = free_artifact_name(env.storage, config.short_name, "measure")?;
    cprintln!(env.log, "[sweep] Choosing file {}", name.as_str());

    let burnt = if config.can_burn_out {
        cells_in_range(env.log, &config, &BURNT_CELLS)
    } else {
        Vec::new()
    };
    let sane = cells_in_range(env.log, &config, &SANE_CELLS);
    let (burnt1, burnt2) = split(&burnt);
    let (sane1, sane2) = split(&sane);

    for &cell in &burnt {
        if !is_burnt_out(&mut env.mem, env.hw_rng, cell, PROBE_WRITES, limit)? {
            burn_out(&mut env.mem, env.hw_rng, cell, env.run.check_interval, limit)?;
        }
    }

    let mut out = ArtifactWriter::create(env.storage, name)?;
    let mut summary = SweepSummary::default();
    let full_values = plan.full_values.min(256);
    let full = (0..full_values)
        .flat_map(move |a| (0..full_values).map(move |b| (a as u8, b as u8)));

    let phases = [
        Phase {
            tag: "B",
            cells: burnt1,
            tries: plan.pair_tries,
            full: false,
            done: "Burnt done",
        },
        Phase {
            tag: "S",
            cells: sane1,
            tries: plan.pair_tries,
            full: false,
            done: "Sane done",
        },
        Phase {
            tag: "B",
            cells: burnt2,
            tries: plan.full_tries,
            full: true,
            done: "Burnt full done",
        },
        Phase {
            tag: "S",
            cells: sane2,
            tries: plan.full_tries,
            full: true,
            done: "Sane full done",
        },
    ];
    for phase in &phases {
        if phase.cells.is_empty() {
            continue;
        }
        let result = if phase.full {
            sweep_phase(&mut env.mem, &mut out, phase, full.clone(), limit, &mut summary)
        } else {
            sweep_phase(
                &mut env.mem,
                &mut out,
                phase,
                VALUE_PAIRS.iter().copied(),
                limit,
                &mut summary,
            )
        };
        if let Err(e) = result {
            // Keep what was measured so far.
            let _ = out.finish();
            return Err(e);
        }
        cprintln!(env.log, "[sweep] {}", phase.done);
    }

    out.finish()?;
    cprintln!(
        env.log,
        "[sweep] {} samples written, {} timed out",
        summary.samples,
        summary.timeouts
    );
    Ok(summary)
}

/// First and second half of the reference cells of one kind.
fn split(cells: &[u32]) -> (&[u32], &[u32]) {
    cells.split_at(cells.len().div_ceil(2))
}

/// Latency sweep campaign with the default plan.
pub fn run_sweep<S: SpiBus, P: OutputPin, C: Clock>(env: &mut FwEnv<S, P, C>) -> RunStatus {
    match sweep(env, &SweepPlan::DEFAULT) {
        Ok(summary) if summary.timeouts == 0 => RunStatus::Okay,
        Ok(_) => RunStatus::FailedPartially,
        Err(e) => {
            log_error(env.log, "[sweep] Stopped", e);
            if e == ReramError::FW_STORAGE_CREATE_FAILED || e == ReramError::FW_STORAGE_NO_FREE_NAME
            {
                RunStatus::FailedTotally
            } else {
                RunStatus::from_error(e)
            }
        }
    }
}
