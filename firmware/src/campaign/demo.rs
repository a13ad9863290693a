/*++

Licensed under the Apache-2.0 license.

File Name:

    demo.rs

Abstract:

    File contains the demo campaign logging one latency bit at a time.

--*/

use reram_drivers::{cprintln, Clock, OutputPin, SpiBus};
use reram_entropy::RandomWriteLatency;

use super::log_error;
use crate::{FwEnv, RunStatus};

/// Pause between two demo measurements.
pub const DEMO_INTERVAL_MS: u32 = 5000;

/// Measure and log a latency bit every [`DEMO_INTERVAL_MS`] until a
/// measurement fails or `demo_rounds` measurements were taken.
pub fn run_demo<S: SpiBus, P: OutputPin, C: Clock>(env: &mut FwEnv<S, P, C>) -> RunStatus {
    let limit = env.run.poll_limit;
    let mut round = 0u32;
    while env.run.demo_rounds.map_or(true, |rounds| round < rounds) {
        let sample = RandomWriteLatency::new(&mut env.mem, &mut env.seed, limit).sample();
        match sample {
            Ok(sample) => cprintln!(
                env.log,
                "[demo] Bit {} ({} cycles at {})",
                u8::from(sample.bit()),
                sample.cycles,
                sample.address
            ),
            Err(e) => {
                log_error(env.log, "[demo] Measurement failed", e);
                return RunStatus::from_error(e);
            }
        }
        env.mem.clock_mut().sleep_ms(DEMO_INTERVAL_MS);
        round += 1;
    }
    RunStatus::Okay
}
