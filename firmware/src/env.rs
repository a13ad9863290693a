/*++

Licensed under the Apache-2.0 license.

File Name:

    env.rs

Abstract:

    File implements a context holding everything a campaign runs against.

--*/

use reram_drivers::{BoardConfig, Clock, LogSink, OutputPin, SpiBus, SpiMemory, Storage};
use reram_entropy::{Mt19937, SeedSource};

use crate::RunConfig;

/// Firmware environment
pub struct FwEnv<'a, S, P, C> {
    /// Memory device under test
    pub mem: SpiMemory<'a, S, P, C>,

    /// Activity LED
    pub led: &'a mut dyn OutputPin,

    /// SD card file system
    pub storage: &'a mut dyn Storage,

    /// Log output
    pub log: &'a mut dyn LogSink,

    /// Hardware RNG; supplies the values of the burn-out writes
    pub hw_rng: &'a mut dyn SeedSource,

    /// Picks addresses and values for latency measurements
    pub seed: Mt19937,

    /// Settings of the current run
    pub run: RunConfig,

    /// Board wiring
    pub board: BoardConfig,
}

impl<'a, S: SpiBus, P: OutputPin, C: Clock> FwEnv<'a, S, P, C> {
    pub fn new(
        mem: SpiMemory<'a, S, P, C>,
        led: &'a mut dyn OutputPin,
        storage: &'a mut dyn Storage,
        log: &'a mut dyn LogSink,
        hw_rng: &'a mut dyn SeedSource,
        board: BoardConfig,
    ) -> Self {
        let run = RunConfig::default();
        Self {
            mem,
            led,
            storage,
            log,
            hw_rng,
            seed: Mt19937::new(run.seed),
            run,
            board,
        }
    }

    /// Switch to `run`, reseeding the address and value generator.
    pub fn configure(&mut self, run: RunConfig) {
        self.seed = Mt19937::new(run.seed);
        self.run = run;
    }
}
