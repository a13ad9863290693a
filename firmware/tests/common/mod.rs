// Licensed under the Apache-2.0 license

#![allow(dead_code)]

use reram_drivers::{BoardConfig, HwContext, MemoryConfig, SpiMemory, Storage};
use reram_entropy::Mt19937;
use reram_firmware::{FwEnv, RunConfig, PARAMS_FILE};
use reram_hw_model::{
    LatencyProfile, LogCapture, MemStorage, ModelContext, RecordingPin, ReramModel, SimClock,
};

/// Board model plus everything the firmware environment borrows.
pub struct Bench {
    pub hw: ModelContext,
    pub led: RecordingPin,
    pub fs: MemStorage,
    pub log: LogCapture,
    pub rng: Mt19937,
}

impl Bench {
    pub fn new(part: MemoryConfig, latency: LatencyProfile) -> Self {
        Self::with_chip(ReramModel::new(part, latency))
    }

    /// Bench whose cells get stuck after `writes` writes.
    pub fn worn(part: MemoryConfig, latency: LatencyProfile, writes: u32) -> Self {
        Self::with_chip(ReramModel::new(part, latency).with_endurance(writes))
    }

    fn with_chip(chip: ReramModel) -> Self {
        let clock = SimClock::default();
        let chip = chip.with_clock(clock.clone(), 1);
        Self {
            hw: HwContext::new(chip, RecordingPin::default(), clock, 0),
            led: RecordingPin::default(),
            fs: MemStorage::new(),
            log: LogCapture::new(),
            rng: Mt19937::new(1),
        }
    }

    pub fn mount(&mut self) {
        self.fs.mount().unwrap();
    }

    pub fn params(&mut self, text: &str) {
        self.fs.insert(PARAMS_FILE, text);
    }

    pub fn env(&mut self) -> FwEnv<'_, ReramModel, RecordingPin, SimClock> {
        let part = *self.hw.spi.config();
        FwEnv::new(
            SpiMemory::new(&mut self.hw, part),
            &mut self.led,
            &mut self.fs,
            &mut self.log,
            &mut self.rng,
            BoardConfig::DEFAULT,
        )
    }

    /// Environment already switched to `run`.
    pub fn env_with(&mut self, run: RunConfig) -> FwEnv<'_, ReramModel, RecordingPin, SimClock> {
        let mut env = self.env();
        env.configure(run);
        env
    }
}
