// Licensed under the Apache-2.0 license

//! Software model of the ReRAM board, to be driven from tests and the host
//! emulator.
//!
//! Every type here implements one of the board primitive traits from
//! `reram-drivers`, so firmware code runs against the model unchanged.

mod clock;
mod output;
mod pin;
mod reram;
mod storage;

pub use clock::SimClock;
pub use output::LogCapture;
pub use pin::RecordingPin;
pub use reram::{LatencyProfile, ReramModel, ShortTransfer};
pub use storage::{MemStorage, StorageFault};

use reram_drivers::{HwContext, MemoryConfig};

/// Hardware context wired to the software model.
pub type ModelContext = HwContext<ReramModel, RecordingPin, SimClock>;

/// Build a context around a fresh chip model of the given part.
///
/// The chip shares the returned clock, and every SPI exchange advances it by
/// one tick.
pub fn new_context(config: MemoryConfig, latency: LatencyProfile) -> ModelContext {
    let clock = SimClock::default();
    let chip = ReramModel::new(config, latency).with_clock(clock.clone(), 1);
    HwContext::new(chip, RecordingPin::default(), clock, 0)
}
