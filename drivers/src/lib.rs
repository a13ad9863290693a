/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the ReRAM driver library.

--*/

#![cfg_attr(not(feature = "std"), no_std)]

mod board;
mod hal;
mod memory_config;
pub mod printer;
mod spi_memory;
mod status;
pub mod wait;

pub use board::BoardConfig;
pub use hal::{Clock, HwContext, Level, LogSink, OutputPin, SpiBus, Storage};
pub use memory_config::{AddressWidth, MemoryConfig, MAX_ADDRESS_BYTES};
pub use reram_error::{ReramError, ReramResult};
pub use spi_memory::{Opcode, SpiMemory, WelCheck, MAX_BULK_VALUES};
pub use status::{StatusRegister, StatusReport};
pub use wait::PollLimit;

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        pub use printer::StdoutSink;
    }
}
