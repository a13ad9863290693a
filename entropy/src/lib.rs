/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the write latency entropy library.

--*/

#![cfg_attr(not(feature = "std"), no_std)]

mod latency;
mod mt19937;
mod von_neumann;

pub use latency::{
    measure_bulk_write_latency, measure_latency_bit, measure_write_latency, LatencySample,
    LatencySource, RandomWriteLatency,
};
pub use mt19937::{Mt19937, SeedSource};
pub use von_neumann::{Tries, VonNeumann};
