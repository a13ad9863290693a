/*++

Licensed under the Apache-2.0 license.

File Name:

    latency.rs

Abstract:

    File contains the write latency measurements the raw bits are taken from.

--*/

use reram_drivers::{Clock, OutputPin, PollLimit, SpiBus, SpiMemory, MAX_BULK_VALUES};
use reram_error::{ReramError, ReramResult};

use crate::SeedSource;

/// Cycles needed to overwrite `first` with `second` at `address`.
///
/// The first write only puts a known value in the cell; its latency is
/// discarded and the second write's poll count is returned.
pub fn measure_write_latency<S: SpiBus, P: OutputPin, C: Clock>(
    mem: &mut SpiMemory<S, P, C>,
    address: u32,
    first: u8,
    second: u8,
    limit: PollLimit,
) -> ReramResult<u64> {
    mem.write_and_poll(address, first, limit)?;
    mem.write_and_poll(address, second, limit)
}

/// Least significant bit of [`measure_write_latency`].
pub fn measure_latency_bit<S: SpiBus, P: OutputPin, C: Clock>(
    mem: &mut SpiMemory<S, P, C>,
    address: u32,
    first: u8,
    second: u8,
    limit: PollLimit,
) -> ReramResult<bool> {
    Ok(measure_write_latency(mem, address, first, second, limit)? & 1 == 1)
}

/// Like [`measure_write_latency`], but each write covers `len` cells starting
/// at `address`, all set to the same value.
pub fn measure_bulk_write_latency<S: SpiBus, P: OutputPin, C: Clock>(
    mem: &mut SpiMemory<S, P, C>,
    address: u32,
    len: usize,
    first: u8,
    second: u8,
    limit: PollLimit,
) -> ReramResult<u64> {
    if len > MAX_BULK_VALUES {
        return Err(ReramError::DRIVER_RERAM_BULK_WRITE_TOO_LARGE);
    }
    let mut values = [first; MAX_BULK_VALUES];
    mem.write_bytes(address, &values[..len])?;
    mem.poll_until_idle(limit)?;

    values[..len].fill(second);
    mem.write_bytes(address, &values[..len])?;
    mem.poll_until_idle(limit)
}

/// One overwrite and the cycles it took.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LatencySample {
    pub address: u32,
    pub first: u8,
    pub second: u8,
    pub cycles: u64,
}

impl LatencySample {
    pub fn bit(&self) -> bool {
        self.cycles & 1 == 1
    }
}

/// Anything that produces raw (possibly biased) bits.
pub trait LatencySource {
    fn next_raw_bit(&mut self) -> ReramResult<bool>;
}

impl<T: LatencySource + ?Sized> LatencySource for &mut T {
    fn next_raw_bit(&mut self) -> ReramResult<bool> {
        (**self).next_raw_bit()
    }
}

/// Raw bits from overwrites at addresses and values picked by a seed
/// generator.
pub struct RandomWriteLatency<'m, 'a, S, P, C, G> {
    mem: &'m mut SpiMemory<'a, S, P, C>,
    seed: G,
    limit: PollLimit,
}

impl<'m, 'a, S: SpiBus, P: OutputPin, C: Clock, G: SeedSource>
    RandomWriteLatency<'m, 'a, S, P, C, G>
{
    pub fn new(mem: &'m mut SpiMemory<'a, S, P, C>, seed: G, limit: PollLimit) -> Self {
        Self { mem, seed, limit }
    }

    pub fn memory(&mut self) -> &mut SpiMemory<'a, S, P, C> {
        &mut *self.mem
    }

    pub fn seed(&mut self) -> &mut G {
        &mut self.seed
    }

    /// Pick a cell and two values, then time the overwrite.
    pub fn sample(&mut self) -> ReramResult<LatencySample> {
        let address = self.seed.range(0, self.mem.config().capacity)?;
        let first = self.seed.range(0, 256)? as u8;
        let second = self.seed.range(0, 256)? as u8;
        let cycles = measure_write_latency(self.mem, address, first, second, self.limit)?;
        Ok(LatencySample {
            address,
            first,
            second,
            cycles,
        })
    }
}

impl<S: SpiBus, P: OutputPin, C: Clock, G: SeedSource> LatencySource
    for RandomWriteLatency<'_, '_, S, P, C, G>
{
    fn next_raw_bit(&mut self) -> ReramResult<bool> {
        Ok(self.sample()?.bit())
    }
}
