/*++

Licensed under the Apache-2.0 license.

File Name:

    reram.rs

Abstract:

    File contains the software model of an SPI ReRAM device.

--*/

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reram_drivers::{MemoryConfig, Opcode, SpiBus};

use crate::SimClock;

/// How many status polls a committed write keeps the device busy for.
///
/// Values are the poll count the firmware will report, i.e. the device
/// answers busy `cycles - 1` times and idle on the next read.
pub enum LatencyProfile {
    /// Every write takes the same number of cycles.
    Fixed(u64),

    /// Cycle through a list of latencies, one per write.
    Scripted { cycles: Vec<u64>, next: usize },

    /// Uniformly random latency in `min..=max`.
    Jitter { rng: StdRng, min: u64, max: u64 },

    /// The device never finishes a write.
    NeverIdle,
}

impl LatencyProfile {
    pub fn scripted(cycles: impl Into<Vec<u64>>) -> Self {
        Self::Scripted {
            cycles: cycles.into(),
            next: 0,
        }
    }

    pub fn jitter(seed: u64, min: u64, max: u64) -> Self {
        Self::Jitter {
            rng: StdRng::seed_from_u64(seed),
            min,
            max: max.max(min),
        }
    }

    /// Busy status reads for the next write, `None` for forever.
    fn next_busy_reads(&mut self) -> Option<u64> {
        let cycles = match self {
            Self::Fixed(cycles) => *cycles,
            Self::Scripted { cycles, next } => {
                let Some(&c) = cycles.get(*next % cycles.len().max(1)) else {
                    return Some(0);
                };
                *next += 1;
                c
            }
            Self::Jitter { rng, min, max } => rng.gen_range(*min..=*max),
            Self::NeverIdle => return None,
        };
        Some(cycles.saturating_sub(1))
    }
}

/// Behavioral model of an SPI ReRAM part.
///
/// Tracks the array, the write enable latch, the busy time of the last write
/// and per-cell wear. Commands sent while the device is busy, or writes sent
/// without the latch set, are ignored like on the real part.
pub struct ReramModel {
    config: MemoryConfig,
    memory: Vec<u8>,
    wear: Vec<u32>,
    endurance: Option<u32>,
    stuck: HashSet<u32>,
    latency: LatencyProfile,

    write_enabled: bool,
    busy_reads: Option<u64>,
    powered_down: bool,
    status_extra: u8,

    clock: Option<(SimClock, u64)>,

    committed_writes: u64,
    status_reads: u64,
    transfers: u64,
}

impl ReramModel {
    pub fn new(config: MemoryConfig, latency: LatencyProfile) -> Self {
        let capacity = config.capacity as usize;
        Self {
            config,
            memory: vec![0; capacity],
            wear: vec![0; capacity],
            endurance: None,
            stuck: HashSet::new(),
            latency,
            write_enabled: false,
            busy_reads: Some(0),
            powered_down: false,
            status_extra: 0,
            clock: None,
            committed_writes: 0,
            status_reads: 0,
            transfers: 0,
        }
    }

    /// Advance `clock` by `ticks_per_transfer` on every SPI exchange.
    pub fn with_clock(mut self, clock: SimClock, ticks_per_transfer: u64) -> Self {
        self.clock = Some((clock, ticks_per_transfer));
        self
    }

    /// Cells stop accepting new values after `writes` committed writes.
    pub fn with_endurance(mut self, writes: u32) -> Self {
        self.endurance = Some(writes);
        self
    }

    /// Mark a cell as already worn out.
    pub fn stick(&mut self, address: u32) {
        self.stuck.insert(address);
    }

    pub fn is_stuck(&self, address: u32) -> bool {
        self.stuck.contains(&address)
    }

    /// Status bits other than WEL and WIP reported on every read.
    pub fn set_status_bits(&mut self, bits: u8) {
        self.status_extra = bits & !0b11;
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn wear(&self, address: u32) -> u32 {
        self.wear[address as usize]
    }

    pub fn write_enabled(&self) -> bool {
        self.write_enabled
    }

    pub fn is_busy(&self) -> bool {
        self.busy_reads != Some(0)
    }

    pub fn is_powered_down(&self) -> bool {
        self.powered_down
    }

    pub fn committed_writes(&self) -> u64 {
        self.committed_writes
    }

    pub fn status_reads(&self) -> u64 {
        self.status_reads
    }

    pub fn transfers(&self) -> u64 {
        self.transfers
    }

    fn decode_address(&self, bytes: &[u8]) -> Option<u32> {
        let width = self.config.address_width.bytes();
        let field = bytes.get(..width)?;
        let address = field
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
        Some(address % self.config.capacity)
    }

    fn status(&mut self) -> u8 {
        self.status_reads += 1;
        let busy = match &mut self.busy_reads {
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
            None => true,
        };
        self.status_extra | (u8::from(self.write_enabled) << 1) | u8::from(busy)
    }

    fn commit(&mut self, address: u32, values: &[u8]) {
        let capacity = self.config.capacity;
        for (i, &value) in values.iter().enumerate() {
            let cell = (address + i as u32) % capacity;
            let idx = cell as usize;
            if self.stuck.contains(&cell) {
                continue;
            }
            self.memory[idx] = value;
            self.wear[idx] = self.wear[idx].saturating_add(1);
            if self.endurance.is_some_and(|e| self.wear[idx] >= e) {
                self.stuck.insert(cell);
            }
        }
        self.committed_writes += 1;
        self.write_enabled = false;
        self.busy_reads = self.latency.next_busy_reads();
    }

    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) {
        rx.fill(0);
        let Some(&op) = tx.first() else {
            return;
        };

        if self.powered_down {
            if op == u8::from(Opcode::Res) {
                self.powered_down = false;
            }
            return;
        }

        if op == u8::from(Opcode::Rdsr) {
            let status = self.status();
            rx[1..].fill(status);
            return;
        }

        // Everything but RDSR is ignored until the current write completes.
        if self.is_busy() {
            return;
        }

        let width = self.config.address_width.bytes();
        match op {
            op if op == u8::from(Opcode::Wren) => self.write_enabled = true,
            op if op == u8::from(Opcode::Wrdi) => self.write_enabled = false,
            op if op == u8::from(Opcode::Pd) || op == u8::from(Opcode::Udpd) => {
                self.powered_down = true
            }
            op if op == u8::from(Opcode::Wr) => {
                let Some(address) = self.decode_address(&tx[1..]) else {
                    return;
                };
                if self.write_enabled && tx.len() > 1 + width {
                    self.commit(address, &tx[1 + width..]);
                }
            }
            op if op == u8::from(Opcode::Read) => {
                let Some(address) = self.decode_address(&tx[1..]) else {
                    return;
                };
                let capacity = self.config.capacity;
                for (i, out) in rx.iter_mut().enumerate().skip(1 + width) {
                    let cell = (address + (i - 1 - width) as u32) % capacity;
                    *out = self.memory[cell as usize];
                }
            }
            _ => {}
        }
    }
}

impl SpiBus for ReramModel {
    fn write_read(&mut self, _chip_select: u8, tx: &[u8], rx: &mut [u8]) -> usize {
        self.transfers += 1;
        if let Some((clock, ticks)) = &self.clock {
            clock.advance(*ticks);
        }
        let len = tx.len().min(rx.len());
        self.exchange(&tx[..len], &mut rx[..len]);
        len
    }

    fn write(&mut self, chip_select: u8, tx: &[u8]) -> usize {
        let mut rx = vec![0u8; tx.len()];
        self.write_read(chip_select, tx, &mut rx)
    }
}

/// Bus wrapper that starts dropping the last byte of every exchange after
/// `good_transfers` exchanges went through.
pub struct ShortTransfer<S> {
    pub inner: S,
    good_transfers: usize,
    transfers: usize,
}

impl<S> ShortTransfer<S> {
    pub fn new(inner: S, good_transfers: usize) -> Self {
        Self {
            inner,
            good_transfers,
            transfers: 0,
        }
    }

    fn shorten(&mut self, len: usize) -> usize {
        self.transfers += 1;
        if self.transfers > self.good_transfers {
            len.saturating_sub(1)
        } else {
            len
        }
    }
}

impl<S: SpiBus> SpiBus for ShortTransfer<S> {
    fn write_read(&mut self, chip_select: u8, tx: &[u8], rx: &mut [u8]) -> usize {
        let len = self.inner.write_read(chip_select, tx, rx);
        self.shorten(len)
    }

    fn write(&mut self, chip_select: u8, tx: &[u8]) -> usize {
        let len = self.inner.write(chip_select, tx);
        self.shorten(len)
    }
}
