/*++

Licensed under the Apache-2.0 license.

File Name:

    spi_memory.rs

Abstract:

    File contains API for the SPI attached ReRAM: command framing, the write
    enable latch and write-in-progress polling.

--*/

use crate::wait::PollBudget;
use crate::{
    Clock, HwContext, Level, MemoryConfig, OutputPin, PollLimit, SpiBus, StatusRegister,
    MAX_ADDRESS_BYTES,
};
use reram_error::{ReramError, ReramResult};

/// Largest number of value bytes a single bulk write frame may carry.
pub const MAX_BULK_VALUES: usize = 256;

const MAX_FRAME: usize = 1 + MAX_ADDRESS_BYTES + MAX_BULK_VALUES;

/// ReRAM instruction set
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Opcode {
    /// Write Status Register
    Wrsr = 0x01,
    /// Write Memory
    Wr = 0x02,
    /// Read Memory
    Read = 0x03,
    /// Fast Read Memory
    Fread = 0x0B,
    /// Write Disable
    Wrdi = 0x04,
    /// Read Status Register
    Rdsr = 0x05,
    /// Write Enable
    Wren = 0x06,
    /// Page Erase
    Pers = 0x42,
    /// Chip Erase
    Cers = 0x60,
    /// Power Down
    Pd = 0xB9,
    /// Ultra Deep Power Down
    Udpd = 0x79,
    /// Resume From Power Down
    Res = 0xAB,
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> Self {
        op as u8
    }
}

/// Whether to confirm the write enable latch after sending WREN.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WelCheck {
    /// Fire and forget.
    Skip,

    /// Read status until the latch shows as set. Hangs if the device never
    /// reports it.
    PollForever,

    /// Read status at most this many times.
    Bounded(u64),
}

/// SPI ReRAM device
pub struct SpiMemory<'a, S, P, C> {
    hw: &'a mut HwContext<S, P, C>,
    config: MemoryConfig,
}

impl<'a, S: SpiBus, P: OutputPin, C: Clock> SpiMemory<'a, S, P, C> {
    pub fn new(hw: &'a mut HwContext<S, P, C>, config: MemoryConfig) -> Self {
        Self { hw, config }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.hw.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.hw.clock
    }

    /// Read and decode the status register
    pub fn read_status(&mut self) -> ReramResult<StatusRegister> {
        let tx = [u8::from(Opcode::Rdsr), 0];
        let mut rx = [0u8; 2];
        self.write_read(&tx, &mut rx)?;
        Ok(StatusRegister::decode(rx[1]))
    }

    /// Set the write enable latch. The device clears it again after every
    /// completed write, so each write needs a fresh WREN.
    ///
    /// # Arguments
    ///
    /// * `check` - Whether and how long to wait for the latch to show in the
    ///   status register
    pub fn set_write_enable_latch(&mut self, check: WelCheck) -> ReramResult<()> {
        self.hw.write_enable.write(Level::Low);
        let result = self.write(&[u8::from(Opcode::Wren)]);
        self.hw.write_enable.write(Level::High);
        result?;

        let limit = match check {
            WelCheck::Skip => return Ok(()),
            WelCheck::PollForever => PollLimit::Forever,
            WelCheck::Bounded(n) => PollLimit::Cycles(n),
        };
        let mut budget = PollBudget::new(limit, || 0);
        while !budget.exhausted(|| 0) {
            budget.next_attempt();
            if self.read_status()?.write_enabled() {
                return Ok(());
            }
        }
        Err(ReramError::DRIVER_RERAM_WEL_POLL_TIMEOUT)
    }

    /// Write a single byte
    ///
    /// Returns as soon as the frame is on the bus; the device is then busy
    /// until [`Self::poll_until_idle`] sees the write finish.
    pub fn write_byte(&mut self, address: u32, value: u8) -> ReramResult<()> {
        self.write_bytes(address, &[value])
    }

    /// Write `values` starting at `address`; the device increments the address
    /// internally.
    pub fn write_bytes(&mut self, address: u32, values: &[u8]) -> ReramResult<()> {
        if values.is_empty() {
            return Err(ReramError::DRIVER_RERAM_BULK_WRITE_EMPTY);
        }
        if values.len() > MAX_BULK_VALUES {
            return Err(ReramError::DRIVER_RERAM_BULK_WRITE_TOO_LARGE);
        }

        let mut frame = [0u8; MAX_FRAME];
        frame[0] = Opcode::Wr.into();
        let header = 1 + self.config.encode_address(address, &mut frame[1..])?;
        let len = header + values.len();
        frame[header..len].copy_from_slice(values);

        self.set_write_enable_latch(WelCheck::Skip)?;
        self.hw.write_enable.write(Level::Low);
        let result = self.write(&frame[..len]);
        self.hw.write_enable.write(Level::High);
        result
    }

    /// Read a single byte
    pub fn read_byte(&mut self, address: u32) -> ReramResult<u8> {
        let mut tx = [0u8; 1 + MAX_ADDRESS_BYTES + 1];
        tx[0] = Opcode::Read.into();
        let len = 1 + self.config.encode_address(address, &mut tx[1..])? + 1;

        let mut rx = [0u8; 1 + MAX_ADDRESS_BYTES + 1];
        self.write_read(&tx[..len], &mut rx[..len])?;
        Ok(rx[len - 1])
    }

    /// Poll the status register until the write in progress bit clears.
    ///
    /// Returns the number of status reads it took, counting the one that saw
    /// the device idle. That count is the write latency sample, so the loop
    /// does nothing but the status exchange and the limit check.
    pub fn poll_until_idle(&mut self, limit: PollLimit) -> ReramResult<u64> {
        let mut budget = PollBudget::new(limit, || self.hw.clock.now_ticks());
        while !budget.exhausted(|| self.hw.clock.now_ticks()) {
            let cycle = budget.next_attempt();
            if !self.read_status()?.write_in_progress() {
                return Ok(cycle);
            }
        }
        Err(ReramError::DRIVER_RERAM_WIP_POLL_TIMEOUT)
    }

    /// Write a byte and wait for the device to commit it.
    pub fn write_and_poll(
        &mut self,
        address: u32,
        value: u8,
        limit: PollLimit,
    ) -> ReramResult<u64> {
        self.write_byte(address, value)?;
        self.poll_until_idle(limit)
    }

    /// Reset the write enable latch
    pub fn write_disable(&mut self) -> ReramResult<()> {
        self.write(&[u8::from(Opcode::Wrdi)])
    }

    /// Enter power down mode
    pub fn power_down(&mut self) -> ReramResult<()> {
        self.write(&[u8::from(Opcode::Pd)])
    }

    /// Resume from power down mode
    pub fn resume(&mut self) -> ReramResult<()> {
        self.write(&[u8::from(Opcode::Res)])
    }

    fn write(&mut self, tx: &[u8]) -> ReramResult<()> {
        if self.hw.spi.write(self.hw.chip_select, tx) != tx.len() {
            return Err(ReramError::DRIVER_SPI_TRANSFER_INCOMPLETE);
        }
        Ok(())
    }

    fn write_read(&mut self, tx: &[u8], rx: &mut [u8]) -> ReramResult<()> {
        if self.hw.spi.write_read(self.hw.chip_select, tx, rx) != tx.len() {
            return Err(ReramError::DRIVER_SPI_TRANSFER_INCOMPLETE);
        }
        Ok(())
    }
}
