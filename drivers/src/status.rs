/*++

Licensed under the Apache-2.0 license.

File Name:

    status.rs

Abstract:

    File contains the ReRAM status register layout.

--*/

use bitfield::bitfield;
use ufmt::{uDisplay, uWrite};

bitfield! {
    /// ReRAM status register, as returned by RDSR
    ///
    /// Bit 4 is reserved; it is kept in the raw value but has no accessor.
    #[derive(Copy, Clone, Default, PartialEq, Eq)]
    pub struct StatusRegister(u8);
    impl Debug;

    /// Status register writes are blocked while the WP pin is low
    pub write_protect, set_write_protect: 7;

    /// Device powers down automatically after each access
    pub auto_power_down, set_auto_power_down: 6;

    /// Low power standby mode
    pub low_power_standby, set_low_power_standby: 5;

    /// Size of the write-protected block
    pub u8, block_protection, set_block_protection: 3, 2;

    /// Array and status register are writable
    pub write_enabled, set_write_enabled: 1;

    /// Device is still committing a write
    pub write_in_progress, set_write_in_progress: 0;
}

impl StatusRegister {
    /// Bits with no named field.
    pub const RESERVED_MASK: u8 = 0b0001_0000;

    /// Decode a raw status byte. Every byte value is a valid register.
    pub const fn decode(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u8 {
        self.0
    }

    /// Human readable report for diagnostics.
    pub fn report(&self) -> StatusReport {
        StatusReport(*self)
    }
}

impl From<u8> for StatusRegister {
    fn from(raw: u8) -> Self {
        Self::decode(raw)
    }
}

impl From<StatusRegister> for u8 {
    fn from(reg: StatusRegister) -> Self {
        reg.raw()
    }
}

/// Multi-line rendering of a [`StatusRegister`].
pub struct StatusReport(pub StatusRegister);

impl uDisplay for StatusReport {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        let reg = &self.0;
        ufmt::uwriteln!(f, "Write_Protect_Enable: {}", reg.write_protect() as u8)?;
        ufmt::uwriteln!(f, "Auto_Power_Down_Enable: {}", reg.auto_power_down() as u8)?;
        ufmt::uwriteln!(
            f,
            "Low_Power_Standby_Enable: {}",
            reg.low_power_standby() as u8
        )?;
        ufmt::uwriteln!(f, "Block_Protection_Bits: {}", reg.block_protection())?;
        ufmt::uwriteln!(f, "Write_Enable_Bit: {}", reg.write_enabled() as u8)?;
        ufmt::uwriteln!(f, "Write_In_Progress_Bit: {}", reg.write_in_progress() as u8)
    }
}
