// Licensed under the Apache-2.0 license

/// Board wiring and bus settings.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BoardConfig {
    /// Core clock feeding the SPI block.
    pub core_clock_hz: u32,

    /// Core clock divisor for SPI0. 256 is too fast for the Adesto part.
    pub spi_clock_divisor: u32,

    /// SPI chip select the memory is wired to.
    pub chip_select: u8,

    /// GPIO driving the memory's write-enable input.
    pub write_enable_pin: u8,

    /// GPIO driving the activity LED.
    pub status_led_pin: u8,
}

impl BoardConfig {
    pub const DEFAULT: Self = Self {
        core_clock_hz: 250_000_000,
        spi_clock_divisor: 512,
        chip_select: 0,
        write_enable_pin: 25,
        status_led_pin: 47,
    };

    /// SPI clock in Hz.
    pub fn spi_frequency(&self) -> u32 {
        self.core_clock_hz / self.spi_clock_divisor.max(1)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
