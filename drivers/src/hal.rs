/*++

Licensed under the Apache-2.0 license.

File Name:

    hal.rs

Abstract:

    File contains the board primitives the drivers are built on: SPI master,
    GPIO output, system timer and log output. The board support package
    implements these; tests use the software model.

--*/

use reram_error::ReramResult;

/// SPI master with hardware chip select.
///
/// Both methods return the number of bytes actually shifted. The drivers treat
/// any count other than the requested frame length as a fatal bus error.
pub trait SpiBus {
    /// Shift `tx` out while capturing the same number of bytes into `rx`.
    fn write_read(&mut self, chip_select: u8, tx: &[u8], rx: &mut [u8]) -> usize;

    /// Shift `tx` out, discarding whatever the device drives back.
    fn write(&mut self, chip_select: u8, tx: &[u8]) -> usize;
}

/// GPIO output level
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Level {
    Low,
    High,
}

/// GPIO pin configured as output.
pub trait OutputPin {
    fn write(&mut self, level: Level);
}

/// Free running system timer.
pub trait Clock {
    /// Ticks since boot. One tick is one microsecond on the reference board.
    fn now_ticks(&self) -> u64;

    /// Block for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);
}

/// Destination for log output (UART on hardware).
pub trait LogSink {
    fn write_str(&mut self, s: &str);
}

/// FAT file system on the SD card.
///
/// At most one file is open for writing at a time, mirroring the single
/// `FIL` object the firmware works with.
pub trait Storage {
    /// Mount the drive. Must succeed before any other call.
    fn mount(&mut self) -> ReramResult<()>;

    fn exists(&mut self, path: &str) -> bool;

    /// Create (or truncate) `path` and make it the open file.
    fn create(&mut self, path: &str) -> ReramResult<()>;

    /// Append to the open file.
    fn append(&mut self, bytes: &[u8]) -> ReramResult<()>;

    /// Flush and close the open file.
    fn close(&mut self) -> ReramResult<()>;

    /// Read `path` into `buf`, returning the number of bytes read.
    fn read(&mut self, path: &str, buf: &mut [u8]) -> ReramResult<usize>;

    /// Create `path` holding exactly `bytes`.
    fn write_file(&mut self, path: &str, bytes: &[u8]) -> ReramResult<()> {
        self.create(path)?;
        let written = self.append(bytes);
        let closed = self.close();
        written.and(closed)
    }
}

impl<T: SpiBus + ?Sized> SpiBus for &mut T {
    fn write_read(&mut self, chip_select: u8, tx: &[u8], rx: &mut [u8]) -> usize {
        (**self).write_read(chip_select, tx, rx)
    }

    fn write(&mut self, chip_select: u8, tx: &[u8]) -> usize {
        (**self).write(chip_select, tx)
    }
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn write(&mut self, level: Level) {
        (**self).write(level)
    }
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_ticks(&self) -> u64 {
        (**self).now_ticks()
    }

    fn sleep_ms(&mut self, ms: u32) {
        (**self).sleep_ms(ms)
    }
}

impl<T: LogSink + ?Sized> LogSink for &mut T {
    fn write_str(&mut self, s: &str) {
        (**self).write_str(s)
    }
}

impl<T: Storage + ?Sized> Storage for &mut T {
    fn mount(&mut self) -> ReramResult<()> {
        (**self).mount()
    }

    fn exists(&mut self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn create(&mut self, path: &str) -> ReramResult<()> {
        (**self).create(path)
    }

    fn append(&mut self, bytes: &[u8]) -> ReramResult<()> {
        (**self).append(bytes)
    }

    fn close(&mut self) -> ReramResult<()> {
        (**self).close()
    }

    fn read(&mut self, path: &str, buf: &mut [u8]) -> ReramResult<usize> {
        (**self).read(path, buf)
    }
}

/// Hardware handles needed to talk to the memory device.
///
/// Owned by the board bring-up code and lent to the drivers by `&mut`; there is
/// no global instance.
pub struct HwContext<S, P, C> {
    /// SPI master the device hangs off.
    pub spi: S,

    /// Active-low write-enable line.
    pub write_enable: P,

    /// System timer.
    pub clock: C,

    /// Chip select the device is wired to.
    pub chip_select: u8,
}

impl<S: SpiBus, P: OutputPin, C: Clock> HwContext<S, P, C> {
    pub fn new(spi: S, write_enable: P, clock: C, chip_select: u8) -> Self {
        Self {
            spi,
            write_enable,
            clock,
            chip_select,
        }
    }
}
