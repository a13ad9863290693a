/*++

Licensed under the Apache-2.0 license.

File Name:

    printer.rs

Abstract:

    File contains support routines and macros to print to the log sink

--*/
use core::convert::Infallible;
use ufmt::{uDisplay, uWrite};

use crate::LogSink;

pub struct Printer<'a, L: LogSink + ?Sized>(&'a mut L);

impl<'a, L: LogSink + ?Sized> Printer<'a, L> {
    pub fn new(sink: &'a mut L) -> Self {
        Self(sink)
    }
}

impl<L: LogSink + ?Sized> uWrite for Printer<'_, L> {
    type Error = Infallible;

    /// Writes a string slice into this writer, returning whether the write succeeded.
    #[inline(never)]
    fn write_str(&mut self, str: &str) -> Result<(), Self::Error> {
        self.0.write_str(str);
        Ok(())
    }
}

#[macro_export]
macro_rules! cprint {
    ($sink:expr, $($tt:tt)*) => {{
        let _ = ufmt::uwrite!(&mut $crate::printer::Printer::new($sink), $($tt)*);
    }}
}

#[macro_export]
macro_rules! cprintln {
    ($sink:expr, $($tt:tt)*) => {{
        let _ = ufmt::uwriteln!(&mut $crate::printer::Printer::new($sink), $($tt)*);
    }}
}

pub struct HexBytes<'a>(pub &'a [u8]);
impl uDisplay for HexBytes<'_> {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        for &x in self.0.iter() {
            let c = x >> 4;
            if c < 10 {
                f.write_char((c + b'0') as char)?;
            } else {
                f.write_char((c - 10 + b'A') as char)?;
            }
            let c = x & 0xf;
            if c < 10 {
                f.write_char((c + b'0') as char)?;
            } else {
                f.write_char((c - 10 + b'A') as char)?;
            }
        }
        Ok(())
    }
}

/// Log sink printing to the host's stdout.
#[cfg(feature = "std")]
#[derive(Default)]
pub struct StdoutSink;

#[cfg(feature = "std")]
impl LogSink for StdoutSink {
    fn write_str(&mut self, str: &str) {
        print!("{str}");
    }
}
