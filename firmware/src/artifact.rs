/*++

Licensed under the Apache-2.0 license.

File Name:

    artifact.rs

Abstract:

    File contains helpers to name and write campaign result files.

--*/

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;

use reram_drivers::{ReramError, ReramResult, Storage};
use ufmt::uWrite;

/// Highest index tried when looking for an unused artifact name.
pub const MAX_ARTIFACT_INDEX: u32 = 10_000;

const FLUSH_THRESHOLD: usize = 4096;

/// First `<device>_<n>_<kind>.log` that does not exist yet.
pub fn free_artifact_name(
    storage: &mut dyn Storage,
    device: &str,
    kind: &str,
) -> ReramResult<String> {
    for n in 0..MAX_ARTIFACT_INDEX {
        let name = format!("{device}_{n}_{kind}.log");
        if !storage.exists(&name) {
            return Ok(name);
        }
    }
    Err(ReramError::FW_STORAGE_NO_FREE_NAME)
}

/// Buffered text writer over the open storage file.
///
/// Formatting never fails; the first storage error is kept and every write
/// after it is dropped, so a campaign can keep measuring and report the
/// failure once at the end.
pub struct ArtifactWriter<'s> {
    storage: &'s mut dyn Storage,
    name: String,
    buf: Vec<u8>,
    error: Option<ReramError>,
}

impl<'s> ArtifactWriter<'s> {
    /// Create `name`, replacing any existing file.
    pub fn create(storage: &'s mut dyn Storage, name: String) -> ReramResult<Self> {
        storage.create(&name)?;
        Ok(Self {
            storage,
            name,
            buf: Vec::with_capacity(FLUSH_THRESHOLD),
            error: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First storage error seen so far.
    pub fn error(&self) -> Option<ReramError> {
        self.error
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.error.is_some() {
            return;
        }
        self.buf.extend_from_slice(bytes);
        if self.buf.len() >= FLUSH_THRESHOLD {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.error.is_none() && !self.buf.is_empty() {
            if let Err(e) = self.storage.append(&self.buf) {
                self.error = Some(e);
            }
        }
        self.buf.clear();
    }

    /// Flush and close the file. Returns the first error of the whole
    /// write, or the close error.
    pub fn finish(mut self) -> ReramResult<()> {
        self.flush();
        let closed = self.storage.close();
        match self.error {
            Some(e) => Err(e),
            None => closed,
        }
    }
}

impl uWrite for ArtifactWriter<'_> {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}
