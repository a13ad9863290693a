// Licensed under the Apache-2.0 license

use std::collections::{BTreeMap, HashSet};

use reram_drivers::Storage;
use reram_error::{ReramError, ReramResult};

/// Storage operation that can be made to fail.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StorageFault {
    Mount,
    Create,
    Append,
    Close,
}

/// In-memory stand-in for the SD card file system.
#[derive(Debug, Default)]
pub struct MemStorage {
    files: BTreeMap<String, Vec<u8>>,
    open: Option<String>,
    mounted: bool,
    faults: HashSet<StorageFault>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `fault` operation fail.
    pub fn inject(&mut self, fault: StorageFault) {
        self.faults.insert(fault);
    }

    pub fn insert(&mut self, path: &str, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// File contents as text; panics on a missing or non UTF-8 file.
    pub fn text(&self, path: &str) -> &str {
        match self.file(path).map(std::str::from_utf8) {
            Some(Ok(text)) => text,
            Some(Err(e)) => panic!("{path} is not UTF-8: {e}"),
            None => panic!("{path} does not exist; have {:?}", self.paths()),
        }
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn check(&self, fault: StorageFault, err: ReramError) -> ReramResult<()> {
        if self.faults.contains(&fault) {
            return Err(err);
        }
        Ok(())
    }
}

impl Storage for MemStorage {
    fn mount(&mut self) -> ReramResult<()> {
        self.check(StorageFault::Mount, ReramError::FW_STORAGE_MOUNT_FAILED)?;
        self.mounted = true;
        Ok(())
    }

    fn exists(&mut self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn create(&mut self, path: &str) -> ReramResult<()> {
        if !self.mounted || self.open.is_some() {
            return Err(ReramError::FW_STORAGE_CREATE_FAILED);
        }
        self.check(StorageFault::Create, ReramError::FW_STORAGE_CREATE_FAILED)?;
        self.files.insert(path.into(), Vec::new());
        self.open = Some(path.into());
        Ok(())
    }

    fn append(&mut self, bytes: &[u8]) -> ReramResult<()> {
        self.check(StorageFault::Append, ReramError::FW_STORAGE_WRITE_FAILED)?;
        let file = self
            .open
            .as_ref()
            .and_then(|path| self.files.get_mut(path))
            .ok_or(ReramError::FW_STORAGE_WRITE_FAILED)?;
        file.extend_from_slice(bytes);
        Ok(())
    }

    fn close(&mut self) -> ReramResult<()> {
        // The handle is released even when the close reports failure.
        let was_open = self.open.take().is_some();
        self.check(StorageFault::Close, ReramError::FW_STORAGE_CLOSE_FAILED)?;
        if !was_open {
            return Err(ReramError::FW_STORAGE_CLOSE_FAILED);
        }
        Ok(())
    }

    fn read(&mut self, path: &str, buf: &mut [u8]) -> ReramResult<usize> {
        if !self.mounted {
            return Err(ReramError::FW_STORAGE_READ_FAILED);
        }
        let file = self
            .files
            .get(path)
            .ok_or(ReramError::FW_STORAGE_READ_FAILED)?;
        let len = file.len().min(buf.len());
        buf[..len].copy_from_slice(&file[..len]);
        Ok(len)
    }
}
