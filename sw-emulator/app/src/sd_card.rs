/*++

Licensed under the Apache-2.0 license.

File Name:

    sd_card.rs

Abstract:

    File contains a host directory standing in for the board's SD card.

--*/

use reram_drivers::{ReramError, ReramResult, Storage};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// SD card backed by a host directory.
pub struct SdCard {
    root: PathBuf,
    mounted: bool,
    open: Option<File>,
}

impl SdCard {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            mounted: false,
            open: None,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for SdCard {
    fn mount(&mut self) -> ReramResult<()> {
        if !self.root.is_dir() {
            return Err(ReramError::FW_STORAGE_MOUNT_FAILED);
        }
        self.mounted = true;
        Ok(())
    }

    fn exists(&mut self, path: &str) -> bool {
        self.mounted && self.path(path).exists()
    }

    fn create(&mut self, path: &str) -> ReramResult<()> {
        if !self.mounted || self.open.is_some() {
            return Err(ReramError::FW_STORAGE_CREATE_FAILED);
        }
        let file =
            File::create(self.path(path)).map_err(|_| ReramError::FW_STORAGE_CREATE_FAILED)?;
        self.open = Some(file);
        Ok(())
    }

    fn append(&mut self, bytes: &[u8]) -> ReramResult<()> {
        self.open
            .as_mut()
            .ok_or(ReramError::FW_STORAGE_WRITE_FAILED)?
            .write_all(bytes)
            .map_err(|_| ReramError::FW_STORAGE_WRITE_FAILED)
    }

    fn close(&mut self) -> ReramResult<()> {
        let mut file = self.open.take().ok_or(ReramError::FW_STORAGE_CLOSE_FAILED)?;
        file.flush()
            .and_then(|_| file.sync_all())
            .map_err(|_| ReramError::FW_STORAGE_CLOSE_FAILED)
    }

    fn read(&mut self, path: &str, buf: &mut [u8]) -> ReramResult<usize> {
        if !self.mounted {
            return Err(ReramError::FW_STORAGE_READ_FAILED);
        }
        let mut file =
            File::open(self.path(path)).map_err(|_| ReramError::FW_STORAGE_READ_FAILED)?;
        let mut len = 0;
        while len < buf.len() {
            match file.read(&mut buf[len..]) {
                Ok(0) => break,
                Ok(n) => len += n,
                Err(_) => return Err(ReramError::FW_STORAGE_READ_FAILED),
            }
        }
        Ok(len)
    }
}

/// Create `root` if it does not exist yet.
pub fn prepare(root: &Path) -> std::io::Result<()> {
    fs::create_dir_all(root)
}
