/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains API and macros used by the firmware for error handling

--*/
#![cfg_attr(not(feature = "std"), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// ReRAM firmware error type
///
/// The upper 16 bits of the code select the component that raised the error,
/// the lower 16 bits the condition within that component.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ReramError(pub NonZeroU32);

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, doc) tuples and generates
/// constant definitions for each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: ReramError = ReramError::new_const($value);
        )*

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

/// Component identifiers stored in the upper half of an error code.
const COMPONENT_SPI: u32 = 0x0001;
const COMPONENT_RERAM: u32 = 0x0002;
const COMPONENT_ENTROPY: u32 = 0x0003;
const COMPONENT_STORAGE: u32 = 0x0004;
const COMPONENT_CONFIG: u32 = 0x0005;
const COMPONENT_CAMPAIGN: u32 = 0x0006;

impl ReramError {
    /// Create an error; intended to only be used from const contexts, as we don't want
    /// runtime panics if val is zero. The preferred way to get a ReramError from a u32 is to
    /// use `ReramError::try_from()` from the `TryFrom` trait impl.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("ReramError cannot be 0"),
        }
    }

    define_error_constants![
        (
            DRIVER_SPI_TRANSFER_INCOMPLETE,
            0x0001_0001,
            "Driver Error: SPI exchange moved fewer bytes than requested"
        ),
        (
            DRIVER_RERAM_ADDRESS_OUT_OF_RANGE,
            0x0002_0001,
            "Driver Error: ReRAM address outside the configured capacity"
        ),
        (
            DRIVER_RERAM_WIP_POLL_TIMEOUT,
            0x0002_0002,
            "Driver Error: ReRAM write still in progress when the poll limit ran out"
        ),
        (
            DRIVER_RERAM_WEL_POLL_TIMEOUT,
            0x0002_0003,
            "Driver Error: ReRAM write enable latch not observed before the poll limit"
        ),
        (
            DRIVER_RERAM_BULK_WRITE_EMPTY,
            0x0002_0004,
            "Driver Error: ReRAM bulk write without any value bytes"
        ),
        (
            DRIVER_RERAM_BULK_WRITE_TOO_LARGE,
            0x0002_0005,
            "Driver Error: ReRAM bulk write frame exceeds the transfer buffer"
        ),
        (
            ENTROPY_VON_NEUMANN_EXHAUSTED_TRIES,
            0x0003_0001,
            "Entropy Error: no differing bit pair within the try budget"
        ),
        (
            ENTROPY_SEED_INVALID_RANGE,
            0x0003_0002,
            "Entropy Error: seed range is empty"
        ),
        (
            FW_STORAGE_MOUNT_FAILED,
            0x0004_0001,
            "Storage Error: cannot mount drive"
        ),
        (
            FW_STORAGE_CREATE_FAILED,
            0x0004_0002,
            "Storage Error: cannot create file"
        ),
        (
            FW_STORAGE_WRITE_FAILED,
            0x0004_0003,
            "Storage Error: short or failed write"
        ),
        (
            FW_STORAGE_CLOSE_FAILED,
            0x0004_0004,
            "Storage Error: cannot close file"
        ),
        (
            FW_STORAGE_READ_FAILED,
            0x0004_0005,
            "Storage Error: cannot read file"
        ),
        (
            FW_STORAGE_NO_FREE_NAME,
            0x0004_0006,
            "Storage Error: every artifact name candidate is taken"
        ),
        (
            FW_CONFIG_MALFORMED_LINE,
            0x0005_0001,
            "Config Error: line is not a key=value pair"
        ),
        (
            FW_CONFIG_UNKNOWN_KEY,
            0x0005_0002,
            "Config Error: unknown key"
        ),
        (
            FW_CONFIG_INVALID_NUMBER,
            0x0005_0003,
            "Config Error: value is not a valid number"
        ),
        (
            FW_CONFIG_UNKNOWN_MODE,
            0x0005_0004,
            "Config Error: unknown run mode"
        ),
        (
            FW_CONFIG_UNKNOWN_DEVICE,
            0x0005_0005,
            "Config Error: unknown memory device"
        ),
        (
            FW_CONFIG_NOT_UTF8,
            0x0005_0006,
            "Config Error: properties file is not valid UTF-8"
        ),
        (
            FW_CONFIG_DEVICE_MISMATCH,
            0x0005_0007,
            "Config Error: properties file was written for another part"
        ),
        (
            FW_CONFIG_FILE_TOO_LARGE,
            0x0005_0008,
            "Config Error: properties file exceeds the read buffer"
        ),
        (
            FW_CONFIG_VALUE_OUT_OF_RANGE,
            0x0005_0009,
            "Config Error: value is outside the accepted range"
        ),
        (
            FW_CAMPAIGN_CANNOT_BURN_OUT,
            0x0006_0001,
            "Campaign Error: part does not wear out"
        ),
        (
            FW_CAMPAIGN_SELFTEST_MISMATCH,
            0x0006_0002,
            "Campaign Error: cell did not read back the written value"
        ),
    ];

    /// Component half of the error code.
    pub const fn component(&self) -> u32 {
        self.0.get() >> 16
    }

    /// Bus exchange failed; fatal to the calling operation.
    pub fn is_transport(&self) -> bool {
        self.component() == COMPONENT_SPI
    }

    /// A poll limit ran out; the measurement failed but the device is usable.
    pub fn is_timeout(&self) -> bool {
        *self == Self::DRIVER_RERAM_WIP_POLL_TIMEOUT || *self == Self::DRIVER_RERAM_WEL_POLL_TIMEOUT
    }

    /// The debiaser gave up on this bit.
    pub fn is_exhausted_tries(&self) -> bool {
        *self == Self::ENTROPY_VON_NEUMANN_EXHAUSTED_TRIES
    }

    /// An artifact could not be created, written or closed.
    pub fn is_storage(&self) -> bool {
        self.component() == COMPONENT_STORAGE
    }

    pub fn is_config(&self) -> bool {
        self.component() == COMPONENT_CONFIG
    }

    pub fn is_device(&self) -> bool {
        self.component() == COMPONENT_RERAM
    }

    pub fn is_entropy(&self) -> bool {
        self.component() == COMPONENT_ENTROPY
    }

    pub fn is_campaign(&self) -> bool {
        self.component() == COMPONENT_CAMPAIGN
    }
}

impl From<core::num::NonZeroU32> for crate::ReramError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::ReramError(val)
    }
}

impl From<ReramError> for core::num::NonZeroU32 {
    fn from(val: ReramError) -> Self {
        val.0
    }
}

impl From<ReramError> for u32 {
    fn from(val: ReramError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for ReramError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(ReramError(val)),
            Err(err) => Err(err),
        }
    }
}

pub type ReramResult<T> = Result<T, ReramError>;
