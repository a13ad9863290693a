/*++

Licensed under the Apache-2.0 license.

File Name:

    memory_config.rs

Abstract:

    File contains the per-part parameters of the supported ReRAM devices.

References:
    Adesto RM25C512C datasheet DS-RM25C512C_079
    Fujitsu MB85AS4MT datasheet DS501-00045-1v0-E

--*/

use reram_error::{ReramError, ReramResult};

/// Largest address field any supported part uses.
pub const MAX_ADDRESS_BYTES: usize = 3;

/// Width of the address field sent after an opcode.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AddressWidth {
    Two = 2,
    Three = 3,
}

impl AddressWidth {
    /// Narrowest field that can address `capacity` bytes.
    pub const fn for_capacity(capacity: u32) -> Self {
        if capacity <= 0x1_0000 {
            Self::Two
        } else {
            Self::Three
        }
    }

    pub const fn bytes(self) -> usize {
        self as usize
    }
}

/// Memory device parameters, selected once at startup.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MemoryConfig {
    /// Full part number.
    pub name: &'static str,

    /// Short name used in artifact file names.
    pub short_name: &'static str,

    /// Number of addressable bytes.
    pub capacity: u32,

    /// Address field width, derived from `capacity`.
    pub address_width: AddressWidth,

    /// Datasheet access time.
    pub access_time_ns: u32,

    /// Whether cells of this part can be worn out in reasonable time.
    pub can_burn_out: bool,
}

impl MemoryConfig {
    pub const ADESTO_RM25C512C: Self = Self::new(
        "RERAM_ADESTO_RM25C512C_LTAI_T",
        "Adesto",
        65536,
        150,
        true,
    );

    /// Adesto part restricted to the first 512 cells, as wired on the
    /// evaluation board.
    pub const ADESTO_RM25C512C_EVAL: Self = Self::new(
        "RERAM_ADESTO_RM25C512C_LTAI_T",
        "Adesto",
        512,
        150,
        true,
    );

    pub const FUJITSU_MB85AS4MT: Self = Self::new(
        "RERAM_FUJITSU_MB85AS4MTPF_G_BCERE1",
        "Fujitsu",
        524288,
        150,
        false,
    );

    pub const fn new(
        name: &'static str,
        short_name: &'static str,
        capacity: u32,
        access_time_ns: u32,
        can_burn_out: bool,
    ) -> Self {
        Self {
            name,
            short_name,
            capacity,
            address_width: AddressWidth::for_capacity(capacity),
            access_time_ns,
            can_burn_out,
        }
    }

    /// Look up a part by the name used in `params.properties`.
    pub fn by_key(key: &str) -> Option<Self> {
        match key {
            "adesto" => Some(Self::ADESTO_RM25C512C),
            "adesto-eval" => Some(Self::ADESTO_RM25C512C_EVAL),
            "fujitsu" => Some(Self::FUJITSU_MB85AS4MT),
            _ => None,
        }
    }

    pub fn contains(&self, address: u32) -> bool {
        address < self.capacity
    }

    /// Write `address` big-endian into the front of `out`.
    ///
    /// Returns the number of bytes written.
    pub fn encode_address(&self, address: u32, out: &mut [u8]) -> ReramResult<usize> {
        if !self.contains(address) {
            return Err(ReramError::DRIVER_RERAM_ADDRESS_OUT_OF_RANGE);
        }
        let width = self.address_width.bytes();
        let be = address.to_be_bytes();
        out[..width].copy_from_slice(&be[be.len() - width..]);
        Ok(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_width_for_capacity() {
        assert_eq!(AddressWidth::for_capacity(512), AddressWidth::Two);
        assert_eq!(AddressWidth::for_capacity(65536), AddressWidth::Two);
        assert_eq!(AddressWidth::for_capacity(65537), AddressWidth::Three);
        assert_eq!(
            MemoryConfig::FUJITSU_MB85AS4MT.address_width,
            AddressWidth::Three
        );
        assert_eq!(
            MemoryConfig::ADESTO_RM25C512C.address_width,
            AddressWidth::Two
        );
    }

    #[test]
    fn test_encode_address() {
        let mut buf = [0u8; MAX_ADDRESS_BYTES];

        let n = MemoryConfig::ADESTO_RM25C512C
            .encode_address(0xBEEF, &mut buf)
            .unwrap();
        assert_eq!(&buf[..n], &[0xBE, 0xEF]);

        let n = MemoryConfig::FUJITSU_MB85AS4MT
            .encode_address(0x07_1234, &mut buf)
            .unwrap();
        assert_eq!(&buf[..n], &[0x07, 0x12, 0x34]);
    }

    #[test]
    fn test_encode_address_out_of_range() {
        let mut buf = [0u8; MAX_ADDRESS_BYTES];
        assert_eq!(
            MemoryConfig::ADESTO_RM25C512C_EVAL.encode_address(512, &mut buf),
            Err(ReramError::DRIVER_RERAM_ADDRESS_OUT_OF_RANGE)
        );
        assert_eq!(
            MemoryConfig::FUJITSU_MB85AS4MT.encode_address(524288, &mut buf),
            Err(ReramError::DRIVER_RERAM_ADDRESS_OUT_OF_RANGE)
        );
        MemoryConfig::ADESTO_RM25C512C_EVAL
            .encode_address(511, &mut buf)
            .unwrap();
    }

    #[test]
    fn test_by_key() {
        assert_eq!(
            MemoryConfig::by_key("fujitsu"),
            Some(MemoryConfig::FUJITSU_MB85AS4MT)
        );
        assert_eq!(MemoryConfig::by_key("adesto-eval").unwrap().capacity, 512);
        assert_eq!(MemoryConfig::by_key("macronix"), None);
    }
}
