/*++

Licensed under the Apache-2.0 license.

File Name:

    mt19937.rs

Abstract:

    File contains the MT19937 generator used to pick addresses and values.
    It only decides *where* and *what* to write; the entropy comes from the
    device timing.

References:
    M. Matsumoto, T. Nishimura, "Mersenne Twister: A 623-dimensionally
    equidistributed uniform pseudorandom number generator", 1998

--*/

use reram_error::{ReramError, ReramResult};

/// Source of addresses and values for the write latency measurements.
pub trait SeedSource {
    fn next_u32(&mut self) -> u32;

    /// Value in `lo..hi`.
    fn range(&mut self, lo: u32, hi: u32) -> ReramResult<u32> {
        if hi <= lo {
            return Err(ReramError::ENTROPY_SEED_INVALID_RANGE);
        }
        Ok(lo + self.next_u32() % (hi - lo))
    }

    fn next_u8(&mut self) -> u8 {
        (self.next_u32() & 0xFF) as u8
    }
}

impl<T: SeedSource + ?Sized> SeedSource for &mut T {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// 32-bit Mersenne Twister
pub struct Mt19937 {
    state: [u32; N],
    index: usize,
}

impl Mt19937 {
    /// Seed the generator uses when none is configured.
    pub const DEFAULT_SEED: u32 = 5489;

    pub fn new(seed: u32) -> Self {
        let mut state = [0u32; N];
        state[0] = seed;
        for i in 1..N {
            state[i] = 1_812_433_253u32
                .wrapping_mul(state[i - 1] ^ (state[i - 1] >> 30))
                .wrapping_add(i as u32);
        }
        Self { state, index: N }
    }

    fn twist(&mut self) {
        for i in 0..N {
            let y = (self.state[i] & UPPER_MASK) | (self.state[(i + 1) % N] & LOWER_MASK);
            let mut next = self.state[(i + M) % N] ^ (y >> 1);
            if y & 1 != 0 {
                next ^= MATRIX_A;
            }
            self.state[i] = next;
        }
        self.index = 0;
    }
}

impl Default for Mt19937 {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl SeedSource for Mt19937 {
    fn next_u32(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }
        let mut y = self.state[self.index];
        self.index += 1;

        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^ (y >> 18)
    }
}
