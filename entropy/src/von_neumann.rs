/*++

Licensed under the Apache-2.0 license.

File Name:

    von_neumann.rs

Abstract:

    File contains the von Neumann extractor that removes bias from raw bits.

--*/

use reram_error::{ReramError, ReramResult};

use crate::LatencySource;

/// How many raw bit pairs one extraction may consume.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Tries {
    Unbounded,
    AtMost(u32),
}

impl Tries {
    /// Map the legacy signed convention (negative means unbounded).
    pub fn from_signed(tries: i64) -> Self {
        if tries < 0 {
            Self::Unbounded
        } else {
            Self::AtMost(u32::try_from(tries).unwrap_or(u32::MAX))
        }
    }
}

/// von Neumann extractor over a raw bit source.
///
/// Draws raw bits two at a time. A differing pair yields its first bit, an
/// equal pair is thrown away. Raw bits are only counted for complete pairs,
/// so [`Self::raw_bits`] is always even.
pub struct VonNeumann<L> {
    source: L,
    raw_bits: u64,
}

impl<L: LatencySource> VonNeumann<L> {
    pub fn new(source: L) -> Self {
        Self {
            source,
            raw_bits: 0,
        }
    }

    /// Raw bits consumed so far.
    pub fn raw_bits(&self) -> u64 {
        self.raw_bits
    }

    pub fn source(&mut self) -> &mut L {
        &mut self.source
    }

    pub fn into_inner(self) -> L {
        self.source
    }

    /// Extract one unbiased bit.
    ///
    /// A timed out measurement spends the try it happened in. Any other
    /// measurement error is returned unchanged.
    pub fn extract_unbiased_bit(&mut self, tries: Tries) -> ReramResult<bool> {
        let mut remaining = tries;
        loop {
            match &mut remaining {
                Tries::Unbounded => {}
                Tries::AtMost(0) => return Err(ReramError::ENTROPY_VON_NEUMANN_EXHAUSTED_TRIES),
                Tries::AtMost(n) => *n -= 1,
            }

            let Some((first, second)) = self.draw_pair()? else {
                continue;
            };
            self.raw_bits += 2;
            if first != second {
                return Ok(first);
            }
        }
    }

    /// `None` when either measurement timed out.
    fn draw_pair(&mut self) -> ReramResult<Option<(bool, bool)>> {
        let first = match self.source.next_raw_bit() {
            Ok(bit) => bit,
            Err(e) if e.is_timeout() => return Ok(None),
            Err(e) => return Err(e),
        };
        let second = match self.source.next_raw_bit() {
            Ok(bit) => bit,
            Err(e) if e.is_timeout() => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(Some((first, second)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<ReramResult<bool>>);

    impl Scripted {
        fn bits(bits: &[u8]) -> Self {
            Self(bits.iter().map(|&b| Ok(b == 1)).collect())
        }
    }

    impl LatencySource for Scripted {
        fn next_raw_bit(&mut self) -> ReramResult<bool> {
            self.0.pop_front().expect("source ran dry")
        }
    }

    #[test]
    fn test_first_bit_of_differing_pair() {
        let mut vn = VonNeumann::new(Scripted::bits(&[1, 0, 0, 1]));
        assert!(vn.extract_unbiased_bit(Tries::Unbounded).unwrap());
        assert!(!vn.extract_unbiased_bit(Tries::Unbounded).unwrap());
        assert_eq!(vn.raw_bits(), 4);
    }

    #[test]
    fn test_equal_pairs_discarded() {
        let mut vn = VonNeumann::new(Scripted::bits(&[1, 1, 0, 0, 1, 1, 0, 1]));
        assert!(!vn.extract_unbiased_bit(Tries::Unbounded).unwrap());
        assert_eq!(vn.raw_bits(), 8);
        assert!(vn.source().0.is_empty());
    }

    #[test]
    fn test_exhausted_tries() {
        let mut vn = VonNeumann::new(Scripted::bits(&[0, 0, 1, 1, 0, 1]));
        assert_eq!(
            vn.extract_unbiased_bit(Tries::AtMost(2)),
            Err(ReramError::ENTROPY_VON_NEUMANN_EXHAUSTED_TRIES)
        );
        assert_eq!(vn.raw_bits(), 4);
        // The source is untouched past the budget.
        assert_eq!(vn.source().0.len(), 2);
        assert!(!vn.extract_unbiased_bit(Tries::AtMost(1)).unwrap());
    }

    #[test]
    fn test_zero_tries_draws_nothing() {
        let mut vn = VonNeumann::new(Scripted::bits(&[1, 0]));
        assert!(vn
            .extract_unbiased_bit(Tries::AtMost(0))
            .unwrap_err()
            .is_exhausted_tries());
        assert_eq!(vn.source().0.len(), 2);
    }

    #[test]
    fn test_timeout_spends_a_try() {
        let mut vn = VonNeumann::new(Scripted(VecDeque::from([
            Ok(true),
            Err(ReramError::DRIVER_RERAM_WIP_POLL_TIMEOUT),
            Ok(true),
            Ok(false),
        ])));
        assert!(vn.extract_unbiased_bit(Tries::AtMost(2)).unwrap());
        // Only the complete pair counts.
        assert_eq!(vn.raw_bits(), 2);

        let mut vn = VonNeumann::new(Scripted(VecDeque::from([Err(
            ReramError::DRIVER_RERAM_WIP_POLL_TIMEOUT,
        )])));
        assert!(vn
            .extract_unbiased_bit(Tries::AtMost(1))
            .unwrap_err()
            .is_exhausted_tries());
    }

    #[test]
    fn test_transport_error_propagates() {
        let mut vn = VonNeumann::new(Scripted(VecDeque::from([Err(
            ReramError::DRIVER_SPI_TRANSFER_INCOMPLETE,
        )])));
        assert_eq!(
            vn.extract_unbiased_bit(Tries::Unbounded),
            Err(ReramError::DRIVER_SPI_TRANSFER_INCOMPLETE)
        );
    }

    #[test]
    fn test_raw_bits_always_even() {
        let bits: Vec<u8> = (0..200u32).map(|i| ((i * 7 + i / 3) % 2) as u8).collect();
        let mut vn = VonNeumann::new(Scripted::bits(&bits));
        while vn.source().0.len() >= 2 {
            match vn.extract_unbiased_bit(Tries::AtMost(1)) {
                Ok(_) => {}
                Err(e) => assert!(e.is_exhausted_tries()),
            }
            assert_eq!(vn.raw_bits() % 2, 0);
        }
    }

    #[test]
    fn test_tries_from_signed() {
        assert_eq!(Tries::from_signed(-1), Tries::Unbounded);
        assert_eq!(Tries::from_signed(1000), Tries::AtMost(1000));
    }
}
