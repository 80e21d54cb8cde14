//! Galois-style shift register with a published maximal-length tap table.

use std::fmt;

use thiserror::Error;

/// Narrowest supported register.
pub const MIN_LFSR_BITS: u8 = 2;
/// Widest supported register.
pub const MAX_LFSR_BITS: u8 = 63;

/// Maximal-length taps for one register width, top tap implicit and tap 0
/// always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaximalTaps {
    /// Register width.
    pub nbits: u8,
    /// Middle tap of the two-tap form, when one exists.
    pub two_tap: Option<u8>,
    /// Middle taps of the four-tap form, when one exists.
    pub four_tap: Option<[u8; 3]>,
}

const fn taps(nbits: u8, two_tap: Option<u8>, four_tap: Option<[u8; 3]>) -> MaximalTaps {
    MaximalTaps {
        nbits,
        two_tap,
        four_tap,
    }
}

/// Maximal-length taps for 2..=37 bit registers.
pub const MAXIMAL_TAPS: &[MaximalTaps] = &[
    taps(2, Some(1), None),
    taps(3, Some(2), None),
    taps(4, Some(3), None),
    taps(5, Some(3), Some([4, 3, 2])),
    taps(6, Some(5), Some([5, 3, 2])),
    taps(7, Some(6), Some([6, 5, 4])),
    taps(8, None, Some([6, 5, 4])),
    taps(9, Some(5), Some([8, 6, 5])),
    taps(10, Some(7), Some([9, 7, 6])),
    taps(11, Some(9), Some([10, 9, 7])),
    taps(12, None, Some([11, 8, 6])),
    taps(13, None, Some([12, 10, 9])),
    taps(14, None, Some([13, 11, 9])),
    taps(15, Some(14), Some([14, 13, 11])),
    taps(16, None, Some([14, 13, 11])),
    taps(17, Some(14), Some([16, 15, 14])),
    taps(18, Some(11), Some([17, 16, 13])),
    taps(19, None, Some([18, 17, 14])),
    taps(20, Some(17), Some([19, 16, 14])),
    taps(21, Some(19), Some([20, 19, 16])),
    taps(22, Some(21), Some([19, 18, 17])),
    taps(23, Some(18), Some([22, 20, 18])),
    taps(24, None, Some([23, 21, 20])),
    taps(25, Some(22), Some([24, 23, 22])),
    taps(26, None, Some([25, 24, 20])),
    taps(27, None, Some([26, 25, 22])),
    taps(28, Some(25), Some([27, 24, 22])),
    taps(29, Some(27), Some([28, 27, 25])),
    taps(30, None, Some([29, 26, 24])),
    taps(31, Some(28), Some([30, 29, 28])),
    taps(32, None, Some([30, 26, 25])),
    taps(33, Some(20), Some([32, 29, 27])),
    taps(34, None, Some([31, 30, 26])),
    taps(35, Some(33), Some([34, 28, 27])),
    taps(36, Some(25), Some([35, 29, 28])),
    taps(37, None, Some([36, 33, 31])),
];

impl MaximalTaps {
    /// Table entry for `nbits`.
    #[must_use]
    pub fn lookup(nbits: u8) -> Option<&'static Self> {
        MAXIMAL_TAPS.iter().find(|entry| entry.nbits == nbits)
    }

    /// Tap polynomial (top bit excluded) of the two-tap form.
    #[must_use]
    pub fn two_tap_poly(&self) -> Option<u64> {
        self.two_tap.map(|tap| poly_of_taps(&[tap, 0]))
    }

    /// Tap polynomial (top bit excluded) of the four-tap form.
    #[must_use]
    pub fn four_tap_poly(&self) -> Option<u64> {
        self.four_tap.map(|[a, b, c]| poly_of_taps(&[a, b, c, 0]))
    }

    /// Preferred polynomial: two-tap when available, else four-tap.
    #[must_use]
    pub fn default_poly(&self) -> Option<u64> {
        self.two_tap_poly().or_else(|| self.four_tap_poly())
    }
}

/// Sets one bit per tap position.
#[must_use]
pub fn poly_of_taps(taps: &[u8]) -> u64 {
    taps.iter()
        .filter(|&&tap| tap < 64)
        .fold(0, |poly, &tap| poly | (1 << tap))
}

/// Rejected register geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LfsrError {
    /// Width outside `2..=63`.
    #[error("lfsr width {nbits} outside 2..=63")]
    WidthOutOfRange {
        /// Requested width.
        nbits: u8,
    },
    /// Tap polynomial has bits at or above the register width.
    #[error("tap polynomial {taps:#x} does not fit {nbits} bits")]
    TapsOutOfRange {
        /// Requested taps.
        taps: u64,
        /// Register width.
        nbits: u8,
    },
    /// No maximal-length entry for this width.
    #[error("no maximal-length taps known for {nbits} bits")]
    NoTableEntry {
        /// Requested width.
        nbits: u8,
    },
}

/// Shift register of `nbits` bits with feedback polynomial `taps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Lfsr {
    nbits: u8,
    poly: u64,
    value: u64,
}

impl Lfsr {
    /// Builds a register from its tap polynomial, top bit excluded.
    ///
    /// # Errors
    ///
    /// Returns [`LfsrError::WidthOutOfRange`] or
    /// [`LfsrError::TapsOutOfRange`] for an unusable geometry.
    pub const fn new(nbits: u8, taps: u64, value: u64) -> Result<Self, LfsrError> {
        if nbits < MIN_LFSR_BITS || nbits > MAX_LFSR_BITS {
            return Err(LfsrError::WidthOutOfRange { nbits });
        }
        let mask = mask_of(nbits);
        if taps & !mask != 0 {
            return Err(LfsrError::TapsOutOfRange { taps, nbits });
        }
        Ok(Self {
            nbits,
            poly: taps | (1 << nbits),
            value: value & mask,
        })
    }

    /// Maximal-length register for `nbits`, seeded with 1.
    ///
    /// # Errors
    ///
    /// Returns [`LfsrError::NoTableEntry`] for widths outside the table.
    pub fn maximal(nbits: u8) -> Result<Self, LfsrError> {
        let poly = MaximalTaps::lookup(nbits)
            .and_then(MaximalTaps::default_poly)
            .ok_or(LfsrError::NoTableEntry { nbits })?;
        Self::new(nbits, poly, 1)
    }

    /// Register width.
    #[must_use]
    pub const fn nbits(&self) -> u8 {
        self.nbits
    }

    /// Full feedback polynomial including the top bit.
    #[must_use]
    pub const fn poly(&self) -> u64 {
        self.poly
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Current value under `mask`.
    #[must_use]
    pub const fn masked(&self, mask: u64) -> u64 {
        self.value & mask
    }

    /// Loads a new value, truncated to the register width.
    pub fn set(&mut self, value: u64) {
        self.value = value & mask_of(self.nbits);
    }

    /// One shift: left by one, folding the polynomial in when the top bit
    /// falls out.
    pub fn clk_once(&mut self) {
        self.value <<= 1;
        if self.value >> self.nbits != 0 {
            self.value ^= self.poly;
        }
    }

    /// `n` shifts.
    pub fn clk(&mut self, n: u64) {
        for _ in 0..n {
            self.clk_once();
        }
    }

    /// Value with its `nbits` bits in reverse order.
    #[must_use]
    pub fn bit_reverse(&self) -> u64 {
        self.value.reverse_bits() >> (64 - u32::from(self.nbits))
    }

    /// Shifts from 1 back to 1, or `None` when 1 does not recur within
    /// `2^nbits` shifts. Runs in time proportional to the period.
    #[must_use]
    pub fn period(&self) -> Option<u64> {
        let mut probe = Self { value: 1, ..*self };
        let limit = 1_u64 << self.nbits;
        (1..=limit).find(|_| {
            probe.clk_once();
            probe.value == 1
        })
    }

    /// True when the period is `2^nbits - 1`.
    #[must_use]
    pub fn is_maximal(&self) -> bool {
        self.period() == Some(mask_of(self.nbits))
    }
}

impl fmt::Display for Lfsr {
    /// Most significant bit first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in (0..self.nbits).rev() {
            f.write_str(if (self.value >> bit) & 1 == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}

const fn mask_of(nbits: u8) -> u64 {
    (1 << nbits) - 1
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{poly_of_taps, Lfsr, LfsrError, MaximalTaps, MAXIMAL_TAPS};

    #[rstest]
    #[case(2, 0x7, 3)]
    #[case(3, 0xD, 7)]
    #[case(4, 0x19, 15)]
    #[case(5, 0x29, 31)]
    #[case(8, 0x171, 255)]
    #[case(10, 0x481, 1023)]
    #[case(12, 0x1941, 4095)]
    #[case(16, 0x1_6801, 65535)]
    fn table_entries_are_maximal(#[case] nbits: u8, #[case] poly: u64, #[case] period: u64) {
        let lfsr = Lfsr::maximal(nbits).expect("table entry");
        assert_eq!(lfsr.poly(), poly);
        assert_eq!(lfsr.period(), Some(period));
        assert!(lfsr.is_maximal());
    }

    #[test]
    fn every_small_four_tap_form_is_maximal() {
        for entry in MAXIMAL_TAPS.iter().filter(|entry| entry.nbits <= 14) {
            if let Some(taps) = entry.four_tap_poly() {
                let lfsr = Lfsr::new(entry.nbits, taps, 1).expect("table geometry");
                assert!(lfsr.is_maximal(), "{} bit four-tap form", entry.nbits);
            }
        }
    }

    #[test]
    fn table_covers_each_width_once() {
        let widths: Vec<u8> = MAXIMAL_TAPS.iter().map(|entry| entry.nbits).collect();
        assert_eq!(widths, (2..=37).collect::<Vec<u8>>());
        assert!(MAXIMAL_TAPS
            .iter()
            .all(|entry| entry.default_poly().is_some()));
    }

    #[test]
    fn shifting_and_rendering() {
        let mut lfsr = Lfsr::maximal(8).expect("table entry");
        let mut seen = Vec::new();
        for _ in 0..6 {
            lfsr.clk_once();
            seen.push(lfsr.value());
        }
        assert_eq!(seen, vec![2, 4, 8, 16, 32, 64]);
        assert_eq!(lfsr.to_string(), "01000000");
        assert_eq!(lfsr.bit_reverse(), 2);

        lfsr.clk(2);
        assert_eq!(lfsr.value(), 0x71);
        assert_eq!(lfsr.masked(0x0F), 0x01);
    }

    #[test]
    fn non_maximal_polynomial_is_detected() {
        // x^4 + x^2 + 1 is reducible
        let lfsr = Lfsr::new(4, poly_of_taps(&[2, 0]), 1).expect("valid geometry");
        assert!(!lfsr.is_maximal());
    }

    #[test]
    fn stuck_register_has_no_period() {
        let lfsr = Lfsr::new(4, 0, 1).expect("valid geometry");
        assert_eq!(lfsr.period(), None);
    }

    #[test]
    fn geometry_is_validated() {
        assert_eq!(
            Lfsr::new(1, 0, 0),
            Err(LfsrError::WidthOutOfRange { nbits: 1 })
        );
        assert_eq!(
            Lfsr::new(4, 0x10, 0),
            Err(LfsrError::TapsOutOfRange { taps: 0x10, nbits: 4 })
        );
        assert_eq!(Lfsr::maximal(38), Err(LfsrError::NoTableEntry { nbits: 38 }));
        assert!(MaximalTaps::lookup(1).is_none());
    }
}
