//! Best rational approximation of a clock ratio, and the DDA divider
//! settings derived from it.

/// Rational clock ratio `numerator / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ClockRatio {
    /// Numerator.
    pub numerator: u32,
    /// Denominator.
    pub denominator: u32,
}

impl ClockRatio {
    /// Ratio as a float; infinite for a zero denominator.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }

    const fn mediant(self, other: Self) -> Self {
        Self {
            numerator: self.numerator + other.numerator,
            denominator: self.denominator + other.denominator,
        }
    }
}

/// Adder and subtractor of a DDA divider; the subtractor may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DdaSettings {
    /// `numerator - 1`.
    pub adder: i64,
    /// `denominator - 2 - adder`.
    pub subtractor: i64,
}

/// DDA settings for a ratio; `(0, 0)` when there is none.
#[must_use]
pub fn dda_of_ratio(ratio: Option<ClockRatio>) -> DdaSettings {
    ratio.map_or_else(DdaSettings::default, |ratio| {
        let adder = i64::from(ratio.numerator) - 1;
        DdaSettings {
            adder,
            subtractor: i64::from(ratio.denominator) - 2 - adder,
        }
    })
}

/// Closest ratio to `f` whose DDA settings stay below `max`.
///
/// Walks the Stern-Brocot tree between `0/1` and `1/0`, accepting a mediant
/// within `1 / (3 * max)` of `f` and otherwise narrowing towards it. When the
/// walk leaves the settings range the last lower bound is returned, or `None`
/// if that is still `0/1`.
#[must_use]
pub fn find_closest_ratio(f: f64, max: u16) -> Option<ClockRatio> {
    let limit = i64::from(max);
    let tolerance = 1.0 / f64::from(max) / 3.0;
    let mut above = ClockRatio {
        numerator: 0,
        denominator: 1,
    };
    let mut below = ClockRatio {
        numerator: 1,
        denominator: 0,
    };

    loop {
        let candidate = below.mediant(above);
        let dda = dda_of_ratio(Some(candidate));
        if dda.adder >= limit || dda.subtractor >= limit {
            break;
        }
        let diff = f * f64::from(candidate.denominator) - f64::from(candidate.numerator);
        if diff.abs() < tolerance {
            return Some(candidate);
        }
        if diff < 0.0 {
            below = candidate;
        } else {
            above = candidate;
        }
    }

    (above.numerator != 0).then_some(above)
}

const ADDER_MASK: u32 = 0xFFFF;
const SUBTRACTOR_SHIFT: u32 = 16;
const SUBTRACTOR_MASK: u32 = 0x7FFF;
const FRACTIONAL_BIT: u32 = 1 << 31;

/// Configuration word of the clock divider.
///
/// Integer mode divides by `adder + 1`; fractional mode produces
/// `subtractor` enables every `adder + subtractor` clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ClockDividerConfig {
    /// Bits 0..=15.
    pub adder: u16,
    /// Bits 16..=30.
    pub subtractor: u16,
    /// Bit 31.
    pub fractional: bool,
}

impl ClockDividerConfig {
    /// Fractional configuration for a divide-by-`ratio` clock, when it fits
    /// the register fields. Ratios below 1 cannot be produced by a divider.
    #[must_use]
    pub fn for_ratio(ratio: ClockRatio) -> Option<Self> {
        let adder = ratio.numerator.checked_sub(ratio.denominator)?;
        let adder = u16::try_from(adder).ok()?;
        let subtractor = u16::try_from(ratio.denominator).ok()?;
        if ratio.denominator == 0 || u32::from(subtractor) > SUBTRACTOR_MASK {
            return None;
        }
        Some(Self {
            adder,
            subtractor,
            fractional: true,
        })
    }

    /// Packed configuration word.
    #[must_use]
    pub fn pack(self) -> u32 {
        let mut word = u32::from(self.adder) & ADDER_MASK;
        word |= (u32::from(self.subtractor) & SUBTRACTOR_MASK) << SUBTRACTOR_SHIFT;
        if self.fractional {
            word |= FRACTIONAL_BIT;
        }
        word
    }

    /// Splits a configuration word into its fields.
    #[must_use]
    pub fn unpack(word: u32) -> Self {
        Self {
            adder: u16::try_from(word & ADDER_MASK).unwrap_or(u16::MAX),
            subtractor: u16::try_from((word >> SUBTRACTOR_SHIFT) & SUBTRACTOR_MASK)
                .unwrap_or(u16::MAX),
            fractional: word & FRACTIONAL_BIT != 0,
        }
    }

    /// Average output period in input clocks, `None` for a fractional
    /// configuration with no subtractor.
    #[must_use]
    pub fn period(self) -> Option<f64> {
        if !self.fractional {
            return Some(f64::from(self.adder) + 1.0);
        }
        (self.subtractor != 0).then(|| {
            (f64::from(self.adder) + f64::from(self.subtractor)) / f64::from(self.subtractor)
        })
    }
}
