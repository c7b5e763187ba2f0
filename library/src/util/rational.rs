use std::fmt;

use serde::{Deserialize, Serialize};

/// Exact fraction used for time bases (`num / den` seconds per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// The duration of one sample at `sample_rate`.
    pub fn per_sample(sample_rate: u32) -> Self {
        Self::new(1, sample_rate.min(i32::MAX as u32) as i32)
    }

    pub fn is_valid(&self) -> bool {
        self.num > 0 && self.den > 0
    }

    pub fn invert(&self) -> Self {
        Self::new(self.den, self.num)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Rescales `value` expressed in `from` units into `to` units.
///
/// Computes `value * from / to` exactly and rounds to the nearest integer,
/// halfway cases away from zero. Results outside the `i64` range saturate.
/// A degenerate `to` (zero numerator) or `from` (zero denominator) yields 0.
pub fn rescale_q(value: i64, from: Rational, to: Rational) -> i64 {
    let mut n = i128::from(value) * i128::from(from.num) * i128::from(to.den);
    let mut d = i128::from(to.num) * i128::from(from.den);
    if d == 0 {
        return 0;
    }
    if d < 0 {
        n = -n;
        d = -d;
    }

    let half = d / 2;
    let rounded = if n >= 0 {
        (n + half) / d
    } else {
        -((-n + half) / d)
    };

    rounded.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}
