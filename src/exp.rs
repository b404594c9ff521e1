//! Experience curves and level derivation.

use serde::{Deserialize, Serialize};

pub const MAX_LEVEL: u8 = 100;

/// Growth rate codes as stored in personal tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthRate {
    MediumFast = 0,
    Erratic = 1,
    Fluctuating = 2,
    MediumSlow = 3,
    Fast = 4,
    Slow = 5,
}

impl GrowthRate {
    pub fn from_code(code: u8) -> GrowthRate {
        match code {
            1 => GrowthRate::Erratic,
            2 => GrowthRate::Fluctuating,
            3 => GrowthRate::MediumSlow,
            4 => GrowthRate::Fast,
            5 => GrowthRate::Slow,
            _ => GrowthRate::MediumFast,
        }
    }
}

/// Minimum experience for `level` on the given curve.
pub fn exp_for_level(rate: GrowthRate, level: u8) -> u32 {
    let n = level.clamp(1, MAX_LEVEL) as i64;
    if n == 1 {
        return 0;
    }
    let cube = n * n * n;
    let exp = match rate {
        GrowthRate::MediumFast  => cube,
        GrowthRate::Fast        => cube * 4 / 5,
        GrowthRate::Slow        => cube * 5 / 4,
        GrowthRate::MediumSlow  => cube * 6 / 5 - 15 * n * n + 100 * n - 140,
        GrowthRate::Erratic => match n {
            n if n <= 50 => cube * (100 - n) / 50,
            n if n <= 68 => cube * (150 - n) / 100,
            n if n <= 98 => cube * ((1911 - 10 * n) / 3) / 500,
            _            => cube * (160 - n) / 100,
        },
        GrowthRate::Fluctuating => match n {
            n if n <= 15 => cube * ((n + 1) / 3 + 24) / 50,
            n if n <= 36 => cube * (n + 14) / 50,
            _            => cube * (n / 2 + 32) / 50,
        },
    };
    exp.max(0) as u32
}

/// Highest level whose threshold does not exceed `exp`.
pub fn level_for_exp(rate: GrowthRate, exp: u32) -> u8 {
    let mut level = 1;
    while level < MAX_LEVEL && exp >= exp_for_level(rate, level + 1) {
        level += 1;
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_100_thresholds() {
        assert_eq!(exp_for_level(GrowthRate::MediumFast, 100), 1_000_000);
        assert_eq!(exp_for_level(GrowthRate::Erratic, 100), 600_000);
        assert_eq!(exp_for_level(GrowthRate::Fluctuating, 100), 1_640_000);
        assert_eq!(exp_for_level(GrowthRate::MediumSlow, 100), 1_059_860);
        assert_eq!(exp_for_level(GrowthRate::Fast, 100), 800_000);
        assert_eq!(exp_for_level(GrowthRate::Slow, 100), 1_250_000);
    }

    #[test]
    fn test_low_levels() {
        assert_eq!(exp_for_level(GrowthRate::MediumSlow, 2), 9);
        assert_eq!(exp_for_level(GrowthRate::Erratic, 2), 15);
        assert_eq!(exp_for_level(GrowthRate::Fluctuating, 2), 4);
        assert_eq!(exp_for_level(GrowthRate::MediumSlow, 5), 135);
    }

    #[test]
    fn test_level_walk() {
        assert_eq!(level_for_exp(GrowthRate::MediumFast, 0), 1);
        assert_eq!(level_for_exp(GrowthRate::MediumFast, 124), 4);
        assert_eq!(level_for_exp(GrowthRate::MediumFast, 125), 5);
        assert_eq!(level_for_exp(GrowthRate::MediumFast, u32::MAX), 100);
    }
}
