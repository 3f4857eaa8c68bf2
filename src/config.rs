// SPDX-License-Identifier: GPL-3.0-or-later
use crate::sync::SyncPolicy;
use crate::variant::Variant;

/// How the timer period is derived from a requested sample rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rounding {
    /// `input / rate`, truncated, so the nominal rate `input / period` is
    /// never below the request. The counter runs from 0 to the period
    /// inclusive, so the hardware triggers at `input / (period + 1)`, which
    /// can be slightly below it.
    #[default]
    Floor,
    /// `input / rate` rounded to the nearest integer, halves rounding up.
    Nearest,
}

impl Rounding {
    /// Divides `num` by a non-zero `den`.
    pub fn divide(self, num: u32, den: u32) -> u32 {
        match self {
            Self::Floor => num / den,
            Self::Nearest => ((num as u64 + den as u64 / 2) / den as u64) as u32,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub sync: SyncPolicy,
    pub rounding: Rounding,
    /// Frequency of the generic clock routed to the sample-clock timer, when
    /// the board runs it at something other than the chip default.
    pub generator_hz: Option<u32>,
}

impl Config {
    /// Frequency the sample-clock counter increments at, after the prescaler.
    pub fn timer_input_hz<V: Variant>(&self) -> u32 {
        let timer = &V::registers().timer;
        self.generator_hz.unwrap_or(timer.generator_hz) / timer.prescaler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{Samd21, Samd51};

    #[test]
    fn default_timer_clocks() {
        let config = Config::default();
        assert_eq!(config.timer_input_hz::<Samd21>(), 48_000_000);
        assert_eq!(config.timer_input_hz::<Samd51>(), 6_250_000);
    }

    #[test]
    fn generator_override_is_prescaled() {
        let config = Config {
            generator_hz: Some(128_000_000),
            ..Config::default()
        };
        assert_eq!(config.timer_input_hz::<Samd51>(), 8_000_000);
    }

    #[test]
    fn rounding_modes() {
        assert_eq!(Rounding::Floor.divide(48_000_000, 44_100), 1088);
        assert_eq!(Rounding::Nearest.divide(48_000_000, 44_100), 1088);
        assert_eq!(Rounding::Floor.divide(10, 4), 2);
        assert_eq!(Rounding::Nearest.divide(10, 4), 3);
        assert_eq!(Rounding::Nearest.divide(u32::MAX, 1), u32::MAX);
    }
}
