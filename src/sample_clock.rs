// SPDX-License-Identifier: GPL-3.0-or-later
//! Timer that paces DAC conversions and DMA transfers.

use core::marker::PhantomData;

use num_rational::Ratio;
use num_traits::{cast, PrimInt};

use crate::bus::Bus;
use crate::config::{Config, Rounding};
use crate::error::Error;
use crate::sync::{self, SyncPolicy};
use crate::variant::reg::{ClockRoute, CTRLA_ENABLE};
use crate::variant::{State, Variant};

/// What [`start`](crate::ZeroDac::start_clock) actually programmed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockSetting {
    pub requested_hz: u32,
    /// Counter input frequency, after the prescaler.
    pub input_hz: u32,
    pub period: u32,
}

impl ClockSetting {
    /// `input_hz / period` as an exact fraction, or `None` for a zero period.
    ///
    /// This is the rate the period was derived from. The timer counts from 0
    /// to `period` inclusive, so triggers arrive at `input_hz / (period + 1)`.
    pub fn nominal_rate(&self) -> Option<Ratio<u32>> {
        (self.period != 0).then(|| Ratio::new(self.input_hz, self.period))
    }
}

/// Computes the compare/period value for `sample_rate`, rejecting rates whose
/// period is zero or does not fit in `P`.
pub fn period_for<P: PrimInt>(
    input_hz: u32,
    sample_rate: u32,
    rounding: Rounding,
) -> Result<u32, Error> {
    if sample_rate == 0 {
        return Err(Error::InvalidSampleRate {
            sample_rate,
            period: 0,
        });
    }

    let period = rounding.divide(input_hz, sample_rate);
    match cast::<u32, P>(period) {
        Some(_) if period > 0 => Ok(period),
        _ => Err(Error::InvalidSampleRate {
            sample_rate,
            period,
        }),
    }
}

pub struct SampleClock<V: Variant> {
    state: State,
    setting: Option<ClockSetting>,
    _variant: PhantomData<V>,
}

impl<V: Variant> SampleClock<V> {
    pub(crate) const fn new() -> Self {
        Self {
            state: State::Uninitialized,
            setting: None,
            _variant: PhantomData,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Last programmed setting, kept across [`stop`](Self::stop).
    pub fn setting(&self) -> Option<ClockSetting> {
        self.setting
    }

    pub(crate) fn start<B: Bus>(
        &mut self,
        bus: &mut B,
        config: &Config,
        sample_rate: u32,
    ) -> Result<ClockSetting, Error> {
        let input_hz = config.timer_input_hz::<V>();
        let period = period_for::<V::Period>(input_hz, sample_rate, config.rounding)?;
        let setting = ClockSetting {
            requested_hz: sample_rate,
            input_hz,
            period,
        };

        self.state = State::Uninitialized;
        self.setting = None;
        Self::program(bus, config.sync, period)?;
        self.state = State::Enabled;
        self.setting = Some(setting);

        info!(
            "{}: sample clock at {} Hz (period {})",
            V::descriptor().timer,
            sample_rate,
            period
        );
        Ok(setting)
    }

    fn program<B: Bus>(bus: &mut B, policy: SyncPolicy, period: u32) -> Result<(), Error> {
        let timer = &V::registers().timer;
        let name = V::descriptor().timer;

        debug!("{}: routing generic clock", name);
        match timer.route {
            ClockRoute::Clkctrl { block, reg, value } => {
                reg.write(bus, value);
                policy.wait_clear(bus, &block.sync)?;
            }
            ClockRoute::Pchctrl {
                reg,
                value,
                enabled,
            } => {
                reg.write(bus, value);
                policy.wait_set(bus, &enabled)?;
            }
        }
        if let Some(gate) = timer.bus_gate {
            gate.reg.set_bits(bus, gate.mask);
        }

        debug!("{}: disable and reset", name);
        policy.wait_clear(bus, &timer.block.sync)?;
        timer.ctrla.clear_bits(bus, CTRLA_ENABLE);
        policy.wait_clear(bus, &timer.block.sync)?;
        sync::software_reset(bus, &timer.block, policy)?;

        trace!("{}: mode/prescaler {:#x}", name, timer.config);
        timer.ctrla.write(bus, timer.config);
        policy.wait_clear(bus, &timer.block.sync)?;
        if let Some((wave, value)) = timer.wave {
            wave.write(bus, value);
        }
        if let Some((ctrlbclr, mask)) = timer.ctrlb_clear {
            ctrlbclr.write(bus, mask);
            policy.wait_clear(bus, &timer.block.sync)?;
        }

        timer.period.write(bus, period);
        policy.wait_clear(bus, &timer.block.sync)?;

        timer.ctrla.set_bits(bus, CTRLA_ENABLE);
        policy.wait_clear(bus, &timer.block.sync)
    }

    /// Disables the timer, leaving its mode and period in place.
    pub(crate) fn stop<B: Bus>(&mut self, bus: &mut B, policy: SyncPolicy) -> Result<(), Error> {
        if self.state != State::Enabled {
            // Never started (its clock may not even be routed) or already off
            return Ok(());
        }

        let timer = &V::registers().timer;
        let result = policy
            .wait_clear(bus, &timer.block.sync)
            .and_then(|()| {
                timer.ctrla.clear_bits(bus, CTRLA_ENABLE);
                policy.wait_clear(bus, &timer.block.sync)
            });

        match result {
            Ok(()) => {
                self.state = State::Disabled;
                debug!("{}: sample clock stopped", V::descriptor().timer);
                Ok(())
            }
            Err(e) => {
                self.state = State::Uninitialized;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::fake::FakeBus;
    use crate::variant::{Samd21, Samd51};

    #[test]
    fn floor_period_from_8mhz() {
        assert_eq!(period_for::<u16>(8_000_000, 8_000, Rounding::Floor), Ok(1000));
    }

    #[test]
    fn period_overflowing_8_bit_counter_is_rejected() {
        assert_eq!(
            period_for::<u8>(8_000_000, 8_000, Rounding::Floor),
            Err(Error::InvalidSampleRate {
                sample_rate: 8_000,
                period: 1000
            })
        );
        assert_eq!(period_for::<u8>(8_000_000, 31_373, Rounding::Floor), Ok(254));
        assert_eq!(
            period_for::<u8>(8_000_000, 31_250, Rounding::Floor),
            Err(Error::InvalidSampleRate {
                sample_rate: 31_250,
                period: 256
            })
        );
    }

    #[test]
    fn zero_rate_and_zero_period_are_rejected() {
        assert!(period_for::<u16>(48_000_000, 0, Rounding::Floor).is_err());
        assert_eq!(
            period_for::<u16>(1_000, 2_000, Rounding::Floor),
            Err(Error::InvalidSampleRate {
                sample_rate: 2_000,
                period: 0
            })
        );
        // Rounds up to a usable period
        assert_eq!(period_for::<u16>(1_000, 2_000, Rounding::Nearest), Ok(1));
    }

    #[test]
    fn nominal_rate_is_exact() {
        let setting = ClockSetting {
            requested_hz: 44_100,
            input_hz: 48_000_000,
            period: 1088,
        };
        assert_eq!(setting.nominal_rate(), Some(Ratio::new(48_000_000, 1088)));
        assert!(setting.nominal_rate() > Some(Ratio::from_integer(44_100)));
    }

    #[test]
    fn nominal_rate_of_zero_period_is_none() {
        let setting = ClockSetting {
            requested_hz: 44_100,
            input_hz: 48_000_000,
            period: 0,
        };
        assert_eq!(setting.nominal_rate(), None);
    }

    #[test]
    fn invalid_rate_touches_no_register() {
        let mut bus = FakeBus::for_variant::<Samd51>();
        let mut clock = SampleClock::<Samd51>::new();
        let result = clock.start(&mut bus, &Config::default(), 8_000);
        assert!(matches!(result, Err(Error::InvalidSampleRate { .. })));
        assert!(bus.accesses().is_empty());
        assert_eq!(clock.state(), State::Uninitialized);
    }

    #[test]
    fn stop_before_start_is_a_no_op() {
        let mut bus = FakeBus::for_variant::<Samd21>();
        let mut clock = SampleClock::<Samd21>::new();
        clock.stop(&mut bus, SyncPolicy::default()).unwrap();
        assert!(bus.accesses().is_empty());
        assert_eq!(clock.state(), State::Uninitialized);
    }

    #[test]
    fn start_enables_timer_with_period() {
        let mut bus = FakeBus::for_variant::<Samd21>();
        let mut clock = SampleClock::<Samd21>::new();
        let setting = clock.start(&mut bus, &Config::default(), 48_000).unwrap();
        assert_eq!(setting.period, 1000);
        assert_eq!(clock.state(), State::Enabled);
        // TC5 CC0 and CTRLA: COUNT16 | MFRQ | DIV1 | ENABLE
        assert_eq!(bus.peek(0x4200_3418), 1000);
        assert_eq!(bus.peek(0x4200_3400), 0x0022);
        // APB clock gate for TC5
        assert_eq!(bus.peek(0x4000_0420) & (1 << 13), 1 << 13);
    }
}
