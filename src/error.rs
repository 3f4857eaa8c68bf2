// SPDX-License-Identifier: GPL-3.0-or-later
use core::fmt;

/// Errors reported by the DAC sequencer.
///
/// `UnsupportedChannel`, `InvalidSampleRate` and `NotInitialized` are caller
/// mistakes and are always reported before any register is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A channel index at or beyond the variant's channel count.
    UnsupportedChannel { channel: u8, channel_count: u8 },
    /// The requested rate maps to a timer period of zero or one that does not
    /// fit the counter. `period` is the computed value before narrowing.
    InvalidSampleRate { sample_rate: u32, period: u32 },
    /// A synchronization flag stayed set for the whole poll budget.
    PeripheralTimeout { register: u32 },
    /// `write` was called before `initialize` completed.
    NotInitialized,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedChannel {
                channel,
                channel_count,
            } => write!(
                f,
                "channel {} not supported ({} channel(s) available)",
                channel, channel_count
            ),
            Self::InvalidSampleRate {
                sample_rate,
                period,
            } => write!(
                f,
                "sample rate {} Hz gives unusable timer period {}",
                sample_rate, period
            ),
            Self::PeripheralTimeout { register } => {
                write!(f, "synchronization timeout on register {:#010x}", register)
            }
            Self::NotInitialized => write!(f, "DAC not initialized"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_register() {
        let e = Error::PeripheralTimeout {
            register: 0x4200_4807,
        };
        assert_eq!(
            e.to_string(),
            "synchronization timeout on register 0x42004807"
        );
    }

    #[test]
    fn display_channel() {
        let e = Error::UnsupportedChannel {
            channel: 1,
            channel_count: 1,
        };
        assert_eq!(e.to_string(), "channel 1 not supported (1 channel(s) available)");
    }
}
