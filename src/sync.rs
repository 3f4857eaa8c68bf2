// SPDX-License-Identifier: GPL-3.0-or-later
//! Waiting for writes to cross into a peripheral's clock domain.

use crate::bus::Bus;
use crate::error::Error;
use crate::variant::reg::{Block, Flag};

/// Poll budget used by [`SyncPolicy::default`].
pub const DEFAULT_SYNC_POLLS: u32 = 100_000;

/// How long to spin on a synchronization flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncPolicy {
    /// Spin until the hardware clears the flag. A stuck flag hangs the caller.
    Unbounded,
    /// Give up with [`Error::PeripheralTimeout`] after `polls` busy reads.
    Bounded { polls: u32 },
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self::Bounded {
            polls: DEFAULT_SYNC_POLLS,
        }
    }
}

impl SyncPolicy {
    pub fn wait_clear<B: Bus + ?Sized>(&self, bus: &mut B, flag: &Flag) -> Result<(), Error> {
        self.wait(bus, flag, false)
    }

    pub fn wait_set<B: Bus + ?Sized>(&self, bus: &mut B, flag: &Flag) -> Result<(), Error> {
        self.wait(bus, flag, true)
    }

    fn wait<B: Bus + ?Sized>(&self, bus: &mut B, flag: &Flag, until_set: bool) -> Result<(), Error> {
        match *self {
            Self::Unbounded => {
                while flag.is_set(bus) != until_set {}
                Ok(())
            }
            Self::Bounded { polls } => {
                for _ in 0..polls.max(1) {
                    if flag.is_set(bus) == until_set {
                        return Ok(());
                    }
                }
                error!(
                    "register {:#x} mask {:#x} still busy after {} polls",
                    flag.reg.addr,
                    flag.mask,
                    polls
                );
                Err(Error::PeripheralTimeout {
                    register: flag.reg.addr,
                })
            }
        }
    }
}

/// Software-resets `block` and waits until the reset has been observed to
/// complete: the sync flag is clear and the self-clearing reset bit reads 0.
pub fn software_reset<B: Bus + ?Sized>(
    bus: &mut B,
    block: &Block,
    policy: SyncPolicy,
) -> Result<(), Error> {
    let Some(reset) = block.reset else {
        return Ok(());
    };

    policy.wait_clear(bus, &block.sync)?;
    reset.reg.write(bus, reset.mask);
    policy.wait_clear(bus, &block.sync)?;
    policy.wait_clear(bus, &reset)
}
