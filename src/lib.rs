// SPDX-License-Identifier: GPL-3.0-or-later
//! DAC and sample-clock bring-up for the SAMD21 and SAMD51.
//!
//! The two chips have incompatible DAC and timer peripherals: one channel and
//! a 10-bit converter on the SAMD21, two channels and 12 bits on the SAMD51,
//! different synchronization registers, different voltage-reference encodings
//! and a different timer feeding the DAC trigger. [`ZeroDac`] hides all of that
//! behind a single sequencer that is generic over a [`Variant`] register table
//! and a [`Bus`] that performs the actual register accesses.
//!
//! ```ignore
//! let bus = unsafe { zero_dac::Mmio::steal() };
//! let mut dac = zero_dac::ZeroDac::<zero_dac::Chip, _>::new(bus, zero_dac::Config::default());
//! dac.initialize(zero_dac::VoltageReference::Supply)?;
//! let clock = dac.start_clock(44_100)?;
//! // Point a DMA channel at dac.data_register_address(0)? with
//! // dac.descriptor().dma_beat_size, triggered by dac.descriptor().clock_trigger_id.
//! ```
//!
//! Only one [`ZeroDac`] may exist per physical chip. Register accesses are not
//! locked; sharing an instance between execution contexts needs an external
//! lock.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// This must go first so the macros are visible to the other modules.
mod fmt;

mod const_assert;

pub mod bus;
pub mod config;
pub mod dac;
pub mod error;
pub mod sample_clock;
pub mod sync;
pub mod variant;
pub mod zero_dac;

pub use bus::{Bus, Mmio, Reg};
#[cfg(any(test, feature = "fake"))]
pub use bus::fake::{Access, FakeBus};
pub use config::{Config, Rounding};
pub use dac::{Dac, DacDmaTrigger, DualDac};
pub use error::Error;
pub use sample_clock::ClockSetting;
pub use sync::SyncPolicy;
pub use variant::{
    BeatSize, MultiChannel, Samd21, Samd21Dac, Samd51, Samd51Dac, State, Variant,
    VariantDescriptor, VoltageReference,
};
pub use zero_dac::ZeroDac;

/// The chip selected at build time.
#[cfg(feature = "samd51")]
pub type Chip = Samd51;

/// The chip selected at build time.
#[cfg(all(feature = "samd21", not(feature = "samd51")))]
pub type Chip = Samd21;
