// SPDX-License-Identifier: GPL-3.0-or-later
//! Per-chip constants.
//!
//! Each supported chip is a zero-sized type implementing [`Variant`]. The
//! sequencer never branches on the chip; everything that differs lives in the
//! chip's [`VariantDescriptor`] and [`RegisterMap`](reg::RegisterMap).

use num_traits::PrimInt;
use paste::paste;

use crate::bus::Bus;
use crate::const_assert::const_assert;
use crate::dac::DacDmaTrigger;
use crate::zero_dac::ZeroDac;

pub mod reg;
mod samd21;
mod samd51;

pub use reg::RegisterMap;

/// DMA transfer unit used to move samples into the data register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BeatSize {
    Byte = 0,
    HWord = 1,
    Word = 2,
}

impl BeatSize {
    pub const fn bytes(self) -> u8 {
        1 << self as u8
    }

    /// Value of the DMAC BTCTRL.BEATSIZE field.
    pub const fn btctrl_value(self) -> u8 {
        self as u8
    }
}

/// Voltage the DAC output range is scaled against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageReference {
    /// Internal 1 V bandgap reference
    Internal1V,
    /// Analog supply rail
    Supply,
    /// External reference pin
    External,
}

impl VoltageReference {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Internal1V => "internal 1V",
            Self::Supply => "supply",
            Self::External => "external",
        }
    }
}

/// Read-only facts about a chip's DAC, for capability queries and DMA setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub name: &'static str,
    pub channel_count: u8,
    pub resolution_bits: u8,
    pub dma_beat_size: BeatSize,
    /// Data register address of each channel.
    pub data_registers: &'static [u32],
    /// DMAC trigger source raised on every sample-clock period.
    pub clock_trigger_id: u8,
    /// Timer driving the sample clock.
    pub timer: &'static str,
    /// Default frequency of the generic clock feeding that timer.
    pub base_clock_hz: u32,
}

impl VariantDescriptor {
    pub const fn channel_count(&self) -> u8 {
        self.channel_count
    }

    pub const fn resolution_bits(&self) -> u8 {
        self.resolution_bits
    }

    pub const fn dma_beat_size(&self) -> BeatSize {
        self.dma_beat_size
    }

    pub const fn clock_trigger_id(&self) -> u8 {
        self.clock_trigger_id
    }

    /// `None` for a channel this chip does not have.
    pub fn data_register(&self, channel: u8) -> Option<u32> {
        self.data_registers.get(channel as usize).copied()
    }

    /// Largest sample value the converter resolves.
    pub const fn max_sample(&self) -> u16 {
        ((1u32 << self.resolution_bits) - 1) as u16
    }
}

/// A supported chip.
pub trait Variant: 'static {
    /// Integer type of the sample-clock compare/period register.
    type Period: PrimInt;

    fn descriptor() -> &'static VariantDescriptor;

    fn registers() -> &'static RegisterMap;
}

/// Chips with a second DAC channel.
pub trait MultiChannel: Variant {}

/// Externally observable state of the DAC or its sample clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Uninitialized,
    Enabled,
    Disabled,
}

macro_rules! variant {
    ($(($Chip:ident, $Period:ty),)+) => {
        paste! {
        $(

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct $Chip;

impl Variant for $Chip {
    type Period = $Period;

    fn descriptor() -> &'static VariantDescriptor {
        &[<$Chip:lower>]::DESCRIPTOR
    }

    fn registers() -> &'static RegisterMap {
        &[<$Chip:lower>]::REGISTERS
    }
}

impl<B: Bus> DacDmaTrigger for ZeroDac<$Chip, B> {
    const DMA_TRIGGER_SOURCE: u8 = [<$Chip:lower>]::DESCRIPTOR.clock_trigger_id;
    const DMA_BEAT_SIZE: BeatSize = [<$Chip:lower>]::DESCRIPTOR.dma_beat_size;
}

pub type [<$Chip Dac>]<B> = ZeroDac<$Chip, B>;

const_assert!(
    [<$Chip:lower>]::DESCRIPTOR.data_registers.len()
        == [<$Chip:lower>]::DESCRIPTOR.channel_count as usize
);
const_assert!(
    [<$Chip:lower>]::REGISTERS.dac.data.len()
        == [<$Chip:lower>]::DESCRIPTOR.channel_count as usize
);
const_assert!([<$Chip:lower>]::DESCRIPTOR.resolution_bits <= 16);
const_assert!(
    [<$Chip:lower>]::DESCRIPTOR.base_clock_hz
        == [<$Chip:lower>]::REGISTERS.timer.generator_hz
);

        )+
        }
    };
}

variant! {
    (Samd21, u16),
    (Samd51, u8),
}

impl MultiChannel for Samd51 {}
