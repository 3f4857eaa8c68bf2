// SPDX-License-Identifier: GPL-3.0-or-later
use num_traits::PrimInt;

use crate::error::Error;
use crate::sample_clock::ClockSetting;
use crate::variant::{BeatSize, VariantDescriptor, VoltageReference};

pub trait Dac: DacDmaTrigger {
    type Sample: 'static + PrimInt;

    fn descriptor(&self) -> &'static VariantDescriptor;

    fn initialize(&mut self, reference: VoltageReference) -> Result<(), Error>;

    fn write(&mut self, sample: Self::Sample) -> Result<(), Error>;

    fn start_clock(&mut self, sample_rate: u32) -> Result<ClockSetting, Error>;

    fn stop_clock(&mut self) -> Result<(), Error>;

    fn max_sample(&self) -> Self::Sample;

    /// Channel 0 data register, as a DMA destination.
    fn dma_ptr(&self) -> *mut Self::Sample;
}

/// DACs with a second channel that can be updated together with the first.
pub trait DualDac: Dac {
    fn write_pair(&mut self, sample0: Self::Sample, sample1: Self::Sample) -> Result<(), Error>;
}

pub trait DacDmaTrigger {
    const DMA_TRIGGER_SOURCE: u8;
    const DMA_BEAT_SIZE: BeatSize;
}
