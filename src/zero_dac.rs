// SPDX-License-Identifier: GPL-3.0-or-later
//! The DAC bring-up and write sequencer.

use crate::bus::Bus;
use crate::config::Config;
use crate::dac::{Dac, DacDmaTrigger, DualDac};
use crate::error::Error;
use crate::sample_clock::{ClockSetting, SampleClock};
use crate::sync;
use crate::variant::reg::{DacRegisters, CTRLA_ENABLE};
use crate::variant::{BeatSize, MultiChannel, State, Variant, VariantDescriptor, VoltageReference};

/// DAC of chip `V`, with the timer that paces it, driven through `B`.
pub struct ZeroDac<V: Variant, B: Bus> {
    bus: B,
    config: Config,
    state: State,
    reference: Option<VoltageReference>,
    clock: SampleClock<V>,
}

impl<V: Variant, B: Bus> ZeroDac<V, B> {
    /// Takes ownership of the bus. No register is touched until
    /// [`initialize`](Self::initialize).
    pub fn new(bus: B, config: Config) -> Self {
        Self {
            bus,
            config,
            state: State::Uninitialized,
            reference: None,
            clock: SampleClock::new(),
        }
    }

    /// Gives the bus back. The hardware is left as it is.
    pub fn release(self) -> B {
        self.bus
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn descriptor(&self) -> &'static VariantDescriptor {
        V::descriptor()
    }

    pub fn dac_state(&self) -> State {
        self.state
    }

    pub fn clock_state(&self) -> State {
        self.clock.state()
    }

    /// Reference selected by the last successful [`initialize`](Self::initialize).
    pub fn reference(&self) -> Option<VoltageReference> {
        self.reference
    }

    /// Last programmed sample clock, kept while the clock is stopped.
    pub fn clock_setting(&self) -> Option<ClockSetting> {
        self.clock.setting()
    }

    pub fn channel_count(&self) -> u8 {
        V::descriptor().channel_count()
    }

    pub fn resolution_bits(&self) -> u8 {
        V::descriptor().resolution_bits()
    }

    pub fn dma_beat_size(&self) -> BeatSize {
        V::descriptor().dma_beat_size()
    }

    pub fn clock_trigger_id(&self) -> u8 {
        V::descriptor().clock_trigger_id()
    }

    /// Largest value the converter resolves. Wider values are written as
    /// given and truncated by the hardware.
    pub fn max_sample(&self) -> u16 {
        V::descriptor().max_sample()
    }

    /// Address a DMA channel should target to feed `channel`.
    pub fn data_register_address(&self, channel: u8) -> Result<u32, Error> {
        V::descriptor()
            .data_register(channel)
            .ok_or_else(|| self.unsupported(channel))
    }

    /// Resets the DAC and configures it for timer-triggered conversions with
    /// buffer-empty events, using `reference` as full scale.
    ///
    /// Can be called again at any time to reconfigure from scratch.
    pub fn initialize(&mut self, reference: VoltageReference) -> Result<(), Error> {
        self.state = State::Uninitialized;
        self.reference = None;

        Self::configure(&mut self.bus, &self.config, reference)?;

        self.state = State::Enabled;
        self.reference = Some(reference);
        info!(
            "{} DAC enabled, {} reference",
            V::descriptor().name,
            reference.name()
        );
        Ok(())
    }

    fn configure(bus: &mut B, config: &Config, reference: VoltageReference) -> Result<(), Error> {
        let dac: &DacRegisters = &V::registers().dac;
        let policy = config.sync;
        let sync = &dac.block.sync;

        debug!("DAC: reset");
        sync::software_reset(bus, &dac.block, policy)?;

        let ctrla = if dac.enable_during_config {
            CTRLA_ENABLE
        } else {
            0
        };
        dac.ctrla.write(bus, ctrla);
        policy.wait_clear(bus, sync)?;

        let ctrlb = dac.ctrlb_base | dac.refsel.bits(reference);
        trace!("DAC: CTRLB {:#x}", ctrlb);
        dac.ctrlb.write(bus, ctrlb);
        policy.wait_clear(bus, sync)?;

        dac.evctrl.write(bus, dac.evctrl_value);
        policy.wait_clear(bus, sync)?;

        // Flags are write-one-to-clear
        dac.intflag.write(bus, dac.empty_flags);
        policy.wait_clear(bus, sync)?;
        dac.intenset.write(bus, dac.empty_flags);
        policy.wait_clear(bus, sync)?;

        for ctrl in dac.channel_ctrl {
            ctrl.set_bits(bus, dac.channel_enable);
        }
        policy.wait_clear(bus, sync)?;

        dac.ctrla.write(bus, CTRLA_ENABLE);
        policy.wait_clear(bus, sync)
    }

    /// Writes a sample to channel 0.
    pub fn write(&mut self, sample: u16) -> Result<(), Error> {
        self.write_channel(0, sample)
    }

    pub fn write_channel(&mut self, channel: u8, sample: u16) -> Result<(), Error> {
        let data = V::registers()
            .dac
            .data
            .get(channel as usize)
            .ok_or_else(|| self.unsupported(channel))?;
        self.ensure_enabled()?;

        let result = self
            .config
            .sync
            .wait_clear(&mut self.bus, &V::registers().dac.block.sync);
        self.check(result)?;
        data.write(&mut self.bus, sample as u32);
        Ok(())
    }

    pub fn start_clock(&mut self, sample_rate: u32) -> Result<ClockSetting, Error> {
        self.clock.start(&mut self.bus, &self.config, sample_rate)
    }

    /// Stops triggering conversions. The timer keeps its configuration.
    pub fn stop_clock(&mut self) -> Result<(), Error> {
        self.clock.stop(&mut self.bus, self.config.sync)
    }

    /// Restarts the sample clock at a new rate.
    ///
    /// Not atomic with respect to a running DMA stream; pause it first.
    pub fn set_rate(&mut self, sample_rate: u32) -> Result<ClockSetting, Error> {
        self.stop_clock()?;
        self.start_clock(sample_rate)
    }

    fn ensure_enabled(&self) -> Result<(), Error> {
        match self.state {
            State::Enabled => Ok(()),
            _ => Err(Error::NotInitialized),
        }
    }

    fn check<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        if result.is_err() {
            self.state = State::Uninitialized;
        }
        result
    }

    fn unsupported(&self, channel: u8) -> Error {
        Error::UnsupportedChannel {
            channel,
            channel_count: V::descriptor().channel_count(),
        }
    }
}

impl<V: MultiChannel, B: Bus> ZeroDac<V, B> {
    /// Writes both channels, channel 0 first.
    ///
    /// Only two-channel chips have it:
    ///
    /// ```
    /// use zero_dac::{Error, Mmio, Samd51Dac};
    ///
    /// fn stereo(dac: &mut Samd51Dac<Mmio>) -> Result<(), Error> {
    ///     dac.write_pair(0, 4095)
    /// }
    /// ```
    ///
    /// ```compile_fail
    /// use zero_dac::{Error, Mmio, Samd21Dac};
    ///
    /// fn stereo(dac: &mut Samd21Dac<Mmio>) -> Result<(), Error> {
    ///     dac.write_pair(0, 1023)
    /// }
    /// ```
    pub fn write_pair(&mut self, sample0: u16, sample1: u16) -> Result<(), Error> {
        self.write_channel(0, sample0)?;
        self.write_channel(1, sample1)
    }
}

impl<V: Variant, B: Bus> Dac for ZeroDac<V, B>
where
    Self: DacDmaTrigger,
{
    type Sample = u16;

    fn descriptor(&self) -> &'static VariantDescriptor {
        V::descriptor()
    }

    fn initialize(&mut self, reference: VoltageReference) -> Result<(), Error> {
        ZeroDac::initialize(self, reference)
    }

    fn write(&mut self, sample: u16) -> Result<(), Error> {
        ZeroDac::write(self, sample)
    }

    fn start_clock(&mut self, sample_rate: u32) -> Result<ClockSetting, Error> {
        ZeroDac::start_clock(self, sample_rate)
    }

    fn stop_clock(&mut self) -> Result<(), Error> {
        ZeroDac::stop_clock(self)
    }

    fn max_sample(&self) -> u16 {
        ZeroDac::max_sample(self)
    }

    fn dma_ptr(&self) -> *mut u16 {
        V::registers().dac.data.first().map_or(0, |r| r.addr) as usize as *mut u16
    }
}

impl<V: MultiChannel, B: Bus> DualDac for ZeroDac<V, B>
where
    Self: DacDmaTrigger,
{
    fn write_pair(&mut self, sample0: u16, sample1: u16) -> Result<(), Error> {
        ZeroDac::write_pair(self, sample0, sample1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::fake::FakeBus;
    use crate::sync::SyncPolicy;
    use crate::variant::{Samd21, Samd51};

    fn samd21() -> ZeroDac<Samd21, FakeBus> {
        ZeroDac::new(FakeBus::for_variant::<Samd21>(), Config::default())
    }

    fn samd51() -> ZeroDac<Samd51, FakeBus> {
        ZeroDac::new(FakeBus::for_variant::<Samd51>(), Config::default())
    }

    #[test]
    fn new_touches_nothing() {
        let dac = samd21();
        assert!(dac.bus().accesses().is_empty());
        assert_eq!(dac.dac_state(), State::Uninitialized);
        assert_eq!(dac.clock_state(), State::Uninitialized);
    }

    #[test]
    fn keeps_config() {
        let config = Config {
            sync: SyncPolicy::Unbounded,
            ..Config::default()
        };
        let dac = ZeroDac::<Samd51, _>::new(FakeBus::for_variant::<Samd51>(), config);
        assert_eq!(dac.config(), &config);
        assert_eq!(dac.config().timer_input_hz::<Samd51>(), 6_250_000);
    }

    #[test]
    fn write_before_initialize_is_rejected() {
        let mut dac = samd21();
        assert_eq!(dac.write(512), Err(Error::NotInitialized));
        assert!(dac.bus().accesses().is_empty());
    }

    #[test]
    fn samd21_initialize_programs_registers() {
        let mut dac = samd21();
        dac.initialize(VoltageReference::Supply).unwrap();
        let bus = dac.release();
        // ENABLE
        assert_eq!(bus.peek(0x4200_4800), 0x02);
        // EOEN | IOEN | BDWP | REFSEL=AVCC
        assert_eq!(bus.peek(0x4200_4801), 0x53);
        assert_eq!(bus.peek(0x4200_4802), 0x03);
        assert_eq!(bus.peek(0x4200_4805), 0x02);
    }

    #[test]
    fn samd51_initialize_enables_channels_before_module() {
        let mut dac = samd51();
        dac.initialize(VoltageReference::Internal1V).unwrap();
        assert_eq!(dac.reference(), Some(VoltageReference::Internal1V));
        let bus = dac.release();
        assert_eq!(bus.peek(0x4300_2401), 0x06);
        assert_eq!(bus.peek(0x4300_2402), 0x0F);
        assert_eq!(bus.peek(0x4300_240C), 0x02);
        assert_eq!(bus.peek(0x4300_240E), 0x02);

        let last_dacctrl = bus.first_write(0x4300_240E).unwrap();
        let enable = bus
            .accesses()
            .iter()
            .rposition(|a| a.is_write_to(0x4300_2400))
            .unwrap();
        assert!(last_dacctrl < enable);
        assert_eq!(bus.writes_to(0x4300_2400).last(), Some(0x02));
    }

    #[test]
    fn write_goes_to_channel_0() {
        let mut dac = samd21();
        dac.initialize(VoltageReference::Supply).unwrap();
        dac.write(0x3FF).unwrap();
        assert_eq!(dac.bus().peek(0x4200_4808), 0x3FF);
    }

    #[test]
    fn wide_samples_are_not_clamped() {
        let mut dac = samd21();
        dac.initialize(VoltageReference::Supply).unwrap();
        dac.write(0xFFFF).unwrap();
        assert_eq!(dac.bus().peek(0x4200_4808), 0xFFFF);
    }

    #[test]
    fn second_channel_missing_on_samd21() {
        let mut dac = samd21();
        dac.initialize(VoltageReference::Supply).unwrap();
        let expected = Error::UnsupportedChannel {
            channel: 1,
            channel_count: 1,
        };
        assert_eq!(dac.write_channel(1, 0), Err(expected));
        assert_eq!(dac.data_register_address(1), Err(expected));
        assert_eq!(dac.data_register_address(0), Ok(0x4200_4808));
    }

    #[test]
    fn write_pair_fills_both_registers() {
        let mut dac = samd51();
        dac.initialize(VoltageReference::Supply).unwrap();
        dac.write_pair(100, 4000).unwrap();
        assert_eq!(dac.bus().peek(0x4300_2410), 100);
        assert_eq!(dac.bus().peek(0x4300_2412), 4000);
    }

    #[test]
    fn timeout_during_initialize_leaves_dac_uninitialized() {
        let config = Config {
            sync: SyncPolicy::Bounded { polls: 8 },
            ..Config::default()
        };
        let mut dac = ZeroDac::<Samd21, _>::new(FakeBus::for_variant::<Samd21>().stuck(), config);
        assert_eq!(
            dac.initialize(VoltageReference::Supply),
            Err(Error::PeripheralTimeout {
                register: 0x4200_4807
            })
        );
        assert_eq!(dac.dac_state(), State::Uninitialized);
        assert_eq!(dac.reference(), None);
        assert_eq!(dac.write(0), Err(Error::NotInitialized));
    }

    #[test]
    fn dma_constants() {
        assert_eq!(<ZeroDac<Samd21, FakeBus> as DacDmaTrigger>::DMA_TRIGGER_SOURCE, 0x1E);
        assert_eq!(<ZeroDac<Samd51, FakeBus> as DacDmaTrigger>::DMA_BEAT_SIZE, BeatSize::Word);
        let dac = samd51();
        assert_eq!(Dac::dma_ptr(&dac) as usize, 0x4300_2410);
    }
}
