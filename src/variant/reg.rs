// SPDX-License-Identifier: GPL-3.0-or-later
//! Register tables describing where each chip keeps its DAC and sample-clock
//! timer, and which bits the bring-up sequence writes.

use crate::bus::{Bus, Reg};
use crate::variant::VoltageReference;

/// CTRLA bits shared by the DAC and TC peripherals on both chips.
pub const CTRLA_SWRST: u32 = 1 << 0;
pub const CTRLA_ENABLE: u32 = 1 << 1;

/// One or more status bits in a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Flag {
    pub reg: Reg,
    pub mask: u32,
}

impl Flag {
    pub const fn new(reg: Reg, mask: u32) -> Self {
        Self { reg, mask }
    }

    pub fn is_set<B: Bus + ?Sized>(&self, bus: &mut B) -> bool {
        self.reg.read(bus) & self.mask != 0
    }
}

/// A peripheral with its own write-synchronization domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    pub base: u32,
    pub span: u32,
    /// Set while a previous write is still crossing into the peripheral clock
    /// domain.
    pub sync: Flag,
    /// Self-clearing software reset bit, if the peripheral has one.
    pub reset: Option<Flag>,
}

impl Block {
    pub const fn contains(&self, addr: u32) -> bool {
        addr >= self.base && addr - self.base < self.span
    }
}

/// CTRLB REFSEL encodings for each voltage reference, already shifted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefSel {
    pub internal_1v: u32,
    pub supply: u32,
    pub external: u32,
}

impl RefSel {
    pub const fn bits(&self, reference: VoltageReference) -> u32 {
        match reference {
            VoltageReference::Internal1V => self.internal_1v,
            VoltageReference::Supply => self.supply,
            VoltageReference::External => self.external,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DacRegisters {
    pub block: Block,
    pub ctrla: Reg,
    pub ctrlb: Reg,
    pub evctrl: Reg,
    pub intenset: Reg,
    pub intflag: Reg,
    /// Data register per channel.
    pub data: &'static [Reg],
    /// Per-channel control registers whose enable bit must be set before the
    /// module-level enable. Empty on chips without them.
    pub channel_ctrl: &'static [Reg],
    pub channel_enable: u32,
    /// CTRLB bits written alongside the reference selection.
    pub ctrlb_base: u32,
    pub refsel: RefSel,
    /// Start-conversion event inputs and buffer-empty event outputs.
    pub evctrl_value: u32,
    pub empty_flags: u32,
    /// Whether CTRLB and EVCTRL must be written with the module enabled.
    pub enable_during_config: bool,
}

/// How the generic clock reaches the timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockRoute {
    /// A single CLKCTRL register shared by all channels, synchronized through
    /// the GCLK status register.
    Clkctrl { block: Block, reg: Reg, value: u32 },
    /// A dedicated peripheral channel register; the write has landed once the
    /// channel enable bit reads back as set.
    Pchctrl { reg: Reg, value: u32, enabled: Flag },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerRegisters {
    pub block: Block,
    pub route: ClockRoute,
    /// APB clock gate to open before touching the timer.
    pub bus_gate: Option<Flag>,
    pub ctrla: Reg,
    /// Counter mode, prescaler and (where it lives in CTRLA) waveform bits.
    pub config: u32,
    /// Separate waveform register and its value.
    pub wave: Option<(Reg, u32)>,
    /// CTRLBCLR register and the bits to clear in it.
    pub ctrlb_clear: Option<(Reg, u32)>,
    /// Compare or period register defining the trigger rate.
    pub period: Reg,
    /// Default frequency of the generator routed to the timer.
    pub generator_hz: u32,
    pub prescaler: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterMap {
    pub dac: DacRegisters,
    pub timer: TimerRegisters,
}

impl RegisterMap {
    /// Every synchronized block this chip's bring-up touches.
    pub fn blocks(&self) -> impl Iterator<Item = Block> {
        let gclk = match self.timer.route {
            ClockRoute::Clkctrl { block, .. } => Some(block),
            ClockRoute::Pchctrl { .. } => None,
        };
        [Some(self.dac.block), Some(self.timer.block), gclk]
            .into_iter()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_contains_is_half_open() {
        let block = Block {
            base: 0x4200_4800,
            span: 0x100,
            sync: Flag::new(Reg::r8(0x4200_4807), 0x80),
            reset: None,
        };
        assert!(block.contains(0x4200_4800));
        assert!(block.contains(0x4200_48ff));
        assert!(!block.contains(0x4200_4900));
        assert!(!block.contains(0x4200_47ff));
    }
}
