// SPDX-License-Identifier: GPL-3.0-or-later
//! SAMD51: two 12-bit channels, sample clock from TC2 in 8-bit mode.

use super::reg::*;
use super::{BeatSize, VariantDescriptor};
use crate::bus::Reg;

const DAC: u32 = 0x4300_2400;
const GCLK: u32 = 0x4000_1C00;
const TC2: u32 = 0x4101_A000;

const SYNCBUSY_SWRST: u32 = 1 << 0;
const SYNCBUSY_ENABLE: u32 = 1 << 1;
const TC_SYNCBUSY_PER: u32 = 1 << 5;

const DAC_CTRLA: Reg = Reg::r8(DAC);
const DAC_DATA: [Reg; 2] = [Reg::r16(DAC + 0x10), Reg::r16(DAC + 0x12)];
const DAC_DATA_ADDRS: [u32; 2] = [DAC + 0x10, DAC + 0x12];
const DAC_DACCTRL: [Reg; 2] = [Reg::r16(DAC + 0x0C), Reg::r16(DAC + 0x0E)];
const DACCTRL_ENABLE: u32 = 1 << 1;

// CTRLB REFSEL
const REFSEL_VDDANA: u32 = 1 << 1;
const REFSEL_VREFPU: u32 = 2 << 1;
const REFSEL_INTREF: u32 = 3 << 1;
// EVCTRL
const STARTEI0: u32 = 1 << 0;
const STARTEI1: u32 = 1 << 1;
const EMPTYEO0: u32 = 1 << 2;
const EMPTYEO1: u32 = 1 << 3;
// INTFLAG / INTENSET
const EMPTY0: u32 = 1 << 2;
const EMPTY1: u32 = 1 << 3;

const TC2_GCLK_ID: u32 = 26;
const GCLK_PCHCTRL: Reg = Reg::r32(GCLK + 0x80 + TC2_GCLK_ID * 4);
const GCLK_PCHCTRL_CHEN: u32 = 1 << 6;
const GCLK_GEN2: u32 = 2;

const TC_CTRLA: Reg = Reg::r32(TC2);
const TC_MODE_COUNT8: u32 = 1 << 2;
const TC_PRESCALER_DIV16: u32 = 4 << 8;
const TC_WAVEGEN_NFRQ: u32 = 0;

const TC2_DMAC_ID_OVF: u8 = 0x32;

/// 100 MHz GCLK2, divided by 16 in the timer.
const GCLK2_HZ: u32 = 100_000_000;

pub const DESCRIPTOR: VariantDescriptor = VariantDescriptor {
    name: "SAMD51",
    channel_count: 2,
    resolution_bits: 12,
    dma_beat_size: BeatSize::Word,
    data_registers: &DAC_DATA_ADDRS,
    clock_trigger_id: TC2_DMAC_ID_OVF,
    timer: "TC2",
    base_clock_hz: GCLK2_HZ,
};

pub const REGISTERS: RegisterMap = RegisterMap {
    dac: DacRegisters {
        block: Block {
            base: DAC,
            span: 0x40,
            sync: Flag::new(Reg::r32(DAC + 0x08), SYNCBUSY_ENABLE | SYNCBUSY_SWRST),
            reset: Some(Flag::new(DAC_CTRLA, CTRLA_SWRST)),
        },
        ctrla: DAC_CTRLA,
        ctrlb: Reg::r8(DAC + 0x01),
        evctrl: Reg::r8(DAC + 0x02),
        intenset: Reg::r8(DAC + 0x05),
        intflag: Reg::r8(DAC + 0x06),
        data: &DAC_DATA,
        channel_ctrl: &DAC_DACCTRL,
        channel_enable: DACCTRL_ENABLE,
        ctrlb_base: 0,
        refsel: RefSel {
            internal_1v: REFSEL_INTREF,
            supply: REFSEL_VDDANA,
            external: REFSEL_VREFPU,
        },
        evctrl_value: STARTEI0 | STARTEI1 | EMPTYEO0 | EMPTYEO1,
        empty_flags: EMPTY0 | EMPTY1,
        // CTRLB, EVCTRL and DACCTRL are enable-protected
        enable_during_config: false,
    },
    timer: TimerRegisters {
        block: Block {
            base: TC2,
            span: 0x40,
            sync: Flag::new(
                Reg::r32(TC2 + 0x10),
                SYNCBUSY_ENABLE | SYNCBUSY_SWRST | TC_SYNCBUSY_PER,
            ),
            reset: Some(Flag::new(TC_CTRLA, CTRLA_SWRST)),
        },
        route: ClockRoute::Pchctrl {
            reg: GCLK_PCHCTRL,
            value: GCLK_PCHCTRL_CHEN | GCLK_GEN2,
            enabled: Flag::new(GCLK_PCHCTRL, GCLK_PCHCTRL_CHEN),
        },
        bus_gate: None,
        ctrla: TC_CTRLA,
        config: TC_MODE_COUNT8 | TC_PRESCALER_DIV16,
        wave: Some((Reg::r8(TC2 + 0x0C), TC_WAVEGEN_NFRQ)),
        ctrlb_clear: None,
        period: Reg::r8(TC2 + 0x1B),
        generator_hz: GCLK2_HZ,
        prescaler: 16,
    },
};
