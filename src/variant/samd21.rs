// SPDX-License-Identifier: GPL-3.0-or-later
//! SAMD21: one 10-bit channel, sample clock from TC5 in 16-bit mode.

use super::reg::*;
use super::{BeatSize, VariantDescriptor};
use crate::bus::Reg;

const DAC: u32 = 0x4200_4800;
const GCLK: u32 = 0x4000_0C00;
const PM_APBCMASK: u32 = 0x4000_0420;
const TC5: u32 = 0x4200_3400;

const STATUS_SYNCBUSY: u32 = 1 << 7;

const DAC_SYNC: Flag = Flag::new(Reg::r8(DAC + 0x07), STATUS_SYNCBUSY);
const DAC_CTRLA: Reg = Reg::r8(DAC);
const DAC_DATA: [Reg; 1] = [Reg::r16(DAC + 0x08)];
const DAC_DATA_ADDRS: [u32; 1] = [DAC + 0x08];

// CTRLB
const EOEN: u32 = 1 << 0;
const IOEN: u32 = 1 << 1;
const BDWP: u32 = 1 << 4;
// EVCTRL
const STARTEI: u32 = 1 << 0;
const EMPTYEO: u32 = 1 << 1;
// INTFLAG / INTENSET
const EMPTY: u32 = 1 << 1;

const GCLK_CLKCTRL_CLKEN: u32 = 1 << 14;
const GCLK_GEN0: u32 = 0 << 8;
const GCM_TC4_TC5: u32 = 0x1C;

const PM_APBCMASK_TC5: u32 = 1 << 13;

const TC_CTRLA: Reg = Reg::r16(TC5);
const TC_MODE_COUNT16: u32 = 0 << 2;
const TC_WAVEGEN_MFRQ: u32 = 1 << 5;
const TC_PRESCALER_DIV1: u32 = 0 << 8;
const TC_CTRLBCLR_MASK: u32 = 0xC5;

const TC5_DMAC_ID_OVF: u8 = 0x1E;

/// 48 MHz GCLK0 feeding TC5 undivided.
const GCLK0_HZ: u32 = 48_000_000;

pub const DESCRIPTOR: VariantDescriptor = VariantDescriptor {
    name: "SAMD21",
    channel_count: 1,
    resolution_bits: 10,
    dma_beat_size: BeatSize::HWord,
    data_registers: &DAC_DATA_ADDRS,
    clock_trigger_id: TC5_DMAC_ID_OVF,
    timer: "TC5",
    base_clock_hz: GCLK0_HZ,
};

pub const REGISTERS: RegisterMap = RegisterMap {
    dac: DacRegisters {
        block: Block {
            base: DAC,
            span: 0x100,
            sync: DAC_SYNC,
            reset: Some(Flag::new(DAC_CTRLA, CTRLA_SWRST)),
        },
        ctrla: DAC_CTRLA,
        ctrlb: Reg::r8(DAC + 0x01),
        evctrl: Reg::r8(DAC + 0x02),
        intenset: Reg::r8(DAC + 0x05),
        intflag: Reg::r8(DAC + 0x06),
        data: &DAC_DATA,
        channel_ctrl: &[],
        channel_enable: 0,
        ctrlb_base: EOEN | IOEN | BDWP,
        refsel: RefSel {
            internal_1v: 0 << 6,
            supply: 1 << 6,
            external: 2 << 6,
        },
        evctrl_value: STARTEI | EMPTYEO,
        empty_flags: EMPTY,
        enable_during_config: true,
    },
    timer: TimerRegisters {
        block: Block {
            base: TC5,
            span: 0x40,
            sync: Flag::new(Reg::r8(TC5 + 0x0F), STATUS_SYNCBUSY),
            reset: Some(Flag::new(TC_CTRLA, CTRLA_SWRST)),
        },
        route: ClockRoute::Clkctrl {
            block: Block {
                base: GCLK,
                span: 0x10,
                sync: Flag::new(Reg::r8(GCLK + 0x01), STATUS_SYNCBUSY),
                reset: None,
            },
            reg: Reg::r16(GCLK + 0x02),
            value: GCLK_CLKCTRL_CLKEN | GCLK_GEN0 | GCM_TC4_TC5,
        },
        bus_gate: Some(Flag::new(Reg::r32(PM_APBCMASK), PM_APBCMASK_TC5)),
        ctrla: TC_CTRLA,
        config: TC_MODE_COUNT16 | TC_WAVEGEN_MFRQ | TC_PRESCALER_DIV1,
        wave: None,
        ctrlb_clear: Some((Reg::r8(TC5 + 0x04), TC_CTRLBCLR_MASK)),
        period: Reg::r16(TC5 + 0x18),
        generator_hz: GCLK0_HZ,
        prescaler: 1,
    },
};
