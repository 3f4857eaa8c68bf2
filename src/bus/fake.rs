// SPDX-License-Identifier: GPL-3.0-or-later
//! In-memory register file for running the sequencer without hardware.
//!
//! Registers are stored by address. Blocks registered with
//! [`FakeBus::with_block`] model write synchronization: any write into the
//! block keeps its sync flag (and, during a reset, its reset bit) reading as
//! set for the next `busy_polls` polls. A completed software reset zeroes
//! every register in the block. All accesses are logged in order.
//!
//! Storage is fixed-size. Touching more distinct registers or logging more
//! accesses than it holds panics instead of losing data.

use heapless::{FnvIndexMap, Vec};

use super::Bus;
use crate::variant::reg::Block;
use crate::variant::Variant;

const MAX_REGISTERS: usize = 64;
const MAX_BLOCKS: usize = 4;
const MAX_LOG: usize = 2048;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read { addr: u32, value: u32 },
    Write { addr: u32, value: u32 },
}

impl Access {
    pub fn is_write_to(&self, reg: u32) -> bool {
        matches!(*self, Self::Write { addr, .. } if addr == reg)
    }
}

struct SyncedBlock {
    block: Block,
    pending: u32,
    resetting: bool,
}

pub struct FakeBus {
    regs: FnvIndexMap<u32, u32, MAX_REGISTERS>,
    blocks: Vec<SyncedBlock, MAX_BLOCKS>,
    log: Vec<Access, MAX_LOG>,
    busy_polls: u32,
    stuck: bool,
    writes: usize,
    stick_after: Option<usize>,
}

impl FakeBus {
    /// A register file with no synchronized blocks: every flag reads clear.
    pub fn new() -> Self {
        Self {
            regs: FnvIndexMap::new(),
            blocks: Vec::new(),
            log: Vec::new(),
            busy_polls: 0,
            stuck: false,
            writes: 0,
            stick_after: None,
        }
    }

    /// A register file modelling every synchronized block of `V`, busy for
    /// two polls after each write.
    pub fn for_variant<V: Variant>() -> Self {
        V::registers()
            .blocks()
            .fold(Self::new(), Self::with_block)
            .busy_polls(2)
    }

    pub fn with_block(mut self, block: Block) -> Self {
        if self
            .blocks
            .push(SyncedBlock {
                block,
                pending: 0,
                resetting: false,
            })
            .is_err()
        {
            panic!("FakeBus holds at most {} blocks", MAX_BLOCKS);
        }
        self
    }

    /// Number of polls a sync flag stays set after a write.
    pub fn busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Once set, sync flags never clear again.
    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self.busy_polls = self.busy_polls.max(1);
        self
    }

    /// Behaves normally for the first `writes` writes, then as [`stuck`](Self::stuck).
    pub fn stuck_after(mut self, writes: usize) -> Self {
        self.stick_after = Some(writes);
        self
    }

    /// Stored value, without side effects or logging.
    pub fn peek(&self, addr: u32) -> u32 {
        self.regs.get(&addr).copied().unwrap_or(0)
    }

    pub fn accesses(&self) -> &[Access] {
        &self.log
    }

    /// Values written to `addr`, oldest first.
    pub fn writes_to(&self, addr: u32) -> impl Iterator<Item = u32> + '_ {
        self.log.iter().filter_map(move |a| match *a {
            Access::Write { addr: a, value } if a == addr => Some(value),
            _ => None,
        })
    }

    /// Index in the log of the first write to `addr`.
    pub fn first_write(&self, addr: u32) -> Option<usize> {
        self.log.iter().position(|a| a.is_write_to(addr))
    }

    /// Number of writes seen so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn store(&mut self, addr: u32, value: u32) {
        if self.regs.insert(addr, value).is_err() {
            panic!(
                "FakeBus register file full ({} registers), writing {:#010x}",
                MAX_REGISTERS, addr
            );
        }
    }

    fn record(&mut self, access: Access) {
        if self.log.push(access).is_err() {
            panic!("FakeBus access log full ({} entries)", MAX_LOG);
        }
    }

    fn block_index(&self, addr: u32) -> Option<usize> {
        self.blocks.iter().position(|b| b.block.contains(addr))
    }

    fn finish_reset(&mut self, index: usize) {
        let Some(b) = self.blocks.get_mut(index) else {
            return;
        };
        b.resetting = false;
        let block = b.block;

        let stale: Vec<u32, MAX_REGISTERS> = self
            .regs
            .keys()
            .copied()
            .filter(|addr| block.contains(*addr))
            .collect();
        for addr in stale {
            self.regs.remove(&addr);
        }
    }

    fn read(&mut self, addr: u32) -> u32 {
        let mut value = self.peek(addr);

        if let Some(index) = self.block_index(addr) {
            let stuck = self.stuck;
            let mut reset_done = false;
            if let Some(b) = self.blocks.get_mut(index) {
                let busy_mask = if addr == b.block.sync.reg.addr {
                    Some(b.block.sync.mask)
                } else {
                    b.block
                        .reset
                        .filter(|r| b.resetting && r.reg.addr == addr)
                        .map(|r| r.mask)
                };

                if let Some(mask) = busy_mask {
                    if b.pending > 0 {
                        value |= mask;
                        if !stuck {
                            b.pending -= 1;
                            reset_done = b.pending == 0 && b.resetting;
                        }
                    } else {
                        value &= !mask;
                    }
                }
            }
            if reset_done {
                self.finish_reset(index);
            }
        }

        self.record(Access::Read { addr, value });
        value
    }

    fn write(&mut self, addr: u32, value: u32) {
        self.record(Access::Write { addr, value });
        self.writes += 1;
        if self.stick_after.is_some_and(|n| self.writes > n) && !self.stuck {
            self.stuck = true;
            self.busy_polls = self.busy_polls.max(1);
        }

        let Some(index) = self.block_index(addr) else {
            self.store(addr, value);
            return;
        };

        let busy_polls = self.busy_polls;
        let mut reset_done = false;
        if let Some(b) = self.blocks.get_mut(index) {
            if addr == b.block.sync.reg.addr {
                // Status registers are read-only
                return;
            }
            if b
                .block
                .reset
                .is_some_and(|r| r.reg.addr == addr && value & r.mask != 0)
            {
                b.resetting = true;
            }
            b.pending = busy_polls;
            reset_done = b.pending == 0 && b.resetting;
        }

        self.store(addr, value);
        if reset_done {
            self.finish_reset(index);
        }
    }
}

impl Default for FakeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for FakeBus {
    fn read8(&mut self, addr: u32) -> u8 {
        self.read(addr) as u8
    }

    fn read16(&mut self, addr: u32) -> u16 {
        self.read(addr) as u16
    }

    fn read32(&mut self, addr: u32) -> u32 {
        self.read(addr)
    }

    fn write8(&mut self, addr: u32, value: u8) {
        self.write(addr, value as u32)
    }

    fn write16(&mut self, addr: u32, value: u16) {
        self.write(addr, value as u32)
    }

    fn write32(&mut self, addr: u32, value: u32) {
        self.write(addr, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Reg;
    use crate::variant::reg::Flag;

    const BLOCK: Block = Block {
        base: 0x1000,
        span: 0x20,
        sync: Flag::new(Reg::r32(0x1008), 0x3),
        reset: Some(Flag::new(Reg::r8(0x1000), 0x1)),
    };

    #[test]
    fn sync_flag_clears_after_configured_polls() {
        let mut bus = FakeBus::new().with_block(BLOCK).busy_polls(2);
        bus.write8(0x1001, 0x10);
        assert_eq!(bus.read32(0x1008), 0x3);
        assert_eq!(bus.read32(0x1008), 0x3);
        assert_eq!(bus.read32(0x1008), 0x0);
    }

    #[test]
    fn writes_outside_blocks_do_not_arm_sync() {
        let mut bus = FakeBus::new().with_block(BLOCK).busy_polls(2);
        bus.write8(0x2000, 0x10);
        assert_eq!(bus.read32(0x1008), 0);
        assert_eq!(bus.read8(0x2000), 0x10);
    }

    #[test]
    fn reset_bit_self_clears_and_wipes_block() {
        let mut bus = FakeBus::new().with_block(BLOCK).busy_polls(1);
        bus.write8(0x1001, 0x55);
        bus.write8(0x1000, 0x1);
        assert_eq!(bus.read8(0x1000), 0x1);
        assert_eq!(bus.read8(0x1000), 0x0);
        assert_eq!(bus.peek(0x1001), 0);
    }

    #[test]
    fn stuck_never_clears() {
        let mut bus = FakeBus::new().with_block(BLOCK).stuck();
        bus.write8(0x1001, 0x10);
        for _ in 0..100 {
            assert_eq!(bus.read32(0x1008) & 0x3, 0x3);
        }
    }

    #[test]
    fn sticks_after_given_write_count() {
        let mut bus = FakeBus::new().with_block(BLOCK).busy_polls(1).stuck_after(1);
        bus.write8(0x1001, 0x10);
        assert_eq!(bus.read32(0x1008), 0x3);
        assert_eq!(bus.read32(0x1008), 0x0);
        bus.write8(0x1001, 0x20);
        for _ in 0..100 {
            assert_eq!(bus.read32(0x1008) & 0x3, 0x3);
        }
        assert_eq!(bus.write_count(), 2);
    }

    #[test]
    fn keeps_every_register_up_to_capacity() {
        let mut bus = FakeBus::new();
        for i in 0..MAX_REGISTERS as u32 {
            bus.write32(0x2000_0000 + 4 * i, i + 1);
        }
        assert_eq!(bus.peek(0x2000_0000 + 4 * (MAX_REGISTERS as u32 - 1)), MAX_REGISTERS as u32);
    }

    #[test]
    #[should_panic(expected = "register file full")]
    fn register_overflow_panics() {
        let mut bus = FakeBus::new();
        for i in 0..=MAX_REGISTERS as u32 {
            bus.write32(0x2000_0000 + 4 * i, i);
        }
    }

    #[test]
    #[should_panic(expected = "access log full")]
    fn log_overflow_panics() {
        let mut bus = FakeBus::new();
        for i in 0..=MAX_LOG as u32 {
            bus.write32(0x2000_0000, i);
        }
    }

    #[test]
    fn log_keeps_program_order() {
        let mut bus = FakeBus::new();
        bus.write16(0x3000, 7);
        let _ = bus.read16(0x3000);
        assert_eq!(
            bus.accesses(),
            &[
                Access::Write {
                    addr: 0x3000,
                    value: 7
                },
                Access::Read {
                    addr: 0x3000,
                    value: 7
                },
            ]
        );
        assert_eq!(bus.first_write(0x3000), Some(0));
        assert_eq!(bus.writes_to(0x3000).collect::<std::vec::Vec<_>>(), [7]);
    }
}
