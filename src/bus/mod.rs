// SPDX-License-Identifier: GPL-3.0-or-later
//! Register access.
//!
//! Everything the sequencer does to the hardware goes through [`Bus`], so the
//! same bring-up code runs against real memory-mapped registers ([`Mmio`]) or
//! an in-memory register file (`FakeBus`, behind the `fake` feature).

#[cfg(any(test, feature = "fake"))]
pub mod fake;

/// Volatile access to peripheral registers at absolute addresses.
pub trait Bus {
    fn read8(&mut self, addr: u32) -> u8;
    fn read16(&mut self, addr: u32) -> u16;
    fn read32(&mut self, addr: u32) -> u32;

    fn write8(&mut self, addr: u32, value: u8);
    fn write16(&mut self, addr: u32, value: u16);
    fn write32(&mut self, addr: u32, value: u32);
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn read8(&mut self, addr: u32) -> u8 {
        (**self).read8(addr)
    }

    fn read16(&mut self, addr: u32) -> u16 {
        (**self).read16(addr)
    }

    fn read32(&mut self, addr: u32) -> u32 {
        (**self).read32(addr)
    }

    fn write8(&mut self, addr: u32, value: u8) {
        (**self).write8(addr, value)
    }

    fn write16(&mut self, addr: u32, value: u16) {
        (**self).write16(addr, value)
    }

    fn write32(&mut self, addr: u32, value: u32) {
        (**self).write32(addr, value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Width {
    Byte,
    HalfWord,
    Word,
}

/// A single register: where it is and how wide an access it takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reg {
    pub addr: u32,
    pub width: Width,
}

impl Reg {
    pub const fn r8(addr: u32) -> Self {
        Self {
            addr,
            width: Width::Byte,
        }
    }

    pub const fn r16(addr: u32) -> Self {
        Self {
            addr,
            width: Width::HalfWord,
        }
    }

    pub const fn r32(addr: u32) -> Self {
        Self {
            addr,
            width: Width::Word,
        }
    }

    /// Reads the register, zero-extended.
    pub fn read<B: Bus + ?Sized>(&self, bus: &mut B) -> u32 {
        match self.width {
            Width::Byte => bus.read8(self.addr) as u32,
            Width::HalfWord => bus.read16(self.addr) as u32,
            Width::Word => bus.read32(self.addr),
        }
    }

    /// Writes the register. Bits above the register width are dropped.
    pub fn write<B: Bus + ?Sized>(&self, bus: &mut B, value: u32) {
        match self.width {
            Width::Byte => bus.write8(self.addr, value as u8),
            Width::HalfWord => bus.write16(self.addr, value as u16),
            Width::Word => bus.write32(self.addr, value),
        }
    }

    pub fn modify<B: Bus + ?Sized, F>(&self, bus: &mut B, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(bus);
        self.write(bus, f(value));
    }

    pub fn set_bits<B: Bus + ?Sized>(&self, bus: &mut B, mask: u32) {
        self.modify(bus, |r| r | mask);
    }

    pub fn clear_bits<B: Bus + ?Sized>(&self, bus: &mut B, mask: u32) {
        self.modify(bus, |r| r & !mask);
    }
}

/// Memory-mapped registers of the running chip.
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Safety: the caller must be the only code touching the DAC, GCLK, PM/MCLK
    /// and sample-clock timer register blocks for as long as this value (or the
    /// [`ZeroDac`](crate::ZeroDac) built from it) exists, and must only use it
    /// on the chip whose register table it is paired with.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl Bus for Mmio {
    fn read8(&mut self, addr: u32) -> u8 {
        unsafe { core::ptr::read_volatile(addr as usize as *const u8) }
    }

    fn read16(&mut self, addr: u32) -> u16 {
        unsafe { core::ptr::read_volatile(addr as usize as *const u16) }
    }

    fn read32(&mut self, addr: u32) -> u32 {
        unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
    }

    fn write8(&mut self, addr: u32, value: u8) {
        unsafe { core::ptr::write_volatile(addr as usize as *mut u8, value) }
    }

    fn write16(&mut self, addr: u32, value: u16) {
        unsafe { core::ptr::write_volatile(addr as usize as *mut u16, value) }
    }

    fn write32(&mut self, addr: u32, value: u32) {
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) }
    }
}
