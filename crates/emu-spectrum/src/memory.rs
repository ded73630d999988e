//! Spectrum memory subsystem.
//!
//! Memory layout varies by model. The trait abstracts banking differences
//! so the bus doesn't need to know which model is active. Every address
//! resolves to exactly one byte: a ROM byte below $4000, a RAM byte above.

#![allow(clippy::large_stack_arrays)] // Intentional: 48K RAM is the full usable address space.

use sinclair_ula::SCREEN_SIZE;

use crate::config::{RomError, SpectrumModel, check_rom};

/// Size of one ROM or RAM page.
const PAGE: usize = 0x4000;

/// Memory interface for both Spectrum variants.
pub trait SpectrumMemory {
    fn model(&self) -> SpectrumModel;

    /// Read a byte from the given address.
    fn read(&self, addr: u16) -> u8;

    /// Write a byte to the given address. ROM writes are silently ignored.
    fn write(&mut self, addr: u16, val: u8);

    /// Write the bank register ($7FFD). No-op on 48K.
    fn write_bank_register(&mut self, _value: u8) {}

    /// Last value accepted by the bank register. Always 0 on 48K.
    fn bank_register(&self) -> u8 {
        0
    }

    /// Restore power-on paging. RAM contents survive.
    fn reset(&mut self) {}

    /// Which RAM bank holds the current screen? Always 5 on 48K.
    fn screen_bank(&self) -> u8 {
        5
    }

    /// Bitmap and attributes of the displayed screen, `SCREEN_SIZE` bytes.
    fn screen(&self) -> &[u8];
}

/// 48K Spectrum memory: 16K ROM + 48K RAM.
///
/// Layout:
/// - $0000-$3FFF: ROM (writes ignored)
/// - $4000-$FFFF: RAM, screen at $4000
pub struct Memory48K {
    rom: [u8; PAGE],
    ram: [u8; 0xC000],
}

impl Memory48K {
    /// Create a new 48K memory with the given 16K ROM image.
    pub fn new(rom: &[u8]) -> Result<Self, RomError> {
        check_rom(SpectrumModel::Spectrum48K, rom)?;
        let mut memory = Self {
            rom: [0; PAGE],
            ram: [0; 0xC000],
        };
        memory.rom.copy_from_slice(rom);
        Ok(memory)
    }
}

impl SpectrumMemory for Memory48K {
    fn model(&self) -> SpectrumModel {
        SpectrumModel::Spectrum48K
    }

    fn read(&self, addr: u16) -> u8 {
        let addr = addr as usize;
        if addr < PAGE {
            self.rom[addr]
        } else {
            self.ram[addr - PAGE]
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        let addr = addr as usize;
        if addr >= PAGE {
            self.ram[addr - PAGE] = val;
        }
    }

    fn screen(&self) -> &[u8] {
        &self.ram[..SCREEN_SIZE]
    }
}

/// 128K Spectrum memory: 2×16K ROM + 8×16K RAM with bank switching.
///
/// Layout:
/// - $0000-$3FFF: ROM bank 0 or 1 (bit 4 of $7FFD)
/// - $4000-$7FFF: Always RAM bank 5
/// - $8000-$BFFF: Always RAM bank 2
/// - $C000-$FFFF: Switchable RAM bank 0-7 (bits 0-2 of $7FFD)
///
/// Bit 3 of $7FFD selects the shadow screen (bank 7 instead of bank 5).
/// Bit 5 of $7FFD locks the bank register until reset.
pub struct Memory128K {
    rom: [[u8; PAGE]; 2],
    ram: [Box<[u8; PAGE]>; 8],
    /// $7FFD register value.
    bank_reg: u8,
    /// Once bit 5 is set, further writes to $7FFD are ignored.
    locked: bool,
}

impl Memory128K {
    /// Create a new 128K memory.
    ///
    /// A 32K image supplies ROM 0 (128K editor) then ROM 1 (48K BASIC). A
    /// 16K image is mirrored into both slots.
    pub fn new(rom: &[u8]) -> Result<Self, RomError> {
        check_rom(SpectrumModel::Spectrum128K, rom)?;
        let mut memory = Self {
            rom: [[0; PAGE]; 2],
            ram: std::array::from_fn(|_| Box::new([0u8; PAGE])),
            bank_reg: 0,
            locked: false,
        };
        memory.rom[0].copy_from_slice(&rom[..PAGE]);
        memory.rom[1].copy_from_slice(&rom[rom.len() - PAGE..]);
        Ok(memory)
    }

    /// Selected ROM bank (0 or 1).
    fn rom_bank(&self) -> usize {
        ((self.bank_reg >> 4) & 1) as usize
    }

    /// Selected RAM bank at $C000 (0-7).
    fn page_bank(&self) -> usize {
        (self.bank_reg & 0x07) as usize
    }

    /// Whether bank register writes are currently ignored.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl SpectrumMemory for Memory128K {
    fn model(&self) -> SpectrumModel {
        SpectrumModel::Spectrum128K
    }

    fn read(&self, addr: u16) -> u8 {
        let a = addr as usize;
        match a {
            0x0000..0x4000 => self.rom[self.rom_bank()][a],
            0x4000..0x8000 => self.ram[5][a - 0x4000],
            0x8000..0xC000 => self.ram[2][a - 0x8000],
            _ => self.ram[self.page_bank()][a - 0xC000],
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        let a = addr as usize;
        match a {
            0x0000..0x4000 => {}
            0x4000..0x8000 => self.ram[5][a - 0x4000] = val,
            0x8000..0xC000 => self.ram[2][a - 0x8000] = val,
            _ => {
                let bank = self.page_bank();
                self.ram[bank][a - 0xC000] = val;
            }
        }
    }

    fn write_bank_register(&mut self, value: u8) {
        if !self.locked {
            self.bank_reg = value;
            self.locked = value & 0x20 != 0;
        }
    }

    fn bank_register(&self) -> u8 {
        self.bank_reg
    }

    fn reset(&mut self) {
        self.bank_reg = 0;
        self.locked = false;
    }

    fn screen_bank(&self) -> u8 {
        if self.bank_reg & 0x08 != 0 { 7 } else { 5 }
    }

    fn screen(&self) -> &[u8] {
        &self.ram[self.screen_bank() as usize][..SCREEN_SIZE]
    }
}

/// Build the memory for `model`.
pub fn for_model(model: SpectrumModel, rom: &[u8]) -> Result<Box<dyn SpectrumMemory>, RomError> {
    Ok(match model {
        SpectrumModel::Spectrum48K => Box::new(Memory48K::new(rom)?),
        SpectrumModel::Spectrum128K => Box::new(Memory128K::new(rom)?),
    })
}
