//! Spectrum bus: memory and I/O routing.
//!
//! The bus connects the Z80 CPU to memory, the ULA port, the keyboard
//! matrix and the Kempston latch. Routing is model-aware only through the
//! memory: $7FFD writes reach the paging register, which the 48K ignores.
//!
//! # Ports
//!
//! | Decode                    | Read                      | Write          |
//! |---------------------------|---------------------------|----------------|
//! | bit 0 clear ($FE)         | keyboard, EAR             | border, MIC    |
//! | low byte $1F              | Kempston latch            | -              |
//! | `port & 0x8002 == 0`      | -                         | $7FFD paging   |
//! | anything else             | $FF (idle bus)            | ignored        |

#![allow(clippy::cast_possible_truncation)]

use emu_core::Bus;
use sinclair_ula::{PaletteMode, ScreenView, decode, render};

use crate::config::{RomError, SpectrumModel};
use crate::input::{JoystickTarget, SpectrumKey};
use crate::keyboard::KeyMatrix;
use crate::memory::{self, SpectrumMemory};

/// Opcode bytes of `JP $0000`, placed on the data bus during an interrupt
/// acknowledge for IM 0.
pub const INTERRUPT_VECTOR: u32 = 0xC300_0000;

/// Peripheral registers that sit beside memory.
///
/// Palette and flash phase are not hardware registers, but they decide how
/// the screen is rendered and survive a reset like the rest of this set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Peripherals {
    /// Border colour, 0-7.
    pub border: u8,
    /// Last value written to port $FE (for EAR loopback).
    pub last_fe_write: u8,
    pub palette: PaletteMode,
    pub flash_phase: bool,
}

/// The Spectrum bus, implementing `emu_core::Bus`.
///
/// Owns the memory, keyboard matrix and Kempston latch. The CPU accesses
/// all of these through the `Bus` trait.
pub struct SpectrumBus {
    pub memory: Box<dyn SpectrumMemory>,
    pub keyboard: KeyMatrix,
    /// Kempston joystick state: bits 0-4 = right, left, down, up, fire (active-high).
    pub kempston: u8,
    pub peripherals: Peripherals,
}

impl SpectrumBus {
    #[must_use]
    pub fn new(memory: Box<dyn SpectrumMemory>) -> Self {
        Self {
            memory,
            keyboard: KeyMatrix::new(),
            kempston: 0,
            peripherals: Peripherals::default(),
        }
    }

    /// Build a bus with fresh memory for `model`.
    pub fn for_model(model: SpectrumModel, rom: &[u8]) -> Result<Self, RomError> {
        Ok(Self::new(memory::for_model(model, rom)?))
    }

    #[must_use]
    pub fn model(&self) -> SpectrumModel {
        self.memory.model()
    }

    /// Restore power-on paging and clear the border and port latch.
    ///
    /// RAM, keys, the Kempston latch, palette and flash phase are kept.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.peripherals.border = 0;
        self.peripherals.last_fe_write = 0;
    }

    /// Live view of the displayed screen bank.
    #[must_use]
    pub fn framebuffer(&self) -> ScreenView<'_> {
        ScreenView::new(self.memory.screen())
    }

    #[must_use]
    pub fn border(&self) -> u8 {
        self.peripherals.border
    }

    pub fn set_border(&mut self, colour: u8) {
        self.peripherals.border = colour & 0x07;
    }

    #[must_use]
    pub fn palette(&self) -> PaletteMode {
        self.peripherals.palette
    }

    pub fn set_palette(&mut self, palette: PaletteMode) {
        self.peripherals.palette = palette;
    }

    #[must_use]
    pub fn flash_phase(&self) -> bool {
        self.peripherals.flash_phase
    }

    pub fn set_flash_phase(&mut self, phase: bool) {
        self.peripherals.flash_phase = phase;
    }

    /// Colour indices for the 256×192 display area.
    #[must_use]
    pub fn decode_screen(&self) -> Vec<u8> {
        decode(&self.framebuffer(), self.peripherals.flash_phase)
    }

    /// Render screen and border into a 320×288 ARGB framebuffer.
    pub fn render(&self, framebuffer: &mut [u32]) {
        let p = self.peripherals;
        render(&self.framebuffer(), p.flash_phase, p.border, p.palette, framebuffer);
    }

    /// Copy `data` into memory from `start`, through the current paging.
    /// Bytes that would pass $FFFF are dropped.
    pub fn load_block(&mut self, start: u16, data: &[u8]) {
        for (addr, &byte) in (start..=u16::MAX).zip(data) {
            self.memory.write(addr, byte);
        }
    }

    /// Read `len` bytes from `start`, stopping at $FFFF.
    #[must_use]
    pub fn dump_block(&self, start: u16, len: usize) -> Vec<u8> {
        (start..=u16::MAX)
            .take(len)
            .map(|addr| self.memory.read(addr))
            .collect()
    }

    pub fn set_key(&mut self, key: SpectrumKey, pressed: bool) {
        let (row, col) = key.matrix();
        self.keyboard.set(row, col, pressed);
    }

    /// Press or release a joystick target: a matrix key or Kempston bits.
    pub fn apply_joystick(&mut self, target: JoystickTarget, pressed: bool) {
        match target {
            JoystickTarget::Key(key) => self.set_key(key, pressed),
            JoystickTarget::Kempston(bits) if pressed => self.kempston |= bits,
            JoystickTarget::Kempston(bits) => self.kempston &= !bits,
        }
    }
}

impl Bus for SpectrumBus {
    fn read(&mut self, address: u16) -> u8 {
        self.memory.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory.write(address, value);
    }

    fn io_read(&mut self, port: u16) -> u8 {
        // Port $FE (active when bit 0 is clear)
        if port & 0x01 == 0 {
            let addr_high = (port >> 8) as u8;
            let keyboard = self.keyboard.read(addr_high) & 0x1F;
            // Bits 5 and 7 always 1, bit 6 EAR follows MIC (bit 3 of $FE write)
            let ear = (self.peripherals.last_fe_write & 0x08) << 3;
            return keyboard | 0xA0 | ear;
        }

        // Kempston joystick (port $1F, active when low byte = $1F)
        if port & 0xFF == 0x1F {
            return self.kempston;
        }

        0xFF
    }

    fn io_write(&mut self, port: u16, value: u8) {
        let ula_port = port & 0x01 == 0;

        if ula_port {
            self.peripherals.last_fe_write = value;
            // Bits 0-2: border colour; bit 3 MIC, bit 4 beeper (not emulated)
            self.peripherals.border = value & 0x07;
        }

        // Port $7FFD: 128K bank switching (bit 1 clear, bit 15 clear)
        if port & 0x8002 == 0x0000 && !ula_port {
            log::debug!("paging write ${value:02X} via port ${port:04X}");
            self.memory.write_bank_register(value);
        }
    }

    fn interrupt_vector(&mut self) -> u32 {
        INTERRUPT_VECTOR
    }
}
