//! Z80 register set.

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.

/// Z80 register file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    // Main registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    // Alternate registers
    pub a_alt: u8,
    pub f_alt: u8,
    pub b_alt: u8,
    pub c_alt: u8,
    pub d_alt: u8,
    pub e_alt: u8,
    pub h_alt: u8,
    pub l_alt: u8,

    // Index registers
    pub ix: u16,
    pub iy: u16,

    // Other registers
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    /// Interrupt mode, 0-2.
    pub im: u8,
}

const fn pair(hi: u8, lo: u8) -> u16 {
    (hi as u16) << 8 | lo as u16
}

const fn split(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, value as u8)
}

impl Registers {
    /// Get AF register pair.
    #[must_use]
    pub const fn af(&self) -> u16 {
        pair(self.a, self.f)
    }

    /// Get BC register pair.
    #[must_use]
    pub const fn bc(&self) -> u16 {
        pair(self.b, self.c)
    }

    /// Get DE register pair.
    #[must_use]
    pub const fn de(&self) -> u16 {
        pair(self.d, self.e)
    }

    /// Get HL register pair.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        pair(self.h, self.l)
    }

    /// Get AF' register pair.
    #[must_use]
    pub const fn af_alt(&self) -> u16 {
        pair(self.a_alt, self.f_alt)
    }

    /// Get BC' register pair.
    #[must_use]
    pub const fn bc_alt(&self) -> u16 {
        pair(self.b_alt, self.c_alt)
    }

    /// Get DE' register pair.
    #[must_use]
    pub const fn de_alt(&self) -> u16 {
        pair(self.d_alt, self.e_alt)
    }

    /// Get HL' register pair.
    #[must_use]
    pub const fn hl_alt(&self) -> u16 {
        pair(self.h_alt, self.l_alt)
    }

    pub fn set_af(&mut self, value: u16) {
        (self.a, self.f) = split(value);
    }

    pub fn set_bc(&mut self, value: u16) {
        (self.b, self.c) = split(value);
    }

    pub fn set_de(&mut self, value: u16) {
        (self.d, self.e) = split(value);
    }

    pub fn set_hl(&mut self, value: u16) {
        (self.h, self.l) = split(value);
    }

    pub fn set_af_alt(&mut self, value: u16) {
        (self.a_alt, self.f_alt) = split(value);
    }

    pub fn set_bc_alt(&mut self, value: u16) {
        (self.b_alt, self.c_alt) = split(value);
    }

    pub fn set_de_alt(&mut self, value: u16) {
        (self.d_alt, self.e_alt) = split(value);
    }

    pub fn set_hl_alt(&mut self, value: u16) {
        (self.h_alt, self.l_alt) = split(value);
    }

    /// Apply the register changes of a Z80 reset.
    ///
    /// PC, I and R are cleared, interrupts disabled and IM 0 selected. The
    /// general-purpose registers keep whatever they held.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.i = 0;
        self.r = 0;
        self.iff1 = false;
        self.iff2 = false;
        self.im = 0;
    }
}
