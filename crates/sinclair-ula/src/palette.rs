//! Display palettes.
//!
//! Colour index layout: `bright << 3 | grb`, giving black, blue, red,
//! magenta, green, cyan, yellow, white for 0-7 and their bright
//! counterparts for 8-15. The normal half is identical in both palettes;
//! they differ only in how bright colours are lifted.

/// Which of the two palettes to draw with.
///
/// This is a display calibration choice, not something the machine can
/// observe or change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PaletteMode {
    /// Bright colours mix in a 96-level tint of the other channels.
    #[default]
    Pastel,
    /// Bright colours are pure full-intensity primaries.
    Saturated,
}

impl PaletteMode {
    /// The 16-entry ARGB32 table for this mode.
    #[must_use]
    pub const fn colours(self) -> &'static [u32; 16] {
        match self {
            Self::Pastel => &PASTEL,
            Self::Saturated => &SATURATED,
        }
    }

    /// ARGB32 value for a colour index. Only the low four bits are used.
    #[must_use]
    pub const fn argb(self, index: u8) -> u32 {
        self.colours()[(index & 0x0F) as usize]
    }
}

/// ARGB32, normal colours at 0xC0 and tinted brights.
pub const PASTEL: [u32; 16] = [
    0xFF00_0000,
    0xFF00_00C0,
    0xFFC0_0000,
    0xFFC0_00C0,
    0xFF00_C000,
    0xFF00_C0C0,
    0xFFC0_C000,
    0xFFC0_C0C0,
    0xFF00_0000,
    0xFF60_60FF,
    0xFFFF_6060,
    0xFFFF_60FF,
    0xFF60_FF60,
    0xFF60_FFFF,
    0xFFFF_FF60,
    0xFFFF_FFFF,
];

/// ARGB32, normal colours at 0xC0 and pure brights.
pub const SATURATED: [u32; 16] = [
    0xFF00_0000,
    0xFF00_00C0,
    0xFFC0_0000,
    0xFFC0_00C0,
    0xFF00_C000,
    0xFF00_C0C0,
    0xFFC0_C000,
    0xFFC0_C0C0,
    0xFF00_0000,
    0xFF00_00FF,
    0xFFFF_0000,
    0xFFFF_00FF,
    0xFF00_FF00,
    0xFF00_FFFF,
    0xFFFF_FF00,
    0xFFFF_FFFF,
];
