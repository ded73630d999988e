//! Spectrum model configuration.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use sinclair_ula::PaletteMode;
use thiserror::Error;

use crate::input::JoystickMode;

/// Supported Spectrum models.
///
/// The bus holds its memory as a `Box<dyn SpectrumMemory>`, selected by this
/// enum at construction time. Switching model builds a new bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SpectrumModel {
    #[default]
    Spectrum48K,
    Spectrum128K,
}

impl SpectrumModel {
    /// ROM image sizes this model accepts.
    ///
    /// The 128K takes either both ROMs (32K) or a single 16K image that is
    /// mirrored into both ROM slots.
    #[must_use]
    pub const fn rom_sizes(self) -> &'static [usize] {
        match self {
            Self::Spectrum48K => &[0x4000],
            Self::Spectrum128K => &[0x4000, 0x8000],
        }
    }
}

impl fmt::Display for SpectrumModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spectrum48K => f.write_str("48K"),
            Self::Spectrum128K => f.write_str("128K"),
        }
    }
}

/// Why a ROM image could not be used. Construction cannot proceed without one.
#[derive(Debug, Error)]
pub enum RomError {
    #[error("cannot read ROM {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{model} ROM must be one of {expected:?} bytes, got {actual}")]
    WrongSize {
        model: SpectrumModel,
        expected: &'static [usize],
        actual: usize,
    },
}

/// Check a ROM image against the sizes `model` accepts.
pub fn check_rom(model: SpectrumModel, rom: &[u8]) -> Result<(), RomError> {
    if model.rom_sizes().contains(&rom.len()) {
        Ok(())
    } else {
        Err(RomError::WrongSize {
            model,
            expected: model.rom_sizes(),
            actual: rom.len(),
        })
    }
}

/// Configuration for creating a Spectrum instance.
#[derive(Debug, Clone)]
pub struct SpectrumConfig {
    pub model: SpectrumModel,
    /// ROM data. Must be a size listed by [`SpectrumModel::rom_sizes`].
    pub rom: Vec<u8>,
    pub palette: PaletteMode,
    pub joystick: JoystickMode,
}

impl SpectrumConfig {
    #[must_use]
    pub fn new(model: SpectrumModel, rom: Vec<u8>) -> Self {
        Self {
            model,
            rom,
            palette: PaletteMode::default(),
            joystick: JoystickMode::default(),
        }
    }

    /// Read a ROM image from disk and check its size.
    pub fn from_rom_file(model: SpectrumModel, path: &Path) -> Result<Self, RomError> {
        let rom = std::fs::read(path).map_err(|source| RomError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        check_rom(model, &rom)?;
        Ok(Self::new(model, rom))
    }
}
