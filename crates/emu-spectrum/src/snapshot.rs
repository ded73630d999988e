//! Snapshot loading and saving for a running Spectrum.
//!
//! The codecs in `format-sna` and `format-z80` translate bytes to and from a
//! [`MachineState`]. This module moves that record in and out of a live
//! machine: registers through the CPU, the border through port $FE, and RAM
//! through the bus, so a 128K machine sees the image through its current
//! paging.
//!
//! Every load decodes fully before touching the machine. A load that fails
//! leaves the machine exactly as it was.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use emu_core::{Bus, Cpu};
use format_sna::{MachineState, RAM_SIZE, RAM_START, SnaError};
use format_z80::Z80Error;
use sinclair_ula::SCREEN_SIZE;
use thiserror::Error;
use zilog_z80::Registers;

use crate::spectrum::Spectrum;

/// Snapshot file formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotFormat {
    /// `.sna`: 27-byte header plus RAM, PC on the stack.
    Sna,
    /// `.z80` version 1: 30-byte header plus raw or compressed RAM.
    Z80,
    /// `.scr`: bitmap and attributes only, no registers.
    Scr,
}

impl SnapshotFormat {
    /// Pick a format from the extension of `path`, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("sna") => Ok(Self::Sna),
            Some("z80") => Ok(Self::Z80),
            Some("scr") => Ok(Self::Scr),
            _ => Err(SnapshotError::UnknownFormat(path.to_path_buf())),
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Sna => "sna",
            Self::Z80 => "z80",
            Self::Scr => "scr",
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Sna(#[from] SnaError),
    #[error(transparent)]
    Z80(#[from] Z80Error),
    #[error("unrecognised snapshot extension: {}", .0.display())]
    UnknownFormat(PathBuf),
    #[error("SCR files hold a screen, not a machine state")]
    ScreenOnly,
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of loading a snapshot file.
///
/// Both failure arms leave the machine unchanged.
#[derive(Debug)]
#[must_use]
pub enum LoadOutcome {
    Loaded(SnapshotFormat),
    /// The file could not be read.
    Unavailable(io::Error),
    /// The file was read but is not a usable snapshot.
    Rejected(SnapshotError),
}

impl LoadOutcome {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Decode a `.sna` or `.z80` stream. `.scr` has no machine state.
pub fn parse(format: SnapshotFormat, data: &[u8]) -> Result<MachineState, SnapshotError> {
    match format {
        SnapshotFormat::Sna => Ok(format_sna::parse(data)?),
        SnapshotFormat::Z80 => Ok(format_z80::parse(data)?),
        SnapshotFormat::Scr => Err(SnapshotError::ScreenOnly),
    }
}

/// Encode a machine state. `compress` only affects `.z80`; `.scr` takes the
/// first 6,912 bytes of RAM.
pub fn encode(
    format: SnapshotFormat,
    state: &MachineState,
    compress: bool,
) -> Result<Vec<u8>, SnapshotError> {
    match format {
        SnapshotFormat::Sna => Ok(format_sna::encode(state)?),
        SnapshotFormat::Z80 => Ok(format_z80::encode(state, compress)),
        SnapshotFormat::Scr => Ok(state.ram()[..SCREEN_SIZE].to_vec()),
    }
}

/// Capture registers, border and the 48K window from a running machine.
pub fn machine_state<C: Cpu<Registers = Registers>>(spectrum: &Spectrum<C>) -> MachineState {
    MachineState::new(
        spectrum.cpu().registers(),
        spectrum.bus().border(),
        &spectrum.bus().dump_block(RAM_START, RAM_SIZE),
    )
}

/// Install a machine state into a running machine.
pub fn apply_state<C: Cpu<Registers = Registers>>(spectrum: &mut Spectrum<C>, state: &MachineState) {
    spectrum.cpu_mut().set_registers(&state.registers);
    let bus = spectrum.bus_mut();
    bus.io_write(0x00FE, state.border);
    bus.load_block(RAM_START, state.ram());
}

/// Load snapshot bytes of a known format.
pub fn load_snapshot_bytes<C: Cpu<Registers = Registers>>(
    spectrum: &mut Spectrum<C>,
    format: SnapshotFormat,
    data: &[u8],
) -> Result<(), SnapshotError> {
    if format == SnapshotFormat::Scr {
        let len = data.len().min(SCREEN_SIZE);
        spectrum.bus_mut().load_block(RAM_START, &data[..len]);
        return Ok(());
    }

    let state = parse(format, data)?;
    log::debug!(
        "{format} snapshot: PC=${:04X} SP=${:04X} border {}",
        state.registers.pc,
        state.registers.sp,
        state.border
    );
    apply_state(spectrum, &state);
    Ok(())
}

/// Load a snapshot file, picking the format from its extension.
pub fn load_snapshot<C: Cpu<Registers = Registers>>(
    spectrum: &mut Spectrum<C>,
    path: &Path,
) -> LoadOutcome {
    let format = match SnapshotFormat::from_path(path) {
        Ok(format) => format,
        Err(e) => {
            log::warn!("{e}");
            return LoadOutcome::Rejected(e);
        }
    };

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("cannot read {}: {e}", path.display());
            return LoadOutcome::Unavailable(e);
        }
    };

    match load_snapshot_bytes(spectrum, format, &data) {
        Ok(()) => {
            log::info!("loaded {}", path.display());
            LoadOutcome::Loaded(format)
        }
        Err(e) => {
            log::warn!("rejected {}: {e}", path.display());
            LoadOutcome::Rejected(e)
        }
    }
}

/// Encode the running machine in `format`.
pub fn snapshot_bytes<C: Cpu<Registers = Registers>>(
    spectrum: &Spectrum<C>,
    format: SnapshotFormat,
    compress: bool,
) -> Result<Vec<u8>, SnapshotError> {
    encode(format, &machine_state(spectrum), compress)
}

/// Save the running machine to `path`, picking the format from its extension.
pub fn save_snapshot<C: Cpu<Registers = Registers>>(
    spectrum: &Spectrum<C>,
    path: &Path,
    compress: bool,
) -> Result<SnapshotFormat, SnapshotError> {
    let format = SnapshotFormat::from_path(path)?;
    let bytes = snapshot_bytes(spectrum, format, compress)?;
    fs::write(path, bytes).map_err(|source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("saved {}", path.display());
    Ok(format)
}

#[cfg(test)]
mod tests {
    use zilog_z80::RecordingCpu;

    use super::*;
    use crate::config::{SpectrumConfig, SpectrumModel};

    fn make_spectrum() -> Spectrum<RecordingCpu> {
        let config = SpectrumConfig::new(SpectrumModel::Spectrum48K, vec![0; 0x4000]);
        Spectrum::new(RecordingCpu::new(), &config).unwrap()
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SnapshotFormat::from_path(Path::new("a.sna")).unwrap(), SnapshotFormat::Sna);
        assert_eq!(SnapshotFormat::from_path(Path::new("dir/B.Z80")).unwrap(), SnapshotFormat::Z80);
        assert_eq!(SnapshotFormat::from_path(Path::new("c.scr")).unwrap(), SnapshotFormat::Scr);
        assert!(matches!(
            SnapshotFormat::from_path(Path::new("d.tap")),
            Err(SnapshotError::UnknownFormat(_))
        ));
        assert!(SnapshotFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn scr_is_not_a_machine_state() {
        assert!(matches!(parse(SnapshotFormat::Scr, &[]), Err(SnapshotError::ScreenOnly)));
    }

    #[test]
    fn scr_load_writes_screen_only() {
        let mut spectrum = make_spectrum();
        spectrum.cpu_mut().regs.pc = 0x4321;
        let mut scr = vec![0x11; SCREEN_SIZE + 10];
        scr[SCREEN_SIZE - 1] = 0x47;

        load_snapshot_bytes(&mut spectrum, SnapshotFormat::Scr, &scr).unwrap();

        let bus = spectrum.bus();
        assert_eq!(bus.dump_block(0x4000, 1), vec![0x11]);
        assert_eq!(bus.dump_block(0x5AFF, 2), vec![0x47, 0x00]);
        assert_eq!(spectrum.cpu().regs.pc, 0x4321);
    }

    #[test]
    fn sna_load_sets_registers_border_and_ram() {
        let mut spectrum = make_spectrum();
        let mut data = vec![0u8; format_sna::SNA_SIZE];
        data[0] = 0x3F;
        data[21] = 0x44;
        data[26] = 0x05;
        data[27 + 0x100] = 0x99;

        load_snapshot_bytes(&mut spectrum, SnapshotFormat::Sna, &data).unwrap();

        assert_eq!(spectrum.bus().border(), 5);
        assert_eq!(spectrum.cpu().regs.i, 0x3F);
        assert_eq!(spectrum.cpu().regs.af(), 0x0044);
        assert_eq!(spectrum.bus().dump_block(0x4100, 1), vec![0x99]);
    }

    #[test]
    fn malformed_load_leaves_machine_unchanged() {
        let mut spectrum = make_spectrum();
        spectrum.bus_mut().load_block(0x4000, &[0x12, 0x34]);
        spectrum.bus_mut().set_border(3);
        let before = machine_state(&spectrum);

        let err = load_snapshot_bytes(&mut spectrum, SnapshotFormat::Z80, &[0xED; 12]);
        assert!(matches!(err, Err(SnapshotError::Z80(Z80Error::TruncatedHeader(12)))));
        assert_eq!(machine_state(&spectrum), before);
    }

    #[test]
    fn state_survives_z80_round_trip() {
        let mut spectrum = make_spectrum();
        spectrum.cpu_mut().regs.pc = 0x8000;
        spectrum.cpu_mut().regs.sp = 0xFF00;
        spectrum.cpu_mut().regs.r = 0x81;
        spectrum.bus_mut().set_border(6);
        spectrum.bus_mut().load_block(0x5800, &[0x38; 768]);
        let bytes = snapshot_bytes(&spectrum, SnapshotFormat::Z80, true).unwrap();

        let mut other = make_spectrum();
        load_snapshot_bytes(&mut other, SnapshotFormat::Z80, &bytes).unwrap();
        assert_eq!(machine_state(&other), machine_state(&spectrum));
    }

    #[test]
    fn scr_encode_takes_screen_bytes() {
        let mut ram = vec![0u8; RAM_SIZE];
        ram[..SCREEN_SIZE].fill(0xAA);
        let state = MachineState::new(Registers::default(), 0, &ram);
        let bytes = encode(SnapshotFormat::Scr, &state, false).unwrap();
        assert_eq!(bytes.len(), SCREEN_SIZE);
        assert!(bytes.iter().all(|&b| b == 0xAA));
    }
}
