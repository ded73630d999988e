//! ZX Spectrum snapshot tool.
//!
//! Works on the hardware layer alone, without a CPU core: inspect snapshot
//! headers, convert between formats, render screens to PNG and check ROM
//! images.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use emu_spectrum::capture::{render_screen, save_png};
use emu_spectrum::snapshot::{self, SnapshotFormat};
use emu_spectrum::{SpectrumConfig, SpectrumModel};
use format_sna::MachineState;
use serde::Serialize;
use sinclair_ula::{FB_HEIGHT, FB_WIDTH, PaletteMode, SCREEN_SIZE};

#[derive(Parser)]
#[command(name = "emu-spectrum", about = "ZX Spectrum snapshot tool")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the machine state of a .sna or .z80 file as JSON
    Info {
        snapshot: PathBuf,
    },
    /// Convert between .sna, .z80 and .scr (picked by extension)
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Run-length compress .z80 output
        #[arg(long)]
        compress: bool,
    },
    /// Render the screen of a snapshot or .scr file to PNG
    Screenshot {
        snapshot: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = Palette::Pastel)]
        palette: Palette,
        /// Draw flashing cells in their inverted phase
        #[arg(long)]
        flash: bool,
    },
    /// Check that a ROM image fits a model
    CheckRom {
        rom: PathBuf,
        #[arg(long, value_enum, default_value_t = Model::Spectrum48k)]
        model: Model,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Palette {
    Pastel,
    Saturated,
}

impl From<Palette> for PaletteMode {
    fn from(palette: Palette) -> Self {
        match palette {
            Palette::Pastel => Self::Pastel,
            Palette::Saturated => Self::Saturated,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Model {
    #[value(name = "48k")]
    Spectrum48k,
    #[value(name = "128k")]
    Spectrum128k,
}

impl From<Model> for SpectrumModel {
    fn from(model: Model) -> Self {
        match model {
            Model::Spectrum48k => Self::Spectrum48K,
            Model::Spectrum128k => Self::Spectrum128K,
        }
    }
}

/// Header summary printed by `info`.
#[derive(Serialize)]
struct SnapshotInfo {
    format: String,
    pc: u16,
    sp: u16,
    af: u16,
    bc: u16,
    de: u16,
    hl: u16,
    af_alt: u16,
    bc_alt: u16,
    de_alt: u16,
    hl_alt: u16,
    ix: u16,
    iy: u16,
    i: u8,
    r: u8,
    im: u8,
    iff1: bool,
    iff2: bool,
    border: u8,
}

impl SnapshotInfo {
    fn new(format: SnapshotFormat, state: &MachineState) -> Self {
        let regs = &state.registers;
        Self {
            format: format.to_string(),
            pc: regs.pc,
            sp: regs.sp,
            af: regs.af(),
            bc: regs.bc(),
            de: regs.de(),
            hl: regs.hl(),
            af_alt: regs.af_alt(),
            bc_alt: regs.bc_alt(),
            de_alt: regs.de_alt(),
            hl_alt: regs.hl_alt(),
            ix: regs.ix,
            iy: regs.iy,
            i: regs.i,
            r: regs.r,
            im: regs.im,
            iff1: regs.iff1,
            iff2: regs.iff2,
            border: state.border,
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{message}");
    process::exit(1);
}

fn read_file(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|e| fail(format!("cannot read {}: {e}", path.display())))
}

fn format_of(path: &Path) -> SnapshotFormat {
    SnapshotFormat::from_path(path).unwrap_or_else(|e| fail(e))
}

fn read_state(path: &Path) -> (SnapshotFormat, MachineState) {
    let format = format_of(path);
    let data = read_file(path);
    let state = snapshot::parse(format, &data)
        .unwrap_or_else(|e| fail(format!("{}: {e}", path.display())));
    (format, state)
}

fn info(path: &Path) {
    let (format, state) = read_state(path);
    match serde_json::to_string_pretty(&SnapshotInfo::new(format, &state)) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(e),
    }
}

fn convert(input: &Path, output: &Path, compress: bool) {
    let (_, state) = read_state(input);
    let format = format_of(output);
    let bytes = snapshot::encode(format, &state, compress).unwrap_or_else(|e| fail(e));
    if let Err(e) = fs::write(output, bytes) {
        fail(format!("cannot write {}: {e}", output.display()));
    }
    log::info!("wrote {} as {format}", output.display());
}

fn screenshot(input: &Path, output: &Path, palette: PaletteMode, flash: bool) {
    let (screen, border) = if format_of(input) == SnapshotFormat::Scr {
        let mut screen = read_file(input);
        screen.resize(SCREEN_SIZE, 0);
        (screen, 0)
    } else {
        let (_, state) = read_state(input);
        (state.ram()[..SCREEN_SIZE].to_vec(), state.border)
    };

    let pixels = render_screen(&screen, border, palette, flash);
    if let Err(e) = save_png(&pixels, FB_WIDTH, FB_HEIGHT, output) {
        fail(e);
    }
    eprintln!("Screenshot saved to {}", output.display());
}

fn check_rom(path: &Path, model: SpectrumModel) {
    match SpectrumConfig::from_rom_file(model, path) {
        Ok(config) => println!("{}: {} bytes, usable as {model} ROM", path.display(), config.rom.len()),
        Err(e) => fail(e),
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Info { snapshot } => info(&snapshot),
        Command::Convert { input, output, compress } => convert(&input, &output, compress),
        Command::Screenshot { snapshot, output, palette, flash } => {
            screenshot(&snapshot, &output, palette.into(), flash);
        }
        Command::CheckRom { rom, model } => check_rom(&rom, model.into()),
    }
}
