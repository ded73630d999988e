//! ZX Spectrum 48K and 128K hardware.
//!
//! Memory banking, the ULA port, the keyboard matrix, joystick interfaces,
//! screen rendering and snapshot transfer around a pluggable Z80 core. The
//! CPU is any `emu_core::Cpu` that exchanges `zilog_z80::Registers`.

mod bus;
#[cfg(feature = "native")]
pub mod capture;
mod config;
pub mod input;
mod keyboard;
mod memory;
pub mod snapshot;
mod spectrum;

pub use bus::{INTERRUPT_VECTOR, Peripherals, SpectrumBus};
pub use config::{RomError, SpectrumConfig, SpectrumModel, check_rom};
pub use input::{
    HostInput, InputMapper, JoystickAction, JoystickMode, JoystickTarget, SpectrumKey,
};
pub use keyboard::KeyMatrix;
pub use memory::{Memory48K, Memory128K, SpectrumMemory};
pub use snapshot::{LoadOutcome, SnapshotError, SnapshotFormat, load_snapshot, save_snapshot};
pub use spectrum::{FRAME_CYCLES, INT_CYCLES, Spectrum};
