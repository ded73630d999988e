//! Zilog Z80 register model.
//!
//! The instruction interpreter lives outside this workspace. What the
//! hardware crates need from the Z80 is its register record, which the
//! snapshot formats read and write field by field.

mod registers;

#[cfg(feature = "test-utils")]
mod recording;

pub use registers::Registers;

#[cfg(feature = "test-utils")]
pub use recording::{BusOp, CpuEvent, RecordingCpu};
