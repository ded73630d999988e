//! Core traits shared by the hardware crates.
//!
//! The CPU is a black box. Hardware drives it in bursts of cycles and pulses
//! its interrupt lines; the CPU calls back into the hardware through [`Bus`]
//! for every memory and port access.

mod bus;
mod cpu;

pub use bus::Bus;
pub use cpu::Cpu;
