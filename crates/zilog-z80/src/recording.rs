//! Scripted CPU double for driving hardware without an interpreter.
//!
//! `RecordingCpu` logs every call the machine makes on it and, during
//! `run()`, replays a queue of bus operations as if instructions had
//! issued them. Values returned by reads are kept for inspection.

use std::collections::VecDeque;

use emu_core::{Bus, Cpu};

use crate::Registers;

/// A call made on the CPU by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuEvent {
    Run(u32),
    RaiseInterrupt,
    LowerInterrupt,
    Nmi,
    Reset,
}

/// A bus access replayed during the next `run()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Read(u16),
    Write(u16, u8),
    In(u16),
    Out(u16, u8),
    InterruptVector,
    Halt(bool),
}

/// Z80 stand-in that records calls and replays scripted bus traffic.
#[derive(Debug, Default)]
pub struct RecordingCpu {
    pub regs: Registers,
    events: Vec<CpuEvent>,
    script: VecDeque<BusOp>,
    results: Vec<u32>,
    int_line: bool,
}

impl RecordingCpu {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bus operations for the next `run()`.
    pub fn script(&mut self, ops: impl IntoIterator<Item = BusOp>) {
        self.script.extend(ops);
    }

    /// Every driver call so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[CpuEvent] {
        &self.events
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<CpuEvent> {
        std::mem::take(&mut self.events)
    }

    /// Values produced by scripted reads, port reads and vector fetches.
    #[must_use]
    pub fn results(&self) -> &[u32] {
        &self.results
    }

    /// Whether the interrupt line is currently asserted.
    #[must_use]
    pub fn interrupt_asserted(&self) -> bool {
        self.int_line
    }
}

impl Cpu for RecordingCpu {
    type Registers = Registers;

    fn run<B: Bus>(&mut self, bus: &mut B, cycles: u32) -> u32 {
        self.events.push(CpuEvent::Run(cycles));
        while let Some(op) = self.script.pop_front() {
            match op {
                BusOp::Read(addr) => self.results.push(u32::from(bus.read(addr))),
                BusOp::Write(addr, value) => bus.write(addr, value),
                BusOp::In(port) => self.results.push(u32::from(bus.io_read(port))),
                BusOp::Out(port, value) => bus.io_write(port, value),
                BusOp::InterruptVector => self.results.push(bus.interrupt_vector()),
                BusOp::Halt(state) => bus.halt(state),
            }
        }
        cycles
    }

    fn raise_interrupt(&mut self) {
        self.int_line = true;
        self.events.push(CpuEvent::RaiseInterrupt);
    }

    fn lower_interrupt(&mut self) {
        self.int_line = false;
        self.events.push(CpuEvent::LowerInterrupt);
    }

    fn nmi(&mut self) {
        self.events.push(CpuEvent::Nmi);
    }

    fn reset(&mut self) {
        self.regs.reset();
        self.int_line = false;
        self.events.push(CpuEvent::Reset);
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn set_registers(&mut self, registers: &Registers) {
        self.regs = *registers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PortLog {
        ram: [u8; 4],
        outs: Vec<(u16, u8)>,
    }

    impl Bus for PortLog {
        fn read(&mut self, address: u16) -> u8 {
            self.ram[address as usize & 3]
        }

        fn write(&mut self, address: u16, value: u8) {
            self.ram[address as usize & 3] = value;
        }

        fn io_read(&mut self, port: u16) -> u8 {
            (port >> 8) as u8
        }

        fn io_write(&mut self, port: u16, value: u8) {
            self.outs.push((port, value));
        }
    }

    #[test]
    fn run_replays_script_once() {
        let mut bus = PortLog { ram: [0; 4], outs: Vec::new() };
        let mut cpu = RecordingCpu::new();
        cpu.script([
            BusOp::Write(1, 0x42),
            BusOp::Read(1),
            BusOp::In(0x7FFE),
            BusOp::Out(0x00FE, 0x05),
            BusOp::InterruptVector,
        ]);

        assert_eq!(cpu.run(&mut bus, 100), 100);
        assert_eq!(cpu.results(), &[0x42, 0x7F, 0xFFFF_FFFF]);
        assert_eq!(bus.outs, vec![(0x00FE, 0x05)]);

        cpu.run(&mut bus, 10);
        assert_eq!(cpu.results().len(), 3, "script is consumed by the first run");
        assert_eq!(cpu.events(), &[CpuEvent::Run(100), CpuEvent::Run(10)]);
    }

    #[test]
    fn interrupt_line_tracks_raise_and_lower() {
        let mut cpu = RecordingCpu::new();
        cpu.raise_interrupt();
        assert!(cpu.interrupt_asserted());
        cpu.lower_interrupt();
        assert!(!cpu.interrupt_asserted());
        cpu.nmi();
        cpu.reset();
        assert_eq!(
            cpu.take_events(),
            vec![
                CpuEvent::RaiseInterrupt,
                CpuEvent::LowerInterrupt,
                CpuEvent::Nmi,
                CpuEvent::Reset
            ]
        );
        assert!(cpu.events().is_empty());
    }
}
