//! CPU collaborator trait.

use crate::Bus;

/// A CPU core driven in bursts.
///
/// The hardware layer never steps individual instructions. It asks the CPU
/// to run for a number of cycles, raises and lowers the interrupt line
/// between bursts, and touches registers only when transcoding snapshots.
pub trait Cpu {
    /// The register record exchanged with snapshot codecs.
    type Registers;

    /// Execute for at least `cycles` clock cycles. Returns the number of
    /// cycles actually consumed, which may overshoot by one instruction.
    fn run<B: Bus>(&mut self, bus: &mut B, cycles: u32) -> u32;

    /// Assert the maskable interrupt line.
    fn raise_interrupt(&mut self);

    /// Release the maskable interrupt line.
    fn lower_interrupt(&mut self);

    /// Request a non-maskable interrupt.
    fn nmi(&mut self);

    /// Reset the CPU to its power-on state.
    fn reset(&mut self);

    /// Returns a snapshot of all registers.
    fn registers(&self) -> Self::Registers;

    /// Replace the register file wholesale.
    fn set_registers(&mut self, registers: &Self::Registers);
}
