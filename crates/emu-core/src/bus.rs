//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// Components access memory and peripherals through this trait. The bus
/// handles address decoding and routing to the appropriate device. Every
/// method is total: unmapped addresses and ports produce a fixed default.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Read a byte from an I/O port (`IN`).
    fn io_read(&mut self, port: u16) -> u8;

    /// Write a byte to an I/O port (`OUT`).
    fn io_write(&mut self, port: u16, value: u8);

    /// Bytes placed on the data bus during an interrupt acknowledge.
    ///
    /// Most significant byte first, so an IM 0 CPU executes the top byte as
    /// the opcode. The default is an idle bus pulled high.
    fn interrupt_vector(&mut self) -> u32 {
        0xFFFF_FFFF
    }

    /// Called when the CPU enters or leaves the HALT state.
    fn halt(&mut self, _halted: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatBus {
        memory: Vec<u8>,
    }

    impl Bus for FlatBus {
        fn read(&mut self, address: u16) -> u8 {
            self.memory[address as usize]
        }

        fn write(&mut self, address: u16, value: u8) {
            self.memory[address as usize] = value;
        }

        fn io_read(&mut self, _port: u16) -> u8 {
            0xFF
        }

        fn io_write(&mut self, _port: u16, _value: u8) {}
    }

    #[test]
    fn default_interrupt_vector_is_idle_bus() {
        let mut bus = FlatBus { memory: vec![0; 0x10000] };
        assert_eq!(bus.interrupt_vector(), 0xFFFF_FFFF);
        bus.halt(true);
        bus.write(0x1234, 0x56);
        assert_eq!(bus.read(0x1234), 0x56);
    }
}
