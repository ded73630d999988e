//! Machine state shared by the 48K snapshot formats.

use zilog_z80::Registers;

/// First address covered by a snapshot's memory image.
pub const RAM_START: u16 = 0x4000;

/// Bytes of RAM captured by a 48K snapshot ($4000-$FFFF).
pub const RAM_SIZE: usize = 49_152;

/// Everything a 48K snapshot captures: registers, border and RAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    pub registers: Registers,
    /// Border colour, 0-7.
    pub border: u8,
    ram: Vec<u8>,
}

impl MachineState {
    /// Build a state from a RAM image starting at $4000.
    ///
    /// Short images are zero-padded and long ones truncated to [`RAM_SIZE`].
    #[must_use]
    pub fn new(registers: Registers, border: u8, ram: &[u8]) -> Self {
        let mut image = vec![0u8; RAM_SIZE];
        let len = ram.len().min(RAM_SIZE);
        image[..len].copy_from_slice(&ram[..len]);
        Self {
            registers,
            border: border & 0x07,
            ram: image,
        }
    }

    /// RAM image, offset 0 = address $4000. Always [`RAM_SIZE`] bytes.
    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    #[must_use]
    pub fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }

    /// Little-endian word at `addr`, if both bytes fall in RAM.
    #[must_use]
    pub fn read_word(&self, addr: u16) -> Option<u16> {
        let offset = Self::word_offset(addr)?;
        Some(u16::from_le_bytes([self.ram[offset], self.ram[offset + 1]]))
    }

    /// Store a little-endian word at `addr`. Returns false, changing
    /// nothing, if either byte would fall outside RAM.
    pub fn write_word(&mut self, addr: u16, value: u16) -> bool {
        let Some(offset) = Self::word_offset(addr) else {
            return false;
        };
        self.ram[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        true
    }

    fn word_offset(addr: u16) -> Option<usize> {
        let offset = usize::from(addr.checked_sub(RAM_START)?);
        (offset + 1 < RAM_SIZE).then_some(offset)
    }
}
