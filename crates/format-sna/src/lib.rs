//! SNA snapshot codec for the 48K Spectrum.
//!
//! **Layout** (49,179 bytes): 27-byte header + 49,152 bytes of RAM from $4000.
//! Register pairs are little-endian.
//!
//! | Offset | Field          | Offset | Field         |
//! |--------|----------------|--------|---------------|
//! | 0      | I              | 15     | IY            |
//! | 1      | HL'            | 17     | IX            |
//! | 3      | DE'            | 19     | IFF2 (bit 2)  |
//! | 5      | BC'            | 20     | R             |
//! | 7      | AF'            | 21     | AF            |
//! | 9      | HL             | 23     | SP            |
//! | 11     | DE             | 25     | IM            |
//! | 13     | BC             | 26     | Border        |
//!
//! There is no PC field. The saving program pushes PC onto the stack and
//! the loader resumes with the equivalent of `RETN`: pop PC, copy IFF2 into
//! IFF1.

#![allow(clippy::cast_possible_truncation)]

mod state;

use thiserror::Error;
use zilog_z80::Registers;

pub use state::{MachineState, RAM_SIZE, RAM_START};

/// Header size in bytes.
pub const HEADER_SIZE: usize = 27;

/// Size of a complete 48K SNA file.
pub const SNA_SIZE: usize = HEADER_SIZE + RAM_SIZE;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnaError {
    #[error("SNA header needs 27 bytes, got {0}")]
    TruncatedHeader(usize),
    #[error("stack pointer ${0:04X} leaves no RAM below it to push PC")]
    StackOutsideRam(u16),
}

fn word(header: &[u8; HEADER_SIZE], offset: usize) -> u16 {
    u16::from_le_bytes([header[offset], header[offset + 1]])
}

fn put_word(header: &mut [u8; HEADER_SIZE], offset: usize, value: u16) {
    header[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Decode an SNA stream.
///
/// A payload shorter than 49,152 bytes is zero-padded; anything past it is
/// ignored. If SP points into RAM, PC is popped from the image and SP moves
/// up by two. Otherwise PC is left at zero and SP is kept as stored.
pub fn parse(data: &[u8]) -> Result<MachineState, SnaError> {
    let header: &[u8; HEADER_SIZE] = data
        .first_chunk()
        .ok_or(SnaError::TruncatedHeader(data.len()))?;

    let mut regs = Registers {
        i: header[0],
        r: header[20],
        iy: word(header, 15),
        ix: word(header, 17),
        sp: word(header, 23),
        im: header[25] & 0x03,
        ..Registers::default()
    };
    regs.set_hl_alt(word(header, 1));
    regs.set_de_alt(word(header, 3));
    regs.set_bc_alt(word(header, 5));
    regs.set_af_alt(word(header, 7));
    regs.set_hl(word(header, 9));
    regs.set_de(word(header, 11));
    regs.set_bc(word(header, 13));
    regs.set_af(word(header, 21));

    let iff2 = header[19] & 0x04 != 0;
    regs.iff1 = iff2;
    regs.iff2 = iff2;

    let mut state = MachineState::new(regs, header[26], &data[HEADER_SIZE..]);
    if let Some(pc) = state.read_word(regs.sp) {
        state.registers.pc = pc;
        state.registers.sp = regs.sp.wrapping_add(2);
    }
    Ok(state)
}

/// Encode a machine state as an SNA stream.
///
/// PC is pushed into the saved RAM image below SP, as the format expects.
/// The state itself is not modified.
pub fn encode(state: &MachineState) -> Result<Vec<u8>, SnaError> {
    let regs = &state.registers;
    let sp = regs.sp.wrapping_sub(2);

    let mut image = state.clone();
    if !image.write_word(sp, regs.pc) {
        return Err(SnaError::StackOutsideRam(regs.sp));
    }

    let mut header = [0u8; HEADER_SIZE];
    header[0] = regs.i;
    put_word(&mut header, 1, regs.hl_alt());
    put_word(&mut header, 3, regs.de_alt());
    put_word(&mut header, 5, regs.bc_alt());
    put_word(&mut header, 7, regs.af_alt());
    put_word(&mut header, 9, regs.hl());
    put_word(&mut header, 11, regs.de());
    put_word(&mut header, 13, regs.bc());
    put_word(&mut header, 15, regs.iy);
    put_word(&mut header, 17, regs.ix);
    header[19] = if regs.iff2 { 0x04 } else { 0x00 };
    header[20] = regs.r;
    put_word(&mut header, 21, regs.af());
    put_word(&mut header, 23, sp);
    header[25] = regs.im & 0x03;
    header[26] = state.border & 0x07;

    let mut out = Vec::with_capacity(SNA_SIZE);
    out.extend_from_slice(&header);
    out.extend_from_slice(image.ram());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sna_with_header(header: [u8; HEADER_SIZE]) -> Vec<u8> {
        let mut data = header.to_vec();
        data.resize(SNA_SIZE, 0);
        data
    }

    #[test]
    fn zeroed_payload_with_border_and_i() {
        let mut header = [0u8; HEADER_SIZE];
        header[0] = 0x3F;
        header[21] = 0x44; // F
        header[22] = 0x00; // A
        header[26] = 0x05;
        let state = parse(&sna_with_header(header)).unwrap();

        assert_eq!(state.border, 5);
        assert_eq!(state.registers.i, 0x3F);
        assert_eq!(state.registers.af(), 0x0044);
        assert!(state.ram().iter().all(|&b| b == 0));
        // SP = 0 points into ROM, so nothing is popped.
        assert_eq!(state.registers.pc, 0);
        assert_eq!(state.registers.sp, 0);
    }

    #[test]
    fn header_fields_are_little_endian_pairs() {
        let mut header = [0u8; HEADER_SIZE];
        for (i, byte) in header.iter_mut().enumerate() {
            *byte = i as u8;
        }
        header[23] = 0x00;
        header[24] = 0x00; // keep SP out of RAM
        let state = parse(&sna_with_header(header)).unwrap();
        let regs = state.registers;

        assert_eq!(regs.hl_alt(), 0x0201);
        assert_eq!(regs.de_alt(), 0x0403);
        assert_eq!(regs.bc_alt(), 0x0605);
        assert_eq!(regs.af_alt(), 0x0807);
        assert_eq!(regs.hl(), 0x0A09);
        assert_eq!(regs.de(), 0x0C0B);
        assert_eq!(regs.bc(), 0x0E0D);
        assert_eq!(regs.iy, 0x100F);
        assert_eq!(regs.ix, 0x1211);
        assert_eq!(regs.r, 20);
        assert_eq!(regs.af(), 0x1615);
        assert_eq!(regs.im, 25 & 0x03);
        assert_eq!(state.border, 26 & 0x07);
        // 19 = 0b10011: bit 2 clear
        assert!(!regs.iff1 && !regs.iff2);
    }

    #[test]
    fn iff2_bit_enables_both_latches() {
        let mut header = [0u8; HEADER_SIZE];
        header[19] = 0x04;
        let state = parse(&sna_with_header(header)).unwrap();
        assert!(state.registers.iff1);
        assert!(state.registers.iff2);
    }

    #[test]
    fn pc_is_popped_from_stack() {
        let mut header = [0u8; HEADER_SIZE];
        header[23] = 0x00;
        header[24] = 0x80; // SP = $8000
        let mut data = sna_with_header(header);
        data[HEADER_SIZE + 0x4000] = 0x34;
        data[HEADER_SIZE + 0x4001] = 0x12;

        let state = parse(&data).unwrap();
        assert_eq!(state.registers.pc, 0x1234);
        assert_eq!(state.registers.sp, 0x8002);
    }

    #[test]
    fn short_header_is_rejected() {
        assert_eq!(parse(&[0u8; 26]), Err(SnaError::TruncatedHeader(26)));
        assert_eq!(parse(&[]), Err(SnaError::TruncatedHeader(0)));
    }

    #[test]
    fn short_payload_is_zero_padded() {
        let mut data = vec![0u8; HEADER_SIZE];
        data.extend_from_slice(&[0xAA, 0xBB]);
        let state = parse(&data).unwrap();
        assert_eq!(&state.ram()[..3], &[0xAA, 0xBB, 0x00]);
        assert_eq!(state.ram().len(), RAM_SIZE);
    }

    #[test]
    fn encode_pushes_pc_and_parses_back() {
        let mut regs = Registers {
            pc: 0x8123,
            sp: 0xFF00,
            i: 0x3F,
            r: 0x55,
            ix: 0x1111,
            iy: 0x5C3A,
            iff1: true,
            iff2: true,
            im: 1,
            ..Registers::default()
        };
        regs.set_af(0x1234);
        regs.set_hl_alt(0xABCD);
        let mut ram = vec![0u8; RAM_SIZE];
        ram[0x100] = 0x99;
        let state = MachineState::new(regs, 2, &ram);

        let bytes = encode(&state).unwrap();
        assert_eq!(bytes.len(), SNA_SIZE);
        assert_eq!(u16::from_le_bytes([bytes[23], bytes[24]]), 0xFEFE);
        assert_eq!(bytes[26], 2);

        let back = parse(&bytes).unwrap();
        assert_eq!(back.registers, regs);
        assert_eq!(back.border, 2);
        assert_eq!(back.ram()[0x100], 0x99);
        // The pushed PC stays in the image below the restored SP.
        assert_eq!(back.read_word(0xFEFE), Some(0x8123));
    }

    #[test]
    fn encode_rejects_stack_in_rom() {
        let regs = Registers { sp: 0x3000, ..Registers::default() };
        let state = MachineState::new(regs, 0, &[]);
        assert_eq!(encode(&state), Err(SnaError::StackOutsideRam(0x3000)));

        let regs = Registers { sp: 0x4001, ..Registers::default() };
        let state = MachineState::new(regs, 0, &[]);
        assert_eq!(encode(&state), Err(SnaError::StackOutsideRam(0x4001)));
    }

    #[test]
    fn encode_wraps_stack_at_top_of_memory() {
        let regs = Registers { pc: 0x1234, sp: 0x0000, ..Registers::default() };
        let bytes = encode(&MachineState::new(regs, 0, &[])).unwrap();
        assert_eq!(u16::from_le_bytes([bytes[23], bytes[24]]), 0xFFFE);

        let back = parse(&bytes).unwrap();
        assert_eq!(back.registers.pc, 0x1234);
        assert_eq!(back.registers.sp, 0x0000);
    }
}
