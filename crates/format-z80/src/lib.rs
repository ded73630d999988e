//! Z80 snapshot codec (version 1) for the 48K Spectrum.
//!
//! **Layout**: 30-byte header + 49,152-byte RAM image from $4000, raw or
//! run-length compressed. Register pairs are little-endian.
//!
//! | Offset | Field   | Offset | Field          |
//! |--------|---------|--------|----------------|
//! | 0      | A       | 15     | BC'            |
//! | 1      | F       | 17     | DE'            |
//! | 2      | BC      | 19     | HL'            |
//! | 4      | HL      | 21     | A'             |
//! | 6      | PC      | 22     | F'             |
//! | 8      | SP      | 23     | IY             |
//! | 10     | I       | 25     | IX             |
//! | 11     | R (0-6) | 27     | IFF1           |
//! | 12     | Flags 1 | 28     | IFF2           |
//! | 13     | DE      | 29     | Flags 2 (IM)   |
//!
//! Flags 1: bit 0 = R bit 7, bits 1-3 = border, bit 5 = compressed. A
//! value of $FF is read as $01 for compatibility with old writers.
//!
//! Version 2 and 3 files (PC = 0 followed by an extended header) are not
//! recognised; every stream is decoded with the version 1 layout.

#![allow(clippy::cast_possible_truncation)]

mod rle;

use format_sna::MachineState;
use thiserror::Error;
use zilog_z80::Registers;

pub use rle::{compress, decompress};

/// Header size in bytes.
pub const HEADER_SIZE: usize = 30;

/// Trailer written after a compressed payload.
const END_MARKER: [u8; 4] = [0x00, 0xED, 0xED, 0x00];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Z80Error {
    #[error("Z80 header needs 30 bytes, got {0}")]
    TruncatedHeader(usize),
}

/// The packed "flags 1" header byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags1 {
    /// Bit 7 of the R register.
    pub r7: bool,
    /// Border colour, 0-7.
    pub border: u8,
    /// Payload is run-length compressed.
    pub compressed: bool,
}

impl Flags1 {
    #[must_use]
    pub const fn decode(raw: u8) -> Self {
        let raw = if raw == 0xFF { 0x01 } else { raw };
        Self {
            r7: raw & 0x01 != 0,
            border: (raw >> 1) & 0x07,
            compressed: raw & 0x20 != 0,
        }
    }

    #[must_use]
    pub const fn encode(self) -> u8 {
        (self.r7 as u8) | ((self.border & 0x07) << 1) | if self.compressed { 0x20 } else { 0 }
    }
}

/// Decoded header: registers plus flags 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Z80Header {
    pub registers: Registers,
    pub flags: Flags1,
}

fn word(header: &[u8; HEADER_SIZE], offset: usize) -> u16 {
    u16::from_le_bytes([header[offset], header[offset + 1]])
}

fn put_word(header: &mut [u8; HEADER_SIZE], offset: usize, value: u16) {
    header[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

impl Z80Header {
    /// Decode the first 30 bytes of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, Z80Error> {
        let header: &[u8; HEADER_SIZE] = data
            .first_chunk()
            .ok_or(Z80Error::TruncatedHeader(data.len()))?;
        let flags = Flags1::decode(header[12]);

        let mut regs = Registers {
            a: header[0],
            f: header[1],
            pc: word(header, 6),
            sp: word(header, 8),
            i: header[10],
            r: (header[11] & 0x7F) | if flags.r7 { 0x80 } else { 0 },
            a_alt: header[21],
            f_alt: header[22],
            iy: word(header, 23),
            ix: word(header, 25),
            iff1: header[27] != 0,
            iff2: header[28] != 0,
            im: header[29] & 0x03,
            ..Registers::default()
        };
        regs.set_bc(word(header, 2));
        regs.set_hl(word(header, 4));
        regs.set_de(word(header, 13));
        regs.set_bc_alt(word(header, 15));
        regs.set_de_alt(word(header, 17));
        regs.set_hl_alt(word(header, 19));

        Ok(Self {
            registers: regs,
            flags,
        })
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let regs = &self.registers;
        let flags = Flags1 {
            r7: regs.r & 0x80 != 0,
            ..self.flags
        };

        let mut header = [0u8; HEADER_SIZE];
        header[0] = regs.a;
        header[1] = regs.f;
        put_word(&mut header, 2, regs.bc());
        put_word(&mut header, 4, regs.hl());
        put_word(&mut header, 6, regs.pc);
        put_word(&mut header, 8, regs.sp);
        header[10] = regs.i;
        header[11] = regs.r & 0x7F;
        header[12] = flags.encode();
        put_word(&mut header, 13, regs.de());
        put_word(&mut header, 15, regs.bc_alt());
        put_word(&mut header, 17, regs.de_alt());
        put_word(&mut header, 19, regs.hl_alt());
        header[21] = regs.a_alt;
        header[22] = regs.f_alt;
        put_word(&mut header, 23, regs.iy);
        put_word(&mut header, 25, regs.ix);
        header[27] = u8::from(regs.iff1);
        header[28] = u8::from(regs.iff2);
        header[29] = regs.im & 0x03;
        header
    }
}

/// Decode a Z80 stream.
///
/// Compressed payloads go through [`decompress`]; raw payloads are
/// zero-padded or truncated to 49,152 bytes.
pub fn parse(data: &[u8]) -> Result<MachineState, Z80Error> {
    let header = Z80Header::parse(data)?;
    let payload = &data[HEADER_SIZE..];
    let state = if header.flags.compressed {
        MachineState::new(header.registers, header.flags.border, &decompress(payload))
    } else {
        MachineState::new(header.registers, header.flags.border, payload)
    };
    Ok(state)
}

/// Encode a machine state as a Z80 stream, optionally compressed.
#[must_use]
pub fn encode(state: &MachineState, compressed: bool) -> Vec<u8> {
    let header = Z80Header {
        registers: state.registers,
        flags: Flags1 {
            r7: false,
            border: state.border,
            compressed,
        },
    };

    let mut out = header.to_bytes().to_vec();
    if compressed {
        out.extend(compress(state.ram()));
        out.extend_from_slice(&END_MARKER);
    } else {
        out.extend_from_slice(state.ram());
    }
    out
}
