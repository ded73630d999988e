//! Z80 snapshot run-length coding.
//!
//! A block `ED ED n b` stands for `n` copies of `b`. Every other byte is
//! literal, including a lone `ED` that is not followed by a second `ED`.
//! The sequence `ED ED 00` marks the end of the stream.

use format_sna::RAM_SIZE;

/// Decoder states.
#[derive(Debug, Clone, Copy)]
enum State {
    Literal,
    SawEd,
    SawEdEd,
    Repeat(u8),
}

/// Expand a compressed payload to exactly [`RAM_SIZE`] bytes.
///
/// Decoding stops at `ED ED 00` or at the end of input, whichever comes
/// first. A lone `ED` as the final input byte is kept as a literal; an
/// unfinished block is dropped. The result is truncated or zero-padded.
#[must_use]
pub fn decompress(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(RAM_SIZE);
    let mut state = State::Literal;

    for &byte in input {
        state = match (state, byte) {
            (State::Literal, 0xED) => State::SawEd,
            (State::Literal, _) => {
                out.push(byte);
                State::Literal
            }
            (State::SawEd, 0xED) => State::SawEdEd,
            (State::SawEd, _) => {
                out.extend_from_slice(&[0xED, byte]);
                State::Literal
            }
            (State::SawEdEd, 0x00) => break,
            (State::SawEdEd, count) => State::Repeat(count),
            (State::Repeat(count), _) => {
                out.extend(std::iter::repeat_n(byte, usize::from(count)));
                State::Literal
            }
        };
    }
    if matches!(state, State::SawEd) {
        out.push(0xED);
    }

    out.resize(RAM_SIZE, 0);
    out
}

/// Longest run a single block can describe.
const MAX_RUN: usize = 255;

/// Compress a payload. The end marker is not appended.
///
/// Runs of five or more equal bytes, and runs of two or more `ED`s, become
/// blocks. The byte after a lone literal `ED` is always written literally
/// so it cannot be read back as the start of a block.
#[must_use]
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        let run = data[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == byte)
            .count();

        if run >= 5 || (byte == 0xED && run >= 2) {
            out.extend_from_slice(&[0xED, 0xED, run as u8, byte]);
            i += run;
        } else if byte == 0xED {
            out.push(0xED);
            i += 1;
            if let Some(&next) = data.get(i) {
                out.push(next);
                i += 1;
            }
        } else {
            out.push(byte);
            i += 1;
        }
    }
    out
}
