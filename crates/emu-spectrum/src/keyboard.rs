//! ZX Spectrum keyboard matrix.
//!
//! The Spectrum keyboard is an 8×5 matrix of half-rows, read via port $FE.
//! The high byte of the port address selects which half-rows to scan: each
//! cleared bit (A8-A15) enables one half-row.
//!
//! # Half-row layout
//!
//! | Addr bit | Row | Keys (bit 0-4)                |
//! |----------|-----|-------------------------------|
//! | A8       | 0   | Shift, Z, X, C, V            |
//! | A9       | 1   | A, S, D, F, G                |
//! | A10      | 2   | Q, W, E, R, T                |
//! | A11      | 3   | 1, 2, 3, 4, 5                |
//! | A12      | 4   | 0, 9, 8, 7, 6                |
//! | A13      | 5   | P, O, I, U, Y                |
//! | A14      | 6   | Enter, L, K, J, H            |
//! | A15      | 7   | Space, Sym, M, N, B          |
//!
//! A pressed key reads as 0 (active low).

/// Number of half-rows.
pub const ROWS: usize = 8;

/// Keys per half-row.
pub const COLUMNS: usize = 5;

/// Pressed flags for every key. Press and release are idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMatrix {
    /// Bits 0-4: 1 = key pressed (inverted on read for port $FE).
    rows: [u8; ROWS],
}

impl KeyMatrix {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear a key. Coordinates outside 8×5 are ignored.
    pub fn set(&mut self, row: usize, col: usize, pressed: bool) {
        if row < ROWS && col < COLUMNS {
            if pressed {
                self.rows[row] |= 1 << col;
            } else {
                self.rows[row] &= !(1 << col);
            }
        }
    }

    pub fn press(&mut self, row: usize, col: usize) {
        self.set(row, col, true);
    }

    pub fn release(&mut self, row: usize, col: usize) {
        self.set(row, col, false);
    }

    #[must_use]
    pub fn is_pressed(&self, row: usize, col: usize) -> bool {
        row < ROWS && col < COLUMNS && self.rows[row] & (1 << col) != 0
    }

    /// Read the keyboard for a port $FE access.
    ///
    /// `addr_high` is the high byte of the port address (bits A8-A15).
    /// Each cleared bit selects a half-row to scan.
    ///
    /// The matrix is passive. With several keys down, current can flow
    /// through the switch network and pull extra columns low ("ghosting").
    /// Any row reachable from a selected row through shared columns
    /// contributes its columns to the result.
    ///
    /// Returns bits 0-4 (active low: 0 = pressed), bits 5-7 = 1.
    #[must_use]
    pub fn read(&self, addr_high: u8) -> u8 {
        let mut active_rows: u8 = !addr_high;

        // Propagate through shared columns until stable
        loop {
            let cols = self.columns_of(active_rows);

            let mut new_rows = active_rows;
            for (i, &row) in self.rows.iter().enumerate() {
                if row & cols != 0 {
                    new_rows |= 1 << i;
                }
            }

            if new_rows == active_rows {
                break;
            }
            active_rows = new_rows;
        }

        (!self.columns_of(active_rows) & 0x1F) | 0xE0
    }

    /// Union of the pressed columns of every row selected in `rows`.
    fn columns_of(&self, rows: u8) -> u8 {
        self.rows
            .iter()
            .enumerate()
            .filter(|(i, _)| rows & (1 << i) != 0)
            .fold(0, |cols, (_, &row)| cols | row)
    }

    /// Release all keys.
    pub fn release_all(&mut self) {
        self.rows = [0; ROWS];
    }
}
