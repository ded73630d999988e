//! Sinclair ULA screen decoding.
//!
//! The ULA reads a 6912-byte screen from RAM: a 6144-byte bitmap followed
//! by 768 attribute bytes, one per 8x8 character cell. This crate turns
//! that encoding into colour indices and ARGB32 pixels.
//!
//! # Standalone IC
//!
//! This crate has no dependencies. It borrows the screen bytes through a
//! [`ScreenView`] and never owns or copies machine memory.
//!
//! # Screen memory layout
//!
//! Bitmap offset: `0 0 0 Y7 Y6 Y2 Y1 Y0 Y5 Y4 Y3 X4 X3 X2 X1 X0`
//! Attribute offset: `(y / 8) * 32 + x`
//!
//! Consecutive pixel lines inside a character row are 256 bytes apart, so
//! line 1 sits at offset 256 rather than 32.
//!
//! # Framebuffer
//!
//! 320x288 pixels: 256 active + 32 left border + 32 right border horizontally,
//! 192 active + 48 top border + 48 bottom border vertically.

mod flash;
mod palette;

pub use flash::{FLASH_FRAME_COUNT, FlashClock};
pub use palette::{PASTEL, PaletteMode, SATURATED};

/// Active display area in pixels.
pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 192;

/// Number of pixels in the active display area.
pub const PIXEL_COUNT: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Byte columns per pixel line.
const COLUMNS: usize = SCREEN_WIDTH / 8;

/// Screen memory sizes.
pub const BITMAP_SIZE: usize = 6144;
pub const ATTR_SIZE: usize = 768;
pub const SCREEN_SIZE: usize = BITMAP_SIZE + ATTR_SIZE;

/// Framebuffer dimensions.
pub const FB_WIDTH: u32 = 320;
pub const FB_HEIGHT: u32 = 288;
pub const FB_SIZE: usize = (FB_WIDTH * FB_HEIGHT) as usize;

/// Display area within the framebuffer.
const BORDER_LEFT: usize = 32;
const BORDER_TOP: usize = 48;

/// Bitmap offset of byte column `ax` on pixel line `y`.
///
/// The linear block number `y * 32 + ax` has its middle two 3-bit fields
/// swapped: bits 5-7 move to 8-10 and bits 8-10 move to 5-7.
#[must_use]
pub const fn bitmap_offset(y: usize, ax: usize) -> usize {
    let block = y * COLUMNS + ax;
    let a4a0 = block & 0x1F;
    let a7a5 = (block >> 5) & 0x07;
    let a10a8 = (block >> 8) & 0x07;
    let a12a11 = (block >> 11) & 0x03;
    a4a0 | (a10a8 << 5) | (a7a5 << 8) | (a12a11 << 11)
}

/// Attribute offset for the character cell holding pixel line `y`, column `ax`.
#[must_use]
pub const fn attribute_offset(y: usize, ax: usize) -> usize {
    (y / 8) * COLUMNS + ax
}

/// A decoded attribute byte: `F B PPP III`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute(pub u8);

impl Attribute {
    #[must_use]
    pub const fn ink(self) -> u8 {
        self.0 & 0x07
    }

    #[must_use]
    pub const fn paper(self) -> u8 {
        (self.0 >> 3) & 0x07
    }

    #[must_use]
    pub const fn bright(self) -> bool {
        self.0 & 0x40 != 0
    }

    #[must_use]
    pub const fn flash(self) -> bool {
        self.0 & 0x80 != 0
    }

    /// Colour index for one pixel of this cell.
    ///
    /// A flashing cell in the inverted phase swaps which colour a set bit
    /// selects. Ink takes the bright offset; paper never does.
    #[must_use]
    pub const fn colour(self, pixel: bool, flash_phase: bool) -> u8 {
        if pixel ^ (self.flash() && flash_phase) {
            self.ink() + if self.bright() { 8 } else { 0 }
        } else {
            self.paper()
        }
    }
}

/// Live view of the bitmap and attribute regions of a screen bank.
#[derive(Debug, Clone, Copy)]
pub struct ScreenView<'a> {
    bitmap: &'a [u8],
    attributes: &'a [u8],
}

impl<'a> ScreenView<'a> {
    /// View the first [`SCREEN_SIZE`] bytes of `screen`.
    ///
    /// # Panics
    ///
    /// Panics if `screen` is shorter than [`SCREEN_SIZE`].
    #[must_use]
    pub fn new(screen: &'a [u8]) -> Self {
        let (bitmap, rest) = screen.split_at(BITMAP_SIZE);
        Self {
            bitmap,
            attributes: &rest[..ATTR_SIZE],
        }
    }

    #[must_use]
    pub fn bitmap(&self) -> &'a [u8] {
        self.bitmap
    }

    #[must_use]
    pub fn attributes(&self) -> &'a [u8] {
        self.attributes
    }

    /// Bitmap byte for pixel line `y`, byte column `ax`.
    #[must_use]
    pub fn bitmap_byte(&self, y: usize, ax: usize) -> u8 {
        self.bitmap[bitmap_offset(y, ax)]
    }

    /// Attribute for pixel line `y`, byte column `ax`.
    #[must_use]
    pub fn attribute(&self, y: usize, ax: usize) -> Attribute {
        Attribute(self.attributes[attribute_offset(y, ax)])
    }
}

/// Decode the screen into a row-major grid of [`PIXEL_COUNT`] colour indices.
///
/// Pure function of the screen bytes and the flash phase.
#[must_use]
pub fn decode(view: &ScreenView<'_>, flash_phase: bool) -> Vec<u8> {
    let mut pixels = vec![0u8; PIXEL_COUNT];
    for y in 0..SCREEN_HEIGHT {
        for ax in 0..COLUMNS {
            let attr = view.attribute(y, ax);
            let data = view.bitmap_byte(y, ax);
            let start = y * SCREEN_WIDTH + ax * 8;
            for (px, out) in pixels[start..start + 8].iter_mut().enumerate() {
                *out = attr.colour(data & (0x80 >> px) != 0, flash_phase);
            }
        }
    }
    pixels
}

/// Render the screen and border into an ARGB32 framebuffer.
///
/// # Panics
///
/// Panics if `framebuffer` holds fewer than [`FB_SIZE`] pixels.
pub fn render(
    view: &ScreenView<'_>,
    flash_phase: bool,
    border: u8,
    palette: PaletteMode,
    framebuffer: &mut [u32],
) {
    let framebuffer = &mut framebuffer[..FB_SIZE];
    framebuffer.fill(palette.argb(border & 0x07));

    let indices = decode(view, flash_phase);
    for (y, line) in indices.chunks_exact(SCREEN_WIDTH).enumerate() {
        let start = (BORDER_TOP + y) * FB_WIDTH as usize + BORDER_LEFT;
        for (dst, &index) in framebuffer[start..start + SCREEN_WIDTH].iter_mut().zip(line) {
            *dst = palette.argb(index);
        }
    }
}
