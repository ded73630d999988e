//! Headless capture: PNG screenshots.

use std::fs;
use std::io::{self, BufWriter};
use std::path::Path;

use emu_core::Cpu;
use sinclair_ula::{FB_HEIGHT, FB_SIZE, FB_WIDTH, PaletteMode, ScreenView, render};
use thiserror::Error;
use zilog_z80::Registers;

use crate::Spectrum;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot create {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Png(#[from] png::EncodingError),
}

/// Render a 6,912-byte screen dump with a border into an ARGB32 framebuffer.
///
/// # Panics
///
/// Panics if `screen` is shorter than a full bitmap and attribute area.
#[must_use]
pub fn render_screen(screen: &[u8], border: u8, palette: PaletteMode, flash_phase: bool) -> Vec<u32> {
    let mut framebuffer = vec![0; FB_SIZE];
    render(&ScreenView::new(screen), flash_phase, border, palette, &mut framebuffer);
    framebuffer
}

/// Convert ARGB32 pixels to RGBA bytes with full alpha.
#[must_use]
pub fn argb_to_rgba(pixels: &[u32]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(pixels.len() * 4);
    for &pixel in pixels {
        let [_, r, g, b] = pixel.to_be_bytes();
        rgba.extend_from_slice(&[r, g, b, 0xFF]);
    }
    rgba
}

/// Save an ARGB32 framebuffer as a PNG file.
pub fn save_png(pixels: &[u32], width: u32, height: u32, path: &Path) -> Result<(), CaptureError> {
    let file = fs::File::create(path).map_err(|source| CaptureError::Create {
        path: path.display().to_string(),
        source,
    })?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&argb_to_rgba(pixels))?;
    writer.finish()?;
    Ok(())
}

/// Save the current framebuffer as a PNG file.
pub fn save_screenshot<C: Cpu<Registers = Registers>>(
    spectrum: &Spectrum<C>,
    path: &Path,
) -> Result<(), CaptureError> {
    save_png(spectrum.framebuffer(), FB_WIDTH, FB_HEIGHT, path)
}

#[cfg(test)]
mod tests {
    use sinclair_ula::SCREEN_SIZE;

    use super::*;

    #[test]
    fn rgba_drops_alpha_channel() {
        assert_eq!(argb_to_rgba(&[0x00CD_1234]), vec![0xCD, 0x12, 0x34, 0xFF]);
    }

    #[test]
    fn render_screen_fills_border() {
        let fb = render_screen(&[0; SCREEN_SIZE], 1, PaletteMode::Pastel, false);
        assert_eq!(fb.len(), FB_SIZE);
        assert_eq!(fb[0], PaletteMode::Pastel.argb(1));
    }

    #[test]
    fn png_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let fb = render_screen(&[0; SCREEN_SIZE], 2, PaletteMode::Saturated, false);
        save_png(&fb, FB_WIDTH, FB_HEIGHT, &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("shot.png");
        let err = save_png(&[0; 4], 2, 2, &path).unwrap_err();
        assert!(matches!(err, CaptureError::Create { .. }));
    }
}
