//! FLASH attribute timing.

/// Number of frames between FLASH toggles (320 ms at 50 Hz).
pub const FLASH_FRAME_COUNT: u8 = 16;

/// Frame counter that flips the flash phase every [`FLASH_FRAME_COUNT`] frames.
#[derive(Debug, Clone, Default)]
pub struct FlashClock {
    frames: u8,
    phase: bool,
}

impl FlashClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame. Returns the phase after the frame.
    pub fn tick(&mut self) -> bool {
        self.frames += 1;
        if self.frames >= FLASH_FRAME_COUNT {
            self.frames = 0;
            self.phase = !self.phase;
        }
        self.phase
    }

    /// Current flash phase. `true` means flashing cells show inverted.
    #[must_use]
    pub fn phase(&self) -> bool {
        self.phase
    }
}
