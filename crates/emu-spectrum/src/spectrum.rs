//! Top-level Spectrum system.
//!
//! `Spectrum` owns the bus, the flash clock, the input mapper and the
//! rendered framebuffer, and drives any CPU core that speaks
//! `emu_core::Cpu` with the Z80 register record.
//!
//! # Frame loop
//!
//! One frame is 70,000 CPU cycles (20 ms). The interrupt line is held for
//! the last 28 cycles of the frame, then released before the next one. After
//! the CPU bursts the flash clock advances and the framebuffer is redrawn.

use emu_core::Cpu;
use sinclair_ula::{FB_HEIGHT, FB_SIZE, FB_WIDTH, FlashClock, PaletteMode};
use zilog_z80::Registers;

use crate::bus::SpectrumBus;
use crate::config::{RomError, SpectrumConfig, SpectrumModel};
use crate::input::{HostInput, InputMapper, JoystickAction, JoystickMode, SpectrumKey};

/// CPU cycles per frame.
pub const FRAME_CYCLES: u32 = 70_000;

/// Cycles the interrupt line stays asserted at the end of a frame.
pub const INT_CYCLES: u32 = 28;

/// ZX Spectrum system.
pub struct Spectrum<C> {
    cpu: C,
    bus: SpectrumBus,
    flash: FlashClock,
    input: InputMapper,
    /// ARGB32, [`FB_WIDTH`] × [`FB_HEIGHT`].
    framebuffer: Vec<u32>,
    /// Completed frame counter.
    frame_count: u64,
}

impl<C: Cpu<Registers = Registers>> Spectrum<C> {
    /// Create a Spectrum around `cpu` and reset it.
    ///
    /// Fails only if the configured ROM does not fit the model.
    pub fn new(cpu: C, config: &SpectrumConfig) -> Result<Self, RomError> {
        let mut bus = SpectrumBus::for_model(config.model, &config.rom)?;
        bus.set_palette(config.palette);

        let mut spectrum = Self {
            cpu,
            bus,
            flash: FlashClock::new(),
            input: InputMapper::new(config.joystick),
            framebuffer: vec![0; FB_SIZE],
            frame_count: 0,
        };
        spectrum.reset();
        Ok(spectrum)
    }

    /// Run one complete frame and redraw the framebuffer.
    ///
    /// Returns the number of CPU cycles executed during the frame.
    pub fn run_frame(&mut self) -> u32 {
        let mut cycles = self.cpu.run(&mut self.bus, FRAME_CYCLES - INT_CYCLES);
        self.cpu.raise_interrupt();
        cycles += self.cpu.run(&mut self.bus, INT_CYCLES);
        self.cpu.lower_interrupt();

        let phase = self.flash.tick();
        self.bus.set_flash_phase(phase);
        self.render();

        self.frame_count += 1;
        cycles
    }

    /// Redraw the framebuffer from the current screen bank.
    pub fn render(&mut self) {
        self.bus.render(&mut self.framebuffer);
    }

    /// Reset the CPU and the bus. RAM and the palette survive.
    pub fn reset(&mut self) {
        log::info!("reset {} Spectrum", self.bus.model());
        self.cpu.reset();
        self.bus.reset();
    }

    /// Pulse the non-maskable interrupt.
    pub fn nmi(&mut self) {
        self.cpu.nmi();
    }

    /// Replace the bus with fresh hardware for `model`.
    ///
    /// RAM, keys and paging start from scratch. The CPU, palette and flash
    /// phase carry over. On error the current machine is untouched.
    pub fn switch_model(&mut self, model: SpectrumModel, rom: &[u8]) -> Result<(), RomError> {
        let mut bus = SpectrumBus::for_model(model, rom)?;
        bus.set_palette(self.bus.palette());
        bus.set_flash_phase(self.bus.flash_phase());
        log::info!("switching {} -> {model}", self.bus.model());
        self.bus = bus;
        Ok(())
    }

    /// Reference to the framebuffer (ARGB32).
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    /// Framebuffer width in pixels.
    #[must_use]
    pub fn framebuffer_width(&self) -> u32 {
        FB_WIDTH
    }

    /// Framebuffer height in pixels.
    #[must_use]
    pub fn framebuffer_height(&self) -> u32 {
        FB_HEIGHT
    }

    #[must_use]
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &SpectrumBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut SpectrumBus {
        &mut self.bus
    }

    #[must_use]
    pub fn model(&self) -> SpectrumModel {
        self.bus.model()
    }

    /// Completed frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn set_palette(&mut self, palette: PaletteMode) {
        self.bus.set_palette(palette);
    }

    #[must_use]
    pub fn joystick_mode(&self) -> JoystickMode {
        self.input.mode()
    }

    /// Change the joystick interface. Anything held through the old one is
    /// released.
    pub fn set_joystick_mode(&mut self, mode: JoystickMode) {
        for action in [
            JoystickAction::Up,
            JoystickAction::Down,
            JoystickAction::Left,
            JoystickAction::Right,
            JoystickAction::Fire,
        ] {
            self.bus.apply_joystick(self.input.target(action), false);
        }
        self.input.set_mode(mode);
    }

    /// Press a key immediately (stays pressed until released).
    pub fn press_key(&mut self, key: SpectrumKey) {
        self.bus.set_key(key, true);
    }

    pub fn release_key(&mut self, key: SpectrumKey) {
        self.bus.set_key(key, false);
    }

    pub fn release_all_keys(&mut self) {
        self.bus.keyboard.release_all();
    }

    /// Press or release a joystick direction through the current interface.
    pub fn joystick(&mut self, action: JoystickAction, pressed: bool) {
        self.bus.apply_joystick(self.input.target(action), pressed);
    }

    /// Feed a host key event and return what it was taken as.
    ///
    /// Reset and NMI fire on press only.
    pub fn host_key(&mut self, scancode: u32, pressed: bool) -> HostInput {
        let input = self.input.translate(scancode);
        match input {
            HostInput::Key(key) => self.bus.set_key(key, pressed),
            HostInput::Joystick(action) => self.joystick(action, pressed),
            HostInput::Reset if pressed => self.reset(),
            HostInput::Nmi if pressed => self.nmi(),
            HostInput::Reset | HostInput::Nmi | HostInput::Ignored => {}
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use zilog_z80::{CpuEvent, RecordingCpu};

    use super::*;

    fn make_spectrum() -> Spectrum<RecordingCpu> {
        let config = SpectrumConfig::new(SpectrumModel::Spectrum48K, vec![0; 0x4000]);
        Spectrum::new(RecordingCpu::new(), &config).unwrap()
    }

    #[test]
    fn new_resets_cpu() {
        let spectrum = make_spectrum();
        assert_eq!(spectrum.cpu().events(), &[CpuEvent::Reset]);
    }

    #[test]
    fn wrong_rom_fails_construction() {
        let config = SpectrumConfig::new(SpectrumModel::Spectrum48K, vec![0; 100]);
        assert!(Spectrum::new(RecordingCpu::new(), &config).is_err());
    }

    #[test]
    fn frame_holds_interrupt_for_last_cycles() {
        let mut spectrum = make_spectrum();
        spectrum.cpu_mut().take_events();

        let cycles = spectrum.run_frame();
        assert_eq!(cycles, FRAME_CYCLES);
        assert_eq!(
            spectrum.cpu().events(),
            &[
                CpuEvent::Run(FRAME_CYCLES - INT_CYCLES),
                CpuEvent::RaiseInterrupt,
                CpuEvent::Run(INT_CYCLES),
                CpuEvent::LowerInterrupt,
            ]
        );
        assert!(!spectrum.cpu().interrupt_asserted());
        assert_eq!(spectrum.frame_count(), 1);
    }

    #[test]
    fn flash_phase_flips_every_16_frames() {
        let mut spectrum = make_spectrum();
        for _ in 0..15 {
            spectrum.run_frame();
        }
        assert!(!spectrum.bus().flash_phase());
        spectrum.run_frame();
        assert!(spectrum.bus().flash_phase());
        for _ in 0..16 {
            spectrum.run_frame();
        }
        assert!(!spectrum.bus().flash_phase());
    }

    #[test]
    fn run_frame_renders_border() {
        let mut spectrum = make_spectrum();
        spectrum.bus_mut().set_border(4);
        spectrum.run_frame();
        assert_eq!(spectrum.framebuffer()[0], PaletteMode::Pastel.argb(4));
        assert_eq!(spectrum.framebuffer().len(), FB_SIZE);
    }

    #[test]
    fn host_keys_drive_matrix_and_controls() {
        let mut spectrum = make_spectrum();
        spectrum.cpu_mut().take_events();

        assert_eq!(spectrum.host_key(30, true), HostInput::Key(SpectrumKey::A));
        assert!(spectrum.bus().keyboard.is_pressed(1, 0));
        spectrum.host_key(30, false);
        assert!(!spectrum.bus().keyboard.is_pressed(1, 0));

        spectrum.host_key(88, true);
        spectrum.host_key(88, false);
        spectrum.host_key(1, false);
        assert_eq!(spectrum.cpu().events(), &[CpuEvent::Nmi]);

        spectrum.host_key(1, true);
        assert_eq!(spectrum.cpu().events(), &[CpuEvent::Nmi, CpuEvent::Reset]);

        assert_eq!(spectrum.host_key(59, true), HostInput::Ignored);
    }

    #[test]
    fn arrows_follow_joystick_mode() {
        let mut spectrum = make_spectrum();
        // Cursor keys: up is 7 (row 4, bit 3)
        spectrum.host_key(328, true);
        assert!(spectrum.bus().keyboard.is_pressed(4, 3));

        // Switching interface releases what the old one held
        spectrum.set_joystick_mode(JoystickMode::Kempston);
        assert!(!spectrum.bus().keyboard.is_pressed(4, 3));
        spectrum.host_key(285, true);
        assert_eq!(spectrum.bus().kempston, 0x10);
        spectrum.host_key(285, false);
        assert_eq!(spectrum.bus().kempston, 0);
    }

    #[test]
    fn switch_model_keeps_cpu_and_palette() {
        let mut spectrum = make_spectrum();
        spectrum.set_palette(PaletteMode::Saturated);
        spectrum.cpu_mut().regs.pc = 0x1234;
        spectrum.bus_mut().load_block(0x8000, &[0xAA]);

        spectrum.switch_model(SpectrumModel::Spectrum128K, &[0; 0x8000]).unwrap();

        assert_eq!(spectrum.model(), SpectrumModel::Spectrum128K);
        assert_eq!(spectrum.cpu().regs.pc, 0x1234);
        assert_eq!(spectrum.bus().palette(), PaletteMode::Saturated);
        assert_eq!(spectrum.bus().dump_block(0x8000, 1), vec![0]);
    }

    #[test]
    fn failed_switch_keeps_machine() {
        let mut spectrum = make_spectrum();
        assert!(spectrum.switch_model(SpectrumModel::Spectrum128K, &[0; 10]).is_err());
        assert_eq!(spectrum.model(), SpectrumModel::Spectrum48K);
    }
}
