//! Input mapping for the ZX Spectrum.
//!
//! Three layers:
//! 1. `SpectrumKey`: logical key names mapped to the 8×5 keyboard matrix.
//! 2. `JoystickMode`: where each joystick action lands, either a matrix key
//!    or a Kempston port bit.
//! 3. `InputMapper`: host scancodes (PC set 1, extended codes as `0x100 |
//!    code`) to Spectrum keys, joystick actions and machine controls.

/// Logical key on the 48K Spectrum keyboard.
///
/// Each key maps to a (row, bit) pair in the 8×5 keyboard matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectrumKey {
    // Row 0 (addr bit A8)
    CapsShift,
    Z,
    X,
    C,
    V,
    // Row 1 (addr bit A9)
    A,
    S,
    D,
    F,
    G,
    // Row 2 (addr bit A10)
    Q,
    W,
    E,
    R,
    T,
    // Row 3 (addr bit A11)
    N1,
    N2,
    N3,
    N4,
    N5,
    // Row 4 (addr bit A12)
    N0,
    N9,
    N8,
    N7,
    N6,
    // Row 5 (addr bit A13)
    P,
    O,
    I,
    U,
    Y,
    // Row 6 (addr bit A14)
    Enter,
    L,
    K,
    J,
    H,
    // Row 7 (addr bit A15)
    Space,
    SymShift,
    M,
    N,
    B,
}

impl SpectrumKey {
    /// Return the (row, bit) pair for this key in the keyboard matrix.
    #[must_use]
    pub const fn matrix(self) -> (usize, usize) {
        match self {
            Self::CapsShift => (0, 0),
            Self::Z => (0, 1),
            Self::X => (0, 2),
            Self::C => (0, 3),
            Self::V => (0, 4),

            Self::A => (1, 0),
            Self::S => (1, 1),
            Self::D => (1, 2),
            Self::F => (1, 3),
            Self::G => (1, 4),

            Self::Q => (2, 0),
            Self::W => (2, 1),
            Self::E => (2, 2),
            Self::R => (2, 3),
            Self::T => (2, 4),

            Self::N1 => (3, 0),
            Self::N2 => (3, 1),
            Self::N3 => (3, 2),
            Self::N4 => (3, 3),
            Self::N5 => (3, 4),

            Self::N0 => (4, 0),
            Self::N9 => (4, 1),
            Self::N8 => (4, 2),
            Self::N7 => (4, 3),
            Self::N6 => (4, 4),

            Self::P => (5, 0),
            Self::O => (5, 1),
            Self::I => (5, 2),
            Self::U => (5, 3),
            Self::Y => (5, 4),

            Self::Enter => (6, 0),
            Self::L => (6, 1),
            Self::K => (6, 2),
            Self::J => (6, 3),
            Self::H => (6, 4),

            Self::Space => (7, 0),
            Self::SymShift => (7, 1),
            Self::M => (7, 2),
            Self::N => (7, 3),
            Self::B => (7, 4),
        }
    }
}

/// Kempston joystick bits on port $1F (active high).
pub const KEMPSTON_RIGHT: u8 = 0x01;
pub const KEMPSTON_LEFT: u8 = 0x02;
pub const KEMPSTON_DOWN: u8 = 0x04;
pub const KEMPSTON_UP: u8 = 0x08;
pub const KEMPSTON_FIRE: u8 = 0x10;

/// A joystick direction or the fire button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoystickAction {
    Up,
    Down,
    Left,
    Right,
    Fire,
}

/// Which joystick interface is emulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum JoystickMode {
    /// Cursor keys 5-8 with 0 as fire.
    #[default]
    CursorKeys,
    /// Kempston interface on port $1F.
    Kempston,
    /// Sinclair Interface 2, keys 6-0.
    Interface2A,
    /// Sinclair Interface 2, keys 1-5.
    Interface2B,
}

/// Where a joystick action lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoystickTarget {
    Key(SpectrumKey),
    /// A bit mask for the Kempston latch.
    Kempston(u8),
}

impl JoystickMode {
    /// Resolve an action for this interface.
    #[must_use]
    pub const fn target(self, action: JoystickAction) -> JoystickTarget {
        use JoystickAction::{Down, Fire, Left, Right, Up};
        use JoystickTarget::{Kempston, Key};

        match (self, action) {
            (Self::CursorKeys, Up) => Key(SpectrumKey::N7),
            (Self::CursorKeys, Down) => Key(SpectrumKey::N6),
            (Self::CursorKeys, Left) => Key(SpectrumKey::N5),
            (Self::CursorKeys, Right) => Key(SpectrumKey::N8),
            (Self::CursorKeys, Fire) => Key(SpectrumKey::N0),

            (Self::Kempston, Up) => Kempston(KEMPSTON_UP),
            (Self::Kempston, Down) => Kempston(KEMPSTON_DOWN),
            (Self::Kempston, Left) => Kempston(KEMPSTON_LEFT),
            (Self::Kempston, Right) => Kempston(KEMPSTON_RIGHT),
            (Self::Kempston, Fire) => Kempston(KEMPSTON_FIRE),

            (Self::Interface2A, Up) => Key(SpectrumKey::N9),
            (Self::Interface2A, Down) => Key(SpectrumKey::N8),
            (Self::Interface2A, Left) => Key(SpectrumKey::N6),
            (Self::Interface2A, Right) => Key(SpectrumKey::N7),
            (Self::Interface2A, Fire) => Key(SpectrumKey::N0),

            (Self::Interface2B, Up) => Key(SpectrumKey::N4),
            (Self::Interface2B, Down) => Key(SpectrumKey::N3),
            (Self::Interface2B, Left) => Key(SpectrumKey::N1),
            (Self::Interface2B, Right) => Key(SpectrumKey::N2),
            (Self::Interface2B, Fire) => Key(SpectrumKey::N5),
        }
    }
}

/// Spectrum key for a host scancode, if it has one.
#[must_use]
pub const fn key_for_scancode(code: u32) -> Option<SpectrumKey> {
    use SpectrumKey as K;

    Some(match code {
        2 => K::N1,
        3 => K::N2,
        4 => K::N3,
        5 => K::N4,
        6 => K::N5,
        7 => K::N6,
        8 => K::N7,
        9 => K::N8,
        10 => K::N9,
        11 => K::N0,

        16 => K::Q,
        17 => K::W,
        18 => K::E,
        19 => K::R,
        20 => K::T,
        21 => K::Y,
        22 => K::U,
        23 => K::I,
        24 => K::O,
        25 => K::P,

        30 => K::A,
        31 => K::S,
        32 => K::D,
        33 => K::F,
        34 => K::G,
        35 => K::H,
        36 => K::J,
        37 => K::K,
        38 => K::L,
        28 => K::Enter,

        42 => K::CapsShift,
        44 => K::Z,
        45 => K::X,
        46 => K::C,
        47 => K::V,
        48 => K::B,
        49 => K::N,
        50 => K::M,
        54 => K::SymShift,
        57 => K::Space,

        // Extended cursor keys and left Ctrl
        331 => K::N5,
        336 => K::N6,
        328 => K::N7,
        333 => K::N8,
        29 => K::N0,

        _ => return None,
    })
}

/// What a host key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostInput {
    Key(SpectrumKey),
    Joystick(JoystickAction),
    /// Reset the machine (Esc).
    Reset,
    /// Pulse NMI (F12).
    Nmi,
    Ignored,
}

/// Translates host input for the selected joystick interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputMapper {
    mode: JoystickMode,
}

impl InputMapper {
    #[must_use]
    pub const fn new(mode: JoystickMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn mode(&self) -> JoystickMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: JoystickMode) {
        self.mode = mode;
    }

    /// Classify a host scancode.
    ///
    /// Machine controls and the joystick bindings (arrows on the extended
    /// and keypad blocks, either Ctrl for fire) take precedence over the
    /// keyboard table. Unknown codes are ignored.
    #[must_use]
    pub const fn translate(&self, scancode: u32) -> HostInput {
        match scancode {
            1 => HostInput::Reset,
            88 => HostInput::Nmi,
            328 | 72 => HostInput::Joystick(JoystickAction::Up),
            336 | 76 => HostInput::Joystick(JoystickAction::Down),
            331 | 75 => HostInput::Joystick(JoystickAction::Left),
            333 | 77 => HostInput::Joystick(JoystickAction::Right),
            29 | 285 => HostInput::Joystick(JoystickAction::Fire),
            _ => match key_for_scancode(scancode) {
                Some(key) => HostInput::Key(key),
                None => HostInput::Ignored,
            },
        }
    }

    /// Resolve a joystick action through the current interface.
    #[must_use]
    pub const fn target(&self, action: JoystickAction) -> JoystickTarget {
        self.mode.target(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_matrix_slot_has_one_key() {
        let keys = [
            SpectrumKey::CapsShift, SpectrumKey::Z, SpectrumKey::X, SpectrumKey::C, SpectrumKey::V,
            SpectrumKey::A, SpectrumKey::S, SpectrumKey::D, SpectrumKey::F, SpectrumKey::G,
            SpectrumKey::Q, SpectrumKey::W, SpectrumKey::E, SpectrumKey::R, SpectrumKey::T,
            SpectrumKey::N1, SpectrumKey::N2, SpectrumKey::N3, SpectrumKey::N4, SpectrumKey::N5,
            SpectrumKey::N0, SpectrumKey::N9, SpectrumKey::N8, SpectrumKey::N7, SpectrumKey::N6,
            SpectrumKey::P, SpectrumKey::O, SpectrumKey::I, SpectrumKey::U, SpectrumKey::Y,
            SpectrumKey::Enter, SpectrumKey::L, SpectrumKey::K, SpectrumKey::J, SpectrumKey::H,
            SpectrumKey::Space, SpectrumKey::SymShift, SpectrumKey::M, SpectrumKey::N, SpectrumKey::B,
        ];
        let mut seen = [[false; 5]; 8];
        for key in keys {
            let (row, col) = key.matrix();
            assert!(!seen[row][col], "{key:?} shares a slot");
            seen[row][col] = true;
        }
    }

    #[test]
    fn cursor_mode_uses_digit_keys() {
        let mode = JoystickMode::CursorKeys;
        assert_eq!(mode.target(JoystickAction::Up), JoystickTarget::Key(SpectrumKey::N7));
        assert_eq!(mode.target(JoystickAction::Down), JoystickTarget::Key(SpectrumKey::N6));
        assert_eq!(mode.target(JoystickAction::Left), JoystickTarget::Key(SpectrumKey::N5));
        assert_eq!(mode.target(JoystickAction::Right), JoystickTarget::Key(SpectrumKey::N8));
        assert_eq!(mode.target(JoystickAction::Fire), JoystickTarget::Key(SpectrumKey::N0));
    }

    #[test]
    fn kempston_mode_uses_port_bits() {
        let mode = JoystickMode::Kempston;
        assert_eq!(mode.target(JoystickAction::Right), JoystickTarget::Kempston(0x01));
        assert_eq!(mode.target(JoystickAction::Left), JoystickTarget::Kempston(0x02));
        assert_eq!(mode.target(JoystickAction::Down), JoystickTarget::Kempston(0x04));
        assert_eq!(mode.target(JoystickAction::Up), JoystickTarget::Kempston(0x08));
        assert_eq!(mode.target(JoystickAction::Fire), JoystickTarget::Kempston(0x10));
    }

    #[test]
    fn interface_2_ports() {
        let a = JoystickMode::Interface2A;
        assert_eq!(a.target(JoystickAction::Up), JoystickTarget::Key(SpectrumKey::N9));
        assert_eq!(a.target(JoystickAction::Left), JoystickTarget::Key(SpectrumKey::N6));
        assert_eq!(a.target(JoystickAction::Fire), JoystickTarget::Key(SpectrumKey::N0));

        let b = JoystickMode::Interface2B;
        assert_eq!(b.target(JoystickAction::Up), JoystickTarget::Key(SpectrumKey::N4));
        assert_eq!(b.target(JoystickAction::Right), JoystickTarget::Key(SpectrumKey::N2));
        assert_eq!(b.target(JoystickAction::Fire), JoystickTarget::Key(SpectrumKey::N5));
    }

    #[test]
    fn scancodes_map_to_keys() {
        assert_eq!(key_for_scancode(30), Some(SpectrumKey::A));
        assert_eq!(key_for_scancode(11), Some(SpectrumKey::N0));
        assert_eq!(key_for_scancode(42), Some(SpectrumKey::CapsShift));
        assert_eq!(key_for_scancode(54), Some(SpectrumKey::SymShift));
        assert_eq!(key_for_scancode(57), Some(SpectrumKey::Space));
        assert_eq!(key_for_scancode(59), None); // F1
    }

    #[test]
    fn translate_gives_controls_precedence() {
        let mapper = InputMapper::default();
        assert_eq!(mapper.translate(1), HostInput::Reset);
        assert_eq!(mapper.translate(88), HostInput::Nmi);
        assert_eq!(mapper.translate(328), HostInput::Joystick(JoystickAction::Up));
        assert_eq!(mapper.translate(72), HostInput::Joystick(JoystickAction::Up));
        assert_eq!(mapper.translate(77), HostInput::Joystick(JoystickAction::Right));
        assert_eq!(mapper.translate(29), HostInput::Joystick(JoystickAction::Fire));
        assert_eq!(mapper.translate(285), HostInput::Joystick(JoystickAction::Fire));
        assert_eq!(mapper.translate(25), HostInput::Key(SpectrumKey::P));
        assert_eq!(mapper.translate(0xFFFF), HostInput::Ignored);
    }

    #[test]
    fn mapper_follows_mode() {
        let mut mapper = InputMapper::new(JoystickMode::Kempston);
        assert_eq!(mapper.target(JoystickAction::Fire), JoystickTarget::Kempston(KEMPSTON_FIRE));
        mapper.set_mode(JoystickMode::Interface2B);
        assert_eq!(mapper.mode(), JoystickMode::Interface2B);
        assert_eq!(mapper.target(JoystickAction::Fire), JoystickTarget::Key(SpectrumKey::N5));
    }
}
