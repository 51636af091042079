//! Event records handed across the core boundary.
//!
//! A record is the minimal translated unit of controller input: a keyboard
//! snapshot or a mouse delta. Records are plain `Copy` data - they are
//! copied by value into the queue and nothing borrowed ever crosses the
//! context boundary.

/// Keyboard report size in bytes (USB boot protocol).
pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// Mouse report size in bytes (buttons, x, y, wheel, pan).
pub const MOUSE_REPORT_SIZE: usize = 5;

/// Keyboard state at the moment the stack reported it.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardEvent {
    /// Modifier key bitfield (Ctrl/Shift/Alt/GUI, left then right).
    pub modifier: u8,
    /// Up to 6 simultaneously pressed key codes, zero-padded, in the order
    /// the stack reported them.
    pub keycodes: [u8; 6],
}

impl KeyboardEvent {
    /// Serialise into USB boot-protocol report bytes.
    /// Returns the number of bytes written (0 if the buffer is too small).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifier;
        buf[1] = 0; // reserved per HID spec
        buf[2..8].copy_from_slice(&self.keycodes);
        KEYBOARD_REPORT_SIZE
    }
}

/// Mouse movement and button delta.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseEvent {
    /// Button bitfield (bit 0 = left, bit 1 = right, bit 2 = middle).
    pub buttons: u8,
    /// Relative X movement (signed).
    pub dx: i8,
    /// Relative Y movement (signed).
    pub dy: i8,
    /// Vertical scroll delta.
    pub wheel: i8,
    /// Horizontal (AC pan) scroll delta.
    pub pan: i8,
}

impl MouseEvent {
    /// Serialise into report bytes for the USB side.
    /// Returns the number of bytes written (0 if the buffer is too small).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < MOUSE_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.buttons;
        buf[1] = self.dx as u8;
        buf[2] = self.dy as u8;
        buf[3] = self.wheel as u8;
        buf[4] = self.pan as u8;
        MOUSE_REPORT_SIZE
    }
}

/// One translatable controller event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeEvent {
    Keyboard(KeyboardEvent),
    Mouse(MouseEvent),
}

impl BridgeEvent {
    /// Serialise the payload for the USB side.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match self {
            BridgeEvent::Keyboard(k) => k.serialize(buf),
            BridgeEvent::Mouse(m) => m.serialize(buf),
        }
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(self, BridgeEvent::Keyboard(_))
    }

    pub fn is_mouse(&self) -> bool {
        matches!(self, BridgeEvent::Mouse(_))
    }
}
