//! Controller snapshots as delivered by the Bluetooth stack's report parser.
//!
//! These mirror the stack's native controller model: a class tag plus the
//! full decoded state for that class. Snapshots are plain `Copy` data and
//! compare field-for-field, which is exactly what the deduplication filter
//! relies on.

/// Decoded gamepad state. Reserved extension point - the bridge does not
/// translate gamepads yet.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GamepadState {
    pub dpad: u8,
    pub buttons: u32,
    pub misc_buttons: u8,
    pub axis_x: i32,
    pub axis_y: i32,
    pub axis_rx: i32,
    pub axis_ry: i32,
    pub brake: i32,
    pub throttle: i32,
}

/// Balance-board load sensors. Reserved extension point.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BalanceBoardState {
    pub top_left: u16,
    pub top_right: u16,
    pub bottom_left: u16,
    pub bottom_right: u16,
}

/// Decoded mouse state.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseState {
    /// Button bitfield (bit 0 = left, bit 1 = right, bit 2 = middle).
    pub buttons: u8,
    /// Stack-native deltas are wider than the report range; the dispatcher
    /// clamps them when building the event record.
    pub delta_x: i16,
    pub delta_y: i16,
    pub scroll_wheel: i8,
    pub pan: i8,
}

/// Decoded keyboard state. The stack reports up to 10 pressed keys; the
/// USB boot report carries the first 6.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardState {
    /// Modifier key bitfield.
    pub modifiers: u8,
    /// Pressed key codes, zero-padded, in stack-reported order.
    pub pressed_keys: [u8; 10],
}

/// Controller class plus the decoded state for that class.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerState {
    /// Nothing decoded. Also the all-zero state a fresh dedup cache
    /// compares against.
    #[default]
    None,
    Gamepad(GamepadState),
    BalanceBoard(BalanceBoardState),
    Mouse(MouseState),
    Keyboard(KeyboardState),
}

/// A complete point-in-time controller snapshot.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerSnapshot {
    pub state: ControllerState,
    /// Battery level reported by the stack (0 = unknown).
    pub battery: u8,
}

impl ControllerSnapshot {
    pub const fn new(state: ControllerState) -> Self {
        Self { state, battery: 0 }
    }
}
