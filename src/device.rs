//! Device-side contracts: identity and optional actuator capabilities.
//!
//! The stack hands the dispatcher a device object with every callback. A
//! device may or may not support each actuator; absence is `None`, not a
//! null function pointer, and each actuator is invoked only when present.

/// Stack-assigned device slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId(pub u8);

/// Dual-motor rumble actuator.
pub trait DualRumble {
    fn play_dual_rumble(
        &mut self,
        delay_ms: u16,
        duration_ms: u16,
        weak_magnitude: u8,
        strong_magnitude: u8,
    );
}

/// Player indicator LEDs (low 4 bits of the mask).
pub trait PlayerLeds {
    fn set_player_leds(&mut self, mask: u8);
}

/// RGB lightbar.
pub trait Lightbar {
    fn set_lightbar_color(&mut self, red: u8, green: u8, blue: u8);
}

/// A connected HID device as the dispatcher sees it.
pub trait HidDevice {
    fn id(&self) -> DeviceId;

    /// Rumble capability, if the device has one.
    fn rumble(&mut self) -> Option<&mut dyn DualRumble> {
        None
    }

    /// Player-LED capability, if the device has one.
    fn player_leds(&mut self) -> Option<&mut dyn PlayerLeds> {
        None
    }

    /// Lightbar capability, if the device has one.
    fn lightbar(&mut self) -> Option<&mut dyn Lightbar> {
        None
    }
}
