//! Application-wide constants and compile-time configuration.
//!
//! All queue sizing, device limits, and demo-sequence parameters live here
//! so they can be tuned in one place.

// Event bridge

/// Capacity of the cross-core event queue (records).
pub const EVENT_QUEUE_DEPTH: usize = 10;

/// Maximum controllers tracked concurrently (link table and dedup cache).
/// Must be a power of two (index-map requirement).
pub const MAX_DEVICES: usize = 4;

/// Delete stored bond keys at startup instead of listing them.
pub const FORGET_BONDS_ON_START: bool = true;

// System-button actuator demo

/// Rumble pulse: delayed start (ms).
pub const RUMBLE_DELAY_MS: u16 = 0;

/// Rumble pulse: duration (ms).
pub const RUMBLE_DURATION_MS: u16 = 50;

/// Rumble pulse: weak motor magnitude.
pub const RUMBLE_WEAK_MAGNITUDE: u8 = 128;

/// Rumble pulse: strong motor magnitude.
pub const RUMBLE_STRONG_MAGNITUDE: u8 = 40;

/// Lightbar colour the cycle starts from (r, g, b).
pub const LIGHTBAR_START: (u8, u8, u8) = (0x10, 0x20, 0x40);

/// Per-trigger lightbar channel steps: red and blue count up, green counts
/// down, all wrapping.
pub const LIGHTBAR_RED_STEP: u8 = 0x10;
pub const LIGHTBAR_GREEN_STEP: u8 = 0x20;
pub const LIGHTBAR_BLUE_STEP: u8 = 0x40;

// Consumer polling (embedded binary)

/// Idle delay between drain passes on the consumer core (ms).
pub const DRAIN_IDLE_MS: u64 = 1;
