//! Unified error type for pad2usb.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the bridge.
///
/// The only callback that can fail is `on_device_ready`; everything else in
/// the dispatch path is a notification and resolves its problems locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Every link-table slot is taken; the connection is vetoed.
    DeviceTableFull,
}
