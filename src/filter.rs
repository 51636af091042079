//! Controller-state deduplication.
//!
//! The stack may redeliver identical controller state at a higher cadence
//! than meaningful change occurs; forwarding every callback would flood the
//! bounded queue and waste consumer cycles on no-op reports. The filter
//! keeps the last snapshot per device and lets a snapshot through only when
//! it differs from the cached one.

use heapless::FnvIndexMap;

use crate::config::MAX_DEVICES;
use crate::controller::ControllerSnapshot;
use crate::device::DeviceId;

/// Last-seen snapshot per connected device.
///
/// Owned exclusively by the producer context; never shared with the
/// consumer, so it needs no synchronisation.
#[derive(Default)]
pub struct SnapshotFilter {
    cache: FnvIndexMap<DeviceId, ControllerSnapshot, MAX_DEVICES>,
}

impl SnapshotFilter {
    pub fn new() -> Self {
        Self {
            cache: FnvIndexMap::new(),
        }
    }

    /// Decide whether `snapshot` should be forwarded for `id`.
    ///
    /// Returns `false` iff it matches the cached snapshot for that device.
    /// The cache entry is overwritten either way. A device without an entry
    /// compares against the all-zero snapshot, so a genuinely all-zero first
    /// snapshot is suppressed - accepted imprecision of a zero-initialised
    /// cache.
    pub fn should_forward(&mut self, id: DeviceId, snapshot: &ControllerSnapshot) -> bool {
        match self.cache.get_mut(&id) {
            Some(prev) => {
                let changed = prev != snapshot;
                *prev = *snapshot;
                changed
            }
            None => {
                let changed = *snapshot != ControllerSnapshot::default();
                // Cache full: fail open (forward, uncached) rather than
                // stall the stack. Unreachable while the link table vetoes
                // connections past MAX_DEVICES.
                let _ = self.cache.insert(id, *snapshot);
                changed
            }
        }
    }

    /// Drop the cached snapshot for a disconnected device.
    pub fn invalidate(&mut self, id: DeviceId) {
        self.cache.remove(&id);
    }

    /// Number of devices currently cached.
    pub fn tracked(&self) -> usize {
        self.cache.len()
    }
}
