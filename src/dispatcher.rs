//! Platform-callback bridge: the state machine the Bluetooth stack drives.
//!
//! The stack invokes every callback on the producer context. The dispatcher
//! classifies controller snapshots and routes keyboard/mouse state through
//! the dedup filter into the cross-core queue; everything else is resolved
//! locally and never reaches the consumer.

use heapless::FnvIndexMap;

use crate::config;
use crate::config::MAX_DEVICES;
use crate::controller::{ControllerSnapshot, ControllerState, KeyboardState, MouseState};
use crate::device::{DeviceId, HidDevice};
use crate::error::Error;
use crate::event::{BridgeEvent, KeyboardEvent, MouseEvent};
use crate::filter::SnapshotFilter;
use crate::queue::EventQueue;

/// Property lookup index (persisted-configuration extension point).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PropertyIndex(pub u16);

/// Property value. No properties are persisted by the minimal bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyValue {
    Bool(bool),
    U8(u8),
    U32(u32),
    Str(&'static str),
}

/// Startup intent the platform signals into the stack once it is up.
pub trait StackControl {
    /// Allow or disallow new incoming connections.
    fn enable_new_connections(&mut self, enabled: bool);
    /// Forget all stored bond keys.
    fn delete_bond_keys(&mut self);
    /// Log the stored bond keys.
    fn list_bond_keys(&mut self);
}

/// Asynchronous platform signals decoupled from any report stream.
pub enum OobEvent<'a> {
    /// The "system" button was pressed on a device.
    SystemButton(&'a mut dyn HidDevice),
    /// Scanning / new-connection acceptance was toggled.
    BluetoothEnabled(bool),
}

/// The callback-registration contract consumed by the Bluetooth stack.
///
/// All methods run on the producer context. Only `on_device_ready` can
/// fail; the rest are notifications. `on_controller_data` may suspend its
/// caller while the queue is full (backpressure), hence async.
#[allow(async_fn_in_trait)]
pub trait Platform {
    fn init(&mut self);
    fn on_init_complete(&mut self, stack: &mut dyn StackControl);
    fn on_device_connected(&mut self, device: &mut dyn HidDevice);
    fn on_device_disconnected(&mut self, device: &mut dyn HidDevice);
    /// The sole point where a connection can be vetoed.
    fn on_device_ready(&mut self, device: &mut dyn HidDevice) -> Result<(), Error>;
    async fn on_controller_data(
        &mut self,
        device: &mut dyn HidDevice,
        snapshot: &ControllerSnapshot,
    );
    fn on_oob_event(&mut self, event: OobEvent<'_>);
    fn get_property(&self, index: PropertyIndex) -> Option<PropertyValue>;
}

/// Per-device connection phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum LinkPhase {
    /// Transport is up; report setup not finished yet.
    Connected,
    /// Fully usable; controller data is expected.
    Ready,
}

/// Counters for the system-button actuator sequence.
///
/// One counter set per dispatcher: multiple devices triggering the demo
/// advance the same cycle, which is the intended shared visual effect.
struct ActuatorDemo {
    led: u8,
    red: u8,
    green: u8,
    blue: u8,
}

impl ActuatorDemo {
    const fn new() -> Self {
        let (red, green, blue) = config::LIGHTBAR_START;
        Self {
            led: 0,
            red,
            green,
            blue,
        }
    }

    fn trigger(&mut self, device: &mut dyn HidDevice) {
        if let Some(rumble) = device.rumble() {
            rumble.play_dual_rumble(
                config::RUMBLE_DELAY_MS,
                config::RUMBLE_DURATION_MS,
                config::RUMBLE_WEAK_MAGNITUDE,
                config::RUMBLE_STRONG_MAGNITUDE,
            );
        }

        if let Some(leds) = device.player_leds() {
            self.led = (self.led + 1) & 0x0F;
            leds.set_player_leds(self.led);
        }

        if let Some(lightbar) = device.lightbar() {
            self.red = self.red.wrapping_add(config::LIGHTBAR_RED_STEP);
            self.green = self.green.wrapping_sub(config::LIGHTBAR_GREEN_STEP);
            self.blue = self.blue.wrapping_add(config::LIGHTBAR_BLUE_STEP);
            lightbar.set_lightbar_color(self.red, self.green, self.blue);
        }
    }
}

/// [`Platform`] implementation bridging stack callbacks into the queue.
///
/// Owns the per-device link table, the dedup filter, and the demo counters;
/// borrows the queue, which outlives both executors.
pub struct BridgeDispatcher<'q, const N: usize> {
    queue: &'q EventQueue<N>,
    filter: SnapshotFilter,
    links: FnvIndexMap<DeviceId, LinkPhase, MAX_DEVICES>,
    demo: ActuatorDemo,
    forget_bonds: bool,
}

impl<'q, const N: usize> BridgeDispatcher<'q, N> {
    pub fn new(queue: &'q EventQueue<N>) -> Self {
        Self {
            queue,
            filter: SnapshotFilter::new(),
            links: FnvIndexMap::new(),
            demo: ActuatorDemo::new(),
            forget_bonds: config::FORGET_BONDS_ON_START,
        }
    }

    /// Number of devices currently tracked.
    pub fn connected_count(&self) -> usize {
        self.links.len()
    }
}

fn keyboard_event(kb: &KeyboardState) -> KeyboardEvent {
    // The stack reports up to 10 pressed keys; the boot report carries 6.
    let mut keycodes = [0u8; 6];
    keycodes.copy_from_slice(&kb.pressed_keys[..6]);
    KeyboardEvent {
        modifier: kb.modifiers,
        keycodes,
    }
}

fn mouse_event(m: &MouseState) -> MouseEvent {
    MouseEvent {
        buttons: m.buttons,
        dx: clamp_delta(m.delta_x),
        dy: clamp_delta(m.delta_y),
        wheel: m.scroll_wheel,
        pan: m.pan,
    }
}

fn clamp_delta(delta: i16) -> i8 {
    delta.clamp(i8::MIN as i16, i8::MAX as i16) as i8
}

impl<const N: usize> Platform for BridgeDispatcher<'_, N> {
    fn init(&mut self) {
        info!("platform: init");
        // Custom gamepad mappings would be installed here; defaults serve.
    }

    fn on_init_complete(&mut self, stack: &mut dyn StackControl) {
        info!("platform: init complete, enabling new connections");
        stack.enable_new_connections(true);
        if self.forget_bonds {
            stack.delete_bond_keys();
        } else {
            stack.list_bond_keys();
        }
    }

    fn on_device_connected(&mut self, device: &mut dyn HidDevice) {
        let id = device.id();
        info!("platform: device {} connected", id.0);
        // A full table is tolerated here; on_device_ready does the veto.
        let _ = self.links.insert(id, LinkPhase::Connected);
    }

    fn on_device_disconnected(&mut self, device: &mut dyn HidDevice) {
        let id = device.id();
        info!("platform: device {} disconnected", id.0);
        self.links.remove(&id);
        self.filter.invalidate(id);
    }

    fn on_device_ready(&mut self, device: &mut dyn HidDevice) -> Result<(), Error> {
        let id = device.id();
        match self.links.get_mut(&id) {
            Some(phase) => {
                *phase = LinkPhase::Ready;
                info!("platform: device {} ready", id.0);
                Ok(())
            }
            None => {
                // The link table never had room for this device.
                warn!("platform: rejecting device {}, table full", id.0);
                Err(Error::DeviceTableFull)
            }
        }
    }

    async fn on_controller_data(
        &mut self,
        device: &mut dyn HidDevice,
        snapshot: &ControllerSnapshot,
    ) {
        let id = device.id();
        let event = match &snapshot.state {
            // Reserved extension points: nothing is translated yet.
            ControllerState::Gamepad(_) => return,
            ControllerState::BalanceBoard(_) => return,
            ControllerState::Mouse(m) => {
                if !self.filter.should_forward(id, snapshot) {
                    return;
                }
                BridgeEvent::Mouse(mouse_event(m))
            }
            ControllerState::Keyboard(kb) => {
                if !self.filter.should_forward(id, snapshot) {
                    return;
                }
                BridgeEvent::Keyboard(keyboard_event(kb))
            }
            ControllerState::None => {
                error!("platform: unsupported controller class from device {}", id.0);
                return;
            }
        };
        self.queue.push(event).await;
    }

    fn on_oob_event(&mut self, event: OobEvent<'_>) {
        match event {
            OobEvent::SystemButton(device) => {
                debug!("platform: system button on device {}", device.id().0);
                self.demo.trigger(device);
            }
            OobEvent::BluetoothEnabled(enabled) => {
                info!("platform: bluetooth scanning enabled: {}", enabled);
            }
        }
    }

    fn get_property(&self, _index: PropertyIndex) -> Option<PropertyValue> {
        // No persisted configuration in the minimal bridge.
        None
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::config::MAX_DEVICES;
    use crate::device::{DualRumble, Lightbar, PlayerLeds};

    /// Test double: a device with optional actuators that records calls.
    struct TestPad {
        id: DeviceId,
        with_actuators: bool,
        rumbles: Vec<(u16, u16, u8, u8)>,
        led_masks: Vec<u8>,
        colors: Vec<(u8, u8, u8)>,
    }

    impl TestPad {
        fn new(id: u8) -> Self {
            Self {
                id: DeviceId(id),
                with_actuators: false,
                rumbles: Vec::new(),
                led_masks: Vec::new(),
                colors: Vec::new(),
            }
        }

        fn with_actuators(id: u8) -> Self {
            let mut pad = Self::new(id);
            pad.with_actuators = true;
            pad
        }
    }

    impl DualRumble for TestPad {
        fn play_dual_rumble(&mut self, delay: u16, duration: u16, weak: u8, strong: u8) {
            self.rumbles.push((delay, duration, weak, strong));
        }
    }

    impl PlayerLeds for TestPad {
        fn set_player_leds(&mut self, mask: u8) {
            self.led_masks.push(mask);
        }
    }

    impl Lightbar for TestPad {
        fn set_lightbar_color(&mut self, red: u8, green: u8, blue: u8) {
            self.colors.push((red, green, blue));
        }
    }

    impl HidDevice for TestPad {
        fn id(&self) -> DeviceId {
            self.id
        }

        fn rumble(&mut self) -> Option<&mut dyn DualRumble> {
            if self.with_actuators {
                Some(self)
            } else {
                None
            }
        }

        fn player_leds(&mut self) -> Option<&mut dyn PlayerLeds> {
            if self.with_actuators {
                Some(self)
            } else {
                None
            }
        }

        fn lightbar(&mut self) -> Option<&mut dyn Lightbar> {
            if self.with_actuators {
                Some(self)
            } else {
                None
            }
        }
    }

    fn keyboard_snapshot(modifiers: u8, pressed_keys: [u8; 10]) -> ControllerSnapshot {
        ControllerSnapshot::new(ControllerState::Keyboard(KeyboardState {
            modifiers,
            pressed_keys,
        }))
    }

    fn mouse_snapshot(delta_x: i16) -> ControllerSnapshot {
        ControllerSnapshot::new(ControllerState::Mouse(MouseState {
            buttons: 0x01,
            delta_x,
            ..Default::default()
        }))
    }

    #[test]
    fn keyboard_data_is_translated_and_enqueued() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);
        let mut pad = TestPad::new(0);

        let snap = keyboard_snapshot(0x02, [4, 5, 6, 7, 8, 9, 10, 11, 12, 13]);
        block_on(dispatcher.on_controller_data(&mut pad, &snap));

        // Only the first six keys fit the boot report.
        assert_eq!(
            queue.try_pop(),
            Some(BridgeEvent::Keyboard(KeyboardEvent {
                modifier: 0x02,
                keycodes: [4, 5, 6, 7, 8, 9],
            }))
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn mouse_deltas_are_clamped_to_report_range() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);
        let mut pad = TestPad::new(0);

        block_on(dispatcher.on_controller_data(&mut pad, &mouse_snapshot(1000)));
        match queue.try_pop() {
            Some(BridgeEvent::Mouse(m)) => {
                assert_eq!(m.buttons, 0x01);
                assert_eq!(m.dx, i8::MAX);
                assert_eq!(m.dy, 0);
            }
            other => panic!("expected mouse event, got {other:?}"),
        }
    }

    #[test]
    fn redelivered_snapshot_is_not_enqueued_twice() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);
        let mut pad = TestPad::new(0);

        let snap = mouse_snapshot(5);
        block_on(dispatcher.on_controller_data(&mut pad, &snap));
        block_on(dispatcher.on_controller_data(&mut pad, &snap));

        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn gamepad_and_balance_board_are_reserved_noops() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);
        let mut pad = TestPad::new(0);

        let gamepad = ControllerSnapshot::new(ControllerState::Gamepad(
            crate::controller::GamepadState {
                buttons: 0xDEAD,
                ..Default::default()
            },
        ));
        let board = ControllerSnapshot::new(ControllerState::BalanceBoard(
            crate::controller::BalanceBoardState {
                top_left: 100,
                ..Default::default()
            },
        ));

        block_on(dispatcher.on_controller_data(&mut pad, &gamepad));
        block_on(dispatcher.on_controller_data(&mut pad, &board));
        assert!(queue.is_empty());
    }

    #[test]
    fn unsupported_class_never_reaches_the_queue() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);
        let mut pad = TestPad::new(0);

        // Differs from anything seen before, still dropped.
        let snap = ControllerSnapshot {
            state: ControllerState::None,
            battery: 77,
        };
        block_on(dispatcher.on_controller_data(&mut pad, &snap));
        assert!(queue.is_empty());
    }

    #[test]
    fn connect_ready_disconnect_lifecycle() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);
        let mut pad = TestPad::new(3);

        dispatcher.on_device_connected(&mut pad);
        assert_eq!(dispatcher.connected_count(), 1);
        assert!(dispatcher.on_device_ready(&mut pad).is_ok());

        dispatcher.on_device_disconnected(&mut pad);
        assert_eq!(dispatcher.connected_count(), 0);
    }

    #[test]
    fn ready_is_vetoed_when_the_table_is_full() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);

        let mut pads: Vec<TestPad> = (0..=MAX_DEVICES as u8).map(TestPad::new).collect();
        for pad in pads.iter_mut() {
            dispatcher.on_device_connected(pad);
        }
        assert_eq!(dispatcher.connected_count(), MAX_DEVICES);

        let (tracked, overflow) = pads.split_at_mut(MAX_DEVICES);
        for pad in tracked.iter_mut() {
            assert!(dispatcher.on_device_ready(pad).is_ok());
        }
        assert_eq!(
            dispatcher.on_device_ready(&mut overflow[0]),
            Err(Error::DeviceTableFull)
        );
    }

    #[test]
    fn disconnect_invalidates_the_snapshot_cache() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);
        let mut pad = TestPad::new(0);
        let snap = mouse_snapshot(5);

        dispatcher.on_device_connected(&mut pad);
        block_on(dispatcher.on_controller_data(&mut pad, &snap));
        assert_eq!(queue.len(), 1);

        dispatcher.on_device_disconnected(&mut pad);
        dispatcher.on_device_connected(&mut pad);

        // Same bytes as before the disconnect, but the cache was cleared.
        block_on(dispatcher.on_controller_data(&mut pad, &snap));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn system_button_cycles_the_actuator_demo() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);
        let mut pad = TestPad::with_actuators(0);

        dispatcher.on_oob_event(OobEvent::SystemButton(&mut pad));
        dispatcher.on_oob_event(OobEvent::SystemButton(&mut pad));

        assert_eq!(pad.rumbles, vec![(0, 50, 128, 40), (0, 50, 128, 40)]);
        assert_eq!(pad.led_masks, vec![1, 2]);
        // Starts from (0x10, 0x20, 0x40), steps +0x10 / -0x20 / +0x40.
        assert_eq!(pad.colors, vec![(0x20, 0x00, 0x80), (0x30, 0xE0, 0xC0)]);
        // The demo path never touches the queue.
        assert!(queue.is_empty());
    }

    #[test]
    fn demo_counters_are_shared_across_devices() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);
        let mut first = TestPad::with_actuators(0);
        let mut second = TestPad::with_actuators(1);

        dispatcher.on_oob_event(OobEvent::SystemButton(&mut first));
        dispatcher.on_oob_event(OobEvent::SystemButton(&mut second));

        assert_eq!(first.led_masks, vec![1]);
        assert_eq!(second.led_masks, vec![2]);
    }

    #[test]
    fn devices_without_actuators_are_left_alone() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);
        let mut pad = TestPad::new(0);

        dispatcher.on_oob_event(OobEvent::SystemButton(&mut pad));
        assert!(pad.rumbles.is_empty());
        assert!(pad.led_masks.is_empty());
        assert!(pad.colors.is_empty());
    }

    #[test]
    fn bluetooth_enabled_is_a_pure_notification() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);

        dispatcher.on_oob_event(OobEvent::BluetoothEnabled(true));
        dispatcher.on_oob_event(OobEvent::BluetoothEnabled(false));
        assert!(queue.is_empty());
        assert_eq!(dispatcher.connected_count(), 0);
    }

    #[test]
    fn no_properties_are_persisted() {
        let queue: EventQueue<4> = EventQueue::new();
        let dispatcher = BridgeDispatcher::new(&queue);

        for idx in 0..16 {
            assert_eq!(dispatcher.get_property(PropertyIndex(idx)), None);
        }
    }

    /// Test double for the stack's startup-control surface.
    #[derive(Default)]
    struct FakeStack {
        scanning: Option<bool>,
        deleted_keys: bool,
        listed_keys: bool,
    }

    impl StackControl for FakeStack {
        fn enable_new_connections(&mut self, enabled: bool) {
            self.scanning = Some(enabled);
        }

        fn delete_bond_keys(&mut self) {
            self.deleted_keys = true;
        }

        fn list_bond_keys(&mut self) {
            self.listed_keys = true;
        }
    }

    #[test]
    fn init_complete_signals_startup_intent() {
        let queue: EventQueue<4> = EventQueue::new();
        let mut dispatcher = BridgeDispatcher::new(&queue);
        let mut stack = FakeStack::default();

        dispatcher.on_init_complete(&mut stack);

        assert_eq!(stack.scanning, Some(true));
        assert!(stack.deleted_keys);
        assert!(!stack.listed_keys);
    }
}
