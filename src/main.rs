//! RP2040 dual-core bootstrap.
//!
//! Core 1 is devoted to the Bluetooth stack's run loop (the producer
//! context); core 0 drains the queue at its own polling cadence and hands
//! records to the USB side (the consumer context). The queue is constructed
//! before either executor starts, so there is no race on first use.

#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Executor;
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_time::{Duration, Timer};
use panic_probe as _;
use static_cell::StaticCell;

use pad2usb::config;
use pad2usb::controller::{ControllerSnapshot, ControllerState, KeyboardState};
use pad2usb::device::{DeviceId, HidDevice};
use pad2usb::dispatcher::BridgeDispatcher;
use pad2usb::queue::EventQueue;
use pad2usb::Platform;

/// The one cross-core queue; lives for the process lifetime.
static EVENT_QUEUE: EventQueue<{ config::EVENT_QUEUE_DEPTH }> = EventQueue::new();

static mut CORE1_STACK: Stack<4096> = Stack::new();
static EXECUTOR0: StaticCell<Executor> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();
static DISPATCHER: StaticCell<BridgeDispatcher<'static, { config::EVENT_QUEUE_DEPTH }>> =
    StaticCell::new();

/// Stand-in input device for the demo run loop.
struct DemoKeyboard {
    id: DeviceId,
}

impl HidDevice for DemoKeyboard {
    fn id(&self) -> DeviceId {
        self.id
    }
}

/// Producer executor: the Bluetooth stack's run loop.
///
/// The radio HID host stack is an external collaborator; until one is wired
/// in, a timer-driven source exercises the full callback pipeline.
#[embassy_executor::task]
async fn producer_task() -> ! {
    let dispatcher = DISPATCHER.init(BridgeDispatcher::new(&EVENT_QUEUE));
    dispatcher.init();

    let mut keyboard = DemoKeyboard { id: DeviceId(0) };
    dispatcher.on_device_connected(&mut keyboard);
    if dispatcher.on_device_ready(&mut keyboard).is_err() {
        defmt::panic!("demo keyboard rejected");
    }

    let mut pressed = false;
    loop {
        Timer::after(Duration::from_millis(500)).await;

        pressed = !pressed;
        let mut keys = KeyboardState::default();
        if pressed {
            keys.modifiers = 0x02;
            keys.pressed_keys[0] = 0x04; // Shift+A
        }
        let snapshot = ControllerSnapshot::new(ControllerState::Keyboard(keys));
        dispatcher.on_controller_data(&mut keyboard, &snapshot).await;
    }
}

/// Consumer executor: drains the queue and hands each record to the USB
/// side. The USB device stack is out of scope; records are serialised and
/// logged at the seam.
#[embassy_executor::task]
async fn consumer_task() -> ! {
    info!("consumer task started");
    let mut buf = [0u8; 8];
    loop {
        for event in EVENT_QUEUE.drain() {
            let n = event.serialize(&mut buf);
            info!("usb seam: {} byte report", n);
        }
        Timer::after(Duration::from_millis(config::DRAIN_IDLE_MS)).await;
    }
}

#[cortex_m_rt::entry]
fn main() -> ! {
    let p = embassy_rp::init(Default::default());
    info!("pad2usb starting");

    spawn_core1(
        p.CORE1,
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        move || {
            let executor1 = EXECUTOR1.init(Executor::new());
            executor1.run(|spawner| spawner.must_spawn(producer_task()));
        },
    );

    let executor0 = EXECUTOR0.init(Executor::new());
    executor0.run(|spawner| spawner.must_spawn(consumer_task()));
}
