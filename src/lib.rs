//! pad2usb - Bluetooth controller to USB HID event bridge.
//!
//! Decoded controller snapshots arrive on the Bluetooth stack's execution
//! context; a polled USB-side consumer wants conventional HID records at
//! its own cadence. This crate owns the seam between the two: a bounded
//! cross-core queue, a per-device snapshot deduplicator, and the
//! platform-callback dispatcher that feeds them.
//!
//! The library is `no_std` and host-testable (`cargo test`); the embedded
//! binary (`--features embedded`, RP2040) wires the two executors in
//! `main.rs`.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod config;
pub mod controller;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod filter;
pub mod queue;

pub use controller::{ControllerSnapshot, ControllerState};
pub use device::{DeviceId, HidDevice};
pub use dispatcher::{BridgeDispatcher, OobEvent, Platform, StackControl};
pub use error::Error;
pub use event::BridgeEvent;
pub use filter::SnapshotFilter;
pub use queue::EventQueue;
