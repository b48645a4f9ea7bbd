//! Controller subsystem for gamepad input handling
//!
//! Implements the input side of the overlay:
//!
//! 1. [`backend`] - Device-input service seam ([`backend::InputBackend`])
//! 2. [`gilrs_backend`] - gilrs adapter, event conversion and rumble
//! 3. [`poller`] - Per-tick event draining and device bookkeeping
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► GilrsBackend ──► Poller ──► DeviceTable + Snapshot
//!             (DeviceEvent)    (per tick)
//! ```
//!
//! Everything runs on the UI thread. The poller is ticked from the eframe
//! update loop, so polling and rendering never overlap.

pub mod backend;
pub mod device_table;
pub mod gilrs_backend;
pub mod poller;
pub mod snapshot;
