//! # Overlay Rendering
//!
//! Turns a device snapshot into a list of draw calls. Nothing in here touches
//! a window or a GPU: [`frame::render`] is a pure function of the window size,
//! the background image size and the snapshot, so the UI layer only has to
//! replay the resulting [`frame::DrawList`] onto an egui painter.
//!
//! ## Coordinate System
//!
//! [`layout`] positions are authored in reference-image pixels (600×400).
//! Each frame the background is fitted into the window, and a single uniform
//! scale maps reference pixels to screen points so sticks and buttons stay
//! round whatever the window's aspect ratio.

pub mod frame;
pub mod layout;
