//! Ember engine crate.
//!
//! This crate turns wgpu's asynchronous adapter/device requests into an ordered,
//! blocking bootstrap sequence, validates it with a one-shot command
//! submission, and tears everything down in reverse order.

pub mod device;
#[cfg(not(target_arch = "wasm32"))]
pub mod window;

pub mod logging;
