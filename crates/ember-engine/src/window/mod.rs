//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the probe window, and wires them to the
//! bootstrap sequence.

mod runtime;

pub use runtime::{Runtime, WindowConfig};
