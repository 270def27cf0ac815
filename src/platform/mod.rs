//! Platform abstraction layer
//!
//! Handles the thin edge between raw device state and the simulation:
//! - Keyboard edge detection (`input`)
//! - Collapsing bursts of requests such as viewport resizes (`debounce`)
//! - Browser logging and clock (`web`, wasm32 only)

pub mod debounce;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use debounce::Debouncer;
pub use input::{InputTracker, KeyState};
