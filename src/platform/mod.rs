//! Platform abstraction layer
//!
//! Browser-facing pieces that stay testable on native:
//! - Held-key input state
//! - Frame pacing

pub mod frame;
pub mod input;

pub use frame::{FpsCounter, FrameThrottle};
pub use input::{Direction, KeyBindings, KeyState};
