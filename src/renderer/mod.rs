//! Rendering
//!
//! `scene` describes a frame as ordered draw commands and has no GPU
//! dependency. `pipeline` replays those commands through WebGPU.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{DrawCmd, DrawList, build_frame};
