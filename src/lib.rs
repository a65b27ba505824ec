//! Drive Away - A pseudo-3D lane-dodging arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lane geometry, entity pools, update step)
//! - `renderer`: Frame description and WebGPU drawing
//! - `platform`: Browser input and frame pacing
//! - `assets`: Sprite manifest, decoding and readiness cache
//! - `tuning`: Data-driven game balance

pub mod assets;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Number of parallel lanes on the road
    pub const NUM_LANES: usize = 3;
    /// Pre-allocated enemy slots
    pub const ENEMY_POOL_SIZE: usize = 5;
    /// Pre-allocated road mark slots
    pub const ROAD_MARK_COUNT: usize = 3;

    /// Frame pump rate (update + render at most this often)
    pub const TARGET_FPS: u32 = 30;
    /// Simulation step per executed frame, in seconds
    pub const FRAME_DT: f32 = 1.0 / TARGET_FPS as f32;
    /// Minimum wall-clock gap between executed frames
    pub const FRAME_DURATION_MS: f64 = 1000.0 / TARGET_FPS as f64;

    /// Grace period before collisions are reported
    pub const COLLISION_ARM_DELAY: f32 = 2.0;

    /// Depth an enemy is (re)spawned at - the horizon
    pub const ENEMY_SPAWN_DEPTH: f32 = 1.0;
    /// Enemies deeper than this are recycled
    pub const ENEMY_RECYCLE_MAX_DEPTH: f32 = 1.5;
    /// Entities at or below this depth are not drawn
    pub const VISIBLE_MIN_DEPTH: f32 = 0.1;
    /// Entities above this depth are not drawn
    pub const VISIBLE_MAX_DEPTH: f32 = 1.0;

    /// Minimum depth gap between same-lane enemies at spawn
    pub const MIN_ENEMY_SEPARATION: f32 = 0.2;
    /// Redraws allowed per enemy before accepting a crowded spawn
    pub const MAX_SPAWN_ATTEMPTS: u32 = 10;

    /// Enemy speed band, depth units per frame
    pub const ENEMY_SPEED_MIN: f32 = 0.002;
    pub const ENEMY_SPEED_RANGE: f32 = 0.003;

    /// Road mark scroll rate, depth units per frame
    pub const ROAD_MARK_SPEED: f32 = 0.025;

    /// Fixed near depth the player car is projected at
    pub const PLAYER_DEPTH: f32 = 0.1;

    /// Road span at the horizon relative to the full road width
    pub const HORIZON_WIDTH_RATIO: f32 = 0.4;
    /// Horizon line as a fraction of canvas height
    pub const HORIZON_RATIO: f32 = 0.5;

    /// Perspective floors (vehicles, road marks)
    pub const VEHICLE_MIN_SCALE: f32 = 0.2;
    pub const MARK_MIN_SCALE: f32 = 0.1;
}

/// Check whether a depth lies in the drawable window (0.1, 1.0]
#[inline]
pub fn depth_visible(depth: f32) -> bool {
    depth > consts::VISIBLE_MIN_DEPTH && depth <= consts::VISIBLE_MAX_DEPTH
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
