//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per executed frame
//! - Seeded RNG only
//! - Fixed-size entity pools, iterated by slot
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod state;
pub mod tick;

pub use collision::{Rect, colliding_enemies, detect_collision, enemy_rect, player_rect};
pub use geometry::{Viewport, perspective_scale};
pub use state::{Enemy, GameEvent, GamePhase, GameState, Player, RoadMark, SpriteKey};
pub use tick::{TickInput, tick};
