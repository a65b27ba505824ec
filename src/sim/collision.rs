//! Screen-space footprints and overlap tests
//!
//! Vehicles collide in screen space, using exactly the rectangles the
//! renderer draws. The test itself is a plain AABB overlap.

use glam::Vec2;

use super::geometry::{Viewport, perspective_scale};
use super::state::{Enemy, GameState, Player};
use crate::consts::*;

/// Gap kept between a scaled vehicle and its lane edges
const LANE_PADDING: f32 = 20.0;
/// Player car bottom edge as a fraction of canvas height
const PLAYER_BOTTOM_RATIO: f32 = 0.85;

/// Axis-aligned rectangle in pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Vec2 {
        (self.min() + self.max()) / 2.0
    }
}

/// Overlap test; rectangles sharing an edge count as colliding
pub fn detect_collision(a: &Rect, b: &Rect) -> bool {
    !(a.x > b.x + b.width
        || a.x + a.width < b.x
        || a.y > b.y + b.height
        || a.y + a.height < b.y)
}

/// Perspective-scaled vehicle width, capped to fit inside a full lane
fn vehicle_width(viewport: &Viewport, depth: f32) -> f32 {
    let scale = perspective_scale(depth, VEHICLE_MIN_SCALE);
    let max_width = (viewport.lane_width - LANE_PADDING).max(0.0);
    (viewport.vehicle_width * scale).min(max_width)
}

/// Where an enemy is drawn (centered on its lane, vertically on its depth)
pub fn enemy_rect(enemy: &Enemy, viewport: &Viewport) -> Rect {
    let width = vehicle_width(viewport, enemy.depth);
    let height = width * 2.0;
    let x = viewport.lane_center_x(enemy.lane, enemy.depth) - width / 2.0;
    let y = viewport.depth_to_screen_y(enemy.depth) - height / 2.0;
    Rect::new(x, y, width, height)
}

/// Where the player is drawn (fixed near depth, bottom at 85% of the canvas)
pub fn player_rect(player: &Player, viewport: &Viewport) -> Rect {
    let width = vehicle_width(viewport, PLAYER_DEPTH);
    let height = width * 2.0;
    let x = viewport.lane_center_x(player.lane, PLAYER_DEPTH) - width / 2.0;
    let y = viewport.height * PLAYER_BOTTOM_RATIO - height;
    Rect::new(x, y, width, height)
}

/// Pool slots of visible enemies overlapping the player
pub fn colliding_enemies<'a>(
    state: &'a GameState,
    viewport: &'a Viewport,
) -> impl Iterator<Item = usize> + 'a {
    let player = player_rect(&state.player, viewport);
    state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| enemy.is_visible())
        .filter(move |(_, enemy)| detect_collision(&player, &enemy_rect(enemy, viewport)))
        .map(|(slot, _)| slot)
}
