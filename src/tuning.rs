//! Data-driven game balance
//!
//! Defaults mirror `crate::consts`. A `GameState` captures its tuning at
//! construction, so lane count and pool sizes never change under it.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Number of lanes
    pub lanes: usize,
    /// Enemy pool size
    pub enemy_count: usize,
    /// Road mark pool size
    pub road_mark_count: usize,
    /// Seconds before collisions are reported
    pub arm_delay: f32,
    /// Lowest enemy speed (depth units per frame)
    pub enemy_speed_min: f32,
    /// Width of the enemy speed band
    pub enemy_speed_range: f32,
    /// Same-lane spawn separation in depth units
    pub min_separation: f32,
    /// Redraw attempts per enemy during initial population
    pub max_spawn_attempts: u32,
    /// Road mark scroll rate (depth units per frame)
    pub road_mark_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lanes: NUM_LANES,
            enemy_count: ENEMY_POOL_SIZE,
            road_mark_count: ROAD_MARK_COUNT,
            arm_delay: COLLISION_ARM_DELAY,
            enemy_speed_min: ENEMY_SPEED_MIN,
            enemy_speed_range: ENEMY_SPEED_RANGE,
            min_separation: MIN_ENEMY_SEPARATION,
            max_spawn_attempts: MAX_SPAWN_ATTEMPTS,
            road_mark_speed: ROAD_MARK_SPEED,
        }
    }
}

impl Tuning {
    /// Clamp degenerate values instead of rejecting them
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        self.lanes = self.lanes.max(1);
        self.enemy_count = self.enemy_count.max(1);
        self.road_mark_count = self.road_mark_count.max(1);

        if !self.arm_delay.is_finite() || self.arm_delay < 0.0 {
            self.arm_delay = defaults.arm_delay;
        }
        if !self.enemy_speed_min.is_finite() || self.enemy_speed_min <= 0.0 {
            self.enemy_speed_min = defaults.enemy_speed_min;
        }
        if !self.enemy_speed_range.is_finite() || self.enemy_speed_range < 0.0 {
            self.enemy_speed_range = defaults.enemy_speed_range;
        }
        if !self.min_separation.is_finite() || self.min_separation < 0.0 {
            self.min_separation = defaults.min_separation;
        }
        // Wraparound needs 0 < decrement < 1
        if !(self.road_mark_speed > 0.0 && self.road_mark_speed < 1.0) {
            self.road_mark_speed = defaults.road_mark_speed;
        }

        self
    }

    /// Center lane, where the player starts
    pub fn center_lane(&self) -> usize {
        self.lanes / 2
    }
}
