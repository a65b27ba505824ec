//! Game state and core simulation types
//!
//! Enemies and road marks live in fixed-size pools allocated once per
//! `GameState`. Slots are recycled in place, never pushed or removed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geometry::Viewport;
use crate::consts::*;
use crate::depth_visible;
use crate::tuning::Tuning;

/// Sprite identifiers shared by the simulation and the asset cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Player,
    Enemy1,
    Enemy2,
}

impl SpriteKey {
    pub const ALL: [SpriteKey; 3] = [SpriteKey::Player, SpriteKey::Enemy1, SpriteKey::Enemy2];
    /// Variants an enemy may be drawn with
    pub const ENEMIES: [SpriteKey; 2] = [SpriteKey::Enemy1, SpriteKey::Enemy2];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpriteKey::Player => "player",
            SpriteKey::Enemy1 => "enemy1",
            SpriteKey::Enemy2 => "enemy2",
        }
    }

    /// Stable slot index, used by fixed-size lookup tables
    pub fn index(&self) -> usize {
        match self {
            SpriteKey::Player => 0,
            SpriteKey::Enemy1 => 1,
            SpriteKey::Enemy2 => 2,
        }
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Sprites still loading, the loop is not running
    Loading,
    /// Frame loop running
    Playing,
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Grace period elapsed; collisions are reported from now on
    CollisionArmed,
    /// The player overlaps the enemy in this pool slot
    Collision { slot: usize },
    /// `reset_game` restored the initial entity state
    Reset,
}

/// The player's car. Only the lane is simulated; the screen position is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub lane: usize,
}

impl Player {
    pub fn shift_left(&mut self) {
        self.lane = self.lane.saturating_sub(1);
    }

    pub fn shift_right(&mut self, lanes: usize) {
        if self.lane + 1 < lanes {
            self.lane += 1;
        }
    }
}

/// An oncoming vehicle slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub depth: f32,
    pub lane: usize,
    /// Depth units per frame
    pub speed: f32,
    pub sprite: SpriteKey,
}

impl Enemy {
    /// Non-random placeholder at the horizon
    pub fn parked(tuning: &Tuning) -> Self {
        Self {
            depth: ENEMY_SPAWN_DEPTH,
            lane: 0,
            speed: tuning.enemy_speed_min,
            sprite: SpriteKey::Enemy1,
        }
    }

    /// Fresh enemy at the horizon
    pub fn spawn(rng: &mut impl Rng, viewport: &Viewport, tuning: &Tuning) -> Self {
        let mut enemy = Self::parked(tuning);
        enemy.respawn(rng, viewport, tuning);
        enemy
    }

    /// Re-randomize this slot in place and put it back at the horizon
    pub fn respawn(&mut self, rng: &mut impl Rng, viewport: &Viewport, tuning: &Tuning) {
        self.depth = ENEMY_SPAWN_DEPTH;
        self.lane = rng.random_range(0..tuning.lanes);
        self.speed = tuning.enemy_speed_min + rng.random::<f32>() * tuning.enemy_speed_range;
        self.sprite = SpriteKey::ENEMIES[rng.random_range(0..SpriteKey::ENEMIES.len())];

        // One redraw if the footprint would hang off the road
        if !self.fits_road(viewport) {
            self.lane = rng.random_range(0..tuning.lanes);
        }
    }

    /// Whether the unscaled footprint stays between the full-width road edges
    pub fn fits_road(&self, viewport: &Viewport) -> bool {
        let center = viewport.lane_center_x(self.lane, self.depth);
        let half = viewport.vehicle_width / 2.0;
        let (left, right) = viewport.road_edges();
        center - half >= left && center + half <= right
    }

    /// Scrolled out of the range it can come back from
    pub fn needs_recycle(&self) -> bool {
        self.depth < 0.0 || self.depth > ENEMY_RECYCLE_MAX_DEPTH
    }

    pub fn is_visible(&self) -> bool {
        depth_visible(self.depth)
    }

    /// Same lane and closer than `min_separation` in depth
    pub fn is_too_close_to(&self, other: &Enemy, min_separation: f32) -> bool {
        self.lane == other.lane && (self.depth - other.depth).abs() < min_separation
    }
}

/// A lane-divider dash. Decorative only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadMark {
    pub depth: f32,
}

impl RoadMark {
    /// Move toward the viewer and wrap into [0, 1)
    pub fn advance(&mut self, speed: f32) {
        let depth = (self.depth - speed).rem_euclid(1.0);
        // rem_euclid rounds tiny negatives up to exactly 1.0
        self.depth = if depth >= 1.0 { 0.0 } else { depth };
    }
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Balance captured at construction
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub player: Player,
    /// Enemy pool (length fixed at `tuning.enemy_count`)
    pub enemies: Vec<Enemy>,
    /// Road mark pool (length fixed at `tuning.road_mark_count`)
    pub road_marks: Vec<RoadMark>,
    /// One-way latch, cleared only by `reset_game`
    pub collision_armed: bool,
    /// Seconds accumulated toward arming
    pub collision_timer: f32,
    /// Executed ticks since construction
    pub frame_count: u64,
    /// Pool slots accepted despite a same-lane neighbour during the last population
    pub crowded_slots: Vec<usize>,
    /// Pending events (drained by the host)
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning, viewport: &Viewport) -> Self {
        let tuning = tuning.validated();
        let viewport = &viewport.with_lanes(tuning.lanes);

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut enemies = vec![Enemy::parked(&tuning); tuning.enemy_count];
        let crowded_slots = populate_enemies(&mut enemies, &mut rng, viewport, &tuning);

        let marks = tuning.road_mark_count;
        let road_marks = (0..marks)
            .map(|i| RoadMark {
                depth: i as f32 / marks as f32,
            })
            .collect();

        Self {
            seed,
            rng,
            player: Player {
                lane: tuning.center_lane(),
            },
            tuning,
            phase: GamePhase::Loading,
            enemies,
            road_marks,
            collision_armed: false,
            collision_timer: 0.0,
            frame_count: 0,
            crowded_slots,
            events: Vec::new(),
        }
    }

    /// Assets are ready; begin playing
    pub fn start(&mut self) {
        if self.phase == GamePhase::Loading {
            self.phase = GamePhase::Playing;
            log::info!("Game started (seed {})", self.seed);
        }
    }

    /// Back to the initial entity and timer state without reloading
    pub fn reset_game(&mut self, viewport: &Viewport) {
        let viewport = &self.lane_viewport(viewport);
        self.player.lane = self.tuning.center_lane();
        self.crowded_slots =
            populate_enemies(&mut self.enemies, &mut self.rng, viewport, &self.tuning);
        self.collision_armed = false;
        self.collision_timer = 0.0;
        self.events.push(GameEvent::Reset);
        log::info!("Game reset");
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    /// `viewport` re-split to this game's lane count
    pub fn lane_viewport(&self, viewport: &Viewport) -> Viewport {
        viewport.with_lanes(self.tuning.lanes)
    }

    pub(crate) fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }
}

/// Fill every enemy slot, redrawing spawns that crowd an earlier slot
///
/// Returns the slots that were accepted after `max_spawn_attempts` redraws
/// still left them crowded.
fn populate_enemies(
    enemies: &mut [Enemy],
    rng: &mut Pcg32,
    viewport: &Viewport,
    tuning: &Tuning,
) -> Vec<usize> {
    let mut crowded = Vec::new();

    for slot in 0..enemies.len() {
        let (accepted, rest) = enemies.split_at_mut(slot);
        let too_close = |candidate: &Enemy| {
            accepted
                .iter()
                .any(|other| candidate.is_too_close_to(other, tuning.min_separation))
        };

        let mut candidate = Enemy::spawn(rng, viewport, tuning);
        let mut attempts = 0;
        while too_close(&candidate) && attempts < tuning.max_spawn_attempts {
            candidate = Enemy::spawn(rng, viewport, tuning);
            attempts += 1;
        }

        if too_close(&candidate) {
            log::warn!(
                "Enemy slot {} crowded after {} spawn attempts (lane {})",
                slot,
                attempts,
                candidate.lane
            );
            crowded.push(slot);
        }

        rest[0] = candidate;
    }

    crowded
}
