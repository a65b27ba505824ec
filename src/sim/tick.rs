//! Per-frame update step
//!
//! Advances the simulation by one executed frame, in a fixed order:
//! arming timer, player lane, enemies, road marks, then collision reporting.

use super::collision::colliding_enemies;
use super::geometry::Viewport;
use super::state::{GameEvent, GamePhase, GameState};

/// Held-key state polled once per tick (not edge-triggered)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
}

/// Advance the game state by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, viewport: &Viewport, dt: f32) {
    if state.phase != GamePhase::Playing {
        return;
    }

    let viewport = &state.lane_viewport(viewport);

    state.frame_count += 1;

    // Collision grace period (one-way latch)
    if !state.collision_armed {
        state.collision_timer += dt;
        if state.collision_timer > state.tuning.arm_delay {
            state.collision_armed = true;
            state.events.push(GameEvent::CollisionArmed);
            log::info!("Collisions armed after {:.2}s", state.collision_timer);
        }
    }

    // One lane per held frame, no debounce
    if input.left {
        state.player.shift_left();
    }
    if input.right {
        state.player.shift_right(state.tuning.lanes);
    }

    let tuning = state.tuning.clone();
    for slot in 0..state.enemies.len() {
        let mut enemy = state.enemies[slot];
        enemy.depth -= enemy.speed;
        if enemy.needs_recycle() {
            enemy.respawn(state.rng_mut(), viewport, &tuning);
        }
        state.enemies[slot] = enemy;
    }

    for mark in &mut state.road_marks {
        mark.advance(tuning.road_mark_speed);
    }

    if state.collision_armed {
        let hits: Vec<usize> = colliding_enemies(state, viewport).collect();
        state
            .events
            .extend(hits.into_iter().map(|slot| GameEvent::Collision { slot }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::Enemy;
    use crate::sim::SpriteKey;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn playing(seed: u64) -> (GameState, Viewport) {
        let viewport = Viewport::new(1280.0, 720.0, NUM_LANES);
        let mut state = GameState::new(seed, Tuning::default(), &viewport);
        state.start();
        (state, viewport)
    }

    const LEFT: TickInput = TickInput {
        left: true,
        right: false,
    };
    const RIGHT: TickInput = TickInput {
        left: false,
        right: true,
    };
    const IDLE: TickInput = TickInput {
        left: false,
        right: false,
    };

    #[test]
    fn test_loading_phase_does_not_tick() {
        let viewport = Viewport::new(1280.0, 720.0, NUM_LANES);
        let mut state = GameState::new(1, Tuning::default(), &viewport);
        let before = state.enemies.clone();
        tick(&mut state, &LEFT, &viewport, FRAME_DT);
        assert_eq!(state.frame_count, 0);
        assert_eq!(state.player.lane, 1);
        assert_eq!(state.enemies, before);
    }

    #[test]
    fn test_hold_left_clamps_at_zero() {
        let (mut state, viewport) = playing(1);
        assert_eq!(state.player.lane, 1);
        tick(&mut state, &LEFT, &viewport, FRAME_DT);
        assert_eq!(state.player.lane, 0);
        tick(&mut state, &LEFT, &viewport, FRAME_DT);
        assert_eq!(state.player.lane, 0);
    }

    #[test]
    fn test_held_right_repeats_each_frame() {
        let (mut state, viewport) = playing(1);
        tick(&mut state, &RIGHT, &viewport, FRAME_DT);
        assert_eq!(state.player.lane, 2);
        tick(&mut state, &RIGHT, &viewport, FRAME_DT);
        assert_eq!(state.player.lane, 2);
    }

    #[test]
    fn test_collision_arms_after_delay() {
        let (mut state, viewport) = playing(2);
        for _ in 0..62 {
            tick(&mut state, &IDLE, &viewport, FRAME_DT);
        }
        assert!(state.collision_armed);
        assert!(state.collision_timer > 2.0);

        let armed_events = state
            .drain_events()
            .filter(|e| *e == GameEvent::CollisionArmed)
            .count();
        assert_eq!(armed_events, 1);

        // Latched: the timer stops and the flag stays set
        let timer = state.collision_timer;
        tick(&mut state, &IDLE, &viewport, FRAME_DT);
        assert!(state.collision_armed);
        assert_eq!(state.collision_timer, timer);
    }

    #[test]
    fn test_not_armed_within_grace_period() {
        let (mut state, viewport) = playing(2);
        for _ in 0..59 {
            tick(&mut state, &IDLE, &viewport, FRAME_DT);
        }
        assert!(!state.collision_armed);
        assert!(!state.events.iter().any(|e| matches!(e, GameEvent::Collision { .. })));
    }

    #[test]
    fn test_enemy_advances_by_own_speed() {
        let (mut state, viewport) = playing(3);
        state.enemies[0] = Enemy {
            depth: 0.8,
            lane: 0,
            speed: 0.004,
            sprite: SpriteKey::Enemy1,
        };
        tick(&mut state, &IDLE, &viewport, FRAME_DT);
        assert!((state.enemies[0].depth - 0.796).abs() < 1e-6);
    }

    #[test]
    fn test_enemy_recycled_below_zero() {
        let (mut state, viewport) = playing(3);
        state.enemies[1].depth = 0.001;
        state.enemies[1].speed = 0.004;
        tick(&mut state, &IDLE, &viewport, FRAME_DT);
        assert_eq!(state.enemies[1].depth, 1.0);
        assert_eq!(state.enemies.len(), ENEMY_POOL_SIZE);
    }

    #[test]
    fn test_enemy_recycled_above_max_depth() {
        let (mut state, viewport) = playing(3);
        state.enemies[1].depth = 1.6;
        tick(&mut state, &IDLE, &viewport, FRAME_DT);
        assert_eq!(state.enemies[1].depth, 1.0);
    }

    #[test]
    fn test_road_mark_scenario() {
        let (mut state, viewport) = playing(4);
        state.road_marks[0].depth = 0.01;
        tick(&mut state, &IDLE, &viewport, FRAME_DT);
        assert!((state.road_marks[0].depth - 0.985).abs() < 1e-6);
    }

    #[test]
    fn test_collision_reported_once_armed() {
        let (mut state, viewport) = playing(5);
        state.collision_armed = true;
        for enemy in state.enemies.iter_mut() {
            enemy.depth = 1.4;
            enemy.speed = 0.002;
        }
        let lane = state.player.lane;
        state.enemies[0] = Enemy {
            depth: 0.2,
            lane,
            speed: 0.002,
            sprite: SpriteKey::Enemy2,
        };
        tick(&mut state, &IDLE, &viewport, FRAME_DT);
        let events: Vec<GameEvent> = state.drain_events().collect();
        assert_eq!(events, vec![GameEvent::Collision { slot: 0 }]);
    }

    #[test]
    fn test_determinism() {
        let (mut a, viewport) = playing(777);
        let (mut b, _) = playing(777);
        let inputs = [LEFT, IDLE, RIGHT, RIGHT, IDLE, LEFT];
        for _ in 0..200 {
            for input in &inputs {
                tick(&mut a, input, &viewport, FRAME_DT);
                tick(&mut b, input, &viewport, FRAME_DT);
            }
        }
        assert_eq!(a.enemies, b.enemies);
        assert_eq!(a.road_marks, b.road_marks);
        assert_eq!(a.player, b.player);
        assert_eq!(a.events, b.events);
    }

    #[test]
    fn test_mismatched_viewport_lanes_are_ignored() {
        let (mut a, viewport) = playing(31);
        let (mut b, _) = playing(31);
        let wide = Viewport::new(1280.0, 720.0, 7);
        for i in 0..150 {
            let input = if i % 3 == 0 { RIGHT } else { IDLE };
            tick(&mut a, &input, &viewport, FRAME_DT);
            tick(&mut b, &input, &wide, FRAME_DT);
        }
        assert_eq!(a.enemies, b.enemies);
        assert_eq!(a.player, b.player);
        assert_eq!(a.events, b.events);
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_under_any_input(
            seed in any::<u64>(),
            inputs in proptest::collection::vec((any::<bool>(), any::<bool>()), 1..300),
        ) {
            let (mut state, viewport) = playing(seed);
            let mut was_armed = false;
            for (left, right) in inputs {
                tick(&mut state, &TickInput { left, right }, &viewport, FRAME_DT);

                prop_assert!(state.player.lane < NUM_LANES);
                prop_assert_eq!(state.enemies.len(), ENEMY_POOL_SIZE);
                prop_assert_eq!(state.road_marks.len(), ROAD_MARK_COUNT);
                for enemy in &state.enemies {
                    prop_assert!(enemy.depth >= 0.0 && enemy.depth <= ENEMY_RECYCLE_MAX_DEPTH);
                    prop_assert!(enemy.lane < NUM_LANES);
                }
                for mark in &state.road_marks {
                    prop_assert!(mark.depth >= 0.0 && mark.depth < 1.0);
                }
                prop_assert!(!was_armed || state.collision_armed);
                was_armed = state.collision_armed;
            }
        }

        #[test]
        fn prop_road_mark_wrap(start in 0.0f32..1.0, speed in 0.0001f32..0.9999) {
            let mut mark = crate::sim::RoadMark { depth: start };
            mark.advance(speed);
            prop_assert!(mark.depth >= 0.0 && mark.depth < 1.0);
        }
    }
}
