//! Frame description
//!
//! Turns a `GameState` into an ordered list of draw commands in pixel space.
//! Commands are emitted back to front, so a backend only has to replay them
//! in order to get correct occlusion.

use glam::Vec2;

use crate::assets::AssetCache;
use crate::consts::*;
use crate::depth_visible;
use crate::sim::{GameState, Rect, SpriteKey, Viewport, enemy_rect, perspective_scale, player_rect};

pub type Color = [f32; 4];

/// Colors for scene elements
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.0, 0.0, 0.0, 1.0];
    /// #87CEEB
    pub const SKY: Color = [0.529, 0.808, 0.922, 1.0];
    /// #222
    pub const ROAD: Color = [0.133, 0.133, 0.133, 1.0];
    pub const ROAD_MARK: Color = [1.0, 1.0, 1.0, 1.0];
}

/// A single drawing operation in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCmd {
    /// Fill the whole surface
    Clear(Color),
    FillRect { rect: Rect, color: Color },
    /// Convex quad, corners in order (top-left, top-right, bottom-right, bottom-left)
    FillQuad { points: [Vec2; 4], color: Color },
    /// Stretch a sprite over `rect`
    Sprite { key: SpriteKey, rect: Rect },
}

/// Reusable per-frame command buffer
#[derive(Debug, Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
    /// Scratch for depth sorting
    order: Vec<usize>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Sprite commands in draw order
    pub fn sprites(&self) -> impl Iterator<Item = (SpriteKey, Rect)> + '_ {
        self.cmds.iter().filter_map(|cmd| match *cmd {
            DrawCmd::Sprite { key, rect } => Some((key, rect)),
            _ => None,
        })
    }
}

/// Rebuild `out` for the current frame
pub fn build_frame(state: &GameState, viewport: &Viewport, assets: &AssetCache, out: &mut DrawList) {
    let viewport = &state.lane_viewport(viewport);
    out.clear();
    out.push(DrawCmd::Clear(colors::BACKGROUND));

    push_sky(viewport, out);
    push_road(viewport, out);
    push_road_marks(state, viewport, out);
    push_enemies(state, viewport, assets, out);

    if assets.is_ready(SpriteKey::Player) {
        out.push(DrawCmd::Sprite {
            key: SpriteKey::Player,
            rect: player_rect(&state.player, viewport),
        });
    }
}

fn push_sky(viewport: &Viewport, out: &mut DrawList) {
    out.push(DrawCmd::FillRect {
        rect: Rect::new(0.0, 0.0, viewport.width, viewport.horizon_y()),
        color: colors::SKY,
    });
}

fn push_road(viewport: &Viewport, out: &mut DrawList) {
    let cx = viewport.center_x();
    let top = viewport.road_top_width() / 2.0;
    let bottom = viewport.road_width / 2.0;
    let horizon = viewport.horizon_y();

    out.push(DrawCmd::FillQuad {
        points: [
            Vec2::new(cx - top, horizon),
            Vec2::new(cx + top, horizon),
            Vec2::new(cx + bottom, viewport.height),
            Vec2::new(cx - bottom, viewport.height),
        ],
        color: colors::ROAD,
    });
}

/// Lane-divider dashes, thin and long, capped so they don't blow up up close
fn push_road_marks(state: &GameState, viewport: &Viewport, out: &mut DrawList) {
    let max_width = viewport.lane_width * 0.1;
    let max_height = viewport.height * 0.1;

    for mark in state.road_marks.iter().filter(|m| depth_visible(m.depth)) {
        let scale = perspective_scale(mark.depth, MARK_MIN_SCALE);
        let width = (viewport.lane_width * 0.02 * scale).min(max_width);
        let height = (viewport.height * 0.08 * scale).min(max_height);
        let y = viewport.depth_to_screen_y(mark.depth) - height;

        for boundary in 0..viewport.lanes.saturating_sub(1) {
            let x = viewport.lane_boundary_x(boundary, mark.depth) - width / 2.0;
            out.push(DrawCmd::FillRect {
                rect: Rect::new(x, y, width, height),
                color: colors::ROAD_MARK,
            });
        }
    }
}

/// Farthest first so nearer cars cover farther ones
fn push_enemies(state: &GameState, viewport: &Viewport, assets: &AssetCache, out: &mut DrawList) {
    let mut order = std::mem::take(&mut out.order);
    order.clear();
    order.extend(0..state.enemies.len());
    order.sort_by(|&a, &b| state.enemies[b].depth.total_cmp(&state.enemies[a].depth));

    for &slot in &order {
        let enemy = &state.enemies[slot];
        if !enemy.is_visible() || !assets.is_ready(enemy.sprite) {
            continue;
        }
        out.push(DrawCmd::Sprite {
            key: enemy.sprite,
            rect: enemy_rect(enemy, viewport),
        });
    }

    out.order = order;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SpriteImage;
    use crate::sim::Enemy;
    use crate::tuning::Tuning;

    fn loaded_assets() -> AssetCache {
        let mut cache = AssetCache::new();
        for key in SpriteKey::ALL {
            cache.insert(key, SpriteImage::solid(1, 2, [255; 4]));
        }
        cache
    }

    fn setup() -> (GameState, Viewport) {
        let viewport = Viewport::new(1000.0, 800.0, NUM_LANES);
        let mut state = GameState::new(11, Tuning::default(), &viewport);
        state.start();
        (state, viewport)
    }

    fn enemy(depth: f32, sprite: SpriteKey) -> Enemy {
        Enemy {
            depth,
            lane: 0,
            speed: 0.003,
            sprite,
        }
    }

    #[test]
    fn test_layer_order() {
        let (state, viewport) = setup();
        let mut list = DrawList::new();
        build_frame(&state, &viewport, &loaded_assets(), &mut list);

        let cmds = list.commands();
        assert!(matches!(cmds[0], DrawCmd::Clear(_)));
        assert!(matches!(cmds[1], DrawCmd::FillRect { color, .. } if color == colors::SKY));
        assert!(matches!(cmds[2], DrawCmd::FillQuad { .. }));
        assert!(matches!(
            cmds.last(),
            Some(DrawCmd::Sprite { key: SpriteKey::Player, .. })
        ));
    }

    #[test]
    fn test_road_trapezoid() {
        let (state, viewport) = setup();
        let mut list = DrawList::new();
        build_frame(&state, &viewport, &loaded_assets(), &mut list);

        let DrawCmd::FillQuad { points, .. } = list.commands()[2] else {
            panic!("expected road quad");
        };
        assert_eq!(points[0], Vec2::new(340.0, 400.0));
        assert_eq!(points[1], Vec2::new(660.0, 400.0));
        assert_eq!(points[2], Vec2::new(900.0, 800.0));
        assert_eq!(points[3], Vec2::new(100.0, 800.0));
    }

    #[test]
    fn test_enemies_sorted_far_to_near() {
        let (mut state, viewport) = setup();
        state.enemies[0] = enemy(0.3, SpriteKey::Enemy1);
        state.enemies[1] = enemy(0.9, SpriteKey::Enemy2);
        state.enemies[2] = enemy(0.5, SpriteKey::Enemy1);
        state.enemies[3] = enemy(0.7, SpriteKey::Enemy2);
        state.enemies[4] = enemy(0.2, SpriteKey::Enemy1);

        let mut list = DrawList::new();
        build_frame(&state, &viewport, &loaded_assets(), &mut list);

        let ys: Vec<f32> = list
            .sprites()
            .filter(|(key, _)| *key != SpriteKey::Player)
            .map(|(_, rect)| rect.max().y)
            .collect();
        assert_eq!(ys.len(), 5);
        // Nearer enemies sit lower on screen
        assert!(ys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_visibility_threshold() {
        let (mut state, viewport) = setup();
        for e in state.enemies.iter_mut() {
            *e = enemy(1.3, SpriteKey::Enemy1);
        }
        state.enemies[0] = enemy(0.05, SpriteKey::Enemy1);
        state.enemies[1] = enemy(0.1, SpriteKey::Enemy1);
        state.enemies[2] = enemy(0.11, SpriteKey::Enemy2);

        let mut list = DrawList::new();
        build_frame(&state, &viewport, &loaded_assets(), &mut list);

        let enemies: Vec<SpriteKey> = list
            .sprites()
            .map(|(key, _)| key)
            .filter(|key| *key != SpriteKey::Player)
            .collect();
        assert_eq!(enemies, vec![SpriteKey::Enemy2]);
    }

    #[test]
    fn test_unloaded_sprites_are_skipped() {
        let (state, viewport) = setup();
        let mut list = DrawList::new();
        build_frame(&state, &viewport, &AssetCache::new(), &mut list);
        assert_eq!(list.sprites().count(), 0);
        // Background layers still drawn
        assert!(list.len() >= 3);
    }

    #[test]
    fn test_road_marks_between_lanes_only() {
        let (mut state, viewport) = setup();
        state.road_marks[0].depth = 0.0; // Not drawn
        state.road_marks[1].depth = 0.5;
        state.road_marks[2].depth = 0.8;

        let mut list = DrawList::new();
        build_frame(&state, &viewport, &AssetCache::new(), &mut list);

        let marks: Vec<Rect> = list
            .commands()
            .iter()
            .filter_map(|cmd| match *cmd {
                DrawCmd::FillRect { rect, color } if color == colors::ROAD_MARK => Some(rect),
                _ => None,
            })
            .collect();
        assert_eq!(marks.len(), 2 * (NUM_LANES - 1));

        for rect in &marks {
            assert!(rect.width <= viewport.lane_width * 0.1 + 1e-3);
            assert!(rect.height <= viewport.height * 0.1 + 1e-3);
        }
        // Each dash is centered on a lane boundary
        let b0 = viewport.lane_boundary_x(0, 0.5);
        assert!((marks[0].center().x - b0).abs() < 1e-3);
    }

    #[test]
    fn test_draw_list_reuse() {
        let (state, viewport) = setup();
        let assets = loaded_assets();
        let mut list = DrawList::new();
        assert!(list.is_empty());
        build_frame(&state, &viewport, &assets, &mut list);
        assert!(!list.is_empty());
        let first = list.len();
        build_frame(&state, &viewport, &assets, &mut list);
        assert_eq!(list.len(), first);
    }
}
