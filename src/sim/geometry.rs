//! Road projection
//!
//! The road is a trapezoid: `HORIZON_WIDTH_RATIO` of the full road width at
//! the horizon (depth 1) widening linearly to the full width at depth 0.
//! Every lane position, for the player and for enemies alike, goes through
//! `Viewport::lane_center_x`.

use crate::consts::*;
use crate::lerp;

/// Canvas-derived geometry, recomputed on resize
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas size in pixels
    pub width: f32,
    pub height: f32,
    /// Number of lanes the road is split into
    pub lanes: usize,
    /// Full road width (at depth 0)
    pub road_width: f32,
    /// Full-width lane slice
    pub lane_width: f32,
    /// Base vehicle footprint before perspective scaling
    pub vehicle_width: f32,
    pub vehicle_height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, lanes: usize) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let lanes = lanes.max(1);

        let road_width = width * 0.8;
        let lane_width = road_width / lanes as f32;

        Self {
            width,
            height,
            lanes,
            road_width,
            lane_width,
            vehicle_width: lane_width * 0.8,
            vehicle_height: (height / 15.0) * 1.3,
        }
    }

    /// Same canvas split into `lanes` lanes
    pub fn with_lanes(self, lanes: usize) -> Self {
        if self.lanes == lanes.max(1) {
            self
        } else {
            Self::new(self.width, self.height, lanes)
        }
    }

    /// Recompute derived sizes for a new canvas size
    pub fn resize(&mut self, width: f32, height: f32) {
        *self = Self::new(width, height, self.lanes);
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    #[inline]
    pub fn horizon_y(&self) -> f32 {
        self.height * HORIZON_RATIO
    }

    /// Road width at the horizon
    #[inline]
    pub fn road_top_width(&self) -> f32 {
        self.road_width * HORIZON_WIDTH_RATIO
    }

    /// Road span at the given depth (1 = horizon, 0 = nearest)
    pub fn road_width_at(&self, depth: f32) -> f32 {
        lerp(self.road_top_width(), self.road_width, 1.0 - depth)
    }

    /// Width of one lane slice at the given depth
    pub fn lane_width_at(&self, depth: f32) -> f32 {
        self.road_width_at(depth) / self.lanes as f32
    }

    /// Horizontal center of `lane` at `depth`
    pub fn lane_center_x(&self, lane: usize, depth: f32) -> f32 {
        let road_at_depth = self.road_width_at(depth);
        let left_edge = self.center_x() - road_at_depth / 2.0;
        let slice = road_at_depth / self.lanes as f32;
        left_edge + slice / 2.0 + lane as f32 * slice
    }

    /// Boundary between `lane` and `lane + 1` at `depth`
    pub fn lane_boundary_x(&self, lane: usize, depth: f32) -> f32 {
        (self.lane_center_x(lane, depth) + self.lane_center_x(lane + 1, depth)) / 2.0
    }

    /// Full-width road edges (left, right) in pixels
    pub fn road_edges(&self) -> (f32, f32) {
        let left = (self.width - self.road_width) / 2.0;
        (left, left + self.road_width)
    }

    /// Screen y of a point on the road surface at `depth`
    pub fn depth_to_screen_y(&self, depth: f32) -> f32 {
        self.horizon_y() + (self.height / 2.0) * (1.0 - depth)
    }
}

/// Size multiplier for an entity at `depth`
///
/// Inversely proportional to depth, never below `floor`. Depth at or below
/// zero gives a large finite scale instead of infinity or a negative value;
/// callers clamp the resulting pixel size.
pub fn perspective_scale(depth: f32, floor: f32) -> f32 {
    (0.5 / depth.max(f32::EPSILON)).max(floor)
}
