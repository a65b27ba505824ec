//! Tessellation of draw commands into triangle batches

use std::ops::Range;

use glam::Vec2;

use super::scene::{Color, DrawCmd, DrawList, colors};
use super::vertex::Vertex;
use crate::sim::{Rect, SpriteKey};

const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
const NO_UV: [f32; 2] = [0.0, 0.0];

/// What a batch samples from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Vertex color only (white texture)
    Solid,
    Sprite(SpriteKey),
}

/// A run of consecutive vertices sharing one texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub fill: Fill,
    pub vertices: Range<u32>,
}

/// Triangles for one frame, in draw order
#[derive(Debug)]
pub struct Mesh {
    pub clear: Color,
    pub vertices: Vec<Vertex>,
    pub batches: Vec<Batch>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            clear: colors::BACKGROUND,
            vertices: Vec::new(),
            batches: Vec::new(),
        }
    }
}

impl Mesh {
    fn reset(&mut self) {
        self.clear = colors::BACKGROUND;
        self.vertices.clear();
        self.batches.clear();
    }

    /// Two triangles; corners are (top-left, top-right, bottom-right, bottom-left)
    fn push_quad(&mut self, fill: Fill, corners: [[f32; 2]; 4], uvs: [[f32; 2]; 4], color: Color) {
        let start = self.vertices.len() as u32;
        for i in [0, 1, 2, 0, 2, 3] {
            self.vertices.push(Vertex::new(corners[i], uvs[i], color));
        }
        let end = self.vertices.len() as u32;

        match self.batches.last_mut() {
            Some(batch) if batch.fill == fill => batch.vertices.end = end,
            _ => self.batches.push(Batch {
                fill,
                vertices: start..end,
            }),
        }
    }
}

/// Pixel coordinates (y down) to normalized device coordinates (y up)
pub fn pixel_to_ndc(point: Vec2, size: Vec2) -> [f32; 2] {
    let w = size.x.max(1.0);
    let h = size.y.max(1.0);
    [point.x / w * 2.0 - 1.0, 1.0 - point.y / h * 2.0]
}

fn rect_corners(rect: &Rect, size: Vec2) -> [[f32; 2]; 4] {
    let min = rect.min();
    let max = rect.max();
    [
        pixel_to_ndc(min, size),
        pixel_to_ndc(Vec2::new(max.x, min.y), size),
        pixel_to_ndc(max, size),
        pixel_to_ndc(Vec2::new(min.x, max.y), size),
    ]
}

/// Rebuild `mesh` from `list` for a surface of `size` pixels
pub fn tessellate(list: &DrawList, size: Vec2, mesh: &mut Mesh) {
    mesh.reset();

    for cmd in list.commands() {
        match *cmd {
            DrawCmd::Clear(color) => mesh.clear = color,
            DrawCmd::FillRect { rect, color } => {
                mesh.push_quad(Fill::Solid, rect_corners(&rect, size), [NO_UV; 4], color);
            }
            DrawCmd::FillQuad { points, color } => {
                let corners = points.map(|p| pixel_to_ndc(p, size));
                mesh.push_quad(Fill::Solid, corners, [NO_UV; 4], color);
            }
            DrawCmd::Sprite { key, rect } => {
                let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
                mesh.push_quad(Fill::Sprite(key), rect_corners(&rect, size), uvs, WHITE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_to_ndc_corners() {
        let size = Vec2::new(200.0, 100.0);
        assert_eq!(pixel_to_ndc(Vec2::ZERO, size), [-1.0, 1.0]);
        assert_eq!(pixel_to_ndc(size, size), [1.0, -1.0]);
        assert_eq!(pixel_to_ndc(Vec2::new(100.0, 50.0), size), [0.0, 0.0]);
    }

    #[test]
    fn test_batches_split_on_texture_change() {
        let mut list = DrawList::new();
        list.push(DrawCmd::Clear([0.1, 0.2, 0.3, 1.0]));
        list.push(DrawCmd::FillRect {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            color: colors::SKY,
        });
        list.push(DrawCmd::FillRect {
            rect: Rect::new(0.0, 10.0, 10.0, 10.0),
            color: colors::ROAD,
        });
        list.push(DrawCmd::Sprite {
            key: SpriteKey::Enemy1,
            rect: Rect::new(2.0, 2.0, 4.0, 8.0),
        });
        list.push(DrawCmd::Sprite {
            key: SpriteKey::Enemy1,
            rect: Rect::new(3.0, 3.0, 4.0, 8.0),
        });
        list.push(DrawCmd::Sprite {
            key: SpriteKey::Player,
            rect: Rect::new(1.0, 1.0, 4.0, 8.0),
        });

        let mut mesh = Mesh::default();
        tessellate(&list, Vec2::new(100.0, 100.0), &mut mesh);

        assert_eq!(mesh.clear, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(mesh.vertices.len(), 5 * 6);
        assert_eq!(
            mesh.batches,
            vec![
                Batch {
                    fill: Fill::Solid,
                    vertices: 0..12
                },
                Batch {
                    fill: Fill::Sprite(SpriteKey::Enemy1),
                    vertices: 12..24
                },
                Batch {
                    fill: Fill::Sprite(SpriteKey::Player),
                    vertices: 24..30
                },
            ]
        );
    }

    #[test]
    fn test_sprite_uvs_cover_texture() {
        let mut list = DrawList::new();
        list.push(DrawCmd::Sprite {
            key: SpriteKey::Player,
            rect: Rect::new(0.0, 0.0, 50.0, 100.0),
        });
        let mut mesh = Mesh::default();
        tessellate(&list, Vec2::new(100.0, 100.0), &mut mesh);

        // First triangle: top-left, top-right, bottom-right
        assert_eq!(mesh.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices[1].uv, [1.0, 0.0]);
        assert_eq!(mesh.vertices[2].uv, [1.0, 1.0]);
        assert_eq!(mesh.vertices[0].position, [-1.0, 1.0]);
        assert_eq!(mesh.vertices[2].position, [0.0, -1.0]);
    }
}
