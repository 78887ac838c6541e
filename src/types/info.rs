//! Map metadata.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Geometry of a square, center-anchored grid.
///
/// Cell `(extent/2, extent/2)` corresponds to the world-space origin; the
/// resolution is fixed for the grid's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Cells per side.
    pub extent: u32,
    /// World units (cm) per cell.
    pub resolution: f32,
}

impl Default for MapInfo {
    fn default() -> Self {
        Self {
            extent: 1000,
            resolution: 5.0,
        }
    }
}

impl MapInfo {
    pub fn square(extent: u32, resolution: f32) -> Self {
        Self { extent, resolution }
    }

    /// Width of the map in world units (cm).
    #[inline]
    pub fn world_width(&self) -> f32 {
        self.extent as f32 * self.resolution
    }

    /// Continuous grid coordinates of a world point.
    #[inline]
    pub fn world_to_grid(&self, p: Vec2) -> Vec2 {
        p / self.resolution + Vec2::splat((self.extent / 2) as f32)
    }

    /// World coordinates of a cell's center.
    #[inline]
    pub fn grid_to_world(&self, cell: IVec2) -> Vec2 {
        (cell - IVec2::splat(self.extent as i32 / 2)).as_vec2() * self.resolution
    }

    #[inline]
    pub fn contains(&self, cell: IVec2) -> bool {
        let extent = self.extent as i32;
        0 <= cell.x && cell.x < extent && 0 <= cell.y && cell.y < extent
    }

    /// Row-major buffer index of a cell.
    #[inline]
    pub fn index(&self, cell: IVec2) -> usize {
        debug_assert!(self.contains(cell));
        cell.y as usize * self.extent as usize + cell.x as usize
    }
}
