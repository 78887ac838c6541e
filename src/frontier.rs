//! Expanding-ring search for the nearest unexplored cell.
//!
//! The belief raster is scanned in growing Chebyshev rings around the robot
//! until the Euclidean-nearest unknown cell is pinned down; route
//! construction to that cell is delegated to an external [`PathFinder`].

use std::f32::consts::FRAC_PI_4;

use glam::{IVec2, UVec2, Vec2};
use image::GrayImage;
use log::debug;

use crate::grid::{MapLayer, OccupancyGrid};
use crate::types::constants::{UNKNOWN_BAND_MAX, UNKNOWN_BAND_MIN};
use crate::types::geometry::{angular_distance, Pose2};

/// Compass heading hint handed to the path finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Right,
    Up,
    Left,
    Down,
}

impl Direction {
    /// Quantize a yaw angle to the nearest compass direction.
    pub fn from_yaw(yaw: f32) -> Self {
        let angle = angular_distance(yaw, 0.0);
        if angle.abs() <= FRAC_PI_4 {
            Direction::Right
        } else if angle > 3.0 * FRAC_PI_4 || angle < -3.0 * FRAC_PI_4 {
            Direction::Left
        } else if angle > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// External route planner.
///
/// Invoked synchronously with start/goal cells and the belief raster as the
/// obstacle bitmap (pixels below an occupancy threshold are walkable); the
/// raster carries width, height and stride. Returns the route as grid
/// cells, start to goal.
pub trait PathFinder {
    fn find_path(
        &mut self,
        start: UVec2,
        heading: Direction,
        goal: UVec2,
        map: &GrayImage,
    ) -> Vec<UVec2>;
}

/// Belief pixels in this band are neither confidently free nor occupied.
#[inline]
fn is_unknown(pixel: u8) -> bool {
    (UNKNOWN_BAND_MIN..UNKNOWN_BAND_MAX).contains(&pixel)
}

/// Locates the nearest unexplored region and plans a route to it.
pub struct FrontierSearch<P> {
    planner: P,
}

impl<P: PathFinder> FrontierSearch<P> {
    pub fn new(planner: P) -> Self {
        Self { planner }
    }

    /// World-space waypoints from `pose` toward the nearest unknown cell.
    ///
    /// Scans Chebyshev rings around the robot cell; a hit shrinks the
    /// remaining ring bound to the best cell's Euclidean distance, since a
    /// ring at radius `r` only holds cells at Euclidean distance ≥ `r`.
    /// Returns a single-point path when no unknown cell is reachable within
    /// the grid; the planner is only consulted for a real frontier.
    pub fn closest_unknown_point(&mut self, grid: &OccupancyGrid, pose: Pose2) -> Vec<Vec2> {
        let info = grid.info();
        let belief = grid.render(MapLayer::Belief);
        let center = info.world_to_grid(pose.position).round().as_ivec2();
        assert!(info.contains(center), "robot pose outside the grid");

        let extent = info.extent as i32;
        // Largest ring that still fits the grid on all four sides.
        let mut bound = center
            .x
            .min(center.y)
            .min(extent - 1 - center.x)
            .min(extent - 1 - center.y);
        let mut best = center;
        let mut best_sqr = i64::MAX;

        let mut ring = 1;
        while ring <= bound {
            for cell in ring_cells(center, ring) {
                if !is_unknown(belief.get_pixel(cell.x as u32, cell.y as u32).0[0]) {
                    continue;
                }
                let sqr = i64::from((cell - center).length_squared());
                if sqr < best_sqr {
                    best_sqr = sqr;
                    best = cell;
                    bound = bound.min((best_sqr as f64).sqrt().ceil() as i32);
                }
            }
            ring += 1;
        }

        if best == center {
            debug!("no unknown cell within ring bound of {center:?}");
            return vec![info.grid_to_world(center)];
        }
        debug!("nearest unknown cell {best:?} at sqr distance {best_sqr}");

        let heading = Direction::from_yaw(pose.yaw);
        self.planner
            .find_path(center.as_uvec2(), heading, best.as_uvec2(), belief)
            .into_iter()
            .map(|cell| info.grid_to_world(cell.as_ivec2()))
            .collect()
    }
}

/// The four edges of the Chebyshev square at radius `ring`; the interior
/// was covered by smaller rings.
fn ring_cells(center: IVec2, ring: i32) -> impl Iterator<Item = IVec2> {
    let top = (center.x - ring..=center.x + ring).map(move |x| IVec2::new(x, center.y - ring));
    let bottom = (center.x - ring..=center.x + ring).map(move |x| IVec2::new(x, center.y + ring));
    let left =
        (center.y - ring + 1..=center.y + ring - 1).map(move |y| IVec2::new(center.x - ring, y));
    let right =
        (center.y - ring + 1..=center.y + ring - 1).map(move |y| IVec2::new(center.x + ring, y));
    top.chain(bottom).chain(left).chain(right)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;
    use crate::grid::{RobotConfig, SonarConfig};
    use crate::types::MapInfo;

    /// Records its arguments and walks straight toward the goal.
    #[derive(Default)]
    struct LinePlanner {
        calls: Vec<(UVec2, Direction, UVec2)>,
    }

    impl PathFinder for LinePlanner {
        fn find_path(
            &mut self,
            start: UVec2,
            heading: Direction,
            goal: UVec2,
            _map: &GrayImage,
        ) -> Vec<UVec2> {
            self.calls.push((start, heading, goal));
            let mut path = vec![start];
            let mut at = start.as_ivec2();
            let goal = goal.as_ivec2();
            while at != goal {
                at += (goal - at).signum();
                path.push(at.as_uvec2());
            }
            path
        }
    }

    fn known_grid(extent: u32) -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(
            MapInfo::square(extent, 5.0),
            SonarConfig::default(),
            RobotConfig::default(),
        )
        .expect("grid should build");
        for y in 0..extent as i32 {
            for x in 0..extent as i32 {
                grid.paint_belief(IVec2::new(x, y), 255);
            }
        }
        grid
    }

    #[test]
    fn quantizes_yaw_to_compass_directions() {
        assert_eq!(Direction::from_yaw(0.0), Direction::Right);
        assert_eq!(Direction::from_yaw(2.0 * PI), Direction::Right);
        assert_eq!(Direction::from_yaw(PI / 2.0), Direction::Up);
        assert_eq!(Direction::from_yaw(PI), Direction::Left);
        assert_eq!(Direction::from_yaw(-PI / 2.0), Direction::Down);
        assert_eq!(Direction::from_yaw(0.8 * PI), Direction::Left);
        assert_eq!(Direction::from_yaw(-2.0), Direction::Down);
    }

    #[test]
    fn ring_cells_cover_the_square_boundary_once() {
        let center = IVec2::new(5, 5);
        let cells: Vec<IVec2> = ring_cells(center, 3).collect();
        assert_eq!(cells.len(), 8 * 3);
        for &cell in &cells {
            let d = (cell - center).abs();
            assert_eq!(d.x.max(d.y), 3);
        }
        let unique: std::collections::HashSet<(i32, i32)> =
            cells.iter().map(|c| (c.x, c.y)).collect();
        assert_eq!(unique.len(), cells.len());
    }

    #[test]
    fn fully_known_map_degrades_to_single_point() {
        let grid = known_grid(20);
        let mut search = FrontierSearch::new(LinePlanner::default());
        let path = search.closest_unknown_point(&grid, Pose2::default());
        assert_eq!(path, vec![Vec2::ZERO]);
        assert!(search.planner.calls.is_empty(), "planner must not run");
    }

    #[test]
    fn pose_at_grid_edge_degrades_to_single_point() {
        let grid = known_grid(20);
        let corner_world = grid.info().grid_to_world(IVec2::ZERO);
        let mut search = FrontierSearch::new(LinePlanner::default());
        let path = search.closest_unknown_point(&grid, Pose2::new(corner_world, 0.0));
        assert_eq!(path, vec![corner_world]);
    }

    #[test]
    fn prefers_euclidean_nearest_on_same_chebyshev_ring() {
        let mut grid = known_grid(100);
        // both at Chebyshev radius 5, scanned corner before edge-middle
        grid.paint_belief(IVec2::new(45, 47), 128); // Euclidean² 34
        grid.paint_belief(IVec2::new(55, 50), 128); // Euclidean² 25
        let mut search = FrontierSearch::new(LinePlanner::default());
        search.closest_unknown_point(&grid, Pose2::default());

        let (start, heading, goal) = search.planner.calls[0];
        assert_eq!(start, UVec2::new(50, 50));
        assert_eq!(heading, Direction::Right);
        assert_eq!(goal, UVec2::new(55, 50));
    }

    #[test]
    fn later_ring_can_beat_an_earlier_corner_hit() {
        let mut grid = known_grid(100);
        grid.paint_belief(IVec2::new(53, 53), 128); // ring 3, Euclidean² 18
        grid.paint_belief(IVec2::new(46, 50), 128); // ring 4, Euclidean² 16
        let mut search = FrontierSearch::new(LinePlanner::default());
        search.closest_unknown_point(&grid, Pose2::default());

        let (_, _, goal) = search.planner.calls[0];
        assert_eq!(goal, UVec2::new(46, 50));
    }

    #[test]
    fn maps_planner_cells_to_world_points() {
        let mut grid = known_grid(100);
        grid.paint_belief(IVec2::new(53, 50), 128);
        let mut search = FrontierSearch::new(LinePlanner::default());
        let path = search.closest_unknown_point(&grid, Pose2::default());

        assert_eq!(
            path,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(5.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(15.0, 0.0),
            ]
        );
    }
}
