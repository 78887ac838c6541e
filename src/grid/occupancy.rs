use glam::{IVec2, Vec2};
use image::{GrayImage, Luma};
use log::debug;

use crate::grid::config::{RobotConfig, SonarConfig, SonarMount};
use crate::grid::erosion::erode_min;
use crate::iterators::arc::ArcIterator;
use crate::iterators::footprint::FootprintIterator;
use crate::types::constants::{
    FREE_DELTA, LOG_ODDS_MAX, LOG_ODDS_MIN, OCCUPIED_EVIDENCE, UNKNOWN_PIXEL,
};
use crate::types::geometry::Pose2;
use crate::types::{MapError, MapInfo};

/// Selects which derived raster [`OccupancyGrid::render`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLayer {
    /// Raw belief: dark = occupied, bright = free, mid-gray = unknown.
    Belief,
    /// Belief eroded by the robot diagonal; bright pixels are poses the
    /// whole footprint fits into.
    Drivable,
}

/// Logistic squashing of a log-odds value into an 8-bit belief pixel.
///
/// Zero (no evidence) maps to 128, free evidence (negative) saturates
/// toward 255, occupied evidence toward 0.
#[inline]
pub fn log_odds_to_pixel(log_odds: f64) -> u8 {
    (255.0 / (1.0 + log_odds.exp())).round() as u8
}

/// Bayesian log-odds occupancy grid with synchronized 8-bit rasters.
///
/// Owns three buffers allocated once at construction and never resized: the
/// log-odds grid, the belief raster it is squashed into, and the drivable
/// raster derived from the belief by erosion. All mutation goes through
/// [`update`](Self::update); callers must serialize calls on one instance.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    info: MapInfo,
    sonar: SonarConfig,
    robot: RobotConfig,
    grid: Vec<f64>,
    belief: GrayImage,
    drivable: GrayImage,
}

impl OccupancyGrid {
    pub fn new(info: MapInfo, sonar: SonarConfig, robot: RobotConfig) -> Result<Self, MapError> {
        if info.extent == 0 || info.extent % 2 != 0 {
            return Err(MapError::InvalidMetadata(format!(
                "extent {} must be even and nonzero",
                info.extent
            )));
        }
        if !(info.resolution > 0.0) {
            return Err(MapError::InvalidMetadata(format!(
                "resolution {} must be positive",
                info.resolution
            )));
        }

        let cells = info.extent as usize * info.extent as usize;
        Ok(Self {
            grid: vec![0.0; cells],
            belief: GrayImage::from_pixel(info.extent, info.extent, Luma([UNKNOWN_PIXEL])),
            drivable: GrayImage::from_pixel(info.extent, info.extent, Luma([UNKNOWN_PIXEL])),
            info,
            sonar,
            robot,
        })
    }

    pub fn info(&self) -> &MapInfo {
        &self.info
    }

    /// Log-odds value of a cell, `None` outside the grid.
    pub fn log_odds(&self, cell: IVec2) -> Option<f64> {
        if !self.info.contains(cell) {
            return None;
        }
        Some(self.grid[self.info.index(cell)])
    }

    /// The belief or drivable raster, one pixel per cell, row 0 at the
    /// minimum world y. Cell `(extent/2, extent/2)` is the world origin.
    pub fn render(&self, layer: MapLayer) -> &GrayImage {
        match layer {
            MapLayer::Belief => &self.belief,
            MapLayer::Drivable => &self.drivable,
        }
    }

    /// Fold one sonar sounding into the grid.
    ///
    /// Rasterizes the beam wedge and applies the inverse sensor model to
    /// every covered cell within range, overwrites the robot's own
    /// footprint with hard free evidence, and recomputes the drivable
    /// raster. The wedge and the footprint must stay inside the fixed grid
    /// extent; violating that is a caller bug and fails fast.
    pub fn update(&mut self, pose: Pose2, mount: SonarMount, distance: f32) {
        let beam = pose.yaw + mount.beam_offset();
        let apex = self.info.world_to_grid(pose.position).round().as_ivec2();

        let half_opening = self.sonar.opening_angle / 2.0;
        let radius = (distance + self.sonar.distance_tolerance / 2.0) / self.info.resolution;
        let arc = ArcIterator::new(apex, beam - half_opening, beam + half_opening, radius);
        assert!(
            arc.bounds().within(self.info.extent),
            "sonar wedge leaves the grid"
        );

        let sqr_max = sqr(self.sonar.max_distance / self.info.resolution);
        let sqr_measured = sqr((distance - self.sonar.distance_tolerance / 2.0) / self.info.resolution);
        let occupied_gain = OCCUPIED_EVIDENCE / f64::from(self.info.resolution);

        let mut touched = 0usize;
        for hit in arc {
            if hit.sqr_distance >= sqr_max {
                continue;
            }
            let delta = if hit.sqr_distance < sqr_measured {
                FREE_DELTA
            } else {
                occupied_delta(occupied_gain, hit.sqr_distance)
            };
            self.accumulate(hit.cell, delta);
            touched += 1;
        }

        // The robot cannot be standing on an obstacle; contrary sensor
        // evidence for its own footprint is noise and gets overwritten.
        let footprint = FootprintIterator::new(
            apex,
            Vec2::new(self.robot.width, self.robot.length) / self.info.resolution,
            pose.yaw,
        );
        assert!(
            footprint.bounds().within(self.info.extent),
            "robot footprint leaves the grid"
        );
        for cell in footprint {
            self.write(cell, LOG_ODDS_MIN);
        }

        self.erode();
        debug!("sonar update at {apex:?} ({mount:?}, {distance} cm) touched {touched} cells");
    }

    fn accumulate(&mut self, cell: IVec2, delta: f64) {
        let value = self.grid[self.info.index(cell)] + delta;
        self.write(cell, value.clamp(LOG_ODDS_MIN, LOG_ODDS_MAX));
    }

    /// Store a log-odds value and refresh the matching belief pixel.
    fn write(&mut self, cell: IVec2, value: f64) {
        self.grid[self.info.index(cell)] = value;
        self.belief
            .put_pixel(cell.x as u32, cell.y as u32, Luma([log_odds_to_pixel(value)]));
    }

    /// Recompute the drivable raster from scratch.
    ///
    /// Kernel side is the robot diagonal in cells, rounded up, so any
    /// orientation of the footprint fits a drivable cell.
    fn erode(&mut self) {
        let kernel = (self.robot.diagonal() / self.info.resolution).ceil() as usize;
        let extent = self.info.extent as usize;
        erode_min(
            self.belief.as_raw(),
            &mut self.drivable,
            extent,
            extent,
            kernel,
        );
    }

    #[cfg(test)]
    pub(crate) fn paint_belief(&mut self, cell: IVec2, pixel: u8) {
        self.belief
            .put_pixel(cell.x as u32, cell.y as u32, Luma([pixel]));
    }
}

/// Occupied-cell evidence decays with range; the floor at one cell keeps
/// the delta finite near the apex.
#[inline]
fn occupied_delta(gain: f64, sqr_distance: f32) -> f64 {
    gain / f64::from(sqr_distance.max(1.0)).sqrt()
}

#[inline]
fn sqr(x: f32) -> f32 {
    x * x
}
