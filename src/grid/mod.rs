pub mod config;
pub mod erosion;
pub mod occupancy;

pub use config::{RobotConfig, SonarConfig, SonarMount};
pub use occupancy::{log_odds_to_pixel, MapLayer, OccupancyGrid};
