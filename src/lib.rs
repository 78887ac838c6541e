pub mod frontier;
pub mod grid;
pub mod iterators;
pub mod types;

pub use frontier::{Direction, FrontierSearch, PathFinder};
pub use grid::{MapLayer, OccupancyGrid, RobotConfig, SonarConfig, SonarMount};
pub use types::geometry::Pose2;
pub use types::{MapError, MapInfo};
