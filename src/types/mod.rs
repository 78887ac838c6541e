pub mod constants;
pub mod error;
pub mod geometry;
pub mod info;

pub use constants::*;
pub use error::MapError;
pub use info::MapInfo;
