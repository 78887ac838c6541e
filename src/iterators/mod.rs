pub mod arc;
pub mod footprint;

pub use arc::{ArcCell, ArcIterator};
pub use footprint::FootprintIterator;
