//! Core geographic and temporal types.

mod bounds;
mod window;

pub use bounds::GeoBoundingBox;
pub use window::ForecastWindow;
