mod axis;
mod bounding_box;

pub use self::axis::*;
pub use self::bounding_box::*;
