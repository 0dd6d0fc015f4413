use glam::Vec3;

use crate::BoundingBox;

/// Per-triangle working data; lives only for the duration of a build and gets
/// partitioned in place.
///
/// `center` is the midpoint of the triangle's bounding box, not the true
/// triangle centroid - a cheaper point that slightly biases bucketing for
/// skewed triangles, but one the traversal shaders already assume.
#[derive(Clone, Copy, Debug)]
pub struct BvhPrimitive {
    /// Index of the triangle in extraction order.
    pub triangle_id: u32,
    pub bounds: BoundingBox,
    pub center: Vec3,
}

impl BvhPrimitive {
    pub fn new(triangle_id: u32, bounds: BoundingBox) -> Self {
        Self {
            triangle_id,
            bounds,
            center: bounds.centroid(),
        }
    }
}
