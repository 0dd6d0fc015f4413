//! Structs shared between Skiron's CPU-side BVH builder and the GPU tracer.
//!
//! Everything in here is uploaded verbatim into storage buffers, so the field
//! order and record sizes are a compatibility contract with the traversal
//! shaders - change them only together with the shaders.

mod bvh_node;
mod triangle_ref;

pub use self::bvh_node::*;
pub use self::triangle_ref::*;
