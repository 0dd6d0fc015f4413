//! Skiron builds SAH bounding-volume hierarchies over triangle scenes and
//! flattens them into the buffer layout the GPU tracer traverses.
//!
//! The crate is purely CPU-side and does not touch the GPU itself: the outer
//! renderer feeds a [`Scene`] in, gets a [`Bvh`] back and uploads its byte
//! views verbatim into storage buffers.

mod bvh;
mod scene;
mod utils;

pub use skiron_gpu as gpu;

pub use self::bvh::*;
pub use self::scene::*;
pub use self::utils::*;
