//! GPU rendering subsystem.
//!
//! The triangle renderer owns its own GPU resources (pipeline, vertex buffer,
//! multisample target) and issues commands via wgpu. Vertex positions are
//! authored directly in clip space; no transforms are applied.

mod ctx;
mod shader;
mod triangle;

pub use ctx::{RenderCtx, RenderTarget};
pub use triangle::{TriangleRenderer, Vertex, SAMPLE_COUNT, TRIANGLE_VERTICES};
