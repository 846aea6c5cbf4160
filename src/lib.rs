//! Windowed GPU triangle tutorial.
//!
//! Opens a native window, brings up a wgpu device and surface, builds a small
//! shader pipeline and a static vertex buffer, then clears, draws one
//! hard-coded triangle, and presents every loop iteration.

pub mod device;
pub mod error;
pub mod logging;
pub mod render;
pub mod window;
