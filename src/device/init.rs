/// Initialization parameters for the GPU layer.
///
/// Kept minimal: the tutorial has exactly one surface and no feature or limit
/// requirements beyond the wgpu defaults.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// The tutorial presents with no sync-interval request, so the default is
    /// `AutoNoVsync`: present returns as soon as the frame is queued.
    pub present_mode: wgpu::PresentMode,

    /// Desired maximum frame latency for the surface. A hint; support depends
    /// on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::AutoNoVsync,
            desired_maximum_frame_latency: 2,
        }
    }
}
