use bytemuck::{Pod, Zeroable};
use winit::dpi::PhysicalSize;

use super::shader;
use super::{RenderCtx, RenderTarget};

/// Multisample count for the color target, matching the 4x swap-chain
/// multisampling of the original sample. wgpu surfaces are single-sampled, so
/// rendering happens on a 4-sample texture resolved into the surface view.
pub const SAMPLE_COUNT: u32 = 4;

const VERTEX_COUNT: u32 = 3;

/// One vertex of the triangle: clip-space position + straight RGBA color.
///
/// Layout is fixed by the vertex stage: `Float32x3` position at offset 0,
/// `Float32x4` color at offset 12, 28-byte stride.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x4  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// The only geometry in the program: one red, one green, one blue corner.
pub const TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex {
        position: [0.0, 0.5, 0.0],
        color: [1.0, 0.0, 0.0, 1.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        color: [0.0, 1.0, 0.0, 1.0],
    },
    Vertex {
        position: [-0.5, -0.5, 0.0],
        color: [0.0, 0.0, 1.0, 1.0],
    },
];

/// Renderer for the hard-coded triangle.
///
/// GPU resources are built lazily on first use and rebuilt only when the
/// surface format or drawable size changes. A shader failure leaves the
/// pipeline empty: `draw` then records nothing and only the clear survives,
/// matching the original's keep-running-without-a-pipeline behavior.
#[derive(Default)]
pub struct TriangleRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    shader_failed: bool,

    vertex_buffer: Option<wgpu::Buffer>,

    msaa_view: Option<wgpu::TextureView>,
    msaa_key: Option<(PhysicalSize<u32>, wgpu::TextureFormat)>,
}

impl TriangleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the frame to `color`.
    ///
    /// The clear is recorded on the multisample target and resolved into the
    /// surface view immediately, so a frame with no draw call still presents
    /// a uniform `color`.
    pub fn clear(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, color: wgpu::Color) {
        self.ensure_msaa_target(ctx);
        let Some(msaa_view) = self.msaa_view.as_ref() else { return };

        // Pass is dropped immediately; it only exists for its load op.
        let _rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("triangle clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: msaa_view,
                resolve_target: Some(target.color_view),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    /// Records one draw of the 3-vertex triangle list.
    ///
    /// Without a compiled pipeline this records nothing.
    pub fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.ensure_pipeline(ctx);
        self.ensure_vertex_buffer(ctx);
        self.ensure_msaa_target(ctx);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else { return };
        let Some(msaa_view) = self.msaa_view.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("triangle draw"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: msaa_view,
                resolve_target: Some(target.color_view),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    // Multisample contents are not needed once resolved.
                    store: wgpu::StoreOp::Discard,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
        rpass.draw(0..VERTEX_COUNT, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }
        if self.shader_failed {
            return;
        }

        let Some(source) = shader::load_source() else {
            self.shader_failed = true;
            return;
        };

        // Shader and pipeline validation errors are captured here instead of
        // reaching the global error handler; a failure is reported and the
        // renderer stays pipeline-less.
        let error_scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("triangle shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("triangle pipeline layout"),
                    bind_group_layouts: &[],
                    immediate_size: 0,
                });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("triangle pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: SAMPLE_COUNT,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },

            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(error_scope.pop()) {
            log::error!("failed to compile triangle shader pipeline: {err}");
            self.shader_failed = true;
            return;
        }

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
    }

    fn ensure_vertex_buffer(&mut self, ctx: &RenderCtx<'_>) {
        if self.vertex_buffer.is_some() {
            return;
        }

        // Sized for exactly the 3 triangle vertices; CPU-writable through the
        // queue, uploaded once.
        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("triangle vbo"),
            size: std::mem::size_of_val(&TRIANGLE_VERTICES) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        ctx.queue
            .write_buffer(&buffer, 0, bytemuck::cast_slice(&TRIANGLE_VERTICES));

        self.vertex_buffer = Some(buffer);
    }

    fn ensure_msaa_target(&mut self, ctx: &RenderCtx<'_>) {
        let key = (ctx.size, ctx.surface_format);
        if self.msaa_key == Some(key) && self.msaa_view.is_some() {
            return;
        }
        if ctx.size.width == 0 || ctx.size.height == 0 {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("triangle msaa target"),
            size: wgpu::Extent3d {
                width: ctx.size.width,
                height: ctx.size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: SAMPLE_COUNT,
            dimension: wgpu::TextureDimension::D2,
            format: ctx.surface_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        self.msaa_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.msaa_key = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── vertex layout ─────────────────────────────────────────────────────

    #[test]
    fn vertex_stride_is_28_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 28);
        assert_eq!(Vertex::layout().array_stride, 28);
    }

    #[test]
    fn vertex_attributes_at_offsets_0_and_12() {
        let layout = Vertex::layout();
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
        assert_eq!(layout.attributes.len(), 2);

        let position = layout.attributes[0];
        assert_eq!(position.format, wgpu::VertexFormat::Float32x3);
        assert_eq!(position.offset, 0);
        assert_eq!(position.shader_location, 0);

        let color = layout.attributes[1];
        assert_eq!(color.format, wgpu::VertexFormat::Float32x4);
        assert_eq!(color.offset, 12);
        assert_eq!(color.shader_location, 1);
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn triangle_has_exactly_three_vertices_in_order() {
        assert_eq!(TRIANGLE_VERTICES.len() as u32, VERTEX_COUNT);

        assert_eq!(TRIANGLE_VERTICES[0].position, [0.0, 0.5, 0.0]);
        assert_eq!(TRIANGLE_VERTICES[1].position, [0.5, -0.5, 0.0]);
        assert_eq!(TRIANGLE_VERTICES[2].position, [-0.5, -0.5, 0.0]);

        assert_eq!(TRIANGLE_VERTICES[0].color, [1.0, 0.0, 0.0, 1.0]); // red
        assert_eq!(TRIANGLE_VERTICES[1].color, [0.0, 1.0, 0.0, 1.0]); // green
        assert_eq!(TRIANGLE_VERTICES[2].color, [0.0, 0.0, 1.0, 1.0]); // blue
    }

    #[test]
    fn vertex_upload_bytes_match_declared_layout() {
        let bytes: &[u8] = bytemuck::cast_slice(&TRIANGLE_VERTICES);
        assert_eq!(bytes.len(), 3 * 28);

        // Second vertex's green channel sits at stride + color offset + 4.
        let start = 28 + 12 + 4;
        let green = f32::from_ne_bytes(bytes[start..start + 4].try_into().unwrap());
        assert_eq!(green, 1.0);
    }

    #[test]
    fn sample_count_is_4x() {
        assert_eq!(SAMPLE_COUNT, 4);
    }
}
