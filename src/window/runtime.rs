use anyhow::Context;
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::error::FatalError;
use crate::render::{RenderCtx, RenderTarget, TriangleRenderer};

/// Background color of every frame.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.2,
    b: 0.4,
    a: 1.0,
};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Learning wgpu in Rust!".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Creates the window, brings up the GPU, and drives the render loop
    /// until the window is closed.
    ///
    /// Teardown order is fixed: GPU resources are dropped before the window,
    /// since the surface refers to the window handle.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit) -> Result<(), FatalError> {
        let event_loop = EventLoop::new()
            .map_err(|e| {
                FatalError::window(anyhow::Error::new(e).context("failed to create winit EventLoop"))
            })?;

        let mut state = AppState::new(config, gpu_init);

        event_loop
            .run_app(&mut state)
            .map_err(|e| {
                FatalError::window(
                    anyhow::Error::new(e).context("winit event loop terminated with error"),
                )
            })?;

        match state.fatal.take() {
            Some(fatal) => Err(fatal),
            None => Ok(()),
        }
    }
}

/// Position that centers a window of `window` size on a screen of `screen`
/// size whose top-left corner is at `origin`.
fn centered_position(
    screen: PhysicalSize<u32>,
    window: PhysicalSize<u32>,
    origin: PhysicalPosition<i32>,
) -> PhysicalPosition<i32> {
    let x = origin.x + (screen.width.saturating_sub(window.width) / 2) as i32;
    let y = origin.y + (screen.height.saturating_sub(window.height) / 2) as i32;
    PhysicalPosition::new(x, y)
}

#[self_referencing]
struct WindowEntry {
    renderer: TriangleRenderer,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,

    entry: Option<WindowEntry>,
    exit_requested: bool,
    fatal: Option<FatalError>,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu_init: GpuInit) -> Self {
        Self {
            config,
            gpu_init,
            entry: None,
            exit_requested: false,
            fatal: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry, FatalError> {
        let mut attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        // Screen-centered placement when the platform exposes a monitor.
        if let Some(monitor) = event_loop.primary_monitor() {
            let outer: PhysicalSize<u32> =
                self.config.initial_size.to_physical(monitor.scale_factor());
            attrs = attrs.with_position(centered_position(monitor.size(), outer, monitor.position()));
        }

        let window = event_loop
            .create_window(attrs)
            .context("winit window creation failed")
            .map_err(FatalError::window)?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            renderer: TriangleRenderer::new(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, fatal: FatalError) {
        self.fatal = Some(fatal);
        self.exit_requested = true;
        event_loop.exit();
    }

    /// One frame: clear, draw the triangle, present.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else { return };

        let mut surface_fatal = false;

        entry.with_mut(|fields| {
            let mut frame = match fields.gpu.begin_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    if fields.gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal {
                        surface_fatal = true;
                    }
                    return;
                }
            };

            let rctx = RenderCtx::new(
                fields.gpu.device(),
                fields.gpu.queue(),
                fields.gpu.surface_format(),
                fields.gpu.size(),
            );

            // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
            {
                let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
                fields.renderer.clear(&rctx, &mut target, CLEAR_COLOR);
                fields.renderer.draw(&rctx, &mut target);
            }

            fields.window.pre_present_notify();
            fields.gpu.submit(frame);
        });

        if surface_fatal {
            log::error!("surface out of memory; shutting down");
            self.exit_requested = true;
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
            }
            Err(fatal) => self.fail(event_loop, fatal),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; the program renders every loop iteration.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match event {
            // The handler only flips the exit flag; actual teardown happens
            // when the loop unwinds and the window entry is dropped (GPU
            // resources first, then the window).
            WindowEvent::CloseRequested => {
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── config defaults ───────────────────────────────────────────────────

    #[test]
    fn default_config_is_800_by_600() {
        let config = RuntimeConfig::default();
        assert_eq!(config.initial_size, LogicalSize::new(800.0, 600.0));
        assert_eq!(config.title, "Learning wgpu in Rust!");
    }

    #[test]
    fn clear_color_matches_background() {
        assert_eq!(CLEAR_COLOR.r, 0.0);
        assert_eq!(CLEAR_COLOR.g, 0.2);
        assert_eq!(CLEAR_COLOR.b, 0.4);
        assert_eq!(CLEAR_COLOR.a, 1.0);
    }

    // ── centered_position ─────────────────────────────────────────────────

    #[test]
    fn centers_window_on_primary_screen() {
        let pos = centered_position(
            PhysicalSize::new(1920, 1080),
            PhysicalSize::new(800, 600),
            PhysicalPosition::new(0, 0),
        );
        assert_eq!(pos, PhysicalPosition::new(560, 240));
    }

    #[test]
    fn centering_respects_monitor_origin() {
        let pos = centered_position(
            PhysicalSize::new(1920, 1080),
            PhysicalSize::new(800, 600),
            PhysicalPosition::new(1920, 0),
        );
        assert_eq!(pos, PhysicalPosition::new(2480, 240));
    }

    #[test]
    fn centering_clamps_oversized_windows() {
        let pos = centered_position(
            PhysicalSize::new(640, 480),
            PhysicalSize::new(800, 600),
            PhysicalPosition::new(0, 0),
        );
        assert_eq!(pos, PhysicalPosition::new(0, 0));
    }
}
