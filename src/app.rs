//! Application state holding the wgpu graphics context
//!
//! This module contains the core graphics state including the wgpu device,
//! queue, surface and configuration, the scene renderer, the orbit camera and
//! the currently displayed model.
//!
//! Frame pacing is driven by the winit event loop (see `main.rs`), scheduling
//! redraws at the display refresh rate (vsync) or at `settings.target_fps`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use winit::dpi::PhysicalSize;
use winit::event::MouseButton;
use winit::window::Window;

use crate::obj::{self, ObjError};
use crate::render::{GpuMesh, MaterialUniform, SceneRenderer};
use crate::scene::mesh::MeshData;
use crate::scene::{OrbitCamera, TARGET_EXTENT};
use crate::settings::ViewerSettings;
use crate::telemetry::FrameProfiler;
use crate::ui::{self, MenuBar};
use crate::watch::ModelWatcher;

/// Edge length of the fallback cube shown when model loading fails
const FALLBACK_CUBE_SIZE: f32 = 2.0;

/// What a pointer drag currently controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Idle,
    Rotate,
    Pan,
}

/// Helper function to render the egui pass
fn render_egui_pass(
    renderer: &egui_wgpu::Renderer,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    paint_jobs: &[egui::ClippedPrimitive],
    screen_descriptor: &egui_wgpu::ScreenDescriptor,
) {
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("egui Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    // SAFETY: The render_pass is used only within this function and dropped
    // before the encoder is finished.
    let render_pass_static: &mut wgpu::RenderPass<'static> =
        unsafe { std::mem::transmute(&mut render_pass) };

    renderer.render(render_pass_static, paint_jobs, screen_descriptor);
}

/// Main application state holding all wgpu resources
pub struct App {
    /// Reference to the window
    window: Arc<Window>,
    /// The wgpu surface for presenting rendered frames
    surface: wgpu::Surface<'static>,
    /// The wgpu device for creating GPU resources
    device: wgpu::Device,
    /// The command queue for submitting GPU work
    queue: wgpu::Queue,
    /// Surface configuration (format, size, present mode)
    config: wgpu::SurfaceConfiguration,
    /// Present modes the surface supports
    present_modes: Vec<wgpu::PresentMode>,
    /// Current window size in physical pixels
    size: PhysicalSize<u32>,

    // Depth buffer for the scene pass (the view keeps the texture alive)
    depth_view: wgpu::TextureView,

    // Scene
    renderer: SceneRenderer,
    camera: OrbitCamera,
    model: GpuMesh,
    /// Source path of the displayed model (also set when the load failed and
    /// the fallback cube is showing, so the watcher can pick up a fix)
    model_path: Option<PathBuf>,
    watcher: Option<ModelWatcher>,

    // Input state
    drag_mode: DragMode,
    cursor: (f32, f32),

    // Frame timing
    profiler: FrameProfiler,
    last_update: Instant,

    // egui integration
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    // UI state
    pub menu_bar: MenuBar,

    // Settings
    pub settings: ViewerSettings,
}

impl App {
    /// Create a new App instance with initialized wgpu context.
    ///
    /// `initial_model` is loaded immediately; on failure (or when `None`) the
    /// fallback cube is shown instead.
    pub async fn new(
        window: Arc<Window>,
        settings: ViewerSettings,
        initial_model: Option<PathBuf>,
    ) -> Self {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to find suitable GPU adapter");

        tracing::info!("Using GPU: {}", adapter.get_info().name);
        tracing::info!("Backend: {:?}", adapter.get_info().backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Mesh Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        tracing::info!("Surface format: {:?}", surface_format);

        let present_modes = surface_caps.present_modes.clone();
        let present_mode = choose_present_mode(&present_modes, settings.vsync_enabled);
        tracing::info!("Present mode: {:?}", present_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };

        surface.configure(&device, &config);

        let depth_view = create_depth_texture(&device, config.width, config.height);

        // Scene renderer and camera
        let renderer = SceneRenderer::new(&device, surface_format);
        let mut camera = OrbitCamera::new();
        camera.set_pose(
            settings.camera_yaw,
            settings.camera_pitch,
            settings.camera_distance,
        );
        camera.set_aspect(config.width as f32 / config.height as f32);

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let mut style = (*egui_ctx.style()).clone();
        style.visuals.window_shadow = egui::epaint::Shadow::NONE;
        egui_ctx.set_style(style);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        // Start on the fallback cube; the initial model replaces it below
        let model = GpuMesh::upload(
            &device,
            &MeshData::cube(FALLBACK_CUBE_SIZE),
            "fallback cube",
            true,
        );
        renderer.set_material(&queue, &MaterialUniform::fallback());

        let mut app = Self {
            window,
            surface,
            device,
            queue,
            config,
            present_modes,
            size,
            depth_view,
            renderer,
            camera,
            model,
            model_path: None,
            watcher: None,
            drag_mode: DragMode::Idle,
            cursor: (0.0, 0.0),
            profiler: FrameProfiler::new(),
            last_update: Instant::now(),
            egui_ctx,
            egui_state,
            egui_renderer,
            menu_bar: MenuBar::new(),
            settings,
        };

        if let Some(path) = initial_model {
            app.load_model(&path);
        }

        app
    }

    /// Load a model file, replacing the displayed mesh.
    ///
    /// On failure the fallback cube is shown and the app keeps running; the
    /// file stays watched so a fixed version reloads automatically.
    pub fn load_model(&mut self, path: &Path) {
        match self.try_load_model(path) {
            Ok(()) => {
                self.settings.set_last_model(path);
                self.menu_bar.set_status(format!(
                    "Loaded {}",
                    path.file_name()
                        .map(|s| s.to_string_lossy().to_string())
                        .unwrap_or_default()
                ));
            }
            Err(e) => {
                tracing::error!("Failed to load model {}: {}", path.display(), e);
                self.install_fallback();
                self.menu_bar.set_status("Failed to load model");
            }
        }

        self.model_path = Some(path.to_path_buf());
        match ModelWatcher::new(path) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(e) => {
                tracing::warn!("Model hot-reload unavailable: {}", e);
                self.watcher = None;
            }
        }
    }

    fn try_load_model(&mut self, path: &Path) -> Result<(), ObjError> {
        let mut data = obj::load_obj_file(path)?;
        let scale = data
            .normalize_to_extent(TARGET_EXTENT)
            .ok_or(ObjError::Degenerate)?;

        let label = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        tracing::info!(
            vertices = data.vertices.len(),
            indices = data.indices.len(),
            scale,
            "Loaded model: {}",
            label
        );

        self.model = GpuMesh::upload(&self.device, &data, &label, false);
        self.renderer.set_material(&self.queue, &MaterialUniform::model());
        // The mesh is recentered on the origin; move the orbit target to match
        self.camera.set_target(Vec3::ZERO);
        Ok(())
    }

    /// Replace the displayed mesh with the fallback cube
    fn install_fallback(&mut self) {
        self.model = GpuMesh::upload(
            &self.device,
            &MeshData::cube(FALLBACK_CUBE_SIZE),
            "fallback cube",
            true,
        );
        self.renderer.set_material(&self.queue, &MaterialUniform::fallback());
        self.camera.set_target(Vec3::ZERO);
    }

    /// Per-frame update: camera damping and model hot-reload
    pub fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_update).as_secs_f32();
        self.last_update = now;

        self.camera.update(dt);

        let changed = self.watcher.as_mut().map(|w| w.poll()).unwrap_or(false);
        if changed {
            if let Some(path) = self.model_path.clone() {
                tracing::info!("Reloading model after file change");
                self.load_model(&path);
            }
        }
    }

    /// Handle window resize events
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            self.depth_view =
                create_depth_texture(&self.device, new_size.width, new_size.height);

            self.camera
                .set_aspect(new_size.width as f32 / new_size.height as f32);

            tracing::debug!("Resized to {}x{}", new_size.width, new_size.height);
        }
    }

    /// Handle winit window events for egui
    pub fn handle_window_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(&self.window, event);
        response.consumed
    }

    /// Handle a mouse button press
    pub fn on_mouse_down(&mut self, button: MouseButton) {
        match button {
            MouseButton::Left => self.drag_mode = DragMode::Rotate,
            MouseButton::Right => self.drag_mode = DragMode::Pan,
            _ => {}
        }
    }

    /// Handle a mouse button release
    pub fn on_mouse_up(&mut self, button: MouseButton) {
        let released = match button {
            MouseButton::Left => DragMode::Rotate,
            MouseButton::Right => DragMode::Pan,
            _ => DragMode::Idle,
        };
        if self.drag_mode == released {
            self.drag_mode = DragMode::Idle;
        }
    }

    /// Handle cursor movement, applying the active drag to the camera
    pub fn on_mouse_move(&mut self, x: f32, y: f32) {
        let dx = x - self.cursor.0;
        let dy = y - self.cursor.1;
        self.cursor = (x, y);

        match self.drag_mode {
            DragMode::Rotate => self.camera.on_rotate(dx, dy),
            DragMode::Pan => self.camera.on_pan(dx, dy),
            DragMode::Idle => {}
        }
    }

    /// Handle scroll wheel zoom
    pub fn on_scroll(&mut self, delta: f32) {
        self.camera.on_zoom(delta);
    }

    /// Reset the camera to its default pose
    pub fn reset_view(&mut self) {
        self.camera.reset();
    }

    /// Start a new frame: record timing
    pub fn begin_frame(&mut self) {
        self.profiler.begin_frame();
    }

    /// Render a frame: scene pass then egui overlay
    ///
    /// Returns true if settings were modified through the UI.
    pub fn render(&mut self) -> Result<bool, wgpu::SurfaceError> {
        // Apply a pacing change made through the View menu
        let desired = choose_present_mode(&self.present_modes, self.settings.vsync_enabled);
        if self.config.present_mode != desired {
            tracing::info!("Present mode: {:?}", desired);
            self.config.present_mode = desired;
            self.surface.configure(&self.device, &self.config);
        }

        // Begin egui frame
        let raw_input = self.egui_state.take_egui_input(&self.window);
        self.egui_ctx.begin_pass(raw_input);

        let fps = self.profiler.fps();
        let frame_time_ms = self.profiler.stats().avg_ms;
        let model_label = self.model.label().to_string();
        let settings_changed = self.menu_bar.render(
            &self.egui_ctx,
            &mut self.settings,
            &model_label,
            fps,
            frame_time_ms,
        );

        if self.settings.show_help {
            ui::show_help_overlay(&self.egui_ctx);
        }

        let full_output = self.egui_ctx.end_pass();

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        // Upload camera state for this frame
        self.renderer.update_camera(&self.queue, &self.camera);

        let output = self.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // Scene pass: clear, grid, model
        self.renderer.render(
            &mut encoder,
            &surface_view,
            &self.depth_view,
            &self.model,
            self.settings.show_grid,
        );

        // Update egui textures
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        // egui overlay on top of the scene
        render_egui_pass(
            &self.egui_renderer,
            &mut encoder,
            &surface_view,
            &paint_jobs,
            &screen_descriptor,
        );

        // Free egui textures
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(settings_changed)
    }

    /// Write the camera pose into settings and persist them
    pub fn persist_settings(&mut self) {
        self.settings.camera_yaw = self.camera.yaw();
        self.settings.camera_pitch = self.camera.pitch();
        self.settings.camera_distance = self.camera.distance();
        self.settings.window_width = self.size.width;
        self.settings.window_height = self.size.height;

        if let Err(e) = self.settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    // Getters
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn model_label(&self) -> &str {
        self.model.label()
    }

    pub fn has_fallback_model(&self) -> bool {
        self.model.is_fallback()
    }

    pub fn egui_wants_keyboard(&self) -> bool {
        self.egui_ctx.wants_keyboard_input()
    }

    pub fn egui_wants_pointer(&self) -> bool {
        self.egui_ctx.wants_pointer_input()
    }
}

/// Pick a present mode: Fifo for vsync, otherwise the lowest-latency mode
/// available (Immediate, then Mailbox, then Fifo).
fn choose_present_mode(available: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    if available.contains(&wgpu::PresentMode::Immediate) {
        wgpu::PresentMode::Immediate
    } else if available.contains(&wgpu::PresentMode::Mailbox) {
        wgpu::PresentMode::Mailbox
    } else {
        wgpu::PresentMode::Fifo
    }
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_present_mode_vsync() {
        let modes = vec![wgpu::PresentMode::Immediate, wgpu::PresentMode::Fifo];
        assert_eq!(choose_present_mode(&modes, true), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn test_choose_present_mode_manual() {
        let modes = vec![wgpu::PresentMode::Immediate, wgpu::PresentMode::Fifo];
        assert_eq!(
            choose_present_mode(&modes, false),
            wgpu::PresentMode::Immediate
        );

        let fifo_only = vec![wgpu::PresentMode::Fifo];
        assert_eq!(
            choose_present_mode(&fifo_only, false),
            wgpu::PresentMode::Fifo
        );
    }
}
