//! Mesh Viewer - Main Entry Point
//!
//! A cross-platform 3D model viewer: loads an OBJ mesh, normalizes it to a
//! fixed viewing scale and renders it with orbit/pan/zoom camera controls.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use mesh_viewer::settings::ViewerSettings;
use mesh_viewer::telemetry::{init_logging, LogConfig};
use mesh_viewer::ui::FileAction;
use mesh_viewer::App;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "Mesh Viewer";

/// Result from an async file dialog
struct FileDialogResult {
    path: Option<PathBuf>,
}

/// Manages async file dialogs that run on background threads
struct AsyncFileDialogs {
    /// Receiver for completed dialogs
    receiver: Receiver<FileDialogResult>,
    /// Sender to pass to spawned threads
    sender: Sender<FileDialogResult>,
    /// Whether a dialog is currently open
    dialog_open: bool,
}

impl AsyncFileDialogs {
    fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            receiver,
            sender,
            dialog_open: false,
        }
    }

    /// Spawn an open-model dialog on a background thread
    fn spawn_open_model(&mut self) {
        if self.dialog_open {
            return;
        }
        self.dialog_open = true;
        let sender = self.sender.clone();
        std::thread::spawn(move || {
            let path = rfd::FileDialog::new()
                .add_filter("OBJ model", &["obj"])
                .set_title("Open Model")
                .pick_file();
            let _ = sender.send(FileDialogResult { path });
        });
    }

    /// Poll for completed dialogs (non-blocking)
    fn poll(&mut self) -> Option<FileDialogResult> {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.dialog_open = false;
                Some(result)
            }
            Err(_) => None,
        }
    }

    /// Check if a dialog is currently open
    fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }
}

/// Application state machine
enum AppState {
    /// Initial state before window is created
    Uninitialized {
        initial_settings: ViewerSettings,
        initial_model: Option<PathBuf>,
    },
    /// Window and graphics context are ready
    Running {
        window: Arc<Window>,
        app: App,
        file_dialogs: AsyncFileDialogs,
    },
}

/// Main application handler implementing winit's ApplicationHandler trait
struct ViewerApp {
    state: AppState,
    next_redraw_at: Instant,
    last_target_fps: u32,
}

impl ViewerApp {
    fn new(settings: ViewerSettings, initial_model: Option<PathBuf>) -> Self {
        let initial_target_fps = settings.target_fps;
        Self {
            state: AppState::Uninitialized {
                initial_settings: settings,
                initial_model,
            },
            next_redraw_at: Instant::now(),
            last_target_fps: initial_target_fps,
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Only initialize if we haven't already
        if let AppState::Uninitialized {
            initial_settings,
            initial_model,
        } = &self.state
        {
            tracing::info!("Creating window...");

            let settings = initial_settings.clone();
            let model = initial_model.clone();

            let window_attributes = WindowAttributes::default()
                .with_title(WINDOW_TITLE)
                .with_inner_size(LogicalSize::new(
                    settings.window_width,
                    settings.window_height,
                ));

            let window = Arc::new(
                event_loop
                    .create_window(window_attributes)
                    .expect("Failed to create window"),
            );
            window.focus_window();

            tracing::info!(
                "Window created: {}x{}",
                window.inner_size().width,
                window.inner_size().height
            );

            tracing::info!("Initializing wgpu and egui...");
            let app = pollster::block_on(App::new(window.clone(), settings, model));

            tracing::info!("Mesh Viewer ready!");
            tracing::info!("Press ESC to exit, F11 for fullscreen");

            self.state = AppState::Running {
                window,
                app,
                file_dialogs: AsyncFileDialogs::new(),
            };
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        // Only handle events if we're running
        let AppState::Running {
            window,
            app,
            file_dialogs,
        } = &mut self.state
        else {
            return;
        };

        if window.id() != window_id {
            return;
        }

        // Let egui handle the event first
        let egui_consumed = app.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting...");
                app.persist_settings();
                event_loop.exit();
            }

            // Handle keyboard input (only if egui doesn't want it)
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } if !app.egui_wants_keyboard() => {
                match key_code {
                    KeyCode::Escape => {
                        tracing::info!("Exit requested via Escape");
                        app.persist_settings();
                        event_loop.exit();
                    }
                    // F11 to toggle fullscreen
                    KeyCode::F11 => {
                        if window.fullscreen().is_some() {
                            window.set_fullscreen(None);
                            tracing::info!("Exiting fullscreen");
                        } else {
                            window
                                .set_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
                            tracing::info!("Entering fullscreen");
                        }
                    }
                    // 0 or Home to reset the camera
                    KeyCode::Digit0 | KeyCode::Home => {
                        app.reset_view();
                    }
                    _ => {}
                }
            }

            WindowEvent::Resized(physical_size) => {
                app.resize(physical_size);
            }

            // Mouse buttons drive the orbit controls when egui doesn't claim
            // the pointer; releases always reach the app so drags can't stick
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    if !egui_consumed && !app.egui_wants_pointer() {
                        app.on_mouse_down(button);
                    }
                }
                ElementState::Released => {
                    app.on_mouse_up(button);
                }
            },

            WindowEvent::CursorMoved { position, .. } => {
                app.on_mouse_move(position.x as f32, position.y as f32);
            }

            // Scroll wheel zoom (only when egui doesn't consume it)
            WindowEvent::MouseWheel { delta, .. } if !egui_consumed => {
                let scroll_amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 50.0) as f32,
                };
                if scroll_amount.abs() > 0.001 {
                    app.on_scroll(scroll_amount);
                }
            }

            WindowEvent::RedrawRequested => {
                // Pending menu action -> spawn the async dialog
                if let Some(FileAction::OpenModel) = app.menu_bar.take_pending_action() {
                    if !file_dialogs.is_dialog_open() {
                        file_dialogs.spawn_open_model();
                    }
                }

                // Poll for completed file dialogs
                if let Some(result) = file_dialogs.poll() {
                    if let Some(path) = result.path {
                        app.load_model(&path);
                    }
                }

                app.begin_frame();
                app.update();

                match app.render() {
                    Ok(settings_changed) => {
                        if settings_changed {
                            // Redraw pacing reads `app.settings` directly
                            // (see `about_to_wait`)
                            tracing::debug!("Settings changed");
                        }
                    }
                    Err(wgpu::SurfaceError::Lost) => {
                        tracing::warn!("Surface lost, reconfiguring...");
                        app.resize(app.size());
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("Out of GPU memory!");
                        event_loop.exit();
                    }
                    Err(e) => {
                        tracing::warn!("Surface error: {:?}", e);
                    }
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Running { window, app, .. } = &mut self.state else {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        };

        // VSYNC mode: let the display control timing via Fifo present mode
        if app.settings.vsync_enabled {
            window.request_redraw();
            event_loop.set_control_flow(ControlFlow::Poll);
            return;
        }

        // Manual FPS control mode: use precise frame timing
        let target_fps = app.settings.target_fps.max(1);
        if target_fps != self.last_target_fps {
            self.last_target_fps = target_fps;
            self.next_redraw_at = Instant::now();
        }

        // Integer nanoseconds to eliminate floating-point drift
        let frame_nanos = 1_000_000_000u64 / target_fps as u64;
        let frame_duration = Duration::from_nanos(frame_nanos);

        let now = Instant::now();

        // Check if we're within 2ms of target - if so, spin-wait for precision
        let spin_threshold = Duration::from_micros(2000);
        if now < self.next_redraw_at {
            if self.next_redraw_at.duration_since(now) <= spin_threshold {
                // Spin-wait the final microseconds
                while Instant::now() < self.next_redraw_at {
                    std::hint::spin_loop();
                }
            } else {
                // Still waiting - wake 1ms early next time
                let wake_at = self
                    .next_redraw_at
                    .checked_sub(Duration::from_micros(1000))
                    .unwrap_or(self.next_redraw_at);
                event_loop.set_control_flow(ControlFlow::WaitUntil(wake_at));
                return;
            }
        }

        // Time to render
        window.request_redraw();
        self.next_redraw_at += frame_duration;

        // Reset if more than 2 frames behind
        if Instant::now() > self.next_redraw_at + frame_duration * 2 {
            self.next_redraw_at = Instant::now() + frame_duration;
        }

        // Schedule next wake 1ms early
        let wake_at = self
            .next_redraw_at
            .checked_sub(Duration::from_micros(1000))
            .unwrap_or(self.next_redraw_at);
        event_loop.set_control_flow(ControlFlow::WaitUntil(wake_at));
    }
}

fn main() {
    // Keep the guard alive for the program duration
    let _log_guard = match init_logging(&LogConfig::default()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("Mesh Viewer v{}", env!("CARGO_PKG_VERSION"));

    let settings = ViewerSettings::load();

    // Model to show: CLI argument, then the last opened model, then the
    // bundled default asset
    let cli_model = std::env::args().nth(1).map(PathBuf::from);
    let initial_model = cli_model.or_else(|| settings.last_model()).or_else(|| {
        let bundled = PathBuf::from("assets/base.obj");
        bundled.exists().then_some(bundled)
    });

    match &initial_model {
        Some(path) => tracing::info!("Opening model: {}", path.display()),
        None => tracing::warn!("No model to open, showing fallback cube"),
    }

    let event_loop = EventLoop::new().expect("Failed to create event loop");

    // Default to sleeping; we explicitly schedule redraws in `about_to_wait`.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut viewer = ViewerApp::new(settings, initial_model);
    event_loop.run_app(&mut viewer).expect("Event loop error");
}
