use anyhow::Result;
use clap::Parser;
use glam::{Mat4, Vec3};
use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use railview::camera::{strip_translation, Camera, CameraMode, Direction};
use railview::cli::Cli;
use railview::frame::Clock;
use railview::input::{Button, InputState};
use railview::renderer::{recovery_for, FrameMatrices, Renderer, SurfaceRecovery};
use railview::scene::Scene;

const WINDOW_WIDTH: u32 = 1920;
const WINDOW_HEIGHT: u32 = 1080;
const WINDOW_TITLE: &str = "Brasov to Bucharest";
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 3000.0;

struct App {
    assets: PathBuf,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    camera: Camera,
    input: InputState,
    scene: Scene,
    clock: Clock,
    mode: Option<CameraMode>,
}

impl App {
    fn new(assets: PathBuf) -> Self {
        Self {
            assets,
            window: None,
            renderer: None,
            camera: Camera::new(Vec3::new(0.0, 0.0, 3.0)),
            input: InputState::new(),
            scene: Scene::new(),
            clock: Clock::new(),
            mode: None,
        }
    }

    /// Applies held movement keys and the accumulated mouse/scroll deltas.
    fn apply_input(&mut self, dt: f32) {
        if self.input.is_down(Button::KeyW) {
            self.camera.process_keyboard(Direction::Forward, dt);
        }
        if self.input.is_down(Button::KeyS) {
            self.camera.process_keyboard(Direction::Backward, dt);
        }
        if self.input.is_down(Button::KeyA) {
            self.camera.process_keyboard(Direction::Left, dt);
        }
        if self.input.is_down(Button::KeyD) {
            self.camera.process_keyboard(Direction::Right, dt);
        }
        if self.input.is_down(Button::Space) {
            self.camera.process_keyboard(Direction::Up, dt);
        }
        if self.input.is_down(Button::Shift) {
            self.camera.process_keyboard(Direction::Down, dt);
        }
        if self.input.is_down(Button::KeyP) {
            log::info!("camera position: {:?}", self.camera.position);
        }

        // Mouse y grows downward; pushing the mouse up should raise pitch.
        let (dx, dy) = self.input.mouse_delta();
        self.camera.process_mouse_movement(dx, -dy);
        self.camera.process_mouse_scroll(self.input.scroll_delta());
    }

    /// One frame: timing, input, scene advance, draw, mode switch, skybox.
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.tick();
        self.apply_input(dt);

        self.scene.update();
        let draws = self.scene.draw_list();

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        // Models see the camera as it was when the frame started.
        let view = self.camera.view_matrix();
        let projection = Mat4::perspective_rh(
            self.camera.zoom.to_radians(),
            renderer.aspect_ratio(),
            NEAR_PLANE,
            FAR_PLANE,
        );

        // Mode switches land between the model draws and the skybox, so
        // the skybox alone picks up the repositioned camera this frame.
        if let Some(mode) = self.input.selected_mode() {
            self.mode = Some(mode);
        }
        if let Some(mode) = self.mode {
            mode.apply(&mut self.camera);
        }
        let sky_view = strip_translation(self.camera.view_matrix());

        let matrices = FrameMatrices {
            view,
            projection,
            sky_view,
        };
        if let Err(err) = renderer.render(&matrices, &draws) {
            match recovery_for(&err) {
                SurfaceRecovery::Reconfigure => {
                    if let Some(window) = &self.window {
                        renderer.resize(window.inner_size());
                    }
                }
                SurfaceRecovery::Exit => {
                    log::error!("out of GPU memory, exiting");
                    event_loop.exit();
                }
                SurfaceRecovery::Skip => log::warn!("frame skipped: {err}"),
            }
        }

        self.input.end_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(WINDOW_TITLE)
                .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT)),
        ) {
            Ok(w) => Arc::new(w),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        // Capture the cursor for mouse look; not every platform supports
        // locking, so fall back to confinement.
        if window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
            .is_err()
        {
            log::warn!("cursor grab unavailable");
        }
        window.set_cursor_visible(false);

        let renderer = match Renderer::new(window.clone(), &self.assets) {
            Ok(renderer) => renderer,
            Err(err) => {
                log::error!("failed to initialize renderer: {err:#}");
                event_loop.exit();
                return;
            }
        };

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.clock = Clock::new();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => self.tick(event_loop),
            other => self.input.process_event(&other),
        }
    }

    // Mouse look needs raw motion: with the cursor grabbed the OS pins
    // its position, so `CursorMoved` goes quiet while the device keeps
    // reporting deltas.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        self.input.process_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli.assets);

    log::info!("controls: WASD + Space/Shift to fly, mouse to look, 1-4 camera modes, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
