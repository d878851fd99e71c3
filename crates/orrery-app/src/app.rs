//! Window creation and event handling via winit.
//!
//! All mutable shell state (camera, simulation speed, polygon mode, cursor
//! tracking) lives here; the simulation core stays a self-contained value.

use std::sync::Arc;

use tracing::{error, info, trace};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use orrery_config::Config;
use orrery_render::{OrbitCamera, frame_instances};
use orrery_sim::CelestialSystem;

use crate::game_loop::{FIXED_DT, GameLoop};
use crate::renderer::Renderer;

/// Returns [`WindowAttributes`] based on the given configuration.
fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Application state driving the simulation and renderer from winit events.
pub struct App {
    config: Config,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    game_loop: GameLoop,
    system: CelestialSystem,
    camera: OrbitCamera,

    simulation_speed: f32,
    wireframe: bool,
    steering: bool,
    cursor: (f64, f64),
    window_size: (u32, u32),

    frames_since_title: u32,
    last_title_update: std::time::Instant,
}

impl App {
    /// Build the application from config: constructs the celestial system
    /// and the camera, but defers window/GPU creation to `resumed`.
    pub fn new(config: Config) -> Result<Self, orrery_sim::SimError> {
        let system = CelestialSystem::new(config.simulation.initial_scale_factor)?;
        let camera = OrbitCamera {
            distance: config.camera.distance,
            accel: config.camera.accel,
            fov_y: config.camera.fov_deg.to_radians(),
            aspect_ratio: config.window.width as f32 / config.window.height.max(1) as f32,
            near: config.camera.near,
            far: config.camera.far,
            ..OrbitCamera::default()
        };
        Ok(Self {
            simulation_speed: config.simulation.simulation_speed,
            wireframe: config.debug.wireframe_mode,
            window_size: (config.window.width, config.window.height),
            config,
            window: None,
            renderer: None,
            game_loop: GameLoop::new(),
            system,
            camera,
            steering: false,
            cursor: (0.0, 0.0),
            frames_since_title: 0,
            last_title_update: std::time::Instant::now(),
        })
    }

    fn report_speed(&self) {
        // One tick is a simulated minute, so ticks per wall second / 60 is
        // simulated hours per second.
        let hours_per_second =
            self.config.simulation.ticks_per_step * self.simulation_speed / 60.0 / FIXED_DT as f32;
        info!("simulation speed: {hours_per_second:.2} hours per second");
    }

    fn handle_key(&mut self, key: KeyCode, event_loop: &ActiveEventLoop) {
        match key {
            KeyCode::Escape | KeyCode::KeyQ => {
                info!("quit requested");
                event_loop.exit();
            }
            KeyCode::ArrowUp => {
                self.system.adjust_scale(self.config.simulation.scale_step);
                info!("simulation scale: {:.2}", self.system.scale_factor());
            }
            KeyCode::ArrowDown => {
                self.system.adjust_scale(-self.config.simulation.scale_step);
                info!("simulation scale: {:.2}", self.system.scale_factor());
            }
            KeyCode::ArrowRight => {
                self.simulation_speed += self.config.simulation.speed_step;
                self.report_speed();
            }
            KeyCode::ArrowLeft => {
                self.simulation_speed -= self.config.simulation.speed_step;
                self.report_speed();
            }
            KeyCode::KeyM => {
                match &self.renderer {
                    Some(r) if r.supports_wireframe() => {
                        self.wireframe = !self.wireframe;
                        info!(wireframe = self.wireframe, "polygon mode toggled");
                    }
                    _ => info!("wireframe unsupported on this adapter"),
                }
            }
            _ => {}
        }
    }

    /// Normalized cursor displacement from the window center, in `[-1, 1]`.
    fn cursor_displacement(&self) -> (f32, f32) {
        let half_w = self.window_size.0 as f64 / 2.0;
        let half_h = self.window_size.1 as f64 / 2.0;
        (
            ((self.cursor.0 - half_w) / half_w) as f32,
            ((self.cursor.1 - half_h) / half_h) as f32,
        )
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let ticks_per_step = self.config.simulation.ticks_per_step;
        let speed = self.simulation_speed;
        let steering = self.steering;
        let displacement = self.cursor_displacement();

        let system = &mut self.system;
        let camera = &mut self.camera;
        self.game_loop.tick(|_dt| {
            if steering {
                camera.steer(displacement.0, displacement.1);
            }
            system.update(ticks_per_step * speed);
        });

        if tracing::enabled!(tracing::Level::TRACE) {
            let earth = self.system.body(3);
            trace!(
                orbit_angle = earth.orbit_angle(),
                position = ?earth.rel_position(),
                velocity = ?earth.rel_velocity(),
                "earth state"
            );
        }

        if let Some(renderer) = &mut self.renderer {
            let instances = frame_instances(&self.system);
            if let Err(e) = renderer.render(&self.camera.to_uniform(), &instances, self.wireframe)
            {
                error!("frame failed: {e}");
                event_loop.exit();
                return;
            }
        }

        self.update_title();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Refresh the FPS readout in the window title about once a second.
    fn update_title(&mut self) {
        self.frames_since_title += 1;
        let elapsed = self.last_title_update.elapsed().as_secs_f64();
        if elapsed >= 1.0 {
            let fps = self.frames_since_title as f64 / elapsed;
            if let Some(window) = &self.window {
                window.set_title(&format!("{} ({fps:.0} fps)", self.config.window.title));
            }
            self.frames_since_title = 0;
            self.last_title_update = std::time::Instant::now();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = window_attributes_from_config(&self.config);
            let window = match event_loop.create_window(attrs) {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    error!("failed to create window: {e}");
                    event_loop.exit();
                    return;
                }
            };

            let size = window.inner_size();
            self.window_size = (size.width, size.height);
            self.camera
                .set_aspect_ratio(size.width as f32, size.height as f32);

            match pollster::block_on(Renderer::new(
                window.clone(),
                self.system.mesh(),
                self.system.body_count(),
                self.config.window.vsync,
            )) {
                Ok(renderer) => self.renderer = Some(renderer),
                Err(e) => {
                    error!("GPU initialization failed: {e}");
                    event_loop.exit();
                    return;
                }
            }

            info!(
                vertices = self.system.mesh().num_vertices(),
                indices = self.system.mesh().num_indices(),
                bodies = self.system.body_count(),
                "scene uploaded"
            );
            self.report_speed();

            window.request_redraw();
            self.window = Some(window);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.window_size = (new_size.width, new_size.height);
                self.camera
                    .set_aspect_ratio(new_size.width as f32, new_size.height as f32);
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && let PhysicalKey::Code(key) = event.physical_key
                {
                    self.handle_key(key, event_loop);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Right {
                    self.steering = state == ElementState::Pressed;
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 20.0) as f32,
                };
                self.camera.zoom(scroll);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

/// Create the event loop and run the application until exit.
pub fn run(config: Config) {
    let event_loop = EventLoop::new().expect("failed to create event loop");
    let mut app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!("failed to construct celestial system: {e}");
            std::process::exit(1);
        }
    };
    event_loop.run_app(&mut app).expect("event loop failed");
}
