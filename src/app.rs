use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::camera::PerspectiveCamera;
use crate::config::Config;
use crate::controls::OrbitControls;
use crate::core::{Button, Clock, Controller, FpsCounter, WinitController};
use crate::renderer::{FrameInfo, Renderer};
use crate::scene::Scene;
use crate::scenes::create_haunted_house_scene;

/// Build the scene with a seeded generator, or OS entropy when unseeded
pub fn build_scene(config: &Config) -> Scene {
    let mut rng = match config.seed {
        Some(seed) => {
            log::info!("Scattering rocks with seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };
    create_haunted_house_scene(config, &mut rng)
}

pub struct App {
    config: Config,
    scene: Scene,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    input: WinitController,
    clock: Clock,
    fps: FpsCounter,
}

impl App {
    pub fn new(config: Config) -> Self {
        let scene = build_scene(&config);
        let aspect = config.window.width as f32 / config.window.height as f32;

        let mut camera = PerspectiveCamera::from_config(&config.camera, aspect);
        camera.look_at(Vec3::ZERO);
        let controls = OrbitControls::from_config(&config.controls, Vec3::ZERO);

        Self {
            config,
            scene,
            window: None,
            renderer: None,
            camera,
            controls,
            input: WinitController::new(),
            clock: Clock::new(),
            fps: FpsCounter::default(),
        }
    }

    fn frame(&mut self) {
        let delta = self.clock.tick();
        if let Some(fps) = self.fps.tick(delta) {
            if self.config.show_ui {
                log::debug!("FPS: {:.1}", fps);
            }
        }

        let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
            return;
        };

        let viewport_height = window.inner_size().height as f32;
        self.controls
            .handle_input(&self.input, &self.camera, viewport_height);
        self.controls.update(&mut self.camera);
        self.input.reset_deltas();

        let frame = FrameInfo {
            fps: self.fps.fps(),
            camera_distance: self.controls.distance(&self.camera),
        };

        match renderer.render(&self.camera, window, frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                renderer.reconfigure();
            }
            Err(e) => log::error!("Render error: {}", e),
        }
    }

    fn resize(&mut self) {
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            let size = window.inner_size();
            renderer.resize(size, window.scale_factor());
            self.camera.set_aspect(size.width, size.height);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Haunted House")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window.width,
                    self.config.window.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(
            window.clone(),
            &self.scene,
            &self.config,
        )) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.camera.set_aspect(size.width, size.height);
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui see the event first
        let consumed = match (&mut self.renderer, &self.window) {
            (Some(renderer), Some(window)) => renderer.handle_event(window, &event),
            _ => false,
        };
        self.input.process_event(&event, consumed);

        if self.input.is_down(Button::Escape) {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => self.resize(),
            WindowEvent::RedrawRequested => self.frame(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
