use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
pub use winit::keyboard::KeyCode;
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::camera::CameraUniform;
use crate::input::InputState;
use crate::renderer::Renderer;

/// Longest frame step handed to `update`; longer stalls are clamped.
const MAX_FRAME_DT: f32 = 0.25;

// ── Game trait ──────────────────────────────────────────────────────────────

/// Per-frame callbacks: `update` then `render`, once each per redraw.
pub trait Game {
    fn on_enter(&mut self, _engine: &mut Engine) {}
    fn update(&mut self, engine: &mut Engine);
    /// Draw through `engine.renderer`; the recorded calls are submitted
    /// with the view set by [`Engine::set_view`].
    fn render(&mut self, engine: &mut Engine);
}

// ── Engine ──────────────────────────────────────────────────────────────────

pub struct Engine {
    /// GPU backend; also the `DrawSurface` games draw into.
    pub renderer: Renderer,
    pub input: InputState,
    view: CameraUniform,
    dt: f32,
    tick: u64,
    quit_requested: bool,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            input: InputState::new(),
            view: CameraUniform::identity(),
            dt: 0.0,
            tick: 0,
            quit_requested: false,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    /// Seconds since the previous frame.
    pub fn dt(&self) -> f32 { self.dt }
    pub fn tick(&self) -> u64 { self.tick }

    pub fn is_key_held(&self, key: KeyCode) -> bool { self.input.is_key_held(key) }
    pub fn is_key_pressed(&self, key: KeyCode) -> bool { self.input.is_key_pressed(key) }
    pub fn is_key_released(&self, key: KeyCode) -> bool { self.input.is_key_released(key) }

    /// World matrix for this frame's draws.
    pub fn set_view(&mut self, view: CameraUniform) {
        self.view = view;
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }
}

// ── EngineBuilder ───────────────────────────────────────────────────────────

pub struct EngineBuilder {
    title: String,
    width: u32,
    height: u32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            title: "crawler".into(),
            width: 1024,
            height: 768,
        }
    }
}

impl EngineBuilder {
    pub fn with_title(mut self, title: &str) -> Self { self.title = title.into(); self }
    pub fn with_size(mut self, width: u32, height: u32) -> Self { self.width = width; self.height = height; self }

    /// Open the window and drive `game` until the window closes or the game
    /// asks to quit.
    pub fn run(self, game: impl Game + 'static) -> Result<(), EventLoopError> {
        let event_loop = EventLoop::new()?;
        let mut app = App {
            config: self,
            game: Box::new(game),
            engine: None,
            last_instant: None,
        };
        event_loop.run_app(&mut app)
    }
}

// ── App (winit ApplicationHandler) ──────────────────────────────────────────

struct App {
    config: EngineBuilder,
    game: Box<dyn Game>,
    engine: Option<Engine>,
    last_instant: Option<Instant>,
}

impl App {
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(engine) = self.engine.as_mut() else { return };

        let now = Instant::now();
        engine.dt = match self.last_instant {
            Some(prev) => now.duration_since(prev).as_secs_f32().min(MAX_FRAME_DT),
            None => 0.0,
        };
        self.last_instant = Some(now);
        engine.tick += 1;

        self.game.update(engine);
        if engine.quit_requested {
            event_loop.exit();
            return;
        }

        engine.renderer.begin_frame();
        self.game.render(engine);
        match engine.renderer.render_frame(&engine.view) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = engine.renderer.window.inner_size();
                engine.renderer.resize(size);
            }
            Err(e) => log::error!("render error: {e}"),
        }

        engine.input.clear_frame_state();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(self.config.width, self.config.height))
            .with_resizable(false);
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("unable to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        let renderer = pollster::block_on(Renderer::new(window));
        let mut engine = Engine::new(renderer);

        self.game.on_enter(&mut engine);
        self.engine = Some(engine);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(engine) = self.engine.as_ref() {
            engine.renderer.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.renderer.resize(size);
                }
            }

            WindowEvent::RedrawRequested => self.frame(event_loop),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let Some(engine) = self.engine.as_mut() else { return };
                match state {
                    ElementState::Pressed => engine.input.key_down(code),
                    ElementState::Released => engine.input.key_up(code),
                }
            }

            _ => {}
        }
    }
}
