use std::collections::HashSet;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use log::{debug, error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::camera::Camera;
use crate::config::Settings;
use crate::error::Result;
use crate::grid::Grid;
use crate::player::{InputState, Viewer};
use crate::raster::Framebuffer;
use crate::scaler::SurfaceScaler;
use crate::texture::Texture;

mod camera;
mod caster;
mod config;
mod error;
mod grid;
mod player;
mod raster;
mod renderer;
mod scaler;
mod texture;

/// Ticks longer than this are dropped instead of simulated.
const MAX_TICK_SECONDS: f64 = 0.2;

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    settings: Settings,
    grid: Grid,
    viewer: Viewer,
    camera: Option<Camera>,
    texture: Texture,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal buffer at half the window size
    frame: Framebuffer,
    scaler: SurfaceScaler,

    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
}

impl App {
    fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (x, y) = settings.start_position();
        let grid = Grid::randomize(
            settings.map_size,
            settings.wall_probability,
            Some((x as usize, y as usize)),
            &mut rng,
        )?;
        info!(
            "Map {0}x{0} with {1} walls, start at ({x:.1}, {y:.1})",
            grid.size(),
            grid.wall_count()
        );

        Ok(Self {
            window: None,
            surface: None,
            viewer: Viewer::new(x, y, settings.start_direction),
            grid,
            settings,
            camera: None,
            texture: Texture::bricks(),
            frame_counter: 0,
            last_fps_print: Instant::now(),
            frame: Framebuffer::new(0, 0),
            scaler: SurfaceScaler::empty(),
            keys_down: HashSet::new(),
            last_tick: Instant::now(),
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("Grid Raycaster")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Rc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        let surface = match surface {
            Ok(surface) => surface,
            Err(e) => {
                error!("Failed to create drawing surface: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.rebuild_viewport(size.width as usize, size.height as usize);

        self.surface = Some(surface);
        self.last_tick = Instant::now();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => {
                if self.tick() {
                    self.draw(id);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_viewport(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl App {
    fn input(&self) -> InputState {
        let held = |a: KeyCode, b: KeyCode| self.keys_down.contains(&a) || self.keys_down.contains(&b);
        InputState {
            left: held(KeyCode::ArrowLeft, KeyCode::KeyA),
            right: held(KeyCode::ArrowRight, KeyCode::KeyD),
            forward: held(KeyCode::ArrowUp, KeyCode::KeyW),
            backward: held(KeyCode::ArrowDown, KeyCode::KeyS),
        }
    }

    /// Moves the viewer. Returns false when the tick is dropped and should not render.
    fn tick(&mut self) -> bool {
        let now = Instant::now();
        let seconds = now.duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;
        if seconds >= MAX_TICK_SECONDS {
            debug!("Dropping {seconds:.3}s tick");
            return false;
        }

        let input = self.input();
        self.viewer.update(&input, &self.grid, seconds);
        true
    }

    fn draw(&mut self, id: WindowId) {
        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return,
        };
        let Some(camera) = &self.camera else {
            return;
        };

        let size = window.inner_size();
        let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return; // Minimized window, skip drawing
        };

        if let Err(e) = surface.resize(dw, dh) {
            error!("Surface resize failed: {e}");
            return;
        }

        self.frame.clear();
        let commands = renderer::render(camera, &self.viewer, &self.grid);
        self.frame.execute(&commands, &self.texture);

        let mut buf = match surface.buffer_mut() {
            Ok(buf) => buf,
            Err(e) => {
                error!("Surface buffer unavailable: {e}");
                return;
            }
        };
        self.scaler.stretch(&mut buf, &self.frame.pixels);
        if let Err(e) = buf.present() {
            error!("Present failed: {e}");
        }

        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            debug!(
                "FPS: {:.1} ({} draw commands)",
                self.frame_counter as f32 / elapsed,
                commands.len()
            );
            self.frame_counter = 0;
            self.last_fps_print = now;
        }
    }

    fn rebuild_viewport(&mut self, dst_w: usize, dst_h: usize) {
        if dst_w == 0 || dst_h == 0 {
            return; // Minimized, keep the previous viewport
        }
        let (w, h) = ((dst_w / 2).max(1), (dst_h / 2).max(1));

        self.camera = match Camera::new(w, h, self.settings.resolution, self.settings.focal_length)
        {
            Ok(camera) => Some(camera.with_range(self.settings.range, self.settings.light_range)),
            Err(e) => {
                error!("Camera rebuild failed: {e}");
                None
            }
        };
        self.frame = Framebuffer::new(w, h);
        self.scaler = SurfaceScaler::new(dst_w, dst_h, w, h);
        debug!("Viewport {w}x{h} stretched to {dst_w}x{dst_h}");
    }
}

fn run(settings: Settings) -> Result<()> {
    let event_loop = EventLoop::new()?;
    // Redraw continuously; each frame requests the next one
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings)?;
    event_loop.run_app(&mut app)?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env();
    info!("Grid Raycaster v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Resolution {} rays, focal length {}, range {}",
        settings.resolution, settings.focal_length, settings.range
    );

    if let Err(e) = run(settings) {
        error!("{e}");
        std::process::exit(1);
    }
}
