//! Application shell: window, input, and the per-frame tick.
//!
//! The tick order is fixed: drain external control messages, advance the
//! clock, cull/spawn/update the population, then hand draw data to the GPU.
//! All of it runs on the event-loop thread; nothing here blocks.

use std::path::Path;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::control::{ControlInput, OSC_PORT};
use crate::error::AppError;
use crate::gpu::particles::{build_instances, emitter_ring, ParticleInstance};
use crate::gpu::{FrameInput, GpuState};
#[cfg(feature = "egui")]
use crate::interface::Interface;
use crate::params::Params;
use crate::population::Population;
use crate::time::FrameClock;
use crate::{capture, presets};

const WINDOW_TITLE: &str = "emberfield";
const WINDOW_WIDTH: u32 = 1024;
const WINDOW_HEIGHT: u32 = 768;

/// The visualizer application.
pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    params: Params,
    population: Population,
    control: ControlInput,
    clock: FrameClock,
    rng: SmallRng,
    show_panel: bool,
    #[cfg(feature = "egui")]
    interface: Interface,
}

impl App {
    pub fn new() -> Self {
        Self {
            window: None,
            gpu: None,
            params: Params::default(),
            population: Population::new(),
            control: ControlInput::new(OSC_PORT),
            clock: FrameClock::new(),
            rng: SmallRng::from_entropy(),
            show_panel: true,
            #[cfg(feature = "egui")]
            interface: Interface::new(),
        }
    }

    /// Create the event loop and run until the window closes.
    pub fn run() -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        let mut app = App::new();
        event_loop.run_app(&mut app)?;
        Ok(())
    }

    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        // All waiting control messages land before physics, so the whole
        // tick sees one parameter snapshot.
        self.control.drain(&mut self.params);

        let (elapsed, _) = self.clock.update();
        let dt = self.clock.clamped_delta();
        self.population.tick(dt, &self.params, &mut self.rng);

        let instances =
            build_instances(self.population.particles(), &self.params, elapsed, &mut self.rng);
        let overlay: Vec<ParticleInstance> = if self.show_panel {
            vec![emitter_ring(&self.params)]
        } else {
            Vec::new()
        };

        #[cfg(feature = "egui")]
        if let Some(window) = &self.window {
            gpu.egui.begin_frame(window);
            if self.show_panel {
                self.interface.ui(
                    gpu.egui.ctx(),
                    &mut self.params,
                    self.population.len(),
                    self.clock.fps(),
                );
            }
            gpu.egui.end_frame(window);
        }

        let frame = FrameInput {
            particles: &instances,
            overlay: &overlay,
            fade_alpha: (1.0 - self.params.history).clamp(0.0, 1.0),
        };

        match gpu.render(&frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                let size = winit::dpi::PhysicalSize {
                    width: gpu.config.width,
                    height: gpu.config.height,
                };
                gpu.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("out of GPU memory");
                event_loop.exit();
            }
            Err(e) => warn!("render error: {e:?}"),
        }
    }

    fn handle_key(&mut self, key: &Key, repeat: bool) {
        if repeat {
            return;
        }
        match key {
            Key::Named(NamedKey::Enter) => {
                self.show_panel = !self.show_panel;
            }
            Key::Named(NamedKey::Space) => self.capture_frame(),
            Key::Character(text) => {
                let dir = Path::new(".");
                if let Some(index) = load_index(text.as_str()) {
                    presets::load(dir, &mut self.params, index);
                } else if let Some(index) = save_index(text.as_str()) {
                    presets::save(dir, &self.params, index);
                }
            }
            _ => {}
        }
    }

    fn capture_frame(&mut self) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        match gpu.capture_trail() {
            Ok(image) => match capture::save_random(&image, &mut self.rng) {
                Ok(path) => info!(path = %path.display(), "frame captured"),
                Err(e) => warn!("frame capture failed: {e}"),
            },
            Err(e) => warn!("frame capture failed: {e}"),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Digit keys load the matching preset slot.
fn load_index(text: &str) -> Option<u8> {
    match text {
        "1" => Some(1),
        "2" => Some(2),
        "3" => Some(3),
        "4" => Some(4),
        "5" => Some(5),
        "6" => Some(6),
        "7" => Some(7),
        "8" => Some(8),
        "9" => Some(9),
        _ => None,
    }
}

/// Shifted digit keys (US layout symbols) save the matching slot.
fn save_index(text: &str) -> Option<u8> {
    match text {
        "!" => Some(1),
        "@" => Some(2),
        "#" => Some(3),
        "$" => Some(4),
        "%" => Some(5),
        "^" => Some(6),
        "&" => Some(7),
        "*" => Some(8),
        "(" => Some(9),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        // Emitter sits at the window center, established once at startup.
        let size = window.inner_size();
        self.params.emitter_center =
            glam::Vec2::new(size.width as f32 / 2.0, size.height as f32 / 2.0);

        match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        let consumed = match (&self.window, &mut self.gpu) {
            (Some(window), Some(gpu)) => gpu.egui.on_window_event(window, &event),
            _ => false,
        };
        #[cfg(not(feature = "egui"))]
        let consumed = false;

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if !consumed => {
                if event.state == ElementState::Pressed {
                    self.handle_key(&event.logical_key, event.repeat);
                }
            }
            WindowEvent::RedrawRequested => {
                self.tick(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_key_bindings() {
        assert_eq!(load_index("1"), Some(1));
        assert_eq!(load_index("9"), Some(9));
        assert_eq!(load_index("0"), None);
        assert_eq!(save_index("!"), Some(1));
        assert_eq!(save_index("("), Some(9));
        assert_eq!(save_index("1"), None);
    }
}
