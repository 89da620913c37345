//! GPU state and frame orchestration.
//!
//! One [`GpuState`] owns the surface, device and the two-stage frame:
//! simulation output is drawn into the persistent trail texture (fade, then
//! particles), the trail is blitted to the swapchain, and overlay geometry
//! plus the control panel go on top.

#[cfg(feature = "egui")]
pub mod egui_integration;
pub mod particles;
pub mod trail;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

#[cfg(feature = "egui")]
use self::egui_integration::EguiLayer;
use self::particles::{InstanceBuffer, ParticleInstance, ParticlePipeline};
use self::trail::{TrailState, TRAIL_FORMAT};

use crate::error::{CaptureError, GpuError};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    screen_size: [f32; 2],
    fade_alpha: f32,
    _padding: f32,
}

/// Everything the renderer needs for one frame.
pub struct FrameInput<'a> {
    /// Live particles, already converted to draw instances.
    pub particles: &'a [ParticleInstance],
    /// Overlay geometry drawn on the surface after the blit (emitter ring).
    pub overlay: &'a [ParticleInstance],
    /// Opacity of the trail decay quad, `1 - history`.
    pub fade_alpha: f32,
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    trail: TrailState,
    particle_pipeline: ParticlePipeline,
    overlay_pipeline: ParticlePipeline,
    particle_instances: InstanceBuffer,
    overlay_instances: InstanceBuffer,
    #[cfg(feature = "egui")]
    pub egui: EguiLayer,
}

impl GpuState {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniforms = FrameUniforms {
            screen_size: [config.width as f32, config.height as f32],
            fade_alpha: 0.1,
            _padding: 0.0,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let trail = TrailState::new(
            &device,
            &uniform_layout,
            config.width,
            config.height,
            surface_format,
        );
        let particle_pipeline = ParticlePipeline::new(&device, &uniform_layout, TRAIL_FORMAT);
        let overlay_pipeline = ParticlePipeline::new(&device, &uniform_layout, surface_format);

        let particle_instances = InstanceBuffer::new(&device, 1024);
        let overlay_instances = InstanceBuffer::new(&device, 8);

        #[cfg(feature = "egui")]
        let egui = EguiLayer::new(&device, surface_format, &window);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            uniform_buffer,
            uniform_bind_group,
            trail,
            particle_pipeline,
            overlay_pipeline,
            particle_instances,
            overlay_instances,
            #[cfg(feature = "egui")]
            egui,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.trail
                .resize(&self.device, self.config.width, self.config.height);
        }
    }

    pub fn render(&mut self, frame: &FrameInput<'_>) -> Result<(), wgpu::SurfaceError> {
        let uniforms = FrameUniforms {
            screen_size: [self.config.width as f32, self.config.height as f32],
            fade_alpha: frame.fade_alpha.clamp(0.0, 1.0),
            _padding: 0.0,
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        self.particle_instances
            .upload(&self.device, &self.queue, frame.particles);
        self.overlay_instances
            .upload(&self.device, &self.queue, frame.overlay);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        #[cfg(feature = "egui")]
        let egui_paint = self.egui.take_frame();
        #[cfg(feature = "egui")]
        if let Some(paint) = &egui_paint {
            let screen = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.config.width, self.config.height],
                pixels_per_point: paint.pixels_per_point,
            };
            self.egui
                .prepare(&self.device, &self.queue, &mut encoder, paint, &screen);
        }

        // Accumulation pass: decay the old frame, then add this frame's
        // particles on top. The texture is loaded, not cleared, which is
        // what makes the trails persist.
        {
            let load = self.trail.take_load_op();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Trail Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.trail.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.trail.fade(&mut pass, &self.uniform_bind_group);
            if !frame.particles.is_empty() {
                self.particle_pipeline.draw(
                    &mut pass,
                    &self.uniform_bind_group,
                    &self.particle_instances,
                    frame.particles.len() as u32,
                );
            }
        }

        // Present pass: blit the trail buffer, then overlay and panel.
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Present Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.trail.blit(&mut pass);
            if !frame.overlay.is_empty() {
                self.overlay_pipeline.draw(
                    &mut pass,
                    &self.uniform_bind_group,
                    &self.overlay_instances,
                    frame.overlay.len() as u32,
                );
            }

            #[cfg(feature = "egui")]
            if let Some(paint) = &egui_paint {
                let screen = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [self.config.width, self.config.height],
                    pixels_per_point: paint.pixels_per_point,
                };
                self.egui.render_into(&mut pass, paint, &screen);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        #[cfg(feature = "egui")]
        if let Some(paint) = egui_paint {
            self.egui.cleanup(&paint);
        }

        Ok(())
    }

    /// Read the current trail buffer back for a screenshot.
    pub fn capture_trail(&self) -> Result<image::RgbaImage, CaptureError> {
        self.trail
            .read_back(&self.device, &self.queue, self.config.width, self.config.height)
    }
}
