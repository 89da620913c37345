//! Instanced particle drawing.
//!
//! Every particle becomes one instanced quad; the fragment shader carves the
//! configured shape out of it with a distance test. A single draw produces
//! both the optionally filled interior (per-particle random alpha) and the
//! solid outline on top, mirroring the fill-then-outline draw order of the
//! compositor.

use bytemuck::{Pod, Zeroable};
use rand::rngs::SmallRng;
use rand::Rng;
use wgpu::util::DeviceExt;

use crate::params::Params;
use crate::particle::Particle;
use crate::visuals::{pulsate_size, with_hue, ParticleShape};

const PARTICLE_SHADER: &str = r#"
struct FrameUniforms {
    screen_size: vec2<f32>,
    fade_alpha: f32,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

struct InstanceIn {
    @location(0) center: vec2<f32>,
    @location(1) size_line: vec2<f32>,
    @location(2) outline: vec4<f32>,
    @location(3) fill: vec4<f32>,
    @location(4) shape: u32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) outline: vec4<f32>,
    @location(2) fill: vec4<f32>,
    @location(3) @interpolate(flat) shape: u32,
    @location(4) edge: f32,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, in: InstanceIn) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let corner = quad_vertices[vertex_index];
    let half_size = max(in.size_line.x, 0.5);
    let pixel = in.center + corner * half_size;
    let ndc = vec2<f32>(
        pixel.x / frame.screen_size.x * 2.0 - 1.0,
        1.0 - pixel.y / frame.screen_size.y * 2.0,
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.uv = corner;
    out.outline = in.outline;
    out.fill = in.fill;
    out.shape = in.shape;
    out.edge = clamp(in.size_line.y / half_size, 0.0, 2.0);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var d: f32;
    if in.shape == 1u {
        d = max(abs(in.uv.x), abs(in.uv.y));
    } else {
        d = length(in.uv);
    }
    if d > 1.0 {
        discard;
    }
    if d >= 1.0 - in.edge {
        return in.outline;
    }
    if in.fill.a <= 0.0 {
        discard;
    }
    return in.fill;
}
"#;

/// Per-instance data for one drawn shape.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Center in window pixels.
    pub center: [f32; 2],
    /// Radius (circle) or half-extent (rectangle) in pixels.
    pub size: f32,
    /// Outline width in pixels.
    pub line_width: f32,
    /// Outline color, straight alpha.
    pub outline: [f32; 4],
    /// Interior color; alpha 0 disables the fill entirely.
    pub fill: [f32; 4],
    /// 0 = circle, 1 = rectangle.
    pub shape: u32,
    pub _pad: [u32; 3],
}

impl ParticleInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32x4,
        3 => Float32x4,
        4 => Uint32,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Translate the live population into draw instances.
///
/// Draw size is derived fresh each frame: the pulsate effect never writes
/// back into the shared parameters. Fill alpha is re-rolled per particle per
/// frame, which is what produces the flicker when fill is on.
pub fn build_instances(
    particles: &[Particle],
    params: &Params,
    elapsed: f32,
    rng: &mut SmallRng,
) -> Vec<ParticleInstance> {
    let shape = params.shape_kind().index();
    let fill_enabled = params.fill_enabled();
    let pulsate = params.pulsate_enabled();
    let base_color = params.base_color();

    particles
        .iter()
        .filter(|p| p.live)
        .map(|p| {
            let size = if pulsate {
                pulsate_size(params.size, elapsed, rng)
            } else {
                params.size
            };
            let color = with_hue(base_color, p.age_fraction());
            let fill_alpha = if fill_enabled { rng.gen::<f32>() } else { 0.0 };
            ParticleInstance {
                center: p.pos.to_array(),
                size,
                line_width: params.line_width,
                outline: [color.x, color.y, color.z, 1.0],
                fill: [color.x, color.y, color.z, fill_alpha],
                shape,
                _pad: [0; 3],
            }
        })
        .collect()
}

/// Outline-only circle marking the emitter region.
pub fn emitter_ring(params: &Params) -> ParticleInstance {
    ParticleInstance {
        center: params.emitter_center.to_array(),
        size: params.emitter_radius,
        line_width: 1.5,
        outline: [0.5, 0.5, 0.5, 1.0],
        fill: [0.0; 4],
        shape: ParticleShape::Circle.index(),
        _pad: [0; 3],
    }
}

/// Render pipeline drawing [`ParticleInstance`] quads into one target format.
pub struct ParticlePipeline {
    pipeline: wgpu::RenderPipeline,
}

impl ParticlePipeline {
    pub fn new(
        device: &wgpu::Device,
        uniform_layout: &wgpu::BindGroupLayout,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[ParticleInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self { pipeline }
    }

    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        uniform_bind_group: &wgpu::BindGroup,
        instances: &InstanceBuffer,
        count: u32,
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, instances.buffer().slice(..));
        pass.draw(0..6, 0..count);
    }
}

/// Growable GPU-side instance storage, rewritten every frame.
pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (capacity * std::mem::size_of::<ParticleInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer, capacity }
    }

    /// Upload this frame's instances, growing the buffer when the
    /// population outruns it.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[ParticleInstance]) {
        if data.is_empty() {
            return;
        }
        if data.len() > self.capacity {
            let capacity = data.len().next_power_of_two();
            self.buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Instance Buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
            self.capacity = capacity;
            return;
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;

    fn live_particle(pos: Vec2) -> Particle {
        Particle {
            pos,
            vel: Vec2::ZERO,
            age: 0.5,
            life_time: 2.0,
            live: true,
        }
    }

    #[test]
    fn test_dead_particles_are_not_drawn() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut dead = live_particle(Vec2::ZERO);
        dead.live = false;
        let particles = vec![live_particle(Vec2::new(10.0, 10.0)), dead];
        let instances = build_instances(&particles, &params, 0.0, &mut rng);
        assert_eq!(instances.len(), 1);
    }

    #[test]
    fn test_fill_alpha_zero_when_fill_disabled() {
        let mut params = Params::default();
        params.fill = 0.0;
        let mut rng = SmallRng::seed_from_u64(2);
        let particles = vec![live_particle(Vec2::ZERO)];
        let instances = build_instances(&particles, &params, 0.0, &mut rng);
        assert_eq!(instances[0].fill[3], 0.0);
        assert_eq!(instances[0].outline[3], 1.0);
    }

    #[test]
    fn test_fill_alpha_randomized_when_enabled() {
        let mut params = Params::default();
        params.fill = 1.0;
        let mut rng = SmallRng::seed_from_u64(3);
        let particles: Vec<_> = (0..64)
            .map(|i| live_particle(Vec2::new(i as f32, 0.0)))
            .collect();
        let instances = build_instances(&particles, &params, 0.0, &mut rng);
        for inst in &instances {
            assert!((0.0..=1.0).contains(&inst.fill[3]));
        }
        // Not all the same: the flicker comes from per-particle rolls.
        let first = instances[0].fill[3];
        assert!(instances.iter().any(|i| i.fill[3] != first));
    }

    #[test]
    fn test_shape_index_follows_params() {
        let mut params = Params::default();
        params.shape = 1.0;
        let mut rng = SmallRng::seed_from_u64(4);
        let particles = vec![live_particle(Vec2::ZERO)];
        let instances = build_instances(&particles, &params, 0.0, &mut rng);
        assert_eq!(instances[0].shape, 1);
    }

    #[test]
    fn test_emitter_ring_is_unfilled_circle() {
        let params = Params::default();
        let ring = emitter_ring(&params);
        assert_eq!(ring.shape, 0);
        assert_eq!(ring.fill[3], 0.0);
        assert_eq!(ring.size, params.emitter_radius);
    }

    #[test]
    fn test_instance_is_64_bytes() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 64);
    }
}
