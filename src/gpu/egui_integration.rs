//! Egui integration for the control panel.
//!
//! Wraps egui context, winit state and the wgpu renderer, and holds the
//! tessellated output between `end_frame` and the render pass that paints it.

use winit::window::Window;

/// Egui context plus platform and renderer glue.
pub struct EguiLayer {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    pending: Option<FramePaint>,
}

/// Tessellated UI output for one frame.
pub struct FramePaint {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

impl EguiLayer {
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let ctx = egui::Context::default();

        // Dark theme without shadows fits the black trail buffer
        let mut style = egui::Style::default();
        style.visuals = egui::Visuals::dark();
        style.visuals.window_shadow = egui::Shadow::NONE;
        style.visuals.popup_shadow = egui::Shadow::NONE;
        ctx.set_style(style);

        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let renderer = egui_wgpu::Renderer::new(device, output_format, None, 1, false);

        Self {
            ctx,
            state,
            renderer,
            pending: None,
        }
    }

    pub fn ctx(&self) -> &egui::Context {
        &self.ctx
    }

    /// Feed a winit event to egui. Returns true when egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Begin a new UI frame. Call before any panel code.
    pub fn begin_frame(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.ctx.begin_pass(raw_input);
    }

    /// Finish the UI frame and stash the tessellated output for rendering.
    pub fn end_frame(&mut self, window: &Window) {
        let full_output = self.ctx.end_pass();
        self.state
            .handle_platform_output(window, full_output.platform_output);
        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        self.pending = Some(FramePaint {
            paint_jobs,
            textures_delta: full_output.textures_delta,
            pixels_per_point: full_output.pixels_per_point,
        });
    }

    /// Take this frame's output, if a UI frame ran.
    pub fn take_frame(&mut self) -> Option<FramePaint> {
        self.pending.take()
    }

    /// Upload textures and buffers. Call before opening the render pass.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        paint: &FramePaint,
        screen: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &paint.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        let _ = self
            .renderer
            .update_buffers(device, queue, encoder, &paint.paint_jobs, screen);
    }

    /// Paint the UI into an open render pass.
    pub fn render_into(
        &self,
        pass: &mut wgpu::RenderPass<'static>,
        paint: &FramePaint,
        screen: &egui_wgpu::ScreenDescriptor,
    ) {
        self.renderer.render(pass, &paint.paint_jobs, screen);
    }

    /// Free textures after the frame was submitted.
    pub fn cleanup(&mut self, paint: &FramePaint) {
        for id in &paint.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
