//! On-screen slider panel.
//!
//! Each slider binds one [`ParamKey`]; its label and range come from the key
//! registry, so the panel, the OSC adapter and the preset store always agree
//! on what a parameter is.

use crate::params::{ParamKey, Params};

/// One panel row: a parameter key rendered as a bounded slider.
pub struct Slider {
    pub key: ParamKey,
}

/// The slider panel. Visibility is toggled by the application (Enter).
pub struct Interface {
    sliders: Vec<Slider>,
}

impl Interface {
    /// Build the panel with one slider per registered parameter, in
    /// registration order.
    pub fn new() -> Self {
        Self {
            sliders: ParamKey::ALL.iter().map(|&key| Slider { key }).collect(),
        }
    }

    /// Draw the panel and write any slider edits back to the store.
    pub fn ui(
        &mut self,
        ctx: &egui::Context,
        params: &mut Params,
        particle_count: usize,
        fps: f32,
    ) {
        egui::Window::new("controls")
            .title_bar(false)
            .resizable(false)
            .default_pos([20.0, 20.0])
            .show(ctx, |ui| {
                ui.label(format!("Particles: {particle_count}   {fps:.0} fps"));
                ui.label("Enter hides this panel, Space captures the frame");
                ui.label("1-9 load presets, Shift+1-9 save them");
                ui.separator();
                for slider in &self.sliders {
                    let (min, max) = slider.key.range();
                    let mut value = params.get(slider.key);
                    let response =
                        ui.add(egui::Slider::new(&mut value, min..=max).text(slider.key.name()));
                    if response.changed() {
                        params.set(slider.key, value);
                    }
                }
            });
    }
}

impl Default for Interface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_registers_every_parameter_in_order() {
        let interface = Interface::new();
        assert_eq!(interface.sliders.len(), ParamKey::ALL.len());
        assert_eq!(interface.sliders[0].key, ParamKey::BornRate);
        assert_eq!(
            interface.sliders.last().unwrap().key,
            ParamKey::BlueChannel
        );
    }
}
