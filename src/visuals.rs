//! Shared drawing helpers: shapes, color conversion, derived sizes.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::Rng;

/// Outline shape used when drawing a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleShape {
    /// Circle with the `size` parameter as radius.
    #[default]
    Circle,
    /// Axis-aligned square with the `size` parameter as half-extent.
    Rect,
}

impl ParticleShape {
    /// Round a control-surface float into a shape. Values at or above 0.5
    /// select the rectangle.
    pub fn from_control(value: f32) -> Self {
        if value.round() >= 1.0 {
            ParticleShape::Rect
        } else {
            ParticleShape::Circle
        }
    }

    /// Shader-side shape index.
    pub fn index(self) -> u32 {
        match self {
            ParticleShape::Circle => 0,
            ParticleShape::Rect => 1,
        }
    }
}

/// Linearly remap `value` from `[in_min, in_max]` to `[out_min, out_max]`.
pub(crate) fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) / (in_max - in_min) * (out_max - out_min)
}

/// Like [`remap`], clamping the result to the output range.
pub(crate) fn remap_clamped(
    value: f32,
    in_min: f32,
    in_max: f32,
    out_min: f32,
    out_max: f32,
) -> f32 {
    let lo = out_min.min(out_max);
    let hi = out_min.max(out_max);
    remap(value, in_min, in_max, out_min, out_max).clamp(lo, hi)
}

/// Convert HSV to RGB. All components in `[0, 1]`; hue wraps.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}

/// Convert RGB to HSV. All components in `[0, 1]`.
pub fn rgb_to_hsv(rgb: Vec3) -> Vec3 {
    let max = rgb.x.max(rgb.y).max(rgb.z);
    let min = rgb.x.min(rgb.y).min(rgb.z);
    let delta = max - min;

    let h = if delta <= f32::EPSILON {
        0.0
    } else if max == rgb.x {
        (((rgb.y - rgb.z) / delta).rem_euclid(6.0)) / 6.0
    } else if max == rgb.y {
        ((rgb.z - rgb.x) / delta + 2.0) / 6.0
    } else {
        ((rgb.x - rgb.y) / delta + 4.0) / 6.0
    };
    let s = if max <= f32::EPSILON { 0.0 } else { delta / max };

    Vec3::new(h, s, max)
}

/// Replace the hue of `rgb` while keeping its saturation and value.
///
/// This is how particle color tracks age: the configured base color provides
/// saturation and brightness, the age fraction provides the hue.
pub fn with_hue(rgb: Vec3, hue: f32) -> Vec3 {
    let hsv = rgb_to_hsv(rgb);
    hsv_to_rgb(hue.clamp(0.0, 1.0), hsv.y, hsv.z)
}

/// Per-frame derived draw size for the pulsate effect.
///
/// Reproduces the original breathing-size expression (including its huge
/// intermediate remap range) as a pure function of the base size, the elapsed
/// time and fresh randomness. The shared parameter record is never written
/// from the render path.
pub fn pulsate_size(base: f32, elapsed: f32, rng: &mut SmallRng) -> f32 {
    let radius = base + rng.gen::<f32>() * 5.0 * elapsed.sin();
    let adjusted = remap_clamped(radius, -150_000.0, 150_000.0, 0.0, 200.0);
    remap(adjusted, 0.0, 200.0, 2.0, 70.0) * rng.gen::<f32>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_hsv_to_rgb_primaries() {
        let red = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((red.x - 1.0).abs() < 0.001);
        assert!(red.y < 0.001);
        assert!(red.z < 0.001);

        let green = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!(green.x < 0.001);
        assert!((green.y - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_rgb_hsv_round_trip() {
        let magenta = Vec3::new(1.0, 0.0, 1.0);
        let hsv = rgb_to_hsv(magenta);
        let back = hsv_to_rgb(hsv.x, hsv.y, hsv.z);
        assert!((back - magenta).length() < 0.001);
    }

    #[test]
    fn test_with_hue_keeps_saturation_and_value() {
        let base = Vec3::new(1.0, 0.0, 1.0);
        let rotated = with_hue(base, 1.0 / 3.0);
        let hsv = rgb_to_hsv(rotated);
        assert!((hsv.x - 1.0 / 3.0).abs() < 0.01);
        assert!((hsv.y - 1.0).abs() < 0.001);
        assert!((hsv.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_shape_from_control_rounds() {
        assert_eq!(ParticleShape::from_control(0.0), ParticleShape::Circle);
        assert_eq!(ParticleShape::from_control(0.49), ParticleShape::Circle);
        assert_eq!(ParticleShape::from_control(0.5), ParticleShape::Rect);
        assert_eq!(ParticleShape::from_control(1.0), ParticleShape::Rect);
    }

    #[test]
    fn test_pulsate_size_stays_bounded() {
        let mut rng = SmallRng::seed_from_u64(7);
        for i in 0..200 {
            let size = pulsate_size(5.0, i as f32 * 0.1, &mut rng);
            assert!((0.0..=70.0).contains(&size), "size {size} out of bounds");
        }
    }

    #[test]
    fn test_remap() {
        assert_eq!(remap(0.5, 0.0, 1.0, -1000.0, 1000.0), 0.0);
        assert_eq!(remap_clamped(10.0, 0.0, 1.0, 0.0, 100.0), 100.0);
    }
}
