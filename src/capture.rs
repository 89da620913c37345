//! Full-frame capture to disk.
//!
//! Copies the trail texture into a mappable buffer, waits for the copy, and
//! saves the pixels as a PNG under a randomly chosen `screen<N>.png` name.

use std::path::PathBuf;
use std::sync::mpsc;

use image::RgbaImage;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::error::CaptureError;

const BYTES_PER_PIXEL: u32 = 4;

/// Synchronously read an RGBA texture back into an image.
pub fn grab_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> Result<RgbaImage, CaptureError> {
    // Rows must be aligned to COPY_BYTES_PER_ROW_ALIGNMENT (256)
    let unpadded_bytes_per_row = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Capture Buffer"),
        size: (padded_bytes_per_row * height) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Capture Encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row),
                rows_per_image: None,
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::Maintain::Wait);
    rx.recv()
        .map_err(|_| CaptureError::BufferMapping("map callback dropped".into()))?
        .map_err(|e| CaptureError::BufferMapping(e.to_string()))?;

    let data = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
    for row in 0..height {
        let start = (row * padded_bytes_per_row) as usize;
        pixels.extend_from_slice(&data[start..start + unpadded_bytes_per_row as usize]);
    }
    drop(data);
    buffer.unmap();

    RgbaImage::from_raw(width, height, pixels).ok_or(CaptureError::BadDimensions)
}

/// Pick a random `screen<N>.png` name, N in 0..1000.
pub fn random_capture_path(rng: &mut SmallRng) -> PathBuf {
    PathBuf::from(format!("screen{}.png", rng.gen_range(0..1000)))
}

/// Save a captured image under a random file name, returning the path.
pub fn save_random(image: &RgbaImage, rng: &mut SmallRng) -> Result<PathBuf, CaptureError> {
    let path = random_capture_path(rng);
    image.save(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_capture_path_shape() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let path = random_capture_path(&mut rng);
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("screen"));
            assert!(name.ends_with(".png"));
            let n: u32 = name["screen".len()..name.len() - ".png".len()]
                .parse()
                .unwrap();
            assert!(n < 1000);
        }
    }
}
