//! Pixel surface the controller draws into.
//!
//! The chip only ever writes: it addresses the surface row-major by byte
//! offset `(y * width + x) * PIXEL_SIZE` and never reads back.

use crate::pixel::PIXEL_SIZE;

/// Write-only destination for decoded pixels.
pub trait FrameSink {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Copy `data` to byte `offset`. Out-of-range writes are ignored.
    fn write(&mut self, offset: usize, data: &[u8]);
}

/// In-memory RGBA framebuffer
pub struct Framebuffer {
    width: u32,
    height: u32,
    pub pixels: Vec<u8>,
}

impl Framebuffer {
    /// Fully transparent black surface.
    pub fn new(width: u32, height: u32) -> Self {
        Framebuffer {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * PIXEL_SIZE],
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// RGBA bytes at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; PIXEL_SIZE] {
        let offset = (y as usize * self.width as usize + x as usize) * PIXEL_SIZE;
        let mut px = [0u8; PIXEL_SIZE];
        px.copy_from_slice(&self.pixels[offset..offset + PIXEL_SIZE]);
        px
    }

    /// Number of pixels that have been written at least once (non-zero alpha).
    pub fn written_pixels(&self) -> usize {
        self.pixels.chunks_exact(PIXEL_SIZE).filter(|px| px[3] != 0).count()
    }

    /// Convert to u32 pixels (0xRRGGBB format for minifb)
    pub fn as_pixel_buffer(&self) -> Vec<u32> {
        self.pixels
            .chunks_exact(PIXEL_SIZE)
            .map(|px| ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32)
            .collect()
    }
}

impl FrameSink for Framebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn write(&mut self, offset: usize, data: &[u8]) {
        if let Some(dst) = self.pixels.get_mut(offset..offset + data.len()) {
            dst.copy_from_slice(data);
        }
    }
}
