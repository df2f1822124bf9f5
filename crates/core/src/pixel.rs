//! RGB565 decoding and the round panel's visibility mask.

/// Bytes per framebuffer pixel (RGBA)
pub const PIXEL_SIZE: usize = 4;

/// Widen RGB565 to packed RGBA (`0xAABBGGRR`, i.e. R,G,B,A in memory order
/// when stored little-endian).
///
/// Each field is moved to the top of its output byte as-is; the low bits stay
/// zero, so full red is `0xF8`, not `0xFF`.
pub fn rgb565_to_rgba(value: u16) -> u32 {
    let value = value as u32;
    0xFF00_0000
        | ((value & 0x001F) << 19) // blue
        | ((value & 0x07E0) << 5)  // green
        | ((value & 0xF800) >> 8)  // red
}

/// RGBA bytes in framebuffer order.
pub fn rgb565_to_bytes(value: u16) -> [u8; PIXEL_SIZE] {
    rgb565_to_rgba(value).to_le_bytes()
}

/// Circular visible area of a round panel, centered at `(radius, radius)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircleMask {
    pub radius: u32,
}

impl CircleMask {
    pub fn for_panel(width: u32, height: u32) -> Self {
        CircleMask { radius: width.min(height) / 2 }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        let r = self.radius as i64;
        let dx = r - x;
        let dy = r - y;
        // Coordinates this far out cannot be inside; avoids overflow below.
        if dx.abs() > r || dy.abs() > r {
            return false;
        }
        dx * dx + dy * dy <= r * r
    }
}
