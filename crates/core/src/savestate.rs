//! Save state (quick save / quick load) for the GC9A01 emulator.
//!
//! Captures the bus adapter, the chip registers, and the framebuffer using
//! bincode serialization with deflate compression.
//!
//! ## File format
//!
//! ```text
//! +------------------+
//! | Magic "G9AS"     |  4 bytes
//! +------------------+
//! | Format version   |  u32 little-endian (currently 1)
//! +------------------+
//! | Panel width      |  u16 little-endian
//! +------------------+
//! | Panel height     |  u16 little-endian
//! +------------------+
//! | Compressed data  |  deflate-compressed bincode payload
//! +------------------+
//! ```

use crate::window::AddressWindow;
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Magic bytes identifying a GC9A01 save state file.
const MAGIC: &[u8; 4] = b"G9AS";
/// Current save state format version.
const FORMAT_VERSION: u32 = 1;
const HEADER_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gc9a01State {
    pub data_mode: bool,
    pub command_code: u8,
    pub command_size: u8,
    pub command_index: u8,
    pub command_buf: Vec<u8>,
    pub ram_write: bool,
    pub data_carry: Option<u8>,
    pub window: AddressWindow,
    /// MADCTL top bits
    pub scanning_direction: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub width: u32,
    pub height: u32,
    // Bus
    pub cs: bool,
    pub dc: bool,
    pub rst: bool,
    pub receiving: bool,
    pub spi_pending: Vec<u8>,
    // Chip
    pub chip: Gc9a01State,
    /// RGBA
    pub framebuffer: Vec<u8>,
}

/// Serialize with header and deflate compression.
pub fn encode(state: &SaveState) -> Result<Vec<u8>, String> {
    let payload = bincode::serialize(state)
        .map_err(|e| format!("Serialize error: {}", e))?;
    let compressed = miniz_oxide::deflate::compress_to_vec(&payload, 6);

    let width = u16::try_from(state.width)
        .map_err(|_| format!("Panel width {} too large", state.width))?;
    let height = u16::try_from(state.height)
        .map_err(|_| format!("Panel height {} too large", state.height))?;

    let mut out = Vec::with_capacity(HEADER_SIZE + compressed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Parse a save state, verifying magic, version, and panel size.
pub fn decode(data: &[u8], width: u32, height: u32) -> Result<SaveState, String> {
    if data.len() < HEADER_SIZE {
        return Err("File too small".into());
    }
    if &data[0..4] != MAGIC {
        return Err("Invalid save state file (bad magic)".into());
    }
    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != FORMAT_VERSION {
        return Err(format!("Unsupported save state version {} (expected {})",
            version, FORMAT_VERSION));
    }
    let saved_w = u16::from_le_bytes([data[8], data[9]]) as u32;
    let saved_h = u16::from_le_bytes([data[10], data[11]]) as u32;
    if saved_w != width || saved_h != height {
        return Err(format!("Panel size mismatch: save={}x{} current={}x{}",
            saved_w, saved_h, width, height));
    }

    let decompressed = miniz_oxide::inflate::decompress_to_vec(&data[HEADER_SIZE..])
        .map_err(|e| format!("Decompress error: {:?}", e))?;

    bincode::deserialize(&decompressed)
        .map_err(|e| format!("Deserialize error: {}", e))
}

pub fn save_to_file(state: &SaveState, path: &Path) -> Result<(), String> {
    let out = encode(state)?;
    std::fs::write(path, &out)
        .map_err(|e| format!("Write error: {}", e))
}

pub fn load_from_file(path: &Path, width: u32, height: u32) -> Result<SaveState, String> {
    let data = std::fs::read(path)
        .map_err(|e| format!("Read error: {}", e))?;
    decode(&data, width, height)
}

/// Derive save state file path from a trace file path.
/// `boot.trace` → `boot.state`
pub fn state_path(trace_path: &str) -> String {
    let p = Path::new(trace_path);
    let stem = p.file_stem().and_then(|s| s.to_str()).unwrap_or("gc9a01");
    let dir = p.parent().unwrap_or(Path::new("."));
    dir.join(format!("{}.state", stem)).to_string_lossy().into_owned()
}
