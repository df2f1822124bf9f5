//! # gc9a01-core
//!
//! Emulation core for the GC9A01 round 240×240 TFT display controller, as seen
//! from the host microcontroller's SPI bus.
//!
//! The host drives three lines (CS, DC, RST) and clocks bytes in. The chip
//! decodes opcodes and parameter blocks, tracks a column/page address window,
//! applies the MADCTL orientation, and writes RGB565 pixels as RGBA into a
//! framebuffer, clipped to the circular glass.
//!
//! ## Architecture
//!
//! - [`Gc9a01Device`] — Bus adapter: pin levels, SPI receive buffer, event replay
//! - [`Gc9a01`] — Protocol state machine, command dispatcher, and pixel pipeline
//! - [`command::Command`] — Opcode set with per-command parameter counts
//! - [`window`] — Address window cursor and orientation transform
//! - [`pixel`] — RGB565 → RGBA conversion and the round visibility mask
//! - [`Framebuffer`] — RGBA surface behind the [`framebuffer::FrameSink`] trait
//! - [`trace`] — Text bus-trace parser
//! - [`savestate`] — Compressed save states
//! - [`png`] — Screenshot encoder

pub mod command;
pub mod window;
pub mod pixel;
pub mod framebuffer;
pub mod display;
pub mod bus;
pub mod trace;
pub mod savestate;
pub mod png;

pub use bus::{BusEvent, Gc9a01Device, Pin};
pub use display::{Diagnostic, Gc9a01, Mode};
pub use framebuffer::Framebuffer;

/// Panel width in pixels
pub const SCREEN_WIDTH: u32 = 240;
/// Panel height in pixels
pub const SCREEN_HEIGHT: u32 = 240;
/// Bytes the SPI slave buffers before handing them to the chip
pub const SPI_BUFFER_SIZE: usize = 1024;

/// How two consecutive data bytes form one RGB565 sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteOrder {
    /// First byte is the low half (the received buffer read as native
    /// little-endian words)
    #[default]
    Little,
    /// First byte is the high half (wire order of most host drivers)
    Big,
}

/// Device configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub spi_buffer_size: usize,
    pub byte_order: ByteOrder,
    /// Enable debug output (eprintln)
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            spi_buffer_size: SPI_BUFFER_SIZE,
            byte_order: ByteOrder::Little,
            debug: false,
        }
    }
}
