//! Host-facing side of the chip: CS/DC/RST lines and the SPI slave.
//!
//! The SPI slave only listens while CS is low and collects bytes into a fixed
//! buffer. A buffer is handed to the chip when it fills, when CS rises, when DC
//! changes level (under the old mode), and before a reset, so the chip always
//! sees each buffer under a single, stable mode.

use crate::display::{Gc9a01, Mode};
use crate::framebuffer::Framebuffer;
use crate::savestate::SaveState;
use crate::{ByteOrder, Config};

/// Control lines watched by the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pin {
    /// Chip select, active low
    Cs,
    /// Data/command: low = command, high = data
    Dc,
    /// Reset, active low
    Rst,
}

/// One host action on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// Drive a line high (`true`) or low
    Pin(Pin, bool),
    /// Clock bytes out on MOSI
    Spi(Vec<u8>),
    /// Clock out `count` copies of an RGB565 color
    Fill { color: u16, count: u32 },
}

/// GC9A01 chip wired to its framebuffer and host bus
pub struct Gc9a01Device {
    pub chip: Gc9a01,
    pub framebuffer: Framebuffer,
    cs: bool,
    dc: bool,
    rst: bool,
    /// SPI slave armed (CS low)
    receiving: bool,
    spi_buffer: Vec<u8>,
    spi_buffer_size: usize,
    debug: bool,
    /// Debug: bytes clocked while the chip was not selected
    pub dbg_dropped_bytes: u64,
}

impl Gc9a01Device {
    pub fn new(config: &Config) -> Self {
        let framebuffer = Framebuffer::new(config.width, config.height);
        let mut chip = Gc9a01::for_sink(&framebuffer);
        chip.byte_order = config.byte_order;
        chip.debug = config.debug;
        let spi_buffer_size = config.spi_buffer_size.max(1);
        if config.debug {
            eprintln!("GC9A01 Driver Chip initialized! ({}x{}, radius {})",
                chip.width(), chip.height(), chip.radius());
        }
        Gc9a01Device {
            chip,
            framebuffer,
            // CS and RST have pull-ups
            cs: true,
            dc: false,
            rst: true,
            receiving: false,
            spi_buffer: Vec::with_capacity(spi_buffer_size),
            spi_buffer_size,
            debug: config.debug,
            dbg_dropped_bytes: 0,
        }
    }

    pub fn pin(&self, pin: Pin) -> bool {
        match pin {
            Pin::Cs => self.cs,
            Pin::Dc => self.dc,
            Pin::Rst => self.rst,
        }
    }

    /// Bytes received but not yet handed to the chip.
    pub fn pending_bytes(&self) -> usize {
        self.spi_buffer.len()
    }

    /// Drive a control line. Repeating the current level does nothing.
    pub fn set_pin(&mut self, pin: Pin, level: bool) {
        if self.pin(pin) == level {
            return;
        }
        if self.debug {
            eprintln!("[BUS] {:?} -> {}", pin, level as u8);
        }
        match pin {
            Pin::Cs => {
                self.cs = level;
                if level {
                    self.flush();
                    self.receiving = false;
                    self.chip.handle_select(false);
                } else {
                    self.chip.handle_select(true);
                    self.spi_buffer.clear();
                    self.receiving = true;
                }
            }
            Pin::Dc => {
                self.dc = level;
                let mode = Mode::from_dc(level);
                if mode != self.chip.mode() {
                    self.flush();
                    self.chip.handle_mode(mode);
                }
            }
            Pin::Rst => {
                self.rst = level;
                if !level {
                    self.flush();
                    self.chip.handle_reset();
                }
            }
        }
    }

    /// Pulse RST low then high.
    pub fn hardware_reset(&mut self) {
        self.set_pin(Pin::Rst, false);
        self.set_pin(Pin::Rst, true);
    }

    /// Clock bytes into the SPI slave.
    pub fn spi_write(&mut self, bytes: &[u8]) {
        if !self.receiving {
            self.dbg_dropped_bytes += bytes.len() as u64;
            return;
        }
        for &byte in bytes {
            self.spi_buffer.push(byte);
            if self.spi_buffer.len() >= self.spi_buffer_size {
                self.flush();
            }
        }
    }

    /// Hand whatever the SPI slave holds to the chip.
    pub fn flush(&mut self) {
        if self.spi_buffer.is_empty() {
            return;
        }
        self.chip.handle_bytes(&self.spi_buffer, &mut self.framebuffer);
        self.spi_buffer.clear();
    }

    pub fn apply(&mut self, event: &BusEvent) {
        match event {
            BusEvent::Pin(pin, level) => self.set_pin(*pin, *level),
            BusEvent::Spi(bytes) => self.spi_write(bytes),
            BusEvent::Fill { color, count } => {
                let sample = match self.chip.byte_order {
                    ByteOrder::Little => color.to_le_bytes(),
                    ByteOrder::Big => color.to_be_bytes(),
                };
                for _ in 0..*count {
                    self.spi_write(&sample);
                }
            }
        }
    }

    pub fn apply_all<'a, I: IntoIterator<Item = &'a BusEvent>>(&mut self, events: I) {
        for event in events {
            self.apply(event);
        }
    }

    // ─── Save state ─────────────────────────────────────────────────────────

    pub fn save_state(&self) -> SaveState {
        SaveState {
            width: self.chip.width(),
            height: self.chip.height(),
            cs: self.cs,
            dc: self.dc,
            rst: self.rst,
            receiving: self.receiving,
            spi_pending: self.spi_buffer.clone(),
            chip: self.chip.save_state(),
            framebuffer: self.framebuffer.pixels.clone(),
        }
    }

    pub fn load_state(&mut self, state: &SaveState) -> Result<(), String> {
        if state.width != self.chip.width() || state.height != self.chip.height() {
            return Err(format!("Panel size mismatch: save={}x{} current={}x{}",
                state.width, state.height, self.chip.width(), self.chip.height()));
        }
        if state.framebuffer.len() != self.framebuffer.pixels.len() {
            return Err(format!("Framebuffer size mismatch: {} bytes (expected {})",
                state.framebuffer.len(), self.framebuffer.pixels.len()));
        }
        self.cs = state.cs;
        self.dc = state.dc;
        self.rst = state.rst;
        self.receiving = state.receiving;
        self.spi_buffer.clear();
        let keep = state.spi_pending.len().min(self.spi_buffer_size.saturating_sub(1));
        self.spi_buffer.extend_from_slice(&state.spi_pending[..keep]);
        self.chip.load_state(&state.chip);
        self.framebuffer.pixels.copy_from_slice(&state.framebuffer);
        Ok(())
    }
}
