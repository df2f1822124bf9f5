//! GC9A01 240×240 round TFT display controller emulation.
//!
//! Bytes arrive over SPI tagged by the DC line: in command mode every byte is
//! an opcode, in data mode bytes are either parameters for the last opcode or,
//! after a memory-write command, RGB565 pixel samples. Pixels are placed by the
//! column/page cursor through the MADCTL orientation transform, clipped to the
//! circular glass, and written as RGBA into a [`FrameSink`].

use crate::command::{Command, MAX_ARGS};
use crate::framebuffer::FrameSink;
use crate::pixel::{rgb565_to_bytes, CircleMask, PIXEL_SIZE};
use crate::savestate::Gc9a01State;
use crate::window::{AddressWindow, ScanDirection};
use crate::ByteOrder;
use std::collections::VecDeque;
use std::fmt;

/// Rows between the controller's page 0 and the top of the glass when the
/// row order is reversed. Applied to page-address parameters only.
pub const PAGE_OFFSET_MIRRORED: u32 = 32;

/// Diagnostics kept before the oldest are discarded.
pub const MAX_DIAGNOSTICS: usize = 256;

/// Meaning of bytes on the bus, selected by the DC line (low = command).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Command,
    Data,
}

impl Mode {
    pub fn from_dc(high: bool) -> Self {
        if high { Mode::Data } else { Mode::Command }
    }
}

/// Advisory messages from the chip. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnknownCommand(u8),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownCommand(op) => write!(f, "unknown command 0x{:02x}", op),
        }
    }
}

/// GC9A01 controller state
///
/// Diagnostics queue up until [`take_diagnostics`](Gc9a01::take_diagnostics)
/// drains them; past [`MAX_DIAGNOSTICS`] the oldest are dropped.
pub struct Gc9a01 {
    mode: Mode,
    /// Last opcode received
    command: Command,
    /// Parameter bytes `command` expects
    command_size: usize,
    /// Parameter bytes received so far
    command_index: usize,
    command_buf: [u8; MAX_ARGS],
    /// Set by memory-write; data bytes are pixels while it holds
    ram_write: bool,
    /// First byte of a pixel sample split across SPI buffers
    data_carry: Option<u8>,
    pub window: AddressWindow,
    pub scan: ScanDirection,
    width: u32,
    height: u32,
    mask: CircleMask,
    /// How two data bytes combine into one RGB565 sample
    pub byte_order: ByteOrder,
    /// Enable debug output (eprintln)
    pub debug: bool,
    /// Whether any pixel has been written since the flag was last cleared
    pub dirty: bool,
    diagnostics: VecDeque<Diagnostic>,
    /// Debug: opcode bytes received
    pub dbg_cmd_count: u64,
    /// Debug: data bytes received (parameters and pixels)
    pub dbg_data_count: u64,
    /// Debug: commands executed
    pub dbg_exec_count: u64,
    /// Debug: pixels that landed on the glass
    pub dbg_pixels_written: u64,
    /// Debug: pixels dropped by the round mask
    pub dbg_pixels_masked: u64,
}

impl Gc9a01 {
    /// New chip for a panel of the given size; the window covers the panel.
    pub fn new(width: u32, height: u32) -> Self {
        Gc9a01 {
            mode: Mode::Command,
            command: Command::Nop,
            command_size: 0,
            command_index: 0,
            command_buf: [0; MAX_ARGS],
            ram_write: false,
            data_carry: None,
            window: AddressWindow::full(width, height),
            scan: ScanDirection::default(),
            width,
            height,
            mask: CircleMask::for_panel(width, height),
            byte_order: ByteOrder::default(),
            debug: false,
            dirty: false,
            diagnostics: VecDeque::new(),
            dbg_cmd_count: 0,
            dbg_data_count: 0,
            dbg_exec_count: 0,
            dbg_pixels_written: 0,
            dbg_pixels_masked: 0,
        }
    }

    /// Chip sized to match an existing sink.
    pub fn for_sink<F: FrameSink>(sink: &F) -> Self {
        Gc9a01::new(sink.width(), sink.height())
    }

    pub fn mode(&self) -> Mode { self.mode }
    pub fn ram_write(&self) -> bool { self.ram_write }
    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn radius(&self) -> u32 { self.mask.radius }

    /// Opcode in flight and how many of its parameters have arrived.
    pub fn pending(&self) -> (Command, usize, usize) {
        (self.command, self.command_index, self.command_size)
    }

    // ─── Signal handlers ────────────────────────────────────────────────────

    /// CS edge. Selecting the chip drops any half-received parameter block;
    /// deselecting leaves it to resume on the next selection.
    pub fn handle_select(&mut self, asserted: bool) {
        if asserted {
            self.command_size = 0;
            self.command_index = 0;
            self.data_carry = None;
        }
    }

    /// DC level. Takes effect for the next buffer handed to [`handle_bytes`].
    ///
    /// [`handle_bytes`]: Gc9a01::handle_bytes
    pub fn handle_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Hardware reset: full-panel window, no pixel transfer, no pending
    /// command. Orientation and the framebuffer are left alone.
    pub fn handle_reset(&mut self) {
        self.ram_write = false;
        self.data_carry = None;
        self.command_size = 0;
        self.command_index = 0;
        self.window = AddressWindow::full(self.width, self.height);
        if self.debug {
            eprintln!("[GC9A01] reset");
        }
    }

    /// Process one received SPI buffer under the current mode.
    pub fn handle_bytes<F: FrameSink>(&mut self, bytes: &[u8], sink: &mut F) {
        if bytes.is_empty() {
            return;
        }
        match self.mode {
            Mode::Command => self.process_command(bytes),
            Mode::Data if self.ram_write => self.process_data(bytes, sink),
            Mode::Data => self.process_command_args(bytes),
        }
    }

    /// Drain queued diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.drain(..).collect()
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.len() >= MAX_DIAGNOSTICS {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(diagnostic);
    }

    /// Reset per-frame debug counters
    pub fn dbg_reset_counters(&mut self) {
        self.dbg_cmd_count = 0;
        self.dbg_data_count = 0;
        self.dbg_exec_count = 0;
        self.dbg_pixels_written = 0;
        self.dbg_pixels_masked = 0;
    }

    // ─── Protocol ───────────────────────────────────────────────────────────

    fn process_command(&mut self, bytes: &[u8]) {
        self.ram_write = false;
        self.data_carry = None;
        for &byte in bytes {
            self.dbg_cmd_count += 1;
            self.command = Command::from_byte(byte);
            self.command_size = self.command.arg_count();
            self.command_index = 0;
            if self.command_size == 0 {
                self.execute_command();
            }
        }
    }

    fn process_command_args(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.dbg_data_count += 1;
            if self.command_index < self.command_size {
                self.command_buf[self.command_index] = byte;
                self.command_index += 1;
                if self.command_index == self.command_size {
                    self.execute_command();
                }
            }
        }
    }

    fn execute_command(&mut self) {
        self.dbg_exec_count += 1;
        if self.debug {
            eprintln!("[GC9A01] {:?} {:02X?}", self.command, &self.command_buf[..self.command_size]);
        }
        match self.command {
            Command::MemoryWrite => {
                self.ram_write = true;
            }
            Command::MemoryAccessControl => {
                self.scan = ScanDirection::from_madctl(self.command_buf[0]);
            }
            Command::ColumnAddressSet | Command::PageAddressSet => {
                self.set_address();
            }
            Command::Unknown(op) => {
                self.report(Diagnostic::UnknownCommand(op));
            }
            // Accepted, no modelled effect
            Command::Nop
            | Command::SoftwareReset
            | Command::SleepIn
            | Command::SleepOut
            | Command::InversionOff
            | Command::InversionOn
            | Command::DisplayOff
            | Command::DisplayOn
            | Command::PixelFormatSet
            | Command::FrameRateControl1
            | Command::FrameRateControl2
            | Command::FrameRateControl3
            | Command::InversionControl
            | Command::DisplaySettings5
            | Command::PowerControl1
            | Command::PowerControl2
            | Command::PowerControl3
            | Command::PowerControl4
            | Command::PowerControl5
            | Command::VcomControl
            | Command::PositiveGamma
            | Command::NegativeGamma => {}
        }
    }

    /// CASET/PASET. With rows and columns exchanged the command lands on the
    /// other axis.
    fn set_address(&mut self) {
        let buf = &self.command_buf;
        let start = u16::from_be_bytes([buf[0], buf[1]]) as u32;
        let end = u16::from_be_bytes([buf[2], buf[3]]) as u32;
        let nominal_page = self.command == Command::PageAddressSet;
        if nominal_page != self.scan.swap {
            if self.scan.vertical_mirror {
                self.window.set_pages(
                    start.wrapping_sub(PAGE_OFFSET_MIRRORED),
                    end.wrapping_sub(PAGE_OFFSET_MIRRORED),
                );
            } else {
                self.window.set_pages(start, end);
            }
        } else {
            self.window.set_columns(start, end);
        }
    }

    // ─── Pixel pipeline ─────────────────────────────────────────────────────

    fn process_data<F: FrameSink>(&mut self, bytes: &[u8], sink: &mut F) {
        self.dbg_data_count += bytes.len() as u64;
        let mut bytes = bytes;
        if let Some(first) = self.data_carry.take() {
            // bytes is non-empty here
            self.write_sample([first, bytes[0]], sink);
            bytes = &bytes[1..];
        }
        let mut pairs = bytes.chunks_exact(2);
        for pair in pairs.by_ref() {
            self.write_sample([pair[0], pair[1]], sink);
        }
        self.data_carry = pairs.remainder().first().copied();
    }

    fn write_sample<F: FrameSink>(&mut self, pair: [u8; 2], sink: &mut F) {
        let sample = match self.byte_order {
            ByteOrder::Little => u16::from_le_bytes(pair),
            ByteOrder::Big => u16::from_be_bytes(pair),
        };
        self.write_pixel(sample, sink);
    }

    fn write_pixel<F: FrameSink>(&mut self, sample: u16, sink: &mut F) {
        let (x, y) = self.scan.to_device(
            self.window.active_column,
            self.window.active_page,
            self.width,
            self.height,
        );
        let on_glass = self.mask.contains(x, y) && x < self.width as i64 && y < self.height as i64;
        if on_glass {
            let offset = (y as usize * self.width as usize + x as usize) * PIXEL_SIZE;
            sink.write(offset, &rgb565_to_bytes(sample));
            self.dbg_pixels_written += 1;
            self.dirty = true;
        } else {
            self.dbg_pixels_masked += 1;
        }
        self.window.advance(self.scan.swap);
    }

    // ─── Save state ─────────────────────────────────────────────────────────

    pub fn save_state(&self) -> Gc9a01State {
        Gc9a01State {
            data_mode: self.mode == Mode::Data,
            command_code: self.command.opcode(),
            command_size: self.command_size as u8,
            command_index: self.command_index as u8,
            command_buf: self.command_buf.to_vec(),
            ram_write: self.ram_write,
            data_carry: self.data_carry,
            window: self.window.clone(),
            scanning_direction: self.scan.bits(),
        }
    }

    /// Restore from a save state. Sizes are clamped so a damaged state
    /// cannot break the `index <= size <= MAX_ARGS` invariant.
    pub fn load_state(&mut self, state: &Gc9a01State) {
        self.mode = Mode::from_dc(state.data_mode);
        self.command = Command::from_byte(state.command_code);
        self.command_size = (state.command_size as usize).min(MAX_ARGS);
        self.command_index = (state.command_index as usize).min(self.command_size);
        self.command_buf = [0; MAX_ARGS];
        let n = state.command_buf.len().min(MAX_ARGS);
        self.command_buf[..n].copy_from_slice(&state.command_buf[..n]);
        self.ram_write = state.ram_write;
        self.data_carry = state.data_carry;
        self.window = state.window.clone();
        self.scan = ScanDirection::from_madctl(state.scanning_direction);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Framebuffer;
    use crate::window::{MADCTL_MV, MADCTL_MX, MADCTL_MY};

    fn chip() -> (Gc9a01, Framebuffer) {
        let fb = Framebuffer::new(240, 240);
        (Gc9a01::for_sink(&fb), fb)
    }

    fn command(chip: &mut Gc9a01, fb: &mut Framebuffer, op: u8, args: &[u8]) {
        chip.handle_mode(Mode::Command);
        chip.handle_bytes(&[op], fb);
        chip.handle_mode(Mode::Data);
        chip.handle_bytes(args, fb);
    }

    fn pixels(chip: &mut Gc9a01, fb: &mut Framebuffer, colors: &[u16]) {
        command(chip, fb, 0x2C, &[]);
        let bytes: Vec<u8> = colors.iter().flat_map(|c| c.to_le_bytes()).collect();
        chip.handle_bytes(&bytes, fb);
    }

    #[test]
    fn test_chip_creation() {
        let (chip, _) = chip();
        assert_eq!(chip.radius(), 120);
        assert_eq!(chip.window, AddressWindow::full(240, 240));
        assert_eq!(chip.window.column_end, 239);
        assert_eq!(chip.mode(), Mode::Command);
        assert!(!chip.ram_write());
    }

    #[test]
    fn test_dispatch_after_exact_arg_count() {
        for op in 0..=255u8 {
            let (mut chip, mut fb) = chip();
            let len = Command::from_byte(op).arg_count();
            chip.handle_bytes(&[op], &mut fb);
            if len == 0 {
                assert_eq!(chip.dbg_exec_count, 1, "opcode 0x{:02X}", op);
                continue;
            }
            assert_eq!(chip.dbg_exec_count, 0, "opcode 0x{:02X}", op);
            chip.handle_mode(Mode::Data);
            for i in 0..len {
                assert_eq!(chip.dbg_exec_count, 0, "opcode 0x{:02X} after {} args", op, i);
                chip.handle_bytes(&[0x00], &mut fb);
            }
            assert_eq!(chip.dbg_exec_count, 1, "opcode 0x{:02X}", op);
            // Extra bytes are dropped, never a second dispatch
            chip.handle_bytes(&[0x00; 20], &mut fb);
            assert_eq!(chip.dbg_exec_count, 1, "opcode 0x{:02X}", op);
        }
    }

    #[test]
    fn test_args_split_across_buffers() {
        let (mut chip, mut fb) = chip();
        chip.handle_bytes(&[0x2A], &mut fb);
        chip.handle_mode(Mode::Data);
        chip.handle_bytes(&[0x00, 0x0A], &mut fb);
        assert_eq!(chip.window.column_start, 0);
        chip.handle_bytes(&[0x00], &mut fb);
        chip.handle_bytes(&[0x32], &mut fb);
        assert_eq!(chip.window.column_start, 10);
        assert_eq!(chip.window.column_end, 50);
        assert_eq!(chip.window.active_column, 10);
    }

    #[test]
    fn test_column_address_set() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x2A, &[0x00, 0x00, 0x00, 0xEF]);
        assert_eq!(chip.window.column_start, 0);
        assert_eq!(chip.window.column_end, 239);
        command(&mut chip, &mut fb, 0x2A, &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(chip.window.column_start, 0x0102);
        assert_eq!(chip.window.column_end, 0x0304);
    }

    #[test]
    fn test_page_offset_with_vertical_mirror() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x36, &[MADCTL_MY]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 0x20, 0x00, 0xEF]);
        assert_eq!(chip.window.page_start, 0);
        assert_eq!(chip.window.page_end, 207);
        assert_eq!(chip.window.active_page, 0);
    }

    #[test]
    fn test_madctl_a0_routes_page_set_to_columns() {
        // 0xA0 is MY | MV: with rows and columns exchanged the page command
        // addresses the column window, where no offset applies.
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x36, &[0xA0]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 0x20, 0x00, 0xEF]);
        assert_eq!(chip.window.column_start, 32);
        assert_eq!(chip.window.column_end, 239);
        assert_eq!(chip.window.page_end, 239);
        command(&mut chip, &mut fb, 0x2A, &[0x00, 0x20, 0x00, 0xEF]);
        assert_eq!(chip.window.page_start, 0);
        assert_eq!(chip.window.page_end, 207);
    }

    #[test]
    fn test_swap_routes_column_set_to_pages() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x36, &[MADCTL_MV]);
        command(&mut chip, &mut fb, 0x2A, &[0x00, 0x05, 0x00, 0x09]);
        assert_eq!((chip.window.page_start, chip.window.page_end), (5, 9));
        assert_eq!((chip.window.column_start, chip.window.column_end), (0, 239));
    }

    #[test]
    fn test_window_commands_idempotent() {
        let (mut chip, mut fb) = chip();
        let apply = |chip: &mut Gc9a01, fb: &mut Framebuffer| {
            command(chip, fb, 0x36, &[MADCTL_MY | MADCTL_MX]);
            command(chip, fb, 0x2A, &[0x00, 0x10, 0x00, 0x80]);
            command(chip, fb, 0x2B, &[0x00, 0x30, 0x00, 0x90]);
        };
        apply(&mut chip, &mut fb);
        let first = (chip.window.clone(), chip.scan);
        apply(&mut chip, &mut fb);
        assert_eq!((chip.window.clone(), chip.scan), first);
    }

    #[test]
    fn test_madctl_keeps_top_bits_only() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x36, &[0x48]);
        assert_eq!(chip.scan.bits(), 0x40);
    }

    #[test]
    fn test_memory_write_latch() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x2C, &[]);
        assert!(chip.ram_write());
        chip.handle_bytes(&[0x00, 0xF8], &mut fb);
        assert_eq!(chip.dbg_pixels_masked, 1);
        assert_eq!(chip.window.active_column, 1);

        chip.handle_mode(Mode::Command);
        chip.handle_bytes(&[0x00], &mut fb);
        assert!(!chip.ram_write());
        chip.handle_mode(Mode::Data);
        chip.handle_bytes(&[0x00, 0xF8], &mut fb);
        assert_eq!(chip.window.active_column, 1);
    }

    #[test]
    fn test_center_pixel_written_corner_dropped() {
        let (mut chip, mut fb) = chip();
        pixels(&mut chip, &mut fb, &[0xF800]);
        assert_eq!(fb.written_pixels(), 0);

        command(&mut chip, &mut fb, 0x2A, &[0x00, 120, 0x00, 120]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 120, 0x00, 120]);
        pixels(&mut chip, &mut fb, &[0xF800]);
        assert_eq!(fb.pixel(120, 120), [0xF8, 0x00, 0x00, 0xFF]);
        assert_eq!(fb.written_pixels(), 1);
        assert!(chip.dirty);
    }

    #[test]
    fn test_big_endian_samples() {
        let (mut chip, mut fb) = chip();
        chip.byte_order = ByteOrder::Big;
        command(&mut chip, &mut fb, 0x2A, &[0x00, 120, 0x00, 120]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 120, 0x00, 120]);
        command(&mut chip, &mut fb, 0x2C, &[]);
        chip.handle_bytes(&[0x07, 0xE0], &mut fb);
        assert_eq!(fb.pixel(120, 120), [0x00, 0xFC, 0x00, 0xFF]);
    }

    #[test]
    fn test_odd_trailing_byte_joins_next_buffer() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x2A, &[0x00, 120, 0x00, 121]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 120, 0x00, 120]);
        command(&mut chip, &mut fb, 0x2C, &[]);
        chip.handle_bytes(&[0x00, 0xF8, 0x1F], &mut fb);
        assert_eq!(chip.window.active_column, 121);
        chip.handle_bytes(&[0x00], &mut fb);
        assert_eq!(fb.pixel(120, 120), [0xF8, 0x00, 0x00, 0xFF]);
        assert_eq!(fb.pixel(121, 120), [0x00, 0x00, 0xF8, 0xFF]);
    }

    #[test]
    fn test_odd_trailing_byte_dropped_by_command() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x2A, &[0x00, 120, 0x00, 121]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 120, 0x00, 120]);
        command(&mut chip, &mut fb, 0x2C, &[]);
        chip.handle_bytes(&[0xFF], &mut fb);
        command(&mut chip, &mut fb, 0x2C, &[]);
        chip.handle_bytes(&[0x00, 0xF8], &mut fb);
        assert_eq!(fb.pixel(120, 120), [0xF8, 0x00, 0x00, 0xFF]);
        assert_eq!(chip.window.active_column, 121);
    }

    #[test]
    fn test_pixel_past_right_edge_dropped() {
        // (240, 120) is on the circle but off a 240-wide panel; it must not
        // wrap onto the start of the next row.
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x2A, &[0x00, 0xF0, 0x00, 0xF0]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 120, 0x00, 120]);
        pixels(&mut chip, &mut fb, &[0xFFFF]);
        assert!(chip.mask.contains(240, 120));
        assert_eq!(chip.dbg_pixels_masked, 1);
        assert_eq!(fb.written_pixels(), 0);
        assert_eq!(fb.pixel(0, 121), [0, 0, 0, 0]);
    }

    #[test]
    fn test_diagnostics_queue_is_bounded() {
        let (mut chip, mut fb) = chip();
        let mut ops = vec![0xFE; MAX_DIAGNOSTICS];
        ops.push(0xFD);
        chip.handle_bytes(&ops, &mut fb);
        let diags = chip.take_diagnostics();
        assert_eq!(diags.len(), MAX_DIAGNOSTICS);
        assert_eq!(diags.last(), Some(&Diagnostic::UnknownCommand(0xFD)));
    }

    #[test]
    fn test_counters_do_not_overflow() {
        let (mut chip, mut fb) = chip();
        chip.dbg_data_count = u32::MAX as u64;
        command(&mut chip, &mut fb, 0x2C, &[]);
        chip.handle_bytes(&[0x00; 4], &mut fb);
        assert_eq!(chip.dbg_data_count, u32::MAX as u64 + 4);
    }

    #[test]
    fn test_full_window_fill() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x2A, &[0x00, 0x00, 0x00, 0xEF]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 0x00, 0x00, 0xEF]);
        pixels(&mut chip, &mut fb, &vec![0xFFFF; 240 * 240]);
        assert_eq!((chip.window.active_column, chip.window.active_page), (0, 0));
        assert_eq!(chip.dbg_pixels_written as usize, fb.written_pixels());
        assert_eq!((chip.dbg_pixels_written + chip.dbg_pixels_masked) as usize, 240 * 240);
        // Roughly pi/4 of the square is on the glass
        let lit = fb.written_pixels();
        assert!(lit > 44_000 && lit < 46_000, "lit = {}", lit);
        assert_eq!(fb.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_horizontal_mirror_places_pixel() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x36, &[MADCTL_MX]);
        command(&mut chip, &mut fb, 0x2A, &[0x00, 100, 0x00, 100]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 110, 0x00, 110]);
        pixels(&mut chip, &mut fb, &[0x001F]);
        assert_eq!(fb.pixel(139, 110), [0x00, 0x00, 0xF8, 0xFF]);
    }

    #[test]
    fn test_swapped_fill_is_column_major() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x36, &[MADCTL_MV]);
        // Nominal column command lands on the page window, and vice versa
        command(&mut chip, &mut fb, 0x2A, &[0x00, 100, 0x00, 101]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 110, 0x00, 111]);
        pixels(&mut chip, &mut fb, &[0xF800, 0x07E0, 0x001F]);
        // Page feeds x, column feeds y; page advances first
        assert_eq!(fb.pixel(100, 110)[0], 0xF8);
        assert_eq!(fb.pixel(101, 110)[1], 0xFC);
        assert_eq!(fb.pixel(100, 111)[2], 0xF8);
    }

    #[test]
    fn test_unknown_command_reported() {
        let (mut chip, mut fb) = chip();
        chip.handle_bytes(&[0xFE, 0x29], &mut fb);
        assert_eq!(chip.take_diagnostics(), vec![Diagnostic::UnknownCommand(0xFE)]);
        assert!(chip.take_diagnostics().is_empty());
        assert_eq!(Diagnostic::UnknownCommand(0xFE).to_string(), "unknown command 0xfe");
    }

    #[test]
    fn test_args_without_command_dropped() {
        let (mut chip, mut fb) = chip();
        chip.handle_mode(Mode::Data);
        chip.handle_bytes(&[1, 2, 3, 4, 5], &mut fb);
        assert_eq!(chip.dbg_exec_count, 0);
        assert_eq!(chip.window, AddressWindow::full(240, 240));
    }

    #[test]
    fn test_select_discards_partial_args() {
        let (mut chip, mut fb) = chip();
        chip.handle_bytes(&[0x2A], &mut fb);
        chip.handle_mode(Mode::Data);
        chip.handle_bytes(&[0x00, 0x10], &mut fb);
        chip.handle_select(false);
        assert_eq!(chip.pending(), (Command::ColumnAddressSet, 2, 4));
        chip.handle_select(true);
        chip.handle_bytes(&[0x00, 0x20], &mut fb);
        assert_eq!(chip.dbg_exec_count, 0);
        assert_eq!(chip.window.column_end, 239);
    }

    #[test]
    fn test_empty_buffer_is_noop() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x2C, &[]);
        chip.handle_mode(Mode::Command);
        chip.handle_bytes(&[], &mut fb);
        assert!(chip.ram_write());
    }

    #[test]
    fn test_reset_restores_window_keeps_orientation() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x36, &[MADCTL_MX]);
        command(&mut chip, &mut fb, 0x2A, &[0x00, 120, 0x00, 120]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 120, 0x00, 130]);
        pixels(&mut chip, &mut fb, &[0xFFFF]);
        assert!(chip.ram_write());
        chip.handle_reset();
        assert!(!chip.ram_write());
        assert_eq!(chip.window, AddressWindow::full(240, 240));
        assert_eq!(chip.scan.bits(), MADCTL_MX);
        assert_eq!(fb.written_pixels(), 1);

        chip.handle_mode(Mode::Command);
        chip.handle_bytes(&[0x2A], &mut fb);
        assert_eq!(chip.pending().2, 4);
        chip.handle_reset();
        assert_eq!(chip.pending().2, 0);
    }

    #[test]
    fn test_state_round_trip() {
        let (mut chip, mut fb) = chip();
        command(&mut chip, &mut fb, 0x36, &[MADCTL_MV | MADCTL_MY]);
        command(&mut chip, &mut fb, 0x2B, &[0x00, 10, 0x00, 20]);
        chip.handle_mode(Mode::Command);
        chip.handle_bytes(&[0xE0], &mut fb);
        chip.handle_mode(Mode::Data);
        chip.handle_bytes(&[1, 2, 3], &mut fb);

        let state = chip.save_state();
        let mut other = Gc9a01::new(240, 240);
        other.load_state(&state);
        assert_eq!(other.window, chip.window);
        assert_eq!(other.scan, chip.scan);
        assert_eq!(other.mode(), Mode::Data);
        assert_eq!(other.pending(), (Command::PositiveGamma, 3, 16));
    }
}
