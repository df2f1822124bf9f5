//! GC9A01 emulator frontend.
//!
//! Replays a host bus trace (or the built-in demo) into the emulated display
//! controller. Two execution modes:
//!
//! - **GUI mode** (default): scaled window that shows the panel while the trace
//!   plays, with screenshot, quick save/load, and reset keys.
//! - **Headless mode** (`--headless`): replays everything at once, prints
//!   statistics and optionally an ASCII rendering or a PNG screenshot.

use gc9a01_core::bus::{BusEvent, Gc9a01Device, Pin};
use gc9a01_core::{png, savestate, trace, ByteOrder, Config};
use minifb::{Key, Scale, ScaleMode, Window, WindowOptions};
use std::env;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// Default window scale
const DEFAULT_SCALE: usize = 2;
/// Largest selectable window scale
const MAX_SCALE: usize = 4;

// ─── Demo ───────────────────────────────────────────────────────────────────

/// Color bars, RGB565
const BARS: [u16; 8] = [0xFFFF, 0xFFE0, 0x07FF, 0x07E0, 0xF81F, 0xF800, 0x001F, 0x0000];

fn cmd(events: &mut Vec<BusEvent>, op: u8, args: &[u8]) {
    events.push(BusEvent::Pin(Pin::Dc, false));
    events.push(BusEvent::Spi(vec![op]));
    if !args.is_empty() {
        events.push(BusEvent::Pin(Pin::Dc, true));
        events.push(BusEvent::Spi(args.to_vec()));
    }
}

fn set_window(events: &mut Vec<BusEvent>, x0: u32, y0: u32, x1: u32, y1: u32) {
    let be = |a: u32, b: u32| [(a >> 8) as u8, a as u8, (b >> 8) as u8, b as u8];
    cmd(events, 0x2A, &be(x0, x1));
    cmd(events, 0x2B, &be(y0, y1));
    cmd(events, 0x2C, &[]);
    events.push(BusEvent::Pin(Pin::Dc, true));
}

/// Typical host init sequence, vertical color bars, and a centered square.
fn demo_events(width: u32, height: u32) -> Vec<BusEvent> {
    let mut ev = vec![
        BusEvent::Pin(Pin::Rst, false),
        BusEvent::Pin(Pin::Rst, true),
        BusEvent::Pin(Pin::Cs, false),
    ];
    cmd(&mut ev, 0x01, &[]);             // software reset
    cmd(&mut ev, 0x11, &[]);             // sleep out
    cmd(&mut ev, 0xC3, &[0x13, 0x00]);   // power control 4
    cmd(&mut ev, 0xC4, &[0x13, 0x00]);   // power control 5
    cmd(&mut ev, 0x36, &[0x08]);         // MADCTL: BGR only
    cmd(&mut ev, 0x3A, &[0x05]);         // 16 bpp
    cmd(&mut ev, 0x21, &[]);             // inversion on
    cmd(&mut ev, 0x29, &[]);             // display on

    set_window(&mut ev, 0, 0, width - 1, height - 1);
    let band = width / BARS.len() as u32;
    for _ in 0..height {
        for (i, &color) in BARS.iter().enumerate() {
            let count = if i == BARS.len() - 1 { width - band * (BARS.len() as u32 - 1) } else { band };
            ev.push(BusEvent::Fill { color, count });
        }
    }

    let (cx, cy) = (width / 2, height / 2);
    set_window(&mut ev, cx.saturating_sub(20), cy.saturating_sub(20), cx + 19, cy + 19);
    ev.push(BusEvent::Fill { color: 0x8410, count: 40 * 40 });
    ev.push(BusEvent::Pin(Pin::Cs, true));
    ev
}

// ─── Screenshot (PNG) ───────────────────────────────────────────────────────

fn save_screenshot(device: &Gc9a01Device, path: &str) -> Result<(), String> {
    let data = png::encode_png(device.chip.width(), device.chip.height(), &device.framebuffer.pixels)?;
    fs::write(path, &data).map_err(|e| format!("{}: {}", path, e))
}

fn report_diagnostics(device: &mut Gc9a01Device) {
    for diag in device.chip.take_diagnostics() {
        eprintln!("Warning: {}", diag);
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("GC9A01 round display emulator");
        eprintln!("Usage: {} <trace.txt | --demo> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --headless           Run without GUI");
        eprintln!("  --debug              Trace pins and commands, print statistics");
        eprintln!("  --scale N            Initial scale 1-4 (default 2)");
        eprintln!("  --speed N            Bus events replayed per frame (GUI, default all)");
        eprintln!("  --big-endian         Pixel samples arrive high byte first");
        eprintln!("  --size WxH           Panel size (default 240x240)");
        eprintln!("  --screenshot F       Write PNG after replay (headless)");
        eprintln!("  --snapshot           Print ASCII rendering after replay (headless)");
        eprintln!("  --load-state F       Start from a save state");
        eprintln!("  --save-state F       Save state path (F5 in GUI, end of headless run)");
        std::process::exit(1);
    }

    let source = &args[1];
    let demo = source == "--demo";
    let headless = args.iter().any(|a| a == "--headless");
    let debug = args.iter().any(|a| a == "--debug");
    let snapshot = args.iter().any(|a| a == "--snapshot");
    let big_endian = args.iter().any(|a| a == "--big-endian");

    let value_of = |flag: &str| -> Option<String> {
        args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).cloned()
    };

    let initial_scale: usize = value_of("--scale")
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SCALE)
        .clamp(1, MAX_SCALE);
    let speed: usize = value_of("--speed")
        .and_then(|s| s.parse().ok())
        .filter(|&n| n > 0)
        .unwrap_or(usize::MAX);
    let (width, height) = match value_of("--size") {
        Some(s) => match parse_size(&s) {
            Some(wh) => wh,
            None => {
                eprintln!("Invalid --size '{}', expected WxH", s);
                std::process::exit(1);
            }
        },
        None => (gc9a01_core::SCREEN_WIDTH, gc9a01_core::SCREEN_HEIGHT),
    };

    let config = Config {
        width,
        height,
        byte_order: if big_endian { ByteOrder::Big } else { ByteOrder::Little },
        debug,
        ..Config::default()
    };

    let events = if demo {
        demo_events(width, height)
    } else {
        let text = match fs::read_to_string(source) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error reading {}: {}", source, e);
                std::process::exit(1);
            }
        };
        match trace::parse_trace(&text) {
            Ok(ev) => ev,
            Err(e) => {
                eprintln!("Error parsing {}: {}", source, e);
                std::process::exit(1);
            }
        }
    };
    if debug {
        println!("Loaded {} bus events from {}", events.len(), if demo { "demo" } else { source.as_str() });
    }

    let mut device = Gc9a01Device::new(&config);
    if let Some(path) = value_of("--load-state") {
        match savestate::load_from_file(Path::new(&path), width, height)
            .and_then(|state| device.load_state(&state))
        {
            Ok(()) => eprintln!("State loaded: {}", path),
            Err(e) => {
                eprintln!("Error loading state {}: {}", path, e);
                std::process::exit(1);
            }
        }
    }

    let state_file = value_of("--save-state").unwrap_or_else(|| {
        if demo { "demo.state".to_string() } else { savestate::state_path(source) }
    });

    if headless {
        run_headless(&mut device, &events, debug, snapshot, value_of("--screenshot"), value_of("--save-state"));
    } else {
        run_gui(&mut device, &events, speed, initial_scale, debug, &state_file);
    }
}

fn parse_size(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.split_once(|c| c == 'x' || c == 'X')?;
    let (w, h) = (w.parse().ok()?, h.parse().ok()?);
    if w == 0 || h == 0 || w > u16::MAX as u32 || h > u16::MAX as u32 {
        return None;
    }
    Some((w, h))
}

// ─── GUI Mode ───────────────────────────────────────────────────────────────

fn open_window(width: usize, height: usize) -> Window {
    let mut window = Window::new(
        "GC9A01 Emulator", width, height,
        WindowOptions {
            scale: Scale::X1,
            scale_mode: ScaleMode::AspectRatioStretch,
            resize: true,
            ..Default::default()
        },
    ).expect("Failed to create window");
    window.set_target_fps(60);
    window
}

fn run_gui(
    device: &mut Gc9a01Device,
    events: &[BusEvent],
    speed: usize,
    initial_scale: usize,
    debug: bool,
    state_file: &str,
) {
    let panel_w = device.chip.width() as usize;
    let panel_h = device.chip.height() as usize;
    let mut scale = initial_scale;
    let mut scaled_w = panel_w * scale;
    let mut scaled_h = panel_h * scale;
    let mut window = open_window(scaled_w, scaled_h);
    let mut scaled_buf = vec![0u32; scaled_w * scaled_h];

    let mut cursor = 0usize;
    let mut frame_count: u64 = 0;
    let start_time = Instant::now();
    let mut last_title = Instant::now();
    let mut screenshot_n = 0u32;
    let mut prev_s = false;
    let mut prev_r = false;
    let mut prev_f5 = false;
    let mut prev_f9 = false;
    let mut prev_num = [false; MAX_SCALE];
    let mut redraw = true;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        // Scale toggle (1-4)
        let num = [
            window.is_key_down(Key::Key1), window.is_key_down(Key::Key2),
            window.is_key_down(Key::Key3), window.is_key_down(Key::Key4),
        ];
        for i in 0..MAX_SCALE {
            if num[i] && !prev_num[i] && scale != i + 1 {
                scale = i + 1;
                scaled_w = panel_w * scale;
                scaled_h = panel_h * scale;
                scaled_buf = vec![0u32; scaled_w * scaled_h];
                window = open_window(scaled_w, scaled_h);
                redraw = true;
            }
        }
        prev_num = num;

        // Screenshot (S)
        let s = window.is_key_down(Key::S);
        if s && !prev_s {
            let f = format!("screenshot_{:04}.png", screenshot_n);
            match save_screenshot(device, &f) {
                Ok(()) => { eprintln!("Screenshot: {}", f); screenshot_n += 1; }
                Err(e) => eprintln!("Screenshot error: {}", e),
            }
        }
        prev_s = s;

        // Hardware reset (R)
        let r = window.is_key_down(Key::R);
        if r && !prev_r {
            device.hardware_reset();
            eprintln!("Reset line pulsed");
        }
        prev_r = r;

        // Quick save (F5) / quick load (F9)
        let f5 = window.is_key_down(Key::F5);
        if f5 && !prev_f5 {
            match savestate::save_to_file(&device.save_state(), Path::new(state_file)) {
                Ok(()) => eprintln!("State saved: {}", state_file),
                Err(e) => eprintln!("Save error: {}", e),
            }
        }
        prev_f5 = f5;
        let f9 = window.is_key_down(Key::F9);
        if f9 && !prev_f9 {
            let (w, h) = (device.chip.width(), device.chip.height());
            match savestate::load_from_file(Path::new(state_file), w, h)
                .and_then(|state| device.load_state(&state))
            {
                Ok(()) => eprintln!("State loaded: {}", state_file),
                Err(e) => eprintln!("Load error: {}", e),
            }
        }
        prev_f9 = f9;

        // Replay
        let end = cursor.saturating_add(speed).min(events.len());
        device.apply_all(&events[cursor..end]);
        cursor = end;
        report_diagnostics(device);
        frame_count += 1;

        if device.chip.dirty || redraw {
            device.chip.dirty = false;
            redraw = false;
            let pixels = device.framebuffer.as_pixel_buffer();
            for y in 0..panel_h {
                for x in 0..panel_w {
                    let c = pixels[y * panel_w + x];
                    for sy in 0..scale {
                        let base = (y * scale + sy) * scaled_w + x * scale;
                        scaled_buf[base..base + scale].fill(c);
                    }
                }
            }
        }
        window.update_with_buffer(&scaled_buf, scaled_w, scaled_h).expect("update");

        if last_title.elapsed() >= Duration::from_millis(500) {
            window.set_title(&format!("GC9A01 Emulator - {}/{} events ({}x)",
                cursor, events.len(), scale));
            if debug {
                println!("  frame {:5}: cmd={} data={} exec={} px={} masked={}",
                    frame_count, device.chip.dbg_cmd_count, device.chip.dbg_data_count,
                    device.chip.dbg_exec_count, device.chip.dbg_pixels_written,
                    device.chip.dbg_pixels_masked);
            }
            device.chip.dbg_reset_counters();
            last_title = Instant::now();
        }
    }
    if debug {
        let e = start_time.elapsed().as_secs_f64();
        println!("{} frames in {:.1}s ({:.1} FPS), {} of {} events replayed",
            frame_count, e, frame_count as f64 / e, cursor, events.len());
    }
}

// ─── Headless Mode ──────────────────────────────────────────────────────────

fn run_headless(
    device: &mut Gc9a01Device,
    events: &[BusEvent],
    debug: bool,
    snapshot: bool,
    screenshot: Option<String>,
    save_state: Option<String>,
) {
    let t0 = Instant::now();
    device.apply_all(events);
    report_diagnostics(device);

    if debug {
        let chip = &device.chip;
        println!("Replayed {} events in {:.1} ms", events.len(), t0.elapsed().as_secs_f64() * 1000.0);
        println!("  opcodes={} data bytes={} executed={} pixels written={} masked={}",
            chip.dbg_cmd_count, chip.dbg_data_count, chip.dbg_exec_count,
            chip.dbg_pixels_written, chip.dbg_pixels_masked);
        println!("  window: col {}..={} page {}..={} cursor ({}, {}) madctl=0x{:02X} ram_write={}",
            chip.window.column_start, chip.window.column_end,
            chip.window.page_start, chip.window.page_end,
            chip.window.active_column, chip.window.active_page,
            chip.scan.bits(), chip.ram_write());
        println!("  bytes pending in SPI buffer: {}, dropped while deselected: {}",
            device.pending_bytes(), device.dbg_dropped_bytes);
    }

    if snapshot {
        print_display(device);
    }
    if let Some(path) = screenshot {
        match save_screenshot(device, &path) {
            Ok(()) => println!("Screenshot: {}", path),
            Err(e) => eprintln!("Screenshot error: {}", e),
        }
    }
    if let Some(path) = save_state {
        match savestate::save_to_file(&device.save_state(), Path::new(&path)) {
            Ok(()) => println!("State saved: {}", path),
            Err(e) => eprintln!("Save error: {}", e),
        }
    }
}

/// ASCII rendering, 4×4 panel pixels per half-block cell pair.
fn print_display(device: &Gc9a01Device) {
    let w = device.chip.width();
    let h = device.chip.height();
    let fb = &device.framebuffer;
    let lit = |x: u32, y: u32| -> bool {
        if x >= w || y >= h { return false; }
        let [r, g, b, a] = fb.pixel(x, y);
        a != 0 && (r as u32 + g as u32 + b as u32) > 192
    };
    println!("  ({} px written)", fb.written_pixels());
    for y in (0..h).step_by(8) {
        let mut l = String::with_capacity(w as usize / 4 + 4);
        l.push_str("  |");
        for x in (0..w).step_by(4) {
            let t = lit(x, y);
            let b = lit(x, y + 4);
            l.push(match (t, b) { (true, true) => '█', (true, false) => '▀', (false, true) => '▄', _ => ' ' });
        }
        l.push('|');
        println!("{}", l);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("240x240"), Some((240, 240)));
        assert_eq!(parse_size("320X240"), Some((320, 240)));
        assert_eq!(parse_size("0x240"), None);
        assert_eq!(parse_size("240"), None);
    }

    #[test]
    fn test_demo_paints_bars_and_square() {
        let mut device = Gc9a01Device::new(&Config::default());
        device.apply_all(&demo_events(240, 240));
        assert!(device.chip.take_diagnostics().is_empty());
        assert_eq!(device.pending_bytes(), 0);
        // Leftmost bar is white, square in the middle is grey
        assert_eq!(device.framebuffer.pixel(10, 120), [0xF8, 0xFC, 0xF8, 0xFF]);
        assert_eq!(device.framebuffer.pixel(120, 120), [0x80, 0x80, 0x80, 0xFF]);
        assert_eq!(device.framebuffer.pixel(0, 0), [0, 0, 0, 0]);
    }
}
