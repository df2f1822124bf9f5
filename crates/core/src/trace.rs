//! Text bus-trace parser.
//!
//! A trace records what a host did to the display lines, one action per line:
//!
//! ```text
//! # select, then set a 10x10 window and paint it red
//! cs 0
//! cmd 2a 00 6e 00 77
//! cmd 2b 00 6e 00 77
//! cmd 2c
//! fill f800 100
//! cs 1
//! ```
//!
//! `cs`, `dc`, `rst` take a level (`0`/`1`), `spi` takes raw bytes, `cmd`
//! expands to DC low + opcode and (with parameters) DC high + parameters, and
//! `fill` streams a repeated RGB565 color with DC high. `#` starts a comment.
//! Hex values may carry a `0x` prefix.

use crate::bus::{BusEvent, Pin};

/// Parse a bus trace into events.
pub fn parse_trace(text: &str) -> Result<Vec<BusEvent>, String> {
    let mut events = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        parse_line(line, &mut events).map_err(|e| format!("line {}: {}", index + 1, e))?;
    }

    Ok(events)
}

fn parse_line(line: &str, events: &mut Vec<BusEvent>) -> Result<(), String> {
    let mut words = line.split_whitespace();
    let keyword = words.next().unwrap_or("").to_ascii_lowercase();
    let operands: Vec<&str> = words.collect();

    match keyword.as_str() {
        "cs" | "dc" | "rst" => {
            let pin = match keyword.as_str() {
                "cs" => Pin::Cs,
                "dc" => Pin::Dc,
                _ => Pin::Rst,
            };
            let [level] = operands[..] else {
                return Err(format!("{} takes one level", keyword));
            };
            events.push(BusEvent::Pin(pin, parse_level(level)?));
        }
        "spi" => {
            if operands.is_empty() {
                return Err("spi needs at least one byte".into());
            }
            events.push(BusEvent::Spi(parse_bytes(&operands)?));
        }
        "cmd" => {
            let Some((op, args)) = operands.split_first() else {
                return Err("cmd needs an opcode".into());
            };
            events.push(BusEvent::Pin(Pin::Dc, false));
            events.push(BusEvent::Spi(vec![parse_u8(op)?]));
            if !args.is_empty() {
                events.push(BusEvent::Pin(Pin::Dc, true));
                events.push(BusEvent::Spi(parse_bytes(args)?));
            }
        }
        "fill" => {
            let [color, count] = operands[..] else {
                return Err("fill takes a color and a count".into());
            };
            let color = u16::from_str_radix(strip_hex(color), 16)
                .map_err(|_| format!("Invalid color: {}", color))?;
            let count: u32 = count.parse()
                .map_err(|_| format!("Invalid count: {}", count))?;
            events.push(BusEvent::Pin(Pin::Dc, true));
            events.push(BusEvent::Fill { color, count });
        }
        other => return Err(format!("Unknown keyword: {}", other)),
    }
    Ok(())
}

fn parse_level(s: &str) -> Result<bool, String> {
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(format!("Invalid level: {}", s)),
    }
}

fn parse_bytes(words: &[&str]) -> Result<Vec<u8>, String> {
    words.iter().map(|w| parse_u8(w)).collect()
}

fn parse_u8(s: &str) -> Result<u8, String> {
    u8::from_str_radix(strip_hex(s), 16).map_err(|_| format!("Invalid byte: {}", s))
}

fn strip_hex(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}
