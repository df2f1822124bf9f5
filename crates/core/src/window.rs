//! Column/page addressing window and the MADCTL orientation transform.
//!
//! The controller writes pixels at a cursor that walks an inclusive
//! `[column_start, column_end] × [page_start, page_end]` rectangle. Where the
//! cursor lands on the glass depends on the three orientation flags set by
//! MADCTL: a row/column exchange and two mirrors.

use serde::{Serialize, Deserialize};

/// MADCTL bit: row address order (vertical mirror)
pub const MADCTL_MY: u8 = 0x80;
/// MADCTL bit: column address order (horizontal mirror)
pub const MADCTL_MX: u8 = 0x40;
/// MADCTL bit: row/column exchange
pub const MADCTL_MV: u8 = 0x20;

/// Orientation flags latched from the MADCTL parameter byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDirection {
    pub vertical_mirror: bool,
    pub horizontal_mirror: bool,
    pub swap: bool,
}

impl ScanDirection {
    /// Only the top three bits matter; RGB/BGR order and refresh
    /// direction bits are ignored.
    pub fn from_madctl(byte: u8) -> Self {
        ScanDirection {
            vertical_mirror: byte & MADCTL_MY != 0,
            horizontal_mirror: byte & MADCTL_MX != 0,
            swap: byte & MADCTL_MV != 0,
        }
    }

    pub fn bits(&self) -> u8 {
        (if self.vertical_mirror { MADCTL_MY } else { 0 })
            | (if self.horizontal_mirror { MADCTL_MX } else { 0 })
            | (if self.swap { MADCTL_MV } else { 0 })
    }

    /// Map a `(column, page)` cursor to device `(x, y)`.
    ///
    /// Coordinates are signed: a page that wrapped below zero through the
    /// row offset lands far outside the panel instead of aliasing onto it.
    pub fn to_device(&self, column: u32, page: u32, width: u32, height: u32) -> (i64, i64) {
        if self.swap {
            (
                mirror(page, width, self.horizontal_mirror),
                mirror(column, height, self.vertical_mirror),
            )
        } else {
            (
                mirror(column, width, self.horizontal_mirror),
                mirror(page, height, self.vertical_mirror),
            )
        }
    }
}

fn mirror(value: u32, size: u32, enabled: bool) -> i64 {
    if enabled {
        size as i64 - 1 - value as i64
    } else {
        value as i64
    }
}

/// Inclusive addressing window with its write cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressWindow {
    pub active_column: u32,
    pub active_page: u32,
    pub column_start: u32,
    pub column_end: u32,
    pub page_start: u32,
    pub page_end: u32,
}

impl AddressWindow {
    /// Whole-panel window with the cursor at the origin.
    pub fn full(width: u32, height: u32) -> Self {
        AddressWindow {
            active_column: 0,
            active_page: 0,
            column_start: 0,
            column_end: width.saturating_sub(1),
            page_start: 0,
            page_end: height.saturating_sub(1),
        }
    }

    pub fn set_columns(&mut self, start: u32, end: u32) {
        self.column_start = start;
        self.column_end = end;
        self.active_column = start;
    }

    pub fn set_pages(&mut self, start: u32, end: u32) {
        self.page_start = start;
        self.page_end = end;
        self.active_page = start;
    }

    /// Step the cursor one pixel.
    ///
    /// With `swap` the page moves fastest (column-major fill), otherwise the
    /// column does. Each axis reloads its start once it passes its end; a
    /// window with `start > end` reloads on every step.
    pub fn advance(&mut self, swap: bool) {
        if swap {
            if step(&mut self.active_page, self.page_start, self.page_end) {
                step(&mut self.active_column, self.column_start, self.column_end);
            }
        } else if step(&mut self.active_column, self.column_start, self.column_end) {
            step(&mut self.active_page, self.page_start, self.page_end);
        }
    }
}

/// Increment `cursor`, reloading `start` past `end`. Returns true on wrap.
fn step(cursor: &mut u32, start: u32, end: u32) -> bool {
    if *cursor >= end {
        *cursor = start;
        true
    } else {
        *cursor += 1;
        false
    }
}
