//! GC9A01 command set.
//!
//! Every opcode the controller understands is a variant of [`Command`]. The
//! number of parameter bytes that follow an opcode on the bus is a property of
//! the command itself ([`Command::arg_count`]), so the protocol state machine
//! never carries a separate opcode table.

/// Largest parameter block of any command (gamma correction tables).
pub const MAX_ARGS: usize = 16;

/// Decoded controller opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 0x00
    Nop,
    /// 0x01
    SoftwareReset,
    /// 0x10
    SleepIn,
    /// 0x11
    SleepOut,
    /// 0x20
    InversionOff,
    /// 0x21
    InversionOn,
    /// 0x28
    DisplayOff,
    /// 0x29
    DisplayOn,
    /// 0x2A — column address set (start/end, big-endian u16 each)
    ColumnAddressSet,
    /// 0x2B — page (row) address set
    PageAddressSet,
    /// 0x2C — start pixel transfer
    MemoryWrite,
    /// 0x36 — MADCTL, orientation and mirroring
    MemoryAccessControl,
    /// 0x3A — COLMOD
    PixelFormatSet,
    /// 0xB1
    FrameRateControl1,
    /// 0xB2
    FrameRateControl2,
    /// 0xB3
    FrameRateControl3,
    /// 0xB4
    InversionControl,
    /// 0xB6
    DisplaySettings5,
    /// 0xC0
    PowerControl1,
    /// 0xC1
    PowerControl2,
    /// 0xC2
    PowerControl3,
    /// 0xC3
    PowerControl4,
    /// 0xC4
    PowerControl5,
    /// 0xC5
    VcomControl,
    /// 0xE0
    PositiveGamma,
    /// 0xE1
    NegativeGamma,
    /// Anything else; executes as a zero-argument command.
    Unknown(u8),
}

impl Command {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Command::Nop,
            0x01 => Command::SoftwareReset,
            0x10 => Command::SleepIn,
            0x11 => Command::SleepOut,
            0x20 => Command::InversionOff,
            0x21 => Command::InversionOn,
            0x28 => Command::DisplayOff,
            0x29 => Command::DisplayOn,
            0x2A => Command::ColumnAddressSet,
            0x2B => Command::PageAddressSet,
            0x2C => Command::MemoryWrite,
            0x36 => Command::MemoryAccessControl,
            0x3A => Command::PixelFormatSet,
            0xB1 => Command::FrameRateControl1,
            0xB2 => Command::FrameRateControl2,
            0xB3 => Command::FrameRateControl3,
            0xB4 => Command::InversionControl,
            0xB6 => Command::DisplaySettings5,
            0xC0 => Command::PowerControl1,
            0xC1 => Command::PowerControl2,
            0xC2 => Command::PowerControl3,
            0xC3 => Command::PowerControl4,
            0xC4 => Command::PowerControl5,
            0xC5 => Command::VcomControl,
            0xE0 => Command::PositiveGamma,
            0xE1 => Command::NegativeGamma,
            other => Command::Unknown(other),
        }
    }

    pub fn opcode(self) -> u8 {
        match self {
            Command::Nop => 0x00,
            Command::SoftwareReset => 0x01,
            Command::SleepIn => 0x10,
            Command::SleepOut => 0x11,
            Command::InversionOff => 0x20,
            Command::InversionOn => 0x21,
            Command::DisplayOff => 0x28,
            Command::DisplayOn => 0x29,
            Command::ColumnAddressSet => 0x2A,
            Command::PageAddressSet => 0x2B,
            Command::MemoryWrite => 0x2C,
            Command::MemoryAccessControl => 0x36,
            Command::PixelFormatSet => 0x3A,
            Command::FrameRateControl1 => 0xB1,
            Command::FrameRateControl2 => 0xB2,
            Command::FrameRateControl3 => 0xB3,
            Command::InversionControl => 0xB4,
            Command::DisplaySettings5 => 0xB6,
            Command::PowerControl1 => 0xC0,
            Command::PowerControl2 => 0xC1,
            Command::PowerControl3 => 0xC2,
            Command::PowerControl4 => 0xC3,
            Command::PowerControl5 => 0xC4,
            Command::VcomControl => 0xC5,
            Command::PositiveGamma => 0xE0,
            Command::NegativeGamma => 0xE1,
            Command::Unknown(op) => op,
        }
    }

    /// Number of parameter bytes the host sends after the opcode.
    pub fn arg_count(self) -> usize {
        match self {
            Command::MemoryAccessControl
            | Command::PowerControl2
            | Command::InversionControl
            | Command::VcomControl
            | Command::PixelFormatSet => 1,
            Command::PowerControl3
            | Command::PowerControl4
            | Command::PowerControl5
            | Command::DisplaySettings5 => 2,
            Command::FrameRateControl1
            | Command::FrameRateControl2
            | Command::PowerControl1 => 3,
            Command::ColumnAddressSet | Command::PageAddressSet => 4,
            Command::FrameRateControl3 => 6,
            Command::PositiveGamma | Command::NegativeGamma => 16,
            Command::Nop
            | Command::SoftwareReset
            | Command::SleepIn
            | Command::SleepOut
            | Command::InversionOff
            | Command::InversionOn
            | Command::DisplayOff
            | Command::DisplayOn
            | Command::MemoryWrite
            | Command::Unknown(_) => 0,
        }
    }
}
