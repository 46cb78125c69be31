//! SSD1306 opcodes and geometry

/// Default bus address of the panel (SA0 tied high)
pub const DEFAULT_ADDRESS: u8 = 0x3D;

/// Display width in columns
pub const COLUMNS: usize = 128;
/// Display height in pixels
pub const HEIGHT: usize = 64;
/// Display RAM pages (8 pixel rows each)
pub const PAGES: usize = HEIGHT / 8;

/// Control byte: the following byte is a command
pub const CONTROL_COMMAND: u8 = 0x00;
/// Control byte: the following byte goes to display RAM
pub const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
pub mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_RANGE: u8 = 0x21;
    pub const SET_PAGE_RANGE: u8 = 0x22;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const RESUME_FROM_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;

    /// Operands
    pub const CLOCK_DIV_DEFAULT: u8 = 0x80;
    pub const MUX_64: u8 = 0x3F;
    pub const CHARGE_PUMP_ENABLE: u8 = 0x14;
    pub const MODE_HORIZONTAL: u8 = 0x00;
    pub const MODE_VERTICAL: u8 = 0x01;
    pub const MODE_PAGE: u8 = 0x02;
    pub const COM_PINS_ALT: u8 = 0x12;
    pub const CONTRAST_HIGH: u8 = 0xCF;
    pub const PRECHARGE_INTERNAL: u8 = 0xF1;
    pub const VCOMH_077: u8 = 0x40;
}

/// Bring-up sequence for a 128x64 panel on the internal charge pump
///
/// Sent one command transfer per byte, operands included. Panel off first,
/// panel on last.
pub const INIT_SEQUENCE: [u8; 25] = [
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    cmd::CLOCK_DIV_DEFAULT,
    cmd::SET_MUX_RATIO,
    cmd::MUX_64,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    cmd::CHARGE_PUMP_ENABLE,
    cmd::SET_MEMORY_MODE,
    cmd::MODE_HORIZONTAL,
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    cmd::COM_PINS_ALT,
    cmd::SET_CONTRAST,
    cmd::CONTRAST_HIGH,
    cmd::SET_PRECHARGE,
    cmd::PRECHARGE_INTERNAL,
    cmd::SET_VCOM_DETECT,
    cmd::VCOMH_077,
    cmd::RESUME_FROM_RAM,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

/// Page-select command for `page` (0-7)
pub const fn page_select(page: u8) -> u8 {
    cmd::SET_PAGE_ADDR + (page & 0x07)
}
