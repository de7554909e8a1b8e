// IT8951 command and register definitions

// System power state
pub const SYS_RUN: u16 = 0x0001; // Leave standby/sleep
pub const STANDBY: u16 = 0x0002; // Enter standby
pub const SLEEP: u16 = 0x0003; // Enter deep sleep

// Register access
pub const REG_RD: u16 = 0x0010; // Read a 16-bit register
pub const REG_WR: u16 = 0x0011; // Write a 16-bit register

// Image loading
pub const LD_IMG: u16 = 0x0020; // Start whole-frame image load
pub const LD_IMG_AREA: u16 = 0x0021; // Start area image load
pub const LD_IMG_END: u16 = 0x0022; // End image load

// Waveshare user-defined commands
pub const DPY_AREA: u16 = 0x0034; // Trigger area refresh
pub const DPY_BUF_AREA: u16 = 0x0037; // Trigger area refresh from explicit buffer
pub const VCOM: u16 = 0x0039; // Get (arg 0) or set (arg 1) VCOM
pub const GET_DEV_INFO: u16 = 0x0302; // Query the 20-word device info block

// Register map. Offsets are fixed by the controller and must not change.
pub const DISPLAY_REG_BASE: u16 = 0x1000; // Display engine register space
pub const LUTAFSR: u16 = DISPLAY_REG_BASE + 0x224; // All LUT engines status, non-zero while busy
pub const I80CPCR: u16 = 0x0004; // Packed-bus mode control
pub const MEMORY_REG_BASE: u16 = 0x0200; // Memory controller register space
pub const LISAR: u16 = MEMORY_REG_BASE + 0x008; // Image buffer address low word (high word at +2)

/// Number of 16-bit words in the device info response.
pub const DEVICE_INFO_WORDS: usize = 20;
