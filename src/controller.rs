//! Controller protocol
//!
//! Translates high-level intents (attach, VCOM calibration, image loads,
//! refresh triggers, power states) into the command/register sequences the
//! IT8951 expects, over any [`Transport`].

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;

use log::{debug, trace};

use crate::command;
use crate::error::{AttachError, Error};
use crate::interface::Transport;
use crate::mode::{Rotation, WaveformMode};
use crate::pixel::{self, PixelFormat};

/// Endianness field of the image-load argument word. The data phase is
/// always streamed big-endian.
const ENDIAN_BIG: u16 = 1;

/// Poll interval while the display engine reports busy.
const BUSY_POLL_MS: u32 = 10;

/// Identity of the attached panel, captured once from the device info query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Panel width in pixels.
    pub width: u16,
    /// Panel height in pixels.
    pub height: u16,
    /// Base address of the controller's image buffer.
    pub image_buffer_base: u32,
    /// Firmware version string, NUL padding trimmed.
    pub firmware_version: String,
    /// Waveform LUT version string, NUL padding trimmed.
    pub lut_version: String,
}

impl DeviceInfo {
    /// Parse the 20-word info block.
    ///
    /// Layout: width, height, buffer address low word, buffer address high
    /// word, then two 8-word version strings holding two ASCII bytes per
    /// word, high byte first.
    fn parse(raw: &[u16; command::DEVICE_INFO_WORDS]) -> Self {
        Self {
            width: raw[0],
            height: raw[1],
            image_buffer_base: (u32::from(raw[3]) << 16) | u32::from(raw[2]),
            firmware_version: decode_version(&raw[4..12]),
            lut_version: decode_version(&raw[12..20]),
        }
    }
}

/// Unpack a version string field, two ASCII bytes per word, high byte first.
fn decode_version(words: &[u16]) -> String {
    let mut text = String::with_capacity(words.len() * 2);
    for &word in words {
        text.push(char::from((word >> 8) as u8));
        text.push(char::from((word & 0xFF) as u8));
    }
    String::from(text.trim_end_matches('\0'))
}

/// Protocol driver for an attached IT8951.
///
/// Owns the transport and the immutable [`DeviceInfo`] captured at attach
/// time. All operations block until the bus exchange completes; none are
/// retried internally.
pub struct Controller<T: Transport> {
    /// Word-level bus transport.
    transport: T,
    /// Panel identity, fixed at attach.
    info: DeviceInfo,
}

impl<T: Transport> Controller<T> {
    /// Attach to the controller and bring it to a usable state.
    ///
    /// Queries the device info block, programs the image buffer base address
    /// into the two `LISAR` registers (high word first), enables packed bus
    /// mode, and sets VCOM. There is no retry: a dead bus or an all-zero
    /// info block fails the attach and the caller decides what to do.
    ///
    /// # Errors
    ///
    /// Returns [`AttachError::NoDevice`] if the info block reads all zero,
    /// or [`AttachError::Init`] if any command of the sequence fails.
    pub fn attach(mut transport: T, vcom_volts: f32) -> Result<Self, AttachError<T>> {
        debug!("Query device info");
        transport
            .send_command(command::GET_DEV_INFO, &[])
            .map_err(|e| AttachError::Init(Error::Transport(e)))?;

        let mut raw = [0u16; command::DEVICE_INFO_WORDS];
        transport
            .read_data(&mut raw)
            .map_err(|e| AttachError::Init(Error::Transport(e)))?;

        if raw.iter().all(|&word| word == 0) {
            return Err(AttachError::NoDevice);
        }

        let info = DeviceInfo::parse(&raw);
        debug!(
            "Attached: {}x{} panel, image buffer at {:#010x}, firmware {}, LUT {}",
            info.width, info.height, info.image_buffer_base, info.firmware_version, info.lut_version
        );

        let mut controller = Self { transport, info };

        let base = controller.info.image_buffer_base;
        controller.write_register(command::LISAR + 2, (base >> 16) as u16)?;
        controller.write_register(command::LISAR, (base & 0xFFFF) as u16)?;

        // Enable packed bus mode
        controller.write_register(command::I80CPCR, 0x0001)?;

        controller.set_vcom(vcom_volts)?;

        Ok(controller)
    }

    /// Panel identity captured at attach time.
    pub fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Detach and return the transport.
    pub fn detach(self) -> T {
        self.transport
    }

    /// Read the panel's VCOM calibration.
    ///
    /// Returns the magnitude in volts of the negative bias voltage; the
    /// device stores and reports positive millivolts.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus exchange fails.
    pub fn get_vcom(&mut self) -> Result<f32, Error<T>> {
        self.send_command(command::VCOM, &[0])?;
        let millivolts = self.transport.read_word().map_err(Error::Transport)?;
        Ok(f32::from(millivolts) / 1000.0)
    }

    /// Set the panel's VCOM calibration, in volts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VcomOutOfRange`] unless `volts` lies strictly
    /// between -5.0 and 0.0.
    pub fn set_vcom(&mut self, volts: f32) -> Result<(), Error<T>> {
        if !(-5.0 < volts && volts < 0.0) {
            return Err(Error::VcomOutOfRange(volts));
        }
        let millivolts = (-volts * 1000.0 + 0.5) as u16;
        debug!("Set VCOM to -{millivolts} mV");
        self.send_command(command::VCOM, &[1, millivolts])
    }

    /// Read a 16-bit controller register.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus exchange fails.
    pub fn read_register(&mut self, address: u16) -> Result<u16, Error<T>> {
        self.send_command(command::REG_RD, &[address])?;
        self.transport.read_word().map_err(Error::Transport)
    }

    /// Write a 16-bit controller register.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus exchange fails.
    pub fn write_register(&mut self, address: u16, value: u16) -> Result<(), Error<T>> {
        self.send_command(command::REG_WR, &[address])?;
        self.transport.write_data(&[value]).map_err(Error::Transport)
    }

    /// Load pixel data into the controller's image buffer.
    ///
    /// The payload is packed to `format` before the first command word goes
    /// out, so a rejected payload leaves no command half-issued. A region
    /// covering the whole panel uses the whole-image load command; anything
    /// smaller carries its origin and dimensions. This only fills controller
    /// memory; see [`display_area`](Self::display_area) for the refresh.
    ///
    /// Callers must not invoke this while the display engine is busy; call
    /// [`wait_display_ready`](Self::wait_display_ready) first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pixel`] for a malformed payload (before any I/O),
    /// or [`Error::Transport`] if the bus exchange fails.
    #[allow(clippy::too_many_arguments)]
    pub fn load_image_area(
        &mut self,
        pixels: &[u8],
        format: PixelFormat,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        rotation: Rotation,
    ) -> Result<(), Error<T>> {
        // Pack first: a codec rejection must leave the wire untouched.
        let packed = pixel::pack(pixels, format)?;

        let arg = (ENDIAN_BIG << 8) | (format.wire_value() << 4) | rotation.wire_value();
        let full_panel = x == 0 && y == 0 && width == self.info.width && height == self.info.height;

        trace!("Load {width}x{height} area at ({x}, {y}), {format:?}");
        if full_panel {
            self.send_command(command::LD_IMG, &[arg])?;
        } else {
            self.send_command(command::LD_IMG_AREA, &[arg, x, y, width, height])?;
        }

        self.transport
            .write_data(&wire_words(&packed))
            .map_err(Error::Transport)?;

        self.send_command(command::LD_IMG_END, &[])
    }

    /// Refresh a region of the panel from controller memory with `mode`.
    ///
    /// Returns as soon as the trigger is issued; the refresh runs in the
    /// display engine. Callers must check
    /// [`wait_display_ready`](Self::wait_display_ready) before the next
    /// load or trigger.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus exchange fails.
    pub fn display_area(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        mode: WaveformMode,
    ) -> Result<(), Error<T>> {
        trace!("Refresh {width}x{height} area at ({x}, {y}) with {mode:?}");
        self.send_command(command::DPY_AREA, &[x, y, width, height, mode.wire_value()])
    }

    /// Block until the display engine is idle.
    ///
    /// Polls the LUT status register every 10 ms. There is no built-in
    /// timeout; callers needing a deadline must enforce it around this call.
    ///
    /// # Errors
    ///
    /// Returns an error if a status read fails.
    pub fn wait_display_ready<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<T>> {
        while self.read_register(command::LUTAFSR)? != 0 {
            delay.delay_ms(BUSY_POLL_MS);
        }
        Ok(())
    }

    /// Leave standby or sleep.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus exchange fails.
    pub fn run(&mut self) -> Result<(), Error<T>> {
        self.send_command(command::SYS_RUN, &[])
    }

    /// Enter standby.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus exchange fails.
    pub fn standby(&mut self) -> Result<(), Error<T>> {
        self.send_command(command::STANDBY, &[])
    }

    /// Enter deep sleep.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus exchange fails.
    pub fn sleep(&mut self) -> Result<(), Error<T>> {
        self.send_command(command::SLEEP, &[])
    }

    /// Send a command to the controller.
    fn send_command(&mut self, opcode: u16, args: &[u16]) -> Result<(), Error<T>> {
        self.transport
            .send_command(opcode, args)
            .map_err(Error::Transport)
    }
}

/// Pair packed bytes into big-endian data words, zero-padding a trailing
/// odd byte.
fn wire_words(packed: &[u8]) -> Vec<u16> {
    packed
        .chunks(2)
        .map(|pair| {
            let low = pair.get(1).copied().unwrap_or(0);
            u16::from_be_bytes([pair[0], low])
        })
        .collect()
}
