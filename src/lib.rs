//! Driver for the IT8951 e-paper controller.
//!
//! The IT8951 drives large electrophoretic panels and is reached over a
//! word-oriented command/data bus with a separate ready line. This crate
//! splits the work in three layers:
//!
//! - [`Transport`]/[`SpiTransport`] — the word-level bus, implemented for
//!   embedded-hal v1.0 SPI plus two GPIO pins.
//! - [`Controller`] — the command protocol: attach and device identity,
//!   VCOM calibration, register access, image loads, refresh triggers and
//!   power states.
//! - [`AutoDisplay`] — change tracking over a logical grayscale frame, so
//!   only the region that actually changed is resent, with gray-change
//!   accumulation across fast binary refreshes.
//!
//! `AutoDisplay` is generic over [`FrameSink`], so the same tracking logic
//! drives real hardware ([`PanelSink`]) or a host-side surface
//! ([`PreviewSink`]).
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut transport = SpiTransport::new(spi, hrdy, rst);
//! transport.hardware_reset(&mut delay)?;
//!
//! let controller = Controller::attach(transport, -2.06)?;
//! let info = controller.device_info().clone();
//!
//! let sink = PanelSink::new(controller, delay);
//! let mut display = AutoDisplay::with_gray_tracking(sink, info.width, info.height, true);
//!
//! display.clear()?;
//! display.set_pixel(10, 10, 0x00);
//! display.partial_refresh(WaveformMode::Du)?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unreachable,
        clippy::unwrap_used
    )
)]

extern crate alloc;

pub mod command;
mod controller;
mod error;
#[cfg(feature = "graphics")]
mod graphics;
mod interface;
mod mode;
pub mod pixel;
mod preview;
pub mod region;
mod tracking;

pub use controller::{Controller, DeviceInfo};
pub use error::{AttachError, Error, PixelError};
pub use interface::{SpiTransport, Transport, TransportError};
pub use mode::{Rotation, WaveformMode};
pub use pixel::PixelFormat;
pub use preview::{PreviewSink, Refresh};
pub use region::Region;
pub use tracking::{AutoDisplay, FrameSink, PanelSink, BLACK, WHITE};
