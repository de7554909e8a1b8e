//! Error types for the driver
//!
//! [`PixelError`] covers malformed pixel payloads and is raised before any
//! bus traffic. [`Error`] covers runtime protocol failures and is generic
//! over the transport so the underlying hardware error stays matchable.
//! [`AttachError`] covers the one-time initialization path.

use crate::interface::Transport;
use crate::pixel::PixelFormat;

/// Errors raised by the pixel codec, before any I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelError {
    /// The format has no byte-aligned packed representation.
    UnsupportedFormat(PixelFormat),
    /// Input length is not a multiple of the pack factor.
    InvalidBufferLength {
        /// Length of the supplied pixel buffer.
        len: usize,
        /// Number of pixels packed into each output byte.
        group: usize,
    },
}

impl core::fmt::Display for PixelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PixelError::UnsupportedFormat(format) => {
                write!(f, "No packed representation for {format:?}")
            }
            PixelError::InvalidBufferLength { len, group } => {
                write!(f, "Buffer length {len} is not a multiple of {group}")
            }
        }
    }
}

impl core::error::Error for PixelError {}

/// Errors that can occur when talking to the controller.
///
/// Transport failures are surfaced as-is and never retried at this layer;
/// the caller owns retry and backoff policy.
pub enum Error<T: Transport> {
    /// Bus I/O failure in the underlying transport.
    Transport(T::Error),
    /// Caller supplied a pixel payload the codec rejects.
    Pixel(PixelError),
    /// VCOM voltage outside the safe open range (-5.0, 0.0) volts.
    ///
    /// The bound is a hardware safety margin, not a device-reported limit.
    VcomOutOfRange(f32),
}

impl<T: Transport> From<PixelError> for Error<T> {
    fn from(error: PixelError) -> Self {
        Self::Pixel(error)
    }
}

// Manual impl: deriving would demand `T: Debug`, but only `T::Error` is
// ever formatted, and the transport contract already requires that.
impl<T: Transport> core::fmt::Debug for Error<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Transport(inner) => f.debug_tuple("Transport").field(inner).finish(),
            Error::Pixel(inner) => f.debug_tuple("Pixel").field(inner).finish(),
            Error::VcomOutOfRange(volts) => f.debug_tuple("VcomOutOfRange").field(volts).finish(),
        }
    }
}

impl<T: Transport> core::fmt::Display for Error<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Transport(_) => write!(f, "Transport error"),
            Error::Pixel(inner) => write!(f, "Pixel payload rejected: {inner}"),
            Error::VcomOutOfRange(volts) => {
                write!(f, "VCOM {volts} V outside the safe (-5.0, 0.0) range")
            }
        }
    }
}

impl<T: Transport> core::error::Error for Error<T> {}

/// Errors from [`Controller::attach`](crate::controller::Controller::attach).
pub enum AttachError<T: Transport> {
    /// The device info block read back all zeroes: the bus works but no
    /// controller is answering.
    NoDevice,
    /// A command failed while bringing the controller up.
    Init(Error<T>),
}

impl<T: Transport> From<Error<T>> for AttachError<T> {
    fn from(error: Error<T>) -> Self {
        Self::Init(error)
    }
}

impl<T: Transport> core::fmt::Debug for AttachError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AttachError::NoDevice => f.write_str("NoDevice"),
            AttachError::Init(inner) => f.debug_tuple("Init").field(inner).finish(),
        }
    }
}

impl<T: Transport> core::fmt::Display for AttachError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AttachError::NoDevice => write!(f, "No device responded to the info query"),
            AttachError::Init(inner) => write!(f, "Attach failed: {inner}"),
        }
    }
}

impl<T: Transport> core::error::Error for AttachError<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    // A transport that is itself not Debug; only its error type is.
    struct BareTransport;

    impl Transport for BareTransport {
        type Error = core::convert::Infallible;

        fn send_command(&mut self, _opcode: u16, _args: &[u16]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn write_data(&mut self, _words: &[u16]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn read_data(&mut self, _out: &mut [u16]) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn errors_format_without_transport_debug() {
        let error: Error<BareTransport> = Error::VcomOutOfRange(-6.0);
        assert_eq!(alloc::format!("{error:?}"), "VcomOutOfRange(-6.0)");

        let attach: AttachError<BareTransport> = AttachError::NoDevice;
        assert_eq!(alloc::format!("{attach:?}"), "NoDevice");
    }
}
