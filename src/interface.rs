//! Word-level bus transport
//!
//! The IT8951 speaks a 16-bit command/data protocol over its serial bus,
//! with a separate ready line (HRDY) gating every exchange. [`Transport`]
//! captures exactly that contract; [`SpiTransport`] implements it for
//! embedded-hal v1.0 SPI plus two GPIO pins.
//!
//! All operations are synchronous and blocking, and the transport owns the
//! chip-select/ready handshake beneath the word abstraction. Exactly one
//! command/data sequence is in flight at a time.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::{Operation, SpiDevice};

use log::trace;

/// Word preamble opening a command phase.
const PREAMBLE_COMMAND: [u8; 2] = [0x60, 0x00];
/// Word preamble opening a data write phase.
const PREAMBLE_WRITE: [u8; 2] = [0x00, 0x00];
/// Word preamble opening a data read phase (one dummy word follows).
const PREAMBLE_READ: [u8; 2] = [0x10, 0x00];

/// Blocking word-level transport to the controller.
///
/// Implementations must not return until the exchange completes, and must
/// handle any ready-line handshaking below this abstraction.
pub trait Transport {
    /// Error type for bus operations.
    type Error: Debug;

    /// Send a command opcode followed by its argument words.
    ///
    /// The opcode travels in a command phase; each argument is a data write
    /// phase in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus exchange fails.
    fn send_command(&mut self, opcode: u16, args: &[u16]) -> Result<(), Self::Error>;

    /// Write a sequence of data words.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus exchange fails.
    fn write_data(&mut self, words: &[u16]) -> Result<(), Self::Error>;

    /// Read `out.len()` data words from the controller.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus exchange fails.
    fn read_data(&mut self, out: &mut [u16]) -> Result<(), Self::Error>;

    /// Read a single data word.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus exchange fails.
    fn read_word(&mut self) -> Result<u16, Self::Error> {
        let mut word = [0u16; 1];
        self.read_data(&mut word)?;
        Ok(word[0])
    }
}

/// Errors that can occur at the transport level.
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum TransportError<SpiErr, PinErr> {
    /// SPI communication error.
    Spi(SpiErr),
    /// GPIO pin error.
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for TransportError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransportError::Spi(e) => write!(f, "SPI error: {e:?}"),
            TransportError::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for TransportError<SpiErr, PinErr> {}

/// SPI transport for the IT8951.
///
/// Every exchange opens with a 16-bit preamble selecting the phase (command,
/// write, or read), and reads insert one dummy word before the payload.
/// Words are big-endian on the byte-oriented bus. HRDY is polled high before
/// each transaction; chip select belongs to the [`SpiDevice`].
pub struct SpiTransport<SPI, READY, RST> {
    /// SPI device for communication.
    spi: SPI,
    /// Ready pin (HRDY, high when the controller can accept a transfer).
    ready: READY,
    /// Reset pin (active low).
    rst: RST,
}

impl<SPI, READY, RST, PinErr> SpiTransport<SPI, READY, RST>
where
    SPI: SpiDevice,
    READY: InputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    PinErr: Debug,
{
    /// Create a new SPI transport.
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI device (must implement [`SpiDevice`])
    /// * `ready` - HRDY pin (input, high when ready)
    /// * `rst` - Reset pin (output, active low)
    pub fn new(spi: SPI, ready: READY, rst: RST) -> Self {
        Self { spi, ready, rst }
    }

    /// Pulse the reset line and give the controller time to boot.
    ///
    /// Required once before attaching on real hardware.
    ///
    /// # Errors
    ///
    /// Returns an error if driving the reset pin fails.
    pub fn hardware_reset<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<(), TransportError<SPI::Error, PinErr>> {
        self.rst.set_high().map_err(TransportError::Pin)?;
        delay.delay_ms(10);
        self.rst.set_low().map_err(TransportError::Pin)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(TransportError::Pin)?;
        delay.delay_ms(100);
        Ok(())
    }

    /// Release the transport and return the inner hardware.
    pub fn release(self) -> (SPI, READY, RST) {
        (self.spi, self.ready, self.rst)
    }

    /// Spin until HRDY reports the controller can take a transfer.
    fn wait_ready(&mut self) -> Result<(), TransportError<SPI::Error, PinErr>> {
        while self.ready.is_low().map_err(TransportError::Pin)? {}
        Ok(())
    }

    /// One preamble-plus-payload write with chip select held low.
    fn write_phase(
        &mut self,
        preamble: [u8; 2],
        payload: &[u8],
    ) -> Result<(), TransportError<SPI::Error, PinErr>> {
        self.wait_ready()?;
        self.spi
            .transaction(&mut [Operation::Write(&preamble), Operation::Write(payload)])
            .map_err(TransportError::Spi)
    }
}

/// Big-endian byte image of a word slice.
fn to_wire_bytes(words: &[u16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 2);
    for word in words {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    bytes
}

impl<SPI, READY, RST, PinErr> Transport for SpiTransport<SPI, READY, RST>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    READY: InputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = TransportError<SPI::Error, PinErr>;

    fn send_command(&mut self, opcode: u16, args: &[u16]) -> Result<(), Self::Error> {
        trace!("Command {opcode:#06x} with {} args", args.len());
        self.write_phase(PREAMBLE_COMMAND, &opcode.to_be_bytes())?;
        for &arg in args {
            self.write_data(&[arg])?;
        }
        Ok(())
    }

    fn write_data(&mut self, words: &[u16]) -> Result<(), Self::Error> {
        let bytes = to_wire_bytes(words);
        trace!("Write {} data words", words.len());
        self.write_phase(PREAMBLE_WRITE, &bytes)
    }

    fn read_data(&mut self, out: &mut [u16]) -> Result<(), Self::Error> {
        trace!("Read {} data words", out.len());

        let mut dummy = [0u8; 2];
        let mut bytes = alloc::vec![0u8; out.len() * 2];

        self.wait_ready()?;
        self.spi
            .transaction(&mut [
                Operation::Write(&PREAMBLE_READ),
                Operation::Read(&mut dummy),
                Operation::Read(&mut bytes),
            ])
            .map_err(TransportError::Spi)?;

        for (word, pair) in out.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = u16::from_be_bytes([pair[0], pair[1]]);
        }
        Ok(())
    }
}
