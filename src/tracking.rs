//! Change-tracked display updates
//!
//! [`AutoDisplay`] owns a logical 8-bpp frame the caller draws into, diffs
//! it against the last committed frame on every refresh, and sends only the
//! changed region to a [`FrameSink`]. The hardware sink is [`PanelSink`];
//! [`PreviewSink`](crate::preview::PreviewSink) renders into host memory
//! instead.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use embedded_hal::delay::DelayNs;

use log::debug;

use crate::controller::Controller;
use crate::error::Error;
use crate::interface::Transport;
use crate::mode::{Rotation, WaveformMode};
use crate::pixel::PixelFormat;
use crate::region::{self, Region};

/// Grayscale value for a white (cleared) pixel.
pub const WHITE: u8 = 0xFF;
/// Grayscale value for a black pixel.
pub const BLACK: u8 = 0x00;

/// The two operations a refresh needs from a display device.
///
/// Hardware and preview surfaces implement this capability; the tracking
/// engine is polymorphic over it and never sees the bus.
pub trait FrameSink {
    /// Error type for sink operations.
    type Error: Debug;

    /// Store an 8-bpp sub-rectangle into device memory.
    ///
    /// `pixels` holds `width * height` bytes in scan order.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the transfer.
    fn load_area(
        &mut self,
        pixels: &[u8],
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), Self::Error>;

    /// Refresh a region of the panel from device memory with `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the trigger.
    fn refresh_area(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        mode: WaveformMode,
    ) -> Result<(), Self::Error>;
}

/// Accumulation of changes made during runs of fast binary refreshes.
///
/// Fast binary refreshes leave intermediate black/white pixels on the panel;
/// the accumulator remembers where, so the next gray-capable refresh can
/// restore true gray levels across all of it.
enum GrayTracking {
    /// No accumulation; fast refreshes leave whatever they leave.
    Disabled,
    /// Union of all regions touched since the last gray-capable refresh.
    Enabled { pending: Option<Region> },
}

impl GrayTracking {
    fn fold(&mut self, diff_box: Option<Region>) {
        if let GrayTracking::Enabled { pending } = self {
            *pending = Region::merge_opt(*pending, diff_box);
        }
    }

    fn clear(&mut self) {
        if let GrayTracking::Enabled { pending } = self {
            *pending = None;
        }
    }
}

/// A display that tracks changes to its frame and updates only the regions
/// that need it.
///
/// The caller mutates the logical frame freely between refresh calls, then
/// asks for a [`full_refresh`](Self::full_refresh) or
/// [`partial_refresh`](Self::partial_refresh). A snapshot of the frame is
/// committed after every refresh; until the first one, there is nothing to
/// diff against and partial refreshes degrade to full ones.
///
/// Single-writer: sharing one instance across threads requires external
/// serialization of every mutating call.
pub struct AutoDisplay<S: FrameSink> {
    /// Where refreshes go.
    sink: S,
    /// Panel width in pixels.
    width: u16,
    /// Panel height in pixels.
    height: u16,
    /// Logical frame, one byte per pixel, mutated by the caller.
    frame: Vec<u8>,
    /// Snapshot taken after the last successful refresh. `None` until the
    /// first refresh; replaced wholesale, never mutated in place.
    committed: Option<Vec<u8>>,
    /// Gray-change accumulation across fast binary refreshes.
    gray: GrayTracking,
}

impl<S: FrameSink> AutoDisplay<S> {
    /// Create a tracked display over `sink` with an all-white frame.
    pub fn new(sink: S, width: u16, height: u16) -> Self {
        Self::with_gray_tracking(sink, width, height, false)
    }

    /// Create a tracked display, optionally accumulating gray changes
    /// across fast binary refreshes.
    pub fn with_gray_tracking(sink: S, width: u16, height: u16, track_gray: bool) -> Self {
        Self {
            sink,
            width,
            height,
            frame: vec![WHITE; width as usize * height as usize],
            committed: None,
            gray: if track_gray {
                GrayTracking::Enabled { pending: None }
            } else {
                GrayTracking::Disabled
            },
        }
    }

    /// Panel width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Panel height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The logical frame, one byte per pixel in scan order.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Mutable access to the logical frame.
    pub fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.frame
    }

    /// Set a single pixel. Out-of-bounds coordinates are ignored.
    pub fn set_pixel(&mut self, x: u16, y: u16, value: u8) {
        if x < self.width && y < self.height {
            self.frame[y as usize * self.width as usize + x as usize] = value;
        }
    }

    /// Fill the whole frame with one gray level.
    pub fn fill(&mut self, value: u8) {
        self.frame.fill(value);
    }

    /// The sink refreshes go to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Tear down the tracker and return the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Send the entire frame and refresh the whole panel with `mode`.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the transfer or trigger fails.
    pub fn full_refresh(&mut self, mode: WaveformMode) -> Result<(), S::Error> {
        debug!("Full refresh with {mode:?}");
        self.sink
            .load_area(&self.frame, 0, 0, self.width, self.height)?;
        self.sink
            .refresh_area(0, 0, self.width, self.height, mode)?;

        if mode.is_fast_binary() {
            if matches!(self.gray, GrayTracking::Enabled { .. }) {
                // The panel now shows binary intermediates wherever this
                // frame differs from the last; remember where for the next
                // gray pass.
                let diff_box = self
                    .committed
                    .as_deref()
                    .and_then(|prev| region::diff(prev, &self.frame, self.width as usize))
                    .map(|r| r.round_to(mode.alignment()));
                self.gray.fold(diff_box);
            }
        } else {
            // A full gray-capable refresh resynchronizes every gray level.
            self.gray.clear();
        }

        self.committed = Some(self.frame.clone());
        Ok(())
    }

    /// Refresh only the rectangle bounding the pixels that changed since the
    /// last refresh.
    ///
    /// No device I/O happens when nothing changed. The committed snapshot is
    /// replaced either way, so identical frames never accumulate spurious
    /// diffs.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the transfer or trigger fails.
    pub fn partial_refresh(&mut self, mode: WaveformMode) -> Result<(), S::Error> {
        let Some(committed) = self.committed.as_deref() else {
            // Nothing to diff against yet.
            return self.full_refresh(mode);
        };

        let align = mode.alignment();
        let mut diff_box = region::diff(committed, &self.frame, self.width as usize)
            .map(|r| r.round_to(align));

        if let GrayTracking::Enabled { pending } = &mut self.gray {
            *pending = Region::merge_opt(*pending, diff_box);
            if !mode.is_fast_binary() {
                // Restore true gray levels across everything the fast
                // refreshes touched, then start accumulating afresh.
                diff_box = pending.take().map(|r| r.round_to(align));
            }
        }

        if let Some(area) = diff_box {
            let area = area.clamp_to(self.width, self.height);
            debug!(
                "Partial refresh of {}x{} at ({}, {}) with {mode:?}",
                area.width(),
                area.height(),
                area.min_x,
                area.min_y
            );

            let mut tile = region::extract(&self.frame, self.width as usize, area);
            if mode.is_fast_binary() {
                quantize_changed(&mut tile, committed, &self.frame, self.width as usize, area);
            }

            self.sink
                .load_area(&tile, area.min_x, area.min_y, area.width(), area.height())?;
            self.sink
                .refresh_area(area.min_x, area.min_y, area.width(), area.height(), mode)?;
        }

        self.committed = Some(self.frame.clone());
        Ok(())
    }

    /// Reset frame and panel to a blank white slate.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the transfer or trigger fails.
    pub fn clear(&mut self) -> Result<(), S::Error> {
        self.frame.fill(WHITE);
        self.full_refresh(WaveformMode::Init)
    }
}

/// Force the pixels inside `area` that differ between the frames to pure
/// black or white in `tile`.
///
/// Binary waveforms can only drive two levels; pixels that did not change
/// keep their gray value so the panel leaves them alone. The threshold is
/// the midpoint: a changed pixel at 0x80 or above becomes white.
fn quantize_changed(tile: &mut [u8], prev: &[u8], next: &[u8], width: usize, area: Region) {
    let tile_width = area.width() as usize;
    for y in area.min_y..area.max_y {
        for x in area.min_x..area.max_x {
            let index = y as usize * width + x as usize;
            if prev[index] != next[index] {
                let tile_index =
                    (y - area.min_y) as usize * tile_width + (x - area.min_x) as usize;
                tile[tile_index] = if next[index] >= 0x80 { WHITE } else { BLACK };
            }
        }
    }
}

/// Hardware frame sink: a [`Controller`] plus the per-transfer policy.
///
/// Waits for the display engine before every load, so a refresh still in
/// flight can never be corrupted by the next transfer.
pub struct PanelSink<T: Transport, D: DelayNs> {
    /// Protocol driver for the attached controller.
    controller: Controller<T>,
    /// Delay source for busy polling.
    delay: D,
    /// Wire pixel depth used for transfers.
    format: PixelFormat,
    /// Rotation applied by the controller when pasting data.
    rotation: Rotation,
}

impl<T: Transport, D: DelayNs> PanelSink<T, D> {
    /// Wrap an attached controller. Transfers default to 4 bpp, unrotated.
    pub fn new(controller: Controller<T>, delay: D) -> Self {
        Self {
            controller,
            delay,
            format: PixelFormat::Bpp4,
            rotation: Rotation::Rotate0,
        }
    }

    /// Use a different wire pixel depth for subsequent transfers.
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /// Rotate data as the controller pastes it.
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// The wrapped controller.
    pub fn controller(&self) -> &Controller<T> {
        &self.controller
    }

    /// Mutable access to the wrapped controller.
    pub fn controller_mut(&mut self) -> &mut Controller<T> {
        &mut self.controller
    }

    /// Unwrap into the controller and delay.
    pub fn release(self) -> (Controller<T>, D) {
        (self.controller, self.delay)
    }
}

impl<T: Transport, D: DelayNs> FrameSink for PanelSink<T, D> {
    type Error = Error<T>;

    fn load_area(
        &mut self,
        pixels: &[u8],
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), Self::Error> {
        self.controller.wait_display_ready(&mut self.delay)?;
        self.controller
            .load_image_area(pixels, self.format, x, y, width, height, self.rotation)
    }

    fn refresh_area(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        mode: WaveformMode,
    ) -> Result<(), Self::Error> {
        self.controller.display_area(x, y, width, height, mode)
    }
}
