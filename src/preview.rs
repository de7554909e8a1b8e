//! In-memory preview sink
//!
//! Stands in for the panel when there is no hardware: loaded areas are
//! pasted into a host-side framebuffer and refresh triggers are recorded,
//! so tests and preview tools can observe exactly what would have reached
//! the controller.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use crate::mode::WaveformMode;
use crate::region::Region;
use crate::tracking::{FrameSink, WHITE};

/// One recorded refresh trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Refresh {
    /// The refreshed region.
    pub region: Region,
    /// The waveform mode requested for it.
    pub mode: WaveformMode,
}

/// A [`FrameSink`] that renders into host memory.
pub struct PreviewSink {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
    refreshes: Vec<Refresh>,
}

impl PreviewSink {
    /// Create a preview surface of the given dimensions, all white.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: vec![WHITE; width as usize * height as usize],
            refreshes: Vec::new(),
        }
    }

    /// The current surface contents, one byte per pixel in scan order.
    ///
    /// Only regions that have been refreshed are guaranteed to reflect
    /// loaded data on a real panel; the preview pastes on load for
    /// simplicity.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Every refresh trigger seen so far, oldest first.
    pub fn refreshes(&self) -> &[Refresh] {
        &self.refreshes
    }

    /// Forget recorded refreshes.
    pub fn clear_history(&mut self) {
        self.refreshes.clear();
    }
}

impl FrameSink for PreviewSink {
    type Error = Infallible;

    fn load_area(
        &mut self,
        pixels: &[u8],
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), Self::Error> {
        for row in 0..height.min(self.height.saturating_sub(y)) {
            let src = row as usize * width as usize;
            let dst = (y + row) as usize * self.width as usize + x as usize;
            let columns = width.min(self.width.saturating_sub(x)) as usize;
            self.pixels[dst..dst + columns].copy_from_slice(&pixels[src..src + columns]);
        }
        Ok(())
    }

    fn refresh_area(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        mode: WaveformMode,
    ) -> Result<(), Self::Error> {
        self.refreshes.push(Refresh {
            region: Region {
                min_x: x,
                min_y: y,
                max_x: x + width,
                max_y: y + height,
            },
            mode,
        });
        Ok(())
    }
}
