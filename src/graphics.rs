//! Graphics support via embedded-graphics
//!
//! Implements [`DrawTarget`] for [`AutoDisplay`] so the embedded-graphics
//! ecosystem can draw straight into the logical frame. The frame is 8-bit
//! grayscale, so the color type is [`Gray8`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use embedded_graphics::{
//!     pixelcolor::Gray8,
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//!
//! Rectangle::new(Point::new(10, 10), Size::new(50, 30))
//!     .into_styled(PrimitiveStyle::with_fill(Gray8::BLACK))
//!     .draw(&mut display)?;
//!
//! display.partial_refresh(WaveformMode::Gc16)?;
//! ```

use core::convert::Infallible;

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::{Gray8, GrayColor},
    prelude::Pixel,
};

use crate::tracking::{AutoDisplay, FrameSink};

impl<S: FrameSink> DrawTarget for AutoDisplay<S> {
    type Color = Gray8;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x >= 0 && y >= 0 && x < i32::from(self.width()) && y < i32::from(self.height()) {
                self.set_pixel(x as u16, y as u16, color.luma());
            }
        }
        Ok(())
    }
}

impl<S: FrameSink> OriginDimensions for AutoDisplay<S> {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}
