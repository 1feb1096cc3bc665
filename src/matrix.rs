//! The panel the frames end up on. Drawing happens on an offscreen canvas,
//! which is then swapped with the visible one on the next refresh.

use crate::helper::Rgb;

pub mod memory;
pub mod terminal;

#[cfg(feature = "hardware")]
pub mod led;

pub trait Canvas {
    fn clear(&mut self);

    fn set(&mut self, x: i32, y: i32, color: &Rgb);
}

pub trait Matrix {
    type Canvas: Canvas;

    fn offscreen_canvas(&self) -> Self::Canvas;

    /// Shows `canvas` at the next refresh, blocking until then, and returns
    /// the previously visible canvas for reuse.
    fn swap(&self, canvas: Self::Canvas) -> Self::Canvas;
}
