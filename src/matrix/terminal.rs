use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use log::warn;

use crate::helper::{brightness_scale, scale};

use super::memory::FrameBuffer;
use super::{Canvas, Matrix};

/// Draws each committed frame as 24-bit coloured blocks on stdout, for
/// running without a panel attached.
pub struct TerminalMatrix {
    rows: usize,
    cols: usize,
    brightness: u8,
    front: Mutex<FrameBuffer>
}

impl TerminalMatrix {
    pub fn new(rows: usize, cols: usize, brightness_percent: u8) -> Self {
        Self {
            rows,
            cols,
            brightness: brightness_scale(brightness_percent),
            front: Mutex::new(FrameBuffer::new(rows, cols))
        }
    }

    fn draw(&self, frame: &FrameBuffer) -> io::Result<()> {
        let mut out = io::stdout().lock();
        // cursor home, no full clear to avoid flicker
        write!(out, "\x1b[H")?;
        for row in frame.pixel_rows() {
            for pixel in row {
                let c = scale(pixel, self.brightness);
                write!(out, "\x1b[48;2;{};{};{}m  ", c.red, c.green, c.blue)?;
            }
            writeln!(out, "\x1b[0m")?;
        }
        out.flush()
    }
}

impl Matrix for TerminalMatrix {
    type Canvas = FrameBuffer;

    fn offscreen_canvas(&self) -> FrameBuffer {
        FrameBuffer::new(self.rows, self.cols)
    }

    fn swap(&self, canvas: FrameBuffer) -> FrameBuffer {
        if let Err(e) = self.draw(&canvas) {
            warn!("Terminal preview write failed: {}", e);
        }
        let mut front = self.front.lock().unwrap_or_else(PoisonError::into_inner);
        let mut previous = std::mem::replace(&mut *front, canvas);
        previous.clear();
        previous
    }
}
