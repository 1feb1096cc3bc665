use std::error::Error;

use rpi_led_matrix::{LedCanvas, LedColor, LedMatrix, LedMatrixOptions};

use crate::helper::{panel_brightness, Rgb};

use super::{Canvas, Matrix};

/// An HUB75 panel driven through the rpi-rgb-led-matrix library.
pub struct LedPanel {
    matrix: LedMatrix
}

impl LedPanel {
    pub fn new(rows: usize, cols: usize, hardware_mapping: &str, brightness: u8) -> Result<Self, Box<dyn Error>> {
        let mut options = LedMatrixOptions::new();
        options.set_rows(rows as u32);
        options.set_cols(cols as u32);
        options.set_hardware_mapping(hardware_mapping);
        options.set_brightness(panel_brightness(brightness)).map_err(|e| format!("Invalid brightness {}: {}", brightness, e))?;
        let matrix = LedMatrix::new(Some(options), None).map_err(|e| format!("Cannot initialise LED matrix '{}': {}", hardware_mapping, e))?;
        Ok(Self { matrix })
    }
}

impl Canvas for LedCanvas {
    fn clear(&mut self) {
        LedCanvas::clear(self);
    }

    fn set(&mut self, x: i32, y: i32, color: &Rgb) {
        let color = LedColor { red: color.red, green: color.green, blue: color.blue };
        LedCanvas::set(self, x, y, &color);
    }
}

impl Matrix for LedPanel {
    type Canvas = LedCanvas;

    fn offscreen_canvas(&self) -> LedCanvas {
        self.matrix.offscreen_canvas()
    }

    fn swap(&self, canvas: LedCanvas) -> LedCanvas {
        self.matrix.swap(canvas)
    }
}
