use std::sync::{Mutex, PoisonError};

use crate::helper::Rgb;
use crate::row_map::PixelCoordinate;

use super::{Canvas, Matrix};

/// Row-major RGB pixels. Writes outside the grid are dropped and counted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FrameBuffer {
    rows: usize,
    cols: usize,
    pixels: Vec<Rgb>,
    rejected: usize
}

impl FrameBuffer {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            pixels: vec![Rgb::BLACK; rows * cols],
            rejected: 0
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Non-black pixels in row-major order.
    pub fn lit(&self) -> Vec<(PixelCoordinate, Rgb)> {
        let mut lit = Vec::new();
        for (i, color) in self.pixels.iter().enumerate() {
            if *color != Rgb::BLACK {
                let coordinate = PixelCoordinate { x: (i % self.cols) as i32, y: (i / self.cols) as i32 };
                lit.push((coordinate, *color));
            }
        }
        lit
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|c| *c == Rgb::BLACK)
    }

    /// Number of out of bounds writes since creation.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn pixel_rows(&self) -> impl Iterator<Item = &[Rgb]> {
        self.pixels.chunks(self.cols.max(1))
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
            None
        } else {
            Some(y as usize * self.cols + x as usize)
        }
    }
}

impl Canvas for FrameBuffer {
    fn clear(&mut self) {
        self.pixels.fill(Rgb::BLACK);
    }

    fn set(&mut self, x: i32, y: i32, color: &Rgb) {
        match self.index(x, y) {
            Some(i) => self.pixels[i] = *color,
            None => self.rejected += 1
        }
    }
}

/// Keeps every committed frame instead of showing it anywhere.
pub struct MemoryMatrix {
    rows: usize,
    cols: usize,
    front: Mutex<FrameBuffer>,
    committed: Mutex<Vec<FrameBuffer>>
}

impl MemoryMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            front: Mutex::new(FrameBuffer::new(rows, cols)),
            committed: Mutex::new(Vec::new())
        }
    }

    pub fn commits(&self) -> usize {
        self.committed.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn committed(&self) -> Vec<FrameBuffer> {
        self.committed.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_frame(&self) -> Option<FrameBuffer> {
        self.committed.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }
}

impl Matrix for MemoryMatrix {
    type Canvas = FrameBuffer;

    fn offscreen_canvas(&self) -> FrameBuffer {
        FrameBuffer::new(self.rows, self.cols)
    }

    fn swap(&self, canvas: FrameBuffer) -> FrameBuffer {
        self.committed.lock().unwrap_or_else(PoisonError::into_inner).push(canvas.clone());
        let mut front = self.front.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *front, canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_out_of_bounds_is_counted() {
        let mut frame = FrameBuffer::new(2, 3);
        frame.set(3, 0, &Rgb::new(1, 1, 1));
        frame.set(0, -1, &Rgb::new(1, 1, 1));
        frame.set(2, 1, &Rgb::new(1, 2, 3));
        assert_eq!(frame.rejected(), 2);
        assert_eq!(frame.get(2, 1), Some(Rgb::new(1, 2, 3)));
        assert_eq!(frame.lit(), vec![(PixelCoordinate { x: 2, y: 1 }, Rgb::new(1, 2, 3))]);
    }

    #[test]
    fn test_swap_returns_previous_front() {
        let matrix = MemoryMatrix::new(1, 1);
        let mut canvas = matrix.offscreen_canvas();
        canvas.set(0, 0, &Rgb::new(9, 9, 9));
        let back = matrix.swap(canvas);
        assert!(back.is_blank());
        assert_eq!(matrix.commits(), 1);
        assert_eq!(matrix.last_frame().and_then(|f| f.get(0, 0)), Some(Rgb::new(9, 9, 9)));
    }
}
