use clap::ValueEnum;
use serde::Deserialize;
use wmidi::Note;

use crate::notes::PitchClass;

/// Which end of the panel holds the lowest row start.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    TopToBottom,
    BottomToTop
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PixelCoordinate {
    pub x: i32,
    pub y: i32
}

/// Lowest note number shown on each row, indexed by row from the top.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RowMap {
    starts: Vec<i32>
}

impl RowMap {
    /// Row `i` starts `offset` half-steps above row `i - 1`, counted from the
    /// top, then the whole sequence is flipped for `BottomToTop`.
    /// Out of range starts are kept as-is; they just never light anything.
    pub fn build(rows: usize, start_note: i32, offset: i32, direction: Direction) -> Self {
        let mut starts: Vec<i32> = (0..rows)
            .map(|i| start_note.saturating_add(offset.saturating_mul(i as i32)))
            .collect();
        if direction == Direction::BottomToTop {
            starts.reverse();
        }
        Self { starts }
    }

    pub fn starts(&self) -> &[i32] {
        &self.starts
    }

    pub fn rows(&self) -> usize {
        self.starts.len()
    }

    /// Every cell this note appears in: one per row starting at or below it.
    /// Columns are not bounded here, the renderer clips them.
    pub fn locate(&self, note: Note) -> Vec<PixelCoordinate> {
        self.locate_number(u8::from(note) as i32)
    }

    pub fn locate_number(&self, note: i32) -> Vec<PixelCoordinate> {
        let mut cells = Vec::new();
        for (row, start) in self.starts.iter().enumerate() {
            if note >= *start {
                cells.push(PixelCoordinate { x: note - start, y: row as i32 });
            }
        }
        cells
    }

    /// All cells in a `cols` wide grid whose note falls in `pitch`.
    pub fn cells_in_pitch_class(&self, pitch: PitchClass, cols: usize) -> Vec<PixelCoordinate> {
        let mut cells = Vec::new();
        for (row, start) in self.starts.iter().enumerate() {
            for col in 0..cols as i32 {
                if PitchClass::of_number(start.saturating_add(col)) == pitch {
                    cells.push(PixelCoordinate { x: col, y: row as i32 });
                }
            }
        }
        cells
    }
}
