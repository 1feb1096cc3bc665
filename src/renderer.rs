use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use wmidi::{MidiMessage, Note};

use crate::colors::ColorTable;
use crate::helper::Rgb;
use crate::matrix::{Canvas, Matrix};
use crate::notes::{ActiveNotes, PitchClass};
use crate::row_map::{PixelCoordinate, RowMap};

struct RenderState<C> {
    notes: ActiveNotes,
    // only None while a swap is in flight
    canvas: Option<C>,
    frames: u64
}

/// Turns held notes into frames on a matrix. The held notes and the back
/// buffer sit behind one lock, so every frame sees a consistent set of notes
/// and only one swap is ever pending.
pub struct Renderer<M: Matrix> {
    matrix: M,
    row_map: RowMap,
    colors: ColorTable,
    cols: usize,
    verbose: bool,
    state: Mutex<RenderState<M::Canvas>>
}

impl<M: Matrix> Renderer<M> {
    pub fn new(matrix: M, row_map: RowMap, colors: ColorTable, cols: usize) -> Self {
        let canvas = matrix.offscreen_canvas();
        Self {
            matrix,
            row_map,
            colors,
            cols,
            verbose: false,
            state: Mutex::new(RenderState {
                notes: ActiveNotes::new(),
                canvas: Some(canvas),
                frames: 0
            })
        }
    }

    /// Log messages that are not notes instead of silently dropping them.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn matrix(&self) -> &M {
        &self.matrix
    }

    pub fn row_map(&self) -> &RowMap {
        &self.row_map
    }

    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }

    pub fn rows(&self) -> usize {
        self.row_map.rows()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true if a frame was rendered.
    pub fn handle(&self, message: &MidiMessage<'_>) -> bool {
        match message {
            MidiMessage::NoteOn(_, note, _) => self.note_on(*note),
            MidiMessage::NoteOff(_, note, _) => self.note_off(*note),
            other => {
                if self.verbose {
                    info!("{:?}", other);
                }
                false
            }
        }
    }

    /// Renders only if the note was not already held.
    pub fn note_on(&self, note: Note) -> bool {
        let mut state = self.lock();
        if state.notes.insert(note) {
            self.render(&mut state);
            true
        } else {
            false
        }
    }

    /// Renders only if the note was held.
    pub fn note_off(&self, note: Note) -> bool {
        let mut state = self.lock();
        if state.notes.remove(note) {
            self.render(&mut state);
            true
        } else {
            false
        }
    }

    pub fn active_notes(&self) -> Vec<Note> {
        self.lock().notes.iter().collect()
    }

    /// Shows exactly `cells` in `color`, bypassing the held notes.
    pub fn show_cells(&self, cells: &[PixelCoordinate], color: Rgb) {
        let mut state = self.lock();
        if let Some(canvas) = state.canvas.as_mut() {
            canvas.clear();
            for cell in cells {
                self.plot(canvas, cell, &color);
            }
        }
        self.commit(&mut state);
    }

    /// Forgets every held note and commits an all black frame. Only used on
    /// the way out.
    pub fn blank(&self) {
        let mut state = self.lock();
        state.notes.clear();
        if let Some(canvas) = state.canvas.as_mut() {
            canvas.clear();
        }
        self.commit(&mut state);
    }

    fn render(&self, state: &mut RenderState<M::Canvas>) {
        let RenderState { notes, canvas, .. } = &mut *state;
        if let Some(canvas) = canvas.as_mut() {
            canvas.clear();
            // ascending, so the higher note wins where cells overlap
            for note in notes.iter() {
                let color = self.colors.color_of(PitchClass::of(note));
                for cell in self.row_map.locate(note) {
                    self.plot(canvas, &cell, &color);
                }
            }
        }
        self.commit(state);
        debug!("Frame {}: {} notes held", state.frames, state.notes.len());
    }

    fn plot(&self, canvas: &mut M::Canvas, cell: &PixelCoordinate, color: &Rgb) {
        let in_bounds = cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.cols
            && (cell.y as usize) < self.rows();
        if in_bounds {
            canvas.set(cell.x, cell.y, color);
        }
    }

    fn commit(&self, state: &mut RenderState<M::Canvas>) {
        if let Some(canvas) = state.canvas.take() {
            state.canvas = Some(self.matrix.swap(canvas));
            state.frames += 1;
        }
    }

    fn lock(&self) -> MutexGuard<'_, RenderState<M::Canvas>> {
        // every frame is drawn from scratch, so a poisoned state is still usable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
