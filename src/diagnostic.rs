use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::info;

use crate::matrix::Matrix;
use crate::notes::PitchClass;
use crate::renderer::Renderer;

pub const DEFAULT_DWELL: Duration = Duration::from_millis(100);

/// Steps through the twelve pitch classes, lighting every cell of the grid
/// that belongs to each one, so the row map and colours can be checked by eye.
pub struct DiagnosticSequencer<'a, M: Matrix> {
    renderer: &'a Renderer<M>,
    dwell: Duration
}

impl<'a, M: Matrix> DiagnosticSequencer<'a, M> {
    pub fn new(renderer: &'a Renderer<M>, dwell: Duration) -> Self {
        Self { renderer, dwell }
    }

    /// Draws a single step.
    pub fn show(&self, pitch: PitchClass) {
        let cells = self.renderer.row_map().cells_in_pitch_class(pitch, self.renderer.cols());
        let color = self.renderer.colors().color_of(pitch);
        self.renderer.show_cells(&cells, color);
    }

    /// Cycles until `shutdown` fires or is dropped. Returns the number of
    /// steps shown.
    pub fn run(&self, shutdown: &Receiver<()>) -> usize {
        info!("Diagnostic sequence running, {}ms per pitch class", self.dwell.as_millis());
        let mut steps = 0;
        loop {
            for pitch in PitchClass::ALL {
                info!("test pitch: {}", pitch);
                self.show(pitch);
                steps += 1;
                match shutdown.recv_timeout(self.dwell) {
                    Err(RecvTimeoutError::Timeout) => { },
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return steps
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{ColorTable, HexPalette};
    use crate::matrix::memory::MemoryMatrix;
    use crate::row_map::{Direction, RowMap};
    use crossbeam_channel::bounded;
    use std::thread;

    fn renderer() -> Renderer<MemoryMatrix> {
        let colors = ColorTable::try_from(&HexPalette::default()).unwrap();
        Renderer::new(MemoryMatrix::new(16, 32), RowMap::build(16, 14, 5, Direction::BottomToTop), colors, 32)
    }

    #[test]
    fn test_show_lights_only_that_pitch_class() {
        let r = renderer();
        let seq = DiagnosticSequencer::new(&r, Duration::from_millis(1));
        seq.show(PitchClass::A);
        let frame = r.matrix().last_frame().unwrap();
        let a = r.colors().color_of(PitchClass::A);
        let lit = frame.lit();
        // 32 columns cover every pitch class 2 or 3 times per row
        assert!(lit.len() >= 16 * 2);
        for (cell, color) in lit {
            assert_eq!(color, a);
            let note = r.row_map().starts()[cell.y as usize] + cell.x;
            assert_eq!(PitchClass::of_number(note), PitchClass::A);
        }
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let r = renderer();
        let seq = DiagnosticSequencer::new(&r, Duration::from_millis(5));
        let (tx, rx) = bounded(1);
        let sender = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            tx.send(()).unwrap();
        });
        let steps = seq.run(&rx);
        sender.join().unwrap();
        assert!(steps >= 1);
        assert_eq!(r.matrix().commits(), steps);
    }

    #[test]
    fn test_run_stops_when_sender_dropped() {
        let r = renderer();
        let seq = DiagnosticSequencer::new(&r, Duration::from_secs(10));
        let (tx, rx) = bounded::<()>(1);
        drop(tx);
        assert_eq!(seq.run(&rx), 1);
    }
}
