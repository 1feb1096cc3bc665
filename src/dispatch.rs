use std::error::Error;

use crossbeam_channel::{bounded, select, Receiver};
use log::{info, warn};
use wmidi::MidiMessage;

use crate::config::Settings;
use crate::diagnostic::DiagnosticSequencer;
use crate::matrix::Matrix;
use crate::midi::InputConnection;
use crate::renderer::Renderer;

const EVENT_QUEUE: usize = 1024;

/// Opens the input and runs live or diagnostic mode until `shutdown`. The
/// input is closed before the display is blanked, and the display is blanked
/// even if the input never opened.
pub fn drive<M: Matrix>(settings: &Settings, renderer: &Renderer<M>, shutdown: &Receiver<()>) -> Result<(), Box<dyn Error>> {
    info!("row mapping {:?}", renderer.row_map().starts());
    let _blank = BlankOnDrop(renderer);

    let (tx, events) = bounded(EVENT_QUEUE);
    let input = InputConnection::open(&settings.device, tx)?;

    if settings.diagnostic {
        DiagnosticSequencer::new(renderer, settings.dwell()).run(shutdown);
    } else {
        let rendered = run_live(renderer, &events, shutdown);
        info!("Rendered {} frames from {}", rendered, input.name());
    }

    input.close();
    Ok(())
}

/// Applies incoming messages until `shutdown` fires, blocking between them.
/// Each message is fully rendered before the next is taken. If the input
/// goes away the last frame stays up until shutdown. Returns the number of
/// messages that produced a frame.
pub fn run_live<M: Matrix>(renderer: &Renderer<M>, events: &Receiver<MidiMessage<'static>>, shutdown: &Receiver<()>) -> usize {
    info!("Waiting for notes");
    let mut rendered = 0;
    loop {
        select! {
            recv(shutdown) -> _ => break,
            recv(events) -> message => match message {
                Ok(message) => {
                    if renderer.handle(&message) {
                        rendered += 1;
                    }
                },
                Err(_) => {
                    warn!("MIDI input disconnected, idling until interrupted");
                    let _ = shutdown.recv();
                    break;
                }
            }
        }
    }
    rendered
}

/// Clears the display when dropped, so the panel goes dark on every exit
/// path once the renderer exists.
pub struct BlankOnDrop<'a, M: Matrix>(pub &'a Renderer<M>);

impl<'a, M: Matrix> Drop for BlankOnDrop<'a, M> {
    fn drop(&mut self) {
        self.0.blank();
    }
}
