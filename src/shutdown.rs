use std::error::Error;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver};
use log::info;
use signal_hook::consts::TERM_SIGNALS;
use signal_hook::iterator::Signals;

/// Registers for SIGINT/SIGTERM/SIGQUIT. The returned receiver gets one
/// message on the first signal and is disconnected afterwards, so both a
/// successful `recv` and a disconnect mean "stop". A second signal kills the
/// process outright in case the clean shutdown hangs.
pub fn on_interrupt() -> Result<Receiver<()>, Box<dyn Error>> {
    let interrupted = Arc::new(AtomicBool::new(false));
    for signal in TERM_SIGNALS {
        signal_hook::flag::register_conditional_shutdown(*signal, 1, Arc::clone(&interrupted))
            .map_err(|e| format!("Cannot register fallback shutdown hook: {}", e))?;
        signal_hook::flag::register(*signal, Arc::clone(&interrupted))
            .map_err(|e| format!("Cannot register shutdown hook: {}", e))?;
    }
    let mut signals = Signals::new(TERM_SIGNALS).map_err(|e| format!("Cannot listen for shutdown signals: {}", e))?;
    let (tx, rx) = bounded(1);
    thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                info!("Received signal {}, exiting", signal);
                let _ = tx.send(());
            }
        })
        .map_err(|e| format!("Cannot start signal thread: {}", e))?;
    Ok(rx)
}
