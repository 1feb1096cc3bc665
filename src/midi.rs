use std::collections::VecDeque;
use std::error::Error;
use std::fs;
use std::io::Read;
use std::os::unix::io::AsRawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};
use log::{error, info, warn};
use nonblock::NonBlockingReader;
use wmidi::{FromBytesError, MidiMessage, U7};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Splits a raw MIDI byte stream into messages.
pub struct NonBlockingInputDevice<R: AsRawFd + Read> {
    reader: NonBlockingReader<R>,
    parser: MessageParser
}

impl NonBlockingInputDevice<fs::File> {
    pub fn open(midi_in: &str) -> Result<Self, Box<dyn Error>> {
        let input = fs::File::options().read(true).open(midi_in).map_err(|e| format!("Cannot open MIDI IN '{}': {}", midi_in, e))?;
        let reader = NonBlockingReader::from_fd(input).map_err(|e| format!("Cannot read MIDI IN '{}': {}", midi_in, e))?;
        Ok(Self {
            reader,
            parser: MessageParser::new()
        })
    }
}

impl<R: AsRawFd + Read> NonBlockingInputDevice<R> {
    pub fn is_connected(&self) -> bool {
        !self.reader.is_eof()
    }

    pub fn read(&mut self) -> std::io::Result<Option<MidiMessage<'static>>> {
        let mut buf = Vec::new();
        self.reader.read_available(&mut buf)?;
        for byte in buf {
            self.parser.process(byte);
        }
        Ok(self.parser.pop())
    }
}

#[derive(Default)]
pub struct MessageParser {
    bytes: Vec<u8>,
    running_status: Option<u8>,
    messages: VecDeque<MidiMessage<'static>>
}

impl MessageParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&mut self) -> Option<MidiMessage<'static>> {
        self.messages.pop_front()
    }

    pub fn process(&mut self, byte: u8) {
        if byte >= 0xF8 {
            // real-time bytes may arrive inside another message
            self.process_real_time(byte);
            return;
        }
        match byte {
            0x80..=0xEF => {
                // a new status ends any unfinished message
                self.bytes.clear();
                self.running_status = Some(byte);
            },
            0xF0..=0xF6 => {
                self.bytes.clear();
                self.running_status = None;
            },
            0xF7 => self.running_status = None,
            _ => {
                if self.bytes.is_empty() {
                    // data byte without a status, reuse the last channel status
                    match self.running_status {
                        Some(status) => self.bytes.push(status),
                        None => return
                    }
                }
            }
        }
        self.bytes.push(byte);
        match MidiMessage::try_from(self.bytes.as_slice()) {
            Ok(MidiMessage::NoteOn(c, n, U7::MIN)) => {
                // some keyboards send NoteOn(velocity: 0) instead of NoteOff
                self.messages.push_back(MidiMessage::NoteOff(c, n, U7::MIN));
                self.bytes.clear();
            },
            Ok(message) => {
                self.messages.push_back(message.to_owned());
                self.bytes.clear();
            },
            Err(FromBytesError::NoBytes) | Err(FromBytesError::NoSysExEndByte) | Err(FromBytesError::NotEnoughBytes) => {
                // wait for more bytes
            },
            _ => {
                // invalid message, clear and wait for next message
                self.bytes.clear();
            }
        }
    }

    fn process_real_time(&mut self, byte: u8) {
        match MidiMessage::try_from([byte].as_slice()) {
            Ok(MidiMessage::TimingClock) => {
                // never shown, and too frequent to log
            },
            Ok(message) => self.messages.push_back(message.to_owned()),
            Err(_) => { }
        }
    }
}

/// An open MIDI input, read on its own thread. Messages are handed over the
/// channel given to `open`. Dropping it closes the device.
pub struct InputConnection {
    name: String,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>
}

impl InputConnection {
    pub fn open(midi_in: &str, tx: Sender<MidiMessage<'static>>) -> Result<Self, Box<dyn Error>> {
        let device = NonBlockingInputDevice::open(midi_in)?;
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let name = midi_in.to_string();
        let handle = thread::Builder::new()
            .name("midi-in".into())
            .spawn(move || read_loop(device, tx, thread_stop))
            .map_err(|e| format!("Cannot start MIDI IN thread: {}", e))?;
        info!("Connected to MIDI device {}", name);
        Ok(Self {
            name,
            stop,
            handle: Some(handle)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.store(true, Ordering::Relaxed);
            if handle.join().is_err() {
                error!("MIDI IN thread for {} panicked", self.name);
            }
            info!("Closed MIDI device {}", self.name);
        }
    }
}

impl Drop for InputConnection {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn read_loop<R: AsRawFd + Read>(mut device: NonBlockingInputDevice<R>, tx: Sender<MidiMessage<'static>>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        match device.read() {
            Ok(Some(message)) => {
                if !hand_over(&tx, message, &stop) {
                    break;
                }
            },
            Ok(None) if !device.is_connected() => {
                warn!("MIDI IN reached end of stream");
                break;
            },
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                error!("MIDI IN read failed: {}", e);
                break;
            }
        }
    }
}

/// Blocks while the channel is full, but still notices `stop`. Returns false
/// if reading should end.
fn hand_over(tx: &Sender<MidiMessage<'static>>, mut message: MidiMessage<'static>, stop: &AtomicBool) -> bool {
    loop {
        match tx.send_timeout(message, POLL_INTERVAL) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(m)) if !stop.load(Ordering::Relaxed) => message = m,
            Err(_) => return false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmidi::{Channel, Note};

    fn parse(bytes: &[u8]) -> Vec<MidiMessage<'static>> {
        let mut parser = MessageParser::new();
        for b in bytes {
            parser.process(*b);
        }
        let mut messages = Vec::new();
        while let Some(m) = parser.pop() {
            messages.push(m);
        }
        messages
    }

    #[test]
    fn test_note_on_and_off() {
        let messages = parse(&[0x90, 60, 100, 0x80, 60, 0]);
        assert_eq!(messages, vec![
            MidiMessage::NoteOn(Channel::Ch1, Note::C4, U7::from_u8_lossy(100)),
            MidiMessage::NoteOff(Channel::Ch1, Note::C4, U7::MIN)
        ]);
    }

    #[test]
    fn test_zero_velocity_note_on_is_off() {
        let messages = parse(&[0x93, 64, 0]);
        assert_eq!(messages, vec![MidiMessage::NoteOff(Channel::Ch4, Note::E4, U7::MIN)]);
    }

    #[test]
    fn test_clock_dropped() {
        let messages = parse(&[0xF8, 0xF8, 0x90, 62, 1]);
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], MidiMessage::NoteOn(_, Note::D4, _)));
    }

    #[test]
    fn test_running_status_note_off() {
        let messages = parse(&[0x90, 60, 100, 60, 0, 64, 90]);
        assert_eq!(messages, vec![
            MidiMessage::NoteOn(Channel::Ch1, Note::C4, U7::from_u8_lossy(100)),
            MidiMessage::NoteOff(Channel::Ch1, Note::C4, U7::MIN),
            MidiMessage::NoteOn(Channel::Ch1, Note::E4, U7::from_u8_lossy(90))
        ]);
    }

    #[test]
    fn test_running_status_follows_latest_status() {
        let messages = parse(&[0x90, 60, 100, 0x81, 60, 0, 62, 0]);
        assert_eq!(messages, vec![
            MidiMessage::NoteOn(Channel::Ch1, Note::C4, U7::from_u8_lossy(100)),
            MidiMessage::NoteOff(Channel::Ch2, Note::C4, U7::MIN),
            MidiMessage::NoteOff(Channel::Ch2, Note::D4, U7::MIN)
        ]);
    }

    #[test]
    fn test_system_message_cancels_running_status() {
        // song select, then stray data bytes with no status to reuse
        let messages = parse(&[0x90, 60, 100, 0xF3, 1, 60, 0]);
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[1], MidiMessage::SongSelect(_)));
    }

    #[test]
    fn test_clock_inside_note_keeps_note() {
        let messages = parse(&[0x90, 0xF8, 60, 0xF8, 100]);
        assert_eq!(messages, vec![MidiMessage::NoteOn(Channel::Ch1, Note::C4, U7::from_u8_lossy(100))]);
    }

    #[test]
    fn test_other_real_time_inside_note_is_delivered_first() {
        let messages = parse(&[0x90, 60, 0xFA, 100]);
        assert_eq!(messages, vec![
            MidiMessage::Start,
            MidiMessage::NoteOn(Channel::Ch1, Note::C4, U7::from_u8_lossy(100))
        ]);
    }

    #[test]
    fn test_new_status_replaces_unfinished_message() {
        let messages = parse(&[0x90, 60, 0x80, 62, 0]);
        assert_eq!(messages, vec![MidiMessage::NoteOff(Channel::Ch1, Note::D4, U7::MIN)]);
    }

    #[test]
    fn test_data_before_any_status_is_dropped() {
        assert_eq!(parse(&[60, 100, 0x90, 61, 1]).len(), 1);
    }

    #[test]
    fn test_partial_message_waits() {
        let mut parser = MessageParser::new();
        parser.process(0x90);
        parser.process(60);
        assert!(parser.pop().is_none());
        parser.process(10);
        assert!(parser.pop().is_some());
    }

    #[test]
    fn test_other_messages_pass_through() {
        let messages = parse(&[0xB0, 64, 127]);
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], MidiMessage::ControlChange(..)));
    }

    #[test]
    fn test_open_missing_device_fails() {
        let (tx, _rx) = crossbeam_channel::bounded(1);
        let err = InputConnection::open("/nonexistent/midi-device", tx).err().unwrap();
        assert!(err.to_string().contains("Cannot open MIDI IN"));
    }
}
