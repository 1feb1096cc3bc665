use std::collections::BTreeSet;
use std::fmt;
use wmidi::Note;

/// One of the twelve note names, independent of octave.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PitchClass {
    C, CSharp, D, DSharp, E, F, FSharp, G, GSharp, A, ASharp, B
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C, PitchClass::CSharp, PitchClass::D, PitchClass::DSharp,
        PitchClass::E, PitchClass::F, PitchClass::FSharp, PitchClass::G,
        PitchClass::GSharp, PitchClass::A, PitchClass::ASharp, PitchClass::B
    ];

    pub fn of(note: Note) -> Self {
        Self::of_number(u8::from(note) as i32)
    }

    /// Works for any integer, including the negative starts a row map allows.
    pub fn of_number(note: i32) -> Self {
        Self::ALL[note.rem_euclid(12) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "c",
            PitchClass::CSharp => "c#",
            PitchClass::D => "d",
            PitchClass::DSharp => "d#",
            PitchClass::E => "e",
            PitchClass::F => "f",
            PitchClass::FSharp => "f#",
            PitchClass::G => "g",
            PitchClass::GSharp => "g#",
            PitchClass::A => "a",
            PitchClass::ASharp => "a#",
            PitchClass::B => "b"
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Notes currently held down, iterated lowest first.
#[derive(Debug, Default, Clone)]
pub struct ActiveNotes {
    notes: BTreeSet<u8>
}

impl ActiveNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the note was already sounding.
    pub fn insert(&mut self, note: Note) -> bool {
        self.notes.insert(u8::from(note))
    }

    /// Returns false if the note was not sounding.
    pub fn remove(&mut self, note: Note) -> bool {
        self.notes.remove(&u8::from(note))
    }

    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        self.notes.iter().map(|n| Note::from_u8_lossy(*n))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }
}
