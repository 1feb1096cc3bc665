use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::colors::{ColorTable, HexPalette};
use crate::diagnostic::DEFAULT_DWELL;
use crate::matrix::Matrix;
use crate::renderer::Renderer;
use crate::row_map::{Direction, RowMap};

#[derive(Parser, Debug, Default)]
#[command(name = "midi-led-grid")]
#[command(about = "Lights an RGB LED matrix from incoming MIDI notes", version)]
pub struct Cli {
    /// JSON settings file; anything missing falls back to the defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Raw MIDI device node (e.g. /dev/snd/midiC1D0)
    #[arg(long)]
    pub device: Option<String>,

    /// Cycle through all pitch classes instead of listening for notes
    #[arg(long)]
    pub diagnostic: bool,

    /// Log every message that is not a note
    #[arg(long)]
    pub verbose: bool,

    /// Panel rows
    #[arg(long)]
    pub rows: Option<usize>,

    /// Panel columns
    #[arg(long)]
    pub cols: Option<usize>,

    /// Panel brightness, 0-100
    #[arg(long)]
    pub brightness: Option<u8>,

    /// Lowest note on the first row of the map
    #[arg(long, allow_hyphen_values = true)]
    pub start_note: Option<i32>,

    /// Half-steps between rows (5 = fourths, 7 = fifths, 12 = octaves)
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<i32>,

    #[arg(long, value_enum)]
    pub direction: Option<Direction>,

    /// Preview in the terminal even when built with panel support
    #[arg(long)]
    pub terminal: bool
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub device: String,
    pub rows: usize,
    pub cols: usize,
    pub hardware_mapping: String,
    pub brightness: u8,
    pub start_note: i32,
    pub offset: i32,
    pub direction: Direction,
    pub colors: HexPalette,
    pub diagnostic: bool,
    pub dwell_ms: u64,
    pub verbose: bool
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device: "/dev/snd/midiC1D0".into(),
            rows: 16,
            cols: 32,
            hardware_mapping: "adafruit-hat".into(),
            brightness: 65,
            start_note: 14,
            offset: 5,
            direction: Direction::BottomToTop,
            colors: HexPalette::default(),
            diagnostic: false,
            dwell_ms: DEFAULT_DWELL.as_millis() as u64,
            verbose: false
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let settings: Settings = serde_json::from_str(json).map_err(|e| format!("Invalid settings: {}", e))?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let json = fs::read_to_string(path).map_err(|e| format!("Cannot read settings '{}': {}", path.display(), e))?;
        Self::from_json(&json).map_err(|e| format!("{}: {}", path.display(), e).into())
    }

    /// File settings (or defaults) with any command line overrides applied,
    /// validated.
    pub fn load(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let mut settings = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default()
        };
        settings.apply(cli);
        settings.validate()?;
        Ok(settings)
    }

    fn apply(&mut self, cli: &Cli) {
        if let Some(device) = &cli.device {
            self.device = device.clone();
        }
        if let Some(rows) = cli.rows {
            self.rows = rows;
        }
        if let Some(cols) = cli.cols {
            self.cols = cols;
        }
        if let Some(brightness) = cli.brightness {
            self.brightness = brightness;
        }
        if let Some(start_note) = cli.start_note {
            self.start_note = start_note;
        }
        if let Some(offset) = cli.offset {
            self.offset = offset;
        }
        if let Some(direction) = cli.direction {
            self.direction = direction;
        }
        self.diagnostic |= cli.diagnostic;
        self.verbose |= cli.verbose;
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.rows == 0 {
            return Err("rows must be at least 1".into());
        }
        if self.cols == 0 {
            return Err("cols must be at least 1".into());
        }
        if self.brightness > 100 {
            return Err(format!("brightness must be 0-100, got {}", self.brightness).into());
        }
        if self.dwell_ms == 0 {
            return Err("dwell_ms must be at least 1".into());
        }
        self.color_table()?;
        Ok(())
    }

    pub fn row_map(&self) -> RowMap {
        RowMap::build(self.rows, self.start_note, self.offset, self.direction)
    }

    pub fn color_table(&self) -> Result<ColorTable, String> {
        ColorTable::try_from(&self.colors)
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn renderer<M: Matrix>(&self, matrix: M) -> Result<Renderer<M>, String> {
        let renderer = Renderer::new(matrix, self.row_map(), self.color_table()?, self.cols);
        Ok(renderer.with_verbose(self.verbose))
    }
}
