use serde::Deserialize;

use crate::helper::{decode_hex, Rgb};
use crate::notes::PitchClass;

/// Hex colour per pitch class, as written in the config file. Every key is
/// required, so a partial table is rejected while parsing.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HexPalette {
    pub c: String,
    #[serde(rename = "c#")]
    pub c_sharp: String,
    pub d: String,
    #[serde(rename = "d#")]
    pub d_sharp: String,
    pub e: String,
    pub f: String,
    #[serde(rename = "f#")]
    pub f_sharp: String,
    pub g: String,
    #[serde(rename = "g#")]
    pub g_sharp: String,
    pub a: String,
    #[serde(rename = "a#")]
    pub a_sharp: String,
    pub b: String
}

impl Default for HexPalette {
    fn default() -> Self {
        Self {
            c: "#EE2902".into(),
            c_sharp: "#ee9602".into(),
            d: "#02c7ee".into(),
            d_sharp: "#0259ee".into(),
            e: "#ee0251".into(),
            f: "#ee2102".into(),
            f_sharp: "#ee9f02".into(),
            g: "#cfee02".into(),
            g_sharp: "#c7ee02".into(),
            a: "#59ee02".into(),
            a_sharp: "#02ee29".into(),
            b: "#02ee97".into()
        }
    }
}

impl HexPalette {
    fn get(&self, pitch: PitchClass) -> &str {
        match pitch {
            PitchClass::C => &self.c,
            PitchClass::CSharp => &self.c_sharp,
            PitchClass::D => &self.d,
            PitchClass::DSharp => &self.d_sharp,
            PitchClass::E => &self.e,
            PitchClass::F => &self.f,
            PitchClass::FSharp => &self.f_sharp,
            PitchClass::G => &self.g,
            PitchClass::GSharp => &self.g_sharp,
            PitchClass::A => &self.a,
            PitchClass::ASharp => &self.a_sharp,
            PitchClass::B => &self.b
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ColorTable {
    colors: [Rgb; 12]
}

impl ColorTable {
    pub fn new(colors: [Rgb; 12]) -> Self {
        Self { colors }
    }

    pub fn color_of(&self, pitch: PitchClass) -> Rgb {
        self.colors[pitch.index()]
    }
}

impl TryFrom<&HexPalette> for ColorTable {
    type Error = String;

    fn try_from(palette: &HexPalette) -> Result<Self, Self::Error> {
        let mut colors = [Rgb::BLACK; 12];
        for pitch in PitchClass::ALL {
            colors[pitch.index()] = decode_hex(palette.get(pitch))
                .map_err(|e| format!("Color for '{}': {}", pitch, e))?;
        }
        Ok(Self::new(colors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_decodes() {
        let table = ColorTable::try_from(&HexPalette::default()).unwrap();
        assert_eq!(table.color_of(PitchClass::C), Rgb::new(238, 41, 2));
        assert_eq!(table.color_of(PitchClass::B), Rgb::new(2, 238, 151));
    }

    #[test]
    fn test_bad_entry_names_pitch() {
        let mut palette = HexPalette::default();
        palette.f_sharp = "#12345".into();
        let err = ColorTable::try_from(&palette).unwrap_err();
        assert!(err.contains("'f#'"), "{}", err);
    }

    #[test]
    fn test_palette_requires_all_keys() {
        let json = r##"{"c":"#000000","c#":"#000000","d":"#000000"}"##;
        let err = serde_json::from_str::<HexPalette>(json).unwrap_err();
        assert!(err.to_string().contains("missing field"), "{}", err);
    }

    #[test]
    fn test_palette_from_json() {
        let json = r##"{
            "c": "#010203", "c#": "#000000", "d": "#000000", "d#": "#000000",
            "e": "#000000", "f": "#000000", "f#": "#000000", "g": "#000000",
            "g#": "#000000", "a": "#000000", "a#": "#000000", "b": "#ffffff"
        }"##;
        let palette: HexPalette = serde_json::from_str(json).unwrap();
        let table = ColorTable::try_from(&palette).unwrap();
        assert_eq!(table.color_of(PitchClass::C), Rgb::new(1, 2, 3));
        assert_eq!(table.color_of(PitchClass::B), Rgb::new(255, 255, 255));
    }
}
