use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// 24-bit color used for ink, raster backgrounds and cell fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0x00, 0x00, 0x00]);
    pub const WHITE: Rgb = Rgb([0xff, 0xff, 0xff]);
    /// Tailwind fuchsia-500, the default active cell color.
    pub const FUCHSIA: Rgb = Rgb([0xd9, 0x46, 0xef]);
    /// Tailwind gray-200, the default color between cells.
    pub const GRAY_200: Rgb = Rgb([0xe5, 0xe7, 0xeb]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn r(self) -> u8 {
        self.0[0]
    }

    pub fn g(self) -> u8 {
        self.0[1]
    }

    pub fn b(self) -> u8 {
        self.0[2]
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], 0xff]
    }

    /// Linear blend towards `other`; `t` is clamped to [0.0, 1.0].
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb([
            channel(self.0[0], other.0[0]),
            channel(self.0[1], other.0[1]),
            channel(self.0[2], other.0[2]),
        ])
    }

    fn named(name: &str) -> Option<Rgb> {
        let color = match name {
            "white" => Self::WHITE,
            "black" => Self::BLACK,
            "red" => Rgb::new(0xff, 0x00, 0x00),
            "green" => Rgb::new(0x00, 0x80, 0x00),
            "blue" => Rgb::new(0x00, 0x00, 0xff),
            "yellow" => Rgb::new(0xff, 0xff, 0x00),
            "magenta" | "fuchsia" => Rgb::new(0xff, 0x00, 0xff),
            "cyan" | "aqua" => Rgb::new(0x00, 0xff, 0xff),
            "gray" | "grey" => Rgb::new(0x80, 0x80, 0x80),
            "orange" => Rgb::new(0xff, 0xa5, 0x00),
            "purple" => Rgb::new(0x80, 0x00, 0x80),
            _ => return None,
        };
        Some(color)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("unknown color name {0:?}")]
    UnknownName(String),
    #[error("invalid hex color {0:?}, expected #rgb or #rrggbb")]
    InvalidHex(String),
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let Some(hex) = value.strip_prefix('#') else {
            return Rgb::named(&value.to_ascii_lowercase())
                .ok_or_else(|| ColorParseError::UnknownName(value.to_owned()));
        };

        let invalid = || ColorParseError::InvalidHex(value.to_owned());
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, digit) in rgb.iter_mut().zip(hex.chars()) {
                    let nibble = digit.to_digit(16).ok_or_else(invalid)? as u8;
                    *slot = nibble * 0x11;
                }
                Ok(Rgb(rgb))
            },
            6 => {
                let channel = |range: std::ops::Range<usize>| {
                    u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
                };
                Ok(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
            },
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellShape {
    #[default]
    Square,
    /// Filled disc inscribed in the cell.
    Circle,
}

/// How cells are painted. Applied uniformly to a whole grid and never stored in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CellStyle {
    pub active: Rgb,
    pub background: Rgb,
    pub shape: CellShape,
    /// Color of the padding and gaps around cells.
    pub grid_line: Rgb,
}

impl CellStyle {
    pub fn color_for(&self, active: bool) -> Rgb {
        if active {
            self.active
        } else {
            self.background
        }
    }
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            active: Rgb::FUCHSIA,
            background: Rgb::WHITE,
            shape: CellShape::Square,
            grid_line: Rgb::GRAY_200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_names() {
        assert_eq!("#D946EF".parse::<Rgb>().unwrap(), Rgb::FUCHSIA);
        assert_eq!("#fff".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert_eq!(" White ".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert_eq!("#0a0B0c".parse::<Rgb>().unwrap(), Rgb::new(0x0a, 0x0b, 0x0c));
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(matches!("#12345".parse::<Rgb>(), Err(ColorParseError::InvalidHex(_))));
        assert!(matches!("#gggggg".parse::<Rgb>(), Err(ColorParseError::InvalidHex(_))));
        assert!(matches!("#€€€".parse::<Rgb>(), Err(ColorParseError::InvalidHex(_))));
        assert!(matches!("chartreuse-ish".parse::<Rgb>(), Err(ColorParseError::UnknownName(_))));
    }

    #[test]
    fn displays_as_lowercase_hex() {
        assert_eq!(Rgb::FUCHSIA.to_string(), "#d946ef");
        assert_eq!(Rgb::FUCHSIA.to_string().parse::<Rgb>().unwrap(), Rgb::FUCHSIA);
    }

    #[test]
    fn mix_clamps_its_factor() {
        assert_eq!(Rgb::WHITE.mix(Rgb::BLACK, 2.0), Rgb::BLACK);
        assert_eq!(Rgb::WHITE.mix(Rgb::BLACK, -1.0), Rgb::WHITE);
        assert_eq!(Rgb::BLACK.mix(Rgb::WHITE, 0.5), Rgb::new(128, 128, 128));
    }
}
