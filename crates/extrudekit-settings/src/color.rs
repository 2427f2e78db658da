//! Colour values used by the parameter store and by vector fills.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SettingsError;

/// An 8-bit sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xffffff),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("lime", 0x00ff00),
    ("blue", 0x0000ff),
    ("yellow", 0xffff00),
    ("cyan", 0x00ffff),
    ("aqua", 0x00ffff),
    ("magenta", 0xff00ff),
    ("fuchsia", 0xff00ff),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("silver", 0xc0c0c0),
    ("darkgray", 0xa9a9a9),
    ("darkgrey", 0xa9a9a9),
    ("lightgray", 0xd3d3d3),
    ("lightgrey", 0xd3d3d3),
    ("maroon", 0x800000),
    ("olive", 0x808000),
    ("teal", 0x008080),
    ("navy", 0x000080),
    ("purple", 0x800080),
    ("orange", 0xffa500),
    ("pink", 0xffc0cb),
    ("brown", 0xa52a2a),
    ("gold", 0xffd700),
    ("indigo", 0x4b0082),
    ("violet", 0xee82ee),
    ("skyblue", 0x87ceeb),
    ("steelblue", 0x4682b4),
    ("crimson", 0xdc143c),
    ("tomato", 0xff6347),
    ("coral", 0xff7f50),
    ("salmon", 0xfa8072),
    ("khaki", 0xf0e68c),
    ("tan", 0xd2b48c),
    ("beige", 0xf5f5dc),
    ("ivory", 0xfffff0),
    ("turquoise", 0x40e0d0),
];

impl Rgb {
    pub const WHITE: Rgb = Rgb::from_u32(0xffffff);
    pub const BLACK: Rgb = Rgb::from_u32(0x000000);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub const fn from_u32(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Parse `#rgb`, `#rrggbb`, `rgb(r, g, b)` or a CSS colour name
    pub fn parse(input: &str) -> Result<Self, SettingsError> {
        let s = input.trim();
        let invalid = || SettingsError::InvalidColor(input.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            let expanded: String = match hex.len() {
                3 => hex.chars().flat_map(|c| [c, c]).collect(),
                6 => hex.to_string(),
                _ => return Err(invalid()),
            };
            let value = u32::from_str_radix(&expanded, 16).map_err(|_| invalid())?;
            return Ok(Self::from_u32(value));
        }

        let lower = s.to_ascii_lowercase();
        if let Some(body) = lower
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let channels: Vec<u8> = body
                .split(',')
                .map(|part| parse_channel(part.trim()))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            return match channels.as_slice() {
                [r, g, b] => Ok(Self::new(*r, *g, *b)),
                _ => Err(invalid()),
            };
        }

        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, hex)| Self::from_u32(*hex))
            .ok_or_else(invalid)
    }

    /// `#rrggbb` form
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels as `0.0..=1.0` floats
    pub fn to_f32(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Build from `0.0..=1.0` floats, clamping out-of-range channels
    pub fn from_f32(rgb: [f32; 3]) -> Self {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(quantize(rgb[0]), quantize(rgb[1]), quantize(rgb[2]))
    }
}

fn parse_channel(part: &str) -> Option<u8> {
    if let Some(pct) = part.strip_suffix('%') {
        let v: f32 = pct.trim().parse().ok()?;
        return Some((v.clamp(0.0, 100.0) / 100.0 * 255.0).round() as u8);
    }
    let v: f32 = part.parse().ok()?;
    Some(v.clamp(0.0, 255.0).round() as u8)
}

impl Default for Rgb {
    fn default() -> Self {
        Self::from_u32(0x808080)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Scene background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Background {
    /// No background; exports keep an alpha channel.
    #[default]
    Transparent,
    /// Opaque solid colour.
    Solid(Rgb),
}

impl Background {
    pub fn is_transparent(&self) -> bool {
        matches!(self, Background::Transparent)
    }

    pub fn color(&self) -> Option<Rgb> {
        match self {
            Background::Transparent => None,
            Background::Solid(c) => Some(*c),
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Background::Transparent => write!(f, "transparent"),
            Background::Solid(c) => write!(f, "{}", c),
        }
    }
}

impl FromStr for Background {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "transparent" | "none" => Ok(Background::Transparent),
            _ => Rgb::parse(s).map(Background::Solid),
        }
    }
}

impl TryFrom<String> for Background {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Background> for String {
    fn from(value: Background) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Rgb::parse("#808080").unwrap(), Rgb::new(128, 128, 128));
        assert_eq!(Rgb::parse("#f0a").unwrap(), Rgb::new(255, 0, 170));
        assert_eq!(Rgb::parse("  #FFFFFF ").unwrap(), Rgb::WHITE);
        assert!(Rgb::parse("#12").is_err());
        assert!(Rgb::parse("#gggggg").is_err());
    }

    #[test]
    fn test_parse_rgb_function_and_names() {
        assert_eq!(Rgb::parse("rgb(255, 0, 10)").unwrap(), Rgb::new(255, 0, 10));
        assert_eq!(Rgb::parse("rgb(100%,0%,50%)").unwrap(), Rgb::new(255, 0, 128));
        assert_eq!(Rgb::parse("SkyBlue").unwrap(), Rgb::from_u32(0x87ceeb));
        assert!(Rgb::parse("rgb(1,2)").is_err());
        assert!(Rgb::parse("currentColor").is_err());
    }

    #[test]
    fn test_hex_round_trip_and_floats() {
        let c = Rgb::from_u32(0x362d1d);
        assert_eq!(c.to_hex(), "#362d1d");
        assert_eq!(Rgb::from_f32(c.to_f32()), c);
    }

    #[test]
    fn test_background_parsing() {
        assert_eq!("transparent".parse::<Background>().unwrap(), Background::Transparent);
        assert_eq!(
            "#000000".parse::<Background>().unwrap(),
            Background::Solid(Rgb::BLACK)
        );
        assert!(Background::default().is_transparent());
        assert_eq!(Background::Solid(Rgb::WHITE).to_string(), "#ffffff");
    }
}
