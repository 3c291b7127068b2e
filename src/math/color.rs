use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer};

/// Linear RGB color with components in 0..1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parse a CSS hex style: `#rgb` or `#rrggbb`
    pub fn parse(style: &str) -> Result<Self> {
        let digits = style
            .trim()
            .strip_prefix('#')
            .with_context(|| format!("color {style:?} does not start with '#'"))?;

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("color {style:?} contains non-hex characters");
        }

        let hex = match digits.len() {
            3 => {
                let short = u32::from_str_radix(digits, 16)?;
                let (r, g, b) = ((short >> 8) & 0xf, (short >> 4) & 0xf, short & 0xf);
                (r * 0x11) << 16 | (g * 0x11) << 8 | b * 0x11
            }
            6 => u32::from_str_radix(digits, 16)?,
            n => bail!("color {style:?} has {n} hex digits, expected 3 or 6"),
        };

        Ok(Self::from_hex(hex))
    }

    /// Parse a style, falling back to white when it is not a valid color
    pub fn parse_or_white(style: &str) -> Self {
        Self::parse(style).unwrap_or_else(|e| {
            log::warn!("Unknown color {style:?} ({e}), using white");
            Self::WHITE
        })
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let style = String::deserialize(deserializer)?;
        Color::parse(&style).map_err(serde::de::Error::custom)
    }
}
