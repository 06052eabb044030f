//! Hex colour parsing and the derived shades used by generated backgrounds.

use std::fmt;

use crate::content::ContentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional).
    pub fn parse_hex(input: &str) -> Option<Rgb> {
        let hex = input.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let mut it = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Rgb(it.next()??, it.next()??, it.next()??))
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => None,
        }
    }

    /// Blend towards black by `amount` (0.0–1.0).
    pub fn darken(self, amount: f32) -> Rgb {
        let k = 1.0 - amount.clamp(0.0, 1.0);
        Rgb(
            (self.0 as f32 * k).round() as u8,
            (self.1 as f32 * k).round() as u8,
            (self.2 as f32 * k).round() as u8,
        )
    }

    /// Blend towards white by `amount` (0.0–1.0).
    pub fn lighten(self, amount: f32) -> Rgb {
        let a = amount.clamp(0.0, 1.0);
        let up = |c: u8| (c as f32 + (255.0 - c as f32) * a).round() as u8;
        Rgb(up(self.0), up(self.1), up(self.2))
    }

    pub fn to_rgba(self, alpha: u8) -> image::Rgba<u8> {
        image::Rgba([self.0, self.1, self.2, alpha])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Base colour used when a request does not provide a usable one.
pub fn default_base(kind: ContentKind) -> Rgb {
    match kind {
        ContentKind::Movie => Rgb(0x1b, 0x1f, 0x3b),
        ContentKind::FootballSchedule => Rgb(0x0b, 0x3d, 0x2e),
    }
}

/// Resolve the requested colour, falling back to the kind's default.
pub fn resolve_base(requested: Option<&str>, kind: ContentKind) -> Rgb {
    requested.and_then(Rgb::parse_hex).unwrap_or_else(|| default_base(kind))
}

pub const ACCENT: Rgb = Rgb(0xf5, 0xc5, 0x18);
pub const TEXT: Rgb = Rgb(0xff, 0xff, 0xff);
pub const MUTED: Rgb = Rgb(0xc8, 0xcc, 0xd6);
pub const PLACEHOLDER_FILL: Rgb = Rgb(0x2b, 0x2f, 0x3a);
