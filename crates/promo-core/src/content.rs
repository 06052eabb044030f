//! Content model shared by the render pipeline and the HTTP layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// Maximum number of fixtures a schedule card can hold.
pub const MAX_GAMES: usize = 5;

/// Which template family a request renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentKind {
    Movie,
    FootballSchedule,
}

/// Output canvases produced for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Resolution {
    /// 16:9
    Landscape,
    /// 9:16
    Portrait,
    /// 1:1
    Square,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::Landscape, Resolution::Portrait, Resolution::Square];

    pub fn size(self) -> (u32, u32) {
        match self {
            Resolution::Landscape => (1920, 1080),
            Resolution::Portrait => (1080, 1920),
            Resolution::Square => (1080, 1080),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Contact details printed in the footer of every card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub website: Option<String>,
    pub phone: Option<String>,
    pub telegram: Option<String>,
}

impl Contact {
    /// Footer line, parts joined with a bullet. `None` when nothing is set.
    pub fn footer_line(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.website, &self.phone, &self.telegram]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("  •  "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieContent {
    pub title: String,
    pub description: String,
    pub genre: Option<String>,
    pub year: Option<u16>,
    pub rating: Option<f32>,
    pub logo_url: String,
    pub poster_url: String,
    pub background_url: Option<String>,
    pub background_color: Option<String>,
    pub contact: Contact,
}

impl MovieContent {
    /// Genre, year and rating joined into one line.
    pub fn meta_line(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(genre) = self.genre.as_deref().filter(|g| !g.trim().is_empty()) {
            parts.push(genre.trim().to_owned());
        }
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        if let Some(rating) = self.rating {
            parts.push(format!("★ {rating:.1}"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("  |  "))
        }
    }
}

/// One fixture on a schedule card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub home_team: String,
    pub away_team: String,
    pub home_logo_url: String,
    pub away_logo_url: String,
    /// Kick-off time as displayed, e.g. `"20:45"`.
    pub time: String,
    pub competition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleContent {
    pub title: String,
    pub date: Option<String>,
    pub logo_url: String,
    pub background_url: Option<String>,
    pub background_color: Option<String>,
    pub games: Vec<Game>,
    pub contact: Contact,
}

/// Tagged union dispatched on by the render pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Movie(MovieContent),
    FootballSchedule(ScheduleContent),
}

impl Content {
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Movie(_) => ContentKind::Movie,
            Content::FootballSchedule(_) => ContentKind::FootballSchedule,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Content::Movie(m) => &m.title,
            Content::FootballSchedule(s) => &s.title,
        }
    }

    pub fn background_url(&self) -> Option<&str> {
        match self {
            Content::Movie(m) => m.background_url.as_deref(),
            Content::FootballSchedule(s) => s.background_url.as_deref(),
        }
    }

    pub fn background_color(&self) -> Option<&str> {
        match self {
            Content::Movie(m) => m.background_color.as_deref(),
            Content::FootballSchedule(s) => s.background_color.as_deref(),
        }
    }
}

/// Immutable rendering settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Text stamped in the bottom-right corner of every image.
    pub watermark_text: String,
    pub watermark_enabled: bool,
    /// JPEG quality, 1–100.
    pub jpeg_quality: u8,
    /// Upper bound for a single remote asset download.
    pub fetch_timeout: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            watermark_text: "promo-render".to_owned(),
            watermark_enabled: true,
            jpeg_quality: 90,
            fetch_timeout: Duration::from_secs(15),
        }
    }
}

impl RenderConfig {
    /// The watermark to draw, if any.
    pub fn watermark(&self) -> Option<&str> {
        if self.watermark_enabled && !self.watermark_text.trim().is_empty() {
            Some(self.watermark_text.as_str())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resolution_sizes_match_aspect_ratios() {
        let (w, h) = Resolution::Landscape.size();
        assert_eq!(w * 9, h * 16);
        let (w, h) = Resolution::Portrait.size();
        assert_eq!(w * 16, h * 9);
        let (w, h) = Resolution::Square.size();
        assert_eq!(w, h);
    }

    #[test]
    fn resolution_names_are_lowercase() {
        assert_eq!(Resolution::Landscape.as_str(), "landscape");
        assert_eq!(Resolution::Square.to_string(), "square");
        assert_eq!(ContentKind::FootballSchedule.to_string(), "football_schedule");
    }

    #[test]
    fn footer_skips_blank_parts() {
        let contact = Contact {
            website: Some("example.com".into()),
            phone: Some("   ".into()),
            telegram: Some("@promo".into()),
        };
        assert_eq!(contact.footer_line().as_deref(), Some("example.com  •  @promo"));
        assert!(Contact::default().footer_line().is_none());
    }

    #[test]
    fn disabled_watermark_is_hidden() {
        let cfg = RenderConfig { watermark_enabled: false, ..RenderConfig::default() };
        assert!(cfg.watermark().is_none());
        assert_eq!(RenderConfig::default().watermark(), Some("promo-render"));
    }
}
