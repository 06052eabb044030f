//! Per-resolution composition plans.
//!
//! Every size and position is a proportional function of the canvas size.
//! Font sizes scale with the canvas width and are capped at fixed maxima so
//! that large canvases do not get oversized type.

use crate::content::{Content, ContentKind, MAX_GAMES, Resolution};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Integer pixel size, at least 1x1.
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.w.round().max(1.0) as u32, self.h.round().max(1.0) as u32)
    }

    /// Integer top-left offset.
    pub fn origin(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

/// `(ratio of canvas width, cap in px)` per text role.
const TITLE_FONT: (f32, f32) = (0.045, 84.0);
const BODY_FONT: (f32, f32) = (0.022, 36.0);
const META_FONT: (f32, f32) = (0.018, 30.0);
const FOOTER_FONT: (f32, f32) = (0.016, 26.0);
const WATERMARK_FONT: (f32, f32) = (0.014, 22.0);

const MIN_FONT: f32 = 10.0;

/// Lines of title text before truncation.
pub const TITLE_LINES: usize = 2;
/// Upper bound on description lines regardless of free space.
pub const MAX_DESCRIPTION_LINES: usize = 8;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.25;

fn scaled(width: f32, (ratio, cap): (f32, f32)) -> f32 {
    (width * ratio).min(cap).max(MIN_FONT)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fonts {
    pub title: f32,
    pub body: f32,
    pub meta: f32,
    pub footer: f32,
    pub watermark: f32,
}

impl Fonts {
    pub fn for_width(width: f32) -> Self {
        Self {
            title: scaled(width, TITLE_FONT),
            body: scaled(width, BODY_FONT),
            meta: scaled(width, META_FONT),
            footer: scaled(width, FOOTER_FONT),
            watermark: scaled(width, WATERMARK_FONT),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoviePlan {
    pub logo: Rect,
    pub poster: Rect,
    /// Area for title, meta line and description.
    pub text: Rect,
    pub description_lines: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameRow {
    pub card: Rect,
    pub home_logo: Rect,
    pub away_logo: Rect,
    pub home_name: Rect,
    pub away_name: Rect,
    /// Kick-off time badge, centred in the card.
    pub badge: Rect,
    pub team_font: f32,
    pub badge_font: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulePlan {
    pub logo: Rect,
    /// Title and date, to the right of the logo.
    pub header: Rect,
    pub rows: Vec<GameRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanBody {
    Movie(MoviePlan),
    Schedule(SchedulePlan),
}

/// Derived layout for one resolution. Never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    pub resolution: Resolution,
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub fonts: Fonts,
    /// Baseline of the contact footer (left aligned at `margin`).
    pub footer_baseline: f32,
    /// Widest the footer may get before truncation.
    pub footer_width: f32,
    /// Anchor of the watermark (right aligned).
    pub watermark: (f32, f32),
    pub body: PlanBody,
}

impl CompositionPlan {
    pub fn for_content(content: &Content, resolution: Resolution) -> Self {
        match content {
            Content::Movie(_) => Self::movie(resolution),
            Content::FootballSchedule(s) => Self::schedule(resolution, s.games.len()),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self.body {
            PlanBody::Movie(_) => ContentKind::Movie,
            PlanBody::Schedule(_) => ContentKind::FootballSchedule,
        }
    }

    fn frame(resolution: Resolution, body: PlanBody) -> Self {
        let (w, h) = resolution.size();
        let (width, height) = (w as f32, h as f32);
        let margin = Self::margin_for(width, height);
        Self {
            resolution,
            width,
            height,
            margin,
            fonts: Fonts::for_width(width),
            footer_baseline: height - margin * 0.7,
            footer_width: width * 0.6,
            watermark: (width - margin * 0.5, height - margin * 0.5),
            body,
        }
    }

    fn margin_for(width: f32, height: f32) -> f32 {
        width.min(height) * 0.05
    }

    /// Top of the footer band; content must end above it.
    fn content_bottom(height: f32, margin: f32) -> f32 {
        height - margin * 1.6
    }

    pub fn movie(resolution: Resolution) -> Self {
        let (w, h) = resolution.size();
        let (w, h) = (w as f32, h as f32);
        let m = Self::margin_for(w, h);
        let fonts = Fonts::for_width(w);
        let bottom = Self::content_bottom(h, m);

        let (logo, poster, text) = if w > h * 1.2 {
            // Landscape: logo top-left, poster right, text left.
            let logo = Rect::new(m, m, w * 0.14, h * 0.12);
            let ph = h * 0.74;
            let pw = ph * 2.0 / 3.0;
            let poster = Rect::new(w - m - pw, (h - ph) / 2.0, pw, ph);
            let ty = logo.bottom() + m * 0.8;
            let text = Rect::new(m, ty, poster.x - m * 2.0, bottom - ty);
            (logo, poster, text)
        } else if h > w * 1.2 {
            // Portrait: logo, poster and text stacked and centred.
            let lw = w * 0.3;
            let logo = Rect::new((w - lw) / 2.0, m, lw, h * 0.07);
            let pw = w * 0.58;
            let poster = Rect::new((w - pw) / 2.0, logo.bottom() + m * 0.6, pw, pw * 1.5);
            let ty = poster.bottom() + m * 0.8;
            let text = Rect::new(m, ty, w - m * 2.0, bottom - ty);
            (logo, poster, text)
        } else {
            // Square: poster left under the logo, text right.
            let logo = Rect::new(m, m, w * 0.22, h * 0.1);
            let ph = h * 0.66;
            let poster = Rect::new(m, logo.bottom() + m * 0.5, ph * 2.0 / 3.0, ph);
            let tx = poster.right() + m;
            let text = Rect::new(tx, poster.y, w - tx - m, poster.h);
            (logo, poster, text)
        };

        let used = TITLE_LINES as f32 * fonts.title * LINE_HEIGHT + fonts.meta * 2.4;
        let free = (text.h - used).max(0.0);
        let description_lines = ((free / (fonts.body * LINE_HEIGHT)).floor() as usize).clamp(1, MAX_DESCRIPTION_LINES);

        Self::frame(resolution, PlanBody::Movie(MoviePlan { logo, poster, text, description_lines }))
    }

    pub fn schedule(resolution: Resolution, games: usize) -> Self {
        Self::frame(resolution, PlanBody::Schedule(SchedulePlan::new(resolution, games)))
    }
}

impl SchedulePlan {
    /// Header and one row per game, at most [`MAX_GAMES`] rows.
    pub fn new(resolution: Resolution, games: usize) -> Self {
        let (w, h) = resolution.size();
        let (w, h) = (w as f32, h as f32);
        let m = CompositionPlan::margin_for(w, h);
        let fonts = Fonts::for_width(w);
        let n = games.clamp(1, MAX_GAMES);

        let header_h = (h * 0.11).min(w * 0.16);
        let logo = Rect::new(m, m, header_h, header_h);
        let hx = logo.right() + m * 0.5;
        let header = Rect::new(hx, m, w - hx - m, header_h);

        let top = header.bottom() + m * 0.6;
        let bottom = CompositionPlan::content_bottom(h, m);
        let gap = m * 0.3;
        let area = bottom - top;
        let fitted = (area - gap * (n as f32 - 1.0)) / n as f32;
        let row_h = fitted.min(h * 0.16).min(w * 0.2);
        let block = row_h * n as f32 + gap * (n as f32 - 1.0);
        let start = top + (area - block).max(0.0) / 2.0;

        let card_w = w - m * 2.0;
        let crest = row_h * 0.68;
        let pad = row_h * 0.16;
        let badge_w = (card_w * 0.18).min(220.0);
        let badge_h = row_h * 0.42;
        let team_font = (row_h * 0.2).min(fonts.body * 1.1).max(MIN_FONT);
        let badge_font = (badge_h * 0.55).min(fonts.body * 1.2).max(MIN_FONT);

        let rows = (0..games.min(MAX_GAMES))
            .map(|i| {
                let y = start + i as f32 * (row_h + gap);
                let card = Rect::new(m, y, card_w, row_h);
                let cy = y + (row_h - crest) / 2.0;
                let home_logo = Rect::new(card.x + pad, cy, crest, crest);
                let away_logo = Rect::new(card.right() - pad - crest, cy, crest, crest);
                let badge = Rect::new(card.center_x() - badge_w / 2.0, y + (row_h - badge_h) / 2.0, badge_w, badge_h);
                let home_x = home_logo.right() + m * 0.4;
                let home_name = Rect::new(home_x, y, (badge.x - m * 0.3 - home_x).max(0.0), row_h);
                let away_x = badge.right() + m * 0.3;
                let away_name = Rect::new(away_x, y, (away_logo.x - m * 0.4 - away_x).max(0.0), row_h);
                GameRow { card, home_logo, away_logo, home_name, away_name, badge, team_font, badge_font }
            })
            .collect();

        Self { logo, header, rows }
    }
}
