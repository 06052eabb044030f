//! SVG markup for the layers drawn around the fetched images.
//!
//! Each scene is split in two documents: the underlay (scrims, panels,
//! cards) is drawn below the logos and posters, the overlay (all text and
//! the watermark) above them. Both documents cover the full canvas.

use crate::color::{ACCENT, MUTED, Rgb, TEXT};
use crate::content::{Content, MovieContent, RenderConfig, Resolution, ScheduleContent};
use crate::layout::{CompositionPlan, LINE_HEIGHT, MoviePlan, PlanBody, Rect, SchedulePlan, TITLE_LINES};
use crate::text::{char_budget, escape_markup, normalize, truncate, wrap};

/// Font families tried in order by the rasteriser.
pub const FONT_STACK: &str = "DejaVu Sans, Liberation Sans, Arial, Helvetica, sans-serif";

const BADGE_TEXT: Rgb = Rgb(0x11, 0x11, 0x11);

#[derive(Debug, Clone, PartialEq)]
pub struct SceneMarkup {
    pub underlay: String,
    pub overlay: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Clone, Copy)]
struct TextStyle<'a> {
    size: f32,
    fill: Rgb,
    opacity: f32,
    bold: bool,
    anchor: Anchor,
    class: Option<&'a str>,
}

impl TextStyle<'_> {
    fn new(size: f32, fill: Rgb) -> Self {
        Self { size, fill, opacity: 1.0, bold: false, anchor: Anchor::Start, class: None }
    }
}

struct SvgDoc {
    buf: String,
}

impl SvgDoc {
    fn new(width: f32, height: f32) -> Self {
        Self {
            buf: format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
            ),
        }
    }

    fn rect(&mut self, r: &Rect, fill: Rgb, opacity: f32, radius: f32) {
        self.buf.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{radius}" fill="{fill}" fill-opacity="{opacity}"/>"#,
            r.x, r.y, r.w, r.h
        ));
    }

    fn frame(&mut self, r: &Rect, stroke: Rgb, opacity: f32, width: f32) {
        self.buf.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{stroke}" stroke-opacity="{opacity}" stroke-width="{width}"/>"#,
            r.x, r.y, r.w, r.h
        ));
    }

    /// `text` is raw user text; it is escaped here.
    fn text(&mut self, x: f32, y: f32, style: &TextStyle<'_>, text: &str) {
        if text.is_empty() {
            return;
        }
        let class = style.class.map(|c| format!(r#" class="{c}""#)).unwrap_or_default();
        self.buf.push_str(&format!(
            r#"<text{class} x="{x}" y="{y}" font-family="{FONT_STACK}" font-size="{size}" font-weight="{weight}" fill="{fill}" fill-opacity="{opacity}" text-anchor="{anchor}">{body}</text>"#,
            size = style.size,
            weight = if style.bold { "bold" } else { "normal" },
            fill = style.fill,
            opacity = style.opacity,
            anchor = style.anchor.as_str(),
            body = escape_markup(text),
        ));
    }

    fn finish(mut self) -> String {
        self.buf.push_str("</svg>");
        self.buf
    }
}

/// Build the underlay and overlay documents for `content`.
pub fn scene_markup(
    content: &Content,
    plan: &CompositionPlan,
    config: &RenderConfig,
    image_background: bool,
) -> SceneMarkup {
    match (content, &plan.body) {
        (Content::Movie(movie), PlanBody::Movie(body)) => movie_markup(movie, plan, body, config, image_background),
        (Content::FootballSchedule(schedule), PlanBody::Schedule(body)) => {
            schedule_markup(schedule, plan, body, config, image_background)
        }
        // A plan built for another kind: rebuild it for this content.
        _ => scene_markup(content, &CompositionPlan::for_content(content, plan.resolution), config, image_background),
    }
}

pub fn movie_markup(
    movie: &MovieContent,
    plan: &CompositionPlan,
    body: &MoviePlan,
    config: &RenderConfig,
    image_background: bool,
) -> SceneMarkup {
    let m = plan.margin;
    let fonts = plan.fonts;
    let t = &body.text;

    let mut under = SvgDoc::new(plan.width, plan.height);
    if image_background {
        under.rect(&Rect::new(0.0, 0.0, plan.width, plan.height), Rgb(0, 0, 0), 0.45, 0.0);
    }
    let pad = m * 0.4;
    under.rect(&Rect::new(t.x - pad, t.y - pad, t.w + pad * 2.0, t.h + pad * 2.0), Rgb(0, 0, 0), 0.28, m * 0.3);
    let shadow = m * 0.15;
    under.rect(
        &Rect::new(body.poster.x + shadow, body.poster.y + shadow, body.poster.w, body.poster.h),
        Rgb(0, 0, 0),
        0.4,
        m * 0.1,
    );

    let mut over = SvgDoc::new(plan.width, plan.height);
    over.frame(&body.poster, TEXT, 0.18, 2.0);

    let (anchor, x) = if plan.resolution == Resolution::Portrait {
        (Anchor::Middle, t.center_x())
    } else {
        (Anchor::Start, t.x)
    };

    let title_style = TextStyle { bold: true, anchor, ..TextStyle::new(fonts.title, TEXT) };
    let title_lines = wrap(&normalize(&movie.title), char_budget(t.w, fonts.title), TITLE_LINES);
    let mut baseline = t.y + fonts.title;
    for line in &title_lines {
        over.text(x, baseline, &title_style, line);
        baseline += fonts.title * LINE_HEIGHT;
    }
    let last_title = baseline - fonts.title * LINE_HEIGHT;

    let bar_w = (t.w * 0.25).min(180.0);
    let bar_h = (fonts.title * 0.07).max(4.0);
    let bar_x = if anchor == Anchor::Middle { x - bar_w / 2.0 } else { x };
    let bar_y = last_title + fonts.title * 0.35;
    over.rect(&Rect::new(bar_x, bar_y, bar_w, bar_h), ACCENT, 1.0, bar_h / 2.0);

    let mut cursor = bar_y + bar_h;
    if let Some(meta) = movie.meta_line() {
        cursor += fonts.meta * 1.5;
        let style = TextStyle { anchor, ..TextStyle::new(fonts.meta, ACCENT) };
        over.text(x, cursor, &style, &truncate(&meta, char_budget(t.w, fonts.meta)));
    }

    cursor += fonts.body * LINE_HEIGHT * 1.3;
    let desc_style = TextStyle { anchor, class: Some("desc"), ..TextStyle::new(fonts.body, MUTED) };
    let lines = wrap(&normalize(&movie.description), char_budget(t.w, fonts.body), body.description_lines);
    for line in &lines {
        if cursor > t.bottom() {
            break;
        }
        over.text(x, cursor, &desc_style, line);
        cursor += fonts.body * LINE_HEIGHT;
    }

    footer_and_watermark(&mut over, plan, config, movie.contact.footer_line());

    SceneMarkup { underlay: under.finish(), overlay: over.finish() }
}

pub fn schedule_markup(
    schedule: &ScheduleContent,
    plan: &CompositionPlan,
    body: &SchedulePlan,
    config: &RenderConfig,
    image_background: bool,
) -> SceneMarkup {
    let fonts = plan.fonts;

    let mut under = SvgDoc::new(plan.width, plan.height);
    if image_background {
        under.rect(&Rect::new(0.0, 0.0, plan.width, plan.height), Rgb(0, 0, 0), 0.5, 0.0);
    }
    for row in &body.rows {
        under.rect(&row.card, TEXT, 0.1, row.card.h * 0.18);
        under.rect(&row.badge, ACCENT, 1.0, row.badge.h / 2.0);
    }

    let mut over = SvgDoc::new(plan.width, plan.height);

    let header = &body.header;
    let title_size = fonts.title.min(header.h * 0.42);
    let title_style = TextStyle { bold: true, ..TextStyle::new(title_size, TEXT) };
    let title = truncate(&normalize(&schedule.title), char_budget(header.w, title_size));
    match schedule.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(date) => {
            let title_y = header.y + header.h * 0.45;
            over.text(header.x, title_y, &title_style, &title);
            let date_style = TextStyle::new(fonts.meta, ACCENT);
            over.text(header.x, title_y + fonts.meta * 1.6, &date_style, &truncate(date, char_budget(header.w, fonts.meta)));
        }
        None => over.text(header.x, header.center_y() + title_size * 0.35, &title_style, &title),
    }

    for (game, row) in schedule.games.iter().zip(&body.rows) {
        let name_y = row.card.center_y() + row.team_font * 0.35;
        let team = TextStyle { bold: true, ..TextStyle::new(row.team_font, TEXT) };
        over.text(
            row.home_name.x,
            name_y,
            &team,
            &truncate(&normalize(&game.home_team), char_budget(row.home_name.w, row.team_font)),
        );
        let away = TextStyle { anchor: Anchor::End, ..team };
        over.text(
            row.away_name.right(),
            name_y,
            &away,
            &truncate(&normalize(&game.away_team), char_budget(row.away_name.w, row.team_font)),
        );

        let time = TextStyle { bold: true, anchor: Anchor::Middle, ..TextStyle::new(row.badge_font, BADGE_TEXT) };
        over.text(
            row.badge.center_x(),
            row.badge.center_y() + row.badge_font * 0.35,
            &time,
            &truncate(game.time.trim(), char_budget(row.badge.w * 0.9, row.badge_font)),
        );

        if let Some(competition) = game.competition.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            let size = row.team_font * 0.6;
            let style = TextStyle { anchor: Anchor::Middle, ..TextStyle::new(size, MUTED) };
            let y = row.card.y + (row.badge.y - row.card.y) * 0.5 + size * 0.35;
            over.text(row.badge.center_x(), y, &style, &truncate(competition, char_budget(row.badge.w * 1.6, size)));
        }
    }

    footer_and_watermark(&mut over, plan, config, schedule.contact.footer_line());

    SceneMarkup { underlay: under.finish(), overlay: over.finish() }
}

fn footer_and_watermark(doc: &mut SvgDoc, plan: &CompositionPlan, config: &RenderConfig, footer: Option<String>) {
    let fonts = plan.fonts;
    if let Some(footer) = footer {
        let style = TextStyle::new(fonts.footer, MUTED);
        doc.text(
            plan.margin,
            plan.footer_baseline,
            &style,
            &truncate(&footer, char_budget(plan.footer_width, fonts.footer)),
        );
    }
    if let Some(mark) = config.watermark() {
        let style = TextStyle {
            opacity: 0.55,
            anchor: Anchor::End,
            class: Some("watermark"),
            ..TextStyle::new(fonts.watermark, TEXT)
        };
        let (x, y) = plan.watermark;
        doc.text(x, y, &style, mark);
    }
}
