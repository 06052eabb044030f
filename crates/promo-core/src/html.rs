//! Self-contained HTML rendition of a schedule card for the screenshot path.

use crate::color::{ACCENT, MUTED, TEXT, resolve_base};
use crate::content::{ContentKind, RenderConfig, Resolution, ScheduleContent};
use crate::layout::{CompositionPlan, SchedulePlan};
use crate::overlay::FONT_STACK;
use crate::text::{char_budget, escape_markup, normalize, truncate};

/// Build a fixed-size HTML page laid out with the same proportions as the
/// raster path. All user text and URLs are escaped.
pub fn schedule_document(schedule: &ScheduleContent, resolution: Resolution, config: &RenderConfig) -> String {
    let plan = CompositionPlan::schedule(resolution, schedule.games.len());
    let layout = SchedulePlan::new(resolution, schedule.games.len());
    let (w, h) = (plan.width, plan.height);
    let m = plan.margin;
    let fonts = plan.fonts;
    let base = resolve_base(schedule.background_color.as_deref(), ContentKind::FootballSchedule);

    let mut body = String::new();

    if let Some(url) = schedule.background_url.as_deref() {
        body.push_str(&format!(r#"<img class="bg" src="{}" alt="">"#, escape_markup(url)));
        body.push_str(r#"<div class="scrim"></div>"#);
    }

    body.push_str(&format!(
        r#"<header style="left:{x}px;top:{y}px;height:{hh}px"><img class="logo" src="{logo}" alt="" style="width:{hh}px;height:{hh}px"><div class="heading" style="margin-left:{gap}px"><h1 style="font-size:{tf}px">{title}</h1>{date}</div></header>"#,
        x = layout.logo.x,
        y = layout.logo.y,
        hh = layout.logo.h,
        gap = m * 0.5,
        logo = escape_markup(&schedule.logo_url),
        tf = fonts.title.min(layout.header.h * 0.42),
        title = escape_markup(&truncate(&normalize(&schedule.title), char_budget(layout.header.w, fonts.title))),
        date = schedule
            .date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| format!(r#"<p class="date" style="font-size:{}px">{}</p>"#, fonts.meta, escape_markup(d)))
            .unwrap_or_default(),
    ));

    for (game, row) in schedule.games.iter().zip(&layout.rows) {
        let c = &row.card;
        let competition = game
            .competition
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!(r#"<span class="competition" style="font-size:{}px">{}</span>"#, row.team_font * 0.6, escape_markup(s)))
            .unwrap_or_default();
        body.push_str(&format!(
            r#"<div class="game" style="left:{x}px;top:{y}px;width:{cw}px;height:{ch}px;border-radius:{r}px;font-size:{tf}px"><img class="crest" src="{home_logo}" alt="" style="width:{crest}px;height:{crest}px"><span class="team home">{home}</span><div class="kickoff">{competition}<span class="time" style="font-size:{bf}px;width:{bw}px;height:{bh}px;line-height:{bh}px">{time}</span></div><span class="team away">{away}</span><img class="crest" src="{away_logo}" alt="" style="width:{crest}px;height:{crest}px"></div>"#,
            x = c.x,
            y = c.y,
            cw = c.w,
            ch = c.h,
            r = c.h * 0.18,
            tf = row.team_font,
            crest = row.home_logo.w,
            home_logo = escape_markup(&game.home_logo_url),
            away_logo = escape_markup(&game.away_logo_url),
            home = escape_markup(&truncate(&normalize(&game.home_team), char_budget(row.home_name.w, row.team_font))),
            away = escape_markup(&truncate(&normalize(&game.away_team), char_budget(row.away_name.w, row.team_font))),
            bf = row.badge_font,
            bw = row.badge.w,
            bh = row.badge.h,
            time = escape_markup(game.time.trim()),
        ));
    }

    if let Some(footer) = schedule.contact.footer_line() {
        body.push_str(&format!(
            r#"<footer style="left:{m}px;bottom:{b}px;font-size:{f}px">{text}</footer>"#,
            b = h - plan.footer_baseline,
            f = fonts.footer,
            text = escape_markup(&truncate(&footer, char_budget(plan.footer_width, fonts.footer))),
        ));
    }

    if let Some(mark) = config.watermark() {
        body.push_str(&format!(
            r#"<div class="watermark" style="right:{r}px;bottom:{b}px;font-size:{f}px">{text}</div>"#,
            r = w - plan.watermark.0,
            b = h - plan.watermark.1,
            f = fonts.watermark,
            text = escape_markup(mark),
        ));
    }

    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>{title}</title><style>
*{{margin:0;padding:0;box-sizing:border-box}}
html,body{{width:{w}px;height:{h}px;overflow:hidden}}
body{{position:relative;font-family:{FONT_STACK};color:{text};background:linear-gradient(135deg,{light} 0%,{dark} 100%)}}
.bg{{position:absolute;inset:0;width:100%;height:100%;object-fit:cover}}
.scrim{{position:absolute;inset:0;background:rgba(0,0,0,.5)}}
header{{position:absolute;display:flex;align-items:center}}
.logo,.crest{{object-fit:contain}}
.heading h1{{font-weight:bold;white-space:nowrap}}
.date{{color:{accent}}}
.game{{position:absolute;display:flex;align-items:center;justify-content:space-between;padding:0 {pad}px;background:rgba(255,255,255,.1);font-weight:bold}}
.team{{flex:1;white-space:nowrap;overflow:hidden;text-overflow:ellipsis;padding:0 {gap}px}}
.team.away{{text-align:right}}
.kickoff{{display:flex;flex-direction:column;align-items:center}}
.competition{{color:{muted};font-weight:normal}}
.time{{display:block;text-align:center;border-radius:999px;background:{accent};color:#111111}}
footer{{position:absolute;color:{muted}}}
.watermark{{position:absolute;opacity:.55}}
</style></head><body>{body}</body></html>"#,
        title = escape_markup(&schedule.title),
        text = TEXT,
        light = base.lighten(0.18),
        dark = base.darken(0.6),
        accent = ACCENT,
        muted = MUTED,
        pad = m * 0.3,
        gap = m * 0.4,
    )
}
