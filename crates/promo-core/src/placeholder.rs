//! Stand-in images for assets that could not be fetched or decoded.

use image::RgbaImage;
use tracing::warn;

use crate::color::{MUTED, PLACEHOLDER_FILL};
use crate::compose::{Compositor, solid};
use crate::overlay::FONT_STACK;
use crate::text::{char_budget, escape_markup, truncate};

/// Flat fill, dashed inner frame and a short centred label.
pub fn placeholder_svg(width: u32, height: u32, label: &str) -> String {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    let inset = w.min(h) * 0.04;
    let font = (w.min(h) * 0.14).clamp(8.0, 48.0);
    let label = escape_markup(&truncate(label.trim(), char_budget(w - inset * 4.0, font)));
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="{w}" height="{h}" fill="{fill}"/><rect x="{inset}" y="{inset}" width="{fw}" height="{fh}" fill="none" stroke="{muted}" stroke-opacity="0.35" stroke-width="2" stroke-dasharray="8 6"/><text x="{cx}" y="{cy}" font-family="{FONT_STACK}" font-size="{font}" font-weight="bold" fill="{muted}" text-anchor="middle" dominant-baseline="central">{label}</text></svg>"#,
        fill = PLACEHOLDER_FILL,
        muted = MUTED,
        fw = w - inset * 2.0,
        fh = h - inset * 2.0,
        cx = w / 2.0,
        cy = h / 2.0,
    )
}

/// Rasterised placeholder of exactly `width` x `height`.
///
/// Falls back to the flat fill if the SVG path fails for any reason.
pub fn placeholder(compositor: &Compositor, width: u32, height: u32, label: &str) -> RgbaImage {
    let (width, height) = (width.max(1), height.max(1));
    match compositor.rasterize_svg(&placeholder_svg(width, height, label), width, height) {
        Ok(img) => img,
        Err(e) => {
            warn!(error = %e, width, height, "placeholder rasterisation failed; using flat fill");
            solid(width, height, PLACEHOLDER_FILL.to_rgba(255))
        }
    }
}

/// Up to three initials for a team or brand name, e.g. `"Real Madrid"` → `"RM"`.
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let out: String = match words.as_slice() {
        [] => "?".to_owned(),
        [single] => single.chars().take(3).collect(),
        many => many.iter().take(3).filter_map(|w| w.chars().next()).collect(),
    };
    out.to_uppercase()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn placeholder_has_requested_size_and_fill() {
        let c = Compositor::without_fonts();
        let img = placeholder(&c, 300, 450, "POSTER");
        assert_eq!(img.dimensions(), (300, 450));
        let px = img.get_pixel(150, 90).0;
        assert_eq!(&px[..3], &[PLACEHOLDER_FILL.0, PLACEHOLDER_FILL.1, PLACEHOLDER_FILL.2]);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn zero_sized_request_is_clamped() {
        let c = Compositor::without_fonts();
        assert_eq!(placeholder(&c, 0, 0, "x").dimensions(), (1, 1));
    }

    #[test]
    fn label_is_escaped() {
        let svg = placeholder_svg(200, 200, "<A&B>");
        assert!(svg.contains("&lt;A&amp;B&gt;"));
    }

    #[test]
    fn initials_from_names() {
        assert_eq!(initials("Real Madrid"), "RM");
        assert_eq!(initials("Arsenal"), "ARS");
        assert_eq!(initials("Paris Saint Germain FC"), "PSG");
        assert_eq!(initials("  "), "?");
    }
}
