use crate::color::Rgb;

/// Diagonal gradient with two soft accent discs.
pub(crate) fn gradient_svg(width: u32, height: u32, base: Rgb) -> String {
    let (w, h) = (width as f32, height as f32);
    let light = base.lighten(0.18);
    let dark = base.darken(0.6);
    let r1 = w.max(h) * 0.45;
    let r2 = w.max(h) * 0.3;
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><defs><linearGradient id="bg" x1="0" y1="0" x2="1" y2="1"><stop offset="0" stop-color="{light}"/><stop offset="1" stop-color="{dark}"/></linearGradient></defs><rect width="{w}" height="{h}" fill="url(#bg)"/><circle cx="{c1x}" cy="{c1y}" r="{r1}" fill="{light}" fill-opacity="0.12"/><circle cx="{c2x}" cy="{c2y}" r="{r2}" fill="{dark}" fill-opacity="0.25"/></svg>"#,
        c1x = w * 0.85,
        c1y = h * 0.15,
        c2x = w * 0.1,
        c2y = h * 0.9,
    )
}
