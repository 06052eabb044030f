//! Text helpers for markup generation: escaping, truncation and word wrap.
//!
//! Widths are estimated from character counts; no font metrics are
//! consulted. The average glyph advance is assumed to be
//! [`AVG_GLYPH_EM`] of the font size.

/// Average advance of a glyph, as a fraction of the font size.
pub const AVG_GLYPH_EM: f32 = 0.55;

const ELLIPSIS: char = '…';

/// Escape text for embedding in SVG/HTML text nodes and attribute values.
pub fn escape_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            // XML 1.0 forbids most control characters outright.
            c if c.is_control() && c != '\n' && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_markup`] for the entities it produces.
pub fn unescape_markup(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Number of characters that fit into `width` pixels at `font_size`.
pub fn char_budget(width: f32, font_size: f32) -> usize {
    if width <= 0.0 || font_size <= 0.0 {
        return 1;
    }
    ((width / (font_size * AVG_GLYPH_EM)).floor() as usize).max(1)
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `input` to at most `max_chars` characters, ending with an ellipsis
/// when anything was removed.
pub fn truncate(input: &str, max_chars: usize) -> String {
    let count = input.chars().count();
    if count <= max_chars {
        return input.to_owned();
    }
    if max_chars == 0 {
        return String::new();
    }
    let kept: String = input.chars().take(max_chars - 1).collect();
    let mut kept = kept.trim_end().to_owned();
    kept.push(ELLIPSIS);
    kept
}

/// Greedy word wrap into lines of at most `max_chars` characters.
///
/// At most `max_lines` lines are returned; if text remains, the last line
/// is truncated with an ellipsis. Words longer than a whole line are split.
pub fn wrap(input: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut overflow = false;

    'words: for word in input.split_whitespace() {
        let mut word: String = word.to_owned();
        loop {
            let cur_len = current.chars().count();
            let word_len = word.chars().count();
            let needed = if cur_len == 0 { word_len } else { cur_len + 1 + word_len };

            if needed <= max_chars {
                if cur_len > 0 {
                    current.push(' ');
                }
                current.push_str(&word);
                continue 'words;
            }

            if cur_len > 0 {
                lines.push(std::mem::take(&mut current));
            } else {
                // The word alone is wider than a line: hard split.
                let head: String = word.chars().take(max_chars).collect();
                word = word.chars().skip(max_chars).collect();
                lines.push(head);
            }

            if lines.len() == max_lines {
                overflow = true;
                break 'words;
            }
        }
    }

    if !overflow && !current.is_empty() {
        if lines.len() < max_lines {
            lines.push(current);
        } else {
            overflow = true;
        }
    }

    if overflow {
        if let Some(last) = lines.last_mut() {
            let base: String = last.chars().take(max_chars.saturating_sub(1)).collect();
            let mut base = base.trim_end().to_owned();
            base.push(ELLIPSIS);
            *last = base;
        }
    }

    lines
}
