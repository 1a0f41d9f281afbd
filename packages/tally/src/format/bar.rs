use crate::fmt::ansi;
use crate::format::BarView;

/// Glyph presets for the `:bar` token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarStyle {
    /// `[=====     ]`
    #[default]
    Classic,
    /// `[====>     ]`
    Arrow,
    /// `[█████░░░░░]`
    Block,
    /// `[■■■■■□□□□□]`
    Box,
    /// `[●●●●●○○○○○]`
    Dot,
    /// `[━━━━━─────]`
    Track,
}

impl BarStyle {
    /// (complete, incomplete, head, unknown)
    pub(crate) fn glyphs(self) -> (&'static str, &'static str, Option<&'static str>, &'static str) {
        match self {
            Self::Classic => ("=", " ", None, "<=>"),
            Self::Arrow => ("=", " ", Some(">"), "<=>"),
            Self::Block => ("\u{2588}", "\u{2591}", None, "\u{2588}\u{2588}\u{2588}"),
            Self::Box => ("\u{25a0}", "\u{25a1}", None, "\u{25a0}\u{25a0}"),
            Self::Dot => ("\u{25cf}", "\u{25cb}", None, "\u{25cf}\u{25cf}"),
            Self::Track => ("\u{2501}", "\u{2500}", None, "\u{2501}\u{2501}\u{2501}"),
        }
    }
}

/// Render the bar glyphs into at most `width` columns
///
/// With a known total, `floor(ratio * width)` columns of `complete` glyphs are
/// drawn, then one `head` glyph if the bar is not full, then `incomplete` glyphs.
/// Columns that glyphs wider than 1 cannot fill are padded with spaces, so the
/// bar never overshoots the budget.
///
/// With an unknown total, the `unknown` glyph bounces across the field, and
/// the field is filled with `complete` once the bar is done.
pub fn render_bar(view: &BarView<'_>, width: usize) -> String {
    let config = view.config();
    let mut out = String::new();
    let mut used = 0;

    let filled = match view.total() {
        Some(0) => width,
        Some(total) => {
            let current = view.current().min(total);
            // integer math, so the fill is truncated, never rounded up
            (current as u128 * width as u128 / total as u128) as usize
        }
        None if view.is_done() => width,
        None => {
            render_unknown(view, width, &mut out);
            return out;
        }
    };

    used += push_repeat(&mut out, &config.complete, filled);
    if filled < width {
        if let Some(head) = &config.head {
            let w = ansi::display_width(head);
            if used + w <= width {
                out.push_str(head);
                used += w;
            }
        }
    }
    used += push_repeat(&mut out, &config.incomplete, width - used);
    pad(&mut out, width - used);
    out
}

fn render_unknown(view: &BarView<'_>, width: usize, out: &mut String) {
    let glyph = &view.config().unknown;
    let glyph_width = ansi::display_width(glyph);
    if glyph_width == 0 || glyph_width > width {
        pad(out, width);
        return;
    }
    let travel = width - glyph_width;
    let position = if travel == 0 {
        0
    } else {
        // bounce back and forth
        let step = (view.renders() % (2 * travel as u64)) as usize;
        if step <= travel { step } else { 2 * travel - step }
    };
    pad(out, position);
    out.push_str(glyph);
    pad(out, travel - position);
}

/// Push `glyph` as many times as it fits in `columns`, returns the columns used
fn push_repeat(out: &mut String, glyph: &str, columns: usize) -> usize {
    let w = ansi::display_width(glyph);
    if w == 0 {
        return 0;
    }
    let count = columns / w;
    for _ in 0..count {
        out.push_str(glyph);
    }
    count * w
}

fn pad(out: &mut String, columns: usize) {
    for _ in 0..columns {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    fn config(total: Option<u64>) -> Config {
        Config {
            total,
            complete: "=".to_string(),
            incomplete: ".".to_string(),
            head: Some("\u{203a}".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn half_bar_with_head() {
        let config = config(Some(100));
        let view = BarView::new(&config).with_current(50);
        let out = render_bar(&view, 10);
        assert_eq!(out, "=====\u{203a}....");
        assert_eq!(out.chars().filter(|c| *c == '=').count(), 5);
        assert_eq!(ansi::display_width(&out), 10);
    }

    #[test]
    fn full_bar_has_no_head() {
        let config = config(Some(100));
        let view = BarView::new(&config).with_current(100);
        assert_eq!(render_bar(&view, 10), "==========");
    }

    #[test]
    fn overshoot_is_clamped() {
        let config = config(Some(10));
        let view = BarView::new(&config).with_current(25);
        assert_eq!(render_bar(&view, 4), "====");
    }

    #[test]
    fn fill_is_truncated() {
        let config = config(Some(3));
        // 2/3 of 10 is 6.66
        let view = BarView::new(&config).with_current(2);
        assert_eq!(render_bar(&view, 10), "======\u{203a}...");
    }

    #[test]
    fn empty_bar_starts_with_head() {
        let config = config(Some(10));
        let view = BarView::new(&config);
        assert_eq!(render_bar(&view, 5), "\u{203a}....");
    }

    #[test]
    fn wide_glyphs_do_not_overshoot() {
        let config = Config {
            total: Some(10),
            complete: "\u{8fdb}".to_string(), // 2 columns
            incomplete: "-".to_string(),
            ..Default::default()
        };
        let view = BarView::new(&config).with_current(5);
        let out = render_bar(&view, 7);
        // 3 filled columns only fit 1 wide glyph
        assert_eq!(out, "\u{8fdb}-----");
        assert_eq!(ansi::display_width(&out), 7);
    }

    #[test]
    fn unknown_total_bounces() {
        let config = config(None);
        let mut view = BarView::new(&config);
        assert_eq!(render_bar(&view, 6), "<=>   ");
        view.renders = 1;
        assert_eq!(render_bar(&view, 6), " <=>  ");
        view.renders = 3;
        assert_eq!(render_bar(&view, 6), "   <=>");
        view.renders = 4;
        assert_eq!(render_bar(&view, 6), "  <=> ");
        view.done = true;
        assert_eq!(render_bar(&view, 6), "======");
    }

    #[test]
    fn zero_width() {
        let config = config(Some(10));
        let view = BarView::new(&config).with_current(5);
        assert_eq!(render_bar(&view, 0), "");
    }
}
