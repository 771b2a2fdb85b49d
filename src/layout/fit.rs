use super::font::{FontMetrics, measure_text_width_px};
use super::wrap::{chars_per_line, smart_wrap};

/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.1;
/// Inner padding on each side, as a fraction of the box dimension.
const PADDING_RATIO: f32 = 0.04;
const MIN_FONT_PX: f32 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSizing {
    pub size: f32,
    pub min: f32,
    pub max: f32,
}

/// Font size for `text_len` characters in a `width`×`height` box.
///
/// Starts from the box dimensions, scales down with text density, then clamps
/// to `[min, max]`. When the box is so narrow that `min > max`, `min` wins.
pub fn font_sizing(width: u32, height: u32, text_len: usize, multiplier: f32) -> FontSizing {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    let multiplier = if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        1.0
    };

    let base = (h / 4.0).min(w / 8.0).floor();
    let density = text_len as f32 / (w * h / 8000.0);
    let adjusted = (base / (1.0 + density * 0.2)).floor();
    let min = MIN_FONT_PX.max((h / 12.0).floor());
    let max = (h / 3.0).min(w / 6.0).floor();
    let size = min.max((adjusted * multiplier * 1.2).floor().min(max));
    FontSizing { size, min, max }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub font_size: f32,
    pub lines: Vec<String>,
    pub line_height: f32,
    pub block_width: f32,
    pub block_height: f32,
    pub effective_width: f32,
    pub effective_height: f32,
    /// The single shrink step was applied.
    pub shrunk: bool,
    /// The block is still taller than the box after shrinking.
    pub overflows: bool,
}

/// Sizes, wraps and measures `text` for a `width`×`height` box.
///
/// If the wrapped block is taller than the padded box the size is reduced
/// once, proportionally, and the text re-wrapped. There is no second attempt;
/// an overflowing plan is still returned and drawn.
pub fn plan_layout(
    width: u32,
    height: u32,
    text: &str,
    multiplier: f32,
    metrics: Option<&FontMetrics>,
) -> LayoutPlan {
    let text_len = text.chars().count();
    let sizing = font_sizing(width, height, text_len, multiplier);

    let padding_x = (width as f32 * PADDING_RATIO).floor();
    let padding_y = (height as f32 * PADDING_RATIO).floor();
    let effective_width = (width as f32 - 2.0 * padding_x).max(1.0);
    let effective_height = (height as f32 - 2.0 * padding_y).max(1.0);

    let mut plan = measure(text, sizing.size, effective_width, effective_height, metrics);
    if plan.block_height > effective_height {
        let reduced = (sizing.size * effective_height / plan.block_height * 0.95).floor();
        let size = sizing.min.max(reduced);
        plan = measure(text, size, effective_width, effective_height, metrics);
        plan.shrunk = true;
    }
    plan.overflows = plan.block_height > effective_height;
    plan
}

fn measure(
    text: &str,
    font_size: f32,
    effective_width: f32,
    effective_height: f32,
    metrics: Option<&FontMetrics>,
) -> LayoutPlan {
    let lines = smart_wrap(text, chars_per_line(effective_width, font_size));
    let line_height = font_size * LINE_HEIGHT;
    let block_height = lines.len() as f32 * line_height;
    let block_width = lines
        .iter()
        .map(|line| measure_text_width_px(line, font_size, metrics))
        .fold(0.0, f32::max);
    LayoutPlan {
        font_size,
        lines,
        line_height,
        block_width,
        block_height,
        effective_width,
        effective_height,
        shrunk: false,
        overflows: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_box_gets_the_minimum_size() {
        let sizing = font_sizing(100, 100, 13, 1.25);
        assert_eq!(sizing.min, 14.0);
        assert_eq!(sizing.max, 16.0);
        assert_eq!(sizing.size, 14.0);
    }

    #[test]
    fn size_stays_within_bounds() {
        let sizing = font_sizing(800, 400, 5, 1.0);
        assert_eq!(sizing.size, 116.0);
        assert!(sizing.size >= sizing.min && sizing.size <= sizing.max);

        let boosted = font_sizing(800, 400, 5, 3.0);
        assert_eq!(boosted.size, boosted.max);
    }

    #[test]
    fn minimum_wins_over_maximum_in_narrow_boxes() {
        let sizing = font_sizing(60, 300, 40, 1.0);
        assert!(sizing.min > sizing.max);
        assert_eq!(sizing.size, sizing.min);
    }

    #[test]
    fn invalid_multiplier_is_treated_as_neutral() {
        assert_eq!(font_sizing(300, 200, 20, f32::NAN), font_sizing(300, 200, 20, 1.0));
        assert_eq!(font_sizing(300, 200, 20, -2.0), font_sizing(300, 200, 20, 1.0));
    }

    #[test]
    fn fitting_text_is_not_shrunk() {
        let plan = plan_layout(400, 200, "HELLO", 1.0, None);
        assert!(!plan.shrunk);
        assert!(!plan.overflows);
        assert_eq!(plan.lines, vec!["HELLO"]);
        assert!((plan.line_height - plan.font_size * LINE_HEIGHT).abs() < f32::EPSILON);
    }

    #[test]
    fn overflowing_text_shrinks_once_and_is_still_planned() {
        let text = "THIS IS A VERY LONG SENTENCE THAT CANNOT POSSIBLY FIT INSIDE SUCH A TINY BUBBLE";
        let sizing = font_sizing(80, 60, text.chars().count(), 1.0);
        let plan = plan_layout(80, 60, text, 1.0, None);
        assert!(plan.shrunk);
        assert!(plan.font_size >= sizing.min);
        assert!(plan.font_size <= sizing.size);
        assert!(plan.overflows);
        assert!(!plan.lines.is_empty());
    }

    #[test]
    fn degenerate_boxes_do_not_panic() {
        let plan = plan_layout(1, 1, "HI", 1.0, None);
        assert!(plan.font_size >= MIN_FONT_PX);
        let empty = plan_layout(50, 50, "", 1.0, None);
        assert!(empty.lines.is_empty());
        assert_eq!(empty.block_height, 0.0);
    }
}
