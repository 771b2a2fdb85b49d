//! Fitting translated text into page regions and compositing it.

mod fit;
mod font;
mod render;
mod repair;
mod wrap;

pub use fit::{FontSizing, LINE_HEIGHT, LayoutPlan, font_sizing, plan_layout};
pub use font::{FontMetrics, FontResource, load_font_metrics, measure_text_width_px};
pub use render::{OverlayStyle, Typesetter};
pub use repair::{LayoutRequest, classify, plan_repair, repair_overflow};
pub use wrap::{chars_per_line, smart_wrap};
