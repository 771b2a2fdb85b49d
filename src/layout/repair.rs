use image::RgbaImage;
use tracing::debug;

use super::render::Typesetter;
use crate::consolidate::RegionTranslation;

const SMALL_AREA_PX: u64 = 15_000;
const DENSE_CHARS_PER_PX: f64 = 0.002;
const ELONGATED_RATIO: f64 = 1.5;

/// How one region is redrawn in the repair pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest<'a> {
    pub region_translation: &'a RegionTranslation,
    pub font_size_multiplier: f32,
    pub render_priority: u8,
    pub area: u64,
}

/// `(font_size_multiplier, render_priority)` from the region's shape and how
/// much text it has to hold. The first matching class wins.
pub fn classify(translation: &RegionTranslation) -> (f32, u8) {
    let width = translation.bbox.width() as f64;
    let height = translation.bbox.height() as f64;
    let area = translation.bbox.area();
    let chars = translation.translated_text.chars().count() as f64;
    let density = chars / area.max(1) as f64;

    let is_small = area < SMALL_AREA_PX;
    let is_wide = width > height * ELONGATED_RATIO;
    let is_tall = height > width * ELONGATED_RATIO;
    let is_dense = density > DENSE_CHARS_PER_PX;

    if is_small {
        (1.25, 3)
    } else if is_wide && is_dense {
        (1.2, 2)
    } else if is_tall {
        (0.9, 2)
    } else if is_dense {
        (0.95, 1)
    } else {
        (1.0, 0)
    }
}

/// Requests sorted by descending `(render_priority, area)`.
pub fn plan_repair(translations: &[RegionTranslation]) -> Vec<LayoutRequest<'_>> {
    let mut requests: Vec<LayoutRequest<'_>> = translations
        .iter()
        .filter(|translation| !translation.translated_text.trim().is_empty())
        .map(|translation| {
            let (font_size_multiplier, render_priority) = classify(translation);
            LayoutRequest {
                region_translation: translation,
                font_size_multiplier,
                render_priority,
                area: translation.bbox.area(),
            }
        })
        .collect();
    requests.sort_by(|a, b| {
        (b.render_priority, b.area).cmp(&(a.render_priority, a.area))
    });
    requests
}

/// Redraws every region on a copy of `image` with its class multiplier.
///
/// Painting walks the plan from the back, so the highest priority and then
/// the largest regions are drawn last and cover partial overlaps left by the
/// others.
pub fn repair_overflow(
    typesetter: &Typesetter,
    image: &RgbaImage,
    translations: &[RegionTranslation],
) -> RgbaImage {
    let mut repaired = image.clone();
    let requests = plan_repair(translations);
    for request in requests.iter().rev() {
        debug!(
            "repair region {} (priority {}, x{:.2})",
            request.region_translation.region_id,
            request.render_priority,
            request.font_size_multiplier
        );
        typesetter.render(
            &mut repaired,
            &request.region_translation.bbox,
            &request.region_translation.translated_text,
            request.font_size_multiplier,
        );
    }
    repaired
}
