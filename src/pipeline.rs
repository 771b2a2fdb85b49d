use anyhow::{Context, Result};
use image::{ColorType, DynamicImage, RgbaImage};
use std::sync::Arc;
use tracing::{debug, info};

use crate::consolidate::{self, RegionTranslation, SentencePool};
use crate::layout::{Typesetter, repair_overflow};
use crate::reading_order;
use crate::recognition::{Detector, Recognizer};
use crate::region::Region;
use crate::translator::{TranslateOptions, Translator};

/// Result of one page: the rendered image plus what went into it.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub image: DynamicImage,
    pub regions: Vec<Region>,
    pub translations: Vec<RegionTranslation>,
    /// Unique sentences that came back translated. Failed calls are not
    /// counted.
    pub translated: usize,
}

/// Runs one page from detections to the composited image. Holds only shared,
/// read-only resources, so one instance serves every page of a run.
#[derive(Clone)]
pub struct PageTranslator {
    translator: Arc<dyn Translator>,
    typesetter: Arc<Typesetter>,
    options: TranslateOptions,
    text_class_id: u32,
}

impl PageTranslator {
    pub fn new(
        translator: Arc<dyn Translator>,
        typesetter: Arc<Typesetter>,
        options: TranslateOptions,
        text_class_id: u32,
    ) -> Self {
        Self {
            translator,
            typesetter,
            options,
            text_class_id,
        }
    }

    /// Detects, crops and recognizes text regions. Regions whose text fails
    /// either recognizer check are dropped here.
    pub fn recognize_regions(
        &self,
        image: &DynamicImage,
        detector: &dyn Detector,
        recognizer: &dyn Recognizer,
    ) -> Result<Vec<Region>> {
        let detections = detector
            .detect(image)
            .with_context(|| "region detection failed")?;
        let mut regions = Vec::new();
        for (id, detection) in detections.into_iter().enumerate() {
            if detection.class_id != self.text_class_id {
                continue;
            }
            let Some(visible) = detection.bbox.clamp_to(image.width(), image.height()) else {
                debug!("region {} lies outside the page", id);
                continue;
            };
            let crop = image.crop_imm(
                visible.x1 as u32,
                visible.y1 as u32,
                visible.width(),
                visible.height(),
            );
            let text = match recognizer.recognize(&crop, &detection.bbox) {
                Ok(text) => text,
                Err(err) => {
                    debug!("region {} not recognized: {:#}", id, err);
                    continue;
                }
            };
            if !recognizer.is_valid(&text, &crop) || !recognizer.is_plausible_script(&text) {
                debug!("region {} rejected: {}", id, text);
                continue;
            }
            regions.push(Region {
                id,
                bbox: detection.bbox,
                class_id: detection.class_id,
                raw_text: text,
            });
        }
        Ok(regions)
    }

    /// Orders, consolidates and translates region text. Returns the per-region
    /// translations and the number of unique sentences translated.
    pub async fn translate_regions(&self, regions: &[Region]) -> (Vec<RegionTranslation>, usize) {
        let ordered = reading_order::order(regions.to_vec());
        let pool = SentencePool::build(&ordered);
        if pool.is_empty() {
            return (Vec::new(), 0);
        }
        let consolidation = consolidate::consolidate(&pool);
        let map = consolidate::translate_all(
            &consolidation.unique,
            self.translator.as_ref(),
            &self.options,
        )
        .await;
        let translations = consolidate::remap(&pool, &map);
        info!(
            "{} sentences, {} unique, {} translated, {} regions to draw",
            pool.len(),
            consolidation.unique.len(),
            map.len(),
            translations.len()
        );
        (translations, map.len())
    }

    pub async fn translate_page(
        &self,
        image: DynamicImage,
        detector: &dyn Detector,
        recognizer: &dyn Recognizer,
    ) -> Result<PageOutcome> {
        let regions = self.recognize_regions(&image, detector, recognizer)?;
        let (translations, translated) = self.translate_regions(&regions).await;
        if translations.is_empty() {
            return Ok(PageOutcome {
                image,
                regions,
                translations,
                translated,
            });
        }

        let typesetter = Arc::clone(&self.typesetter);
        let drawn = translations.clone();
        let image = tokio::task::spawn_blocking(move || render_page(&typesetter, &image, &drawn))
            .await
            .with_context(|| "page rendering task failed")?;
        Ok(PageOutcome {
            image,
            regions,
            translations,
            translated,
        })
    }
}

/// Draws every translation in reading order, then runs the repair pass over
/// the result. The output keeps the input's dimensions and color type.
pub fn render_page(
    typesetter: &Typesetter,
    image: &DynamicImage,
    translations: &[RegionTranslation],
) -> DynamicImage {
    let color = image.color();
    let mut canvas: RgbaImage = image.to_rgba8();
    for translation in translations {
        typesetter.render(
            &mut canvas,
            &translation.bbox,
            &translation.translated_text,
            1.0,
        );
    }
    let repaired = repair_overflow(typesetter, &canvas, translations);
    restore_color(repaired, color)
}

fn restore_color(rendered: RgbaImage, color: ColorType) -> DynamicImage {
    let dynamic = DynamicImage::ImageRgba8(rendered);
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(dynamic.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(dynamic.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(dynamic.to_rgb8()),
        ColorType::L16 => DynamicImage::ImageLuma16(dynamic.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(dynamic.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(dynamic.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(dynamic.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(dynamic.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(dynamic.to_rgba32f()),
        _ => dynamic,
    }
}
