use serde::Serialize;
use tracing::debug;

use super::{SentencePool, TranslationMap};
use crate::region::BBox;
use crate::text;

/// Final payload for one region: what to draw and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionTranslation {
    pub region_id: usize,
    pub bbox: BBox,
    pub original_text: String,
    pub translated_text: String,
}

/// Resolves every region's sentences against `map`, exact key first, then the
/// closest similar key. Regions that end with nothing to draw are omitted.
pub fn remap(pool: &SentencePool, map: &TranslationMap) -> Vec<RegionTranslation> {
    let mut output = Vec::new();
    for region in pool.regions() {
        let mut originals = Vec::new();
        let mut translations = Vec::new();
        for sentence in &region.sentences {
            if sentence.trim().is_empty() {
                continue;
            }
            if !text::is_sfx(sentence) && text::is_punctuation_only(sentence) {
                continue;
            }
            originals.push(sentence.as_str());
            match map.get(sentence).or_else(|| map.best_match(sentence)) {
                Some(translated) => translations.push(translated),
                None => debug!(
                    "no translation for sentence in region {}: {}",
                    region.region_id, sentence
                ),
            }
        }
        if translations.is_empty() {
            continue;
        }

        let region_sfx = region.sentences.iter().any(|sentence| text::is_sfx(sentence));
        let combined = translations.join(" ");
        let translated_text = text::post_process(&combined, region_sfx);
        if translated_text.trim().is_empty() {
            continue;
        }
        output.push(RegionTranslation {
            region_id: region.region_id,
            bbox: region.bbox,
            original_text: originals.join("\n"),
            translated_text,
        });
    }
    output
}
