mod dispatch;
mod remap;

use serde::Serialize;

use crate::region::{BBox, Region};
use crate::text;

pub use dispatch::{TranslationMap, translate_all};
pub use remap::{RegionTranslation, remap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    pub region_id: usize,
    pub text: String,
}

/// A region as the pool sees it: its box and its sentences in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRegion {
    pub region_id: usize,
    pub bbox: BBox,
    pub sentences: Vec<String>,
}

/// Every sentence of one page, built once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SentencePool {
    sentences: Vec<Sentence>,
    regions: Vec<PoolRegion>,
}

impl SentencePool {
    /// Normalizes and splits each region's text. Regions that end up with no
    /// sentence are left out entirely.
    pub fn build(regions: &[Region]) -> Self {
        let mut pool = SentencePool::default();
        for region in regions {
            let cleaned = text::normalize(&region.raw_text);
            let sentences = text::split(&cleaned);
            if sentences.is_empty() {
                continue;
            }
            for sentence in &sentences {
                pool.sentences.push(Sentence {
                    region_id: region.id,
                    text: sentence.clone(),
                });
            }
            pool.regions.push(PoolRegion {
                region_id: region.id,
                bbox: region.bbox,
                sentences,
            });
        }
        pool
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn regions(&self) -> &[PoolRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueSentence {
    pub pool_index: usize,
    pub region_id: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Consolidation {
    pub unique: Vec<UniqueSentence>,
    /// `assignment[i]` is the index in `unique` that pool sentence `i` resolves to.
    pub assignment: Vec<usize>,
}

/// First-seen deduplication: a pool sentence joins the first representative it
/// is similar to, or becomes a new representative.
pub fn consolidate(pool: &SentencePool) -> Consolidation {
    let mut consolidation = Consolidation::default();
    for (pool_index, sentence) in pool.sentences().iter().enumerate() {
        let existing = consolidation
            .unique
            .iter()
            .position(|unique| text::is_similar(&sentence.text, &unique.text));
        let unique_index = match existing {
            Some(idx) => idx,
            None => {
                consolidation.unique.push(UniqueSentence {
                    pool_index,
                    region_id: sentence.region_id,
                    text: sentence.text.clone(),
                });
                consolidation.unique.len() - 1
            }
        };
        consolidation.assignment.push(unique_index);
    }
    consolidation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: usize, raw_text: &str) -> Region {
        let x1 = 10 + id as i32 * 120;
        Region {
            id,
            bbox: BBox::new(x1, 10, x1 + 100, 110).expect("bbox"),
            class_id: 3,
            raw_text: raw_text.to_string(),
        }
    }

    #[test]
    fn pool_keeps_region_and_sentence_order() {
        let pool = SentencePool::build(&[
            region(4, "元気？大丈夫。"),
            region(1, "★★"),
            region(2, "行くぞ！"),
        ]);
        let texts: Vec<(usize, &str)> = pool
            .sentences()
            .iter()
            .map(|s| (s.region_id, s.text.as_str()))
            .collect();
        assert_eq!(texts, vec![(4, "元気？"), (4, "大丈夫。"), (2, "行くぞ！")]);
        assert_eq!(pool.regions().len(), 2);
        assert_eq!(pool.regions()[0].sentences, vec!["元気？", "大丈夫。"]);
    }

    #[test]
    fn near_duplicates_share_a_representative() {
        let pool = SentencePool::build(&[region(0, "元気？"), region(1, "元気?")]);
        let consolidation = consolidate(&pool);
        assert_eq!(consolidation.unique.len(), 1);
        assert_eq!(consolidation.unique[0].text, "元気？");
        assert_eq!(consolidation.assignment, vec![0, 0]);
    }

    #[test]
    fn consolidation_invariants_hold() {
        let pool = SentencePool::build(&[
            region(0, "海賊王におれはなる！やめろ。"),
            region(1, "海賊王におれはなる。ドドドド"),
            region(2, "やめろ！ 何だと？"),
            region(3, "ドドドドド。何だと"),
        ]);
        let consolidation = consolidate(&pool);
        assert!(consolidation.unique.len() <= pool.len());
        assert_eq!(consolidation.assignment.len(), pool.len());

        for (i, a) in consolidation.unique.iter().enumerate() {
            for b in consolidation.unique.iter().skip(i + 1) {
                assert!(!text::is_similar(&a.text, &b.text), "{} ~ {}", a.text, b.text);
            }
        }
        for (sentence, unique_index) in pool.sentences().iter().zip(&consolidation.assignment) {
            let unique = &consolidation.unique[*unique_index];
            assert!(unique.text == sentence.text || text::is_similar(&sentence.text, &unique.text));
        }
        let mut seen: Vec<usize> = consolidation.unique.iter().map(|u| u.pool_index).collect();
        let sorted = {
            let mut copy = seen.clone();
            copy.sort_unstable();
            copy
        };
        assert_eq!(seen, sorted);
        seen.dedup();
        assert_eq!(seen.len(), consolidation.unique.len());
    }
}
