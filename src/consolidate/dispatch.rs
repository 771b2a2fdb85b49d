use anyhow::anyhow;
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::UniqueSentence;
use crate::text;
use crate::translator::{TranslateOptions, Translator};

/// Sentence text to styled translation, in dispatch order. Built once by
/// [`translate_all`] and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct TranslationMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl TranslationMap {
    pub fn get(&self, sentence: &str) -> Option<&str> {
        self.index
            .get(sentence)
            .map(|idx| self.entries[*idx].1.as_str())
    }

    /// Translation of the most similar key above the similarity threshold.
    /// Equal scores resolve to the key dispatched first.
    pub fn best_match(&self, sentence: &str) -> Option<&str> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, (key, _)) in self.entries.iter().enumerate() {
            let score = text::similarity(sentence, key);
            if score <= text::SIMILARITY_THRESHOLD {
                continue;
            }
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, _)| self.entries[idx].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = TranslationMap::default();
        for (key, value) in iter {
            if map.index.contains_key(&key) {
                continue;
            }
            map.index.insert(key.clone(), map.entries.len());
            map.entries.push((key, value));
        }
        map
    }
}

/// Sends each representative sentence to the translator once.
///
/// Calls run concurrently up to `options.concurrency`. A failed or timed-out
/// call leaves no entry; the page carries on with the rest.
pub async fn translate_all(
    unique: &[UniqueSentence],
    translator: &dyn Translator,
    options: &TranslateOptions,
) -> TranslationMap {
    let candidates: Vec<(usize, &UniqueSentence)> = unique
        .iter()
        .enumerate()
        .filter(|(_, sentence)| {
            text::is_sfx(&sentence.text) || !text::is_dispatch_skipped(&sentence.text)
        })
        .collect();

    let mut results: Vec<(usize, String, String)> = stream::iter(candidates)
        .map(|(idx, sentence)| async move {
            translate_sentence(&sentence.text, translator, options)
                .await
                .map(|translated| (idx, sentence.text.clone(), translated))
        })
        .buffer_unordered(options.concurrency.max(1))
        .filter_map(|result| async move { result })
        .collect()
        .await;

    results.sort_by_key(|(idx, _, _)| *idx);
    results
        .into_iter()
        .map(|(_, sentence, translated)| (sentence, translated))
        .collect()
}

async fn translate_sentence(
    sentence: &str,
    translator: &dyn Translator,
    options: &TranslateOptions,
) -> Option<String> {
    let call = translator.translate(sentence, &options.source_lang, &options.target_lang);
    let outcome = match options.timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!("timed out after {:.1}s", limit.as_secs_f32())),
        },
        None => call.await,
    };
    let raw = match outcome {
        Ok(raw) => raw,
        Err(err) => {
            warn!("translation failed for {}: {:#}", sentence, err);
            return None;
        }
    };

    let formatted = text::tidy_translation(&text::style_format(&raw));
    if formatted.is_empty() {
        debug!("empty translation for {}", sentence);
        return None;
    }
    let processed = text::post_process(&formatted, text::is_sfx(sentence));
    info!("translated: {} -> {}", sentence, processed);
    Some(processed)
}
