const SENTENCE_ENDINGS: [char; 3] = ['。', '！', '？'];

/// Sentences that carry no content of their own and are dropped from regions.
const PUNCTUATION_ONLY: [&str; 4] = ["！", "。", "、", "．．．"];

pub fn is_ideograph(ch: char) -> bool {
    matches!(ch as u32, 0x4E00..=0x9FFF)
}

/// CJK punctuation, kana and ideographs.
pub fn is_japanese_char(ch: char) -> bool {
    matches!(
        ch as u32,
        0x3000..=0x303F | 0x3040..=0x309F | 0x30A0..=0x30FF | 0x4E00..=0x9FFF
    )
}

fn is_allowed(ch: char) -> bool {
    is_japanese_char(ch)
        || matches!(ch as u32, 0xFF00..=0xFFEF)
        || ch.is_ascii_alphanumeric()
        || ch.is_whitespace()
        || matches!(ch, '.' | ',' | '!' | '?' | '\'' | '"' | '-')
}

/// Drops characters outside the allow-list, collapses whitespace and removes
/// OCR spacing artifacts between ideographs.
pub fn normalize(raw: &str) -> String {
    let mut collapsed: Vec<char> = Vec::with_capacity(raw.len());
    let mut last_space = false;
    for ch in raw.chars().filter(|ch| is_allowed(*ch)) {
        if ch.is_whitespace() {
            if !last_space {
                collapsed.push(' ');
                last_space = true;
            }
            continue;
        }
        collapsed.push(ch);
        last_space = false;
    }

    let mut out = String::with_capacity(raw.len());
    for (idx, ch) in collapsed.iter().enumerate() {
        if *ch == ' ' {
            let prev = idx.checked_sub(1).and_then(|i| collapsed.get(i)).copied();
            let next = collapsed.get(idx + 1).copied();
            if prev.is_some_and(is_ideograph) && next.is_some_and(is_ideograph) {
                continue;
            }
        }
        out.push(*ch);
    }
    out.trim().to_string()
}

/// Breaks after each of `。！？` and returns the non-empty, trimmed sentences in order.
pub fn split(cleaned: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for ch in cleaned.chars() {
        if ch == '\n' {
            push_sentence(&mut sentences, &current);
            current.clear();
            continue;
        }
        current.push(ch);
        if SENTENCE_ENDINGS.contains(&ch) {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

pub fn is_punctuation_only(sentence: &str) -> bool {
    PUNCTUATION_ONLY.contains(&sentence.trim())
}

/// A lone `？` is not worth a provider call either, although remap keeps it.
pub fn is_dispatch_skipped(sentence: &str) -> bool {
    is_punctuation_only(sentence) || sentence.trim() == "？"
}
