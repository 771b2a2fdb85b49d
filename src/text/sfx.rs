/// Katakana that show up in onomatopoeia runs (ドドド, ゴゴゴ, バキ, ガガ...).
const SFX_GLYPHS: [char; 5] = ['ド', 'ゴ', 'バ', 'キ', 'ガ'];

/// Wraps rendered sound effects on both sides.
pub const SFX_MARKER: char = '*';

/// True when `text` has two or more consecutive onomatopoeic glyphs.
///
/// This is the single SFX rule for every granularity: it is re-run on each
/// sentence, on each region's sentence list and on translated text.
pub fn is_sfx(text: &str) -> bool {
    let mut run = 0usize;
    for ch in text.chars() {
        if SFX_GLYPHS.contains(&ch) {
            run += 1;
            if run >= 2 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Sfx,
    Emphasis,
    Plain,
}

impl TextKind {
    pub fn detect(text: &str) -> Self {
        if is_sfx(text) {
            TextKind::Sfx
        } else if text.contains('!') || text.contains('?') {
            TextKind::Emphasis
        } else {
            TextKind::Plain
        }
    }
}

/// Final styling of a translated string. `source_is_sfx` forces SFX styling;
/// otherwise the kind is detected from the translation itself.
///
/// Applying it twice gives the same result as applying it once, since it runs
/// per sentence and again per region.
pub fn post_process(translation: &str, source_is_sfx: bool) -> String {
    let kind = if source_is_sfx {
        TextKind::Sfx
    } else {
        TextKind::detect(translation)
    };
    match kind {
        TextKind::Sfx => {
            let upper = translation.to_uppercase();
            if is_marked_sfx(&upper) {
                upper
            } else {
                format!("{m}{}{m}", upper, m = SFX_MARKER)
            }
        }
        TextKind::Emphasis => {
            let has_bang = translation.contains('!');
            let has_question = translation.contains('?');
            if has_bang && has_question {
                let upper = translation.to_uppercase();
                if upper.ends_with("?!") {
                    upper
                } else {
                    format!("{}?!", upper)
                }
            } else if has_bang {
                translation.to_uppercase()
            } else {
                translation.to_string()
            }
        }
        TextKind::Plain => translation.to_string(),
    }
}

fn is_marked_sfx(text: &str) -> bool {
    text.chars().count() >= 2 && text.starts_with(SFX_MARKER) && text.ends_with(SFX_MARKER)
}
