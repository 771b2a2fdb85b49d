use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const CHARACTER_NAMES: &[(&str, &str)] = &[
    ("カイドウ", "Kaido"),
    ("モンキー・ロ・ルフィ", "Monkey D. Luffy"),
    ("海賊王", "Pirate King"),
];

// Applied in order, so shorter keys shadow longer ones sharing a prefix.
const PHRASES: &[(&str, &str)] = &[
    ("お前", "you"),
    ("おれ", "I"),
    ("俺", "I"),
    ("あいつ", "that guy"),
    ("ばか", "idiot"),
    ("くそ", "damn"),
    ("ちくしょう", "shit"),
    ("なに", "what"),
    ("なにぃ", "whaaat"),
    ("やった", "hell yeah"),
    ("うるさい", "shut up"),
    ("やれやれ", "good grief"),
    ("はい", "yeah"),
    ("いいえ", "nah"),
];

const HONORIFICS: &[(&str, &str)] = &[
    ("sama", "-sama"),
    ("san", "-san"),
    ("kun", "-kun"),
    ("chan", "-chan"),
    ("sensei", "-sensei"),
    ("senpai", "-senpai"),
    ("kouhai", "-kouhai"),
    ("dono", "-dono"),
    ("shi", "-shi"),
];

static HONORIFIC_RES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    HONORIFICS
        .iter()
        .map(|(key, value)| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", key)).expect("static regex");
            (re, *value)
        })
        .collect()
});

static MARK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[!?]{2,}").expect("static regex"));
static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([!?.,])").expect("static regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Manga lettering conventions for translated text: names, stock phrases,
/// honorific suffixes, ellipses, stacked marks and shouting.
pub fn style_format(text: &str) -> String {
    let mut formatted = text.to_string();
    for (source, target) in CHARACTER_NAMES {
        formatted = formatted.replace(source, target);
    }
    for (source, target) in PHRASES {
        formatted = formatted.replace(source, target);
    }
    for (re, target) in HONORIFIC_RES.iter() {
        formatted = re.replace_all(&formatted, *target).into_owned();
    }

    formatted = formatted.replace("...", "…");
    // Runs of three are gone, so any `..` left is a lone double dot.
    formatted = formatted.replace("..", "…");

    formatted = MARK_RUN_RE
        .replace_all(&formatted, |caps: &Captures| {
            let run = &caps[0];
            if run.contains('!') && run.contains('?') {
                "?!".to_string()
            } else {
                run[..1].to_string()
            }
        })
        .into_owned();

    if formatted.contains('!') {
        formatted = formatted.to_uppercase();
    }
    formatted
}

/// Provider output cleanup: no space before `!?.,`, one space everywhere else.
pub fn tidy_translation(text: &str) -> String {
    let tightened = SPACE_BEFORE_PUNCT_RE.replace_all(text, "$1");
    WHITESPACE_RE
        .replace_all(&tightened, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionaries_apply_in_order() {
        insta::assert_snapshot!(style_format("カイドウ and お前"), @"Kaido and you");
        insta::assert_snapshot!(style_format("Thank you, Tanaka san"), @"Thank you, Tanaka -san");
        insta::assert_snapshot!(style_format("SENSEI said so"), @"-sensei said so");
        insta::assert_snapshot!(style_format("sansa stays"), @"sansa stays");
    }

    #[test]
    fn punctuation_is_canonicalized() {
        insta::assert_snapshot!(style_format("Wait... what.."), @"Wait… what…");
        insta::assert_snapshot!(style_format("No way??"), @"No way?");
        insta::assert_snapshot!(style_format("Seriously!?!"), @"SERIOUSLY?!");
        insta::assert_snapshot!(style_format("Run!!!"), @"RUN!");
    }

    #[test]
    fn tidy_collapses_spacing() {
        assert_eq!(tidy_translation("  Hello ,\n world  ! "), "Hello, world!");
        assert_eq!(tidy_translation("a\n\nb"), "a b");
    }
}
