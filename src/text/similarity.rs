use strsim::normalized_levenshtein;

/// Two sentences with a ratio above this are treated as the same sentence.
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Symmetric closeness ratio in `[0, 1]`, 1.0 meaning identical.
///
/// Full-width ASCII variants are folded first so `元気？` and `元気?` compare equal.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&fold_width(a), &fold_width(b))
}

pub fn is_similar(a: &str, b: &str) -> bool {
    similarity(a, b) > SIMILARITY_THRESHOLD
}

fn fold_width(text: &str) -> String {
    text.chars()
        .map(|ch| match ch as u32 {
            0xFF01..=0xFF5E => char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch),
            0x3000 => ' ',
            _ => ch,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_variants_are_identical() {
        assert!((similarity("元気？", "元気?") - 1.0).abs() < f64::EPSILON);
        assert!(is_similar("元気？", "元気?"));
    }

    #[test]
    fn ratio_is_symmetric_and_bounded() {
        let pairs = [
            ("海賊王におれはなる", "海賊王におれはなる！"),
            ("やめろ", "やめて"),
            ("", "abc"),
            ("ドドド", "ゴゴゴゴ"),
        ];
        for (a, b) in pairs {
            let ab = similarity(a, b);
            let ba = similarity(b, a);
            assert!((ab - ba).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&ab));
        }
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(is_similar("海賊王におれはなる", "海賊王におれはなる！"));
        assert!(!is_similar("やめろ", "やめて"));
        assert!(!is_similar("abcde", "abcdx"));
    }
}
