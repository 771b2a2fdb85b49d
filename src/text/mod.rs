mod normalize;
mod sfx;
mod similarity;
mod style;

pub use normalize::{
    is_dispatch_skipped, is_ideograph, is_japanese_char, is_punctuation_only, normalize, split,
};
pub use sfx::{SFX_MARKER, TextKind, is_sfx, post_process};
pub use similarity::{SIMILARITY_THRESHOLD, is_similar, similarity};
pub use style::{style_format, tidy_translation};
