/// Average glyph width as a fraction of the font size, used to turn a pixel
/// width into a character budget.
const AVG_CHAR_WIDTH: f32 = 0.6;

/// Characters that fit on one line of `effective_width` pixels at `font_size`,
/// keeping a 5% safety margin. Never below 1.
pub fn chars_per_line(effective_width: f32, font_size: f32) -> usize {
    let avg = (font_size * AVG_CHAR_WIDTH).max(f32::EPSILON);
    ((effective_width * 0.95) / avg).floor().max(1.0) as usize
}

/// Greedy word wrap to `width` characters per line.
///
/// A word longer than half the budget is cut into chunks of half the budget
/// joined by hyphens, so it spreads over several lines instead of overrunning
/// the box.
pub fn smart_wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        for (idx, piece) in split_long_word(word, width).into_iter().enumerate() {
            let joins_previous = idx > 0;
            let separator = usize::from(!joins_previous);
            let piece_len = piece.chars().count();
            if current_len > 0 && current_len + separator + piece_len > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 && !joins_previous {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_long_word(word: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let chunk = (width / 2).max(1);
    if chars.len() <= chunk {
        return vec![word.to_string()];
    }
    let pieces: Vec<&[char]> = chars.chunks(chunk).collect();
    let last = pieces.len() - 1;
    pieces
        .into_iter()
        .enumerate()
        .map(|(idx, piece)| {
            let mut out: String = piece.iter().collect();
            if idx < last {
                out.push('-');
            }
            out
        })
        .collect()
}
