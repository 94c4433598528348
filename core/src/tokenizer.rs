/// Split text into words on ASCII spaces, dropping empty runs.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(' ').filter(|w| !w.is_empty()).collect()
}

/// A word or text is valid when it contains no control characters
/// (anything below U+0020).
pub fn is_valid_word(text: &str) -> bool {
    !text.chars().any(|c| c < ' ')
}
