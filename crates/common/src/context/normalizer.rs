//! Text normalization shared by indexing and query parsing

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text to its comparable form.
///
/// Lowercases, decomposes (NFD) and drops combining marks so "Estética"
/// and "estetica" compare equal, then turns any character that is neither
/// alphanumeric nor whitespace into a single space so punctuation never
/// fuses adjacent words. Whitespace is not collapsed here; tokenization
/// takes care of that. Idempotent.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}
