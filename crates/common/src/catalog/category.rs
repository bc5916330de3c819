//! Category cleanup applied once per record at ingestion

use regex_lite::Regex;
use std::sync::OnceLock;

/// Trailing decorative counter, e.g. the `+1` in `"Cinema +1"`.
fn counter_suffix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\+.*").expect("static pattern compiles"))
}

/// Strip the decorative counter suffix and surrounding whitespace.
///
/// Casing, synonyms and hierarchy are left untouched.
pub fn clean_category(raw: &str) -> String {
    counter_suffix().replace_all(raw, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_counter_suffix() {
        assert_eq!(clean_category("Antropologia +3"), "Antropologia");
        assert_eq!(clean_category("Cinema +1"), "Cinema");
        assert_eq!(clean_category("  Fotografia+12  "), "Fotografia");
    }

    #[test]
    fn no_suffix_is_noop() {
        assert_eq!(clean_category("Artes"), "Artes");
        assert_eq!(clean_category("Ciência Política"), "Ciência Política");
    }

    #[test]
    fn is_idempotent() {
        for raw in ["Cinema +1", "Artes", " +2", "Design + extra + more", ""] {
            let once = clean_category(raw);
            assert_eq!(clean_category(&once), once);
            assert!(!once.contains('+'));
        }
    }

    #[test]
    fn strips_every_suffix_in_multiline_cell() {
        let once = clean_category("Cinema +1\nArtes +2");
        assert_eq!(once, "Cinema \nArtes");
        assert!(!once.contains('+'));
        assert_eq!(clean_category(&once), once);
    }

    #[test]
    fn suffix_only_becomes_empty() {
        assert_eq!(clean_category("+1"), "");
    }
}
