//! Quick ABNT-style reference for a catalog record

use super::{fields, Record};

/// `SURNAME, Author. Title. Publisher.`
///
/// The surname is the author's last word, uppercased. Without an author the
/// reference starts at the title.
pub fn abnt_citation(record: &Record) -> String {
    let author = record.author();
    let title = record.title();
    let publisher = record.field(fields::PUBLISHER);

    let mut parts: Vec<String> = Vec::with_capacity(3);

    if let Some(surname) = author.split_whitespace().last() {
        parts.push(format!("{}, {}", surname.to_uppercase(), author));
    }
    if !title.is_empty() {
        parts.push(title.to_string());
    }
    if !publisher.is_empty() {
        parts.push(publisher.to_string());
    }

    if parts.is_empty() {
        return String::new();
    }

    let mut citation = parts.join(". ");
    citation.push('.');
    citation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RecordIndexer;

    fn record(pairs: &[(&str, &str)]) -> Record {
        RecordIndexer::default().index(
            0,
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_full_citation() {
        let r = record(&[
            ("title", "Tristes Trópicos"),
            ("author", "Claude Lévi-Strauss"),
            ("publisher", "Companhia das Letras"),
        ]);
        assert_eq!(
            abnt_citation(&r),
            "LÉVI-STRAUSS, Claude Lévi-Strauss. Tristes Trópicos. Companhia das Letras."
        );
    }

    #[test]
    fn test_citation_without_author() {
        let r = record(&[("title", "Cahiers du Cinéma"), ("publisher", "Cosac Naify")]);
        assert_eq!(abnt_citation(&r), "Cahiers du Cinéma. Cosac Naify.");
    }

    #[test]
    fn test_citation_of_empty_record() {
        assert_eq!(abnt_citation(&record(&[])), "");
    }
}
