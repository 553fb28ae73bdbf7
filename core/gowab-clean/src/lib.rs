//! Cleanup of raw transcription values before segmentation.
//!
//! Field recordings arrive with inconsistent encodings: combining diacritics
//! instead of precomposed letters, ASCII stand-ins for click letters, stray
//! punctuation, and sentence-initial capitalization. Everything here is
//! normalization; no linguistic analysis happens in this crate.

use std::collections::HashSet;

use gowab_protocol::morphology::is_click;
use gowab_protocol::{Document, LinguisticType};

/// Decomposed sequences (base letter + combining circumflex or macron) and
/// the precomposed letters they must become.
const COMBINING_PAIRS: &[(&str, &str)] = &[
    ("i\u{0302}", "î"),
    ("I\u{0302}", "Î"),
    ("o\u{0302}", "ô"),
    ("O\u{0302}", "Ô"),
    ("a\u{0302}", "â"),
    ("A\u{0302}", "Â"),
    ("e\u{0302}", "ê"),
    ("E\u{0302}", "Ê"),
    ("u\u{0302}", "û"),
    ("U\u{0302}", "Û"),
    ("a\u{0304}", "ā"),
    ("A\u{0304}", "Ā"),
    ("e\u{0304}", "ē"),
    ("E\u{0304}", "Ē"),
    ("i\u{0304}", "ī"),
    ("I\u{0304}", "Ī"),
    ("o\u{0304}", "ō"),
    ("O\u{0304}", "Ō"),
    ("u\u{0304}", "ū"),
    ("U\u{0304}", "Ū"),
];

/// ASCII stand-ins typed for click letters. `||` must be tried before `|`.
/// A word-final `=` is a clitic marker, not a click, so substitution skips
/// the last character of the word.
const CLICK_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("!", "ǃ"),
    ("#", "ǂ"),
    ("||", "ǁ"),
    ("|", "ǀ"),
    ("=", "ǂ"),
];

/// Marks removed wherever they occur.
const PAIRED_MARKS: &[char] = &['"', '“', '”', '‘', '’', '(', ')'];

/// Marks peeled from word edges only.
const EDGE_MARKS: &[char] = &[';', '?', '…', '!', ',', '.', ':'];

const QUOTE_MARKS: &[char] = &['"', '“', '”'];

/// A word following one of these is usually capitalized for orthographic
/// reasons, so it tells us nothing about proper-noun status.
const SENTENCE_BREAK_MARKS: &[char] = &['!', ':', '?', 'ǃ', '\n', '"', '“', '”'];

/// Words that surface capitalized in the corpus without being proper nouns.
const NON_CAPITALIZED_WORDS: &[&str] =
    &["Skoli", "Tsî", "ǁNā", "ǀGui", "ǁÎb", "Ā", "ǂGuro", "ǁAri", "Xawe"];

/// Repairs the encoding of one word: precomposes diacritics, substitutes
/// click letters everywhere except word-finally, and corrects the frequent
/// `tsī` (macron) misspelling of `tsî` unless the word starts `tsītsī`.
pub fn repair_word(word: &str) -> String {
    let mut word = word.to_string();
    for (bad, good) in COMBINING_PAIRS {
        word = word.replace(bad, good);
    }
    if let Some(last) = word.chars().last() {
        let split = word.len() - last.len_utf8();
        let mut prefix = word[..split].to_string();
        for (bad, good) in CLICK_SUBSTITUTIONS {
            prefix = prefix.replace(bad, good);
        }
        word = format!("{prefix}{last}");
    }
    if !word.starts_with("tsītsī") && word.starts_with("tsī") {
        word = word.replace("tsī", "tsî");
    }
    word
}

/// Repairs the encoding of a whole annotation value.
pub fn repair_encoding(annotation: &str) -> String {
    annotation
        .split_whitespace()
        .map(repair_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips punctuation from one word: paired marks anywhere, edge marks from
/// both ends (e.g. `"...blah` becomes `blah`).
pub fn strip_punctuation_word(word: &str) -> String {
    let mut w: String = word.chars().filter(|c| !PAIRED_MARKS.contains(c)).collect();
    while w.chars().last().is_some_and(|c| EDGE_MARKS.contains(&c)) {
        w.pop();
    }
    while w.chars().next().is_some_and(|c| EDGE_MARKS.contains(&c)) {
        let first_len = w.chars().next().map(char::len_utf8).unwrap_or(0);
        w = w[first_len..].to_string();
    }
    w
}

/// Removes punctuation from a repaired annotation and decapitalizes the
/// first word unless it is a known proper noun.
pub fn clean_annotation(annotation: &str, capitalized: &HashSet<String>) -> String {
    let mut words: Vec<String> = annotation
        .split_whitespace()
        .map(strip_punctuation_word)
        .filter(|w| !w.is_empty())
        .collect();
    if let Some(first) = words.first_mut() {
        if !capitalized.contains(first.as_str()) {
            *first = first.to_lowercase();
        }
    }
    words.join(" ")
}

/// The capitalized-word (proper-noun) list shared across one batch run. Read
/// once at batch start, appended in memory per document; persistence of new
/// entries is the caller's concern. This shared state is why documents must
/// be processed one at a time.
#[derive(Debug, Default)]
pub struct ProperNouns {
    known: HashSet<String>,
}

impl ProperNouns {
    pub fn new(known: HashSet<String>) -> Self {
        Self { known }
    }

    pub fn known(&self) -> &HashSet<String> {
        &self.known
    }

    pub fn contains(&self, word: &str) -> bool {
        self.known.contains(word)
    }

    /// Scans all transcription tiers of `doc` for capitalized non-initial
    /// words, before any cleaning has touched the document. `exclude` holds
    /// forms that look capitalized for grammatical reasons (conjunctions,
    /// unsegmentable forms). Newly found words are added to the shared set
    /// and returned so the caller can persist them.
    pub fn discover(&mut self, doc: &Document, exclude: &HashSet<String>) -> Vec<String> {
        let mut fresh = Vec::new();
        for tier_id in doc.tiers_of_type(LinguisticType::Transcription) {
            for annotation in &doc.tier(tier_id).annotations {
                let words: Vec<&str> = annotation.value.split_whitespace().collect();
                for i in 1..words.len() {
                    let prev = words[i - 1];
                    if prev
                        .chars()
                        .last()
                        .is_some_and(|c| SENTENCE_BREAK_MARKS.contains(&c))
                    {
                        continue;
                    }
                    if words[i].chars().next().is_some_and(|c| QUOTE_MARKS.contains(&c)) {
                        continue;
                    }
                    let word = strip_punctuation_word(&repair_word(words[i]));
                    if word.is_empty() || NON_CAPITALIZED_WORDS.contains(&word.as_str()) {
                        continue;
                    }
                    let mut chars = word.chars();
                    let mut to_check = chars.next();
                    // a click letter carries no case; look at the letter after it
                    if to_check.is_some_and(is_click) {
                        if let Some(second) = chars.next() {
                            to_check = Some(second);
                        }
                    }
                    if to_check.is_some_and(char::is_uppercase)
                        && !self.known.contains(&word)
                        && !exclude.contains(&word)
                    {
                        self.known.insert(word.clone());
                        fresh.push(word);
                    }
                }
            }
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gowab_protocol::{Alignment, Annotation, AnnotationId};
    use proptest::prelude::*;

    #[test]
    fn test_combining_marks_are_precomposed() {
        assert_eq!(repair_word("tsi\u{0302}"), "tsî");
        assert_eq!(repair_word("ha\u{0304}"), "hā");
    }

    #[test]
    fn test_click_substitution_spares_final_char() {
        assert_eq!(repair_word("!gu"), "ǃgu");
        assert_eq!(repair_word("||nae"), "ǁnae");
        // a final "=" or "!" must survive untouched
        assert_eq!(repair_word("khom="), "khom=");
        assert_eq!(repair_word("mî!"), "mî!");
        // "#" and "=" both normalize to the palatal click
        assert_eq!(repair_word("#gaes"), "ǂgaes");
        assert_eq!(repair_word("=gaes"), "ǂgaes");
    }

    #[test]
    fn test_tsi_macron_correction() {
        assert_eq!(repair_word("tsī"), "tsî");
        assert_eq!(repair_word("tsīna"), "tsîna");
        // reduplicated form is a different lexeme and is left alone
        assert_eq!(repair_word("tsītsī"), "tsītsī");
    }

    #[test]
    fn test_punctuation_stripping() {
        assert_eq!(strip_punctuation_word("“xam”"), "xam");
        assert_eq!(strip_punctuation_word("...nē"), "nē");
        assert_eq!(strip_punctuation_word("ge!?"), "ge");
        assert_eq!(strip_punctuation_word("…"), "");
    }

    #[test]
    fn test_clean_annotation_decapitalizes_unknown_first_word() {
        let capitalized: HashSet<String> = ["Namibia".to_string()].into_iter().collect();
        assert_eq!(clean_annotation("Xam ge ra ǃgû.", &capitalized), "xam ge ra ǃgû");
        assert_eq!(clean_annotation("Namibia ǃnâ", &capitalized), "Namibia ǃnâ");
    }

    fn doc_with_tx(value: &str) -> Document {
        let mut doc = Document::default();
        let tx = doc.add_tier("tx@A", LinguisticType::Transcription, None);
        doc.tier_mut(tx).annotations.push(Annotation {
            id: AnnotationId::new(1),
            value: value.to_string(),
            alignment: Alignment::Time { start_ms: 0, end_ms: 1000 },
        });
        doc
    }

    #[test]
    fn test_discover_finds_non_initial_capitalized_words() {
        let doc = doc_with_tx("nēsi ta ge Windhoek ǃnâ hâ");
        let mut nouns = ProperNouns::default();
        let fresh = nouns.discover(&doc, &HashSet::new());
        assert_eq!(fresh, vec!["Windhoek".to_string()]);
        assert!(nouns.contains("Windhoek"));
    }

    #[test]
    fn test_discover_skips_after_sentence_break_and_known_false_positives() {
        // "Tsî" is a known capitalized conjunction; "Ob" follows "!" so its
        // capitalization is orthographic
        let doc = doc_with_tx("ǁnāti! Ob ge mî Tsî ǁnā");
        let mut nouns = ProperNouns::default();
        let fresh = nouns.discover(&doc, &HashSet::new());
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_discover_checks_letter_after_click() {
        let doc = doc_with_tx("nēsi ǃKharas ǃnâ");
        let mut nouns = ProperNouns::default();
        let fresh = nouns.discover(&doc, &HashSet::new());
        assert_eq!(fresh, vec!["ǃKharas".to_string()]);
    }

    #[test]
    fn test_discover_honors_exclusion_set() {
        let doc = doc_with_tx("o Xawes ge");
        let exclude: HashSet<String> = ["Xawes".to_string()].into_iter().collect();
        let mut nouns = ProperNouns::default();
        assert!(nouns.discover(&doc, &exclude).is_empty());
    }

    proptest! {
        #[test]
        fn test_repair_is_idempotent(word in "[a-zā!#|=ǃǂǁǀ]{0,12}") {
            let once = repair_word(&word);
            prop_assert_eq!(repair_word(&once), once.clone());
        }

        #[test]
        fn test_strip_punctuation_is_idempotent(word in "[a-zǃǂ.,;:!?\"()]{0,12}") {
            let once = strip_punctuation_word(&word);
            prop_assert_eq!(strip_punctuation_word(&once), once.clone());
        }
    }
}
