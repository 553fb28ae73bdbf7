use std::collections::{HashMap, HashSet};

use gowab_protocol::morphology::LemmaClass;
use gowab_protocol::{Dictionary, Lemma};

/// Runtime index over the compiled dictionary: surface form to senses in row
/// order, split into the grammatical and lexical tables. The grammatical
/// table is consulted first; the lexical table falls back to a case-folded
/// lookup for capitalized forms.
pub struct SenseTable {
    grammatical: HashMap<String, Vec<Lemma>>,
    lexical: HashMap<String, Vec<Lemma>>,
    adverbs: HashSet<String>,
}

impl SenseTable {
    pub fn build(dictionary: &Dictionary) -> Self {
        let mut grammatical: HashMap<String, Vec<Lemma>> = HashMap::new();
        let mut lexical: HashMap<String, Vec<Lemma>> = HashMap::new();
        let mut adverbs = HashSet::new();
        for lemma in &dictionary.lemmas {
            if lemma.pos == "adv" {
                adverbs.insert(lemma.surface.clone());
            }
            let table = match lemma.class {
                LemmaClass::Grammatical => &mut grammatical,
                LemmaClass::Lexical => &mut lexical,
            };
            table
                .entry(lemma.surface.clone())
                .or_default()
                .push(lemma.clone());
        }
        Self {
            grammatical,
            lexical,
            adverbs,
        }
    }

    /// Senses for a surface form: grammatical table first, then lexical
    /// (exact, then lower-cased).
    pub fn lookup(&self, surface: &str) -> Option<&[Lemma]> {
        if let Some(senses) = self.grammatical.get(surface) {
            return Some(senses);
        }
        if let Some(senses) = self.lexical.get(surface) {
            return Some(senses);
        }
        self.lexical.get(&surface.to_lowercase()).map(Vec::as_slice)
    }

    /// Surface forms tagged `adv` in the dictionary; the segmenter treats
    /// these as unbreakable.
    pub fn adverbs(&self) -> &HashSet<String> {
        &self.adverbs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gowab_protocol::morphology::LemmaClass;

    fn lemma(surface: &str, gloss: &str, pos: &str, class: LemmaClass) -> Lemma {
        Lemma {
            surface: surface.to_string(),
            gloss: gloss.to_string(),
            pos: pos.to_string(),
            gender: None,
            source: None,
            other_translations: Vec::new(),
            class,
            misspellings: None,
        }
    }

    fn table() -> SenseTable {
        SenseTable::build(&Dictionary {
            version: 1,
            lemmas: vec![
                lemma("ra", "IPFV", "ptcl", LemmaClass::Grammatical),
                lemma("xam", "lion", "n", LemmaClass::Lexical),
                lemma("xam", "embrace", "v.tr.act", LemmaClass::Lexical),
                lemma("nēsi", "now", "adv", LemmaClass::Lexical),
            ],
        })
    }

    #[test]
    fn test_grammatical_table_shadows_lexical() {
        let t = table();
        assert_eq!(t.lookup("ra").unwrap()[0].gloss, "IPFV");
    }

    #[test]
    fn test_senses_keep_row_order() {
        let t = table();
        let senses = t.lookup("xam").unwrap();
        assert_eq!(senses.len(), 2);
        assert_eq!(senses[0].gloss, "lion");
        assert_eq!(senses[1].gloss, "embrace");
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let t = table();
        assert!(t.lookup("Xam").is_some());
        assert!(t.lookup("ǃuris").is_none());
    }

    #[test]
    fn test_adverbs_are_collected() {
        let t = table();
        assert!(t.adverbs().contains("nēsi"));
        assert_eq!(t.adverbs().len(), 1);
    }
}
