use std::collections::HashSet;

use serde::{Deserialize, Serialize};

fn set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// The hand-compiled decision tables driving segmentation. Kept as data so
/// the rule set can be tested and extended without touching control flow;
/// `Default` carries the curated Khoekhoe tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Candidate PGN suffixes in match priority order. The order matters:
    /// "ts" must be tried before "s", "kho" before "o"-like endings, etc.
    pub pgn_suffixes: Vec<String>,
    pub conjunctions: HashSet<String>,
    /// Function words and fixed forms that are never segmented.
    pub unsegmented_forms: HashSet<String>,
    /// Loanwords and nominals that look segmentable but are not.
    pub unsegmented_nominals: HashSet<String>,
    pub personal_pronoun_stems: HashSet<String>,
    /// PGN markers that occur as standalone words.
    pub free_pgn_markers: HashSet<String>,
    pub demonstrative_stems: HashSet<String>,
    /// Stems whose final "ro" is the diminutive and segments further.
    pub diminutive_forms: HashSet<String>,
    /// Derived manner adverbials that lose their "se" ending as a clitic.
    pub manner_adverbials: HashSet<String>,
    pub hortative_particles: HashSet<String>,
    /// First-person person/number/gender markers a hortative particle absorbs.
    pub first_person_markers: HashSet<String>,
    /// Paralinguistic vocabulary: annotated in brackets, never analyzed.
    pub backchannels: HashSet<String>,
    pub fillers: HashSet<String>,
    /// Known adverbs, injected from the glossing dictionary at batch start.
    pub adverbs: HashSet<String>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            pgn_suffixes: [
                "ta", "khom", "ge", "da", "ts", "kho", "ro", "go", "so", "du", "b", "s", "kha",
                "ra", "gu", "di", "n",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            conjunctions: set(&[
                "î", "o", "osa", "xawe", "xabe", "tsî", "hîa", "amaga", "ǁnā-amaga", "nēti", "ǃnâ",
            ]),
            unsegmented_forms: set(&[
                "mâpa", "mâǁae", "mâtikō", "tare", "tare-i", "tari", "ai", "aiǃâ", "aiǂama",
                "khaoǃgâ", "khami", "khama", "kōse", "tawa", "ose", "xa", "xu", "xōri", "ǀî",
                "ǁaegu", "ǁga", "ǀkha", "ǂama", "ǃaroma", "ǃoa", "ǃoa-ai", "ǃoagu", "ǃgao", "ǃnâ",
                "ǂamai", "ǂamǃnâ", "ǃna", "ǂnamipe", "tsîn", "xabe", "mati", "mâti", "mapa",
                "ǃnâ-ū", "kose", "nē", "ǁnā", "nau", "tama", "kha", "nēba", "go", "ge", "goro",
                "gere", "ra", "ga", "ka", "nî", "a", "di", "ti", "sa", "si", "sī", "tī", "sā",
                "hâ", "kara", "nîra", "tite", "re", "bi", "te", "ǂguro", "ǃnona", "ǃnāsa", "ǃora",
                "koro",
            ]),
            unsegmented_nominals: set(&[
                "collage", "college", "gangan", "Kavango", "china", "China", "aio",
            ]),
            personal_pronoun_stems: set(&["ti", "sa", "si", "sī", "tī", "sā", "ǁî"]),
            free_pgn_markers: set(&["ta", "da", "du", "gu", "khom"]),
            demonstrative_stems: set(&["nē", "ǁnā", "nau"]),
            diminutive_forms: set(&["axaro", "ǀgôaro", "khoero"]),
            manner_adverbials: set(&["axase", "tamase"]),
            hortative_particles: set(&["a"]),
            first_person_markers: set(&["ta", "khom", "m", "ge", "se", "da"]),
            backchannels: set(&["eeh", "umm", "hmm", "eehm", "ahm", "hm", "aha"]),
            fillers: set(&["mhm", "uhm"]),
            adverbs: HashSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pgn_priority_order_lists_longer_before_contained_shorter() {
        let cfg = SegmenterConfig::default();
        let pos = |m: &str| cfg.pgn_suffixes.iter().position(|s| s == m).unwrap();
        assert!(pos("ts") < pos("s"));
        assert!(pos("khom") < pos("kho"));
        assert!(pos("kha") < pos("ra"));
    }

    #[test]
    fn test_config_deserializes_with_partial_overrides() {
        let cfg: SegmenterConfig =
            serde_json::from_str(r#"{ "adverbs": ["nēsi"] }"#).unwrap();
        assert!(cfg.adverbs.contains("nēsi"));
        // untouched tables come from the defaults
        assert!(cfg.conjunctions.contains("xawe"));
    }
}
