//! Dictionary-driven sense selection for morphemes with more than one
//! listed sense.

use gowab_protocol::morphology::{is_verbal_pos, suffix_class, SuffixClass};
use gowab_protocol::Lemma;
use regex::Regex;
use tracing::warn;

const ENGLISH_AUX_VERBS: &[&str] = &["am", "is", "are", "was", "were"];
const LEGACY_VERBAL_POS: &[&str] = &["vtr", "vitr", "vdtr"];

/// Picks one sense out of `senses` (dictionary row order) for a morpheme,
/// using the free translation and the class of the following morpheme.
///
/// Acceptance, per candidate in row order: whole-word match of the gloss or
/// an alternate translation in the translation text, then bare substring
/// match, then the progressive cue for verbal glosses ending in `e`
/// ("write" matched by "writing"). A noun candidate needs a following
/// nominal suffix; a non-noun candidate is rejected when one follows. The
/// first listed sense is the fallback when nothing discriminates.
pub fn choose_sense<'a>(senses: &'a [Lemma], translation: &str, next_morpheme: &str) -> &'a Lemma {
    if senses.len() == 1 {
        return &senses[0];
    }
    let class = suffix_class(next_morpheme);
    let nominal_context = class.contains(SuffixClass::NOMINAL);
    let verbal_context = class.contains(SuffixClass::VERBAL);

    if translation.is_empty() {
        if nominal_context {
            if let Some(noun) = senses.iter().find(|s| s.pos == "n") {
                return noun;
            }
        }
        return &senses[0];
    }

    for sense in senses {
        let gloss = sense.gloss.replace('_', " ");
        let mut alternates = vec![gloss.clone()];
        alternates.extend(sense.other_translations.iter().cloned());
        let group = alternates
            .iter()
            .map(|a| regex::escape(a))
            .collect::<Vec<_>>()
            .join("|");

        let noun_accepted = nominal_context && !verbal_context && sense.pos == "n";
        let other_accepted = !nominal_context && sense.pos != "n";

        let whole_word = Regex::new(&format!(r"\b({group})\b"))
            .map(|re| re.is_match(translation))
            .unwrap_or(false);
        if whole_word {
            if noun_accepted || other_accepted {
                return sense;
            }
        } else if alternates.iter().any(|a| translation.contains(a.as_str())) {
            // weaker acceptance on a bare substring hit
            if noun_accepted || other_accepted {
                return sense;
            }
        } else if !nominal_context && is_verbal_pos(&sense.pos) && gloss.ends_with('e') {
            let stem = &gloss[..gloss.len() - 1];
            let progressive = format!(r"\b{}ing\b", regex::escape(stem));
            if Regex::new(&progressive)
                .map(|re| re.is_match(translation))
                .unwrap_or(false)
            {
                return sense;
            }
        }
    }
    &senses[0]
}

/// Deprecated slash-cell resolution, kept for dictionary rows that still
/// encode alternatives inline as `senseA/senseB`. Picks by exact word match
/// in the translation (with a progressive+auxiliary override that indexes
/// the part-of-speech list), then by longest substring match, defaulting to
/// the first alternative. The generic [`choose_sense`] procedure is
/// authoritative for structured rows.
pub fn resolve_slash_senses(
    gloss_options: &[&str],
    pos_options: &[&str],
    translation: &str,
) -> usize {
    let words: Vec<&str> = translation.split_whitespace().collect();
    if words.is_empty() {
        return 0;
    }
    if gloss_options.len() != pos_options.len() {
        warn!(
            glosses = gloss_options.len(),
            tags = pos_options.len(),
            "slash-encoded gloss and part-of-speech cells disagree in arity"
        );
    }
    let mut substring_hits: Vec<usize> = Vec::new();
    for (i, option) in gloss_options.iter().enumerate() {
        for (j, word) in words.iter().enumerate() {
            if option == word {
                let after_aux = j > 0 && ENGLISH_AUX_VERBS.contains(&words[j - 1]);
                if option.ends_with("ing") && (j == words.len() - 1 || after_aux) {
                    if let Some(k) = pos_options
                        .iter()
                        .position(|p| LEGACY_VERBAL_POS.contains(p))
                    {
                        return k;
                    }
                }
                return i;
            } else if word.contains(*option) {
                substring_hits.push(i);
            }
        }
    }
    let mut best = 0;
    for &i in &substring_hits {
        if gloss_options[i].len() >= gloss_options[best].len() {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use gowab_protocol::morphology::LemmaClass;

    fn lemma(gloss: &str, pos: &str, alternates: &[&str]) -> Lemma {
        Lemma {
            surface: "xam".to_string(),
            gloss: gloss.to_string(),
            pos: pos.to_string(),
            gender: None,
            source: None,
            other_translations: alternates.iter().map(|a| a.to_string()).collect(),
            class: LemmaClass::Lexical,
            misspellings: None,
        }
    }

    #[test]
    fn test_single_sense_needs_no_context() {
        let senses = [lemma("lion", "n", &[])];
        assert_eq!(choose_sense(&senses, "", "").gloss, "lion");
    }

    #[test]
    fn test_empty_translation_defaults_to_first_sense() {
        let senses = [
            lemma("embrace", "v.tr.act", &[]),
            lemma("lion", "n", &[]),
            lemma("fierce", "adj", &[]),
        ];
        assert_eq!(choose_sense(&senses, "", "").gloss, "embrace");
    }

    #[test]
    fn test_empty_translation_with_nominal_context_prefers_noun() {
        let senses = [
            lemma("embrace", "v.tr.act", &[]),
            lemma("lion", "n", &[]),
        ];
        assert_eq!(choose_sense(&senses, "", "-b").gloss, "lion");
    }

    #[test]
    fn test_whole_word_match_with_consistent_context() {
        let senses = [
            lemma("embrace", "v.tr.act", &[]),
            lemma("lion", "n", &[]),
        ];
        assert_eq!(choose_sense(&senses, "the lion roared", "-b").gloss, "lion");
        // a nominal context rejects the non-noun sense even on a word match
        assert_eq!(
            choose_sense(&senses, "they embrace warmly", "-b").gloss,
            "embrace"
        );
    }

    #[test]
    fn test_alternate_translations_participate() {
        let senses = [
            lemma("lion", "n", &["big cat"]),
            lemma("embrace", "v.tr.act", &[]),
        ];
        assert_eq!(choose_sense(&senses, "a big cat appeared", "-b").gloss, "lion");
    }

    #[test]
    fn test_underscores_match_as_spaces() {
        let senses = [
            lemma("so_that", "conj", &[]),
            lemma("yes", "interj", &[]),
        ];
        assert_eq!(choose_sense(&senses, "so that we may eat", "").gloss, "so_that");
    }

    #[test]
    fn test_progressive_cue_for_verbal_sense() {
        // "make" is not a substring of "making", so only the e -> ing cue
        // can find it
        let senses = [
            lemma("song", "n", &[]),
            lemma("make", "v.tr.act", &[]),
        ];
        assert_eq!(choose_sense(&senses, "she is making bread", "").gloss, "make");
    }

    #[test]
    fn test_legacy_exact_word_match() {
        assert_eq!(resolve_slash_senses(&["go", "come"], &["vitr", "vitr"], "they come home"), 1);
    }

    #[test]
    fn test_legacy_longest_substring_wins() {
        // neither is an exact word; both are substrings, the longer one wins
        assert_eq!(resolve_slash_senses(&["walking", "king"], &["vtr", "n"], "walkings"), 0);
        assert_eq!(resolve_slash_senses(&["alk", "walking"], &["n", "vtr"], "walkings"), 1);
    }

    #[test]
    fn test_legacy_progressive_picks_verbal_tag() {
        assert_eq!(
            resolve_slash_senses(&["singing", "song"], &["n", "vtr"], "she was singing"),
            1
        );
    }

    #[test]
    fn test_legacy_empty_translation_defaults() {
        assert_eq!(resolve_slash_senses(&["a", "b"], &["n", "n"], ""), 0);
    }
}
