use gowab_protocol::morphology::{is_click, AFFIX_MARKER, CLITIC_MARKER};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SegmenterConfig;

/// Irregular additive form: `tsîn` with an optional oblique clitic fused on.
static IRREGULAR_TSIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^tsîn(a)?$").expect("irregular-form pattern is valid"));

fn irregular_tsin(word: &str) -> Option<String> {
    let caps = IRREGULAR_TSIN.captures(word)?;
    caps.get(1).map(|_| "tsîn -a".to_string())
}

fn strip_last_chars(s: &str, n: usize) -> &str {
    let mut end = s.len();
    for c in s.chars().rev().take(n) {
        end -= c.len_utf8();
    }
    &s[..end]
}

/// Orthographic hyphens already mark a boundary; the marker unit behind them
/// is split off as its own token. A final `-e` spells the 3C.SG marker plus
/// the oblique, so it expands to both.
fn segment_hyphened(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("-i") {
        if !stem.is_empty() {
            return Some(format!("{stem} -i"));
        }
    }
    if let Some(stem) = word.strip_suffix("-e") {
        if !stem.is_empty() {
            return Some(format!("{stem} -i -a"));
        }
    }
    None
}

/// Final-vowel heuristic for 3C.SG `i`: the vowel splits off after a doubled
/// nasal (`xammi`, `sisenni`) or a single liquid/nasal (`xami`, `skoli`).
fn splits_final_i(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    let n = chars.len();
    if n > 2 && matches!((chars[n - 3], chars[n - 2]), ('m', 'm') | ('n', 'n')) {
        return true;
    }
    n > 1 && matches!(chars[n - 2], 'm' | 'l' | 'r')
}

/// Segments one utterance into marker-annotated morphemes.
///
/// Tokens are visited left to right with access to their original (not yet
/// segmented) neighbors; a token may consume its right neighbor. Rules are
/// tried in fixed priority order and the first applicable rule wins.
pub struct MorphemeBreaker<'a> {
    cfg: &'a SegmenterConfig,
    /// Aligned free translation; a handful of rules consult it.
    translation: &'a str,
    /// Set when the whole utterance was detected as foreign-language.
    foreign: bool,
}

impl<'a> MorphemeBreaker<'a> {
    pub fn new(cfg: &'a SegmenterConfig, translation: &'a str, foreign: bool) -> Self {
        Self {
            cfg,
            translation,
            foreign,
        }
    }

    /// Primary entry point: utterance text in, boundary-marked text out.
    pub fn break_utterance(&self, utterance: &str) -> String {
        let original: Vec<String> = utterance.split_whitespace().map(str::to_string).collect();
        let mut words = original.clone();

        if self.foreign || original.first().map(String::as_str) == Some("inaudible") {
            return words.join(" ");
        }

        let mut consumed_next = false;
        for i in 0..words.len() {
            if consumed_next {
                consumed_next = false;
                continue;
            }
            let cur = original[i].clone();
            let prev = if i > 0 { Some(original[i - 1].as_str()) } else { None };
            let next = original.get(i + 1).map(String::as_str);

            if self.cfg.backchannels.contains(&cur) || self.cfg.fillers.contains(&cur) {
                words[i] = format!("[{cur}]");
                continue;
            }
            if self.cfg.hortative_particles.contains(&cur) {
                if let Some(n) = next {
                    if self.cfg.first_person_markers.contains(n) {
                        words[i + 1] = format!("{CLITIC_MARKER}{n}");
                        consumed_next = true;
                        continue;
                    }
                }
            }
            if let Some(split) = self.split_fused_hortative(&cur) {
                words[i] = split;
                continue;
            }
            if let Some(rewritten) = irregular_tsin(&cur) {
                words[i] = rewritten;
                continue;
            }
            if !self.is_breakable(&cur) {
                continue;
            }
            if let Some(rewritten) = self.derive_manner(&cur) {
                words[i] = rewritten;
                continue;
            }
            if let Some(rewritten) = self.segment_free_pgn(&cur, prev, next) {
                words[i] = rewritten;
                continue;
            }
            if let Some(rewritten) = segment_hyphened(&cur) {
                words[i] = rewritten;
                continue;
            }
            if let Some(rewritten) = self.segment_valency(&cur, i + 1 == words.len()) {
                words[i] = rewritten;
                continue;
            }
            if let Some(rewritten) = self.segment_pgn_suffix(&cur) {
                words[i] = rewritten;
                continue;
            }
            if let Some(rewritten) = self.segment_oblique(&cur) {
                words[i] = rewritten;
            }
        }
        words.join(" ")
    }

    /// A hortative particle written as one orthographic word with the
    /// first-person marker it absorbs: `akhom` -> `a =khom`.
    fn split_fused_hortative(&self, word: &str) -> Option<String> {
        for particle in &self.cfg.hortative_particles {
            if let Some(marker) = word.strip_prefix(particle.as_str()) {
                if self.cfg.first_person_markers.contains(marker) {
                    return Some(format!("{particle} {CLITIC_MARKER}{marker}"));
                }
            }
        }
        None
    }

    /// The gate of the ladder: a word failing this check passes through the
    /// segmenter untouched.
    fn is_breakable(&self, word: &str) -> bool {
        if self.cfg.unsegmented_forms.contains(word) || self.cfg.unsegmented_nominals.contains(word)
        {
            return false;
        }
        if self.cfg.conjunctions.contains(word) || self.cfg.adverbs.contains(word) {
            return false;
        }
        // manner "se" adverbs stay whole, except the two derived stems
        if word.ends_with("se") && !self.cfg.manner_adverbials.contains(word) {
            return false;
        }
        if word.ends_with("ma") && !word.ends_with("khoma") {
            return false;
        }
        if word.ends_with("ǁgoa") {
            return false;
        }
        true
    }

    /// `axase` -> `axa =se`, `tamase` -> `tama =se`.
    fn derive_manner(&self, word: &str) -> Option<String> {
        if self.cfg.manner_adverbials.contains(word) {
            let stem = strip_last_chars(word, 2);
            return Some(format!("{stem} {CLITIC_MARKER}se"));
        }
        None
    }

    /// Standalone PGN markers. After a personal-pronoun stem they are affixes
    /// (`ti ta` -> `ti -ta`); after a demonstrative stem `gu` also stays an
    /// affix; anywhere else they cliticize onto the preceding word. The
    /// pattern `o PGN ge` additionally cliticizes the enclosed marker.
    fn segment_free_pgn(&self, word: &str, prev: Option<&str>, next: Option<&str>) -> Option<String> {
        if self.cfg.free_pgn_markers.contains(word) {
            let affix = match prev {
                Some(p) if self.cfg.personal_pronoun_stems.contains(p) => true,
                Some(p) if self.cfg.demonstrative_stems.contains(p) && word == "gu" => true,
                _ => false,
            };
            let sep = if affix { AFFIX_MARKER } else { CLITIC_MARKER };
            return Some(format!("{sep}{word}"));
        }
        if (word == "i" || self.cfg.pgn_suffixes.iter().any(|m| m == word))
            && prev == Some("o")
            && next == Some("ge")
        {
            return Some(format!("{CLITIC_MARKER}{word}"));
        }
        None
    }

    /// Valency-changing operators peeled from the word end, including the
    /// stacked applicative combinations. The reflexive is homophonous with a
    /// lexical ending and is peeled only on a reflexive cue in the
    /// translation; without the cue the word is left whole and no later rule
    /// gets another try.
    fn segment_valency(&self, word: &str, is_last: bool) -> Option<String> {
        if let Some(stem) = word.strip_suffix("bahe") {
            if !stem.is_empty() {
                return Some(format!("{stem} -ba -he"));
            }
        }
        if let Some(stem) = word.strip_suffix("he") {
            if !stem.is_empty() {
                return Some(format!("{stem} -he"));
            }
        }
        if let Some(stem) = word.strip_suffix("basen") {
            if !stem.is_empty() {
                return Some(format!("{stem} -ba -sen"));
            }
        }
        if let Some(stem) = word.strip_suffix("sen") {
            if !stem.is_empty() {
                if self.translation.contains("self") || self.translation.contains("selves") {
                    return Some(format!("{stem} -sen"));
                }
                return Some(word.to_string());
            }
        }
        for fused in ["babi", "basi", "bate"] {
            if word.ends_with(fused) && word.len() > 4 {
                let stem = &word[..word.len() - 4];
                let object_marker = &word[word.len() - 2..];
                // object markers are separated with a plain space
                return Some(format!("{stem} -ba {object_marker}"));
            }
        }
        if is_last {
            if let Some(stem) = word.strip_suffix("ba") {
                if !stem.is_empty() {
                    return Some(format!("{stem} -ba"));
                }
            }
        }
        None
    }

    /// PGN suffix segmentation against the priority-ordered candidate list,
    /// with the final-`i` and conjunction-`m` fallbacks.
    fn segment_pgn_suffix(&self, word: &str) -> Option<String> {
        for morpheme in &self.cfg.pgn_suffixes {
            let Some(prefix) = word.strip_suffix(morpheme.as_str()) else {
                continue;
            };
            if prefix.is_empty() {
                continue;
            }
            // clicks are never morpheme-final before a suffix boundary
            if prefix.chars().last().is_some_and(is_click) {
                continue;
            }
            let clitic_host = self.cfg.conjunctions.contains(prefix)
                || self.cfg.unsegmented_forms.contains(prefix)
                || self.cfg.adverbs.contains(prefix);
            let affix_exception = self.cfg.personal_pronoun_stems.contains(prefix)
                || (prefix == "tsî" && morpheme == "n");
            let sep = if clitic_host && !affix_exception {
                CLITIC_MARKER
            } else {
                AFFIX_MARKER
            };
            let host = if self.cfg.diminutive_forms.contains(prefix) {
                format!("{} -ro", strip_last_chars(prefix, 2))
            } else {
                prefix.to_string()
            };
            return Some(format!("{host} {sep}{morpheme}"));
        }
        if word.ends_with('i') && splits_final_i(word) {
            let stem = strip_last_chars(word, 1);
            return Some(format!("{stem} -i"));
        }
        if let Some(stem) = word.strip_suffix('m') {
            if !stem.is_empty()
                && (self.cfg.conjunctions.contains(stem) || self.cfg.adverbs.contains(stem))
            {
                return Some(format!("{stem} {CLITIC_MARKER}m"));
            }
        }
        None
    }

    /// Oblique-case segmentation, tried only when nothing earlier fired.
    /// The oblique endings hide a PGN suffix (`khoega` = `khoe -gu -a`), so
    /// each branch substitutes the underlying form and re-runs PGN
    /// segmentation on it, appending the oblique marker to the result.
    fn segment_oblique(&self, word: &str) -> Option<String> {
        if let Some(stem) = word.strip_suffix("ga") {
            if stem.chars().last().is_some_and(is_click) {
                // click + "ga" endings are monomorphemic
                return None;
            }
            let underlying = format!("{stem}gu");
            return self
                .segment_pgn_suffix(&underlying)
                .map(|segmented| format!("{segmented} -a"));
        }
        if let Some(rewritten) = irregular_tsin(word) {
            return Some(rewritten);
        }
        if let Some(stem) = word.strip_suffix("de") {
            let underlying = format!("{stem}di");
            return self
                .segment_pgn_suffix(&underlying)
                .map(|segmented| format!("{segmented} -a"));
        }
        if let Some(stem) = word.strip_suffix('a') {
            return self
                .segment_pgn_suffix(stem)
                .map(|segmented| format!("{segmented} -a"));
        }
        if let Some(stem) = word.strip_suffix('e') {
            if splits_final_i(&format!("{stem}i")) {
                return Some(format!("{stem} -i -a"));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cfg() -> SegmenterConfig {
        SegmenterConfig::default()
    }

    fn segment(utterance: &str) -> String {
        segment_with(utterance, "")
    }

    fn segment_with(utterance: &str, translation: &str) -> String {
        let cfg = cfg();
        MorphemeBreaker::new(&cfg, translation, false).break_utterance(utterance)
    }

    #[test]
    fn test_unbreakable_tokens_pass_through() {
        for word in ["xawe", "tsî", "ǃnâ", "khami", "nē", "tama", "kōse", "Kavango"] {
            assert_eq!(segment(word), word, "{word} must not be segmented");
        }
    }

    #[test]
    fn test_manner_se_words_stay_whole_except_derived_stems() {
        assert_eq!(segment("kaise"), "kaise");
        assert_eq!(segment("axase"), "axa =se");
        assert_eq!(segment("tamase"), "tama =se");
    }

    #[test]
    fn test_suffix_priority_longer_candidate_wins() {
        // "ts" is listed before "s" and must be matched first
        assert_eq!(segment("mîts"), "mî -ts");
    }

    #[test]
    fn test_click_final_prefix_rejects_suffix_boundary() {
        assert_eq!(segment("aoǃs"), "aoǃs");
    }

    #[test]
    fn test_pgn_suffix_after_pronoun_stem_is_affix() {
        assert_eq!(segment("tita"), "ti -ta");
        assert_eq!(segment("sādu"), "sā -du");
    }

    #[test]
    fn test_pgn_suffix_after_conjunction_is_clitic() {
        assert_eq!(segment("xawets"), "xawe =ts");
    }

    #[test]
    fn test_adjacency_exception_forces_affix() {
        // with "tsîn" released from the unsegmented table, the "tsî"+"n"
        // adjacency still must not cliticize
        let mut cfg = cfg();
        cfg.unsegmented_forms.remove("tsîn");
        let breaker = MorphemeBreaker::new(&cfg, "", false);
        assert_eq!(breaker.break_utterance("tsîn"), "tsî -n");
    }

    #[test]
    fn test_diminutive_prefix_segments_further() {
        assert_eq!(segment("axarob"), "axa -ro -b");
    }

    #[test]
    fn test_final_i_heuristic() {
        assert_eq!(segment("xami"), "xam -i");
        assert_eq!(segment("sisenni"), "sisenn -i");
        assert_eq!(segment("skoli"), "skol -i");
        // no liquid/nasal before the vowel: left alone
        assert_eq!(segment("ǀhapi"), "ǀhapi");
    }

    #[test]
    fn test_final_m_after_conjunction_cliticizes() {
        assert_eq!(segment("tsîm"), "tsî =m");
        assert_eq!(segment("xawem"), "xawe =m");
    }

    #[test]
    fn test_hyphened_markers() {
        assert_eq!(segment("xam-i"), "xam -i");
        assert_eq!(segment("tara-e"), "tara -i -a");
    }

    #[test]
    fn test_valency_operators() {
        assert_eq!(segment("māhe"), "mā -he");
        assert_eq!(segment("mābahe"), "mā -ba -he");
        assert_eq!(segment_with("ǁāsen", "she washes herself"), "ǁā -sen");
        assert_eq!(segment("mābasen"), "mā -ba -sen");
        assert_eq!(segment("mîbate"), "mî -ba te");
        // applicative in utterance-final position only; elsewhere the "ba"
        // ending falls through to the oblique rule
        assert_eq!(segment("mîba"), "mî -ba");
        assert_eq!(segment("mîba xa"), "mî -b -a xa");
    }

    #[test]
    fn test_reflexive_needs_translation_cue() {
        assert_eq!(segment_with("xxxsen", "they saw a snake"), "xxxsen");
        assert_eq!(segment_with("xxxsen", "he hid himself"), "xxx -sen");
    }

    #[test]
    fn test_free_pgn_markers() {
        assert_eq!(segment("ti ta"), "ti -ta");
        assert_eq!(segment("ǁnā gu"), "ǁnā -gu");
        assert_eq!(segment("sao du"), "sao =du");
        assert_eq!(segment("o i ge"), "o =i ge");
    }

    #[test]
    fn test_round_trip_scenario() {
        // "sao khom ge" / "we followed": khom cliticizes onto the verb, ge
        // survives for the disambiguator
        assert_eq!(segment_with("sao khom ge", "we followed"), "sao =khom ge");
    }

    #[test]
    fn test_hortative_absorption() {
        assert_eq!(segment_with("a khom ǃgû", "let us go"), "a =khom ǃgû");
        assert_eq!(segment_with("akhom ǃgû", "let us go"), "a =khom ǃgû");
    }

    #[test]
    fn test_irregular_tsin() {
        assert_eq!(segment("tsîna"), "tsîn -a");
        assert_eq!(segment("tsîn"), "tsîn");
    }

    #[test]
    fn test_oblique_recursion() {
        assert_eq!(segment("khoega"), "khoe -gu -a");
        assert_eq!(segment("gomade"), "goma -di -a");
        assert_eq!(segment("xamme"), "xamm -i -a");
        // click before "ga": monomorphemic
        assert_eq!(segment("aoǃga"), "aoǃga");
    }

    #[test]
    fn test_oblique_a_recursion() {
        // "khoeta" is caught by plain PGN segmentation first; an "a" that
        // hides a PGN suffix recurses: "tarasa" -> strip "a" -> "taras"
        assert_eq!(segment("tarasa"), "tara -s -a");
    }

    #[test]
    fn test_backchannels_and_fillers_are_bracketed() {
        assert_eq!(segment("eeh xam ge"), "[eeh] xam ge");
        assert_eq!(segment("mhm"), "[mhm]");
    }

    #[test]
    fn test_inaudible_and_foreign_utterances_left_alone() {
        assert_eq!(segment("inaudible xami ge"), "inaudible xami ge");
        let cfg = cfg();
        let foreign = MorphemeBreaker::new(&cfg, "", true);
        assert_eq!(foreign.break_utterance("die man het gesê"), "die man het gesê");
    }

    proptest! {
        #[test]
        fn test_unsegmented_forms_are_idempotent(idx in 0usize..60) {
            let cfg = cfg();
            let mut forms: Vec<&String> = cfg.unsegmented_forms.iter().collect();
            forms.sort();
            let word = forms[idx % forms.len()].clone();
            let breaker = MorphemeBreaker::new(&cfg, "", false);
            prop_assert_eq!(breaker.break_utterance(&word), word);
        }

        #[test]
        fn test_click_final_stems_never_split(stem in "[a-z]{1,6}[ǃǂǁǀ]", suffix in 0usize..17) {
            let cfg = cfg();
            let word = format!("{}{}", stem, cfg.pgn_suffixes[suffix % cfg.pgn_suffixes.len()]);
            let breaker = MorphemeBreaker::new(&cfg, "", false);
            let out = breaker.break_utterance(&word);
            // a boundary right after the click must never be introduced
            prop_assert!(!out.contains("ǃ -") && !out.contains("ǂ -") && !out.contains("ǁ -") && !out.contains("ǀ -"));
            prop_assert!(!out.contains("ǃ =") && !out.contains("ǂ =") && !out.contains("ǁ =") && !out.contains("ǀ ="));
        }
    }
}
