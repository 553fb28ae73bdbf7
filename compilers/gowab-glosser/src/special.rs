//! Hand-curated disambiguation of a closed set of ambiguous short forms.
//! Each case is a finite binary/ternary decision driven by local context;
//! none of them consults the dictionary.

use std::collections::HashMap;

use gowab_protocol::morphology::{FIRST_PERSON_CLITICS, FIRST_PERSON_PGNS, SECOND_PERSON_PGNS};
use gowab_protocol::AnnotationId;

/// Per-utterance disambiguation state: which utterance is being processed
/// and how often each ambiguous key has been seen within it. Carried
/// explicitly through the glossing pass and reset on utterance change.
#[derive(Debug, Default)]
pub struct UtteranceState {
    current: Option<AnnotationId>,
    occurrences: HashMap<String, u32>,
}

impl UtteranceState {
    pub fn enter(&mut self, utterance: AnnotationId) {
        if self.current != Some(utterance) {
            self.current = Some(utterance);
            self.occurrences.clear();
        }
    }

    /// Records one occurrence of `key` and returns how many came before it.
    fn record(&mut self, key: &str) -> u32 {
        let count = self.occurrences.entry(key.to_string()).or_insert(0);
        let prior = *count;
        *count += 1;
        prior
    }
}

/// Local context for one morpheme: the lower-cased free translation, the raw
/// transcription of the utterance, and the neighboring morpheme/gloss values.
pub struct DisambigContext<'a> {
    pub translation: &'a str,
    pub transcription: &'a str,
    pub mb_prev: Option<&'a str>,
    pub mb_next: Option<&'a str>,
    pub ge_prev: Option<&'a str>,
    pub ge_next: Option<&'a str>,
}

fn pair(gloss: &str, pos: &str) -> (String, String) {
    (gloss.to_string(), pos.to_string())
}

/// Resolves one of the hard-coded ambiguous keys, or `None` when the
/// morpheme is not special and the dictionaries decide.
pub fn resolve(
    key: &str,
    state: &mut UtteranceState,
    ctx: &DisambigContext<'_>,
) -> Option<(String, String)> {
    let resolved = match key {
        "ge" => decl_vs_pst(state.record(key) > 0),
        "si" => first_excl_vs_fem_obj(ctx.mb_next),
        "a" | "ǀkhī" | "hā" => hortative_vs_stative(key, ctx),
        "xa" => agent_vs_topic(ctx.translation),
        "-gu" => recp_vs_pgn(ctx.translation),
        "ti" => poss_vs_quot_vs_first(ctx.transcription, ctx.translation),
        "sa" => poss_vs_second_vs_incl(ctx.translation, ctx.mb_next),
        "ā" => affirm_vs_purposive(ctx.translation),
        "o" => conj_o(ctx.transcription, ctx.mb_prev),
        "ǁnā" => dist_vs_fall(ctx.translation),
        "sī" => excl_vs_arrive(ctx.translation),
        "hâ" => particle_ha(ctx.ge_prev, ctx.translation),
        "axa" => stative_vs_child(ctx.ge_next),
        "=se" => manner_se(ctx.mb_prev),
        _ => return None,
    };
    Some(resolved)
}

/// `ge`: declarative on first occurrence in the utterance, past on the second.
fn decl_vs_pst(is_second: bool) -> (String, String) {
    if is_second {
        return pair("PST", "ptcl");
    }
    pair("DECL", "ptcl")
}

/// `si`: a following morpheme points at 1EXCL, utterance-final `si` is the
/// feminine object pronoun.
fn first_excl_vs_fem_obj(mb_next: Option<&str>) -> (String, String) {
    if mb_next.is_some_and(|n| !n.is_empty()) {
        return pair("1EXCL", "pro");
    }
    pair("2F.SG.OBJ", "pro")
}

fn hortative_vs_stative(key: &str, ctx: &DisambigContext<'_>) -> (String, String) {
    if ctx.translation.contains("let")
        && ctx.mb_next.is_some_and(|n| FIRST_PERSON_CLITICS.contains(&n))
    {
        return pair("HORT", "ptcl");
    }
    if key == "a" {
        return pair("STATa", "ptcl");
    }
    if key == "ǀkhī" || key == "hā" {
        return pair("come", "v.intr.act");
    }
    pair(key, key)
}

/// `xa`: agentive "by" vs. topical "about", read off the translation.
fn agent_vs_topic(translation: &str) -> (String, String) {
    if translation.contains("by ") {
        return pair("by", "postp");
    }
    pair("about", "postp")
}

/// `-gu`: reciprocal (verbal suffix) vs. 3M.PL (nominal suffix).
fn recp_vs_pgn(translation: &str) -> (String, String) {
    if translation.contains("each other") {
        return pair("-RECP", "-vsf");
    }
    pair("-3M.PL", "-nsf")
}

/// `ti`: possessive, first-person pronoun, or quotative particle.
fn poss_vs_quot_vs_first(transcription: &str, translation: &str) -> (String, String) {
    if translation.contains("my ")
        || translation.contains("mine.")
        || translation.contains("mine ")
        || translation.contains("mine, ")
    {
        return pair("1SG.POSS", "pro");
    }
    if translation.contains("i ") || transcription.contains("ti -ta") {
        return pair("1SG", "pro");
    }
    pair("QUOT", "ptcl")
}

/// `sa`: the following PGN marker decides person; `your` in the translation
/// signals the possessive; otherwise left for a human.
fn poss_vs_second_vs_incl(translation: &str, mb_next: Option<&str>) -> (String, String) {
    if mb_next.is_some_and(|n| FIRST_PERSON_PGNS.contains(&n)) {
        return pair("1INCL", "pro");
    }
    if mb_next.is_some_and(|n| SECOND_PERSON_PGNS.contains(&n)) {
        return pair("2", "pro");
    }
    if translation.contains("your ") {
        return pair("2SG.POSS", "pro");
    }
    pair("sa", "sa")
}

fn affirm_vs_purposive(translation: &str) -> (String, String) {
    if translation.contains("yes") || translation.contains("yeah") {
        return pair("yes", "interj");
    }
    pair("so_that", "conj")
}

/// `o`: sentence-initial or doubled `o` is "then", otherwise "when".
fn conj_o(transcription: &str, mb_prev: Option<&str>) -> (String, String) {
    let initial = transcription
        .chars()
        .next()
        .is_some_and(|c| c == 'o' || c == 'O');
    if initial || mb_prev == Some("o") {
        return pair("then", "conj");
    }
    pair("when", "conj")
}

fn dist_vs_fall(translation: &str) -> (String, String) {
    if translation.contains("fall") {
        return pair("fall", "v.intr.act");
    }
    pair("DIST", "dem")
}

fn excl_vs_arrive(translation: &str) -> (String, String) {
    if translation.contains("we ") {
        return pair("1EXCL", "pro");
    }
    pair("arrive", "vitr")
}

/// `hâ`: negative auxiliary after `tama`, locative copula after `ǃnâ` or an
/// existential cue, perfective otherwise.
fn particle_ha(ge_prev: Option<&str>, translation: &str) -> (String, String) {
    if ge_prev == Some("tama") {
        return pair("NEG.AUX", "ptcl");
    }
    if ge_prev == Some("ǃnâ")
        || translation.contains("there is")
        || translation.contains("there are")
        || translation.contains("is there")
        || translation.contains("are there")
    {
        return pair("COP.LOC", "cop");
    }
    pair("PFV", "ptcl")
}

/// `axa`: stative particle when the manner clitic follows, noun otherwise.
fn stative_vs_child(ge_next: Option<&str>) -> (String, String) {
    if ge_next == Some("=se") {
        return pair("STATaxa", "ptcl");
    }
    pair("child", "n")
}

/// `=se`: manner clitic after the two derived stems, left for a human
/// otherwise.
fn manner_se(mb_prev: Option<&str>) -> (String, String) {
    if matches!(mb_prev, Some("axa") | Some("tama")) {
        return pair("=MANNER", "=cl");
    }
    pair("=se", "=se")
}
