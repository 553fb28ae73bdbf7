//! The orchestrator: walks a document tier by tier, runs cleanup and
//! segmentation, materializes the morpheme-level tiers, then glosses every
//! morpheme annotation in place.

use std::collections::HashSet;

use gowab_clean::{clean_annotation, repair_encoding, ProperNouns};
use gowab_protocol::{
    AnnotationId, Dictionary, Document, GraphError, LinguisticType, TierId,
};
use gowab_segmenter::{classify_token, parse_morphemes, MorphemeBreaker, MorphemeKind, SegmenterConfig};
use tracing::{debug, warn};

use crate::disambig::{choose_sense, resolve_slash_senses};
use crate::lexicon::SenseTable;
use crate::linkage::{self, AnnotationForest};
use crate::special::{self, DisambigContext, UtteranceState};

/// Injected language-detection capability. The pipeline only needs a gate:
/// foreign-language utterances are neither segmented nor glossed.
pub trait LanguageDetector {
    fn is_foreign(&self, text: &str) -> bool;
}

/// Default detector treating every span as target-language.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDetection;

impl LanguageDetector for NoDetection {
    fn is_foreign(&self, _text: &str) -> bool {
        false
    }
}

/// One batch run's worth of glossing state. Dictionaries and rule tables are
/// read-only after construction; the proper-noun list is the only mutable
/// cross-document state, which is why documents go through one at a time.
pub struct Pipeline<D = NoDetection> {
    table: SenseTable,
    config: SegmenterConfig,
    detector: D,
    proper_nouns: ProperNouns,
}

impl<D: LanguageDetector> Pipeline<D> {
    pub fn new(
        dictionary: &Dictionary,
        mut config: SegmenterConfig,
        detector: D,
        known_proper_nouns: HashSet<String>,
    ) -> Self {
        let table = SenseTable::build(dictionary);
        // the segmenter's adverb table comes from the dictionary
        config.adverbs.extend(table.adverbs().iter().cloned());
        Self {
            table,
            config,
            detector,
            proper_nouns: ProperNouns::new(known_proper_nouns),
        }
    }

    /// Processes one document to completion: cleanup, segmentation,
    /// materialization, glossing. Returns the proper nouns newly discovered
    /// in this document so the caller can persist them.
    ///
    /// A structurally unbalanced document returns `TierMismatch`; callers
    /// skip it and continue the batch.
    pub fn process_document(&mut self, doc: &mut Document) -> Result<Vec<String>, GraphError> {
        if let Err(err) = doc.check_tier_balance() {
            warn!(%err, "skipping document");
            return Err(err);
        }
        let mut exclude: HashSet<String> = self.config.conjunctions.clone();
        exclude.extend(self.config.unsegmented_forms.iter().cloned());
        let fresh = self.proper_nouns.discover(doc, &exclude);
        self.preprocess(doc)?;
        self.gloss(doc)?;
        Ok(fresh)
    }

    /// Per transcription annotation: repair encoding, mirror into the
    /// orthography tier, clean, segment, and materialize one `mb` annotation
    /// per morpheme plus `ge`/`ps` placeholders carrying the morpheme text.
    fn preprocess(&self, doc: &mut Document) -> Result<(), GraphError> {
        let links = linkage::transcription_links(doc)?;
        for tx_tier in doc.tiers_of_type(LinguisticType::Transcription) {
            let (mb_tier, ge_tier, ps_tier) = morpheme_tiers(doc, tx_tier);
            let orig_tier = links.tx_to_orig[&tx_tier];
            let count = doc.tier(tx_tier).annotations.len();
            for idx in 0..count {
                let (ann_id, raw_value) = {
                    let annotation = &doc.tier(tx_tier).annotations[idx];
                    (annotation.id, annotation.value.clone())
                };
                let materialized = doc
                    .tier(mb_tier)
                    .annotations
                    .iter()
                    .any(|a| a.parent() == Some(ann_id));
                if materialized {
                    // an earlier run already segmented this utterance
                    continue;
                }
                let repaired = repair_encoding(&raw_value);
                copy_to_orig(doc, orig_tier, ann_id, &repaired);
                let cleaned = clean_annotation(&repaired, self.proper_nouns.known());
                let translation = match links.tx_to_fte.get(&ann_id) {
                    Some(&fte_id) => doc.annotation_by_id(fte_id)?.value.clone(),
                    // not every utterance has a translation
                    None => String::new(),
                };
                let foreign = self.detector.is_foreign(&cleaned);
                let breaker = MorphemeBreaker::new(&self.config, &translation, foreign);
                let segmented = breaker.break_utterance(&cleaned);
                doc.tier_mut(tx_tier).annotations[idx].value = segmented.clone();
                if foreign {
                    // the gate: foreign spans get no morpheme annotations
                    continue;
                }

                let mut prev_mb = None;
                let mut prev_ge = None;
                let mut prev_ps = None;
                for morpheme in parse_morphemes(&segmented) {
                    let mb_id =
                        doc.append_dependent_annotation(mb_tier, morpheme.raw, ann_id, prev_mb);
                    let ge_id =
                        doc.append_dependent_annotation(ge_tier, morpheme.raw, mb_id, prev_ge);
                    let ps_id =
                        doc.append_dependent_annotation(ps_tier, morpheme.raw, mb_id, prev_ps);
                    prev_mb = Some(mb_id);
                    prev_ge = Some(ge_id);
                    prev_ps = Some(ps_id);
                }
            }
        }
        Ok(())
    }

    /// Per gloss annotation: resolve the utterance it belongs to, gather the
    /// neighboring context, and overwrite the placeholder gloss and
    /// part-of-speech values with the disambiguated pair.
    fn gloss(&self, doc: &mut Document) -> Result<(), GraphError> {
        let gloss_links = linkage::gloss_links(doc)?;
        let translation_links = linkage::transcription_links(doc)?;
        let forest = AnnotationForest::build(doc);
        let mut state = UtteranceState::default();

        for ge_tier in doc.tiers_of_type(LinguisticType::Gloss) {
            let ps_tier = gloss_links.ge_to_ps[&ge_tier];
            let mb_tier = doc
                .tier(ge_tier)
                .parent_name
                .clone()
                .and_then(|name| doc.tier_by_name(&name))
                .ok_or_else(|| GraphError::MissingTier {
                    role: "mb",
                    tier: doc.tier(ge_tier).name.clone(),
                })?;
            let mb_values: Vec<String> = doc
                .tier(mb_tier)
                .annotations
                .iter()
                .map(|a| a.value.clone())
                .collect();
            let mb_position: std::collections::HashMap<AnnotationId, usize> = doc
                .tier(mb_tier)
                .annotations
                .iter()
                .enumerate()
                .map(|(i, a)| (a.id, i))
                .collect();

            let count = doc.tier(ge_tier).annotations.len();
            for i in 0..count {
                let (ge_id, ge_value) = {
                    let annotation = &doc.tier(ge_tier).annotations[i];
                    (annotation.id, annotation.value.clone())
                };
                // bracketed paralinguistic tokens are annotated, never analyzed
                if classify_token(&ge_value) == MorphemeKind::Paralinguistic {
                    continue;
                }
                let ps_value = doc
                    .tier(ps_tier)
                    .annotations
                    .get(i)
                    .map(|a| a.value.clone())
                    .unwrap_or_default();

                let utterance = forest.root_transcription_of(ge_id);
                state.enter(utterance);
                let translation = translation_links
                    .tx_to_fte
                    .get(&utterance)
                    .and_then(|&fte_id| doc.annotation_by_id(fte_id).ok())
                    .map(|a| a.value.to_lowercase())
                    .unwrap_or_default();
                let transcription = doc.annotation_by_id(utterance)?.value.clone();

                let mb_pos = doc
                    .annotation_by_id(ge_id)?
                    .parent()
                    .and_then(|p| mb_position.get(&p))
                    .copied();
                let mb_prev = mb_pos
                    .and_then(|p| p.checked_sub(1))
                    .and_then(|p| mb_values.get(p))
                    .map(String::as_str);
                let mb_next = mb_pos.and_then(|p| mb_values.get(p + 1)).map(String::as_str);
                let ge_prev = if i > 0 {
                    Some(doc.tier(ge_tier).annotations[i - 1].value.clone())
                } else {
                    None
                };
                let ge_next = doc.tier(ge_tier).annotations.get(i + 1).map(|a| a.value.clone());

                let ctx = DisambigContext {
                    translation: &translation,
                    transcription: &transcription,
                    mb_prev,
                    mb_next,
                    ge_prev: ge_prev.as_deref(),
                    ge_next: ge_next.as_deref(),
                };

                let (mut gloss_value, mut pos_value) =
                    if let Some(resolved) = special::resolve(&ge_value, &mut state, &ctx) {
                        resolved
                    } else if let Some(senses) = self.table.lookup(&ge_value) {
                        let sense = choose_sense(senses, &translation, mb_next.unwrap_or(""));
                        (sense.gloss.clone(), sense.pos.clone())
                    } else {
                        // leave-it-for-a-human policy: the morpheme keeps its
                        // own text as gloss and part-of-speech
                        debug!(morpheme = %ge_value, "not in any dictionary, identity fallback");
                        (ge_value.clone(), ps_value.clone())
                    };

                if gloss_value.contains('/') {
                    let (chosen_gloss, chosen_pos) = {
                        let gloss_options: Vec<&str> = gloss_value.split('/').collect();
                        let pos_options: Vec<&str> = pos_value.split('/').collect();
                        let chosen =
                            resolve_slash_senses(&gloss_options, &pos_options, &translation);
                        (
                            gloss_options
                                .get(chosen)
                                .copied()
                                .unwrap_or(gloss_options[0])
                                .to_string(),
                            pos_options
                                .get(chosen)
                                .copied()
                                .unwrap_or(pos_options[0])
                                .to_string(),
                        )
                    };
                    gloss_value = chosen_gloss;
                    pos_value = chosen_pos;
                }

                doc.tier_mut(ge_tier).annotations[i].value = gloss_value;
                if let Some(ps_annotation) = doc.tier_mut(ps_tier).annotations.get_mut(i) {
                    ps_annotation.value = pos_value;
                }
            }
        }
        Ok(())
    }
}

/// Finds or creates the `mb`/`ge`/`ps` tiers for one transcription tier.
/// The gloss and part-of-speech tiers both hang off the morpheme tier.
fn morpheme_tiers(doc: &mut Document, tx_tier: TierId) -> (TierId, TierId, TierId) {
    let tx_name = doc.tier(tx_tier).name.clone();
    let speaker = tx_name
        .strip_prefix("tx")
        .unwrap_or(tx_name.as_str())
        .to_string();
    let mb_name = format!("mb{speaker}");
    let ge_name = format!("ge{speaker}");
    let ps_name = format!("ps{speaker}");
    let mb = match doc.tier_by_name(&mb_name) {
        Some(id) => id,
        None => doc.add_tier(&mb_name, LinguisticType::MorphemeBreak, Some(tx_name.clone())),
    };
    let ge = match doc.tier_by_name(&ge_name) {
        Some(id) => id,
        None => doc.add_tier(&ge_name, LinguisticType::Gloss, Some(mb_name.clone())),
    };
    let ps = match doc.tier_by_name(&ps_name) {
        Some(id) => id,
        None => doc.add_tier(&ps_name, LinguisticType::PartOfSpeech, Some(mb_name)),
    };
    (mb, ge, ps)
}

fn copy_to_orig(doc: &mut Document, orig_tier: TierId, tx_annotation: AnnotationId, value: &str) {
    if let Some(existing) = doc
        .tier_mut(orig_tier)
        .annotations
        .iter_mut()
        .find(|a| a.parent() == Some(tx_annotation))
    {
        existing.value = value.to_string();
        return;
    }
    doc.append_dependent_annotation(orig_tier, value, tx_annotation, None);
}
