use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use gowab_protocol::{AnnotationId, Document, GraphError, LinguisticType, TierId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Child annotation to the annotation it is aligned under.
    Parent,
    /// Sibling chain establishing morpheme order under one parent.
    NextSibling,
}

/// The reference structure of a document as a graph: one node per
/// annotation, edges for parent alignment and sibling order. Rebuilt
/// whenever tiers are added; tier structure never changes afterwards.
pub struct AnnotationForest {
    graph: Graph<AnnotationId, Link, Directed>,
    index_map: HashMap<AnnotationId, NodeIndex>,
}

impl AnnotationForest {
    pub fn build(doc: &Document) -> Self {
        let mut forest = Self {
            graph: Graph::new(),
            index_map: HashMap::new(),
        };
        for tier in &doc.tiers {
            for annotation in &tier.annotations {
                forest.node(annotation.id);
            }
        }
        for tier in &doc.tiers {
            for annotation in &tier.annotations {
                if let gowab_protocol::Alignment::Reference { parent, previous } =
                    annotation.alignment
                {
                    let child = forest.node(annotation.id);
                    let parent_idx = forest.node(parent);
                    forest.graph.add_edge(child, parent_idx, Link::Parent);
                    if let Some(previous) = previous {
                        let prev_idx = forest.node(previous);
                        forest.graph.add_edge(prev_idx, child, Link::NextSibling);
                    }
                }
            }
        }
        forest
    }

    fn node(&mut self, id: AnnotationId) -> NodeIndex {
        if let Some(&idx) = self.index_map.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id);
        self.index_map.insert(id, idx);
        idx
    }

    pub fn parent_of(&self, id: AnnotationId) -> Option<AnnotationId> {
        let idx = *self.index_map.get(&id)?;
        self.graph
            .edges(idx)
            .find(|e| *e.weight() == Link::Parent)
            .map(|e| self.graph[e.target()])
    }

    /// All annotations aligned directly under `id`, across all tiers.
    pub fn children_of(&self, id: AnnotationId) -> Vec<AnnotationId> {
        let Some(&idx) = self.index_map.get(&id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| *e.weight() == Link::Parent)
            .map(|e| self.graph[e.source()])
            .collect()
    }

    /// Walks the parent chain up to the time-aligned root: for a gloss
    /// annotation this is gloss -> morpheme -> transcription. The walk keeps
    /// a visited list so a malformed cyclic document terminates.
    pub fn root_transcription_of(&self, id: AnnotationId) -> AnnotationId {
        let mut current = id;
        let mut visited = vec![current];
        while let Some(parent) = self.parent_of(current) {
            if visited.contains(&parent) {
                break;
            }
            visited.push(parent);
            current = parent;
        }
        current
    }
}

/// Annotation- and tier-level links needed by the preprocessing pass.
pub struct TranscriptionLinks {
    /// Transcription annotation to its free-translation annotation.
    pub tx_to_fte: HashMap<AnnotationId, AnnotationId>,
    /// Transcription tier to the orthography tier hanging off it.
    pub tx_to_orig: HashMap<TierId, TierId>,
}

pub fn transcription_links(doc: &Document) -> Result<TranscriptionLinks, GraphError> {
    let mut tx_to_fte = HashMap::new();
    for fte_tier in doc.tiers_of_type(LinguisticType::FreeTranslation) {
        for annotation in &doc.tier(fte_tier).annotations {
            if let Some(parent) = annotation.parent() {
                tx_to_fte.insert(parent, annotation.id);
            }
        }
    }
    let orig_tiers = doc.tiers_of_type(LinguisticType::Orthography);
    let mut tx_to_orig = HashMap::new();
    for tx_tier in doc.tiers_of_type(LinguisticType::Transcription) {
        let tx_name = &doc.tier(tx_tier).name;
        let orig = orig_tiers
            .iter()
            .find(|&&o| doc.tier(o).parent_name.as_deref() == Some(tx_name.as_str()))
            .copied()
            .ok_or_else(|| GraphError::MissingTier {
                role: "orig",
                tier: tx_name.clone(),
            })?;
        tx_to_orig.insert(tx_tier, orig);
    }
    Ok(TranscriptionLinks { tx_to_fte, tx_to_orig })
}

/// Tier-level links needed by the glossing pass. Derived only after
/// segmentation has added the morpheme-level tiers.
pub struct GlossLinks {
    /// Gloss tier to the part-of-speech tier sharing its parent.
    pub ge_to_ps: HashMap<TierId, TierId>,
    /// Morpheme tier to the gloss tier hanging off it.
    pub mb_to_ge: HashMap<TierId, TierId>,
}

pub fn gloss_links(doc: &Document) -> Result<GlossLinks, GraphError> {
    let ps_tiers = doc.tiers_of_type(LinguisticType::PartOfSpeech);
    let ge_tiers = doc.tiers_of_type(LinguisticType::Gloss);
    let mut ge_to_ps = HashMap::new();
    for &ge_tier in &ge_tiers {
        let ge_parent = doc.tier(ge_tier).parent_name.clone();
        // gloss and part-of-speech tiers hang off the same morpheme tier
        let ps = ps_tiers
            .iter()
            .find(|&&p| doc.tier(p).parent_name == ge_parent)
            .copied()
            .ok_or_else(|| GraphError::MissingTier {
                role: "ps",
                tier: doc.tier(ge_tier).name.clone(),
            })?;
        ge_to_ps.insert(ge_tier, ps);
    }
    let mut mb_to_ge = HashMap::new();
    for mb_tier in doc.tiers_of_type(LinguisticType::MorphemeBreak) {
        let mb_name = &doc.tier(mb_tier).name;
        let ge = ge_tiers
            .iter()
            .find(|&&g| doc.tier(g).parent_name.as_deref() == Some(mb_name.as_str()))
            .copied()
            .ok_or_else(|| GraphError::MissingTier {
                role: "ge",
                tier: mb_name.clone(),
            })?;
        mb_to_ge.insert(mb_tier, ge);
    }
    Ok(GlossLinks { ge_to_ps, mb_to_ge })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gowab_protocol::{Alignment, Annotation};

    fn doc_with_chain() -> Document {
        let mut doc = Document::default();
        let tx = doc.add_tier("tx@A", LinguisticType::Transcription, None);
        doc.tier_mut(tx).annotations.push(Annotation {
            id: AnnotationId::new(1),
            value: "sao =khom ge".to_string(),
            alignment: Alignment::Time { start_ms: 0, end_ms: 1000 },
        });
        let mb = doc.add_tier("mb@A", LinguisticType::MorphemeBreak, Some("tx@A".to_string()));
        let first = doc.append_dependent_annotation(mb, "sao", AnnotationId::new(1), None);
        let second = doc.append_dependent_annotation(mb, "=khom", AnnotationId::new(1), Some(first));
        let ge = doc.add_tier("ge@A", LinguisticType::Gloss, Some("mb@A".to_string()));
        doc.append_dependent_annotation(ge, "sao", first, None);
        doc.append_dependent_annotation(ge, "=khom", second, None);
        doc
    }

    #[test]
    fn test_forest_parent_chain() {
        let doc = doc_with_chain();
        let forest = AnnotationForest::build(&doc);
        // ge "sao" -> mb "sao" -> tx utterance
        let ge_sao = doc.tier(TierId::new(2)).annotations[0].id;
        assert_eq!(forest.root_transcription_of(ge_sao), AnnotationId::new(1));
        let mb_sao = doc.tier(TierId::new(1)).annotations[0].id;
        assert_eq!(forest.parent_of(ge_sao), Some(mb_sao));
        assert_eq!(forest.parent_of(AnnotationId::new(1)), None);
    }

    #[test]
    fn test_forest_children() {
        let doc = doc_with_chain();
        let forest = AnnotationForest::build(&doc);
        let children = forest.children_of(AnnotationId::new(1));
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_gloss_links_require_ps_tier() {
        let doc = doc_with_chain();
        match gloss_links(&doc) {
            Err(GraphError::MissingTier { role, .. }) => assert_eq!(role, "ps"),
            other => panic!("expected MissingTier, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_gloss_links_complete() {
        let mut doc = doc_with_chain();
        doc.add_tier("ps@A", LinguisticType::PartOfSpeech, Some("mb@A".to_string()));
        let links = gloss_links(&doc).unwrap();
        assert_eq!(links.ge_to_ps.len(), 1);
        assert_eq!(links.mb_to_ge.len(), 1);
    }

    #[test]
    fn test_transcription_links_require_orig_tier() {
        let doc = doc_with_chain();
        match transcription_links(&doc) {
            Err(GraphError::MissingTier { role, .. }) => assert_eq!(role, "orig"),
            other => panic!("expected MissingTier, got {:?}", other.map(|_| ())),
        }
    }
}
