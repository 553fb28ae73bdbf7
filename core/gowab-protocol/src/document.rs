use crate::ids::{AnnotationId, TierId};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    /// A reference identifier pointing at no annotation. Well-formed documents
    /// never produce this; when it happens the document is abandoned.
    #[error("annotation {0:?} is referenced but not present in the document")]
    AnnotationNotFound(AnnotationId),

    /// Transcription, orthography and translation tier counts disagree.
    /// Recoverable: the document is skipped, the batch continues.
    #[error("tier counts out of balance: {tx} transcription, {orig} orthography, {fte} translation")]
    TierMismatch { tx: usize, orig: usize, fte: usize },

    /// A tier role required by linkage derivation is absent.
    #[error("no {role} tier found for tier '{tier}'")]
    MissingTier { role: &'static str, tier: String },
}

/// Declared linguistic type of a tier, as carried by the input document.
/// Classification additionally sniffs tier names, see [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LinguisticType {
    #[cfg_attr(feature = "serde", serde(rename = "tx"))]
    Transcription,
    #[cfg_attr(feature = "serde", serde(rename = "fte"))]
    FreeTranslation,
    #[cfg_attr(feature = "serde", serde(rename = "orig"))]
    Orthography,
    #[cfg_attr(feature = "serde", serde(rename = "mb"))]
    MorphemeBreak,
    #[cfg_attr(feature = "serde", serde(rename = "ge"))]
    Gloss,
    #[cfg_attr(feature = "serde", serde(rename = "ps"))]
    PartOfSpeech,
    Other,
}

/// How an annotation is anchored: directly to the media timeline (only
/// transcription tiers), or to a parent annotation, optionally chained after
/// a sibling to establish morpheme order under one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum Alignment {
    Time {
        start_ms: u64,
        end_ms: u64,
    },
    Reference {
        parent: AnnotationId,
        previous: Option<AnnotationId>,
    },
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Annotation {
    pub id: AnnotationId,
    pub value: String,
    pub alignment: Alignment,
}

impl Annotation {
    /// Parent annotation id for reference-aligned annotations.
    pub fn parent(&self) -> Option<AnnotationId> {
        match self.alignment {
            Alignment::Reference { parent, .. } => Some(parent),
            Alignment::Time { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Tier {
    pub name: String,
    pub declared_type: LinguisticType,
    /// Name of the tier whose annotations this tier's annotations depend on.
    pub parent_name: Option<String>,
    pub annotations: Vec<Annotation>,
}

/// Effective linguistic type of a tier.
///
/// Translation and gloss tiers are recognized by name containment rather than
/// declared type, because the declared type is not reliably set on those
/// tiers in field recordings. The sniffing is deliberate and kept behind this
/// one function so it can be replaced wholesale if the input format tightens.
pub fn classify(tier: &Tier) -> LinguisticType {
    if tier.declared_type == LinguisticType::Transcription {
        LinguisticType::Transcription
    } else if tier.name.contains("fte") {
        LinguisticType::FreeTranslation
    } else if tier.declared_type == LinguisticType::Orthography {
        LinguisticType::Orthography
    } else if tier.name.contains("ge") {
        LinguisticType::Gloss
    } else if tier.declared_type == LinguisticType::PartOfSpeech {
        LinguisticType::PartOfSpeech
    } else {
        tier.declared_type
    }
}

/// One interlinear document: an ordered collection of tiers whose annotations
/// cross-reference each other by id, forming one forest per speaker rooted at
/// the time-aligned transcription tier.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Document {
    pub tiers: Vec<Tier>,
}

impl Document {
    /// Handles of all tiers classifying as `ltype`, in document order.
    pub fn tiers_of_type(&self, ltype: LinguisticType) -> Vec<TierId> {
        self.tiers
            .iter()
            .enumerate()
            .filter(|(_, t)| classify(t) == ltype)
            .map(|(i, _)| TierId::new(i as u32))
            .collect()
    }

    pub fn tier(&self, id: TierId) -> &Tier {
        &self.tiers[id.0 as usize]
    }

    pub fn tier_mut(&mut self, id: TierId) -> &mut Tier {
        &mut self.tiers[id.0 as usize]
    }

    pub fn tier_by_name(&self, name: &str) -> Option<TierId> {
        self.tiers
            .iter()
            .position(|t| t.name == name)
            .map(|i| TierId::new(i as u32))
    }

    pub fn annotation_by_id(&self, id: AnnotationId) -> Result<&Annotation, GraphError> {
        self.tiers
            .iter()
            .flat_map(|t| t.annotations.iter())
            .find(|a| a.id == id)
            .ok_or(GraphError::AnnotationNotFound(id))
    }

    pub fn annotation_by_id_mut(&mut self, id: AnnotationId) -> Result<&mut Annotation, GraphError> {
        self.tiers
            .iter_mut()
            .flat_map(|t| t.annotations.iter_mut())
            .find(|a| a.id == id)
            .ok_or(GraphError::AnnotationNotFound(id))
    }

    /// Next free identifier: one past the current in-document maximum.
    pub fn next_annotation_id(&self) -> AnnotationId {
        let max = self
            .tiers
            .iter()
            .flat_map(|t| t.annotations.iter())
            .map(|a| a.id.0)
            .max()
            .unwrap_or(0);
        AnnotationId::new(max + 1)
    }

    /// Appends a tier at the end of the tier order and returns its handle.
    pub fn add_tier(
        &mut self,
        name: &str,
        declared_type: LinguisticType,
        parent_name: Option<String>,
    ) -> TierId {
        self.tiers.push(Tier {
            name: name.to_string(),
            declared_type,
            parent_name,
            annotations: Vec::new(),
        });
        TierId::new((self.tiers.len() - 1) as u32)
    }

    /// Creates a reference-aligned annotation under `parent_annotation`,
    /// optionally chained after `previous` to keep morpheme order, and
    /// appends it to `tier`. Returns the freshly allocated id.
    pub fn append_dependent_annotation(
        &mut self,
        tier: TierId,
        value: &str,
        parent_annotation: AnnotationId,
        previous: Option<AnnotationId>,
    ) -> AnnotationId {
        let id = self.next_annotation_id();
        self.tier_mut(tier).annotations.push(Annotation {
            id,
            value: value.to_string(),
            alignment: Alignment::Reference {
                parent: parent_annotation,
                previous,
            },
        });
        id
    }

    /// Structural precondition checked once per document before any mutation:
    /// every speaker contributes one transcription, one orthography and one
    /// translation tier, so the three counts must agree.
    pub fn check_tier_balance(&self) -> Result<(), GraphError> {
        let tx = self.tiers_of_type(LinguisticType::Transcription).len();
        let orig = self.tiers_of_type(LinguisticType::Orthography).len();
        let fte = self.tiers_of_type(LinguisticType::FreeTranslation).len();
        if tx != orig || tx != fte {
            return Err(GraphError::TierMismatch { tx, orig, fte });
        }
        Ok(())
    }
}
