//! The gloss disambiguation engine and pipeline orchestrator: resolves each
//! morpheme to one (gloss, part-of-speech) pair using hand-curated special
//! cases, dictionary lookup with contextual sense selection, and an identity
//! fallback that leaves unknown morphemes for a human annotator.

pub mod disambig;
pub mod lexicon;
pub mod linkage;
pub mod pipeline;
pub mod special;

pub use disambig::{choose_sense, resolve_slash_senses};
pub use lexicon::SenseTable;
pub use linkage::AnnotationForest;
pub use pipeline::{LanguageDetector, NoDetection, Pipeline};
pub use special::{DisambigContext, UtteranceState};
