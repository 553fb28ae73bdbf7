//! The morpheme segmentation engine: a rule-ordered lexical analyzer that
//! decides, word by word, where morpheme boundaries fall and whether they
//! are affixal (`-`) or clitic (`=`) attachments.

pub mod breaker;
pub mod config;
pub mod morphemes;

pub use breaker::MorphemeBreaker;
pub use config::SegmenterConfig;
pub use morphemes::{classify_token, parse_morphemes, Morpheme, MorphemeKind};
