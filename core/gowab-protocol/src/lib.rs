pub mod dictionary;
pub mod document;
pub mod ids;
pub mod morphology;

// Re-export core types for convenience
pub use dictionary::{Dictionary, DictionaryError, Lemma, RawLemmaRow};
pub use document::{classify, Alignment, Annotation, Document, GraphError, LinguisticType, Tier};
pub use ids::{AnnotationId, TierId};
pub use morphology::*;

#[cfg(test)]
mod tests {
    use super::*;
    use rkyv::{from_bytes, to_bytes};

    #[test]
    fn test_enum_serialization() {
        // Test basic enum round-trip
        let original = Gender::Feminine;

        // Serialize
        let bytes = to_bytes::<_, 256>(&original).expect("Failed to serialize Gender");

        // Deserialize (Simulate loading from disk)
        let deserialized: Gender = from_bytes(&bytes).expect("Failed to deserialize Gender");

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_dictionary_round_trip() {
        let dict = Dictionary {
            version: 1,
            lemmas: vec![Lemma {
                surface: "xam".to_string(),
                gloss: "lion".to_string(),
                pos: "n".to_string(),
                gender: Some(Gender::Masculine),
                source: None,
                other_translations: vec!["big cat".to_string()],
                class: LemmaClass::Lexical,
                misspellings: None,
            }],
        };

        let bytes = to_bytes::<_, 256>(&dict).expect("Failed to serialize Dictionary");
        let deserialized: Dictionary = from_bytes(&bytes).expect("Failed to deserialize Dictionary");

        assert_eq!(deserialized.lemmas.len(), 1);
        assert_eq!(deserialized.lemmas[0].surface, "xam");
        assert_eq!(deserialized.lemmas[0].gender, Some(Gender::Masculine));
    }

    #[test]
    fn test_id_layout() {
        // Verify Zero-Cost abstraction: AnnotationId(u32) should be exactly 4 bytes
        assert_eq!(core::mem::size_of::<AnnotationId>(), 4);
        assert_eq!(core::mem::size_of::<Option<AnnotationId>>(), 8); // u32 + tag (padding)
    }
}
