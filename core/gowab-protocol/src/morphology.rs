use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use bitflags::bitflags;

/// The four Khoekhoe click letters. A click is never morpheme-final before a
/// suffix boundary, which several segmentation rules rely on.
pub const CLICKS: [char; 4] = ['ǃ', 'ǂ', 'ǁ', 'ǀ'];

/// Marker prefixed to a bound morpheme that attaches without a phonological break.
pub const AFFIX_MARKER: &str = "-";
/// Marker prefixed to a morpheme that attaches across a prosodic boundary.
pub const CLITIC_MARKER: &str = "=";

pub fn is_click(c: char) -> bool {
    CLICKS.contains(&c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum Gender {
    Masculine = 0,
    Feminine = 1,
    Common = 2,
}

impl Gender {
    /// Parses the single-letter gender code used in dictionary rows.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(Gender::Masculine),
            "f" => Some(Gender::Feminine),
            "c" => Some(Gender::Common),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum SourceLanguage {
    Afrikaans = 0,
    English = 1,
}

impl SourceLanguage {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Afrikaans" => Some(SourceLanguage::Afrikaans),
            "English" => Some(SourceLanguage::English),
            _ => None,
        }
    }
}

/// Grammatical items carry functional glosses (PGN markers, particles);
/// lexical items carry content glosses. The glosser consults the
/// grammatical table before the lexical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum LemmaClass {
    Grammatical = 0,
    Lexical = 1,
}

impl LemmaClass {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "G" => Some(LemmaClass::Grammatical),
            "L" => Some(LemmaClass::Lexical),
            _ => None,
        }
    }
}

bitflags! {
    /// Class of the morpheme following a candidate sense. A suffix form can
    /// belong to both classes at once (`-gu` marks 3M.PL on nominals and
    /// reciprocal on verbs), hence flags rather than an enum.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct SuffixClass: u8 {
        const NOMINAL = 1;
        const VERBAL = 2;
    }
}

/// Person/number/gender suffixes that select a nominal reading of the host.
/// `-gu` is listed under both tables below.
pub const NOMINAL_SUFFIXES: &[&str] = &[
    "-b", "-s", "-da", "-di", "-du", "-ge", "-go", "-hâ", "-i", "-in", "-n", "-kha", "-kho",
    "-khom", "-m", "-ra", "-se", "-so", "-ta", "-ts", "-gu",
];

/// Valency-operator suffixes that select a verbal reading of the host.
pub const VERBAL_SUFFIXES: &[&str] = &["-sen", "-ba", "-he", "-gu"];

/// Verbal part-of-speech tags as they appear in the glossing dictionary.
pub const VERBAL_POS: &[&str] = &["v.tr.act", "v.intr.act", "v.ditr.act", "v.tr.st", "v.intr.st"];

/// First-person clitics as they appear on the morpheme tier after segmentation.
pub const FIRST_PERSON_CLITICS: &[&str] = &["=ta", "=khom", "=m", "=ge", "=se", "=da"];

/// First-person PGN suffixes (affix-marked).
pub const FIRST_PERSON_PGNS: &[&str] = &["-khom", "-m", "-ge", "-se", "-da"];

/// Second-person PGN suffixes (affix-marked).
pub const SECOND_PERSON_PGNS: &[&str] = &["-ts", "-s", "-kho", "-ro", "-go", "-so", "-du"];

/// Classifies a morpheme-tier value as nominal and/or verbal context.
/// Unknown forms (and the empty string, for utterance-final morphemes)
/// classify as neither.
pub fn suffix_class(morpheme: &str) -> SuffixClass {
    let mut class = SuffixClass::empty();
    if NOMINAL_SUFFIXES.contains(&morpheme) {
        class |= SuffixClass::NOMINAL;
    }
    if VERBAL_SUFFIXES.contains(&morpheme) {
        class |= SuffixClass::VERBAL;
    }
    class
}

pub fn is_verbal_pos(pos: &str) -> bool {
    VERBAL_POS.contains(&pos)
}
