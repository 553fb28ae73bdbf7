use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use thiserror::Error;

use crate::morphology::{Gender, LemmaClass, SourceLanguage};

#[derive(Debug, Error)]
pub enum DictionaryError {
    /// A row with a missing required field or an invalid enumeration value.
    /// Fatal: the batch cannot run against a malformed dictionary.
    #[error("row {row} of the glossing dictionary is invalid: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// One sense of one surface form. Gloss and part-of-speech travel together in
/// one record; there are no parallel option lists to keep in sync.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Lemma {
    pub surface: String,
    pub gloss: String,
    pub pos: String,
    pub gender: Option<Gender>,
    pub source: Option<SourceLanguage>,
    /// Alternate English renderings used by disambiguation, in row order.
    pub other_translations: Vec<String>,
    pub class: LemmaClass,
    pub misspellings: Option<String>,
}

/// The compiled glossing dictionary: validated rows in original row order.
/// Row order is load-bearing downstream — the first listed sense of a surface
/// form is the fallback choice when no context discriminates.
#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Dictionary {
    pub version: u32,
    pub lemmas: Vec<Lemma>,
}

/// One raw dictionary row as exported from the maintained spreadsheet, before
/// validation. Field names follow the spreadsheet headers.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RawLemmaRow {
    pub mb: Option<String>,
    pub ge: Option<String>,
    pub ps: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "Gender"))]
    pub gender: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "Source"))]
    pub source: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "Other Translations"))]
    pub other_translations: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "Common Misspellings"))]
    pub misspellings: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "Gram/Lex"))]
    pub class: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "Ignore?"))]
    pub ignore: Option<String>,
}

impl RawLemmaRow {
    fn is_empty(&self) -> bool {
        self.mb.as_deref().map_or(true, str::is_empty) && self.ge.as_deref().map_or(true, str::is_empty)
    }
}

/// Validates raw rows into a [`Dictionary`].
///
/// Rows flagged `Ignore? = yes` are dropped, fully empty rows are skipped,
/// and the first defective row aborts the load. Reported row numbers are
/// 1-based and offset by the header row, matching the source spreadsheet.
pub fn validate_rows(rows: &[RawLemmaRow]) -> Result<Dictionary, DictionaryError> {
    let mut lemmas = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let row_no = i + 2; // row 1 is the header
        if row.ignore.as_deref() == Some("yes") {
            continue;
        }
        if row.is_empty() {
            continue;
        }
        let invalid = |reason: &str| DictionaryError::InvalidRow {
            row: row_no,
            reason: reason.to_string(),
        };
        let surface = row
            .mb
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("missing surface form"))?;
        let gloss = row
            .ge
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("missing gloss"))?;
        let pos = row
            .ps
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("missing part-of-speech"))?;
        let class = row
            .class
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("missing Gram/Lex classification"))
            .and_then(|c| LemmaClass::from_code(c).ok_or_else(|| invalid("Gram/Lex must be G or L")))?;
        let gender = match row.gender.as_deref().filter(|s| !s.is_empty()) {
            Some(code) => {
                Some(Gender::from_code(code).ok_or_else(|| invalid("gender must be m, f or c"))?)
            }
            None => None,
        };
        let source = match row.source.as_deref().filter(|s| !s.is_empty()) {
            Some(code) => Some(
                SourceLanguage::from_code(code)
                    .ok_or_else(|| invalid("source must be Afrikaans or English"))?,
            ),
            None => None,
        };
        lemmas.push(Lemma {
            surface: surface.to_string(),
            gloss: gloss.to_string(),
            pos: pos.to_string(),
            gender,
            source,
            other_translations: parse_other_translations(
                row.other_translations.as_deref().unwrap_or(""),
            ),
            class,
            misspellings: row.misspellings.clone().filter(|s| !s.is_empty()),
        });
    }
    Ok(Dictionary { version: 1, lemmas })
}

/// Splits the free-form "Other Translations" cell into clean alternates:
/// parenthesized asides are removed, the rest is split on commas/semicolons.
pub fn parse_other_translations(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    let mut stripped = String::with_capacity(cell.len());
    let mut depth = 0usize;
    for c in cell.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => stripped.push(c),
            _ => {}
        }
    }
    stripped
        .split([',', ';'])
        .map(|item| item.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(mb: &str, ge: &str, ps: &str, class: &str) -> RawLemmaRow {
        RawLemmaRow {
            mb: Some(mb.to_string()),
            ge: Some(ge.to_string()),
            ps: Some(ps.to_string()),
            class: Some(class.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_rows_keep_order() {
        let rows = vec![row("xa", "about", "postp", "G"), row("xam", "lion", "n", "L")];
        let dict = validate_rows(&rows).unwrap();
        assert_eq!(dict.lemmas.len(), 2);
        assert_eq!(dict.lemmas[0].surface, "xa");
        assert_eq!(dict.lemmas[0].class, LemmaClass::Grammatical);
        assert_eq!(dict.lemmas[1].class, LemmaClass::Lexical);
    }

    #[test]
    fn test_ignored_and_empty_rows_are_skipped() {
        let mut ignored = row("xa", "about", "postp", "G");
        ignored.ignore = Some("yes".to_string());
        let rows = vec![ignored, RawLemmaRow::default(), row("xam", "lion", "n", "L")];
        let dict = validate_rows(&rows).unwrap();
        assert_eq!(dict.lemmas.len(), 1);
        assert_eq!(dict.lemmas[0].surface, "xam");
    }

    #[test]
    fn test_invalid_gender_fails_with_row_number() {
        let mut bad = row("xam", "lion", "n", "L");
        bad.gender = Some("x".to_string());
        let rows = vec![row("xa", "about", "postp", "G"), bad];
        match validate_rows(&rows) {
            Err(DictionaryError::InvalidRow { row, .. }) => assert_eq!(row, 3),
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_class_is_fatal() {
        let mut bad = row("xam", "lion", "n", "L");
        bad.class = None;
        assert!(validate_rows(&[bad]).is_err());
    }

    #[test]
    fn test_other_translations_parsing() {
        let alts = parse_other_translations("big cat (Panthera leo), predator; beast");
        assert_eq!(alts, vec!["big cat", "predator", "beast"]);
        assert!(parse_other_translations("").is_empty());
    }
}
