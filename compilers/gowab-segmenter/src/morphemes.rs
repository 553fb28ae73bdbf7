use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::multispace0,
    combinator::map,
    sequence::{delimited, preceded},
    IResult,
};

/// How a morpheme attaches to its host, as encoded by the boundary markers
/// of the segmenter output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphemeKind {
    /// Free stem or unsegmented word.
    Stem,
    /// Bound morpheme attached without a phonological break (`-x`).
    Affix,
    /// Morpheme attached across a prosodic boundary (`=x`).
    Clitic,
    /// Bracketed backchannel/filler: annotated, never analyzed (`[x]`).
    Paralinguistic,
}

#[derive(Debug, Clone)]
pub struct Morpheme<'a> {
    pub kind: MorphemeKind,
    /// The marker-stripped form.
    pub text: &'a str,
    /// The token as it appears on the morpheme tier, marker included.
    pub raw: &'a str,
}

fn is_token_char(c: char) -> bool {
    !c.is_whitespace() && c != ']'
}

fn morpheme(input: &str) -> IResult<&str, (MorphemeKind, &str)> {
    alt((
        map(preceded(tag("="), take_while1(is_token_char)), |t| {
            (MorphemeKind::Clitic, t)
        }),
        map(preceded(tag("-"), take_while1(is_token_char)), |t| {
            (MorphemeKind::Affix, t)
        }),
        map(
            delimited(tag("["), take_while1(|c: char| c != ']'), tag("]")),
            |t| (MorphemeKind::Paralinguistic, t),
        ),
        map(take_while1(is_token_char), |t| (MorphemeKind::Stem, t)),
    ))(input)
}

/// Lifts a boundary-marked utterance back into structured morpheme tokens,
/// ready for materialization as morpheme-tier annotations.
pub fn parse_morphemes(original_input: &str) -> Vec<Morpheme<'_>> {
    let mut input = original_input;
    let mut result = Vec::new();

    loop {
        // 1. Skip whitespace
        let (next_input, _) = match multispace0::<&str, nom::error::Error<&str>>(input) {
            Ok(res) => res,
            Err(_) => break,
        };
        input = next_input;

        if input.is_empty() {
            break;
        }

        // 2. Try to match a token
        let parse_res: IResult<&str, (MorphemeKind, &str)> = morpheme(input);
        match parse_res {
            Ok((next_input, (kind, text))) => {
                let len = input.len() - next_input.len();
                let start = input.as_ptr() as usize - original_input.as_ptr() as usize;
                let raw = &original_input[start..start + len];
                result.push(Morpheme { kind, text, raw });
                input = next_input;
            }
            Err(_) => {
                // Skip one char to recover (resilient parsing)
                if let Some(c) = input.chars().next() {
                    input = &input[c.len_utf8()..];
                } else {
                    break;
                }
            }
        }
    }

    result
}

/// Classifies one morpheme-tier value by its marker.
pub fn classify_token(token: &str) -> MorphemeKind {
    parse_morphemes(token)
        .first()
        .map(|m| m.kind)
        .unwrap_or(MorphemeKind::Stem)
}
