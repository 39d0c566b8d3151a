//! Classification of ConceptNet path strings.
//!
//! Two grammars are recognised:
//!
//! ```text
//! concept-uri = "/" relation "/" lang "/" token
//! relation    = "a" / "c" / "d" / "e" / "l" / "r" / "s" / "and" / "or"
//! lang        = 2ALPHA
//! token       = 1*( ALPHA / DIGIT / "_" )
//!
//! term-list   = "/list/" lang "/" weighted *( "," weighted )
//! weighted    = token [ "@" number ]
//! number      = [ "+" / "-" ] *DIGIT [ "." ] 1*DIGIT
//! ```
//!
//! Classification uses search semantics: a string is accepted when a match
//! occurs anywhere inside it, so `"see /c/en/toast here"` is a concept URI.
//! Letters and digits are ASCII only.

use std::fmt;
use std::ops::Range;

/// Relation prefixes in the order they are tried.
const RELATIONS: [&[u8]; 9] = [b"a", b"c", b"d", b"e", b"l", b"r", b"s", b"and", b"or"];

/// True if `s` contains a concept URI such as `/c/en/toast`.
pub fn is_concept_uri(s: &str) -> bool {
    find_concept_uri(s).is_some()
}

/// True if `s` contains a term-list path such as `/list/en/toast@0.5,cereal`.
pub fn is_term_list_path(s: &str) -> bool {
    find_term_list_path(s).is_some()
}

/// Byte range of the leftmost concept URI in `s`.
pub fn find_concept_uri(s: &str) -> Option<Range<usize>> {
    let bytes = s.as_bytes();
    (0..bytes.len()).find_map(|start| concept_at(bytes, start).map(|end| start..end))
}

/// Byte range of the leftmost term-list path in `s`, extended as far as the
/// grammar allows.
pub fn find_term_list_path(s: &str) -> Option<Range<usize>> {
    let bytes = s.as_bytes();
    (0..bytes.len()).find_map(|start| term_list_at(bytes, start).map(|end| start..end))
}

fn concept_at(b: &[u8], start: usize) -> Option<usize> {
    let pos = byte(b, start, b'/')?;
    let pos = RELATIONS
        .iter()
        .find_map(|rel| literal(b, pos, rel).and_then(|p| byte(b, p, b'/')))?;
    let pos = language(b, pos)?;
    let pos = byte(b, pos, b'/')?;
    token(b, pos)
}

fn term_list_at(b: &[u8], start: usize) -> Option<usize> {
    let pos = literal(b, start, b"/list/")?;
    let pos = language(b, pos)?;
    let pos = byte(b, pos, b'/')?;
    let mut end = weighted(b, pos)?;
    while let Some(next) = byte(b, end, b',').and_then(|p| weighted(b, p)) {
        end = next;
    }
    Some(end)
}

fn weighted(b: &[u8], pos: usize) -> Option<usize> {
    let end = token(b, pos)?;
    Some(weight(b, end).unwrap_or(end))
}

/// `"@" [+-] digits [. digits]`, preferring a fractional reading when one
/// fits and otherwise falling back to the integer part.
fn weight(b: &[u8], pos: usize) -> Option<usize> {
    let mut p = byte(b, pos, b'@')?;
    if matches!(b.get(p), Some(b'+' | b'-')) {
        p += 1;
    }
    let int_end = digits_end(b, p);
    if let Some(frac) = byte(b, int_end, b'.') {
        let frac_end = digits_end(b, frac);
        if frac_end > frac {
            return Some(frac_end);
        }
    }
    (int_end > p).then_some(int_end)
}

fn byte(b: &[u8], pos: usize, want: u8) -> Option<usize> {
    (b.get(pos) == Some(&want)).then_some(pos + 1)
}

fn literal(b: &[u8], pos: usize, lit: &[u8]) -> Option<usize> {
    b.get(pos..pos + lit.len())
        .filter(|s| *s == lit)
        .map(|_| pos + lit.len())
}

fn language(b: &[u8], pos: usize) -> Option<usize> {
    b.get(pos..pos + 2)
        .filter(|s| s.iter().all(u8::is_ascii_alphabetic))
        .map(|_| pos + 2)
}

fn token(b: &[u8], pos: usize) -> Option<usize> {
    let end = pos + b[pos..].iter().take_while(|&&c| is_word(c)).count();
    (end > pos).then_some(end)
}

fn digits_end(b: &[u8], pos: usize) -> usize {
    pos + b[pos..].iter().take_while(|c| c.is_ascii_digit()).count()
}

fn is_word(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// A term in a `/list/` path with its optional weight.
///
/// Only finite weights survive a [`TermList`] display and parse round trip;
/// `NaN` and infinities are written as `NaN`/`inf`, which the grammar rejects.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: Option<f64>,
}

/// A fully parsed `/list/<lang>/<term>[@w],...` path.
#[derive(Debug, Clone, PartialEq)]
pub struct TermList {
    pub language: String,
    pub terms: Vec<WeightedTerm>,
}

impl TermList {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            terms: Vec::new(),
        }
    }

    /// Append a term, optionally weighted
    pub fn with_term(mut self, term: impl Into<String>, weight: Option<f64>) -> Self {
        self.terms.push(WeightedTerm {
            term: term.into(),
            weight,
        });
        self
    }

    /// Parse a string that is exactly one term-list path.
    ///
    /// Unlike [`is_term_list_path`] this rejects surrounding text.
    pub fn parse(s: &str) -> Option<Self> {
        if find_term_list_path(s)? != (0..s.len()) {
            return None;
        }

        let rest = &s["/list/".len()..];
        let (language, list) = rest.split_at(2);
        let terms = list[1..]
            .split(',')
            .map(|item| match item.split_once('@') {
                Some((term, weight)) => WeightedTerm {
                    term: term.to_string(),
                    weight: weight.parse().ok(),
                },
                None => WeightedTerm {
                    term: item.to_string(),
                    weight: None,
                },
            })
            .collect();

        Some(Self {
            language: language.to_string(),
            terms,
        })
    }
}

impl fmt::Display for TermList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/list/{}/", self.language)?;
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(&t.term)?;
            if let Some(w) = t.weight {
                write!(f, "@{}", w)?;
            }
        }
        Ok(())
    }
}
