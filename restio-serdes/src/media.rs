//! Media type pattern parsing, wildcard matching and specificity ordering.
//!
//! A pattern is a `type/subtype` pair where either part may be, or may
//! contain, a `*` wildcard (`*/*`, `application/*+json`, `xml+*`). Matching
//! decides whether a registered pattern accepts a concrete content type;
//! the specificity order decides which of several matching patterns wins.

use std::cmp::Ordering;
use std::fmt;

use crate::error::SerdesError;

/// An immutable `type/subtype` media type pattern with an optional quality
/// factor.
///
/// The factor defaults to 1.0 and only participates in precedence
/// tie-breaking; it is not part of the matching rules.
#[derive(Debug, Clone)]
pub struct MediaTypePattern {
    ttype: String,
    subtype: String,
    factor: f64,
}

impl MediaTypePattern {
    /// Parse a pattern from text, e.g. `application/json`, `*/*` or
    /// `text/html; 0.8`.
    ///
    /// The text is split on its single `/` separator. A `q` parameter
    /// (`; 0.8` or `; q=0.8`) anywhere in the parameter list is read as the
    /// quality factor and must lie in `[0.0, 1.0]`; other parameters (e.g.
    /// `; charset=utf-8`) are ignored. Fails with
    /// [`SerdesError::MalformedMediaType`] when the separator is missing or
    /// either part is empty or invalid.
    pub fn parse(text: &str) -> Result<Self, SerdesError> {
        let (mime, factor) = match text.split_once(';') {
            Some((mime, param)) => (mime.trim(), parse_factor(param, text)?),
            None => (text.trim(), 1.0),
        };

        let (ttype, subtype) = mime
            .split_once('/')
            .ok_or_else(|| SerdesError::MalformedMediaType(text.to_string()))?;

        if ttype.is_empty()
            || subtype.is_empty()
            || subtype.contains('/')
            || ttype.contains(char::is_whitespace)
            || subtype.contains(char::is_whitespace)
        {
            return Err(SerdesError::MalformedMediaType(text.to_string()));
        }

        Ok(Self {
            ttype: ttype.to_string(),
            subtype: subtype.to_string(),
            factor,
        })
    }

    /// The `type` part, possibly containing a wildcard.
    pub fn ttype(&self) -> &str {
        &self.ttype
    }

    /// The `subtype` part, possibly containing a wildcard.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// The quality factor in `[0.0, 1.0]`.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Whether this pattern (the registered candidate) accepts `concrete`.
    ///
    /// Both parts must match, type then subtype:
    /// - a wildcard-bearing candidate part matches when its literal
    ///   fragments appear, in order, in the concrete text (safe direction);
    /// - a wildcard-bearing concrete part matches when *its* literal
    ///   fragments appear, in order, in the candidate text (unsafe
    ///   direction, since the concrete side is itself a pattern);
    /// - otherwise the parts must be exactly equal, case-sensitively.
    pub fn matches(&self, concrete: &MediaTypePattern) -> bool {
        part_matches(&self.ttype, &concrete.ttype) && part_matches(&self.subtype, &concrete.subtype)
    }

    /// Total precedence order: per part, literal patterns sort before
    /// wildcard-bearing ones (literals ascending, wildcards descending so
    /// that partial wildcards like `*+json` outrank a bare `*`), and a
    /// higher factor wins remaining ties.
    pub(crate) fn specificity_cmp(&self, other: &Self) -> Ordering {
        cmp_part(&self.ttype, &other.ttype)
            .then_with(|| cmp_part(&self.subtype, &other.subtype))
            .then_with(|| other.factor.total_cmp(&self.factor))
    }
}

impl PartialEq for MediaTypePattern {
    fn eq(&self, other: &Self) -> bool {
        self.ttype == other.ttype
            && self.subtype == other.subtype
            && self.factor.total_cmp(&other.factor) == Ordering::Equal
    }
}

impl Eq for MediaTypePattern {}

impl fmt::Display for MediaTypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.factor.total_cmp(&1.0) == Ordering::Equal {
            write!(f, "{}/{}", self.ttype, self.subtype)
        } else {
            write!(f, "{}/{}; {}", self.ttype, self.subtype, self.factor)
        }
    }
}

fn parse_factor(params: &str, original: &str) -> Result<f64, SerdesError> {
    for param in params.split(';') {
        let param = param.trim();
        let value = param.strip_prefix("q=").unwrap_or(param);
        match value.parse::<f64>() {
            Ok(factor) if (0.0..=1.0).contains(&factor) => return Ok(factor),
            Ok(_) => return Err(SerdesError::MalformedMediaType(original.to_string())),
            // Not a quality factor (e.g. charset=utf-8); keep scanning.
            Err(_) => {}
        }
    }
    Ok(1.0)
}

fn part_matches(candidate: &str, concrete: &str) -> bool {
    if candidate.contains('*') {
        let cleaned: String = concrete.chars().filter(|c| *c != '*').collect();
        fragment_match(candidate, &cleaned, concrete.ends_with('*'))
    } else if concrete.contains('*') {
        fragment_match(concrete, candidate, false)
    } else {
        candidate == concrete
    }
}

/// Check that every literal fragment of `pattern` (split on `*`) appears in
/// `text`, in order. With `open_tail`, remaining fragments are accepted once
/// `text` is exhausted (the other side ended in a wildcard).
fn fragment_match(pattern: &str, text: &str, open_tail: bool) -> bool {
    let mut pos = 0;
    for frag in pattern.split('*') {
        if open_tail && pos == text.len() {
            break;
        }
        if frag.is_empty() {
            continue;
        }
        match text[pos..].find(frag) {
            Some(idx) => pos += idx + frag.len(),
            None => return false,
        }
    }
    true
}

fn cmp_part(a: &str, b: &str) -> Ordering {
    match (a.contains('*'), b.contains('*')) {
        (false, false) => a.cmp(b),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => b.cmp(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(text: &str) -> MediaTypePattern {
        MediaTypePattern::parse(text).unwrap()
    }

    #[test]
    fn test_parse_simple() {
        let p = pat("application/json");
        assert_eq!(p.ttype(), "application");
        assert_eq!(p.subtype(), "json");
        assert_eq!(p.factor(), 1.0);
    }

    #[test]
    fn test_parse_factor() {
        assert_eq!(pat("text/html; 0.8").factor(), 0.8);
        assert_eq!(pat("text/html; q=0.5").factor(), 0.5);
        // Non-factor parameters are ignored.
        assert_eq!(pat("application/json; charset=utf-8").factor(), 1.0);
        // The factor is found regardless of its position among other
        // parameters.
        assert_eq!(pat("text/html; q=0.8; charset=utf-8").factor(), 0.8);
        assert_eq!(pat("text/html; charset=utf-8; q=0.5").factor(), 0.5);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for text in ["json", "/json", "application/", "app lication/json", "a/b/c", ""] {
            assert!(
                matches!(
                    MediaTypePattern::parse(text),
                    Err(SerdesError::MalformedMediaType(_))
                ),
                "{text:?} should be malformed"
            );
        }
        // Factor out of range.
        assert!(MediaTypePattern::parse("text/html; 1.5").is_err());
    }

    #[test]
    fn test_wildcard_direction_commutativity() {
        assert!(pat("*/json").matches(&pat("application/json")));
        assert!(pat("application/json").matches(&pat("*/json")));
        assert!(!pat("application/xml").matches(&pat("*/json")));
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        assert!(pat("application/json").matches(&pat("application/json")));
        assert!(!pat("application/json").matches(&pat("application/JSON")));
    }

    #[test]
    fn test_full_wildcard_matches_anything() {
        assert!(pat("*/*").matches(&pat("application/json")));
        assert!(pat("*/*").matches(&pat("text/html")));
    }

    #[test]
    fn test_embedded_wildcard_fragments() {
        assert!(pat("application/*+json").matches(&pat("application/svg+json")));
        assert!(!pat("application/*+json").matches(&pat("application/json")));
        assert!(pat("application/xml+*").matches(&pat("application/xml+soap")));
        assert!(!pat("application/xml+*").matches(&pat("application/soap+xml")));
    }

    #[test]
    fn test_wildcard_against_wildcard() {
        // Concrete side ending in a wildcard absorbs the candidate's tail.
        assert!(pat("application/*+json").matches(&pat("application/*")));
        assert!(pat("*/json").matches(&pat("*/json")));
    }

    #[test]
    fn test_specificity_literal_before_wildcard() {
        assert_eq!(
            pat("application/json").specificity_cmp(&pat("*/*")),
            Ordering::Less
        );
        assert_eq!(
            pat("application/json").specificity_cmp(&pat("application/*")),
            Ordering::Less
        );
        assert_eq!(
            pat("*/*").specificity_cmp(&pat("application/json")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_specificity_partial_wildcard_before_full() {
        assert_eq!(
            pat("application/*+json").specificity_cmp(&pat("application/*")),
            Ordering::Less
        );
    }

    #[test]
    fn test_specificity_factor_breaks_ties() {
        assert_eq!(
            pat("text/html; 0.9").specificity_cmp(&pat("text/html; 0.4")),
            Ordering::Less
        );
        assert_eq!(
            pat("text/html; 0.4").specificity_cmp(&pat("text/html; 0.9")),
            Ordering::Greater
        );
        assert_eq!(
            pat("text/html").specificity_cmp(&pat("text/html")),
            Ordering::Equal
        );
    }

    #[test]
    fn test_display_round_trips() {
        assert_eq!(pat("application/json").to_string(), "application/json");
        assert_eq!(pat("text/html; 0.8").to_string(), "text/html; 0.8");
        assert_eq!(pat(&pat("text/html; 0.8").to_string()), pat("text/html; 0.8"));
    }
}
