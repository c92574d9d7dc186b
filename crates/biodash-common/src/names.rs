//! Species-name normalization
//!
//! Occurrence records and the status taxonomy come from different curators and
//! disagree on case, spacing and accents. Every cross-dataset comparison goes
//! through [`normalize`]: two names denote the same species if and only if
//! their normalized forms are equal.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Canonicalize a free-text species name.
///
/// Decomposes accented characters (NFKD), drops the combining marks, collapses
/// whitespace runs to one space, trims and lower-cases. Blank input yields an
/// empty string, which callers must never treat as a match.
///
/// Case folding runs on both sides of the decomposition: lower-casing `İ`
/// emits a combining dot, and compatibility forms such as `ℌ` decompose to
/// upper-case letters.
pub fn normalize(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    let mut out = String::with_capacity(folded.len());
    for word in folded.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Normalize, returning `None` for names that normalize to nothing.
pub fn match_key(raw: &str) -> Option<String> {
    let key = normalize(raw);
    (!key.is_empty()).then_some(key)
}

/// True when both names normalize to the same non-empty key.
pub fn same_species(a: &str, b: &str) -> bool {
    match (match_key(a), match_key(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
