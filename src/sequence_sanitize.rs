//! Normalization and validation of raw user input into a canonical nucleotide string.
//!
//! Input is often pasted from tab-separated dataset rows where a class label
//! follows the sequence, so only the first whitespace-delimited token is kept.

use thiserror::Error;

/// Minimum accepted sequence length after sanitization.
pub const MIN_SEQUENCE_LENGTH: usize = 3;

/// Longest invalid-character snippet carried in an error, for display.
const MAX_SNIPPET_LEN: usize = 50;

/// A validated nucleotide sequence over {A,C,G,T}, uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence(String);

impl Sequence {
    /// The canonical uppercase sequence text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of bases in the sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reasons a raw input cannot become a [`Sequence`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Nothing remained after stripping non-nucleotide characters.
    #[error("Please enter a DNA sequence")]
    Empty,
    /// The sanitized sequence is shorter than the minimum length.
    #[error("Sequence must be at least {MIN_SEQUENCE_LENGTH} bases long")]
    TooShort,
    /// Characters outside {A,C,G,T} survived sanitization.
    #[error("Sequence contains invalid characters: {snippet}")]
    InvalidCharacters {
        /// First characters of the offending text, truncated for display.
        snippet: String,
    },
}

/// Sanitize raw input and validate it as a nucleotide sequence.
///
/// Takes the first whitespace-delimited token, drops every character outside
/// {A,C,G,T} (either case), uppercases the rest, then checks length. Pure and
/// deterministic.
pub fn clean(raw: &str) -> Result<Sequence, ValidationError> {
    let candidate = raw.split_whitespace().next().unwrap_or("");

    let stripped: String = candidate
        .chars()
        .filter(|c| matches!(c, 'A' | 'C' | 'G' | 'T' | 'a' | 'c' | 'g' | 't'))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if stripped.is_empty() {
        return Err(ValidationError::Empty);
    }
    if stripped.len() < MIN_SEQUENCE_LENGTH {
        return Err(ValidationError::TooShort);
    }
    // Stripping already guarantees the alphabet; re-check so a future edit to
    // the filter cannot silently widen what validates.
    if stripped.chars().any(|c| !matches!(c, 'A' | 'C' | 'G' | 'T')) {
        return Err(ValidationError::InvalidCharacters {
            snippet: stripped.chars().take(MAX_SNIPPET_LEN).collect(),
        });
    }

    Ok(Sequence(stripped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_first_token_of_pasted_dataset_row() {
        let cleaned = clean("atgcgtacg\t1\n").unwrap();
        assert_eq!(cleaned.as_str(), "ATGCGTACG");
    }

    #[test]
    fn strips_non_nucleotide_characters_and_uppercases() {
        let cleaned = clean("a-t_g..c5ga").unwrap();
        assert_eq!(cleaned.as_str(), "ATGCGA");
    }

    #[test]
    fn rejects_input_with_no_nucleotides_as_empty() {
        assert_eq!(clean("123 xyz"), Err(ValidationError::Empty));
        assert_eq!(clean(""), Err(ValidationError::Empty));
        assert_eq!(clean("   \t  "), Err(ValidationError::Empty));
    }

    #[test]
    fn rejects_sequences_shorter_than_three_bases() {
        assert_eq!(clean("at"), Err(ValidationError::TooShort));
        assert_eq!(clean("g"), Err(ValidationError::TooShort));
        assert!(clean("atg").is_ok());
    }

    #[test]
    fn clean_is_idempotent_on_validated_output() {
        let first = clean("atg cgt\t0").unwrap();
        let second = clean(first.as_str()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn mixed_case_input_canonicalizes_to_uppercase() {
        let cleaned = clean("AtGcTa").unwrap();
        assert_eq!(cleaned.as_str(), "ATGCTA");
    }
}
