//! Keyword normalization.
//!
//! This module defines the linguistic seams the classifier depends on
//! (tokenizer, stemmer, stopword list) and the [`KeywordNormalizer`] that
//! turns raw words, synonym phrases or whole abstracts into a
//! [`NormalizedKeywordSet`]: lowercase stems, stopwords removed, duplicates
//! dropped, sorted ascending.
//!
//! Default English implementations live in [`english`].

pub mod english;

use std::collections::HashSet;

use serde::Serialize;

use crate::sorted_set::{binary_search, merge_sort, sorted};

/// Splits text into word tokens.
pub trait Tokenizer: Send + Sync {
    /// Split `text` into tokens, in reading order.
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Maps an inflected word to its stem.
///
/// Implementations must be deterministic: the same token always yields the
/// same stem.
pub trait Stemmer: Send + Sync {
    fn stem(&self, token: &str) -> String;
}

/// Supplies the fixed stopword list of a language.
pub trait StopwordProvider {
    /// Stopwords in any order; the normalizer sorts them.
    fn stopwords(&self) -> Vec<String>;
}

/// Sorted, duplicate-free sequence of keyword stems.
///
/// The ordering invariant is established at construction, which is what
/// allows [`contains`](Self::contains) to binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedKeywordSet {
    stems: Vec<String>,
}

impl NormalizedKeywordSet {
    /// Build a set from arbitrary stems, deduplicating and sorting them.
    ///
    /// No stemming or stopword filtering happens here; use a
    /// [`KeywordNormalizer`] for raw text.
    pub fn from_stems<I, W>(stems: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<String>,
    {
        let unique: HashSet<String> = stems.into_iter().map(Into::into).collect();
        Self {
            stems: sorted(unique.into_iter().collect()),
        }
    }

    /// Check whether `stem` is in the set.
    pub fn contains(&self, stem: &str) -> bool {
        binary_search(&self.stems, stem).is_some()
    }

    /// Count how many of this set's stems appear in `other`.
    ///
    /// Each stem is looked up in `other` with a binary search, so the cost is
    /// `O(self.len() * log(other.len()))`.
    pub fn count_present_in(&self, other: &NormalizedKeywordSet) -> usize {
        self.stems.iter().filter(|stem| other.contains(stem)).count()
    }

    pub fn len(&self) -> usize {
        self.stems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.stems.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.stems
    }
}

/// Turns raw words into a [`NormalizedKeywordSet`].
///
/// The stopword list is fetched and sorted once, when the normalizer is
/// built; every token lookup afterwards is a binary search against it.
///
/// # Example
/// ```
/// use string_improver::text::english::english_normalizer;
///
/// let normalizer = english_normalizer();
/// let set = normalizer.normalize(["The", "the", "running"]);
/// assert_eq!(set.as_slice(), ["run"]);
/// ```
pub struct KeywordNormalizer<T, S>
where
    T: Tokenizer,
    S: Stemmer,
{
    /// Word splitter for phrases and abstracts
    tokenizer: T,

    /// Suffix stripper applied to surviving tokens
    stemmer: S,

    /// Stopwords, sorted ascending
    stopwords: Vec<String>,
}

impl<T, S> KeywordNormalizer<T, S>
where
    T: Tokenizer,
    S: Stemmer,
{
    /// Create a normalizer from its linguistic collaborators.
    ///
    /// # Arguments
    /// * `tokenizer` - Splits phrases into word tokens
    /// * `stemmer` - Reduces tokens to stems
    /// * `stopwords` - Source of the stopword list (read once)
    pub fn new<P: StopwordProvider + ?Sized>(tokenizer: T, stemmer: S, stopwords: &P) -> Self {
        let mut stopwords: Vec<String> = stopwords
            .stopwords()
            .into_iter()
            .map(|word| word.to_lowercase())
            .collect();
        merge_sort(&mut stopwords);

        Self {
            tokenizer,
            stemmer,
            stopwords,
        }
    }

    /// Whether a lowercase token is a stopword.
    pub fn is_stopword(&self, token: &str) -> bool {
        binary_search(&self.stopwords, token).is_some()
    }

    /// Tokenize text into lowercase word tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenizer
            .tokenize(text)
            .into_iter()
            .map(|token| token.to_lowercase())
            .collect()
    }

    /// Normalize a list of words or multi-word phrases.
    ///
    /// Every phrase is tokenized; tokens found in the stopword list are
    /// dropped, the rest are stemmed, deduplicated and sorted.
    pub fn normalize<I, W>(&self, words: I) -> NormalizedKeywordSet
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        let stems: HashSet<String> = words
            .into_iter()
            .flat_map(|phrase| self.tokenize(phrase.as_ref()))
            .filter(|token| !self.is_stopword(token))
            .map(|token| self.stemmer.stem(&token))
            .collect();

        NormalizedKeywordSet {
            stems: sorted(stems.into_iter().collect()),
        }
    }

    /// Normalize a single free-text string such as an abstract.
    pub fn normalize_text(&self, text: &str) -> NormalizedKeywordSet {
        self.normalize([text])
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Splits on whitespace and strips trailing punctuation.
    pub(crate) struct WhitespaceTokenizer;

    impl Tokenizer for WhitespaceTokenizer {
        fn tokenize(&self, text: &str) -> Vec<String> {
            text.split_whitespace()
                .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
                .filter(|word| !word.is_empty())
                .collect()
        }
    }

    /// Looks stems up in a fixed table and returns unknown words unchanged.
    pub(crate) struct TableStemmer {
        table: HashMap<String, String>,
    }

    impl TableStemmer {
        pub(crate) fn new(pairs: &[(&str, &str)]) -> Self {
            Self {
                table: pairs
                    .iter()
                    .map(|(word, stem)| (word.to_string(), stem.to_string()))
                    .collect(),
            }
        }
    }

    impl Stemmer for TableStemmer {
        fn stem(&self, token: &str) -> String {
            self.table
                .get(token)
                .cloned()
                .unwrap_or_else(|| token.to_string())
        }
    }

    pub(crate) struct FixedStopwords(pub(crate) Vec<&'static str>);

    impl StopwordProvider for FixedStopwords {
        fn stopwords(&self) -> Vec<String> {
            self.0.iter().map(|w| w.to_string()).collect()
        }
    }

    /// Normalizer over the mocks above with a small security vocabulary.
    pub(crate) fn mock_normalizer() -> KeywordNormalizer<WhitespaceTokenizer, TableStemmer> {
        let stemmer = TableStemmer::new(&[
            ("running", "run"),
            ("runs", "run"),
            ("security", "secur"),
            ("secure", "secur"),
            ("privacy", "privaci"),
            ("private", "privat"),
            ("attacks", "attack"),
        ]);
        let stopwords = FixedStopwords(vec!["the", "of", "and", "a", "in", "we", "on"]);
        KeywordNormalizer::new(WhitespaceTokenizer, stemmer, &stopwords)
    }

    #[test]
    fn test_normalize_removes_stopwords_stems_and_dedups() {
        let stemmer = TableStemmer::new(&[("running", "run")]);
        let normalizer =
            KeywordNormalizer::new(WhitespaceTokenizer, stemmer, &FixedStopwords(vec!["the"]));

        let set = normalizer.normalize(["The", "the", "running"]);
        assert_eq!(set.as_slice(), ["run"]);
    }

    #[test]
    fn test_normalize_output_is_sorted_and_unique() {
        let normalizer = mock_normalizer();
        let set = normalizer.normalize(["security", "privacy and secure", "runs", "running", "attacks"]);

        assert_eq!(set.as_slice(), ["attack", "privaci", "run", "secur"]);
        assert!(set.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_normalize_splits_phrases() {
        let normalizer = mock_normalizer();
        let set = normalizer.normalize(["privacy of the running system"]);
        assert_eq!(set.as_slice(), ["privaci", "run", "system"]);
    }

    #[test]
    fn test_stopwords_are_sorted_at_construction() {
        let stopwords = FixedStopwords(vec!["zeta", "alpha", "Mid"]);
        let normalizer = KeywordNormalizer::new(WhitespaceTokenizer, TableStemmer::new(&[]), &stopwords);

        assert!(normalizer.is_stopword("alpha"));
        assert!(normalizer.is_stopword("mid"));
        assert!(normalizer.is_stopword("zeta"));
        assert!(!normalizer.is_stopword("beta"));
    }

    #[test]
    fn test_normalize_empty_input() {
        let normalizer = mock_normalizer();
        assert!(normalizer.normalize(Vec::<String>::new()).is_empty());
        assert!(normalizer.normalize_text("   ").is_empty());
        assert!(normalizer.normalize_text("the of and").is_empty());
    }

    #[test]
    fn test_count_present_in() {
        let keywords = NormalizedKeywordSet::from_stems(["secur", "privaci", "trust"]);
        let abstract_terms = NormalizedKeywordSet::from_stems(["model", "privaci", "secur", "attack"]);

        assert_eq!(keywords.count_present_in(&abstract_terms), 2);
        assert_eq!(keywords.count_present_in(&NormalizedKeywordSet::default()), 0);
    }

    #[test]
    fn test_from_stems_dedups_and_sorts() {
        let set = NormalizedKeywordSet::from_stems(vec!["b", "a", "b", "c", "a"]);
        assert_eq!(set.as_slice(), ["a", "b", "c"]);
        assert_eq!(set.len(), 3);
        assert!(set.contains("c"));
        assert!(!set.contains("d"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
