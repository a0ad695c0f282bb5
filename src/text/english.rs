//! English defaults for the linguistic seams.
//!
//! - [`UnicodeTokenizer`] splits on Unicode word boundaries (UAX #29) via
//!   `unicode-segmentation`, dropping punctuation.
//! - [`SnowballStemmer`] wraps the English Snowball (Porter2) algorithm from
//!   `rust-stemmers`.
//! - [`EnglishStopwords`] is the usual 179-word English stopword list.

use rust_stemmers::{Algorithm, Stemmer as RustStemmer};
use unicode_segmentation::UnicodeSegmentation;

use super::{KeywordNormalizer, Stemmer, StopwordProvider, Tokenizer};

/// English stopwords, unsorted as listed; the normalizer sorts them.
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Tokenizer splitting on Unicode word boundaries.
///
/// Tokens keep their original case; punctuation and whitespace never form
/// tokens. Lowercasing is left to the normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeTokenizer;

impl Tokenizer for UnicodeTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(str::to_string).collect()
    }
}

/// English Snowball stemmer.
pub struct SnowballStemmer {
    inner: RustStemmer,
}

impl SnowballStemmer {
    pub fn new() -> Self {
        Self {
            inner: RustStemmer::create(Algorithm::English),
        }
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, token: &str) -> String {
        self.inner.stem(token).into_owned()
    }
}

impl std::fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowballStemmer")
            .field("algorithm", &"english")
            .finish()
    }
}

/// The fixed English stopword list.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishStopwords;

impl StopwordProvider for EnglishStopwords {
    fn stopwords(&self) -> Vec<String> {
        ENGLISH_STOPWORDS.iter().map(|word| word.to_string()).collect()
    }
}

/// Normalizer wired with the English defaults.
pub type EnglishNormalizer = KeywordNormalizer<UnicodeTokenizer, SnowballStemmer>;

/// Build a normalizer from [`UnicodeTokenizer`], [`SnowballStemmer`] and
/// [`EnglishStopwords`].
pub fn english_normalizer() -> EnglishNormalizer {
    KeywordNormalizer::new(UnicodeTokenizer, SnowballStemmer::new(), &EnglishStopwords)
}
