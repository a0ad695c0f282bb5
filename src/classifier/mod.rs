//! Search string classifier.
//!
//! [`SearchStringClassifier`] is the entry point of the crate. It is built
//! once from a seed bibliography and a keyword configuration, and then
//! evaluates one candidate batch per tuning iteration:
//!
//! 1. Normalize the keyword groups into a single keyword set
//! 2. Build the goal set and its baseline from the seed bibliography
//! 3. For each batch: score and partition the candidates
//! 4. Compute precision/sensitivity and decide whether to accept
//!
//! Evaluation takes `&mut self`; one classifier is one tuning session.

use thiserror::Error;
use tracing::{debug, info};

use crate::evaluation::{AcceptanceTracker, BestState, EvaluationError, Metrics};
use crate::goal::{GoalBaseline, GoalError};
use crate::models::{BibRecord, ClassifierConfig, ConfigError, Evaluation, Paper};
use crate::provider::bibtex::BibtexParser;
use crate::provider::{BibliographyParser, ProviderError};
use crate::scoring::{Partition, RelevanceScorer};
use crate::text::english::{english_normalizer, SnowballStemmer, UnicodeTokenizer};
use crate::text::{KeywordNormalizer, NormalizedKeywordSet, Stemmer, Tokenizer};

/// Errors raised while building or running a classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The configuration has an out-of-range value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The keyword groups normalized to nothing
    #[error("Keyword configuration is empty after normalization")]
    NoKeywords,

    /// The seed bibliography could not be read
    #[error("Goal bibliography error: {0}")]
    Provider(#[from] ProviderError),

    /// The goal set is unusable
    #[error(transparent)]
    Goal(#[from] GoalError),

    /// The batch cannot be evaluated
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Result type for classifier operations.
pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Classifier using the English defaults.
pub type EnglishClassifier = SearchStringClassifier<UnicodeTokenizer, SnowballStemmer>;

/// Scores candidate batches against a goal set and tracks the best
/// configuration across iterations.
pub struct SearchStringClassifier<T, S>
where
    T: Tokenizer,
    S: Stemmer,
{
    /// Normalizer shared by keywords, goal and candidate abstracts
    normalizer: KeywordNormalizer<T, S>,

    /// Synonym groups as configured
    keyword_groups: Vec<Vec<String>>,

    /// All groups normalized into one set
    keywords: NormalizedKeywordSet,

    /// Goal papers and baseline
    goal: GoalBaseline,

    /// Weights and thresholds
    config: ClassifierConfig,

    /// Accepted state across iterations
    tracker: AcceptanceTracker,
}

impl<T, S> SearchStringClassifier<T, S>
where
    T: Tokenizer,
    S: Stemmer,
{
    /// Build a classifier from parsed seed records.
    ///
    /// # Arguments
    /// * `normalizer` - Normalizer for keywords and abstracts
    /// * `records` - Seed bibliography records (the goal set)
    /// * `keyword_groups` - Keyword groups, each a list of synonym phrases
    /// * `config` - Weights and thresholds
    ///
    /// # Errors
    /// Returns `ClassifierError::InvalidConfig` for a bad configuration,
    /// `ClassifierError::NoKeywords` if the groups normalize to nothing, and
    /// `ClassifierError::Goal` if the goal set is empty or has no usable
    /// abstract
    pub fn new(
        normalizer: KeywordNormalizer<T, S>,
        records: &[BibRecord],
        keyword_groups: Vec<Vec<String>>,
        config: ClassifierConfig,
    ) -> ClassifierResult<Self> {
        config.validate()?;

        let keywords = normalizer.normalize(keyword_groups.iter().flatten());
        if keywords.is_empty() {
            return Err(ClassifierError::NoKeywords);
        }
        debug!(keywords = ?keywords.as_slice(), "normalized keyword set");

        let goal = GoalBaseline::build(records, &keywords, &normalizer)?;
        let tracker = AcceptanceTracker::from_config(&config);

        info!(
            "Classifier ready: {} keywords from {} groups, {} goal papers, baseline {:.3}",
            keywords.len(),
            keyword_groups.len(),
            goal.len(),
            goal.mean_keyword_count()
        );

        Ok(Self {
            normalizer,
            keyword_groups,
            keywords,
            goal,
            config,
            tracker,
        })
    }

    /// Build a classifier from raw seed bibliography text.
    ///
    /// # Errors
    /// Returns `ClassifierError::Provider` if the text cannot be parsed, plus
    /// everything [`new`](Self::new) can return
    pub fn from_bibliography<P>(
        normalizer: KeywordNormalizer<T, S>,
        parser: &P,
        raw: &str,
        keyword_groups: Vec<Vec<String>>,
        config: ClassifierConfig,
    ) -> ClassifierResult<Self>
    where
        P: BibliographyParser + ?Sized,
    {
        let records = parser.parse(raw)?;
        Self::new(normalizer, &records, keyword_groups, config)
    }

    /// A scorer borrowing this classifier's state.
    pub fn scorer(&self) -> RelevanceScorer<'_, T, S> {
        RelevanceScorer::new(&self.normalizer, &self.keywords, &self.goal, &self.config)
    }

    /// Score a candidate batch and decide on the configuration behind it.
    ///
    /// # Errors
    /// Returns `ClassifierError::Evaluation` for an empty batch; the accepted
    /// state is not touched in that case
    pub fn evaluate(&mut self, candidates: Vec<Paper>) -> ClassifierResult<Evaluation> {
        if candidates.is_empty() {
            return Err(EvaluationError::EmptyBatch.into());
        }

        let partition = self.scorer().partition(candidates);
        self.evaluate_partition(&partition)
    }

    /// Decide on an already partitioned batch.
    ///
    /// # Errors
    /// Returns `ClassifierError::Evaluation` when the partition is empty
    pub fn evaluate_partition(&mut self, partition: &Partition) -> ClassifierResult<Evaluation> {
        let relevant = partition.relevant_count();
        let non_relevant = partition.non_relevant_count();

        let metrics = Metrics::compute(relevant, non_relevant, self.goal.len())?;
        let decision = self.tracker.record(metrics, relevant, non_relevant);

        Ok(Evaluation {
            accepted: decision.is_accepted(),
            decision,
            precision_temp: metrics.precision,
            sensitivity_temp: metrics.sensitivity,
            relevant_count: relevant,
            non_relevant_count: non_relevant,
        })
    }

    /// Accepted precision, or `None` before the first evaluation.
    pub fn precision(&self) -> Option<f64> {
        self.tracker.best().map(|best| best.precision)
    }

    /// Accepted sensitivity, or `None` before the first evaluation.
    pub fn sensitivity(&self) -> Option<f64> {
        self.tracker.best().map(|best| best.sensitivity)
    }

    /// Precision of the most recent evaluation, accepted or not.
    pub fn precision_temp(&self) -> Option<f64> {
        self.tracker.last_attempt().map(|m| m.precision)
    }

    /// Sensitivity of the most recent evaluation, accepted or not.
    pub fn sensitivity_temp(&self) -> Option<f64> {
        self.tracker.last_attempt().map(|m| m.sensitivity)
    }

    /// Relevant count of the last accepted run.
    pub fn relevant_count(&self) -> Option<usize> {
        self.tracker.best().map(|best| best.relevant_count)
    }

    /// Non-relevant count of the last accepted run.
    pub fn non_relevant_count(&self) -> Option<usize> {
        self.tracker.best().map(|best| best.non_relevant_count)
    }

    pub fn best(&self) -> Option<&BestState> {
        self.tracker.best()
    }

    pub fn evaluations(&self) -> usize {
        self.tracker.evaluations()
    }

    /// The baseline keyword count.
    pub fn baseline(&self) -> f64 {
        self.goal.mean_keyword_count()
    }

    pub fn goal(&self) -> &GoalBaseline {
        &self.goal
    }

    pub fn goal_papers(&self) -> &[Paper] {
        self.goal.papers()
    }

    pub fn keywords(&self) -> &NormalizedKeywordSet {
        &self.keywords
    }

    pub fn keyword_groups(&self) -> &[Vec<String>] {
        &self.keyword_groups
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}

impl EnglishClassifier {
    /// Build a classifier from BibTeX text with the English defaults.
    ///
    /// # Example
    /// ```
    /// use string_improver::classifier::EnglishClassifier;
    /// use string_improver::models::{ClassifierConfig, Paper};
    ///
    /// let seed = r#"@article{s1,
    ///   title = {Smart home security},
    ///   author = {Doe, Jane},
    ///   journal = {Computers and Security},
    ///   abstract = {We analyse security and privacy of smart homes.}
    /// }"#;
    ///
    /// let groups = vec![
    ///     vec!["security".to_string()],
    ///     vec!["privacy".to_string(), "confidentiality".to_string()],
    /// ];
    /// let mut classifier = EnglishClassifier::english(seed, groups, ClassifierConfig::default()).unwrap();
    ///
    /// let batch = vec![Paper::new("t", "Privacy and security of IoT", "Other", "Roe, R.")];
    /// let evaluation = classifier.evaluate(batch).unwrap();
    /// assert!(evaluation.accepted);
    /// assert_eq!(evaluation.relevant_count, 1);
    /// ```
    pub fn english(
        raw_bibtex: &str,
        keyword_groups: Vec<Vec<String>>,
        config: ClassifierConfig,
    ) -> ClassifierResult<Self> {
        Self::from_bibliography(english_normalizer(), &BibtexParser, raw_bibtex, keyword_groups, config)
    }
}
