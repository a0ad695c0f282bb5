//! Relevance scoring of candidate papers.
//!
//! A candidate's score has two independent parts:
//!
//! 1. **Abstract match**: the abstract is normalized and the configured
//!    keywords are looked up in it. If the hit count reaches the goal
//!    baseline the paper earns the abstract weight (0.5 by default).
//! 2. **Journal/author match**: the candidate is compared with *every* goal
//!    paper. Each goal paper with exactly the same author string adds the
//!    author weight, each one with exactly the same journal adds the journal
//!    weight (0.25 each by default). The sum is not capped, so a paper from a
//!    venue that dominates the goal set can score well above 1.0.
//!
//! A paper is relevant when its total reaches the relevance threshold (0.5).
//!
//! # Usage
//!
//! ```
//! use string_improver::goal::GoalBaseline;
//! use string_improver::models::{BibRecord, ClassifierConfig, Paper};
//! use string_improver::scoring::RelevanceScorer;
//! use string_improver::text::english::english_normalizer;
//!
//! let normalizer = english_normalizer();
//! let keywords = normalizer.normalize(["privacy"]);
//! let mut seed = BibRecord::new("seed");
//! seed.abstract_text = Some("Location privacy.".to_string());
//! let goal = GoalBaseline::build(&[seed], &keywords, &normalizer).unwrap();
//! let config = ClassifierConfig::default();
//!
//! let scorer = RelevanceScorer::new(&normalizer, &keywords, &goal, &config);
//! let paper = Paper::new("T", "Differential privacy for trajectories", "J", "A");
//! assert!(scorer.classify(&paper).is_relevant());
//! ```

use serde::Serialize;

use crate::goal::{count_keyword_hits, GoalBaseline};
use crate::models::{ClassifierConfig, Paper, Relevance};
use crate::text::{KeywordNormalizer, NormalizedKeywordSet, Stemmer, Tokenizer};

/// Per-part score of one paper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Configured keywords found in the abstract
    pub keyword_hits: usize,

    /// Contribution of the abstract match (0 or the abstract weight)
    pub abstract_score: f64,

    /// Goal papers with identical authors
    pub author_matches: usize,

    /// Goal papers with an identical journal
    pub journal_matches: usize,

    /// Contribution of the journal/author matches
    pub venue_score: f64,
}

impl ScoreBreakdown {
    /// Sum of both parts.
    pub fn total(&self) -> f64 {
        self.abstract_score + self.venue_score
    }
}

/// Candidate batch split by relevance, each side in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub relevant: Vec<Paper>,
    pub non_relevant: Vec<Paper>,
}

impl Partition {
    pub fn relevant_count(&self) -> usize {
        self.relevant.len()
    }

    pub fn non_relevant_count(&self) -> usize {
        self.non_relevant.len()
    }

    /// Size of the whole batch.
    pub fn total(&self) -> usize {
        self.relevant.len() + self.non_relevant.len()
    }

    /// Add a paper to the side named by `relevance`.
    pub fn push(&mut self, paper: Paper, relevance: Relevance) {
        match relevance {
            Relevance::Relevant => self.relevant.push(paper),
            Relevance::NonRelevant => self.non_relevant.push(paper),
        }
    }
}

/// Scores candidates against a goal set.
///
/// The scorer borrows everything it needs and never mutates it, so any number
/// of scorers can be created over the same classifier state.
pub struct RelevanceScorer<'a, T, S>
where
    T: Tokenizer,
    S: Stemmer,
{
    normalizer: &'a KeywordNormalizer<T, S>,
    keywords: &'a NormalizedKeywordSet,
    goal: &'a GoalBaseline,
    config: &'a ClassifierConfig,
}

impl<'a, T, S> RelevanceScorer<'a, T, S>
where
    T: Tokenizer,
    S: Stemmer,
{
    /// Create a scorer.
    ///
    /// # Arguments
    /// * `normalizer` - Normalizer applied to candidate abstracts
    /// * `keywords` - Normalized keywords of the current configuration
    /// * `goal` - Goal set and baseline
    /// * `config` - Weights and relevance threshold
    pub fn new(
        normalizer: &'a KeywordNormalizer<T, S>,
        keywords: &'a NormalizedKeywordSet,
        goal: &'a GoalBaseline,
        config: &'a ClassifierConfig,
    ) -> Self {
        Self {
            normalizer,
            keywords,
            goal,
            config,
        }
    }

    /// Number of configured keywords present in the paper's abstract.
    pub fn keyword_hits(&self, paper: &Paper) -> usize {
        let terms = self.normalizer.normalize_text(&paper.abstract_text);
        count_keyword_hits(self.keywords, &terms)
    }

    /// Abstract part of the score.
    pub fn abstract_score(&self, paper: &Paper) -> f64 {
        self.abstract_weight(self.keyword_hits(paper))
    }

    /// Journal/author part of the score, summed over every goal paper.
    pub fn venue_score(&self, paper: &Paper) -> f64 {
        let (authors, journals) = self.venue_matches(paper);
        self.venue_weight(authors, journals)
    }

    fn abstract_weight(&self, keyword_hits: usize) -> f64 {
        if keyword_hits as f64 >= self.goal.mean_keyword_count() {
            self.config.abstract_match_weight
        } else {
            0.0
        }
    }

    fn venue_weight(&self, author_matches: usize, journal_matches: usize) -> f64 {
        author_matches as f64 * self.config.author_match_weight
            + journal_matches as f64 * self.config.journal_match_weight
    }

    fn venue_matches(&self, paper: &Paper) -> (usize, usize) {
        self.goal
            .papers()
            .iter()
            .fold((0, 0), |(authors, journals), goal| {
                (
                    authors + usize::from(goal.authors == paper.authors),
                    journals + usize::from(goal.journal == paper.journal),
                )
            })
    }

    /// Full breakdown of a paper's score.
    pub fn score_breakdown(&self, paper: &Paper) -> ScoreBreakdown {
        let keyword_hits = self.keyword_hits(paper);
        let (author_matches, journal_matches) = self.venue_matches(paper);

        ScoreBreakdown {
            keyword_hits,
            abstract_score: self.abstract_weight(keyword_hits),
            author_matches,
            journal_matches,
            venue_score: self.venue_weight(author_matches, journal_matches),
        }
    }

    /// Total relevance score of a paper.
    pub fn score(&self, paper: &Paper) -> f64 {
        self.abstract_score(paper) + self.venue_score(paper)
    }

    pub fn classify(&self, paper: &Paper) -> Relevance {
        Relevance::from_score(self.score(paper), self.config.relevance_threshold)
    }

    /// Split a candidate batch into relevant and non-relevant papers.
    pub fn partition<I>(&self, papers: I) -> Partition
    where
        I: IntoIterator<Item = Paper>,
    {
        let mut partition = Partition::default();
        for paper in papers {
            let relevance = self.classify(&paper);
            partition.push(paper, relevance);
        }
        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BibRecord;
    use crate::text::tests::{mock_normalizer, TableStemmer, WhitespaceTokenizer};

    fn goal_record(key: &str, abstract_text: &str, journal: &str, author: &str) -> BibRecord {
        BibRecord {
            key: key.to_string(),
            title: Some(key.to_string()),
            abstract_text: Some(abstract_text.to_string()),
            journal: Some(journal.to_string()),
            author: Some(author.to_string()),
        }
    }

    struct Fixture {
        normalizer: KeywordNormalizer<WhitespaceTokenizer, TableStemmer>,
        keywords: NormalizedKeywordSet,
        goal: GoalBaseline,
        config: ClassifierConfig,
    }

    impl Fixture {
        /// Baseline 2.0 over two goal papers sharing a journal.
        fn new() -> Self {
            let normalizer = mock_normalizer();
            let keywords = normalizer.normalize(["security", "privacy", "attacks"]);
            let records = vec![
                goal_record("g1", "security and privacy", "TDSC", "Doe, J."),
                goal_record("g2", "privacy attacks", "TDSC", "Roe, R."),
            ];
            let goal = GoalBaseline::build(&records, &keywords, &normalizer).unwrap();

            Self {
                normalizer,
                keywords,
                goal,
                config: ClassifierConfig::default(),
            }
        }

        fn scorer(&self) -> RelevanceScorer<'_, WhitespaceTokenizer, TableStemmer> {
            RelevanceScorer::new(&self.normalizer, &self.keywords, &self.goal, &self.config)
        }
    }

    #[test]
    fn test_hits_equal_to_baseline_is_relevant() {
        let fixture = Fixture::new();
        let scorer = fixture.scorer();
        assert_eq!(fixture.goal.mean_keyword_count(), 2.0);

        let paper = Paper::new("p", "secure private attacks", "Elsewhere", "Nobody");
        // secur + attack = 2 hits, privat is not a keyword
        assert_eq!(scorer.keyword_hits(&paper), 2);
        assert_eq!(scorer.abstract_score(&paper), 0.5);
        assert_eq!(scorer.venue_score(&paper), 0.0);
        assert_eq!(scorer.classify(&paper), Relevance::Relevant);
    }

    #[test]
    fn test_hits_below_baseline_without_venue_is_not_relevant() {
        let fixture = Fixture::new();
        let scorer = fixture.scorer();

        let paper = Paper::new("p", "privacy only", "Elsewhere", "Nobody");
        assert_eq!(scorer.score(&paper), 0.0);
        assert_eq!(scorer.classify(&paper), Relevance::NonRelevant);
    }

    #[test]
    fn test_venue_matches_accumulate_across_goal_set() {
        let fixture = Fixture::new();
        let scorer = fixture.scorer();

        // Same journal as both goal papers, same authors as one
        let paper = Paper::new("p", "unrelated text", "TDSC", "Doe, J.");
        let breakdown = scorer.score_breakdown(&paper);

        assert_eq!(breakdown.journal_matches, 2);
        assert_eq!(breakdown.author_matches, 1);
        assert_eq!(breakdown.venue_score, 0.75);
        assert_eq!(breakdown.abstract_score, 0.0);
        assert_eq!(breakdown.total(), scorer.score(&paper));
        assert_eq!(scorer.classify(&paper), Relevance::Relevant);
    }

    #[test]
    fn test_score_is_not_clamped() {
        let fixture = Fixture::new();
        let scorer = fixture.scorer();

        let paper = Paper::new("p", "security privacy", "TDSC", "Doe, J.");
        assert_eq!(scorer.score(&paper), 1.25);
    }

    #[test]
    fn test_single_venue_match_is_not_enough() {
        let fixture = Fixture::new();
        let scorer = fixture.scorer();

        let paper = Paper::new("p", "", "Other", "Roe, R.");
        assert_eq!(scorer.score(&paper), 0.25);
        assert_eq!(scorer.classify(&paper), Relevance::NonRelevant);
    }

    #[test]
    fn test_partition_preserves_order() {
        let fixture = Fixture::new();
        let scorer = fixture.scorer();

        let papers = vec![
            Paper::new("r1", "security privacy", "X", "A"),
            Paper::new("n1", "nothing here", "X", "A"),
            Paper::new("r2", "attacks on privacy", "X", "A"),
            Paper::new("n2", "", "X", "A"),
            Paper::new("r3", "", "TDSC", "Roe, R."),
        ];

        let partition = scorer.partition(papers);
        let relevant: Vec<&str> = partition.relevant.iter().map(|p| p.title.as_str()).collect();
        let non_relevant: Vec<&str> = partition.non_relevant.iter().map(|p| p.title.as_str()).collect();

        assert_eq!(relevant, vec!["r1", "r2", "r3"]);
        assert_eq!(non_relevant, vec!["n1", "n2"]);
        assert_eq!(partition.relevant_count(), 3);
        assert_eq!(partition.non_relevant_count(), 2);
        assert_eq!(partition.total(), 5);
    }

    #[test]
    fn test_custom_weights() {
        let mut fixture = Fixture::new();
        fixture.config.journal_match_weight = 0.0;
        let scorer = fixture.scorer();

        let paper = Paper::new("p", "", "TDSC", "Nobody");
        assert_eq!(scorer.score(&paper), 0.0);
    }
}
