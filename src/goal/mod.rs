//! Goal set and baseline construction.
//!
//! The goal set is the seed collection of papers already known to be
//! relevant. It is built once, from the seed bibliography, and serves two
//! purposes afterwards:
//!
//! - its abstracts define the **baseline**: the mean number of configured
//!   keywords found per goal abstract, which candidate abstracts must reach;
//! - its papers are the comparison pool for author and journal matches, and
//!   its size is the sensitivity denominator.
//!
//! # Usage
//!
//! ```
//! use string_improver::goal::GoalBaseline;
//! use string_improver::models::BibRecord;
//! use string_improver::text::english::english_normalizer;
//!
//! let normalizer = english_normalizer();
//! let keywords = normalizer.normalize(["security", "privacy"]);
//!
//! let mut record = BibRecord::new("seed1");
//! record.abstract_text = Some("Security and privacy of smart homes.".to_string());
//!
//! let goal = GoalBaseline::build(&[record], &keywords, &normalizer).unwrap();
//! assert_eq!(goal.mean_keyword_count(), 2.0);
//! ```

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{BibRecord, Paper};
use crate::text::{KeywordNormalizer, NormalizedKeywordSet, Stemmer, Tokenizer};

/// Errors that make a goal set unusable.
#[derive(Debug, Error, PartialEq)]
pub enum GoalError {
    /// The seed bibliography produced no entries
    #[error("Goal bibliography contains no entries")]
    EmptyGoalSet,

    /// No goal entry carries an abstract, so the baseline is undefined
    #[error("None of the {entries} goal entries has an abstract; baseline is undefined")]
    NoProcessableAbstracts {
        /// Number of goal entries inspected
        entries: usize,
    },
}

/// Result type for goal set operations.
pub type GoalResult<T> = Result<T, GoalError>;

/// Count how many configured keywords occur in an abstract's normalized terms.
pub fn count_keyword_hits(keywords: &NormalizedKeywordSet, abstract_terms: &NormalizedKeywordSet) -> usize {
    keywords.count_present_in(abstract_terms)
}

/// Build the goal papers from seed records.
///
/// Every record yields a paper, however incomplete.
pub fn build_goal_set(records: &[BibRecord]) -> Vec<Paper> {
    records.iter().map(Paper::from_record).collect()
}

/// The goal set together with its keyword baseline.
#[derive(Debug, Clone)]
pub struct GoalBaseline {
    /// Seed papers, in bibliography order
    papers: Vec<Paper>,

    /// Mean keyword hits over processed abstracts
    mean_keyword_count: f64,

    /// Abstracts that contributed to the mean
    processed_abstracts: usize,

    /// Entries without an abstract field
    skipped_abstracts: usize,
}

impl GoalBaseline {
    /// Build the goal set and compute its baseline.
    ///
    /// Every abstract that is present counts toward the mean, even one that
    /// yields no tokens (it contributes zero hits). Entries without an abstract
    /// are left out of the mean; their papers still join the goal set.
    ///
    /// # Arguments
    /// * `records` - Seed bibliography records
    /// * `keywords` - Normalized keyword set of the current configuration
    /// * `normalizer` - Normalizer used on the abstracts
    ///
    /// # Errors
    /// Returns `GoalError::EmptyGoalSet` if `records` is empty, or
    /// `GoalError::NoProcessableAbstracts` if no record has an abstract
    pub fn build<T, S>(
        records: &[BibRecord],
        keywords: &NormalizedKeywordSet,
        normalizer: &KeywordNormalizer<T, S>,
    ) -> GoalResult<Self>
    where
        T: Tokenizer,
        S: Stemmer,
    {
        if records.is_empty() {
            return Err(GoalError::EmptyGoalSet);
        }

        let papers = build_goal_set(records);

        let mut total_hits = 0usize;
        let mut processed = 0usize;
        let mut skipped = 0usize;

        for record in records {
            let Some(text) = record.abstract_text.as_deref() else {
                debug!(entry = %record.key, "goal entry has no abstract; excluded from baseline");
                skipped += 1;
                continue;
            };

            let terms = normalizer.normalize_text(text);
            let hits = count_keyword_hits(keywords, &terms);
            debug!(entry = %record.key, hits, "goal abstract processed");

            total_hits += hits;
            processed += 1;
        }

        if processed == 0 {
            return Err(GoalError::NoProcessableAbstracts {
                entries: records.len(),
            });
        }

        let mean_keyword_count = total_hits as f64 / processed as f64;
        info!(
            "Goal set: {} papers, {} abstracts processed, {} skipped, baseline {:.3}",
            papers.len(),
            processed,
            skipped,
            mean_keyword_count
        );

        Ok(Self {
            papers,
            mean_keyword_count,
            processed_abstracts: processed,
            skipped_abstracts: skipped,
        })
    }

    /// The goal papers.
    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    /// Number of goal papers (the sensitivity denominator).
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    /// Always false for a successfully built goal set.
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// The baseline: mean keyword hits per processed goal abstract.
    pub fn mean_keyword_count(&self) -> f64 {
        self.mean_keyword_count
    }

    pub fn processed_abstracts(&self) -> usize {
        self.processed_abstracts
    }

    pub fn skipped_abstracts(&self) -> usize {
        self.skipped_abstracts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tests::mock_normalizer;

    fn record(key: &str, abstract_text: Option<&str>) -> BibRecord {
        BibRecord {
            key: key.to_string(),
            title: Some(format!("Title of {}", key)),
            abstract_text: abstract_text.map(str::to_string),
            journal: Some("Journal of Testing".to_string()),
            author: Some(format!("Author {}", key)),
        }
    }

    #[test]
    fn test_baseline_is_mean_of_hits() {
        let normalizer = mock_normalizer();
        let keywords = NormalizedKeywordSet::from_stems(["a1", "a2", "a3", "a4", "a5"]);

        let records = vec![
            record("three", Some("a1 a2 a3 filler")),
            record("five", Some("a1 a2 a3 a4 a5")),
        ];

        let goal = GoalBaseline::build(&records, &keywords, &normalizer).unwrap();
        assert_eq!(goal.mean_keyword_count(), 4.0);
        assert_eq!(goal.len(), 2);
        assert_eq!(goal.processed_abstracts(), 2);
        assert_eq!(goal.skipped_abstracts(), 0);
    }

    #[test]
    fn test_hits_use_normalized_abstract() {
        let normalizer = mock_normalizer();
        let keywords = normalizer.normalize(["security", "privacy"]);

        // Repeated and inflected forms count once per keyword
        let records = vec![record(
            "seed",
            Some("The security of secure systems and the privacy of users"),
        )];

        let goal = GoalBaseline::build(&records, &keywords, &normalizer).unwrap();
        assert_eq!(goal.mean_keyword_count(), 2.0);
    }

    #[test]
    fn test_missing_abstracts_are_skipped() {
        let normalizer = mock_normalizer();
        let keywords = normalizer.normalize(["security"]);

        let records = vec![
            record("missing", None),
            record("ok", Some("security analysis")),
        ];

        let goal = GoalBaseline::build(&records, &keywords, &normalizer).unwrap();
        assert_eq!(goal.len(), 2, "every record joins the goal set");
        assert_eq!(goal.processed_abstracts(), 1);
        assert_eq!(goal.skipped_abstracts(), 1);
        assert_eq!(goal.mean_keyword_count(), 1.0);
    }

    #[test]
    fn test_empty_abstracts_count_with_zero_hits() {
        let normalizer = mock_normalizer();
        let keywords = NormalizedKeywordSet::from_stems(["a1", "a2"]);

        let records = vec![
            record("two", Some("a1 a2")),
            record("empty", Some("")),
            record("blank", Some("   ")),
            record("missing", None),
        ];

        let goal = GoalBaseline::build(&records, &keywords, &normalizer).unwrap();
        assert_eq!(goal.processed_abstracts(), 3);
        assert_eq!(goal.skipped_abstracts(), 1);
        assert!((goal.mean_keyword_count() - 2.0 / 3.0).abs() < 1e-12);

        let goal = GoalBaseline::build(&records[..2], &keywords, &normalizer).unwrap();
        assert_eq!(goal.mean_keyword_count(), 1.0);
    }

    #[test]
    fn test_empty_goal_set_fails() {
        let normalizer = mock_normalizer();
        let keywords = normalizer.normalize(["security"]);

        let result = GoalBaseline::build(&[], &keywords, &normalizer);
        assert_eq!(result.unwrap_err(), GoalError::EmptyGoalSet);
    }

    #[test]
    fn test_no_processable_abstract_fails() {
        let normalizer = mock_normalizer();
        let keywords = normalizer.normalize(["security"]);
        let records = vec![record("a", None), record("b", None)];

        let result = GoalBaseline::build(&records, &keywords, &normalizer);
        assert_eq!(
            result.unwrap_err(),
            GoalError::NoProcessableAbstracts { entries: 2 }
        );

        // A present but empty abstract is still processable
        let records = vec![record("a", None), record("b", Some(""))];
        let goal = GoalBaseline::build(&records, &keywords, &normalizer).unwrap();
        assert_eq!(goal.processed_abstracts(), 1);
        assert_eq!(goal.mean_keyword_count(), 0.0);
    }

    #[test]
    fn test_build_goal_set_keeps_partial_records() {
        let papers = build_goal_set(&[BibRecord::new("bare"), record("full", Some("text"))]);
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0], Paper::default());
        assert_eq!(papers[1].authors, "Author full");
    }
}
