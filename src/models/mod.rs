//! Core data models for the search string improver.
//!
//! This module contains the fundamental data structures shared across the
//! crate: bibliography records as they come out of a parser, the papers built
//! from them, the classifier configuration and the outcome of an evaluation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::evaluation::Decision;

/// A bibliography entry as produced by a parser.
///
/// Every field the classifier looks at is optional. A record missing one of
/// them is still usable: the missing value turns into an empty string when
/// the record becomes a [`Paper`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BibRecord {
    /// Citation key of the entry (e.g. `smith2019privacy`)
    pub key: String,

    /// Paper title
    pub title: Option<String>,

    /// Abstract text
    pub abstract_text: Option<String>,

    /// Journal or venue name
    pub journal: Option<String>,

    /// Author list exactly as written in the source
    pub author: Option<String>,
}

impl BibRecord {
    /// Create a record with only its key set.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Names of the fields this record lacks.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.abstract_text.is_none() {
            missing.push("abstract");
        }
        if self.journal.is_none() {
            missing.push("journal");
        }
        if self.author.is_none() {
            missing.push("author");
        }
        missing
    }
}

/// Metadata of a single paper, as compared by the relevance scorer.
///
/// Papers are immutable once built; missing bibliography fields are stored as
/// empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paper {
    /// Paper title
    pub title: String,

    /// Abstract text
    pub abstract_text: String,

    /// Journal or venue name
    pub journal: String,

    /// Author list as one comparable string
    pub authors: String,
}

impl Paper {
    /// Create a paper from its four fields.
    pub fn new(
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        journal: impl Into<String>,
        authors: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
            journal: journal.into(),
            authors: authors.into(),
        }
    }

    /// Build a paper from a possibly incomplete record.
    ///
    /// Each missing field is logged and left empty; a partial record is never
    /// an error.
    pub fn from_record(record: &BibRecord) -> Self {
        let missing = record.missing_fields();
        if !missing.is_empty() {
            for field in &missing {
                debug!(entry = %record.key, field = *field, "bibliography entry has no such field");
            }
            warn!(
                "Entry '{}' is missing {}; using empty values",
                record.key,
                missing.join(", ")
            );
        }

        Self {
            title: record.title.clone().unwrap_or_default(),
            abstract_text: record.abstract_text.clone().unwrap_or_default(),
            journal: record.journal.clone().unwrap_or_default(),
            authors: record.author.clone().unwrap_or_default(),
        }
    }
}

impl From<&BibRecord> for Paper {
    fn from(record: &BibRecord) -> Self {
        Paper::from_record(record)
    }
}

/// Binary relevance classification of a candidate paper.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Relevance {
    /// Score reached the relevance threshold
    Relevant,

    /// Score stayed below the threshold
    NonRelevant,
}

impl Relevance {
    /// Classify a score against a threshold (inclusive).
    ///
    /// # Arguments
    /// * `score` - Total relevance score of a paper
    /// * `threshold` - Minimum score counted as relevant
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score >= threshold {
            Relevance::Relevant
        } else {
            Relevance::NonRelevant
        }
    }

    pub fn is_relevant(self) -> bool {
        self == Relevance::Relevant
    }
}

/// Scoring weights and acceptance thresholds.
///
/// The defaults reproduce the classic rule: half a point for an abstract that
/// reaches the goal baseline, a quarter point per goal paper sharing the
/// authors or the journal, relevance at 0.5, a recall floor of 80% and a
/// precision ceiling of 60%. Every field may be omitted when deserializing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Added when the abstract hit count reaches the baseline
    pub abstract_match_weight: f64,

    /// Added for every goal paper with identical authors
    pub author_match_weight: f64,

    /// Added for every goal paper with an identical journal
    pub journal_match_weight: f64,

    /// Minimum total score for a paper to count as relevant
    pub relevance_threshold: f64,

    /// Sensitivity (percent) that must not be lost once reached
    pub sensitivity_floor: f64,

    /// Precision (percent) gate applied while the accepted precision is below it
    pub precision_ceiling: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            abstract_match_weight: 0.5,
            author_match_weight: 0.25,
            journal_match_weight: 0.25,
            relevance_threshold: 0.5,
            sensitivity_floor: 80.0,
            precision_ceiling: 60.0,
        }
    }
}

/// A configuration value outside its allowed range.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A weight or threshold is negative or not finite
    #[error("{field} must be a non-negative number, got {value}")]
    InvalidWeight { field: &'static str, value: f64 },

    /// A percentage gate is outside 0..=100
    #[error("{field} must be between 0 and 100, got {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

impl ConfigError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::InvalidWeight { field, .. } | ConfigError::OutOfRange { field, .. } => *field,
        }
    }
}

impl ClassifierConfig {
    /// Check that every value is finite and within range.
    ///
    /// # Errors
    /// Returns a `ConfigError` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("abstract_match_weight", self.abstract_match_weight),
            ("author_match_weight", self.author_match_weight),
            ("journal_match_weight", self.journal_match_weight),
            ("relevance_threshold", self.relevance_threshold),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { field: name, value });
            }
        }

        let percentages = [
            ("sensitivity_floor", self.sensitivity_floor),
            ("precision_ceiling", self.precision_ceiling),
        ];
        for (name, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field: name, value });
            }
        }

        Ok(())
    }
}

/// Outcome of evaluating one candidate batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    /// Whether this configuration replaced the best one
    pub accepted: bool,

    /// Why the configuration was accepted or rejected
    pub decision: Decision,

    /// Precision of this batch, in percent
    pub precision_temp: f64,

    /// Sensitivity of this batch, in percent
    pub sensitivity_temp: f64,

    /// Number of candidates classified relevant
    pub relevant_count: usize,

    /// Number of candidates classified non-relevant
    pub non_relevant_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_from_score() {
        assert_eq!(Relevance::from_score(0.5, 0.5), Relevance::Relevant);
        assert_eq!(Relevance::from_score(1.75, 0.5), Relevance::Relevant);
        assert_eq!(Relevance::from_score(0.25, 0.5), Relevance::NonRelevant);
        assert_eq!(Relevance::from_score(0.0, 0.5), Relevance::NonRelevant);
        assert!(Relevance::Relevant.is_relevant());
    }

    #[test]
    fn test_paper_from_complete_record() {
        let record = BibRecord {
            key: "doe2020".to_string(),
            title: Some("Privacy at scale".to_string()),
            abstract_text: Some("We study privacy.".to_string()),
            journal: Some("IEEE S&P".to_string()),
            author: Some("Doe, John".to_string()),
        };
        assert!(record.missing_fields().is_empty());

        let paper = Paper::from(&record);
        assert_eq!(paper, Paper::new("Privacy at scale", "We study privacy.", "IEEE S&P", "Doe, John"));
    }

    #[test]
    fn test_paper_from_partial_record() {
        let mut record = BibRecord::new("anon2021");
        record.title = Some("Untitled draft".to_string());

        assert_eq!(record.missing_fields(), vec!["abstract", "journal", "author"]);

        let paper = Paper::from_record(&record);
        assert_eq!(paper.title, "Untitled draft");
        assert_eq!(paper.abstract_text, "");
        assert_eq!(paper.journal, "");
        assert_eq!(paper.authors, "");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ClassifierConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.relevance_threshold, 0.5);
        assert_eq!(config.sensitivity_floor, 80.0);
        assert_eq!(config.precision_ceiling, 60.0);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let config = ClassifierConfig {
            author_match_weight: -0.25,
            ..ClassifierConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidWeight {
                field: "author_match_weight",
                value: -0.25
            }
        );

        let config = ClassifierConfig {
            sensitivity_floor: 120.0,
            ..ClassifierConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                field: "sensitivity_floor",
                value: 120.0
            }
        );
        assert_eq!(err.to_string(), "sensitivity_floor must be between 0 and 100, got 120");

        let config = ClassifierConfig {
            relevance_threshold: f64::NAN,
            ..ClassifierConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), "relevance_threshold");
        assert!(matches!(err, ConfigError::InvalidWeight { .. }));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ClassifierConfig =
            serde_json::from_str(r#"{ "sensitivity_floor": 70.0 }"#).unwrap();
        assert_eq!(config.sensitivity_floor, 70.0);
        assert_eq!(config.abstract_match_weight, 0.5);
        assert_eq!(config.precision_ceiling, 60.0);
    }
}
