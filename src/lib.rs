//! String Improver - relevance classification for systematic literature reviews.
//!
//! This library scores batches of candidate papers against a seed set of
//! known-relevant papers (the goal set) and decides, across successive tuning
//! iterations, whether the keyword configuration that produced a batch beats
//! the best configuration found so far.
//!
//! # Architecture
//!
//! The system is organized into several key modules:
//!
//! - **sorted_set**: Stable merge sort and binary search over ordered sequences
//! - **text**: Tokenization, stopword removal, stemming and keyword normalization
//! - **models**: Core data structures (BibRecord, Paper, ClassifierConfig, Evaluation)
//! - **provider**: Bibliography parsing and paper providers (BibTeX-backed)
//! - **goal**: Goal set construction and keyword baseline
//! - **scoring**: Per-paper relevance scoring and batch partitioning
//! - **evaluation**: Precision/sensitivity and the acceptance rule
//! - **classifier**: The facade tying everything together
//!
//! # Workflow
//!
//! ## Construction (once)
//!
//! 1. Parse the seed bibliography into records
//! 2. Normalize the keyword groups into one sorted, deduplicated stem set
//! 3. Build the goal set and compute the baseline keyword count
//!
//! ## Tuning iteration (per candidate batch)
//!
//! 1. Score every candidate: abstract match plus journal/author matches
//! 2. Partition the batch into relevant and non-relevant papers
//! 3. Compute precision and sensitivity
//! 4. Accept or reject the configuration, updating the best state on accept
//!
//! # Example
//!
//! ```no_run
//! use string_improver::{
//!     classifier::EnglishClassifier,
//!     models::ClassifierConfig,
//!     provider::{bibtex::BibFilePaperProvider, PaperProvider},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let seed = tokio::fs::read_to_string("goal.bib").await?;
//!     let groups = vec![
//!         vec!["security".to_string(), "secure".to_string()],
//!         vec!["privacy".to_string()],
//!     ];
//!     let mut classifier = EnglishClassifier::english(&seed, groups, ClassifierConfig::default())?;
//!
//!     let batch = BibFilePaperProvider::from_file("batch.bib").await?;
//!     let evaluation = classifier.evaluate(batch.fetch_papers().await?)?;
//!
//!     println!(
//!         "precision {:.1}%, sensitivity {:.1}%, {}",
//!         evaluation.precision_temp, evaluation.sensitivity_temp, evaluation.decision
//!     );
//!     Ok(())
//! }
//! ```

// Public modules
pub mod classifier;
pub mod evaluation;
pub mod goal;
pub mod models;
pub mod provider;
pub mod scoring;
pub mod sorted_set;
pub mod text;

// Re-export commonly used types at the crate root
pub use classifier::{ClassifierError, EnglishClassifier, SearchStringClassifier};
pub use evaluation::{AcceptanceState, BestState, Decision, Metrics};
pub use models::{BibRecord, ClassifierConfig, ConfigError, Evaluation, Paper, Relevance};
pub use provider::{BibliographyParser, PaperProvider};
pub use text::{NormalizedKeywordSet, Stemmer, StopwordProvider, Tokenizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
