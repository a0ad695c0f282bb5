//! BibTeX parsing and file-backed providers.
//!
//! [`BibtexParser`] uses the `biblatex` crate to read `.bib` text and keeps
//! the four fields the classifier needs. A malformed entry (unbalanced
//! braces, an undefined string macro) is skipped with a warning; the rest of
//! the file is still returned. [`BibFilePaperProvider`] serves the entries of
//! one bibliography file as a batch.

use std::path::Path;

use async_trait::async_trait;
use biblatex::{Bibliography, ChunksExt, Entry};
use tracing::{debug, warn};

use super::{BibliographyParser, PaperProvider, ProviderError, ProviderResult};
use crate::models::BibRecord;

/// BibTeX/BibLaTeX parser backed by `biblatex`.
///
/// Field names are matched case-insensitively and field values have their
/// whitespace collapsed, so multi-line abstracts compare as single lines.
///
/// The whole text is parsed in one pass first. If that fails, the text is
/// split at entry boundaries (`@` at the start of a line) and every entry is
/// parsed on its own, with the file's `@string` definitions in front of it.
/// Entries that still fail are logged and skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct BibtexParser;

impl BibtexParser {
    fn field(entry: &Entry, name: &str) -> Option<String> {
        entry
            .fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, chunks)| collapse_whitespace(&chunks.format_verbatim()))
    }

    fn record(entry: &Entry) -> BibRecord {
        BibRecord {
            key: entry.key.clone(),
            title: Self::field(entry, "title"),
            abstract_text: Self::field(entry, "abstract"),
            journal: Self::field(entry, "journal"),
            author: Self::field(entry, "author"),
        }
    }

    /// Parse entry by entry, skipping the ones `biblatex` rejects.
    fn parse_entries(raw: &str, whole_file_error: String) -> ProviderResult<Vec<BibRecord>> {
        let chunks = split_entries(raw);

        // Macro definitions are shared by every entry
        let macros: String = chunks
            .iter()
            .filter(|chunk| chunk.is_string_definition())
            .map(|chunk| chunk.text)
            .collect();

        let mut records = Vec::new();
        let mut failed = 0usize;

        for chunk in chunks.iter().filter(|chunk| !chunk.is_string_definition()) {
            let text = format!("{}{}", macros, chunk.text);
            match Bibliography::parse(&text) {
                Ok(bibliography) => records.extend(bibliography.iter().map(Self::record)),
                Err(e) => {
                    failed += 1;
                    warn!(
                        entry = chunk.key().unwrap_or("<unknown>"),
                        offset = chunk.offset,
                        "Skipping malformed bibliography entry: {}",
                        e
                    );
                }
            }
        }

        if records.is_empty() {
            return Err(ProviderError::ParseError(whole_file_error));
        }

        warn!(
            "Recovered {} bibliography entries, skipped {} malformed",
            records.len(),
            failed
        );
        Ok(records)
    }
}

impl BibliographyParser for BibtexParser {
    fn parse(&self, raw: &str) -> ProviderResult<Vec<BibRecord>> {
        let records = match Bibliography::parse(raw) {
            Ok(bibliography) => bibliography.iter().map(Self::record).collect::<Vec<_>>(),
            Err(e) => {
                debug!("Bibliography failed to parse as a whole ({}); parsing entry by entry", e);
                Self::parse_entries(raw, e.to_string())?
            }
        };

        debug!("Parsed {} bibliography entries", records.len());
        Ok(records)
    }
}

/// One `@...` block of a bibliography and its byte offset.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EntryChunk<'a> {
    offset: usize,
    text: &'a str,
}

impl<'a> EntryChunk<'a> {
    /// Entry type, e.g. `article` or `string`, lowercased.
    fn kind(&self) -> String {
        self.text
            .trim_start()
            .trim_start_matches('@')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase()
    }

    fn is_string_definition(&self) -> bool {
        self.kind() == "string"
    }

    /// Citation key, when the opening line has one.
    fn key(&self) -> Option<&'a str> {
        let first_line = self.text.trim_start().lines().next()?;
        let start = first_line.find(|c: char| c == '{' || c == '(')? + 1;
        let key = first_line[start..].split(',').next()?.trim();
        (!key.is_empty()).then_some(key)
    }
}

/// Split bibliography text at lines starting with `@`.
///
/// Text before the first entry is dropped, as BibTeX treats it as a comment.
fn split_entries(raw: &str) -> Vec<EntryChunk<'_>> {
    let mut starts = Vec::new();
    let mut offset = 0usize;
    for line in raw.split_inclusive('\n') {
        if line.trim_start().starts_with('@') {
            starts.push(offset);
        }
        offset += line.len();
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(raw.len());
            EntryChunk {
                offset: start,
                text: &raw[start..end],
            }
        })
        .collect()
}

/// Collapse runs of whitespace to single spaces and trim the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Provider serving the entries of a single bibliography.
///
/// The text is read once at construction; parsing happens on every fetch.
pub struct BibFilePaperProvider<P = BibtexParser>
where
    P: BibliographyParser,
{
    /// Display name (file path or caller-chosen label)
    name: String,

    /// Raw bibliography text
    raw: String,

    /// Parser applied on fetch
    parser: P,
}

impl BibFilePaperProvider<BibtexParser> {
    /// Read a BibTeX file from disk.
    ///
    /// # Errors
    /// Returns `ProviderError::IoError` if the file cannot be read
    pub async fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        debug!("Read {} bytes from {}", raw.len(), path.display());

        Ok(Self {
            name: path.display().to_string(),
            raw,
            parser: BibtexParser,
        })
    }

    /// Wrap in-memory BibTeX text.
    pub fn from_string(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
            parser: BibtexParser,
        }
    }
}

impl<P> BibFilePaperProvider<P>
where
    P: BibliographyParser,
{
    /// Swap the parser used on fetch.
    pub fn with_parser<Q: BibliographyParser>(self, parser: Q) -> BibFilePaperProvider<Q> {
        BibFilePaperProvider {
            name: self.name,
            raw: self.raw,
            parser,
        }
    }

    /// The raw bibliography text.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

#[async_trait]
impl<P> PaperProvider for BibFilePaperProvider<P>
where
    P: BibliographyParser,
{
    async fn fetch_records(&self) -> ProviderResult<Vec<BibRecord>> {
        self.parser.parse(&self.raw)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
