//! Gloss → identifier resolution
//!
//! Every lookup rescans the corpus and builds a [`GlossIndex`] from scratch.
//! When several signs share a term, the lowest identifier wins, so the answer
//! never depends on directory listing order.

use nzsl_common::corpus::RawSignRecord;
use nzsl_common::NzslId;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::corpus::{list_record_files, read_raw_record, CorpusError};

/// Case-insensitive map from gloss term to sign identifiers
#[derive(Debug, Clone, Default)]
pub struct GlossIndex {
    terms: HashMap<String, BTreeSet<NzslId>>,
    records: usize,
}

impl GlossIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over every record file in `dir`
    ///
    /// Files that fail to read or parse are logged and left out.
    pub fn from_dir(dir: &Path) -> Result<Self, CorpusError> {
        let mut index = Self::new();

        for path in list_record_files(dir)? {
            match read_raw_record(&path) {
                Ok(record) => {
                    if !index.insert(&record) {
                        debug!(file = %path.display(), "Record has no nzsl_id, not indexed");
                    }
                }
                Err(e) => warn!("{}", e),
            }
        }

        debug!(
            dir = %dir.display(),
            records = index.records,
            terms = index.terms.len(),
            "Built gloss index"
        );
        Ok(index)
    }

    /// Register every primary and secondary term of `record`
    ///
    /// Returns false if the record has no identifier.
    pub fn insert(&mut self, record: &RawSignRecord) -> bool {
        let Some(id) = record.nzsl_id else {
            return false;
        };

        for term in record.terms() {
            self.terms.entry(normalize_term(term)).or_default().insert(id);
        }
        self.records += 1;
        true
    }

    /// Lowest identifier whose gloss terms contain `query` exactly
    pub fn lookup(&self, query: &str) -> Option<NzslId> {
        self.terms
            .get(&normalize_term(query))
            .and_then(|ids| ids.first().copied())
    }

    /// Every identifier registered under `query`, ascending
    pub fn candidates(&self, query: &str) -> Vec<NzslId> {
        self.terms
            .get(&normalize_term(query))
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of indexed records
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Number of distinct terms
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}

fn normalize_term(term: &str) -> String {
    term.to_lowercase()
}

/// Resolves queries against a corpus directory
#[derive(Debug, Clone)]
pub struct GlossResolver {
    corpus_dir: PathBuf,
}

impl GlossResolver {
    pub fn new(corpus_dir: impl Into<PathBuf>) -> Self {
        Self {
            corpus_dir: corpus_dir.into(),
        }
    }

    /// Scan the corpus and resolve `query`
    ///
    /// Blocking; async callers should run this on the blocking pool.
    pub fn resolve(&self, query: &str) -> Result<Option<NzslId>, CorpusError> {
        let index = GlossIndex::from_dir(&self.corpus_dir)?;

        let found = index.lookup(query);
        let candidates = index.candidates(query);
        if candidates.len() > 1 {
            debug!(
                query = %query,
                candidates = ?candidates,
                "Gloss shared by several signs, taking lowest id"
            );
        }

        Ok(found)
    }
}
