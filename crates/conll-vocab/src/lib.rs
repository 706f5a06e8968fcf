//! Build the closed vocabulary index a transition-based parser trains against.
//!
//! The builder makes strictly ordered passes over a CoNLL treebank (labels,
//! POS tags, optional Brown-cluster files, word forms), handing out ids from a
//! single counter so every distinct string gets exactly one dense id. Id 0 is
//! reserved for the literal `ROOT`. The finished [`VocabularyIndex`] is
//! read-only and safe to share across threads.
//!
//! # Example
//! ```no_run
//! use conll_types::ClusterDomain;
//! use conll_vocab::{IndexConfig, VocabularyIndex};
//!
//! # fn main() -> Result<(), conll_vocab::CorpusError> {
//! let mut config = IndexConfig::new("/path/to/train.conll");
//! config.cluster_file = Some("/path/to/brown-clusters.txt".into());
//! let index = VocabularyIndex::build(&config)?;
//!
//! println!("vocabulary: {} entries", index.len());
//! println!("dog: {:?}", index.cluster_id("dog", ClusterDomain::OutOfDomain));
//! # Ok(()) }
//! ```

use std::path::{Path, PathBuf};

use conll_types::ClusterDomain;

mod builder;
mod clusters;
mod error;
mod index;
pub mod line;

pub use clusters::ClusterHierarchy;
pub use error::CorpusError;
pub use index::VocabularyIndex;
pub use line::{ConllLine, MIN_FIELDS, read_line_lossy};

/// Inputs and switches for one vocabulary build.
#[derive(Clone, Debug)]
pub struct IndexConfig {
    /// Treebank scanned for labels, tags and words.
    pub corpus: PathBuf,
    /// When false, every label collapses to a single unlabeled sentinel.
    pub labeled: bool,
    pub lowercased: bool,
    /// Out-of-domain Brown clusters (`bits<TAB>word` rows).
    pub cluster_file: Option<PathBuf>,
    /// In-domain Brown clusters (`bits<TAB>word<TAB>count` rows).
    pub in_domain_cluster_file: Option<PathBuf>,
    pub language_info: Option<PathBuf>,
}

impl IndexConfig {
    pub fn new(corpus: impl Into<PathBuf>) -> Self {
        Self {
            corpus: corpus.into(),
            labeled: true,
            lowercased: false,
            cluster_file: None,
            in_domain_cluster_file: None,
            language_info: None,
        }
    }

    /// Cluster file for `domain`; empty paths count as absent.
    pub fn cluster_path(&self, domain: ClusterDomain) -> Option<&Path> {
        let path = match domain {
            ClusterDomain::OutOfDomain => self.cluster_file.as_deref(),
            ClusterDomain::InDomain => self.in_domain_cluster_file.as_deref(),
        };
        path.filter(|p| !p.as_os_str().is_empty())
    }
}

impl VocabularyIndex {
    /// Scan the corpus (and any cluster files) and finalize the index.
    pub fn build(config: &IndexConfig) -> Result<Self, CorpusError> {
        let index = builder::IndexBuilder::build(config)?;
        match config.language_info.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => index.with_language_info(path),
            _ => Ok(index),
        }
    }
}
