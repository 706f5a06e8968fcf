use std::collections::HashMap;
use std::path::Path;

use conll_types::{ClusterDomain, PLACEHOLDER, ROOT_ID, ROOT_TOKEN};
use tracing::{debug, info};

use crate::clusters::{ClusterEntry, ClusterHierarchy};
use crate::index::VocabularyIndex;
use crate::line::{ConllLine, normalize_label, normalize_word, scan_lines};
use crate::{CorpusError, IndexConfig};

/// Single monotonic id counter shared by labels, tags, clusters and words.
#[derive(Debug)]
struct IdSpace {
    ids: HashMap<String, i32>,
    next: i32,
}

impl IdSpace {
    fn new() -> Self {
        Self {
            ids: HashMap::from([(ROOT_TOKEN.to_string(), ROOT_ID)]),
            next: ROOT_ID + 1,
        }
    }

    fn get(&self, text: &str) -> Option<i32> {
        self.ids.get(text).copied()
    }

    /// Existing id for `text`, or the next fresh one.
    fn intern(&mut self, text: &str) -> i32 {
        if let Some(id) = self.get(text) {
            return id;
        }
        let id = self.next;
        self.ids.insert(text.to_string(), id);
        self.next += 1;
        id
    }
}

/// Owns the in-progress vocabulary while the corpus passes run.
///
/// Passes must run in the order labels, tags, clusters, words; only
/// [`IndexBuilder::finish`] exposes the result.
#[derive(Debug)]
pub(crate) struct IndexBuilder {
    ids: IdSpace,
    label_ordinals: HashMap<i32, i32>,
    next_ordinal: i32,
    root_label: String,
    clusters: [ClusterHierarchy; 2],
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            ids: IdSpace::new(),
            label_ordinals: HashMap::from([(ROOT_ID, ROOT_ID)]),
            next_ordinal: ROOT_ID + 1,
            root_label: ROOT_TOKEN.to_string(),
            clusters: Default::default(),
        }
    }

    /// Run every pass named by `config` in order and finalize.
    pub fn build(config: &IndexConfig) -> Result<VocabularyIndex, CorpusError> {
        let mut builder = Self::new();
        builder.scan_labels(&config.corpus, config.labeled)?;
        builder.scan_tags(&config.corpus)?;
        for domain in ClusterDomain::ALL {
            if let Some(path) = config.cluster_path(domain) {
                builder.scan_clusters(path, domain)?;
            }
        }
        builder.scan_words(&config.corpus, config.lowercased)?;
        Ok(builder.finish())
    }

    fn add_label(&mut self, label: &str) {
        if self.ids.get(label).is_none() {
            let id = self.ids.intern(label);
            self.label_ordinals.insert(id, self.next_ordinal);
            self.next_ordinal += 1;
        }
    }

    fn add_tag(&mut self, tag: &str) {
        self.ids.intern(tag);
    }

    fn add_cluster(&mut self, entry: ClusterEntry<'_>, domain: ClusterDomain) {
        let full = self.ids.intern(entry.bits);
        let prefix4 = self.ids.intern(entry.prefix4);
        let prefix6 = self.ids.intern(entry.prefix6);
        self.clusters[domain.index()].insert(entry.word, full, prefix4, prefix6);
    }

    fn add_word(&mut self, word: &str) {
        if word != PLACEHOLDER {
            self.ids.intern(word);
        }
    }

    pub fn scan_labels(&mut self, corpus: &Path, labeled: bool) -> Result<(), CorpusError> {
        scan_lines(corpus, |lineno, raw| {
            let Some(line) = ConllLine::parse(lineno, raw)? else {
                return Ok(());
            };
            if line.head()? == 0 {
                self.root_label = line.label().to_string();
            }
            self.add_label(normalize_label(line.label(), labeled));
            Ok(())
        })?;
        debug!(
            "label pass: {} labels, root label {:?}",
            self.next_ordinal, self.root_label
        );
        Ok(())
    }

    pub fn scan_tags(&mut self, corpus: &Path) -> Result<(), CorpusError> {
        scan_lines(corpus, |lineno, raw| {
            if let Some(line) = ConllLine::parse(lineno, raw)? {
                self.add_tag(line.pos());
            }
            Ok(())
        })?;
        debug!("tag pass: next id {}", self.ids.next);
        Ok(())
    }

    pub fn scan_clusters(&mut self, path: &Path, domain: ClusterDomain) -> Result<(), CorpusError> {
        scan_lines(path, |_, raw| {
            if let Some(entry) = ClusterEntry::parse(raw, domain) {
                self.add_cluster(entry, domain);
            }
            Ok(())
        })?;
        info!(
            "{domain} cluster words: {}",
            self.clusters[domain.index()].word_count()
        );
        Ok(())
    }

    pub fn scan_words(&mut self, corpus: &Path, lowercased: bool) -> Result<(), CorpusError> {
        scan_lines(corpus, |lineno, raw| {
            if let Some(line) = ConllLine::parse(lineno, raw)? {
                self.add_word(&normalize_word(line.word(), lowercased));
            }
            Ok(())
        })?;
        debug!("word pass: next id {}", self.ids.next);
        Ok(())
    }

    pub fn finish(self) -> VocabularyIndex {
        info!("vocabulary size: {}", self.ids.ids.len());
        VocabularyIndex::from_parts(
            self.ids.ids,
            self.label_ordinals,
            self.root_label,
            self.clusters,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn interning_is_stable() {
        let mut space = IdSpace::new();
        assert_eq!(space.intern("a"), 1);
        assert_eq!(space.intern("b"), 2);
        assert_eq!(space.intern("a"), 1);
        assert_eq!(space.intern(ROOT_TOKEN), ROOT_ID);
        assert_eq!(space.next, 3);
    }

    #[test]
    fn earlier_pass_wins_on_collision() {
        // POS tag "run" and the word "run" share one id.
        let corpus = write_file("1\trun\trun\trun\t_\ten\t0\troot\n2\tfast\tfast\tRB\t_\ten\t1\tadvmod\n");
        let mut builder = IndexBuilder::new();
        builder.scan_labels(corpus.path(), true).unwrap();
        builder.scan_tags(corpus.path()).unwrap();
        builder.scan_words(corpus.path(), false).unwrap();
        let index = builder.finish();
        assert_eq!(index.id("root"), Some(1));
        assert_eq!(index.id("advmod"), Some(2));
        assert_eq!(index.id("run"), Some(3));
        assert_eq!(index.id("RB"), Some(4));
        assert_eq!(index.id("fast"), Some(5));
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn label_pass_tracks_ordinals_and_root_label() {
        let corpus = write_file(
            "1\ta\ta\tDT\t_\ten\t2\t_\n2\tb\tb\tNN\t_\ten\t0\tpred\n\n1\tc\tc\tNN\t_\ten\t0\tROOT\n",
        );
        let mut builder = IndexBuilder::new();
        builder.scan_labels(corpus.path(), true).unwrap();
        let index = builder.finish();
        assert_eq!(index.label_id("-"), 1);
        assert_eq!(index.label_id("pred"), 2);
        assert_eq!(index.label_ordinal(ROOT_ID), Some(0));
        assert_eq!(index.label_ordinal(1), Some(1));
        assert_eq!(index.label_ordinal(2), Some(2));
        assert_eq!(index.labels().len(), 3);
        assert_eq!(index.root_label(), "ROOT");
    }

    #[test]
    fn label_pass_rejects_short_lines() {
        let corpus = write_file("1\ta\ta\tDT\t_\ten\t0\n");
        let mut builder = IndexBuilder::new();
        let err = builder.scan_labels(corpus.path(), true).unwrap_err();
        assert!(matches!(err, CorpusError::Format { line: 1, found: 7, .. }));
    }

    #[test]
    fn unlabeled_collapses_to_one_label() {
        let corpus = write_file("1\ta\ta\tDT\t_\ten\t2\tdet\n2\tb\tb\tNN\t_\ten\t0\troot\n");
        let mut builder = IndexBuilder::new();
        builder.scan_labels(corpus.path(), false).unwrap();
        let index = builder.finish();
        assert_eq!(index.label_id("~"), 1);
        assert_eq!(index.id("det"), None);
        assert_eq!(index.labels().len(), 2);
        assert_eq!(index.root_label(), "root");
    }

    #[test]
    fn cluster_pass_reuses_bitstrings_and_prefixes() {
        let clusters = write_file("0110\tdog\n0110\tcat\n011100\tbark\n01\tof\n");
        let mut builder = IndexBuilder::new();
        builder
            .scan_clusters(clusters.path(), ClusterDomain::OutOfDomain)
            .unwrap();
        let index = builder.finish();
        let dog = index.cluster_id("dog", ClusterDomain::OutOfDomain);
        assert_eq!((dog.full, dog.prefix4, dog.prefix6), (1, 1, 1));
        assert_eq!(index.cluster_id("cat", ClusterDomain::OutOfDomain), dog);
        let bark = index.cluster_id("bark", ClusterDomain::OutOfDomain);
        assert_eq!((bark.full, bark.prefix4, bark.prefix6), (2, 3, 2));
        let of = index.cluster_id("of", ClusterDomain::OutOfDomain);
        assert_eq!((of.full, of.prefix4, of.prefix6), (4, 4, 4));
        assert!(!index.has_clusters(ClusterDomain::InDomain));
    }
}
