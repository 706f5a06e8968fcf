use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use conll_types::{
    CompactTree, GoldArc, GoldArcs, ROOT_TOKEN, RootPlacement, Token, TrainingInstance, TreeArc,
};
use conll_vocab::{ConllLine, CorpusError, VocabularyIndex, line, read_line_lossy};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// Switches for turning treebank sentences into training instances.
#[derive(Clone, Debug)]
pub struct ReadOptions {
    /// Stop after this many sentences have been flushed, kept or not.
    pub limit: usize,
    pub keep_non_projective: bool,
    pub labeled: bool,
    pub root_placement: RootPlacement,
    pub lowercased: bool,
    /// Randomly permute the instances once everything has been read.
    pub shuffle: bool,
    /// Seed for a reproducible shuffle; the thread RNG is used otherwise.
    pub shuffle_seed: Option<u64>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            limit: usize::MAX,
            keep_non_projective: false,
            labeled: true,
            root_placement: RootPlacement::default(),
            lowercased: false,
            shuffle: false,
            shuffle_seed: None,
        }
    }
}

/// Sequential reader over a blank-line-delimited CoNLL stream.
///
/// Reads resume where the previous call stopped, so a `limit` can be used
/// to pull a large treebank in chunks.
pub struct ConllReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl ConllReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        Ok(Self::from_reader(line::open(path.as_ref())?))
    }
}

impl<R: BufRead> ConllReader<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<(usize, String)>, CorpusError> {
        let Some(line) = read_line_lossy(&mut self.reader, &mut self.buf)? else {
            return Ok(None);
        };
        self.line_no += 1;
        Ok(Some((self.line_no, line)))
    }

    /// Materialize training instances against a finalized index.
    pub fn read_instances(
        &mut self,
        options: &ReadOptions,
        index: &VocabularyIndex,
    ) -> Result<Vec<TrainingInstance>, CorpusError> {
        let mut instances = Vec::new();
        let mut pending = PendingSentence::default();
        let mut flushed = 0usize;
        let mut dropped = 0usize;

        let mut flush = |pending: &mut PendingSentence, instances: &mut Vec<TrainingInstance>| {
            let sentence = std::mem::take(pending);
            if sentence.tokens.is_empty() {
                return 0;
            }
            let instance = sentence.into_instance(options.root_placement);
            if options.keep_non_projective || !instance.is_non_projective() {
                instances.push(instance);
            } else {
                dropped += 1;
            }
            1
        };

        loop {
            if flushed >= options.limit {
                info!("instance limit reached after {flushed} sentences");
                break;
            }
            let Some((line_no, raw)) = self.next_line()? else {
                flushed += flush(&mut pending, &mut instances);
                break;
            };
            match ConllLine::parse(line_no, &raw)? {
                Some(line) => pending.push(&line, options, index)?,
                None => flushed += flush(&mut pending, &mut instances),
            }
        }

        if dropped > 0 {
            debug!("dropped {dropped} non-projective sentences");
        }
        info!("read {} instances from {flushed} sentences", instances.len());

        if options.shuffle {
            match options.shuffle_seed {
                Some(seed) => instances.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => instances.shuffle(&mut rand::rng()),
            }
        }
        Ok(instances)
    }

    /// Read every remaining sentence as raw tags and string-labelled arcs.
    ///
    /// No vocabulary is involved; head 0 is always labelled `ROOT`.
    pub fn read_trees(&mut self) -> Result<Vec<CompactTree>, CorpusError> {
        let mut trees = Vec::new();
        let mut current = CompactTree::default();
        while let Some((line_no, raw)) = self.next_line()? {
            let Some(line) = ConllLine::parse(line_no, &raw)? else {
                let tree = std::mem::take(&mut current);
                if !tree.is_empty() {
                    trees.push(tree);
                }
                continue;
            };
            let position = line.position()?;
            let head = line.head()?;
            let tag = line.pos();
            current.tags.push(tag.to_string());
            if !tag.is_empty() {
                let label = if head == 0 { ROOT_TOKEN } else { line.label() };
                current.arcs.insert(
                    position,
                    TreeArc {
                        head,
                        label: label.to_string(),
                    },
                );
            }
        }
        if !current.is_empty() {
            trees.push(current);
        }
        Ok(trees)
    }
}

/// Tokens and arcs accumulated since the last blank line.
#[derive(Debug)]
struct PendingSentence {
    tokens: Vec<Token>,
    arcs: Vec<(usize, GoldArc)>,
    update_weight: u32,
    language_id: String,
}

impl Default for PendingSentence {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            arcs: Vec::new(),
            update_weight: 1,
            language_id: String::new(),
        }
    }
}

impl PendingSentence {
    fn push(
        &mut self,
        line: &ConllLine<'_>,
        options: &ReadOptions,
        index: &VocabularyIndex,
    ) -> Result<(), CorpusError> {
        let position = line.position()?;
        let head = line.head()?;
        self.update_weight = line.update_weight();
        self.language_id = line.language_id().to_string();
        self.tokens.push(index.resolve_token(
            line.word(),
            line.lemma(),
            line.pos(),
            options.lowercased,
        ));
        if let Ok(head_position) = usize::try_from(head) {
            let label = index.gold_label_id(line.label(), head, options.labeled);
            self.arcs.push((
                position,
                GoldArc {
                    head: head_position,
                    label,
                },
            ));
        } else {
            debug!("line {}: token {position} has no head", line.line());
        }
        Ok(())
    }

    fn into_instance(self, placement: RootPlacement) -> TrainingInstance {
        let arcs = GoldArcs::from_arcs(self.arcs);
        let mut tokens = self.tokens;
        let arcs = match placement {
            RootPlacement::First => arcs,
            RootPlacement::Last => {
                let root_position = tokens.len() + 1;
                tokens.push(Token::root());
                arcs.relocate_root(root_position)
            }
        };
        TrainingInstance::new(
            tokens.into_iter().collect(),
            arcs,
            self.update_weight,
            self.language_id,
        )
    }
}
