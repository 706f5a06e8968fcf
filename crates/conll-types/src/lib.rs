//! Shared types for turning CoNLL dependency treebanks into parser input.
//!
//! Every id-bearing field uses one integer space: the vocabulary index hands
//! out dense ids starting at 1, and a small closed set of [`Reserved`] values
//! marks the synthetic ROOT, unknown entries, and words without a Brown
//! cluster. Sentences are immutable once built; gold arcs are keyed by the
//! 1-based dependent position exactly as written in the treebank.
//!
//! Use [`Sentence`] and [`GoldArcs`] to describe one training sentence,
//! [`TrainingInstance`] to carry it to a learner, and [`CompactTree`] for
//! vocabulary-free structural inspection.
//!
//! ```rust
//! use conll_types::{GoldArc, GoldArcs, Reserved};
//!
//! let crossing = GoldArcs::from_arcs([
//!     (1, GoldArc { head: 3, label: 4 }),
//!     (2, GoldArc { head: 4, label: 4 }),
//! ]);
//! assert!(crossing.is_non_projective());
//! assert_eq!(Reserved::NoCluster.id(), -100);
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Literal string bound to id 0: the synthetic ROOT token and ROOT label.
pub const ROOT_TOKEN: &str = "ROOT";
/// Treebank placeholder for a missing word form or label.
pub const PLACEHOLDER: &str = "_";
/// Label every arc collapses to when training unlabeled.
pub const UNLABELED: &str = "~";
/// Replacement for a `_` label column.
pub const EMPTY_LABEL: &str = "-";

/// Reserved integer values shared by every id-bearing field.
///
/// Ordinary vocabulary ids are always `>= 1`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Reserved {
    /// The synthetic ROOT token, its POS tag, and the ROOT dependency label.
    Root,
    /// Word, tag or label absent from the vocabulary (or the `_` placeholder).
    Unknown,
    /// Word without a Brown-cluster assignment.
    NoCluster,
}

impl Reserved {
    pub const fn id(self) -> i32 {
        match self {
            Reserved::Root => 0,
            Reserved::Unknown => -1,
            Reserved::NoCluster => -100,
        }
    }
}

pub const ROOT_ID: i32 = Reserved::Root.id();
pub const UNKNOWN_ID: i32 = Reserved::Unknown.id();
pub const NO_CLUSTER: i32 = Reserved::NoCluster.id();

/// Which Brown-clustering source a cluster id came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ClusterDomain {
    OutOfDomain,
    InDomain,
}

impl ClusterDomain {
    pub const ALL: [ClusterDomain; 2] = [ClusterDomain::OutOfDomain, ClusterDomain::InDomain];

    /// Slot used by per-domain arrays.
    pub fn index(self) -> usize {
        match self {
            ClusterDomain::OutOfDomain => 0,
            ClusterDomain::InDomain => 1,
        }
    }
}

impl fmt::Display for ClusterDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClusterDomain::OutOfDomain => "out-of-domain",
            ClusterDomain::InDomain => "in-domain",
        })
    }
}

/// Full-bitstring, 4-bit-prefix and 6-bit-prefix cluster ids of one word.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ClusterIds {
    pub full: i32,
    pub prefix4: i32,
    pub prefix6: i32,
}

impl ClusterIds {
    /// No cluster assignment at any level.
    pub const NONE: ClusterIds = ClusterIds {
        full: NO_CLUSTER,
        prefix4: NO_CLUSTER,
        prefix6: NO_CLUSTER,
    };

    /// Cluster ids carried by the synthetic ROOT token.
    pub const ROOT: ClusterIds = ClusterIds {
        full: ROOT_ID,
        prefix4: ROOT_ID,
        prefix6: ROOT_ID,
    };
}

/// Where the synthetic ROOT token sits in a sentence.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum RootPlacement {
    /// ROOT is the implicit position 0; nothing is appended.
    First,
    /// ROOT is appended after the last real token and head-0 arcs point at it.
    #[default]
    Last,
}

/// One resolved token, ready to be appended to a [`Sentence`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub word: i32,
    pub lemma: String,
    pub tag: i32,
    pub clusters: ClusterIds,
    pub in_domain_clusters: ClusterIds,
}

impl Token {
    /// The synthetic ROOT token appended under [`RootPlacement::Last`].
    pub fn root() -> Self {
        Self {
            word: ROOT_ID,
            lemma: ROOT_TOKEN.to_string(),
            tag: ROOT_ID,
            clusters: ClusterIds::ROOT,
            in_domain_clusters: ClusterIds::ROOT,
        }
    }
}

/// Immutable column-oriented view of a sentence's tokens.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Sentence {
    words: Vec<i32>,
    lemmas: Vec<String>,
    tags: Vec<i32>,
    full: [Vec<i32>; 2],
    prefix4: [Vec<i32>; 2],
    prefix6: [Vec<i32>; 2],
}

impl Sentence {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[i32] {
        &self.words
    }

    pub fn lemmas(&self) -> &[String] {
        &self.lemmas
    }

    pub fn tags(&self) -> &[i32] {
        &self.tags
    }

    /// POS tag at a 1-based position; position 0 is the ROOT tag.
    ///
    /// Positions past the end resolve to [`UNKNOWN_ID`].
    pub fn pos_at(&self, position: usize) -> i32 {
        if position == 0 {
            return ROOT_ID;
        }
        self.tags.get(position - 1).copied().unwrap_or(UNKNOWN_ID)
    }

    pub fn full_clusters(&self, domain: ClusterDomain) -> &[i32] {
        &self.full[domain.index()]
    }

    pub fn prefix4_clusters(&self, domain: ClusterDomain) -> &[i32] {
        &self.prefix4[domain.index()]
    }

    pub fn prefix6_clusters(&self, domain: ClusterDomain) -> &[i32] {
        &self.prefix6[domain.index()]
    }

    fn push(&mut self, token: Token) {
        self.words.push(token.word);
        self.lemmas.push(token.lemma);
        self.tags.push(token.tag);
        for (domain, ids) in [
            (ClusterDomain::OutOfDomain, token.clusters),
            (ClusterDomain::InDomain, token.in_domain_clusters),
        ] {
            let slot = domain.index();
            self.full[slot].push(ids.full);
            self.prefix4[slot].push(ids.prefix4);
            self.prefix6[slot].push(ids.prefix6);
        }
    }
}

impl FromIterator<Token> for Sentence {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut sentence = Sentence::default();
        for token in iter {
            sentence.push(token);
        }
        sentence
    }
}

/// Gold head position and label id of one dependent.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct GoldArc {
    pub head: usize,
    pub label: i32,
}

/// Gold arcs keyed by 1-based dependent position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GoldArcs {
    arcs: BTreeMap<usize, GoldArc>,
}

impl GoldArcs {
    pub fn from_arcs(arcs: impl IntoIterator<Item = (usize, GoldArc)>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Copy of this set with every head-0 arc pointing at `root_position`.
    pub fn relocate_root(&self, root_position: usize) -> Self {
        Self::from_arcs(self.arcs.iter().map(|(&dep, &arc)| {
            let head = if arc.head == 0 { root_position } else { arc.head };
            (dep, GoldArc { head, ..arc })
        }))
    }

    pub fn get(&self, dependent: usize) -> Option<GoldArc> {
        self.arcs.get(&dependent).copied()
    }

    pub fn head(&self, dependent: usize) -> Option<usize> {
        self.get(dependent).map(|arc| arc.head)
    }

    pub fn label(&self, dependent: usize) -> Option<i32> {
        self.get(dependent).map(|arc| arc.label)
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, GoldArc)> + '_ {
        self.arcs.iter().map(|(&dep, &arc)| (dep, arc))
    }

    /// True when two arcs cross with tokens laid out in positional order.
    pub fn is_non_projective(&self) -> bool {
        has_crossing(self.arcs.iter().map(|(&dep, arc)| (dep, arc.head)))
    }
}

/// One treebank sentence with its supervision, ready for a learner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrainingInstance {
    sentence: Sentence,
    arcs: GoldArcs,
    update_weight: u32,
    language_id: String,
}

impl TrainingInstance {
    pub fn new(sentence: Sentence, arcs: GoldArcs, update_weight: u32, language_id: String) -> Self {
        Self {
            sentence,
            arcs,
            update_weight,
            language_id,
        }
    }

    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    pub fn arcs(&self) -> &GoldArcs {
        &self.arcs
    }

    pub fn update_weight(&self) -> u32 {
        self.update_weight
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn is_non_projective(&self) -> bool {
        self.arcs.is_non_projective()
    }
}

/// Head and raw label string of one dependent in a [`CompactTree`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeArc {
    pub head: i32,
    pub label: String,
}

/// Vocabulary-free sentence structure: raw POS tags plus string-labelled arcs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CompactTree {
    pub tags: Vec<String>,
    pub arcs: BTreeMap<usize, TreeArc>,
}

impl CompactTree {
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Crossing test over arcs with a real head (`head >= 0`).
    pub fn is_non_projective(&self) -> bool {
        has_crossing(self.arcs.iter().filter_map(|(&dep, arc)| {
            usize::try_from(arc.head).ok().map(|head| (dep, head))
        }))
    }
}

fn has_crossing(arcs: impl Iterator<Item = (usize, usize)>) -> bool {
    let spans: Vec<(usize, usize)> = arcs
        .map(|(dep, head)| (dep.min(head), dep.max(head)))
        .collect();
    for (i, &(l1, r1)) in spans.iter().enumerate() {
        for &(l2, r2) in &spans[i + 1..] {
            if (l1 < l2 && l2 < r1 && r1 < r2) || (l2 < l1 && l1 < r2 && r2 < r1) {
                return true;
            }
        }
    }
    false
}
