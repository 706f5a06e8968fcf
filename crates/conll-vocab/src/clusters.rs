use std::collections::HashMap;

use conll_types::{ClusterDomain, ClusterIds, NO_CLUSTER};

/// Brown-cluster maps for one clustering source.
///
/// Words map to the id of their full bitstring; full ids map to the ids of
/// their 4- and 6-character prefixes. All ids live in the vocabulary's
/// shared numbering space.
#[derive(Clone, Debug, Default)]
pub struct ClusterHierarchy {
    word_to_full: HashMap<String, i32>,
    full_to_prefix4: HashMap<i32, i32>,
    full_to_prefix6: HashMap<i32, i32>,
}

impl ClusterHierarchy {
    pub(crate) fn insert(&mut self, word: &str, full: i32, prefix4: i32, prefix6: i32) {
        self.word_to_full.insert(word.to_string(), full);
        self.full_to_prefix4.insert(full, prefix4);
        self.full_to_prefix6.insert(full, prefix6);
    }

    /// Cluster chain for `word`, with [`NO_CLUSTER`] for every missing level.
    ///
    /// A non-positive full id never keys the prefix maps.
    pub fn lookup(&self, word: &str) -> ClusterIds {
        let Some(&full) = self.word_to_full.get(word) else {
            return ClusterIds::NONE;
        };
        if full <= 0 {
            return ClusterIds {
                full,
                ..ClusterIds::NONE
            };
        }
        ClusterIds {
            full,
            prefix4: self.full_to_prefix4.get(&full).copied().unwrap_or(NO_CLUSTER),
            prefix6: self.full_to_prefix6.get(&full).copied().unwrap_or(NO_CLUSTER),
        }
    }

    /// Number of words with a cluster assignment.
    pub fn word_count(&self) -> usize {
        self.word_to_full.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_to_full.is_empty()
    }
}

/// One usable row of a Brown-cluster file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ClusterEntry<'a> {
    pub bits: &'a str,
    pub word: &'a str,
    pub prefix4: &'a str,
    pub prefix6: &'a str,
}

impl<'a> ClusterEntry<'a> {
    /// Parse `bits<TAB>word[<TAB>...]`, skipping rows with too few fields.
    pub fn parse(raw: &'a str, domain: ClusterDomain) -> Option<Self> {
        let fields: Vec<&str> = raw.trim().split('\t').collect();
        if fields.len() < min_fields(domain) {
            return None;
        }
        let bits = fields[0];
        Some(Self {
            bits,
            word: fields[1],
            prefix4: bit_prefix(bits, 4),
            prefix6: bit_prefix(bits, 6),
        })
    }
}

/// Minimum field count for a cluster row to be indexed.
///
/// In-domain files need a third column (usually the frequency); indices
/// built by earlier releases depend on that.
pub(crate) fn min_fields(domain: ClusterDomain) -> usize {
    match domain {
        ClusterDomain::OutOfDomain => 2,
        ClusterDomain::InDomain => 3,
    }
}

/// First `n` characters of a bitstring, or all of it when shorter.
pub(crate) fn bit_prefix(bits: &str, n: usize) -> &str {
    match bits.char_indices().nth(n) {
        Some((end, _)) => &bits[..end],
        None => bits,
    }
}
