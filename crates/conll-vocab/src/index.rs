use std::collections::HashMap;
use std::path::Path;

use conll_types::{
    ClusterDomain, ClusterIds, PLACEHOLDER, ROOT_TOKEN, RootPlacement, Sentence, Token,
    UNKNOWN_ID,
};
use tracing::info;

use crate::CorpusError;
use crate::clusters::ClusterHierarchy;
use crate::line::{normalize_label, normalize_word, open, read_line_lossy};

/// Finalized, read-only vocabulary shared by every sentence of a run.
///
/// Labels, POS tags, cluster bitstrings and word forms share one id space;
/// id 0 is the literal `ROOT`.
#[derive(Clone, Debug)]
pub struct VocabularyIndex {
    ids: HashMap<String, i32>,
    label_ordinals: HashMap<i32, i32>,
    root_label: String,
    reverse: Vec<String>,
    clusters: [ClusterHierarchy; 2],
    language_info: HashMap<String, Vec<String>>,
}

impl VocabularyIndex {
    pub(crate) fn from_parts(
        ids: HashMap<String, i32>,
        label_ordinals: HashMap<i32, i32>,
        root_label: String,
        clusters: [ClusterHierarchy; 2],
    ) -> Self {
        let mut reverse = vec![String::new(); ids.len()];
        for (text, &id) in &ids {
            if let Some(slot) = usize::try_from(id).ok().and_then(|i| reverse.get_mut(i)) {
                *slot = text.clone();
            }
        }
        Self {
            ids,
            label_ordinals,
            root_label,
            reverse,
            clusters,
            language_info: HashMap::new(),
        }
    }

    /// Attach per-language attributes read from a tab-separated file.
    ///
    /// Column 1 is the language id, columns 2.. its attributes; rows with
    /// fewer than three columns are skipped.
    pub fn with_language_info(mut self, path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let mut info_map = HashMap::new();
        let mut reader = open(path.as_ref())?;
        let mut buf = Vec::new();
        while let Some(line) = read_line_lossy(&mut reader, &mut buf)? {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                continue;
            }
            let attributes = fields[2..].iter().map(|f| f.trim().to_string()).collect();
            info_map.insert(fields[1].trim().to_string(), attributes);
        }
        info!("language entries: {}", info_map.len());
        self.language_info = info_map;
        Ok(self)
    }

    /// Raw id of any interned string.
    pub fn id(&self, text: &str) -> Option<i32> {
        self.ids.get(text).copied()
    }

    /// Word id; the `_` placeholder and unseen forms are [`UNKNOWN_ID`].
    pub fn word_id(&self, word: &str) -> i32 {
        if word == PLACEHOLDER {
            return UNKNOWN_ID;
        }
        self.id(word).unwrap_or(UNKNOWN_ID)
    }

    pub fn pos_id(&self, tag: &str) -> i32 {
        self.id(tag).unwrap_or(UNKNOWN_ID)
    }

    /// Id of an already normalized label string.
    pub fn label_id(&self, label: &str) -> i32 {
        self.id(label).unwrap_or(UNKNOWN_ID)
    }

    /// Label id for a gold arc, given the raw label column and head index.
    ///
    /// Head 0 always resolves through the literal `ROOT`; head -1 never
    /// carries a label.
    pub fn gold_label_id(&self, raw: &str, head: i32, labeled: bool) -> i32 {
        match head {
            -1 => UNKNOWN_ID,
            0 => self.label_id(ROOT_TOKEN),
            _ => self.label_id(normalize_label(raw, labeled)),
        }
    }

    /// Dense classifier ordinal of a label id.
    pub fn label_ordinal(&self, label_id: i32) -> Option<i32> {
        self.label_ordinals.get(&label_id).copied()
    }

    /// Label id → dense ordinal, ROOT included as `0 → 0`.
    pub fn labels(&self) -> &HashMap<i32, i32> {
        &self.label_ordinals
    }

    /// Raw label last seen on a head-0 line, `ROOT` when there was none.
    pub fn root_label(&self) -> &str {
        &self.root_label
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Id → original string; slot 0 is `ROOT`.
    pub fn reverse_words(&self) -> &[String] {
        &self.reverse
    }

    pub fn word_string(&self, id: i32) -> Option<&str> {
        let idx = usize::try_from(id).ok()?;
        self.reverse.get(idx).map(String::as_str)
    }

    pub fn cluster_id(&self, token: &str, domain: ClusterDomain) -> ClusterIds {
        self.clusters[domain.index()].lookup(token)
    }

    pub fn has_clusters(&self, domain: ClusterDomain) -> bool {
        !self.clusters[domain.index()].is_empty()
    }

    pub fn cluster_word_count(&self, domain: ClusterDomain) -> usize {
        self.clusters[domain.index()].word_count()
    }

    pub fn language_info(&self, language_id: &str) -> Option<&[String]> {
        self.language_info.get(language_id).map(Vec::as_slice)
    }

    pub fn language_info_len(&self) -> usize {
        self.language_info.len()
    }

    /// Resolve raw word, lemma and tag strings into a [`Token`].
    ///
    /// Out-of-domain clusters are keyed by lemma, in-domain clusters by the
    /// (possibly lowercased) word, which is also kept as the token's lemma.
    pub fn resolve_token(&self, word: &str, lemma: &str, tag: &str, lowercased: bool) -> Token {
        let word = normalize_word(word, lowercased);
        Token {
            word: self.word_id(&word),
            tag: self.pos_id(tag),
            clusters: self.cluster_id(lemma, ClusterDomain::OutOfDomain),
            in_domain_clusters: self.cluster_id(&word, ClusterDomain::InDomain),
            lemma: word.into_owned(),
        }
    }

    /// Build a sentence from parallel raw columns; empty words are skipped.
    pub fn make_sentence<S: AsRef<str>>(
        &self,
        words: &[S],
        lemmas: &[S],
        tags: &[S],
        placement: RootPlacement,
        lowercased: bool,
    ) -> Sentence {
        let tokens = words
            .iter()
            .zip(lemmas)
            .zip(tags)
            .map(|((word, lemma), tag)| (word.as_ref(), lemma.as_ref(), tag.as_ref()))
            .filter(|(word, _, _)| !word.is_empty())
            .map(|(word, lemma, tag)| self.resolve_token(word, lemma, tag, lowercased));
        match placement {
            RootPlacement::First => tokens.collect(),
            RootPlacement::Last => tokens.chain(std::iter::once(Token::root())).collect(),
        }
    }
}
