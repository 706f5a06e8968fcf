pub mod reader;

pub use conll_types::{CompactTree, GoldArc, GoldArcs, RootPlacement, Sentence, TrainingInstance};
pub use conll_vocab::{CorpusError, IndexConfig, VocabularyIndex};
pub use reader::{ConllReader, ReadOptions};
