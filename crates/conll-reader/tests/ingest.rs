use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use conll_reader::{
    ConllReader, CorpusError, IndexConfig, ReadOptions, RootPlacement, VocabularyIndex,
};
use conll_types::{ClusterDomain, ROOT_ID};

fn write_corpus(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// `count` three-token sentences, each with a distinct first word.
fn numbered_sentences(count: usize) -> String {
    let mut corpus = String::new();
    for n in 0..count {
        writeln!(corpus, "1\tword{n}\tword{n}\tNN\t_\ten\t2\tnsubj").unwrap();
        writeln!(corpus, "2\truns\trun\tVBZ\t_\ten\t0\troot").unwrap();
        writeln!(corpus, "3\tfast\tfast\tRB\t_\ten\t2\tadvmod").unwrap();
        corpus.push('\n');
    }
    corpus
}

fn build(path: &Path) -> VocabularyIndex {
    VocabularyIndex::build(&IndexConfig::new(path)).expect("build index")
}

#[test]
fn limit_caps_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(dir.path(), "train.conll", &numbered_sentences(10));
    let index = build(&path);

    let options = ReadOptions {
        limit: 3,
        ..ReadOptions::default()
    };
    let instances = ConllReader::open(&path)
        .unwrap()
        .read_instances(&options, &index)
        .unwrap();
    assert_eq!(instances.len(), 3);
    for (n, instance) in instances.iter().enumerate() {
        let word = index.word_id(&format!("word{n}"));
        assert_eq!(instance.sentence().words()[0], word);
    }

    let all = ConllReader::open(&path)
        .unwrap()
        .read_instances(&ReadOptions::default(), &index)
        .unwrap();
    assert_eq!(all.len(), 10);
}

#[test]
fn root_last_sentences_end_with_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(dir.path(), "train.conll", &numbered_sentences(4));
    let index = build(&path);

    let instances = ConllReader::open(&path)
        .unwrap()
        .read_instances(&ReadOptions::default(), &index)
        .unwrap();
    for instance in &instances {
        let sentence = instance.sentence();
        let last = sentence.len() - 1;
        assert_eq!(sentence.words()[last], ROOT_ID);
        assert_eq!(sentence.tags()[last], ROOT_ID);
        assert_eq!(sentence.lemmas()[last], "ROOT");
        assert_eq!(sentence.full_clusters(ClusterDomain::InDomain)[last], ROOT_ID);
        assert_eq!(instance.arcs().head(2), Some(sentence.len()));
        assert!(instance.arcs().iter().all(|(_, arc)| arc.head != 0));
    }
}

#[test]
fn index_and_reader_agree_on_ids() {
    let dir = tempfile::tempdir().unwrap();
    let train = write_corpus(dir.path(), "train.conll", &numbered_sentences(2));
    let dev = write_corpus(
        dir.path(),
        "dev.conll",
        "1\tword1\tword1\tNN\t_\ten\t2\tnsubj\n2\tsleeps\tsleep\tVBZ\t_\ten\t0\troot\n",
    );
    let index = build(&train);
    let options = ReadOptions {
        root_placement: RootPlacement::First,
        ..ReadOptions::default()
    };
    let instances = ConllReader::open(&dev)
        .unwrap()
        .read_instances(&options, &index)
        .unwrap();
    assert_eq!(instances.len(), 1);
    let sentence = instances[0].sentence();
    assert_eq!(sentence.words(), &[index.word_id("word1"), -1]);
    assert_eq!(sentence.tags(), &[index.pos_id("NN"), index.pos_id("VBZ")]);
    assert_eq!(instances[0].arcs().label(1), Some(index.label_id("nsubj")));
    assert_eq!(instances[0].arcs().label(2), Some(ROOT_ID));
}

#[test]
fn unlabeled_reading_uses_the_sentinel_label() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(dir.path(), "train.conll", &numbered_sentences(1));
    let mut config = IndexConfig::new(&path);
    config.labeled = false;
    let index = VocabularyIndex::build(&config).unwrap();

    let options = ReadOptions {
        labeled: false,
        ..ReadOptions::default()
    };
    let instances = ConllReader::open(&path)
        .unwrap()
        .read_instances(&options, &index)
        .unwrap();
    let arcs = instances[0].arcs();
    assert_eq!(arcs.label(1), Some(index.label_id("~")));
    assert_eq!(arcs.label(3), Some(index.label_id("~")));
    assert_eq!(arcs.label(2), Some(ROOT_ID));
}

#[test]
fn missing_input_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ConllReader::open(dir.path().join("missing.conll"));
    assert!(matches!(result, Err(CorpusError::Open { .. })));
}

#[test]
fn instances_read_in_parallel_share_one_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(dir.path(), "train.conll", &numbered_sentences(6));
    let index = Arc::new(build(&path));

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let index = Arc::clone(&index);
            let path = path.clone();
            std::thread::spawn(move || {
                ConllReader::open(&path)
                    .unwrap()
                    .read_instances(&ReadOptions::default(), &index)
                    .unwrap()
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.iter().all(|r| r.len() == 6));
    assert_eq!(results[0], results[1]);
}

#[test]
fn trees_need_no_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(dir.path(), "train.conll", &numbered_sentences(3));
    let trees = ConllReader::open(&path).unwrap().read_trees().unwrap();
    assert_eq!(trees.len(), 3);
    assert_eq!(trees[0].tags, vec!["NN", "VBZ", "RB"]);
    assert_eq!(trees[0].arcs[&2].label, "ROOT");
    assert_eq!(trees[0].arcs[&3].label, "advmod");
    assert!(!trees[0].is_non_projective());
}
