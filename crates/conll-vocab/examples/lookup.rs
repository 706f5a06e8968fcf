use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use conll_types::ClusterDomain;
use conll_vocab::{IndexConfig, VocabularyIndex};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let corpus = args
        .next()
        .map(PathBuf::from)
        .context("usage: cargo run -p conll-vocab --example lookup -- <train.conll> [clusters] [word...]")?;
    let mut config = IndexConfig::new(&corpus);
    config.cluster_file = args.next().map(PathBuf::from);

    let index = VocabularyIndex::build(&config)
        .with_context(|| format!("indexing {}", corpus.display()))?;

    println!("Treebank     : {}", corpus.display());
    println!("Vocabulary   : {}", index.len());
    println!("Labels       : {}", index.labels().len());
    println!("Root label   : {}", index.root_label());
    println!(
        "Cluster words: {}",
        index.cluster_word_count(ClusterDomain::OutOfDomain)
    );

    for word in args {
        let clusters = index.cluster_id(&word, ClusterDomain::OutOfDomain);
        println!(
            "{word:>12} id={} cluster={} prefix4={} prefix6={}",
            index.word_id(&word),
            clusters.full,
            clusters.prefix4,
            clusters.prefix6
        );
    }

    Ok(())
}
