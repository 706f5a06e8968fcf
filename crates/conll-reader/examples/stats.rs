use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use conll_reader::ConllReader;

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p conll-reader --example stats -- <treebank.conll>")?;

    let trees = ConllReader::open(&path)?
        .read_trees()
        .with_context(|| format!("reading {}", path.display()))?;

    let mut token_count = 0usize;
    let mut non_projective = 0usize;
    let mut labels: BTreeMap<&str, usize> = BTreeMap::new();
    let mut tags: BTreeMap<&str, usize> = BTreeMap::new();

    for tree in &trees {
        token_count += tree.len();
        if tree.is_non_projective() {
            non_projective += 1;
        }
        for arc in tree.arcs.values() {
            *labels.entry(arc.label.as_str()).or_default() += 1;
        }
        for tag in &tree.tags {
            *tags.entry(tag.as_str()).or_default() += 1;
        }
    }

    println!("Treebank      : {}", path.display());
    println!("Sentences     : {}", trees.len());
    println!("Tokens        : {}", token_count);
    println!("Non-projective: {}", non_projective);
    println!("POS tags      : {}", tags.len());
    println!("Labels        : {}", labels.len());

    let mut by_count: Vec<_> = labels.into_iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (label, count) in by_count.iter().take(10) {
        println!("  {label:<12} {count}");
    }

    Ok(())
}
