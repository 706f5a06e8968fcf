use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use conll_reader::{ConllReader, IndexConfig, ReadOptions, RootPlacement, VocabularyIndex};
use conll_types::ClusterDomain;

const DEFAULT_TRAIN: &str = "train.conll";

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("indexing {}", config.index.corpus.display());

    let start = Instant::now();
    let index = VocabularyIndex::build(&config.index)
        .with_context(|| format!("building index from {}", config.index.corpus.display()))?;
    info!("index built in {} ms", start.elapsed().as_millis());

    let read_start = Instant::now();
    let input = config.input.as_ref().unwrap_or(&config.index.corpus);
    let instances = ConllReader::open(input)?
        .read_instances(&config.read, &index)
        .with_context(|| format!("reading instances from {}", input.display()))?;
    info!("instances read in {} ms", read_start.elapsed().as_millis());

    let summary = Summary {
        input: input.display().to_string(),
        vocabulary: index.len(),
        labels: index.labels().len(),
        root_label: index.root_label().to_string(),
        cluster_words: index.cluster_word_count(ClusterDomain::OutOfDomain),
        in_domain_cluster_words: index.cluster_word_count(ClusterDomain::InDomain),
        languages: index.language_info_len(),
        instances: instances.len(),
        tokens: instances.iter().map(|i| i.sentence().len()).sum(),
        non_projective: instances.iter().filter(|i| i.is_non_projective()).count(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[derive(Debug, Serialize)]
struct Summary {
    input: String,
    vocabulary: usize,
    labels: usize,
    root_label: String,
    cluster_words: usize,
    in_domain_cluster_words: usize,
    languages: usize,
    instances: usize,
    tokens: usize,
    non_projective: usize,
}

#[derive(Debug, Clone)]
struct Config {
    index: IndexConfig,
    /// File to read instances from; defaults to the training file.
    input: Option<PathBuf>,
    read: ReadOptions,
}

fn load_config() -> Config {
    let mut index = IndexConfig::new(
        env::var("CONLL_TRAIN")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TRAIN)),
    );
    index.cluster_file = env::var("CONLL_CLUSTERS").ok().map(PathBuf::from);
    index.in_domain_cluster_file = env::var("CONLL_IN_DOMAIN_CLUSTERS").ok().map(PathBuf::from);
    index.language_info = env::var("CONLL_LANG_INFO").ok().map(PathBuf::from);

    let mut read = ReadOptions {
        limit: env::var("CONLL_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(usize::MAX),
        ..ReadOptions::default()
    };
    let mut input = env::var("CONLL_INPUT").ok().map(PathBuf::from);

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--unlabeled" => read.labeled = false,
            "--lowercase" => read.lowercased = true,
            "--root-first" => read.root_placement = RootPlacement::First,
            "--keep-non-projective" => read.keep_non_projective = true,
            "--shuffle" => read.shuffle = true,
            "--train" => {
                if let Some(path) = args.next() {
                    index.corpus = PathBuf::from(path);
                }
            }
            "--input" => input = args.next().map(PathBuf::from),
            _ => {
                if let Some(path) = arg.strip_prefix("--train=") {
                    index.corpus = PathBuf::from(path);
                } else if let Some(path) = arg.strip_prefix("--input=") {
                    input = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--clusters=") {
                    index.cluster_file = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--in-domain-clusters=") {
                    index.in_domain_cluster_file = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--lang-info=") {
                    index.language_info = Some(PathBuf::from(path));
                } else if let Some(limit) = arg.strip_prefix("--limit=") {
                    read.limit = limit.parse().unwrap_or(read.limit);
                } else if let Some(seed) = arg.strip_prefix("--seed=") {
                    read.shuffle_seed = seed.parse().ok();
                }
            }
        }
    }
    index.labeled = read.labeled;
    index.lowercased = read.lowercased;

    Config { index, input, read }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
}
