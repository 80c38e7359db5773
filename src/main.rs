// main.rs
use std::env;
use std::path::PathBuf;

use char_skipgram::pipeline::{Pipeline, PipelineConfig, corpus_files};
use char_skipgram::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("char_skipgram=info")),
        )
        .init();

    // --- Configuration ---
    let corpus_dir = env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("corpus"));
    let config_path = PathBuf::from("pipeline.json");
    let config = if config_path.exists() {
        PipelineConfig::from_json_file(&config_path)?
    } else {
        PipelineConfig::builder().show_progress(true).build()?
    };

    // --- 1. Vocabulary and archive ---
    let paths = corpus_files(&corpus_dir)?;
    let mut corpus = Pipeline::new(config).prepare(&paths)?;

    // --- 2. One epoch of batches ---
    let mut stream = corpus.batches()?;
    let mut batches = 0usize;
    let mut widest = 0usize;
    for batch in &mut stream {
        let [_, width] = batch.shape();
        widest = widest.max(width);
        batches += 1;
    }
    let report = stream.finish()?;

    println!(
        "{} files, {} words, {} pairs, {} batches (widest row {}), {} examples dropped",
        paths.len(),
        corpus.utilities().words.len(),
        corpus.archive().len(),
        batches,
        widest,
        report.examples_dropped
    );
    Ok(())
}
