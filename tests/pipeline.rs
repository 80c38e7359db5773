use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use char_skipgram::pipeline::utilities::{BEGIN_INDEX, END_INDEX, PAD_INDEX};
use char_skipgram::pipeline::{Batch, Pipeline, PipelineConfig, corpus_files};
use tempfile::TempDir;

const STORY: &str = "the cat sat on the mat\nthe dog sat on the log\na cat and a dog met on the mat\n";
const NEWS: &str = "the market rose today\nthe dog market fell\nthe cat ran to the market\n";

fn corpus() -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("story.txt"), STORY.repeat(4)).unwrap();
    fs::write(dir.path().join("news.txt"), NEWS.repeat(4) + "zebra\n").unwrap();
    fs::write(dir.path().join("numbers_01.txt"), "1 2 3\n").unwrap();
    let paths = corpus_files(dir.path()).unwrap();
    (dir, paths)
}

fn config(seed: u64) -> PipelineConfig {
    PipelineConfig::builder()
        .min_count(2)
        .window(2)
        .vocab_size(20)
        .neg_samples(3)
        .batch_size(8)
        .num_workers(2)
        .queue_depth(2)
        .subsample_threshold(1.0)
        .seed(seed)
        .timeouts(Duration::from_millis(200), Duration::from_secs(30))
        .build()
        .unwrap()
}

#[test]
fn test_corpus_files_are_sorted() {
    let (_dir, paths) = corpus();
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["news.txt", "numbers_01.txt", "story.txt"]);
}

#[test]
fn test_prepare_builds_vocabulary_and_archive() {
    let (_dir, paths) = corpus();
    let corpus = Pipeline::new(config(1)).prepare(&paths).unwrap();
    let utilities = corpus.utilities();

    assert!(utilities.words.contains("cat"));
    assert!(utilities.words.contains("market"));
    // seen once, below min_count
    assert!(!utilities.words.contains("zebra"));
    // numeric corpus counted min_count times
    assert_eq!(utilities.words.count("2"), Some(2));
    assert_eq!(utilities.chars.len(), 20);

    let keys: Vec<&str> = corpus.archive().keys().collect();
    assert_eq!(keys, vec!["news", "numbers_01", "story"]);
    assert!(corpus.archive().len() > 0);
}

#[test]
fn test_epoch_yields_full_padded_batches() {
    let (_dir, paths) = corpus();
    let mut corpus = Pipeline::new(config(2)).prepare(&paths).unwrap();
    let expected = corpus.batches_per_epoch();
    let dropped = corpus.archive().len() % 8;

    let mut stream = corpus.batches().unwrap();
    let batches: Vec<Batch> = (&mut stream).collect();
    let report = stream.finish().unwrap();

    assert_eq!(batches.len(), expected);
    assert_eq!(report.batches_sent, expected);
    assert_eq!(report.examples_dropped, dropped);
    for batch in &batches {
        let [rows, width] = batch.shape();
        assert_eq!(rows, 8 * (2 + 3));
        for row in batch.rows() {
            assert_eq!(row[0], BEGIN_INDEX);
            let end = row.iter().rposition(|&c| c == END_INDEX).unwrap();
            assert!(end < width);
            assert!(row[end + 1..].iter().all(|&c| c == PAD_INDEX));
        }
        assert!(batch.rows().any(|row| *row.last().unwrap() == END_INDEX));
    }
}

#[test]
fn test_negatives_never_repeat_the_center() {
    let (_dir, paths) = corpus();
    // room for every character, so distinct words never decode alike
    let mut config = config(3);
    config.vocab_size = 40;
    let mut corpus = Pipeline::new(config).prepare(&paths).unwrap();
    let chars = corpus.utilities().chars.clone();

    for batch in corpus.batches().unwrap() {
        let rows: Vec<&[u32]> = batch.rows().collect();
        for example in rows.chunks(2 + 3) {
            let center = chars.decode(example[0]).to_lowercase();
            for negative in &example[2..] {
                assert_ne!(chars.decode(negative), center);
            }
        }
    }
}

#[test]
fn test_same_seed_gives_same_batches() {
    let (_dir, paths) = corpus();
    let run = || {
        let mut corpus = Pipeline::new(config(9)).prepare(&paths).unwrap();
        corpus.batches().unwrap().collect::<Vec<Batch>>()
    };
    assert_eq!(run(), run());
}
