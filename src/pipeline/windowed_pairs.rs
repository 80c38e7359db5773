// src/pipeline/windowed_pairs.rs

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use rand::Rng;

use crate::pipeline::pair::Pair;
use crate::pipeline::pre_tokenizer::Tokenizer;
use crate::pipeline::utilities::WordVocabulary;
use crate::pipeline::Result;

/// Whether a word with corpus share `frequency` survives subsampling as a center.
///
/// The word is dropped when a uniform draw lands at or below
/// `1 - sqrt(threshold / frequency)`. Words rarer than `threshold` are always kept.
pub fn keep_as_center<R: Rng + ?Sized>(frequency: f64, threshold: f64, rng: &mut R) -> bool {
    let p_drop = 1.0 - (threshold / frequency).sqrt();
    rng.r#gen::<f64>() > p_drop
}

/// Pairs for one tokenized line.
///
/// Every in-vocabulary word that survives subsampling is paired with the
/// in-vocabulary words at offsets `[-window, window)` around it. Subsampling only
/// removes a word as a center, it can still show up as someone else's context.
pub fn pairs_in_line<R: Rng + ?Sized>(
    words: &[String],
    vocab: &WordVocabulary,
    window: usize,
    threshold: f64,
    rng: &mut R,
) -> Vec<Pair> {
    let mut pairs = Vec::new();
    let len = words.len() as isize;
    let window = window as isize;
    for (i, word) in words.iter().enumerate() {
        let Some(frequency) = vocab.frequency(&word.to_lowercase()) else {
            continue;
        };
        if !keep_as_center(frequency, threshold, rng) {
            continue;
        }
        let i = i as isize;
        for j in (i - window)..(i + window) {
            if j == i || j < 0 || j >= len {
                continue;
            }
            let context = &words[j as usize];
            if !vocab.contains(&context.to_lowercase()) {
                continue;
            }
            pairs.push(Pair::new(word.as_str(), context.as_str()));
        }
    }
    pairs
}

/// Lazy (center, context) pairs of one file, produced line by line.
///
/// Finite, single pass, and randomized by subsampling: two passes over the same
/// file give different pairs unless the same seeded rng is supplied. A read or
/// tokenize error is yielded once and ends the iterator.
pub struct WindowedPairs<'a, B, R> {
    lines: Lines<B>,
    pending: VecDeque<Pair>,
    vocab: &'a WordVocabulary,
    tokenizer: &'a dyn Tokenizer,
    window: usize,
    threshold: f64,
    rng: R,
    done: bool,
}

impl<'a, R: Rng> WindowedPairs<'a, BufReader<File>, R> {
    pub fn open<P: AsRef<Path>>(
        path: P,
        vocab: &'a WordVocabulary,
        tokenizer: &'a dyn Tokenizer,
        window: usize,
        threshold: f64,
        rng: R,
    ) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(Self::from_reader(reader, vocab, tokenizer, window, threshold, rng))
    }
}

impl<'a, B: BufRead, R: Rng> WindowedPairs<'a, B, R> {
    pub fn from_reader(
        reader: B,
        vocab: &'a WordVocabulary,
        tokenizer: &'a dyn Tokenizer,
        window: usize,
        threshold: f64,
        rng: R,
    ) -> Self {
        Self {
            lines: reader.lines(),
            pending: VecDeque::new(),
            vocab,
            tokenizer,
            window,
            threshold,
            rng,
            done: false,
        }
    }
}

impl<B: BufRead, R: Rng> Iterator for WindowedPairs<'_, B, R> {
    type Item = Result<Pair>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.pending.pop_front() {
                return Some(Ok(pair));
            }
            if self.done {
                return None;
            }
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.done = true;
                    return None;
                }
            };
            let words = match self.tokenizer.tokenize(&line) {
                Ok(words) => words,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            self.pending.extend(pairs_in_line(
                &words,
                self.vocab,
                self.window,
                self.threshold,
                &mut self.rng,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::counter::WordCounts;
    use crate::pipeline::pre_tokenizer::WordTokenizer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Cursor;

    fn vocab(words: &[&str]) -> WordVocabulary {
        let counts: WordCounts = words.iter().map(|w| w.to_string()).collect();
        WordVocabulary::from_counts(&counts, 1, 30)
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_center_pairs_with_neighbours() {
        let vocab = vocab(&["the", "cat", "sat"]);
        let mut rng = StdRng::seed_from_u64(0);
        // a threshold of 1.0 puts p_drop below zero for every word
        let pairs = pairs_in_line(&tokens("the cat sat"), &vocab, 2, 1.0, &mut rng);

        assert!(pairs.contains(&Pair::new("cat", "the")));
        assert!(pairs.contains(&Pair::new("cat", "sat")));
        assert!(pairs.iter().all(|p| p.center != p.context));
    }

    #[test]
    fn test_window_is_half_open() {
        let vocab = vocab(&["a", "b", "c", "d", "e"]);
        let mut rng = StdRng::seed_from_u64(0);
        let pairs = pairs_in_line(&tokens("a b c d e"), &vocab, 2, 1.0, &mut rng);
        let of_c: Vec<&str> = pairs
            .iter()
            .filter(|p| p.center == "c")
            .map(|p| p.context.as_str())
            .collect();
        // offsets -2, -1, +1; +2 falls outside [i - window, i + window)
        assert_eq!(of_c, vec!["a", "b", "d"]);
    }

    #[test]
    fn test_out_of_vocabulary_words_are_skipped_both_ways() {
        let vocab = vocab(&["the", "cat"]);
        let mut rng = StdRng::seed_from_u64(0);
        let pairs = pairs_in_line(&tokens("the zebra cat"), &vocab, 2, 1.0, &mut rng);
        assert!(pairs.iter().all(|p| p.center != "zebra" && p.context != "zebra"));
        // "the" sits at -2 from "cat", inside the window; the reverse is +2 and is not
        assert!(pairs.contains(&Pair::new("cat", "the")));
        assert!(!pairs.contains(&Pair::new("the", "cat")));
    }

    #[test]
    fn test_lookup_is_case_insensitive_but_casing_is_kept() {
        let vocab = vocab(&["the", "cat"]);
        let mut rng = StdRng::seed_from_u64(0);
        let pairs = pairs_in_line(&tokens("The Cat"), &vocab, 1, 1.0, &mut rng);
        assert_eq!(pairs, vec![Pair::new("Cat", "The")]);
    }

    #[test]
    fn test_frequent_words_get_subsampled_as_centers() {
        let mut counts = WordCounts::new();
        counts.add("the".to_string(), 1_000_000);
        counts.add("cat".to_string(), 1);
        let vocab = WordVocabulary::from_counts(&counts, 1, 30);
        let mut rng = StdRng::seed_from_u64(5);

        let mut the_centers = 0;
        for _ in 0..200 {
            let pairs = pairs_in_line(&tokens("the cat"), &vocab, 2, 1e-4, &mut rng);
            the_centers += pairs.iter().filter(|p| p.center == "the").count();
            // "cat" is rare, it always survives and still sees "the" as context
            assert!(pairs.contains(&Pair::new("cat", "the")));
        }
        // p_drop for "the" is about 0.99
        assert!(the_centers < 20, "the kept as center {the_centers} times");
    }

    #[test]
    fn test_iterator_walks_every_line() {
        let vocab = vocab(&["the", "cat", "sat", "dog", "ran"]);
        let tokenizer = WordTokenizer::new();
        let text = "the cat sat.\n\nthe dog ran\n";
        let pairs: Vec<Pair> = WindowedPairs::from_reader(
            Cursor::new(text),
            &vocab,
            &tokenizer,
            1,
            1.0,
            StdRng::seed_from_u64(1),
        )
        .collect::<Result<_>>()
        .unwrap();

        assert!(pairs.contains(&Pair::new("sat", "cat")));
        assert!(pairs.contains(&Pair::new("ran", "dog")));
        // lines are windowed independently
        assert!(!pairs.contains(&Pair::new("the", "sat")));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let vocab = vocab(&["a", "b", "c", "a", "a", "b"]);
        let tokenizer = WordTokenizer::new();
        let text = "a b c a b c a a b\nc b a\n";
        let run = |seed| {
            WindowedPairs::from_reader(Cursor::new(text), &vocab, &tokenizer, 2, 0.2, StdRng::seed_from_u64(seed))
                .collect::<Result<Vec<_>>>()
                .unwrap()
        };
        assert_eq!(run(42), run(42));
    }
}
