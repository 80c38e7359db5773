// src/pipeline/negative_sampler.rs

use rand::Rng;

use crate::pipeline::utilities::{UnigramTable, WordVocabulary};
use crate::pipeline::{Error, Result};

/// Draws noise words from the unigram table. The distribution is fixed once the
/// table is built.
pub struct NegativeSampler<'a> {
    table: &'a UnigramTable,
    words: &'a WordVocabulary,
    max_draws: usize,
}

impl<'a> NegativeSampler<'a> {
    pub fn new(table: &'a UnigramTable, words: &'a WordVocabulary, max_draws: usize) -> Self {
        Self {
            table,
            words,
            max_draws,
        }
    }

    /// `k` draws with replacement, none equal to the lower-cased `word`.
    ///
    /// Gives up with [`Error::NegativeSampling`] once `max_draws` draws were
    /// rejected, which happens when the table holds little else than `word`.
    pub fn sample<R: Rng + ?Sized>(&self, word: &str, k: usize, rng: &mut R) -> Result<Vec<&'a str>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        if self.table.is_empty() {
            return Err(Error::EmptyUnigramTable);
        }
        let excluded = self.words.id(&word.to_lowercase());
        let mut negatives = Vec::with_capacity(k);
        let mut rejected = 0usize;
        while negatives.len() < k {
            let id = self.table.get(rng.gen_range(0..self.table.len()));
            if Some(id) == excluded {
                rejected += 1;
                if rejected >= self.max_draws {
                    return Err(Error::NegativeSampling {
                        word: word.to_string(),
                        attempts: rejected,
                    });
                }
                continue;
            }
            negatives.push(self.words.word(id));
        }
        Ok(negatives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::counter::WordCounts;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn vocab(pairs: &[(&str, u64)]) -> (WordVocabulary, UnigramTable) {
        let mut counts = WordCounts::new();
        for &(w, n) in pairs {
            counts.add(w.to_string(), n);
        }
        let words = WordVocabulary::from_counts(&counts, 1, 30);
        let table = UnigramTable::from_vocabulary(&words, 0.001);
        (words, table)
    }

    #[test]
    fn test_excludes_word_case_insensitively() {
        let (words, table) = vocab(&[("cat", 50), ("dog", 30), ("sat", 20)]);
        let sampler = NegativeSampler::new(&table, &words, 10_000);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..200 {
            let negatives = sampler.sample("Cat", 5, &mut rng).unwrap();
            assert_eq!(negatives.len(), 5);
            assert!(negatives.iter().all(|n| *n != "cat"));
        }
    }

    #[test]
    fn test_two_word_table_only_yields_the_other_word() {
        let (words, table) = vocab(&[("yes", 10), ("no", 10)]);
        let sampler = NegativeSampler::new(&table, &words, 10_000);
        let mut rng = StdRng::seed_from_u64(9);
        let negatives = sampler.sample("yes", 8, &mut rng).unwrap();
        assert_eq!(negatives, vec!["no"; 8]);
    }

    #[test]
    fn test_degenerate_table_fails_instead_of_spinning() {
        let (words, table) = vocab(&[("only", 10)]);
        let sampler = NegativeSampler::new(&table, &words, 100);
        let mut rng = StdRng::seed_from_u64(1);
        let err = sampler.sample("only", 3, &mut rng).unwrap_err();
        assert!(matches!(err, Error::NegativeSampling { attempts: 100, .. }));
    }

    #[test]
    fn test_empty_table() {
        let words = WordVocabulary::default();
        let table = UnigramTable::default();
        let sampler = NegativeSampler::new(&table, &words, 10);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(sampler.sample("x", 1, &mut rng), Err(Error::EmptyUnigramTable)));
        assert!(sampler.sample("x", 0, &mut rng).unwrap().is_empty());
    }
}
