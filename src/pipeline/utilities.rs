// src/pipeline/utilities.rs

use rustc_hash::FxHashMap as HashMap;

use crate::pipeline::counter::{CharCounts, WordCounts};
use crate::pipeline::PipelineConfig;

pub const PAD_INDEX: u32 = 0;
pub const BEGIN_INDEX: u32 = 1;
pub const END_INDEX: u32 = 2;
pub const BEGIN_MARKER: char = '{';
pub const END_MARKER: char = '}';

/// PAD, begin, end and UNK.
pub const RESERVED_SLOTS: usize = 4;

/// Filtered word -> count mapping. Words are held sorted so ids, and everything
/// derived from them, do not depend on hash order.
#[derive(Debug, Clone, Default)]
pub struct WordVocabulary {
    words: Vec<String>,
    counts: Vec<u64>,
    ids: HashMap<String, u32>,
    total_words: u64,
}

impl WordVocabulary {
    /// Keeps words seen at least `min_count` times and at most `max_word_len` chars long.
    pub fn from_counts(word_counts: &WordCounts, min_count: u64, max_word_len: usize) -> Self {
        let mut kept: Vec<(&String, u64)> = word_counts
            .iter()
            .filter(|(word, n)| *n >= min_count && word.chars().count() <= max_word_len)
            .collect();
        kept.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut vocab = WordVocabulary::default();
        for (id, (word, n)) in kept.into_iter().enumerate() {
            vocab.ids.insert(word.clone(), id as u32);
            vocab.words.push(word.clone());
            vocab.counts.push(n);
            vocab.total_words += n;
        }
        vocab
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn total_words(&self) -> u64 {
        self.total_words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.ids.contains_key(word)
    }

    pub fn id(&self, word: &str) -> Option<u32> {
        self.ids.get(word).copied()
    }

    pub fn word(&self, id: u32) -> &str {
        &self.words[id as usize]
    }

    pub fn count(&self, word: &str) -> Option<u64> {
        self.id(word).map(|id| self.counts[id as usize])
    }

    /// Share of the retained corpus taken by `word`.
    pub fn frequency(&self, word: &str) -> Option<f64> {
        if self.total_words == 0 {
            return None;
        }
        self.count(word).map(|n| n as f64 / self.total_words as f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.words.iter().map(String::as_str).zip(self.counts.iter().copied())
    }
}

/// char <-> index table used for encoding words.
///
/// Layout: `[PAD, '{', '}', top chars..., UNK]`.
#[derive(Debug, Clone)]
pub struct CharacterTable {
    char_to_index: HashMap<char, u32>,
    index_to_char: Vec<Option<char>>,
    unk: u32,
}

impl CharacterTable {
    /// Takes the `vocab_size - 4` most frequent characters. Equal counts keep the
    /// order in which the characters were first seen. The markers have fixed
    /// slots and are never picked again as regular characters.
    pub fn from_counts(char_counts: &CharCounts, vocab_size: usize) -> Self {
        let wanted = vocab_size.saturating_sub(RESERVED_SLOTS);
        let mut ranked: Vec<(char, u64)> = char_counts
            .iter()
            .filter(|(c, _)| **c != BEGIN_MARKER && **c != END_MARKER)
            .map(|(c, n)| (*c, n))
            .collect();
        // sort_by is stable, ties stay in first-occurrence order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let mut index_to_char = vec![None, Some(BEGIN_MARKER), Some(END_MARKER)];
        index_to_char.extend(ranked.into_iter().take(wanted).map(|(c, _)| Some(c)));
        let unk = index_to_char.len() as u32;
        index_to_char.push(None);

        let char_to_index = index_to_char
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|c| (c, i as u32)))
            .collect();

        Self {
            char_to_index,
            index_to_char,
            unk,
        }
    }

    /// Number of slots, reserved ones included.
    pub fn len(&self) -> usize {
        self.index_to_char.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_char.is_empty()
    }

    pub fn unk_index(&self) -> u32 {
        self.unk
    }

    pub fn index(&self, c: char) -> u32 {
        self.char_to_index.get(&c).copied().unwrap_or(self.unk)
    }

    pub fn char_at(&self, index: u32) -> Option<char> {
        self.index_to_char.get(index as usize).copied().flatten()
    }

    /// Inverse of encoding, for inspecting batches. PAD and the markers are
    /// dropped, UNK shows as U+FFFD.
    pub fn decode(&self, indices: &[u32]) -> String {
        indices
            .iter()
            .filter(|&&i| i != PAD_INDEX && i != BEGIN_INDEX && i != END_INDEX)
            .map(|&i| self.char_at(i).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

/// Noise distribution for negative sampling, stored as a flat multiset of word ids.
#[derive(Debug, Clone, Default)]
pub struct UnigramTable {
    entries: Vec<u32>,
}

impl UnigramTable {
    /// Each word gets `floor((count / total)^0.75 / z)` slots. Rare words can end
    /// up with none and are then never drawn.
    pub fn from_vocabulary(vocab: &WordVocabulary, z: f64) -> Self {
        let total = vocab.total_words() as f64;
        let mut entries = Vec::new();
        if total == 0.0 {
            return Self { entries };
        }
        for (id, (_, n)) in vocab.iter().enumerate() {
            let share = n as f64 / total;
            let slots = (share.powf(0.75) / z).floor() as usize;
            entries.extend(std::iter::repeat(id as u32).take(slots));
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, slot: usize) -> u32 {
        self.entries[slot]
    }

    pub fn slots_of(&self, id: u32) -> usize {
        self.entries.iter().filter(|&&e| e == id).count()
    }
}

/// Everything derived once from the corpus counters and shared read-only by
/// pair generation and batch assembly.
#[derive(Debug, Clone)]
pub struct Utilities {
    pub words: WordVocabulary,
    pub chars: CharacterTable,
    pub unigram: UnigramTable,
}

impl Utilities {
    pub fn derive(word_counts: &WordCounts, char_counts: &CharCounts, config: &PipelineConfig) -> Self {
        let chars = CharacterTable::from_counts(char_counts, config.vocab_size);
        let words = WordVocabulary::from_counts(word_counts, config.min_count, config.max_word_len);
        let unigram = UnigramTable::from_vocabulary(&words, config.unigram_z);
        tracing::info!(
            words = words.len(),
            total_words = words.total_words(),
            chars = chars.len(),
            unigram_slots = unigram.len(),
            "derived vocabulary utilities"
        );
        Self { words, chars, unigram }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_counts(pairs: &[(char, u64)]) -> CharCounts {
        let mut counts = CharCounts::new();
        for &(c, n) in pairs {
            counts.add(c, n);
        }
        counts
    }

    fn word_counts(pairs: &[(&str, u64)]) -> WordCounts {
        let mut counts = WordCounts::new();
        for &(w, n) in pairs {
            counts.add(w.to_string(), n);
        }
        counts
    }

    #[test]
    fn test_character_table_layout() {
        let counts = char_counts(&[
            ('{', 1),
            ('}', 1),
            ('c', 10),
            ('a', 100),
            ('b', 50),
            ('d', 9),
            ('e', 8),
            ('f', 7),
            ('g', 6),
            ('h', 5),
        ]);
        let table = CharacterTable::from_counts(&counts, 10);

        assert_eq!(table.len(), 10);
        assert_eq!(table.char_at(PAD_INDEX), None);
        assert_eq!(table.char_at(BEGIN_INDEX), Some('{'));
        assert_eq!(table.char_at(END_INDEX), Some('}'));
        let middle: Vec<char> = (3..9).map(|i| table.char_at(i).unwrap()).collect();
        assert_eq!(middle, vec!['a', 'b', 'c', 'd', 'e', 'f']);
        assert_eq!(table.unk_index(), 9);
        assert_eq!(table.index('h'), 9);
    }

    #[test]
    fn test_character_ties_keep_first_occurrence() {
        let counts = char_counts(&[('x', 3), ('m', 3), ('a', 3)]);
        let table = CharacterTable::from_counts(&counts, 6);
        assert_eq!(table.index('x'), 3);
        assert_eq!(table.index('m'), 4);
        assert_eq!(table.index('a'), table.unk_index());
    }

    #[test]
    fn test_markers_are_not_duplicated() {
        let counts = char_counts(&[('{', 500), ('}', 500), ('a', 1)]);
        let table = CharacterTable::from_counts(&counts, 5);
        assert_eq!(table.index('{'), BEGIN_INDEX);
        assert_eq!(table.index('}'), END_INDEX);
        assert_eq!(table.index('a'), 3);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_word_vocabulary_filters() {
        let long_word = "x".repeat(31);
        let ok_word = "y".repeat(30);
        let counts = word_counts(&[
            ("cat", 5),
            ("dog", 4),
            ("rare", 1),
            (long_word.as_str(), 10),
            (ok_word.as_str(), 3),
        ]);
        let vocab = WordVocabulary::from_counts(&counts, 3, 30);

        assert!(vocab.contains("cat"));
        assert!(vocab.contains("dog"));
        assert!(vocab.contains(&ok_word));
        assert!(!vocab.contains("rare"));
        assert!(!vocab.contains(&long_word));
        assert_eq!(vocab.total_words(), 12);
        assert_eq!(vocab.frequency("cat"), Some(5.0 / 12.0));
    }

    #[test]
    fn test_unigram_slots() {
        let counts = word_counts(&[("a", 90), ("b", 10)]);
        let vocab = WordVocabulary::from_counts(&counts, 1, 30);
        let table = UnigramTable::from_vocabulary(&vocab, 0.001);

        let a = vocab.id("a").unwrap();
        let b = vocab.id("b").unwrap();
        assert_eq!(table.slots_of(a), (0.9f64.powf(0.75) / 0.001).floor() as usize);
        assert_eq!(table.slots_of(b), (0.1f64.powf(0.75) / 0.001).floor() as usize);
        assert_eq!(table.len(), table.slots_of(a) + table.slots_of(b));
    }

    #[test]
    fn test_negligible_words_get_no_slots() {
        let counts = word_counts(&[("common", 100_000_000), ("once", 1)]);
        let vocab = WordVocabulary::from_counts(&counts, 1, 30);
        let table = UnigramTable::from_vocabulary(&vocab, 0.001);
        assert_eq!(table.slots_of(vocab.id("once").unwrap()), 0);
    }

    #[test]
    fn test_decode_skips_markers() {
        let counts = char_counts(&[('c', 3), ('a', 2), ('t', 1)]);
        let table = CharacterTable::from_counts(&counts, 6);
        let indices = vec![BEGIN_INDEX, table.index('c'), table.index('a'), table.index('z'), END_INDEX, PAD_INDEX];
        assert_eq!(table.decode(&indices), "ca\u{FFFD}");
    }
}
