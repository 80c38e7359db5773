// src/pipeline/counter.rs

use std::hash::Hash;

use rustc_hash::FxHashMap as HashMap;

/// Frequency counter that remembers the order in which keys were first seen.
///
/// Merging appends unseen keys of `other` after the existing ones, so folding
/// per-file counters in file order gives a corpus-wide first-occurrence order.
/// That order is the tie-break for [`Counter::most_common`].
#[derive(Debug, Clone)]
pub struct Counter<K> {
    entries: Vec<(K, u64)>,
    index: HashMap<K, usize>,
}

pub type WordCounts = Counter<String>;
pub type CharCounts = Counter<char>;

impl<K> Default for Counter<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::default(),
        }
    }
}

impl<K: Hash + Eq + Clone> Counter<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K, n: u64) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += n,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, n));
            }
        }
    }

    pub fn update<I: IntoIterator<Item = K>>(&mut self, keys: I) {
        for key in keys {
            self.add(key, 1);
        }
    }

    pub fn merge(&mut self, other: Counter<K>) {
        for (key, n) in other.entries {
            self.add(key, n);
        }
    }

    pub fn get(&self, key: &K) -> u64 {
        self.index.get(key).map_or(0, |&slot| self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Keys with their counts, in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.entries.iter().map(|(k, n)| (k, *n))
    }

    /// The `n` highest counts. Equal counts keep first-occurrence order.
    pub fn most_common(&self, n: usize) -> Vec<(K, u64)> {
        let mut ranked: Vec<&(K, u64)> = self.entries.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(n).cloned().collect()
    }
}

impl<K: Hash + Eq + Clone> FromIterator<K> for Counter<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut counter = Counter::new();
        counter.update(iter);
        counter
    }
}
