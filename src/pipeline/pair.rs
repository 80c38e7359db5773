// src/pipeline/pair.rs

/// A (center, context) co-occurrence, both words in their original casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    pub center: String,
    pub context: String,
}

impl Pair {
    pub fn new<S: Into<String>, T: Into<String>>(center: S, context: T) -> Self {
        Self {
            center: center.into(),
            context: context.into(),
        }
    }
}
