// src/pipeline/mod.rs

pub mod archive;
pub mod assembler;
pub mod batch;
pub mod config;
pub mod consumer;
pub mod corpus;
pub mod counter;
pub mod encoder;
pub mod negative_sampler;
pub mod pair;
pub mod parallelism;
pub mod pre_tokenizer;
pub mod progress;
pub mod result;
pub mod utilities;
pub mod vocab_builder;
pub mod windowed_pairs;

pub use archive::{ArchiveBuilder, ExampleArchive};
pub use assembler::{AssemblyReport, BatchAssembler};
pub use batch::Batch;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use consumer::BatchStream;
pub use corpus::{Pipeline, PreparedCorpus, corpus_files};
pub use counter::{CharCounts, Counter, WordCounts};
pub use encoder::{EncodedWord, encode_word};
pub use negative_sampler::NegativeSampler;
pub use pair::Pair;
pub use pre_tokenizer::{Tokenizer, WhitespaceTokenizer, WordTokenizer};
pub use result::{Error, Result};
pub use utilities::{CharacterTable, UnigramTable, Utilities, WordVocabulary};
pub use vocab_builder::VocabularyBuilder;
pub use windowed_pairs::WindowedPairs;
