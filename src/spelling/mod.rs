//! Spelling correction: edit distance, the word-frequency corpus, and the
//! "did you mean" suggestion service.

pub mod corpus;
pub mod did_you_mean;
pub mod levenshtein;

pub use self::corpus::{Corpus, tokenize};
pub use self::did_you_mean::SpellChecker;
pub use self::levenshtein::{levenshtein_distance, similarity};
