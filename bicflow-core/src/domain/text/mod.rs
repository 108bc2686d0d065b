// bicflow-core/src/domain/text/mod.rs

pub mod lemmatizer;
pub mod normalizer;
pub mod stopwords;

pub use lemmatizer::{PartOfSpeech, lemmatize};
pub use normalizer::TextNormalizer;
pub use stopwords::ENGLISH_STOP_WORDS;
