//! Intent classification adapters.

mod keyword_classifier;

pub use keyword_classifier::KeywordIntentClassifier;
