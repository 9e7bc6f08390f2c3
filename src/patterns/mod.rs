// Pattern matching module
// Public interface for truth-seeking misinformation matching

mod library;
mod matcher;
mod scenarios;
mod synonyms;
mod types;

pub use library::{Rule, RuleLibrary};
pub use matcher::{normalize, TruthSeekingMatcher};
pub use scenarios::Scenario;
pub use synonyms::SynonymTable;
pub use types::{PatternMatch, PatternType};
