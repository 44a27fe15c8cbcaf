#![deny(unsafe_code)]

//! Header alias detection and canonical mapping for herd spreadsheets.

pub mod corpus;
pub mod engine;
pub mod error;
pub mod fuzzy;
pub mod index;
pub mod inventory;
pub mod normalize;
pub mod patterns;
pub mod settings;
pub mod state;
pub mod transform;

pub use corpus::SuggestionCorpus;
pub use engine::{DetectOptions, DetectionEngine, FuzzyCandidate, MatchTrace};
pub use error::{MappingError, Result};
pub use fuzzy::similarity;
pub use index::{IndexedAlias, MatchIndex};
pub use inventory::{OccurrenceIndex, build_inventory};
pub use normalize::{clean_header_key, normalize_text};
pub use patterns::{SynonymPattern, build_synonym_patterns};
pub use settings::{
    ConfidenceLevel, ConfidenceThresholds, EXACT_SCORE, FUZZY_THRESHOLD, MatchSettings,
    REGEX_SCORE,
};
pub use state::{ReviewState, ReviewSummary, effective_canonical};
pub use transform::{
    MappingConflict, MappingOutcome, PreviewOptions, SkippedColumn, apply_mapping,
    apply_mapping_with, find_conflicts, mapped_columns, output_columns, preview,
};
