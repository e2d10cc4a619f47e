//! Learning side of the recommender: per-item preference values updated by an
//! exponential-average reward rule, a bounded recent-selection history, and
//! the epsilon-greedy candidate selector built on both.

pub mod history;
pub mod preference;
pub mod selector;

pub use history::HistoryTracker;
pub use preference::PreferenceStore;
pub use selector::{CandidateSet, EpsilonGreedySelector, SelectionMode};
