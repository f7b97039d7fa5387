//! Triggering Learning Algorithm engine over the CoLAG sentence domain.
//!
//! A simulated learner holds a 13-dimensional vector of graded grammatical
//! parameters (each a float in [0,1], starting at 0.5) and consumes sentences
//! one at a time. Per sentence, 13 trigger rules run in a fixed canonical
//! order; each rule inspects the sentence's structure and may nudge one or
//! more parameters toward 0 or 1 at an aggressive or conservative rate.
//!
//! Ten of the thirteen rules are pure functions of the sentence alone, so
//! their adjustment lists are precomputed once per distinct sentence into a
//! shared read-only [`cache::TriggerCache`]. The three rules that read the
//! learner's current parameter values are always evaluated live. A cached
//! learner and a fully-live learner produce bit-identical trajectories —
//! this equivalence is the central correctness property of the engine and is
//! exercised by the parity tests.
//!
//! Trials are fully independent: each worker owns its learner state and
//! shares only the read-only domain and trigger cache.

pub mod cache;
pub mod domain;
pub mod grammar;
pub mod learner;
pub mod sentence;
pub mod simulation;
pub mod triggers;

pub use cache::{CacheError, TriggerCache};
pub use domain::{ColagDomain, DomainError};
pub use grammar::{Direction, GrammarSnapshot, GrammarState, Param, UpdateRule};
pub use learner::{ConfigError, Learner};
pub use sentence::{GrammarId, Illocution, Sentence, SentenceId};
pub use simulation::{ExperimentParams, SimulationError, TrialParams, TrialResult};
pub use triggers::{Adjustment, Pace, Purity, Trigger, CANONICAL_ORDER};
