//! Precomputed adjustment lists for the pure trigger rules.
//!
//! Built once from the full sentence universe before any trial starts, then
//! shared read-only by every learner in every worker. For each distinct
//! sentence the cache stores the ordered adjustment list each pure rule
//! emits (possibly empty); consuming a cached sentence then skips
//! re-evaluating those ten rules entirely. The three state-dependent rules
//! are never cached — looking one up is a contract violation and fails
//! loudly rather than silently returning an empty list, which would corrupt
//! trial results.
//!
//! Precompute is idempotent: the rules are deterministic functions of the
//! sentence, so re-running it reproduces identical lists.

use crate::grammar::GrammarState;
use crate::sentence::{Sentence, SentenceId};
use crate::triggers::{Adjustment, Purity, Trigger, CANONICAL_ORDER};
use std::collections::HashMap;
use thiserror::Error;

/// Contract violations on cache lookup. Both indicate a programming error in
/// the caller, not a recoverable runtime condition.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("sentence {0} was consumed before being precomputed")]
    MissingSentence(SentenceId),
    #[error("trigger {} is state-dependent and must be evaluated live, never cached", .0.name())]
    StateDependentLookup(Trigger),
}

/// Per-sentence adjustment lists, indexed by trigger. Slots for the three
/// state-dependent triggers stay empty and are unreachable through lookup.
#[derive(Clone, Debug, PartialEq)]
struct CachedTriggers {
    lists: [Vec<Adjustment>; Trigger::COUNT],
}

/// Shared read-only memoization of the ten pure trigger rules.
#[derive(Clone, Debug, Default)]
pub struct TriggerCache {
    entries: HashMap<SentenceId, CachedTriggers>,
}

impl TriggerCache {
    pub fn new() -> Self {
        TriggerCache {
            entries: HashMap::new(),
        }
    }

    /// Evaluate every pure trigger against `sentence` and record the emitted
    /// lists. Idempotent; re-running replaces the entry with identical data.
    pub fn precompute(&mut self, sentence: &Sentence) {
        // Pure rules never read the grammar; a fresh neutral state makes
        // that explicit and keeps the entry independent of any learner.
        let neutral = GrammarState::new();
        let mut lists: [Vec<Adjustment>; Trigger::COUNT] =
            std::array::from_fn(|_| Vec::new());
        for trigger in CANONICAL_ORDER {
            if trigger.purity() == Purity::Pure {
                trigger.evaluate(sentence, &neutral, &mut lists[trigger.index()]);
            }
        }
        self.entries.insert(sentence.id(), CachedTriggers { lists });
    }

    /// Precompute every sentence of an iterator (typically the full domain).
    pub fn precompute_all<'a, I>(&mut self, sentences: I)
    where
        I: IntoIterator<Item = &'a Sentence>,
    {
        let before = self.entries.len();
        for sentence in sentences {
            self.precompute(sentence);
        }
        tracing::info!(
            sentences = self.entries.len() - before,
            total = self.entries.len(),
            "precomputed pure trigger lists"
        );
    }

    /// The recorded adjustment list for a pure trigger on a precomputed
    /// sentence. Errors on state-dependent triggers and on sentences that
    /// were never precomputed.
    pub fn lookup(
        &self,
        sentence_id: SentenceId,
        trigger: Trigger,
    ) -> Result<&[Adjustment], CacheError> {
        if trigger.purity() == Purity::StateDependent {
            return Err(CacheError::StateDependentLookup(trigger));
        }
        let entry = self
            .entries
            .get(&sentence_id)
            .ok_or(CacheError::MissingSentence(sentence_id))?;
        Ok(&entry.lists[trigger.index()])
    }

    pub fn contains(&self, sentence_id: SentenceId) -> bool {
        self.entries.contains_key(&sentence_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
