//! One simulated learner: a grammar vector plus the consumption loop.
//!
//! `consume` runs the 13 triggers in canonical order against one sentence:
//! pure triggers come from the shared cache, state-dependent triggers are
//! evaluated live against this learner's own grammar. Each trigger's
//! adjustments are applied before the next trigger runs — later
//! state-dependent triggers read parameters that earlier triggers in the
//! same pass may have just moved, so reordering or batching would change
//! trajectories. `consume_live` evaluates everything live and must produce
//! bit-identical state; the parity tests hold the two paths together.

use crate::cache::{CacheError, TriggerCache};
use crate::grammar::{GrammarSnapshot, GrammarState, UpdateRule};
use crate::sentence::{GrammarId, Sentence};
use crate::triggers::{Adjustment, Pace, Purity, CANONICAL_ORDER};
use thiserror::Error;

/// Invalid learner configuration, surfaced before any trial work begins.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("aggressive learning rate {0} outside (0, 1]")]
    AggressiveRate(f64),
    #[error("conservative learning rate {0} outside [0, 1]")]
    ConservativeRate(f64),
}

/// Validate the two learning rates. The aggressive rate must move the
/// parameter (strictly positive); the conservative rate may be zero.
pub fn validate_rates(rate: f64, conservative_rate: f64) -> Result<(), ConfigError> {
    if !rate.is_finite() || rate <= 0.0 || rate > 1.0 {
        return Err(ConfigError::AggressiveRate(rate));
    }
    if !conservative_rate.is_finite() || !(0.0..=1.0).contains(&conservative_rate) {
        return Err(ConfigError::ConservativeRate(conservative_rate));
    }
    Ok(())
}

/// A learner acquiring one target grammar.
#[derive(Clone, Debug)]
pub struct Learner {
    grammar: GrammarState,
    rate: f64,
    conservative_rate: f64,
    target: GrammarId,
    update: UpdateRule,
    /// Reusable buffer for live rule evaluation; consumption runs millions
    /// of times per trial and must not allocate per sentence.
    scratch: Vec<Adjustment>,
}

impl Learner {
    pub fn new(rate: f64, conservative_rate: f64, target: GrammarId) -> Result<Self, ConfigError> {
        validate_rates(rate, conservative_rate)?;
        Ok(Learner {
            grammar: GrammarState::new(),
            rate,
            conservative_rate,
            target,
            update: UpdateRule::default(),
            scratch: Vec::with_capacity(8),
        })
    }

    /// Select the weight-update strategy (defaults to [`UpdateRule::Standard`]).
    pub fn with_update_rule(mut self, update: UpdateRule) -> Self {
        self.update = update;
        self
    }

    pub fn target(&self) -> GrammarId {
        self.target
    }

    pub fn grammar(&self) -> &GrammarState {
        &self.grammar
    }

    pub fn snapshot(&self) -> GrammarSnapshot {
        self.grammar.snapshot()
    }

    /// Consume one sentence using the shared cache for pure triggers.
    pub fn consume(&mut self, sentence: &Sentence, cache: &TriggerCache) -> Result<(), CacheError> {
        for trigger in CANONICAL_ORDER {
            match trigger.purity() {
                Purity::Pure => {
                    let list = cache.lookup(sentence.id(), trigger)?;
                    for adjustment in list {
                        self.apply(*adjustment);
                    }
                }
                Purity::StateDependent => self.evaluate_live(trigger, sentence),
            }
        }
        Ok(())
    }

    /// Consume one sentence evaluating every trigger live. Reference path
    /// for the cache/live equivalence property.
    pub fn consume_live(&mut self, sentence: &Sentence) {
        for trigger in CANONICAL_ORDER {
            self.evaluate_live(trigger, sentence);
        }
    }

    fn evaluate_live(&mut self, trigger: crate::triggers::Trigger, sentence: &Sentence) {
        self.scratch.clear();
        let mut scratch = std::mem::take(&mut self.scratch);
        trigger.evaluate(sentence, &self.grammar, &mut scratch);
        for adjustment in &scratch {
            self.apply(*adjustment);
        }
        self.scratch = scratch;
    }

    fn apply(&mut self, adjustment: Adjustment) {
        let rate = match adjustment.pace {
            Pace::Aggressive => self.rate,
            Pace::Conservative => self.conservative_rate,
        };
        self.grammar
            .apply(self.update, adjustment.param, adjustment.direction, rate);
    }
}
