//! Trial and experiment orchestration.
//!
//! A trial is one learner consuming a seeded random sentence stream from its
//! target language, with out-of-language noise mixed in at a fixed
//! probability. An experiment expands a (language x noise-level x learner)
//! grid into independent trials and runs them on the rayon pool. Workers
//! share only the read-only domain and trigger cache; every trial owns its
//! own learner and its own seeded generator, so results are reproducible
//! regardless of scheduling order.

use crate::cache::{CacheError, TriggerCache};
use crate::domain::{ColagDomain, DomainError};
use crate::grammar::{GrammarSnapshot, UpdateRule};
use crate::learner::{validate_rates, ConfigError, Learner};
use crate::sentence::GrammarId;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// The four reference languages of the CoLAG domain.
pub const ENGLISH: GrammarId = 611;
pub const FRENCH: GrammarId = 584;
pub const GERMAN: GrammarId = 2253;
pub const JAPANESE: GrammarId = 3856;

// Odd constant (2^64 / phi) used to spread per-trial seeds.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("noise level {0} outside [0, 1]")]
    NoiseLevel(f64),
}

/// Everything one trial needs, resolved ahead of time so the result record
/// is self-describing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialParams {
    pub language: GrammarId,
    pub noise: f64,
    pub rate: f64,
    pub conservative_rate: f64,
    pub num_sentences: u32,
    pub update_rule: UpdateRule,
    pub seed: u64,
}

impl TrialParams {
    /// Reject bad parameters before any consumption starts; a trial must
    /// never fail halfway through for a reason knowable up front.
    pub fn validate(&self, domain: &ColagDomain) -> Result<(), SimulationError> {
        validate_rates(self.rate, self.conservative_rate)?;
        if !self.noise.is_finite() || !(0.0..=1.0).contains(&self.noise) {
            return Err(SimulationError::NoiseLevel(self.noise));
        }
        if !domain.contains_language(self.language) {
            return Err(DomainError::UnknownGrammar(self.language).into());
        }
        if self.noise > 0.0 && domain.language_len(self.language)? >= domain.len() {
            return Err(DomainError::EmptyNoiseDomain(self.language).into());
        }
        Ok(())
    }
}

/// Outcome of one trial: the final grammar vector plus provenance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialResult {
    pub params: TrialParams,
    pub grammar: GrammarSnapshot,
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
}

/// Run one learner to completion over a seeded sentence stream.
pub fn run_trial(
    domain: &ColagDomain,
    cache: &TriggerCache,
    params: &TrialParams,
) -> Result<TrialResult, SimulationError> {
    params.validate(domain)?;
    let timestamp = Utc::now();
    let start = Instant::now();

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut learner = Learner::new(params.rate, params.conservative_rate, params.language)?
        .with_update_rule(params.update_rule);

    for _ in 0..params.num_sentences {
        // The noise draw happens on every sentence, noise level zero
        // included, so trajectories at different noise levels share one
        // stream shape.
        let sentence = if rng.random::<f64>() < params.noise {
            domain.sample_not_in(params.language, &mut rng)?
        } else {
            domain.sample_in(params.language, &mut rng)?
        };
        learner.consume(sentence, cache)?;
    }

    let duration = start.elapsed();
    tracing::debug!(
        language = params.language,
        noise = params.noise,
        seed = params.seed,
        elapsed_ms = duration.as_millis() as u64,
        "trial finished"
    );
    Ok(TrialResult {
        params: *params,
        grammar: learner.snapshot(),
        timestamp,
        duration,
    })
}

/// The full experiment grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParams {
    pub languages: Vec<GrammarId>,
    pub noise_levels: Vec<f64>,
    pub rate: f64,
    pub conservative_rate: f64,
    pub num_sentences: u32,
    pub learners_per_cell: u32,
    pub update_rule: UpdateRule,
    pub base_seed: u64,
}

impl Default for ExperimentParams {
    /// The canonical noise experiment: four reference languages, five noise
    /// levels, 100 learners per cell, 500k sentences each.
    fn default() -> Self {
        ExperimentParams {
            languages: vec![ENGLISH, FRENCH, GERMAN, JAPANESE],
            noise_levels: vec![0.0, 0.05, 0.10, 0.25, 0.50],
            rate: 0.9,
            conservative_rate: 0.0005,
            num_sentences: 500_000,
            learners_per_cell: 100,
            update_rule: UpdateRule::Standard,
            base_seed: 0,
        }
    }
}

impl ExperimentParams {
    /// Expand the grid into per-trial parameter sets. Seeds are derived from
    /// the base seed by trial index, so the expansion is deterministic and
    /// independent of how the pool later schedules the work.
    pub fn trials(&self) -> Vec<TrialParams> {
        let mut out =
            Vec::with_capacity(self.languages.len() * self.noise_levels.len() * self.learners_per_cell as usize);
        let mut index = 0u64;
        for &language in &self.languages {
            for &noise in &self.noise_levels {
                for _ in 0..self.learners_per_cell {
                    out.push(TrialParams {
                        language,
                        noise,
                        rate: self.rate,
                        conservative_rate: self.conservative_rate,
                        num_sentences: self.num_sentences,
                        update_rule: self.update_rule,
                        seed: self.base_seed.wrapping_add(index.wrapping_mul(SEED_STRIDE)),
                    });
                    index += 1;
                }
            }
        }
        out
    }

    /// Validate every cell of the grid against the loaded domain.
    pub fn validate(&self, domain: &ColagDomain) -> Result<(), SimulationError> {
        validate_rates(self.rate, self.conservative_rate)?;
        for &noise in &self.noise_levels {
            if !noise.is_finite() || !(0.0..=1.0).contains(&noise) {
                return Err(SimulationError::NoiseLevel(noise));
            }
        }
        for &language in &self.languages {
            if !domain.contains_language(language) {
                return Err(DomainError::UnknownGrammar(language).into());
            }
            if self.noise_levels.iter().any(|&n| n > 0.0)
                && domain.language_len(language)? >= domain.len()
            {
                return Err(DomainError::EmptyNoiseDomain(language).into());
            }
        }
        Ok(())
    }
}

/// Run the whole grid on the rayon pool.
///
/// The outer `Result` covers up-front validation; per-trial failures come
/// back in-place so one bad trial neither aborts nor corrupts its siblings.
pub fn run_experiment(
    domain: &ColagDomain,
    cache: &TriggerCache,
    params: &ExperimentParams,
) -> Result<Vec<Result<TrialResult, SimulationError>>, SimulationError> {
    params.validate(domain)?;
    let trials = params.trials();
    tracing::info!(
        trials = trials.len(),
        languages = params.languages.len(),
        noise_levels = params.noise_levels.len(),
        "starting experiment"
    );
    let start = Instant::now();

    let results: Vec<Result<TrialResult, SimulationError>> = trials
        .into_par_iter()
        .map(|trial| run_trial(domain, cache, &trial))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(
        completed = results.len() - failed,
        failed,
        elapsed_s = start.elapsed().as_secs(),
        "experiment finished"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FIXTURE: &str = "\
0100110 DEC\tS Verb O1\t(IP (S)(VP (Verb)(O1))) 611 10 100
0100110 Q\tAux S Verb O1\t(CP (Aux)(IP (S)(VP (Verb)(O1)))) 611 11 101
0100110 Q\tAux S Verb O1[+WH]\t(CP (Aux)(IP (S)(VP (Verb)(O1)))) 611 12 102
0100110 DEC\tS Aux Verb O1\t(IP (S)(Aux)(VP (Verb)(O1))) 611 13 103
1011001 DEC\tO1 Verb S\t(IP (VP (O1)(Verb))(S)) 3856 14 104
1011001 Q\tS Verb O1 ka\t(CP (IP (S)(VP (Verb)(O1)))(ka)) 3856 15 105
";

    fn fixture() -> (ColagDomain, TriggerCache) {
        let domain = ColagDomain::from_reader(Cursor::new(FIXTURE)).unwrap();
        let mut cache = TriggerCache::new();
        cache.precompute_all(domain.sentences());
        (domain, cache)
    }

    fn trial_params(seed: u64) -> TrialParams {
        TrialParams {
            language: ENGLISH,
            noise: 0.1,
            rate: 0.9,
            conservative_rate: 0.0005,
            num_sentences: 200,
            update_rule: UpdateRule::Standard,
            seed,
        }
    }

    #[test]
    fn test_trial_deterministic_for_seed() {
        let (domain, cache) = fixture();
        let a = run_trial(&domain, &cache, &trial_params(42)).unwrap();
        let b = run_trial(&domain, &cache, &trial_params(42)).unwrap();
        assert_eq!(a.grammar, b.grammar);
    }

    #[test]
    fn test_trial_output_in_range() {
        let (domain, cache) = fixture();
        let result = run_trial(&domain, &cache, &trial_params(1)).unwrap();
        let snap = serde_json::to_value(&result.grammar).unwrap();
        for (name, value) in snap.as_object().unwrap() {
            let v = value.as_f64().unwrap();
            assert!((0.0..=1.0).contains(&v), "{name} left [0,1]: {v}");
        }
    }

    #[test]
    fn test_trial_rejects_unknown_language() {
        let (domain, cache) = fixture();
        let mut params = trial_params(1);
        params.language = 999;
        assert!(matches!(
            run_trial(&domain, &cache, &params),
            Err(SimulationError::Domain(DomainError::UnknownGrammar(999)))
        ));
    }

    #[test]
    fn test_trial_rejects_bad_noise() {
        let (domain, cache) = fixture();
        let mut params = trial_params(1);
        params.noise = 1.5;
        assert!(matches!(
            run_trial(&domain, &cache, &params),
            Err(SimulationError::NoiseLevel(_))
        ));
    }

    #[test]
    fn test_experiment_grid_expansion() {
        let params = ExperimentParams {
            languages: vec![ENGLISH, JAPANESE],
            noise_levels: vec![0.0, 0.1],
            learners_per_cell: 3,
            num_sentences: 50,
            base_seed: 9,
            ..ExperimentParams::default()
        };
        let trials = params.trials();
        assert_eq!(trials.len(), 12);
        // Distinct seeds across the grid, stable expansion order.
        let seeds: std::collections::HashSet<u64> = trials.iter().map(|t| t.seed).collect();
        assert_eq!(seeds.len(), 12);
        assert_eq!(trials[0].language, ENGLISH);
        assert_eq!(trials[11].language, JAPANESE);
    }

    #[test]
    fn test_experiment_runs_all_cells() {
        let (domain, cache) = fixture();
        let params = ExperimentParams {
            languages: vec![ENGLISH, JAPANESE],
            noise_levels: vec![0.0, 0.25],
            learners_per_cell: 2,
            num_sentences: 100,
            ..ExperimentParams::default()
        };
        let results = run_experiment(&domain, &cache, &params).unwrap();
        assert_eq!(results.len(), 8);
        for result in &results {
            assert!(result.is_ok());
        }
    }

    #[test]
    fn test_experiment_validates_before_running() {
        let (domain, cache) = fixture();
        let params = ExperimentParams {
            languages: vec![ENGLISH, 999],
            num_sentences: 10,
            learners_per_cell: 1,
            ..ExperimentParams::default()
        };
        assert!(matches!(
            run_experiment(&domain, &cache, &params),
            Err(SimulationError::Domain(DomainError::UnknownGrammar(999)))
        ));
    }

    #[test]
    fn test_trial_result_serializes() {
        let (domain, cache) = fixture();
        let mut params = trial_params(3);
        params.num_sentences = 20;
        let result = run_trial(&domain, &cache, &params).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"language\":611"));
        assert!(json.contains("\"QInv\""));
        let back: TrialResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.params, result.params);
        assert_eq!(back.grammar, result.grammar);
    }
}
