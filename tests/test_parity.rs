// Cache/live parity: a learner fed from the precomputed trigger cache must
// follow a bit-identical parameter trajectory to a learner that evaluates
// every rule live. Exercised over a synthetic sentence pool chosen to hit
// every trigger rule, under both update rules and several rate settings.

use colag_tla::{
    Illocution, Learner, Sentence, TriggerCache, UpdateRule,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ══════════════════════════════════════════════════════════════════════
// Fixture: one sentence per interesting rule shape
// ══════════════════════════════════════════════════════════════════════

fn pool() -> Vec<Sentence> {
    let shapes: &[(Illocution, &str)] = &[
        (Illocution::Declarative, "S Verb O1"),
        (Illocution::Declarative, "O1 Verb S"),
        (Illocution::Declarative, "Adv S Verb O1"),
        (Illocution::Question, "ka S Verb O1"),
        (Illocution::Question, "S Verb O1 ka"),
        (Illocution::Question, "Aux S Verb O1"),
        (Illocution::Question, "O1[+WH] Aux S Verb"),
        (Illocution::Question, "P O3[+WH] S Verb"),
        (Illocution::Question, "S Aux Verb O1[+WH]"),
        (Illocution::Declarative, "O1[+WA] S Verb"),
        (Illocution::Declarative, "S Verb O1 O2 P O3"),
        (Illocution::Declarative, "O2 S Verb O1 P O3"),
        (Illocution::Declarative, "S O3 P O2 O1 Verb"),
        (Illocution::Declarative, "S Never Verb O1"),
        (Illocution::Declarative, "S Not Verb O1"),
        (Illocution::Declarative, "S NeverNot Verb O1"),
        (Illocution::Declarative, "S Aux Verb O1"),
        (Illocution::Declarative, "Never S Aux Verb O1"),
        (Illocution::Imperative, "Verb O1"),
        (Illocution::Imperative, "O1 Verb"),
        (Illocution::Declarative, "Adv S Verb O1 O2 O3"),
    ];
    shapes
        .iter()
        .enumerate()
        .map(|(i, (illoc, text))| Sentence::new(i as u32 + 1, 611, *illoc, text))
        .collect()
}

fn cache_for(pool: &[Sentence]) -> TriggerCache {
    let mut cache = TriggerCache::new();
    cache.precompute_all(pool.iter());
    cache
}

fn run_parity(update: UpdateRule, rate: f64, conservative: f64, seed: u64, steps: usize) {
    let pool = pool();
    let cache = cache_for(&pool);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut cached = Learner::new(rate, conservative, 611)
        .unwrap()
        .with_update_rule(update);
    let mut live = Learner::new(rate, conservative, 611)
        .unwrap()
        .with_update_rule(update);

    for step in 0..steps {
        let sentence = &pool[rng.random_range(0..pool.len())];
        cached.consume(sentence, &cache).unwrap();
        live.consume_live(sentence);
        assert_eq!(
            cached.grammar(),
            live.grammar(),
            "trajectories diverged at step {step} on sentence {:?}",
            sentence.raw()
        );
    }
}

// ══════════════════════════════════════════════════════════════════════
// Parity over random streams
// ══════════════════════════════════════════════════════════════════════

#[test]
fn test_parity_standard_rule() {
    run_parity(UpdateRule::Standard, 0.9, 0.0005, 42, 2000);
}

#[test]
fn test_parity_symmetric_rule() {
    run_parity(UpdateRule::SymmetricCoefficient, 0.9, 0.0005, 42, 2000);
}

#[test]
fn test_parity_across_rates_and_seeds() {
    for (rate, conservative) in [(0.02, 0.001), (0.5, 0.0), (1.0, 1.0)] {
        for seed in [0, 7, 1234] {
            run_parity(UpdateRule::Standard, rate, conservative, seed, 300);
            run_parity(UpdateRule::SymmetricCoefficient, rate, conservative, seed, 300);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════
// Parity per individual sentence
// ══════════════════════════════════════════════════════════════════════

#[test]
fn test_parity_each_sentence_alone() {
    let pool = pool();
    let cache = cache_for(&pool);
    for sentence in &pool {
        let mut cached = Learner::new(0.9, 0.0005, 611).unwrap();
        let mut live = Learner::new(0.9, 0.0005, 611).unwrap();
        cached.consume(sentence, &cache).unwrap();
        live.consume_live(sentence);
        assert_eq!(
            cached.grammar(),
            live.grammar(),
            "single-sentence divergence on {:?}",
            sentence.raw()
        );
    }
}

// Repeating one sentence drives state-dependent rules through their gates
// (OPT, ItoC and AH read parameters that drift over the run); the cached
// path must track the live path through every gate flip.
#[test]
fn test_parity_under_state_drift() {
    let pool = pool();
    let cache = cache_for(&pool);
    for sentence in &pool {
        let mut cached = Learner::new(0.9, 0.0005, 611).unwrap();
        let mut live = Learner::new(0.9, 0.0005, 611).unwrap();
        for repeat in 0..200 {
            cached.consume(sentence, &cache).unwrap();
            live.consume_live(sentence);
            assert_eq!(
                cached.grammar(),
                live.grammar(),
                "divergence at repeat {repeat} of {:?}",
                sentence.raw()
            );
        }
    }
}
