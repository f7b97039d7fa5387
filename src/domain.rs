//! The CoLAG sentence universe, loaded from the flat-file corpus.
//!
//! Each flat-file line pairs one grammar with one sentence type. Sentence
//! types are shared: the same sentence id appears under every grammar whose
//! language generates it, so language membership is judged by sentence id,
//! never by grammar id on the sentence record. The domain is built once,
//! validated, and then shared read-only across all trial workers.

use crate::sentence::{GrammarId, Illocution, Sentence, SentenceId};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// One line of the COLAG_2011 flat file: grammar bit-vector, illocution tag,
/// sentence text, tree structure, then grammar / sentence / structure ids.
static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<gramm>[01]+)\s",
        r"(?P<illoc>[A-Z]+)\s*\t\s*",
        r"(?P<sent>.*?)\s*\t\s*",
        r"(?P<struct>.*\))\s+",
        r"(?P<grammid>\d+)\s+",
        r"(?P<sentid>\d+)\s+",
        r"(?P<structid>\d+)\s*$",
    ))
    .expect("flat-file line pattern is valid")
});

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("failed to read domain file")]
    Io(#[from] std::io::Error),
    #[error("malformed flat-file line {line}")]
    MalformedLine { line: usize },
    #[error("unknown illocution tag {tag:?} on flat-file line {line}")]
    UnknownIllocution { tag: String, line: usize },
    #[error("domain file contained no sentences")]
    Empty,
    #[error("grammar {0} not present in the domain")]
    UnknownGrammar(GrammarId),
    #[error("grammar {0} covers the whole domain, no noise sentences exist")]
    EmptyNoiseDomain(GrammarId),
}

/// Sentence ids of one language, as insertion-ordered slots into the
/// sentence table plus a membership set for noise rejection.
#[derive(Debug, Default)]
struct Language {
    slots: Vec<usize>,
    members: HashSet<SentenceId>,
}

/// The full sentence universe: distinct sentence types plus, per grammar,
/// the ids of the sentences its language generates.
#[derive(Debug, Default)]
pub struct ColagDomain {
    sentences: Vec<Sentence>,
    by_id: HashMap<SentenceId, usize>,
    languages: HashMap<GrammarId, Language>,
}

impl ColagDomain {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DomainError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a flat-file corpus. Fails on the first malformed line; a bad
    /// corpus must never reach a trial.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DomainError> {
        let mut domain = ColagDomain::default();
        let mut tokens = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let number = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let caps = LINE_RE
                .captures(&line)
                .ok_or(DomainError::MalformedLine { line: number })?;

            let grammar_id: GrammarId = caps["grammid"]
                .parse()
                .map_err(|_| DomainError::MalformedLine { line: number })?;
            let sentence_id: SentenceId = caps["sentid"]
                .parse()
                .map_err(|_| DomainError::MalformedLine { line: number })?;
            let tag = &caps["illoc"];
            let illocution =
                Illocution::from_tag(tag).ok_or_else(|| DomainError::UnknownIllocution {
                    tag: tag.to_string(),
                    line: number,
                })?;

            domain.record(Sentence::new(sentence_id, grammar_id, illocution, &caps["sent"]));
            tokens += 1;
        }

        if domain.sentences.is_empty() {
            return Err(DomainError::Empty);
        }
        tracing::info!(
            languages = domain.languages.len(),
            sentence_types = domain.sentences.len(),
            sentence_tokens = tokens,
            "loaded colag domain"
        );
        Ok(domain)
    }

    fn record(&mut self, sentence: Sentence) {
        let id = sentence.id();
        let grammar_id = sentence.grammar_id();
        let slot = *self.by_id.entry(id).or_insert_with(|| {
            self.sentences.push(sentence);
            self.sentences.len() - 1
        });
        let language = self.languages.entry(grammar_id).or_default();
        if language.members.insert(id) {
            language.slots.push(slot);
        }
    }

    /// Every distinct sentence type, in first-encounter corpus order.
    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.sentences.iter()
    }

    pub fn get(&self, sentence_id: SentenceId) -> Option<&Sentence> {
        self.by_id.get(&sentence_id).map(|&slot| &self.sentences[slot])
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn contains_language(&self, grammar_id: GrammarId) -> bool {
        self.languages.contains_key(&grammar_id)
    }

    /// Number of distinct sentence types the language generates.
    pub fn language_len(&self, grammar_id: GrammarId) -> Result<usize, DomainError> {
        self.language(grammar_id).map(|l| l.slots.len())
    }

    /// Uniform draw over the sentences of one language.
    pub fn sample_in<R: Rng + ?Sized>(
        &self,
        grammar_id: GrammarId,
        rng: &mut R,
    ) -> Result<&Sentence, DomainError> {
        let language = self.language(grammar_id)?;
        let slot = language.slots[rng.random_range(0..language.slots.len())];
        Ok(&self.sentences[slot])
    }

    /// Uniform draw over sentence types OUTSIDE the language: rejection
    /// sampling against the membership set, matching the original noise
    /// procedure (so the noise distribution is uniform over the complement).
    pub fn sample_not_in<R: Rng + ?Sized>(
        &self,
        grammar_id: GrammarId,
        rng: &mut R,
    ) -> Result<&Sentence, DomainError> {
        let language = self.language(grammar_id)?;
        if language.members.len() >= self.sentences.len() {
            return Err(DomainError::EmptyNoiseDomain(grammar_id));
        }
        loop {
            let candidate = &self.sentences[rng.random_range(0..self.sentences.len())];
            if !language.members.contains(&candidate.id()) {
                return Ok(candidate);
            }
        }
    }

    fn language(&self, grammar_id: GrammarId) -> Result<&Language, DomainError> {
        self.languages
            .get(&grammar_id)
            .ok_or(DomainError::UnknownGrammar(grammar_id))
    }
}
