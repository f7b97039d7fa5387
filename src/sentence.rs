//! Structural sentence records derived from the CoLAG flat-file domain.
//!
//! A [`Sentence`] is immutable once constructed. Trigger rules query it in
//! two distinct ways, and the distinction is load-bearing:
//!
//! - exact-token tests (`has_token`, `token_index`) match a whole token such
//!   as `"O1"` — they do NOT match `"O1[+WA]"`;
//! - raw-substring tests (`contains`, the precomputed marker indexes) match
//!   anywhere in the sentence text, so `"O1"` DOES match `"O1[+WA]"`.
//!
//! Which form each rule uses was fixed by the original trigger definitions
//! and must not be normalized one way or the other.

/// Identifier of the grammar (language) that generated a sentence.
pub type GrammarId = u32;

/// Corpus-assigned sentence identity. Structurally identical sentences from
/// different grammars share one id; the noise sampler judges membership by it.
pub type SentenceId = u32;

/// Clause illocutionary type, from the flat-file tags DEC / Q / IMP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Illocution {
    Declarative,
    Question,
    Imperative,
}

impl Illocution {
    /// Parse a flat-file illocution tag. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "DEC" => Some(Illocution::Declarative),
            "Q" => Some(Illocution::Question),
            "IMP" => Some(Illocution::Imperative),
            _ => None,
        }
    }
}

/// Markers with a precomputed first-containing-token index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    O1,
    O2,
    O3,
    P,
    Not,
    Never,
    Verb,
    Aux,
}

impl Marker {
    const ALL: [Marker; 8] = [
        Marker::O1,
        Marker::O2,
        Marker::O3,
        Marker::P,
        Marker::Not,
        Marker::Never,
        Marker::Verb,
        Marker::Aux,
    ];

    fn pattern(self) -> &'static str {
        match self {
            Marker::O1 => "O1",
            Marker::O2 => "O2",
            Marker::O3 => "O3",
            Marker::P => "P",
            Marker::Not => "Not",
            Marker::Never => "Never",
            Marker::Verb => "Verb",
            Marker::Aux => "Aux",
        }
    }
}

/// One corpus sentence: token sequence plus precomputed positional facts.
#[derive(Clone, Debug, PartialEq)]
pub struct Sentence {
    id: SentenceId,
    grammar_id: GrammarId,
    illocution: Illocution,
    raw: String,
    tokens: Vec<String>,
    /// First index of a token *containing* each marker, -1 when absent.
    marker_indexes: [isize; 8],
    out_oblique: bool,
}

impl Sentence {
    pub fn new(id: SentenceId, grammar_id: GrammarId, illocution: Illocution, text: &str) -> Self {
        let raw = text.trim().to_string();
        let tokens: Vec<String> = raw.split_whitespace().map(str::to_string).collect();

        let mut marker_indexes = [-1isize; 8];
        for (slot, marker) in Marker::ALL.iter().enumerate() {
            marker_indexes[slot] = tokens
                .iter()
                .position(|tok| tok.contains(marker.pattern()))
                .map_or(-1, |i| i as isize);
        }

        let out_oblique = derive_out_oblique(&marker_indexes);

        Sentence {
            id,
            grammar_id,
            illocution,
            raw,
            tokens,
            marker_indexes,
            out_oblique,
        }
    }

    pub fn id(&self) -> SentenceId {
        self.id
    }

    pub fn grammar_id(&self) -> GrammarId {
        self.grammar_id
    }

    pub fn illocution(&self) -> Illocution {
        self.illocution
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Substring test against the raw sentence text.
    pub fn contains(&self, needle: &str) -> bool {
        self.raw.contains(needle)
    }

    /// Exact-token membership.
    pub fn has_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Index of the first token exactly equal to `token`.
    pub fn token_index(&self, token: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t == token)
    }

    pub fn first_token(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn last_token(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    /// Precomputed index of the first token containing the marker, -1 when
    /// the marker occurs nowhere in the sentence.
    pub fn marker_index(&self, marker: Marker) -> isize {
        self.marker_indexes[marker as usize]
    }

    /// True when an argument other than the subject has been fronted out of
    /// canonical order (all of O1/O2/O3/P present, in neither canonical
    /// serialization).
    pub fn out_oblique(&self) -> bool {
        self.out_oblique
    }
}

/// Canonical-order test over the containing-token indexes of O1/O2/O3/P.
fn derive_out_oblique(indexes: &[isize; 8]) -> bool {
    let o1 = indexes[Marker::O1 as usize];
    let o2 = indexes[Marker::O2 as usize];
    let o3 = indexes[Marker::O3 as usize];
    let p = indexes[Marker::P as usize];

    if o1 != -1 && o1 < o2 && o2 < p && o3 == p + 1 {
        false
    } else if o3 != -1 && o3 < o2 && o2 < o1 && p == o3 + 1 {
        false
    } else {
        o1 != -1 && o2 != -1 && p != -1 && o3 != -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> Sentence {
        Sentence::new(1, 611, Illocution::Declarative, text)
    }

    #[test]
    fn test_tokenization_and_raw() {
        let s = dec("S Verb O1");
        assert_eq!(s.tokens(), &["S", "Verb", "O1"]);
        assert_eq!(s.raw(), "S Verb O1");
        assert_eq!(s.first_token(), Some("S"));
        assert_eq!(s.last_token(), Some("O1"));
    }

    #[test]
    fn test_exact_token_vs_substring() {
        let s = dec("O1[+WA] S Verb");
        // Token test: "O1" is not a whole token here.
        assert!(!s.has_token("O1"));
        assert_eq!(s.token_index("O1"), None);
        // Substring test: raw text does contain "O1".
        assert!(s.contains("O1"));
        assert!(s.contains("[+WA]"));
        // Marker index finds the containing token.
        assert_eq!(s.marker_index(Marker::O1), 0);
    }

    #[test]
    fn test_marker_indexes_absent() {
        let s = dec("S Verb");
        assert_eq!(s.marker_index(Marker::O1), -1);
        assert_eq!(s.marker_index(Marker::Aux), -1);
        assert_eq!(s.marker_index(Marker::Verb), 1);
    }

    #[test]
    fn test_marker_index_first_containing() {
        // "Never" contains neither "Not" nor vice versa; "O3[+WH]" contains "O3".
        let s = dec("Never S Verb O3[+WH] P");
        assert_eq!(s.marker_index(Marker::Never), 0);
        assert_eq!(s.marker_index(Marker::Not), -1);
        assert_eq!(s.marker_index(Marker::O3), 3);
        assert_eq!(s.marker_index(Marker::P), 4);
    }

    #[test]
    fn test_out_oblique_canonical_head_initial() {
        // O1 < O2 < P, O3 directly after P: canonical, not oblique.
        let s = dec("S Verb O1 O2 P O3");
        assert!(!s.out_oblique());
    }

    #[test]
    fn test_out_oblique_canonical_head_final() {
        // O3 < O2 < O1 with P directly after O3: mirrored canonical order.
        let s = dec("S O3 P O2 O1 Verb");
        assert!(!s.out_oblique());
    }

    #[test]
    fn test_out_oblique_fronted_argument() {
        // All four markers present but scrambled out of canonical order.
        let s = dec("O2 S Verb O1 P O3");
        assert!(s.out_oblique());
    }

    #[test]
    fn test_out_oblique_missing_marker() {
        let s = dec("S Verb O1");
        assert!(!s.out_oblique());
    }

    #[test]
    fn test_illocution_tags() {
        assert_eq!(Illocution::from_tag("DEC"), Some(Illocution::Declarative));
        assert_eq!(Illocution::from_tag("Q"), Some(Illocution::Question));
        assert_eq!(Illocution::from_tag("IMP"), Some(Illocution::Imperative));
        assert_eq!(Illocution::from_tag("EXCL"), None);
    }
}
