//! The 13 trigger rules: structural tests that map one sentence to zero or
//! more parameter adjustments.
//!
//! Rules run in [`CANONICAL_ORDER`] for every sentence consumption. Each rule
//! declares its [`Purity`] at the type level: the ten `Pure` rules depend on
//! the sentence alone and are eligible for caching; the three
//! `StateDependent` rules (Optional-Topic, Infl-to-Comp, Affix-Hopping) read
//! the learner's current parameter values and must always be evaluated live.
//! The cache builder and the consumer both dispatch on this tag — never on a
//! hard-coded exception list — so a rule edited to start reading state only
//! needs its tag flipped.
//!
//! Cross-parameter side effects are intentional and preserved exactly:
//! Question-Inversion evidence also pushes ItoC, Verb-to-Infl evidence also
//! pushes AH, Null-Subject and Null-Topic evidence also push OPT. Likewise
//! Affix-Hopping's two firing conditions are not mutually exclusive and may
//! both emit in a single evaluation; that double fire is part of the
//! reference behavior.
//!
//! Rules check marker presence defensively: a sentence missing the markers a
//! rule needs simply yields no adjustment.

use crate::grammar::{Direction, GrammarState, Param};
use crate::sentence::{Illocution, Marker, Sentence};
use serde::{Deserialize, Serialize};

/// Which of the two learner rates an adjustment uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pace {
    Aggressive,
    Conservative,
}

/// One adjustment request emitted by a trigger rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub param: Param,
    pub direction: Direction,
    pub pace: Pace,
}

impl Adjustment {
    pub fn aggressive(param: Param, direction: Direction) -> Self {
        Adjustment {
            param,
            direction,
            pace: Pace::Aggressive,
        }
    }

    pub fn conservative(param: Param, direction: Direction) -> Self {
        Adjustment {
            param,
            direction,
            pace: Pace::Conservative,
        }
    }
}

/// Whether a rule's output depends on mutable learner state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Purity {
    /// Pure function of the sentence; cacheable per distinct sentence.
    Pure,
    /// Reads current parameter values; must be evaluated live, per learner.
    StateDependent,
}

/// The 13 named trigger rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    SubjectPosition,
    HeadInIp,
    HeadInCp,
    OptionalTopic,
    NullSubject,
    NullTopic,
    WhMovement,
    PrepositionInversion,
    TopicMarking,
    VerbToInfl,
    InflToComp,
    AffixHopping,
    QuestionInversion,
}

/// Fixed evaluation order for every sentence consumption. Order matters:
/// later state-dependent rules read parameters that earlier rules in the
/// same pass may have just moved.
pub const CANONICAL_ORDER: [Trigger; 13] = [
    Trigger::SubjectPosition,
    Trigger::HeadInIp,
    Trigger::HeadInCp,
    Trigger::OptionalTopic,
    Trigger::NullSubject,
    Trigger::NullTopic,
    Trigger::WhMovement,
    Trigger::PrepositionInversion,
    Trigger::TopicMarking,
    Trigger::VerbToInfl,
    Trigger::InflToComp,
    Trigger::AffixHopping,
    Trigger::QuestionInversion,
];

impl Trigger {
    pub const COUNT: usize = 13;

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Trigger::SubjectPosition => "SP",
            Trigger::HeadInIp => "HIP",
            Trigger::HeadInCp => "HCP",
            Trigger::OptionalTopic => "OPT",
            Trigger::NullSubject => "NS",
            Trigger::NullTopic => "NT",
            Trigger::WhMovement => "WHM",
            Trigger::PrepositionInversion => "PI",
            Trigger::TopicMarking => "TM",
            Trigger::VerbToInfl => "VtoI",
            Trigger::InflToComp => "ItoC",
            Trigger::AffixHopping => "AH",
            Trigger::QuestionInversion => "QInv",
        }
    }

    /// Declared purity tag. OPT reads TM/NT, ItoC reads SP/HIP/HCP, AH reads
    /// ItoC/HIP; everything else sees only the sentence.
    pub fn purity(self) -> Purity {
        match self {
            Trigger::OptionalTopic | Trigger::InflToComp | Trigger::AffixHopping => {
                Purity::StateDependent
            }
            _ => Purity::Pure,
        }
    }

    /// Evaluate this rule against `sentence`, appending emitted adjustments
    /// to `out` in emission order. `grammar` is only read by the three
    /// state-dependent rules; pure rules ignore it entirely.
    pub fn evaluate(self, sentence: &Sentence, grammar: &GrammarState, out: &mut Vec<Adjustment>) {
        match self {
            Trigger::SubjectPosition => subject_position(sentence, out),
            Trigger::HeadInIp => head_in_ip(sentence, out),
            Trigger::HeadInCp => head_in_cp(sentence, out),
            Trigger::OptionalTopic => optional_topic(sentence, grammar, out),
            Trigger::NullSubject => null_subject(sentence, out),
            Trigger::NullTopic => null_topic(sentence, out),
            Trigger::WhMovement => wh_movement(sentence, out),
            Trigger::PrepositionInversion => preposition_inversion(sentence, out),
            Trigger::TopicMarking => topic_marking(sentence, out),
            Trigger::VerbToInfl => verb_to_infl(sentence, out),
            Trigger::InflToComp => infl_to_comp(sentence, grammar, out),
            Trigger::AffixHopping => affix_hopping(sentence, grammar, out),
            Trigger::QuestionInversion => question_inversion(sentence, out),
        }
    }
}

// ── Pure rules ──────────────────────────────────────────────────────

/// SP: declaratives with both O1 and S as whole tokens. O1 before S (and
/// non-initial) is subject-final evidence; S before O1 (and non-initial) is
/// subject-initial evidence.
fn subject_position(s: &Sentence, out: &mut Vec<Adjustment>) {
    if s.illocution() != Illocution::Declarative {
        return;
    }
    let (Some(o1), Some(subj)) = (s.token_index("O1"), s.token_index("S")) else {
        return;
    };
    if o1 > 0 && o1 < subj {
        out.push(Adjustment::aggressive(Param::SP, Direction::One));
    } else if subj > 0 && o1 > subj {
        out.push(Adjustment::aggressive(Param::SP, Direction::Zero));
    }
}

/// HIP: O3/P adjacency orientation; failing that, O1/Verb adjacency in
/// imperatives.
fn head_in_ip(s: &Sentence, out: &mut Vec<Adjustment>) {
    if let (Some(o3), Some(p)) = (s.token_index("O3"), s.token_index("P")) {
        if o3 > 0 && p == o3 + 1 {
            out.push(Adjustment::aggressive(Param::HIP, Direction::One));
        } else if o3 > 0 && p + 1 == o3 {
            out.push(Adjustment::aggressive(Param::HIP, Direction::Zero));
        }
    } else if s.illocution() == Illocution::Imperative {
        let (Some(o1), Some(verb)) = (s.token_index("O1"), s.token_index("Verb")) else {
            return;
        };
        if o1 + 1 == verb {
            out.push(Adjustment::aggressive(Param::HIP, Direction::One));
        } else if verb + 1 == o1 {
            out.push(Adjustment::aggressive(Param::HIP, Direction::Zero));
        }
    }
}

/// HCP: in questions, "ka" (or, with no "ka", an Aux) sentence-final vs.
/// sentence-initial.
fn head_in_cp(s: &Sentence, out: &mut Vec<Adjustment>) {
    if s.illocution() != Illocution::Question {
        return;
    }
    let has_ka = s.has_token("ka");
    let first = s.first_token();
    let last = s.last_token();
    if last == Some("ka") || (!has_ka && last == Some("Aux")) {
        out.push(Adjustment::aggressive(Param::HCP, Direction::One));
    } else if first == Some("ka") || (!has_ka && first == Some("Aux")) {
        out.push(Adjustment::aggressive(Param::HCP, Direction::Zero));
    }
}

/// NS: declaratives with a fronted oblique argument. Missing "S" anywhere in
/// the text is aggressive null-subject evidence (and also optional-topic
/// evidence); an overt "S" is conservative counter-evidence.
fn null_subject(s: &Sentence, out: &mut Vec<Adjustment>) {
    if s.illocution() != Illocution::Declarative || !s.out_oblique() {
        return;
    }
    if !s.contains("S") {
        out.push(Adjustment::aggressive(Param::NS, Direction::One));
        out.push(Adjustment::aggressive(Param::OPT, Direction::One));
    } else {
        out.push(Adjustment::conservative(Param::NS, Direction::Zero));
    }
}

/// NT: declaratives with O2 but no O1 are null-topic evidence (and force the
/// topic obligatory); a declarative carrying the full complement set is
/// conservative counter-evidence.
fn null_topic(s: &Sentence, out: &mut Vec<Adjustment>) {
    if s.illocution() != Illocution::Declarative {
        return;
    }
    if s.contains("O2") && !s.contains("O1") {
        out.push(Adjustment::aggressive(Param::NT, Direction::One));
        out.push(Adjustment::aggressive(Param::OPT, Direction::Zero));
    } else if s.contains("O2")
        && s.contains("O1")
        && s.contains("O3")
        && s.contains("S")
        && s.contains("Adv")
    {
        out.push(Adjustment::conservative(Param::NT, Direction::Zero));
    }
}

/// WHM: in WH-questions, a fronted WH-phrase (first token, or pied-piped
/// directly behind an initial preposition) is conservative evidence for
/// movement; a WH-phrase anywhere else is aggressive evidence against.
fn wh_movement(s: &Sentence, out: &mut Vec<Adjustment>) {
    if s.illocution() != Illocution::Question || !s.contains("+WH") {
        return;
    }
    let fronted = s.first_token().is_some_and(|t| t.contains("+WH"))
        || (s.first_token().is_some_and(|t| t.contains("P"))
            && s.tokens().get(1).map(String::as_str) == Some("O3[+WH]"));
    if fronted {
        out.push(Adjustment::conservative(Param::WHM, Direction::One));
    } else {
        out.push(Adjustment::aggressive(Param::WHM, Direction::Zero));
    }
}

/// PI: P and O3 separated by more than one position is aggressive inversion
/// evidence; the pair occupying positions 0 and 1 is conservatively
/// ambiguous against it.
fn preposition_inversion(s: &Sentence, out: &mut Vec<Adjustment>) {
    let p = s.marker_index(Marker::P);
    let o3 = s.marker_index(Marker::O3);
    if p > -1 && o3 > -1 {
        if (p - o3).abs() > 1 {
            out.push(Adjustment::aggressive(Param::PI, Direction::One));
        } else if p + o3 == 1 {
            out.push(Adjustment::conservative(Param::PI, Direction::Zero));
        }
    }
}

/// TM: an overt topic marker "[+WA]" anywhere; otherwise O1 and O2 tokens
/// separated by more than one position argue against marking.
fn topic_marking(s: &Sentence, out: &mut Vec<Adjustment>) {
    if s.contains("[+WA]") {
        out.push(Adjustment::aggressive(Param::TM, Direction::One));
    } else if let (Some(o1), Some(o2)) = (s.token_index("O1"), s.token_index("O2")) {
        if o1.abs_diff(o2) > 1 {
            out.push(Adjustment::aggressive(Param::TM, Direction::Zero));
        }
    }
}

/// VtoI: an aux-less declarative whose Verb and O1 are separated (with O1
/// non-initial) shows the verb raised — also counter-evidence for AH. Any
/// Aux token is conservative evidence against raising.
fn verb_to_infl(s: &Sentence, out: &mut Vec<Adjustment>) {
    if s.contains("Verb")
        && s.contains("O1")
        && !s.contains("Aux")
        && s.illocution() == Illocution::Declarative
    {
        let o1 = s.marker_index(Marker::O1);
        if o1 != 0 && (s.marker_index(Marker::Verb) - o1).abs() > 1 {
            out.push(Adjustment::aggressive(Param::VtoI, Direction::One));
            out.push(Adjustment::aggressive(Param::AH, Direction::Zero));
        }
    } else if s.has_token("Aux") {
        out.push(Adjustment::conservative(Param::VtoI, Direction::Zero));
    }
}

/// QInv: the invariant question marker "ka" rules inversion (and ItoC) out;
/// a question with neither "ka" nor any WH material demands it.
fn question_inversion(s: &Sentence, out: &mut Vec<Adjustment>) {
    if s.illocution() != Illocution::Question {
        return;
    }
    if s.contains("ka") {
        out.push(Adjustment::aggressive(Param::QInv, Direction::Zero));
        out.push(Adjustment::aggressive(Param::ItoC, Direction::Zero));
    } else if !s.contains("WH") {
        out.push(Adjustment::aggressive(Param::QInv, Direction::One));
    }
}

// ── State-dependent rules ───────────────────────────────────────────

/// OPT: topic-drop evidence, gated on the current Topic-Marking and
/// Null-Topic estimates.
fn optional_topic(s: &Sentence, g: &GrammarState, out: &mut Vec<Adjustment>) {
    let tm = g.get(Param::TM);
    let nt = g.get(Param::NT);

    if s.illocution() == Illocution::Declarative
        && tm > 0.5
        && nt < 0.5
        && !s.contains("[+WA]")
    {
        out.push(Adjustment::aggressive(Param::OPT, Direction::One));
    } else if s.illocution() == Illocution::Question
        && tm > 0.5
        && nt < 0.5
        && !s.contains("[+WA]")
        && s.contains("+WH")
    {
        out.push(Adjustment::aggressive(Param::OPT, Direction::One));
    } else if nt < 0.5 {
        let first = s.first_token();
        if s.illocution() == Illocution::Declarative
            && matches!(first, Some("Verb" | "Aux" | "Not" | "Never"))
        {
            out.push(Adjustment::aggressive(Param::OPT, Direction::One));
        }
        // Both of the following tests run after the one above; the first
        // two branches of this rule can therefore not stack, but this pair
        // can follow the declarative test within one evaluation.
        if matches!(first, Some("ka" | "Verb" | "Aux" | "Not" | "Never"))
            && s.contains("+WH")
            && s.illocution() == Illocution::Question
        {
            out.push(Adjustment::aggressive(Param::OPT, Direction::One));
        } else if s.out_oblique() {
            out.push(Adjustment::conservative(Param::OPT, Direction::Zero));
        }
    }
}

/// ItoC: Infl-to-Comp raising, disambiguated by the current word-order
/// estimate (SP/HIP/HCP octant).
fn infl_to_comp(s: &Sentence, g: &GrammarState, out: &mut Vec<Adjustment>) {
    let sp = g.get(Param::SP);
    let hip = g.get(Param::HIP);
    let hcp = g.get(Param::HCP);
    let dec = s.illocution() == Illocution::Declarative;

    if dec && s.has_token("S") && s.has_token("Aux") {
        let (Some(subj), Some(aux)) = (s.token_index("S"), s.token_index("Aux")) else {
            return;
        };
        let verb = s.token_index("Verb");
        let last = s.last_token();

        if sp < 0.5 && hip < 0.5 {
            // Subject- and IP-initial: aux belongs directly right of S.
            if subj > 0 && aux == subj + 1 {
                out.push(Adjustment::aggressive(Param::ItoC, Direction::Zero));
            } else if hcp < 0.5 && aux < subj {
                out.push(Adjustment::aggressive(Param::ItoC, Direction::One));
                out.push(Adjustment::aggressive(Param::AH, Direction::Zero));
            } else if hcp > 0.5 && last == Some("Aux") {
                out.push(Adjustment::aggressive(Param::ItoC, Direction::One));
                out.push(Adjustment::aggressive(Param::AH, Direction::Zero));
            }
        } else if sp > 0.5 && hip > 0.5 {
            // Subject- and IP-final: aux belongs directly left of S.
            if aux > 0 && subj == aux + 1 {
                out.push(Adjustment::aggressive(Param::ItoC, Direction::Zero));
            } else if hcp > 0.5 && last == Some("Aux") && subj + 1 == aux {
                out.push(Adjustment::aggressive(Param::ItoC, Direction::One));
                out.push(Adjustment::aggressive(Param::AH, Direction::Zero));
            } else if hcp < 0.5 && aux == 0 {
                out.push(Adjustment::aggressive(Param::ItoC, Direction::One));
                out.push(Adjustment::aggressive(Param::AH, Direction::Zero));
            } else if hcp < 0.5 && verb.is_some_and(|v| aux < v) {
                out.push(Adjustment::aggressive(Param::ItoC, Direction::One));
                out.push(Adjustment::aggressive(Param::AH, Direction::Zero));
            }
        } else if sp > 0.5 && hip < 0.5 && hcp > 0.5 {
            // C-initial, IP-final: aux (possibly across negation)
            // immediately precedes the verb when unraised.
            if let Some(v) = verb {
                if v == aux + 1 {
                    out.push(Adjustment::aggressive(Param::ItoC, Direction::Zero));
                } else if s.token_index("Not").is_some_and(|n| v == n + 1) && v == aux + 2 {
                    out.push(Adjustment::aggressive(Param::ItoC, Direction::Zero));
                } else if s.token_index("Never").is_some_and(|n| v == n + 1) && v == aux + 2 {
                    out.push(Adjustment::aggressive(Param::ItoC, Direction::Zero));
                } else {
                    out.push(Adjustment::aggressive(Param::ItoC, Direction::One));
                    out.push(Adjustment::aggressive(Param::AH, Direction::Zero));
                }
            }
        } else if sp < 0.5 && hip > 0.5 && hcp < 0.5 {
            // Mirror image of the previous octant.
            if let Some(v) = verb {
                if aux == v + 1 {
                    out.push(Adjustment::aggressive(Param::ItoC, Direction::Zero));
                } else if s.token_index("Not").is_some_and(|n| aux == n + 1) && aux == v + 2 {
                    out.push(Adjustment::aggressive(Param::ItoC, Direction::Zero));
                } else if s.token_index("Never").is_some_and(|n| aux == n + 1) && aux == v + 2 {
                    out.push(Adjustment::aggressive(Param::ItoC, Direction::Zero));
                } else {
                    out.push(Adjustment::aggressive(Param::ItoC, Direction::One));
                    out.push(Adjustment::aggressive(Param::AH, Direction::Zero));
                }
            }
        } else if s.contains("Aux") {
            // Word order still undecided: any informative token strictly
            // between non-adjacent Verb and Aux shows the aux has moved.
            if let Some(v) = verb {
                if v.abs_diff(aux) != 1 {
                    for tok in ["S", "O1", "O2"] {
                        let between = s.token_index(tok).is_some_and(|idx| {
                            (v < idx && idx < aux) || (aux < idx && idx < v)
                        });
                        if between {
                            out.push(Adjustment::aggressive(Param::ItoC, Direction::One));
                            out.push(Adjustment::aggressive(Param::AH, Direction::Zero));
                            break;
                        }
                    }
                }
            }
        }
    } else if dec
        && s.contains("Never")
        && s.contains("Verb")
        && s.contains("O1")
        && !s.contains("Aux")
    {
        let never = s.marker_index(Marker::Never);
        let verb = s.marker_index(Marker::Verb);
        let o1 = s.marker_index(Marker::O1);
        if (never > -1 && verb == never + 1 && o1 == verb + 1 && hip < 0.5)
            || (o1 > 0 && verb == o1 + 1 && never == verb + 1 && hip > 0.5)
        {
            out.push(Adjustment::aggressive(Param::ItoC, Direction::Zero));
        }
    } else if ((sp > 0.5 && hcp < 0.5 && hip < 0.5) || (sp < 0.5 && hcp > 0.5 && hip > 0.5))
        && s.contains("Never")
        && s.contains("Aux")
        && s.contains("Verb")
    {
        // SOVIC / CIVOS word orders always carry an aux; negated aux
        // sentences there are weak evidence FOR raising.
        out.push(Adjustment::conservative(Param::ItoC, Direction::One));
    }
}

/// AH: affix hopping in aux-less negated declaratives, gated on the current
/// ItoC estimate. The Never- and Not-conditions are deliberately not
/// mutually exclusive: a sentence satisfying both adjusts AH (and VtoI)
/// twice in one evaluation.
fn affix_hopping(s: &Sentence, g: &GrammarState, out: &mut Vec<Adjustment>) {
    let itoc = g.get(Param::ItoC);
    let hip = g.get(Param::HIP);

    if s.illocution() == Illocution::Declarative
        && itoc < 0.5
        && !s.contains("Aux")
        && (s.contains("Never") || s.contains("Not"))
        && s.contains("Verb")
        && s.contains("O1")
    {
        let never = s.marker_index(Marker::Never);
        let not = s.marker_index(Marker::Not);
        let verb = s.marker_index(Marker::Verb);
        let o1 = s.marker_index(Marker::O1);

        if (never > -1 && verb == never + 1 && o1 == verb + 1 && hip < 0.5)
            || (o1 > -1 && verb == o1 + 1 && never == verb + 1 && hip > 0.5)
        {
            out.push(Adjustment::aggressive(Param::AH, Direction::One));
            out.push(Adjustment::aggressive(Param::VtoI, Direction::Zero));
        }
        if (not > -1 && verb == not + 1 && o1 == verb + 1 && hip < 0.5)
            || (o1 > -1 && verb == o1 + 1 && not == verb + 1 && hip > 0.5)
        {
            out.push(Adjustment::aggressive(Param::AH, Direction::One));
            out.push(Adjustment::aggressive(Param::VtoI, Direction::Zero));
        }
    } else if s.contains("Aux") {
        out.push(Adjustment::conservative(Param::AH, Direction::Zero));
    }
}
