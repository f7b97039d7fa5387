//! The 13-parameter grammar vector and its weight-update rules.
//!
//! Every parameter is a float in [0,1], initialized to 0.5 (maximally
//! uncertain). Both update rules are contractive toward the bounds: a value
//! approaches 0 or 1 asymptotically and never leaves the interval, so no
//! clamping is ever applied.

use serde::{Deserialize, Serialize};

/// One of the 13 grammatical parameters.
///
/// Discriminants double as the storage index into [`GrammarState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Param {
    /// Subject-Position (0 = subject-initial, 1 = subject-final).
    SP,
    /// Head-in-IP.
    HIP,
    /// Head-in-CP.
    HCP,
    /// Optional-Topic (0 = obligatory, 1 = optional).
    OPT,
    /// Null-Subject.
    NS,
    /// Null-Topic.
    NT,
    /// WH-Movement.
    WHM,
    /// Preposition-Inversion.
    PI,
    /// Topic-Marking.
    TM,
    /// Verb-to-Infl raising.
    VtoI,
    /// Infl-to-Comp raising.
    ItoC,
    /// Affix-Hopping.
    AH,
    /// Question-Inversion.
    QInv,
}

impl Param {
    pub const COUNT: usize = 13;

    pub const ALL: [Param; Param::COUNT] = [
        Param::SP,
        Param::HIP,
        Param::HCP,
        Param::OPT,
        Param::NS,
        Param::NT,
        Param::WHM,
        Param::PI,
        Param::TM,
        Param::VtoI,
        Param::ItoC,
        Param::AH,
        Param::QInv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Param::SP => "SP",
            Param::HIP => "HIP",
            Param::HCP => "HCP",
            Param::OPT => "OPT",
            Param::NS => "NS",
            Param::NT => "NT",
            Param::WHM => "WHM",
            Param::PI => "PI",
            Param::TM => "TM",
            Param::VtoI => "VtoI",
            Param::ItoC => "ItoC",
            Param::AH => "AH",
            Param::QInv => "QInv",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Which bound an adjustment pushes toward.
///
/// A two-variant enum rather than an integer: an invalid direction is a
/// programming error and is unrepresentable here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Toward 0.
    Zero,
    /// Toward 1.
    One,
}

/// Weight-update strategy, selected once at learner construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateRule {
    /// Geometric approach toward the targeted bound:
    /// dir 0: `v -= r*v`; dir 1: `v += r*(1-v)`.
    /// Tapers only near the target extreme.
    #[default]
    Standard,
    /// Step coefficient `min(v, 1-v)` before the directional move: pushes
    /// hardest on undecided (near-0.5) parameters and tapers near either
    /// extreme, in both directions.
    SymmetricCoefficient,
}

impl UpdateRule {
    /// Compute the post-adjustment value. Pure; both variants map [0,1] into
    /// [0,1] for any rate in [0,1].
    pub fn step(self, value: f64, direction: Direction, rate: f64) -> f64 {
        match self {
            UpdateRule::Standard => match direction {
                Direction::Zero => value - rate * value,
                Direction::One => value + rate * (1.0 - value),
            },
            UpdateRule::SymmetricCoefficient => {
                let coef = if value >= 0.5 { 1.0 - value } else { value };
                match direction {
                    Direction::Zero => value - rate * coef,
                    Direction::One => value + rate * coef,
                }
            }
        }
    }
}

/// The mutable 13-parameter vector owned by one learner.
#[derive(Clone, Debug, PartialEq)]
pub struct GrammarState {
    values: [f64; Param::COUNT],
}

impl Default for GrammarState {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarState {
    /// All parameters start maximally uncertain.
    pub fn new() -> Self {
        GrammarState {
            values: [0.5; Param::COUNT],
        }
    }

    pub fn get(&self, param: Param) -> f64 {
        self.values[param.index()]
    }

    /// Apply one directional adjustment under the given update rule.
    pub fn apply(&mut self, rule: UpdateRule, param: Param, direction: Direction, rate: f64) {
        let v = self.values[param.index()];
        self.values[param.index()] = rule.step(v, direction, rate);
    }

    pub fn snapshot(&self) -> GrammarSnapshot {
        GrammarSnapshot {
            sp: self.get(Param::SP),
            hip: self.get(Param::HIP),
            hcp: self.get(Param::HCP),
            opt: self.get(Param::OPT),
            ns: self.get(Param::NS),
            nt: self.get(Param::NT),
            whm: self.get(Param::WHM),
            pi: self.get(Param::PI),
            tm: self.get(Param::TM),
            vtoi: self.get(Param::VtoI),
            itoc: self.get(Param::ItoC),
            ah: self.get(Param::AH),
            qinv: self.get(Param::QInv),
        }
    }
}

/// Read-only view of the 13 parameter values; field names match the
/// canonical result-table headers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrammarSnapshot {
    #[serde(rename = "SP")]
    pub sp: f64,
    #[serde(rename = "HIP")]
    pub hip: f64,
    #[serde(rename = "HCP")]
    pub hcp: f64,
    #[serde(rename = "OPT")]
    pub opt: f64,
    #[serde(rename = "NS")]
    pub ns: f64,
    #[serde(rename = "NT")]
    pub nt: f64,
    #[serde(rename = "WHM")]
    pub whm: f64,
    #[serde(rename = "PI")]
    pub pi: f64,
    #[serde(rename = "TM")]
    pub tm: f64,
    #[serde(rename = "VtoI")]
    pub vtoi: f64,
    #[serde(rename = "ItoC")]
    pub itoc: f64,
    #[serde(rename = "AH")]
    pub ah: f64,
    #[serde(rename = "QInv")]
    pub qinv: f64,
}
