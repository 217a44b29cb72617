use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;

/// Literal attributes that are part of the model itself; everything else an
/// engine attaches to a `<literal>` ends up in [`Literal::extra`]
pub const DEFAULT_LITERAL_ATTRIBUTES: [&str; 4] = ["id", "type", "depth", "active"];

/// Literal identifiers (unique within one proof graph)
pub type LiteralId = u32;

/// Inference step identifiers (unique within one step list)
pub type StepId = u32;

////////////////////////////////////////////////////////////////////////////////
// Literals

/// A node of the proof graph: one observed or hypothesized predicate instance
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub id: LiteralId,
    /// Search ply at which the literal was introduced (`None` if unplaced)
    pub depth: Option<u32>,
    pub active: bool,
    /// Type tag, e.g. `observable` or `hypothesis`
    pub kind: String,
    /// Display text, already stripped and escaped (see [`display_text`])
    pub label: String,
    /// Engine-supplied attributes beyond the defaults, for tooltips only
    pub extra: IndexMap<String, String>,
}

impl Literal {
    /// Creates a literal with no extra attributes
    pub fn new(
        id: LiteralId,
        depth: Option<u32>,
        active: bool,
        kind: &str,
        label: &str,
    ) -> Self {
        Self {
            id,
            depth,
            active,
            kind: kind.to_owned(),
            label: label.to_owned(),
            extra: IndexMap::new(),
        }
    }

    /// Returns true iff the type tag marks the literal as an observation
    pub fn is_observable(&self) -> bool {
        self.kind.starts_with("observable")
    }
}

/// Derives the text shown for a literal from the engine's raw text
///
/// The engine appends `:<index>` to every literal; the suffix after the last
/// colon is dropped. Quote characters are replaced with placeholder tokens so
/// they can never terminate a quoted string in the serialized output.
pub fn display_text(raw: &str) -> String {
    let raw = raw.trim();
    let stripped = match raw.rfind(':') {
        Some(i) => &raw[..i],
        None => raw,
    };
    escape_quotes(stripped)
}

/// Replaces `'` with `_qt_` and `"` with `_dq_`
pub fn escape_quotes(s: &str) -> String {
    s.replace('\'', "_qt_").replace('"', "_dq_")
}

////////////////////////////////////////////////////////////////////////////////
// Inference steps

/// Distinguishes the two step lists of a proof graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKind {
    /// An explanation (chain) performed by the engine
    Chain,
    /// A candidate new axiom; never has a direction
    Candidate,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Chain => write!(f, "explanation"),
            Self::Candidate => write!(f, "new_axiom"),
        }
    }
}

/// A hyperedge: one application of an axiom
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: StepId,
    /// Conjunctive premises, in document order
    pub tail: Vec<LiteralId>,
    /// Conclusions, in document order
    pub head: Vec<LiteralId>,
    pub axiom: String,
    pub active: bool,
    /// Explored backward (hypothesis-driven); always false for candidates
    pub backward: bool,
    pub cost: Option<f64>,
}

impl Step {
    /// Returns true iff the step cannot be drawn as a single binary edge
    pub fn needs_relay(&self) -> bool {
        self.tail.len() > 1 || self.head.len() > 1
    }

    /// Returns the literals the step touches, tails first
    pub fn endpoints(&self) -> impl Iterator<Item = LiteralId> + '_ {
        self.tail.iter().chain(self.head.iter()).copied()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Unifications

/// A pairwise merge of two literals
#[derive(Debug, Clone, PartialEq)]
pub struct Unification {
    pub pair: (LiteralId, LiteralId),
    /// Substitution terms, e.g. `x=y`
    pub unifier: Vec<String>,
    pub active: bool,
}

////////////////////////////////////////////////////////////////////////////////
// Metadata

/// Terminal state of the optimization that produced a proof graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionState {
    Optimal,
    SubOptimal,
    NotAvailable,
    Other(String),
}

impl SolutionState {
    /// Parses the engine's state tag
    pub fn parse(s: &str) -> Self {
        match s {
            "optimal" => Self::Optimal,
            "sub-optimal" => Self::SubOptimal,
            "not-available" => Self::NotAvailable,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns false only for runs that produced no solution
    pub fn is_available(&self) -> bool {
        *self != Self::NotAvailable
    }
}

impl fmt::Display for SolutionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Optimal => write!(f, "optimal"),
            Self::SubOptimal => write!(f, "sub-optimal"),
            Self::NotAvailable => write!(f, "not-available"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A value recorded for each phase of the engine
///
/// Phases: candidate generation (`lhs`), ILP construction (`ilp`), solving
/// (`sol`) and the whole inference (`all`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Phases<T> {
    pub lhs: T,
    pub ilp: T,
    pub sol: T,
    pub all: T,
}

/// Phase names in the order [`Phases::values`] returns them
pub const PHASE_NAMES: [&str; 4] = ["lhs", "ilp", "sol", "all"];

impl<T: Copy> Phases<T> {
    /// Returns the values in `lhs, ilp, sol, all` order
    pub fn values(&self) -> [T; 4] {
        [self.lhs, self.ilp, self.sol, self.all]
    }
}

/// Elapsed seconds per phase
pub type PhaseTimes = Phases<f64>;

/// Timeout flags per phase
pub type PhaseTimeouts = Phases<bool>;

/// One requirement label checked against the solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub satisfied: bool,
    /// `Some(true)` for a gold label, `Some(false)` for a distractor
    pub gold: Option<bool>,
}

/// How a run answered its requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// No requirement labels
    None,
    /// A plain requirement was satisfied
    Yes,
    /// A plain requirement was not satisfied
    No,
    /// A gold label was satisfied
    True,
    /// A distractor label was satisfied
    False,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
        }
    }
}

/// The engine's configuration block, shown in reports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    pub version: Option<String>,
    /// Component element name (e.g. `generator`) to its attributes
    pub components: IndexMap<String, IndexMap<String, String>>,
    pub params: IndexMap<String, String>,
}

////////////////////////////////////////////////////////////////////////////////
// Proof graphs

/// One complete proof graph (main data structure for this crate)
///
/// A proof graph exclusively owns its literals, steps and unifications.
/// Graphs built by [`crate::parse_document`] are already validated; graphs
/// built by hand can be checked with [`ProofGraph::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProofGraph {
    pub name: String,
    pub state: SolutionState,
    pub objective: f64,
    pub time: PhaseTimes,
    pub timeout: PhaseTimeouts,
    /// Literals in document order
    pub literals: IndexMap<LiteralId, Literal>,
    pub chains: BTreeMap<StepId, Step>,
    pub candidates: BTreeMap<StepId, Step>,
    pub unifications: Vec<Unification>,
    pub requirements: Vec<Requirement>,
}

/// # Creating a proof graph
impl ProofGraph {
    /// Creates an empty proof graph with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            state: SolutionState::Optimal,
            objective: 0.0,
            time: PhaseTimes::default(),
            timeout: PhaseTimeouts::default(),
            literals: IndexMap::new(),
            chains: BTreeMap::new(),
            candidates: BTreeMap::new(),
            unifications: Vec::new(),
            requirements: Vec::new(),
        }
    }

    /// Checks the structural invariants: every step has a non-empty tail and
    /// head, and every step and unification references known literals
    pub fn validate(&self) -> Result<()> {
        for (kind, steps) in self.step_lists() {
            for step in steps.values() {
                if step.tail.is_empty() || step.head.is_empty() {
                    let side = if step.tail.is_empty() { "tail" } else { "head" };
                    return Err(Error::malformed(
                        &self.name,
                        format!("{} {} has an empty {}", kind, step.id, side),
                    ));
                }
                if let Some(l) = step.endpoints().find(|l| !self.literals.contains_key(l)) {
                    return Err(Error::malformed(
                        &self.name,
                        format!("{} {} references unknown literal {}", kind, step.id, l),
                    ));
                }
            }
        }

        for u in &self.unifications {
            for l in [u.pair.0, u.pair.1] {
                if !self.literals.contains_key(&l) {
                    return Err(Error::malformed(
                        &self.name,
                        format!("unification references unknown literal {}", l),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// # Basic operations
impl ProofGraph {
    /// Returns both step lists tagged with their kind
    pub fn step_lists(&self) -> [(StepKind, &BTreeMap<StepId, Step>); 2] {
        [
            (StepKind::Chain, &self.chains),
            (StepKind::Candidate, &self.candidates),
        ]
    }

    /// Returns the literal with the given identifier, if it exists
    pub fn literal(&self, id: LiteralId) -> Option<&Literal> {
        self.literals.get(&id)
    }

    /// Returns the largest literal identifier, if there are any literals
    pub fn max_literal_id(&self) -> Option<LiteralId> {
        self.literals.keys().copied().max()
    }

    /// Returns the number of observable literals
    pub fn observation_count(&self) -> usize {
        self.literals.values().filter(|l| l.is_observable()).count()
    }

    /// Returns the number of literals that are not observations
    pub fn hypothesis_count(&self) -> usize {
        self.literals.len() - self.observation_count()
    }

    /// Derives the run's answer from its requirement labels
    ///
    /// A satisfied distractor beats a satisfied gold label, which beats the
    /// last plain requirement.
    pub fn answer(&self) -> Answer {
        let mut answer = Answer::None;
        for r in self.requirements.iter().filter(|r| r.gold.is_none()) {
            answer = if r.satisfied { Answer::Yes } else { Answer::No };
        }
        let satisfied = |gold| {
            self.requirements
                .iter()
                .any(|r| r.satisfied && r.gold == Some(gold))
        };
        if satisfied(true) {
            answer = Answer::True;
        }
        if satisfied(false) {
            answer = Answer::False;
        }
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: StepId, tail: &[LiteralId], head: &[LiteralId]) -> Step {
        Step {
            id,
            tail: tail.to_vec(),
            head: head.to_vec(),
            axiom: format!("r{}", id),
            active: true,
            backward: false,
            cost: None,
        }
    }

    #[test]
    fn display_text_strips_index_suffix_and_quotes() {
        assert_eq!(display_text("p(x, y):12"), "p(x, y)");
        assert_eq!(display_text("(= x y):3"), "(= x y)");
        assert_eq!(display_text("q('a'):0"), "q(_qt_a_qt_)");
        assert_eq!(display_text("say(\"hi\")"), "say(_dq_hi_dq_)");
        assert_eq!(display_text("plain"), "plain");
    }

    #[test]
    fn relay_needed_only_for_wide_steps() {
        assert!(!step(0, &[0], &[1]).needs_relay());
        assert!(step(1, &[0, 1], &[2]).needs_relay());
        assert!(step(2, &[0], &[1, 2]).needs_relay());
    }

    #[test]
    fn validate_reports_unknown_literal() {
        let mut g = ProofGraph::new("g");
        g.literals.insert(0, Literal::new(0, Some(0), true, "observable", "a"));
        g.chains.insert(0, step(0, &[0], &[99]));
        match g.validate() {
            Err(Error::MalformedInput { graph, reason }) => {
                assert_eq!(graph, "g");
                assert!(reason.contains("99"), "{}", reason);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_empty_side() {
        let mut g = ProofGraph::new("g");
        g.literals.insert(0, Literal::new(0, Some(0), true, "observable", "a"));
        g.candidates.insert(4, step(4, &[], &[0]));
        let err = g.validate().unwrap_err();
        assert!(err.to_string().contains("empty tail"), "{}", err);
    }

    #[test]
    fn answer_prefers_distractor_over_gold() {
        let mut g = ProofGraph::new("g");
        assert_eq!(g.answer(), Answer::None);
        g.requirements.push(Requirement { satisfied: false, gold: None });
        assert_eq!(g.answer(), Answer::No);
        g.requirements.push(Requirement { satisfied: true, gold: Some(true) });
        assert_eq!(g.answer(), Answer::True);
        g.requirements.push(Requirement { satisfied: true, gold: Some(false) });
        assert_eq!(g.answer(), Answer::False);
    }

    #[test]
    fn counts_observations_and_hypotheses() {
        let mut g = ProofGraph::new("g");
        g.literals.insert(0, Literal::new(0, Some(0), true, "observable", "a"));
        g.literals.insert(1, Literal::new(1, Some(1), true, "hypothesis", "b"));
        g.literals.insert(2, Literal::new(2, None, false, "observable-x", "c"));
        assert_eq!(g.observation_count(), 2);
        assert_eq!(g.hypothesis_count(), 1);
        assert_eq!(g.max_literal_id(), Some(2));
    }
}
