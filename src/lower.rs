use crate::core::*;
use crate::error::{Error, Result};

use indexmap::IndexMap;
use petgraph::stable_graph as pg;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::fmt;

////////////////////////////////////////////////////////////////////////////////
// Nodes

/// Identifies a node of a lowered graph independently of petgraph indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Literal(LiteralId),
    Relay(StepKind, StepId),
}

/// A node of a lowered graph
#[derive(Debug, Clone)]
pub enum LoweredNode<'g> {
    /// A literal of the proof graph
    Literal(&'g Literal),
    /// A synthetic node standing in for a step with several tails or heads
    Relay {
        kind: StepKind,
        step: &'g Step,
        /// Numeric identifier, disjoint from every literal identifier
        id: u64,
    },
}

impl LoweredNode<'_> {
    /// Returns true iff the underlying entity belongs to the solution
    pub fn is_active(&self) -> bool {
        match self {
            Self::Literal(l) => l.active,
            Self::Relay { step, .. } => step.active,
        }
    }

    /// Returns true iff the node is a relay node
    pub fn is_relay(&self) -> bool {
        matches!(self, Self::Relay { .. })
    }
}

/// Node names as used in the DOT output
impl fmt::Display for LoweredNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Literal(l) => write!(f, "node_{}", l.id),
            Self::Relay { id, .. } => write!(f, "relay_{}", id),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Edges

/// What a lowered edge was produced from
#[derive(Debug, Clone, Copy)]
pub enum EdgeOrigin<'g> {
    Step(StepKind, &'g Step),
    Unification(&'g Unification),
}

/// A binary edge of a lowered graph
#[derive(Debug, Clone)]
pub struct LoweredEdge<'g> {
    pub origin: EdgeOrigin<'g>,
    /// Only the first edge of each step carries the step's label
    pub labeled: bool,
    /// Set for backward steps: the arrowhead points toward the tail
    pub reversed: bool,
    /// Set for edges that touch a relay node
    pub relayed: bool,
}

impl LoweredEdge<'_> {
    /// Returns true iff the underlying entity belongs to the solution
    pub fn is_active(&self) -> bool {
        match self.origin {
            EdgeOrigin::Step(_, s) => s.active,
            EdgeOrigin::Unification(u) => u.active,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Lowered graphs

/// Options controlling which entities are lowered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LowerOptions {
    /// Drop inactive literals, steps and unifications, along with any step
    /// or unification touching a dropped literal
    pub active_only: bool,
}

/// A proof graph with every hyperedge replaced by binary edges
///
/// Steps with one tail and one head become a single edge; wider steps get
/// a relay node with one edge per tail literal into it and one edge per head
/// literal out of it.
#[derive(Debug, Clone)]
pub struct LoweredGraph<'g> {
    graph: &'g ProofGraph,
    pg: pg::StableGraph<LoweredNode<'g>, LoweredEdge<'g>>,
    translation: IndexMap<NodeKey, pg::NodeIndex>,
    steps: Vec<(StepKind, &'g Step)>,
    unifications: Vec<&'g Unification>,
    relay_base: u64,
}

/// Returns the smallest power of ten strictly greater than `max_id`
pub fn relay_base(max_id: Option<LiteralId>) -> u64 {
    let max_id = max_id.map_or(0, u64::from);
    let mut base = 1;
    while base <= max_id {
        base *= 10;
    }
    base
}

/// Returns true iff active-only lowering drops an entity with the given
/// activity and endpoints
fn excluded(
    graph: &ProofGraph,
    options: LowerOptions,
    active: bool,
    mut endpoints: impl Iterator<Item = LiteralId>,
) -> bool {
    options.active_only
        && (!active || endpoints.any(|l| graph.literal(l).map_or(false, |l| !l.active)))
}

/// # Creating a lowered graph
impl<'g> LoweredGraph<'g> {
    /// Lowers a proof graph
    ///
    /// Fails with [`Error::DanglingReference`] if a step or unification
    /// refers to a literal that is not in the lowered node set.
    pub fn new(graph: &'g ProofGraph, options: LowerOptions) -> Result<Self> {
        let mut lowered = Self {
            graph,
            pg: pg::StableGraph::new(),
            translation: IndexMap::new(),
            steps: vec![],
            unifications: vec![],
            relay_base: relay_base(graph.max_literal_id()),
        };

        for literal in graph.literals.values().filter(|l| l.active || !options.active_only) {
            let pid = lowered.pg.add_node(LoweredNode::Literal(literal));
            lowered.translation.insert(NodeKey::Literal(literal.id), pid);
        }

        for (kind, steps) in graph.step_lists() {
            for step in steps.values() {
                if excluded(graph, options, step.active, step.endpoints()) {
                    continue;
                }
                lowered.add_step(kind, step)?;
            }
        }

        for u in &graph.unifications {
            if excluded(graph, options, u.active, [u.pair.0, u.pair.1].into_iter()) {
                continue;
            }
            let from = lowered.literal_index(u.pair.0)?;
            let to = lowered.literal_index(u.pair.1)?;
            let edge = LoweredEdge {
                origin: EdgeOrigin::Unification(u),
                labeled: true,
                reversed: false,
                relayed: false,
            };
            let _ = lowered.pg.add_edge(from, to, edge);
            lowered.unifications.push(u);
        }

        tracing::debug!(
            graph = %graph.name,
            nodes = lowered.pg.node_count(),
            relays = lowered.relay_count(),
            edges = lowered.pg.edge_count(),
            "lowered proof graph"
        );
        Ok(lowered)
    }

    fn literal_index(&self, id: LiteralId) -> Result<pg::NodeIndex> {
        self.translation
            .get(&NodeKey::Literal(id))
            .copied()
            .ok_or_else(|| Error::dangling(&self.graph.name, format!("node_{}", id)))
    }

    fn add_step(&mut self, kind: StepKind, step: &'g Step) -> Result<()> {
        let reversed = kind == StepKind::Chain && step.backward;
        let edge = |labeled, relayed| LoweredEdge {
            origin: EdgeOrigin::Step(kind, step),
            labeled,
            reversed,
            relayed,
        };

        let (tail, head) = match (step.tail.first(), step.head.first()) {
            (Some(t), Some(h)) => (*t, *h),
            _ => {
                return Err(Error::malformed(
                    &self.graph.name,
                    format!("{} {} has an empty side", kind, step.id),
                ))
            }
        };

        if !step.needs_relay() {
            let from = self.literal_index(tail)?;
            let to = self.literal_index(head)?;
            let _ = self.pg.add_edge(from, to, edge(true, false));
        } else {
            // resolve every endpoint before touching the graph
            let tails = step
                .tail
                .iter()
                .map(|l| self.literal_index(*l))
                .collect::<Result<Vec<_>>>()?;
            let heads = step
                .head
                .iter()
                .map(|l| self.literal_index(*l))
                .collect::<Result<Vec<_>>>()?;

            let id = self.relay_id(kind, step.id);
            let relay = self.pg.add_node(LoweredNode::Relay { kind, step, id });
            self.translation.insert(NodeKey::Relay(kind, step.id), relay);

            let mut first = true;
            for t in tails {
                let _ = self.pg.add_edge(t, relay, edge(first, true));
                first = false;
            }
            for h in heads {
                let _ = self.pg.add_edge(relay, h, edge(first, true));
                first = false;
            }
        }

        self.steps.push((kind, step));
        Ok(())
    }
}

/// # Basic operations
impl<'g> LoweredGraph<'g> {
    /// Returns the proof graph this graph was lowered from
    pub fn source(&self) -> &'g ProofGraph {
        self.graph
    }

    /// Returns the smallest power of ten above every literal identifier
    pub fn relay_base(&self) -> u64 {
        self.relay_base
    }

    /// Returns the numeric identifier of a step's relay node
    ///
    /// Chain relays live in `[base, 2 * base)` and candidate relays in
    /// `[2 * base, 3 * base)`, provided step identifiers stay below `base`.
    pub fn relay_id(&self, kind: StepKind, step: StepId) -> u64 {
        let offset = match kind {
            StepKind::Chain => self.relay_base,
            StepKind::Candidate => 2 * self.relay_base,
        };
        offset + u64::from(step)
    }

    /// Returns an iterator of all nodes: literals first, then relays in
    /// step order
    pub fn nodes(&self) -> impl Iterator<Item = &LoweredNode<'g>> {
        self.pg.node_weights()
    }

    /// Returns an iterator of all edges in insertion order
    pub fn edges(
        &self,
    ) -> impl Iterator<Item = (&LoweredNode<'g>, &LoweredNode<'g>, &LoweredEdge<'g>)> {
        self.pg
            .edge_references()
            .map(|e| (&self.pg[e.source()], &self.pg[e.target()], e.weight()))
    }

    /// Returns the lowered steps in lowering order
    pub fn steps(&self) -> &[(StepKind, &'g Step)] {
        &self.steps
    }

    /// Returns the lowered unifications in document order
    pub fn unifications(&self) -> &[&'g Unification] {
        &self.unifications
    }

    /// Returns the node for a key, if it was lowered
    pub fn node(&self, key: NodeKey) -> Option<&LoweredNode<'g>> {
        self.translation.get(&key).map(|pid| &self.pg[*pid])
    }

    /// Returns the literals that were lowered, in document order
    pub fn literals(&self) -> impl Iterator<Item = &'g Literal> + '_ {
        self.pg.node_weights().filter_map(|n| match n {
            LoweredNode::Literal(l) => Some(*l),
            LoweredNode::Relay { .. } => None,
        })
    }

    pub fn node_count(&self) -> usize {
        self.pg.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.pg.edge_count()
    }

    pub fn relay_count(&self) -> usize {
        self.pg.node_weights().filter(|n| n.is_relay()).count()
    }

    /// Assigns dense identifiers `0..k` to the lowered literals
    ///
    /// Literals are numbered the first time they are met, visiting chains
    /// by ascending identifier (tails, then heads), then candidates the same
    /// way, then unification endpoints in order, then any remaining literal
    /// in document order.
    pub fn dense_ids(&self) -> IndexMap<LiteralId, usize> {
        let mut ids = IndexMap::new();
        let mut visit = |l: LiteralId| {
            let next = ids.len();
            ids.entry(l).or_insert(next);
        };

        let mut steps = self.steps.clone();
        steps.sort_by_key(|(kind, step)| (*kind, step.id));
        for (_, step) in steps {
            step.endpoints().for_each(&mut visit);
        }
        for u in &self.unifications {
            visit(u.pair.0);
            visit(u.pair.1);
        }
        for l in self.literals() {
            visit(l.id);
        }
        ids
    }
}
