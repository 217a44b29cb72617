//! Node and edge records for the vis.js network view
//!
//! Records serialize to JSON, which is also a valid JavaScript literal, so
//! the arrays can be dropped straight into a `<script>` block.

use crate::core::*;
use crate::error::{Error, Result};
use crate::html::escape_html;
use crate::lower::*;
use crate::style::*;

use serde::Serialize;

const STEP_EDGE_LENGTH: u32 = 300;
const RELAY_EDGE_LENGTH: u32 = 200;
const RELAY_RADIUS: u32 = 10;
const EDGE_WIDTH: u32 = 2;

/// One node of the interactive view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisNode {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub shape: String,
    pub color: String,
    pub font_color: String,
    pub font_size: u32,
    /// Tooltip listing the literal's attributes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    pub is_active: bool,
    /// Level used by the hierarchical layout: twice the literal depth, relays
    /// sit one level right of their deepest tail
    pub depth: u32,
}

/// Normal, highlighted and hovered color of an edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisColor {
    pub color: String,
    pub highlight: String,
    pub hover: String,
}

/// One edge of the interactive view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisEdge {
    pub from: u64,
    pub to: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub style: String,
    pub length: u32,
    pub color: VisColor,
    pub font_color: String,
    pub font_size: u32,
    pub width: u32,
    pub width_selection_multiplier: u32,
    pub is_active: bool,
}

/// Node and edge records of one proof graph
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisBundle {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
}

/// Builds the interactive records of a proof graph
///
/// All entities are emitted; hiding inactive ones is left to the page.
pub fn render_vis(graph: &ProofGraph, config: &StyleConfig) -> Result<VisBundle> {
    let lowered = LoweredGraph::new(graph, LowerOptions::default())?;
    VisBundle::new(&lowered, config)
}

impl VisBundle {
    /// Builds records from a lowered graph
    ///
    /// Literal identifiers are replaced by the dense ids of
    /// [`LoweredGraph::dense_ids`]; relays keep their relay ids and carry the
    /// step label themselves, so relayed edges are unlabeled.
    pub fn new(lowered: &LoweredGraph, config: &StyleConfig) -> Result<Self> {
        let dense = lowered.dense_ids();
        let name = &lowered.source().name;

        let vis_id = |node: &LoweredNode| -> Result<u64> {
            match node {
                LoweredNode::Literal(l) => dense
                    .get(&l.id)
                    .map(|i| *i as u64)
                    .ok_or_else(|| Error::dangling(name, node)),
                LoweredNode::Relay { id, .. } => Ok(*id),
            }
        };

        let mut nodes = vec![];
        for node in lowered.nodes() {
            let record = match node {
                LoweredNode::Literal(l) => literal_node(config, l, vis_id(node)?),
                LoweredNode::Relay { kind, step, id } => {
                    relay_node(config, lowered.source(), *kind, step, *id)
                }
            };
            nodes.push(record);
        }

        let mut edges = vec![];
        for (from, to, edge) in lowered.edges() {
            let (from, to) = (vis_id(from)?, vis_id(to)?);
            let (from, to) = if edge.reversed { (to, from) } else { (from, to) };
            edges.push(edge_record(config, edge, from, to));
        }

        Ok(VisBundle { nodes, edges })
    }

    /// Returns the node array as JavaScript source
    pub fn nodes_js(&self) -> Result<String> {
        array_literal(&self.nodes)
    }

    /// Returns the edge array as JavaScript source
    pub fn edges_js(&self) -> Result<String> {
        array_literal(&self.edges)
    }
}

/// Serializes records as a JavaScript array
///
/// `<` only occurs inside JSON strings, where `\u003c` keeps its meaning
/// while no longer being able to open a `</script>` tag.
fn array_literal<T: Serialize>(items: &[T]) -> Result<String> {
    let records = items
        .iter()
        .map(|item| serde_json::to_string(item).map(|json| json.replace('<', "\\u003c")))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if records.is_empty() {
        return Ok("[]".to_owned());
    }
    Ok(format!("[\n    {}\n  ]", records.join(",\n    ")))
}

fn tooltip(literal: &Literal) -> String {
    let mut lines = vec![
        format!("id = <b>{}</b>", literal.id),
        format!("type = <b>{}</b>", escape_html(&literal.kind)),
    ];
    lines.extend(
        literal
            .extra
            .iter()
            .map(|(k, v)| format!("{} = <b>{}</b>", escape_html(k), escape_html(v))),
    );
    lines.join("<br>")
}

fn literal_node(config: &StyleConfig, literal: &Literal, id: u64) -> VisNode {
    let style = config.literal_style(literal);
    VisNode {
        id,
        label: Some(literal.label.clone()),
        shape: "box".to_owned(),
        color: style.fill,
        font_color: style.font_color,
        font_size: config.vis_font_size,
        title: Some(tooltip(literal)),
        radius: None,
        is_active: literal.active,
        depth: literal.depth.unwrap_or(0).saturating_mul(2),
    }
}

fn relay_node(config: &StyleConfig, graph: &ProofGraph, kind: StepKind, step: &Step, id: u64) -> VisNode {
    let style = config.step_style(kind, step);
    let deepest_tail = step
        .tail
        .iter()
        .filter_map(|l| graph.literal(*l).and_then(|l| l.depth))
        .max()
        .unwrap_or(0);
    VisNode {
        id,
        label: Some(step_label(step, kind, "\n")),
        shape: "dot".to_owned(),
        color: style.color,
        font_color: style.font_color,
        font_size: config.vis_font_size,
        title: None,
        radius: Some(RELAY_RADIUS),
        is_active: step.active,
        depth: deepest_tail.saturating_mul(2).saturating_add(1),
    }
}

fn edge_record(config: &StyleConfig, edge: &LoweredEdge, from: u64, to: u64) -> VisEdge {
    let (style, label, line, length) = match edge.origin {
        EdgeOrigin::Step(kind, step) => (
            config.step_style(kind, step),
            step_label(step, kind, "\n"),
            match kind {
                StepKind::Chain => "arrow",
                StepKind::Candidate => "dash-line",
            },
            if edge.relayed {
                RELAY_EDGE_LENGTH
            } else {
                STEP_EDGE_LENGTH
            },
        ),
        EdgeOrigin::Unification(u) => (
            config.unification_style(u),
            u.unifier.join(", "),
            "dash-line",
            STEP_EDGE_LENGTH,
        ),
    };

    VisEdge {
        from,
        to,
        label: if edge.labeled && !edge.relayed {
            Some(label)
        } else {
            None
        },
        style: line.to_owned(),
        length,
        color: VisColor {
            color: style.color,
            highlight: style.highlight,
            hover: style.hover,
        },
        font_color: style.font_color,
        font_size: config.vis_font_size,
        width: EDGE_WIDTH,
        width_selection_multiplier: EDGE_WIDTH,
        is_active: edge.is_active(),
    }
}
