use crate::core::*;
use crate::error::Result;
use crate::lower::*;
use crate::style::*;

use std::fmt::Write as _;

/// Options for the static DOT output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DotOptions {
    /// Leave inactive entities out entirely instead of dimming them
    pub active_only: bool,
}

/// Renders a proof graph in the [DOT](https://graphviz.org/doc/info/lang.html)
/// markup language
pub fn render_dot(graph: &ProofGraph, config: &StyleConfig, options: DotOptions) -> Result<String> {
    let lowered = LoweredGraph::new(
        graph,
        LowerOptions {
            active_only: options.active_only,
        },
    )?;
    Ok(lowered.dot(config)?)
}

/// `key = value` attribute list of one statement
struct Props(Vec<(&'static str, String)>);

impl Props {
    fn new() -> Self {
        Props(vec![])
    }

    fn raw(mut self, key: &'static str, value: impl ToString) -> Self {
        self.0.push((key, value.to_string()));
        self
    }

    fn quoted(self, key: &'static str, value: &str) -> Self {
        self.raw(key, format!("\"{}\"", value))
    }

    fn with_label(self, labeled: bool, label: impl FnOnce() -> String) -> Self {
        if labeled {
            self.quoted("label", &label())
        } else {
            self
        }
    }
}

impl std::fmt::Display for Props {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut first = true;
        for (k, v) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", k, v)?;
            first = false;
        }
        Ok(())
    }
}

/// DOT formatting
impl LoweredGraph<'_> {
    fn literal_props(config: &StyleConfig, literal: &Literal) -> Props {
        let style = config.literal_style(literal);
        Props::new()
            .raw("shape", "box")
            .raw("style", "filled")
            .quoted("fillcolor", &style.fill)
            .quoted("color", &style.outline)
            .raw("peripheries", style.peripheries)
            .quoted("fontname", &config.font_name)
            .raw("fontsize", config.node_font_size)
            .quoted("fontcolor", &style.font_color)
            .quoted("label", &literal.label)
    }

    fn edge_props(config: &StyleConfig, edge: &LoweredEdge) -> Props {
        let props = match edge.origin {
            EdgeOrigin::Step(StepKind::Chain, step) => {
                let style = config.step_style(StepKind::Chain, step);
                Props::new()
                    .raw("dir", if edge.reversed { "back" } else { "forward" })
                    .quoted("color", &style.color)
                    .quoted("fontcolor", &style.font_color)
                    .with_label(edge.labeled, || step_label(step, StepKind::Chain, "\\n"))
            }
            EdgeOrigin::Step(StepKind::Candidate, step) => {
                let style = config.step_style(StepKind::Candidate, step);
                Props::new()
                    .raw("dir", "none")
                    .raw("style", "dashed")
                    .quoted("color", &style.color)
                    .quoted("fontcolor", &style.font_color)
                    .with_label(edge.labeled, || step_label(step, StepKind::Candidate, "\\n"))
            }
            EdgeOrigin::Unification(u) => {
                let style = config.unification_style(u);
                let terms: Vec<_> = u.unifier.iter().map(|t| escape_quotes(t)).collect();
                Props::new()
                    .raw("dir", "none")
                    .raw("style", "dotted")
                    .quoted("color", &style.color)
                    .quoted("fontcolor", &style.font_color)
                    .quoted("label", &terms.join("\\n"))
            }
        };
        props
            .quoted("fontname", &config.font_name)
            .raw("fontsize", config.edge_font_size)
    }

    /// Returns a representation of the lowered graph in the DOT markup
    /// language
    ///
    /// Literals are named `node_<id>` and relays `relay_<relay id>`. Literals
    /// of equal depth share a rank.
    pub fn dot(&self, config: &StyleConfig) -> std::result::Result<String, std::fmt::Error> {
        let mut s = String::new();
        writeln!(s, "digraph proofgraph{{")?;
        writeln!(s, "  graph [rankdir = LR];")?;

        for node in self.nodes() {
            let props = match node {
                LoweredNode::Literal(l) => Self::literal_props(config, l),
                LoweredNode::Relay { kind, step, .. } => Props::new()
                    .raw("shape", "point")
                    .quoted("color", &config.step_style(*kind, step).color),
            };
            writeln!(s, "  {} [{}];", node, props)?;
        }

        for (from, to, edge) in self.edges() {
            writeln!(s, "  {} -> {} [{}];", from, to, Self::edge_props(config, edge))?;
        }

        for ids in rank_groups(self.literals()).values() {
            let names: Vec<_> = ids.iter().map(|id| format!("node_{}", id)).collect();
            writeln!(s, "  {{rank = same; {}}}", names.join("; "))?;
        }

        writeln!(s, "}}")?;
        Ok(s)
    }
}
