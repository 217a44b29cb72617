use crate::core::*;
use crate::error::{Error, Result};

use indexmap::IndexMap;
use roxmltree::Node as XmlNode;
use std::collections::BTreeMap;
use std::str::FromStr;

/// A parsed engine output document
///
/// Each `<proofgraph>` element is parsed on its own, so one malformed graph
/// leaves its siblings intact.
#[derive(Debug)]
pub struct Document {
    pub configuration: Option<Configuration>,
    pub graphs: Vec<Result<ProofGraph>>,
}

impl Document {
    /// Returns the graphs that parsed successfully
    pub fn valid_graphs(&self) -> impl Iterator<Item = &ProofGraph> {
        self.graphs.iter().filter_map(|g| g.as_ref().ok())
    }
}

/// Parses an engine output document
///
/// Fails only if the text is not well-formed XML; per-graph problems are
/// reported in [`Document::graphs`].
pub fn parse_document(text: &str) -> Result<Document> {
    let doc = roxmltree::Document::parse(text)?;
    let root = doc.root_element();

    let configuration = root
        .descendants()
        .find(|n| n.has_tag_name("configure"))
        .map(Configuration::from);

    let graphs: Vec<_> = root
        .descendants()
        .filter(|n| n.has_tag_name("proofgraph"))
        .enumerate()
        .map(|(i, pg)| {
            let graph = ProofGraph::try_from(pg).map_err(|e| e.or_graph(&format!("#{}", i)));
            match &graph {
                Ok(g) => tracing::debug!(
                    graph = %g.name,
                    literals = g.literals.len(),
                    chains = g.chains.len(),
                    unifications = g.unifications.len(),
                    "parsed proof graph"
                ),
                Err(e) => tracing::warn!(index = i, "{}", e),
            }
            graph
        })
        .collect();

    tracing::info!("read {} proof graphs", graphs.len());
    Ok(Document {
        configuration,
        graphs,
    })
}

////////////////////////////////////////////////////////////////////////////////
// Attribute helpers

/// Reads attributes of one element, naming the graph in every error
struct Attrs<'g, 'a, 'input> {
    graph: &'g str,
    node: XmlNode<'a, 'input>,
}

impl<'g, 'a, 'input> Attrs<'g, 'a, 'input> {
    fn new(graph: &'g str, node: XmlNode<'a, 'input>) -> Self {
        Self { graph, node }
    }

    fn required(&self, key: &str) -> Result<&'a str> {
        self.node.attribute(key).ok_or_else(|| {
            Error::malformed(
                self.graph,
                format!(
                    "missing '{}' attribute on <{}>",
                    key,
                    self.node.tag_name().name()
                ),
            )
        })
    }

    fn number<T: FromStr>(&self, key: &str) -> Result<T> {
        let raw = self.required(key)?;
        raw.trim().parse().map_err(|_| {
            Error::malformed(
                self.graph,
                format!(
                    "'{}' attribute on <{}> is not a number: '{}'",
                    key,
                    self.node.tag_name().name(),
                    raw
                ),
            )
        })
    }

    fn optional_number<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.node.attribute(key) {
            Some(_) => self.number(key).map(Some),
            None => Ok(None),
        }
    }

    fn flag(&self, key: &str) -> Result<bool> {
        Ok(self.required(key)? == "yes")
    }

    fn hypernode(&self, key: &str) -> Result<Vec<LiteralId>> {
        let raw = self.required(key)?;
        parse_hypernode(raw).ok_or_else(|| {
            Error::malformed(
                self.graph,
                format!(
                    "'{}' attribute on <{}> is not a literal list: '{}'",
                    key,
                    self.node.tag_name().name(),
                    raw
                ),
            )
        })
    }
}

/// Parses a hypernode attribute
///
/// Accepts `{3,7,9}`, the engine's indexed form `12:{3,7,9}`, and a bare
/// `3,7,9`. Returns `None` if any element is not a literal identifier.
pub fn parse_hypernode(s: &str) -> Option<Vec<LiteralId>> {
    let inner = match (s.find('{'), s.rfind('}')) {
        (Some(open), Some(close)) if open < close => &s[open + 1..close],
        (None, None) => s,
        _ => return None,
    };
    inner
        .split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(|x| x.parse().ok())
        .collect()
}

fn children<'a, 'input>(
    node: XmlNode<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = XmlNode<'a, 'input>> {
    node.descendants().filter(move |n| n.has_tag_name(tag))
}

fn text_of<'a>(node: XmlNode<'a, '_>) -> &'a str {
    node.text().unwrap_or("")
}

////////////////////////////////////////////////////////////////////////////////
// Conversion

impl<'a, 'input> TryFrom<XmlNode<'a, 'input>> for ProofGraph {
    type Error = Error;

    fn try_from(pg: XmlNode<'a, 'input>) -> Result<Self> {
        let name = Attrs::new("", pg).required("name")?.to_owned();
        let attrs = Attrs::new(&name, pg);

        let state = SolutionState::parse(attrs.required("state")?);
        let objective = attrs.number("objective")?;

        let time = match pg.children().find(|n| n.has_tag_name("time")) {
            Some(t) => {
                let t = Attrs::new(&name, t);
                PhaseTimes {
                    lhs: t.number("lhs")?,
                    ilp: t.number("ilp")?,
                    sol: t.number("sol")?,
                    all: t.number("all")?,
                }
            }
            None => return Err(Error::malformed(&name, "missing <time> element")),
        };

        let timeout = match pg.children().find(|n| n.has_tag_name("timeout")) {
            Some(t) => {
                let t = Attrs::new(&name, t);
                PhaseTimeouts {
                    lhs: t.flag("lhs")?,
                    ilp: t.flag("ilp")?,
                    sol: t.flag("sol")?,
                    all: t.flag("all")?,
                }
            }
            None => return Err(Error::malformed(&name, "missing <timeout> element")),
        };

        let mut literals = IndexMap::new();
        for elem in children(pg, "literal") {
            let literal = literal_from(&name, elem)?;
            if literals.contains_key(&literal.id) {
                return Err(Error::malformed(
                    &name,
                    format!("duplicate literal {}", literal.id),
                ));
            }
            literals.insert(literal.id, literal);
        }

        let chains = steps_from(&name, pg, "explanation", StepKind::Chain)?;
        let candidates = steps_from(&name, pg, "new_axiom", StepKind::Candidate)?;

        let mut unifications = vec![];
        for elem in children(pg, "unification") {
            let a = Attrs::new(&name, elem);
            unifications.push(Unification {
                pair: (a.number("l1")?, a.number("l2")?),
                unifier: a
                    .required("unifier")?
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect(),
                active: a.flag("active")?,
            });
        }

        let requirements = children(pg, "label")
            .filter_map(|elem| {
                let satisfied = elem.attribute("satisfied")?;
                Some(Requirement {
                    satisfied: satisfied == "yes",
                    gold: elem.attribute("gold").map(|g| g == "yes"),
                })
            })
            .collect();

        let graph = ProofGraph {
            name,
            state,
            objective,
            time,
            timeout,
            literals,
            chains,
            candidates,
            unifications,
            requirements,
        };
        graph.validate()?;
        Ok(graph)
    }
}

fn literal_from(graph: &str, elem: XmlNode) -> Result<Literal> {
    let a = Attrs::new(graph, elem);
    let depth: i64 = a.number("depth")?;
    let depth = match depth {
        d if d < 0 => None,
        d => Some(u32::try_from(d).map_err(|_| {
            Error::malformed(graph, format!("depth {} of literal is out of range", d))
        })?),
    };

    let extra = elem
        .attributes()
        .filter(|attr| !DEFAULT_LITERAL_ATTRIBUTES.contains(&attr.name()))
        .map(|attr| (attr.name().to_owned(), attr.value().to_owned()))
        .collect();

    Ok(Literal {
        id: a.number("id")?,
        depth,
        active: a.flag("active")?,
        kind: a.required("type")?.to_owned(),
        label: display_text(text_of(elem)),
        extra,
    })
}

fn steps_from(
    graph: &str,
    pg: XmlNode,
    tag: &'static str,
    kind: StepKind,
) -> Result<BTreeMap<StepId, Step>> {
    let mut steps = BTreeMap::new();
    for elem in children(pg, tag) {
        let a = Attrs::new(graph, elem);
        let step = Step {
            id: a.number("id")?,
            tail: a.hypernode("tail")?,
            head: a.hypernode("head")?,
            axiom: escape_quotes(a.required("axiom")?),
            active: a.flag("active")?,
            backward: match kind {
                StepKind::Chain => a.flag("backward")?,
                StepKind::Candidate => false,
            },
            cost: a.optional_number("cost")?,
        };
        let id = step.id;
        if steps.insert(id, step).is_some() {
            return Err(Error::malformed(graph, format!("duplicate {} {}", kind, id)));
        }
    }
    Ok(steps)
}

impl<'a, 'input> From<XmlNode<'a, 'input>> for Configuration {
    fn from(conf: XmlNode<'a, 'input>) -> Self {
        let attributes = |n: XmlNode| -> IndexMap<String, String> {
            n.attributes()
                .map(|a| (a.name().to_owned(), a.value().to_owned()))
                .collect()
        };

        let version = conf
            .children()
            .find(|n| n.has_tag_name("version"))
            .and_then(|n| n.text())
            .map(|s| s.trim().to_owned());

        let components = conf
            .children()
            .find(|n| n.has_tag_name("components"))
            .map(|c| {
                c.children()
                    .filter(|n| n.is_element())
                    .map(|n| (n.tag_name().name().to_owned(), attributes(n)))
                    .collect()
            })
            .unwrap_or_default();

        let params = conf
            .children()
            .find(|n| n.has_tag_name("params"))
            .map(attributes)
            .unwrap_or_default();

        Configuration {
            version,
            components,
            params,
        }
    }
}
