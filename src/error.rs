use miette::Diagnostic;
use thiserror::Error;

/// Errors produced while reading or rendering proof graphs
///
/// `MalformedInput` and `DanglingReference` are scoped to a single proof
/// graph; a batch keeps going when one of its graphs fails.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// A required attribute is missing or unparsable, a step has an empty
    /// side, or an entity references an unknown literal
    #[error("malformed proof graph '{graph}': {reason}")]
    #[diagnostic(code(proofgraph::malformed_input))]
    MalformedInput { graph: String, reason: String },

    /// A lowered edge points at a node that is not in the lowered node set
    #[error("dangling reference in proof graph '{graph}': no node '{node}'")]
    #[diagnostic(code(proofgraph::dangling_reference))]
    DanglingReference { graph: String, node: String },

    /// The input document is not well-formed XML
    #[error("invalid XML document: {0}")]
    #[diagnostic(code(proofgraph::xml))]
    Xml(#[from] roxmltree::Error),

    #[error("failed to serialize records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to format DOT output")]
    Fmt(#[from] std::fmt::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(graph: &str, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            graph: graph.to_owned(),
            reason: reason.into(),
        }
    }

    /// Names an unnamed graph after its position in the document
    pub(crate) fn or_graph(self, fallback: &str) -> Self {
        match self {
            Error::MalformedInput { graph, reason } if graph.is_empty() => Error::MalformedInput {
                graph: fallback.to_owned(),
                reason,
            },
            other => other,
        }
    }

    pub(crate) fn dangling(graph: &str, node: impl ToString) -> Self {
        Error::DanglingReference {
            graph: graph.to_owned(),
            node: node.to_string(),
        }
    }

    /// Short tag used by batch reports
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MalformedInput { .. } => "MalformedInput",
            Error::DanglingReference { .. } => "DanglingReference",
            Error::Xml(_) => "Xml",
            Error::Json(_) => "Json",
            Error::Fmt(_) => "Fmt",
            Error::Io(_) => "Io",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_convert_to_reports() {
        let e = Error::malformed("q1", "missing 'axiom' attribute on <explanation>");
        let code = e.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("proofgraph::malformed_input"));
        let report: miette::Report = e.into();
        assert!(report.to_string().contains("'q1'"));
    }

    #[test]
    fn unnamed_graphs_take_fallback_name() {
        match Error::malformed("", "no name").or_graph("#3") {
            Error::MalformedInput { graph, .. } => assert_eq!(graph, "#3"),
            other => panic!("unexpected {:?}", other),
        }
        match Error::malformed("q1", "bad").or_graph("#3") {
            Error::MalformedInput { graph, .. } => assert_eq!(graph, "q1"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
