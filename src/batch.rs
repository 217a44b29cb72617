//! Rendering every proof graph of a document, one outcome per graph
//!
//! A failing graph is recorded and skipped; its siblings are still rendered.

use crate::convert::Document;
use crate::core::*;
use crate::dot::{render_dot, DotOptions};
use crate::error::{Error, Result};
use crate::html::{compose_document, render_section, HtmlOptions};
use crate::report::{RunSummary, Summary};
use crate::style::StyleConfig;

use std::fs;
use std::path::{Path, PathBuf};

/// What became of one proof graph of a document
#[derive(Debug)]
pub struct GraphOutcome<T> {
    /// Position of the graph in its document
    pub index: usize,
    /// Name of the graph, if it parsed
    pub name: Option<String>,
    pub result: Result<T>,
}

/// Outcomes of a whole document, in document order
#[derive(Debug)]
pub struct BatchReport<T> {
    pub outcomes: Vec<GraphOutcome<T>>,
}

impl<T> BatchReport<T> {
    /// Applies `render` to every graph that parsed
    ///
    /// Parse failures are carried over as they are; render failures are
    /// logged and recorded.
    pub fn new(
        graphs: Vec<Result<ProofGraph>>,
        mut render: impl FnMut(usize, &ProofGraph) -> Result<T>,
    ) -> Self {
        let outcomes = graphs
            .into_iter()
            .enumerate()
            .map(|(index, graph)| match graph {
                Ok(g) => {
                    let result = render(index, &g);
                    if let Err(e) = &result {
                        tracing::warn!(index, graph = %g.name, kind = e.kind(), "{}", e);
                    }
                    GraphOutcome {
                        index,
                        name: Some(g.name),
                        result,
                    }
                }
                Err(e) => GraphOutcome {
                    index,
                    name: None,
                    result: Err(e),
                },
            })
            .collect();
        Self { outcomes }
    }

    /// Returns the successful outcomes with their document index
    pub fn successes(&self) -> impl Iterator<Item = (usize, &T)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|t| (o.index, t)))
    }

    /// Returns the failures with their document index
    pub fn failures(&self) -> impl Iterator<Item = (usize, &Error)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.index, e)))
    }

    /// Returns whether every graph succeeded
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Per-format batches

/// Renders every graph of a document to DOT
pub fn dot_batch(document: Document, style: &StyleConfig, options: DotOptions) -> BatchReport<String> {
    BatchReport::new(document.graphs, |_, g| render_dot(g, style, options))
}

/// HTML sections of every graph of a document, plus what is needed to wrap
/// them into pages
#[derive(Debug)]
pub struct HtmlBatch {
    pub configuration: Option<Configuration>,
    pub sections: BatchReport<String>,
}

impl HtmlBatch {
    /// Renders one section per graph, suffixed with the document index
    pub fn new(document: Document, style: &StyleConfig, options: &HtmlOptions) -> Self {
        let sections = BatchReport::new(document.graphs, |i, g| render_section(g, i, style, options));
        Self {
            configuration: document.configuration,
            sections,
        }
    }

    /// Wraps every successful section into one document
    pub fn document(&self, options: &HtmlOptions) -> String {
        let named: Vec<_> = self
            .sections
            .outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .collect();
        let title = match named.as_slice() {
            [only] => only.name.as_deref().unwrap_or_default(),
            _ => "Proof graphs",
        };
        let sections: Vec<_> = self.sections.successes().map(|(_, s)| s.clone()).collect();
        compose_document(title, self.configuration.as_ref(), &sections, options)
    }

    /// Writes one document per successful section, named by
    /// [`split_path`](crate::html::split_path)
    ///
    /// Failed graphs get no file. Returns the written paths.
    pub fn write_split(&self, prefix: &str, options: &HtmlOptions) -> Result<Vec<PathBuf>> {
        let mut written = vec![];
        for outcome in &self.sections.outcomes {
            let Ok(section) = &outcome.result else {
                continue;
            };
            let title = outcome.name.as_deref().unwrap_or_default();
            let page = compose_document(
                title,
                self.configuration.as_ref(),
                std::slice::from_ref(section),
                options,
            );
            let path = numbered_path(prefix, outcome.index, "html");
            write_file(&path, &page)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Computes the statistics row of every graph of a document
pub fn summary_batch(source: &str, document: Document) -> (Summary, BatchReport<RunSummary>) {
    let report = BatchReport::new(document.graphs, |i, g| Ok(RunSummary::new(i, g)));
    let mut summary = Summary::new(source, report.successes().map(|(_, r)| r.clone()).collect());
    summary.version = document.configuration.and_then(|c| c.version);
    (summary, report)
}

////////////////////////////////////////////////////////////////////////////////
// Files

/// Returns `<prefix>.<index>.<extension>`
///
/// A trailing `.<extension>` on the prefix is dropped, and no `.` is inserted
/// after an empty prefix or one already ending in `.` or `/`.
pub fn numbered_path(prefix: &str, index: usize, extension: &str) -> PathBuf {
    let suffix = format!(".{}", extension);
    let mut prefix = prefix.strip_suffix(suffix.as_str()).unwrap_or(prefix).to_owned();
    if !prefix.is_empty() && !prefix.ends_with('.') && !prefix.ends_with('/') {
        prefix.push('.');
    }
    PathBuf::from(format!("{}{}{}", prefix, index, suffix))
}

/// Writes every successful DOT rendering to its own numbered file
pub fn write_dot_files(report: &BatchReport<String>, prefix: &str) -> Result<Vec<PathBuf>> {
    report
        .successes()
        .map(|(i, dot)| {
            let path = numbered_path(prefix, i, "dot");
            write_file(&path, dot)?;
            Ok(path)
        })
        .collect()
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, contents)?;
    tracing::info!(path = %path.display(), "wrote");
    Ok(())
}
