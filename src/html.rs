use crate::batch::numbered_path;
use crate::core::*;
use crate::error::{Error, Result};
use crate::style::StyleConfig;
use crate::vis::render_vis;

use std::path::PathBuf;

/// Options for the HTML report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    /// `src` of the vis.js script tag
    pub vis_script: String,
    /// Initial state of the "non active entities" checkbox
    pub show_inactive: bool,
    /// Initial state of the "hierarchical layout" checkbox
    pub hierarchical: bool,
    pub width_px: u32,
    pub height_px: u32,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            vis_script: "./visjs/dist/vis.min.js".to_owned(),
            show_inactive: false,
            hierarchical: true,
            width_px: 1200,
            height_px: 1000,
        }
    }
}

const SECTION: &str = r#"
  <style type="text/css">
    #visualization@SUF {
      width: @WIDTHpx;
      height: @HEIGHTpx;
      margin: 40px;
      border: 1px solid lightgray;
    }
  </style>

<h1>@NAME</h1>
<ul>
  <li>state = <b>@STATE</b></li>
  <li>objective = <b>@OBJECTIVE</b></li>
  <li>time: @TIMES</li>
  <li>timeout: @TIMEOUTS</li>
</ul>

<form name="configVis@SUF">
  <input type="checkbox" value="NonActiveEntities"@INACTIVE>Non active entities
  <input type="checkbox" value="HierarchicalLayout"@HIERARCHICAL>Hierarchical layout
  <input type="button" value="Reload" onclick="updateNetwork@SUF()">
</form>
<div id="visualization@SUF"></div>

<script type="text/javascript">
  var nodes@SUF = @NODES;

  var edges@SUF = @EDGES;

  function updateNetwork@SUF() {
    var data = {
      nodes: nodes@SUF.concat(),
      edges: edges@SUF.concat(),
    };
    var options = {
      stabilize: false,
      repulsion: {
        springLength: 300,
        nodeDistance: 300
      }
    };

    if (!document.configVis@SUF.elements[0].checked) {
      data.nodes = data.nodes.filter(function (n) { return n.isActive; });
      data.edges = data.edges.filter(function (e) { return e.isActive; });
    }

    if (document.configVis@SUF.elements[1].checked) {
      data.nodes = data.nodes.map(function (n) {
        var m = Object.assign({}, n);
        m.level = n.depth;
        return m;
      });
      options.hierarchicalLayout = {
        levelSeparation: 300,
        nodeSpacing: 10,
        direction: "LR"
      };
    }

    var container = document.getElementById('visualization@SUF');
    var network = new vis.Network(container, data, options);
  }

  updateNetwork@SUF();
</script>
"#;

const DOCUMENT: &str = r#"<!doctype html>
<html>
<head>
  <meta http-equiv="Content-Type" content="text/html;charset=utf-8">
  <title>@TITLE</title>

  <script type="text/javascript" src="@SCRIPT"></script>

</head>

<body>
@CONFIGURE
@SECTIONS

</body>
</html>
"#;

/// Escapes text for use inside HTML element content and attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn phase_list<T: Copy>(phases: &Phases<T>, show: impl Fn(T) -> String) -> String {
    PHASE_NAMES
        .iter()
        .zip(phases.values())
        .map(|(name, v)| format!("{} = <b>{}</b>", name, show(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Replaces every `@TOKEN` of a template in a single pass
///
/// Substituted text is never rescanned, so values may contain `@`. Where
/// tokens share a prefix the longest one wins.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(at) = rest.find('@') {
        out.push_str(&rest[..at]);
        let tail = &rest[at..];
        match values
            .iter()
            .filter(|(token, _)| tail.starts_with(token))
            .max_by_key(|(token, _)| token.len())
        {
            Some((token, value)) => {
                out.push_str(value);
                rest = &tail[token.len()..];
            }
            None => {
                out.push('@');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Renders the page section of one proof graph
///
/// Every script identifier is suffixed with `_<index>` so several sections
/// can share a page without sharing state.
pub fn render_section(
    graph: &ProofGraph,
    index: usize,
    style: &StyleConfig,
    options: &HtmlOptions,
) -> Result<String> {
    let bundle = render_vis(graph, style)?;
    let checked = |on: bool| if on { r#" checked="checked""# } else { "" };

    Ok(fill(
        SECTION,
        &[
            ("@SUF", &format!("_{}", index)),
            ("@WIDTH", &options.width_px.to_string()),
            ("@HEIGHT", &options.height_px.to_string()),
            ("@INACTIVE", checked(options.show_inactive)),
            ("@HIERARCHICAL", checked(options.hierarchical)),
            ("@NAME", &escape_html(&graph.name)),
            ("@STATE", &escape_html(&graph.state.to_string())),
            ("@OBJECTIVE", &graph.objective.to_string()),
            ("@TIMES", &phase_list(&graph.time, |t| t.to_string())),
            (
                "@TIMEOUTS",
                &phase_list(&graph.timeout, |t| (if t { "yes" } else { "no" }).to_owned()),
            ),
            ("@NODES", &bundle.nodes_js()?),
            ("@EDGES", &bundle.edges_js()?),
        ],
    ))
}

fn configuration_block(conf: &Configuration) -> String {
    let mut items = vec![];
    if let Some(v) = &conf.version {
        items.push(format!("  <li>version = <b>{}</b></li>", escape_html(v)));
    }
    for (tag, attrs) in &conf.components {
        let attrs: Vec<_> = attrs
            .iter()
            .map(|(k, v)| format!("{} = <b>{}</b>", escape_html(k), escape_html(v)))
            .collect();
        items.push(format!("  <li>{}: {}</li>", escape_html(tag), attrs.join(", ")));
    }
    if !conf.params.is_empty() {
        let params: Vec<_> = conf
            .params
            .iter()
            .map(|(k, v)| format!("{} = <b>{}</b>", escape_html(k), escape_html(v)))
            .collect();
        items.push(format!("  <li>params: {}</li>", params.join(", ")));
    }
    if items.is_empty() {
        return String::new();
    }
    format!("<ul class=\"configure\">\n{}\n</ul>\n<hr>", items.join("\n"))
}

/// Wraps rendered sections into a standalone document
pub fn compose_document(
    title: &str,
    configuration: Option<&Configuration>,
    sections: &[String],
    options: &HtmlOptions,
) -> String {
    fill(
        DOCUMENT,
        &[
            ("@TITLE", &escape_html(title)),
            ("@SCRIPT", &escape_html(&options.vis_script)),
            (
                "@CONFIGURE",
                &configuration.map(configuration_block).unwrap_or_default(),
            ),
            ("@SECTIONS", &sections.join("\n<hr>\n")),
        ],
    )
}

/// Renders proof graphs into one HTML document
///
/// A graph that fails to render is left out of the document and returned
/// with its position instead; the other graphs are unaffected. The title is
/// the graph's name when exactly one graph is rendered.
pub fn render_html(
    graphs: &[&ProofGraph],
    configuration: Option<&Configuration>,
    style: &StyleConfig,
    options: &HtmlOptions,
) -> (String, Vec<(usize, Error)>) {
    let mut names = vec![];
    let mut sections = vec![];
    let mut failures = vec![];
    for (i, g) in graphs.iter().enumerate() {
        match render_section(g, i, style, options) {
            Ok(section) => {
                names.push(g.name.as_str());
                sections.push(section);
            }
            Err(e) => {
                tracing::warn!(index = i, graph = %g.name, kind = e.kind(), "{}", e);
                failures.push((i, e));
            }
        }
    }
    let title = match names.as_slice() {
        [name] => *name,
        _ => "Proof graphs",
    };
    (
        compose_document(title, configuration, &sections, options),
        failures,
    )
}

/// Returns the file name of the `index`-th proof graph in split mode
///
/// A trailing `.html` on the prefix is dropped, and a `.` is inserted unless
/// the prefix is empty or already ends in `.` or `/`.
pub fn split_path(prefix: &str, index: usize) -> PathBuf {
    numbered_path(prefix, index, "html")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(name: &str) -> ProofGraph {
        let mut g = ProofGraph::new(name);
        g.objective = 3.5;
        g.time.all = 1.25;
        g.timeout.sol = true;
        g.literals.insert(0, Literal::new(0, Some(0), true, "observable", "p(x)"));
        g
    }

    #[test]
    fn section_is_suffixed() {
        let s = render_section(&graph("q1"), 3, &StyleConfig::default(), &HtmlOptions::default())
            .unwrap();
        assert!(s.contains("<h1>q1</h1>"));
        assert!(s.contains("var nodes_3 = ["));
        assert!(s.contains("var edges_3 = [];"));
        assert!(s.contains("function updateNetwork_3()"));
        assert!(s.contains("document.configVis_3.elements[0]"));
        assert!(!s.contains("@SUF"));
        assert!(s.contains("all = <b>1.25</b>"));
        assert!(s.contains("sol = <b>yes</b>"));
        assert!(s.contains(r#"value="HierarchicalLayout" checked="checked""#));
    }

    #[test]
    fn document_title_and_separators() {
        let (a, b) = (graph("a"), graph("b"));
        let style = StyleConfig::default();
        let options = HtmlOptions::default();

        let (single, failures) = render_html(&[&a], None, &style, &options);
        assert!(failures.is_empty());
        assert!(single.contains("<title>a</title>"));
        assert!(single.contains(r#"src="./visjs/dist/vis.min.js""#));

        let (both, _) = render_html(&[&a, &b], None, &style, &options);
        assert!(both.contains("<title>Proof graphs</title>"));
        assert!(both.contains("updateNetwork_0()") && both.contains("updateNetwork_1()"));
        assert_eq!(both.matches("\n<hr>\n").count(), 1);
    }

    #[test]
    fn failing_graph_leaves_siblings_in_document() {
        let good = graph("good");
        let mut bad = graph("bad");
        bad.chains.insert(
            0,
            Step {
                id: 0,
                tail: vec![0],
                head: vec![7],
                axiom: "r".to_owned(),
                active: true,
                backward: false,
                cost: None,
            },
        );
        let (doc, failures) =
            render_html(&[&good, &bad], None, &StyleConfig::default(), &HtmlOptions::default());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 1);
        assert!(matches!(failures[0].1, Error::DanglingReference { .. }));
        assert!(doc.contains("<title>good</title>"));
        assert!(doc.contains("<h1>good</h1>"));
        assert!(!doc.contains("<h1>bad</h1>"));
    }

    #[test]
    fn graph_text_is_not_substituted_again() {
        let mut g = graph("@STATE @NODES");
        g.state = SolutionState::Other("@OBJECTIVE".to_owned());
        let s = render_section(&g, 0, &StyleConfig::default(), &HtmlOptions::default()).unwrap();
        assert!(s.contains("<h1>@STATE @NODES</h1>"));
        assert!(s.contains("state = <b>@OBJECTIVE</b>"));

        let doc = compose_document("@SECTIONS", None, &[s], &HtmlOptions::default());
        assert!(doc.contains("<title>@SECTIONS</title>"));
        assert_eq!(doc.matches("<h1>").count(), 1);
    }

    #[test]
    fn literal_text_cannot_close_the_script() {
        let mut g = graph("q");
        g.literals
            .insert(1, Literal::new(1, Some(0), true, "hypothesis", "p(</script><b>)"));
        let s = render_section(&g, 0, &StyleConfig::default(), &HtmlOptions::default()).unwrap();
        assert_eq!(s.matches("</script>").count(), 1);
        assert!(s.contains(r"p(\u003c/script>\u003cb>)"));
    }

    #[test]
    fn names_are_escaped() {
        let s = render_section(&graph("<q&1>"), 0, &StyleConfig::default(), &HtmlOptions::default())
            .unwrap();
        assert!(s.contains("<h1>&lt;q&amp;1&gt;</h1>"));
    }

    #[test]
    fn configuration_is_listed() {
        let mut conf = Configuration::default();
        conf.version = Some("3.13".to_owned());
        conf.params.insert("timeout_all".to_owned(), "60".to_owned());
        let doc = compose_document("t", Some(&conf), &[], &HtmlOptions::default());
        assert!(doc.contains("version = <b>3.13</b>"));
        assert!(doc.contains("params: timeout_all = <b>60</b>"));
    }

    #[test]
    fn split_paths() {
        assert_eq!(split_path("out", 0), PathBuf::from("out.0.html"));
        assert_eq!(split_path("out.html", 2), PathBuf::from("out.2.html"));
        assert_eq!(split_path("dir/", 1), PathBuf::from("dir/1.html"));
        assert_eq!(split_path("run.", 4), PathBuf::from("run.4.html"));
        assert_eq!(split_path("", 5), PathBuf::from("5.html"));
    }
}
