use proofgraph_viz::batch::{self, HtmlBatch};
use proofgraph_viz::dot::{render_dot, DotOptions};
use proofgraph_viz::html::{split_path, HtmlOptions};
use proofgraph_viz::style::StyleConfig;
use proofgraph_viz::vis::render_vis;
use proofgraph_viz::*;

fn document(graphs: &[&str]) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<phillip>\n<configure><version>3.13</version></configure>\n{}\n</phillip>\n",
        graphs.join("\n")
    )
}

fn proofgraph(name: &str, literals: &str, explanations: &str) -> String {
    format!(
        r#"<proofgraph name="{}" state="optimal" objective="2.5">
<time lhs="0.1" ilp="0.2" sol="0.3" all="0.6"></time>
<timeout lhs="no" ilp="no" sol="no" all="no"></timeout>
<literals>{}</literals>
<explanations>{}</explanations>
</proofgraph>"#,
        name, literals, explanations
    )
}

fn r1() -> String {
    proofgraph(
        "r1",
        r#"
<literal id="0" type="observable" depth="0" active="yes">p(x):0</literal>
<literal id="1" type="hypothesis" depth="1" active="yes">q(x):1</literal>"#,
        r#"<explanation id="0" tail="{0}" head="{1}" active="yes" backward="no" axiom="r1"></explanation>"#,
    )
}

fn r2() -> String {
    proofgraph(
        "r2",
        r#"
<literal id="0" type="observable" depth="0" active="yes">p(x):0</literal>
<literal id="1" type="observable" depth="0" active="yes">q(x):1</literal>
<literal id="2" type="hypothesis" depth="1" active="yes">r(x):2</literal>"#,
        r#"<explanation id="0" tail="{0,1}" head="{2}" active="yes" backward="no" axiom="r2"></explanation>"#,
    )
}

fn dangling() -> String {
    proofgraph(
        "broken",
        r#"<literal id="0" type="observable" depth="0" active="yes">p(x):0</literal>"#,
        r#"<explanation id="0" tail="{0}" head="{99}" active="yes" backward="no" axiom="r1"></explanation>"#,
    )
}

fn edge_lines(dot: &str) -> Vec<&str> {
    dot.lines().filter(|l| l.contains(" -> ")).collect()
}

#[test]
fn single_tail_single_head_is_one_edge() {
    let doc = parse_document(&document(&[&r1()])).unwrap();
    let g = doc.graphs[0].as_ref().unwrap();
    let dot = render_dot(g, &StyleConfig::default(), DotOptions::default()).unwrap();

    let edges = edge_lines(&dot);
    assert_eq!(edges.len(), 1);
    assert!(edges[0].starts_with("  node_0 -> node_1 ["));
    assert!(edges[0].contains("label = \"r1\""));
    assert!(!dot.contains("shape = point"));
}

#[test]
fn wide_step_gets_one_relay() {
    let doc = parse_document(&document(&[&r2()])).unwrap();
    let g = doc.graphs[0].as_ref().unwrap();
    let dot = render_dot(g, &StyleConfig::default(), DotOptions::default()).unwrap();

    assert_eq!(dot.matches("shape = point").count(), 1);
    assert!(dot.contains("  relay_10 [shape = point"));

    let edges = edge_lines(&dot);
    assert_eq!(edges.len(), 3);
    assert!(edges[0].starts_with("  node_0 -> relay_10 ["));
    assert!(edges[1].starts_with("  node_1 -> relay_10 ["));
    assert!(edges[2].starts_with("  relay_10 -> node_2 ["));
    let labeled: Vec<_> = edges.iter().map(|e| e.contains("label = ")).collect();
    assert_eq!(labeled, vec![true, false, false]);
}

#[test]
fn wide_step_in_vis_records() {
    let doc = parse_document(&document(&[&r2()])).unwrap();
    let g = doc.graphs[0].as_ref().unwrap();
    let bundle = render_vis(g, &StyleConfig::default()).unwrap();

    let ids: Vec<_> = bundle.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 10]);
    let relay = &bundle.nodes[3];
    assert_eq!(relay.shape, "dot");
    assert_eq!(relay.label.as_deref(), Some("r2"));
    assert_eq!(relay.depth, 1);
    assert!(bundle.edges.iter().all(|e| e.length == 200 && e.style == "arrow"));
}

#[test]
fn broken_graph_does_not_stop_the_batch() {
    let doc = parse_document(&document(&[&r1(), &dangling()])).unwrap();
    assert_eq!(doc.graphs.len(), 2);
    let report = batch::dot_batch(doc, &StyleConfig::default(), DotOptions::default());

    let rendered: Vec<_> = report.successes().collect();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].0, 0);
    assert!(rendered[0].1.contains("node_0 -> node_1"));

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 1);
    assert!(matches!(failures[0].1, Error::MalformedInput { .. }));
}

#[test]
fn split_mode_writes_only_successful_graphs() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = format!("{}/", dir.path().display());

    let doc = parse_document(&document(&[&r1(), &dangling(), &r2()])).unwrap();
    let options = HtmlOptions::default();
    let batch = HtmlBatch::new(doc, &StyleConfig::default(), &options);
    let written = batch.write_split(&prefix, &options).unwrap();

    assert_eq!(written, vec![split_path(&prefix, 0), split_path(&prefix, 2)]);
    assert!(!split_path(&prefix, 1).exists());

    let page = std::fs::read_to_string(split_path(&prefix, 2)).unwrap();
    assert!(page.starts_with("<!doctype html>"));
    assert!(page.contains("<title>r2</title>"));
    assert!(page.contains("var nodes_2 = ["));
    assert!(page.contains("version = <b>3.13</b>"));
}

#[test]
fn dot_files_are_numbered_by_document_position() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("run").display().to_string();

    let doc = parse_document(&document(&[&dangling(), &r1()])).unwrap();
    let report = batch::dot_batch(doc, &StyleConfig::default(), DotOptions::default());
    let written = batch::write_dot_files(&report, &prefix).unwrap();

    assert_eq!(written, vec![dir.path().join("run.1.dot")]);
    let dot = std::fs::read_to_string(&written[0]).unwrap();
    assert!(dot.starts_with("digraph proofgraph{"));
}

#[test]
fn combined_report_has_one_section_per_graph() {
    let doc = parse_document(&document(&[&r1(), &r2()])).unwrap();
    let options = HtmlOptions::default();
    let batch = HtmlBatch::new(doc, &StyleConfig::default(), &options);
    assert!(batch.sections.is_complete());

    let page = batch.document(&options);
    assert!(page.contains("<title>Proof graphs</title>"));
    assert!(page.contains("<h1>r1</h1>") && page.contains("<h1>r2</h1>"));
    assert_eq!(page.matches("<script type=\"text/javascript\">").count(), 2);
}

#[test]
fn summary_table_lists_every_run() {
    let doc = parse_document(&document(&[&r1(), &r2()])).unwrap();
    let (summary, report) = batch::summary_batch("runs.xml", doc);
    assert!(report.is_complete());

    let text = summary.to_string();
    assert!(text.starts_with("Summary of runs.xml (version 3.13)\n"));
    assert!(text.contains("| idx | name"));
    assert!(text.contains("| r1 "));
    assert!(text.contains("| r2 "));
    assert!(text.contains("| all "));
    assert!(text.contains("0.600"));
}

#[test]
fn not_well_formed_document_is_an_error() {
    let err = parse_document("<phillip><proofgraph>").unwrap_err();
    assert!(matches!(err, Error::Xml(_)));
}
