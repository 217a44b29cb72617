use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use proofgraph_viz::batch::{self, BatchReport, HtmlBatch};
use proofgraph_viz::dot::DotOptions;
use proofgraph_viz::html::HtmlOptions;
use proofgraph_viz::style::StyleConfig;
use proofgraph_viz::{parse_document, Document};

#[derive(Parser)]
#[command(name = "proofgraph-viz")]
#[command(about = "Render abductive proof graphs as Graphviz DOT, HTML reports or summary tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every proof graph as a Graphviz digraph
    Dot {
        /// Engine output files (stdin when none)
        inputs: Vec<PathBuf>,

        /// Leave inactive literals, steps and unifications out
        #[arg(long, default_value_t = false)]
        active_only: bool,

        /// Write one `<prefix>.<index>.dot` file per graph instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Print an interactive vis.js report
    Html {
        /// Engine output files (stdin when none)
        inputs: Vec<PathBuf>,

        /// Write one `<prefix>.<index>.html` page per graph instead of stdout
        #[arg(long)]
        split: Option<String>,

        /// `src` of the vis.js script tag
        #[arg(long, default_value = "./visjs/dist/vis.min.js")]
        vis_script: String,
    },

    /// Print a table of run statistics per input
    Summary {
        /// Engine output files (stdin when none)
        inputs: Vec<PathBuf>,
    },
}

/// Reads every input, or stdin when there is none, as `(source, text)`
fn read_inputs(inputs: &[PathBuf]) -> miette::Result<Vec<(String, String)>> {
    if inputs.is_empty() {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).into_diagnostic()?;
        return Ok(vec![("stdin".to_owned(), text)]);
    }
    inputs
        .iter()
        .map(|p| {
            let text = std::fs::read_to_string(p).into_diagnostic()?;
            Ok((p.display().to_string(), text))
        })
        .collect()
}

/// Parses every input; documents that are not well-formed XML are reported
/// and count as failures
fn parse_inputs(inputs: &[PathBuf], failures: &mut usize) -> miette::Result<Vec<(String, Document)>> {
    let mut documents = vec![];
    for (source, text) in read_inputs(inputs)? {
        match parse_document(&text) {
            Ok(doc) => documents.push((source, doc)),
            Err(e) => {
                tracing::error!(input = %source, "{}", e);
                *failures += 1;
            }
        }
    }
    Ok(documents)
}

/// Concatenates the graphs of several documents, keeping the first
/// configuration block
fn merge(documents: Vec<(String, Document)>) -> Document {
    let mut merged = Document {
        configuration: None,
        graphs: vec![],
    };
    for (_, doc) in documents {
        if merged.configuration.is_none() {
            merged.configuration = doc.configuration;
        }
        merged.graphs.extend(doc.graphs);
    }
    merged
}

fn report_failures<T>(report: &BatchReport<T>) -> usize {
    for (index, e) in report.failures() {
        tracing::error!(index, kind = e.kind(), "{}", e);
    }
    report.failures().count()
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let style = StyleConfig::default();
    let mut failures = 0;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Dot {
            inputs,
            active_only,
            output,
        } => {
            let document = merge(parse_inputs(&inputs, &mut failures)?);
            let report = batch::dot_batch(document, &style, DotOptions { active_only });
            failures += report_failures(&report);
            match output {
                Some(prefix) => {
                    batch::write_dot_files(&report, &prefix)?;
                }
                None => {
                    for (_, dot) in report.successes() {
                        write!(out, "{}", dot).into_diagnostic()?;
                    }
                }
            }
        }
        Commands::Html {
            inputs,
            split,
            vis_script,
        } => {
            let options = HtmlOptions {
                vis_script,
                ..HtmlOptions::default()
            };
            let document = merge(parse_inputs(&inputs, &mut failures)?);
            let html = HtmlBatch::new(document, &style, &options);
            failures += report_failures(&html.sections);
            match split {
                Some(prefix) => {
                    html.write_split(&prefix, &options)?;
                }
                None => write!(out, "{}", html.document(&options)).into_diagnostic()?,
            }
        }
        Commands::Summary { inputs } => {
            for (source, document) in parse_inputs(&inputs, &mut failures)? {
                let (summary, report) = batch::summary_batch(&source, document);
                failures += report_failures(&report);
                writeln!(out, "{}", summary).into_diagnostic()?;
            }
        }
    }

    out.flush().into_diagnostic()?;
    if failures > 0 {
        tracing::error!("{} proof graph(s) failed", failures);
        std::process::exit(1);
    }
    Ok(())
}
