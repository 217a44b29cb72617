//! Run statistics of one or more engine outputs, printed as text tables

use crate::core::*;
use std::fmt;

////////////////////////////////////////////////////////////////////////////////
// Rows

/// Scalar statistics of one proof graph
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Position of the graph in its document
    pub index: usize,
    pub name: String,
    pub state: SolutionState,
    pub answer: Answer,
    pub objective: f64,
    pub observations: usize,
    pub hypotheses: usize,
    pub chains: usize,
    pub unifications: usize,
    pub time: PhaseTimes,
    pub timeout: PhaseTimeouts,
}

impl RunSummary {
    pub fn new(index: usize, graph: &ProofGraph) -> Self {
        Self {
            index,
            name: graph.name.clone(),
            state: graph.state.clone(),
            answer: graph.answer(),
            objective: graph.objective,
            observations: graph.observation_count(),
            hypotheses: graph.hypothesis_count(),
            chains: graph.chains.len(),
            unifications: graph.unifications.len(),
            time: graph.time,
            timeout: graph.timeout,
        }
    }
}

/// Aggregates over every run of one input
#[derive(Debug, Clone, PartialEq)]
pub struct Footer {
    /// Available runs answered `true`
    pub answered_true: usize,
    /// Available runs answered `false`
    pub answered_false: usize,
    /// Every other run, unavailable ones included
    pub answered_other: usize,
    /// Means over available runs; `None` when no run is available
    pub means: Option<Means>,
    /// Timed-out runs per phase, over all runs
    pub timeouts: Phases<usize>,
}

/// Per-run means of counts and phase times
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Means {
    pub observations: f64,
    pub hypotheses: f64,
    pub chains: f64,
    pub unifications: f64,
    pub time: PhaseTimes,
}

/// The statistics of one input document
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Where the runs were read from, e.g. a path or `stdin`
    pub source: String,
    /// Engine version from the document's `<configure>` block
    pub version: Option<String>,
    pub runs: Vec<RunSummary>,
}

impl Summary {
    pub fn new(source: &str, runs: Vec<RunSummary>) -> Self {
        Self {
            source: source.to_owned(),
            version: None,
            runs,
        }
    }

    /// Computes the aggregate row
    pub fn footer(&self) -> Footer {
        let available: Vec<_> = self.runs.iter().filter(|r| r.state.is_available()).collect();
        let count = |a: Answer| available.iter().filter(|r| r.answer == a).count();
        let answered_true = count(Answer::True);
        let answered_false = count(Answer::False);

        let means = if available.is_empty() {
            None
        } else {
            let n = available.len() as f64;
            let mean = |f: fn(&RunSummary) -> f64| available.iter().map(|r| f(r)).sum::<f64>() / n;
            Some(Means {
                observations: mean(|r| r.observations as f64),
                hypotheses: mean(|r| r.hypotheses as f64),
                chains: mean(|r| r.chains as f64),
                unifications: mean(|r| r.unifications as f64),
                time: PhaseTimes {
                    lhs: mean(|r| r.time.lhs),
                    ilp: mean(|r| r.time.ilp),
                    sol: mean(|r| r.time.sol),
                    all: mean(|r| r.time.all),
                },
            })
        };

        let timed_out = |f: fn(&PhaseTimeouts) -> bool| {
            self.runs.iter().filter(|r| f(&r.timeout)).count()
        };

        Footer {
            answered_true,
            answered_false,
            answered_other: self.runs.len() - (answered_true + answered_false),
            means,
            timeouts: Phases {
                lhs: timed_out(|t| t.lhs),
                ilp: timed_out(|t| t.ilp),
                sol: timed_out(|t| t.sol),
                all: timed_out(|t| t.all),
            },
        }
    }

    /// Lays the runs and their footer out as a table
    pub fn table(&self) -> Table {
        let mut header = vec!["idx", "name", "state", "answer", "objective"];
        header.extend(["obs#", "hyp#", "chain#", "unify#"]);
        header.extend(["time(lhs)", "time(ilp)", "time(sol)", "time(all)"]);
        header.extend(["t.o.(lhs)", "t.o.(ilp)", "t.o.(sol)", "t.o.(all)"]);

        let yes_no = |b: bool| Cell::text(if b { "yes" } else { "no" });

        let rows = self
            .runs
            .iter()
            .map(|r| {
                let mut row = vec![
                    Cell::Int(r.index),
                    Cell::text(&r.name),
                    Cell::text(&r.state.to_string()),
                    Cell::text(&r.answer.to_string()),
                    Cell::Float(r.objective),
                    Cell::Int(r.observations),
                    Cell::Int(r.hypotheses),
                    Cell::Int(r.chains),
                    Cell::Int(r.unifications),
                ];
                row.extend(r.time.values().map(Cell::Float));
                row.extend(r.timeout.values().map(yes_no));
                row
            })
            .collect();

        let f = self.footer();
        let blank = || Cell::text("---");
        let mut footer = vec![
            Cell::text("all"),
            blank(),
            blank(),
            Cell::Text(format!(
                "{}/{}/{}",
                f.answered_true, f.answered_false, f.answered_other
            )),
            blank(),
        ];
        match f.means {
            Some(m) => {
                footer.extend(
                    [m.observations, m.hypotheses, m.chains, m.unifications].map(Cell::Float),
                );
                footer.extend(m.time.values().map(Cell::Float));
            }
            None => footer.extend((0..8).map(|_| blank())),
        }
        footer.extend(f.timeouts.values().map(Cell::Int));

        Table {
            header: header.into_iter().map(str::to_owned).collect(),
            rows,
            footer: Some(footer),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.version {
            Some(v) => writeln!(f, "Summary of {} (version {})", self.source, v)?,
            None => writeln!(f, "Summary of {}", self.source)?,
        }
        write!(f, "{}", self.table())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tables

/// A table cell; numbers are right-aligned, text left-aligned
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(usize),
    Float(f64),
    Text(String),
}

impl Cell {
    fn text(s: &str) -> Self {
        Cell::Text(s.to_owned())
    }

    fn render(&self) -> String {
        match self {
            Cell::Int(i) => i.to_string(),
            Cell::Float(x) => format!("{:.3}", x),
            Cell::Text(s) => s.clone(),
        }
    }

    fn pad(&self, width: usize) -> String {
        match self {
            Cell::Text(_) => format!("{:<width$}", self.render(), width = width),
            _ => format!("{:>width$}", self.render(), width = width),
        }
    }
}

/// A fixed-width text table with an optional footer row
///
/// ```text
/// +-----+------+
/// | idx | name |
/// +-----+------+
/// |   0 | q1   |
/// +-----+------+
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub footer: Option<Vec<Cell>>,
}

impl Table {
    fn widths(&self) -> Vec<usize> {
        let columns = std::iter::once(self.header.len())
            .chain(self.rows.iter().map(Vec::len))
            .chain(self.footer.iter().map(Vec::len))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0; columns];
        for (i, h) in self.header.iter().enumerate() {
            widths[i] = widths[i].max(h.chars().count());
        }
        for row in self.rows.iter().chain(self.footer.iter()) {
            for (i, c) in row.iter().enumerate() {
                widths[i] = widths[i].max(c.render().chars().count());
            }
        }
        widths
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let widths = self.widths();
        let border: Vec<_> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let border = format!("+-{}-+", border.join("-+-"));

        if !self.header.is_empty() {
            writeln!(f, "{}", border)?;
            let header: Vec<_> = self.header.iter().map(|h| Cell::text(h)).collect();
            write_row(f, &widths, &header)?;
        }
        writeln!(f, "{}", border)?;
        for row in &self.rows {
            write_row(f, &widths, row)?;
        }
        if let Some(footer) = &self.footer {
            writeln!(f, "{}", border)?;
            write_row(f, &widths, footer)?;
        }
        writeln!(f, "{}", border)
    }
}

fn write_row(f: &mut fmt::Formatter, widths: &[usize], cells: &[Cell]) -> fmt::Result {
    let padded: Vec<_> = widths
        .iter()
        .enumerate()
        .map(|(i, w)| match cells.get(i) {
            Some(c) => c.pad(*w),
            None => " ".repeat(*w),
        })
        .collect();
    writeln!(f, "| {} |", padded.join(" | "))
}
