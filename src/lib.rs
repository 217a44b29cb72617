//! Proof graph rendering.
//!
//! An abductive reasoning engine reports its search as a _proof graph_: a
//! hypergraph of literals joined by multi-tail, multi-head inference steps
//! and pairwise unifications. This crate reads the engine's XML output with
//! [`parse_document`] into [`ProofGraph`]s, lowers each hypergraph into an
//! ordinary graph (inserting a relay node for every step with more than one
//! tail or head literal, see [`lower::LoweredGraph`]) and serializes the
//! result as Graphviz DOT ([`dot::render_dot`]), vis.js records
//! ([`vis::render_vis`]) or an HTML report ([`html::render_html`]).
//!
//! [`report`] summarizes runs as a text table, and [`batch`] renders whole
//! documents while keeping one graph's failure from affecting the others.

pub mod batch;

/// Static Graphviz output
pub mod dot;

/// Interactive HTML report
pub mod html;

/// Hypergraph to graph lowering
pub mod lower;

pub mod report;

pub mod style;

pub mod vis;

mod convert;
mod core;
mod error;

pub use crate::convert::{parse_document, parse_hypernode, Document};
pub use crate::core::*;
pub use crate::error::{Error, Result};
