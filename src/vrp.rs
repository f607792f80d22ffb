//! Value-range propagation core
//!
//! The analysis runs in three stages:
//! 1. [`Graph::build`] walks one SSA function and emits a constraint per
//!    supported instruction, wiring data edges (operand → constraint →
//!    result) and control edges (future refinement bounds → constraint).
//! 2. Tarjan's algorithm splits the graph into strongly-connected
//!    components, numbered so that every component only depends on
//!    lower-numbered ones.
//! 3. [`Graph::solve`] visits components in that order. Acyclic components
//!    evaluate directly; cyclic ones run a widening pass anchored to the
//!    function's integer constants, resolve pending future refinements,
//!    then run a narrowing pass to claw back precision. Ranges flow to
//!    dependent components as each one finishes.
//!
//! The result is a [`Ranges`] store with a conservative interval for every
//! supported value: integer value bounds, string length bounds, or channel
//! capacity bounds.

use thiserror::Error;

use crate::ssa::Value;

mod constraint;
mod graph;
mod interval;
mod ranges;
mod scc;
mod solver;
mod zext;

pub use constraint::Constraint;
pub use graph::Graph;
pub use interval::{ChannelInterval, IntInterval, Range, StringInterval};
pub use ranges::Ranges;
pub use zext::Z;

/// Why an instruction produced no constraint during graph construction.
/// Consumed inside [`Graph::build`]; the affected value falls back to its
/// typed default range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub(crate) enum BuildError {
    #[error("unsupported type for {0}")]
    UnsupportedType(Value),

    #[error("sigma predicate is not a binary comparison")]
    MalformedSsa,
}
