//! Value-range propagation for SSA functions
//!
//! This library computes a conservative interval for every SSA value in a
//! function: the runtime value for integers, the byte length for strings,
//! and the buffer capacity for bounded channels. Downstream checkers use
//! the intervals to discharge bounds proofs ("this index is within the
//! slice", "this shift amount is non-negative").
//!
//! The analysis builds a constraint graph over the function's values,
//! splits it into strongly-connected components, and solves each component
//! with a widening/narrowing fixed point whose widening is anchored to the
//! integer constants appearing in the function. Branch conditions refine
//! ranges through σ-nodes, including "future" refinements whose bound is
//! itself an SSA value.
//!
//! ```
//! use rangeprop::ssa::{BinOp, Function};
//! use rangeprop::vrp::Graph;
//!
//! let mut func = Function::new();
//! let entry = func.alloc_block();
//! let three = func.const_int(3);
//! let four = func.const_int(4);
//! let sum = func.bin_op(entry, BinOp::Add, three, four);
//! func.set_return(entry, Some(sum));
//!
//! let ranges = Graph::build(&func).solve();
//! let range = ranges.get(sum).unwrap();
//! let interval = range.as_int().unwrap();
//! assert_eq!(format!("{interval}"), "[7, 7]");
//! ```

pub mod ssa;
pub mod vrp;

pub use ssa::{Function, Type, Value};
pub use vrp::{Graph, Range, Ranges};
