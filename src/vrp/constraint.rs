//! Constraint nodes of the propagation graph
//!
//! One enum covers every constraint kind; each has a target value `y()`,
//! data operands, and a pure `eval` against the current range store.
//! Future intersections additionally carry control operands whose ranges
//! supply the refinement bounds once resolved.

use std::fmt;

use crate::ssa::Value;

use super::interval::{ChannelInterval, IntInterval, Range, StringInterval};
use super::ranges::Ranges;
use super::zext::Z;

/// A single constraint. `y` is the SSA value whose range it bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `y` is bounded by a literal interval.
    IntInterval { y: Value, interval: IntInterval },
    /// `y` is a string whose length is bounded by a literal interval.
    StringInterval { y: Value, length: IntInterval },
    /// `y` takes the range of `x` unchanged.
    Copy { y: Value, x: Value },
    IntAdd { y: Value, a: Value, b: Value },
    IntSub { y: Value, a: Value, b: Value },
    IntMul { y: Value, a: Value, b: Value },
    /// Integer conversion; width effects are handled by the final clamp.
    IntConversion { y: Value, x: Value },
    /// `y = φ(vars…)`: union of the incoming ranges.
    Phi { y: Value, vars: Vec<Value> },
    /// σ refined by a constant comparison: `y = x ∩ interval`.
    IntIntersection {
        y: Value,
        x: Value,
        interval: IntInterval,
    },
    /// σ refined by a comparison against another value. The bounds are the
    /// endpoint values' ranges plus offsets; a missing endpoint is a
    /// literal infinity. Unresolved futures evaluate to unknown.
    FutureIntIntersection {
        y: Value,
        x: Value,
        lower: Option<Value>,
        lower_offset: Z,
        upper: Option<Value>,
        upper_offset: Z,
        interval: IntInterval,
        resolved: bool,
    },
    /// `y = len(x)` for a string `x`.
    StringLength { y: Value, x: Value },
    /// `y = a + b` on strings: lengths add.
    StringConcat { y: Value, a: Value, b: Value },
    /// `y = x[low:high]` on a string.
    StringSlice {
        y: Value,
        x: Value,
        low: Option<Value>,
        high: Option<Value>,
    },
    /// σ refined by a `len(x) op constant` comparison.
    StringIntersection {
        y: Value,
        x: Value,
        interval: IntInterval,
    },
    /// `y = make(chan, size)`.
    MakeChannel { y: Value, size: Value },
    /// Channel type change; capacity carries over.
    ChannelChangeType { y: Value, x: Value },
}

fn int_range(ranges: &Ranges, v: Value) -> IntInterval {
    match ranges.get(v) {
        Some(Range::Int(i)) => i,
        _ => IntInterval::unknown(),
    }
}

fn string_range(ranges: &Ranges, v: Value) -> StringInterval {
    match ranges.get(v) {
        Some(Range::String(s)) => s,
        _ => StringInterval::unknown(),
    }
}

impl Constraint {
    pub fn y(&self) -> Value {
        match self {
            Constraint::IntInterval { y, .. }
            | Constraint::StringInterval { y, .. }
            | Constraint::Copy { y, .. }
            | Constraint::IntAdd { y, .. }
            | Constraint::IntSub { y, .. }
            | Constraint::IntMul { y, .. }
            | Constraint::IntConversion { y, .. }
            | Constraint::Phi { y, .. }
            | Constraint::IntIntersection { y, .. }
            | Constraint::FutureIntIntersection { y, .. }
            | Constraint::StringLength { y, .. }
            | Constraint::StringConcat { y, .. }
            | Constraint::StringSlice { y, .. }
            | Constraint::StringIntersection { y, .. }
            | Constraint::MakeChannel { y, .. }
            | Constraint::ChannelChangeType { y, .. } => *y,
        }
    }

    /// Data operands: the values whose ranges `eval` reads.
    pub fn operands(&self) -> Vec<Value> {
        match self {
            Constraint::IntInterval { .. } | Constraint::StringInterval { .. } => vec![],
            Constraint::Copy { x, .. }
            | Constraint::IntConversion { x, .. }
            | Constraint::IntIntersection { x, .. }
            | Constraint::FutureIntIntersection { x, .. }
            | Constraint::StringLength { x, .. }
            | Constraint::StringIntersection { x, .. }
            | Constraint::ChannelChangeType { x, .. } => vec![*x],
            Constraint::IntAdd { a, b, .. }
            | Constraint::IntSub { a, b, .. }
            | Constraint::IntMul { a, b, .. }
            | Constraint::StringConcat { a, b, .. } => vec![*a, *b],
            Constraint::Phi { vars, .. } => vars.clone(),
            Constraint::StringSlice { x, low, high, .. } => {
                let mut ops = vec![*x];
                ops.extend(low.iter().copied());
                ops.extend(high.iter().copied());
                ops
            }
            Constraint::MakeChannel { size, .. } => vec![*size],
        }
    }

    /// Control operands: endpoint values of a future refinement.
    pub fn futures(&self) -> Vec<Value> {
        match self {
            Constraint::FutureIntIntersection { lower, upper, .. } => {
                lower.iter().chain(upper.iter()).copied().collect()
            }
            _ => vec![],
        }
    }

    pub fn is_future(&self) -> bool {
        matches!(self, Constraint::FutureIntIntersection { .. })
    }

    pub(crate) fn is_resolved(&self) -> bool {
        match self {
            Constraint::FutureIntIntersection { resolved, .. } => *resolved,
            _ => true,
        }
    }

    pub(crate) fn mark_resolved(&mut self) {
        if let Constraint::FutureIntIntersection { resolved, .. } = self {
            *resolved = true;
        }
    }

    /// Read the endpoint ranges into a concrete interval and mark the
    /// future resolved. No-op for other constraints.
    pub(crate) fn resolve(&mut self, ranges: &Ranges) {
        let Constraint::FutureIntIntersection {
            lower,
            lower_offset,
            upper,
            upper_offset,
            interval,
            resolved,
            ..
        } = self
        else {
            return;
        };
        let lo = match lower {
            Some(v) => {
                let r = int_range(ranges, *v);
                if r.is_known() {
                    r.lower.add(lower_offset)
                } else {
                    Z::NegInf
                }
            }
            None => Z::NegInf,
        };
        let hi = match upper {
            Some(v) => {
                let r = int_range(ranges, *v);
                if r.is_known() {
                    r.upper.add(upper_offset)
                } else {
                    Z::PosInf
                }
            }
            None => Z::PosInf,
        };
        *interval = IntInterval::new(lo, hi);
        *resolved = true;
    }

    /// Compute a new range for `y` from the current store. Pure: never
    /// mutates the store or the constraint. `None` means the constraint
    /// has nothing to say (e.g. an operand of an unsupported type).
    pub(crate) fn eval(&self, ranges: &Ranges) -> Option<Range> {
        match self {
            Constraint::IntInterval { interval, .. } => Some(Range::Int(interval.clone())),
            Constraint::StringInterval { length, .. } => {
                Some(Range::String(StringInterval::new(length.clone())))
            }
            Constraint::Copy { x, .. } | Constraint::ChannelChangeType { x, .. } => ranges.get(*x),
            Constraint::IntAdd { a, b, .. } => Some(Range::Int(
                int_range(ranges, *a).add(&int_range(ranges, *b)),
            )),
            Constraint::IntSub { a, b, .. } => Some(Range::Int(
                int_range(ranges, *a).sub(&int_range(ranges, *b)),
            )),
            Constraint::IntMul { a, b, .. } => Some(Range::Int(
                int_range(ranges, *a).mul(&int_range(ranges, *b)),
            )),
            Constraint::IntConversion { x, .. } => match ranges.get(*x) {
                Some(Range::Int(i)) => Some(Range::Int(i)),
                _ => None,
            },
            Constraint::Phi { vars, .. } => {
                let mut acc: Option<Range> = None;
                for v in vars {
                    let Some(r) = ranges.get(*v) else { continue };
                    acc = Some(match acc {
                        Some(a) => a.union(&r),
                        None => r,
                    });
                }
                acc
            }
            Constraint::IntIntersection { x, interval, .. } => {
                Some(Range::Int(int_range(ranges, *x).intersection(interval)))
            }
            Constraint::FutureIntIntersection {
                x,
                interval,
                resolved,
                ..
            } => {
                if !resolved {
                    return Some(Range::Int(IntInterval::unknown()));
                }
                Some(Range::Int(int_range(ranges, *x).intersection(interval)))
            }
            Constraint::StringLength { x, .. } => {
                Some(Range::Int(string_range(ranges, *x).length))
            }
            Constraint::StringConcat { a, b, .. } => Some(Range::String(StringInterval::new(
                string_range(ranges, *a)
                    .length
                    .add(&string_range(ranges, *b).length),
            ))),
            Constraint::StringSlice { x, low, high, .. } => {
                let lo = match low {
                    Some(v) => int_range(ranges, *v),
                    None => IntInterval::new(Z::zero(), Z::zero()),
                };
                let hi = match high {
                    Some(v) => int_range(ranges, *v),
                    None => string_range(ranges, *x).length,
                };
                if !lo.is_known() || !hi.is_known() {
                    return Some(Range::String(StringInterval::unknown()));
                }
                // length of x[lo:hi] is hi − lo, never negative, never
                // longer than x itself
                let mut len = hi.sub(&lo);
                if len.is_known() && len.lower.sign() < 0 {
                    len = IntInterval::new(Z::zero(), len.upper);
                }
                let bound =
                    IntInterval::new(Z::zero(), string_range(ranges, *x).length.upper);
                Some(Range::String(StringInterval::new(len.intersection(&bound))))
            }
            Constraint::StringIntersection { x, interval, .. } => {
                let sx = string_range(ranges, *x);
                if !sx.is_known() {
                    return Some(Range::String(StringInterval::unknown()));
                }
                Some(Range::String(StringInterval::new(
                    sx.length.intersection(interval),
                )))
            }
            Constraint::MakeChannel { size, .. } => {
                let mut i = int_range(ranges, *size);
                if !i.is_known() {
                    return Some(Range::Channel(ChannelInterval::any()));
                }
                if i.lower.sign() < 0 {
                    i = IntInterval::new(Z::zero(), i.upper);
                }
                Some(Range::Channel(ChannelInterval::new(i)))
            }
        }
    }
}

fn fmt_endpoint(
    f: &mut fmt::Formatter<'_>,
    endpoint: &Option<Value>,
    offset: &Z,
    infinity: &str,
) -> fmt::Result {
    match endpoint {
        None => write!(f, "{infinity}"),
        Some(v) => {
            write!(f, "{v}")?;
            match offset.sign() {
                0 => Ok(()),
                _ if *offset > Z::zero() => write!(f, "+{offset}"),
                _ => write!(f, "{offset}"),
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::IntInterval { y, interval } => write!(f, "{y} = {interval}"),
            Constraint::StringInterval { y, length } => write!(f, "{y} = len {length}"),
            Constraint::Copy { y, x } => write!(f, "{y} = copy({x})"),
            Constraint::IntAdd { y, a, b } => write!(f, "{y} = {a} + {b}"),
            Constraint::IntSub { y, a, b } => write!(f, "{y} = {a} - {b}"),
            Constraint::IntMul { y, a, b } => write!(f, "{y} = {a} * {b}"),
            Constraint::IntConversion { y, x } => write!(f, "{y} = convert({x})"),
            Constraint::Phi { y, vars } => {
                write!(f, "{y} = φ(")?;
                for (i, v) in vars.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Constraint::IntIntersection { y, x, interval } => {
                write!(f, "{y} = {x} ∩ {interval}")
            }
            Constraint::FutureIntIntersection {
                y,
                x,
                lower,
                lower_offset,
                upper,
                upper_offset,
                ..
            } => {
                write!(f, "{y} = {x} ∩ [")?;
                fmt_endpoint(f, lower, lower_offset, "-∞")?;
                write!(f, ", ")?;
                fmt_endpoint(f, upper, upper_offset, "∞")?;
                write!(f, "]")
            }
            Constraint::StringLength { y, x } => write!(f, "{y} = len({x})"),
            Constraint::StringConcat { y, a, b } => write!(f, "{y} = {a} + {b}"),
            Constraint::StringSlice { y, x, low, high } => {
                write!(f, "{y} = {x}[")?;
                if let Some(low) = low {
                    write!(f, "{low}")?;
                }
                write!(f, ":")?;
                if let Some(high) = high {
                    write!(f, "{high}")?;
                }
                write!(f, "]")
            }
            Constraint::StringIntersection { y, x, interval } => {
                write!(f, "{y} = len({x}) ∩ {interval}")
            }
            Constraint::MakeChannel { y, size } => write!(f, "{y} = make(chan, {size})"),
            Constraint::ChannelChangeType { y, x } => write!(f, "{y} = changetype({x})"),
        }
    }
}
