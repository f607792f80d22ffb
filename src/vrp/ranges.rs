//! Range store: SSA value → current range, with typed defaults

use std::collections::HashMap;

use crate::ssa::{Function, Type, Value};

use super::interval::{ChannelInterval, IntInterval, Range, StringInterval};
use super::zext::Z;

/// The mapping produced by the solver. Reading a value that was never
/// written yields the unknown range of its structural type, or `None` for
/// types the analysis does not cover.
#[derive(Debug, Clone)]
pub struct Ranges<'f> {
    func: &'f Function,
    map: HashMap<Value, Range>,
}

impl<'f> Ranges<'f> {
    pub(crate) fn new(func: &'f Function) -> Ranges<'f> {
        Ranges {
            func,
            map: HashMap::new(),
        }
    }

    pub fn get(&self, v: Value) -> Option<Range> {
        if let Some(r) = self.map.get(&v) {
            return Some(r.clone());
        }
        match self.func.ty(v) {
            Type::Int { .. } => Some(Range::Int(IntInterval::unknown())),
            Type::String => Some(Range::String(StringInterval::unknown())),
            Type::Channel => Some(Range::Channel(ChannelInterval::unknown())),
            Type::Bool | Type::Opaque => None,
        }
    }

    pub(crate) fn set(&mut self, v: Value, r: Range) {
        self.map.insert(v, r);
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&Value, &mut Range)> + '_ {
        self.map.iter_mut()
    }

    /// The widest integer range a value of this type can take: `[0, ∞]`
    /// for unsigned integers (typing already asserts the lower bound),
    /// `(-∞, ∞)` otherwise.
    pub(crate) fn infinity_for(&self, v: Value) -> IntInterval {
        if self.func.ty(v).is_unsigned_integer() {
            IntInterval::new(Z::zero(), Z::PosInf)
        } else {
            IntInterval::infinite()
        }
    }
}
