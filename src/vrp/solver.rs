//! Two-phase fixed-point solver
//!
//! Components are visited in topological order. A singleton component
//! evaluates directly (values default to their typed top, constraints to
//! their eval). A cyclic component first widens from its entries — the
//! members whose ranges are already known from outside — with endpoints
//! snapped to the jump set of function constants, then resolves pending
//! futures, then narrows to claw back the precision widening gave up.
//! Finished ranges propagate across outgoing edges so later components
//! start seeded. A final pass clamps signed ranges that escaped their
//! type's representable width.

use std::collections::HashMap;

use num_bigint::BigInt;
use tracing::trace;

use crate::ssa::{ConstValue, Type, Value};

use super::constraint::Constraint;
use super::graph::{ConstraintId, Graph, VertexKind};
use super::interval::{ChannelInterval, IntInterval, Range, StringInterval};
use super::ranges::Ranges;
use super::zext::Z;

impl<'f> Graph<'f> {
    /// Run the analysis to completion and return the range store.
    pub fn solve(mut self) -> Ranges<'f> {
        let consts = self.jump_consts();
        for scc in 0..self.sccs.len() {
            if self.sccs[scc].len() == 1 {
                self.solve_singleton(scc);
            } else {
                self.solve_component(scc, &consts);
            }
            self.propagate(scc);
        }
        self.clamp_signed_ranges();
        self.ranges
    }

    /// The widening jump set: c, c+1, c−1 for every integer constant in
    /// the function, ascending.
    fn jump_consts(&self) -> Vec<Z> {
        let mut consts = Vec::new();
        let one = Z::from(1);
        for vertex in &self.vertices {
            let VertexKind::Value(v) = vertex.kind else {
                continue;
            };
            if !self.func.ty(v).is_integer() {
                continue;
            }
            let Some(ConstValue::Int(n)) = self.func.const_value(v) else {
                continue;
            };
            let z = Z::from(n.clone());
            consts.push(z.add(&one));
            consts.push(z.sub(&one));
            consts.push(z);
        }
        consts.sort();
        consts
    }

    fn solve_singleton(&mut self, scc: usize) {
        self.resolve_futures(scc);
        let vid = self.sccs[scc][0];
        match self.vertices[vid].kind {
            VertexKind::Value(v) => self.default_to_top(v),
            VertexKind::Constraint(cid) => {
                let y = self.constraints[cid].y();
                if let Some(r) = self.constraints[cid].eval(&self.ranges) {
                    self.ranges.set(y, r);
                }
            }
        }
    }

    fn solve_component(&mut self, scc: usize, consts: &[Z]) {
        trace!(scc, size = self.sccs[scc].len(), "solving cyclic component");
        let uses = self.uses(scc);

        let mut worklist = self.entries(scc);
        while let Some(v) = worklist.pop() {
            let Some(cs) = uses.get(&v) else { continue };
            for &cid in cs {
                if self.widen(cid, consts) {
                    worklist.push(self.constraints[cid].y());
                }
            }
        }

        self.resolve_futures(scc);

        // Widening reaches members only through entries; anything integer
        // still unknown here gets the infinite fallback.
        let members = self.sccs[scc].clone();
        for vid in members {
            let VertexKind::Value(v) = self.vertices[vid].kind else {
                continue;
            };
            if !self.func.ty(v).is_integer() {
                continue;
            }
            if !matches!(self.ranges.get(v), Some(r) if r.is_known()) {
                let top = self.ranges.infinity_for(v);
                self.ranges.set(v, Range::Int(top));
            }
        }

        let mut worklist = self.actives(scc);
        while let Some(v) = worklist.pop() {
            let Some(cs) = uses.get(&v) else { continue };
            for &cid in cs {
                if self.narrow(cid) {
                    worklist.push(self.constraints[cid].y());
                }
            }
        }
    }

    fn resolve_futures(&mut self, scc: usize) {
        let futures = &self.futures[scc];
        let (constraints, ranges) = (&mut self.constraints, &self.ranges);
        for &cid in futures {
            constraints[cid].resolve(ranges);
        }
    }

    /// Data-edge uses of each value, restricted to constraints whose
    /// target also lives in this component.
    fn uses(&self, scc: usize) -> HashMap<Value, Vec<ConstraintId>> {
        let mut m: HashMap<Value, Vec<ConstraintId>> = HashMap::new();
        for e in &self.scc_edges[scc] {
            if e.control {
                continue;
            }
            let VertexKind::Value(v) = self.vertices[e.from].kind else {
                continue;
            };
            let VertexKind::Constraint(cid) = self.vertices[e.to].kind else {
                continue;
            };
            let y = self.constraints[cid].y();
            if self.vertices[self.value_vertex[&y]].scc == scc {
                m.entry(v).or_default().push(cid);
            }
        }
        m
    }

    /// Component members whose range is already known, seeding the
    /// widening worklist. A future targeting a member is marked resolved
    /// on the way.
    fn entries(&mut self, scc: usize) -> Vec<Value> {
        let members = self.sccs[scc].clone();
        let mut entries = Vec::new();
        for vid in members {
            let VertexKind::Value(v) = self.vertices[vid].kind else {
                continue;
            };
            if let Some(&cid) = self.future_of.get(&v) {
                if !self.constraints[cid].is_resolved() {
                    if let Some(r) = self.constraints[cid].eval(&self.ranges) {
                        self.ranges.set(v, r);
                    }
                    self.constraints[cid].mark_resolved();
                }
            }
            if matches!(self.ranges.get(v), Some(r) if r.is_known()) {
                entries.push(v);
            }
        }
        entries
    }

    /// All non-constant members, seeding the narrowing worklist.
    fn actives(&self, scc: usize) -> Vec<Value> {
        let mut actives = Vec::new();
        for &vid in &self.sccs[scc] {
            let VertexKind::Value(v) = self.vertices[vid].kind else {
                continue;
            };
            if !self.func.is_const(v) {
                actives.push(v);
            }
        }
        actives
    }

    fn widen(&mut self, cid: ConstraintId, consts: &[Z]) -> bool {
        let y = self.constraints[cid].y();
        match self.ranges.get(y) {
            Some(Range::Int(oi)) => {
                let ni = match self.constraints[cid].eval(&self.ranges) {
                    Some(Range::Int(i)) => i,
                    _ => return false,
                };
                let (wi, changed) = widen_interval(&oi, &ni, consts);
                if changed {
                    self.ranges.set(y, Range::Int(wi));
                }
                changed
            }
            Some(Range::String(os)) => {
                let ni = match self.constraints[cid].eval(&self.ranges) {
                    Some(Range::String(s)) => s,
                    _ => return false,
                };
                let (wi, changed) = widen_interval(&os.length, &ni.length, consts);
                if changed {
                    self.ranges.set(y, Range::String(StringInterval::new(wi)));
                }
                changed
            }
            _ => false,
        }
    }

    fn narrow(&mut self, cid: ConstraintId) -> bool {
        let y = self.constraints[cid].y();
        match self.ranges.get(y) {
            Some(Range::Int(oi)) => {
                let ni = match self.constraints[cid].eval(&self.ranges) {
                    Some(Range::Int(i)) => i,
                    _ => return false,
                };
                let (si, changed) = narrow_interval(&oi, &ni);
                if changed {
                    self.ranges.set(y, Range::Int(si));
                }
                changed
            }
            Some(Range::String(os)) => {
                let ni = match self.constraints[cid].eval(&self.ranges) {
                    Some(Range::String(s)) => s,
                    _ => return false,
                };
                let (si, changed) = narrow_interval(&os.length, &ni.length);
                if changed {
                    self.ranges.set(y, Range::String(StringInterval::new(si)));
                }
                changed
            }
            _ => false,
        }
    }

    /// Push finished ranges across edges leaving this component. A future
    /// whose interval is still unknown is re-armed so the component owning
    /// it resolves it again.
    fn propagate(&mut self, scc: usize) {
        for i in 0..self.scc_edges[scc].len() {
            let e = self.scc_edges[scc][i];
            if e.control {
                continue;
            }
            if self.vertices[e.from].scc == self.vertices[e.to].scc {
                continue;
            }
            let VertexKind::Constraint(cid) = self.vertices[e.to].kind else {
                continue;
            };
            let y = self.constraints[cid].y();
            if let Some(r) = self.constraints[cid].eval(&self.ranges) {
                self.ranges.set(y, r);
            }
            if let Constraint::FutureIntIntersection {
                interval, resolved, ..
            } = &mut self.constraints[cid]
            {
                if !interval.is_known() {
                    *resolved = false;
                }
            }
        }
    }

    fn default_to_top(&mut self, v: Value) {
        let known = matches!(self.ranges.get(v), Some(r) if r.is_known());
        if known {
            return;
        }
        match self.func.ty(v) {
            Type::String => self.ranges.set(v, Range::String(StringInterval::any())),
            Type::Channel => self.ranges.set(v, Range::Channel(ChannelInterval::any())),
            Type::Int { .. } => {
                let top = self.ranges.infinity_for(v);
                self.ranges.set(v, Range::Int(top));
            }
            _ => {}
        }
    }

    /// A signed range whose finite bound escapes the type's representable
    /// width collapses to the full line. Unsigned lower bounds are already
    /// asserted by typing and stay untouched.
    fn clamp_signed_ranges(&mut self) {
        let func = self.func;
        for (v, r) in self.ranges.iter_mut() {
            let Range::Int(i) = r else { continue };
            let Type::Int { bits, signed: true } = func.ty(*v) else {
                continue;
            };
            if i.upper == Z::PosInf {
                continue;
            }
            let n = BigInt::from(1) << (bits - 1);
            let max = Z::from(n.clone() - 1);
            let min = Z::from(-n);
            if i.upper > max || i.lower < min {
                *i = IntInterval::infinite();
            }
        }
    }
}

fn widen_interval(oi: &IntInterval, ni: &IntInterval, consts: &[Z]) -> (IntInterval, bool) {
    if !ni.is_known() {
        return (oi.clone(), false);
    }
    // Jump anchors: largest constant ≤ the new lower, smallest ≥ the new
    // upper.
    let nlc = consts
        .iter()
        .rev()
        .find(|c| **c <= ni.lower)
        .cloned()
        .unwrap_or(Z::NegInf);
    let nuc = consts
        .iter()
        .find(|c| **c >= ni.upper)
        .cloned()
        .unwrap_or(Z::PosInf);
    if !oi.is_known() {
        return (ni.clone(), true);
    }
    if ni.lower < oi.lower && ni.upper > oi.upper {
        return (IntInterval::new(nlc, nuc), true);
    }
    if ni.lower < oi.lower {
        return (IntInterval::new(nlc, oi.upper.clone()), true);
    }
    if ni.upper > oi.upper {
        return (IntInterval::new(oi.lower.clone(), nuc), true);
    }
    (oi.clone(), false)
}

/// At most one bound moves per invocation: infinite bounds pick up the
/// newly learned finite value first, then overshoot is corrected.
fn narrow_interval(oi: &IntInterval, ni: &IntInterval) -> (IntInterval, bool) {
    if !ni.is_known() {
        return (oi.clone(), false);
    }
    if !oi.is_known() {
        return (ni.clone(), true);
    }
    if oi.lower == Z::NegInf && ni.lower != Z::NegInf {
        return (
            IntInterval::new(ni.lower.clone(), oi.upper.clone()),
            true,
        );
    }
    if oi.upper == Z::PosInf && ni.upper != Z::PosInf {
        return (
            IntInterval::new(oi.lower.clone(), ni.upper.clone()),
            true,
        );
    }
    if oi.lower > ni.lower {
        return (
            IntInterval::new(ni.lower.clone(), oi.upper.clone()),
            true,
        );
    }
    if oi.upper < ni.upper {
        return (
            IntInterval::new(oi.lower.clone(), ni.upper.clone()),
            true,
        );
    }
    (oi.clone(), false)
}
