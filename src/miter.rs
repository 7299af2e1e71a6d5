//! Miters between a specification circuit and an implementation circuit.
//!
//! Both circuits are evaluated symbolically over the same primary input variables, then
//! every pair of outputs with the same name is compared with a XOR gate. The single
//! output of the miter, the **mismatch signal**, is the OR of all these XORs: it is true
//! exactly when some output differs.
//!
//! To prove combinational equivalence between `spec` and `implementation`:
//! - build the miter with [`Miter::new`]
//! - check that the mismatch signal is **UNSAT** with an [`Oracle`].
//!
//! If it is SAT, the circuits are **not equivalent** and the model is a counterexample.
//! This is already implemented in [`Miter::try_prove_eq`].
//!
//! When the implementation contains parameterized blocks, the mismatch signal also depends
//! on parameter variables, which is what [`crate::cegis`] builds upon.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::{
    Circuit, Result,
    expr::{Expr, ExprPool, Var},
    oracle::{Oracle, SatResult},
};

/// Error returned when two circuits cannot be compared.
#[derive(Debug, Error)]
pub enum MiterError {
    /// The two circuits have different primary input names.
    #[error("circuits have different inputs: {0:?} vs {1:?}")]
    InputSetMismatch(BTreeSet<String>, BTreeSet<String>),

    /// The two circuits have different primary output names (or counts).
    #[error("circuits have different outputs: {0:?} vs {1:?}")]
    OutputSetMismatch(BTreeSet<String>, BTreeSet<String>),
}

/// The symbolic comparison of two circuits over shared primary inputs.
///
/// Primary input `i` of the specification (in declaration order) is the variable
/// [`Var::Input`]`(i)`; the implementation inputs are matched by name.
#[derive(Debug, Clone)]
pub struct Miter {
    /// Primary inputs, in specification order.
    inputs: Vec<String>,
    /// Primary outputs, in specification order.
    outputs: Vec<String>,
    /// One XOR per output, same order as `outputs`.
    diffs: Vec<Expr>,
    mismatch: Expr,
}

fn check_same_names(a: &[String], b: &[String]) -> Option<(BTreeSet<String>, BTreeSet<String>)> {
    let set_a: BTreeSet<String> = a.iter().cloned().collect();
    let set_b: BTreeSet<String> = b.iter().cloned().collect();
    if set_a != set_b || a.len() != b.len() {
        Some((set_a, set_b))
    } else {
        None
    }
}

impl Miter {
    /// Create a miter between two circuits.
    ///
    /// This will fail if:
    /// - the given circuits have different primary input names
    /// - or they have different primary output names.
    pub fn new(pool: &mut ExprPool, spec: &Circuit, implementation: &Circuit) -> Result<Self> {
        if let Some((a, b)) = check_same_names(spec.get_inputs(), implementation.get_inputs()) {
            return Err(MiterError::InputSetMismatch(a, b).into());
        }
        if let Some((a, b)) = check_same_names(spec.get_outputs(), implementation.get_outputs()) {
            return Err(MiterError::OutputSetMismatch(a, b).into());
        }

        let inputs: HashMap<String, Expr> = spec
            .get_inputs()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), pool.var(Var::Input(i))))
            .collect();
        let spec_values = spec.evaluate(pool, &inputs)?;
        let impl_values = implementation.evaluate(pool, &inputs)?;

        // Outputs are paired by name, implementation outputs may be declared in another order
        let impl_outputs: HashMap<&str, Expr> = implementation
            .get_outputs()
            .iter()
            .map(String::as_str)
            .zip(impl_values.outputs.iter().copied())
            .collect();
        let mut diffs = Vec::with_capacity(spec.get_outputs().len());
        for (name, &spec_out) in spec.get_outputs().iter().zip(&spec_values.outputs) {
            let impl_out = impl_outputs[name.as_str()];
            diffs.push(pool.xor(spec_out, impl_out));
        }
        let mismatch = pool.or_all(diffs.iter().copied());
        log::debug!(
            "miter; {} inputs, {} outputs, {} nodes in pool",
            inputs.len(),
            diffs.len(),
            pool.len()
        );

        Ok(Miter {
            inputs: spec.get_inputs().to_vec(),
            outputs: spec.get_outputs().to_vec(),
            diffs,
            mismatch,
        })
    }

    /// The mismatch signal, true exactly when some output differs.
    pub fn get_mismatch(&self) -> Expr {
        self.mismatch
    }

    /// Primary inputs, in specification order (position `i` is [`Var::Input`]`(i)`).
    pub fn get_inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn get_outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Per-output difference signals, in specification output order.
    pub fn get_diffs(&self) -> &[Expr] {
        &self.diffs
    }

    /// The mismatch signal with every primary input fixed to the given values
    /// (in specification input order). Only parameter variables remain.
    pub fn instantiate(&self, pool: &mut ExprPool, values: &[bool]) -> Expr {
        let substitution: HashMap<Var, Expr> = values
            .iter()
            .enumerate()
            .map(|(i, &value)| (Var::Input(i), ExprPool::constant(value)))
            .collect();
        pool.substitute(self.mismatch, &substitution)
    }

    /// Tries to prove that the two circuits are equivalent with one SAT query
    /// (parameters, if any, being free).
    /// - if they are, returns `Ok(None)`
    /// - else returns the primary input values of a counterexample, in specification order.
    pub fn try_prove_eq(
        &self,
        pool: &ExprPool,
        oracle: &mut impl Oracle,
    ) -> Result<Option<Vec<(String, bool)>>> {
        match oracle.check_sat(pool, &[self.mismatch])? {
            SatResult::Unsat => Ok(None),
            SatResult::Sat(model) => Ok(Some(
                self.inputs
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.clone(), model.value(Var::Input(i))))
                    .collect(),
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Gate, GateKind, RectifyError, oracle::VarisatOracle};

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    fn and_or(kind: GateKind, outputs: &[&str]) -> Circuit {
        Circuit::build(
            "c",
            s(&["a", "b"]),
            s(outputs),
            vec![
                Gate::new("f", kind, s(&["a", "b"])),
                Gate::new("g", GateKind::Inv, s(&["a"])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn new_miter_errors_test() {
        let mut pool = ExprPool::new();
        let spec = and_or(GateKind::And, &["f", "g"]);
        let fewer = and_or(GateKind::And, &["f"]);
        assert!(matches!(
            Miter::new(&mut pool, &spec, &fewer),
            Err(RectifyError::MiterError(MiterError::OutputSetMismatch(_, _)))
        ));

        let other_inputs = Circuit::build(
            "c",
            s(&["a", "c"]),
            s(&["f", "g"]),
            vec![
                Gate::new("f", GateKind::And, s(&["a", "c"])),
                Gate::new("g", GateKind::Inv, s(&["a"])),
            ],
        )
        .unwrap();
        assert!(matches!(
            Miter::new(&mut pool, &spec, &other_inputs),
            Err(RectifyError::MiterError(MiterError::InputSetMismatch(_, _)))
        ));
    }

    #[test]
    fn equivalent_circuits_test() {
        let mut pool = ExprPool::new();
        let spec = and_or(GateKind::And, &["f", "g"]);
        // Same circuit, outputs declared in another order
        let implementation = and_or(GateKind::And, &["g", "f"]);
        let miter = Miter::new(&mut pool, &spec, &implementation).unwrap();
        // Structural hashing already proves it
        assert_eq!(miter.get_mismatch(), ExprPool::FALSE);
        let mut oracle = VarisatOracle::new();
        assert_eq!(miter.try_prove_eq(&pool, &mut oracle).unwrap(), None);
    }

    #[test]
    fn counterexample_test() {
        let mut pool = ExprPool::new();
        let spec = and_or(GateKind::And, &["f", "g"]);
        let implementation = and_or(GateKind::Or, &["f", "g"]);
        let miter = Miter::new(&mut pool, &spec, &implementation).unwrap();
        assert_eq!(miter.get_diffs().len(), 2);
        assert_eq!(miter.get_diffs()[1], ExprPool::FALSE);

        let mut oracle = VarisatOracle::new();
        let cex = miter.try_prove_eq(&pool, &mut oracle).unwrap().unwrap();
        assert_eq!(cex.len(), 2);
        // AND and OR differ exactly when a != b
        assert_ne!(cex[0].1, cex[1].1);

        assert_eq!(miter.instantiate(&mut pool, &[true, false]), ExprPool::TRUE);
        assert_eq!(miter.instantiate(&mut pool, &[true, true]), ExprPool::FALSE);
    }
}
