//! Satisfiability oracle used by the rectification loop.
//!
//! The loop only talks to the [`Oracle`] trait: constraints are asserted permanently,
//! queries are checked under temporary assumptions. [`VarisatOracle`] implements it
//! on top of the incremental CDCL solver of the `varisat` crate.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use varisat::ExtendFormula;

use crate::{
    Result,
    cnf::{Cnf, CnfEncoder, Lit, LitRes},
    expr::{Expr, ExprId, ExprPool, Var},
};

/// Error returned when the SAT oracle fails.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The underlying solver reported an error.
    #[error("SAT solver error: {0}")]
    Solver(String),

    /// The solver answered SAT but did not provide any model.
    #[error("SAT solver answered SAT without a model")]
    ModelUnavailable,

    /// An expression node was not mapped to any SAT literal.
    #[error("expression node {0} is not mapped to any literal")]
    UnmappedNode(ExprId),
}

/// A satisfying assignment.
///
/// Variables the solver never saw are completed to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model(HashMap<Var, bool>);

impl Model {
    pub fn value(&self, var: Var) -> bool {
        self.0.get(&var).copied().unwrap_or(false)
    }
}

impl FromIterator<(Var, bool)> for Model {
    fn from_iter<T: IntoIterator<Item = (Var, bool)>>(iter: T) -> Self {
        Model(iter.into_iter().collect())
    }
}

/// Outcome of a satisfiability query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    Sat(Model),
    Unsat,
}

impl SatResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SatResult::Sat(_))
    }
}

/// A satisfiability oracle over expressions of an [`ExprPool`].
///
/// The same pool must be given to every call.
pub trait Oracle {
    /// Permanently adds the constraint `expr == true`.
    fn assert(&mut self, pool: &ExprPool, expr: Expr) -> Result<()>;

    /// Checks whether the asserted constraints and `assumptions` (all required to be
    /// true for this query only) are satisfiable.
    fn check_sat(&mut self, pool: &ExprPool, assumptions: &[Expr]) -> Result<SatResult>;
}

/// [`Oracle`] backed by an incremental `varisat` solver.
///
/// Expressions are Tseitin-encoded once per node, the clauses are kept across queries.
pub struct VarisatOracle<'a> {
    solver: varisat::Solver<'a>,
    encoder: CnfEncoder,
    /// Every clause given to the solver, in order.
    cnf: Cnf,
    /// Number of clauses of `cnf` already given to the solver.
    flushed: usize,
    /// Set once `false` was asserted.
    inconsistent: bool,
    queries: usize,
}

impl Default for VarisatOracle<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn to_varisat(lit: Lit) -> varisat::Lit {
    let var = varisat::Var::from_index(lit.var_index());
    if lit.is_positive() {
        varisat::Lit::positive(var)
    } else {
        varisat::Lit::negative(var)
    }
}

impl VarisatOracle<'_> {
    pub fn new() -> Self {
        VarisatOracle {
            solver: varisat::Solver::new(),
            encoder: CnfEncoder::new(),
            cnf: Cnf::new(),
            flushed: 0,
            inconsistent: false,
            queries: 0,
        }
    }

    /// Every clause asserted so far, for instance to dump them in DIMACS.
    pub fn get_cnf(&self) -> &Cnf {
        &self.cnf
    }

    /// Number of [`Oracle::check_sat`] calls answered so far.
    pub fn num_queries(&self) -> usize {
        self.queries
    }

    fn encode(&mut self, pool: &ExprPool, expr: Expr) -> Result<LitRes> {
        let lit = self.encoder.encode(pool, expr, &mut self.cnf)?;
        for clause in &self.cnf.get_clauses()[self.flushed..] {
            let lits: Vec<varisat::Lit> =
                clause.get_lits().iter().copied().map(to_varisat).collect();
            self.solver.add_clause(&lits);
        }
        self.flushed = self.cnf.len();
        Ok(lit)
    }

    fn read_model(&self) -> Result<Model> {
        let model: HashSet<varisat::Lit> = self
            .solver
            .model()
            .ok_or(OracleError::ModelUnavailable)?
            .into_iter()
            .collect();
        Ok(self
            .encoder
            .var_lits()
            .map(|(var, lit)| (var, model.contains(&to_varisat(lit))))
            .collect())
    }
}

impl Oracle for VarisatOracle<'_> {
    fn assert(&mut self, pool: &ExprPool, expr: Expr) -> Result<()> {
        match self.encode(pool, expr)? {
            LitRes::True => (),
            LitRes::False => {
                log::debug!("oracle; asserted a constant false constraint");
                self.inconsistent = true;
            }
            LitRes::Lit(lit) => {
                self.cnf.add_unit(lit);
                self.solver.add_clause(&[to_varisat(lit)]);
                self.flushed = self.cnf.len();
            }
        }
        Ok(())
    }

    fn check_sat(&mut self, pool: &ExprPool, assumptions: &[Expr]) -> Result<SatResult> {
        self.queries += 1;
        let mut lits = Vec::with_capacity(assumptions.len());
        let mut trivially_unsat = self.inconsistent;
        for &assumption in assumptions {
            match self.encode(pool, assumption)? {
                LitRes::True => (),
                LitRes::False => trivially_unsat = true,
                LitRes::Lit(lit) => lits.push(to_varisat(lit)),
            }
        }
        if trivially_unsat {
            return Ok(SatResult::Unsat);
        }

        self.solver.assume(&lits);
        let sat = self
            .solver
            .solve()
            .map_err(|e| OracleError::Solver(e.to_string()))?;
        log::trace!(
            "oracle; query {} with {} assumptions is {}",
            self.queries,
            lits.len(),
            if sat { "SAT" } else { "UNSAT" }
        );
        if sat {
            Ok(SatResult::Sat(self.read_model()?))
        } else {
            Ok(SatResult::Unsat)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ParamId;

    #[test]
    fn model_defaults_to_false_test() {
        let model: Model = [(Var::Input(0), true)].into_iter().collect();
        assert!(model.value(Var::Input(0)));
        assert!(!model.value(Var::Input(1)));
        assert!(!model.value(Var::Param(ParamId(0))));
    }

    #[test]
    fn sat_and_unsat_test() {
        let mut pool = ExprPool::new();
        let a = pool.var(Var::Input(0));
        let b = pool.var(Var::Input(1));
        let x = pool.xor(a, b);

        let mut oracle = VarisatOracle::new();
        oracle.assert(&pool, x).unwrap();
        let SatResult::Sat(model) = oracle.check_sat(&pool, &[a]).unwrap() else {
            panic!("a ^ b with a is satisfiable")
        };
        assert!(model.value(Var::Input(0)));
        assert!(!model.value(Var::Input(1)));

        assert_eq!(oracle.check_sat(&pool, &[a, b]).unwrap(), SatResult::Unsat);
        // Assumptions do not stick
        assert!(oracle.check_sat(&pool, &[b]).unwrap().is_sat());
        assert_eq!(oracle.num_queries(), 3);

        oracle.assert(&pool, !a).unwrap();
        oracle.assert(&pool, !b).unwrap();
        assert_eq!(oracle.check_sat(&pool, &[]).unwrap(), SatResult::Unsat);
    }

    #[test]
    fn constant_constraints_test() {
        let mut pool = ExprPool::new();
        let a = pool.var(Var::Input(0));
        let mut oracle = VarisatOracle::new();
        oracle.assert(&pool, ExprPool::TRUE).unwrap();
        assert!(oracle.check_sat(&pool, &[a]).unwrap().is_sat());
        assert_eq!(
            oracle.check_sat(&pool, &[a, ExprPool::FALSE]).unwrap(),
            SatResult::Unsat
        );
        assert!(oracle.check_sat(&pool, &[ExprPool::TRUE]).unwrap().is_sat());

        oracle.assert(&pool, ExprPool::FALSE).unwrap();
        assert_eq!(oracle.check_sat(&pool, &[]).unwrap(), SatResult::Unsat);
    }

    #[test]
    fn dimacs_dump_test() {
        let mut pool = ExprPool::new();
        let a = pool.var(Var::Input(0));
        let b = pool.var(Var::Input(1));
        let f = pool.and(a, b);
        let mut oracle = VarisatOracle::new();
        oracle.assert(&pool, f).unwrap();
        let dimacs = oracle.get_cnf().to_string();
        assert!(dimacs.starts_with("p cnf 3 4\n"));
        assert!(dimacs.ends_with("3 0\n"));
    }
}
