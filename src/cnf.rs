//! Tseitin encoding of symbolic expressions into a CNF.
//!
//! Every AND node of an [`ExprPool`] gets its own SAT literal, defined by three clauses
//! (`z -> a`, `z -> b`, `a & b -> z`). Variables of the pool get a literal too, so a
//! satisfying assignment can be read back in terms of [`Var`].
//!
//! A [`CnfEncoder`] remembers the literal of every node it already encoded, so calling
//! [`CnfEncoder::encode`] again on expressions sharing nodes only emits clauses for the
//! new ones. This is what makes incremental solving cheap.
//!
//! ```rust
//! use rectify::cnf::{Cnf, CnfEncoder, LitRes};
//! use rectify::expr::{ExprPool, Var};
//!
//! let mut pool = ExprPool::new();
//! let a = pool.var(Var::Input(0));
//! let b = pool.var(Var::Input(1));
//! let f = pool.and(a, !b);
//!
//! let mut encoder = CnfEncoder::new();
//! let mut cnf = Cnf::new();
//! let LitRes::Lit(z) = encoder.encode(&pool, f, &mut cnf).unwrap() else {
//!     panic!("f is not constant")
//! };
//! cnf.add_unit(z);
//! assert_eq!(cnf.len(), 4);
//! println!("{}", cnf); // DIMACS
//! ```

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    ops::Not,
};

use crate::{
    Result,
    expr::{Expr, ExprId, ExprNode, ExprPool, Var},
    oracle::OracleError,
};

/// A SAT literal, in DIMACS convention: a non-zero integer whose sign is the polarity.
///
/// Note that some expression nodes do not correspond to a SAT literal.
/// The constant node does not map to any literal, but rather is omitted
/// as false boolean variables can be removed from a clause without changing the problem.
/// Clauses that contain a true boolean variable (ie a complemented edge to the constant node)
/// are obviously true and don't need to be emitted.
///
/// These cases are handled by [`LitRes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lit(i64);

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Lit(-self.0)
    }
}

impl From<i64> for Lit {
    fn from(value: i64) -> Self {
        if value == 0 {
            panic!("Tried to create a Lit from 0. 0 is not a valid literal in DIMACS format.");
        }
        Lit(value)
    }
}

impl Lit {
    /// The DIMACS integer of the literal.
    pub fn get_dimacs(&self) -> i64 {
        self.0
    }

    /// Zero-based index of the underlying variable.
    pub fn var_index(&self) -> usize {
        (self.0.unsigned_abs() - 1) as usize
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

/// Either a real literal or one of the two constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitRes {
    False,
    True,
    Lit(Lit),
}

impl Not for LitRes {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            LitRes::False => LitRes::True,
            LitRes::True => LitRes::False,
            LitRes::Lit(lit) => LitRes::Lit(!lit),
        }
    }
}

impl From<Lit> for LitRes {
    fn from(value: Lit) -> Self {
        LitRes::Lit(value)
    }
}

/// A SAT clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause(Vec<Lit>);

impl Clause {
    /// Returns the true SAT clause once we got rid of `True` and `False` literals.
    /// If there is a `True`, then the Clause is obviously satisfied, so we return None.
    /// `False` literals are omitted, and real literals are added to the clause.
    /// If the clause is empty (lits were only `False`), None is returned.
    fn from_lit_res(lits: Vec<LitRes>) -> Option<Clause> {
        let mut literals = Vec::new();

        for lit_res in lits {
            match lit_res {
                LitRes::True => return None,
                LitRes::False => (),
                LitRes::Lit(lit) => literals.push(lit),
            }
        }

        if literals.is_empty() {
            None
        } else {
            Some(Clause(literals))
        }
    }

    pub fn get_lits(&self) -> &[Lit] {
        &self.0
    }
}

impl From<Vec<Lit>> for Clause {
    fn from(value: Vec<Lit>) -> Self {
        Clause(value)
    }
}

/// A SAT CNF that can be passed to a SAT solver, or written out in the DIMACS format
/// through its [`Display`] implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cnf(Vec<Clause>);

impl Cnf {
    /// A new empty CNF.
    pub fn new() -> Self {
        Cnf(Vec::new())
    }

    /// Add the given clause to the CNF.
    pub fn add_clause(&mut self, clause: Clause) {
        self.0.push(clause);
    }

    /// Add the given clause to the CNF, else does nothing.
    pub fn add_clause_if(&mut self, clause: Option<Clause>) {
        if let Some(c) = clause {
            self.add_clause(c);
        }
    }

    /// Add a clause forcing `lit` to be true.
    pub fn add_unit(&mut self, lit: Lit) {
        self.add_clause(Clause::from(vec![lit]));
    }

    /// Add clauses that encode `z = AND(a, b)`.
    ///
    /// Constant fanins are simplified away (see [`LitRes`]).
    pub fn add_and(&mut self, a: LitRes, b: LitRes, z: Lit) {
        let z = LitRes::from(z);
        self.add_clause_if(Clause::from_lit_res(vec![a, !z]));
        self.add_clause_if(Clause::from_lit_res(vec![b, !z]));
        self.add_clause_if(Clause::from_lit_res(vec![!a, !b, z]));
    }

    pub fn get_clauses(&self) -> &[Clause] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest variable index used, which is the variable count of the DIMACS header.
    pub fn num_vars(&self) -> usize {
        self.0
            .iter()
            .flat_map(|clause| clause.0.iter())
            .map(|lit| lit.var_index() + 1)
            .max()
            .unwrap_or(0)
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars(), self.len())?;
        for clause in &self.0 {
            for lit in &clause.0 {
                write!(f, "{} ", lit.0)?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}

/// Assigns SAT literals to expression nodes and emits their defining clauses.
#[derive(Debug, Clone)]
pub struct CnfEncoder {
    /// Literal of every encoded node, the constant node excluded.
    litmap: HashMap<ExprId, Lit>,
    /// Literal of every encoded variable.
    var_lits: BTreeMap<Var, Lit>,
    /// The index of the next literal (for internal use only).
    next_lit: i64,
}

impl Default for CnfEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CnfEncoder {
    pub fn new() -> Self {
        CnfEncoder {
            litmap: HashMap::new(),
            var_lits: BTreeMap::new(),
            next_lit: 1,
        }
    }

    /// Returns a yet unused SAT literal.
    pub fn fresh_lit(&mut self) -> Lit {
        let lit = self.next_lit.into();
        self.next_lit += 1;
        lit
    }

    /// Number of literals handed out so far.
    pub fn num_lits(&self) -> usize {
        (self.next_lit - 1) as usize
    }

    /// Literal standing for the given variable, if it was encoded.
    pub fn get_var_lit(&self, var: Var) -> Option<Lit> {
        self.var_lits.get(&var).copied()
    }

    /// Every encoded variable with its literal.
    pub fn var_lits(&self) -> impl Iterator<Item = (Var, Lit)> + '_ {
        self.var_lits.iter().map(|(&var, &lit)| (var, lit))
    }

    /// Literal (or constant) standing for an already encoded expression.
    pub fn get_lit_res(&self, expr: Expr) -> Result<LitRes> {
        let lit = if expr.get_node_id() == 0 {
            LitRes::False
        } else {
            let id = expr.get_node_id();
            LitRes::from(*self.litmap.get(&id).ok_or(OracleError::UnmappedNode(id))?)
        };
        Ok(if expr.get_complement() { !lit } else { lit })
    }

    /// Encodes every node `expr` depends on which was not encoded yet, adding their
    /// clauses to `cnf`, and returns the literal standing for `expr`.
    pub fn encode(&mut self, pool: &ExprPool, expr: Expr, cnf: &mut Cnf) -> Result<LitRes> {
        for id in pool.cone(expr) {
            if id == 0 || self.litmap.contains_key(&id) {
                continue;
            }
            let node = pool.get_node(id).ok_or(OracleError::UnmappedNode(id))?;
            match *node {
                ExprNode::False => (),
                ExprNode::Var(var) => {
                    let lit = self.fresh_lit();
                    self.litmap.insert(id, lit);
                    self.var_lits.insert(var, lit);
                }
                ExprNode::And(a, b) => {
                    // Fanins have smaller ids, they are already encoded
                    let a = self.get_lit_res(a)?;
                    let b = self.get_lit_res(b)?;
                    let z = self.fresh_lit();
                    self.litmap.insert(id, z);
                    cnf.add_and(a, b, z);
                }
            }
        }
        self.get_lit_res(expr)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn not_lit_test() {
        let l1 = Lit(1);
        assert_eq!(!l1, Lit(-1));
        assert_eq!((!l1).var_index(), 0);
        assert!(!(!l1).is_positive());
    }

    #[test]
    fn not_lit_res_test() {
        let ltrue = LitRes::True;
        let lfalse = LitRes::False;
        let l1 = LitRes::Lit(Lit(1));
        assert_eq!(!lfalse, ltrue);
        assert_eq!(!l1, LitRes::Lit(!Lit(1)));
    }

    #[test]
    fn clause_from_lit_res_test() {
        let ltrue = LitRes::True;
        let lfalse = LitRes::False;
        let l1 = Lit(1);
        let l2 = Lit(2);
        let lr1 = LitRes::Lit(l1);
        let lr2 = LitRes::Lit(l2);

        assert!(Clause::from_lit_res(vec![lfalse, lfalse]).is_none());
        assert!(Clause::from_lit_res(vec![lfalse, ltrue, lr1]).is_none());
        assert_eq!(
            Clause::from_lit_res(vec![lr1, lfalse, lr2]).unwrap(),
            Clause(vec![l1, l2])
        );
    }

    #[test]
    fn add_and_with_constant_test() {
        let mut cnf = Cnf::new();
        // z = a & true, only z -> a and a -> z remain
        cnf.add_and(LitRes::Lit(Lit(1)), LitRes::True, Lit(2));
        assert_eq!(
            cnf.get_clauses(),
            &[
                Clause(vec![Lit(1), Lit(-2)]),
                Clause(vec![Lit(-1), Lit(2)])
            ]
        );
    }

    #[test]
    fn dimacs_test() {
        let mut cnf = Cnf::new();
        cnf.add_clause(Clause::from(vec![Lit(1), Lit(-3)]));
        cnf.add_unit(Lit(2));
        assert_eq!(cnf.to_string(), "p cnf 3 2\n1 -3 0\n2 0\n");
    }

    #[test]
    fn encoder_reuses_nodes_test() {
        let mut pool = ExprPool::new();
        let a = pool.var(Var::Input(0));
        let b = pool.var(Var::Input(1));
        let ab = pool.and(a, b);
        let f = pool.or(ab, !a);

        let mut encoder = CnfEncoder::new();
        let mut cnf = Cnf::new();
        let lab = encoder.encode(&pool, ab, &mut cnf).unwrap();
        assert_eq!(cnf.len(), 3);
        assert_eq!(encoder.num_lits(), 3);

        let lf = encoder.encode(&pool, f, &mut cnf).unwrap();
        // Only the new AND node is encoded
        assert_eq!(cnf.len(), 6);
        assert_eq!(encoder.num_lits(), 4);
        assert_ne!(lab, lf);
        assert_eq!(encoder.encode(&pool, ab, &mut cnf).unwrap(), lab);
        assert_eq!(cnf.len(), 6);

        assert!(encoder.get_var_lit(Var::Input(0)).is_some());
        assert!(encoder.get_var_lit(Var::Input(2)).is_none());
        assert_eq!(encoder.var_lits().count(), 2);
    }

    #[test]
    fn encoder_constants_test() {
        let pool = ExprPool::new();
        let mut encoder = CnfEncoder::new();
        let mut cnf = Cnf::new();
        assert_eq!(
            encoder.encode(&pool, ExprPool::TRUE, &mut cnf).unwrap(),
            LitRes::True
        );
        assert_eq!(
            encoder.encode(&pool, ExprPool::FALSE, &mut cnf).unwrap(),
            LitRes::False
        );
        assert!(cnf.is_empty());
    }

    #[test]
    #[should_panic]
    fn invalid_lit_from_test() {
        _ = Lit::from(0);
    }
}
