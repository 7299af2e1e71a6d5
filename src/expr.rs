//! Symbolic Boolean expressions, stored as a structurally hashed AND-inverter graph.
//!
//! All expressions live in an [`ExprPool`] and are referred to through an [`Expr`],
//! an edge to a node of the pool that can be complemented (indicates the presence of a NOT gate).
//! Node 0 is the constant `False` node by convention, so `!ExprPool::FALSE` is true.
//!
//! ```rust
//! use rectify::expr::{ExprPool, Var};
//! let mut pool = ExprPool::new();
//! let a = pool.var(Var::Input(0));
//! let b = pool.var(Var::Input(1));
//! let x = pool.xor(a, b);
//! assert!(pool.evaluate(x, |v| v == Var::Input(0)));
//! // Simple identities are folded away when building nodes
//! assert_eq!(pool.and(a, !a), ExprPool::FALSE);
//! assert_eq!(pool.or(a, a), a);
//! ```

use std::{
    collections::{BTreeSet, HashMap},
    ops::Not,
};

use crate::circuit::ParamId;

/// A variable of a symbolic expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Var {
    /// The primary input at this position (in the specification input order).
    Input(usize),
    /// A parameter of a parameterized block.
    Param(ParamId),
}

/// Index of a node in an [`ExprPool`].
pub type ExprId = usize;

/// An edge to a node of an [`ExprPool`], possibly complemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Expr {
    node: ExprId,
    complement: bool,
}

impl Not for Expr {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        self.complement = !self.complement;
        self
    }
}

impl Expr {
    pub fn get_node_id(&self) -> ExprId {
        self.node
    }

    pub fn get_complement(&self) -> bool {
        self.complement
    }

    pub fn is_const_false(&self) -> bool {
        self.node == 0 && !self.complement
    }

    pub fn is_const_true(&self) -> bool {
        self.node == 0 && self.complement
    }

    /// Returns the constant value of the expression, if it is one.
    pub fn as_constant(&self) -> Option<bool> {
        (self.node == 0).then_some(self.complement)
    }
}

/// A node of the expression graph.
///
/// And nodes always point at nodes with a strictly smaller id, so ids are a
/// topological order of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprNode {
    /// The constant low/false signal.
    False,
    /// A free variable.
    Var(Var),
    /// An AND gate with two fanins.
    And(Expr, Expr),
}

/// Arena owning every expression node.
///
/// Nodes are never removed, an [`Expr`] stays valid for the lifetime of its pool.
#[derive(Debug, Clone)]
pub struct ExprPool {
    nodes: Vec<ExprNode>,
    strash: HashMap<(Expr, Expr), ExprId>,
    vars: HashMap<Var, ExprId>,
}

impl Default for ExprPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprPool {
    pub const FALSE: Expr = Expr {
        node: 0,
        complement: false,
    };

    pub const TRUE: Expr = Expr {
        node: 0,
        complement: true,
    };

    /// Create a brand new pool (constant node [`ExprNode::False`] included).
    pub fn new() -> Self {
        ExprPool {
            nodes: vec![ExprNode::False],
            strash: HashMap::new(),
            vars: HashMap::new(),
        }
    }

    pub fn constant(value: bool) -> Expr {
        if value { Self::TRUE } else { Self::FALSE }
    }

    /// Number of nodes, constant node included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get_node(&self, id: ExprId) -> Option<&ExprNode> {
        self.nodes.get(id)
    }

    fn push(&mut self, node: ExprNode) -> ExprId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Returns the expression of a variable, creating its node if needed.
    pub fn var(&mut self, var: Var) -> Expr {
        let node = match self.vars.get(&var) {
            Some(&id) => id,
            None => {
                let id = self.push(ExprNode::Var(var));
                self.vars.insert(var, id);
                id
            }
        };
        Expr {
            node,
            complement: false,
        }
    }

    pub fn and(&mut self, a: Expr, b: Expr) -> Expr {
        if a.is_const_false() || b.is_const_false() || a == !b {
            return Self::FALSE;
        }
        if a.is_const_true() || a == b {
            return b;
        }
        if b.is_const_true() {
            return a;
        }
        let key = if a <= b { (a, b) } else { (b, a) };
        let node = match self.strash.get(&key) {
            Some(&id) => id,
            None => {
                let id = self.push(ExprNode::And(key.0, key.1));
                self.strash.insert(key, id);
                id
            }
        };
        Expr {
            node,
            complement: false,
        }
    }

    pub fn or(&mut self, a: Expr, b: Expr) -> Expr {
        !self.and(!a, !b)
    }

    pub fn xor(&mut self, a: Expr, b: Expr) -> Expr {
        match (a.as_constant(), b.as_constant()) {
            (Some(false), _) => return b,
            (Some(true), _) => return !b,
            (_, Some(false)) => return a,
            (_, Some(true)) => return !a,
            _ => (),
        }
        let l = self.and(a, !b);
        let r = self.and(!a, b);
        self.or(l, r)
    }

    pub fn xnor(&mut self, a: Expr, b: Expr) -> Expr {
        !self.xor(a, b)
    }

    /// If-then-else: `cond ? then : other`.
    pub fn ite(&mut self, cond: Expr, then: Expr, other: Expr) -> Expr {
        match cond.as_constant() {
            Some(true) => return then,
            Some(false) => return other,
            None => (),
        }
        if then == other {
            return then;
        }
        let l = self.and(cond, then);
        let r = self.and(!cond, other);
        self.or(l, r)
    }

    /// Conjunction of all operands, true when there are none.
    pub fn and_all(&mut self, operands: impl IntoIterator<Item = Expr>) -> Expr {
        operands
            .into_iter()
            .fold(Self::TRUE, |acc, e| self.and(acc, e))
    }

    /// Disjunction of all operands, false when there are none.
    pub fn or_all(&mut self, operands: impl IntoIterator<Item = Expr>) -> Expr {
        operands
            .into_iter()
            .fold(Self::FALSE, |acc, e| self.or(acc, e))
    }

    /// Parity of all operands, false when there are none.
    pub fn xor_all(&mut self, operands: impl IntoIterator<Item = Expr>) -> Expr {
        operands
            .into_iter()
            .fold(Self::FALSE, |acc, e| self.xor(acc, e))
    }

    /// Ids of every node `expr` depends on (itself included), in increasing order,
    /// which is a topological order.
    pub fn cone(&self, expr: Expr) -> Vec<ExprId> {
        let mut seen = vec![false; expr.node + 1];
        let mut stack = vec![expr.node];
        seen[expr.node] = true;
        while let Some(id) = stack.pop() {
            if let ExprNode::And(a, b) = self.nodes[id] {
                for child in [a.node, b.node] {
                    if !seen[child] {
                        seen[child] = true;
                        stack.push(child);
                    }
                }
            }
        }
        seen.iter()
            .enumerate()
            .filter_map(|(id, &s)| s.then_some(id))
            .collect()
    }

    /// Variables the expression structurally depends on.
    pub fn support(&self, expr: Expr) -> BTreeSet<Var> {
        self.cone(expr)
            .into_iter()
            .filter_map(|id| match self.nodes[id] {
                ExprNode::Var(var) => Some(var),
                _ => None,
            })
            .collect()
    }

    /// Evaluates the expression under the given variable assignment.
    pub fn evaluate(&self, expr: Expr, assignment: impl Fn(Var) -> bool) -> bool {
        let mut values: HashMap<ExprId, bool> = HashMap::new();
        for id in self.cone(expr) {
            let value = match self.nodes[id] {
                ExprNode::False => false,
                ExprNode::Var(var) => assignment(var),
                ExprNode::And(a, b) => {
                    (values[&a.node] ^ a.complement) && (values[&b.node] ^ b.complement)
                }
            };
            values.insert(id, value);
        }
        values[&expr.node] ^ expr.complement
    }

    /// Rebuilds the expression with some variables replaced.
    ///
    /// Variables missing from `substitution` are kept as they are. Constants are
    /// propagated, so substituting every variable by a constant yields a constant.
    pub fn substitute(&mut self, expr: Expr, substitution: &HashMap<Var, Expr>) -> Expr {
        let mut rebuilt: HashMap<ExprId, Expr> = HashMap::new();
        for id in self.cone(expr) {
            let new = match self.nodes[id] {
                ExprNode::False => Self::FALSE,
                ExprNode::Var(var) => match substitution.get(&var) {
                    Some(&e) => e,
                    None => Expr {
                        node: id,
                        complement: false,
                    },
                },
                ExprNode::And(a, b) => {
                    let new_a = rebuilt[&a.node];
                    let new_b = rebuilt[&b.node];
                    self.and(
                        if a.complement { !new_a } else { new_a },
                        if b.complement { !new_b } else { new_b },
                    )
                }
            };
            rebuilt.insert(id, new);
        }
        let e = rebuilt[&expr.node];
        if expr.complement { !e } else { e }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn all_assignments(n: usize) -> impl Iterator<Item = Vec<bool>> {
        (0..(1usize << n)).map(move |row| (0..n).map(|i| (row >> i) & 1 == 1).collect())
    }

    #[test]
    fn constant_folding_test() {
        let mut pool = ExprPool::new();
        let a = pool.var(Var::Input(0));
        assert_eq!(pool.and(a, ExprPool::TRUE), a);
        assert_eq!(pool.and(ExprPool::FALSE, a), ExprPool::FALSE);
        assert_eq!(pool.or(a, ExprPool::TRUE), ExprPool::TRUE);
        assert_eq!(pool.or(a, !a), ExprPool::TRUE);
        assert_eq!(pool.xor(a, a), ExprPool::FALSE);
        assert_eq!(pool.xor(a, ExprPool::TRUE), !a);
        assert_eq!(pool.ite(ExprPool::TRUE, a, !a), a);
        assert_eq!(pool.and_all([]), ExprPool::TRUE);
        assert_eq!(pool.or_all([]), ExprPool::FALSE);
        // Only the constant and the variable exist
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn strash_test() {
        let mut pool = ExprPool::new();
        let a = pool.var(Var::Input(0));
        let b = pool.var(Var::Input(1));
        let ab = pool.and(a, b);
        let ba = pool.and(b, a);
        assert_eq!(ab, ba);
        assert_eq!(pool.var(Var::Input(0)), a);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn evaluate_test() {
        let mut pool = ExprPool::new();
        let a = pool.var(Var::Input(0));
        let b = pool.var(Var::Input(1));
        let c = pool.var(Var::Input(2));
        let x = pool.xor(a, b);
        let m = pool.ite(c, x, !a);
        for values in all_assignments(3) {
            let get = |v: Var| match v {
                Var::Input(i) => values[i],
                Var::Param(_) => unreachable!(),
            };
            assert_eq!(pool.evaluate(x, get), values[0] ^ values[1]);
            let expected = if values[2] {
                values[0] ^ values[1]
            } else {
                !values[0]
            };
            assert_eq!(pool.evaluate(m, get), expected);
        }
    }

    #[test]
    fn substitute_test() {
        let mut pool = ExprPool::new();
        let a = pool.var(Var::Input(0));
        let p = pool.var(Var::Param(ParamId(0)));
        let q = pool.var(Var::Param(ParamId(1)));
        let m = pool.ite(a, p, !q);

        let s = HashMap::from([(Var::Input(0), ExprPool::TRUE)]);
        assert_eq!(pool.substitute(m, &s), p);
        let s = HashMap::from([(Var::Input(0), ExprPool::FALSE)]);
        assert_eq!(pool.substitute(m, &s), !q);
        assert_eq!(pool.substitute(!m, &s), q);

        let s = HashMap::from([
            (Var::Param(ParamId(0)), ExprPool::TRUE),
            (Var::Param(ParamId(1)), ExprPool::TRUE),
        ]);
        assert_eq!(pool.substitute(m, &s), a);
    }

    #[test]
    fn support_test() {
        let mut pool = ExprPool::new();
        let a = pool.var(Var::Input(0));
        let b = pool.var(Var::Input(1));
        let p = pool.var(Var::Param(ParamId(3)));
        let e = pool.ite(p, a, b);
        assert_eq!(
            pool.support(e),
            BTreeSet::from([Var::Input(0), Var::Input(1), Var::Param(ParamId(3))])
        );
        assert!(pool.support(ExprPool::TRUE).is_empty());
    }
}
