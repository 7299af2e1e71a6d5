//! Gates of a combinational circuit, see [`Gate`] and [`GateKind`].

use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use crate::{
    ParameterAssignment, RectifyError, Result,
    circuit::TruthTable,
    encoder,
    expr::{Expr, ExprPool, Var},
};

/// Identifier of a fresh parameter variable introduced by a parameterized block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub usize);

impl Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Largest arity of a named gate.
pub const MAX_NAMED_ARITY: usize = 2;

/// The closed set of gate tags.
///
/// Every tag but [`GateKind::Param`] has a fixed semantic function.
/// `Param` gates are lookup tables over parameter variables, see [`crate::encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
    Buf,
    Inv,
    /// Constant low, its inputs (if any) are ignored.
    Const0,
    /// Constant high, its inputs (if any) are ignored.
    Const1,
    Param,
}

impl GateKind {
    /// All tags with a fixed semantic function.
    pub const NAMED: [GateKind; 10] = [
        GateKind::And,
        GateKind::Or,
        GateKind::Nand,
        GateKind::Nor,
        GateKind::Xor,
        GateKind::Xnor,
        GateKind::Buf,
        GateKind::Inv,
        GateKind::Const0,
        GateKind::Const1,
    ];

    /// Number of inputs a gate with this tag may have.
    pub fn arity_range(&self) -> RangeInclusive<usize> {
        match self {
            GateKind::And
            | GateKind::Or
            | GateKind::Nand
            | GateKind::Nor
            | GateKind::Xor
            | GateKind::Xnor => 2..=2,
            GateKind::Buf | GateKind::Inv => 1..=1,
            GateKind::Const0 | GateKind::Const1 => 0..=MAX_NAMED_ARITY,
            GateKind::Param => 0..=TruthTable::MAX_ARITY,
        }
    }

    pub fn accepts_arity(&self, arity: usize) -> bool {
        self.arity_range().contains(&arity)
    }

    /// Concrete semantic function. Returns [`None`] for [`GateKind::Param`].
    pub fn evaluate(&self, inputs: &[bool]) -> Option<bool> {
        let value = match self {
            GateKind::And => inputs.iter().all(|&x| x),
            GateKind::Or => inputs.iter().any(|&x| x),
            GateKind::Nand => !inputs.iter().all(|&x| x),
            GateKind::Nor => !inputs.iter().any(|&x| x),
            GateKind::Xor => inputs.iter().fold(false, |acc, &x| acc ^ x),
            GateKind::Xnor => !inputs.iter().fold(false, |acc, &x| acc ^ x),
            GateKind::Buf => inputs[0],
            GateKind::Inv => !inputs[0],
            GateKind::Const0 => false,
            GateKind::Const1 => true,
            GateKind::Param => return None,
        };
        Some(value)
    }

    /// Symbolic semantic function. Returns [`None`] for [`GateKind::Param`].
    pub fn apply(&self, pool: &mut ExprPool, inputs: &[Expr]) -> Option<Expr> {
        let expr = match self {
            GateKind::And => pool.and_all(inputs.iter().copied()),
            GateKind::Or => pool.or_all(inputs.iter().copied()),
            GateKind::Nand => !pool.and_all(inputs.iter().copied()),
            GateKind::Nor => !pool.or_all(inputs.iter().copied()),
            GateKind::Xor => pool.xor_all(inputs.iter().copied()),
            GateKind::Xnor => !pool.xor_all(inputs.iter().copied()),
            GateKind::Buf => inputs[0],
            GateKind::Inv => !inputs[0],
            GateKind::Const0 => ExprPool::FALSE,
            GateKind::Const1 => ExprPool::TRUE,
            GateKind::Param => return None,
        };
        Some(expr)
    }

    /// Truth table of this tag at the given arity, [`None`] for `Param` or an arity
    /// the tag does not accept.
    pub fn truth_table(&self, arity: usize) -> Option<TruthTable> {
        if *self == GateKind::Param || !self.accepts_arity(arity) {
            return None;
        }
        let mut inputs = vec![false; arity];
        let mut rows = Vec::with_capacity(1 << arity);
        for row in 0..(1usize << arity) {
            for (i, input) in inputs.iter_mut().enumerate() {
                *input = (row >> (arity - 1 - i)) & 1 == 1;
            }
            rows.push(self.evaluate(&inputs)?);
        }
        TruthTable::from_rows(&rows)
    }

    /// Finds the named tag implementing exactly this table at its arity.
    ///
    /// ```rust
    /// use rectify::{GateKind, TruthTable};
    /// let t: TruthTable = "0110".parse().unwrap();
    /// assert_eq!(GateKind::from_table(&t), Some(GateKind::Xor));
    /// let t: TruthTable = "0010".parse().unwrap(); // a AND NOT b
    /// assert_eq!(GateKind::from_table(&t), None);
    /// ```
    pub fn from_table(table: &TruthTable) -> Option<GateKind> {
        GateKind::NAMED
            .into_iter()
            .find(|kind| kind.truth_table(table.arity()).as_ref() == Some(table))
    }

    pub fn name(&self) -> &'static str {
        match self {
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Nand => "NAND",
            GateKind::Nor => "NOR",
            GateKind::Xor => "XOR",
            GateKind::Xnor => "XNOR",
            GateKind::Buf => "BUF",
            GateKind::Inv => "INV",
            GateKind::Const0 => "CONST0",
            GateKind::Const1 => "CONST1",
            GateKind::Param => "PARAM",
        }
    }
}

impl Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for GateKind {
    type Err = RectifyError;

    fn from_str(s: &str) -> Result<Self> {
        GateKind::NAMED
            .into_iter()
            .chain([GateKind::Param])
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RectifyError::MalformedCircuit(format!("unknown gate tag {}", s)))
    }
}

/// A gate, identified by the name of the net it drives.
///
/// Gates only reference their fanins by name, the owning [`Circuit`] checks that
/// these references are defined and acyclic.
///
/// [`Circuit`]: crate::Circuit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    name: String,
    kind: GateKind,
    fanins: Vec<String>,
    /// Only used by [`GateKind::Param`], one entry per lookup table row.
    params: Vec<ParamId>,
}

impl Gate {
    /// Returns a new gate with a fixed function.
    ///
    /// Use [`Gate::param`] for parameterized blocks.
    pub fn new<S: Into<String>>(name: S, kind: GateKind, fanins: Vec<String>) -> Self {
        Gate {
            name: name.into(),
            kind,
            fanins,
            params: Vec::new(),
        }
    }

    /// Returns a new parameterized block, `params` holding one parameter per row
    /// of the lookup table (so `2^fanins.len()` of them).
    pub fn param<S: Into<String>>(name: S, fanins: Vec<String>, params: Vec<ParamId>) -> Self {
        Gate {
            name: name.into(),
            kind: GateKind::Param,
            fanins,
            params,
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_kind(&self) -> GateKind {
        self.kind
    }

    pub fn get_fanins(&self) -> &[String] {
        &self.fanins
    }

    pub fn get_params(&self) -> &[ParamId] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.fanins.len()
    }

    /// Returns the same gate with another fixed function (the wiring is kept).
    pub fn with_kind(&self, kind: GateKind) -> Gate {
        Gate::new(self.name.clone(), kind, self.fanins.clone())
    }

    /// Symbolic output of the gate given the symbolic values of its fanins.
    pub fn apply(&self, pool: &mut ExprPool, inputs: &[Expr]) -> Expr {
        match self.kind.apply(pool, inputs) {
            Some(expr) => expr,
            None => {
                let params: Vec<Expr> = self
                    .params
                    .iter()
                    .map(|&id| pool.var(Var::Param(id)))
                    .collect();
                encoder::lookup_table(pool, inputs, &params)
            }
        }
    }

    /// Concrete output of the gate given the values of its fanins.
    pub fn evaluate(&self, inputs: &[bool], params: &ParameterAssignment) -> Result<bool> {
        match self.kind.evaluate(inputs) {
            Some(value) => Ok(value),
            None => {
                let id = self.params[TruthTable::pattern_index(inputs)];
                params
                    .get(id)
                    .ok_or(RectifyError::UnassignedParameter(id))
            }
        }
    }
}
