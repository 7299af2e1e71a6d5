//! Replaces suspect gates by parameterized blocks ("universal gates").
//!
//! A block of arity `k` is a lookup table over `2^k` fresh parameters: its output is
//! `param[pattern_index]`, where `pattern_index` is the integer formed by the `k` input values
//! (first input being the most significant bit). Any `k`-input function can be obtained
//! by choosing the parameter bits. For `k = 2`, the 16 two-input functions are
//! reachable, for `k = 1` the buffer, the inverter and both constants.

use std::collections::{BTreeMap, HashSet};

use crate::{
    Circuit, Gate, GateKind, ParamId, RectifyError, Result, TruthTable,
    circuit::MAX_NAMED_ARITY,
    expr::{Expr, ExprPool},
};

/// Values of parameter variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterAssignment(BTreeMap<ParamId, bool>);

impl ParameterAssignment {
    pub fn new() -> Self {
        ParameterAssignment(BTreeMap::new())
    }

    pub fn get(&self, id: ParamId) -> Option<bool> {
        self.0.get(&id).copied()
    }

    pub fn insert(&mut self, id: ParamId, value: bool) -> Option<bool> {
        self.0.insert(id, value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamId, bool)> + '_ {
        self.0.iter().map(|(&id, &value)| (id, value))
    }

    /// Reads the lookup table formed by the given parameters, missing ones read as false.
    pub fn table(&self, params: &[ParamId]) -> TruthTable {
        let arity = params.len().trailing_zeros() as usize;
        TruthTable::from_fn(arity, |row| self.get(params[row]).unwrap_or(false))
    }
}

impl FromIterator<(ParamId, bool)> for ParameterAssignment {
    fn from_iter<T: IntoIterator<Item = (ParamId, bool)>>(iter: T) -> Self {
        ParameterAssignment(iter.into_iter().collect())
    }
}

/// Builds the lookup table expression `params[pattern_index(inputs)]`.
///
/// `params` must hold `2^inputs.len()` entries. The table is expanded as a tree of
/// multiplexers, the first input selecting between the upper and the lower half.
pub fn lookup_table(pool: &mut ExprPool, inputs: &[Expr], params: &[Expr]) -> Expr {
    debug_assert_eq!(params.len(), 1 << inputs.len());
    match inputs.split_first() {
        None => params[0],
        Some((&msb, rest)) => {
            let (low, high) = params.split_at(params.len() / 2);
            let when_high = lookup_table(pool, rest, high);
            let when_low = lookup_table(pool, rest, low);
            pool.ite(msb, when_high, when_low)
        }
    }
}

/// A suspect gate turned into a parameterized block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBlock {
    gate: String,
    original: GateKind,
    params: Vec<ParamId>,
}

impl ParamBlock {
    pub fn get_gate(&self) -> &str {
        &self.gate
    }

    /// The tag of the suspect gate before it was replaced.
    pub fn get_original(&self) -> GateKind {
        self.original
    }

    pub fn get_params(&self) -> &[ParamId] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len().trailing_zeros() as usize
    }

    /// Lookup table implementing the original gate.
    pub fn original_table(&self) -> Option<TruthTable> {
        self.original.truth_table(self.arity())
    }
}

/// An implementation circuit whose suspect gates were replaced by parameterized blocks.
#[derive(Debug, Clone)]
pub struct ParameterizedCircuit {
    circuit: Circuit,
    blocks: Vec<ParamBlock>,
}

impl ParameterizedCircuit {
    /// The patched circuit, containing one [`GateKind::Param`] gate per block.
    pub fn get_circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Blocks, in suspect order.
    pub fn get_blocks(&self) -> &[ParamBlock] {
        &self.blocks
    }

    /// Total number of parameters, that is the sum of `2^arity` over all blocks.
    pub fn num_params(&self) -> usize {
        self.blocks.iter().map(|block| block.params.len()).sum()
    }

    pub fn param_ids(&self) -> impl Iterator<Item = ParamId> + '_ {
        self.blocks
            .iter()
            .flat_map(|block| block.params.iter().copied())
    }

    /// The assignment reproducing the original gate of every block.
    pub fn incumbent(&self) -> ParameterAssignment {
        self.blocks
            .iter()
            .filter_map(|block| Some((block, block.original_table()?)))
            .flat_map(|(block, table)| {
                block
                    .params
                    .iter()
                    .enumerate()
                    .map(move |(row, &id)| (id, table.get(row)))
            })
            .collect()
    }
}

/// Turns suspect gates into parameterized blocks.
#[derive(Debug, Clone, Copy)]
pub struct BlockEncoder {
    max_arity: usize,
}

impl Default for BlockEncoder {
    fn default() -> Self {
        BlockEncoder {
            max_arity: MAX_NAMED_ARITY,
        }
    }
}

impl BlockEncoder {
    /// An encoder accepting suspect gates with at most `max_arity` inputs.
    pub fn new(max_arity: usize) -> Self {
        BlockEncoder { max_arity }
    }

    pub fn get_max_arity(&self) -> usize {
        self.max_arity
    }

    /// Replaces every suspect gate of `implementation` by a parameterized block of the
    /// same arity, keeping its input wiring.
    ///
    /// Parameters are numbered consecutively in suspect order. Repeated suspect names
    /// are only encoded once.
    ///
    /// This will fail if:
    /// - `suspects` is empty ([`RectifyError::EmptySuspectSet`])
    /// - a suspect does not exist ([`RectifyError::GateNotFound`])
    /// - a suspect has more inputs than allowed ([`RectifyError::UnsupportedArity`])
    /// - the implementation already contains parameterized blocks.
    pub fn encode<S: AsRef<str>>(
        &self,
        implementation: &Circuit,
        suspects: &[S],
    ) -> Result<ParameterizedCircuit> {
        if suspects.is_empty() {
            return Err(RectifyError::EmptySuspectSet);
        }
        if let Some(gate) = implementation
            .get_gates()
            .iter()
            .find(|gate| gate.get_kind() == GateKind::Param)
        {
            return Err(RectifyError::MalformedCircuit(format!(
                "implementation is already parameterized at gate {}",
                gate.get_name()
            )));
        }

        let mut seen = HashSet::new();
        let mut blocks = Vec::new();
        let mut next_param = 0;
        let mut circuit = implementation.clone();
        for suspect in suspects {
            let name = suspect.as_ref();
            if !seen.insert(name) {
                continue;
            }
            let gate = implementation.get_gate(name)?;
            if gate.arity() > self.max_arity {
                return Err(RectifyError::UnsupportedArity {
                    gate: name.to_string(),
                    arity: gate.arity(),
                    max: self.max_arity,
                });
            }
            let params: Vec<ParamId> = (next_param..next_param + (1 << gate.arity()))
                .map(ParamId)
                .collect();
            next_param += params.len();
            circuit = circuit.replace_gate(Gate::param(
                name,
                gate.get_fanins().to_vec(),
                params.clone(),
            ))?;
            blocks.push(ParamBlock {
                gate: name.to_string(),
                original: gate.get_kind(),
                params,
            });
        }
        log::debug!(
            "encode; {} blocks, {} parameters",
            blocks.len(),
            next_param
        );

        Ok(ParameterizedCircuit { circuit, blocks })
    }
}
