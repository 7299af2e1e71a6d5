//! Module defining the [`Circuit`] struct, as well as [`Gate`], [`GateKind`] and [`TruthTable`].
//!
//! A circuit is immutable once built: [`Circuit::build`] validates it (every reference is defined,
//! arities match the gate tags, no combinational loop) and sorts its gates topologically.
//! To rectify a circuit against a reference one, check [`crate::cegis`].

pub mod dot;
pub mod gate;
mod integrity;
mod parser;
pub mod truth_table;

use std::collections::{BTreeMap, HashMap};

pub use gate::{Gate, GateKind, MAX_NAMED_ARITY, ParamId};
pub use truth_table::TruthTable;

use crate::{
    ParameterAssignment, RectifyError, Result,
    expr::{Expr, ExprPool},
};

/// A combinational circuit: named primary inputs, gates and primary outputs.
///
/// Every signal is identified by a name: primary inputs by their own name,
/// gates by the name of the net they drive. A primary output refers to a gate or
/// directly to a primary input.
///
/// ```rust
/// use rectify::{Circuit, Gate, GateKind};
/// let s = |v: &[&str]| v.iter().map(|x| x.to_string()).collect::<Vec<_>>();
/// let circuit = Circuit::build(
///     "half_adder",
///     s(&["a", "b"]),
///     s(&["sum", "carry"]),
///     vec![
///         Gate::new("sum", GateKind::Xor, s(&["a", "b"])),
///         Gate::new("carry", GateKind::And, s(&["a", "b"])),
///     ],
/// )
/// .unwrap();
/// assert_eq!(circuit.get_gate("carry").unwrap().get_kind(), GateKind::And);
/// assert!(circuit.get_gate("cout").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    name: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    /// Sorted topologically.
    gates: Vec<Gate>,
    /// Position of each gate in `gates`.
    index: HashMap<String, usize>,
}

/// Symbolic values of every signal of a circuit.
#[derive(Debug, Clone)]
pub struct SymbolicValues {
    /// Symbolic value of every primary input and gate, by name.
    pub signals: HashMap<String, Expr>,
    /// Symbolic value of every primary output, in declaration order.
    pub outputs: Vec<Expr>,
}

/// Size figures of a circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitStats {
    pub inputs: usize,
    pub outputs: usize,
    pub gates: usize,
    /// Number of gates per tag name.
    pub kinds: BTreeMap<&'static str, usize>,
}

impl Circuit {
    /// Builds and validates a circuit.
    ///
    /// Fails with [`RectifyError::MalformedCircuit`] if a name is defined twice, a gate
    /// references an undefined signal, a gate arity does not match its tag, an output is
    /// undefined, or the gates form a combinational loop.
    pub fn build<S: Into<String>>(
        name: S,
        inputs: Vec<String>,
        outputs: Vec<String>,
        gates: Vec<Gate>,
    ) -> Result<Self> {
        integrity::check_references(&inputs, &outputs, &gates)?;
        let gates = integrity::topological_sort(gates)?;
        let index = gates
            .iter()
            .enumerate()
            .map(|(i, gate)| (gate.get_name().to_string(), i))
            .collect();
        Ok(Circuit {
            name: name.into(),
            inputs,
            outputs,
            gates,
            index,
        })
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Primary inputs, in declaration order.
    pub fn get_inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Primary outputs, in declaration order.
    pub fn get_outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Gates in topological order (fanins first).
    pub fn get_gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Retrieves a gate from its name.
    pub fn get_gate(&self, name: &str) -> Result<&Gate> {
        self.index
            .get(name)
            .map(|&i| &self.gates[i])
            .ok_or_else(|| RectifyError::GateNotFound(name.to_string()))
    }

    pub fn is_input(&self, name: &str) -> bool {
        self.inputs.iter().any(|input| input == name)
    }

    /// Returns a new circuit where the gate with the same name as `gate` is replaced by it.
    ///
    /// The resulting circuit is validated again, so the new gate may not introduce a loop.
    pub fn replace_gate(&self, gate: Gate) -> Result<Circuit> {
        let position = *self
            .index
            .get(gate.get_name())
            .ok_or_else(|| RectifyError::GateNotFound(gate.get_name().to_string()))?;
        let mut gates = self.gates.clone();
        gates[position] = gate;
        Circuit::build(
            self.name.clone(),
            self.inputs.clone(),
            self.outputs.clone(),
            gates,
        )
    }

    /// Symbolic evaluation of the whole circuit.
    ///
    /// `inputs` maps every primary input name to its symbolic value. The circuit
    /// itself is left untouched, new nodes are only created in `pool`.
    /// Parameterized blocks are expanded inline as lookup tables over their parameters.
    pub fn evaluate(
        &self,
        pool: &mut ExprPool,
        inputs: &HashMap<String, Expr>,
    ) -> Result<SymbolicValues> {
        let mut signals: HashMap<String, Expr> =
            HashMap::with_capacity(self.inputs.len() + self.gates.len());
        for name in &self.inputs {
            let expr = *inputs
                .get(name)
                .ok_or_else(|| RectifyError::UnassignedInput(name.clone()))?;
            signals.insert(name.clone(), expr);
        }
        for gate in &self.gates {
            // References were checked at build time and gates are sorted
            let fanins: Vec<Expr> = gate
                .get_fanins()
                .iter()
                .map(|fanin| signals[fanin])
                .collect();
            let expr = gate.apply(pool, &fanins);
            signals.insert(gate.get_name().to_string(), expr);
        }
        let outputs = self.outputs.iter().map(|name| signals[name]).collect();
        Ok(SymbolicValues { signals, outputs })
    }

    /// Concrete evaluation of every signal of the circuit.
    ///
    /// `params` gives the value of the parameters of parameterized blocks, if any.
    pub fn simulate(
        &self,
        inputs: &HashMap<String, bool>,
        params: &ParameterAssignment,
    ) -> Result<HashMap<String, bool>> {
        let mut values: HashMap<String, bool> =
            HashMap::with_capacity(self.inputs.len() + self.gates.len());
        for name in &self.inputs {
            let value = *inputs
                .get(name)
                .ok_or_else(|| RectifyError::UnassignedInput(name.clone()))?;
            values.insert(name.clone(), value);
        }
        for gate in &self.gates {
            let fanins: Vec<bool> = gate
                .get_fanins()
                .iter()
                .map(|fanin| values[fanin])
                .collect();
            let value = gate.evaluate(&fanins, params)?;
            values.insert(gate.get_name().to_string(), value);
        }
        Ok(values)
    }

    /// Concrete values of the primary outputs, in declaration order.
    pub fn simulate_outputs(
        &self,
        inputs: &HashMap<String, bool>,
        params: &ParameterAssignment,
    ) -> Result<Vec<bool>> {
        let values = self.simulate(inputs, params)?;
        Ok(self.outputs.iter().map(|name| values[name]).collect())
    }

    pub fn stats(&self) -> CircuitStats {
        let mut kinds = BTreeMap::new();
        for gate in &self.gates {
            *kinds.entry(gate.get_kind().name()).or_insert(0) += 1;
        }
        CircuitStats {
            inputs: self.inputs.len(),
            outputs: self.outputs.len(),
            gates: self.gates.len(),
            kinds,
        }
    }
}

impl std::fmt::Display for CircuitStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  Primary inputs:  {}", self.inputs)?;
        writeln!(f, "  Primary outputs: {}", self.outputs)?;
        writeln!(f, "  Gates: {}", self.gates)?;
        writeln!(f, "  Gate types:")?;
        for (kind, count) in &self.kinds {
            writeln!(f, "    {}: {}", kind, count)?;
        }
        Ok(())
    }
}
