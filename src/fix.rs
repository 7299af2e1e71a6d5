//! Turning synthesized parameters back into gates.

use std::fmt::Display;

use crate::{
    Circuit, GateKind, ParameterAssignment, RectifyError, Result, TruthTable,
    encoder::ParameterizedCircuit,
};

/// The function chosen for a suspect gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedFunction {
    /// The lookup table matches this named gate.
    Gate(GateKind),
    /// The lookup table matches no named gate at its arity.
    Table(TruthTable),
}

impl Display for FixedFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixedFunction::Gate(kind) => write!(f, "{}", kind),
            FixedFunction::Table(table) => write!(f, "TABLE({})", table),
        }
    }
}

/// The repair found for one suspect gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixRecord {
    pub gate: String,
    /// Tag of the gate in the implementation.
    pub original: GateKind,
    /// Synthesized lookup table.
    pub table: TruthTable,
    pub function: FixedFunction,
}

impl FixRecord {
    /// Whether the synthesized function is the original one.
    pub fn is_unchanged(&self) -> bool {
        self.function == FixedFunction::Gate(self.original)
    }
}

impl Display for FixRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unchanged() {
            write!(f, "{}: {} (unchanged)", self.gate, self.original)
        } else {
            write!(f, "{}: {} -> {}", self.gate, self.original, self.function)
        }
    }
}

/// Decodes the lookup table of every block, in suspect order.
pub fn extract_fixes(
    parameterized: &ParameterizedCircuit,
    assignment: &ParameterAssignment,
) -> Vec<FixRecord> {
    parameterized
        .get_blocks()
        .iter()
        .map(|block| {
            let table = assignment.table(block.get_params());
            let function = match GateKind::from_table(&table) {
                Some(kind) => FixedFunction::Gate(kind),
                None => FixedFunction::Table(table),
            };
            FixRecord {
                gate: block.get_gate().to_string(),
                original: block.get_original(),
                table,
                function,
            }
        })
        .collect()
}

/// Returns the implementation with every fixed gate replaced by its new tag, wiring kept.
///
/// Fails with [`RectifyError::UnnamedFunction`] for a fix that matches no tag.
pub fn apply_fixes(implementation: &Circuit, fixes: &[FixRecord]) -> Result<Circuit> {
    let mut circuit = implementation.clone();
    for fix in fixes {
        let kind = match fix.function {
            FixedFunction::Gate(kind) => kind,
            FixedFunction::Table(table) => {
                return Err(RectifyError::UnnamedFunction {
                    gate: fix.gate.clone(),
                    table,
                });
            }
        };
        let gate = circuit.get_gate(&fix.gate)?.with_kind(kind);
        circuit = circuit.replace_gate(gate)?;
    }
    Ok(circuit)
}
