use std::collections::{HashMap, HashSet};

use crate::{Gate, RectifyError, Result};

fn malformed(message: String) -> RectifyError {
    RectifyError::MalformedCircuit(message)
}

/// Checks that names are unique, that every reference is defined and that
/// every gate has an arity (and parameter count) its tag accepts.
pub(super) fn check_references(
    inputs: &[String],
    outputs: &[String],
    gates: &[Gate],
) -> Result<()> {
    let mut defined: HashSet<&str> = HashSet::new();
    for input in inputs {
        if !defined.insert(input) {
            return Err(malformed(format!("primary input {} is declared twice", input)));
        }
    }
    for gate in gates {
        if !defined.insert(gate.get_name()) {
            return Err(malformed(format!(
                "signal {} is driven more than once",
                gate.get_name()
            )));
        }
    }

    for gate in gates {
        check_gate_integrity(gate)?;
        for fanin in gate.get_fanins() {
            if !defined.contains(fanin.as_str()) {
                return Err(malformed(format!(
                    "gate {} references undefined signal {}",
                    gate.get_name(),
                    fanin
                )));
            }
        }
    }

    let mut seen_outputs: HashSet<&str> = HashSet::new();
    for output in outputs {
        if !defined.contains(output.as_str()) {
            return Err(malformed(format!(
                "primary output {} is not driven by any gate or input",
                output
            )));
        }
        if !seen_outputs.insert(output) {
            return Err(malformed(format!(
                "primary output {} is declared twice",
                output
            )));
        }
    }

    Ok(())
}

/// Check the integrity for an individual gate, that is:
/// - its tag accepts its number of fanins
/// - a parameterized block has one parameter per lookup table row
/// - a fixed gate has no parameter.
fn check_gate_integrity(gate: &Gate) -> Result<()> {
    let kind = gate.get_kind();
    if !kind.accepts_arity(gate.arity()) {
        return Err(malformed(format!(
            "gate {} is a {} gate with {} inputs (expected {:?})",
            gate.get_name(),
            kind,
            gate.arity(),
            kind.arity_range()
        )));
    }
    let expected_params = match kind {
        crate::GateKind::Param => 1 << gate.arity(),
        _ => 0,
    };
    if gate.get_params().len() != expected_params {
        return Err(malformed(format!(
            "gate {} carries {} parameters, expected {}",
            gate.get_name(),
            gate.get_params().len(),
            expected_params
        )));
    }
    Ok(())
}

/// Returns the gates sorted so that every gate comes after its fanins,
/// will error if a cycle is detected.
///
/// References must have been checked beforehand with [`check_references`].
/// The sort is stable with respect to the declaration order as far as dependencies allow.
pub(super) fn topological_sort(gates: Vec<Gate>) -> Result<Vec<Gate>> {
    let index: HashMap<&str, usize> = gates
        .iter()
        .enumerate()
        .map(|(i, gate)| (gate.get_name(), i))
        .collect();

    let mut order: Vec<usize> = Vec::with_capacity(gates.len());
    let mut seen: HashSet<usize> = HashSet::new();
    let mut done: HashSet<usize> = HashSet::new();

    for root in 0..gates.len() {
        if done.contains(&root) {
            continue;
        }
        // Iterative post-order DFS, the flag tells whether children were already pushed.
        let mut stack: Vec<(usize, bool)> = vec![(root, false)];
        while let Some((id, last_time)) = stack.pop() {
            if last_time {
                done.insert(id);
                order.push(id);
                continue;
            }
            if done.contains(&id) {
                continue;
            }
            if !seen.insert(id) {
                return Err(malformed(format!(
                    "combinational loop through gate {}",
                    gates[id].get_name()
                )));
            }
            stack.push((id, true));
            for fanin in gates[id].get_fanins().iter().rev() {
                if let Some(&child) = index.get(fanin.as_str()) {
                    if !done.contains(&child) {
                        stack.push((child, false));
                    }
                }
            }
        }
    }

    let mut slots: Vec<Option<Gate>> = gates.into_iter().map(Some).collect();
    order
        .into_iter()
        .map(|id| {
            slots[id]
                .take()
                .ok_or_else(|| malformed("gate sorted twice".to_string()))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::GateKind;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn topological_sort_test() {
        let gates = vec![
            Gate::new("f", GateKind::Or, names(&["n1", "n2"])),
            Gate::new("n2", GateKind::Inv, names(&["n1"])),
            Gate::new("n1", GateKind::And, names(&["a", "b"])),
        ];
        let sorted = topological_sort(gates).unwrap();
        let order: Vec<&str> = sorted.iter().map(|g| g.get_name()).collect();
        assert_eq!(order, vec!["n1", "n2", "f"]);
    }

    #[test]
    fn topological_sort_cycle_test() {
        let gates = vec![
            Gate::new("x", GateKind::And, names(&["a", "y"])),
            Gate::new("y", GateKind::Buf, names(&["x"])),
        ];
        assert!(matches!(
            topological_sort(gates),
            Err(RectifyError::MalformedCircuit(_))
        ));

        let gates = vec![Gate::new("x", GateKind::Xor, names(&["x", "a"]))];
        assert!(topological_sort(gates).is_err());
    }

    #[test]
    fn check_references_test() {
        let inputs = names(&["a", "b"]);
        let ok = vec![Gate::new("f", GateKind::And, names(&["a", "b"]))];
        assert!(check_references(&inputs, &names(&["f"]), &ok).is_ok());
        // Outputs may be primary inputs
        assert!(check_references(&inputs, &names(&["f", "a"]), &ok).is_ok());

        assert!(check_references(&inputs, &names(&["g"]), &ok).is_err());
        assert!(check_references(&inputs, &names(&["f", "f"]), &ok).is_err());
        assert!(check_references(&names(&["a", "a"]), &names(&[]), &[]).is_err());

        let undefined = vec![Gate::new("f", GateKind::And, names(&["a", "c"]))];
        assert!(check_references(&inputs, &names(&["f"]), &undefined).is_err());

        let shadowing = vec![Gate::new("a", GateKind::Inv, names(&["b"]))];
        assert!(check_references(&inputs, &names(&[]), &shadowing).is_err());

        let bad_arity = vec![Gate::new("f", GateKind::And, names(&["a"]))];
        assert!(check_references(&inputs, &names(&["f"]), &bad_arity).is_err());

        let bad_params = vec![Gate::param(
            "f",
            names(&["a", "b"]),
            vec![crate::ParamId(0), crate::ParamId(1)],
        )];
        assert!(check_references(&inputs, &names(&["f"]), &bad_params).is_err());
    }
}
