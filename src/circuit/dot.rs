//! You can also export circuits to the Graphviz dot format using [`Circuit::to_dot`].
//!
//! ```rust
//! use rectify::Circuit;
//! use rectify::circuit::dot::GraphvizStyle;
//!
//! let circuit = Circuit::from_file("assets/circuits/full_adder.blif").unwrap();
//! println!("{}", circuit.to_dot(&GraphvizStyle::default()));
//! ```
//!
//! Parameterized blocks are highlighted, so rendering the patched circuit of an
//! [`crate::encoder::ParameterizedCircuit`] shows where the repair takes place.
//! You can then render the graphs using the DOT engine.

use std::fmt::Display;

use crate::{Circuit, GateKind};

// Global style.
const DEFAULT_RANKDIR: &str = "BT";

// Node styles, one per role.
const DEFAULT_INPUT_NODE_FORMAT: &str = "[shape=box]";
const DEFAULT_GATE_NODE_FORMAT: &str = "[shape=ellipse]";
const DEFAULT_CONST_NODE_FORMAT: &str = "[shape=point, width=0.2]";
const DEFAULT_PARAM_NODE_FORMAT: &str =
    "[shape=doubleoctagon, style=filled, fillcolor=\"#ffd27f\"]";
/// See https://stackoverflow.com/questions/50822798/how-to-use-graphviz-to-draw-a-node-pointed-by-an-arrow.
const DEFAULT_OUTPUT_NODE_FORMAT: &str = "[shape=none, height=.0, width=.0]";

// Edge styles.
const DEFAULT_EDGE_ALL_FORMAT: &str = "[arrowsize=0.3]";
const DEFAULT_EDGE_PARAM_FORMAT: &str = "[color=\"#c07000\"]";
const DEFAULT_EDGE_OUTPUT_FORMAT: &str = "[arrowhead=none]";

/// String containing the graphviz node style (you must manually include square brackets).
///
/// See [`GraphvizStyle`] for what kind of nodes can be described.
#[derive(Debug, Clone)]
pub struct GraphvizNodeStyle(String);

impl Display for GraphvizNodeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// String containing the graphviz edge style (you must manually include square brackets).
#[derive(Debug, Clone, Default)]
pub struct GraphvizEdgeStyle(String);

impl Display for GraphvizEdgeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters for Graphviz rendering.
///
/// ### Nodes
/// - primary inputs
/// - gates with a fixed function, labelled with their tag
/// - constant gates
/// - parameterized blocks
/// - outputs (by default, invisible node just to get an arrow).
///
/// ### Edges
/// Edge styles are additive. All edges implement the `edge_all` style. To that can be added:
/// - `edge_param` if the edge enters a parameterized block
/// - `edge_output` if the edge is directed to a primary output.
#[derive(Debug, Clone)]
pub struct GraphvizStyle {
    rankdir: String,

    input: GraphvizNodeStyle,
    gate: GraphvizNodeStyle,
    constant: GraphvizNodeStyle,
    param: GraphvizNodeStyle,
    output: GraphvizNodeStyle,

    edge_all: GraphvizEdgeStyle,
    edge_param: GraphvizEdgeStyle,
    edge_output: GraphvizEdgeStyle,
}

impl Default for GraphvizStyle {
    fn default() -> Self {
        GraphvizStyle {
            rankdir: DEFAULT_RANKDIR.to_string(),

            input: GraphvizNodeStyle(DEFAULT_INPUT_NODE_FORMAT.to_string()),
            gate: GraphvizNodeStyle(DEFAULT_GATE_NODE_FORMAT.to_string()),
            constant: GraphvizNodeStyle(DEFAULT_CONST_NODE_FORMAT.to_string()),
            param: GraphvizNodeStyle(DEFAULT_PARAM_NODE_FORMAT.to_string()),
            output: GraphvizNodeStyle(DEFAULT_OUTPUT_NODE_FORMAT.to_string()),

            edge_all: GraphvizEdgeStyle(DEFAULT_EDGE_ALL_FORMAT.to_string()),
            edge_param: GraphvizEdgeStyle(DEFAULT_EDGE_PARAM_FORMAT.to_string()),
            edge_output: GraphvizEdgeStyle(DEFAULT_EDGE_OUTPUT_FORMAT.to_string()),
        }
    }
}

impl GraphvizStyle {
    pub fn with_rankdir<S: Into<String>>(mut self, rankdir: S) -> Self {
        self.rankdir = rankdir.into();
        self
    }

    pub fn with_input_style<S: Into<String>>(mut self, style: S) -> Self {
        self.input = GraphvizNodeStyle(style.into());
        self
    }

    pub fn with_gate_style<S: Into<String>>(mut self, style: S) -> Self {
        self.gate = GraphvizNodeStyle(style.into());
        self
    }

    pub fn with_param_style<S: Into<String>>(mut self, style: S) -> Self {
        self.param = GraphvizNodeStyle(style.into());
        self
    }

    pub fn with_output_style<S: Into<String>>(mut self, style: S) -> Self {
        self.output = GraphvizNodeStyle(style.into());
        self
    }
}

/// Signal names may contain brackets or dots, so every id is quoted.
fn quoted(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\\\""))
}

/// Opening of a subgraph, every node in it gets `style`.
fn subgraph(name: &str, same_rank: bool, style: &GraphvizNodeStyle) -> String {
    let rank = if same_rank { " rank=same\n" } else { "" };
    format!("subgraph {} {{\n{} node {}\n", name, rank, style)
}

fn get_output_id(position: usize) -> String {
    quoted(&format!("out{}", position))
}

impl Circuit {
    /// Returns a DOT representation of the circuit.
    pub fn to_dot(&self, graphviz_style: &GraphvizStyle) -> String {
        let mut decl_edges = String::new();

        let mut decl_inputs = subgraph("inputs", true, &graphviz_style.input);
        let mut decl_gates = subgraph("gates", false, &graphviz_style.gate);
        let mut decl_constants = subgraph("constants", false, &graphviz_style.constant);
        let mut decl_params = subgraph("params", false, &graphviz_style.param);
        let mut decl_outputs = subgraph("outputs", true, &graphviz_style.output);

        for input in self.get_inputs() {
            let id = quoted(input);
            decl_inputs.push_str(&format!("{} [label={}]\n", id, id));
        }

        for gate in self.get_gates() {
            let id = quoted(gate.get_name());
            let (decl, edge_style) = match gate.get_kind() {
                GateKind::Param => (&mut decl_params, graphviz_style.edge_param.clone()),
                GateKind::Const0 | GateKind::Const1 => {
                    (&mut decl_constants, GraphvizEdgeStyle::default())
                }
                _ => (&mut decl_gates, GraphvizEdgeStyle::default()),
            };
            decl.push_str(&format!(
                "{} [label=\"{}\\n{}\"]\n",
                id,
                gate.get_name(),
                gate.get_kind()
            ));
            // Inputs of constant gates are ignored, no edge is drawn for them
            if matches!(gate.get_kind(), GateKind::Const0 | GateKind::Const1) {
                continue;
            }
            for fanin in gate.get_fanins() {
                decl_edges.push_str(&format!("{} -> {} {}\n", quoted(fanin), id, edge_style));
            }
        }

        for (i, output) in self.get_outputs().iter().enumerate() {
            let output_id = get_output_id(i);
            decl_outputs.push_str(&format!("{} [label={}]\n", output_id, quoted(output)));
            decl_edges.push_str(&format!(
                "{} -> {} {}\n",
                quoted(output),
                output_id,
                graphviz_style.edge_output
            ));
        }

        // Concatenating everything together
        format!(
            "
strict digraph {{
    rankdir=\"{}\"
    edge {}
    {}
    }}
    {}
    }}
    {}
    }}
    {}
    }}
    {}
    }}
    {}
}}",
            graphviz_style.rankdir,
            graphviz_style.edge_all,
            decl_inputs,
            decl_constants,
            decl_gates,
            decl_params,
            decl_outputs,
            decl_edges
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::encoder::BlockEncoder;

    #[test]
    fn full_adder_to_dot() {
        let circuit = Circuit::from_file("assets/circuits/full_adder.blif").unwrap();
        let dot = circuit.to_dot(&GraphvizStyle::default());
        assert!(dot.contains("strict digraph"));
        assert!(dot.contains("\"a\" [label=\"a\"]"));
        assert!(dot.contains("\"cout\" -> \"out1\" [arrowhead=none]"));
        assert!(!dot.contains("PARAM"));
    }

    #[test]
    fn parameterized_to_dot() {
        let circuit = Circuit::from_file("assets/circuits/full_adder.blif").unwrap();
        let encoded = BlockEncoder::default().encode(&circuit, &["g"]).unwrap();
        let style = GraphvizStyle::default()
            .with_rankdir("LR")
            .with_param_style("[shape=box, color=red]");
        let dot = encoded.get_circuit().to_dot(&style);
        println!("{}", dot);
        assert!(dot.contains("rankdir=\"LR\""));
        assert!(dot.contains("[shape=box, color=red]"));
        assert!(dot.contains("\"g\" [label=\"g\\nPARAM\"]"));
    }
}
