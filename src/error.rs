use thiserror::Error;

use crate::{TruthTable, circuit::ParamId, miter::MiterError, oracle::OracleError};

/// The result of a rectification operation.
pub type Result<T> = std::result::Result<T, RectifyError>;

/// Error returned when building circuits or running a rectification failed.
///
/// Note that an infeasible rectification is not an error, see [`RectifyStatus`].
///
/// [`RectifyStatus`]: crate::cegis::RectifyStatus
#[derive(Debug, Error)]
pub enum RectifyError {
    /// The circuit is cyclic, references undefined signals, or a gate has an arity
    /// its tag does not accept.
    #[error("malformed circuit: {0}")]
    MalformedCircuit(String),

    /// No gate with this name exists in the circuit.
    #[error("gate {0} does not exist")]
    GateNotFound(String),

    /// Rectification was requested without any suspect gate.
    #[error("the suspect set is empty")]
    EmptySuspectSet,

    /// A suspect gate has more inputs than the configured maximum.
    #[error("gate {gate} has {arity} inputs but at most {max} are supported for parameterization")]
    UnsupportedArity {
        gate: String,
        arity: usize,
        max: usize,
    },

    /// Concrete simulation was given no value for this primary input.
    #[error("no value given for primary input {0}")]
    UnassignedInput(String),

    /// Concrete simulation was given no value for this parameter.
    #[error("no value given for parameter {0}")]
    UnassignedParameter(ParamId),

    /// A fix could not be turned back into a gate tag.
    #[error("gate {gate} was fixed to {table}, which matches no gate tag")]
    UnnamedFunction { gate: String, table: TruthTable },

    /// The CEGIS loop ran for more iterations than allowed.
    #[error("iteration limit reached after {0} iterations")]
    IterationLimit(usize),

    /// Just forwarding a [`MiterError`].
    #[error("{0}")]
    MiterError(#[from] MiterError),

    /// Just forwarding a [`ParserError`].
    #[error("{0}")]
    ParserError(#[from] ParserError),

    /// Just forwarding an [`OracleError`].
    #[error("{0}")]
    OracleError(#[from] OracleError),
}

/// Error returned when parsing a circuit description failed.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Only combinational single-output covers are supported.
    #[error("{}unsupported feature: {message}", line_prefix(.line))]
    UnsupportedFeature {
        line: Option<usize>,
        message: String,
    },

    /// The cover is well-formed but matches no gate tag.
    #[error("{}unsupported function: {message}", line_prefix(.line))]
    UnsupportedFunction {
        line: Option<usize>,
        message: String,
    },

    /// Invalid token, something else was expected.
    #[error("{}invalid token: {message}", line_prefix(.line))]
    InvalidToken {
        line: Option<usize>,
        message: String,
    },

    /// An IO error occured (file doesn't exist, or doesn't have the right extension, ...).
    #[error("io error: {0}")]
    IoError(String),
}

fn line_prefix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("line {}: ", line),
        None => String::new(),
    }
}
