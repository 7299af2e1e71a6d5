//! Rectification of combinational circuits.
//!
//! Given a reference circuit (the specification) and a faulty circuit (the implementation)
//! sharing their primary inputs and outputs, `rectify` finds a new function for each
//! suspect gate of the implementation so that it becomes equivalent to the specification.
//!
//! - circuits are described by [`Circuit`], built directly or parsed from BLIF
//! - suspect gates are turned into lookup tables over parameters by [`encoder`]
//! - both circuits are compared symbolically by a [`miter`]
//! - parameters are found by the counterexample-guided loop of [`cegis`], backed by a
//!   SAT [`oracle`]
//! - the result is decoded back into gates by [`fix`].
//!
//! ```rust
//! use rectify::{Circuit, cegis::{RectifyConfig, RectifyStatus, rectify}};
//!
//! let spec = Circuit::from_file("assets/circuits/scenario_c_spec.blif").unwrap();
//! let implementation = Circuit::from_file("assets/circuits/scenario_c_impl.blif").unwrap();
//! let report = rectify(&spec, &implementation, &["t3", "u3"], RectifyConfig::default()).unwrap();
//! assert_eq!(report.status, RectifyStatus::Success);
//! assert_eq!(report.num_params, 8);
//! for fix in &report.fixes {
//!     println!("{}", fix);
//! }
//! ```

pub mod cegis;
pub mod circuit;
pub mod cnf;
pub mod encoder;
pub mod error;
pub mod expr;
pub mod fix;
pub mod miter;
pub mod oracle;

// Re-exporting symbols and modules.
pub use circuit::{Circuit, Gate, GateKind, ParamId, TruthTable};
pub use encoder::ParameterAssignment;
pub use error::{ParserError, RectifyError, Result};
