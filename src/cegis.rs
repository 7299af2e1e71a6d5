//! Counterexample-guided rectification of an implementation circuit against a specification.
//!
//! The loop alternates two queries, each on its own [`Oracle`]:
//! - **synthesis**: find parameters for the blocks replacing the suspect gates such that the
//!   implementation agrees with the specification on every counterexample found so far
//! - **verification**: find primary input values on which the implementation, with its
//!   parameters fixed to the candidate, disagrees with the specification.
//!
//! The synthesis oracle only ever sees counterexample constraints, so a parameter that no
//! counterexample mentions is left to [`Model::value`], which reads it as `false`.
//!
//! Synthesis failing means no fix exists in the block function family
//! ([`RectifyStatus::Infeasible`]), verification failing means the candidate is correct
//! for every input ([`RectifyStatus::Success`]).
//! Since each new counterexample differs from the previous ones, the loop ends after at most
//! `2^n + 1` synthesis queries for `n` primary inputs.
//!
//! ```rust
//! use rectify::{Circuit, cegis::{RectifyConfig, RectifyStatus, rectify}};
//!
//! let spec = Circuit::from_file("assets/circuits/scenario_a_spec.blif").unwrap();
//! let implementation = Circuit::from_file("assets/circuits/scenario_a_impl.blif").unwrap();
//! let report = rectify(&spec, &implementation, &["t3"], RectifyConfig::default()).unwrap();
//! assert_eq!(report.status, RectifyStatus::Success);
//! assert_eq!(report.fixes[0].to_string(), "t3: CONST0 -> AND");
//! ```

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    time::{Duration, Instant},
};

use crate::{
    Circuit, ParameterAssignment, RectifyError, Result,
    circuit::MAX_NAMED_ARITY,
    encoder::{BlockEncoder, ParameterizedCircuit},
    expr::{Expr, ExprPool, Var},
    fix::{FixRecord, extract_fixes},
    miter::Miter,
    oracle::{Model, Oracle, SatResult, VarisatOracle},
};

/// Settings of a rectification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectifyConfig {
    /// Largest arity of a suspect gate.
    pub max_arity: usize,
    /// Caps the number of synthesis queries, on top of the `2^n + 1` bound.
    pub max_iterations: Option<usize>,
    /// Try the original function of the suspect gates first at each synthesis query.
    pub prefer_incumbent: bool,
}

impl Default for RectifyConfig {
    fn default() -> Self {
        RectifyConfig {
            max_arity: MAX_NAMED_ARITY,
            max_iterations: None,
            prefer_incumbent: true,
        }
    }
}

impl RectifyConfig {
    pub fn with_max_arity(mut self, max_arity: usize) -> Self {
        self.max_arity = max_arity;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_prefer_incumbent(mut self, prefer_incumbent: bool) -> Self {
        self.prefer_incumbent = prefer_incumbent;
        self
    }

    /// Maximum number of synthesis queries for a circuit with `num_inputs` primary inputs.
    pub fn iteration_cap(&self, num_inputs: usize) -> usize {
        let bound = u32::try_from(num_inputs)
            .ok()
            .and_then(|n| 1usize.checked_shl(n))
            .map_or(usize::MAX, |domain| domain.saturating_add(1));
        match self.max_iterations {
            Some(max) => bound.min(max),
            None => bound,
        }
    }
}

/// Primary input values on which a candidate fix was refuted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample {
    /// Primary input values, in specification input order.
    pub inputs: Vec<(String, bool)>,
    /// Value of every net of the parameterized implementation under the refuted candidate.
    pub nets: BTreeMap<String, bool>,
}

impl Counterexample {
    /// Primary input values only, in specification input order.
    pub fn values(&self) -> Vec<bool> {
        self.inputs.iter().map(|&(_, value)| value).collect()
    }
}

impl Display for Counterexample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let assignments: Vec<String> = self
            .inputs
            .iter()
            .map(|(name, value)| format!("{}={}", name, *value as u8))
            .collect();
        write!(f, "{}", assignments.join(" "))
    }
}

/// Counterexamples gathered during one run, in discovery order. Append only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintStore(Vec<Counterexample>);

impl ConstraintStore {
    fn push(&mut self, counterexample: Counterexample) {
        self.0.push(counterexample);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Counterexample> {
        self.0.iter()
    }

    /// Whether a counterexample with these primary input values was already recorded.
    pub fn contains(&self, values: &[bool]) -> bool {
        self.0.iter().any(|cex| cex.values() == values)
    }
}

/// State of a [`CegisLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CegisState {
    Init,
    Synthesize,
    Verify,
    Success,
    Infeasible,
}

impl CegisState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CegisState::Success | CegisState::Infeasible)
    }
}

impl Display for CegisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CegisState::Init => "INIT",
            CegisState::Synthesize => "SYNTHESIZE",
            CegisState::Verify => "VERIFY",
            CegisState::Success => "SUCCESS",
            CegisState::Infeasible => "INFEASIBLE",
        };
        write!(f, "{}", name)
    }
}

/// Terminal outcome of a rectification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectifyStatus {
    /// A fix making both circuits equivalent was found.
    Success,
    /// No fix exists with the given suspect gates and block arity.
    Infeasible,
}

impl Display for RectifyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RectifyStatus::Success => write!(f, "SUCCESS"),
            RectifyStatus::Infeasible => write!(f, "INFEASIBLE"),
        }
    }
}

/// What a rectification run produced.
#[derive(Debug, Clone)]
pub struct RectifyReport {
    pub status: RectifyStatus,
    /// Number of synthesis queries.
    pub iterations: usize,
    pub elapsed: Duration,
    pub num_params: usize,
    /// One record per suspect gate, in suspect order. Empty unless successful.
    pub fixes: Vec<FixRecord>,
    pub counterexamples: ConstraintStore,
    /// The implementation with its suspect gates turned into parameterized blocks.
    pub parameterized: ParameterizedCircuit,
    /// The final candidate, only when successful.
    pub assignment: Option<ParameterAssignment>,
}

/// The synthesis/verification state machine.
///
/// Drive it one transition at a time with [`CegisLoop::step`], or up to a terminal
/// state with [`CegisLoop::run`].
pub struct CegisLoop<O: Oracle> {
    spec: Circuit,
    parameterized: ParameterizedCircuit,
    config: RectifyConfig,
    /// Holds the counterexample constraints only.
    synthesis: O,
    /// Holds the miter, candidates are given as assumptions.
    verification: O,
    pool: ExprPool,
    /// Constraints asserted on `synthesis`, in discovery order.
    constraints: Vec<Expr>,
    /// Built when leaving [`CegisState::Init`].
    miter: Option<Miter>,
    state: CegisState,
    store: ConstraintStore,
    candidate: Option<ParameterAssignment>,
    iterations: usize,
    cap: usize,
    started: Instant,
}

impl<O: Oracle> CegisLoop<O> {
    /// Prepares a rectification of `implementation` at the `suspects` gates.
    ///
    /// Suspect gates are replaced by parameterized blocks right away, so unknown gates,
    /// an empty suspect set or too wide gates are reported here.
    ///
    /// `synthesis` and `verification` must be two distinct, fresh oracles.
    pub fn new<S: AsRef<str>>(
        spec: &Circuit,
        implementation: &Circuit,
        suspects: &[S],
        config: RectifyConfig,
        synthesis: O,
        verification: O,
    ) -> Result<Self> {
        let parameterized = BlockEncoder::new(config.max_arity).encode(implementation, suspects)?;
        Ok(CegisLoop {
            spec: spec.clone(),
            parameterized,
            config,
            synthesis,
            verification,
            pool: ExprPool::new(),
            constraints: Vec::new(),
            miter: None,
            state: CegisState::Init,
            store: ConstraintStore::default(),
            candidate: None,
            iterations: 0,
            cap: config.iteration_cap(spec.get_inputs().len()),
            started: Instant::now(),
        })
    }

    pub fn state(&self) -> CegisState {
        self.state
    }

    /// Number of synthesis queries so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn get_store(&self) -> &ConstraintStore {
        &self.store
    }

    /// The last synthesized parameters.
    pub fn get_candidate(&self) -> Option<&ParameterAssignment> {
        self.candidate.as_ref()
    }

    pub fn get_parameterized(&self) -> &ParameterizedCircuit {
        &self.parameterized
    }

    pub fn get_synthesis_oracle(&self) -> &O {
        &self.synthesis
    }

    pub fn get_verification_oracle(&self) -> &O {
        &self.verification
    }

    fn mismatch(&self) -> Result<Expr> {
        self.miter
            .as_ref()
            .map(Miter::get_mismatch)
            .ok_or_else(|| RectifyError::MalformedCircuit("miter was not built".to_string()))
    }

    /// Literals fixing every parameter to its value in `assignment`.
    fn param_literals(&mut self, assignment: &ParameterAssignment) -> Vec<Expr> {
        assignment
            .iter()
            .map(|(id, value)| {
                let p = self.pool.var(Var::Param(id));
                if value { p } else { !p }
            })
            .collect()
    }

    /// The original gate functions, when they agree with every counterexample so far.
    fn incumbent(&self) -> Option<ParameterAssignment> {
        let original = self.parameterized.incumbent();
        let incumbent: ParameterAssignment = self
            .parameterized
            .param_ids()
            .map(|id| (id, original.get(id).unwrap_or(false)))
            .collect();
        let value = |var: Var| match var {
            Var::Param(id) => incumbent.get(id).unwrap_or(false),
            Var::Input(_) => false,
        };
        self.constraints
            .iter()
            .all(|&constraint| self.pool.evaluate(constraint, value))
            .then_some(incumbent)
    }

    fn read_candidate(&self, model: &Model) -> ParameterAssignment {
        self.parameterized
            .param_ids()
            .map(|id| (id, model.value(Var::Param(id))))
            .collect()
    }

    /// Performs one transition and returns the new state.
    ///
    /// Terminal states are left unchanged.
    pub fn step(&mut self) -> Result<CegisState> {
        let next = match self.state {
            CegisState::Init => self.init()?,
            CegisState::Synthesize => self.synthesize()?,
            CegisState::Verify => self.verify()?,
            CegisState::Success | CegisState::Infeasible => self.state,
        };
        if next != self.state {
            log::debug!("cegis; {} -> {}", self.state, next);
        }
        self.state = next;
        Ok(next)
    }

    fn init(&mut self) -> Result<CegisState> {
        self.started = Instant::now();
        self.miter = Some(Miter::new(
            &mut self.pool,
            &self.spec,
            self.parameterized.get_circuit(),
        )?);
        Ok(CegisState::Synthesize)
    }

    fn synthesize(&mut self) -> Result<CegisState> {
        if self.iterations >= self.cap {
            return Err(RectifyError::IterationLimit(self.iterations));
        }
        self.iterations += 1;

        let incumbent = if self.config.prefer_incumbent {
            self.incumbent()
        } else {
            None
        };
        let candidate = match incumbent {
            Some(incumbent) => incumbent,
            None => match self.synthesis.check_sat(&self.pool, &[])? {
                SatResult::Unsat => return Ok(CegisState::Infeasible),
                SatResult::Sat(model) => self.read_candidate(&model),
            },
        };
        for block in self.parameterized.get_blocks() {
            log::trace!(
                "cegis; iteration {} candidate {} = {}",
                self.iterations,
                block.get_gate(),
                candidate.table(block.get_params())
            );
        }
        self.candidate = Some(candidate);
        Ok(CegisState::Verify)
    }

    fn verify(&mut self) -> Result<CegisState> {
        let candidate = self.candidate.clone().unwrap_or_default();
        let mut assumptions = vec![self.mismatch()?];
        assumptions.extend(self.param_literals(&candidate));

        let model = match self.verification.check_sat(&self.pool, &assumptions)? {
            SatResult::Unsat => return Ok(CegisState::Success),
            SatResult::Sat(model) => model,
        };

        let miter = self
            .miter
            .as_ref()
            .ok_or_else(|| RectifyError::MalformedCircuit("miter was not built".to_string()))?;
        let values: Vec<bool> = (0..miter.get_inputs().len())
            .map(|i| model.value(Var::Input(i)))
            .collect();
        let inputs: Vec<(String, bool)> = miter
            .get_inputs()
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect();
        let concrete: HashMap<String, bool> = inputs.iter().cloned().collect();
        let nets = self
            .parameterized
            .get_circuit()
            .simulate(&concrete, &candidate)?
            .into_iter()
            .collect();
        let counterexample = Counterexample { inputs, nets };

        if self.store.contains(&values) {
            log::warn!(
                "cegis; counterexample {} was already refuted, the oracle may be unsound",
                counterexample
            );
        }
        log::debug!(
            "cegis; counterexample #{}: {}",
            self.store.len() + 1,
            counterexample
        );

        // The next candidates must agree with the specification on these inputs
        let constraint = !miter.instantiate(&mut self.pool, &values);
        self.synthesis.assert(&self.pool, constraint)?;
        self.constraints.push(constraint);
        self.store.push(counterexample);
        Ok(CegisState::Synthesize)
    }

    /// Steps until a terminal state is reached and reports the outcome.
    pub fn run(mut self) -> Result<RectifyReport> {
        while !self.step()?.is_terminal() {}

        let status = match self.state {
            CegisState::Success => RectifyStatus::Success,
            _ => RectifyStatus::Infeasible,
        };
        let assignment = match status {
            RectifyStatus::Success => self.candidate.take(),
            RectifyStatus::Infeasible => None,
        };
        let fixes = match &assignment {
            Some(assignment) => extract_fixes(&self.parameterized, assignment),
            None => Vec::new(),
        };
        Ok(RectifyReport {
            status,
            iterations: self.iterations,
            elapsed: self.started.elapsed(),
            num_params: self.parameterized.num_params(),
            fixes,
            counterexamples: self.store,
            parameterized: self.parameterized,
            assignment,
        })
    }
}

/// Rectifies `implementation` against `spec` at the `suspects` gates with a [`VarisatOracle`].
pub fn rectify<S: AsRef<str>>(
    spec: &Circuit,
    implementation: &Circuit,
    suspects: &[S],
    config: RectifyConfig,
) -> Result<RectifyReport> {
    let cegis = CegisLoop::new(
        spec,
        implementation,
        suspects,
        config,
        VarisatOracle::new(),
        VarisatOracle::new(),
    )?;
    log::info!(
        "rectify; {} suspects {:?}, {} parameters",
        implementation.get_name(),
        cegis
            .get_parameterized()
            .get_blocks()
            .iter()
            .map(|block| block.get_gate())
            .collect::<Vec<_>>(),
        cegis.get_parameterized().num_params()
    );
    let report = cegis.run()?;
    log::info!(
        "rectify; {} after {} iterations ({} counterexamples) in {:?}",
        report.status,
        report.iterations,
        report.counterexamples.len(),
        report.elapsed
    );
    Ok(report)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::{Gate, GateKind, ParamId, fix::FixedFunction, oracle::OracleError};

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    /// `f = (a XOR b) <kind> c`
    fn circuit(kind: GateKind) -> Circuit {
        Circuit::build(
            "c",
            s(&["a", "b", "c"]),
            s(&["f"]),
            vec![
                Gate::new("x", GateKind::Xor, s(&["a", "b"])),
                Gate::new("f", kind, s(&["x", "c"])),
            ],
        )
        .unwrap()
    }

    /// An oracle answering SAT with an empty model to every query.
    struct AlwaysSat;

    impl Oracle for AlwaysSat {
        fn assert(&mut self, _: &ExprPool, _: Expr) -> Result<()> {
            Ok(())
        }

        fn check_sat(&mut self, _: &ExprPool, _: &[Expr]) -> Result<SatResult> {
            Ok(SatResult::Sat(Model::default()))
        }
    }

    struct Broken;

    impl Oracle for Broken {
        fn assert(&mut self, _: &ExprPool, _: Expr) -> Result<()> {
            Ok(())
        }

        fn check_sat(&mut self, _: &ExprPool, _: &[Expr]) -> Result<SatResult> {
            Err(OracleError::Solver("out of memory".to_string()).into())
        }
    }

    #[test]
    fn iteration_cap_test() {
        let config = RectifyConfig::default();
        assert_eq!(config.iteration_cap(0), 2);
        assert_eq!(config.iteration_cap(3), 9);
        assert_eq!(config.iteration_cap(200), usize::MAX);
        assert_eq!(config.with_max_iterations(4).iteration_cap(3), 4);
    }

    #[test]
    fn step_through_test() {
        let spec = circuit(GateKind::And);
        let implementation = circuit(GateKind::Or);
        let mut cegis = CegisLoop::new(
            &spec,
            &implementation,
            &["f"],
            RectifyConfig::default(),
            VarisatOracle::new(),
            VarisatOracle::new(),
        )
        .unwrap();
        assert_eq!(cegis.state(), CegisState::Init);
        assert_eq!(cegis.step().unwrap(), CegisState::Synthesize);
        assert_eq!(cegis.step().unwrap(), CegisState::Verify);
        // The incumbent OR is tried first, without asking the synthesis oracle
        assert_eq!(cegis.get_synthesis_oracle().num_queries(), 0);
        assert_eq!(
            cegis
                .get_candidate()
                .unwrap()
                .table(cegis.get_parameterized().get_blocks()[0].get_params())
                .to_string(),
            "0111"
        );
        // OR is wrong, a counterexample is found
        assert_eq!(cegis.step().unwrap(), CegisState::Synthesize);
        assert_eq!(cegis.get_store().len(), 1);
        let cex = cegis.get_store().iter().next().unwrap();
        assert_eq!(cex.inputs.len(), 3);
        assert!(cex.nets.contains_key("x"));
        assert!(cex.nets.contains_key("f"));
        // The synthesis oracle only holds the constraint of this counterexample, which
        // mentions a single row of the block
        assert_eq!(cegis.get_synthesis_oracle().get_cnf().num_vars(), 1);
        assert_eq!(cegis.get_verification_oracle().num_queries(), 1);

        while !cegis.step().unwrap().is_terminal() {}
        assert_eq!(cegis.state(), CegisState::Success);
        assert_eq!(cegis.iterations(), cegis.get_store().len() + 1);
        assert!(cegis.iterations() <= 9);
        // Terminal states are sticky
        assert_eq!(cegis.step().unwrap(), CegisState::Success);
    }

    #[test]
    fn success_test() {
        let spec = circuit(GateKind::And);
        let implementation = circuit(GateKind::Xor);
        let report = rectify(&spec, &implementation, &["f"], RectifyConfig::default()).unwrap();
        assert_eq!(report.status, RectifyStatus::Success);
        assert_eq!(report.num_params, 4);
        assert_eq!(report.counterexamples.len() + 1, report.iterations);
        // Every row of f is reachable, the fix is unique
        assert_eq!(report.fixes.len(), 1);
        assert_eq!(report.fixes[0].function, FixedFunction::Gate(GateKind::And));
        assert_eq!(report.fixes[0].to_string(), "f: XOR -> AND");
        assert!(report.assignment.is_some());
    }

    #[test_case(GateKind::Nor, 2)]
    #[test_case(GateKind::Xor, 2)]
    #[test_case(GateKind::Inv, 1)]
    #[test_case(GateKind::Buf, 1)]
    #[test_case(GateKind::Const0, 0)]
    #[test_case(GateKind::Const1, 0)]
    #[test_case(GateKind::Const0, 2)]
    #[test_case(GateKind::Const1, 2)]
    fn self_rectification_test(kind: GateKind, arity: usize) {
        // f = g XOR c, g reading the first `arity` signals of (x, c)
        let fanins = s(&["x", "c"])[..arity].to_vec();
        let spec = Circuit::build(
            "c",
            s(&["a", "b", "c"]),
            s(&["f"]),
            vec![
                Gate::new("x", GateKind::Xor, s(&["a", "b"])),
                Gate::new("g", kind, fanins),
                Gate::new("f", GateKind::Xor, s(&["g", "c"])),
            ],
        )
        .unwrap();
        let report = rectify(&spec, &spec, &["g", "x"], RectifyConfig::default()).unwrap();
        assert_eq!(report.status, RectifyStatus::Success);
        assert_eq!(report.num_params, (1 << arity) + 4);
        assert_eq!(report.iterations, 1);
        assert!(report.counterexamples.is_empty());
        assert_eq!(report.fixes[0].function, FixedFunction::Gate(kind));
        assert!(report.fixes.iter().all(|fix| fix.is_unchanged()));
    }

    #[test]
    fn infeasible_test() {
        // f = a AND b cannot be obtained by changing the inverter on c
        let spec = Circuit::build(
            "spec",
            s(&["a", "b", "c"]),
            s(&["f"]),
            vec![Gate::new("f", GateKind::And, s(&["a", "b"]))],
        )
        .unwrap();
        let implementation = Circuit::build(
            "impl",
            s(&["a", "b", "c"]),
            s(&["f"]),
            vec![
                Gate::new("n", GateKind::Inv, s(&["c"])),
                Gate::new("f", GateKind::And, s(&["a", "n"])),
            ],
        )
        .unwrap();
        let report = rectify(&spec, &implementation, &["n"], RectifyConfig::default()).unwrap();
        assert_eq!(report.status, RectifyStatus::Infeasible);
        assert!(report.fixes.is_empty());
        assert!(report.assignment.is_none());
        assert!(!report.counterexamples.is_empty());
        assert_eq!(report.counterexamples.len() + 1, report.iterations);
        assert!(report.iterations <= 9);
    }

    #[test]
    fn caller_errors_test() {
        let spec = circuit(GateKind::And);
        let none: [&str; 0] = [];
        assert!(matches!(
            rectify(&spec, &spec, &none, RectifyConfig::default()),
            Err(RectifyError::EmptySuspectSet)
        ));
        assert!(matches!(
            rectify(&spec, &spec, &["nope"], RectifyConfig::default()),
            Err(RectifyError::GateNotFound(_))
        ));
        assert!(matches!(
            rectify(
                &spec,
                &spec,
                &["f"],
                RectifyConfig::default().with_max_arity(1)
            ),
            Err(RectifyError::UnsupportedArity { .. })
        ));
    }

    #[test]
    fn iteration_limit_test() {
        // An oracle claiming every query is SAT keeps refuting the same candidate
        let spec = circuit(GateKind::And);
        let implementation = circuit(GateKind::Or);
        let cegis = CegisLoop::new(
            &spec,
            &implementation,
            &["f"],
            RectifyConfig::default().with_max_iterations(3),
            AlwaysSat,
            AlwaysSat,
        )
        .unwrap();
        assert!(matches!(cegis.run(), Err(RectifyError::IterationLimit(3))));

        let cegis = CegisLoop::new(
            &spec,
            &implementation,
            &["f"],
            RectifyConfig::default(),
            AlwaysSat,
            AlwaysSat,
        )
        .unwrap();
        assert!(matches!(cegis.run(), Err(RectifyError::IterationLimit(9))));
    }

    #[test]
    fn oracle_failure_test() {
        let spec = circuit(GateKind::And);
        for prefer_incumbent in [true, false] {
            let config = RectifyConfig::default().with_prefer_incumbent(prefer_incumbent);
            let cegis = CegisLoop::new(&spec, &spec, &["f"], config, Broken, Broken).unwrap();
            assert!(matches!(
                cegis.run(),
                Err(RectifyError::OracleError(OracleError::Solver(_)))
            ));
        }
    }

    #[test]
    fn without_incumbent_test() {
        let spec = circuit(GateKind::Xnor);
        let config = RectifyConfig::default().with_prefer_incumbent(false);
        let report = rectify(&spec, &spec, &["f"], config).unwrap();
        assert_eq!(report.status, RectifyStatus::Success);
        assert!(report.iterations <= 9);
        assert_eq!(
            report.fixes[0].function,
            FixedFunction::Gate(GateKind::Xnor)
        );
        let assignment = report.assignment.unwrap();
        assert_eq!(assignment.len(), 4);
        assert!(assignment.get(ParamId(0)).is_some());
    }
}
