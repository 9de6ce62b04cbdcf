//! Supervisor / limits (C9) and the embedding API (§6.1) built on top of
//! it. This is the module an external caller (the `gmus-cli` binary, or any
//! other embedder) actually drives: `Engine` owns one [`MusRun`] at a time
//! and collapses the internal `Result<_, GmusError>` plumbing down to the
//! integer return codes §6.1/§6.4 promise, per §7's propagation policy and
//! the "exceptions as control flow" design note (§9) — everything short of
//! `LogicBug`/`ConstraintViolation`/`MalformedInput` is recovered locally by
//! the extraction drivers already; only those three collapse to `-1` here.
//!
//! Grounded in the teacher's `TimeLimitedSolver`/`InterruptibleSolver`
//! constructor style (`examples/radrow-satisfaction/solver/src/solvers/`)
//! for the budget/config plumbing, and in
//! `original_source/src/mus-2/mus_extractor.hh`'s `MUSExtractionAlgConfig`
//! for which knobs the supervisor actually owns.

use std::time::{Duration, Instant};

use log::{log_enabled, warn, Level};
use rustc_hash::FxHashSet;

use crate::algorithms::{self, ExtractionOptions, ExtractionResult, IterationBudget};
use crate::clause::ClauseStore;
use crate::error::{GmusError, Result};
use crate::group_set::GroupSet;
use crate::ids::{GroupId, Literal, Variable, HARD_GROUP, UNDEF_GROUP};
use crate::mus_state::MusState;
use crate::oracle::{Budgets, GroupOracle, IncrementalOracle, ReinitOracle, SolveOutcome};
use crate::scheduler::{
    DegreeBias, DynamicScheduler, GraphDegreeScheduler, ImplicitDegreeScheduler, LengthBias,
    LengthScheduler, LinearScheduler, RandomScheduler, Scheduler, SchedulerKind, StaticOrderScheduler,
};
use crate::variable_group::{compute_variable_gmus, VariableGroupMap, VariableGroupOracle};

/// Which of the two oracle backends (§4.4) a run is driven by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleKind {
    Incremental,
    Reinitialised,
}

/// Which of the three extraction drivers (§4.8) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmKind {
    Deletion,
    Insertion,
    Dichotomic,
}

/// Configuration for one `Engine`: a plain builder-style struct, mirroring
/// the teacher's `TimeLimitedSolver::new`/`Config` constructor pattern
/// rather than a config-file format (§1.1 of the expanded spec).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    verbosity: Level,
    log_prefix: String,
    cpu_time_limit: Option<Duration>,
    iter_limit: Option<u64>,
    order: SchedulerKind,
    finalize_necessary_groups: bool,
    delete_unnecessary_groups: bool,
    oracle_kind: OracleKind,
    algorithm: AlgorithmKind,
    use_rr: bool,
    adaptive_rr: bool,
    refine: bool,
    rotation: bool,
    rotation_depth: Option<usize>,
    resolution_graph: bool,
    random_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            verbosity: Level::Warn,
            log_prefix: String::new(),
            cpu_time_limit: None,
            iter_limit: None,
            order: SchedulerKind::LinearMax,
            finalize_necessary_groups: false,
            delete_unnecessary_groups: true,
            oracle_kind: OracleKind::Incremental,
            algorithm: AlgorithmKind::Deletion,
            use_rr: false,
            adaptive_rr: true,
            refine: true,
            rotation: true,
            rotation_depth: None,
            resolution_graph: false,
            random_seed: 0,
        }
    }
}

impl EngineConfig {
    pub fn with_oracle_kind(mut self, kind: OracleKind) -> Self {
        self.oracle_kind = kind;
        self
    }

    pub fn with_algorithm(mut self, algorithm: AlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_redundancy_removal(mut self, use_rr: bool, adaptive: bool) -> Self {
        self.use_rr = use_rr;
        self.adaptive_rr = adaptive;
        self
    }

    pub fn with_refinement(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }

    pub fn with_rotation(mut self, rotation: bool, depth: Option<usize>) -> Self {
        self.rotation = rotation;
        self.rotation_depth = depth;
        self
    }

    pub fn with_resolution_graph(mut self, enabled: bool) -> Self {
        self.resolution_graph = enabled;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    fn needs_occurrence_lists(&self) -> bool {
        self.rotation || self.resolution_graph || matches!(self.order, SchedulerKind::LengthLongest | SchedulerKind::LengthShortest)
    }
}

/// Wall-clock/iteration budget enforcement, plus the scheduler-proportional
/// per-call oracle budget §4.9 describes. One instance is created fresh per
/// `init_run()` and lives exactly as long as the `MusRun` it gates.
struct Supervisor {
    started_at: Instant,
    cpu_time_limit: Option<Duration>,
    iter_limit: Option<u64>,
    iterations: u64,
}

impl Supervisor {
    fn new(cpu_time_limit: Option<Duration>, iter_limit: Option<u64>) -> Self {
        Supervisor {
            started_at: Instant::now(),
            cpu_time_limit,
            iter_limit,
            iterations: 0,
        }
    }

    /// Soft per-call budget proportional to whatever wall-clock allowance
    /// is left; `None` fields mean "no limit communicated to the oracle
    /// this call" (§4.9: "the engine never preempts an in-progress call").
    fn oracle_budgets(&self) -> Budgets {
        let cpu_seconds = self.cpu_time_limit.map(|limit| {
            let elapsed = self.started_at.elapsed();
            limit.saturating_sub(elapsed).as_secs_f64()
        });
        Budgets {
            conflicts: None,
            cpu_seconds,
        }
    }
}

impl IterationBudget for Supervisor {
    fn allow_iteration(&mut self) -> bool {
        self.iterations += 1;
        if let Some(limit) = self.iter_limit {
            if self.iterations > limit {
                return false;
            }
        }
        if let Some(limit) = self.cpu_time_limit {
            if self.started_at.elapsed() >= limit {
                return false;
            }
        }
        true
    }
}

/// Everything allocated fresh by `init_run()`: the clause store and group
/// set (C1/C2) flow into the MUS state (C3) for exactly one extraction, per
/// the "cyclic ownership" design note (§9) and the "one `MusRun` per
/// `init_run`/`reset_run` pair" resolution of the "incremental mode"
/// comment — clauses added under one run never leak into the next.
struct MusRun {
    store: ClauseStore,
    gset: GroupSet,
    state: MusState,
    next_fresh_group: GroupId,
    sat_result: Option<SolveOutcome>,
    last_model: Option<Vec<bool>>,
    gmus_result: Option<(ExtractionResult, Vec<GroupId>)>,
    variable_groups: Option<VariableGroupMap>,
}

impl MusRun {
    fn new(with_occurrence_lists: bool) -> Self {
        MusRun {
            store: ClauseStore::new(),
            gset: GroupSet::new(with_occurrence_lists),
            state: MusState::new(false),
            next_fresh_group: 1,
            sat_result: None,
            last_model: None,
            gmus_result: None,
            variable_groups: None,
        }
    }
}

/// The top-level embedding API (§6.1). Owns at most one [`MusRun`]; every
/// operation outside `create`/`init_all`/the `set_*` configuration methods
/// requires a run to be active (`init_run()` called, `reset_run()`/
/// `reset_all()`/`destroy()` not yet called since).
pub struct Engine {
    config: EngineConfig,
    run: Option<MusRun>,
}

fn build_scheduler(
    config: &EngineConfig,
    store: &ClauseStore,
    gset: &GroupSet,
    groups: Vec<GroupId>,
) -> Box<dyn Scheduler> {
    match config.order {
        SchedulerKind::LinearMax => Box::new(LinearScheduler::new(groups, false)),
        SchedulerKind::LinearMin => Box::new(LinearScheduler::new(groups, true)),
        SchedulerKind::LengthLongest => Box::new(LengthScheduler::new(store, gset, groups, LengthBias::Longest)),
        SchedulerKind::LengthShortest => Box::new(LengthScheduler::new(store, gset, groups, LengthBias::Shortest)),
        SchedulerKind::Random => Box::new(RandomScheduler::new(groups, config.random_seed)),
    }
}

/// A degree-based scheduler is selected through `EngineConfig` additions
/// beyond the five `set_order` modes (§6.1 only names the five numeric
/// modes; the dynamic/graph-degree variants of §4.7 are reachable by
/// constructing an `Engine` with `EngineConfig::with_*` directly rather
/// than through the numeric CLI-facing `set_order`). `build_scheduler`
/// above covers the numeric modes; `build_degree_scheduler` is offered for
/// callers that built a resolution graph and want a degree-ordered run.
pub fn build_degree_scheduler(
    gset: &GroupSet,
    graph: &crate::resolution_graph::ResolutionGraph,
    groups: Vec<GroupId>,
    bias: DegreeBias,
) -> Box<dyn Scheduler> {
    Box::new(GraphDegreeScheduler::new(gset, graph, groups, bias))
}

pub fn build_implicit_degree_scheduler(
    store: &ClauseStore,
    gset: &GroupSet,
    groups: Vec<GroupId>,
    bias: DegreeBias,
) -> Box<dyn Scheduler> {
    Box::new(ImplicitDegreeScheduler::new(store, gset, groups, bias))
}

pub fn build_dynamic_scheduler(initial: impl IntoIterator<Item = (GroupId, i64)>) -> Box<dyn Scheduler> {
    Box::new(DynamicScheduler::new(initial))
}

pub fn build_static_order_scheduler(order: Vec<GroupId>) -> Box<dyn Scheduler> {
    Box::new(StaticOrderScheduler::new(order))
}

/// Scheduler construction for variable-group mode: the length-biased modes
/// have no meaning over variable-groups (their "length" would have to be
/// redefined as something like "number of variables in the group", which
/// §6.3 never asks for), so they fall back to linear-max rather than
/// silently scoring every candidate as length zero via a clause `GroupSet`
/// that doesn't actually index these ids.
fn build_variable_scheduler(config: &EngineConfig, groups: Vec<GroupId>) -> Box<dyn Scheduler> {
    match config.order {
        SchedulerKind::LinearMax => Box::new(LinearScheduler::new(groups, false)),
        SchedulerKind::LinearMin => Box::new(LinearScheduler::new(groups, true)),
        SchedulerKind::Random => Box::new(RandomScheduler::new(groups, config.random_seed)),
        SchedulerKind::LengthLongest | SchedulerKind::LengthShortest => {
            warn!("length-based scheduling has no meaning in variable-group mode, using linear-max");
            Box::new(LinearScheduler::new(groups, false))
        }
    }
}

fn build_oracle(config: &EngineConfig, max_variable: Variable) -> Box<dyn GroupOracle> {
    match config.oracle_kind {
        OracleKind::Incremental => Box::new(IncrementalOracle::new(max_variable)),
        OracleKind::Reinitialised => Box::new(ReinitOracle::new(max_variable)),
    }
}

impl Engine {
    /// §6.1 `create()`.
    pub fn create() -> Self {
        Engine {
            config: EngineConfig::default(),
            run: None,
        }
    }

    /// §6.1 `init_all()`. No persistent state lives above one `MusRun` (§9
    /// "global singletons" resolution), so this only validates that the
    /// engine is in a state where `init_run()` can be called; idempotent.
    pub fn init_all(&mut self) -> Result<()> {
        self.run = None;
        Ok(())
    }

    /// §6.1 `set_verbosity(level, prefix)`. `level` follows `log`'s
    /// convention (0 = off, 1 = error, .., 5 = trace); out-of-range values
    /// clamp to `Trace`.
    pub fn set_verbosity(&mut self, level: u32, prefix: impl Into<String>) {
        self.config.verbosity = match level {
            0 => Level::Error,
            1 => Level::Error,
            2 => Level::Warn,
            3 => Level::Info,
            4 => Level::Debug,
            _ => Level::Trace,
        };
        log::set_max_level(self.config.verbosity.to_level_filter());
        self.config.log_prefix = prefix.into();
    }

    fn log_line(&self, level: Level, message: &str) {
        if log_enabled!(level) && level <= self.config.verbosity {
            if self.config.log_prefix.is_empty() {
                log::log!(level, "{message}");
            } else {
                log::log!(level, "{} {message}", self.config.log_prefix);
            }
        }
    }

    /// §6.1 `set_cpu_time_limit(seconds)`; `0` means no limit.
    pub fn set_cpu_time_limit(&mut self, seconds: f64) {
        self.config.cpu_time_limit = if seconds > 0.0 {
            Some(Duration::from_secs_f64(seconds))
        } else {
            None
        };
    }

    /// §6.1 `set_iter_limit(n)`; `0` means no limit.
    pub fn set_iter_limit(&mut self, n: u64) {
        self.config.iter_limit = if n > 0 { Some(n) } else { None };
    }

    /// §6.1 `set_order(mode)`. An unrecognised mode is logged and falls
    /// back to mode 0 (`LinearMax`) rather than failing the call, since
    /// §6.1 gives `set_order` no error return.
    pub fn set_order(&mut self, mode: u32) {
        match SchedulerKind::from_mode(mode) {
            Some(kind) => self.config.order = kind,
            None => {
                warn!("unrecognised set_order mode {mode}, defaulting to linear-max");
                self.config.order = SchedulerKind::LinearMax;
            }
        }
    }

    /// §6.1 `set_finalize_necessary_groups(bool)`.
    pub fn set_finalize_necessary_groups(&mut self, enabled: bool) {
        self.config.finalize_necessary_groups = enabled;
    }

    /// §6.1 `set_delete_unnecessary_groups(bool)`.
    pub fn set_delete_unnecessary_groups(&mut self, enabled: bool) {
        self.config.delete_unnecessary_groups = enabled;
    }

    /// Read/write access to the full config, for callers that want the
    /// `with_*` knobs beyond the five numeric `set_*` methods above.
    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    /// §6.1 `init_run()`: allocates a fresh clause store and group set for
    /// exactly one extraction.
    pub fn init_run(&mut self) -> Result<()> {
        self.run = Some(MusRun::new(self.config.needs_occurrence_lists()));
        Ok(())
    }

    fn run_mut(&mut self) -> Result<&mut MusRun> {
        self.run
            .as_mut()
            .ok_or_else(|| GmusError::ConstraintViolation("init_run() must be called before this operation".to_string()))
    }

    /// §6.1 `add_clause(literals, group_id) -> actual_group_id`.
    ///
    /// `group_id == 0` attaches to the permanent background group;
    /// `group_id == UNDEF_GROUP` assigns a fresh id. If an identical
    /// literal set was already registered, the existing clause's group id
    /// is returned and `group_id` is ignored (§8 property 6).
    pub fn add_clause(&mut self, literals: Vec<Literal>, group_id: GroupId) -> Result<GroupId> {
        let run = self.run_mut()?;
        let target_group = if group_id == UNDEF_GROUP {
            let g = run.next_fresh_group;
            run.next_fresh_group += 1;
            g
        } else {
            run.next_fresh_group = run.next_fresh_group.max(group_id.saturating_add(1));
            group_id
        };

        let clause_id = run.store.make_clause(literals, target_group, false)?;
        let actual_group = run.store.get(clause_id).group();
        run.gset.set_clause_group(&run.store, clause_id, actual_group)?;
        Ok(actual_group)
    }

    /// Registers a variable-group map (§6.3 VGCNF) for this run, switching
    /// `compute_gmus` from classifying clause groups to classifying variable
    /// groups (§9 "variable-group mode"). Has no effect on `add_clause`/
    /// `test_sat`, which always operate over the plain per-clause groups;
    /// only `compute_gmus`'s notion of what it classifies changes.
    pub fn set_variable_groups(&mut self, map: VariableGroupMap) -> Result<()> {
        let run = self.run_mut()?;
        run.variable_groups = Some(map);
        Ok(())
    }

    fn ensure_oracle_ready(run: &MusRun, config: &EngineConfig) -> Box<dyn GroupOracle> {
        let mut oracle = build_oracle(config, run.gset.max_variable());
        if run.gset.has_group0() {
            oracle
                .add_group(&run.store, &run.gset, HARD_GROUP, true)
                .expect("group 0 registration cannot fail");
        }
        for g in run.gset.groups() {
            if g == HARD_GROUP {
                continue;
            }
            oracle
                .add_group(&run.store, &run.gset, g, false)
                .expect("fresh group registration cannot fail");
        }
        oracle
    }

    /// §6.1 `test_sat()`: `0` unknown, `10` SAT, `20` UNSAT.
    pub fn test_sat(&mut self) -> i32 {
        self.log_line(Level::Info, "test_sat() called");
        let config = self.config.clone();
        let run = match self.run_mut() {
            Ok(run) => run,
            Err(_) => return -1,
        };

        if run.store.empty_clause().is_some() {
            run.sat_result = Some(SolveOutcome::Unsat);
            return 20;
        }

        let mut oracle = Self::ensure_oracle_ready(run, &config);
        let outcome = oracle.solve(&[]);
        run.sat_result = Some(outcome);
        run.last_model = oracle.model().map(|m| m.to_vec());
        let code = match outcome {
            SolveOutcome::Sat => 10,
            SolveOutcome::Unsat => 20,
            SolveOutcome::Unknown => 0,
        };
        self.log_line(Level::Debug, &format!("test_sat() returned {code}"));
        code
    }

    /// §6.1 `compute_gmus()`: `0` approximate, `20` exact, `-1` error. If
    /// the formula turns out satisfiable this still surfaces as `-1`
    /// (there is no MUS to report; callers should `test_sat()` first, per
    /// §8 property 10) rather than silently returning an empty set.
    pub fn compute_gmus(&mut self) -> i32 {
        self.log_line(Level::Info, "compute_gmus() called");
        let code = match self.try_compute_gmus() {
            Ok(ExtractionResult::Exact) => 20,
            Ok(ExtractionResult::Approximate) => 0,
            Err(_) => -1,
        };
        self.log_line(Level::Debug, &format!("compute_gmus() returned {code}"));
        code
    }

    fn try_compute_gmus(&mut self) -> Result<ExtractionResult> {
        let config = self.config.clone();
        let run = self.run_mut()?;

        if run.store.empty_clause().is_some() {
            run.gmus_result = Some((ExtractionResult::Exact, Vec::new()));
            return Ok(ExtractionResult::Exact);
        }

        if run.variable_groups.is_some() {
            return Self::try_compute_variable_gmus(run, &config);
        }

        let mut oracle = Self::ensure_oracle_ready(run, &config);

        if let SolveOutcome::Sat = oracle.solve(&[]) {
            return Err(GmusError::ConstraintViolation(
                "formula is satisfiable, no GMUS to compute".to_string(),
            ));
        }

        let groups: Vec<GroupId> = run.gset.groups().filter(|&g| g != HARD_GROUP).collect();
        let mut scheduler = build_scheduler(&config, &run.store, &run.gset, groups);
        let mut supervisor = Supervisor::new(config.cpu_time_limit, config.iter_limit);
        oracle.set_budgets(supervisor.oracle_budgets());

        let mut opts = ExtractionOptions {
            use_rr: config.use_rr,
            adaptive_rr: config.adaptive_rr,
            refine: config.refine,
            rotation: config.rotation,
            rotation_depth: config.rotation_depth,
        };

        let driver = match config.algorithm {
            AlgorithmKind::Deletion => algorithms::deletion::run,
            AlgorithmKind::Insertion => algorithms::insertion::run,
            AlgorithmKind::Dichotomic => algorithms::dichotomic::run,
        };

        let result = driver(
            &mut run.store,
            &mut run.gset,
            &mut run.state,
            oracle.as_mut(),
            scheduler.as_mut(),
            &mut supervisor,
            &mut opts,
        )?;

        run.state.check_invariants()?;

        let mus_ids: Vec<GroupId> = match result {
            ExtractionResult::Exact => run.state.necessary_list().collect(),
            ExtractionResult::Approximate => {
                let untested: Vec<GroupId> = run
                    .gset
                    .groups()
                    .filter(|&g| g != HARD_GROUP && matches!(run.state.status(g), crate::mus_state::GroupStatus::Untested))
                    .collect();
                run.state.necessary_list().chain(untested).collect()
            }
        };

        if config.finalize_necessary_groups {
            for &g in &mus_ids {
                let _ = oracle.delete(g);
            }
        }
        if config.delete_unnecessary_groups {
            for g in run.state.removed() {
                let _ = oracle.delete(*g);
            }
        }

        run.gmus_result = Some((result, mus_ids));
        Ok(result)
    }

    /// The variable-group counterpart of the clause-group path above (§6.3,
    /// §9 "variable-group mode"): same shape (SAT short-circuits to an
    /// error, UNSAT feeds a scheduler-ordered extraction loop, the result is
    /// stashed on the run), but driven by `VariableGroupOracle` and
    /// `compute_variable_gmus` instead of the ordinary oracle/driver pair,
    /// since the candidates being classified are variable-groups, not
    /// clause groups.
    fn try_compute_variable_gmus(run: &mut MusRun, config: &EngineConfig) -> Result<ExtractionResult> {
        let map = run.variable_groups.clone().expect("checked by caller");
        let mut oracle = VariableGroupOracle::new(map.clone(), run.gset.max_variable());
        oracle.load(&run.store, &run.gset);

        let candidates: FxHashSet<GroupId> = map.groups();
        for &g in &candidates {
            oracle.add_group(&run.store, &run.gset, g, false)?;
        }

        if let SolveOutcome::Sat = oracle.solve(&[]) {
            return Err(GmusError::ConstraintViolation(
                "formula is satisfiable, no GMUS to compute".to_string(),
            ));
        }

        let mut scheduler = build_variable_scheduler(config, candidates.iter().copied().collect());
        let mut supervisor = Supervisor::new(config.cpu_time_limit, config.iter_limit);
        oracle.set_budgets(supervisor.oracle_budgets());

        let (result, mus_ids) =
            compute_variable_gmus(&mut oracle, &candidates, scheduler.as_mut(), &mut supervisor, config.refine);

        run.gmus_result = Some((result, mus_ids));
        Ok(result)
    }

    /// The satisfying model found by the most recent `test_sat()` call, if
    /// it returned SAT. `model()[v - 1]` is the value assigned to variable
    /// `v`. Not part of §6.1's named API, but a natural extension for
    /// embedders that want to inspect a witness rather than just the code.
    pub fn last_model(&self) -> Option<&[bool]> {
        self.run.as_ref().and_then(|r| r.last_model.as_deref())
    }

    /// §6.1 `gmus_group_ids()`: read-only borrow, valid until the next
    /// `init_run()`.
    pub fn gmus_group_ids(&self) -> &[GroupId] {
        match self.run.as_ref().and_then(|r| r.gmus_result.as_ref()) {
            Some((_, ids)) => ids,
            None => &[],
        }
    }

    /// §6.1 `reset_run()`: drops the current run, preserving configuration.
    pub fn reset_run(&mut self) -> Result<()> {
        self.run = None;
        Ok(())
    }

    /// §6.1 `reset_all()`: same as `reset_run()` — there is no persistent
    /// state above one run (§9), so "all" and "run" coincide here. Kept as
    /// a distinct method to preserve the §8 property 7 idempotence contract
    /// under the name callers expect.
    pub fn reset_all(&mut self) -> Result<()> {
        self.reset_run()
    }

    /// §6.1 `destroy()`.
    pub fn destroy(&mut self) {
        self.run = None;
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::create()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_engine() -> Engine {
        let mut engine = Engine::create();
        engine.init_all().unwrap();
        engine.init_run().unwrap();
        engine
    }

    /// S1: `(x)`, `(¬x)` over two groups — exact MUS = `{1, 2}`.
    #[test]
    fn s1_minimal_unsat() {
        let mut engine = fresh_engine();
        let g1 = engine.add_clause(vec![1], UNDEF_GROUP).unwrap();
        let g2 = engine.add_clause(vec![-1], UNDEF_GROUP).unwrap();

        assert_eq!(engine.test_sat(), 20);
        assert_eq!(engine.compute_gmus(), 20);
        let mut mus = engine.gmus_group_ids().to_vec();
        mus.sort_unstable();
        let mut expected = vec![g1, g2];
        expected.sort_unstable();
        assert_eq!(mus, expected);
    }

    /// S2: `(x)`, `(¬x)`, `(x ∨ y)` — group 3 is redundant.
    #[test]
    fn s2_redundant_clause() {
        let mut engine = fresh_engine();
        let g1 = engine.add_clause(vec![1], UNDEF_GROUP).unwrap();
        let g2 = engine.add_clause(vec![-1], UNDEF_GROUP).unwrap();
        let _g3 = engine.add_clause(vec![1, 2], UNDEF_GROUP).unwrap();

        assert_eq!(engine.compute_gmus(), 20);
        let mut mus = engine.gmus_group_ids().to_vec();
        mus.sort_unstable();
        let mut expected = vec![g1, g2];
        expected.sort_unstable();
        assert_eq!(mus, expected);
    }

    /// S3: hard background `(x)` in group 0; groups `(¬x ∨ y)`, `(¬y)`,
    /// `(z)` — exact MUS = `{1, 2}`, group 3 unnecessary.
    #[test]
    fn s3_hard_background() {
        let mut engine = fresh_engine();
        engine.add_clause(vec![1], HARD_GROUP).unwrap();
        let g1 = engine.add_clause(vec![-1, 2], UNDEF_GROUP).unwrap();
        let g2 = engine.add_clause(vec![-2], UNDEF_GROUP).unwrap();
        let _g3 = engine.add_clause(vec![3], UNDEF_GROUP).unwrap();

        assert_eq!(engine.compute_gmus(), 20);
        let mut mus = engine.gmus_group_ids().to_vec();
        mus.sort_unstable();
        let mut expected = vec![g1, g2];
        expected.sort_unstable();
        assert_eq!(mus, expected);
    }

    /// S6: adding the same clause twice (literal order swapped, different
    /// requested group id) returns the same group id both times.
    #[test]
    fn s6_duplicate_add() {
        let mut engine = fresh_engine();
        let g1 = engine.add_clause(vec![1, -2], 5).unwrap();
        let g2 = engine.add_clause(vec![-2, 1], 7).unwrap();
        assert_eq!(g1, g2);
        assert_eq!(g1, 5);
    }

    /// Variable-group mode end to end, through `Engine`: `(x) ∧ (¬x)` with
    /// `x` in its own variable-group and an unrelated `y` clause in another.
    /// `compute_gmus` should classify `x`'s variable-group necessary and
    /// exclude `y`'s.
    #[test]
    fn variable_group_mode_excludes_the_unrelated_group() {
        let mut engine = fresh_engine();
        let mut map = crate::variable_group::VariableGroupMap::new();
        map.assign(1, 1).unwrap();
        map.assign(2, 2).unwrap();
        engine.set_variable_groups(map).unwrap();

        engine.add_clause(vec![1], UNDEF_GROUP).unwrap();
        engine.add_clause(vec![-1], UNDEF_GROUP).unwrap();
        engine.add_clause(vec![2], UNDEF_GROUP).unwrap();

        assert_eq!(engine.compute_gmus(), 20);
        assert_eq!(engine.gmus_group_ids(), &[1]);
    }

    /// Empty group set — exact with empty MUS (§8 property 9).
    #[test]
    fn empty_group_set_is_exact_empty() {
        let mut engine = fresh_engine();
        assert_eq!(engine.compute_gmus(), 20);
        assert!(engine.gmus_group_ids().is_empty());
    }

    /// The empty clause makes every non-zero group unnecessary (§8
    /// property 11).
    #[test]
    fn empty_clause_short_circuits() {
        let mut engine = fresh_engine();
        engine.add_clause(vec![1], UNDEF_GROUP).unwrap();
        engine.add_clause(vec![], UNDEF_GROUP).unwrap();
        assert_eq!(engine.test_sat(), 20);
        assert_eq!(engine.compute_gmus(), 20);
        assert!(engine.gmus_group_ids().is_empty());
    }

    /// A satisfiable formula has no MUS: `compute_gmus` surfaces an error
    /// (§8 property 10).
    #[test]
    fn satisfiable_formula_has_no_mus() {
        let mut engine = fresh_engine();
        engine.add_clause(vec![1, 2], UNDEF_GROUP).unwrap();
        assert_eq!(engine.test_sat(), 10);
        assert_eq!(engine.compute_gmus(), -1);
    }

    /// §8 property 12 / S5: an iteration budget of 1 on a 10-group
    /// contradiction yields an approximate result covering every group.
    #[test]
    fn iter_limit_of_one_is_approximate() {
        let mut engine = fresh_engine();
        let mut ids = Vec::new();
        for i in 1..=5i64 {
            ids.push(engine.add_clause(vec![i], UNDEF_GROUP).unwrap());
            ids.push(engine.add_clause(vec![-i], UNDEF_GROUP).unwrap());
        }
        engine.set_iter_limit(1);
        assert_eq!(engine.compute_gmus(), 0);
        let mus = engine.gmus_group_ids();
        assert_eq!(mus.len(), ids.len());
    }

    /// §8 property 7: `reset_all` is idempotent and preserves config.
    #[test]
    fn reset_all_preserves_config() {
        let mut engine = fresh_engine();
        engine.set_iter_limit(42);
        engine.reset_all().unwrap();
        engine.reset_all().unwrap();
        assert_eq!(engine.config.iter_limit, Some(42));
    }
}
