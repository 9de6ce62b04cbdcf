//! End-to-end scenarios (§8 S1-S6) driven entirely through the public
//! `Engine` embedding API, as an external caller would use it.

use gmus_core::Engine;

fn engine_with_run() -> Engine {
    let mut engine = Engine::create();
    engine.init_all().unwrap();
    engine.init_run().unwrap();
    engine
}

/// S1: two unit clauses in their own groups contradict each other, so both
/// are necessary.
#[test]
fn s1_minimal_unsat() {
    let mut engine = engine_with_run();
    engine.add_clause(vec![1], 1).unwrap();
    engine.add_clause(vec![-1], 2).unwrap();

    assert_eq!(engine.test_sat(), 20);
    assert_eq!(engine.compute_gmus(), 20);
    let mut ids = engine.gmus_group_ids().to_vec();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
}

/// S2: a third group is redundant and must be excluded from the MUS.
#[test]
fn s2_redundant_clause() {
    let mut engine = engine_with_run();
    engine.add_clause(vec![1], 1).unwrap();
    engine.add_clause(vec![-1], 2).unwrap();
    engine.add_clause(vec![1, 2], 3).unwrap();

    assert_eq!(engine.compute_gmus(), 20);
    let mut ids = engine.gmus_group_ids().to_vec();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
}

/// S3: a permanent hard background clause in group 0 plus a spurious third
/// group that should be classified unnecessary.
#[test]
fn s3_hard_background() {
    let mut engine = engine_with_run();
    engine.add_clause(vec![1], 0).unwrap();
    engine.add_clause(vec![-1, 2], 1).unwrap();
    engine.add_clause(vec![-2], 2).unwrap();
    engine.add_clause(vec![3], 3).unwrap();

    assert_eq!(engine.compute_gmus(), 20);
    let mut ids = engine.gmus_group_ids().to_vec();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
}

/// S4: model rotation should still land on the correct three-group MUS
/// whether or not rotation is the mechanism that found it.
#[test]
fn s4_model_rotation_gain() {
    let mut engine = engine_with_run();
    engine.add_clause(vec![1], 1).unwrap();
    engine.add_clause(vec![-1, 2], 2).unwrap();
    engine.add_clause(vec![-2], 3).unwrap();
    engine.add_clause(vec![3, -3], 4).unwrap();

    assert_eq!(engine.compute_gmus(), 20);
    let mut ids = engine.gmus_group_ids().to_vec();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
}

/// S5: an iteration budget of 1 forces an approximate result that still
/// covers every group that could be necessary.
#[test]
fn s5_over_approximation_on_budget() {
    let mut engine = engine_with_run();
    engine.set_iter_limit(1);
    for g in 1..=10u32 {
        engine.add_clause(vec![g as i64], g).unwrap();
        engine.add_clause(vec![-(g as i64)], g + 100).unwrap();
    }

    let code = engine.compute_gmus();
    assert_eq!(code, 0, "budget of 1 iteration should yield the approximate code");
    assert!(engine.gmus_group_ids().len() >= 2);
}

/// S6: re-adding an already-registered clause under a different requested
/// group id is a no-op that returns the original group.
#[test]
fn s6_duplicate_add() {
    let mut engine = engine_with_run();
    let first = engine.add_clause(vec![1, -2], 5).unwrap();
    let second = engine.add_clause(vec![-2, 1], 7).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, 5);
}

/// Property 10: a satisfiable formula has no MUS; `compute_gmus` reports the
/// error code rather than an empty result.
#[test]
fn satisfiable_instance_has_no_gmus() {
    let mut engine = engine_with_run();
    engine.add_clause(vec![1, 2], 1).unwrap();
    assert_eq!(engine.test_sat(), 10);
    assert_eq!(engine.compute_gmus(), -1);
}

/// Property 11: an explicit empty clause short-circuits straight to an
/// exact, empty-or-trivial MUS without ever touching the oracle.
#[test]
fn empty_clause_short_circuits_to_exact() {
    let mut engine = engine_with_run();
    engine.add_clause(vec![], 1).unwrap();
    assert_eq!(engine.test_sat(), 20);
    assert_eq!(engine.compute_gmus(), 20);
}

/// Property 7: `reset_run`/`reset_all` drop run state but keep the engine
/// reusable for a fresh instance.
#[test]
fn reset_run_allows_a_fresh_instance() {
    let mut engine = engine_with_run();
    engine.add_clause(vec![1], 1).unwrap();
    engine.add_clause(vec![-1], 2).unwrap();
    assert_eq!(engine.compute_gmus(), 20);

    engine.reset_run().unwrap();
    engine.init_run().unwrap();
    engine.add_clause(vec![1, 2], 1).unwrap();
    assert_eq!(engine.test_sat(), 10);
}
