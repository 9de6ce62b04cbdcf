//! Property-based tests, in the teacher's `proptest` style
//! (`gmus-core/tests/sat_solving_test.rs`'s old `proptest!` blocks), adapted
//! from whole-solver equivalence checks to invariants of the group-MUS
//! extractor itself.

use proptest::prelude::*;

use gmus_core::Engine;

fn engine_with_run() -> Engine {
    let mut engine = Engine::create();
    engine.init_all().unwrap();
    engine.init_run().unwrap();
    engine
}

proptest! {
    /// §8 property 6: whatever group id a duplicate clause is requested
    /// under, `add_clause` always returns the group the literals were first
    /// registered with.
    #[test]
    fn duplicate_clause_always_returns_first_group(
        first_group in 1u32..1000,
        second_group in 1u32..1000,
        a in 1i64..20,
        b in 1i64..20,
    ) {
        let mut engine = engine_with_run();
        let first = engine.add_clause(vec![a, -b], first_group).unwrap();
        let second = engine.add_clause(vec![-b, a], second_group).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, first_group);
    }

    /// A chain of `n` independent unit-clause contradictions is always
    /// exactly UNSAT, and every contradiction pair ends up in the MUS.
    #[test]
    fn every_contradiction_pair_is_necessary(n in 1u32..15) {
        let mut engine = engine_with_run();
        for k in 1..=n {
            engine.add_clause(vec![k as i64], 2 * k - 1).unwrap();
            engine.add_clause(vec![-(k as i64)], 2 * k).unwrap();
        }

        prop_assert_eq!(engine.test_sat(), 20);
        prop_assert_eq!(engine.compute_gmus(), 20);

        let ids: std::collections::HashSet<u32> = engine.gmus_group_ids().iter().copied().collect();
        prop_assert_eq!(ids.len() as u32, 2 * n);
    }

    /// Adding one redundant wide clause on top of an otherwise-minimal
    /// contradiction never shrinks the reported MUS below the pair that was
    /// already necessary, and the redundant group is excluded from it.
    #[test]
    fn redundant_group_never_appears_in_the_mus(extra_var in 2i64..50) {
        let mut engine = engine_with_run();
        engine.add_clause(vec![1], 1).unwrap();
        engine.add_clause(vec![-1], 2).unwrap();
        engine.add_clause(vec![1, extra_var], 3).unwrap();

        prop_assert_eq!(engine.compute_gmus(), 20);
        prop_assert!(!engine.gmus_group_ids().contains(&3));
        prop_assert!(engine.gmus_group_ids().contains(&1));
        prop_assert!(engine.gmus_group_ids().contains(&2));
    }
}
