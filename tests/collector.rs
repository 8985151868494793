//! Collection safety: throwaway intermediate objects from one top-level
//! expression must not survive into the next, and every object reachable
//! from the global scope (including through a `set-car!`/`set-cdr!`
//! cycle) must never be reclaimed.

use lispy::Interpreter;

#[test]
fn intermediate_garbage_does_not_accumulate_across_runs() {
    let mut interp = Interpreter::new();
    interp.run("(list 1 2 3 4 5 6 7 8 9 10)").unwrap();
    let after_first = interp.arena_stats();

    for _ in 0..20 {
        interp.run("(list 1 2 3 4 5 6 7 8 9 10)").unwrap();
    }
    let after_many = interp.arena_stats();

    // Each call allocates the same shape of throwaway list; if collection
    // ran between calls, live occupancy should not grow unboundedly.
    assert!(
        after_many.live <= after_first.live + 4,
        "expected live objects to stay roughly constant, got {} vs {}",
        after_many.live,
        after_first.live
    );
}

#[test]
fn globally_reachable_bindings_survive_collection() {
    let mut interp = Interpreter::new();
    interp.run("(define kept (list 1 2 3))").unwrap();
    for _ in 0..5 {
        interp.run("(list 99 98 97)").unwrap();
    }
    assert_eq!(interp.run("kept").unwrap(), "(1 2 3)");
}

#[test]
fn self_referential_cycle_is_tolerated_and_not_reclaimed() {
    let mut interp = Interpreter::new();
    interp.run("(define p (cons 1 2)) (set-cdr! p p)").unwrap();
    // Must terminate (the gather pass uses a visited set) and must not
    // reclaim `p`; a handful of unrelated collections must not disturb it.
    for _ in 0..5 {
        interp.run("1").unwrap();
    }
    assert_eq!(interp.run("(car p)").unwrap(), "1");
}

#[test]
fn collection_runs_at_the_start_of_a_fresh_run_call() {
    let mut interp = Interpreter::new();
    let baseline = interp.arena_stats();
    // A throwaway expression with no global side effects leaves nothing
    // reachable once this call's own collection fires on the next run.
    interp.run("(list 1 2 3)").unwrap();
    interp.run("()").err(); // evaluating nil is an error but still collects first
    let after = interp.arena_stats();
    assert!(after.live <= baseline.live + 1, "stray garbage survived: {after:?}");
}
