//! Integration tests for the embedding search and convergent cross
//! mapping.
//!
//! Uses coupled logistic maps: the driver leaves its signature in the
//! driven series, so cross mapping from the driven series recovers the
//! driver and the skill grows with the library.

use clpost_rs::analysis::{best_embedding, ccm_pair, simplex_mae};

/// Unidirectionally coupled logistic maps, x driving y.
fn coupled_logistic(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut x = 0.4_f64;
    let mut y = 0.2_f64;
    // Discard the transient.
    for _ in 0..100 {
        let x_next = x * (3.8 - 3.8 * x);
        let y_next = y * (3.5 - 3.5 * y - 0.1 * x);
        x = x_next;
        y = y_next;
    }
    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    for _ in 0..n {
        xs.push(x);
        ys.push(y);
        let x_next = x * (3.8 - 3.8 * x);
        let y_next = y * (3.5 - 3.5 * y - 0.1 * x);
        x = x_next;
        y = y_next;
    }
    (xs, ys)
}

#[test]
fn test_deterministic_map_is_predictable() {
    let (xs, _) = coupled_logistic(400);
    let mae = simplex_mae(&xs, 2).unwrap();
    assert!(mae < 0.05, "logistic map MAE = {}", mae);
}

#[test]
fn test_embedding_search_on_logistic_map() {
    let (xs, _) = coupled_logistic(400);
    let scan = best_embedding(&xs, 2..=24).unwrap();
    assert_eq!(scan.errors.len(), 23);
    // A one-dimensional map needs no more than a few dimensions.
    assert!(scan.best_e <= 8, "best E = {}", scan.best_e);
}

#[test]
fn test_cross_map_skill_grows_with_library() {
    let (xs, ys) = coupled_logistic(400);
    let results = ccm_pair(&xs, &ys, 2).unwrap();

    let first = results.first().unwrap();
    let last = results.last().unwrap();
    assert_eq!(first.lib_size, 26);
    assert_eq!(last.lib_size, 374);

    // x drives y, so estimating x from y's attractor converges.
    assert!(
        last.y_xmap_x > first.y_xmap_x,
        "no convergence: {} -> {}",
        first.y_xmap_x,
        last.y_xmap_x
    );
    assert!(last.y_xmap_x > 0.5, "y_xmap_x = {}", last.y_xmap_x);
}

#[test]
fn test_causal_direction_dominates() {
    let (xs, ys) = coupled_logistic(400);
    let results = ccm_pair(&xs, &ys, 2).unwrap();
    let last = results.last().unwrap();

    // y never feeds back into x, so the reverse mapping stays weaker.
    assert!(
        last.y_xmap_x > last.x_xmap_y,
        "y_xmap_x = {}, x_xmap_y = {}",
        last.y_xmap_x,
        last.x_xmap_y
    );
}

#[test]
fn test_pair_rejects_short_series() {
    let (xs, ys) = coupled_logistic(40);
    assert!(ccm_pair(&xs, &ys, 2).is_err());
}
