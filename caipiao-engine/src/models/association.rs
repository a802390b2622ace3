use std::collections::HashMap;

use crate::scoring::ScoreContext;

const SATURATION: f64 = 0.1;

/// Co-occurrence moyenne avec les autres numéros, rapportée à la taille de l'historique.
pub fn score(ctx: &ScoreContext<'_>) -> f64 {
    let history = ctx.history();
    if history.is_empty() {
        return 0.0;
    }

    let mut co_occurrences: HashMap<&str, u32> = HashMap::new();
    for draw in history.iter().filter(|d| ctx.drawn_in(d)) {
        for other in ctx.side.numbers_from(draw) {
            if other != ctx.number {
                *co_occurrences.entry(other.as_str()).or_insert(0) += 1;
            }
        }
    }
    if co_occurrences.is_empty() {
        return 0.0;
    }

    let mean = co_occurrences.values().map(|&c| c as f64).sum::<f64>() / co_occurrences.len() as f64;
    (mean / history.len() as f64 / SATURATION).min(1.0)
}
