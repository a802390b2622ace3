use caipiao_db::models::{pad_number, parse_number};

use crate::scoring::ScoreContext;

const SATURATION: f64 = 0.15;

/// Part des tirages où le numéro sort avec un voisin immédiat (n-1 ou n+1).
pub fn score(ctx: &ScoreContext<'_>) -> f64 {
    let history = ctx.history();
    let Ok(n) = parse_number(ctx.number) else {
        return 0.0;
    };
    if history.is_empty() {
        return 0.0;
    }
    let neighbours: Vec<String> = [n.checked_sub(1), n.checked_add(1)]
        .into_iter()
        .flatten()
        .map(pad_number)
        .collect();

    let hits = history
        .iter()
        .filter(|d| ctx.drawn_in(d))
        .filter(|d| ctx.side.numbers_from(d).iter().any(|x| neighbours.contains(x)))
        .count();
    (hits as f64 / history.len() as f64 / SATURATION).min(1.0)
}
