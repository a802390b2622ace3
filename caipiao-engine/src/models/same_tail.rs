use crate::scoring::ScoreContext;

const SATURATION: f64 = 0.1;

fn tail(number: &str) -> Option<char> {
    number.chars().last()
}

/// Part des tirages où un autre numéro partage le dernier chiffre.
pub fn score(ctx: &ScoreContext<'_>) -> f64 {
    let history = ctx.history();
    if history.is_empty() {
        return 0.0;
    }
    let own = tail(ctx.number);
    let hits = history
        .iter()
        .filter(|d| ctx.drawn_in(d))
        .filter(|d| {
            ctx.side
                .numbers_from(d)
                .iter()
                .any(|n| n != ctx.number && tail(n) == own)
        })
        .count();
    (hits as f64 / history.len() as f64 / SATURATION).min(1.0)
}
