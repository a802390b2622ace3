use crate::scoring::ScoreContext;

/// Taux d'apparition à partir duquel le score sature à 1.
const SATURATION: f64 = 0.2;

pub fn score(ctx: &ScoreContext<'_>) -> f64 {
    let size = ctx.shared.history_size();
    if size == 0 {
        return 0.0;
    }
    let rate = ctx.shared.appearances(ctx.side, ctx.number) as f64 / size as f64;
    (rate / SATURATION).min(1.0)
}
