use crate::models::draws_containing;
use crate::scoring::ScoreContext;

/// Écart de fréquence qui sature le score (±0.2 → 0 ou 1).
const SPREAD: f64 = 0.2;

pub fn score(ctx: &ScoreContext<'_>) -> f64 {
    let recent = ctx.shared.recent;
    let older = ctx.shared.older;
    if older.is_empty() || recent.is_empty() {
        return 0.5;
    }
    let recent_freq = draws_containing(recent, ctx.side, ctx.number) as f64 / recent.len() as f64;
    let older_freq = draws_containing(older, ctx.side, ctx.number) as f64 / older.len() as f64;
    ((recent_freq - older_freq + SPREAD) / (2.0 * SPREAD)).clamp(0.0, 1.0)
}
