use crate::models::{association, frequency, omission, trend};
use crate::scoring::ScoreContext;

const SELECTION_PRESSURE: f64 = 1.5;

/// Fitness pondérée de quatre dimensions, accentuée par la pression de sélection.
pub fn score(ctx: &ScoreContext<'_>) -> f64 {
    let fitness = 0.3 * frequency::score(ctx)
        + 0.25 * omission::score(ctx)
        + 0.25 * trend::score(ctx)
        + 0.2 * association::score(ctx);
    fitness.powf(SELECTION_PRESSURE).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::markov::MarkovMemo;
    use crate::models::make_test_draws;
    use crate::scoring::SharedData;
    use caipiao_db::models::{Game, Side};

    #[test]
    fn test_matches_components() {
        let draws = make_test_draws(Game::Ssq, 30);
        let shared = SharedData::new(&draws, 10);
        let memo = MarkovMemo::default();
        for number in ["01", "10", "17", "33"] {
            let ctx = ScoreContext { number, side: Side::Primary, shared: &shared, markov: &memo };
            let fitness = 0.3 * frequency::score(&ctx)
                + 0.25 * omission::score(&ctx)
                + 0.25 * trend::score(&ctx)
                + 0.2 * association::score(&ctx);
            let g = score(&ctx);
            assert!((g - fitness.powf(1.5)).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&g));
            assert!(g <= fitness + 1e-12);
        }
    }
}
