use caipiao_db::models::{DrawResult, Side};

use crate::scoring::ScoreContext;

fn drawn(draw: &DrawResult, side: Side, number: &str) -> bool {
    side.numbers_from(draw).iter().any(|n| n == number)
}

/// Tirages écoulés depuis la dernière sortie (taille de l'historique si jamais sorti).
pub fn current_omission(history: &[DrawResult], side: Side, number: &str) -> usize {
    history
        .iter()
        .position(|d| drawn(d, side, number))
        .unwrap_or(history.len())
}

/// Plus longue absence, série finale comprise. Parcours du plus ancien au plus récent.
pub fn max_omission(history: &[DrawResult], side: Side, number: &str) -> usize {
    let mut max = 0;
    let mut streak = 0;
    for draw in history.iter().rev() {
        if drawn(draw, side, number) {
            max = max.max(streak);
            streak = 0;
        } else {
            streak += 1;
        }
    }
    max.max(streak)
}

/// Logistique centrée sur la moitié de l'absence maximale.
pub fn score(ctx: &ScoreContext<'_>) -> f64 {
    let history = ctx.history();
    let max = max_omission(history, ctx.side, ctx.number);
    if max == 0 {
        return 0.5;
    }
    let ratio = current_omission(history, ctx.side, ctx.number) as f64 / max as f64;
    1.0 / (1.0 + (-5.0 * (ratio - 0.5)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::markov::MarkovMemo;
    use crate::models::ssq_draw;
    use crate::scoring::SharedData;

    /// 10 tirages, "07" présent aux indices donnés (0 = plus récent).
    fn history(hits: &[usize]) -> Vec<DrawResult> {
        (0..10)
            .map(|i| {
                if hits.contains(&i) {
                    ssq_draw(&["01", "07", "12", "20", "25", "30"], &["03"])
                } else {
                    ssq_draw(&["02", "08", "13", "21", "26", "31"], &["04"])
                }
            })
            .collect()
    }

    #[test]
    fn test_current_omission() {
        let h = history(&[0, 3, 7]);
        assert_eq!(current_omission(&h, Side::Primary, "07"), 0);
        let h = history(&[3, 7]);
        assert_eq!(current_omission(&h, Side::Primary, "07"), 3);
    }

    #[test]
    fn test_never_drawn() {
        let h = history(&[]);
        assert_eq!(current_omission(&h, Side::Primary, "07"), 10);
        assert_eq!(max_omission(&h, Side::Primary, "07"), 10);
    }

    #[test]
    fn test_max_includes_trailing_streak() {
        // Plus ancienne sortie à l'indice 7 : la série finale (0..=6 côté récent) vaut 7.
        let h = history(&[7]);
        assert_eq!(max_omission(&h, Side::Primary, "07"), 7);
        // Sorties 0 et 9 : l'absence intérieure de 8 domine.
        let h = history(&[0, 9]);
        assert_eq!(max_omission(&h, Side::Primary, "07"), 8);
    }

    #[test]
    fn test_score_shape() {
        let memo = MarkovMemo::default();

        let always = history(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let shared = SharedData::new(&always, 10);
        let ctx = ScoreContext { number: "07", side: Side::Primary, shared: &shared, markov: &memo };
        assert_eq!(score(&ctx), 0.5);

        let overdue = history(&[9]);
        let shared = SharedData::new(&overdue, 10);
        let ctx = ScoreContext { number: "07", side: Side::Primary, shared: &shared, markov: &memo };
        let expected = 1.0 / (1.0 + (-2.5f64).exp());
        assert!((score(&ctx) - expected).abs() < 1e-12);

        let fresh = history(&[0, 9]);
        let shared = SharedData::new(&fresh, 10);
        let ctx = ScoreContext { number: "07", side: Side::Primary, shared: &shared, markov: &memo };
        assert!(score(&ctx) < 0.1);
    }
}
