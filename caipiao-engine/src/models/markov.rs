use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use caipiao_db::models::{DrawResult, Side};

use crate::scoring::ScoreContext;

type MemoKey = (String, String, Side);

/// Mémo des probabilités de transition, clé (état, numéro, côté).
/// Vit aussi longtemps que le moteur, vidé par `clear`.
#[derive(Debug, Default)]
pub struct MarkovMemo {
    entries: Mutex<HashMap<MemoKey, f64>>,
}

impl MarkovMemo {
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn get_or_compute(&self, key: MemoKey, compute: impl FnOnce() -> f64) -> f64 {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        *entries.entry(key).or_insert_with(compute)
    }
}

/// État d'un tirage : ses numéros triés, joints par des virgules.
pub fn state_of(draw: &DrawResult, side: Side) -> String {
    let mut numbers = side.numbers_from(draw).to_vec();
    numbers.sort();
    numbers.join(",")
}

/// P(numéro au tirage suivant | état). `None` si l'état n'a jamais eu de successeur.
/// Les transitions vont dans le sens du temps : l'état est le tirage ancien, l'issue le tirage qui le suit.
pub fn transition_probability(history: &[DrawResult], side: Side, state: &str, number: &str) -> Option<f64> {
    let mut occurrences = 0u32;
    let mut transitions = 0u32;
    // history[i + 1] précède history[i] dans le temps.
    for pair in history.windows(2) {
        let (next, previous) = (&pair[0], &pair[1]);
        if state_of(previous, side) == state {
            occurrences += 1;
            if side.numbers_from(next).iter().any(|n| n == number) {
                transitions += 1;
            }
        }
    }
    (occurrences > 0).then(|| transitions as f64 / occurrences as f64)
}

pub fn score(ctx: &ScoreContext<'_>) -> f64 {
    let history = ctx.history();
    if history.len() < 2 {
        return 0.5;
    }
    let state = state_of(&history[0], ctx.side);
    let key = (state.clone(), ctx.number.to_string(), ctx.side);
    ctx.markov
        .get_or_compute(key, || {
            transition_probability(history, ctx.side, &state, ctx.number).unwrap_or(0.5)
        })
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ssq_draw;
    use crate::scoring::SharedData;

    const A: [&str; 6] = ["01", "02", "03", "04", "05", "06"];
    const B: [&str; 6] = ["07", "08", "09", "10", "11", "12"];
    const C: [&str; 6] = ["01", "13", "14", "15", "16", "17"];

    #[test]
    fn test_state_is_sorted() {
        let draw = ssq_draw(&["12", "03", "07", "01", "30", "22"], &["05"]);
        assert_eq!(state_of(&draw, Side::Primary), "01,03,07,12,22,30");
        assert_eq!(state_of(&draw, Side::Secondary), "05");
    }

    #[test]
    fn test_transition_counts_successors() {
        // Chronologie : A → B → A → C → A (le plus récent). Après A : B puis C.
        let history = vec![
            ssq_draw(&A, &["01"]),
            ssq_draw(&C, &["01"]),
            ssq_draw(&A, &["01"]),
            ssq_draw(&B, &["01"]),
            ssq_draw(&A, &["01"]),
        ];
        let state = state_of(&history[0], Side::Primary);
        assert_eq!(transition_probability(&history, Side::Primary, &state, "07"), Some(0.5));
        assert_eq!(transition_probability(&history, Side::Primary, &state, "01"), Some(0.5));
        assert_eq!(transition_probability(&history, Side::Primary, &state, "02"), Some(0.0));
    }

    #[test]
    fn test_transition_runs_forward_in_time() {
        // Chronologie : A → B, B le plus récent.
        let history = vec![ssq_draw(&B, &["01"]), ssq_draw(&A, &["01"])];
        let a = state_of(&history[1], Side::Primary);
        let b = state_of(&history[0], Side::Primary);
        assert_eq!(transition_probability(&history, Side::Primary, &a, "07"), Some(1.0));
        assert_eq!(transition_probability(&history, Side::Primary, &a, "01"), Some(0.0));
        assert_eq!(transition_probability(&history, Side::Primary, &b, "01"), None);
    }

    #[test]
    fn test_unseen_state_is_neutral() {
        let history = vec![ssq_draw(&C, &["01"]), ssq_draw(&B, &["01"]), ssq_draw(&A, &["01"])];
        let shared = SharedData::new(&history, 10);
        let memo = MarkovMemo::default();
        let ctx = ScoreContext { number: "07", side: Side::Primary, shared: &shared, markov: &memo };
        assert_eq!(score(&ctx), 0.5);
    }

    #[test]
    fn test_memoized_and_cleared() {
        let history = vec![
            ssq_draw(&A, &["01"]),
            ssq_draw(&B, &["01"]),
            ssq_draw(&A, &["01"]),
        ];
        let shared = SharedData::new(&history, 10);
        let memo = MarkovMemo::default();
        for number in ["01", "07", "01"] {
            let ctx = ScoreContext { number, side: Side::Primary, shared: &shared, markov: &memo };
            score(&ctx);
        }
        assert_eq!(memo.len(), 2);

        let ctx = ScoreContext { number: "07", side: Side::Primary, shared: &shared, markov: &memo };
        assert_eq!(score(&ctx), 1.0);

        memo.clear();
        assert!(memo.is_empty());
    }

    #[test]
    fn test_short_history() {
        let history = vec![ssq_draw(&A, &["01"])];
        let shared = SharedData::new(&history, 10);
        let memo = MarkovMemo::default();
        let ctx = ScoreContext { number: "01", side: Side::Primary, shared: &shared, markov: &memo };
        assert_eq!(score(&ctx), 0.5);
        assert!(memo.is_empty());
    }
}
