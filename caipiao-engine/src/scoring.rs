use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use caipiao_db::models::{DrawResult, GameProfile, Side};

use crate::algorithms::Algorithm;
use crate::models::markov::MarkovMemo;
use crate::models::sequence::SequenceProbabilities;

pub type ScoreFn = fn(&ScoreContext<'_>) -> f64;

/// Agrégats calculés une fois par génération et partagés par toutes les notations.
pub struct SharedData<'a> {
    /// history[0] = tirage le plus récent.
    pub history: &'a [DrawResult],
    pub recent: &'a [DrawResult],
    pub older: &'a [DrawResult],
    primary_frequency: HashMap<String, u32>,
    secondary_frequency: HashMap<String, u32>,
    /// Probabilités du modèle de séquence, interrogé une seule fois par génération.
    pub sequence: Option<SequenceProbabilities>,
    pub sequence_min_history: usize,
}

fn count_numbers(history: &[DrawResult], side: Side) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for draw in history {
        for n in side.numbers_from(draw) {
            *counts.entry(n.clone()).or_insert(0) += 1;
        }
    }
    counts
}

impl<'a> SharedData<'a> {
    pub fn new(history: &'a [DrawResult], window: usize) -> Self {
        let recent_end = window.min(history.len());
        let older_end = (2 * window).min(history.len());
        Self {
            history,
            recent: &history[..recent_end],
            older: &history[recent_end..older_end],
            primary_frequency: count_numbers(history, Side::Primary),
            secondary_frequency: count_numbers(history, Side::Secondary),
            sequence: None,
            sequence_min_history: 10,
        }
    }

    pub fn with_sequence(mut self, sequence: Option<SequenceProbabilities>, min_history: usize) -> Self {
        self.sequence = sequence;
        self.sequence_min_history = min_history;
        self
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    pub fn appearances(&self, side: Side, number: &str) -> u32 {
        let map = match side {
            Side::Primary => &self.primary_frequency,
            Side::Secondary => &self.secondary_frequency,
        };
        map.get(number).copied().unwrap_or(0)
    }
}

/// Entrée d'une fonction de notation : un numéro d'un côté, plus les agrégats du run.
pub struct ScoreContext<'a> {
    pub number: &'a str,
    pub side: Side,
    pub shared: &'a SharedData<'a>,
    pub markov: &'a MarkovMemo,
}

impl<'a> ScoreContext<'a> {
    pub fn history(&self) -> &'a [DrawResult] {
        self.shared.history
    }

    pub fn drawn_in(&self, draw: &DrawResult) -> bool {
        self.side.numbers_from(draw).iter().any(|n| n == self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberScore {
    pub number: String,
    /// Scores en [0, 1] des algorithmes actifs.
    pub scores: BTreeMap<Algorithm, f64>,
    pub total_score: f64,
}

impl NumberScore {
    /// 0 pour un algorithme inactif ; BALANCE renvoie le score fusionné.
    pub fn score(&self, algorithm: Algorithm) -> f64 {
        if algorithm == Algorithm::Balance {
            return self.total_score;
        }
        self.scores.get(&algorithm).copied().unwrap_or(0.0)
    }
}

/// Moyenne des seuls scores strictement positifs.
pub fn fuse(scores: &BTreeMap<Algorithm, f64>) -> f64 {
    let active: Vec<f64> = scores.values().copied().filter(|&s| s > 0.0).collect();
    if active.is_empty() {
        return 0.0;
    }
    active.iter().sum::<f64>() / active.len() as f64
}

pub fn score_number(
    number: &str,
    side: Side,
    algorithms: &BTreeSet<Algorithm>,
    shared: &SharedData<'_>,
    markov: &MarkovMemo,
) -> NumberScore {
    let ctx = ScoreContext { number, side, shared, markov };
    let scores: BTreeMap<Algorithm, f64> = algorithms
        .iter()
        .filter_map(|algo| algo.scorer().map(|f| (*algo, f(&ctx))))
        .collect();
    let total_score = fuse(&scores);
    NumberScore {
        number: number.to_string(),
        scores,
        total_score,
    }
}

/// Note tous les numéros d'un côté. Vide si le jeu n'a pas ce côté.
pub fn score_side(
    profile: &GameProfile,
    side: Side,
    algorithms: &BTreeSet<Algorithm>,
    shared: &SharedData<'_>,
    markov: &MarkovMemo,
) -> BTreeMap<String, NumberScore> {
    if profile.count(side) == 0 {
        return BTreeMap::new();
    }
    profile
        .numbers(side)
        .into_iter()
        .map(|n| {
            let score = score_number(&n, side, algorithms, shared, markov);
            (n, score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::make_test_draws;
    use caipiao_db::models::Game;

    #[test]
    fn test_windows() {
        let draws = make_test_draws(Game::Ssq, 25);
        let shared = SharedData::new(&draws, 10);
        assert_eq!(shared.recent.len(), 10);
        assert_eq!(shared.older.len(), 10);
        assert_eq!(shared.recent[0].issue, draws[0].issue);
        assert_eq!(shared.older[0].issue, draws[10].issue);

        let short = make_test_draws(Game::Ssq, 12);
        let shared = SharedData::new(&short, 10);
        assert_eq!(shared.older.len(), 2);
    }

    #[test]
    fn test_fuse_ignores_zeros() {
        let mut scores = BTreeMap::new();
        scores.insert(Algorithm::Frequency, 0.0);
        scores.insert(Algorithm::Omission, 0.8);
        scores.insert(Algorithm::Trend, 0.4);
        assert!((fuse(&scores) - 0.6).abs() < 1e-12);

        scores.clear();
        scores.insert(Algorithm::Frequency, 0.0);
        assert_eq!(fuse(&scores), 0.0);
        assert_eq!(fuse(&BTreeMap::new()), 0.0);
    }

    #[test]
    fn test_frequency_only_zero_total() {
        // "33" n'apparaît jamais : fréquence 0, et aucun autre score ne s'y mêle.
        let draws: Vec<DrawResult> = make_test_draws(Game::Ssq, 20)
            .into_iter()
            .filter(|d| !d.primary.contains(&"33".to_string()))
            .collect();
        let shared = SharedData::new(&draws, 10);
        let algorithms: BTreeSet<Algorithm> = [Algorithm::Frequency].into_iter().collect();
        let score = score_number("33", Side::Primary, &algorithms, &shared, &MarkovMemo::default());
        assert_eq!(score.total_score, 0.0);
        assert!(!score.total_score.is_nan());
        assert_eq!(score.scores.len(), 1);
    }

    #[test]
    fn test_score_side_covers_range() {
        let draws = make_test_draws(Game::Cjdlt, 20);
        let shared = SharedData::new(&draws, 10);
        let algorithms: BTreeSet<Algorithm> = [Algorithm::Frequency, Algorithm::Balance].into_iter().collect();
        let memo = MarkovMemo::default();
        let profile = Game::Cjdlt.profile();

        let primary = score_side(&profile, Side::Primary, &algorithms, &shared, &memo);
        let secondary = score_side(&profile, Side::Secondary, &algorithms, &shared, &memo);
        assert_eq!(primary.len(), 35);
        assert_eq!(secondary.len(), 12);
        assert!(primary.contains_key("01") && primary.contains_key("35"));

        let none = score_side(&Game::Fc3d.profile(), Side::Secondary, &algorithms, &shared, &memo);
        assert!(none.is_empty());
    }

    #[test]
    fn test_balance_reads_total() {
        let mut scores = BTreeMap::new();
        scores.insert(Algorithm::Frequency, 0.5);
        let ns = NumberScore { number: "01".into(), total_score: fuse(&scores), scores };
        assert_eq!(ns.score(Algorithm::Balance), 0.5);
        assert_eq!(ns.score(Algorithm::Markov), 0.0);
    }
}
