use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, warn};

use caipiao_db::models::{pad_number, parse_number, DrawResult, Game, GameProfile, Side};

use crate::algorithms::Algorithm;
use crate::config::EngineConfig;
use crate::models::markov::MarkovMemo;
use crate::models::sequence::{PredictorFactory, SequenceProbabilities, SequenceSource};
use crate::optimizer::{self, Bands};
use crate::scoring::{score_side, NumberScore, SharedData};
use crate::selection::{combinations, optimal_pool_sizes, select_by_weight, select_complex};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub id: String,
    pub game: Game,
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    /// Score du ticket en [0, 100].
    pub total_score: f64,
    pub algorithm_scores: BTreeMap<Algorithm, f64>,
    /// total_score / 100.
    pub confidence: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexPredictionResult {
    pub id: String,
    pub game: Game,
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    pub total_score: f64,
    pub algorithm_scores: BTreeMap<Algorithm, f64>,
    pub confidence: f64,
    pub explanation: String,
    pub combination_count: u64,
    /// Score moyen des numéros retenus, en [0, 1].
    pub coverage_rate: f64,
    pub hot_numbers: Vec<String>,
    pub cold_numbers: Vec<String>,
}

/// Scores des deux côtés pour un run.
struct ScoredSides {
    primary: BTreeMap<String, NumberScore>,
    secondary: BTreeMap<String, NumberScore>,
}

impl ScoredSides {
    fn side(&self, side: Side) -> &BTreeMap<String, NumberScore> {
        match side {
            Side::Primary => &self.primary,
            Side::Secondary => &self.secondary,
        }
    }
}

/// Moteur de prédiction. Possède le mémo Markov, les modèles de séquence résolus par jeu
/// et le générateur aléatoire ; partageable derrière un `Arc`.
pub struct PredictionEngine {
    config: EngineConfig,
    markov: MarkovMemo,
    predictors: Mutex<HashMap<Game, SequenceSource>>,
    factory: Option<PredictorFactory>,
    rng: Mutex<StdRng>,
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Générateur déterministe, pour des tirages reproductibles.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            config: EngineConfig::default(),
            markov: MarkovMemo::default(),
            predictors: Mutex::new(HashMap::new()),
            factory: None,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_predictor_factory(mut self, factory: PredictorFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Vide le mémo Markov et oublie les modèles de séquence résolus.
    pub fn clear_caches(&self) {
        self.markov.clear();
        self.predictors.lock().unwrap_or_else(PoisonError::into_inner).clear();
        debug!("caches du moteur vidés");
    }

    pub fn generate_predictions(
        &self,
        history: &[DrawResult],
        game: Game,
        algorithms: &BTreeSet<Algorithm>,
        count: usize,
    ) -> Vec<PredictionResult> {
        let Some(scored) = self.score_sides(history, game, algorithms) else {
            return vec![];
        };
        let profile = game.profile();
        let bands = self.bands(Bands::SIMPLE);
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        (1..=count)
            .map(|index| {
                let primary = select_by_weight(&scored.primary, profile.primary_count, &mut *rng);
                let secondary = select_by_weight(&scored.secondary, profile.secondary_count, &mut *rng);
                let primary = optimize_side(&primary, &profile, algorithms, &bands, &mut *rng);

                let bonus = side_bonus(&primary, &profile, algorithms, &bands);
                let total_score = ticket_score(&scored, &primary, &secondary, bonus);

                PredictionResult {
                    id: format!("pred_{}", index),
                    game,
                    algorithm_scores: algorithm_scores(&scored, &primary, &secondary, algorithms),
                    explanation: self.explain(&scored, &primary),
                    primary: ordered(primary, profile.sorted),
                    secondary: ordered(secondary, profile.sorted),
                    total_score,
                    confidence: total_score / 100.0,
                }
            })
            .collect()
    }

    /// Un ticket multiple dimensionné pour atteindre `target` combinaisons.
    pub fn generate_complex_predictions(
        &self,
        history: &[DrawResult],
        game: Game,
        algorithms: &BTreeSet<Algorithm>,
        target: u64,
    ) -> Vec<ComplexPredictionResult> {
        let Some(scored) = self.score_sides(history, game, algorithms) else {
            return vec![];
        };
        let profile = game.profile();
        let (primary_pool, secondary_pool) =
            optimal_pool_sizes(profile.primary_count, profile.secondary_count, target);
        debug!(%game, target, primary_pool, secondary_pool, "taille du ticket multiple");

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let primary = select_complex(&scored.primary, primary_pool, &mut *rng);
        let secondary = select_complex(&scored.secondary, secondary_pool, &mut *rng);

        if primary.is_empty() && secondary.is_empty() {
            return vec![ComplexPredictionResult {
                id: "complex_1".into(),
                game,
                primary: vec![],
                secondary: vec![],
                total_score: 0.0,
                algorithm_scores: BTreeMap::new(),
                confidence: 0.0,
                explanation: "Impossible de générer un ticket multiple".into(),
                combination_count: 0,
                coverage_rate: 0.0,
                hot_numbers: vec![],
                cold_numbers: vec![],
            }];
        }

        let bands = self.bands(Bands::COMPLEX);
        let primary = optimize_side(&primary, &profile, algorithms, &bands, &mut *rng);
        let bonus = side_bonus(&primary, &profile, algorithms, &bands);
        let total_score = ticket_score(&scored, &primary, &secondary, bonus);

        let combination_count = realized_combinations(&profile, primary.len(), secondary.len());
        let coverage_rate = coverage(&scored, &primary, &secondary);
        let threshold = |pred: &dyn Fn(f64) -> bool| -> Vec<String> {
            primary
                .iter()
                .filter(|n| pred(total_of(&scored.primary, n)))
                .cloned()
                .collect()
        };
        let hot_numbers = threshold(&|s| s > self.config.hot_threshold);
        let cold_numbers = threshold(&|s| s < self.config.cold_threshold);

        let explanation = {
            let mut parts = Vec::new();
            if !hot_numbers.is_empty() {
                parts.push(format!("Chauds : {}", hot_numbers.join(",")));
            }
            if !cold_numbers.is_empty() {
                parts.push(format!("Froids : {}", cold_numbers.join(",")));
            }
            parts.extend(shape_parts(&primary));
            parts.push(format!("Combinaisons={}", combination_count));
            parts.push(format!("Couverture={}%", (coverage_rate * 100.0) as u32));
            parts.join(" | ")
        };

        vec![ComplexPredictionResult {
            id: "complex_1".into(),
            game,
            algorithm_scores: algorithm_scores(&scored, &primary, &secondary, algorithms),
            primary: ordered(primary, profile.sorted),
            secondary: ordered(secondary, profile.sorted),
            total_score,
            confidence: total_score / 100.0,
            explanation,
            combination_count,
            coverage_rate,
            hot_numbers: ordered(hot_numbers, profile.sorted),
            cold_numbers: ordered(cold_numbers, profile.sorted),
        }]
    }

    // ════════════════════════════════════════════════════════════════
    // Interne
    // ════════════════════════════════════════════════════════════════

    fn score_sides(
        &self,
        history: &[DrawResult],
        game: Game,
        algorithms: &BTreeSet<Algorithm>,
    ) -> Option<ScoredSides> {
        if history.len() < self.config.min_history {
            warn!(
                %game,
                draws = history.len(),
                required = self.config.min_history,
                "historique insuffisant, aucune prédiction"
            );
            return None;
        }

        let profile = game.profile();
        let sequence = self.sequence_probabilities(history, game, algorithms);
        let shared = SharedData::new(history, self.config.window)
            .with_sequence(sequence, self.config.sequence_min_history);

        Some(ScoredSides {
            primary: score_side(&profile, Side::Primary, algorithms, &shared, &self.markov),
            secondary: score_side(&profile, Side::Secondary, algorithms, &shared, &self.markov),
        })
    }

    fn bands(&self, base: Bands) -> Bands {
        base.with_zone_count(self.config.zone_count)
    }

    /// Interroge le modèle de séquence une seule fois par run, résolu paresseusement par jeu.
    fn sequence_probabilities(
        &self,
        history: &[DrawResult],
        game: Game,
        algorithms: &BTreeSet<Algorithm>,
    ) -> Option<SequenceProbabilities> {
        if !algorithms.contains(&Algorithm::Lstm) {
            return None;
        }
        let mut predictors = self.predictors.lock().unwrap_or_else(PoisonError::into_inner);
        let source = predictors
            .entry(game)
            .or_insert_with(|| SequenceSource::resolve(self.factory.as_ref(), game));
        source.probabilities(history, self.config.sequence_min_history)
    }

    fn explain(&self, scored: &ScoredSides, primary: &[String]) -> String {
        let threshold = self.config.explanation_threshold;
        let above = |algorithm: Algorithm| -> Vec<String> {
            primary
                .iter()
                .filter(|n| {
                    scored
                        .primary
                        .get(n.as_str())
                        .is_some_and(|s| s.score(algorithm) > threshold)
                })
                .cloned()
                .collect()
        };

        let mut parts = Vec::new();
        for (algorithm, label) in [
            (Algorithm::Frequency, "Fréquence élevée"),
            (Algorithm::Omission, "Rebond d'absence"),
            (Algorithm::Trend, "Tendance ↑"),
        ] {
            let numbers = above(algorithm);
            if !numbers.is_empty() {
                parts.push(format!("{} : {}", label, numbers.join(",")));
            }
        }
        parts.extend(shape_parts(primary));
        parts.join(" | ")
    }
}

fn parse_all(numbers: &[String]) -> Vec<u8> {
    numbers.iter().filter_map(|n| parse_number(n).ok()).collect()
}

fn optimize_side<R: rand::Rng + ?Sized>(
    numbers: &[String],
    profile: &GameProfile,
    algorithms: &BTreeSet<Algorithm>,
    bands: &Bands,
    rng: &mut R,
) -> Vec<String> {
    let parsed = parse_all(numbers);
    optimizer::optimize(&parsed, &profile.primary_range, algorithms, bands, rng)
        .into_iter()
        .map(pad_number)
        .collect()
}

fn side_bonus(numbers: &[String], profile: &GameProfile, algorithms: &BTreeSet<Algorithm>, bands: &Bands) -> f64 {
    optimizer::bonus(&parse_all(numbers), &profile.primary_range, algorithms, bands)
}

fn total_of(scores: &BTreeMap<String, NumberScore>, number: &str) -> f64 {
    scores.get(number).map(|s| s.total_score).unwrap_or(0.0)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn average_total(scores: &BTreeMap<String, NumberScore>, numbers: &[String]) -> f64 {
    mean(numbers.iter().filter_map(|n| scores.get(n).map(|s| s.total_score)))
}

/// (moy. principale × 0.7 + moy. secondaire × 0.3) × (1 + bonus) × 100, borné à [0, 100].
fn ticket_score(scored: &ScoredSides, primary: &[String], secondary: &[String], bonus: f64) -> f64 {
    let primary_avg = average_total(&scored.primary, primary);
    let base = if secondary.is_empty() {
        primary_avg
    } else {
        primary_avg * 0.7 + average_total(&scored.secondary, secondary) * 0.3
    };
    (base * (1.0 + bonus) * 100.0).clamp(0.0, 100.0)
}

/// Moyenne × 100 du score de chaque algorithme sur les numéros retenus, côté par côté.
fn algorithm_scores(
    scored: &ScoredSides,
    primary: &[String],
    secondary: &[String],
    algorithms: &BTreeSet<Algorithm>,
) -> BTreeMap<Algorithm, f64> {
    algorithms
        .iter()
        .map(|&algorithm| {
            let values = [(Side::Primary, primary), (Side::Secondary, secondary)]
                .into_iter()
                .flat_map(|(side, numbers)| {
                    let scores = scored.side(side);
                    numbers.iter().filter_map(move |n| scores.get(n).map(|s| s.score(algorithm)))
                });
            (algorithm, mean(values) * 100.0)
        })
        .collect()
}

fn realized_combinations(profile: &GameProfile, primary_len: usize, secondary_len: usize) -> u64 {
    [
        (primary_len, profile.primary_count),
        (secondary_len, profile.secondary_count),
    ]
    .into_iter()
    .filter(|&(pool, base)| pool > base)
    .map(|(pool, base)| combinations(pool, base))
    .fold(1u64, u64::saturating_mul)
}

fn coverage(scored: &ScoredSides, primary: &[String], secondary: &[String]) -> f64 {
    let selected = primary.len() + secondary.len();
    if selected == 0 {
        return 0.0;
    }
    let total: f64 = primary.iter().map(|n| total_of(&scored.primary, n)).sum::<f64>()
        + secondary.iter().map(|n| total_of(&scored.secondary, n)).sum::<f64>();
    (total / selected as f64).clamp(0.0, 1.0)
}

fn shape_parts(primary: &[String]) -> Vec<String> {
    let numbers = parse_all(primary);
    let sum: u32 = numbers.iter().map(|&n| u32::from(n)).sum();
    let span = match (numbers.iter().min(), numbers.iter().max()) {
        (Some(lo), Some(hi)) => hi - lo,
        _ => 0,
    };
    vec![format!("Somme={}", sum), format!("Écart={}", span)]
}

/// Tri croissant pour les jeux non positionnels ; ordre de tirage conservé sinon.
fn ordered(mut numbers: Vec<String>, sorted: bool) -> Vec<String> {
    if sorted {
        numbers.sort();
    }
    numbers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Preset;
    use crate::models::make_test_draws;
    use crate::models::sequence::{PredictorError, SequencePredictor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn preset(p: Preset) -> BTreeSet<Algorithm> {
        p.algorithms()
    }

    fn is_ascending(numbers: &[String]) -> bool {
        numbers.windows(2).all(|w| w[0] <= w[1])
    }

    #[test]
    fn test_insufficient_history_is_empty() {
        let engine = PredictionEngine::with_seed(1);
        let algos = preset(Preset::Comprehensive);
        assert!(engine.generate_predictions(&[], Game::Ssq, &algos, 5).is_empty());
        let short = make_test_draws(Game::Ssq, 19);
        assert!(engine.generate_predictions(&short, Game::Ssq, &algos, 5).is_empty());
        assert!(engine.generate_complex_predictions(&short, Game::Ssq, &algos, 7).is_empty());
    }

    #[test]
    fn test_exact_count_and_shape() {
        let engine = PredictionEngine::with_seed(2);
        let draws = make_test_draws(Game::Ssq, 20);
        let preds = engine.generate_predictions(&draws, Game::Ssq, &preset(Preset::Comprehensive), 5);
        assert_eq!(preds.len(), 5);
        for (i, p) in preds.iter().enumerate() {
            assert_eq!(p.id, format!("pred_{}", i + 1));
            assert_eq!(p.primary.len(), 6);
            assert_eq!(p.secondary.len(), 1);
            assert!(is_ascending(&p.primary));
            let mut distinct = p.primary.clone();
            distinct.dedup();
            assert_eq!(distinct.len(), 6);
            assert!((0.0..=100.0).contains(&p.total_score));
            assert!((p.confidence - p.total_score / 100.0).abs() < 1e-12);
            assert!(p.explanation.contains("Somme="));
            assert_eq!(p.algorithm_scores.len(), preset(Preset::Comprehensive).len());
            assert!(p.algorithm_scores.values().all(|v| (0.0..=100.0).contains(v)));
        }
    }

    #[test]
    fn test_positional_order_preserved() {
        let engine = PredictionEngine::with_seed(3);
        let draws = make_test_draws(Game::Fc3d, 40);
        let preds = engine.generate_predictions(&draws, Game::Fc3d, &preset(Preset::Probability), 30);
        assert_eq!(preds.len(), 30);
        assert!(preds.iter().all(|p| p.primary.len() == 3 && p.secondary.is_empty()));
        assert!(preds.iter().any(|p| !is_ascending(&p.primary)));
    }

    #[test]
    fn test_seed_reproducibility() {
        let draws = make_test_draws(Game::Cjdlt, 30);
        let algos = preset(Preset::Aggressive);
        let a = PredictionEngine::with_seed(9).generate_predictions(&draws, Game::Cjdlt, &algos, 3);
        let b = PredictionEngine::with_seed(9).generate_predictions(&draws, Game::Cjdlt, &algos, 3);
        assert_eq!(a, b);
    }

    fn fixed_scores() -> ScoredSides {
        let score = |n: &str, f: f64| NumberScore {
            number: n.to_string(),
            scores: [(Algorithm::Frequency, f)].into_iter().collect(),
            total_score: f,
        };
        ScoredSides {
            primary: [("01".to_string(), score("01", 0.2)), ("02".to_string(), score("02", 0.4))]
                .into_iter()
                .collect(),
            secondary: [("01".to_string(), score("01", 0.9))].into_iter().collect(),
        }
    }

    #[test]
    fn test_algorithm_scores_per_side() {
        let scored = fixed_scores();
        let algos: BTreeSet<Algorithm> =
            [Algorithm::Frequency, Algorithm::Trend, Algorithm::Balance].into_iter().collect();
        let primary = vec!["01".to_string(), "02".to_string()];
        let secondary = vec!["01".to_string()];
        let result = algorithm_scores(&scored, &primary, &secondary, &algos);
        // Le "01" secondaire garde son propre score : (0.2 + 0.4 + 0.9) / 3.
        assert!((result[&Algorithm::Frequency] - 50.0).abs() < 1e-9);
        assert!((result[&Algorithm::Balance] - 50.0).abs() < 1e-9);
        assert_eq!(result[&Algorithm::Trend], 0.0);
    }

    #[test]
    fn test_ticket_score_and_coverage() {
        let scored = fixed_scores();
        let primary = vec!["01".to_string(), "02".to_string()];
        let secondary = vec!["01".to_string()];
        // (0.3 × 0.7 + 0.9 × 0.3) × 1.1 × 100
        assert!((ticket_score(&scored, &primary, &secondary, 0.1) - 52.8).abs() < 1e-9);
        // Sans côté secondaire, seule la moyenne principale compte.
        assert!((ticket_score(&scored, &primary, &[], 0.0) - 30.0).abs() < 1e-9);
        assert!((coverage(&scored, &primary, &secondary) - 0.5).abs() < 1e-9);
        assert_eq!(coverage(&scored, &[], &[]), 0.0);
    }

    #[test]
    fn test_complex_ticket() {
        let engine = PredictionEngine::with_seed(5);
        let draws = make_test_draws(Game::Ssq, 30);
        let results = engine.generate_complex_predictions(&draws, Game::Ssq, &preset(Preset::Comprehensive), 7);
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.id, "complex_1");
        assert_eq!(r.primary.len(), 7);
        assert_eq!(r.secondary.len(), 1);
        assert_eq!(r.combination_count, 7);
        assert!((0.0..=1.0).contains(&r.coverage_rate));
        assert!(r.explanation.contains("Combinaisons=7"));
        assert!(is_ascending(&r.primary));
        assert!(r.hot_numbers.iter().all(|n| r.primary.contains(n)));
    }

    #[test]
    fn test_complex_two_sided_pool() {
        let engine = PredictionEngine::with_seed(6);
        let draws = make_test_draws(Game::Ssq, 30);
        let r = &engine.generate_complex_predictions(&draws, Game::Ssq, &preset(Preset::Probability), 28)[0];
        assert_eq!((r.primary.len(), r.secondary.len()), (7, 4));
        assert_eq!(r.combination_count, 28);
    }

    #[test]
    fn test_complex_without_secondary_side() {
        // 3D : seul le pool principal grandit, C(5,3) = 10.
        let engine = PredictionEngine::with_seed(8);
        let draws = make_test_draws(Game::Fc3d, 30);
        let r = &engine.generate_complex_predictions(&draws, Game::Fc3d, &preset(Preset::Comprehensive), 10)[0];
        assert_eq!(r.primary.len(), 5);
        assert!(r.secondary.is_empty());
        assert_eq!(r.combination_count, 10);
        assert!(r.explanation.contains("Combinaisons=10"));
        let mut distinct = r.primary.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 5);

        // KL8 : 20 numéros de base, au-delà du plafond, le ticket reste simple.
        let draws = make_test_draws(Game::Kl8, 30);
        let r = &engine.generate_complex_predictions(&draws, Game::Kl8, &preset(Preset::Comprehensive), 50)[0];
        assert_eq!(r.primary.len(), 20);
        assert!(r.secondary.is_empty());
        assert_eq!(r.combination_count, 1);
        assert!(is_ascending(&r.primary));
        assert!((0.0..=1.0).contains(&r.coverage_rate));
    }

    #[test]
    fn test_realized_combinations() {
        let ssq = Game::Ssq.profile();
        assert_eq!(realized_combinations(&ssq, 6, 1), 1);
        assert_eq!(realized_combinations(&ssq, 8, 1), 28);
        assert_eq!(realized_combinations(&ssq, 7, 3), 21);
        assert_eq!(realized_combinations(&Game::Pl5.profile(), 5, 0), 1);
    }

    #[test]
    fn test_markov_memo_and_clear() {
        let engine = PredictionEngine::with_seed(7);
        let draws = make_test_draws(Game::Ssq, 25);
        engine.generate_predictions(&draws, Game::Ssq, &preset(Preset::Probability), 1);
        // 33 numéros principaux + 16 secondaires.
        assert_eq!(engine.markov.len(), 49);
        engine.clear_caches();
        assert!(engine.markov.is_empty());
    }

    struct CountingPredictor {
        predicts: Arc<AtomicUsize>,
    }

    impl SequencePredictor for CountingPredictor {
        fn initialize(&mut self) -> bool {
            true
        }

        fn predict(&self, _last_draws: &[DrawResult]) -> Result<Option<SequenceProbabilities>, PredictorError> {
            self.predicts.fetch_add(1, Ordering::SeqCst);
            Ok(Some(SequenceProbabilities::default()))
        }
    }

    #[test]
    fn test_predictor_resolved_once_and_queried_once_per_run() {
        let built = Arc::new(AtomicUsize::new(0));
        let predicts = Arc::new(AtomicUsize::new(0));
        let (b, p) = (built.clone(), predicts.clone());
        let factory: PredictorFactory = Box::new(move |_game| {
            b.fetch_add(1, Ordering::SeqCst);
            Some(Box::new(CountingPredictor { predicts: p.clone() }) as Box<dyn SequencePredictor>)
        });
        let engine = PredictionEngine::with_seed(8).with_predictor_factory(factory);
        let draws = make_test_draws(Game::Ssq, 25);
        let lstm: BTreeSet<Algorithm> = [Algorithm::Lstm].into_iter().collect();

        engine.generate_predictions(&draws, Game::Ssq, &lstm, 3);
        engine.generate_predictions(&draws, Game::Ssq, &lstm, 3);
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(predicts.load(Ordering::SeqCst), 2);

        // Sans LSTM, le modèle n'est pas consulté.
        engine.generate_predictions(&draws, Game::Ssq, &preset(Preset::Conservative), 1);
        assert_eq!(predicts.load(Ordering::SeqCst), 2);

        engine.clear_caches();
        engine.generate_predictions(&draws, Game::Ssq, &lstm, 1);
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_probabilities_score_neutral() {
        let factory: PredictorFactory = Box::new(|_game| {
            Some(Box::new(CountingPredictor { predicts: Arc::new(AtomicUsize::new(0)) }) as Box<dyn SequencePredictor>)
        });
        let engine = PredictionEngine::with_seed(10).with_predictor_factory(factory);
        let draws = make_test_draws(Game::Ssq, 25);
        let lstm: BTreeSet<Algorithm> = [Algorithm::Lstm].into_iter().collect();
        let p = &engine.generate_predictions(&draws, Game::Ssq, &lstm, 1)[0];
        // Aucun numéro dans la carte : 0.5 partout.
        assert!((p.algorithm_scores[&Algorithm::Lstm] - 50.0).abs() < 1e-9);
        assert!((p.total_score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_config_min_history() {
        let config = EngineConfig { min_history: 30, ..EngineConfig::default() };
        let engine = PredictionEngine::with_seed(11).with_config(config);
        let draws = make_test_draws(Game::Ssq, 25);
        assert!(engine.generate_predictions(&draws, Game::Ssq, &preset(Preset::Conservative), 1).is_empty());
    }

    #[test]
    fn test_bands_use_configured_zone_count() {
        let engine = PredictionEngine::with_seed(12);
        assert_eq!(engine.bands(Bands::SIMPLE).zone_count, 3);

        let config = EngineConfig { zone_count: 5, ..EngineConfig::default() };
        let engine = PredictionEngine::with_seed(12).with_config(config);
        let simple = engine.bands(Bands::SIMPLE);
        assert_eq!(simple.zone_count, 5);
        assert_eq!(simple.zone_spread, Bands::SIMPLE.zone_spread);
        assert_eq!(engine.bands(Bands::COMPLEX).zone_count, 5);
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PredictionEngine>();
    }
}
