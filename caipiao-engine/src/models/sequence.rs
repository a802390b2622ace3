use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use caipiao_db::models::{DrawResult, Game, Side};

use crate::scoring::ScoreContext;

/// Nombre de tirages récents fournis au modèle de séquence.
pub const SEQUENCE_WINDOW: usize = 10;

/// Lissage exponentiel du repli.
const ALPHA: f64 = 0.3;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("modèle non initialisé")]
    NotInitialized,
    #[error("entrée invalide : {0}")]
    InvalidInput(String),
    #[error("échec de l'inférence : {0}")]
    Inference(String),
}

/// Probabilités par numéro, indexées par numéro formaté ("07").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceProbabilities {
    pub primary: HashMap<String, f64>,
    pub secondary: HashMap<String, f64>,
}

impl SequenceProbabilities {
    pub fn side(&self, side: Side) -> &HashMap<String, f64> {
        match side {
            Side::Primary => &self.primary,
            Side::Secondary => &self.secondary,
        }
    }
}

/// Modèle de séquence externe, boîte noire. Best effort : toute erreur bascule sur le repli.
pub trait SequencePredictor: Send {
    fn name(&self) -> &str {
        "sequence"
    }
    /// Chargement du modèle ; false s'il est indisponible.
    fn initialize(&mut self) -> bool;
    /// last_draws[0] = tirage le plus récent, au plus `SEQUENCE_WINDOW` tirages.
    fn predict(&self, last_draws: &[DrawResult]) -> Result<Option<SequenceProbabilities>, PredictorError>;
}

pub type PredictorFactory = Box<dyn Fn(Game) -> Option<Box<dyn SequencePredictor>> + Send + Sync>;

/// Stratégie résolue une fois par jeu : le modèle chargé, ou le repli EMA.
pub enum SequenceSource {
    Model(Box<dyn SequencePredictor>),
    Fallback,
}

impl SequenceSource {
    pub fn resolve(factory: Option<&PredictorFactory>, game: Game) -> Self {
        let Some(mut predictor) = factory.and_then(|f| f(game)) else {
            debug!(%game, "aucun modèle de séquence, repli EMA");
            return SequenceSource::Fallback;
        };
        if predictor.initialize() {
            debug!(%game, model = predictor.name(), "modèle de séquence chargé");
            SequenceSource::Model(predictor)
        } else {
            warn!(%game, model = predictor.name(), "échec d'initialisation du modèle de séquence, repli EMA");
            SequenceSource::Fallback
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, SequenceSource::Model(_))
    }

    /// Interroge le modèle. `None` signifie : utiliser le repli pour ce run.
    pub fn probabilities(&self, history: &[DrawResult], min_history: usize) -> Option<SequenceProbabilities> {
        let SequenceSource::Model(predictor) = self else {
            return None;
        };
        if history.len() < min_history.max(1) {
            return None;
        }
        let window = &history[..SEQUENCE_WINDOW.min(history.len())];
        match predictor.predict(window) {
            Ok(Some(probabilities)) => Some(probabilities),
            Ok(None) => {
                warn!(model = predictor.name(), "le modèle de séquence n'a rien produit, repli EMA");
                None
            }
            Err(e) => {
                warn!(model = predictor.name(), "prédiction de séquence en échec, repli EMA : {}", e);
                None
            }
        }
    }
}

/// Tendance par moyenne mobile exponentielle sur la série de présence chronologique.
pub fn fallback_score(ctx: &ScoreContext<'_>) -> f64 {
    let history = ctx.history();
    if history.is_empty() || history.len() < ctx.shared.sequence_min_history {
        return 0.5;
    }

    let sequence: Vec<f64> = history
        .iter()
        .rev()
        .map(|d| if ctx.drawn_in(d) { 1.0 } else { 0.0 })
        .collect();

    let ema = sequence[1..]
        .iter()
        .fold(sequence[0], |ema, &x| ALPHA * x + (1.0 - ALPHA) * ema);
    let mean = sequence.iter().sum::<f64>() / sequence.len() as f64;

    let trend = if mean > 0.0 {
        (ema / mean).clamp(0.0, 2.0) / 2.0
    } else {
        ema
    };
    trend.clamp(0.0, 1.0)
}

pub fn score(ctx: &ScoreContext<'_>) -> f64 {
    match &ctx.shared.sequence {
        Some(probabilities) => probabilities
            .side(ctx.side)
            .get(ctx.number)
            .copied()
            .unwrap_or(0.5)
            .clamp(0.0, 1.0),
        None => fallback_score(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::markov::MarkovMemo;
    use crate::models::{make_test_draws, ssq_draw};
    use crate::scoring::SharedData;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedPredictor {
        loads: bool,
        calls: Arc<AtomicUsize>,
        outcome: fn() -> Result<Option<SequenceProbabilities>, PredictorError>,
    }

    impl SequencePredictor for FixedPredictor {
        fn initialize(&mut self) -> bool {
            self.loads
        }

        fn predict(&self, last_draws: &[DrawResult]) -> Result<Option<SequenceProbabilities>, PredictorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if last_draws.len() > SEQUENCE_WINDOW {
                return Err(PredictorError::InvalidInput("fenêtre trop longue".into()));
            }
            (self.outcome)()
        }
    }

    fn seven_is_likely() -> Result<Option<SequenceProbabilities>, PredictorError> {
        let mut p = SequenceProbabilities::default();
        p.primary.insert("07".into(), 0.9);
        p.secondary.insert("07".into(), 0.1);
        Ok(Some(p))
    }

    fn factory(loads: bool, outcome: fn() -> Result<Option<SequenceProbabilities>, PredictorError>) -> (PredictorFactory, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let f: PredictorFactory = Box::new(move |_game| {
            Some(Box::new(FixedPredictor { loads, calls: counter.clone(), outcome }) as Box<dyn SequencePredictor>)
        });
        (f, calls)
    }

    #[test]
    fn test_resolve_without_factory() {
        assert!(!SequenceSource::resolve(None, Game::Ssq).is_model());
    }

    #[test]
    fn test_resolve_failed_init_is_fallback() {
        let (f, _) = factory(false, seven_is_likely);
        assert!(!SequenceSource::resolve(Some(&f), Game::Ssq).is_model());
    }

    #[test]
    fn test_model_probabilities_used() {
        let (f, calls) = factory(true, seven_is_likely);
        let source = SequenceSource::resolve(Some(&f), Game::Ssq);
        let draws = make_test_draws(Game::Ssq, 30);

        let probabilities = source.probabilities(&draws, 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let shared = SharedData::new(&draws, 10).with_sequence(probabilities, 10);
        let memo = MarkovMemo::default();
        let ctx = |number, side| ScoreContext { number, side, shared: &shared, markov: &memo };
        assert_eq!(score(&ctx("07", Side::Primary)), 0.9);
        assert_eq!(score(&ctx("07", Side::Secondary)), 0.1);
        assert_eq!(score(&ctx("08", Side::Primary)), 0.5);
    }

    #[test]
    fn test_errors_and_empty_degrade() {
        fn failing() -> Result<Option<SequenceProbabilities>, PredictorError> {
            Err(PredictorError::Inference("tenseur".into()))
        }
        fn empty() -> Result<Option<SequenceProbabilities>, PredictorError> {
            Ok(None)
        }
        let draws = make_test_draws(Game::Ssq, 30);
        for outcome in [failing as fn() -> _, empty] {
            let (f, _) = factory(true, outcome);
            let source = SequenceSource::resolve(Some(&f), Game::Ssq);
            assert!(source.is_model());
            assert_eq!(source.probabilities(&draws, 10), None);
        }
    }

    #[test]
    fn test_short_history_skips_model() {
        let (f, calls) = factory(true, seven_is_likely);
        let source = SequenceSource::resolve(Some(&f), Game::Ssq);
        let draws = make_test_draws(Game::Ssq, 5);
        assert_eq!(source.probabilities(&draws, 10), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    fn fallback_for(history: &[DrawResult], number: &str) -> f64 {
        let shared = SharedData::new(history, 10);
        let memo = MarkovMemo::default();
        fallback_score(&ScoreContext { number, side: Side::Primary, shared: &shared, markov: &memo })
    }

    #[test]
    fn test_fallback_short_history() {
        let draws = make_test_draws(Game::Ssq, 9);
        assert_eq!(fallback_for(&draws, "01"), 0.5);
    }

    #[test]
    fn test_fallback_never_drawn() {
        let history: Vec<_> = (0..12).map(|_| ssq_draw(&["02", "03", "04", "05", "06", "08"], &["01"])).collect();
        assert_eq!(fallback_for(&history, "07"), 0.0);
    }

    #[test]
    fn test_fallback_always_drawn() {
        let history: Vec<_> = (0..12).map(|_| ssq_draw(&["02", "03", "04", "05", "06", "07"], &["01"])).collect();
        assert!((fallback_for(&history, "07") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fallback_recent_burst_scores_high() {
        // Absent sur les 9 plus anciens, présent sur les 3 plus récents.
        let history: Vec<_> = (0..12)
            .map(|i| {
                if i < 3 {
                    ssq_draw(&["02", "03", "04", "05", "06", "07"], &["01"])
                } else {
                    ssq_draw(&["02", "03", "04", "05", "06", "08"], &["01"])
                }
            })
            .collect();
        let ema = 1.0 - 0.7f64.powi(3);
        let expected = ((ema / 0.25).min(2.0) / 2.0).min(1.0);
        assert!((fallback_for(&history, "07") - expected).abs() < 1e-12);
        assert!(fallback_for(&history, "07") > 0.5);
    }
}
