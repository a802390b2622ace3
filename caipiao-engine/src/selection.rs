use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::scoring::NumberScore;

/// Plafonds de la recherche de taille pour les tickets multiples.
pub const PRIMARY_POOL_CAP: usize = 15;
pub const SECONDARY_POOL_CAP: usize = 5;

/// Candidats triés par score décroissant, puis par numéro.
fn ranked(scores: &BTreeMap<String, NumberScore>) -> Vec<&NumberScore> {
    let mut candidates: Vec<&NumberScore> = scores.values().collect();
    candidates.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.number.cmp(&b.number))
    });
    candidates
}

/// Tirage pondéré sans remise. L'ordre de sélection est conservé (jeux positionnels).
/// S'arrête quand le pool est épuisé.
pub fn select_by_weight<R: Rng + ?Sized>(
    scores: &BTreeMap<String, NumberScore>,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut available = ranked(scores);
    let mut selected = Vec::with_capacity(count);

    while selected.len() < count && !available.is_empty() {
        let weights: Vec<f64> = available.iter().map(|s| s.total_score.max(0.0)).collect();
        let total: f64 = weights.iter().sum();

        let idx = if total > 0.0 {
            match WeightedIndex::new(&weights) {
                Ok(dist) => dist.sample(rng),
                Err(_) => rng.random_range(0..available.len()),
            }
        } else {
            rng.random_range(0..available.len())
        };
        selected.push(available.remove(idx).number.clone());
    }

    selected
}

/// Sélection stratifiée pour ticket multiple : parmi les `count × 3` meilleurs,
/// count/2 forts (> 0.6), count/3 moyens, count/6 faibles (< 0.4), puis complément uniforme.
pub fn select_complex<R: Rng + ?Sized>(
    scores: &BTreeMap<String, NumberScore>,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    if count == 0 || scores.is_empty() {
        return vec![];
    }
    let candidates = ranked(scores);
    let top = &candidates[..(count * 3).min(candidates.len())];

    let high = top.iter().filter(|s| s.total_score > 0.6).take(count / 2);
    let medium = top
        .iter()
        .filter(|s| (0.4..=0.6).contains(&s.total_score))
        .take(count / 3);
    let low = top.iter().filter(|s| s.total_score < 0.4).take(count / 6);

    let mut selected: Vec<String> = high.chain(medium).chain(low).map(|s| s.number.clone()).collect();

    while selected.len() < count {
        let remaining: Vec<&&NumberScore> = candidates
            .iter()
            .filter(|s| !selected.contains(&s.number))
            .collect();
        let Some(pick) = remaining.choose(rng) else {
            break;
        };
        selected.push(pick.number.clone());
    }

    selected
}

/// C(n, r) ; 0 si r > n.
pub fn combinations(n: usize, r: usize) -> u64 {
    if r > n {
        return 0;
    }
    let r = r.min(n - r);
    let mut result: u128 = 1;
    for i in 0..r {
        result = result * (n - i) as u128 / (i + 1) as u128;
    }
    u64::try_from(result).unwrap_or(u64::MAX)
}

/// Taille des pools d'un ticket multiple pour atteindre `target` combinaisons.
/// Balayage ligne par ligne : le plus petit pool principal pour lequel un pool secondaire
/// convient, avec le plus petit pool secondaire. Sans côté secondaire, seul le principal varie.
/// Retourne les tailles de base si la cible est déjà atteinte ou inatteignable.
pub fn optimal_pool_sizes(base_primary: usize, base_secondary: usize, target: u64) -> (usize, usize) {
    if target == 0 || base_primary == 0 {
        return (base_primary, base_secondary);
    }
    let secondary_cap = if base_secondary == 0 {
        0
    } else {
        SECONDARY_POOL_CAP.max(base_secondary)
    };

    for primary in base_primary..=PRIMARY_POOL_CAP.max(base_primary) {
        let primary_combinations = combinations(primary, base_primary);
        for secondary in base_secondary..=secondary_cap {
            let total = primary_combinations.saturating_mul(combinations(secondary, base_secondary));
            if total >= target {
                return (primary, secondary);
            }
        }
    }
    (base_primary, base_secondary)
}
