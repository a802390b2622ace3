use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::algorithms::Algorithm;
use crate::analysis::{ac_value, is_prime, zone_counts, zone_of};

/// Bornes de grille acceptées et bonus associés.
#[derive(Debug, Clone, PartialEq)]
pub struct Bands {
    /// Facteurs appliqués à la somme attendue (moyenne de la plage × taille du ticket).
    pub sum_factor: (f64, f64),
    pub span: RangeInclusive<usize>,
    pub ac: RangeInclusive<usize>,
    pub odd: RangeInclusive<usize>,
    pub prime: RangeInclusive<usize>,
    pub big: RangeInclusive<usize>,
    /// Nombre de zones de la plage, aligné sur `EngineConfig::zone_count`.
    pub zone_count: usize,
    /// Écart maximal toléré entre la zone la plus chargée et la moins chargée.
    pub zone_spread: usize,
    pub sum_bonus: f64,
    pub ac_bonus: f64,
    pub odd_bonus: f64,
    pub zone_bonus: f64,
}

impl Bands {
    /// Ticket simple.
    pub const SIMPLE: Bands = Bands {
        sum_factor: (0.8, 1.2),
        span: 15..=25,
        ac: 6..=8,
        odd: 2..=4,
        prime: 2..=4,
        big: 2..=4,
        zone_count: 3,
        zone_spread: 1,
        sum_bonus: 0.05,
        ac_bonus: 0.05,
        odd_bonus: 0.03,
        zone_bonus: 0.0,
    };

    /// Ticket multiple, bornes élargies.
    pub const COMPLEX: Bands = Bands {
        sum_factor: (0.7, 1.3),
        span: 10..=30,
        ac: 5..=9,
        odd: 1..=5,
        prime: 1..=5,
        big: 1..=5,
        zone_count: 3,
        zone_spread: 2,
        sum_bonus: 0.08,
        ac_bonus: 0.08,
        odd_bonus: 0.05,
        zone_bonus: 0.05,
    };

    pub fn with_zone_count(mut self, zone_count: usize) -> Self {
        self.zone_count = zone_count.max(1);
        self
    }

    /// Plage de somme acceptée pour un ticket de `len` numéros.
    pub fn sum_range(&self, len: usize, range: &RangeInclusive<u8>) -> RangeInclusive<u32> {
        let total: u32 = range.clone().map(u32::from).sum();
        let size = range.clone().count().max(1) as u32;
        let mid = (total * len as u32 / size) as f64;
        (mid * self.sum_factor.0) as u32..=(mid * self.sum_factor.1) as u32
    }
}

// ════════════════════════════════════════════════════════════════
// Mesures
// ════════════════════════════════════════════════════════════════

fn sum_of(numbers: &[u8]) -> u32 {
    numbers.iter().map(|&n| u32::from(n)).sum()
}

fn span_of(numbers: &[u8]) -> usize {
    match (numbers.iter().min(), numbers.iter().max()) {
        (Some(&lo), Some(&hi)) => usize::from(hi - lo),
        _ => 0,
    }
}

fn odd_count(numbers: &[u8]) -> usize {
    numbers.iter().filter(|&&n| n % 2 == 1).count()
}

fn prime_count(numbers: &[u8]) -> usize {
    numbers.iter().filter(|&&n| is_prime(u32::from(n))).count()
}

fn midpoint(range: &RangeInclusive<u8>) -> u8 {
    ((u16::from(*range.start()) + u16::from(*range.end())) / 2) as u8
}

fn big_count(numbers: &[u8], range: &RangeInclusive<u8>) -> usize {
    let mid = midpoint(range);
    numbers.iter().filter(|&&n| n > mid).count()
}

fn zone_spread(numbers: &[u8], range: &RangeInclusive<u8>, zone_count: usize) -> usize {
    let counts = zone_counts(numbers, range, zone_count);
    let max = counts.iter().copied().max().unwrap_or(0);
    let min = counts.iter().copied().min().unwrap_or(0);
    max - min
}

/// Remplace `numbers[idx]` par un numéro inutilisé tiré uniformément parmi ceux acceptés.
/// Identité si aucun candidat.
fn swap_at<R: Rng + ?Sized>(
    numbers: &[u8],
    idx: usize,
    range: &RangeInclusive<u8>,
    accept: impl Fn(u8) -> bool,
    rng: &mut R,
) -> Vec<u8> {
    let mut result = numbers.to_vec();
    let candidates: Vec<u8> = range
        .clone()
        .filter(|n| !numbers.contains(n) && accept(*n))
        .collect();
    if let Some(&pick) = candidates.choose(rng) {
        result[idx] = pick;
    }
    result
}

fn position_of(numbers: &[u8], pred: impl Fn(u8) -> bool) -> Option<usize> {
    numbers.iter().position(|&n| pred(n))
}

// ════════════════════════════════════════════════════════════════
// Réparations : identité dans la bande, sinon un seul échange
// ════════════════════════════════════════════════════════════════

pub fn optimize_sum<R: Rng + ?Sized>(
    numbers: &[u8],
    range: &RangeInclusive<u8>,
    bands: &Bands,
    rng: &mut R,
) -> Vec<u8> {
    let target = bands.sum_range(numbers.len(), range);
    let sum = sum_of(numbers);
    if numbers.is_empty() || target.contains(&sum) {
        return numbers.to_vec();
    }

    let lo = numbers.iter().copied().min().unwrap_or(0);
    let hi = numbers.iter().copied().max().unwrap_or(0);
    if sum < *target.start() {
        let Some(idx) = position_of(numbers, |n| n == lo) else {
            return numbers.to_vec();
        };
        swap_at(numbers, idx, range, |n| n > lo, rng)
    } else {
        let Some(idx) = position_of(numbers, |n| n == hi) else {
            return numbers.to_vec();
        };
        swap_at(numbers, idx, range, |n| n < hi, rng)
    }
}

/// Écart trop faible : un numéro intérieur part hors de [min, max].
/// Trop fort : le maximum est ramené strictement à l'intérieur.
pub fn optimize_span<R: Rng + ?Sized>(
    numbers: &[u8],
    range: &RangeInclusive<u8>,
    bands: &Bands,
    rng: &mut R,
) -> Vec<u8> {
    let span = span_of(numbers);
    if bands.span.contains(&span) || numbers.len() < 2 {
        return numbers.to_vec();
    }
    let lo = numbers.iter().copied().min().unwrap_or(0);
    let hi = numbers.iter().copied().max().unwrap_or(0);

    if span < *bands.span.start() {
        if numbers.len() < 3 {
            return numbers.to_vec();
        }
        let mut order: Vec<usize> = (0..numbers.len()).collect();
        order.sort_by_key(|&i| numbers[i]);
        let idx = order[numbers.len() / 2];
        swap_at(numbers, idx, range, |n| n < lo || n > hi, rng)
    } else {
        let Some(idx) = position_of(numbers, |n| n == hi) else {
            return numbers.to_vec();
        };
        swap_at(numbers, idx, range, |n| n > lo && n < hi, rng)
    }
}

/// Choisit uniformément un échange (position, numéro) qui rapproche la valeur AC de sa bande.
pub fn optimize_ac<R: Rng + ?Sized>(
    numbers: &[u8],
    range: &RangeInclusive<u8>,
    bands: &Bands,
    rng: &mut R,
) -> Vec<u8> {
    let ac = ac_value(numbers);
    if bands.ac.contains(&ac) || numbers.len() < 2 {
        return numbers.to_vec();
    }
    let too_low = ac < *bands.ac.start();

    let mut moves = Vec::new();
    for idx in 0..numbers.len() {
        for candidate in range.clone().filter(|n| !numbers.contains(n)) {
            let mut trial = numbers.to_vec();
            trial[idx] = candidate;
            let new_ac = ac_value(&trial);
            if (too_low && new_ac > ac) || (!too_low && new_ac < ac) {
                moves.push((idx, candidate));
            }
        }
    }

    let mut result = numbers.to_vec();
    if let Some(&(idx, candidate)) = moves.choose(rng) {
        result[idx] = candidate;
    }
    result
}

pub fn optimize_odd_even<R: Rng + ?Sized>(
    numbers: &[u8],
    range: &RangeInclusive<u8>,
    bands: &Bands,
    rng: &mut R,
) -> Vec<u8> {
    let odd = odd_count(numbers);
    if bands.odd.contains(&odd) {
        return numbers.to_vec();
    }
    let want_odd = odd < *bands.odd.start();
    let Some(idx) = position_of(numbers, |n| (n % 2 == 1) != want_odd) else {
        return numbers.to_vec();
    };
    swap_at(numbers, idx, range, |n| (n % 2 == 1) == want_odd, rng)
}

pub fn optimize_prime_composite<R: Rng + ?Sized>(
    numbers: &[u8],
    range: &RangeInclusive<u8>,
    bands: &Bands,
    rng: &mut R,
) -> Vec<u8> {
    let primes = prime_count(numbers);
    if bands.prime.contains(&primes) {
        return numbers.to_vec();
    }
    let want_prime = primes < *bands.prime.start();
    let Some(idx) = position_of(numbers, |n| is_prime(u32::from(n)) != want_prime) else {
        return numbers.to_vec();
    };
    swap_at(numbers, idx, range, |n| is_prime(u32::from(n)) == want_prime, rng)
}

/// Déplace un numéro de la zone la plus chargée vers la moins chargée.
pub fn optimize_zone<R: Rng + ?Sized>(
    numbers: &[u8],
    range: &RangeInclusive<u8>,
    bands: &Bands,
    rng: &mut R,
) -> Vec<u8> {
    if numbers.is_empty() || zone_spread(numbers, range, bands.zone_count) <= bands.zone_spread {
        return numbers.to_vec();
    }
    let counts = zone_counts(numbers, range, bands.zone_count);
    let (Some(crowded), Some(sparse)) = (
        (0..counts.len()).max_by_key(|&z| (counts[z], std::cmp::Reverse(z))),
        (0..counts.len()).min_by_key(|&z| (counts[z], z)),
    ) else {
        return numbers.to_vec();
    };
    let zone = |n: u8| zone_of(n, range, bands.zone_count);
    let Some(idx) = position_of(numbers, |n| zone(n) == crowded) else {
        return numbers.to_vec();
    };
    swap_at(numbers, idx, range, |n| zone(n) == sparse, rng)
}

/// Équilibre grands/petits, puis pairs/impairs si la taille est déjà dans la bande.
pub fn optimize_balance<R: Rng + ?Sized>(
    numbers: &[u8],
    range: &RangeInclusive<u8>,
    bands: &Bands,
    rng: &mut R,
) -> Vec<u8> {
    let big = big_count(numbers, range);
    if !bands.big.contains(&big) {
        let mid = midpoint(range);
        let want_big = big < *bands.big.start();
        let Some(idx) = position_of(numbers, |n| (n > mid) != want_big) else {
            return numbers.to_vec();
        };
        return swap_at(numbers, idx, range, |n| (n > mid) == want_big, rng);
    }
    optimize_odd_even(numbers, range, bands, rng)
}

/// Applique les réparations des algorithmes actifs, dans un ordre fixe.
pub fn optimize<R: Rng + ?Sized>(
    numbers: &[u8],
    range: &RangeInclusive<u8>,
    algorithms: &BTreeSet<Algorithm>,
    bands: &Bands,
    rng: &mut R,
) -> Vec<u8> {
    let steps: [(Algorithm, fn(&[u8], &RangeInclusive<u8>, &Bands, &mut R) -> Vec<u8>); 7] = [
        (Algorithm::SumValue, optimize_sum),
        (Algorithm::Span, optimize_span),
        (Algorithm::AcValue, optimize_ac),
        (Algorithm::OddEven, optimize_odd_even),
        (Algorithm::PrimeComposite, optimize_prime_composite),
        (Algorithm::Zone, optimize_zone),
        (Algorithm::Balance, optimize_balance),
    ];

    let mut current = numbers.to_vec();
    for (algorithm, repair) in steps {
        if algorithms.contains(&algorithm) {
            current = repair(&current, range, bands, rng);
        }
    }
    current
}

/// Bonus de grille : somme, AC et parité dans leur bande ; zones si le profil le prévoit.
pub fn bonus(
    numbers: &[u8],
    range: &RangeInclusive<u8>,
    algorithms: &BTreeSet<Algorithm>,
    bands: &Bands,
) -> f64 {
    if numbers.is_empty() {
        return 0.0;
    }
    let mut bonus = 0.0;
    if algorithms.contains(&Algorithm::SumValue) && bands.sum_range(numbers.len(), range).contains(&sum_of(numbers)) {
        bonus += bands.sum_bonus;
    }
    if algorithms.contains(&Algorithm::AcValue) && bands.ac.contains(&ac_value(numbers)) {
        bonus += bands.ac_bonus;
    }
    if algorithms.contains(&Algorithm::OddEven) && bands.odd.contains(&odd_count(numbers)) {
        bonus += bands.odd_bonus;
    }
    if algorithms.contains(&Algorithm::Zone) && zone_spread(numbers, range, bands.zone_count) <= bands.zone_spread {
        bonus += bands.zone_bonus;
    }
    bonus
}
