use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::RangeInclusive;

use serde::Serialize;

use caipiao_db::models::{pad_number, parse_number, DrawResult, Game, Side};

// Chaque analyse renvoie un enregistrement par case (numéro, finale, somme...).
// Les fréquences sont en pourcentage. Les égalités sont départagées par la clé.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OmissionStat {
    pub number: String,
    /// Tirages depuis la dernière sortie.
    pub current: usize,
    pub max: usize,
    /// Absence moyenne entre deux sorties.
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyStat {
    pub number: String,
    pub count: usize,
    pub frequency: f64,
    pub last_issue: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Temperature {
    Hot,
    Warm,
    Cold,
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Temperature::Hot => write!(f, "CHAUD"),
            Temperature::Warm => write!(f, "TIÈDE"),
            Temperature::Cold => write!(f, "FROID"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotColdStat {
    pub number: String,
    pub temperature: f64,
    pub category: Temperature,
    pub recent_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsecutiveStat {
    pub numbers: Vec<String>,
    pub count: usize,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SameTailStat {
    pub tail: u8,
    pub numbers: Vec<String>,
    pub count: usize,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SumStat {
    pub sum: u32,
    pub count: usize,
    pub frequency: f64,
    /// Parité "impairs:pairs" du tirage le plus récent ayant cette somme.
    pub odd_even_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanStat {
    pub span: u8,
    pub count: usize,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcStat {
    pub ac: usize,
    pub count: usize,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioStat {
    pub ratio: String,
    pub count: usize,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneStat {
    pub zone: usize,
    pub range: String,
    pub count: usize,
    pub frequency: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub game: Game,
    pub side: Side,
    pub history_size: usize,
    pub omission: Vec<OmissionStat>,
    pub frequency: Vec<FrequencyStat>,
    pub hot_cold: Vec<HotColdStat>,
    pub consecutive: Vec<ConsecutiveStat>,
    pub same_tail: Vec<SameTailStat>,
    pub sum_value: Vec<SumStat>,
    pub span: Vec<SpanStat>,
    pub ac_value: Vec<AcStat>,
    pub odd_even: Vec<RatioStat>,
    pub size_ratio: Vec<RatioStat>,
    pub prime_composite: Vec<RatioStat>,
    pub zone: Vec<ZoneStat>,
}

// ════════════════════════════════════════════════════════════════
// Utilitaires numériques
// ════════════════════════════════════════════════════════════════

pub fn is_prime(n: u32) -> bool {
    if n <= 1 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut i = 3;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Nombre de différences absolues distinctes moins (n - 1).
pub fn ac_value(numbers: &[u8]) -> usize {
    let mut differences = HashSet::new();
    for (i, &a) in numbers.iter().enumerate() {
        for &b in &numbers[i + 1..] {
            differences.insert(a.abs_diff(b));
        }
    }
    differences.len().saturating_sub(numbers.len().saturating_sub(1))
}

/// Zone (0-based) d'un numéro ; la dernière zone absorbe le reste de la division.
pub fn zone_of(n: u8, range: &RangeInclusive<u8>, zone_count: usize) -> usize {
    let len = range.clone().count();
    let zone_size = (len / zone_count.max(1)).max(1);
    let offset = n.saturating_sub(*range.start()) as usize;
    (offset / zone_size).min(zone_count.max(1) - 1)
}

pub fn zone_counts(numbers: &[u8], range: &RangeInclusive<u8>, zone_count: usize) -> Vec<usize> {
    let mut counts = vec![0; zone_count.max(1)];
    for &n in numbers {
        counts[zone_of(n, range, zone_count)] += 1;
    }
    counts
}

fn parsed(draw: &DrawResult, side: Side) -> Vec<u8> {
    side.numbers_from(draw)
        .iter()
        .filter_map(|n| parse_number(n).ok())
        .collect()
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

fn by_count_desc<K: Ord>(a: (usize, &K), b: (usize, &K)) -> std::cmp::Ordering {
    b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1))
}

fn side_range(game: Game, side: Side) -> Option<RangeInclusive<u8>> {
    game.profile().range(side)
}

// ════════════════════════════════════════════════════════════════
// 1. Omission / fréquence / chaud-froid
// ════════════════════════════════════════════════════════════════

pub fn analyze_omission(history: &[DrawResult], game: Game, side: Side) -> Vec<OmissionStat> {
    let Some(range) = side_range(game, side) else {
        return vec![];
    };
    let mut stats: Vec<OmissionStat> = range
        .map(|n| {
            let number = pad_number(n);
            let mut gaps = Vec::new();
            let mut streak = 0;
            for draw in history {
                if side.numbers_from(draw).contains(&number) {
                    gaps.push(streak);
                    streak = 0;
                } else {
                    streak += 1;
                }
            }
            let current = gaps.first().copied().unwrap_or(streak);
            // Seules les absences closes comptent ; jamais sorti : l'absence en cours.
            let max = gaps.iter().copied().max().unwrap_or(streak);
            let avg = if gaps.is_empty() {
                streak as f64
            } else {
                gaps.iter().sum::<usize>() as f64 / gaps.len() as f64
            };
            OmissionStat { number, current, max, avg }
        })
        .collect();
    // À absence courante égale, la plus longue absence historique passe devant.
    stats.sort_by(|a, b| {
        b.current
            .cmp(&a.current)
            .then_with(|| b.max.cmp(&a.max))
            .then_with(|| a.number.cmp(&b.number))
    });
    stats
}

pub fn analyze_frequency(history: &[DrawResult], game: Game, side: Side) -> Vec<FrequencyStat> {
    let Some(range) = side_range(game, side) else {
        return vec![];
    };
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut last_issue: HashMap<&str, &str> = HashMap::new();
    for draw in history {
        for n in side.numbers_from(draw) {
            *counts.entry(n.as_str()).or_insert(0) += 1;
            last_issue.entry(n.as_str()).or_insert(draw.issue.as_str());
        }
    }

    let mut stats: Vec<FrequencyStat> = range
        .map(|n| {
            let number = pad_number(n);
            let count = counts.get(number.as_str()).copied().unwrap_or(0);
            FrequencyStat {
                count,
                frequency: percent(count, history.len()),
                last_issue: last_issue.get(number.as_str()).map(|s| s.to_string()),
                number,
            }
        })
        .collect();
    stats.sort_by(|a, b| by_count_desc((a.count, &a.number), (b.count, &b.number)));
    stats
}

/// Température = sorties récentes / maximum des sorties récentes × 100.
pub fn analyze_hot_cold(history: &[DrawResult], game: Game, side: Side, recent_periods: usize) -> Vec<HotColdStat> {
    let Some(range) = side_range(game, side) else {
        return vec![];
    };
    let recent = &history[..recent_periods.min(history.len())];
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for draw in recent {
        for n in side.numbers_from(draw) {
            *counts.entry(n.as_str()).or_insert(0) += 1;
        }
    }
    let max_count = counts.values().copied().max().unwrap_or(1).max(1);

    let mut stats: Vec<HotColdStat> = range
        .map(|n| {
            let number = pad_number(n);
            let recent_count = counts.get(number.as_str()).copied().unwrap_or(0);
            let temperature = recent_count as f64 / max_count as f64 * 100.0;
            let category = if temperature >= 60.0 {
                Temperature::Hot
            } else if temperature >= 30.0 {
                Temperature::Warm
            } else {
                Temperature::Cold
            };
            HotColdStat { number, temperature, category, recent_count }
        })
        .collect();
    stats.sort_by(|a, b| {
        b.temperature
            .partial_cmp(&a.temperature)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.number.cmp(&b.number))
    });
    stats
}

// ════════════════════════════════════════════════════════════════
// 2. Motifs : suites, finales
// ════════════════════════════════════════════════════════════════

/// Suites de numéros consécutifs vues plus d'une fois, 20 premières.
pub fn analyze_consecutive(history: &[DrawResult], _game: Game, side: Side) -> Vec<ConsecutiveStat> {
    let mut runs: HashMap<Vec<u8>, usize> = HashMap::new();
    for draw in history {
        let mut nums = parsed(draw, side);
        nums.sort_unstable();
        for i in 0..nums.len() {
            for j in i + 1..nums.len() {
                if nums[j] as usize == nums[i] as usize + (j - i) {
                    *runs.entry(nums[i..=j].to_vec()).or_insert(0) += 1;
                }
            }
        }
    }

    let mut stats: Vec<(Vec<u8>, usize)> = runs.into_iter().filter(|(_, c)| *c > 1).collect();
    stats.sort_by(|a, b| by_count_desc((a.1, &a.0), (b.1, &b.0)));
    stats
        .into_iter()
        .take(20)
        .map(|(nums, count)| ConsecutiveStat {
            numbers: nums.into_iter().map(pad_number).collect(),
            count,
            frequency: percent(count, history.len()),
        })
        .collect()
}

/// Sorties par chiffre des unités, normalisées par le nombre total de numéros tirés.
pub fn analyze_same_tail(history: &[DrawResult], game: Game, side: Side) -> Vec<SameTailStat> {
    let Some(range) = side_range(game, side) else {
        return vec![];
    };
    let per_draw = game.profile().count(side);
    let mut counts = [0usize; 10];
    for draw in history {
        for n in parsed(draw, side) {
            counts[(n % 10) as usize] += 1;
        }
    }

    let mut stats: Vec<SameTailStat> = (0..10u8)
        .map(|tail| SameTailStat {
            tail,
            numbers: range.clone().filter(|n| n % 10 == tail).map(pad_number).collect(),
            count: counts[tail as usize],
            frequency: percent(counts[tail as usize], history.len() * per_draw),
        })
        .collect();
    stats.sort_by(|a, b| by_count_desc((a.count, &a.tail), (b.count, &b.tail)));
    stats
}

// ════════════════════════════════════════════════════════════════
// 3. Caractéristiques de grille : somme, écart, AC
// ════════════════════════════════════════════════════════════════

pub fn analyze_sum_value(history: &[DrawResult], _game: Game, side: Side) -> Vec<SumStat> {
    let mut sums: BTreeMap<u32, (usize, String)> = BTreeMap::new();
    for draw in history {
        let nums = parsed(draw, side);
        let sum: u32 = nums.iter().map(|&n| n as u32).sum();
        let odd = nums.iter().filter(|&&n| n % 2 == 1).count();
        sums.entry(sum)
            .or_insert_with(|| (0, format!("{}:{}", odd, nums.len() - odd)))
            .0 += 1;
    }

    let mut stats: Vec<SumStat> = sums
        .into_iter()
        .map(|(sum, (count, odd_even_ratio))| SumStat {
            sum,
            count,
            frequency: percent(count, history.len()),
            odd_even_ratio,
        })
        .collect();
    stats.sort_by(|a, b| by_count_desc((a.count, &a.sum), (b.count, &b.sum)));
    stats
}

pub fn analyze_span(history: &[DrawResult], _game: Game, side: Side) -> Vec<SpanStat> {
    let mut spans: BTreeMap<u8, usize> = BTreeMap::new();
    for draw in history {
        let nums = parsed(draw, side);
        if let (Some(min), Some(max)) = (nums.iter().min(), nums.iter().max()) {
            *spans.entry(max - min).or_insert(0) += 1;
        }
    }
    spans
        .into_iter()
        .map(|(span, count)| SpanStat { span, count, frequency: percent(count, history.len()) })
        .collect()
}

pub fn analyze_ac_value(history: &[DrawResult], _game: Game, side: Side) -> Vec<AcStat> {
    let mut values: BTreeMap<usize, usize> = BTreeMap::new();
    for draw in history {
        let nums = parsed(draw, side);
        if nums.len() > 1 {
            *values.entry(ac_value(&nums)).or_insert(0) += 1;
        }
    }
    values
        .into_iter()
        .map(|(ac, count)| AcStat { ac, count, frequency: percent(count, history.len()) })
        .collect()
}

// ════════════════════════════════════════════════════════════════
// 4. Ratios : parité, grands/petits, premiers/composés
// ════════════════════════════════════════════════════════════════

fn ratio_stats(history: &[DrawResult], side: Side, split: impl Fn(u8) -> bool) -> Vec<RatioStat> {
    let mut ratios: HashMap<String, usize> = HashMap::new();
    for draw in history {
        let nums = parsed(draw, side);
        let yes = nums.iter().filter(|&&n| split(n)).count();
        *ratios.entry(format!("{}:{}", yes, nums.len() - yes)).or_insert(0) += 1;
    }
    let mut stats: Vec<RatioStat> = ratios
        .into_iter()
        .map(|(ratio, count)| RatioStat { ratio, count, frequency: percent(count, history.len()) })
        .collect();
    stats.sort_by(|a, b| by_count_desc((a.count, &a.ratio), (b.count, &b.ratio)));
    stats
}

/// Ratio "impairs:pairs".
pub fn analyze_odd_even(history: &[DrawResult], _game: Game, side: Side) -> Vec<RatioStat> {
    ratio_stats(history, side, |n| n % 2 == 1)
}

/// Ratio "grands:petits", coupure au milieu de la plage.
pub fn analyze_size_ratio(history: &[DrawResult], game: Game, side: Side) -> Vec<RatioStat> {
    let Some(range) = side_range(game, side) else {
        return vec![];
    };
    let median = ((*range.start() as u16 + *range.end() as u16) / 2) as u8;
    ratio_stats(history, side, |n| n > median)
}

/// Ratio "premiers:composés".
pub fn analyze_prime_composite(history: &[DrawResult], _game: Game, side: Side) -> Vec<RatioStat> {
    ratio_stats(history, side, |n| is_prime(n as u32))
}

// ════════════════════════════════════════════════════════════════
// 5. Zones
// ════════════════════════════════════════════════════════════════

pub fn analyze_zone(history: &[DrawResult], game: Game, side: Side, zone_count: usize) -> Vec<ZoneStat> {
    let Some(range) = side_range(game, side) else {
        return vec![];
    };
    let zone_count = zone_count.max(1);
    let per_draw = game.profile().count(side);
    let zone_size = (range.clone().count() / zone_count).max(1);

    let mut counts = vec![0usize; zone_count];
    for draw in history {
        for n in parsed(draw, side) {
            counts[zone_of(n, &range, zone_count)] += 1;
        }
    }

    (0..zone_count)
        .map(|zone| {
            let start = *range.start() as usize + zone * zone_size;
            let end = if zone == zone_count - 1 {
                *range.end() as usize
            } else {
                start + zone_size - 1
            };
            ZoneStat {
                zone: zone + 1,
                range: format!("{:02}-{:02}", start, end),
                count: counts[zone],
                frequency: percent(counts[zone], history.len() * per_draw),
            }
        })
        .collect()
}

/// Toutes les analyses d'un côté, pour l'affichage.
pub fn analyze_all(
    history: &[DrawResult],
    game: Game,
    side: Side,
    hot_cold_periods: usize,
    zone_count: usize,
) -> AnalysisReport {
    AnalysisReport {
        game,
        side,
        history_size: history.len(),
        omission: analyze_omission(history, game, side),
        frequency: analyze_frequency(history, game, side),
        hot_cold: analyze_hot_cold(history, game, side, hot_cold_periods),
        consecutive: analyze_consecutive(history, game, side),
        same_tail: analyze_same_tail(history, game, side),
        sum_value: analyze_sum_value(history, game, side),
        span: analyze_span(history, game, side),
        ac_value: analyze_ac_value(history, game, side),
        odd_even: analyze_odd_even(history, game, side),
        size_ratio: analyze_size_ratio(history, game, side),
        prime_composite: analyze_prime_composite(history, game, side),
        zone: analyze_zone(history, game, side, zone_count),
    }
}
