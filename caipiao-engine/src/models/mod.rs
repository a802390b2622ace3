pub mod association;
pub mod bayes;
pub mod consecutive;
pub mod features;
pub mod frequency;
pub mod genetic;
pub mod markov;
pub mod omission;
pub mod same_tail;
pub mod sequence;
pub mod trend;

use caipiao_db::models::{DrawResult, Side};

/// Nombre de tirages de l'historique où `number` sort du côté `side`.
pub fn draws_containing(history: &[DrawResult], side: Side, number: &str) -> usize {
    history
        .iter()
        .filter(|d| side.numbers_from(d).iter().any(|n| n == number))
        .count()
}

#[cfg(test)]
pub fn make_test_draws(game: caipiao_db::models::Game, n: usize) -> Vec<DrawResult> {
    use caipiao_db::models::pad_number;

    let profile = game.profile();
    (0..n)
        .map(|i| {
            let side_numbers = |side: Side, step: usize| -> Vec<String> {
                let Some(range) = profile.range(side) else {
                    return vec![];
                };
                let start = *range.start() as usize;
                let len = range.clone().count();
                let mut nums: Vec<u8> = (0..profile.count(side))
                    .map(|k| (start + (i * 7 + k * step) % len) as u8)
                    .collect();
                if profile.sorted {
                    nums.sort();
                }
                nums.into_iter().map(pad_number).collect()
            };
            let day = n - i;
            DrawResult {
                game,
                issue: format!("2024{:03}", day),
                primary: side_numbers(Side::Primary, 3),
                secondary: side_numbers(Side::Secondary, 1),
                draw_date: format!("{}-{:02}-{:02}", 2020 + day / 336, 1 + (day / 28) % 12, 1 + day % 28),
                sale_money: None,
                prize_pool: None,
            }
        })
        .collect()
}

/// Tirage SSQ minimal pour les tests de notation.
#[cfg(test)]
pub fn ssq_draw(primary: &[&str], secondary: &[&str]) -> DrawResult {
    DrawResult {
        game: caipiao_db::models::Game::Ssq,
        issue: String::new(),
        primary: primary.iter().map(|s| s.to_string()).collect(),
        secondary: secondary.iter().map(|s| s.to_string()).collect(),
        draw_date: String::new(),
        sale_money: None,
        prize_pool: None,
    }
}
