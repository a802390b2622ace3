use std::fmt;

use serde::Serialize;

use caipiao_db::models::{DrawResult, Game};

/// Rang gagné par une grille.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Prize {
    /// Rang numéroté, 1 = premier rang.
    Tier(u8),
    /// 3D / PL3 : ordre exact.
    Direct,
    /// 3D / PL3 : mêmes chiffres, ordre quelconque.
    Group,
    /// KL8 : aucun numéro trouvé.
    Lucky,
}

impl fmt::Display for Prize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prize::Tier(1) => write!(f, "1er rang"),
            Prize::Tier(n) => write!(f, "{}e rang", n),
            Prize::Direct => write!(f, "Direct"),
            Prize::Group => write!(f, "Groupe"),
            Prize::Lucky => write!(f, "Chance"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub is_win: bool,
    pub prize: Option<Prize>,
    pub matched_primary: Vec<String>,
    pub matched_secondary: Vec<String>,
    pub message: String,
}

/// Compare une grille à un tirage selon la table de gains du jeu.
pub fn verify(primary: &[String], secondary: &[String], draw: &DrawResult, game: Game) -> Verification {
    let matched_primary: Vec<String> = primary
        .iter()
        .filter(|n| draw.primary.contains(n))
        .cloned()
        .collect();
    let matched_secondary: Vec<String> = secondary
        .iter()
        .filter(|n| draw.secondary.contains(n))
        .cloned()
        .collect();
    let p = matched_primary.len();
    let s = matched_secondary.len();

    let (prize, message) = match game {
        Game::Ssq => {
            let prize = match (p, s) {
                (6, 1) => Some(1),
                (6, 0) => Some(2),
                (5, 1) => Some(3),
                (5, 0) | (4, 1) => Some(4),
                (4, 0) | (3, 1) => Some(5),
                (0..=2, 1) => Some(6),
                _ => None,
            };
            (prize.map(Prize::Tier), count_message(p, s))
        }
        Game::Cjdlt => {
            let prize = match (p, s) {
                (5, 2) => Some(1),
                (5, 1) => Some(2),
                (5, 0) => Some(3),
                (4, 2) => Some(4),
                (4, 1) | (3, 2) => Some(5),
                (4, 0) | (3, 1) | (2, 2) => Some(6),
                (3, 0) | (2, 1) | (1, 2) | (0, 2) => Some(7),
                _ => None,
            };
            (prize.map(Prize::Tier), count_message(p, s))
        }
        Game::Qlc => {
            let special = s > 0;
            let prize = match (p, special) {
                (7.., _) => Some(1),
                (6, true) => Some(2),
                (6, false) => Some(3),
                (5, true) => Some(4),
                (5, false) => Some(5),
                (4, true) => Some(6),
                (4, false) => Some(7),
                _ => None,
            };
            (prize.map(Prize::Tier), format!("{} base + {} spécial", p, s))
        }
        Game::Fc3d | Game::Pl3 => {
            let prize = if primary.len() != 3 {
                None
            } else if primary == draw.primary.as_slice() {
                Some(Prize::Direct)
            } else if same_multiset(primary, &draw.primary) {
                Some(Prize::Group)
            } else {
                None
            };
            (prize, format!("{} chiffre(s) en commun", p))
        }
        Game::Pl5 => {
            let prize = (primary.len() == 5 && primary == draw.primary.as_slice()).then_some(Prize::Tier(1));
            (prize, format!("{} chiffre(s) en commun", p))
        }
        Game::Qxc => {
            let positional = primary
                .iter()
                .chain(secondary)
                .zip(draw.primary.iter().chain(&draw.secondary))
                .filter(|(a, b)| a == b)
                .count();
            let prize = match positional {
                7 => Some(1),
                6 => Some(2),
                5 => Some(3),
                4 => Some(4),
                3 => Some(5),
                2 => Some(6),
                _ => None,
            };
            (prize.map(Prize::Tier), format!("{} position(s) exacte(s)", positional))
        }
        Game::Kl8 => {
            let prize = match p {
                10.. => Some(Prize::Tier(1)),
                8..=9 => Some(Prize::Tier(2)),
                6..=7 => Some(Prize::Tier(3)),
                5 => Some(Prize::Tier(4)),
                0 => Some(Prize::Lucky),
                _ => None,
            };
            (prize, format!("{} numéro(s) trouvé(s)", p))
        }
    };

    let message = match prize {
        Some(prize) => format!("Gagnant : {} ({})", prize, message),
        None => format!("Perdu : {}", message),
    };

    Verification {
        is_win: prize.is_some(),
        prize,
        matched_primary,
        matched_secondary,
        message,
    }
}

fn count_message(primary: usize, secondary: usize) -> String {
    format!("{} + {}", primary, secondary)
}

fn same_multiset(a: &[String], b: &[String]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}
