use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("code de jeu inconnu : '{0}'")]
    UnknownGame(String),
    #[error("numéro mal formé : '{0}' (attendu deux chiffres, ex. \"03\")")]
    BadNumber(String),
    #[error("tirage {issue} : {found} numéros {side}, attendu {expected}")]
    WrongCount {
        issue: String,
        side: Side,
        found: usize,
        expected: usize,
    },
    #[error("tirage {issue} : numéro {number} hors limites ({min}-{max})")]
    OutOfRange {
        issue: String,
        number: String,
        min: u8,
        max: u8,
    },
    #[error("tirage {issue} : numéro en double {number}")]
    Duplicate { issue: String, number: String },
}

/// Formate un numéro sur deux caractères ("3" -> "03"). Seule représentation canonique.
pub fn pad_number(n: u8) -> String {
    format!("{:02}", n)
}

/// Normalise une saisie libre ("3", "03", " 7 ") en forme canonique.
pub fn normalize_number(raw: &str) -> Result<String, ModelError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<u8>()
        .map(pad_number)
        .map_err(|_| ModelError::BadNumber(raw.to_string()))
}

pub fn parse_number(s: &str) -> Result<u8, ModelError> {
    if s.len() != 2 {
        return Err(ModelError::BadNumber(s.to_string()));
    }
    s.parse::<u8>().map_err(|_| ModelError::BadNumber(s.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Primary,
    Secondary,
}

impl Side {
    pub fn numbers_from<'a>(&self, draw: &'a DrawResult) -> &'a [String] {
        match self {
            Side::Primary => &draw.primary,
            Side::Secondary => &draw.secondary,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Primary => write!(f, "principaux"),
            Side::Secondary => write!(f, "secondaires"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Ssq,
    Qlc,
    Fc3d,
    Cjdlt,
    Qxc,
    Pl3,
    Pl5,
    Kl8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameProfile {
    pub primary_range: RangeInclusive<u8>,
    pub secondary_range: Option<RangeInclusive<u8>>,
    pub primary_count: usize,
    pub secondary_count: usize,
    /// false pour les jeux positionnels : l'ordre encode la position du chiffre.
    pub sorted: bool,
}

impl GameProfile {
    pub fn range(&self, side: Side) -> Option<RangeInclusive<u8>> {
        match side {
            Side::Primary => Some(self.primary_range.clone()),
            Side::Secondary => self.secondary_range.clone(),
        }
    }

    pub fn count(&self, side: Side) -> usize {
        match side {
            Side::Primary => self.primary_count,
            Side::Secondary => self.secondary_count,
        }
    }

    /// Tous les numéros possibles d'un côté, déjà formatés.
    pub fn numbers(&self, side: Side) -> Vec<String> {
        self.range(side)
            .map(|r| r.map(pad_number).collect())
            .unwrap_or_default()
    }
}

impl Game {
    pub const ALL: [Game; 8] = [
        Game::Ssq,
        Game::Qlc,
        Game::Fc3d,
        Game::Cjdlt,
        Game::Qxc,
        Game::Pl3,
        Game::Pl5,
        Game::Kl8,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Game::Ssq => "ssq",
            Game::Qlc => "qlc",
            Game::Fc3d => "fc3d",
            Game::Cjdlt => "cjdlt",
            Game::Qxc => "7xc",
            Game::Pl3 => "pl3",
            Game::Pl5 => "pl5",
            Game::Kl8 => "kl8",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Game::Ssq => "双色球",
            Game::Qlc => "七乐彩",
            Game::Fc3d => "福彩3D",
            Game::Cjdlt => "超级大乐透",
            Game::Qxc => "七星彩",
            Game::Pl3 => "排列3",
            Game::Pl5 => "排列5",
            Game::Kl8 => "快乐8",
        }
    }

    pub fn profile(&self) -> GameProfile {
        match self {
            Game::Ssq => GameProfile {
                primary_range: 1..=33,
                secondary_range: Some(1..=16),
                primary_count: 6,
                secondary_count: 1,
                sorted: true,
            },
            Game::Qlc => GameProfile {
                primary_range: 1..=30,
                secondary_range: Some(1..=30),
                primary_count: 7,
                secondary_count: 1,
                sorted: true,
            },
            Game::Fc3d | Game::Pl3 => GameProfile {
                primary_range: 0..=9,
                secondary_range: None,
                primary_count: 3,
                secondary_count: 0,
                sorted: false,
            },
            Game::Cjdlt => GameProfile {
                primary_range: 1..=35,
                secondary_range: Some(1..=12),
                primary_count: 5,
                secondary_count: 2,
                sorted: true,
            },
            Game::Qxc => GameProfile {
                primary_range: 0..=9,
                secondary_range: Some(0..=14),
                primary_count: 6,
                secondary_count: 1,
                sorted: false,
            },
            Game::Pl5 => GameProfile {
                primary_range: 0..=9,
                secondary_range: None,
                primary_count: 5,
                secondary_count: 0,
                sorted: false,
            },
            Game::Kl8 => GameProfile {
                primary_range: 1..=80,
                secondary_range: None,
                primary_count: 20,
                secondary_count: 0,
                sorted: true,
            },
        }
    }
}

impl FromStr for Game {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Game::ALL
            .iter()
            .copied()
            .find(|g| g.code() == code)
            .ok_or(ModelError::UnknownGame(s.to_string()))
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawResult {
    pub game: Game,
    pub issue: String,
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    pub draw_date: String,
    pub sale_money: Option<String>,
    pub prize_pool: Option<String>,
}

/// Contrôle qualité d'un tirage : format, nombre de numéros, bornes, doublons.
/// Les jeux positionnels acceptent les chiffres répétés.
pub fn validate_draw(draw: &DrawResult) -> Result<(), ModelError> {
    let profile = draw.game.profile();

    for side in [Side::Primary, Side::Secondary] {
        let numbers = side.numbers_from(draw);
        let expected = profile.count(side);
        if numbers.len() != expected {
            return Err(ModelError::WrongCount {
                issue: draw.issue.clone(),
                side,
                found: numbers.len(),
                expected,
            });
        }
        let Some(range) = profile.range(side) else {
            continue;
        };

        let mut seen = HashSet::new();
        for raw in numbers {
            let n = parse_number(raw)?;
            if !range.contains(&n) {
                return Err(ModelError::OutOfRange {
                    issue: draw.issue.clone(),
                    number: raw.clone(),
                    min: *range.start(),
                    max: *range.end(),
                });
            }
            if profile.sorted && !seen.insert(n) {
                return Err(ModelError::Duplicate {
                    issue: draw.issue.clone(),
                    number: raw.clone(),
                });
            }
        }
    }
    Ok(())
}
