use std::collections::BTreeSet;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models;
use crate::scoring::ScoreFn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlgorithmCategory {
    Statistics,
    Pattern,
    Probability,
    Feature,
    Optimization,
    Comprehensive,
}

/// Dimensions de notation. BALANCE est un méta-algorithme sans notation propre.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    Frequency,
    Omission,
    Trend,
    Association,
    Consecutive,
    SameTail,
    Markov,
    Bayes,
    Lstm,
    Genetic,
    SumValue,
    Span,
    AcValue,
    OddEven,
    PrimeComposite,
    Zone,
    Balance,
}

impl Algorithm {
    pub const ALL: [Algorithm; 17] = [
        Algorithm::Frequency,
        Algorithm::Omission,
        Algorithm::Trend,
        Algorithm::Association,
        Algorithm::Consecutive,
        Algorithm::SameTail,
        Algorithm::Markov,
        Algorithm::Bayes,
        Algorithm::Lstm,
        Algorithm::Genetic,
        Algorithm::SumValue,
        Algorithm::Span,
        Algorithm::AcValue,
        Algorithm::OddEven,
        Algorithm::PrimeComposite,
        Algorithm::Zone,
        Algorithm::Balance,
    ];

    pub fn category(&self) -> AlgorithmCategory {
        match self {
            Algorithm::Frequency | Algorithm::Omission | Algorithm::Trend => AlgorithmCategory::Statistics,
            Algorithm::Association | Algorithm::Consecutive | Algorithm::SameTail => AlgorithmCategory::Pattern,
            Algorithm::Markov | Algorithm::Bayes | Algorithm::Lstm | Algorithm::Genetic => {
                AlgorithmCategory::Probability
            }
            Algorithm::SumValue | Algorithm::Span | Algorithm::AcValue => AlgorithmCategory::Feature,
            Algorithm::OddEven | Algorithm::PrimeComposite | Algorithm::Zone => AlgorithmCategory::Optimization,
            Algorithm::Balance => AlgorithmCategory::Comprehensive,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Algorithm::Frequency => "Fréquence",
            Algorithm::Omission => "Omission",
            Algorithm::Trend => "Tendance",
            Algorithm::Association => "Association",
            Algorithm::Consecutive => "Consécutifs",
            Algorithm::SameTail => "Même finale",
            Algorithm::Markov => "Markov",
            Algorithm::Bayes => "Bayes",
            Algorithm::Lstm => "Séquence (LSTM)",
            Algorithm::Genetic => "Génétique",
            Algorithm::SumValue => "Somme",
            Algorithm::Span => "Écart",
            Algorithm::AcValue => "Valeur AC",
            Algorithm::OddEven => "Pair/impair",
            Algorithm::PrimeComposite => "Premier/composé",
            Algorithm::Zone => "Zones",
            Algorithm::Balance => "Équilibre",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Algorithm::Frequency => "Taux d'apparition sur tout l'historique",
            Algorithm::Omission => "Absence courante rapportée à la plus longue absence",
            Algorithm::Trend => "Fréquence récente contre fréquence plus ancienne",
            Algorithm::Association => "Co-occurrences moyennes avec les autres numéros",
            Algorithm::Consecutive => "Tirages où le voisin n±1 sort aussi",
            Algorithm::SameTail => "Tirages contenant un autre numéro de même finale",
            Algorithm::Markov => "Transition depuis l'état du dernier tirage",
            Algorithm::Bayes => "Postérieure à partir du taux global et de la fenêtre récente",
            Algorithm::Lstm => "Modèle de séquence, ou moyenne mobile exponentielle à défaut",
            Algorithm::Genetic => "Fitness combinée fréquence/omission/tendance/association",
            Algorithm::SumValue => "Contrainte de somme de la grille",
            Algorithm::Span => "Contrainte d'écart max-min",
            Algorithm::AcValue => "Contrainte de valeur AC",
            Algorithm::OddEven => "Contrainte de parité",
            Algorithm::PrimeComposite => "Contrainte premiers/composés",
            Algorithm::Zone => "Répartition par zones",
            Algorithm::Balance => "Score global et équilibre grand/petit",
        }
    }

    /// Fonction de notation par numéro ; `None` pour BALANCE.
    pub fn scorer(&self) -> Option<ScoreFn> {
        let f: ScoreFn = match self {
            Algorithm::Frequency => models::frequency::score,
            Algorithm::Omission => models::omission::score,
            Algorithm::Trend => models::trend::score,
            Algorithm::Association => models::association::score,
            Algorithm::Consecutive => models::consecutive::score,
            Algorithm::SameTail => models::same_tail::score,
            Algorithm::Markov => models::markov::score,
            Algorithm::Bayes => models::bayes::score,
            Algorithm::Lstm => models::sequence::score,
            Algorithm::Genetic => models::genetic::score,
            Algorithm::SumValue | Algorithm::Span | Algorithm::AcValue | Algorithm::OddEven | Algorithm::Zone => {
                models::features::neutral
            }
            Algorithm::PrimeComposite => models::features::prime_composite,
            Algorithm::Balance => return None,
        };
        Some(f)
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl AlgorithmCategory {
    pub fn algorithms(&self) -> Vec<Algorithm> {
        Algorithm::ALL.iter().copied().filter(|a| a.category() == *self).collect()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AlgorithmCategory::Statistics => "Statistiques",
            AlgorithmCategory::Pattern => "Motifs",
            AlgorithmCategory::Probability => "Probabilités",
            AlgorithmCategory::Feature => "Caractéristiques",
            AlgorithmCategory::Optimization => "Optimisation",
            AlgorithmCategory::Comprehensive => "Synthèse",
        }
    }
}

/// Combinaisons d'algorithmes prédéfinies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Preset {
    Conservative,
    Aggressive,
    Probability,
    Feature,
    Comprehensive,
    Custom,
}

impl Preset {
    pub fn algorithms(&self) -> BTreeSet<Algorithm> {
        use Algorithm::*;
        let list: &[Algorithm] = match self {
            Preset::Conservative => &[Frequency, Omission, Balance],
            Preset::Aggressive => &[Omission, Trend, Markov, AcValue],
            Preset::Probability => &[Markov, Bayes, Frequency, Trend],
            Preset::Feature => &[SumValue, Span, AcValue, OddEven, PrimeComposite],
            Preset::Comprehensive => &[Frequency, Omission, Trend, Association, Markov, Bayes, SumValue, OddEven, Balance],
            Preset::Custom => &[],
        };
        list.iter().copied().collect()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Preset::Conservative => "Prudent",
            Preset::Aggressive => "Offensif",
            Preset::Probability => "Probabiliste",
            Preset::Feature => "Caractéristiques",
            Preset::Comprehensive => "Complet",
            Preset::Custom => "Personnalisé",
        }
    }
}
