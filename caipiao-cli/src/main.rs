mod display;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use caipiao_db::db::{count_draws, db_path, fetch_draw, fetch_last_draws, migrate, open_db};
use caipiao_db::import::{import_json, JsonFileSource};
use caipiao_db::models::{normalize_number, DrawResult, Game, Side};
use caipiao_db::rusqlite::Connection;
use caipiao_db::store::{CachedHistory, HistoryStore};
use caipiao_engine::algorithms::{Algorithm, Preset};
use caipiao_engine::analysis::analyze_all;
use caipiao_engine::config::EngineConfig;
use caipiao_engine::engine::PredictionEngine;
use caipiao_engine::verification::verify;

use crate::display::{
    display_analysis, display_catalogue, display_complex, display_draws, display_games,
    display_import_summary, display_predictions, display_verification,
};

#[derive(Parser)]
#[command(name = "caipiao", about = "Analyse et prédiction des loteries chinoises")]
struct Cli {
    /// Base SQLite (défaut : data/caipiao.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Fichier de configuration JSON du moteur
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Journaux détaillés (niveau debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct HistoryArgs {
    /// Jeu (ssq, qlc, fc3d, cjdlt, 7xc, pl3, pl5, kl8)
    #[arg(short, long, default_value = "ssq")]
    game: Game,

    /// Nombre de tirages d'historique
    #[arg(long, default_value = "100")]
    history: u32,

    /// Export JSON servant de source, mis en cache 10 h dans la base
    #[arg(long)]
    source: Option<PathBuf>,

    /// Ignorer la fraîcheur du cache
    #[arg(long)]
    refresh: bool,
}

#[derive(Args)]
struct SelectionArgs {
    /// Préréglage d'algorithmes
    #[arg(short, long, default_value = "comprehensive")]
    preset: Preset,

    /// Liste explicite d'algorithmes, prioritaire sur le préréglage
    #[arg(short, long, value_delimiter = ',')]
    algorithms: Vec<Algorithm>,

    /// Seed pour la reproductibilité
    #[arg(long)]
    seed: Option<u64>,

    /// Sortie JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Importer un export JSON de tirages
    Import {
        /// Chemin vers le fichier JSON
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les jeux supportés
    Games,

    /// Lister les algorithmes et préréglages
    Algorithms,

    /// Lister les derniers tirages
    List {
        #[arg(short, long, default_value = "ssq")]
        game: Game,

        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Statistiques d'un côté de la grille
    Analyze {
        #[command(flatten)]
        history: HistoryArgs,

        /// Analyser les numéros secondaires
        #[arg(long)]
        secondary: bool,
    },

    /// Suggérer des grilles simples
    Predict {
        #[command(flatten)]
        history: HistoryArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Nombre de grilles à suggérer
        #[arg(short, long, default_value = "5")]
        count: usize,
    },

    /// Suggérer un ticket multiple
    Complex {
        #[command(flatten)]
        history: HistoryArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Nombre de combinaisons visé
        #[arg(short, long, default_value = "10")]
        target: u64,
    },

    /// Vérifier une grille contre un tirage
    Verify {
        #[arg(short, long, default_value = "ssq")]
        game: Game,

        /// Numéros principaux, séparés par des virgules
        #[arg(short, long, value_delimiter = ',', required = true)]
        primary: Vec<String>,

        /// Numéros secondaires, séparés par des virgules
        #[arg(short, long, value_delimiter = ',')]
        secondary: Vec<String>,

        /// Tirage de référence (défaut : le plus récent)
        #[arg(short, long)]
        issue: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let path = cli.db.clone().unwrap_or_else(db_path);
    let config = match &cli.config {
        Some(file) => EngineConfig::load(file)?,
        None => EngineConfig::default(),
    };

    if let Command::DbPath = cli.command {
        println!("{}", path.display());
        return Ok(());
    }

    let conn = open_db(&path)?;
    migrate(&conn)?;
    debug!(path = %path.display(), "base ouverte");

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => Ok(()),
        Command::Games => {
            display_games();
            Ok(())
        }
        Command::Algorithms => {
            display_catalogue();
            Ok(())
        }
        Command::List { game, last } => cmd_list(&conn, game, last),
        Command::Analyze { history, secondary } => cmd_analyze(&conn, &config, &history, secondary),
        Command::Predict { history, selection, count } => {
            cmd_predict(&conn, config, &history, &selection, count)
        }
        Command::Complex { history, selection, target } => {
            cmd_complex(&conn, config, &history, &selection, target)
        }
        Command::Verify { game, primary, secondary, issue } => {
            cmd_verify(&conn, game, &primary, &secondary, issue.as_deref())
        }
    }
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    pb.set_message(file.display().to_string());

    let result = import_json(conn, file, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(u64::from(done));
    })?;
    pb.finish_and_clear();

    info!(inserted = result.inserted, skipped = result.skipped, "import terminé");
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, game: Game, last: u32) -> Result<()> {
    if count_draws(conn, game)? == 0 {
        println!("Base vide pour {}. Lancez d'abord : caipiao import --file <export.json>", game);
        return Ok(());
    }
    let draws = fetch_last_draws(conn, game, last)?;
    display_draws(&draws);
    Ok(())
}

/// Historique le plus récent en tête : via le cache si une source est donnée, sinon la base seule.
fn load_history(conn: &Connection, args: &HistoryArgs) -> Result<Vec<DrawResult>> {
    let draws = match &args.source {
        Some(source) => CachedHistory::new(conn, JsonFileSource::new(source))
            .fetch(args.game, args.history, args.refresh)
            .with_context(|| format!("Impossible de charger l'historique depuis {}", source.display()))?,
        None => fetch_last_draws(conn, args.game, args.history)?,
    };
    if draws.is_empty() {
        bail!(
            "Base vide pour {}. Lancez d'abord : caipiao import --file <export.json>",
            args.game
        );
    }
    debug!(game = %args.game, draws = draws.len(), "historique chargé");
    Ok(draws)
}

fn resolve_algorithms(args: &SelectionArgs) -> Result<BTreeSet<Algorithm>> {
    let algorithms: BTreeSet<Algorithm> = if args.algorithms.is_empty() {
        args.preset.algorithms()
    } else {
        args.algorithms.iter().copied().collect()
    };
    if algorithms.is_empty() {
        bail!("Aucun algorithme sélectionné : utilisez --algorithms avec le préréglage custom");
    }
    Ok(algorithms)
}

fn build_engine(config: EngineConfig, seed: Option<u64>) -> PredictionEngine {
    let engine = match seed {
        Some(seed) => PredictionEngine::with_seed(seed),
        None => PredictionEngine::new(),
    };
    engine.with_config(config)
}

fn cmd_analyze(conn: &Connection, config: &EngineConfig, args: &HistoryArgs, secondary: bool) -> Result<()> {
    let side = if secondary { Side::Secondary } else { Side::Primary };
    if args.game.profile().range(side).is_none() {
        bail!("{} n'a pas de numéros secondaires", args.game.display_name());
    }
    let draws = load_history(conn, args)?;
    let report = analyze_all(&draws, args.game, side, config.hot_cold_periods, config.zone_count);
    display_analysis(&report);
    Ok(())
}

fn cmd_predict(
    conn: &Connection,
    config: EngineConfig,
    history: &HistoryArgs,
    selection: &SelectionArgs,
    count: usize,
) -> Result<()> {
    let algorithms = resolve_algorithms(selection)?;
    let draws = load_history(conn, history)?;
    let engine = build_engine(config, selection.seed);

    info!(game = %history.game, algorithms = algorithms.len(), draws = draws.len(), "génération des grilles");
    let predictions = engine.generate_predictions(&draws, history.game, &algorithms, count);

    if selection.json {
        println!("{}", serde_json::to_string_pretty(&predictions)?);
    } else {
        display_predictions(&predictions);
    }
    Ok(())
}

fn cmd_complex(
    conn: &Connection,
    config: EngineConfig,
    history: &HistoryArgs,
    selection: &SelectionArgs,
    target: u64,
) -> Result<()> {
    let algorithms = resolve_algorithms(selection)?;
    let draws = load_history(conn, history)?;
    let engine = build_engine(config, selection.seed);

    info!(game = %history.game, target, "génération du ticket multiple");
    let results = engine.generate_complex_predictions(&draws, history.game, &algorithms, target);

    if selection.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        display_complex(&results);
    }
    Ok(())
}

fn cmd_verify(
    conn: &Connection,
    game: Game,
    primary: &[String],
    secondary: &[String],
    issue: Option<&str>,
) -> Result<()> {
    let primary = primary
        .iter()
        .map(|n| normalize_number(n))
        .collect::<Result<Vec<_>, _>>()
        .context("Numéros principaux invalides")?;
    let secondary = secondary
        .iter()
        .map(|n| normalize_number(n))
        .collect::<Result<Vec<_>, _>>()
        .context("Numéros secondaires invalides")?;

    let draw = match (fetch_draw(conn, game, issue)?, issue) {
        (Some(draw), _) => draw,
        (None, Some(issue)) => bail!("Tirage {} introuvable pour {}", issue, game),
        (None, None) => {
            bail!("Base vide pour {}. Lancez d'abord : caipiao import --file <export.json>", game)
        }
    };

    let result = verify(&primary, &secondary, &draw, game);
    display_verification(&draw, &result);
    Ok(())
}
