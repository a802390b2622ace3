use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use caipiao_db::import::ImportResult;
use caipiao_db::models::{DrawResult, Game};
use caipiao_engine::algorithms::{Algorithm, AlgorithmCategory, Preset};
use caipiao_engine::analysis::{AnalysisReport, RatioStat, Temperature};
use caipiao_engine::engine::{ComplexPredictionResult, PredictionResult};
use caipiao_engine::verification::Verification;

/// Nombre de lignes affichées par tableau de distribution.
const TOP_ROWS: usize = 10;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn joined(numbers: &[String]) -> String {
    if numbers.is_empty() {
        return "—".to_string();
    }
    numbers.join(" - ")
}

pub fn display_draws(draws: &[DrawResult]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Tirage", "Date", "Principaux", "Secondaires", "Ventes", "Cagnotte"]);
    for draw in draws {
        table.add_row(vec![
            draw.issue.clone(),
            draw.draw_date.clone(),
            joined(&draw.primary),
            joined(&draw.secondary),
            draw.sale_money.clone().unwrap_or_else(|| "—".to_string()),
            draw.prize_pool.clone().unwrap_or_else(|| "—".to_string()),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total enregistrements : {}", result.total_records);
    println!("  Insérés               : {}", result.inserted);
    println!("  Doublons ignorés      : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs               : {}", result.errors);
    }
}

pub fn display_games() {
    let mut table = new_table(vec!["Code", "Jeu", "Principaux", "Secondaires", "Ordre"]);
    for game in Game::ALL {
        let profile = game.profile();
        let secondary = match &profile.secondary_range {
            Some(range) => format!("{} parmi {:02}-{:02}", profile.secondary_count, range.start(), range.end()),
            None => "—".to_string(),
        };
        table.add_row(vec![
            game.code().to_string(),
            game.display_name().to_string(),
            format!(
                "{} parmi {:02}-{:02}",
                profile.primary_count,
                profile.primary_range.start(),
                profile.primary_range.end()
            ),
            secondary,
            if profile.sorted { "trié" } else { "positionnel" }.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_catalogue() {
    for category in [
        AlgorithmCategory::Statistics,
        AlgorithmCategory::Pattern,
        AlgorithmCategory::Probability,
        AlgorithmCategory::Feature,
        AlgorithmCategory::Optimization,
        AlgorithmCategory::Comprehensive,
    ] {
        println!("\n── {} ──", category.display_name());
        let mut table = new_table(vec!["Algorithme", "Nom", "Description"]);
        for algorithm in category.algorithms() {
            table.add_row(vec![
                format!("{:?}", algorithm),
                algorithm.display_name().to_string(),
                algorithm.description().to_string(),
            ]);
        }
        println!("{table}");
    }

    println!("\n── Préréglages ──");
    let mut table = new_table(vec!["Préréglage", "Nom", "Algorithmes"]);
    for preset in [
        Preset::Conservative,
        Preset::Aggressive,
        Preset::Probability,
        Preset::Feature,
        Preset::Comprehensive,
        Preset::Custom,
    ] {
        let names: Vec<&str> = preset.algorithms().iter().map(Algorithm::display_name).collect();
        table.add_row(vec![
            format!("{:?}", preset),
            preset.display_name().to_string(),
            if names.is_empty() { "—".to_string() } else { names.join(", ") },
        ]);
    }
    println!("{table}");
}

// ════════════════════════════════════════════════════════════════
// Analyse
// ════════════════════════════════════════════════════════════════

fn ratio_table(title: &str, stats: &[RatioStat]) {
    println!("\n── {} ──", title);
    let mut table = new_table(vec!["Ratio", "Tirages", "Fréquence"]);
    for stat in stats.iter().take(TOP_ROWS) {
        table.add_row(vec![
            stat.ratio.clone(),
            stat.count.to_string(),
            format!("{:.1}%", stat.frequency),
        ]);
    }
    println!("{table}");
}

pub fn display_analysis(report: &AnalysisReport) {
    println!(
        "\n📊 {} ({}) : numéros {} sur {} tirages\n",
        report.game.display_name(),
        report.game,
        report.side,
        report.history_size
    );

    println!("── Absences ──");
    let mut table = new_table(vec!["Numéro", "Actuelle", "Max", "Moyenne"]);
    for stat in report.omission.iter().take(TOP_ROWS) {
        table.add_row(vec![
            stat.number.clone(),
            stat.current.to_string(),
            stat.max.to_string(),
            format!("{:.1}", stat.avg),
        ]);
    }
    println!("{table}");

    println!("\n── Fréquences ──");
    let mut table = new_table(vec!["Numéro", "Sorties", "Fréquence", "Dernier tirage"]);
    for stat in report.frequency.iter().take(TOP_ROWS) {
        table.add_row(vec![
            stat.number.clone(),
            stat.count.to_string(),
            format!("{:.1}%", stat.frequency),
            stat.last_issue.clone().unwrap_or_else(|| "—".to_string()),
        ]);
    }
    println!("{table}");

    println!("\n── Chaud / froid ──");
    let mut table = new_table(vec!["Numéro", "Température", "Récents", "Catégorie"]);
    for stat in &report.hot_cold {
        let color = match stat.category {
            Temperature::Hot => Color::Red,
            Temperature::Warm => Color::Yellow,
            Temperature::Cold => Color::Blue,
        };
        table.add_row(vec![
            Cell::new(&stat.number),
            Cell::new(format!("{:.2}", stat.temperature)),
            Cell::new(stat.recent_count),
            Cell::new(stat.category.to_string()).fg(color),
        ]);
    }
    println!("{table}");

    println!("\n── Consécutifs ──");
    let mut table = new_table(vec!["Paire", "Tirages", "Fréquence"]);
    for stat in report.consecutive.iter().take(TOP_ROWS) {
        table.add_row(vec![stat.numbers.join("-"), stat.count.to_string(), format!("{:.1}%", stat.frequency)]);
    }
    println!("{table}");

    println!("\n── Finales ──");
    let mut table = new_table(vec!["Finale", "Numéros", "Sorties", "Fréquence"]);
    for stat in &report.same_tail {
        table.add_row(vec![
            stat.tail.to_string(),
            stat.numbers.join(","),
            stat.count.to_string(),
            format!("{:.1}%", stat.frequency),
        ]);
    }
    println!("{table}");

    println!("\n── Sommes ──");
    let mut table = new_table(vec!["Somme", "Tirages", "Fréquence", "Impairs:pairs"]);
    for stat in report.sum_value.iter().take(TOP_ROWS) {
        table.add_row(vec![
            stat.sum.to_string(),
            stat.count.to_string(),
            format!("{:.1}%", stat.frequency),
            stat.odd_even_ratio.clone(),
        ]);
    }
    println!("{table}");

    println!("\n── Écarts ──");
    let mut table = new_table(vec!["Écart", "Tirages", "Fréquence"]);
    for stat in report.span.iter().take(TOP_ROWS) {
        table.add_row(vec![stat.span.to_string(), stat.count.to_string(), format!("{:.1}%", stat.frequency)]);
    }
    println!("{table}");

    println!("\n── Valeur AC ──");
    let mut table = new_table(vec!["AC", "Tirages", "Fréquence"]);
    for stat in report.ac_value.iter().take(TOP_ROWS) {
        table.add_row(vec![stat.ac.to_string(), stat.count.to_string(), format!("{:.1}%", stat.frequency)]);
    }
    println!("{table}");

    ratio_table("Impairs:pairs", &report.odd_even);
    ratio_table("Grands:petits", &report.size_ratio);
    ratio_table("Premiers:composés", &report.prime_composite);

    println!("\n── Zones ──");
    let mut table = new_table(vec!["Zone", "Plage", "Sorties", "Fréquence"]);
    for stat in &report.zone {
        table.add_row(vec![
            stat.zone.to_string(),
            stat.range.clone(),
            stat.count.to_string(),
            format!("{:.1}%", stat.frequency),
        ]);
    }
    println!("{table}");
}

// ════════════════════════════════════════════════════════════════
// Prédictions
// ════════════════════════════════════════════════════════════════

fn score_cell(score: f64) -> Cell {
    let color = if score >= 70.0 {
        Color::Green
    } else if score >= 40.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{:.1}", score)).fg(color)
}

pub fn display_predictions(predictions: &[PredictionResult]) {
    if predictions.is_empty() {
        println!("Aucune prédiction (historique insuffisant).");
        return;
    }

    println!("\n🎲 Grilles suggérées\n");
    let mut table = new_table(vec!["#", "Principaux", "Secondaires", "Score", "Explication"]);
    for (i, p) in predictions.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(joined(&p.primary)),
            Cell::new(joined(&p.secondary)),
            score_cell(p.total_score),
            Cell::new(&p.explanation),
        ]);
    }
    println!("{table}");

    if let Some(first) = predictions.first() {
        println!("\n── Détail par algorithme (grille 1) ──");
        let mut table = new_table(vec!["Algorithme", "Score"]);
        for (algorithm, score) in &first.algorithm_scores {
            table.add_row(vec![Cell::new(algorithm.display_name()), score_cell(*score)]);
        }
        println!("{table}");
    }
}

pub fn display_complex(results: &[ComplexPredictionResult]) {
    let Some(r) = results.first() else {
        println!("Aucun ticket multiple (historique insuffisant).");
        return;
    };

    println!("\n🎫 Ticket multiple\n");
    let mut table = new_table(vec!["Champ", "Valeur"]);
    table.add_row(vec![Cell::new("Principaux"), Cell::new(joined(&r.primary))]);
    table.add_row(vec![Cell::new("Secondaires"), Cell::new(joined(&r.secondary))]);
    table.add_row(vec![Cell::new("Combinaisons"), Cell::new(r.combination_count)]);
    table.add_row(vec![Cell::new("Couverture"), Cell::new(format!("{:.0}%", r.coverage_rate * 100.0))]);
    table.add_row(vec![Cell::new("Score"), score_cell(r.total_score)]);
    table.add_row(vec![Cell::new("Chauds"), Cell::new(joined(&r.hot_numbers)).fg(Color::Red)]);
    table.add_row(vec![Cell::new("Froids"), Cell::new(joined(&r.cold_numbers)).fg(Color::Blue)]);
    table.add_row(vec![Cell::new("Explication"), Cell::new(&r.explanation)]);
    println!("{table}");
}

pub fn display_verification(draw: &DrawResult, result: &Verification) {
    println!("\nTirage {} du {}", draw.issue, draw.draw_date);
    let mut table = new_table(vec!["", "Principaux", "Secondaires"]);
    table.add_row(vec!["Tirage".to_string(), joined(&draw.primary), joined(&draw.secondary)]);
    table.add_row(vec![
        "Trouvés".to_string(),
        joined(&result.matched_primary),
        joined(&result.matched_secondary),
    ]);
    println!("{table}");

    let color = if result.is_win { Color::Green } else { Color::Red };
    let mut table = new_table(vec!["Résultat"]);
    table.add_row(vec![Cell::new(&result.message).fg(color)]);
    println!("{table}");
}
