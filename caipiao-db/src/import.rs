use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::db::insert_draw;
use crate::models::{normalize_number, validate_draw, DrawResult, Game};
use crate::store::DrawSource;

/// Enregistrement tel que publié par l'API des résultats officiels.
#[derive(Debug, Deserialize)]
pub struct DrawRecord {
    pub code: String,
    pub issue: String,
    pub red: String,
    #[serde(default)]
    pub blue: String,
    #[serde(rename = "drawdate")]
    pub draw_date: String,
    #[serde(default)]
    pub sale_money: Option<String>,
    #[serde(default)]
    pub prize_pool: Option<String>,
}

fn split_numbers(raw: &str) -> Result<Vec<String>> {
    raw.split_whitespace()
        .map(|s| normalize_number(s).map_err(Into::into))
        .collect()
}

impl DrawRecord {
    pub fn to_draw(&self) -> Result<DrawResult> {
        let game: Game = self.code.parse()?;
        Ok(DrawResult {
            game,
            issue: self.issue.trim().to_string(),
            primary: split_numbers(&self.red)
                .with_context(|| format!("Numéros principaux invalides (tirage {})", self.issue))?,
            secondary: split_numbers(&self.blue)
                .with_context(|| format!("Numéros secondaires invalides (tirage {})", self.issue))?,
            draw_date: self.draw_date.trim().to_string(),
            sale_money: self.sale_money.clone(),
            prize_pool: self.prize_pool.clone(),
        })
    }
}

pub fn read_records(path: &Path) -> Result<Vec<DrawRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("JSON invalide dans {:?}", path))
}

/// Source de tirages lue depuis un export JSON local.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DrawSource for JsonFileSource {
    fn fetch(&self, game: Game, size: u32) -> Result<Vec<DrawResult>> {
        let mut draws = Vec::new();
        for record in read_records(&self.path)? {
            if !record.code.eq_ignore_ascii_case(game.code()) {
                continue;
            }
            match record.to_draw() {
                Ok(draw) => draws.push(draw),
                Err(e) => warn!("enregistrement ignoré : {:#}", e),
            }
        }
        draws.sort_by(|a, b| b.draw_date.cmp(&a.draw_date).then_with(|| b.issue.cmp(&a.issue)));
        draws.truncate(size as usize);
        Ok(draws)
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Importe un export JSON. `on_record` est appelé après chaque enregistrement (barre de progression).
pub fn import_json(
    conn: &Connection,
    path: &Path,
    mut on_record: impl FnMut(u32, usize),
) -> Result<ImportResult> {
    let records = read_records(path)?;

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult::default();

    for record in &records {
        result.total_records += 1;
        let parsed = record
            .to_draw()
            .and_then(|draw| validate_draw(&draw).map(|_| draw).map_err(Into::into));
        match parsed {
            Ok(draw) => match insert_draw(&tx, &draw) {
                Ok(true) => result.inserted += 1,
                Ok(false) => result.skipped += 1,
                Err(e) => {
                    warn!("Erreur insertion tirage {} : {:#}", record.issue, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                warn!("Erreur lecture enregistrement {} : {:#}", result.total_records, e);
                result.errors += 1;
            }
        }
        on_record(result.total_records, records.len());
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_draws, migrate};
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {"code": "ssq", "issue": "2024002", "red": "3 9 14 20 27 31", "blue": "12",
         "drawdate": "2024-01-04", "sale_money": "360000000", "prize_pool": "2000000000"},
        {"code": "ssq", "issue": "2024001", "red": "01 05 12 20 28 33", "blue": "16",
         "drawdate": "2024-01-02"},
        {"code": "fc3d", "issue": "2024010", "red": "3 3 7", "blue": "",
         "drawdate": "2024-01-10"},
        {"code": "ssq", "issue": "2024003", "red": "01 05 12", "blue": "16",
         "drawdate": "2024-01-07"},
        {"code": "euro", "issue": "1", "red": "1 2 3 4 5", "blue": "1 2",
         "drawdate": "2024-01-07"}
    ]"#;

    fn sample_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_record_normalizes_numbers() {
        let records: Vec<DrawRecord> = serde_json::from_str(SAMPLE).unwrap();
        let draw = records[0].to_draw().unwrap();
        assert_eq!(draw.game, Game::Ssq);
        assert_eq!(draw.primary, vec!["03", "09", "14", "20", "27", "31"]);
        assert_eq!(draw.secondary, vec!["12"]);
        assert_eq!(draw.sale_money.as_deref(), Some("360000000"));
    }

    #[test]
    fn test_import_counts() {
        let file = sample_file();
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let mut calls = 0;
        let result = import_json(&conn, file.path(), |_, _| calls += 1).unwrap();
        assert_eq!(result.total_records, 5);
        assert_eq!(result.inserted, 3);
        assert_eq!(result.errors, 2);
        assert_eq!(calls, 5);
        assert_eq!(count_draws(&conn, Game::Ssq).unwrap(), 2);
        assert_eq!(count_draws(&conn, Game::Fc3d).unwrap(), 1);

        let again = import_json(&conn, file.path(), |_, _| {}).unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(again.skipped, 3);
    }

    #[test]
    fn test_json_source_filters_and_orders() {
        let file = sample_file();
        let source = JsonFileSource::new(file.path());
        let draws = source.fetch(Game::Ssq, 2).unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].issue, "2024003");
        assert_eq!(draws[1].issue, "2024002");
    }

    #[test]
    fn test_missing_file_is_error() {
        let source = JsonFileSource::new("/nonexistent/caipiao.json");
        assert!(source.fetch(Game::Ssq, 10).is_err());
    }
}
