use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::models::{DrawResult, Game};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    game          TEXT NOT NULL,
    issue         TEXT NOT NULL,
    draw_date     TEXT NOT NULL,
    primary_nums  TEXT NOT NULL,
    secondary_nums TEXT NOT NULL DEFAULT '',
    sale_money    TEXT,
    prize_pool    TEXT,
    PRIMARY KEY (game, issue)
);
CREATE TABLE IF NOT EXISTS cache_meta (
    game          TEXT PRIMARY KEY,
    last_update   INTEGER NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("caipiao.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

fn join_numbers(numbers: &[String]) -> String {
    numbers.join(" ")
}

fn split_numbers(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

pub fn insert_draw(conn: &Connection, draw: &DrawResult) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (game, issue, draw_date, primary_nums, secondary_nums, sale_money, prize_pool)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            draw.game.code(),
            draw.issue,
            draw.draw_date,
            join_numbers(&draw.primary),
            join_numbers(&draw.secondary),
            draw.sale_money,
            draw.prize_pool,
        ],
    ).context("Échec de l'insertion")?;
    Ok(changed > 0)
}

const DRAW_COLUMNS: &str = "issue, draw_date, primary_nums, secondary_nums, sale_money, prize_pool";

fn row_to_draw(game: Game, row: &rusqlite::Row<'_>) -> rusqlite::Result<DrawResult> {
    Ok(DrawResult {
        game,
        issue: row.get(0)?,
        draw_date: row.get(1)?,
        primary: split_numbers(&row.get::<_, String>(2)?),
        secondary: split_numbers(&row.get::<_, String>(3)?),
        sale_money: row.get(4)?,
        prize_pool: row.get(5)?,
    })
}

/// Derniers tirages d'un jeu, le plus récent en tête.
pub fn fetch_last_draws(conn: &Connection, game: Game, limit: u32) -> Result<Vec<DrawResult>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DRAW_COLUMNS} FROM draws WHERE game = ?1 ORDER BY draw_date DESC, issue DESC LIMIT ?2"
    ))?;
    let draws = stmt
        .query_map(rusqlite::params![game.code(), limit], |row| row_to_draw(game, row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

/// Le plus récent tirage d'un jeu, ou celui d'un numéro de tirage donné.
pub fn fetch_draw(conn: &Connection, game: Game, issue: Option<&str>) -> Result<Option<DrawResult>> {
    let draw = match issue {
        Some(issue) => conn
            .query_row(
                &format!("SELECT {DRAW_COLUMNS} FROM draws WHERE game = ?1 AND issue = ?2"),
                rusqlite::params![game.code(), issue],
                |row| row_to_draw(game, row),
            )
            .optional()?,
        None => fetch_last_draws(conn, game, 1)?.into_iter().next(),
    };
    Ok(draw)
}

pub fn count_draws(conn: &Connection, game: Game) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM draws WHERE game = ?1",
        [game.code()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Invalide la fraîcheur du cache d'un jeu ; les tirages restent disponibles en secours.
pub fn invalidate_cache(conn: &Connection, game: Game) -> Result<()> {
    conn.execute("DELETE FROM cache_meta WHERE game = ?1", [game.code()])
        .context("Échec de l'invalidation du cache")?;
    Ok(())
}

pub fn touch_cache(conn: &Connection, game: Game, timestamp: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO cache_meta (game, last_update) VALUES (?1, ?2)
         ON CONFLICT(game) DO UPDATE SET last_update = excluded.last_update",
        rusqlite::params![game.code(), timestamp],
    ).context("Échec de la mise à jour du cache")?;
    Ok(())
}

pub fn last_update(conn: &Connection, game: Game) -> Result<Option<i64>> {
    let ts = conn
        .query_row(
            "SELECT last_update FROM cache_meta WHERE game = ?1",
            [game.code()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(ts)
}
