use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::db;
use crate::models::{validate_draw, DrawResult, Game};

pub const CACHE_TTL_HOURS: i64 = 10;

/// Historique ordonné d'un jeu, le plus récent en tête.
pub trait HistoryStore {
    fn fetch(&self, game: Game, size: u32, force_refresh: bool) -> Result<Vec<DrawResult>>;
}

/// Fournisseur amont des tirages (API publique, export JSON...).
pub trait DrawSource {
    fn fetch(&self, game: Game, size: u32) -> Result<Vec<DrawResult>>;
}

fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Cache SQLite devant une source : frais pendant `CACHE_TTL_HOURS`, périmé servi en secours.
pub struct CachedHistory<'a, S: DrawSource> {
    conn: &'a Connection,
    source: S,
    ttl_secs: i64,
    clock: fn() -> i64,
}

impl<'a, S: DrawSource> CachedHistory<'a, S> {
    pub fn new(conn: &'a Connection, source: S) -> Self {
        Self {
            conn,
            source,
            ttl_secs: CACHE_TTL_HOURS * 3600,
            clock: now_timestamp,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    fn is_fresh(&self, game: Game) -> Result<bool> {
        let Some(ts) = db::last_update(self.conn, game)? else {
            return Ok(false);
        };
        Ok((self.clock)() - ts < self.ttl_secs && db::count_draws(self.conn, game)? > 0)
    }

    /// Insère les tirages valides, écarte les autres. Retourne le nombre de nouveaux tirages.
    fn store(&self, draws: &[DrawResult]) -> Result<u32> {
        let tx = self.conn.unchecked_transaction()
            .context("Impossible de démarrer la transaction")?;
        let mut inserted = 0;
        for draw in draws {
            if let Err(e) = validate_draw(draw) {
                warn!(issue = %draw.issue, game = %draw.game, "tirage rejeté : {}", e);
                continue;
            }
            if db::insert_draw(&tx, draw)? {
                inserted += 1;
            }
        }
        tx.commit().context("Échec du commit")?;
        Ok(inserted)
    }
}

impl<S: DrawSource> HistoryStore for CachedHistory<'_, S> {
    fn fetch(&self, game: Game, size: u32, force_refresh: bool) -> Result<Vec<DrawResult>> {
        if force_refresh {
            db::invalidate_cache(self.conn, game)?;
        }

        if self.is_fresh(game)? {
            debug!(%game, "historique servi depuis le cache");
            return db::fetch_last_draws(self.conn, game, size);
        }

        match self.source.fetch(game, size) {
            Ok(draws) => {
                let inserted = self.store(&draws)?;
                db::touch_cache(self.conn, game, (self.clock)())?;
                debug!(%game, received = draws.len(), inserted, "cache rafraîchi");
                db::fetch_last_draws(self.conn, game, size)
            }
            Err(e) => {
                if db::count_draws(self.conn, game)? > 0 {
                    warn!(%game, "source indisponible, cache périmé utilisé : {:#}", e);
                    db::fetch_last_draws(self.conn, game, size)
                } else {
                    Err(e.context(format!("Aucun historique disponible pour {}", game)))
                }
            }
        }
    }
}
