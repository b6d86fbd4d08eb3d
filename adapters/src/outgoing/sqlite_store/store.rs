use canvas_application::error::{AppError, AppResult};
use canvas_application::ports::outgoing::persistence::PersistenceStorePort;
use domain::coords::CellCoord;
use domain::economy::TileEconomy;
use domain::host::Host;
use domain::rate_limiter::RateLimiter;
use domain::tile::{Tile, TileDelta};
use domain::user::{User, UserId};
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use super::executor::{begin_transaction, commit_transaction, SqliteExecutor};
use super::schema::{CREATE_HOSTS, CREATE_TILES, CREATE_USERS};

pub struct SqliteStoreAdapter {
    pool: SqlitePool,
    executor: SqliteExecutor,
}

impl SqliteStoreAdapter {
    #[must_use]
    pub const fn new(pool: SqlitePool, query_timeout_secs: u64) -> Self {
        Self {
            pool,
            executor: SqliteExecutor::new(query_timeout_secs),
        }
    }
}

fn split_micros(micros: i64) -> (i64, i64) {
    (micros.div_euclid(1_000_000), micros.rem_euclid(1_000_000))
}

fn join_micros(sec: i64, usec: i64) -> i64 {
    sec * 1_000_000 + usec
}

#[async_trait::async_trait]
impl PersistenceStorePort for SqliteStoreAdapter {
    #[instrument(skip(self))]
    async fn open_or_create(&self) -> AppResult<()> {
        for statement in [CREATE_TILES, CREATE_USERS, CREATE_HOSTS] {
            self.executor
                .execute_with_timeout(
                    || sqlx::query(statement).execute(&self.pool),
                    "failed to create schema",
                )
                .await?;
        }
        Ok(())
    }

    async fn tile_count(&self) -> AppResult<i64> {
        let row = self
            .executor
            .execute_with_timeout(
                || sqlx::query("SELECT COUNT(*) AS n FROM tiles").fetch_one(&self.pool),
                "failed to count tiles",
            )
            .await?;
        row.try_get::<i64, _>("n").map_err(|e| AppError::Database {
            message: format!("malformed tile count row: {e}"),
        })
    }

    #[instrument(skip(self))]
    async fn bulk_fill_tiles(&self, edge_length: u16, fill_color_id: u8) -> AppResult<()> {
        let mut tx = begin_transaction(&self.pool).await?;
        for y in 0..edge_length {
            for x in 0..edge_length {
                sqlx::query(
                    "INSERT INTO tiles (x, y, color_id, place_time, last_modifier) \
                     VALUES (?, ?, ?, 0, '')",
                )
                .bind(i64::from(x))
                .bind(i64::from(y))
                .bind(i64::from(fill_color_id))
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::Database {
                    message: format!("failed to seed tile ({x},{y}): {e}"),
                })?;
            }
        }
        commit_transaction(tx).await
    }

    #[instrument(skip(self))]
    async fn load_all_tiles(&self, edge_length: u16) -> AppResult<Vec<Tile>> {
        let rows = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query("SELECT x, y, color_id, place_time, last_modifier FROM tiles")
                        .fetch_all(&self.pool)
                },
                "failed to load tiles",
            )
            .await?;

        let area = usize::from(edge_length) * usize::from(edge_length);
        let mut grid = vec![Tile::new(0); area];
        for row in rows {
            let x: i64 = row.try_get("x").map_err(|e| AppError::Database {
                message: format!("malformed tile row (x): {e}"),
            })?;
            let y: i64 = row.try_get("y").map_err(|e| AppError::Database {
                message: format!("malformed tile row (y): {e}"),
            })?;
            let coord = CellCoord::new(x as u16, y as u16);
            let Ok(index) = usize::try_from(coord.to_index(edge_length)) else {
                continue;
            };
            if let Some(slot) = grid.get_mut(index) {
                let color_id: i64 =
                    row.try_get("color_id").map_err(|e| AppError::Database {
                        message: format!("malformed tile row (color_id): {e}"),
                    })?;
                let place_time: i64 =
                    row.try_get("place_time").map_err(|e| AppError::Database {
                        message: format!("malformed tile row (place_time): {e}"),
                    })?;
                let last_modifier: String =
                    row.try_get("last_modifier").map_err(|e| AppError::Database {
                        message: format!("malformed tile row (last_modifier): {e}"),
                    })?;
                *slot = Tile {
                    color_id: color_id as u8,
                    place_time,
                    last_modifier,
                };
            }
        }
        Ok(grid)
    }

    #[instrument(skip(self))]
    async fn load_user(&self, id: UserId) -> AppResult<Option<User>> {
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query("SELECT * FROM users WHERE id = ?")
                        .bind(id.to_string())
                        .fetch_optional(&self.pool)
                },
                "failed to load user",
            )
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let get_i64 = |col: &'static str| -> AppResult<i64> {
            row.try_get(col).map_err(|e| AppError::Database {
                message: format!("malformed user row ({col}): {e}"),
            })
        };
        let get_f64 = |col: &'static str| -> AppResult<f64> {
            row.try_get(col).map_err(|e| AppError::Database {
                message: format!("malformed user row ({col}): {e}"),
            })
        };

        let canvas_limiter = RateLimiter {
            last_event_micros: join_micros(get_i64("cl_last_event_sec")?, get_i64("cl_last_event_usec")?),
            current_allowance: get_f64("cl_current_allowance")?,
            max_rate: get_f64("cl_max_rate")?,
            per_seconds: get_f64("cl_per_seconds")?,
        };
        let tile_limiter = RateLimiter {
            last_event_micros: join_micros(get_i64("tl_last_event_sec")?, get_i64("tl_last_event_usec")?),
            current_allowance: get_f64("tl_current_allowance")?,
            max_rate: get_f64("tl_max_rate")?,
            per_seconds: get_f64("tl_per_seconds")?,
        };
        let economy = TileEconomy {
            remaining: get_i64("remaining")? as i32,
            max: get_i64("max_tiles")? as i32,
            regen_seconds: get_i64("regen_seconds")? as i32,
            total_placed: get_i64("total_placed")?,
            level: get_i64("level")? as i32,
            progress_in_level: get_i64("progress_in_level")? as i32,
            tiles_to_next_level: get_i64("tiles_to_next_level")? as i32,
        };

        Ok(Some(User {
            id,
            display_name: row.try_get("display_name").map_err(|e| AppError::Database {
                message: format!("malformed user row (display_name): {e}"),
            })?,
            has_set_username: get_i64("has_set_username")? != 0,
            is_shadow_banned: get_i64("is_shadow_banned")? != 0,
            canvas_limiter,
            tile_limiter,
            economy,
            last_connected: get_i64("last_connected")?,
            last_event: get_i64("last_event")?,
        }))
    }

    async fn load_host(&self, address: &str) -> AppResult<Option<Host>> {
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query("SELECT address, total_accounts FROM hosts WHERE address = ?")
                        .bind(address)
                        .fetch_optional(&self.pool)
                },
                "failed to load host",
            )
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let total_accounts: i64 =
            row.try_get("total_accounts").map_err(|e| AppError::Database {
                message: format!("malformed host row: {e}"),
            })?;
        Ok(Some(Host {
            address: address.to_string(),
            total_accounts,
        }))
    }

    #[instrument(skip(self, user))]
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        bind_user_insert(sqlx::query(
            "INSERT INTO users (
                id, display_name, has_set_username, is_shadow_banned,
                cl_last_event_sec, cl_last_event_usec, cl_current_allowance, cl_max_rate, cl_per_seconds,
                tl_last_event_sec, tl_last_event_usec, tl_current_allowance, tl_max_rate, tl_per_seconds,
                remaining, max_tiles, regen_seconds, total_placed, level, progress_in_level, tiles_to_next_level,
                last_connected, last_event
            ) VALUES (?,?,?,?, ?,?,?,?,?, ?,?,?,?,?, ?,?,?,?,?,?,?, ?,?)",
        ), user)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| AppError::Database {
            message: format!("failed to insert user {}: {e}", user.id),
        })
    }

    async fn insert_host(&self, host: &Host) -> AppResult<()> {
        sqlx::query("INSERT INTO hosts (address, total_accounts) VALUES (?, ?)")
            .bind(&host.address)
            .bind(host.total_accounts)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| AppError::Database {
                message: format!("failed to insert host {}: {e}", host.address),
            })
    }

    #[instrument(skip(self, user))]
    async fn update_user(&self, user: &User) -> AppResult<()> {
        bind_user_update(sqlx::query(
            "UPDATE users SET
                display_name = ?, has_set_username = ?, is_shadow_banned = ?,
                cl_last_event_sec = ?, cl_last_event_usec = ?, cl_current_allowance = ?, cl_max_rate = ?, cl_per_seconds = ?,
                tl_last_event_sec = ?, tl_last_event_usec = ?, tl_current_allowance = ?, tl_max_rate = ?, tl_per_seconds = ?,
                remaining = ?, max_tiles = ?, regen_seconds = ?, total_placed = ?, level = ?, progress_in_level = ?, tiles_to_next_level = ?,
                last_connected = ?, last_event = ?
            WHERE id = ?",
        ), user)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| AppError::Database {
            message: format!("failed to update user {}: {e}", user.id),
        })
    }

    async fn update_host(&self, host: &Host) -> AppResult<()> {
        sqlx::query("UPDATE hosts SET total_accounts = ? WHERE address = ?")
            .bind(host.total_accounts)
            .bind(&host.address)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| AppError::Database {
                message: format!("failed to update host {}: {e}", host.address),
            })
    }

    #[instrument(skip(self, deltas))]
    async fn update_tiles_batch(&self, deltas: &[TileDelta]) -> AppResult<()> {
        if deltas.is_empty() {
            return Ok(());
        }
        let mut tx = begin_transaction(&self.pool).await?;
        for delta in deltas {
            sqlx::query(
                "INSERT INTO tiles (x, y, color_id, place_time, last_modifier) VALUES (?,?,?,?,?)
                 ON CONFLICT(x, y) DO UPDATE SET
                    color_id = excluded.color_id,
                    place_time = excluded.place_time,
                    last_modifier = excluded.last_modifier",
            )
            .bind(i64::from(delta.coord.x))
            .bind(i64::from(delta.coord.y))
            .bind(i64::from(delta.tile.color_id))
            .bind(delta.tile.place_time)
            .bind(&delta.tile.last_modifier)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database {
                message: format!("failed to apply delta at ({},{}): {e}", delta.coord.x, delta.coord.y),
            })?;
        }
        commit_transaction(tx).await?;
        debug!(count = deltas.len(), "applied tile delta batch");
        Ok(())
    }

    #[instrument(skip(self, users))]
    async fn checkpoint_users(&self, users: &[User]) -> AppResult<()> {
        let mut tx = begin_transaction(&self.pool).await?;
        for user in users {
            let (cl_sec, cl_usec) = split_micros(user.canvas_limiter.last_event_micros);
            let (tl_sec, tl_usec) = split_micros(user.tile_limiter.last_event_micros);
            sqlx::query(
                "UPDATE users SET
                    display_name = ?, has_set_username = ?, is_shadow_banned = ?,
                    cl_last_event_sec = ?, cl_last_event_usec = ?, cl_current_allowance = ?, cl_max_rate = ?, cl_per_seconds = ?,
                    tl_last_event_sec = ?, tl_last_event_usec = ?, tl_current_allowance = ?, tl_max_rate = ?, tl_per_seconds = ?,
                    remaining = ?, max_tiles = ?, regen_seconds = ?, total_placed = ?, level = ?, progress_in_level = ?, tiles_to_next_level = ?,
                    last_connected = ?, last_event = ?
                WHERE id = ?",
            )
            .bind(&user.display_name)
            .bind(user.has_set_username)
            .bind(user.is_shadow_banned)
            .bind(cl_sec)
            .bind(cl_usec)
            .bind(user.canvas_limiter.current_allowance)
            .bind(user.canvas_limiter.max_rate)
            .bind(user.canvas_limiter.per_seconds)
            .bind(tl_sec)
            .bind(tl_usec)
            .bind(user.tile_limiter.current_allowance)
            .bind(user.tile_limiter.max_rate)
            .bind(user.tile_limiter.per_seconds)
            .bind(user.economy.remaining)
            .bind(user.economy.max)
            .bind(user.economy.regen_seconds)
            .bind(user.economy.total_placed)
            .bind(user.economy.level)
            .bind(user.economy.progress_in_level)
            .bind(user.economy.tiles_to_next_level)
            .bind(user.last_connected)
            .bind(user.last_event)
            .bind(user.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database {
                message: format!("failed to checkpoint user {}: {e}", user.id),
            })?;
        }
        commit_transaction(tx).await?;
        debug!(count = users.len(), "checkpointed live users");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn backup_to(&self, path: &str) -> AppResult<()> {
        self.executor
            .execute_with_timeout(
                || sqlx::query("VACUUM INTO ?").bind(path).execute(&self.pool),
                &format!("failed to back up to {path}"),
            )
            .await?;
        Ok(())
    }
}

fn bind_user_insert<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    user: &'q User,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    let (cl_sec, cl_usec) = split_micros(user.canvas_limiter.last_event_micros);
    let (tl_sec, tl_usec) = split_micros(user.tile_limiter.last_event_micros);
    query
        .bind(user.id.to_string())
        .bind(&user.display_name)
        .bind(user.has_set_username)
        .bind(user.is_shadow_banned)
        .bind(cl_sec)
        .bind(cl_usec)
        .bind(user.canvas_limiter.current_allowance)
        .bind(user.canvas_limiter.max_rate)
        .bind(user.canvas_limiter.per_seconds)
        .bind(tl_sec)
        .bind(tl_usec)
        .bind(user.tile_limiter.current_allowance)
        .bind(user.tile_limiter.max_rate)
        .bind(user.tile_limiter.per_seconds)
        .bind(user.economy.remaining)
        .bind(user.economy.max)
        .bind(user.economy.regen_seconds)
        .bind(user.economy.total_placed)
        .bind(user.economy.level)
        .bind(user.economy.progress_in_level)
        .bind(user.economy.tiles_to_next_level)
        .bind(user.last_connected)
        .bind(user.last_event)
}

fn bind_user_update<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    user: &'q User,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    let (cl_sec, cl_usec) = split_micros(user.canvas_limiter.last_event_micros);
    let (tl_sec, tl_usec) = split_micros(user.tile_limiter.last_event_micros);
    query
        .bind(&user.display_name)
        .bind(user.has_set_username)
        .bind(user.is_shadow_banned)
        .bind(cl_sec)
        .bind(cl_usec)
        .bind(user.canvas_limiter.current_allowance)
        .bind(user.canvas_limiter.max_rate)
        .bind(user.canvas_limiter.per_seconds)
        .bind(tl_sec)
        .bind(tl_usec)
        .bind(user.tile_limiter.current_allowance)
        .bind(user.tile_limiter.max_rate)
        .bind(user.tile_limiter.per_seconds)
        .bind(user.economy.remaining)
        .bind(user.economy.max)
        .bind(user.economy.regen_seconds)
        .bind(user.economy.total_placed)
        .bind(user.economy.level)
        .bind(user.economy.progress_in_level)
        .bind(user.economy.tiles_to_next_level)
        .bind(user.last_connected)
        .bind(user.last_event)
        .bind(user.id.to_string())
}
