use domain::color::RgbColor;
use domain::coords::CellCoord;
use domain::tile::Tile;
use domain::user::UserId;

use crate::error::AppResult;

/// The result of a `postTile` attempt, distinguishing the shadow-banned
/// path (echo to caller only, no broadcast, no canvas mutation) from the
/// normal one, per the shadow-ban invariant.
#[derive(Debug, Clone)]
pub enum PlaceOutcome {
    Placed { tile: Tile, index: u32 },
    ShadowEchoed { tile: Tile, index: u32 },
}

#[async_trait::async_trait]
pub trait PlaceTileUseCase: Send + Sync {
    /// Caller has already been admitted by the tile-place rate limiter and
    /// is known to have `remaining >= 1`; this only performs the
    /// grid/economy mutation and broadcast.
    async fn place_tile(
        &self,
        user_id: UserId,
        actor: &str,
        is_shadow_banned: bool,
        coord: CellCoord,
        color_id: u8,
        now_unix: i64,
    ) -> AppResult<PlaceOutcome>;
}

#[async_trait::async_trait]
pub trait CanvasQueryUseCase: Send + Sync {
    /// `getCanvas`: the current compressed snapshot blob, or `None` if the
    /// compressor has not produced one yet.
    async fn get_snapshot(&self) -> AppResult<Option<Vec<u8>>>;

    /// `getTileInfo`: the modifier and place time of one cell.
    async fn get_tile_info(&self, coord: CellCoord) -> AppResult<Option<Tile>>;

    /// `getColors`: the cached palette reply.
    async fn get_colors(&self) -> AppResult<Vec<(u8, RgbColor)>>;

    fn edge_length(&self) -> u16;
}
