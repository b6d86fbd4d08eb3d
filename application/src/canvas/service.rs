use domain::color::RgbColor;
use domain::coords::CellCoord;
use domain::events::{TileUpdateEvent, UnicastEvent};
use domain::tile::Tile;
use domain::user::UserId;
use tracing::instrument;

use crate::error::AppResult;
use crate::ports::incoming::canvas::{CanvasQueryUseCase, PlaceOutcome, PlaceTileUseCase};
use crate::ports::outgoing::canvas_state::DynCanvasStatePort;
use crate::ports::outgoing::events::{DynBroadcastPort, DynUnicastPort};

pub struct CanvasService {
    canvas_state: DynCanvasStatePort,
    broadcast: DynBroadcastPort,
    unicast: DynUnicastPort,
}

impl CanvasService {
    #[must_use]
    pub const fn new(
        canvas_state: DynCanvasStatePort,
        broadcast: DynBroadcastPort,
        unicast: DynUnicastPort,
    ) -> Self {
        Self {
            canvas_state,
            broadcast,
            unicast,
        }
    }
}

#[async_trait::async_trait]
impl PlaceTileUseCase for CanvasService {
    #[instrument(skip(self))]
    async fn place_tile(
        &self,
        user_id: UserId,
        actor: &str,
        is_shadow_banned: bool,
        coord: CellCoord,
        color_id: u8,
        now_unix: i64,
    ) -> AppResult<PlaceOutcome> {
        let edge_length = self.canvas_state.edge_length();
        let index = coord.to_index(edge_length);

        if is_shadow_banned {
            self.canvas_state.validate_placement(coord, color_id).await?;
            let tile = Tile {
                color_id,
                place_time: now_unix,
                last_modifier: actor.to_string(),
            };
            self.unicast
                .send_to(
                    user_id,
                    UnicastEvent::TileEcho {
                        coord,
                        index,
                        color_id,
                    },
                )
                .await?;
            return Ok(PlaceOutcome::ShadowEchoed { tile, index });
        }

        let tile = self
            .canvas_state
            .place(coord, color_id, actor, now_unix)
            .await?;
        self.broadcast.broadcast_tile_update(TileUpdateEvent {
            coord,
            color_id: tile.color_id,
            index,
        })?;
        Ok(PlaceOutcome::Placed { tile, index })
    }
}

#[async_trait::async_trait]
impl CanvasQueryUseCase for CanvasService {
    async fn get_snapshot(&self) -> AppResult<Option<Vec<u8>>> {
        Ok(self.canvas_state.snapshot().await)
    }

    async fn get_tile_info(&self, coord: CellCoord) -> AppResult<Option<Tile>> {
        Ok(self.canvas_state.tile_at(coord).await)
    }

    async fn get_colors(&self) -> AppResult<Vec<(u8, RgbColor)>> {
        Ok(self.canvas_state.palette().iter().collect())
    }

    fn edge_length(&self) -> u16 {
        self.canvas_state.edge_length()
    }
}
