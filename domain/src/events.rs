use crate::coords::CellCoord;
use crate::user::UserId;

/// Broadcast when a tile changes. Carries both the coordinate (for JSON
/// clients) and the precomputed flat index (for `RES_TILE_UPDATE` binary
/// clients), so adapters never have to recompute it from `edge_length`
/// after the fact.
#[derive(Debug, Clone)]
pub struct TileUpdateEvent {
    pub coord: CellCoord,
    pub color_id: u8,
    pub index: u32,
}

#[derive(Debug, Clone)]
pub enum BroadcastEvent {
    TileUpdate(TileUpdateEvent),
    UserCount(u16),
    Announcement(String),
}

/// Unicast events delivered to exactly one live session.
#[derive(Debug, Clone)]
pub enum UnicastEvent {
    TileIncrement { amount: u8 },
    LevelUp { level: i32, max_tiles: i32 },
    Kicked { reason: String, button_label: String },
    /// The shadow-ban echo: a placement that is real to the actor only —
    /// never broadcast, never applied to the shared grid.
    TileEcho {
        coord: CellCoord,
        index: u32,
        color_id: u8,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct KickTarget {
    pub user_id: UserId,
}
