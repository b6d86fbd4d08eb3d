use domain::coords::CellCoord;
use domain::user::UserId;

use crate::error::AppResult;

#[async_trait::async_trait]
pub trait AdminUseCase: Send + Sync {
    async fn announce(&self, caller: UserId, message: String) -> AppResult<()>;

    /// Returns the target's new shadow-ban state.
    async fn toggle_shadowban(&self, caller: UserId, target: UserId) -> AppResult<bool>;

    /// Looks up the last modifier of `coord` and shadow-bans them. Returns
    /// the banned user id. Refuses if the last modifier is themselves an
    /// administrator.
    async fn ban_click(&self, caller: UserId, coord: CellCoord) -> AppResult<UserId>;

    /// Writes a `(2*radius+1)^2` square centered at `coord` as the admin.
    /// Returns the number of cells actually changed (clipped at the
    /// canvas boundary).
    async fn brush(
        &self,
        caller: UserId,
        center: CellCoord,
        radius: u16,
        color_id: u8,
        now_unix: i64,
    ) -> AppResult<usize>;

    async fn shutdown(&self, caller: UserId) -> AppResult<()>;

    async fn reload_config(&self, caller: UserId) -> AppResult<()>;

    async fn backup(&self, caller: UserId) -> AppResult<()>;
}
