use std::str::FromStr;

use domain::admin::Capability;
use domain::coords::CellCoord;
use domain::events::TileUpdateEvent;
use domain::user::UserId;
use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::ports::incoming::admin::AdminUseCase;
use crate::ports::outgoing::admin_directory::DynAdminDirectoryPort;
use crate::ports::outgoing::canvas_state::DynCanvasStatePort;
use crate::ports::outgoing::events::DynBroadcastPort;
use crate::ports::outgoing::persistence::DynPersistenceStorePort;
use crate::ports::outgoing::shutdown::DynShutdownPort;
use crate::ports::outgoing::user_directory::DynUserDirectoryPort;

pub struct AdminService {
    admin_directory: DynAdminDirectoryPort,
    canvas_state: DynCanvasStatePort,
    broadcast: DynBroadcastPort,
    persistence: DynPersistenceStorePort,
    user_directory: DynUserDirectoryPort,
    shutdown: DynShutdownPort,
    backup_dir: String,
}

impl AdminService {
    #[must_use]
    pub const fn new(
        admin_directory: DynAdminDirectoryPort,
        canvas_state: DynCanvasStatePort,
        broadcast: DynBroadcastPort,
        persistence: DynPersistenceStorePort,
        user_directory: DynUserDirectoryPort,
        shutdown: DynShutdownPort,
        backup_dir: String,
    ) -> Self {
        Self {
            admin_directory,
            canvas_state,
            broadcast,
            persistence,
            user_directory,
            shutdown,
            backup_dir,
        }
    }

    async fn require(&self, caller: UserId, capability: Capability) -> AppResult<()> {
        let capabilities = self
            .admin_directory
            .get(caller)
            .await
            .ok_or_else(|| AppError::Forbidden {
                message: format!("{caller} is not an administrator"),
            })?;
        if capabilities.has(capability) {
            Ok(())
        } else {
            Err(AppError::Forbidden {
                message: format!("{caller} lacks {capability:?}"),
            })
        }
    }
}

#[async_trait::async_trait]
impl AdminUseCase for AdminService {
    #[instrument(skip(self, message))]
    async fn announce(&self, caller: UserId, message: String) -> AppResult<()> {
        self.require(caller, Capability::Announce).await?;
        self.broadcast.broadcast_announcement(message)?;
        info!(%caller, "admin announcement broadcast");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn toggle_shadowban(&self, caller: UserId, target: UserId) -> AppResult<bool> {
        self.require(caller, Capability::Shadowban).await?;
        let new_state = self.user_directory.toggle_shadow_ban(target).await?;
        info!(%caller, %target, new_state, "shadow-ban toggled");
        Ok(new_state)
    }

    #[instrument(skip(self))]
    async fn ban_click(&self, caller: UserId, coord: CellCoord) -> AppResult<UserId> {
        self.require(caller, Capability::Banclick).await?;

        let tile = self
            .canvas_state
            .tile_at(coord)
            .await
            .ok_or_else(|| AppError::Validation {
                message: "coordinate has never been placed".to_string(),
            })?;
        let target = UserId::from_str(&tile.last_modifier).map_err(|_| AppError::Validation {
            message: "last modifier is not a tracked user".to_string(),
        })?;

        if self.admin_directory.get(target).await.is_some() {
            return Err(AppError::Forbidden {
                message: "refusing to ban an administrator".to_string(),
            });
        }

        self.user_directory.set_shadow_ban(target, true).await?;
        info!(%caller, %target, "ban-click shadow-banned last modifier");
        Ok(target)
    }

    #[instrument(skip(self))]
    async fn brush(
        &self,
        caller: UserId,
        center: CellCoord,
        radius: u16,
        color_id: u8,
        now_unix: i64,
    ) -> AppResult<usize> {
        self.require(caller, Capability::Cleanup).await?;

        let edge_length = self.canvas_state.edge_length();
        let changed = self
            .canvas_state
            .brush(center, radius, color_id, &caller.to_string(), now_unix)
            .await?;
        for (coord, tile) in &changed {
            self.broadcast.broadcast_tile_update(TileUpdateEvent {
                coord: *coord,
                color_id: tile.color_id,
                index: coord.to_index(edge_length),
            })?;
        }
        info!(%caller, count = changed.len(), "admin brush applied");
        Ok(changed.len())
    }

    #[instrument(skip(self))]
    async fn shutdown(&self, caller: UserId) -> AppResult<()> {
        self.require(caller, Capability::Shutdown).await?;
        info!(%caller, "admin-initiated shutdown");
        self.shutdown.trigger();
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reload_config(&self, caller: UserId) -> AppResult<()> {
        self.require(caller, Capability::Shutdown).await?;
        self.admin_directory.reload().await?;
        info!(%caller, "configuration reloaded");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn backup(&self, caller: UserId) -> AppResult<()> {
        self.require(caller, Capability::Cleanup).await?;
        let stamp = time::OffsetDateTime::now_utc().unix_timestamp();
        let path = format!("{}/canvas-{stamp}.db", self.backup_dir);
        self.persistence.backup_to(&path).await?;
        info!(%caller, %path, "backup taken");
        Ok(())
    }
}
