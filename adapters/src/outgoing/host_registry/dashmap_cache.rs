use canvas_application::error::AppResult;
use canvas_application::ports::outgoing::host_registry::HostRegistryPort;
use canvas_application::ports::outgoing::persistence::DynPersistenceStorePort;
use dashmap::DashMap;
use domain::host::Host;
use tracing::instrument;

/// A read-through, write-through cache of the `hosts` table keyed by
/// address, grounded on the reference backend's per-IP `DashMap` pattern.
/// Unlike that pattern this one survives restarts: the store remains the
/// source of truth, the map only avoids a round trip for every request.
pub struct DashMapHostRegistryAdapter {
    persistence: DynPersistenceStorePort,
    cache: DashMap<String, Host>,
}

impl DashMapHostRegistryAdapter {
    #[must_use]
    pub fn new(persistence: DynPersistenceStorePort) -> Self {
        Self {
            persistence,
            cache: DashMap::new(),
        }
    }
}

#[async_trait::async_trait]
impl HostRegistryPort for DashMapHostRegistryAdapter {
    #[instrument(skip(self))]
    async fn check_and_record(&self, address: &str, max_users_per_ip: i64) -> AppResult<bool> {
        let (mut host, is_new) = if let Some(cached) = self.cache.get(address) {
            (cached.clone(), false)
        } else if let Some(stored) = self.persistence.load_host(address).await? {
            (stored, false)
        } else {
            (Host::new(address.to_string()), true)
        };

        if !host.can_create_account(max_users_per_ip) {
            self.cache.insert(address.to_string(), host);
            return Ok(false);
        }

        host.record_account_created();

        if is_new {
            self.persistence.insert_host(&host).await?;
        } else {
            self.persistence.update_host(&host).await?;
        }
        self.cache.insert(address.to_string(), host);
        Ok(true)
    }
}
