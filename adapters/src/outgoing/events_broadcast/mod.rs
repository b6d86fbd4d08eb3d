mod broadcast;
mod unicast;

pub use broadcast::TokioBroadcastAdapter;
pub use unicast::SessionRegistryUnicastAdapter;
