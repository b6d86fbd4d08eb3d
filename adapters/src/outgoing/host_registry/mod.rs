mod dashmap_cache;

pub use dashmap_cache::DashMapHostRegistryAdapter;
