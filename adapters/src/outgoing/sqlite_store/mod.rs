mod executor;
mod schema;
mod store;

pub use store::SqliteStoreAdapter;
