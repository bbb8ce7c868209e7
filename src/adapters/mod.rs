// Adapters layer: concrete implementations for external systems.

pub mod storage;
pub mod wayback;

pub use storage::LocalStorage;
pub use wayback::WaybackClient;
