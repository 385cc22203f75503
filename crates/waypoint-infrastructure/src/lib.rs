pub mod config_service;
pub mod dto;
pub mod http_client;
pub mod paths;
pub mod session_store;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::http_client::HttpFlowClient;
pub use crate::paths::WaypointPaths;
pub use crate::session_store::{KvSessionStore, StorageKeys};
pub use crate::storage::{DirKeyValueStore, KeyValueStore, MemoryKeyValueStore};
