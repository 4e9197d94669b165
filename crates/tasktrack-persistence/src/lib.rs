pub mod keys;
pub mod manager;
pub mod storage_service;
pub mod store;
pub mod sync;
pub mod traits;
pub mod watch;

pub use keys::{project_data_key, KeyKind, APP_STATE_KEY, KEY_PREFIX, PROJECTS_KEY};
pub use manager::TaskManager;
pub use storage_service::StorageService;
pub use store::*;
pub use sync::{ReloadEvent, ReloadListener};
pub use traits::*;
pub use watch::*;
