pub mod config;
pub mod error;
pub mod pagination;
pub mod result;

pub use config::AppConfig;
pub use error::TrackerError;
pub use pagination::{PageWindow, Paginator, ITEMS_PER_PAGE};
pub use result::TrackerResult;
