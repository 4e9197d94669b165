pub mod export;
pub mod import;
pub mod project;
pub mod storage;
pub mod task;
pub mod template;
pub mod view;
pub mod watch;
