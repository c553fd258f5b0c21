pub mod storage;
pub mod store;

pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{HistoryStore, HISTORY_KEY};
