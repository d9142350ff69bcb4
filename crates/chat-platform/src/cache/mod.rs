pub mod memory;
pub mod local_storage;
pub mod auto;

pub use memory::MemoryCache;
pub use local_storage::LocalStorageCache;
pub use auto::auto_detect_cache;
