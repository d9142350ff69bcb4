//! Pick the best available cache backend.
//!
//! Priority: localStorage → Memory (fallback)

use std::rc::Rc;
use chat_core::ports::CachePort;
use super::{LocalStorageCache, MemoryCache};

/// Returns a trait object so callers are backend-agnostic. Never fails.
pub fn auto_detect_cache() -> Rc<dyn CachePort> {
    match LocalStorageCache::open() {
        Ok(cache) => {
            log::info!("Cache backend: localStorage");
            Rc::new(cache)
        }
        Err(e) => {
            log::warn!("localStorage unavailable ({}), falling back to memory", e);
            Rc::new(MemoryCache::new())
        }
    }
}
